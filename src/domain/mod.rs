//! Domain layer: entities, value objects and the ports the engine depends on.
//!
//! The request-booking state machine lives on `RequestBooking` itself; the
//! application layer only loads, locks and persists records around it.

pub mod booking;
pub mod directory;
pub mod money;
pub mod payment;
pub mod ports;
pub mod request_booking;
