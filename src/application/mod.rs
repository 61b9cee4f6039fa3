//! Application layer: payload validation, per-record locking and the
//! `BookingEngine` that drives every operation against the ports.

pub mod commands;
pub mod engine;
pub mod locks;
pub mod payments;
pub mod schemas;
pub mod validation;
pub mod views;
