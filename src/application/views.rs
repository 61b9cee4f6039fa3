//! Response shapes returned by engine operations.

use crate::domain::booking::{Booking, UpsertOutcome};
use crate::domain::money::{Amount, Price};
use crate::domain::payment::{Payment, PaymentMode, PaymentStatus};
use crate::domain::request_booking::{
    DecisionSummary, HotelOption, RequestBooking, RequestStatus, RoomStatus,
};
use super::payments::CallbackOutcome;
use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct BookingReceipt {
    pub outcome: UpsertOutcome,
    pub booking: Booking,
}

/// Listing row for a request booking. In approved and payment states only
/// the rooms in that state are shown and counted.
#[derive(Debug, Clone, Serialize)]
pub struct RequestBookingSummary {
    pub request_booking_id: String,
    pub employee: String,
    pub company: Option<String>,
    pub agent: Option<String>,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub destination: Option<String>,
    pub destination_code: Option<String>,
    pub room_count: Option<u32>,
    pub status: RequestStatus,
    pub status_name: &'static str,
    pub status_code: u8,
    pub amount: Price,
    pub currency: Option<String>,
    pub hotels: Vec<HotelOption>,
}

fn visible_room_status(status: RequestStatus) -> Option<RoomStatus> {
    match status {
        RequestStatus::Approved => Some(RoomStatus::Approved),
        RequestStatus::PaymentPending => Some(RoomStatus::PaymentPending),
        RequestStatus::PaymentSuccess | RequestStatus::Closed => Some(RoomStatus::PaymentSuccess),
        _ => None,
    }
}

impl From<&RequestBooking> for RequestBookingSummary {
    fn from(record: &RequestBooking) -> Self {
        let filter = visible_room_status(record.status);
        let hotels: Vec<HotelOption> = record
            .hotels
            .iter()
            .filter_map(|hotel| {
                let rooms: Vec<_> = hotel
                    .rooms
                    .iter()
                    .filter(|r| filter.is_none_or(|s| r.status == s))
                    .cloned()
                    .collect();
                (!rooms.is_empty()).then(|| HotelOption {
                    rooms,
                    ..hotel.clone()
                })
            })
            .collect();
        let rooms = hotels.iter().flat_map(|h| h.rooms.iter());
        let amount: Price = rooms.clone().map(|r| r.payable()).sum();
        let currency = rooms.clone().find_map(|r| r.currency.clone());
        let (status_name, status_code) = record.status.display();

        Self {
            request_booking_id: record.request_booking_id.clone(),
            employee: record.employee.clone(),
            company: record.company.clone(),
            agent: record.agent.clone(),
            check_in: record.check_in,
            check_out: record.check_out,
            destination: record.destination.clone(),
            destination_code: record.destination_code.clone(),
            room_count: record.room_count,
            status: record.status,
            status_name,
            status_code,
            amount,
            currency,
            hotels,
        }
    }
}

/// Full request booking with its payment history.
#[derive(Debug, Clone, Serialize)]
pub struct RequestBookingDetails {
    #[serde(flatten)]
    pub request: RequestBooking,
    pub status_code: u8,
    pub payments: Vec<Payment>,
}

/// Result of a state transition on a request booking.
#[derive(Debug, Clone, Serialize)]
pub struct TransitionView {
    pub request_booking_id: String,
    pub status: RequestStatus,
    pub rooms_affected: usize,
    #[serde(flatten)]
    pub summary: Option<DecisionSummary>,
}

impl TransitionView {
    pub fn new(record: &RequestBooking, rooms_affected: usize) -> Self {
        Self {
            request_booking_id: record.request_booking_id.clone(),
            status: record.status,
            rooms_affected,
            summary: None,
        }
    }

    pub fn with_summary(record: &RequestBooking, summary: DecisionSummary) -> Self {
        Self {
            summary: Some(summary),
            ..Self::new(record, summary.approved_count + summary.declined_count)
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PaymentLink {
    pub payment_id: String,
    pub request_booking_id: String,
    pub url: String,
    pub amount: Amount,
    pub currency: String,
    pub mode: PaymentMode,
}

impl PaymentLink {
    pub fn from_payment(payment: Payment) -> Self {
        Self {
            url: payment.url.unwrap_or_default(),
            payment_id: payment.payment_id,
            request_booking_id: payment.request_booking_id,
            amount: payment.amount,
            currency: payment.currency,
            mode: payment.mode,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CallbackReceipt {
    pub payment_id: String,
    pub request_booking_id: String,
    pub payment_status: PaymentStatus,
    pub request_status: RequestStatus,
    pub outcome: CallbackOutcome,
}
