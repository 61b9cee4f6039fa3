use super::money::Price;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Confirmed,
    Cancelled,
    Pending,
    Completed,
}

impl BookingStatus {
    pub const ALL: [&'static str; 4] = ["confirmed", "cancelled", "pending", "completed"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
            Self::Pending => "pending",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "confirmed" => Ok(Self::Confirmed),
            "cancelled" => Ok(Self::Cancelled),
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            other => Err(format!("unknown booking status: {other}")),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct BookedHotel {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city_code: Option<String>,
}

/// A booking confirmed by the external reservation system.
///
/// `client_reference` is the upsert key: resubmitting the same reference
/// replaces the record in place. `booking_id` and `hotel_confirmation_no`
/// are unique across different references.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub client_reference: String,
    pub booking_id: String,
    pub hotel_confirmation_no: String,
    pub status: BookingStatus,
    pub hotel: BookedHotel,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub total_price: Price,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    pub num_of_rooms: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employee: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guest_list: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_list: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancellation: Option<Value>,
}

/// Whether an upsert inserted a new record or replaced an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UpsertOutcome {
    Created,
    Updated,
}

/// Filters accepted by the booking listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookingFilter {
    #[serde(default)]
    pub employee: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub booking_status: Option<BookingStatus>,
    #[serde(default)]
    pub booking_id: Option<String>,
}

impl BookingFilter {
    pub fn matches(&self, booking: &Booking) -> bool {
        self.employee
            .as_deref()
            .is_none_or(|e| booking.employee.as_deref() == Some(e))
            && self
                .company
                .as_deref()
                .is_none_or(|c| booking.company.as_deref() == Some(c))
            && self.booking_status.is_none_or(|s| booking.status == s)
            && self
                .booking_id
                .as_deref()
                .is_none_or(|id| booking.booking_id == id)
    }
}
