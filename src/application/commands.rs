//! Typed operation inputs, parsed from payloads that already passed their
//! schema.

use crate::domain::payment::{PaymentMode, PaymentStatus};
use crate::domain::request_booking::{HotelOption, SelectedItem, one_or_many};
use chrono::NaiveDate;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct StoreRequest {
    pub employee: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub employee_email: Option<String>,
    #[serde(default)]
    pub occupancy: Option<u32>,
    #[serde(default)]
    pub adult_count: Option<u32>,
    #[serde(default)]
    pub child_count: Option<u32>,
    #[serde(default)]
    pub child_ages: Option<Vec<u32>>,
    #[serde(default)]
    pub room_count: Option<u32>,
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(default)]
    pub destination_code: Option<String>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub hotel_details: Option<Vec<HotelOption>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RequestFilter {
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub employee: Option<String>,
    /// Comma-separated list of request statuses.
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RequestRef {
    pub request_booking_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SendForApproval {
    pub request_booking_id: String,
    pub selected_items: Vec<SelectedItem>,
}

/// Approve or decline input.
#[derive(Debug, Clone, Deserialize)]
pub struct Decision {
    pub request_booking_id: String,
    pub employee: String,
    pub selected_items: Vec<SelectedItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePayment {
    pub request_booking_id: String,
    pub mode: PaymentMode,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaymentCallback {
    pub payment_id: String,
    pub status: PaymentStatus,
    pub signature: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CloseRequest {
    pub request_booking_id: String,
    #[serde(default)]
    pub booking_id: Option<String>,
}
