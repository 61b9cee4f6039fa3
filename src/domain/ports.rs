use super::booking::{Booking, UpsertOutcome};
use super::directory::{Employee, Hotel};
use super::money::Amount;
use super::payment::{Payment, PaymentMode};
use super::request_booking::RequestBooking;
use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

#[async_trait]
pub trait BookingStore: Send + Sync {
    async fn find_by_client_reference(&self, client_reference: &str) -> Result<Option<Booking>>;
    async fn find_by_booking_id(&self, booking_id: &str) -> Result<Option<Booking>>;
    async fn find_by_hotel_confirmation_no(&self, number: &str) -> Result<Option<Booking>>;
    /// Inserts or replaces the booking keyed by its client reference.
    async fn upsert(&self, booking: Booking) -> Result<UpsertOutcome>;
    async fn get_all(&self) -> Result<Vec<Booking>>;
}

#[async_trait]
pub trait RequestBookingStore: Send + Sync {
    async fn get(&self, request_booking_id: &str) -> Result<Option<RequestBooking>>;
    async fn store(&self, record: RequestBooking) -> Result<()>;
    async fn get_all(&self) -> Result<Vec<RequestBooking>>;
}

#[async_trait]
pub trait PaymentStore: Send + Sync {
    async fn get(&self, payment_id: &str) -> Result<Option<Payment>>;
    async fn store(&self, payment: Payment) -> Result<()>;
}

/// Employee and hotel lookups owned by another system.
#[async_trait]
pub trait Directory: Send + Sync {
    async fn find_employee(&self, id: &str) -> Result<Option<Employee>>;
    async fn find_hotel(&self, id: &str) -> Result<Option<Hotel>>;
    async fn agents(&self) -> Result<Vec<Employee>>;
}

/// Decides whether an employee may approve or decline a request.
#[async_trait]
pub trait ApprovalAuthority: Send + Sync {
    async fn can_approve(&self, approver: &Employee, request: &RequestBooking) -> Result<bool>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutRequest {
    pub payment_id: String,
    pub request_booking_id: String,
    pub mode: PaymentMode,
    pub amount: Amount,
    pub currency: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSession {
    pub url: String,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_checkout(&self, request: &CheckoutRequest) -> Result<CheckoutSession>;
}

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

pub type BookingStoreBox = Box<dyn BookingStore>;
pub type RequestBookingStoreBox = Box<dyn RequestBookingStore>;
pub type PaymentStoreBox = Box<dyn PaymentStore>;
pub type DirectoryBox = Box<dyn Directory>;
pub type ApprovalAuthorityBox = Box<dyn ApprovalAuthority>;
pub type PaymentGatewayBox = Box<dyn PaymentGateway>;
pub type ClockBox = Box<dyn Clock>;
