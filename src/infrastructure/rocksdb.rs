use crate::domain::booking::{Booking, UpsertOutcome};
use crate::domain::payment::Payment;
use crate::domain::ports::{BookingStore, PaymentStore, RequestBookingStore};
use crate::domain::request_booking::RequestBooking;
use crate::error::{Result, WorkflowError};
use async_trait::async_trait;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, IteratorMode, Options};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;

/// Column Family for confirmed bookings, keyed by client reference.
pub const CF_BOOKINGS: &str = "bookings";
/// Column Family for request bookings, keyed by request booking id.
pub const CF_REQUEST_BOOKINGS: &str = "request_bookings";
/// Column Family for payments, keyed by payment id.
pub const CF_PAYMENTS: &str = "payments";

/// A persistent store implementation using RocksDB.
///
/// Each entity lives in its own Column Family with JSON values. `Clone`
/// shares the underlying `Arc<DB>`.
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path, creating
    /// any missing column families.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let families = [CF_BOOKINGS, CF_REQUEST_BOOKINGS, CF_PAYMENTS]
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()))
            .collect::<Vec<_>>();
        let db = DB::open_cf_descriptors(&opts, path, families)?;

        Ok(Self { db: Arc::new(db) })
    }

    fn write<T: Serialize>(&self, family: &str, key: &str, value: &T) -> Result<()> {
        let cf = self.handle(family)?;
        let bytes = serde_json::to_vec(value)?;
        self.db.put_cf(cf, key.as_bytes(), bytes)?;
        Ok(())
    }

    fn fetch<T: DeserializeOwned>(&self, family: &str, key: &str) -> Result<Option<T>> {
        let cf = self.handle(family)?;
        match self.db.get_pinned_cf(cf, key.as_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn scan<T: DeserializeOwned>(&self, family: &str) -> Result<Vec<T>> {
        let cf = self.handle(family)?;
        let mut values = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (_key, value) = item?;
            values.push(serde_json::from_slice(&value)?);
        }
        Ok(values)
    }

    fn handle(&self, family: &str) -> Result<&ColumnFamily> {
        self.db.cf_handle(family).ok_or_else(|| {
            WorkflowError::Internal(Box::new(std::io::Error::other(format!(
                "{family} column family not found"
            ))))
        })
    }
}

#[async_trait]
impl BookingStore for RocksDBStore {
    async fn find_by_client_reference(&self, client_reference: &str) -> Result<Option<Booking>> {
        self.fetch(CF_BOOKINGS, client_reference)
    }

    async fn find_by_booking_id(&self, booking_id: &str) -> Result<Option<Booking>> {
        Ok(self
            .scan::<Booking>(CF_BOOKINGS)?
            .into_iter()
            .find(|b| b.booking_id == booking_id))
    }

    async fn find_by_hotel_confirmation_no(&self, number: &str) -> Result<Option<Booking>> {
        Ok(self
            .scan::<Booking>(CF_BOOKINGS)?
            .into_iter()
            .find(|b| b.hotel_confirmation_no == number))
    }

    async fn upsert(&self, booking: Booking) -> Result<UpsertOutcome> {
        let existed = self
            .fetch::<Booking>(CF_BOOKINGS, &booking.client_reference)?
            .is_some();
        self.write(CF_BOOKINGS, &booking.client_reference, &booking)?;
        Ok(if existed {
            UpsertOutcome::Updated
        } else {
            UpsertOutcome::Created
        })
    }

    async fn get_all(&self) -> Result<Vec<Booking>> {
        self.scan(CF_BOOKINGS)
    }
}

#[async_trait]
impl RequestBookingStore for RocksDBStore {
    async fn get(&self, request_booking_id: &str) -> Result<Option<RequestBooking>> {
        self.fetch(CF_REQUEST_BOOKINGS, request_booking_id)
    }

    async fn store(&self, record: RequestBooking) -> Result<()> {
        self.write(CF_REQUEST_BOOKINGS, &record.request_booking_id, &record)
    }

    async fn get_all(&self) -> Result<Vec<RequestBooking>> {
        self.scan(CF_REQUEST_BOOKINGS)
    }
}

#[async_trait]
impl PaymentStore for RocksDBStore {
    async fn get(&self, payment_id: &str) -> Result<Option<Payment>> {
        self.fetch(CF_PAYMENTS, payment_id)
    }

    async fn store(&self, payment: Payment) -> Result<()> {
        self.write(CF_PAYMENTS, &payment.payment_id, &payment)
    }
}
