use crate::domain::booking::{Booking, UpsertOutcome};
use crate::domain::directory::{Employee, Hotel};
use crate::domain::payment::Payment;
use crate::domain::ports::{BookingStore, Directory, PaymentStore, RequestBookingStore};
use crate::domain::request_booking::RequestBooking;
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory store for confirmed bookings, keyed by client
/// reference.
#[derive(Default, Clone)]
pub struct InMemoryBookingStore {
    bookings: Arc<RwLock<HashMap<String, Booking>>>,
}

impl InMemoryBookingStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BookingStore for InMemoryBookingStore {
    async fn find_by_client_reference(&self, client_reference: &str) -> Result<Option<Booking>> {
        let bookings = self.bookings.read().await;
        Ok(bookings.get(client_reference).cloned())
    }

    async fn find_by_booking_id(&self, booking_id: &str) -> Result<Option<Booking>> {
        let bookings = self.bookings.read().await;
        Ok(bookings
            .values()
            .find(|b| b.booking_id == booking_id)
            .cloned())
    }

    async fn find_by_hotel_confirmation_no(&self, number: &str) -> Result<Option<Booking>> {
        let bookings = self.bookings.read().await;
        Ok(bookings
            .values()
            .find(|b| b.hotel_confirmation_no == number)
            .cloned())
    }

    async fn upsert(&self, booking: Booking) -> Result<UpsertOutcome> {
        let mut bookings = self.bookings.write().await;
        Ok(match bookings.insert(booking.client_reference.clone(), booking) {
            Some(_) => UpsertOutcome::Updated,
            None => UpsertOutcome::Created,
        })
    }

    async fn get_all(&self) -> Result<Vec<Booking>> {
        let bookings = self.bookings.read().await;
        Ok(bookings.values().cloned().collect())
    }
}

/// A thread-safe in-memory store for request bookings.
#[derive(Default, Clone)]
pub struct InMemoryRequestBookingStore {
    requests: Arc<RwLock<HashMap<String, RequestBooking>>>,
}

impl InMemoryRequestBookingStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RequestBookingStore for InMemoryRequestBookingStore {
    async fn get(&self, request_booking_id: &str) -> Result<Option<RequestBooking>> {
        let requests = self.requests.read().await;
        Ok(requests.get(request_booking_id).cloned())
    }

    async fn store(&self, record: RequestBooking) -> Result<()> {
        let mut requests = self.requests.write().await;
        requests.insert(record.request_booking_id.clone(), record);
        Ok(())
    }

    async fn get_all(&self) -> Result<Vec<RequestBooking>> {
        let requests = self.requests.read().await;
        Ok(requests.values().cloned().collect())
    }
}

#[derive(Default, Clone)]
pub struct InMemoryPaymentStore {
    payments: Arc<RwLock<HashMap<String, Payment>>>,
}

impl InMemoryPaymentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PaymentStore for InMemoryPaymentStore {
    async fn get(&self, payment_id: &str) -> Result<Option<Payment>> {
        let payments = self.payments.read().await;
        Ok(payments.get(payment_id).cloned())
    }

    async fn store(&self, payment: Payment) -> Result<()> {
        let mut payments = self.payments.write().await;
        payments.insert(payment.payment_id.clone(), payment);
        Ok(())
    }
}

/// Employee and hotel directory seeded up front, typically from CSV files.
#[derive(Default, Clone)]
pub struct InMemoryDirectory {
    employees: Arc<RwLock<HashMap<String, Employee>>>,
    hotels: Arc<RwLock<HashMap<String, Hotel>>>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style seeding; the directory is not shared yet, so the write
    /// lock is always free.
    pub fn with_employee(self, employee: Employee) -> Self {
        if let Ok(mut employees) = self.employees.try_write() {
            employees.insert(employee.id.clone(), employee);
        }
        self
    }

    pub fn with_hotel(self, hotel: Hotel) -> Self {
        if let Ok(mut hotels) = self.hotels.try_write() {
            hotels.insert(hotel.id.clone(), hotel);
        }
        self
    }

    pub async fn add_employee(&self, employee: Employee) {
        let mut employees = self.employees.write().await;
        employees.insert(employee.id.clone(), employee);
    }

    pub async fn add_hotel(&self, hotel: Hotel) {
        let mut hotels = self.hotels.write().await;
        hotels.insert(hotel.id.clone(), hotel);
    }
}

#[async_trait]
impl Directory for InMemoryDirectory {
    async fn find_employee(&self, id: &str) -> Result<Option<Employee>> {
        let employees = self.employees.read().await;
        Ok(employees.get(id).cloned())
    }

    async fn find_hotel(&self, id: &str) -> Result<Option<Hotel>> {
        let hotels = self.hotels.read().await;
        Ok(hotels.get(id).cloned())
    }

    /// Agents in id order so round-robin assignment is stable.
    async fn agents(&self) -> Result<Vec<Employee>> {
        let employees = self.employees.read().await;
        let mut agents: Vec<Employee> = employees.values().filter(|e| e.is_agent()).cloned().collect();
        agents.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(agents)
    }
}
