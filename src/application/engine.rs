use super::commands::{
    CloseRequest, CreatePayment, Decision, PaymentCallback, RequestFilter, RequestRef,
    SendForApproval, StoreRequest,
};
use super::locks::KeyedLocks;
use super::payments::{CallbackOutcome, PaymentOrchestrator};
use super::schemas;
use super::validation::validate;
use super::views::{
    BookingReceipt, CallbackReceipt, PaymentLink, RequestBookingDetails, RequestBookingSummary,
    TransitionView,
};
use crate::config::EngineConfig;
use crate::domain::booking::{Booking, BookingFilter};
use crate::domain::directory::Employee;
use crate::domain::ports::{
    ApprovalAuthorityBox, BookingStoreBox, ClockBox, DirectoryBox, PaymentGatewayBox,
    PaymentStoreBox, RequestBookingStoreBox,
};
use crate::domain::request_booking::{
    DecisionSummary, HotelOption, RequestBooking, RequestStatus, RequestUpdate,
};
use crate::error::{Result, WorkflowError};
use serde_json::Value;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, info, warn};

/// Everything the engine talks to outside its own process.
pub struct EnginePorts {
    pub bookings: BookingStoreBox,
    pub requests: RequestBookingStoreBox,
    pub payments: PaymentStoreBox,
    pub directory: DirectoryBox,
    pub authority: ApprovalAuthorityBox,
    pub gateway: PaymentGatewayBox,
    pub clock: ClockBox,
}

/// The main entry point for booking and approval operations.
///
/// Each operation validates its payload, then runs its read-validate-write
/// section under a per-record lock so concurrent calls on the same request
/// booking (or the same booking keys) serialize.
pub struct BookingEngine {
    bookings: BookingStoreBox,
    requests: RequestBookingStoreBox,
    directory: DirectoryBox,
    authority: ApprovalAuthorityBox,
    payments: PaymentOrchestrator,
    clock: ClockBox,
    locks: KeyedLocks,
    config: EngineConfig,
    next_agent: AtomicUsize,
}

fn request_key(request_booking_id: &str) -> String {
    format!("request:{request_booking_id}")
}

fn request_not_found(request_booking_id: &str) -> WorkflowError {
    WorkflowError::not_found(format!("Request booking {request_booking_id} not found"))
}

fn default_room_currency(hotels: &mut [HotelOption], currency: &str) {
    for room in hotels.iter_mut().flat_map(|h| h.rooms.iter_mut()) {
        if room.currency.is_none() {
            room.currency = Some(currency.to_string());
        }
    }
}

fn parse_statuses(raw: Option<&str>) -> Result<Vec<RequestStatus>> {
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<RequestStatus>().map_err(|_| {
                WorkflowError::validation(format!(
                    "Invalid status: {s}. Must be one of: {}",
                    RequestStatus::ALL.join(", ")
                ))
            })
        })
        .collect()
}

impl BookingEngine {
    pub fn new(ports: EnginePorts, config: EngineConfig) -> Self {
        let payments = PaymentOrchestrator::new(
            ports.gateway,
            ports.payments,
            config.webhook_secret.clone(),
            config.upstream_timeout,
        );
        Self {
            bookings: ports.bookings,
            requests: ports.requests,
            directory: ports.directory,
            authority: ports.authority,
            payments,
            clock: ports.clock,
            locks: KeyedLocks::new(config.lock_timeout),
            config,
            next_agent: AtomicUsize::new(0),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Bounds a call to an external collaborator.
    async fn upstream<T, F>(&self, what: &str, call: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        match tokio::time::timeout(self.config.upstream_timeout, call).await {
            Ok(result) => result,
            Err(_) => {
                warn!(what, "upstream call timed out");
                Err(WorkflowError::UpstreamTimeout(format!("{what} timed out")))
            }
        }
    }

    async fn employee(&self, id: &str) -> Result<Employee> {
        self.upstream("employee lookup", self.directory.find_employee(id))
            .await?
            .ok_or_else(|| WorkflowError::not_found(format!("Employee {id} not found")))
    }

    async fn load_request(&self, request_booking_id: &str) -> Result<RequestBooking> {
        self.requests
            .get(request_booking_id)
            .await?
            .ok_or_else(|| request_not_found(request_booking_id))
    }

    /// Creates or updates a confirmed booking keyed by `clientReference`.
    pub async fn confirm_booking(&self, payload: &Value) -> Result<BookingReceipt> {
        let booking: Booking = validate(payload, &schemas::CONFIRM_BOOKING)?.parse()?;

        let hotel_id = booking.hotel.id.as_str();
        if self
            .upstream("hotel lookup", self.directory.find_hotel(hotel_id))
            .await?
            .is_none()
        {
            return Err(WorkflowError::not_found(format!("Hotel {hotel_id} not found")));
        }
        if let Some(employee) = booking.employee.as_deref() {
            self.employee(employee).await?;
        }

        let keys = [
            format!("booking:ref:{}", booking.client_reference),
            format!("booking:id:{}", booking.booking_id),
            format!("booking:hcn:{}", booking.hotel_confirmation_no),
        ];
        let _guard = self.locks.lock_many(keys.iter().map(String::as_str)).await?;

        if let Some(other) = self.bookings.find_by_booking_id(&booking.booking_id).await?
            && other.client_reference != booking.client_reference
        {
            return Err(WorkflowError::conflict(format!(
                "bookingId {} already exists for clientReference {}",
                booking.booking_id, other.client_reference
            )));
        }
        if let Some(other) = self
            .bookings
            .find_by_hotel_confirmation_no(&booking.hotel_confirmation_no)
            .await?
            && other.client_reference != booking.client_reference
        {
            return Err(WorkflowError::conflict(format!(
                "hotelConfirmationNo {} already exists for clientReference {}",
                booking.hotel_confirmation_no, other.client_reference
            )));
        }

        let outcome = self.bookings.upsert(booking.clone()).await?;
        info!(
            client_reference = %booking.client_reference,
            booking_id = %booking.booking_id,
            ?outcome,
            "booking confirmed"
        );
        Ok(BookingReceipt { outcome, booking })
    }

    pub async fn get_all_bookings(&self, payload: &Value) -> Result<Vec<Booking>> {
        let filter: BookingFilter = validate(payload, &schemas::GET_BOOKINGS)?.parse()?;
        let mut bookings: Vec<Booking> = self
            .bookings
            .get_all()
            .await?
            .into_iter()
            .filter(|b| filter.matches(b))
            .collect();
        bookings.sort_by(|a, b| a.client_reference.cmp(&b.client_reference));
        Ok(bookings)
    }

    /// Stores a new request booking in `req_pending`.
    pub async fn store_req_booking(&self, payload: &Value) -> Result<RequestBooking> {
        let cmd: StoreRequest = validate(payload, &schemas::STORE_REQUEST)?.parse()?;
        if cmd.check_in < self.clock.today() {
            return Err(WorkflowError::validation("check_in cannot be in the past"));
        }
        let employee = self.employee(&cmd.employee).await?;

        let mut hotels = cmd.hotel_details.unwrap_or_default();
        default_room_currency(&mut hotels, &self.config.default_currency);
        let mut record = RequestBooking::new(employee.id.clone(), cmd.check_in, cmd.check_out)
            .with_hotels(hotels);
        record.company = cmd.company.or(Some(employee.company));
        record.employee_email = cmd.employee_email.or(employee.email);
        record.occupancy = cmd.occupancy;
        record.adult_count = cmd.adult_count;
        record.child_count = cmd.child_count;
        record.child_ages = cmd.child_ages;
        record.room_count = cmd.room_count;
        record.destination = cmd.destination;
        record.destination_code = cmd.destination_code;

        let _guard = self.locks.lock(&request_key(&record.request_booking_id)).await?;
        if self.requests.get(&record.request_booking_id).await?.is_some() {
            return Err(WorkflowError::conflict(
                "Request already exists for this employee with same checkin checkout",
            ));
        }

        let agents = self.upstream("agent lookup", self.directory.agents()).await?;
        if !agents.is_empty() {
            let turn = self.next_agent.fetch_add(1, Ordering::Relaxed);
            record.agent = Some(agents[turn % agents.len()].id.clone());
        }

        self.requests.store(record.clone()).await?;
        info!(
            request_booking_id = %record.request_booking_id,
            employee = %record.employee,
            agent = ?record.agent,
            "request booking stored"
        );
        Ok(record)
    }

    pub async fn get_all_request_bookings(
        &self,
        payload: &Value,
    ) -> Result<Vec<RequestBookingSummary>> {
        let filter: RequestFilter = validate(payload, &schemas::GET_REQUESTS)?.parse()?;
        let statuses = parse_statuses(filter.status.as_deref())?;

        let mut records: Vec<RequestBooking> = self
            .requests
            .get_all()
            .await?
            .into_iter()
            .filter(|r| {
                filter
                    .company
                    .as_deref()
                    .is_none_or(|c| r.company.as_deref() == Some(c))
                    && filter.employee.as_deref().is_none_or(|e| r.employee == e)
                    && (statuses.is_empty() || statuses.contains(&r.status))
            })
            .collect();
        records.sort_by(|a, b| a.request_booking_id.cmp(&b.request_booking_id));
        Ok(records.iter().map(RequestBookingSummary::from).collect())
    }

    pub async fn get_request_booking_details(
        &self,
        payload: &Value,
    ) -> Result<RequestBookingDetails> {
        let cmd: RequestRef = validate(payload, &schemas::REQUEST_DETAILS)?.parse()?;
        let request = self.load_request(&cmd.request_booking_id).await?;
        let payments = self.payments.payments_for(&request).await?;
        Ok(RequestBookingDetails {
            status_code: request.status.display().1,
            request,
            payments,
        })
    }

    pub async fn send_for_approval(&self, payload: &Value) -> Result<TransitionView> {
        let cmd: SendForApproval = validate(payload, &schemas::SEND_FOR_APPROVAL)?.parse()?;
        let _guard = self.locks.lock(&request_key(&cmd.request_booking_id)).await?;
        let mut record = self.load_request(&cmd.request_booking_id).await?;

        let rooms = record.send_for_approval(&cmd.selected_items)?;
        self.requests.store(record.clone()).await?;
        info!(
            request_booking_id = %record.request_booking_id,
            rooms,
            "request booking sent for approval"
        );
        Ok(TransitionView::new(&record, rooms))
    }

    /// Shared front half of approve and decline: resolves the approver,
    /// locks and loads the record, and checks the approver's authority.
    async fn decide<F>(&self, payload: &Value, apply: F) -> Result<TransitionView>
    where
        F: FnOnce(&mut RequestBooking, &Decision) -> Result<DecisionSummary>,
    {
        let cmd: Decision = validate(payload, &schemas::DECISION)?.parse()?;
        let approver = self.employee(&cmd.employee).await?;

        let _guard = self.locks.lock(&request_key(&cmd.request_booking_id)).await?;
        let mut record = self.load_request(&cmd.request_booking_id).await?;

        let allowed = self
            .upstream(
                "approval authority",
                self.authority.can_approve(&approver, &record),
            )
            .await?;
        if !allowed {
            warn!(
                request_booking_id = %record.request_booking_id,
                employee = %approver.id,
                "approval rejected: not authorized"
            );
            return Err(WorkflowError::Forbidden(format!(
                "Employee {} is not authorized to approve this request",
                approver.id
            )));
        }

        let summary = apply(&mut record, &cmd)?;
        self.requests.store(record.clone()).await?;
        info!(
            request_booking_id = %record.request_booking_id,
            employee = %approver.id,
            approved = summary.approved_count,
            declined = summary.declined_count,
            status = %record.status,
            "approval decision recorded"
        );
        Ok(TransitionView::with_summary(&record, summary))
    }

    pub async fn approve_booking(&self, payload: &Value) -> Result<TransitionView> {
        let now = self.clock.now();
        self.decide(payload, |record, cmd| {
            record.approve(&cmd.employee, &cmd.selected_items, now)
        })
        .await
    }

    pub async fn decline_booking(&self, payload: &Value) -> Result<TransitionView> {
        let now = self.clock.now();
        self.decide(payload, |record, cmd| {
            record.decline(&cmd.employee, &cmd.selected_items, now)
        })
        .await
    }

    /// Applies mutable field changes. Immutable keys are rejected before
    /// anything else is looked at.
    pub async fn update_request_booking(&self, payload: &Value) -> Result<RequestBooking> {
        if let Some(fields) = payload.as_object()
            && let Some(key) = schemas::IMMUTABLE_REQUEST_FIELDS
                .iter()
                .find(|k| fields.contains_key(**k))
        {
            return Err(WorkflowError::validation(format!(
                "{key} cannot be modified after creation"
            )));
        }

        let validated = validate(payload, &schemas::UPDATE_REQUEST)?;
        let target: RequestRef = validated.parse()?;
        let mut update: RequestUpdate = validated.parse()?;
        if update.is_empty() {
            return Err(WorkflowError::validation("No updatable fields provided"));
        }
        if let Some(hotels) = update.hotel_details.as_mut() {
            default_room_currency(hotels, &self.config.default_currency);
        }

        let _guard = self.locks.lock(&request_key(&target.request_booking_id)).await?;
        let mut record = self.load_request(&target.request_booking_id).await?;
        record.apply_update(update)?;
        self.requests.store(record.clone()).await?;
        info!(request_booking_id = %record.request_booking_id, "request booking updated");
        Ok(record)
    }

    pub async fn create_payment_url(&self, payload: &Value) -> Result<PaymentLink> {
        let cmd: CreatePayment = validate(payload, &schemas::CREATE_PAYMENT)?.parse()?;
        let _guard = self.locks.lock(&request_key(&cmd.request_booking_id)).await?;
        let mut record = self.load_request(&cmd.request_booking_id).await?;

        let payment = self
            .payments
            .create_payment_url(&mut record, cmd.mode, &self.config.default_currency)
            .await?;
        self.requests.store(record).await?;
        Ok(PaymentLink::from_payment(payment))
    }

    /// Reconciles a signed gateway callback into the request booking.
    pub async fn payment_callback(&self, payload: &Value) -> Result<CallbackReceipt> {
        let cmd: PaymentCallback = validate(payload, &schemas::PAYMENT_CALLBACK)?.parse()?;
        self.payments
            .verify(&cmd.payment_id, cmd.status, &cmd.signature)?;

        let request_booking_id = self
            .payments
            .find_payment(&cmd.payment_id)
            .await?
            .request_booking_id;
        let _guard = self.locks.lock(&request_key(&request_booking_id)).await?;
        let payment = self.payments.find_payment(&cmd.payment_id).await?;
        let mut record = self.load_request(&request_booking_id).await?;

        let outcome = self
            .payments
            .apply_callback(&mut record, payment, cmd.status)
            .await?;
        if outcome == CallbackOutcome::Applied {
            self.requests.store(record.clone()).await?;
        } else {
            debug!(payment_id = %cmd.payment_id, "callback left request booking unchanged");
        }
        Ok(CallbackReceipt {
            payment_id: cmd.payment_id,
            request_booking_id,
            payment_status: cmd.status,
            request_status: record.status,
            outcome,
        })
    }

    /// Administrative closure after a successful payment.
    pub async fn close_request_booking(&self, payload: &Value) -> Result<TransitionView> {
        let cmd: CloseRequest = validate(payload, &schemas::CLOSE_REQUEST)?.parse()?;
        if let Some(booking_id) = cmd.booking_id.as_deref()
            && self.bookings.find_by_booking_id(booking_id).await?.is_none()
        {
            return Err(WorkflowError::not_found(format!(
                "Booking {booking_id} not found"
            )));
        }

        let _guard = self.locks.lock(&request_key(&cmd.request_booking_id)).await?;
        let mut record = self.load_request(&cmd.request_booking_id).await?;
        record.close(cmd.booking_id)?;
        self.requests.store(record.clone()).await?;
        info!(
            request_booking_id = %record.request_booking_id,
            booking_id = ?record.booking_id,
            "request booking closed"
        );
        Ok(TransitionView::new(&record, 0))
    }
}
