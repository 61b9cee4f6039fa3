use super::money::Price;
use super::payment::PaymentStatus;
use crate::error::{Result, WorkflowError};
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Aggregate lifecycle of a request booking.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Hash)]
pub enum RequestStatus {
    #[serde(rename = "req_pending")]
    Pending,
    #[serde(rename = "req_send_for_approval", alias = "req_sent_for_approval")]
    SentForApproval,
    #[serde(rename = "req_approved")]
    Approved,
    #[serde(rename = "req_payment_pending")]
    PaymentPending,
    #[serde(rename = "req_payment_success")]
    PaymentSuccess,
    #[serde(rename = "req_closed")]
    Closed,
    #[serde(rename = "req_declined")]
    Declined,
}

impl RequestStatus {
    pub const ALL: [&'static str; 7] = [
        "req_pending",
        "req_send_for_approval",
        "req_approved",
        "req_payment_pending",
        "req_payment_success",
        "req_closed",
        "req_declined",
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "req_pending",
            Self::SentForApproval => "req_send_for_approval",
            Self::Approved => "req_approved",
            Self::PaymentPending => "req_payment_pending",
            Self::PaymentSuccess => "req_payment_success",
            Self::Closed => "req_closed",
            Self::Declined => "req_declined",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Closed | Self::Declined)
    }

    /// Whether an approval decision has already been made and accepted.
    pub fn is_past_approval(&self) -> bool {
        matches!(
            self,
            Self::Approved | Self::PaymentPending | Self::PaymentSuccess | Self::Closed
        )
    }

    /// Short display name and numeric code used by listing views.
    pub fn display(&self) -> (&'static str, u8) {
        match self {
            Self::Pending => ("pending_in_cart", 0),
            Self::SentForApproval => ("sent_for_approval", 1),
            Self::Approved => ("approved", 2),
            Self::PaymentPending => ("payment_pending", 3),
            Self::PaymentSuccess => ("payment_success", 4),
            Self::Closed => ("closed", 5),
            Self::Declined => ("declined", 6),
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "req_pending" => Ok(Self::Pending),
            "req_send_for_approval" | "req_sent_for_approval" => Ok(Self::SentForApproval),
            "req_approved" => Ok(Self::Approved),
            "req_payment_pending" => Ok(Self::PaymentPending),
            "req_payment_success" => Ok(Self::PaymentSuccess),
            "req_closed" => Ok(Self::Closed),
            "req_declined" => Ok(Self::Declined),
            other => Err(format!("unknown request status: {other}")),
        }
    }
}

/// Per-room outcome; the aggregate `RequestStatus` is derived from these.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "snake_case")]
pub enum RoomStatus {
    #[default]
    Pending,
    SentForApproval,
    Approved,
    Declined,
    PaymentPending,
    PaymentSuccess,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct RoomOption {
    pub room_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_rate_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_name: Option<String>,
    pub price: Price,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_price: Option<Price>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax: Option<Price>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default)]
    pub status: RoomStatus,
}

impl RoomOption {
    /// Amount this room contributes to a payment.
    pub fn payable(&self) -> Price {
        self.total_price.unwrap_or(self.price)
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct HotelOption {
    pub hotel_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hotel_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meal_plan: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancellation_policy: Option<String>,
    #[serde(default)]
    pub rooms: Vec<RoomOption>,
}

/// A reference to rooms of one offered hotel.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct SelectedItem {
    pub hotel_id: String,
    pub room_ids: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Approved,
    Declined,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct ItemDecision {
    pub hotel_id: String,
    pub room_id: String,
    pub outcome: Outcome,
    pub decided_by: String,
    pub decided_at: DateTime<Utc>,
}

/// Counts reported back by an approval pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct DecisionSummary {
    pub approved_count: usize,
    pub declined_count: usize,
}

/// Mutable fields of a request booking.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RequestUpdate {
    pub company: Option<String>,
    pub employee_email: Option<String>,
    pub agent: Option<String>,
    pub occupancy: Option<u32>,
    pub adult_count: Option<u32>,
    pub child_count: Option<u32>,
    pub child_ages: Option<Vec<u32>>,
    pub room_count: Option<u32>,
    pub destination_code: Option<String>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub hotel_details: Option<Vec<HotelOption>>,
}

/// An employee-initiated travel request awaiting hotel selection and approval.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct RequestBooking {
    pub request_booking_id: String,
    pub employee: String,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub employee_email: Option<String>,
    #[serde(default)]
    pub agent: Option<String>,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
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
    #[serde(default)]
    pub hotels: Vec<HotelOption>,
    pub status: RequestStatus,
    #[serde(default)]
    pub decisions: Vec<ItemDecision>,
    #[serde(default)]
    pub payment_ids: Vec<String>,
    #[serde(default)]
    pub booking_id: Option<String>,
}

fn ordinal_suffix(day: u32) -> &'static str {
    if (11..=13).contains(&day) {
        return "th";
    }
    match day % 10 {
        1 => "st",
        2 => "nd",
        3 => "rd",
        _ => "th",
    }
}

/// Renders a date as `30th_Jan_2026`.
pub fn format_ordinal_date(date: NaiveDate) -> String {
    format!(
        "{}{}_{}_{}",
        date.day(),
        ordinal_suffix(date.day()),
        date.format("%b"),
        date.year()
    )
}

/// Accepts either a single hotel object or an array of hotels.
pub fn one_or_many<'de, D>(deserializer: D) -> std::result::Result<Option<Vec<HotelOption>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(HotelOption),
        Many(Vec<HotelOption>),
    }

    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        None => None,
        Some(OneOrMany::One(hotel)) => Some(vec![hotel]),
        Some(OneOrMany::Many(hotels)) => Some(hotels),
    })
}

fn reset_room_statuses(hotels: &mut [HotelOption]) {
    for room in hotels.iter_mut().flat_map(|h| h.rooms.iter_mut()) {
        room.status = RoomStatus::Pending;
    }
}

/// A declined room stays declined when its hotel is replaced.
fn carry_declines(previous: &[RoomOption], rooms: &mut [RoomOption]) {
    for room in rooms.iter_mut() {
        let declined = previous
            .iter()
            .any(|old| old.room_id == room.room_id && old.status == RoomStatus::Declined);
        if declined {
            room.status = RoomStatus::Declined;
        }
    }
}

impl RequestUpdate {
    pub fn is_empty(&self) -> bool {
        self.company.is_none()
            && self.employee_email.is_none()
            && self.agent.is_none()
            && self.occupancy.is_none()
            && self.adult_count.is_none()
            && self.child_count.is_none()
            && self.child_ages.is_none()
            && self.room_count.is_none()
            && self.destination_code.is_none()
            && self.hotel_details.is_none()
    }
}

impl RequestBooking {
    pub fn generate_id(employee_id: &str, check_in: NaiveDate, check_out: NaiveDate) -> String {
        format!(
            "{}_{}-{}",
            employee_id,
            format_ordinal_date(check_in),
            format_ordinal_date(check_out)
        )
    }

    pub fn new(employee: String, check_in: NaiveDate, check_out: NaiveDate) -> Self {
        Self {
            request_booking_id: Self::generate_id(&employee, check_in, check_out),
            employee,
            company: None,
            employee_email: None,
            agent: None,
            check_in,
            check_out,
            occupancy: None,
            adult_count: None,
            child_count: None,
            child_ages: None,
            room_count: None,
            destination: None,
            destination_code: None,
            hotels: Vec::new(),
            status: RequestStatus::Pending,
            decisions: Vec::new(),
            payment_ids: Vec::new(),
            booking_id: None,
        }
    }

    pub fn with_hotels(mut self, mut hotels: Vec<HotelOption>) -> Self {
        reset_room_statuses(&mut hotels);
        self.hotels = hotels;
        self
    }

    pub fn rooms(&self) -> impl Iterator<Item = (&HotelOption, &RoomOption)> {
        self.hotels
            .iter()
            .flat_map(|h| h.rooms.iter().map(move |r| (h, r)))
    }

    fn rooms_with(&self, status: RoomStatus) -> impl Iterator<Item = (&HotelOption, &RoomOption)> {
        self.rooms().filter(move |(_, r)| r.status == status)
    }

    pub fn has_rooms_with(&self, status: RoomStatus) -> bool {
        self.rooms_with(status).next().is_some()
    }

    /// Resolves selected items to `(hotel_index, room_index)` pairs within this
    /// request's own hotel details.
    fn resolve(&self, items: &[SelectedItem]) -> Result<Vec<(usize, usize)>> {
        let mut refs = Vec::new();
        for item in items {
            let (h, hotel) = self
                .hotels
                .iter()
                .enumerate()
                .find(|(_, h)| h.hotel_id == item.hotel_id)
                .ok_or_else(|| {
                    WorkflowError::not_found(format!(
                        "Hotel {} not found in request booking {}",
                        item.hotel_id, self.request_booking_id
                    ))
                })?;
            for room_id in &item.room_ids {
                let r = hotel
                    .rooms
                    .iter()
                    .position(|r| &r.room_id == room_id || r.room_rate_id.as_ref() == Some(room_id))
                    .ok_or_else(|| {
                        WorkflowError::not_found(format!(
                            "Room {} not found in hotel {}",
                            room_id, item.hotel_id
                        ))
                    })?;
                if !refs.contains(&(h, r)) {
                    refs.push((h, r));
                }
            }
        }
        Ok(refs)
    }

    fn require_status(&self, status: RoomStatus, refs: &[(usize, usize)]) -> Result<()> {
        for &(h, r) in refs {
            let room = &self.hotels[h].rooms[r];
            if room.status != status {
                let expected = match status {
                    RoomStatus::SentForApproval => "awaiting approval",
                    _ => "pending",
                };
                return Err(WorkflowError::conflict(format!(
                    "Room {} of hotel {} is not {}",
                    room.room_id, self.hotels[h].hotel_id, expected
                )));
            }
        }
        Ok(())
    }

    fn decide(&mut self, h: usize, r: usize, outcome: Outcome, by: &str, at: DateTime<Utc>) {
        let hotel = &mut self.hotels[h];
        let room = &mut hotel.rooms[r];
        room.status = match outcome {
            Outcome::Approved => RoomStatus::Approved,
            Outcome::Declined => RoomStatus::Declined,
        };
        self.decisions.push(ItemDecision {
            hotel_id: hotel.hotel_id.clone(),
            room_id: room.room_id.clone(),
            outcome,
            decided_by: by.to_string(),
            decided_at: at,
        });
    }

    /// Derives the aggregate status from room outcomes. `req_closed` is sticky.
    pub fn refresh_status(&mut self) {
        if self.status == RequestStatus::Closed {
            return;
        }
        let priority = [
            (RoomStatus::PaymentSuccess, RequestStatus::PaymentSuccess),
            (RoomStatus::PaymentPending, RequestStatus::PaymentPending),
            (RoomStatus::Approved, RequestStatus::Approved),
            (RoomStatus::SentForApproval, RequestStatus::SentForApproval),
        ];
        self.status = priority
            .iter()
            .find(|(room, _)| self.has_rooms_with(*room))
            .map(|(_, req)| *req)
            .unwrap_or_else(|| {
                let mut rooms = self.rooms().peekable();
                if rooms.peek().is_some() && rooms.all(|(_, r)| r.status == RoomStatus::Declined) {
                    RequestStatus::Declined
                } else {
                    RequestStatus::Pending
                }
            });
    }

    /// Offers the selected rooms to an approver. Valid only from `req_pending`,
    /// and only for rooms that have not been decided yet.
    pub fn send_for_approval(&mut self, items: &[SelectedItem]) -> Result<usize> {
        if self.status != RequestStatus::Pending {
            return Err(WorkflowError::invalid_transition(
                "Booking not in pending state",
            ));
        }
        let refs = self.resolve(items)?;
        self.require_status(RoomStatus::Pending, &refs)?;
        for &(h, r) in &refs {
            self.hotels[h].rooms[r].status = RoomStatus::SentForApproval;
        }
        self.refresh_status();
        Ok(refs.len())
    }

    /// Approves the selected rooms. Other rooms of the selected hotels that are
    /// still awaiting a decision are declined in the same pass; rooms of hotels
    /// not named in the selection are left for a later decision.
    pub fn approve(
        &mut self,
        approver: &str,
        items: &[SelectedItem],
        at: DateTime<Utc>,
    ) -> Result<DecisionSummary> {
        if self.status.is_past_approval() {
            return Err(WorkflowError::AlreadyApproved(
                "Booking already approved".to_string(),
            ));
        }
        if self.status != RequestStatus::SentForApproval {
            return Err(WorkflowError::invalid_transition(
                "Booking not in approval pending state",
            ));
        }
        let refs = self.resolve(items)?;
        self.require_status(RoomStatus::SentForApproval, &refs)?;

        let mut summary = DecisionSummary::default();
        for &(h, r) in &refs {
            self.decide(h, r, Outcome::Approved, approver, at);
            summary.approved_count += 1;
        }
        let leftovers: Vec<(usize, usize)> = self
            .hotels
            .iter()
            .enumerate()
            .filter(|(_, hotel)| items.iter().any(|item| item.hotel_id == hotel.hotel_id))
            .flat_map(|(h, hotel)| {
                hotel
                    .rooms
                    .iter()
                    .enumerate()
                    .filter(|(_, room)| room.status == RoomStatus::SentForApproval)
                    .map(move |(r, _)| (h, r))
            })
            .collect();
        for (h, r) in leftovers {
            self.decide(h, r, Outcome::Declined, approver, at);
            summary.declined_count += 1;
        }
        self.refresh_status();
        Ok(summary)
    }

    /// Declines the selected rooms only; other rooms keep their state.
    pub fn decline(
        &mut self,
        approver: &str,
        items: &[SelectedItem],
        at: DateTime<Utc>,
    ) -> Result<DecisionSummary> {
        if self.status != RequestStatus::SentForApproval {
            return Err(WorkflowError::invalid_transition(
                "Booking not in approval pending state",
            ));
        }
        let refs = self.resolve(items)?;
        self.require_status(RoomStatus::SentForApproval, &refs)?;
        for &(h, r) in &refs {
            self.decide(h, r, Outcome::Declined, approver, at);
        }
        self.refresh_status();
        Ok(DecisionSummary {
            approved_count: 0,
            declined_count: refs.len(),
        })
    }

    /// Applies mutable field changes. Only allowed before approval; hotel
    /// details may only change while nothing has been offered yet.
    pub fn apply_update(&mut self, update: RequestUpdate) -> Result<()> {
        if !matches!(
            self.status,
            RequestStatus::Pending | RequestStatus::SentForApproval
        ) {
            return Err(WorkflowError::invalid_transition(format!(
                "Request booking cannot be modified in state {}",
                self.status
            )));
        }
        if update.hotel_details.is_some() && self.status != RequestStatus::Pending {
            return Err(WorkflowError::conflict(
                "hotel_details can only be changed while the request is pending",
            ));
        }

        if let Some(company) = update.company {
            self.company = Some(company);
        }
        if let Some(email) = update.employee_email {
            self.employee_email = Some(email);
        }
        if let Some(agent) = update.agent {
            self.agent = Some(agent);
        }
        if let Some(occupancy) = update.occupancy {
            self.occupancy = Some(occupancy);
        }
        if let Some(adults) = update.adult_count {
            self.adult_count = Some(adults);
        }
        if let Some(children) = update.child_count {
            self.child_count = Some(children);
        }
        if let Some(ages) = update.child_ages {
            self.child_ages = Some(ages);
        }
        if let Some(rooms) = update.room_count {
            self.room_count = Some(rooms);
        }
        if let Some(code) = update.destination_code {
            self.destination_code = Some(code);
        }
        if let Some(mut hotels) = update.hotel_details {
            reset_room_statuses(&mut hotels);
            for hotel in hotels {
                match self.hotels.iter_mut().find(|h| h.hotel_id == hotel.hotel_id) {
                    Some(existing) => {
                        let mut hotel = hotel;
                        carry_declines(&existing.rooms, &mut hotel.rooms);
                        *existing = hotel;
                    }
                    None => self.hotels.push(hotel),
                }
            }
            self.refresh_status();
        }
        Ok(())
    }

    /// Sum of the approved rooms and the currency of the first one.
    pub fn approved_total(&self) -> (Price, Option<String>) {
        let total: Price = self
            .rooms_with(RoomStatus::Approved)
            .map(|(_, r)| r.payable())
            .sum();
        let currency = self
            .rooms_with(RoomStatus::Approved)
            .find_map(|(_, r)| r.currency.clone());
        (total, currency)
    }

    /// Checks that a payment may be started for the approved rooms.
    pub fn ensure_payable(&self) -> Result<()> {
        match self.status {
            RequestStatus::Approved => Ok(()),
            RequestStatus::PaymentPending => Err(WorkflowError::conflict(
                "An active payment already exists for this request booking",
            )),
            _ if !self.has_rooms_with(RoomStatus::Approved) => Err(
                WorkflowError::invalid_transition("No approved rooms to pay for"),
            ),
            other => Err(WorkflowError::invalid_transition(format!(
                "Cannot create a payment in state {other}"
            ))),
        }
    }

    /// Moves approved rooms into payment and remembers the attempt.
    pub fn begin_payment(&mut self, payment_id: String) -> Result<()> {
        self.ensure_payable()?;
        for room in self.hotels.iter_mut().flat_map(|h| h.rooms.iter_mut()) {
            if room.status == RoomStatus::Approved {
                room.status = RoomStatus::PaymentPending;
            }
        }
        self.payment_ids.push(payment_id);
        self.refresh_status();
        Ok(())
    }

    /// Applies a terminal payment result. Failures and cancellations hand the
    /// rooms back to `approved` so payment can be retried.
    pub fn settle_payment(&mut self, status: PaymentStatus) {
        let (from, to) = match status {
            PaymentStatus::Success => (RoomStatus::PaymentPending, RoomStatus::PaymentSuccess),
            PaymentStatus::Failure | PaymentStatus::Cancel => {
                (RoomStatus::PaymentPending, RoomStatus::Approved)
            }
            PaymentStatus::Initiated => return,
        };
        for room in self.hotels.iter_mut().flat_map(|h| h.rooms.iter_mut()) {
            if room.status == from {
                room.status = to;
            }
        }
        self.refresh_status();
    }

    /// Administrative closure after a successful payment.
    pub fn close(&mut self, booking_id: Option<String>) -> Result<()> {
        if self.status != RequestStatus::PaymentSuccess {
            return Err(WorkflowError::invalid_transition(
                "Request booking can only be closed after a successful payment",
            ));
        }
        if booking_id.is_some() {
            self.booking_id = booking_id;
        }
        self.status = RequestStatus::Closed;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn room(id: &str, price: rust_decimal::Decimal) -> RoomOption {
        RoomOption {
            room_id: id.to_string(),
            room_rate_id: None,
            room_name: None,
            price: Price::new(price).unwrap(),
            total_price: None,
            tax: None,
            currency: Some("SGD".to_string()),
            status: RoomStatus::Pending,
        }
    }

    fn hotel(id: &str, rooms: Vec<RoomOption>) -> HotelOption {
        HotelOption {
            hotel_id: id.to_string(),
            hotel_name: None,
            supplier: None,
            meal_plan: None,
            cancellation_policy: None,
            rooms,
        }
    }

    fn request() -> RequestBooking {
        RequestBooking::new(
            "EMP001".to_string(),
            NaiveDate::from_ymd_opt(2030, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2030, 3, 5).unwrap(),
        )
        .with_hotels(vec![
            hotel("H1", vec![room("R1", dec!(100)), room("R2", dec!(150))]),
            hotel("H2", vec![room("R3", dec!(80))]),
        ])
    }

    fn item(hotel_id: &str, rooms: &[&str]) -> SelectedItem {
        SelectedItem {
            hotel_id: hotel_id.to_string(),
            room_ids: rooms.iter().map(|r| r.to_string()).collect(),
        }
    }

    #[test]
    fn test_generate_id_uses_ordinal_dates() {
        let id = RequestBooking::generate_id(
            "emp001",
            NaiveDate::from_ymd_opt(2026, 1, 30).unwrap(),
            NaiveDate::from_ymd_opt(2026, 1, 31).unwrap(),
        );
        assert_eq!(id, "emp001_30th_Jan_2026-31st_Jan_2026");
    }

    #[test]
    fn test_ordinal_suffix_teens() {
        assert_eq!(ordinal_suffix(1), "st");
        assert_eq!(ordinal_suffix(2), "nd");
        assert_eq!(ordinal_suffix(3), "rd");
        assert_eq!(ordinal_suffix(11), "th");
        assert_eq!(ordinal_suffix(12), "th");
        assert_eq!(ordinal_suffix(13), "th");
        assert_eq!(ordinal_suffix(22), "nd");
    }

    #[test]
    fn test_send_for_approval_moves_to_sent() {
        let mut rb = request();
        let count = rb.send_for_approval(&[item("H1", &["R1", "R2"])]).unwrap();
        assert_eq!(count, 2);
        assert_eq!(rb.status, RequestStatus::SentForApproval);
    }

    #[test]
    fn test_send_for_approval_rejects_unknown_refs() {
        let mut rb = request();
        let err = rb.send_for_approval(&[item("H9", &["R1"])]).unwrap_err();
        assert!(matches!(err, WorkflowError::NotFound(_)));

        let err = rb.send_for_approval(&[item("H1", &["R3"])]).unwrap_err();
        assert_eq!(err.to_string(), "Room R3 not found in hotel H1");
        assert_eq!(rb.status, RequestStatus::Pending);
    }

    #[test]
    fn test_send_for_approval_only_from_pending() {
        let mut rb = request();
        rb.send_for_approval(&[item("H1", &["R1"])]).unwrap();
        let err = rb.send_for_approval(&[item("H1", &["R2"])]).unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidTransition(_)));
    }

    #[test]
    fn test_partial_approval_declines_leftovers() {
        let mut rb = request();
        rb.send_for_approval(&[item("H1", &["R1", "R2"]), item("H2", &["R3"])])
            .unwrap();

        let summary = rb.approve("MGR", &[item("H1", &["R1"])], Utc::now()).unwrap();
        assert_eq!(summary.approved_count, 1);
        assert_eq!(summary.declined_count, 1);
        assert_eq!(rb.status, RequestStatus::Approved);
        assert_eq!(rb.decisions.len(), 2);
        assert_eq!(rb.hotels[0].rooms[1].status, RoomStatus::Declined);
        // H2 was not part of the selection, so R3 keeps waiting.
        assert_eq!(rb.hotels[1].rooms[0].status, RoomStatus::SentForApproval);

        let (total, currency) = rb.approved_total();
        assert_eq!(total.value(), dec!(100));
        assert_eq!(currency.as_deref(), Some("SGD"));
    }

    #[test]
    fn test_approve_twice_is_already_approved() {
        let mut rb = request();
        rb.send_for_approval(&[item("H1", &["R1"])]).unwrap();
        rb.approve("MGR", &[item("H1", &["R1"])], Utc::now()).unwrap();

        let err = rb
            .approve("MGR", &[item("H1", &["R1"])], Utc::now())
            .unwrap_err();
        assert!(matches!(err, WorkflowError::AlreadyApproved(_)));
    }

    #[test]
    fn test_approve_requires_sent_state() {
        let mut rb = request();
        let err = rb
            .approve("MGR", &[item("H1", &["R1"])], Utc::now())
            .unwrap_err();
        assert_eq!(err.to_string(), "Booking not in approval pending state");
    }

    #[test]
    fn test_decline_is_final_only_for_subset() {
        let mut rb = request();
        rb.send_for_approval(&[item("H1", &["R1", "R2"])]).unwrap();

        rb.decline("MGR", &[item("H1", &["R1"])], Utc::now()).unwrap();
        assert_eq!(rb.status, RequestStatus::SentForApproval);

        // R2 is still open for a later approval pass.
        rb.approve("MGR", &[item("H1", &["R2"])], Utc::now()).unwrap();
        assert_eq!(rb.status, RequestStatus::Approved);

        // A declined room can not be revived.
        let err = rb.approve("MGR", &[item("H1", &["R1"])], Utc::now());
        assert!(err.is_err());
    }

    #[test]
    fn test_declining_everything_offered_reaches_declined() {
        let mut rb = RequestBooking::new(
            "EMP001".to_string(),
            NaiveDate::from_ymd_opt(2030, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2030, 3, 5).unwrap(),
        )
        .with_hotels(vec![hotel("H1", vec![room("R1", dec!(10))])]);
        rb.send_for_approval(&[item("H1", &["R1"])]).unwrap();
        rb.decline("MGR", &[item("H1", &["R1"])], Utc::now()).unwrap();
        assert_eq!(rb.status, RequestStatus::Declined);
        assert!(rb.status.is_terminal());

        let err = rb.decline("MGR", &[item("H1", &["R1"])], Utc::now()).unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidTransition(_)));
    }

    #[test]
    fn test_payment_lifecycle_and_retry() {
        let mut rb = request();
        assert!(rb.ensure_payable().is_err());

        rb.send_for_approval(&[item("H1", &["R1"])]).unwrap();
        rb.approve("MGR", &[item("H1", &["R1"])], Utc::now()).unwrap();
        rb.begin_payment("PAY-1".to_string()).unwrap();
        assert_eq!(rb.status, RequestStatus::PaymentPending);
        assert!(matches!(
            rb.begin_payment("PAY-2".to_string()),
            Err(WorkflowError::Conflict(_))
        ));

        rb.settle_payment(PaymentStatus::Failure);
        assert_eq!(rb.status, RequestStatus::Approved);

        rb.begin_payment("PAY-2".to_string()).unwrap();
        rb.settle_payment(PaymentStatus::Success);
        assert_eq!(rb.status, RequestStatus::PaymentSuccess);
        assert_eq!(rb.payment_ids, vec!["PAY-1", "PAY-2"]);

        rb.close(Some("BK-9".to_string())).unwrap();
        assert_eq!(rb.status, RequestStatus::Closed);
        rb.refresh_status();
        assert_eq!(rb.status, RequestStatus::Closed);
    }

    #[test]
    fn test_update_blocked_after_approval() {
        let mut rb = request();
        rb.apply_update(RequestUpdate {
            room_count: Some(2),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(rb.room_count, Some(2));

        rb.send_for_approval(&[item("H1", &["R1"])]).unwrap();
        let err = rb
            .apply_update(RequestUpdate {
                hotel_details: Some(vec![hotel("H3", vec![room("R9", dec!(1))])]),
                ..Default::default()
            })
            .unwrap_err();
        assert!(matches!(err, WorkflowError::Conflict(_)));

        rb.approve("MGR", &[item("H1", &["R1"])], Utc::now()).unwrap();
        let err = rb
            .apply_update(RequestUpdate {
                occupancy: Some(3),
                ..Default::default()
            })
            .unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidTransition(_)));
    }

    #[test]
    fn test_declined_room_cannot_be_offered_again() {
        let mut rb = request();
        rb.send_for_approval(&[item("H1", &["R1"])]).unwrap();
        rb.decline("MGR", &[item("H1", &["R1"])], Utc::now()).unwrap();
        assert_eq!(rb.status, RequestStatus::Pending);

        let err = rb.send_for_approval(&[item("H1", &["R1"])]).unwrap_err();
        assert_eq!(err.to_string(), "Room R1 of hotel H1 is not pending");
        assert_eq!(rb.hotels[0].rooms[0].status, RoomStatus::Declined);

        rb.send_for_approval(&[item("H1", &["R2"])]).unwrap();
        assert_eq!(rb.status, RequestStatus::SentForApproval);
    }

    #[test]
    fn test_replacing_hotel_keeps_declined_rooms() {
        let mut rb = request();
        rb.send_for_approval(&[item("H1", &["R1"])]).unwrap();
        rb.decline("MGR", &[item("H1", &["R1"])], Utc::now()).unwrap();

        rb.apply_update(RequestUpdate {
            hotel_details: Some(vec![hotel(
                "H1",
                vec![room("R1", dec!(90)), room("R7", dec!(120))],
            )]),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(rb.hotels[0].rooms[0].status, RoomStatus::Declined);
        assert_eq!(rb.hotels[0].rooms[1].status, RoomStatus::Pending);
        assert_eq!(rb.status, RequestStatus::Pending);

        let err = rb.send_for_approval(&[item("H1", &["R1"])]).unwrap_err();
        assert!(matches!(err, WorkflowError::Conflict(_)));
    }

    #[test]
    fn test_update_merges_hotels_by_id() {
        let mut rb = request();
        rb.apply_update(RequestUpdate {
            hotel_details: Some(vec![
                hotel("H2", vec![room("R4", dec!(90)), room("R5", dec!(95))]),
                hotel("H3", vec![room("R6", dec!(70))]),
            ]),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(rb.hotels.len(), 3);
        assert_eq!(rb.hotels[1].rooms.len(), 2);
        assert_eq!(rb.hotels[2].hotel_id, "H3");
    }

    #[test]
    fn test_status_parses_legacy_alias() {
        assert_eq!(
            "req_sent_for_approval".parse::<RequestStatus>().unwrap(),
            RequestStatus::SentForApproval
        );
        let parsed: RequestStatus = serde_json::from_str("\"req_sent_for_approval\"").unwrap();
        assert_eq!(parsed, RequestStatus::SentForApproval);
        assert_eq!(
            serde_json::to_string(&parsed).unwrap(),
            "\"req_send_for_approval\""
        );
    }

    #[test]
    fn test_hotel_details_accepts_single_object() {
        let update: RequestUpdate = serde_json::from_value(serde_json::json!({
            "hotel_details": {"hotel_id": "H7", "rooms": [{"room_id": "R1", "price": 10}]}
        }))
        .unwrap();
        assert_eq!(update.hotel_details.unwrap()[0].hotel_id, "H7");
    }
}
