#![allow(dead_code)]

use booking_workflow::application::engine::{BookingEngine, EnginePorts};
use booking_workflow::application::payments::sign_callback;
use booking_workflow::config::EngineConfig;
use booking_workflow::domain::directory::{Employee, Hotel, Role};
use booking_workflow::domain::payment::PaymentStatus;
use booking_workflow::infrastructure::authority::RoleBasedAuthority;
use booking_workflow::infrastructure::checkout::HostedCheckoutGateway;
use booking_workflow::infrastructure::clock::FixedClock;
use booking_workflow::infrastructure::in_memory::{
    InMemoryBookingStore, InMemoryDirectory, InMemoryPaymentStore, InMemoryRequestBookingStore,
};
use chrono::NaiveDate;
use serde_json::{Value, json};

pub const SECRET: &str = "test-webhook-secret";

pub fn employee(id: &str, company: &str, role: Role) -> Employee {
    Employee {
        id: id.to_string(),
        name: format!("Employee {id}"),
        company: company.to_string(),
        email: Some(format!("{}@example.com", id.to_lowercase())),
        role,
    }
}

pub fn directory() -> InMemoryDirectory {
    InMemoryDirectory::new()
        .with_employee(employee("EMP001", "ACME", Role::Traveler))
        .with_employee(employee("EMP002", "ACME", Role::Traveler))
        .with_employee(employee("MGR001", "ACME", Role::Approver))
        .with_employee(employee("MGR900", "GLOBEX", Role::Approver))
        .with_employee(employee("AGT001", "ACME", Role::Agent))
        .with_hotel(Hotel {
            id: "H001".to_string(),
            name: "Harbour View".to_string(),
            city_code: Some("SIN".to_string()),
        })
}

pub fn config() -> EngineConfig {
    EngineConfig::default().with_webhook_secret(SECRET)
}

pub fn engine_with(config: EngineConfig) -> BookingEngine {
    BookingEngine::new(
        EnginePorts {
            bookings: Box::new(InMemoryBookingStore::new()),
            requests: Box::new(InMemoryRequestBookingStore::new()),
            payments: Box::new(InMemoryPaymentStore::new()),
            directory: Box::new(directory()),
            authority: Box::new(RoleBasedAuthority),
            gateway: Box::new(HostedCheckoutGateway::new(&config.checkout_base_url)),
            clock: Box::new(FixedClock::on(today())),
        },
        config,
    )
}

pub fn engine() -> BookingEngine {
    engine_with(config())
}

pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
}

pub fn signature(payment_id: &str, status: PaymentStatus) -> String {
    sign_callback(SECRET, payment_id, status).unwrap()
}

/// Request for EMP001 with hotel H1 (R1 100, R2 150) and H2 (R3 80).
pub fn request_payload() -> Value {
    json!({
        "employee": "EMP001",
        "check_in": "2025-03-01",
        "check_out": "2025-03-05",
        "destination": "Singapore",
        "hotel_details": [
            {
                "hotel_id": "H1",
                "hotel_name": "Harbour View",
                "rooms": [
                    {"room_id": "R1", "price": 100},
                    {"room_id": "R2", "price": 150}
                ]
            },
            {
                "hotel_id": "H2",
                "rooms": [{"room_id": "R3", "price": 80}]
            }
        ]
    })
}

pub fn items(hotel_id: &str, room_ids: &[&str]) -> Value {
    json!([{"hotel_id": hotel_id, "room_ids": room_ids}])
}

/// Stores the standard request and sends every room for approval.
pub async fn sent_request(engine: &BookingEngine) -> String {
    let record = engine.store_req_booking(&request_payload()).await.unwrap();
    let id = record.request_booking_id;
    engine
        .send_for_approval(&json!({
            "request_booking_id": id,
            "selected_items": [
                {"hotel_id": "H1", "room_ids": ["R1", "R2"]},
                {"hotel_id": "H2", "room_ids": ["R3"]}
            ]
        }))
        .await
        .unwrap();
    id
}

/// Sends every room for approval and approves `R1` only.
pub async fn approved_request(engine: &BookingEngine) -> String {
    let id = sent_request(engine).await;
    engine
        .approve_booking(&json!({
            "request_booking_id": id,
            "employee": "MGR001",
            "selected_items": items("H1", &["R1"])
        }))
        .await
        .unwrap();
    id
}
