mod common;

use booking_workflow::domain::booking::UpsertOutcome;
use common::*;
use serde_json::{Value, json};

fn booking() -> Value {
    json!({
        "clientReference": "REQ-001",
        "bookingId": "BK-001",
        "hotelConfirmationNo": "HC-001",
        "status": "confirmed",
        "hotel": {"id": "H001"},
        "checkIn": "2025-03-01",
        "checkOut": "2025-03-05",
        "totalPrice": 500,
        "numOfRooms": 2
    })
}

#[tokio::test]
async fn test_resubmission_updates_same_record() {
    let engine = engine();
    let created = engine.confirm_booking(&booking()).await.unwrap();
    assert_eq!(created.outcome, UpsertOutcome::Created);

    let mut update = booking();
    update["bookingId"] = json!("BK-001-UPD");
    let updated = engine.confirm_booking(&update).await.unwrap();
    assert_eq!(updated.outcome, UpsertOutcome::Updated);

    let all = engine.get_all_bookings(&json!({})).await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].client_reference, "REQ-001");
    assert_eq!(all[0].booking_id, "BK-001-UPD");
}

#[tokio::test]
async fn test_hotel_confirmation_number_is_unique() {
    let engine = engine();
    engine.confirm_booking(&booking()).await.unwrap();

    let mut other = booking();
    other["clientReference"] = json!("REQ-002");
    other["bookingId"] = json!("BK-002");
    let err = engine.confirm_booking(&other).await.unwrap_err();
    assert_eq!(err.status_code(), 400);
    assert_eq!(
        err.to_string(),
        "hotelConfirmationNo HC-001 already exists for clientReference REQ-001"
    );
}

#[tokio::test]
async fn test_field_rules() {
    let engine = engine();
    let cases = [
        ("checkOut", json!("2025-03-01"), "checkOut must be after checkIn"),
        ("checkOut", json!("2025-02-01"), "checkOut must be after checkIn"),
        ("totalPrice", json!(-1), "totalPrice cannot be negative"),
        ("numOfRooms", json!(0), "numOfRooms must be greater than 0"),
        ("checkIn", json!("03/01/2025"), "checkIn must be a valid date in YYYY-MM-DD format"),
        ("status", json!("maybe"), "Invalid status. Must be one of: confirmed, cancelled, pending, completed"),
    ];
    for (key, value, message) in cases {
        let mut payload = booking();
        payload[key] = value;
        let err = engine.confirm_booking(&payload).await.unwrap_err();
        assert_eq!(err.status_code(), 400, "{key}");
        assert_eq!(err.to_string(), message);
    }
    assert!(engine.get_all_bookings(&json!({})).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_missing_fields_reported_first() {
    let engine = engine();
    let mut payload = booking();
    payload.as_object_mut().unwrap().remove("hotelConfirmationNo");
    payload["numOfRooms"] = json!(0);
    let err = engine.confirm_booking(&payload).await.unwrap_err();
    assert_eq!(err.to_string(), "hotelConfirmationNo is required");
}

#[tokio::test]
async fn test_numeric_strings_are_accepted() {
    let engine = engine();
    let mut payload = booking();
    payload["totalPrice"] = json!("499.99");
    payload["numOfRooms"] = json!("2");
    let receipt = engine.confirm_booking(&payload).await.unwrap();
    assert_eq!(receipt.booking.num_of_rooms, 2);
    assert_eq!(
        receipt.booking.total_price.value(),
        rust_decimal_macros::dec!(499.99)
    );
}

#[tokio::test]
async fn test_listing_filters() {
    let engine = engine();
    let mut first = booking();
    first["employee"] = json!("EMP001");
    engine.confirm_booking(&first).await.unwrap();

    let mut second = booking();
    second["clientReference"] = json!("REQ-002");
    second["bookingId"] = json!("BK-002");
    second["hotelConfirmationNo"] = json!("HC-002");
    second["status"] = json!("cancelled");
    engine.confirm_booking(&second).await.unwrap();

    let rows = engine
        .get_all_bookings(&json!({"employee": "EMP001"}))
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].booking_id, "BK-001");

    let rows = engine
        .get_all_bookings(&json!({"booking_status": "cancelled"}))
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].client_reference, "REQ-002");

    let err = engine
        .get_all_bookings(&json!({"booking_status": "lost"}))
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 400);
}

#[tokio::test]
async fn test_unknown_employee_is_not_found() {
    let engine = engine();
    let mut payload = booking();
    payload["employee"] = json!("GHOST");
    let err = engine.confirm_booking(&payload).await.unwrap_err();
    assert_eq!(err.status_code(), 404);
    assert_eq!(err.to_string(), "Employee GHOST not found");
}
