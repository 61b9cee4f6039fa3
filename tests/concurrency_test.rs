mod common;

use booking_workflow::domain::request_booking::RequestStatus;
use booking_workflow::error::WorkflowError;
use common::*;
use serde_json::json;
use std::sync::Arc;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_approvals_serialize() {
    let engine = Arc::new(engine());
    let id = sent_request(&engine).await;

    let handles: Vec<_> = ["R1", "R2", "R3", "R1"]
        .into_iter()
        .map(|room| {
            let engine = Arc::clone(&engine);
            let id = id.clone();
            let hotel = if room == "R3" { "H2" } else { "H1" };
            tokio::spawn(async move {
                let result = engine
                    .approve_booking(&json!({
                        "request_booking_id": id,
                        "employee": "MGR001",
                        "selected_items": items(hotel, &[room])
                    }))
                    .await;
                (hotel, result)
            })
        })
        .collect();

    let mut winners = Vec::new();
    for handle in handles {
        match handle.await.unwrap() {
            (hotel, Ok(_)) => winners.push(hotel),
            (_, Err(e)) => assert!(matches!(e, WorkflowError::AlreadyApproved(_))),
        }
    }
    assert_eq!(winners.len(), 1);

    let details = engine
        .get_request_booking_details(&json!({"request_booking_id": id}))
        .await
        .unwrap();
    assert_eq!(details.request.status, RequestStatus::Approved);
    // Only the winning pass decides rooms, and only within its own hotel.
    let expected = if winners[0] == "H1" { 2 } else { 1 };
    assert_eq!(details.request.decisions.len(), expected);
    assert!(details
        .request
        .decisions
        .iter()
        .all(|d| d.hotel_id == winners[0]));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_booking_id_claims_have_one_winner() {
    let engine = Arc::new(engine());

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let engine = Arc::clone(&engine);
            tokio::spawn(async move {
                engine
                    .confirm_booking(&json!({
                        "clientReference": format!("REQ-{i:03}"),
                        "bookingId": "BK-SHARED",
                        "hotelConfirmationNo": format!("HC-{i:03}"),
                        "status": "confirmed",
                        "hotel": {"id": "H001"},
                        "checkIn": "2025-03-01",
                        "checkOut": "2025-03-05",
                        "totalPrice": 500,
                        "numOfRooms": 1
                    }))
                    .await
            })
        })
        .collect();

    let mut winners = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => winners += 1,
            Err(e) => assert!(matches!(e, WorkflowError::Conflict(_))),
        }
    }
    assert_eq!(winners, 1);
    assert_eq!(engine.get_all_bookings(&json!({})).await.unwrap().len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_duplicate_callbacks_apply_once() {
    let engine = Arc::new(engine());
    let id = approved_request(&engine).await;
    let link = engine
        .create_payment_url(&json!({"request_booking_id": id, "mode": "direct_pay"}))
        .await
        .unwrap();
    let payload = json!({
        "payment_id": link.payment_id,
        "status": "success",
        "signature": signature(&link.payment_id, booking_workflow::domain::payment::PaymentStatus::Success)
    });

    let handles: Vec<_> = (0..6)
        .map(|_| {
            let engine = Arc::clone(&engine);
            let payload = payload.clone();
            tokio::spawn(async move { engine.payment_callback(&payload).await })
        })
        .collect();

    let mut applied = 0;
    for handle in handles {
        let receipt = handle.await.unwrap().unwrap();
        if receipt.outcome == booking_workflow::application::payments::CallbackOutcome::Applied {
            applied += 1;
        }
        assert_eq!(receipt.request_status, RequestStatus::PaymentSuccess);
    }
    assert_eq!(applied, 1);
}
