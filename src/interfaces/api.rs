//! Operation dispatch and the response envelope shared by every operation.

use crate::application::engine::BookingEngine;
use crate::application::payments::CallbackOutcome;
use crate::domain::booking::UpsertOutcome;
use crate::error::{ErrorKind, Result, WorkflowError};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    ConfirmBooking,
    GetAllBookings,
    StoreReqBooking,
    GetAllRequestBookings,
    GetRequestBookingDetails,
    SendForApproval,
    ApproveBooking,
    DeclineBooking,
    UpdateRequestBooking,
    CreatePaymentUrl,
    PaymentCallback,
    CloseRequestBooking,
}

impl Operation {
    pub const ALL: [Operation; 12] = [
        Self::ConfirmBooking,
        Self::GetAllBookings,
        Self::StoreReqBooking,
        Self::GetAllRequestBookings,
        Self::GetRequestBookingDetails,
        Self::SendForApproval,
        Self::ApproveBooking,
        Self::DeclineBooking,
        Self::UpdateRequestBooking,
        Self::CreatePaymentUrl,
        Self::PaymentCallback,
        Self::CloseRequestBooking,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::ConfirmBooking => "confirm_booking",
            Self::GetAllBookings => "get_all_bookings",
            Self::StoreReqBooking => "store_req_booking",
            Self::GetAllRequestBookings => "get_all_request_bookings",
            Self::GetRequestBookingDetails => "get_request_booking_details",
            Self::SendForApproval => "send_for_approval",
            Self::ApproveBooking => "approve_booking",
            Self::DeclineBooking => "decline_booking",
            Self::UpdateRequestBooking => "update_request_booking",
            Self::CreatePaymentUrl => "create_payment_url",
            Self::PaymentCallback => "payment_callback",
            Self::CloseRequestBooking => "close_request_booking",
        }
    }

    pub fn from_name(name: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|op| op.name() == name)
            .ok_or_else(|| WorkflowError::validation(format!("Unknown operation: {name}")))
    }
}

/// One request line: `{"operation": "...", "payload": {...}}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiRequest {
    pub operation: String,
    #[serde(default)]
    pub payload: Value,
}

impl ApiRequest {
    pub fn parse(line: &str) -> Result<Self> {
        serde_json::from_str(line)
            .map_err(|e| WorkflowError::validation(format!("Malformed request: {e}")))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiResponse {
    pub status: u16,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<ErrorKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ApiResponse {
    pub fn ok(message: impl Into<String>, data: Value) -> Self {
        Self {
            status: 200,
            success: true,
            message: Some(message.into()),
            error: None,
            kind: None,
            data: Some(data),
        }
    }

    pub fn from_error(err: &WorkflowError) -> Self {
        Self {
            status: err.status_code(),
            success: false,
            message: None,
            error: Some(err.to_string()),
            kind: Some(err.kind()),
            data: None,
        }
    }
}

impl From<Result<ApiResponse>> for ApiResponse {
    fn from(result: Result<ApiResponse>) -> Self {
        match result {
            Ok(response) => response,
            Err(err) => Self::from_error(&err),
        }
    }
}

fn listing<T: Serialize>(key: &str, items: Vec<T>) -> Result<Value> {
    let mut body = serde_json::Map::new();
    body.insert("total_count".to_string(), json!(items.len()));
    body.insert(key.to_string(), serde_json::to_value(items)?);
    Ok(Value::Object(body))
}

async fn run(engine: &BookingEngine, operation: Operation, payload: &Value) -> Result<ApiResponse> {
    let response = match operation {
        Operation::ConfirmBooking => {
            let receipt = engine.confirm_booking(payload).await?;
            let message = match receipt.outcome {
                UpsertOutcome::Created => "Booking created successfully",
                UpsertOutcome::Updated => "Booking updated successfully",
            };
            ApiResponse::ok(message, serde_json::to_value(receipt)?)
        }
        Operation::GetAllBookings => ApiResponse::ok(
            "Bookings retrieved successfully",
            listing("bookings", engine.get_all_bookings(payload).await?)?,
        ),
        Operation::StoreReqBooking => ApiResponse::ok(
            "Request booking stored successfully",
            serde_json::to_value(engine.store_req_booking(payload).await?)?,
        ),
        Operation::GetAllRequestBookings => ApiResponse::ok(
            "Request bookings retrieved successfully",
            listing(
                "request_bookings",
                engine.get_all_request_bookings(payload).await?,
            )?,
        ),
        Operation::GetRequestBookingDetails => ApiResponse::ok(
            "Request booking details retrieved successfully",
            serde_json::to_value(engine.get_request_booking_details(payload).await?)?,
        ),
        Operation::SendForApproval => ApiResponse::ok(
            "Booking sent for approval",
            serde_json::to_value(engine.send_for_approval(payload).await?)?,
        ),
        Operation::ApproveBooking => ApiResponse::ok(
            "Booking approved successfully",
            serde_json::to_value(engine.approve_booking(payload).await?)?,
        ),
        Operation::DeclineBooking => ApiResponse::ok(
            "Booking declined successfully",
            serde_json::to_value(engine.decline_booking(payload).await?)?,
        ),
        Operation::UpdateRequestBooking => ApiResponse::ok(
            "Request booking updated successfully",
            serde_json::to_value(engine.update_request_booking(payload).await?)?,
        ),
        Operation::CreatePaymentUrl => ApiResponse::ok(
            "Payment URL created successfully",
            serde_json::to_value(engine.create_payment_url(payload).await?)?,
        ),
        Operation::PaymentCallback => {
            let receipt = engine.payment_callback(payload).await?;
            let message = match receipt.outcome {
                CallbackOutcome::Applied => "Payment callback processed",
                CallbackOutcome::Duplicate => "Payment callback already processed",
            };
            ApiResponse::ok(message, serde_json::to_value(receipt)?)
        }
        Operation::CloseRequestBooking => ApiResponse::ok(
            "Request booking closed successfully",
            serde_json::to_value(engine.close_request_booking(payload).await?)?,
        ),
    };
    Ok(response)
}

/// Routes one request to the engine. Never fails: errors become error
/// envelopes carrying their status class.
pub async fn dispatch(engine: &BookingEngine, request: &ApiRequest) -> ApiResponse {
    let result = match Operation::from_name(&request.operation) {
        Ok(operation) => run(engine, operation, &request.payload).await,
        Err(e) => Err(e),
    };
    let response = ApiResponse::from(result);
    debug!(
        operation = %request.operation,
        status = response.status,
        "request handled"
    );
    response
}

/// Parses and dispatches one raw input line.
pub async fn handle_line(engine: &BookingEngine, line: &str) -> ApiResponse {
    match ApiRequest::parse(line) {
        Ok(request) => dispatch(engine, &request).await,
        Err(e) => ApiResponse::from_error(&e),
    }
}
