use crate::domain::money::Amount;
use crate::domain::payment::{Payment, PaymentMode, PaymentStatus};
use crate::domain::ports::{CheckoutRequest, PaymentGatewayBox, PaymentStoreBox};
use crate::domain::request_booking::RequestBooking;
use crate::error::{Result, WorkflowError};
use hmac::{Hmac, Mac};
use serde::Serialize;
use sha2::Sha256;
use std::time::Duration;
use subtle::ConstantTimeEq;
use tracing::{info, warn};

type HmacSha256 = Hmac<Sha256>;

/// Hex HMAC-SHA256 over `"{payment_id}:{status}"`.
pub fn sign_callback(secret: &str, payment_id: &str, status: PaymentStatus) -> Result<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| WorkflowError::Internal(e.to_string().into()))?;
    mac.update(format!("{payment_id}:{status}").as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

fn signatures_match(given: &str, expected: &str) -> bool {
    let (Ok(given), Ok(expected)) = (hex::decode(given.trim()), hex::decode(expected)) else {
        return false;
    };
    given.len() == expected.len() && bool::from(given.ct_eq(expected.as_slice()))
}

/// What a callback did to the stored payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CallbackOutcome {
    Applied,
    Duplicate,
}

/// Creates checkout sessions and reconciles gateway callbacks.
///
/// The orchestrator never loads or persists request bookings itself: the
/// engine hands it a record it already holds the lock for.
pub struct PaymentOrchestrator {
    gateway: PaymentGatewayBox,
    payments: PaymentStoreBox,
    webhook_secret: String,
    upstream_timeout: Duration,
}

impl PaymentOrchestrator {
    pub fn new(
        gateway: PaymentGatewayBox,
        payments: PaymentStoreBox,
        webhook_secret: String,
        upstream_timeout: Duration,
    ) -> Self {
        Self {
            gateway,
            payments,
            webhook_secret,
            upstream_timeout,
        }
    }

    /// Opens a checkout for the record's approved rooms and moves them into
    /// payment. On any failure the record is left untouched.
    pub async fn create_payment_url(
        &self,
        record: &mut RequestBooking,
        mode: PaymentMode,
        default_currency: &str,
    ) -> Result<Payment> {
        record.ensure_payable()?;
        let (total, currency) = record.approved_total();
        let amount = Amount::try_from(total)?;
        let currency = currency.unwrap_or_else(|| default_currency.to_string());
        let payment_id = Payment::id_for(&record.request_booking_id, record.payment_ids.len() + 1);

        let request = CheckoutRequest {
            payment_id: payment_id.clone(),
            request_booking_id: record.request_booking_id.clone(),
            mode,
            amount,
            currency: currency.clone(),
        };
        let session = match tokio::time::timeout(
            self.upstream_timeout,
            self.gateway.create_checkout(&request),
        )
        .await
        {
            Ok(Ok(session)) => session,
            Ok(Err(e)) => {
                warn!(payment_id, error = %e, "payment gateway rejected checkout");
                return Err(e);
            }
            Err(_) => {
                warn!(payment_id, "payment gateway timed out");
                return Err(WorkflowError::UpstreamTimeout(
                    "payment gateway did not respond".to_string(),
                ));
            }
        };

        let payment = Payment {
            payment_id: payment_id.clone(),
            request_booking_id: record.request_booking_id.clone(),
            mode,
            status: PaymentStatus::Initiated,
            amount,
            currency,
            url: Some(session.url),
        };
        self.payments.store(payment.clone()).await?;
        record.begin_payment(payment_id)?;
        info!(
            request_booking_id = %record.request_booking_id,
            payment_id = %payment.payment_id,
            amount = %amount.value(),
            "payment initiated"
        );
        Ok(payment)
    }

    /// Checks the callback signature before anything else is looked at.
    pub fn verify(&self, payment_id: &str, status: PaymentStatus, signature: &str) -> Result<()> {
        if self.webhook_secret.is_empty() {
            warn!(payment_id, "callback rejected: no webhook secret configured");
            return Err(WorkflowError::InvalidSignature);
        }
        let expected = sign_callback(&self.webhook_secret, payment_id, status)?;
        if signatures_match(signature, &expected) {
            Ok(())
        } else {
            warn!(payment_id, "callback rejected: signature mismatch");
            Err(WorkflowError::InvalidSignature)
        }
    }

    pub async fn find_payment(&self, payment_id: &str) -> Result<Payment> {
        self.payments
            .get(payment_id)
            .await?
            .ok_or_else(|| WorkflowError::not_found(format!("Payment {payment_id} not found")))
    }

    /// Applies a verified callback. Repeating a terminal status is a no-op;
    /// a different status for an already settled payment is a conflict.
    pub async fn apply_callback(
        &self,
        record: &mut RequestBooking,
        mut payment: Payment,
        status: PaymentStatus,
    ) -> Result<CallbackOutcome> {
        if payment.status.is_terminal() {
            if payment.status == status {
                info!(payment_id = %payment.payment_id, %status, "duplicate callback ignored");
                return Ok(CallbackOutcome::Duplicate);
            }
            return Err(WorkflowError::conflict(format!(
                "Payment {} already settled as {}",
                payment.payment_id, payment.status
            )));
        }

        payment.status = status;
        record.settle_payment(status);
        self.payments.store(payment.clone()).await?;
        info!(
            request_booking_id = %record.request_booking_id,
            payment_id = %payment.payment_id,
            %status,
            "payment settled"
        );
        Ok(CallbackOutcome::Applied)
    }

    pub async fn payments_for(&self, record: &RequestBooking) -> Result<Vec<Payment>> {
        let mut payments = Vec::with_capacity(record.payment_ids.len());
        for id in &record.payment_ids {
            if let Some(payment) = self.payments.get(id).await? {
                payments.push(payment);
            }
        }
        Ok(payments)
    }
}
