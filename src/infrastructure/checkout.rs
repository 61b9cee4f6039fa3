use crate::domain::ports::{CheckoutRequest, CheckoutSession, PaymentGateway};
use crate::error::{Result, WorkflowError};
use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Everything outside the RFC 3986 unreserved set is escaped.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Builds hosted checkout links locally; the hosted page itself belongs to
/// the payment provider.
#[derive(Debug, Clone)]
pub struct HostedCheckoutGateway {
    base_url: String,
}

impl HostedCheckoutGateway {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl PaymentGateway for HostedCheckoutGateway {
    async fn create_checkout(&self, request: &CheckoutRequest) -> Result<CheckoutSession> {
        if self.base_url.is_empty() {
            return Err(WorkflowError::PaymentGateway(
                "checkout base url is not configured".to_string(),
            ));
        }
        Ok(CheckoutSession {
            url: format!(
                "{}/pay/{}?mode={}&amount={}&currency={}",
                self.base_url,
                utf8_percent_encode(&request.payment_id, COMPONENT),
                request.mode.as_str(),
                request.amount.value(),
                utf8_percent_encode(&request.currency, COMPONENT)
            ),
        })
    }
}
