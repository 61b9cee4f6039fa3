use super::money::Amount;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMode {
    DirectPay,
    BillToCompany,
}

impl PaymentMode {
    pub const ALL: [&'static str; 2] = ["direct_pay", "bill_to_company"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DirectPay => "direct_pay",
            Self::BillToCompany => "bill_to_company",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Initiated,
    Success,
    Failure,
    Cancel,
}

impl PaymentStatus {
    /// Statuses a gateway callback may report.
    pub const CALLBACK: [&'static str; 3] = ["success", "failure", "cancel"];

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Initiated)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Initiated => "initiated",
            Self::Success => "success",
            Self::Failure => "failure",
            Self::Cancel => "cancel",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One payment attempt for a request booking's approved rooms.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Payment {
    pub payment_id: String,
    pub request_booking_id: String,
    pub mode: PaymentMode,
    pub status: PaymentStatus,
    pub amount: Amount,
    pub currency: String,
    #[serde(default)]
    pub url: Option<String>,
}

impl Payment {
    /// Payment ids are derived from the request and the attempt number so
    /// retried callbacks always address the same record.
    pub fn id_for(request_booking_id: &str, attempt: usize) -> String {
        format!("PAY-{request_booking_id}-{attempt}")
    }
}
