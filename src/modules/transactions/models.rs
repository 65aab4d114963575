use senselib_kernel::{Entity, Id};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Payment state reported by the gateway. Unrecognised codes are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
    Cancelled,
    Refunded,
    Unknown(String),
}

impl From<String> for TransactionStatus {
    fn from(code: String) -> Self {
        match code.to_ascii_uppercase().as_str() {
            "PENDING" => Self::Pending,
            "COMPLETED" | "SUCCESS" => Self::Completed,
            "FAILED" => Self::Failed,
            "CANCELLED" | "CANCELED" => Self::Cancelled,
            "REFUNDED" => Self::Refunded,
            _ => Self::Unknown(code),
        }
    }
}

impl From<TransactionStatus> for String {
    fn from(status: TransactionStatus) -> Self {
        match status {
            TransactionStatus::Pending => "PENDING".to_string(),
            TransactionStatus::Completed => "COMPLETED".to_string(),
            TransactionStatus::Failed => "FAILED".to_string(),
            TransactionStatus::Cancelled => "CANCELLED".to_string(),
            TransactionStatus::Refunded => "REFUNDED".to_string(),
            TransactionStatus::Unknown(code) => code,
        }
    }
}

/// Deposit into a user's balance for a service package.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: Id,
    pub user_id: Id,
    #[serde(default)]
    pub package_id: Option<Id>,
    pub amount: i64,
    pub status: TransactionStatus,
    #[serde(default)]
    pub payment_method: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Entity for Transaction {
    const NAME: &'static str = "transactions";

    fn id(&self) -> Id {
        self.id
    }
}
