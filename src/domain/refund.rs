use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RefundState {
    Requested,
    Processing,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct RefundRequest {
    pub id: Uuid,
    pub transaction_id: Uuid,
    pub amount_minor: i64,
    pub reason: String,
    pub idempotency_key: String,
    pub state: RefundState,
    pub estimated_settlement_days: Option<u32>,
    pub provider_ref: Option<String>,
    pub failure_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}
