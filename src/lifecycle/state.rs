use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionState {
    Created,
    Initiating,
    AwaitingConfirmation,
    Verifying,
    Succeeded,
    Failed,
    Cancelled,
}

impl TransactionState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TransactionState::Succeeded | TransactionState::Failed | TransactionState::Cancelled
        )
    }
}
