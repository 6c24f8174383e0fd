use crate::domain::transaction::Transaction;
use crate::errors::PaymentError;
use crate::lifecycle::state::TransactionState;

pub fn permitted(from: TransactionState, to: TransactionState) -> bool {
    use TransactionState::*;
    matches!(
        (from, to),
        (Created, Initiating)
            | (Created, Succeeded)
            | (Created, Cancelled)
            | (Initiating, AwaitingConfirmation)
            | (Initiating, Verifying)
            | (Initiating, Succeeded)
            | (Initiating, Failed)
            | (AwaitingConfirmation, Verifying)
            | (AwaitingConfirmation, Cancelled)
            | (Verifying, Succeeded)
            | (Verifying, Failed)
    )
}

pub fn advance(tx: &mut Transaction, to: TransactionState) -> Result<(), PaymentError> {
    if !permitted(tx.state, to) {
        return Err(PaymentError::InvalidTransition {
            from: tx.state,
            to,
        });
    }
    tx.state = to;
    if to == TransactionState::Succeeded {
        tx.verified_at = Some(chrono::Utc::now());
    }
    Ok(())
}

pub fn fail(tx: &mut Transaction, reason: impl Into<String>) -> Result<(), PaymentError> {
    advance(tx, TransactionState::Failed)?;
    tx.failure_reason = Some(reason.into());
    Ok(())
}
