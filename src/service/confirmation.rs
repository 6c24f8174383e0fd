use crate::config::{BackendAvailability, OrchestratorConfig};
use crate::domain::transaction::{PaymentArtifact, PaymentOutcome, Transaction};
use crate::errors::PaymentError;
use crate::gateways::{GatewayRegistry, VerificationEvidence, VerifyOutcome};
use crate::lifecycle::state::TransactionState;
use crate::lifecycle::store::TransactionStore;
use crate::lifecycle::transitions;
use crate::service::orchestrator::{record_order, OrderRepository};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

const UPI_QUERY: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'.')
    .remove(b'-')
    .remove(b'_')
    .remove(b'@');

#[derive(Debug, Clone, Serialize)]
pub struct UpiIntent {
    pub link: String,
    pub qr_payload: String,
}

pub fn format_amount_minor(amount_minor: i64) -> String {
    format!("{}.{:02}", amount_minor / 100, amount_minor % 100)
}

pub fn build_upi_intent(
    merchant_vpa: &str,
    merchant_name: &str,
    amount_minor: i64,
    order_id: &str,
    note: &str,
) -> UpiIntent {
    let link = format!(
        "upi://pay?pa={}&pn={}&am={}&tr={}&tn={}",
        utf8_percent_encode(merchant_vpa, UPI_QUERY),
        utf8_percent_encode(merchant_name, UPI_QUERY),
        format_amount_minor(amount_minor),
        utf8_percent_encode(order_id, UPI_QUERY),
        utf8_percent_encode(note, UPI_QUERY),
    );
    UpiIntent {
        qr_payload: link.clone(),
        link,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostedCallback {
    pub order_id: String,
    pub payment_id: String,
    pub signature: String,
}

#[derive(Clone)]
pub struct ConfirmationCoordinator {
    pub config: OrchestratorConfig,
    pub registry: Arc<GatewayRegistry>,
    pub store: TransactionStore,
    pub orders: Arc<dyn OrderRepository>,
    pub backend: BackendAvailability,
}

impl ConfirmationCoordinator {
    pub fn upi_intent(&self, tx: &Transaction) -> UpiIntent {
        build_upi_intent(
            &self.config.merchant_vpa,
            &self.config.merchant_name,
            tx.amount_minor,
            &tx.order_id,
            &format!("Order {}", tx.order_id),
        )
    }

    pub async fn confirm(&self, transaction_id: Uuid) -> Result<PaymentOutcome, PaymentError> {
        let cell = self.store.cell(transaction_id).await?;
        let mut tx = cell.lock().await;
        if tx.state.is_terminal() {
            return Ok(PaymentOutcome::from_transaction(&tx, PaymentArtifact::None));
        }
        if tx.state != TransactionState::AwaitingConfirmation {
            return Err(PaymentError::InvalidTransition {
                from: tx.state,
                to: TransactionState::Verifying,
            });
        }

        transitions::advance(&mut tx, TransactionState::Verifying)?;
        let adapter = self.registry.resolve(tx.method);
        let verdict = tokio::time::timeout(
            self.config.gateway_timeout(),
            adapter.verify(&tx, &VerificationEvidence::UserAssertion),
        )
        .await;
        self.settle_verdict(&mut tx, verdict).await
    }

    pub async fn cancel(&self, transaction_id: Uuid) -> Result<PaymentOutcome, PaymentError> {
        let cell = self.store.cell(transaction_id).await?;
        let mut tx = cell.lock().await;
        if tx.state.is_terminal() {
            return Ok(PaymentOutcome::from_transaction(&tx, PaymentArtifact::None));
        }

        match tx.state {
            TransactionState::Created | TransactionState::AwaitingConfirmation => {
                transitions::advance(&mut tx, TransactionState::Cancelled)?;
                tracing::info!(transaction_id = %tx.id, "transaction cancelled");
                Ok(PaymentOutcome::from_transaction(&tx, PaymentArtifact::None))
            }
            from => Err(PaymentError::InvalidTransition {
                from,
                to: TransactionState::Cancelled,
            }),
        }
    }

    pub async fn wallet_callback(
        &self,
        transaction_id: Uuid,
        provider_ref: &str,
        approved: bool,
    ) -> Result<PaymentOutcome, PaymentError> {
        let cell = self.store.cell(transaction_id).await?;
        let mut tx = cell.lock().await;
        if tx.state.is_terminal() {
            return Ok(PaymentOutcome::from_transaction(&tx, PaymentArtifact::None));
        }
        if tx.state != TransactionState::Initiating {
            return Err(PaymentError::InvalidTransition {
                from: tx.state,
                to: TransactionState::Succeeded,
            });
        }

        let adapter = self.registry.resolve(tx.method);
        let evidence = VerificationEvidence::ProviderCallback {
            provider_ref: provider_ref.to_string(),
            approved,
        };
        let verdict = tokio::time::timeout(
            self.config.gateway_timeout(),
            adapter.verify(&tx, &evidence),
        )
        .await;
        self.settle_verdict(&mut tx, verdict).await
    }

    pub async fn hosted_callback(
        &self,
        transaction_id: Uuid,
        callback: HostedCallback,
    ) -> Result<PaymentOutcome, PaymentError> {
        // Signature verification needs the backend; without it the flow
        // fails closed and the transaction stays pending.
        if !self.backend.is_available() {
            return Err(PaymentError::gateway(
                "BACKEND_UNAVAILABLE",
                "signature verification unavailable, callback not processed",
                true,
            ));
        }

        let cell = self.store.cell(transaction_id).await?;
        let mut tx = cell.lock().await;
        if tx.state.is_terminal() {
            return Ok(PaymentOutcome::from_transaction(&tx, PaymentArtifact::None));
        }

        transitions::advance(&mut tx, TransactionState::Verifying)?;
        let adapter = self.registry.resolve(tx.method);
        let evidence = VerificationEvidence::SignedCallback {
            order_id: callback.order_id,
            payment_id: callback.payment_id,
            signature: callback.signature,
        };
        let verdict = tokio::time::timeout(
            self.config.gateway_timeout(),
            adapter.verify(&tx, &evidence),
        )
        .await;
        self.settle_verdict(&mut tx, verdict).await
    }

    async fn settle_verdict(
        &self,
        tx: &mut Transaction,
        verdict: Result<Result<VerifyOutcome, PaymentError>, tokio::time::error::Elapsed>,
    ) -> Result<PaymentOutcome, PaymentError> {
        match verdict {
            Err(_) => {
                transitions::fail(tx, "TIMEOUT")?;
                tracing::warn!(transaction_id = %tx.id, "verification timed out");
            }
            Ok(Err(err)) => {
                transitions::fail(tx, err.code().to_string())?;
                tracing::warn!(transaction_id = %tx.id, "verification failed: {err}");
            }
            Ok(Ok(outcome)) if outcome.settled => {
                transitions::advance(tx, TransactionState::Succeeded)?;
                tracing::info!(transaction_id = %tx.id, "payment settled");
            }
            Ok(Ok(outcome)) => {
                transitions::fail(
                    tx,
                    outcome
                        .reason
                        .unwrap_or_else(|| "verification declined".to_string()),
                )?;
            }
        }

        if tx.state == TransactionState::Succeeded {
            Ok(record_order(&self.orders, tx, PaymentArtifact::None).await)
        } else {
            Ok(PaymentOutcome::from_transaction(tx, PaymentArtifact::None))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upi_link_is_deterministic_and_encoded() {
        let intent = build_upi_intent("shop@okaxis", "My Shop", 50_000, "ORD1", "Order ORD1");
        assert_eq!(
            intent.link,
            "upi://pay?pa=shop@okaxis&pn=My%20Shop&am=500.00&tr=ORD1&tn=Order%20ORD1"
        );
        assert_eq!(intent.qr_payload, intent.link);
    }

    #[test]
    fn amount_formatting_uses_major_units() {
        assert_eq!(format_amount_minor(50_000), "500.00");
        assert_eq!(format_amount_minor(105), "1.05");
        assert_eq!(format_amount_minor(100), "1.00");
    }
}
