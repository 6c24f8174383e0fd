use crate::config::OrchestratorConfig;
use crate::domain::refund::{RefundRequest, RefundState};
use crate::domain::transaction::Transaction;
use crate::errors::PaymentError;
use crate::gateways::GatewayRegistry;
use crate::lifecycle::state::TransactionState;
use crate::lifecycle::store::TransactionStore;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

#[derive(Clone)]
pub struct RefundManager {
    config: OrchestratorConfig,
    registry: Arc<GatewayRegistry>,
    transactions: TransactionStore,
    refunds: Arc<RwLock<HashMap<Uuid, Arc<Mutex<RefundRequest>>>>>,
}

impl RefundManager {
    pub fn new(
        config: OrchestratorConfig,
        registry: Arc<GatewayRegistry>,
        transactions: TransactionStore,
    ) -> Self {
        Self {
            config,
            registry,
            transactions,
            refunds: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn initiate_refund(
        &self,
        transaction_id: Uuid,
        amount_minor: i64,
        reason: &str,
    ) -> Result<RefundRequest, PaymentError> {
        let parent = self.transactions.snapshot(transaction_id).await?;
        if parent.state != TransactionState::Succeeded
            || amount_minor <= 0
            || amount_minor > parent.amount_minor
        {
            return Err(PaymentError::Refund {
                code: "INVALID_REFUND_AMOUNT",
                message: "refund requires a settled transaction and an amount within the original charge"
                    .to_string(),
            });
        }

        let request = RefundRequest {
            id: Uuid::new_v4(),
            transaction_id,
            amount_minor,
            reason: reason.to_string(),
            idempotency_key: Uuid::new_v4().to_string(),
            state: RefundState::Requested,
            estimated_settlement_days: None,
            provider_ref: None,
            failure_reason: None,
            created_at: chrono::Utc::now(),
        };
        let id = request.id;
        let cell = Arc::new(Mutex::new(request));
        self.refunds.write().await.insert(id, cell.clone());

        let mut refund = cell.lock().await;
        self.submit(&parent, &mut refund).await;
        Ok(refund.clone())
    }

    pub async fn retry(&self, refund_id: Uuid) -> Result<RefundRequest, PaymentError> {
        let cell = self
            .refunds
            .read()
            .await
            .get(&refund_id)
            .cloned()
            .ok_or(PaymentError::Refund {
                code: "UNKNOWN_REFUND",
                message: format!("no refund request {refund_id}"),
            })?;

        let mut refund = cell.lock().await;
        if refund.state != RefundState::Failed {
            return Err(PaymentError::Refund {
                code: "REFUND_NOT_RETRYABLE",
                message: "only failed refund requests may be resubmitted".to_string(),
            });
        }

        let parent = self.transactions.snapshot(refund.transaction_id).await?;
        refund.state = RefundState::Requested;
        refund.failure_reason = None;
        // Resubmission must reuse the stored idempotency key.
        self.submit(&parent, &mut refund).await;
        Ok(refund.clone())
    }

    pub async fn complete(&self, refund_id: Uuid) -> Result<RefundRequest, PaymentError> {
        let cell = self
            .refunds
            .read()
            .await
            .get(&refund_id)
            .cloned()
            .ok_or(PaymentError::Refund {
                code: "UNKNOWN_REFUND",
                message: format!("no refund request {refund_id}"),
            })?;

        let mut refund = cell.lock().await;
        if refund.state != RefundState::Processing {
            return Err(PaymentError::Refund {
                code: "REFUND_NOT_SETTLEABLE",
                message: "only processing refunds can settle".to_string(),
            });
        }
        refund.state = RefundState::Completed;
        tracing::info!(refund_id = %refund.id, "refund settled");
        Ok(refund.clone())
    }

    pub async fn refund(&self, refund_id: Uuid) -> Result<RefundRequest, PaymentError> {
        let cell = self
            .refunds
            .read()
            .await
            .get(&refund_id)
            .cloned()
            .ok_or(PaymentError::Refund {
                code: "UNKNOWN_REFUND",
                message: format!("no refund request {refund_id}"),
            })?;
        let guard = cell.lock().await;
        Ok(guard.clone())
    }

    pub async fn refunds_for(&self, transaction_id: Uuid) -> Vec<RefundRequest> {
        let cells: Vec<_> = self.refunds.read().await.values().cloned().collect();
        let mut out = Vec::new();
        for cell in cells {
            let guard = cell.lock().await;
            if guard.transaction_id == transaction_id {
                out.push(guard.clone());
            }
        }
        out
    }

    async fn submit(&self, parent: &Transaction, refund: &mut RefundRequest) {
        let adapter = self.registry.resolve(parent.method);
        let external_ref = parent.external_ref.as_deref().unwrap_or_default();
        let call = adapter.refund(external_ref, refund.amount_minor, &refund.idempotency_key);
        match tokio::time::timeout(self.config.gateway_timeout(), call).await {
            Ok(Ok(outcome)) if outcome.accepted => {
                refund.state = RefundState::Processing;
                refund.estimated_settlement_days = Some(self.config.refund_settlement_days);
                refund.provider_ref = outcome.provider_ref;
                tracing::info!(refund_id = %refund.id, "refund accepted by provider");
            }
            Ok(Ok(outcome)) => {
                refund.state = RefundState::Failed;
                refund.failure_reason = outcome
                    .reason
                    .or_else(|| Some("refund rejected by provider".to_string()));
                tracing::warn!(refund_id = %refund.id, "refund rejected");
            }
            Ok(Err(err)) => {
                refund.state = RefundState::Failed;
                refund.failure_reason = Some(err.code().to_string());
                tracing::warn!(refund_id = %refund.id, "refund failed: {err}");
            }
            Err(_) => {
                refund.state = RefundState::Failed;
                refund.failure_reason = Some("TIMEOUT".to_string());
                tracing::warn!(refund_id = %refund.id, "refund timed out");
            }
        }
    }
}
