use crate::config::{BackendAvailability, OrchestratorConfig};
use crate::domain::transaction::{
    CheckoutRequest, PaymentArtifact, PaymentMethod, PaymentOutcome, Transaction,
};
use crate::errors::PaymentError;
use crate::gateways::{GatewayAdapter, GatewayRegistry, InitiateOutcome, InitiateStatus};
use crate::lifecycle::state::TransactionState;
use crate::lifecycle::store::TransactionStore;
use crate::lifecycle::transitions;
use crate::service::confirmation::ConfirmationCoordinator;
use crate::service::validation;
use std::sync::Arc;
use uuid::Uuid;

#[async_trait::async_trait]
pub trait OrderRepository: Send + Sync {
    async fn save(&self, order_id: &str, outcome: &PaymentOutcome) -> anyhow::Result<()>;
}

#[derive(Clone)]
pub struct PaymentOrchestrator {
    pub config: OrchestratorConfig,
    pub registry: Arc<GatewayRegistry>,
    pub store: TransactionStore,
    pub orders: Arc<dyn OrderRepository>,
    pub backend: BackendAvailability,
}

impl PaymentOrchestrator {
    pub fn new(
        config: OrchestratorConfig,
        orders: Arc<dyn OrderRepository>,
        backend: BackendAvailability,
    ) -> Self {
        let registry = Arc::new(GatewayRegistry::from_config(&config));
        Self {
            config,
            registry,
            store: TransactionStore::new(),
            orders,
            backend,
        }
    }

    pub fn coordinator(&self) -> ConfirmationCoordinator {
        ConfirmationCoordinator {
            config: self.config.clone(),
            registry: self.registry.clone(),
            store: self.store.clone(),
            orders: self.orders.clone(),
            backend: self.backend.clone(),
        }
    }

    pub async fn transaction(&self, id: Uuid) -> Result<Transaction, PaymentError> {
        self.store.snapshot(id).await
    }

    pub async fn checkout(&self, req: CheckoutRequest) -> Result<PaymentOutcome, PaymentError> {
        validation::validate_request(&req, &self.config.currency, &self.config.validation)?;

        let cell = self.store.insert(Transaction::new(&req)).await;
        let mut tx = cell.lock().await;
        let adapter = self.registry.resolve(tx.method);

        if tx.method == PaymentMethod::Cod {
            let outcome = adapter.initiate(&tx).await?;
            tx.external_ref = outcome.external_id.clone();
            transitions::advance(&mut tx, TransactionState::Succeeded)?;
            tracing::info!(transaction_id = %tx.id, order_id = %tx.order_id, "cash on delivery settled");
            return Ok(record_order(&self.orders, &tx, outcome.artifact).await);
        }

        transitions::advance(&mut tx, TransactionState::Initiating)?;
        match self.initiate_with_retry(adapter.as_ref(), &tx).await {
            Err(PaymentError::Timeout { .. }) => {
                transitions::fail(&mut tx, "TIMEOUT")?;
                tracing::warn!(transaction_id = %tx.id, "initiate timed out");
                Ok(PaymentOutcome::from_transaction(&tx, PaymentArtifact::None))
            }
            Err(err) => {
                transitions::fail(&mut tx, err.code().to_string())?;
                tracing::warn!(transaction_id = %tx.id, "initiate failed: {err}");
                Ok(PaymentOutcome::from_transaction(&tx, PaymentArtifact::None))
            }
            Ok(outcome) => match outcome.status {
                InitiateStatus::Declined => {
                    transitions::fail(
                        &mut tx,
                        outcome
                            .failure_reason
                            .clone()
                            .unwrap_or_else(|| "declined by provider".to_string()),
                    )?;
                    Ok(PaymentOutcome::from_transaction(&tx, outcome.artifact))
                }
                InitiateStatus::Settled => {
                    tx.external_ref = outcome.external_id.clone();
                    transitions::advance(&mut tx, TransactionState::Succeeded)?;
                    tracing::info!(transaction_id = %tx.id, method = tx.method.as_str(), gateway = adapter.name(), "payment settled at initiate");
                    Ok(record_order(&self.orders, &tx, outcome.artifact).await)
                }
                InitiateStatus::Pending => {
                    tx.external_ref = outcome.external_id.clone();
                    // UPI waits on the user; wallet and hosted checkout stay
                    // INITIATING until the provider callback lands.
                    if tx.method == PaymentMethod::Upi {
                        transitions::advance(&mut tx, TransactionState::AwaitingConfirmation)?;
                    }
                    Ok(PaymentOutcome::from_transaction(&tx, outcome.artifact))
                }
            },
        }
    }

    async fn initiate_with_retry(
        &self,
        adapter: &dyn GatewayAdapter,
        tx: &Transaction,
    ) -> Result<InitiateOutcome, PaymentError> {
        let mut attempt: u32 = 0;
        loop {
            let result =
                tokio::time::timeout(self.config.gateway_timeout(), adapter.initiate(tx)).await;
            match result {
                Err(_) => {
                    return Err(PaymentError::Timeout {
                        timeout_ms: self.config.gateway_timeout_ms,
                    })
                }
                Ok(Ok(outcome)) => return Ok(outcome),
                Ok(Err(err)) if err.is_retryable() && attempt + 1 < self.config.initiate_max_attempts => {
                    attempt += 1;
                    let backoff = self
                        .config
                        .initiate_backoff_ms
                        .saturating_mul(1u64 << attempt.min(8));
                    tracing::warn!(
                        transaction_id = %tx.id,
                        attempt,
                        "retrying initiate after gateway error: {err}"
                    );
                    tokio::time::sleep(std::time::Duration::from_millis(backoff)).await;
                }
                Ok(Err(err)) => return Err(err),
            }
        }
    }
}

pub(crate) async fn record_order(
    orders: &Arc<dyn OrderRepository>,
    tx: &Transaction,
    artifact: PaymentArtifact,
) -> PaymentOutcome {
    let mut outcome = PaymentOutcome::from_transaction(tx, artifact);
    if let Err(err) = orders.save(&tx.order_id, &outcome).await {
        // The payment is already terminal; the miss is surfaced, not rolled back.
        tracing::warn!(transaction_id = %tx.id, order_id = %tx.order_id, "order save failed after settlement: {err}");
        outcome.failure_reason = Some(format!("ORDER_SAVE_FAILED: {err}"));
    }
    outcome
}
