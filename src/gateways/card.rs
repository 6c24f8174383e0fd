use crate::config::OrchestratorConfig;
use crate::domain::transaction::{PaymentArtifact, Transaction};
use crate::errors::PaymentError;
use crate::gateways::{
    GatewayAdapter, InitiateOutcome, InitiateStatus, RefundOutcome, VerificationEvidence,
    VerifyOutcome,
};
use uuid::Uuid;

pub struct CardAdapter {
    pub behavior: String,
    pub refund_behavior: String,
}

impl CardAdapter {
    pub fn new(cfg: &OrchestratorConfig) -> Self {
        Self {
            behavior: cfg.card_behavior.clone(),
            refund_behavior: cfg.refund_behavior.clone(),
        }
    }
}

#[async_trait::async_trait]
impl GatewayAdapter for CardAdapter {
    fn name(&self) -> &'static str {
        "card"
    }

    async fn initiate(&self, tx: &Transaction) -> Result<InitiateOutcome, PaymentError> {
        match self.behavior.as_str() {
            "ALWAYS_FAILURE" => Ok(InitiateOutcome {
                status: InitiateStatus::Declined,
                external_id: None,
                artifact: PaymentArtifact::None,
                failure_reason: Some("card declined by issuer".to_string()),
            }),
            "NETWORK_ERROR" => Err(PaymentError::gateway(
                "NETWORK_ERROR",
                "processor unreachable",
                true,
            )),
            // A hung processor: the orchestrator's own deadline decides.
            "ALWAYS_TIMEOUT" => std::future::pending().await,
            _ => Ok(InitiateOutcome {
                status: InitiateStatus::Settled,
                external_id: Some(format!("card_{}", Uuid::new_v4())),
                artifact: PaymentArtifact::CardReceipt {
                    last4: tx.last4.clone().unwrap_or_default(),
                },
                failure_reason: None,
            }),
        }
    }

    async fn verify(
        &self,
        _tx: &Transaction,
        _evidence: &VerificationEvidence,
    ) -> Result<VerifyOutcome, PaymentError> {
        match self.behavior.as_str() {
            "ALWAYS_FAILURE" => Ok(VerifyOutcome {
                settled: false,
                reason: Some("charge not found".to_string()),
            }),
            _ => Ok(VerifyOutcome {
                settled: true,
                reason: None,
            }),
        }
    }

    async fn refund(
        &self,
        _external_ref: &str,
        _amount_minor: i64,
        _idempotency_key: &str,
    ) -> Result<RefundOutcome, PaymentError> {
        match self.refund_behavior.as_str() {
            "ALWAYS_FAILURE" => Ok(RefundOutcome {
                accepted: false,
                provider_ref: None,
                reason: Some("refund rejected by issuer".to_string()),
            }),
            _ => Ok(RefundOutcome {
                accepted: true,
                provider_ref: Some(format!("card_rf_{}", Uuid::new_v4())),
                reason: None,
            }),
        }
    }
}
