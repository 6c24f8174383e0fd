use crate::config::OrchestratorConfig;
use crate::domain::transaction::{PaymentArtifact, Transaction};
use crate::errors::PaymentError;
use crate::gateways::{
    GatewayAdapter, InitiateOutcome, InitiateStatus, RefundOutcome, VerificationEvidence,
    VerifyOutcome,
};
use crate::service::confirmation::build_upi_intent;
use uuid::Uuid;

pub struct UpiAdapter {
    pub merchant_vpa: String,
    pub merchant_name: String,
    pub provider_behavior: String,
    pub refund_behavior: String,
}

impl UpiAdapter {
    pub fn new(cfg: &OrchestratorConfig) -> Self {
        Self {
            merchant_vpa: cfg.merchant_vpa.clone(),
            merchant_name: cfg.merchant_name.clone(),
            provider_behavior: cfg.upi_provider_behavior.clone(),
            refund_behavior: cfg.refund_behavior.clone(),
        }
    }
}

#[async_trait::async_trait]
impl GatewayAdapter for UpiAdapter {
    fn name(&self) -> &'static str {
        "upi"
    }

    async fn initiate(&self, tx: &Transaction) -> Result<InitiateOutcome, PaymentError> {
        let intent = build_upi_intent(
            &self.merchant_vpa,
            &self.merchant_name,
            tx.amount_minor,
            &tx.order_id,
            &format!("Order {}", tx.order_id),
        );
        Ok(InitiateOutcome {
            status: InitiateStatus::Pending,
            external_id: Some(format!("upi_{}", Uuid::new_v4())),
            artifact: PaymentArtifact::UpiIntent {
                link: intent.link,
                qr_payload: intent.qr_payload,
            },
            failure_reason: None,
        })
    }

    async fn verify(
        &self,
        _tx: &Transaction,
        evidence: &VerificationEvidence,
    ) -> Result<VerifyOutcome, PaymentError> {
        match evidence {
            VerificationEvidence::UserAssertion => match self.provider_behavior.as_str() {
                "ALWAYS_FAILURE" => Ok(VerifyOutcome {
                    settled: false,
                    reason: Some("no settlement found for collect request".to_string()),
                }),
                "ALWAYS_TIMEOUT" => std::future::pending().await,
                _ => Ok(VerifyOutcome {
                    settled: true,
                    reason: None,
                }),
            },
            _ => Err(PaymentError::gateway(
                "UNSUPPORTED_EVIDENCE",
                "upi settlement is confirmed by user assertion",
                false,
            )),
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
                reason: Some("refund rejected by provider".to_string()),
            }),
            _ => Ok(RefundOutcome {
                accepted: true,
                provider_ref: Some(format!("upi_rf_{}", Uuid::new_v4())),
                reason: None,
            }),
        }
    }
}
