use crate::domain::transaction::{PaymentArtifact, Transaction};
use crate::errors::PaymentError;
use crate::gateways::{
    GatewayAdapter, InitiateOutcome, InitiateStatus, RefundOutcome, VerificationEvidence,
    VerifyOutcome,
};
use uuid::Uuid;

pub struct CodAdapter;

#[async_trait::async_trait]
impl GatewayAdapter for CodAdapter {
    fn name(&self) -> &'static str {
        "cod"
    }

    async fn initiate(&self, _tx: &Transaction) -> Result<InitiateOutcome, PaymentError> {
        Ok(InitiateOutcome {
            status: InitiateStatus::Settled,
            external_id: Some(format!("cod_{}", Uuid::new_v4())),
            artifact: PaymentArtifact::None,
            failure_reason: None,
        })
    }

    async fn verify(
        &self,
        _tx: &Transaction,
        _evidence: &VerificationEvidence,
    ) -> Result<VerifyOutcome, PaymentError> {
        Ok(VerifyOutcome {
            settled: true,
            reason: None,
        })
    }

    async fn refund(
        &self,
        _external_ref: &str,
        _amount_minor: i64,
        _idempotency_key: &str,
    ) -> Result<RefundOutcome, PaymentError> {
        Ok(RefundOutcome {
            accepted: true,
            provider_ref: None,
            reason: None,
        })
    }
}
