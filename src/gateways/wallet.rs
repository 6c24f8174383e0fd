use crate::config::OrchestratorConfig;
use crate::domain::transaction::{PaymentArtifact, Transaction};
use crate::errors::PaymentError;
use crate::gateways::{
    GatewayAdapter, InitiateOutcome, InitiateStatus, RefundOutcome, VerificationEvidence,
    VerifyOutcome,
};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalletProvider {
    Phonepe,
    Googlepay,
}

impl WalletProvider {
    pub fn slug(&self) -> &'static str {
        match self {
            WalletProvider::Phonepe => "phonepe",
            WalletProvider::Googlepay => "googlepay",
        }
    }
}

pub struct WalletRedirectAdapter {
    pub provider: WalletProvider,
    pub redirect_base: String,
    pub refund_behavior: String,
}

impl WalletRedirectAdapter {
    pub fn new(provider: WalletProvider, cfg: &OrchestratorConfig) -> Self {
        Self {
            provider,
            redirect_base: cfg.wallet_redirect_base.clone(),
            refund_behavior: cfg.refund_behavior.clone(),
        }
    }
}

#[async_trait::async_trait]
impl GatewayAdapter for WalletRedirectAdapter {
    fn name(&self) -> &'static str {
        match self.provider {
            WalletProvider::Phonepe => "wallet_phonepe",
            WalletProvider::Googlepay => "wallet_googlepay",
        }
    }

    async fn initiate(&self, _tx: &Transaction) -> Result<InitiateOutcome, PaymentError> {
        let external_id = format!("{}_{}", self.provider.slug(), Uuid::new_v4());
        let url = format!(
            "{}/{}/redirect?ref={}",
            self.redirect_base,
            self.provider.slug(),
            external_id
        );
        Ok(InitiateOutcome {
            status: InitiateStatus::Pending,
            external_id: Some(external_id),
            artifact: PaymentArtifact::WalletRedirect { url },
            failure_reason: None,
        })
    }

    async fn verify(
        &self,
        tx: &Transaction,
        evidence: &VerificationEvidence,
    ) -> Result<VerifyOutcome, PaymentError> {
        match evidence {
            VerificationEvidence::ProviderCallback {
                provider_ref,
                approved,
            } => {
                if tx.external_ref.as_deref() != Some(provider_ref.as_str()) {
                    return Ok(VerifyOutcome {
                        settled: false,
                        reason: Some("callback reference does not match redirect".to_string()),
                    });
                }
                Ok(VerifyOutcome {
                    settled: *approved,
                    reason: if *approved {
                        None
                    } else {
                        Some("payment declined in wallet".to_string())
                    },
                })
            }
            _ => Err(PaymentError::gateway(
                "UNSUPPORTED_EVIDENCE",
                "wallet settlement resolves through the provider callback",
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
                reason: Some("refund rejected by wallet provider".to_string()),
            }),
            _ => Ok(RefundOutcome {
                accepted: true,
                provider_ref: Some(format!("{}_rf_{}", self.provider.slug(), Uuid::new_v4())),
                reason: None,
            }),
        }
    }
}
