use crate::config::OrchestratorConfig;
use crate::domain::transaction::{PaymentArtifact, PaymentMethod, Transaction};
use crate::errors::PaymentError;
use std::sync::Arc;

pub mod card;
pub mod cod;
pub mod hosted;
pub mod upi;
pub mod wallet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitiateStatus {
    Pending,
    Settled,
    Declined,
}

#[derive(Debug, Clone)]
pub struct InitiateOutcome {
    pub status: InitiateStatus,
    pub external_id: Option<String>,
    pub artifact: PaymentArtifact,
    pub failure_reason: Option<String>,
}

#[derive(Debug, Clone)]
pub struct VerifyOutcome {
    pub settled: bool,
    pub reason: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RefundOutcome {
    pub accepted: bool,
    pub provider_ref: Option<String>,
    pub reason: Option<String>,
}

#[derive(Debug, Clone)]
pub enum VerificationEvidence {
    UserAssertion,
    SignedCallback {
        order_id: String,
        payment_id: String,
        signature: String,
    },
    ProviderCallback {
        provider_ref: String,
        approved: bool,
    },
}

#[async_trait::async_trait]
pub trait GatewayAdapter: Send + Sync {
    fn name(&self) -> &'static str;

    async fn initiate(&self, tx: &Transaction) -> Result<InitiateOutcome, PaymentError>;

    async fn verify(
        &self,
        tx: &Transaction,
        evidence: &VerificationEvidence,
    ) -> Result<VerifyOutcome, PaymentError>;

    async fn refund(
        &self,
        external_ref: &str,
        amount_minor: i64,
        idempotency_key: &str,
    ) -> Result<RefundOutcome, PaymentError>;
}

pub struct GatewayRegistry {
    upi: Arc<dyn GatewayAdapter>,
    wallet_phonepe: Arc<dyn GatewayAdapter>,
    wallet_googlepay: Arc<dyn GatewayAdapter>,
    card: Arc<dyn GatewayAdapter>,
    cod: Arc<dyn GatewayAdapter>,
    hosted_checkout: Arc<dyn GatewayAdapter>,
}

impl GatewayRegistry {
    pub fn from_config(cfg: &OrchestratorConfig) -> Self {
        Self {
            upi: Arc::new(upi::UpiAdapter::new(cfg)),
            wallet_phonepe: Arc::new(wallet::WalletRedirectAdapter::new(
                wallet::WalletProvider::Phonepe,
                cfg,
            )),
            wallet_googlepay: Arc::new(wallet::WalletRedirectAdapter::new(
                wallet::WalletProvider::Googlepay,
                cfg,
            )),
            card: Arc::new(card::CardAdapter::new(cfg)),
            cod: Arc::new(cod::CodAdapter),
            hosted_checkout: Arc::new(hosted::HostedCheckoutAdapter::new(cfg)),
        }
    }

    pub fn resolve(&self, method: PaymentMethod) -> Arc<dyn GatewayAdapter> {
        match method {
            PaymentMethod::Upi => self.upi.clone(),
            PaymentMethod::WalletPhonepe => self.wallet_phonepe.clone(),
            PaymentMethod::WalletGooglepay => self.wallet_googlepay.clone(),
            PaymentMethod::Card => self.card.clone(),
            PaymentMethod::Cod => self.cod.clone(),
            PaymentMethod::HostedCheckout => self.hosted_checkout.clone(),
        }
    }
}
