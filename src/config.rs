use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Clone)]
pub struct ValidationPolicy {
    pub enforce_vpa_shape: bool,
    pub reject_expired_cards: bool,
}

#[derive(Clone)]
pub struct OrchestratorConfig {
    pub currency: String,
    pub merchant_vpa: String,
    pub merchant_name: String,
    pub hosted_base_url: String,
    pub hosted_key_id: String,
    pub hosted_key_secret: String,
    pub hosted_mock_behavior: Option<String>,
    pub wallet_redirect_base: String,
    pub card_behavior: String,
    pub upi_provider_behavior: String,
    pub refund_behavior: String,
    pub gateway_timeout_ms: u64,
    pub initiate_max_attempts: u32,
    pub initiate_backoff_ms: u64,
    pub refund_settlement_days: u32,
    pub validation: ValidationPolicy,
}

impl OrchestratorConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            currency: std::env::var("PAYMENTS_CURRENCY").unwrap_or(defaults.currency),
            merchant_vpa: std::env::var("MERCHANT_VPA").unwrap_or(defaults.merchant_vpa),
            merchant_name: std::env::var("MERCHANT_NAME").unwrap_or(defaults.merchant_name),
            hosted_base_url: std::env::var("HOSTED_CHECKOUT_BASE_URL").unwrap_or(defaults.hosted_base_url),
            hosted_key_id: std::env::var("HOSTED_CHECKOUT_KEY_ID").unwrap_or_default(),
            hosted_key_secret: std::env::var("HOSTED_CHECKOUT_KEY_SECRET").unwrap_or(defaults.hosted_key_secret),
            hosted_mock_behavior: match std::env::var("HOSTED_CHECKOUT_MODE").as_deref() {
                Ok("LIVE") => None,
                _ => Some(
                    std::env::var("HOSTED_CHECKOUT_MOCK_BEHAVIOR")
                        .unwrap_or_else(|_| "ALWAYS_SUCCESS".to_string()),
                ),
            },
            wallet_redirect_base: std::env::var("WALLET_REDIRECT_BASE").unwrap_or(defaults.wallet_redirect_base),
            card_behavior: std::env::var("CARD_PROCESSOR_BEHAVIOR").unwrap_or(defaults.card_behavior),
            upi_provider_behavior: std::env::var("UPI_PROVIDER_BEHAVIOR").unwrap_or(defaults.upi_provider_behavior),
            refund_behavior: std::env::var("REFUND_PROVIDER_BEHAVIOR").unwrap_or(defaults.refund_behavior),
            gateway_timeout_ms: std::env::var("GATEWAY_TIMEOUT_MS")
                .ok()
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(defaults.gateway_timeout_ms),
            initiate_max_attempts: std::env::var("INITIATE_MAX_ATTEMPTS")
                .ok()
                .and_then(|s| s.parse::<u32>().ok())
                .unwrap_or(defaults.initiate_max_attempts)
                .max(1),
            initiate_backoff_ms: std::env::var("INITIATE_BACKOFF_MS")
                .ok()
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(defaults.initiate_backoff_ms),
            refund_settlement_days: std::env::var("REFUND_SETTLEMENT_DAYS")
                .ok()
                .and_then(|s| s.parse::<u32>().ok())
                .unwrap_or(defaults.refund_settlement_days)
                .max(1),
            validation: ValidationPolicy {
                enforce_vpa_shape: env_flag("VALIDATE_VPA_SHAPE", defaults.validation.enforce_vpa_shape),
                reject_expired_cards: env_flag("REJECT_EXPIRED_CARDS", defaults.validation.reject_expired_cards),
            },
        }
    }

    pub fn gateway_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.gateway_timeout_ms)
    }
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            currency: "INR".to_string(),
            merchant_vpa: "storefront@okaxis".to_string(),
            merchant_name: "Storefront".to_string(),
            hosted_base_url: "https://api.hostedpay.example".to_string(),
            hosted_key_id: String::new(),
            hosted_key_secret: "dev-hosted-secret".to_string(),
            hosted_mock_behavior: Some("ALWAYS_SUCCESS".to_string()),
            wallet_redirect_base: "https://wallet.example".to_string(),
            card_behavior: "ALWAYS_SUCCESS".to_string(),
            upi_provider_behavior: "ALWAYS_SUCCESS".to_string(),
            refund_behavior: "ALWAYS_SUCCESS".to_string(),
            gateway_timeout_ms: 2500,
            initiate_max_attempts: 3,
            initiate_backoff_ms: 100,
            refund_settlement_days: 5,
            validation: ValidationPolicy {
                enforce_vpa_shape: false,
                reject_expired_cards: false,
            },
        }
    }
}

fn env_flag(name: &str, default: bool) -> bool {
    std::env::var(name)
        .ok()
        .and_then(|s| s.parse::<bool>().ok())
        .unwrap_or(default)
}

#[derive(Clone)]
pub struct BackendAvailability {
    flag: Arc<AtomicBool>,
}

impl BackendAvailability {
    pub fn new(available: bool) -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(available)),
        }
    }

    pub fn is_available(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    pub fn set(&self, available: bool) {
        self.flag.store(available, Ordering::SeqCst);
    }
}

impl Default for BackendAvailability {
    fn default() -> Self {
        Self::new(true)
    }
}
