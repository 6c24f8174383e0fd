use crate::config::OrchestratorConfig;
use crate::domain::transaction::{PaymentArtifact, Transaction};
use crate::errors::PaymentError;
use crate::gateways::{
    GatewayAdapter, InitiateOutcome, InitiateStatus, RefundOutcome, VerificationEvidence,
    VerifyOutcome,
};
use hmac::{Hmac, Mac};
use reqwest::StatusCode;
use serde_json::json;
use sha2::Sha256;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

pub struct HostedCheckoutAdapter {
    pub base_url: String,
    pub key_id: String,
    pub key_secret: String,
    pub timeout_ms: u64,
    pub mock_behavior: Option<String>,
    pub refund_behavior: String,
    pub client: reqwest::Client,
}

impl HostedCheckoutAdapter {
    pub fn new(cfg: &OrchestratorConfig) -> Self {
        Self {
            base_url: cfg.hosted_base_url.clone(),
            key_id: cfg.hosted_key_id.clone(),
            key_secret: cfg.hosted_key_secret.clone(),
            timeout_ms: cfg.gateway_timeout_ms,
            mock_behavior: cfg.hosted_mock_behavior.clone(),
            refund_behavior: cfg.refund_behavior.clone(),
            client: reqwest::Client::new(),
        }
    }

    fn session_outcome(&self, session_ref: String) -> InitiateOutcome {
        let checkout_url = format!("{}/checkout/{}", self.base_url, session_ref);
        InitiateOutcome {
            status: InitiateStatus::Pending,
            external_id: Some(session_ref.clone()),
            artifact: PaymentArtifact::HostedSession {
                session_ref,
                checkout_url,
            },
            failure_reason: None,
        }
    }

    async fn create_session(&self, tx: &Transaction) -> Result<InitiateOutcome, PaymentError> {
        let session_url = format!("{}/v1/sessions", self.base_url);
        let body = json!({
            "amount": tx.amount_minor,
            "currency": tx.currency,
            "receipt": tx.order_id,
        });

        let resp = self
            .client
            .post(session_url)
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(&body)
            .timeout(std::time::Duration::from_millis(self.timeout_ms))
            .send()
            .await;

        match resp {
            Ok(r) if r.status().is_success() => {
                let v: serde_json::Value = r.json().await.unwrap_or_default();
                let session_ref = v
                    .get("id")
                    .and_then(|id| id.as_str())
                    .map(ToString::to_string)
                    .ok_or_else(|| {
                        PaymentError::gateway(
                            "MALFORMED_SESSION",
                            "session response carried no id",
                            false,
                        )
                    })?;
                Ok(self.session_outcome(session_ref))
            }
            Ok(r) => {
                let status = r.status();
                let body = r.text().await.unwrap_or_default();
                if status == StatusCode::REQUEST_TIMEOUT {
                    return Err(PaymentError::Timeout {
                        timeout_ms: self.timeout_ms,
                    });
                }
                Err(PaymentError::gateway(
                    &format!("HTTP_{}", status.as_u16()),
                    body.chars().take(200).collect::<String>(),
                    status.is_server_error(),
                ))
            }
            Err(e) if e.is_timeout() => Err(PaymentError::Timeout {
                timeout_ms: self.timeout_ms,
            }),
            Err(e) => Err(PaymentError::gateway("NETWORK_ERROR", e.to_string(), true)),
        }
    }
}

pub fn sign_callback(
    order_id: &str,
    payment_id: &str,
    secret: &str,
) -> Result<String, PaymentError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| PaymentError::gateway("SIGNATURE_KEY", e.to_string(), false))?;
    mac.update(order_id.as_bytes());
    mac.update(b"|");
    mac.update(payment_id.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

fn verify_callback_signature(
    order_id: &str,
    payment_id: &str,
    signature: &str,
    secret: &str,
) -> Result<(), PaymentError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| PaymentError::gateway("SIGNATURE_KEY", e.to_string(), false))?;
    mac.update(order_id.as_bytes());
    mac.update(b"|");
    mac.update(payment_id.as_bytes());
    let provided = hex::decode(signature).map_err(|_| PaymentError::Signature {
        message: "callback signature is not valid hex".to_string(),
    })?;
    mac.verify_slice(&provided).map_err(|_| PaymentError::Signature {
        message: "callback signature mismatch".to_string(),
    })
}

#[async_trait::async_trait]
impl GatewayAdapter for HostedCheckoutAdapter {
    fn name(&self) -> &'static str {
        "hosted_checkout"
    }

    async fn initiate(&self, tx: &Transaction) -> Result<InitiateOutcome, PaymentError> {
        match self.mock_behavior.as_deref() {
            None => self.create_session(tx).await,
            Some("ALWAYS_FAILURE") => Ok(InitiateOutcome {
                status: InitiateStatus::Declined,
                external_id: None,
                artifact: PaymentArtifact::None,
                failure_reason: Some("session rejected by provider".to_string()),
            }),
            Some("ALWAYS_TIMEOUT") => std::future::pending().await,
            Some(_) => Ok(self.session_outcome(format!("session_{}", Uuid::new_v4()))),
        }
    }

    async fn verify(
        &self,
        tx: &Transaction,
        evidence: &VerificationEvidence,
    ) -> Result<VerifyOutcome, PaymentError> {
        match evidence {
            VerificationEvidence::SignedCallback {
                order_id,
                payment_id,
                signature,
            } => {
                verify_callback_signature(order_id, payment_id, signature, &self.key_secret)?;
                if order_id != &tx.order_id {
                    return Ok(VerifyOutcome {
                        settled: false,
                        reason: Some("callback order does not match transaction".to_string()),
                    });
                }
                Ok(VerifyOutcome {
                    settled: true,
                    reason: None,
                })
            }
            _ => Err(PaymentError::gateway(
                "UNSUPPORTED_EVIDENCE",
                "hosted checkout settles through the signed provider callback",
                false,
            )),
        }
    }

    async fn refund(
        &self,
        external_ref: &str,
        amount_minor: i64,
        idempotency_key: &str,
    ) -> Result<RefundOutcome, PaymentError> {
        if self.mock_behavior.is_some() {
            return match self.refund_behavior.as_str() {
                "ALWAYS_FAILURE" => Ok(RefundOutcome {
                    accepted: false,
                    provider_ref: None,
                    reason: Some("refund rejected by provider".to_string()),
                }),
                _ => Ok(RefundOutcome {
                    accepted: true,
                    provider_ref: Some(format!("hosted_rf_{}", Uuid::new_v4())),
                    reason: None,
                }),
            };
        }

        let refund_url = format!("{}/v1/refunds", self.base_url);
        let body = json!({
            "payment_ref": external_ref,
            "amount": amount_minor,
        });

        let resp = self
            .client
            .post(refund_url)
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .header("X-Idempotency-Key", idempotency_key)
            .json(&body)
            .timeout(std::time::Duration::from_millis(self.timeout_ms))
            .send()
            .await;

        match resp {
            Ok(r) if r.status().is_success() => {
                let v: serde_json::Value = r.json().await.unwrap_or_default();
                Ok(RefundOutcome {
                    accepted: true,
                    provider_ref: v
                        .get("id")
                        .and_then(|id| id.as_str())
                        .map(ToString::to_string),
                    reason: None,
                })
            }
            Ok(r) => {
                let status = r.status();
                let body = r.text().await.unwrap_or_default();
                Ok(RefundOutcome {
                    accepted: false,
                    provider_ref: None,
                    reason: Some(format!(
                        "HTTP_{}: {}",
                        status.as_u16(),
                        body.chars().take(200).collect::<String>()
                    )),
                })
            }
            Err(e) if e.is_timeout() => Err(PaymentError::Timeout {
                timeout_ms: self.timeout_ms,
            }),
            Err(e) => Err(PaymentError::gateway("NETWORK_ERROR", e.to_string(), true)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_round_trips() {
        let sig = sign_callback("O1", "P1", "S").unwrap();
        assert!(verify_callback_signature("O1", "P1", &sig, "S").is_ok());
    }

    #[test]
    fn tampered_signature_is_rejected() {
        let sig = sign_callback("O1", "P1", "S").unwrap();
        let mut tampered = sig.into_bytes();
        tampered[0] = if tampered[0] == b'0' { b'1' } else { b'0' };
        let tampered = String::from_utf8(tampered).unwrap();
        let err = verify_callback_signature("O1", "P1", &tampered, "S").unwrap_err();
        assert_eq!(err.code(), "SIGNATURE_MISMATCH");
    }
}
