use crate::lifecycle::state::TransactionState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    Upi,
    WalletPhonepe,
    WalletGooglepay,
    Card,
    Cod,
    HostedCheckout,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Upi => "UPI",
            PaymentMethod::WalletPhonepe => "WALLET_PHONEPE",
            PaymentMethod::WalletGooglepay => "WALLET_GOOGLEPAY",
            PaymentMethod::Card => "CARD",
            PaymentMethod::Cod => "COD",
            PaymentMethod::HostedCheckout => "HOSTED_CHECKOUT",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardDetails {
    pub number: String,
    pub expiry: String,
    pub cvv: String,
    pub holder_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpiDetails {
    pub vpa: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentInstrument {
    Card(CardDetails),
    Upi(UpiDetails),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutRequest {
    pub order_id: String,
    pub amount_minor: i64,
    pub currency: String,
    pub method: PaymentMethod,
    pub customer: Customer,
    pub instrument: Option<PaymentInstrument>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Transaction {
    pub id: Uuid,
    pub order_id: String,
    pub method: PaymentMethod,
    pub amount_minor: i64,
    pub currency: String,
    pub customer: Customer,
    pub state: TransactionState,
    pub external_ref: Option<String>,
    pub last4: Option<String>,
    pub failure_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub verified_at: Option<DateTime<Utc>>,
}

impl Transaction {
    pub fn new(req: &CheckoutRequest) -> Self {
        // Raw card numbers stop here; adapters only ever see the derived last4.
        let last4 = match &req.instrument {
            Some(PaymentInstrument::Card(card)) => {
                let digits: String = card.number.chars().filter(|c| c.is_ascii_digit()).collect();
                if digits.len() >= 4 {
                    Some(digits[digits.len() - 4..].to_string())
                } else {
                    None
                }
            }
            _ => None,
        };

        Self {
            id: Uuid::new_v4(),
            order_id: req.order_id.clone(),
            method: req.method,
            amount_minor: req.amount_minor,
            currency: req.currency.clone(),
            customer: req.customer.clone(),
            state: TransactionState::Created,
            external_ref: None,
            last4,
            failure_reason: None,
            created_at: Utc::now(),
            verified_at: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentArtifact {
    None,
    UpiIntent { link: String, qr_payload: String },
    WalletRedirect { url: String },
    CardReceipt { last4: String },
    HostedSession { session_ref: String, checkout_url: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct PaymentOutcome {
    pub success: bool,
    pub transaction_id: Uuid,
    pub status: TransactionState,
    pub failure_reason: Option<String>,
    pub artifact: PaymentArtifact,
}

impl PaymentOutcome {
    pub fn from_transaction(tx: &Transaction, artifact: PaymentArtifact) -> Self {
        Self {
            success: tx.state == TransactionState::Succeeded,
            transaction_id: tx.id,
            status: tx.state,
            failure_reason: tx.failure_reason.clone(),
            artifact,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_last4_from_card_instrument() {
        let req = CheckoutRequest {
            order_id: "ORD1".to_string(),
            amount_minor: 10_000,
            currency: "INR".to_string(),
            method: PaymentMethod::Card,
            customer: Customer {
                name: "A".to_string(),
                email: "a@example.com".to_string(),
                phone: None,
            },
            instrument: Some(PaymentInstrument::Card(CardDetails {
                number: "4111 1111 1111 1111".to_string(),
                expiry: "12/30".to_string(),
                cvv: "123".to_string(),
                holder_name: "A".to_string(),
            })),
        };
        let tx = Transaction::new(&req);
        assert_eq!(tx.last4.as_deref(), Some("1111"));
        assert_eq!(tx.state, TransactionState::Created);
        assert!(tx.external_ref.is_none());
    }
}
