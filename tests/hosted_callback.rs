use std::sync::Arc;
use storefront_payments::config::{BackendAvailability, OrchestratorConfig};
use storefront_payments::domain::transaction::{
    CheckoutRequest, Customer, PaymentArtifact, PaymentMethod,
};
use storefront_payments::gateways::hosted::sign_callback;
use storefront_payments::lifecycle::state::TransactionState;
use storefront_payments::repo::order_repo::InMemoryOrderRepository;
use storefront_payments::service::confirmation::HostedCallback;
use storefront_payments::service::orchestrator::PaymentOrchestrator;

const SECRET: &str = "dev-hosted-secret";

#[tokio::test]
async fn hosted_checkout_stays_pending_until_callback() {
    let (orch, _, _) = orchestrator(OrchestratorConfig::default());
    let out = orch.checkout(hosted_request()).await.unwrap();

    assert!(!out.success);
    assert_eq!(out.status, TransactionState::Initiating);
    match &out.artifact {
        PaymentArtifact::HostedSession {
            session_ref,
            checkout_url,
        } => {
            assert!(session_ref.starts_with("session_"));
            assert!(checkout_url.contains(session_ref.as_str()));
        }
        other => panic!("expected hosted session, got {other:?}"),
    }
}

#[tokio::test]
async fn signed_callback_settles_the_transaction() {
    let (orch, orders, _) = orchestrator(OrchestratorConfig::default());
    let out = orch.checkout(hosted_request()).await.unwrap();

    let signature = sign_callback("ORD1", "PAY77", SECRET).unwrap();
    let res = orch
        .coordinator()
        .hosted_callback(
            out.transaction_id,
            HostedCallback {
                order_id: "ORD1".to_string(),
                payment_id: "PAY77".to_string(),
                signature,
            },
        )
        .await
        .unwrap();

    assert!(res.success);
    assert_eq!(res.status, TransactionState::Succeeded);
    assert_eq!(orders.save_count("ORD1").await, 1);
}

#[tokio::test]
async fn tampered_signature_fails_and_never_settles() {
    let (orch, orders, _) = orchestrator(OrchestratorConfig::default());
    let out = orch.checkout(hosted_request()).await.unwrap();

    let mut signature = sign_callback("ORD1", "PAY77", SECRET).unwrap().into_bytes();
    signature[0] = if signature[0] == b'0' { b'1' } else { b'0' };
    let res = orch
        .coordinator()
        .hosted_callback(
            out.transaction_id,
            HostedCallback {
                order_id: "ORD1".to_string(),
                payment_id: "PAY77".to_string(),
                signature: String::from_utf8(signature).unwrap(),
            },
        )
        .await
        .unwrap();

    assert!(!res.success);
    assert_eq!(res.status, TransactionState::Failed);
    assert_eq!(res.failure_reason.as_deref(), Some("SIGNATURE_MISMATCH"));
    assert_eq!(orders.save_count("ORD1").await, 0);

    let tx = orch.transaction(out.transaction_id).await.unwrap();
    assert_eq!(tx.state, TransactionState::Failed);
}

#[tokio::test]
async fn signature_for_a_different_order_fails() {
    let (orch, _, _) = orchestrator(OrchestratorConfig::default());
    let out = orch.checkout(hosted_request()).await.unwrap();

    // validly signed, but for someone else's order
    let signature = sign_callback("OTHER", "PAY77", SECRET).unwrap();
    let res = orch
        .coordinator()
        .hosted_callback(
            out.transaction_id,
            HostedCallback {
                order_id: "OTHER".to_string(),
                payment_id: "PAY77".to_string(),
                signature,
            },
        )
        .await
        .unwrap();

    assert!(!res.success);
    assert_eq!(res.status, TransactionState::Failed);
}

#[tokio::test]
async fn unavailable_backend_fails_closed_and_leaves_transaction_pending() {
    let (orch, orders, backend) = orchestrator(OrchestratorConfig::default());
    let out = orch.checkout(hosted_request()).await.unwrap();

    backend.set(false);
    let signature = sign_callback("ORD1", "PAY77", SECRET).unwrap();
    let err = orch
        .coordinator()
        .hosted_callback(
            out.transaction_id,
            HostedCallback {
                order_id: "ORD1".to_string(),
                payment_id: "PAY77".to_string(),
                signature: signature.clone(),
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.code(), "BACKEND_UNAVAILABLE");

    let tx = orch.transaction(out.transaction_id).await.unwrap();
    assert_eq!(tx.state, TransactionState::Initiating);
    assert_eq!(orders.save_count("ORD1").await, 0);

    // once the backend returns, the same callback settles normally
    backend.set(true);
    let res = orch
        .coordinator()
        .hosted_callback(
            out.transaction_id,
            HostedCallback {
                order_id: "ORD1".to_string(),
                payment_id: "PAY77".to_string(),
                signature,
            },
        )
        .await
        .unwrap();
    assert!(res.success);
}

#[tokio::test]
async fn rejected_session_fails_at_initiate() {
    let mut cfg = OrchestratorConfig::default();
    cfg.hosted_mock_behavior = Some("ALWAYS_FAILURE".to_string());
    let (orch, _, _) = orchestrator(cfg);

    let out = orch.checkout(hosted_request()).await.unwrap();
    assert_eq!(out.status, TransactionState::Failed);
    assert!(out.failure_reason.is_some());
}

fn orchestrator(
    cfg: OrchestratorConfig,
) -> (
    PaymentOrchestrator,
    Arc<InMemoryOrderRepository>,
    BackendAvailability,
) {
    let orders = Arc::new(InMemoryOrderRepository::new());
    let backend = BackendAvailability::new(true);
    let orch = PaymentOrchestrator::new(cfg, orders.clone(), backend.clone());
    (orch, orders, backend)
}

fn hosted_request() -> CheckoutRequest {
    CheckoutRequest {
        order_id: "ORD1".to_string(),
        amount_minor: 50_000,
        currency: "INR".to_string(),
        method: PaymentMethod::HostedCheckout,
        customer: Customer {
            name: "Asha".to_string(),
            email: "asha@example.com".to_string(),
            phone: None,
        },
        instrument: None,
    }
}
