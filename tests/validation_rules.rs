use storefront_payments::config::ValidationPolicy;
use storefront_payments::domain::transaction::{
    CardDetails, CheckoutRequest, Customer, PaymentInstrument, PaymentMethod, UpiDetails,
};
use storefront_payments::service::validation::validate_request;

#[test]
fn short_card_number_is_rejected_as_invalid_card_number() {
    let req = card_request("1234", "12", "A Kumar", "12/30");
    let err = validate_request(&req, "INR", &lenient()).unwrap_err();
    assert_eq!(err.code(), "INVALID_CARD_NUMBER");
}

#[test]
fn spaces_are_stripped_before_card_number_check() {
    let req = card_request("4111 1111 1111 1111", "123", "A Kumar", "12/30");
    assert!(validate_request(&req, "INR", &lenient()).is_ok());
}

#[test]
fn non_digit_card_number_is_rejected() {
    let req = card_request("4111-1111-1111-1111", "123", "A Kumar", "12/30");
    let err = validate_request(&req, "INR", &lenient()).unwrap_err();
    assert_eq!(err.code(), "INVALID_CARD_NUMBER");
}

#[test]
fn short_cvv_is_rejected() {
    let req = card_request("4111111111111111", "12", "A Kumar", "12/30");
    let err = validate_request(&req, "INR", &lenient()).unwrap_err();
    assert_eq!(err.code(), "INVALID_CVV");
}

#[test]
fn blank_holder_name_is_rejected() {
    let req = card_request("4111111111111111", "123", "  ", "12/30");
    let err = validate_request(&req, "INR", &lenient()).unwrap_err();
    assert_eq!(err.code(), "MISSING_FIELD");
}

#[test]
fn malformed_expiry_is_rejected() {
    let req = card_request("4111111111111111", "123", "A Kumar", "1/30");
    let err = validate_request(&req, "INR", &lenient()).unwrap_err();
    assert_eq!(err.code(), "INVALID_EXPIRY");
}

#[test]
fn expired_card_passes_unless_policy_rejects_it() {
    let req = card_request("4111111111111111", "123", "A Kumar", "01/20");
    assert!(validate_request(&req, "INR", &lenient()).is_ok());

    let strict = ValidationPolicy {
        enforce_vpa_shape: false,
        reject_expired_cards: true,
    };
    let err = validate_request(&req, "INR", &strict).unwrap_err();
    assert_eq!(err.code(), "INVALID_EXPIRY");
}

#[test]
fn upi_vpa_is_unchecked_unless_policy_enforces_shape() {
    let mut req = base_request(PaymentMethod::Upi);
    req.instrument = Some(PaymentInstrument::Upi(UpiDetails {
        vpa: Some("not-a-vpa".to_string()),
    }));
    assert!(validate_request(&req, "INR", &lenient()).is_ok());

    let strict = ValidationPolicy {
        enforce_vpa_shape: true,
        reject_expired_cards: false,
    };
    let err = validate_request(&req, "INR", &strict).unwrap_err();
    assert_eq!(err.code(), "INVALID_UPI_ADDRESS");
}

#[test]
fn upi_without_vpa_passes() {
    let req = base_request(PaymentMethod::Upi);
    let strict = ValidationPolicy {
        enforce_vpa_shape: true,
        reject_expired_cards: false,
    };
    assert!(validate_request(&req, "INR", &strict).is_ok());
}

#[test]
fn wallet_requires_phone() {
    let mut req = base_request(PaymentMethod::WalletPhonepe);
    req.customer.phone = None;
    let err = validate_request(&req, "INR", &lenient()).unwrap_err();
    assert_eq!(err.code(), "MISSING_FIELD");
}

#[test]
fn hosted_checkout_requires_email_but_not_phone() {
    let mut req = base_request(PaymentMethod::HostedCheckout);
    req.customer.phone = None;
    assert!(validate_request(&req, "INR", &lenient()).is_ok());

    req.customer.email = String::new();
    let err = validate_request(&req, "INR", &lenient()).unwrap_err();
    assert_eq!(err.code(), "MISSING_FIELD");
}

#[test]
fn cod_needs_nothing_beyond_amount_and_order() {
    let mut req = base_request(PaymentMethod::Cod);
    req.customer.phone = None;
    assert!(validate_request(&req, "INR", &lenient()).is_ok());
}

#[test]
fn non_positive_amount_is_rejected() {
    let mut req = base_request(PaymentMethod::Cod);
    req.amount_minor = 0;
    let err = validate_request(&req, "INR", &lenient()).unwrap_err();
    assert_eq!(err.code(), "INVALID_AMOUNT");
}

#[test]
fn foreign_currency_is_rejected() {
    let mut req = base_request(PaymentMethod::Cod);
    req.currency = "USD".to_string();
    let err = validate_request(&req, "INR", &lenient()).unwrap_err();
    assert_eq!(err.code(), "INVALID_CURRENCY");
}

#[test]
fn blank_order_id_is_rejected() {
    let mut req = base_request(PaymentMethod::Cod);
    req.order_id = " ".to_string();
    let err = validate_request(&req, "INR", &lenient()).unwrap_err();
    assert_eq!(err.code(), "MISSING_FIELD");
}

fn lenient() -> ValidationPolicy {
    ValidationPolicy {
        enforce_vpa_shape: false,
        reject_expired_cards: false,
    }
}

fn base_request(method: PaymentMethod) -> CheckoutRequest {
    CheckoutRequest {
        order_id: "ORD1".to_string(),
        amount_minor: 50_000,
        currency: "INR".to_string(),
        method,
        customer: Customer {
            name: "Asha".to_string(),
            email: "asha@example.com".to_string(),
            phone: Some("9999999999".to_string()),
        },
        instrument: None,
    }
}

fn card_request(number: &str, cvv: &str, holder: &str, expiry: &str) -> CheckoutRequest {
    let mut req = base_request(PaymentMethod::Card);
    req.instrument = Some(PaymentInstrument::Card(CardDetails {
        number: number.to_string(),
        expiry: expiry.to_string(),
        cvv: cvv.to_string(),
        holder_name: holder.to_string(),
    }));
    req
}
