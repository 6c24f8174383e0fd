use crate::config::ValidationPolicy;
use crate::domain::transaction::{CardDetails, CheckoutRequest, PaymentInstrument, PaymentMethod};
use crate::errors::PaymentError;
use chrono::Datelike;

pub fn validate_request(
    req: &CheckoutRequest,
    currency: &str,
    policy: &ValidationPolicy,
) -> Result<(), PaymentError> {
    if req.order_id.trim().is_empty() {
        return Err(field_error("order_id", "MISSING_FIELD", "order id is required"));
    }
    if req.amount_minor <= 0 {
        return Err(field_error("amount", "INVALID_AMOUNT", "amount must be positive"));
    }
    if req.currency != currency {
        return Err(field_error(
            "currency",
            "INVALID_CURRENCY",
            &format!("only {currency} is supported"),
        ));
    }

    match req.method {
        PaymentMethod::Card => validate_card(req, policy),
        PaymentMethod::Upi => validate_upi(req, policy),
        PaymentMethod::WalletPhonepe | PaymentMethod::WalletGooglepay => {
            validate_contact(req, true)
        }
        PaymentMethod::HostedCheckout => validate_contact(req, false),
        PaymentMethod::Cod => Ok(()),
    }
}

fn validate_card(req: &CheckoutRequest, policy: &ValidationPolicy) -> Result<(), PaymentError> {
    let card = match &req.instrument {
        Some(PaymentInstrument::Card(card)) => card,
        _ => {
            return Err(field_error(
                "card",
                "MISSING_FIELD",
                "card details are required",
            ))
        }
    };

    let digits: String = card.number.chars().filter(|c| !c.is_whitespace()).collect();
    if digits.len() != 16 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(field_error(
            "card_number",
            "INVALID_CARD_NUMBER",
            "card number must be exactly 16 digits",
        ));
    }
    if !(3..=4).contains(&card.cvv.len()) || !card.cvv.chars().all(|c| c.is_ascii_digit()) {
        return Err(field_error("cvv", "INVALID_CVV", "cvv must be 3 or 4 digits"));
    }
    if card.holder_name.trim().is_empty() {
        return Err(field_error(
            "holder_name",
            "MISSING_FIELD",
            "name on card is required",
        ));
    }
    if !expiry_shape_ok(&card.expiry) {
        return Err(field_error(
            "expiry",
            "INVALID_EXPIRY",
            "expiry must be in MM/YY form",
        ));
    }
    if policy.reject_expired_cards && card_expired(card) {
        return Err(field_error("expiry", "INVALID_EXPIRY", "card has expired"));
    }
    Ok(())
}

fn validate_upi(req: &CheckoutRequest, policy: &ValidationPolicy) -> Result<(), PaymentError> {
    let vpa = match &req.instrument {
        Some(PaymentInstrument::Upi(upi)) => upi.vpa.as_deref(),
        _ => None,
    };
    if let Some(vpa) = vpa {
        if policy.enforce_vpa_shape && !vpa_shape_ok(vpa) {
            return Err(field_error(
                "vpa",
                "INVALID_UPI_ADDRESS",
                "expected a local@provider address",
            ));
        }
    }
    Ok(())
}

fn validate_contact(req: &CheckoutRequest, phone_required: bool) -> Result<(), PaymentError> {
    if req.customer.name.trim().is_empty() {
        return Err(field_error(
            "customer_name",
            "MISSING_FIELD",
            "customer name is required",
        ));
    }
    if req.customer.email.trim().is_empty() {
        return Err(field_error(
            "customer_email",
            "MISSING_FIELD",
            "customer email is required",
        ));
    }
    if phone_required
        && req
            .customer
            .phone
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .is_none()
    {
        return Err(field_error(
            "customer_phone",
            "MISSING_FIELD",
            "customer phone is required for wallet payments",
        ));
    }
    Ok(())
}

fn expiry_shape_ok(expiry: &str) -> bool {
    let bytes = expiry.as_bytes();
    if bytes.len() != 5 || bytes[2] != b'/' {
        return false;
    }
    if !bytes[..2].iter().all(u8::is_ascii_digit) || !bytes[3..].iter().all(u8::is_ascii_digit) {
        return false;
    }
    matches!(expiry[..2].parse::<u8>(), Ok(1..=12))
}

fn card_expired(card: &CardDetails) -> bool {
    let month = card.expiry[..2].parse::<u32>().unwrap_or(0);
    let year = 2000 + card.expiry[3..].parse::<i32>().unwrap_or(0);
    let now = chrono::Utc::now();
    year < now.year() || (year == now.year() && month < now.month())
}

fn vpa_shape_ok(vpa: &str) -> bool {
    let mut parts = vpa.splitn(2, '@');
    let local = parts.next().unwrap_or_default();
    let provider = parts.next().unwrap_or_default();
    !local.is_empty()
        && local
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        && !provider.is_empty()
        && provider.chars().all(|c| c.is_ascii_alphanumeric())
}

fn field_error(field: &'static str, code: &'static str, message: &str) -> PaymentError {
    PaymentError::Validation {
        field,
        code,
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expiry_shape() {
        assert!(expiry_shape_ok("01/30"));
        assert!(expiry_shape_ok("12/27"));
        assert!(!expiry_shape_ok("13/27"));
        assert!(!expiry_shape_ok("1/27"));
        assert!(!expiry_shape_ok("0127"));
        assert!(!expiry_shape_ok("ab/cd"));
    }

    #[test]
    fn vpa_shape() {
        assert!(vpa_shape_ok("user.name@okhdfcbank"));
        assert!(!vpa_shape_ok("user"));
        assert!(!vpa_shape_ok("@okhdfcbank"));
        assert!(!vpa_shape_ok("user@"));
    }
}
