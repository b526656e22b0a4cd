use serde::{Deserialize, Serialize};

use crate::utils::{CardBrand, mask_card_number};

/// Raw fields from the checkout dialog form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaymentForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub card_number: String,
    #[serde(default)]
    pub expiry: String,
    #[serde(default)]
    pub cvv: String,
}

/// Payment form that passed validation, tagged with the detected brand.
#[derive(Debug, Clone)]
pub struct ValidatedPayment {
    pub form: PaymentForm,
    pub brand: Option<CardBrand>,
    pub plan: String,
}

/// Row written to the payments table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentRecord {
    pub name: String,
    pub card_number: String,
    pub expiry: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cvv: Option<String>,
    pub plan: String,
}

impl PaymentRecord {
    /// Card number and CVV are only kept verbatim when `persist_raw` is set;
    /// otherwise the number is masked and the CVV dropped.
    pub fn from_validated(payment: ValidatedPayment, persist_raw: bool) -> Self {
        let ValidatedPayment { form, plan, .. } = payment;
        if persist_raw {
            Self {
                name: form.name,
                card_number: form.card_number,
                expiry: form.expiry,
                cvv: Some(form.cvv),
                plan,
            }
        } else {
            Self {
                name: form.name,
                card_number: mask_card_number(&form.card_number),
                expiry: form.expiry,
                cvv: None,
                plan,
            }
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CardBrandQuery {
    #[serde(default)]
    pub number: String,
}

#[derive(Debug, Serialize)]
pub struct CardBrandHint {
    pub brand: &'static str,
}

impl CardBrandHint {
    pub fn new(brand: Option<CardBrand>) -> Self {
        Self {
            brand: brand.map(|b| b.as_str()).unwrap_or("Unknown"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validated() -> ValidatedPayment {
        ValidatedPayment {
            form: PaymentForm {
                name: "Jane Doe".to_string(),
                card_number: "4111 1111 1111 1111".to_string(),
                expiry: "12/26".to_string(),
                cvv: "123".to_string(),
            },
            brand: Some(CardBrand::Visa),
            plan: "Advanced".to_string(),
        }
    }

    #[test]
    fn test_masked_record() {
        let record = PaymentRecord::from_validated(validated(), false);
        assert_eq!(record.card_number, "************1111");
        assert_eq!(record.cvv, None);

        let row = serde_json::to_value(&record).unwrap();
        assert!(row.get("cvv").is_none());
        assert_eq!(row["plan"], "Advanced");
    }

    #[test]
    fn test_raw_record_keeps_submitted_values() {
        let record = PaymentRecord::from_validated(validated(), true);
        assert_eq!(record.card_number, "4111 1111 1111 1111");
        assert_eq!(record.cvv.as_deref(), Some("123"));
    }

    #[test]
    fn test_brand_hint() {
        assert_eq!(CardBrandHint::new(Some(CardBrand::Amex)).brand, "AMEX");
        assert_eq!(CardBrandHint::new(None).brand, "Unknown");
    }
}
