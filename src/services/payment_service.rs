use crate::error::{AppError, AppResult};
use crate::external::TableStore;
use crate::models::{PaymentForm, PaymentRecord, ValidatedPayment, find_plan};
use crate::utils::{
    CardBrand, CardPolicy, MAX_NAME_LENGTH, validate_card_number, validate_cvv, validate_expiry,
};
use std::sync::Arc;

/// Runs the checkout form rules in order and stops at the first one broken.
pub fn validate_payment(
    form: PaymentForm,
    plan: &str,
    policy: CardPolicy,
) -> AppResult<ValidatedPayment> {
    if form.name.trim().is_empty()
        || form.card_number.trim().is_empty()
        || form.expiry.trim().is_empty()
        || form.cvv.trim().is_empty()
    {
        return Err(AppError::ValidationError(
            "All fields are required.".to_string(),
        ));
    }

    if form.name.chars().count() > MAX_NAME_LENGTH {
        return Err(AppError::ValidationError(
            "Name must not be too long.".to_string(),
        ));
    }

    let brand = validate_card_number(&form.card_number, policy)?;
    validate_expiry(&form.expiry)?;
    validate_cvv(&form.cvv, brand)?;

    let plan = find_plan(plan)
        .ok_or_else(|| AppError::NotFound(format!("Unknown plan: {plan}")))?
        .title
        .to_string();

    Ok(ValidatedPayment { form, brand, plan })
}

#[derive(Clone)]
pub struct PaymentService {
    store: Arc<dyn TableStore>,
    table: String,
    policy: CardPolicy,
    persist_raw: bool,
}

impl PaymentService {
    pub fn new(
        store: Arc<dyn TableStore>,
        table: impl Into<String>,
        policy: CardPolicy,
        persist_raw: bool,
    ) -> Self {
        if persist_raw {
            log::warn!("Card numbers and CVVs will be stored in plaintext");
        }
        Self {
            store,
            table: table.into(),
            policy,
            persist_raw,
        }
    }

    pub async fn submit_payment(
        &self,
        form: PaymentForm,
        plan: &str,
    ) -> AppResult<Option<CardBrand>> {
        let payment = validate_payment(form, plan, self.policy)?;
        let brand = payment.brand;
        let record = PaymentRecord::from_validated(payment, self.persist_raw);
        let row = serde_json::to_value(&record)?;

        if self.persist_raw {
            log::warn!("Writing plaintext card data to {}", self.table);
        }

        match self.store.insert(&self.table, row).await {
            Ok(rows) if !rows.is_empty() => {
                log::info!(
                    "Payment details saved for plan {} (brand {})",
                    record.plan,
                    brand.map(|b| b.as_str()).unwrap_or("unknown")
                );
                Ok(brand)
            }
            Ok(_) => Err(AppError::PersistenceFailed(format!(
                "insert into {} returned no rows",
                self.table
            ))),
            Err(e) => Err(AppError::PersistenceFailed(e.to_string())),
        }
    }
}
