use crate::error::{AppError, AppResult};
use crate::external::TableStore;
use crate::models::{CaseData, CaseRecord};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Clone)]
pub struct CaseService {
    store: Arc<dyn TableStore>,
    table: String,
}

impl CaseService {
    pub fn new(store: Arc<dyn TableStore>, table: impl Into<String>) -> Self {
        Self {
            store,
            table: table.into(),
        }
    }

    /// Stamps the case with a fresh id and writes it. Every failure, whatever the
    /// cause, comes back as `PersistenceFailed`.
    pub async fn submit_case(&self, data: CaseData) -> AppResult<Uuid> {
        let record = CaseRecord::new(data);
        let case_id = record.case_id;
        let row = serde_json::to_value(&record)?;

        match self.store.insert(&self.table, row).await {
            Ok(rows) if !rows.is_empty() => {
                log::info!("Case {case_id} saved to {}", self.table);
                Ok(case_id)
            }
            Ok(_) => Err(AppError::PersistenceFailed(format!(
                "insert into {} returned no rows",
                self.table
            ))),
            Err(e) => Err(AppError::PersistenceFailed(e.to_string())),
        }
    }
}
