use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;

use super::{Row, TableStore};
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InsertBehavior {
    #[default]
    Echo,
    EchoNothing,
    Fail,
}

/// In-process stand-in for the hosted database used by handler and service tests.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<HashMap<String, Vec<Row>>>,
    behavior: InsertBehavior,
}

impl MemoryStore {
    pub fn with_behavior(behavior: InsertBehavior) -> Self {
        Self {
            behavior,
            ..Self::default()
        }
    }

    pub fn with_rows(table: &str, rows: Vec<Value>) -> Self {
        let rows = rows
            .into_iter()
            .filter_map(|v| match v {
                Value::Object(map) => Some(map),
                _ => None,
            })
            .collect();
        let store = Self::default();
        store.tables.lock().unwrap().insert(table.to_string(), rows);
        store
    }

    pub fn rows(&self, table: &str) -> Vec<Row> {
        self.tables
            .lock()
            .unwrap()
            .get(table)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl TableStore for MemoryStore {
    async fn insert(&self, table: &str, row: Value) -> AppResult<Vec<Row>> {
        match self.behavior {
            InsertBehavior::Fail => Err(AppError::ExternalApiError(
                "HTTP 503: upstream unavailable".to_string(),
            )),
            InsertBehavior::EchoNothing => Ok(Vec::new()),
            InsertBehavior::Echo => {
                let Value::Object(row) = row else {
                    return Err(AppError::InternalError("row is not an object".to_string()));
                };
                self.tables
                    .lock()
                    .unwrap()
                    .entry(table.to_string())
                    .or_default()
                    .push(row.clone());
                Ok(vec![row])
            }
        }
    }

    async fn select_all(&self, table: &str) -> AppResult<Vec<Row>> {
        Ok(self.rows(table))
    }
}
