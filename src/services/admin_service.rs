use crate::error::{AppError, AppResult};
use crate::external::{Row, TableStore};
use crate::utils::secrets_match;
use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Arc;
use tokio::sync::Mutex;

pub const EXPORT_FILE_NAME: &str = "crm_payments.txt";

#[derive(Debug)]
struct FailedAttempts {
    count: u32,
    last_failure: DateTime<Utc>,
    locked_until: Option<DateTime<Utc>>,
}

/// Counts consecutive failed logins per client and locks a client out once it
/// reaches the limit. Failures older than the lockout window are forgotten.
pub struct LoginGuard {
    attempts: Mutex<HashMap<String, FailedAttempts>>,
    max_failed_attempts: u32,
    lockout: Duration,
}

impl LoginGuard {
    pub fn new(max_failed_attempts: u32, lockout_secs: i64) -> Self {
        Self {
            attempts: Mutex::new(HashMap::new()),
            max_failed_attempts: max_failed_attempts.max(1),
            lockout: Duration::seconds(lockout_secs),
        }
    }

    fn prune(&self, attempts: &mut HashMap<String, FailedAttempts>, now: DateTime<Utc>) {
        attempts.retain(|_, entry| match entry.locked_until {
            Some(until) => until > now,
            None => entry.last_failure + self.lockout > now,
        });
    }

    pub async fn check(&self, client: &str, now: DateTime<Utc>) -> AppResult<()> {
        let mut attempts = self.attempts.lock().await;
        self.prune(&mut attempts, now);

        // anything still locked after pruning is locked past `now`
        if let Some(until) = attempts.get(client).and_then(|entry| entry.locked_until) {
            let remaining = (until - now).num_seconds().max(1);
            return Err(AppError::TooManyAttempts(remaining));
        }
        Ok(())
    }

    /// Returns the error the caller should report for this failure.
    pub async fn record_failure(&self, client: &str, now: DateTime<Utc>) -> AppError {
        let mut attempts = self.attempts.lock().await;
        self.prune(&mut attempts, now);

        let entry = attempts
            .entry(client.to_string())
            .or_insert_with(|| FailedAttempts {
                count: 0,
                last_failure: now,
                locked_until: None,
            });
        entry.count += 1;
        entry.last_failure = now;

        if entry.count >= self.max_failed_attempts {
            entry.locked_until = Some(now + self.lockout);
            log::warn!(
                "Admin login locked for {client} after {} failed attempts",
                entry.count
            );
            AppError::TooManyAttempts(self.lockout.num_seconds().max(1))
        } else {
            AppError::AuthError("Incorrect password.".to_string())
        }
    }

    pub async fn record_success(&self, client: &str) {
        self.attempts.lock().await.remove(client);
    }

    #[cfg(test)]
    async fn tracked_clients(&self) -> usize {
        self.attempts.lock().await.len()
    }
}

/// Password gate and bulk dump of the payments table.
#[derive(Clone)]
pub struct AdminService {
    store: Arc<dyn TableStore>,
    table: String,
    password: Option<String>,
    guard: Arc<LoginGuard>,
    trusted_proxies: Arc<Vec<IpAddr>>,
}

impl AdminService {
    pub fn new(
        store: Arc<dyn TableStore>,
        table: impl Into<String>,
        password: Option<String>,
        guard: LoginGuard,
    ) -> Self {
        Self {
            store,
            table: table.into(),
            password,
            guard: Arc::new(guard),
            trusted_proxies: Arc::new(Vec::new()),
        }
    }

    /// Peers whose `Forwarded` / `X-Forwarded-For` headers name the real client.
    pub fn with_trusted_proxies(mut self, proxies: Vec<IpAddr>) -> Self {
        self.trusted_proxies = Arc::new(proxies);
        self
    }

    pub fn trusted_proxies(&self) -> &[IpAddr] {
        &self.trusted_proxies
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub async fn authenticate(&self, client: &str, entered: &str) -> AppResult<()> {
        self.authenticate_at(client, entered, Utc::now()).await
    }

    pub async fn authenticate_at(
        &self,
        client: &str,
        entered: &str,
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        self.guard.check(client, now).await?;

        if entered.is_empty() {
            return Err(AppError::ValidationError(
                "Enter admin password.".to_string(),
            ));
        }

        // no configured password: export is off and every entry fails
        let matched = self
            .password
            .as_deref()
            .is_some_and(|expected| secrets_match(entered, expected));

        if matched {
            self.guard.record_success(client).await;
            log::info!("Admin export unlocked for {client}");
            Ok(())
        } else {
            Err(self.guard.record_failure(client, now).await)
        }
    }

    pub async fn export(&self) -> AppResult<String> {
        let rows = self.store.select_all(&self.table).await?;
        if rows.is_empty() {
            return Err(AppError::NotFound(
                "No data found in the payments table.".to_string(),
            ));
        }
        log::info!("Exporting {} row(s) from {}", rows.len(), self.table);
        Ok(format_export(&rows))
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// One line per row, `key: value` pairs joined by `", "`.
pub fn format_export(rows: &[Row]) -> String {
    rows.iter()
        .map(|row| {
            row.iter()
                .map(|(k, v)| format!("{k}: {}", format_value(v)))
                .collect::<Vec<_>>()
                .join(", ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}
