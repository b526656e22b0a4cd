use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// Which screen the checkout UI shows.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "page", rename_all = "snake_case")]
pub enum Page {
    #[default]
    Home,
    Checkout {
        plan: String,
    },
    Success {
        plan: String,
    },
}

/// Every edge the checkout UI may take between pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    SelectPlan(String),
    PaymentAccepted,
    Dismiss,
    GoHome,
}

impl Page {
    pub fn name(&self) -> &'static str {
        match self {
            Page::Home => "home",
            Page::Checkout { .. } => "checkout",
            Page::Success { .. } => "success",
        }
    }

    pub fn apply(self, transition: Transition) -> AppResult<Page> {
        match (self, transition) {
            (Page::Home | Page::Checkout { .. }, Transition::SelectPlan(plan)) => {
                Ok(Page::Checkout { plan })
            }
            (Page::Checkout { plan }, Transition::PaymentAccepted) => Ok(Page::Success { plan }),
            (Page::Checkout { .. }, Transition::Dismiss) => Ok(Page::Home),
            (Page::Success { .. }, Transition::GoHome) => Ok(Page::Home),
            (page, transition) => Err(AppError::InvalidTransition(format!(
                "{transition:?} is not allowed from {}",
                page.name()
            ))),
        }
    }
}

/// Per-browser state carried between requests in the session cookie.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SessionState {
    #[serde(flatten)]
    pub page: Page,
    #[serde(default)]
    pub admin_authenticated: bool,
}

impl SessionState {
    pub fn apply(self, transition: Transition) -> AppResult<SessionState> {
        Ok(SessionState {
            page: self.page.apply(transition)?,
            admin_authenticated: self.admin_authenticated,
        })
    }

    pub fn selected_plan(&self) -> Option<&str> {
        match &self.page {
            Page::Checkout { plan } | Page::Success { plan } => Some(plan),
            Page::Home => None,
        }
    }
}
