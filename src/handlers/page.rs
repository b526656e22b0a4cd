use crate::error::AppResult;
use crate::models::{PLANS, Page, SessionState};
use crate::utils::{SESSION_COOKIE, SessionTokenService};
use actix_web::cookie::{Cookie, SameSite};
use actix_web::http::{StatusCode, header};
use actix_web::HttpResponse;
use askama::Template;

pub struct PlanCard {
    pub title: &'static str,
    pub price: &'static str,
    pub old_price: &'static str,
    pub popular: bool,
    pub features: Vec<String>,
}

#[derive(Template)]
#[template(path = "index.html")]
struct IndexTemplate {
    plans: Vec<PlanCard>,
    checkout_plan: Option<String>,
    success_plan: Option<String>,
    form_error: Option<String>,
    name: String,
    admin_authenticated: bool,
    admin_error: Option<String>,
}

/// Messages shown on top of the page for the current state.
#[derive(Debug, Default)]
pub struct Notices {
    pub form_error: Option<String>,
    pub name: String,
    pub admin_error: Option<String>,
}

pub fn render_page(session: &SessionState, notices: Notices) -> AppResult<String> {
    let plans = PLANS
        .iter()
        .map(|p| PlanCard {
            title: p.title,
            price: p.price,
            old_price: p.old_price,
            popular: p.popular,
            features: p.features(),
        })
        .collect();

    let (checkout_plan, success_plan) = match &session.page {
        Page::Home => (None, None),
        Page::Checkout { plan } => (Some(plan.clone()), None),
        Page::Success { plan } => (None, Some(plan.clone())),
    };

    let template = IndexTemplate {
        plans,
        checkout_plan,
        success_plan,
        form_error: notices.form_error,
        name: notices.name,
        admin_authenticated: session.admin_authenticated,
        admin_error: notices.admin_error,
    };
    Ok(template.render()?)
}

pub fn html_page(
    status: StatusCode,
    session: &SessionState,
    notices: Notices,
) -> AppResult<HttpResponse> {
    let body = render_page(session, notices)?;
    Ok(HttpResponse::build(status)
        .content_type("text/html; charset=utf-8")
        .body(body))
}

/// Stores `session` in the cookie and sends the browser back to `location`.
pub fn redirect_with_session(
    tokens: &SessionTokenService,
    session: &SessionState,
    location: &str,
) -> AppResult<HttpResponse> {
    let token = tokens.encode_session(session)?;
    let cookie = Cookie::build(SESSION_COOKIE, token)
        .path("/")
        .http_only(true)
        .secure(tokens.secure_cookie())
        .same_site(SameSite::Lax)
        .finish();

    Ok(HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .cookie(cookie)
        .finish())
}
