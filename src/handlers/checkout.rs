use crate::error::AppError;
use crate::handlers::page::{Notices, html_page, redirect_with_session};
use crate::models::*;
use crate::services::PaymentService;
use crate::utils::{SessionTokenService, detect_brand_by_prefix};
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, Result, ResponseError, web};

pub async fn index(session: web::ReqData<SessionState>) -> Result<HttpResponse> {
    match html_page(StatusCode::OK, &session, Notices::default()) {
        Ok(resp) => Ok(resp),
        Err(e) => Ok(e.error_response()),
    }
}

pub async fn buy_plan(
    tokens: web::Data<SessionTokenService>,
    session: web::ReqData<SessionState>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let title = path.into_inner();
    let Some(plan) = find_plan(&title) else {
        return Ok(AppError::NotFound(format!("Unknown plan: {title}")).error_response());
    };

    let result = session
        .into_inner()
        .apply(Transition::SelectPlan(plan.title.to_string()))
        .and_then(|next| redirect_with_session(&tokens, &next, "/"));

    match result {
        Ok(resp) => Ok(resp),
        Err(e) => Ok(e.error_response()),
    }
}

pub async fn submit_checkout(
    tokens: web::Data<SessionTokenService>,
    payment_service: web::Data<PaymentService>,
    session: web::ReqData<SessionState>,
    form: web::Form<PaymentForm>,
) -> Result<HttpResponse> {
    let session = session.into_inner();
    let Page::Checkout { plan } = session.page.clone() else {
        return Ok(AppError::InvalidTransition(
            "No plan selected for checkout".to_string(),
        )
        .error_response());
    };

    let form = form.into_inner();
    let name = form.name.clone();

    let result = match payment_service.submit_payment(form, &plan).await {
        Ok(_) => session
            .apply(Transition::PaymentAccepted)
            .and_then(|next| redirect_with_session(&tokens, &next, "/")),
        Err(e) => {
            let status = match &e {
                AppError::ValidationError(_) => StatusCode::UNPROCESSABLE_ENTITY,
                AppError::PersistenceFailed(cause) => {
                    log::error!("Failed to save payment info: {cause}");
                    StatusCode::INTERNAL_SERVER_ERROR
                }
                other => other.status_code(),
            };
            let notices = Notices {
                form_error: Some(e.user_message()),
                name,
                admin_error: None,
            };
            html_page(status, &session, notices)
        }
    };

    match result {
        Ok(resp) => Ok(resp),
        Err(e) => Ok(e.error_response()),
    }
}

fn apply_and_redirect(
    tokens: &SessionTokenService,
    session: SessionState,
    transition: Transition,
) -> HttpResponse {
    session
        .apply(transition)
        .and_then(|next| redirect_with_session(tokens, &next, "/"))
        .unwrap_or_else(|e| e.error_response())
}

pub async fn dismiss_checkout(
    tokens: web::Data<SessionTokenService>,
    session: web::ReqData<SessionState>,
) -> Result<HttpResponse> {
    Ok(apply_and_redirect(
        &tokens,
        session.into_inner(),
        Transition::Dismiss,
    ))
}

pub async fn go_home(
    tokens: web::Data<SessionTokenService>,
    session: web::ReqData<SessionState>,
) -> Result<HttpResponse> {
    Ok(apply_and_redirect(
        &tokens,
        session.into_inner(),
        Transition::GoHome,
    ))
}

/// Live brand hint for the card field.
pub async fn card_brand(query: web::Json<CardBrandQuery>) -> HttpResponse {
    HttpResponse::Ok().json(CardBrandHint::new(detect_brand_by_prefix(&query.number)))
}

pub fn checkout_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index))
        .route("/plans/{title}/buy", web::post().to(buy_plan))
        .route("/checkout", web::post().to(submit_checkout))
        .route("/checkout/dismiss", web::post().to(dismiss_checkout))
        .route("/home", web::post().to(go_home))
        .route("/card-brand", web::post().to(card_brand));
}
