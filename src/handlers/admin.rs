use crate::error::AppError;
use crate::handlers::page::{Notices, html_page, redirect_with_session};
use crate::models::SessionState;
use crate::services::{AdminService, EXPORT_FILE_NAME};
use crate::utils::SessionTokenService;
use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{HttpRequest, HttpResponse, Result, ResponseError, web};
use serde::Deserialize;
use std::net::{IpAddr, SocketAddr};

#[derive(Debug, Deserialize)]
pub struct AdminLoginForm {
    #[serde(default)]
    pub password: String,
}

/// Key for the login lockout. Forwarded headers are client-controlled, so they
/// are only honoured when the connecting peer is a configured proxy.
fn client_key(req: &HttpRequest, trusted_proxies: &[IpAddr]) -> String {
    let Some(peer) = req.peer_addr() else {
        return "unknown".to_string();
    };

    if trusted_proxies.contains(&peer.ip()) {
        let info = req.connection_info();
        if let Some(real) = info.realip_remote_addr() {
            return real
                .parse::<SocketAddr>()
                .map(|addr| addr.ip().to_string())
                .unwrap_or_else(|_| real.to_string());
        }
    }
    peer.ip().to_string()
}

fn admin_page_with_error(session: &SessionState, err: &AppError) -> HttpResponse {
    let notices = Notices {
        admin_error: Some(err.user_message()),
        ..Notices::default()
    };
    html_page(err.status_code(), session, notices).unwrap_or_else(|e| e.error_response())
}

pub async fn admin_login(
    req: HttpRequest,
    tokens: web::Data<SessionTokenService>,
    admin_service: web::Data<AdminService>,
    session: web::ReqData<SessionState>,
    form: web::Form<AdminLoginForm>,
) -> Result<HttpResponse> {
    let session = session.into_inner();
    let client = client_key(&req, admin_service.trusted_proxies());

    match admin_service.authenticate(&client, &form.password).await {
        Ok(()) => {
            let next = SessionState {
                admin_authenticated: true,
                ..session
            };
            Ok(redirect_with_session(&tokens, &next, "/#admin")
                .unwrap_or_else(|e| e.error_response()))
        }
        Err(e) => Ok(admin_page_with_error(&session, &e)),
    }
}

pub async fn admin_logout(
    tokens: web::Data<SessionTokenService>,
    session: web::ReqData<SessionState>,
) -> Result<HttpResponse> {
    let next = SessionState {
        admin_authenticated: false,
        ..session.into_inner()
    };
    match redirect_with_session(&tokens, &next, "/") {
        Ok(resp) => Ok(resp),
        Err(e) => Ok(e.error_response()),
    }
}

pub async fn admin_export(
    admin_service: web::Data<AdminService>,
    session: web::ReqData<SessionState>,
) -> Result<HttpResponse> {
    if !session.admin_authenticated {
        let err = AppError::AuthError("Admin login required.".to_string());
        return Ok(admin_page_with_error(&session, &err));
    }

    match admin_service.export().await {
        Ok(content) => Ok(HttpResponse::Ok()
            .content_type("text/plain; charset=utf-8")
            .insert_header(ContentDisposition {
                disposition: DispositionType::Attachment,
                parameters: vec![DispositionParam::Filename(EXPORT_FILE_NAME.to_string())],
            })
            .body(content)),
        Err(e) => {
            if !matches!(e, AppError::NotFound(_)) {
                log::error!("Error fetching data from {}: {e}", admin_service.table());
            }
            Ok(admin_page_with_error(&session, &e))
        }
    }
}

pub fn admin_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .route("/login", web::post().to(admin_login))
            .route("/logout", web::post().to(admin_logout))
            .route("/export", web::get().to(admin_export)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::memory::MemoryStore;
    use crate::middlewares::SessionMiddleware;
    use crate::services::LoginGuard;
    use crate::utils::SESSION_COOKIE;
    use actix_web::cookie::Cookie;
    use actix_web::http::{StatusCode, header};
    use actix_web::{App, test};
    use serde_json::json;
    use std::sync::Arc;

    const SECRET: &str = "test-secret";

    macro_rules! init_app {
        ($store:expr) => {
            init_app!($store, Vec::new())
        };
        ($store:expr, $proxies:expr) => {
            test::init_service(
                App::new()
                    .wrap(SessionMiddleware::new(SessionTokenService::new(SECRET, 600)))
                    .app_data(web::Data::new(SessionTokenService::new(SECRET, 600)))
                    .app_data(web::Data::new(
                        AdminService::new(
                            $store,
                            "payment_page",
                            Some("hunter2".to_string()),
                            LoginGuard::new(2, 300),
                        )
                        .with_trusted_proxies($proxies),
                    ))
                    .configure(admin_config),
            )
            .await
        };
    }

    fn wrong_login_from(peer: &str, forwarded_for: &str) -> test::TestRequest {
        test::TestRequest::post()
            .uri("/admin/login")
            .peer_addr(peer.parse().unwrap())
            .insert_header(("x-forwarded-for", forwarded_for))
            .set_form([("password", "nope")])
    }

    fn session_cookie(resp: &actix_web::dev::ServiceResponse) -> Option<Cookie<'static>> {
        resp.response()
            .cookies()
            .find(|c| c.name() == SESSION_COOKIE)
            .map(|c| c.into_owned())
    }

    fn store_with_payment() -> Arc<MemoryStore> {
        Arc::new(MemoryStore::with_rows(
            "payment_page",
            vec![
                json!({"id": 1, "name": "Jane Doe", "card_number": "************1111", "plan": "Advanced"}),
                json!({"id": 2, "name": "Joe", "card_number": "************0005", "plan": "Premium"}),
            ],
        ))
    }

    #[actix_web::test]
    async fn test_export_requires_login() {
        let app = init_app!(store_with_payment());

        let req = test::TestRequest::get().uri("/admin/export").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let body = test::read_body(resp).await;
        assert!(!String::from_utf8_lossy(&body).contains("Jane Doe"));
    }

    #[actix_web::test]
    async fn test_login_then_download() {
        let app = init_app!(store_with_payment());

        let req = test::TestRequest::post()
            .uri("/admin/login")
            .set_form([("password", "hunter2")])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        let cookie = session_cookie(&resp).unwrap();

        let req = test::TestRequest::get()
            .uri("/admin/export")
            .cookie(cookie)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/plain; charset=utf-8"
        );
        let disposition = resp
            .headers()
            .get(header::CONTENT_DISPOSITION)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(disposition.starts_with("attachment"));
        assert!(disposition.contains("crm_payments.txt"));

        let body = test::read_body(resp).await;
        assert_eq!(
            String::from_utf8_lossy(&body),
            "id: 1, name: Jane Doe, card_number: ************1111, plan: Advanced\n\
             id: 2, name: Joe, card_number: ************0005, plan: Premium"
        );
    }

    #[actix_web::test]
    async fn test_wrong_password_then_lockout() {
        let app = init_app!(store_with_payment());

        let req = test::TestRequest::post()
            .uri("/admin/login")
            .set_form([("password", "hunter3")])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert!(session_cookie(&resp).is_none());
        let body = test::read_body(resp).await;
        assert!(String::from_utf8_lossy(&body).contains("Incorrect password."));

        let req = test::TestRequest::post()
            .uri("/admin/login")
            .set_form([("password", "Hunter2")])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);

        let req = test::TestRequest::post()
            .uri("/admin/login")
            .set_form([("password", "hunter2")])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[actix_web::test]
    async fn test_rotating_forwarded_for_does_not_reset_lockout() {
        let app = init_app!(store_with_payment());

        let mut statuses = Vec::new();
        for i in 0..5 {
            let req = wrong_login_from("10.0.0.1:40000", &format!("203.0.113.{i}")).to_request();
            statuses.push(test::call_service(&app, req).await.status());
        }

        assert_eq!(statuses[0], StatusCode::UNAUTHORIZED);
        assert!(
            statuses[1..]
                .iter()
                .all(|s| *s == StatusCode::TOO_MANY_REQUESTS)
        );

        // a new source port is still the same peer
        let req = test::TestRequest::post()
            .uri("/admin/login")
            .peer_addr("10.0.0.1:40001".parse().unwrap())
            .set_form([("password", "hunter2")])
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::TOO_MANY_REQUESTS
        );
    }

    #[actix_web::test]
    async fn test_trusted_proxy_forwards_client_address() {
        let proxy: IpAddr = "10.0.0.1".parse().unwrap();
        let app = init_app!(store_with_payment(), vec![proxy]);

        for i in 0..3 {
            let req = wrong_login_from("10.0.0.1:40000", &format!("203.0.113.{i}")).to_request();
            assert_eq!(
                test::call_service(&app, req).await.status(),
                StatusCode::UNAUTHORIZED
            );
        }

        let req = wrong_login_from("10.0.0.1:40000", "203.0.113.0").to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::TOO_MANY_REQUESTS
        );

        // untrusted peers cannot pick their own key
        let req = wrong_login_from("10.0.0.9:40000", "203.0.113.7").to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::UNAUTHORIZED
        );
        let req = wrong_login_from("10.0.0.9:40000", "203.0.113.8").to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::TOO_MANY_REQUESTS
        );
    }

    #[actix_web::test]
    async fn test_empty_table_and_logout() {
        let app = init_app!(Arc::new(MemoryStore::default()));

        let req = test::TestRequest::post()
            .uri("/admin/login")
            .set_form([("password", "hunter2")])
            .to_request();
        let cookie = session_cookie(&test::call_service(&app, req).await).unwrap();

        let req = test::TestRequest::get()
            .uri("/admin/export")
            .cookie(cookie.clone())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body = test::read_body(resp).await;
        assert!(String::from_utf8_lossy(&body).contains("No data found"));

        let req = test::TestRequest::post()
            .uri("/admin/logout")
            .cookie(cookie)
            .to_request();
        let cookie = session_cookie(&test::call_service(&app, req).await).unwrap();
        let session = SessionTokenService::new(SECRET, 600)
            .decode_session(cookie.value())
            .unwrap();
        assert!(!session.admin_authenticated);
    }
}
