use crate::models::SessionState;
use crate::utils::{SESSION_COOKIE, SessionTokenService};
use actix_web::{
    Error, HttpMessage,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
};
use futures_util::future::LocalBoxFuture;
use std::future::{Ready, ready};

/// Decodes the session cookie and stores the `SessionState` in the request
/// extensions. A missing, expired or forged cookie yields the default state.
pub struct SessionMiddleware {
    tokens: SessionTokenService,
}

impl SessionMiddleware {
    pub fn new(tokens: SessionTokenService) -> Self {
        Self { tokens }
    }
}

impl<S, B> Transform<S, ServiceRequest> for SessionMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = SessionMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(SessionMiddlewareService {
            service,
            tokens: self.tokens.clone(),
        }))
    }
}

pub struct SessionMiddlewareService<S> {
    service: S,
    tokens: SessionTokenService,
}

impl<S, B> Service<ServiceRequest> for SessionMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let session = match req.cookie(SESSION_COOKIE) {
            Some(cookie) => self
                .tokens
                .decode_session(cookie.value())
                .unwrap_or_else(|e| {
                    log::debug!("Discarding session cookie: {e}");
                    SessionState::default()
                }),
            None => SessionState::default(),
        };

        req.extensions_mut().insert(session);
        Box::pin(self.service.call(req))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Page;
    use actix_web::cookie::Cookie;
    use actix_web::{App, HttpResponse, test, web};

    async fn echo_page(session: web::ReqData<SessionState>) -> HttpResponse {
        HttpResponse::Ok().body(session.page.name())
    }

    #[actix_web::test]
    async fn test_cookie_is_decoded() {
        let tokens = SessionTokenService::new("secret", 60);
        let app = test::init_service(
            App::new()
                .wrap(SessionMiddleware::new(tokens.clone()))
                .route("/", web::get().to(echo_page)),
        )
        .await;

        let token = tokens
            .encode_session(&SessionState {
                page: Page::Success {
                    plan: "Advanced".into(),
                },
                admin_authenticated: false,
            })
            .unwrap();

        let req = test::TestRequest::get()
            .uri("/")
            .cookie(Cookie::new(SESSION_COOKIE, token))
            .to_request();
        let body = test::call_and_read_body(&app, req).await;
        assert_eq!(body, "success");

        let req = test::TestRequest::get()
            .uri("/")
            .cookie(Cookie::new(SESSION_COOKIE, "forged"))
            .to_request();
        let body = test::call_and_read_body(&app, req).await;
        assert_eq!(body, "home");

        let req = test::TestRequest::get().uri("/").to_request();
        let body = test::call_and_read_body(&app, req).await;
        assert_eq!(body, "home");
    }
}
