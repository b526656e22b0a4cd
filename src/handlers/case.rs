use crate::error::AppError;
use crate::models::*;
use crate::services::CaseService;
use actix_web::{HttpRequest, HttpResponse, Result, ResponseError, error, web};

#[utoipa::path(
    post,
    path = "/data",
    tag = "case",
    request_body = CaseData,
    responses(
        (status = 200, description = "Case saved", body = CaseCreatedResponse),
        (status = 400, description = "Missing or malformed field", body = ApiErrorResponse),
        (status = 500, description = "Case could not be saved", body = ApiErrorResponse)
    )
)]
pub async fn create_case(
    case_service: web::Data<CaseService>,
    request: web::Json<CaseData>,
) -> Result<HttpResponse> {
    match case_service.submit_case(request.into_inner()).await {
        Ok(case_id) => Ok(HttpResponse::Ok().json(CaseCreatedResponse { case_id })),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    options,
    path = "/data",
    tag = "case",
    responses(
        (status = 204, description = "Preflight accepted")
    )
)]
pub async fn case_preflight() -> HttpResponse {
    HttpResponse::NoContent().finish()
}

/// Body errors become `VALIDATION_ERROR` responses before the handler runs.
fn json_error_handler(err: error::JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AppError::ValidationError(err.to_string()).into()
}

pub fn case_config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .service(
            web::resource("/data")
                .route(web::post().to(create_case))
                .route(web::method(actix_web::http::Method::OPTIONS).to(case_preflight)),
        );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::memory::{InsertBehavior, MemoryStore};
    use actix_web::http::{Method, StatusCode};
    use actix_web::{App, test};
    use serde_json::{Value, json};
    use std::sync::Arc;
    use uuid::Uuid;

    fn payload() -> Value {
        json!({
            "first_name": "A", "last_name": "B", "phone_number": "123",
            "email": "a@b.com", "type_of_issue": "x", "scam_type": "y",
            "description": "z"
        })
    }

    macro_rules! init_app {
        ($store:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new(CaseService::new($store, "cases")))
                    .configure(case_config),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn test_create_case_returns_uuid() {
        let store = Arc::new(MemoryStore::default());
        let app = init_app!(store.clone());

        let req = test::TestRequest::post()
            .uri("/data")
            .set_json(payload())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: Value = test::read_body_json(resp).await;
        let case_id = body["case_id"].as_str().unwrap();
        assert_eq!(case_id.len(), 36);
        assert!(Uuid::parse_str(case_id).is_ok());

        let rows = store.rows("cases");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["case_id"], case_id);
    }

    #[actix_web::test]
    async fn test_identical_payloads_get_distinct_ids() {
        let app = init_app!(Arc::new(MemoryStore::default()));

        let mut ids = Vec::new();
        for _ in 0..2 {
            let req = test::TestRequest::post()
                .uri("/data")
                .set_json(payload())
                .to_request();
            let body: Value = test::call_and_read_body_json(&app, req).await;
            ids.push(body["case_id"].as_str().unwrap().to_string());
        }
        assert_ne!(ids[0], ids[1]);
    }

    #[actix_web::test]
    async fn test_missing_field_is_rejected_before_write() {
        let store = Arc::new(MemoryStore::default());
        let app = init_app!(store.clone());

        let mut body = payload();
        body.as_object_mut().unwrap().remove("email");
        let req = test::TestRequest::post()
            .uri("/data")
            .set_json(body)
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert!(store.rows("cases").is_empty());
    }

    #[actix_web::test]
    async fn test_store_failure_maps_to_fixed_500() {
        let app = init_app!(Arc::new(MemoryStore::with_behavior(InsertBehavior::Fail)));

        let req = test::TestRequest::post()
            .uri("/data")
            .set_json(payload())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"]["code"], "PERSISTENCE_ERROR");
        assert_eq!(
            body["error"]["message"],
            crate::error::PERSISTENCE_FAILED_MESSAGE
        );
    }

    #[actix_web::test]
    async fn test_empty_echo_maps_to_fixed_500() {
        let app = init_app!(Arc::new(MemoryStore::with_behavior(
            InsertBehavior::EchoNothing
        )));

        let req = test::TestRequest::post()
            .uri("/data")
            .set_json(payload())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[actix_web::test]
    async fn test_options_is_no_content() {
        let app = init_app!(Arc::new(MemoryStore::default()));

        let req = test::TestRequest::default()
            .method(Method::OPTIONS)
            .uri("/data")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
        let body = test::read_body(resp).await;
        assert!(body.is_empty());
    }
}
