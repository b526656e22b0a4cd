use actix_web::web;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::handlers;
use crate::models::*;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::case::create_case,
        handlers::case::case_preflight,
    ),
    components(
        schemas(
            CaseData,
            CaseCreatedResponse,
            ApiErrorResponse,
            ApiError,
        )
    ),
    tags(
        (name = "case", description = "Case intake API"),
    ),
    info(
        title = "FundHunt Case Intake API",
        version = "0.1.0",
        description = "Accepts case intake forms and returns a case id",
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}
