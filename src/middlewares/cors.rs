use actix_cors::Cors;

/// Only the configured origins may call the API from a browser.
pub fn create_cors(allowed_origins: &[String]) -> Cors {
    allowed_origins
        .iter()
        .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
        .allow_any_method()
        .allow_any_header()
        .supports_credentials()
        .max_age(3600)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::{Method, StatusCode, header};
    use actix_web::{App, HttpResponse, test, web};

    #[actix_web::test]
    async fn test_allow_list() {
        let origins = vec!["https://fundhunt.net".to_string()];
        let app = test::init_service(
            App::new()
                .wrap(create_cors(&origins))
                .route("/data", web::post().to(HttpResponse::Ok)),
        )
        .await;

        let req = test::TestRequest::default()
            .method(Method::OPTIONS)
            .uri("/data")
            .insert_header((header::ORIGIN, "https://fundhunt.net"))
            .insert_header((header::ACCESS_CONTROL_REQUEST_METHOD, "POST"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .unwrap(),
            "https://fundhunt.net"
        );

        let req = test::TestRequest::post()
            .uri("/data")
            .insert_header((header::ORIGIN, "https://evil.example"))
            .to_request();
        let granted = test::try_call_service(&app, req)
            .await
            .map(|resp| {
                resp.headers()
                    .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            })
            .unwrap_or(false);
        assert!(!granted);
    }
}
