// Private module declarations
mod carts;
mod catalog;
mod errors;
mod orders;

use actix_web::web;

use crate::metrics::{health_handler, metrics_handler};
use crate::services::ServiceError;

// ============================================================================
// HTTP Surface
// ============================================================================
//
// Handlers parse identifiers and bodies, call one service operation, and
// serialize the result. Expected app data:
// - web::Data<Services>
// - web::Data<Pagination>
// - web::Data<Metrics>
//
// ============================================================================

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _| {
        ServiceError::InvalidArgument(format!("invalid request body: {err}")).into()
    }))
    .app_data(web::QueryConfig::default().error_handler(|err, _| {
        ServiceError::InvalidArgument(format!("invalid query string: {err}")).into()
    }))
    .route("/health", web::get().to(health_handler))
    .route("/metrics", web::get().to(metrics_handler))
    .service(
        web::scope("/api")
            .configure(catalog::configure)
            .configure(orders::configure)
            .configure(carts::configure),
    );
}

#[derive(Debug, serde::Deserialize)]
pub(crate) struct PageQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}


#[cfg(test)]
mod tests {
    use actix_web::{test, App};

    use super::test_support::with_fixture;
    use crate::services::test_support::fixture;

    #[actix_web::test]
    async fn test_health_and_metrics() {
        let fx = fixture();
        let app = test::init_service(App::new().configure(with_fixture(&fx))).await;

        let health: serde_json::Value =
            test::call_and_read_body_json(&app, test::TestRequest::get().uri("/health").to_request()).await;
        assert_eq!(health["status"], "healthy");

        fx.metrics.checkouts_total.inc();
        let resp = test::call_service(&app, test::TestRequest::get().uri("/metrics").to_request()).await;
        assert!(resp.status().is_success());
        let body = test::read_body(resp).await;
        assert!(String::from_utf8_lossy(&body).contains("checkouts_total 1"));
    }

    #[actix_web::test]
    async fn test_malformed_json_is_bad_request() {
        let fx = fixture();
        let app = test::init_service(App::new().configure(with_fixture(&fx))).await;

        let req = test::TestRequest::post()
            .uri("/api/categories")
            .insert_header(("content-type", "application/json"))
            .set_payload("{\"name\":")
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status().as_u16(), 400);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "invalid_argument");
    }
}
