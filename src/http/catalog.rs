use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::domain::catalog::{NewCategory, NewProduct, NewVariation};
use crate::services::{parse_id, Pagination, ServiceError, Services};
use crate::store::ProductFilter;

pub(super) fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/categories")
            .route(web::get().to(list_categories))
            .route(web::post().to(create_category)),
    )
    .route("/categories/{id}", web::get().to(get_category))
    .service(
        web::resource("/products")
            .route(web::get().to(list_products))
            .route(web::post().to(create_product)),
    )
    .service(
        web::resource("/products/{id}")
            .route(web::get().to(get_product))
            .route(web::delete().to(delete_product)),
    )
    .route("/products/{id}/variations", web::post().to(add_variation))
    .route("/variations/{id}/stock", web::put().to(set_stock));
}

#[derive(Debug, Deserialize)]
struct ProductQuery {
    category_id: Option<Uuid>,
    page: Option<u32>,
    limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct StockUpdate {
    stock: i32,
}

async fn create_category(
    services: web::Data<Services>,
    body: web::Json<NewCategory>,
) -> Result<HttpResponse, ServiceError> {
    let category = services.catalog.create_category(body.into_inner()).await?;
    Ok(HttpResponse::Created().json(category))
}

async fn list_categories(services: web::Data<Services>) -> Result<HttpResponse, ServiceError> {
    Ok(HttpResponse::Ok().json(services.catalog.list_categories().await?))
}

async fn get_category(
    services: web::Data<Services>,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let id = parse_id(&path, "category")?;
    Ok(HttpResponse::Ok().json(services.catalog.get_category(id).await?))
}

async fn create_product(
    services: web::Data<Services>,
    body: web::Json<NewProduct>,
) -> Result<HttpResponse, ServiceError> {
    let product = services.catalog.create_product(body.into_inner()).await?;
    Ok(HttpResponse::Created().json(product))
}

async fn list_products(
    services: web::Data<Services>,
    pagination: web::Data<Pagination>,
    query: web::Query<ProductQuery>,
) -> Result<HttpResponse, ServiceError> {
    let query = query.into_inner();
    let filter = ProductFilter {
        category_id: query.category_id,
    };
    let page = pagination.page(query.page, query.limit);
    Ok(HttpResponse::Ok().json(services.catalog.list_products(&filter, page).await?))
}

async fn get_product(
    services: web::Data<Services>,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let id = parse_id(&path, "product")?;
    Ok(HttpResponse::Ok().json(services.catalog.get_product(id).await?))
}

async fn delete_product(
    services: web::Data<Services>,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let id = parse_id(&path, "product")?;
    services.catalog.delete_product(id).await?;
    Ok(HttpResponse::NoContent().finish())
}

async fn add_variation(
    services: web::Data<Services>,
    path: web::Path<String>,
    body: web::Json<NewVariation>,
) -> Result<HttpResponse, ServiceError> {
    let product_id = parse_id(&path, "product")?;
    let variation = services
        .catalog
        .add_variation(product_id, body.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(variation))
}

async fn set_stock(
    services: web::Data<Services>,
    path: web::Path<String>,
    body: web::Json<StockUpdate>,
) -> Result<HttpResponse, ServiceError> {
    let variation_id = parse_id(&path, "variation")?;
    services
        .catalog
        .set_variation_stock(variation_id, body.stock)
        .await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "variation_id": variation_id,
        "stock": body.stock,
    })))
}

#[cfg(test)]
mod tests {
    use actix_web::{test, App};
    use serde_json::{json, Value};

    use crate::http::test_support::with_fixture;
    use crate::services::test_support::{fixture, seed_product, stock_of};

    #[actix_web::test]
    async fn test_category_lifecycle() {
        let fx = fixture();
        let app = test::init_service(App::new().configure(with_fixture(&fx))).await;

        let req = test::TestRequest::post()
            .uri("/api/categories")
            .set_json(json!({"name": "Lighting", "slug": "lighting"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status().as_u16(), 201);
        let created: Value = test::read_body_json(resp).await;

        let id = created["id"].as_str().unwrap();
        let fetched: Value = test::call_and_read_body_json(
            &app,
            test::TestRequest::get().uri(&format!("/api/categories/{id}")).to_request(),
        )
        .await;
        assert_eq!(fetched["slug"], "lighting");

        let duplicate = test::TestRequest::post()
            .uri("/api/categories")
            .set_json(json!({"name": "Lights", "slug": "lighting"}))
            .to_request();
        assert_eq!(test::call_service(&app, duplicate).await.status().as_u16(), 409);

        let listed: Value = test::call_and_read_body_json(
            &app,
            test::TestRequest::get().uri("/api/categories").to_request(),
        )
        .await;
        assert_eq!(listed.as_array().unwrap().len(), 1);
    }

    #[actix_web::test]
    async fn test_malformed_id_is_bad_request() {
        let fx = fixture();
        let app = test::init_service(App::new().configure(with_fixture(&fx))).await;

        let resp = test::call_service(
            &app,
            test::TestRequest::get().uri("/api/products/not-a-uuid").to_request(),
        )
        .await;
        assert_eq!(resp.status().as_u16(), 400);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "invalid product id: not-a-uuid");
    }

    #[actix_web::test]
    async fn test_product_create_list_and_variation() {
        let fx = fixture();
        let app = test::init_service(App::new().configure(with_fixture(&fx))).await;

        let req = test::TestRequest::post()
            .uri("/api/products")
            .set_json(json!({
                "name": "Desk Lamp",
                "variations": [{"sku": "LAMP-B", "price": 1999, "stock": 4}]
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status().as_u16(), 201);
        let product: Value = test::read_body_json(resp).await;
        let product_id = product["id"].as_str().unwrap().to_string();

        let req = test::TestRequest::post()
            .uri(&format!("/api/products/{product_id}/variations"))
            .set_json(json!({"sku": "LAMP-W", "price": 2099, "stock": 2, "attributes": {"colour": "white"}}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status().as_u16(), 201);
        let variation: Value = test::read_body_json(resp).await;
        assert_eq!(variation["attributes"]["colour"], "white");

        let req = test::TestRequest::post()
            .uri(&format!("/api/products/{product_id}/variations"))
            .set_json(json!({"sku": "LAMP-B", "price": 1, "stock": 1}))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status().as_u16(), 409);

        let listed: Value = test::call_and_read_body_json(
            &app,
            test::TestRequest::get().uri("/api/products?page=1&limit=5").to_request(),
        )
        .await;
        assert_eq!(listed["total"], 1);
        assert_eq!(listed["items"][0]["variations"].as_array().unwrap().len(), 2);
    }

    #[actix_web::test]
    async fn test_set_stock_and_delete() {
        let fx = fixture();
        let app = test::init_service(App::new().configure(with_fixture(&fx))).await;
        let product = seed_product(&fx.catalog, "PEN", 150, 2).await;
        let variation_id = product.variations[0].id;

        let req = test::TestRequest::put()
            .uri(&format!("/api/variations/{variation_id}/stock"))
            .set_json(json!({"stock": 25}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["stock"], 25);
        assert_eq!(stock_of(&fx.catalog, &product).await, 25);

        let req = test::TestRequest::put()
            .uri(&format!("/api/variations/{variation_id}/stock"))
            .set_json(json!({"stock": -3}))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status().as_u16(), 400);

        let req = test::TestRequest::delete()
            .uri(&format!("/api/products/{}", product.id))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status().as_u16(), 204);

        let req = test::TestRequest::get()
            .uri(&format!("/api/products/{}", product.id))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status().as_u16(), 404);
    }
}
