use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::domain::order::ShippingInfo;
use crate::services::{parse_id, ServiceError, Services};

pub(super) fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/carts/{user_id}")
            .route(web::get().to(get_cart))
            .route(web::delete().to(delete_cart)),
    )
    .service(
        web::resource("/carts/{user_id}/items")
            .route(web::post().to(add_item))
            .route(web::delete().to(clear_cart)),
    )
    .service(
        web::resource("/carts/{user_id}/items/{item_id}")
            .route(web::put().to(update_item))
            .route(web::delete().to(remove_item)),
    )
    .route("/carts/{user_id}/checkout", web::post().to(checkout));
}

#[derive(Debug, Deserialize)]
struct AddItemRequest {
    product_id: Uuid,
    variation_id: Uuid,
    quantity: i32,
}

#[derive(Debug, Deserialize)]
struct QuantityRequest {
    quantity: i32,
}

#[derive(Debug, Deserialize)]
struct CheckoutRequest {
    shipping_info: ShippingInfo,
}

fn cart_path(path: web::Path<(String, String)>) -> Result<(Uuid, Uuid), ServiceError> {
    let (user_id, item_id) = path.into_inner();
    Ok((parse_id(&user_id, "user")?, parse_id(&item_id, "cart item")?))
}

async fn get_cart(
    services: web::Data<Services>,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let user_id = parse_id(&path, "user")?;
    Ok(HttpResponse::Ok().json(services.carts.get_or_create(user_id).await?))
}

async fn delete_cart(
    services: web::Data<Services>,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let user_id = parse_id(&path, "user")?;
    services.carts.delete_cart(user_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

async fn add_item(
    services: web::Data<Services>,
    path: web::Path<String>,
    body: web::Json<AddItemRequest>,
) -> Result<HttpResponse, ServiceError> {
    let user_id = parse_id(&path, "user")?;
    let cart = services
        .carts
        .add_item(user_id, body.product_id, body.variation_id, body.quantity)
        .await?;
    Ok(HttpResponse::Ok().json(cart))
}

async fn clear_cart(
    services: web::Data<Services>,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let user_id = parse_id(&path, "user")?;
    Ok(HttpResponse::Ok().json(services.carts.clear_cart(user_id).await?))
}

async fn update_item(
    services: web::Data<Services>,
    path: web::Path<(String, String)>,
    body: web::Json<QuantityRequest>,
) -> Result<HttpResponse, ServiceError> {
    let (user_id, item_id) = cart_path(path)?;
    let cart = services
        .carts
        .update_item_quantity(user_id, item_id, body.quantity)
        .await?;
    Ok(HttpResponse::Ok().json(cart))
}

async fn remove_item(
    services: web::Data<Services>,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, ServiceError> {
    let (user_id, item_id) = cart_path(path)?;
    Ok(HttpResponse::Ok().json(services.carts.remove_item(user_id, item_id).await?))
}

async fn checkout(
    services: web::Data<Services>,
    path: web::Path<String>,
    body: web::Json<CheckoutRequest>,
) -> Result<HttpResponse, ServiceError> {
    let user_id = parse_id(&path, "user")?;
    let order = services
        .carts
        .checkout(user_id, body.into_inner().shipping_info)
        .await?;
    Ok(HttpResponse::Created().json(order))
}

#[cfg(test)]
mod tests {
    use actix_web::{test, App};
    use serde_json::{json, Value};
    use uuid::Uuid;

    use crate::http::test_support::with_fixture;
    use crate::services::test_support::{fixture, seed_product, stock_of};

    #[actix_web::test]
    async fn test_out_of_range_amount_is_bad_request() {
        let fx = fixture();
        let app = test::init_service(App::new().configure(with_fixture(&fx))).await;
        let product = seed_product(&fx.catalog, "GOLD", i64::MAX / 2 + 1, 5).await;
        let user_id = Uuid::new_v4();

        let req = test::TestRequest::post()
            .uri(&format!("/api/carts/{user_id}/items"))
            .set_json(json!({
                "product_id": product.id,
                "variation_id": product.variations[0].id,
                "quantity": 2
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status().as_u16(), 400);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "invalid_argument");
        assert_eq!(stock_of(&fx.catalog, &product).await, 5);
    }

    #[actix_web::test]
    async fn test_cart_flow_through_checkout() {
        let fx = fixture();
        let app = test::init_service(App::new().configure(with_fixture(&fx))).await;
        let product = seed_product(&fx.catalog, "KETTLE", 10, 6).await;
        let user_id = Uuid::new_v4();
        let items_uri = format!("/api/carts/{user_id}/items");

        let cart: Value = test::call_and_read_body_json(
            &app,
            test::TestRequest::get().uri(&format!("/api/carts/{user_id}")).to_request(),
        )
        .await;
        assert_eq!(cart["items"].as_array().unwrap().len(), 0);

        for quantity in [2, 3] {
            let req = test::TestRequest::post()
                .uri(&items_uri)
                .set_json(json!({
                    "product_id": product.id,
                    "variation_id": product.variations[0].id,
                    "quantity": quantity
                }))
                .to_request();
            assert_eq!(test::call_service(&app, req).await.status().as_u16(), 200);
        }

        let cart: Value = test::call_and_read_body_json(
            &app,
            test::TestRequest::get().uri(&format!("/api/carts/{user_id}")).to_request(),
        )
        .await;
        assert_eq!(cart["items"][0]["quantity"], 5);
        assert_eq!(cart["total_amount"], 50);
        assert_eq!(stock_of(&fx.catalog, &product).await, 1);

        let item_id = cart["items"][0]["id"].as_str().unwrap().to_string();
        let req = test::TestRequest::put()
            .uri(&format!("{items_uri}/{item_id}"))
            .set_json(json!({"quantity": 4}))
            .to_request();
        let cart: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(cart["total_amount"], 40);
        assert_eq!(stock_of(&fx.catalog, &product).await, 2);

        let req = test::TestRequest::post()
            .uri(&format!("/api/carts/{user_id}/checkout"))
            .set_json(json!({"shipping_info": {
                "recipient_name": "Ada",
                "address_line1": "1 Road",
                "city": "London",
                "postal_code": "N1",
                "country": "GB"
            }}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status().as_u16(), 201);
        let order: Value = test::read_body_json(resp).await;
        assert_eq!(order["total_amount"], 40);
        assert_eq!(order["customer_id"], user_id.to_string());
        assert_eq!(stock_of(&fx.catalog, &product).await, 2);

        let req = test::TestRequest::post()
            .uri(&format!("/api/carts/{user_id}/checkout"))
            .set_json(json!({"shipping_info": {
                "recipient_name": "Ada",
                "address_line1": "1 Road",
                "city": "London",
                "postal_code": "N1",
                "country": "GB"
            }}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status().as_u16(), 400);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "cart is empty");
    }

    #[actix_web::test]
    async fn test_remove_clear_and_delete() {
        let fx = fixture();
        let app = test::init_service(App::new().configure(with_fixture(&fx))).await;
        let lamp = seed_product(&fx.catalog, "LAMP", 10, 5).await;
        let mug = seed_product(&fx.catalog, "MUG", 2, 5).await;
        let user_id = Uuid::new_v4();
        let cart = fx
            .services
            .carts
            .add_item(user_id, lamp.id, lamp.variations[0].id, 2)
            .await
            .unwrap();
        fx.services
            .carts
            .add_item(user_id, mug.id, mug.variations[0].id, 1)
            .await
            .unwrap();

        let req = test::TestRequest::delete()
            .uri(&format!("/api/carts/{user_id}/items/{}", cart.items()[0].id))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["items"].as_array().unwrap().len(), 1);
        assert_eq!(stock_of(&fx.catalog, &lamp).await, 5);

        let req = test::TestRequest::delete()
            .uri(&format!("/api/carts/{user_id}/items/not-an-id"))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status().as_u16(), 400);

        let req = test::TestRequest::delete()
            .uri(&format!("/api/carts/{user_id}/items"))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["total_amount"], 0);
        assert_eq!(stock_of(&fx.catalog, &mug).await, 5);

        let req = test::TestRequest::delete()
            .uri(&format!("/api/carts/{user_id}"))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status().as_u16(), 204);

        let req = test::TestRequest::delete()
            .uri(&format!("/api/carts/{user_id}"))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status().as_u16(), 404);
    }
}
