use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use super::PageQuery;
use crate::domain::order::{OrderStatus, ShippingInfo};
use crate::services::{parse_id, Pagination, PaymentDetails, ServiceError, Services, TrackingDetails};

pub(super) fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/orders")
            .route(web::get().to(list_orders))
            .route(web::post().to(create_order)),
    )
    .service(
        web::resource("/orders/{id}")
            .route(web::get().to(get_order))
            .route(web::delete().to(delete_order)),
    )
    .service(
        web::resource("/orders/{id}/items")
            .route(web::post().to(add_item))
            .route(web::put().to(update_item)),
    )
    .route(
        "/orders/{id}/items/{product_id}/{variation_id}",
        web::delete().to(remove_item),
    )
    .route("/orders/{id}/status", web::put().to(update_status))
    .route("/orders/{id}/payment", web::put().to(set_payment))
    .route("/orders/{id}/tracking", web::put().to(set_tracking))
    .route("/customers/{id}/orders", web::get().to(customer_orders));
}

#[derive(Debug, Deserialize)]
struct CreateOrderRequest {
    customer_id: Uuid,
    shipping_info: ShippingInfo,
}

#[derive(Debug, Deserialize)]
struct ItemRequest {
    product_id: Uuid,
    variation_id: Uuid,
    quantity: i32,
}

#[derive(Debug, Deserialize)]
struct StatusRequest {
    status: String,
}

async fn create_order(
    services: web::Data<Services>,
    body: web::Json<CreateOrderRequest>,
) -> Result<HttpResponse, ServiceError> {
    let CreateOrderRequest {
        customer_id,
        shipping_info,
    } = body.into_inner();
    let order = services.orders.create_order(customer_id, shipping_info).await?;
    Ok(HttpResponse::Created().json(order))
}

async fn list_orders(
    services: web::Data<Services>,
    pagination: web::Data<Pagination>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, ServiceError> {
    let page = pagination.page(query.page, query.limit);
    Ok(HttpResponse::Ok().json(services.orders.list_orders(page).await?))
}

async fn get_order(
    services: web::Data<Services>,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let order_id = parse_id(&path, "order")?;
    Ok(HttpResponse::Ok().json(services.orders.get_order(order_id).await?))
}

async fn delete_order(
    services: web::Data<Services>,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let order_id = parse_id(&path, "order")?;
    services.orders.delete_order(order_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

async fn customer_orders(
    services: web::Data<Services>,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let customer_id = parse_id(&path, "customer")?;
    Ok(HttpResponse::Ok().json(services.orders.customer_orders(customer_id).await?))
}

async fn add_item(
    services: web::Data<Services>,
    path: web::Path<String>,
    body: web::Json<ItemRequest>,
) -> Result<HttpResponse, ServiceError> {
    let order_id = parse_id(&path, "order")?;
    let order = services
        .orders
        .add_item(order_id, body.product_id, body.variation_id, body.quantity)
        .await?;
    Ok(HttpResponse::Ok().json(order))
}

async fn update_item(
    services: web::Data<Services>,
    path: web::Path<String>,
    body: web::Json<ItemRequest>,
) -> Result<HttpResponse, ServiceError> {
    let order_id = parse_id(&path, "order")?;
    let order = services
        .orders
        .update_item_quantity(order_id, body.product_id, body.variation_id, body.quantity)
        .await?;
    Ok(HttpResponse::Ok().json(order))
}

async fn remove_item(
    services: web::Data<Services>,
    path: web::Path<(String, String, String)>,
) -> Result<HttpResponse, ServiceError> {
    let (order_id, product_id, variation_id) = path.into_inner();
    let order = services
        .orders
        .remove_item(
            parse_id(&order_id, "order")?,
            parse_id(&product_id, "product")?,
            parse_id(&variation_id, "variation")?,
        )
        .await?;
    Ok(HttpResponse::Ok().json(order))
}

async fn update_status(
    services: web::Data<Services>,
    path: web::Path<String>,
    body: web::Json<StatusRequest>,
) -> Result<HttpResponse, ServiceError> {
    let order_id = parse_id(&path, "order")?;
    let status: OrderStatus = body.status.parse()?;
    Ok(HttpResponse::Ok().json(services.orders.update_status(order_id, status).await?))
}

async fn set_payment(
    services: web::Data<Services>,
    path: web::Path<String>,
    body: web::Json<PaymentDetails>,
) -> Result<HttpResponse, ServiceError> {
    let order_id = parse_id(&path, "order")?;
    let order = services
        .orders
        .set_payment_info(order_id, body.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(order))
}

async fn set_tracking(
    services: web::Data<Services>,
    path: web::Path<String>,
    body: web::Json<TrackingDetails>,
) -> Result<HttpResponse, ServiceError> {
    let order_id = parse_id(&path, "order")?;
    let order = services
        .orders
        .set_tracking_info(order_id, body.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(order))
}
