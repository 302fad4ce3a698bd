use actix_web::{HttpResponse, web};
use sea_orm::DatabaseConnection;
use serde_json::json;
use uuid::Uuid;

use crate::auth::authorization::{
    ONLY_CUSTOMERS_ORDER, ORDER_DELETE_DENIED, ORDER_UPDATE_DENIED, ORDER_VIEW_DENIED,
    is_order_party, require_admin, require_customer, require_owner_or_admin,
};
use crate::auth::middleware::AuthenticatedUser;
use crate::db::orders as order_db;
use crate::db::users as user_db;
use crate::error::ApiError;
use crate::models::orders::{CreateOrder, OrderResponse, UpdateOrderStatus};
use crate::validation::messages;

const ORDER_NOT_FOUND: &str = "Die Bestellung wurde nicht gefunden.";
const DETAIL_NOT_FOUND: &str = "Das Angebotsdetail wurde nicht gefunden.";
const BUSINESS_USER_NOT_FOUND: &str = "Diesen Business User gibt es nicht.";

/// GET /api/orders: orders the caller takes part in; admins see all.
pub async fn list_orders(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    let scope = (!user.0.is_staff).then_some(user.0.user_id);
    let orders: Vec<OrderResponse> = order_db::list_orders(db.get_ref(), scope)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(HttpResponse::Ok().json(orders))
}

/// POST /api/orders: a customer orders one tier of an offer.
pub async fn create_order(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    body: web::Json<CreateOrder>,
) -> Result<HttpResponse, ApiError> {
    require_customer(&user.0, ONLY_CUSTOMERS_ORDER)?;
    let offer_detail_id = body
        .offer_detail_id
        .ok_or_else(|| ApiError::Validation(json!({ "offer_detail_id": [messages::REQUIRED] })))?;

    let order = order_db::create_order(db.get_ref(), offer_detail_id, user.0.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(DETAIL_NOT_FOUND.into()))?;
    Ok(HttpResponse::Created().json(OrderResponse::from(order)))
}

/// GET /api/orders/{id}
pub async fn get_order(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let order = order_db::get_order_by_id(db.get_ref(), path.into_inner())
        .await?
        .ok_or_else(|| ApiError::NotFound(ORDER_NOT_FOUND.into()))?;
    if !is_order_party(&user.0, order.customer_user, order.business_user) {
        return Err(ApiError::Forbidden(ORDER_VIEW_DENIED.into()));
    }
    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}

/// PATCH /api/orders/{id}: the business moves an order along.
pub async fn update_order(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateOrderStatus>,
) -> Result<HttpResponse, ApiError> {
    let order = order_db::get_order_by_id(db.get_ref(), path.into_inner())
        .await?
        .ok_or_else(|| ApiError::NotFound(ORDER_NOT_FOUND.into()))?;
    require_owner_or_admin(&user.0, order.business_user, ORDER_UPDATE_DENIED)?;

    let status = body
        .status
        .ok_or_else(|| ApiError::Validation(json!({ "status": [messages::REQUIRED] })))?;
    if order.status.is_terminal() {
        return Err(ApiError::Validation(json!({
            "status": [format!(
                "Der Auftrag ist bereits {} und kann nicht mehr geändert werden.",
                order.status.as_str()
            )]
        })));
    }
    if !order.status.can_transition_to(status) {
        return Err(ApiError::Validation(json!({
            "status": [format!(
                "Statuswechsel von {} nach {} ist nicht erlaubt.",
                order.status.as_str(),
                status.as_str()
            )]
        })));
    }

    let updated = order_db::update_order_status(db.get_ref(), order, status).await?;
    Ok(HttpResponse::Ok().json(OrderResponse::from(updated)))
}

/// DELETE /api/orders/{id}: admins only.
pub async fn delete_order(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    require_admin(&user.0, ORDER_DELETE_DENIED)?;
    let result = order_db::delete_order(db.get_ref(), path.into_inner()).await?;
    if result.rows_affected == 0 {
        return Err(ApiError::NotFound(ORDER_NOT_FOUND.into()));
    }
    Ok(HttpResponse::NoContent().finish())
}

async fn count_for_business(
    db: &DatabaseConnection,
    business_user: Uuid,
    completed: bool,
) -> Result<u64, ApiError> {
    if user_db::get_user_by_id(db, business_user).await?.is_none() {
        return Err(ApiError::NotFound(BUSINESS_USER_NOT_FOUND.into()));
    }
    Ok(order_db::count_business_orders(db, business_user, completed).await?)
}

/// GET /api/order-count/{business_user_id}: orders not yet completed.
pub async fn order_count(
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let count = count_for_business(db.get_ref(), path.into_inner(), false).await?;
    Ok(HttpResponse::Ok().json(json!({ "order_count": count })))
}

/// GET /api/completed-order-count/{business_user_id}
pub async fn completed_order_count(
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let count = count_for_business(db.get_ref(), path.into_inner(), true).await?;
    Ok(HttpResponse::Ok().json(json!({ "completed_order_count": count })))
}
