use sea_orm::*;
use tracing::info;
use uuid::Uuid;

use crate::models::offer_details;
use crate::models::offers;
use crate::models::orders::{self, OrderStatus};

/// Place an order on a tier by copying its terms. Returns `None` when the
/// tier does not exist.
#[tracing::instrument(skip(db))]
pub async fn create_order(
    db: &DatabaseConnection,
    offer_detail_id: Uuid,
    customer_user: Uuid,
) -> Result<Option<orders::Model>, DbErr> {
    let txn = db.begin().await?;

    let Some((detail, Some(offer))) = offer_details::Entity::find_by_id(offer_detail_id)
        .find_also_related(offers::Entity)
        .one(&txn)
        .await?
    else {
        return Ok(None);
    };

    let order = orders::snapshot(&detail, offer.user_id, customer_user, chrono::Utc::now())
        .insert(&txn)
        .await?;

    txn.commit().await?;
    info!(order_id = %order.id, offer_detail_id = %detail.id, "Created order");
    Ok(Some(order))
}

/// Orders in which `user_id` is the customer or the business, newest first.
/// `None` lists every order.
pub async fn list_orders(
    db: &DatabaseConnection,
    user_id: Option<Uuid>,
) -> Result<Vec<orders::Model>, DbErr> {
    let mut query = orders::Entity::find();
    if let Some(user_id) = user_id {
        query = query.filter(
            Condition::any()
                .add(orders::Column::CustomerUser.eq(user_id))
                .add(orders::Column::BusinessUser.eq(user_id)),
        );
    }
    query
        .order_by_desc(orders::Column::CreatedAt)
        .order_by_asc(orders::Column::Id)
        .all(db)
        .await
}

pub async fn get_order_by_id(
    db: &DatabaseConnection,
    id: Uuid,
) -> Result<Option<orders::Model>, DbErr> {
    orders::Entity::find_by_id(id).one(db).await
}

/// Persist a status change. The transition must already have been checked.
#[tracing::instrument(skip(db, order), fields(order_id = %order.id))]
pub async fn update_order_status(
    db: &DatabaseConnection,
    order: orders::Model,
    status: OrderStatus,
) -> Result<orders::Model, DbErr> {
    let mut active: orders::ActiveModel = order.into();
    active.status = Set(status);
    active.updated_at = Set(chrono::Utc::now());
    let updated = active.update(db).await?;
    info!(order_id = %updated.id, status = ?status, "Updated order status");
    Ok(updated)
}

#[tracing::instrument(skip(db))]
pub async fn delete_order(db: &DatabaseConnection, id: Uuid) -> Result<DeleteResult, DbErr> {
    let result = orders::Entity::delete_by_id(id).exec(db).await?;
    info!(order_id = %id, "Deleted order");
    Ok(result)
}

/// Orders of a business, either the completed ones or all others.
pub async fn count_business_orders(
    db: &DatabaseConnection,
    business_user: Uuid,
    completed: bool,
) -> Result<u64, DbErr> {
    let status = if completed {
        orders::Column::Status.eq(OrderStatus::Completed)
    } else {
        orders::Column::Status.ne(OrderStatus::Completed)
    };
    orders::Entity::find()
        .filter(orders::Column::BusinessUser.eq(business_user))
        .filter(status)
        .count(db)
        .await
}
