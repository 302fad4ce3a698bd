use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::offer_details::{self, OfferType, features_from_json};

/// Order status stored as a snake_case string in the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[sea_orm(string_value = "in_progress")]
    InProgress,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl OrderStatus {
    /// The full transition table: an order in progress may be completed or
    /// cancelled; both of those are terminal.
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        matches!(
            (self, next),
            (OrderStatus::InProgress, OrderStatus::Completed)
                | (OrderStatus::InProgress, OrderStatus::Cancelled)
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::InProgress => "in_progress",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, OrderStatus::InProgress)
    }
}

/// SeaORM entity for the `orders` table.
///
/// Title, price, delivery time, revisions, features and tier type are a copy
/// of the offer detail taken when the order was placed.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub offer_detail_id: Option<Uuid>,
    pub customer_user: Uuid,
    pub business_user: Uuid,
    pub title: String,
    pub revisions: i32,
    pub delivery_time_in_days: i32,
    #[sea_orm(column_type = "Double")]
    pub price: f64,
    #[sea_orm(column_type = "Json")]
    pub features: Json,
    pub offer_type: OfferType,
    pub status: OrderStatus,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::offer_details::Entity",
        from = "Column::OfferDetailId",
        to = "super::offer_details::Column::Id",
        on_delete = "SetNull"
    )]
    OfferDetail,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::BusinessUser",
        to = "super::users::Column::Id"
    )]
    BusinessUser,
}

impl Related<super::offer_details::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OfferDetail.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Copy a tier's terms into a fresh in-progress order.
pub fn snapshot(
    detail: &offer_details::Model,
    business_user: Uuid,
    customer_user: Uuid,
    now: DateTimeUtc,
) -> ActiveModel {
    ActiveModel {
        id: sea_orm::Set(Uuid::new_v4()),
        offer_detail_id: sea_orm::Set(Some(detail.id)),
        customer_user: sea_orm::Set(customer_user),
        business_user: sea_orm::Set(business_user),
        title: sea_orm::Set(detail.title.clone()),
        revisions: sea_orm::Set(detail.revisions),
        delivery_time_in_days: sea_orm::Set(detail.delivery_time_in_days),
        price: sea_orm::Set(detail.price),
        features: sea_orm::Set(detail.features.clone()),
        offer_type: sea_orm::Set(detail.offer_type),
        status: sea_orm::Set(OrderStatus::InProgress),
        created_at: sea_orm::Set(now),
        updated_at: sea_orm::Set(now),
    }
}

// ── DTOs ──

#[derive(Debug, Clone, Deserialize)]
pub struct CreateOrder {
    pub offer_detail_id: Option<Uuid>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateOrderStatus {
    pub status: Option<OrderStatus>,
}

/// API representation; the reference to the source tier is not exposed.
#[derive(Debug, Clone, Serialize)]
pub struct OrderResponse {
    pub id: Uuid,
    pub customer_user: Uuid,
    pub business_user: Uuid,
    pub title: String,
    pub revisions: i32,
    pub delivery_time_in_days: i32,
    pub price: f64,
    pub features: Vec<String>,
    pub offer_type: OfferType,
    pub status: OrderStatus,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl From<Model> for OrderResponse {
    fn from(m: Model) -> Self {
        Self {
            id: m.id,
            features: features_from_json(&m.features),
            customer_user: m.customer_user,
            business_user: m.business_user,
            title: m.title,
            revisions: m.revisions,
            delivery_time_in_days: m.delivery_time_in_days,
            price: m.price,
            offer_type: m.offer_type,
            status: m.status,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}
