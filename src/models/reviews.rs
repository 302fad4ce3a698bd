use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// SeaORM entity for the `reviews` table.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "reviews")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub reviewer: Uuid,
    pub business_user: Uuid,
    pub rating: i32,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::BusinessUser",
        to = "super::users::Column::Id"
    )]
    BusinessUser,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BusinessUser.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// ── DTOs ──

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateReview {
    pub business_user: Option<Uuid>,
    pub rating: Option<i32>,
    pub description: Option<String>,
    /// Accepted only when it names the caller.
    pub reviewer: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateReview {
    pub rating: Option<i32>,
    pub description: Option<String>,
}

/// Validated review content.
#[derive(Debug, Clone)]
pub struct NewReview {
    pub business_user: Uuid,
    pub rating: i32,
    pub description: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewListQuery {
    pub business_user_id: Option<Uuid>,
    pub reviewer_id: Option<Uuid>,
    pub ordering: Option<String>,
}
