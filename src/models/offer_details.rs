use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Pricing tier of an offer, stored as a lowercase string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "lowercase")]
pub enum OfferType {
    #[sea_orm(string_value = "basic")]
    Basic,
    #[sea_orm(string_value = "standard")]
    Standard,
    #[sea_orm(string_value = "premium")]
    Premium,
}

impl OfferType {
    pub const ALL: [OfferType; 3] = [OfferType::Basic, OfferType::Standard, OfferType::Premium];

    /// Position in the basic → standard → premium display order.
    pub fn rank(self) -> u8 {
        match self {
            OfferType::Basic => 0,
            OfferType::Standard => 1,
            OfferType::Premium => 2,
        }
    }
}

/// SeaORM entity for the `offer_details` table.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "offer_details")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub offer_id: Uuid,
    pub title: String,
    pub revisions: i32,
    pub delivery_time_in_days: i32,
    #[sea_orm(column_type = "Double")]
    pub price: f64,
    /// JSON array of strings.
    #[sea_orm(column_type = "Json")]
    pub features: Json,
    pub offer_type: OfferType,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::offers::Entity",
        from = "Column::OfferId",
        to = "super::offers::Column::Id",
        on_delete = "Cascade"
    )]
    Offer,
    #[sea_orm(has_many = "super::orders::Entity")]
    Orders,
}

impl Related<super::offers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Offer.def()
    }
}

impl Related<super::orders::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Orders.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Decode a stored feature list. Anything that is not a list of strings
/// reads back as empty.
pub fn features_from_json(value: &Json) -> Vec<String> {
    serde_json::from_value(value.clone()).unwrap_or_default()
}

pub fn features_to_json(features: &[String]) -> Json {
    Json::Array(
        features
            .iter()
            .map(|f| Json::String(f.clone()))
            .collect(),
    )
}

// ── DTOs ──

/// One tier as submitted inside an offer create/update body.
///
/// Values stay raw JSON so a missing or mistyped field is reported on that
/// field of that tier instead of failing the whole body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OfferDetailInput {
    pub id: Option<Json>,
    pub title: Option<Json>,
    pub revisions: Option<Json>,
    pub delivery_time_in_days: Option<Json>,
    pub price: Option<Json>,
    pub features: Option<Json>,
    pub offer_type: Option<Json>,
}

/// A tier that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOfferDetail {
    pub title: String,
    pub revisions: i32,
    pub delivery_time_in_days: i32,
    pub price: f64,
    pub features: Vec<String>,
    pub offer_type: OfferType,
}

impl NewOfferDetail {
    pub fn into_active_model(self, id: Uuid, offer_id: Uuid) -> ActiveModel {
        ActiveModel {
            id: sea_orm::Set(id),
            offer_id: sea_orm::Set(offer_id),
            title: sea_orm::Set(self.title),
            revisions: sea_orm::Set(self.revisions),
            delivery_time_in_days: sea_orm::Set(self.delivery_time_in_days),
            price: sea_orm::Set(self.price),
            features: sea_orm::Set(features_to_json(&self.features)),
            offer_type: sea_orm::Set(self.offer_type),
        }
    }
}

/// A validated tier plus the identifier it claims, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailChange {
    pub id: Option<Uuid>,
    pub detail: NewOfferDetail,
}

/// Full tier representation (`GET /api/offerdetails/{id}` and nested views).
#[derive(Debug, Clone, Serialize)]
pub struct OfferDetailResponse {
    pub id: Uuid,
    pub title: String,
    pub revisions: i32,
    pub delivery_time_in_days: i32,
    pub price: f64,
    pub features: Vec<String>,
    pub offer_type: OfferType,
}

impl From<Model> for OfferDetailResponse {
    fn from(m: Model) -> Self {
        Self {
            id: m.id,
            features: features_from_json(&m.features),
            title: m.title,
            revisions: m.revisions,
            delivery_time_in_days: m.delivery_time_in_days,
            price: m.price,
            offer_type: m.offer_type,
        }
    }
}

/// Link form used in offer list items.
#[derive(Debug, Clone, Serialize)]
pub struct OfferDetailLink {
    pub id: Uuid,
    pub url: String,
}

impl OfferDetailLink {
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            url: format!("/api/offerdetails/{id}/"),
        }
    }
}
