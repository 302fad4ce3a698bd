use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::offer_details::{
    self, DetailChange, NewOfferDetail, OfferDetailInput, OfferDetailLink, OfferDetailResponse,
};
use super::profiles;

/// SeaORM entity for the `offers` table.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "offers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub image: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::offer_details::Entity")]
    OfferDetails,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    User,
}

impl Related<super::offer_details::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OfferDetails.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// ── DTOs ──

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateOffer {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub details: Option<Vec<OfferDetailInput>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateOffer {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub details: Option<Vec<OfferDetailInput>>,
}

/// A validated create request.
#[derive(Debug, Clone)]
pub struct NewOffer {
    pub title: String,
    pub description: String,
    pub image: Option<String>,
    pub details: Vec<NewOfferDetail>,
}

/// A validated update request. `details: None` leaves the tiers untouched.
#[derive(Debug, Clone, Default)]
pub struct OfferChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub details: Option<Vec<DetailChange>>,
}

/// Query string of `GET /api/offers`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OfferListQuery {
    pub creator_id: Option<Uuid>,
    pub min_price: Option<f64>,
    pub max_delivery_time: Option<i32>,
    pub ordering: Option<String>,
    pub search: Option<String>,
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

/// An offer together with its tiers and the minima derived from them.
#[derive(Debug, Clone)]
pub struct OfferSummary {
    pub offer: Model,
    pub details: Vec<offer_details::Model>,
    pub min_price: Option<f64>,
    pub min_delivery_time: Option<i32>,
}

impl OfferSummary {
    /// Derive the minima from the tiers themselves.
    pub fn new(offer: Model, details: Vec<offer_details::Model>) -> Self {
        let min_price = details.iter().map(|d| d.price).reduce(f64::min);
        let min_delivery_time = details.iter().map(|d| d.delivery_time_in_days).min();
        Self::with_minima(offer, details, min_price, min_delivery_time)
    }

    /// Use minima that were already aggregated by the database.
    /// Tiers are put into display order (basic, standard, premium).
    pub fn with_minima(
        offer: Model,
        mut details: Vec<offer_details::Model>,
        min_price: Option<f64>,
        min_delivery_time: Option<i32>,
    ) -> Self {
        details.sort_by_key(|d| (d.offer_type.rank(), d.id));
        Self {
            offer,
            details,
            min_price,
            min_delivery_time,
        }
    }
}

/// Owner name block embedded in offer representations.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UserDetails {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
}

impl From<&profiles::Model> for UserDetails {
    fn from(p: &profiles::Model) -> Self {
        Self {
            first_name: p.first_name.clone(),
            last_name: p.last_name.clone(),
            username: p.username.clone(),
        }
    }
}

/// Entry of `GET /api/offers`.
#[derive(Debug, Clone, Serialize)]
pub struct OfferListItem {
    pub id: Uuid,
    pub user: Uuid,
    pub title: String,
    pub image: Option<String>,
    pub description: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
    pub details: Vec<OfferDetailLink>,
    pub min_price: Option<f64>,
    pub min_delivery_time: Option<i32>,
    pub user_details: UserDetails,
}

impl OfferListItem {
    pub fn new(summary: OfferSummary, user_details: UserDetails) -> Self {
        Self {
            id: summary.offer.id,
            user: summary.offer.user_id,
            title: summary.offer.title,
            image: summary.offer.image,
            description: summary.offer.description,
            created_at: summary.offer.created_at,
            updated_at: summary.offer.updated_at,
            details: summary
                .details
                .iter()
                .map(|d| OfferDetailLink::new(d.id))
                .collect(),
            min_price: summary.min_price,
            min_delivery_time: summary.min_delivery_time,
            user_details,
        }
    }
}

/// `GET /api/offers/{id}`: like a list item but with the tiers inlined.
#[derive(Debug, Clone, Serialize)]
pub struct OfferResponse {
    pub id: Uuid,
    pub user: Uuid,
    pub title: String,
    pub image: Option<String>,
    pub description: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
    pub details: Vec<OfferDetailResponse>,
    pub min_price: Option<f64>,
    pub min_delivery_time: Option<i32>,
    pub user_details: UserDetails,
}

impl OfferResponse {
    pub fn new(summary: OfferSummary, user_details: UserDetails) -> Self {
        Self {
            id: summary.offer.id,
            user: summary.offer.user_id,
            title: summary.offer.title,
            image: summary.offer.image,
            description: summary.offer.description,
            created_at: summary.offer.created_at,
            updated_at: summary.offer.updated_at,
            details: summary
                .details
                .into_iter()
                .map(OfferDetailResponse::from)
                .collect(),
            min_price: summary.min_price,
            min_delivery_time: summary.min_delivery_time,
            user_details,
        }
    }
}

/// Body returned by `POST /api/offers` and `PATCH /api/offers/{id}`.
#[derive(Debug, Clone, Serialize)]
pub struct OfferWriteResponse {
    pub id: Uuid,
    pub title: String,
    pub image: Option<String>,
    pub description: String,
    pub details: Vec<OfferDetailResponse>,
}

impl OfferWriteResponse {
    pub fn new(offer: Model, details: Vec<offer_details::Model>) -> Self {
        Self {
            id: offer.id,
            title: offer.title,
            image: offer.image,
            description: offer.description,
            details: details.into_iter().map(OfferDetailResponse::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::offer_details::OfferType;

    fn offer(owner: Uuid, title: &str) -> Model {
        let now = chrono::Utc::now();
        Model {
            id: Uuid::new_v4(),
            user_id: owner,
            title: title.to_string(),
            description: "Logos und Corporate Design".to_string(),
            image: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn tier(offer_id: Uuid, price: f64, days: i32, offer_type: OfferType) -> offer_details::Model {
        offer_details::Model {
            id: Uuid::new_v4(),
            offer_id,
            title: format!("{offer_type:?}"),
            revisions: 1,
            delivery_time_in_days: days,
            price,
            features: serde_json::json!(["logo"]),
            offer_type,
        }
    }

    fn summary(owner: Uuid, title: &str, tiers: &[(f64, i32)]) -> OfferSummary {
        let o = offer(owner, title);
        let details = tiers
            .iter()
            .zip(OfferType::ALL)
            .map(|((p, d), t)| tier(o.id, *p, *d, t))
            .collect();
        OfferSummary::new(o, details)
    }

    #[test]
    fn minima_are_taken_across_tiers() {
        let s = summary(Uuid::new_v4(), "Logo", &[(150.0, 7), (99.5, 10), (300.0, 3)]);
        assert_eq!(s.min_price, Some(99.5));
        assert_eq!(s.min_delivery_time, Some(3));
    }

    #[test]
    fn tiers_come_back_in_display_order() {
        let o = offer(Uuid::new_v4(), "Logo");
        let details = vec![
            tier(o.id, 300.0, 3, OfferType::Premium),
            tier(o.id, 100.0, 7, OfferType::Basic),
            tier(o.id, 200.0, 5, OfferType::Standard),
        ];
        let s = OfferSummary::new(o, details);
        let types: Vec<_> = s.details.iter().map(|d| d.offer_type).collect();
        assert_eq!(types, OfferType::ALL.to_vec());
    }

    #[test]
    fn offer_without_tiers_has_no_minima() {
        let s = OfferSummary::new(offer(Uuid::new_v4(), "Leer"), vec![]);
        assert_eq!(s.min_price, None);
        assert_eq!(s.min_delivery_time, None);
    }
}
