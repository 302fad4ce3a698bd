use sea_orm::sea_query::{Expr, Func, NullOrdering};
use sea_orm::*;
use std::collections::{HashMap, HashSet};
use tracing::info;
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::offer_details::{self, DetailChange, NewOfferDetail};
use crate::models::PageRequest;
use crate::models::offers::{
    self, NewOffer, OfferChanges, OfferListQuery, OfferSummary, UserDetails,
};
use crate::models::orders;
use crate::models::profiles;
use crate::ordering::{OfferOrdering, OfferSortKey};
use crate::validation::messages;

/// Insert an offer and all of its tiers in one transaction.
#[tracing::instrument(skip(db, input))]
pub async fn insert_offer(
    db: &DatabaseConnection,
    owner: Uuid,
    input: NewOffer,
) -> Result<OfferSummary, DbErr> {
    let now = chrono::Utc::now();
    let txn = db.begin().await?;

    let offer = offers::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(owner),
        title: Set(input.title),
        description: Set(input.description),
        image: Set(input.image),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&txn)
    .await?;

    let mut details = Vec::with_capacity(input.details.len());
    for detail in input.details {
        details.push(
            detail
                .into_active_model(Uuid::new_v4(), offer.id)
                .insert(&txn)
                .await?,
        );
    }

    txn.commit().await?;
    info!(offer_id = %offer.id, tiers = details.len(), "Created offer");
    Ok(OfferSummary::new(offer, details))
}

/// Fetch one offer with its tiers.
pub async fn get_offer_with_details(
    db: &DatabaseConnection,
    id: Uuid,
) -> Result<Option<OfferSummary>, DbErr> {
    let found = offers::Entity::find_by_id(id)
        .find_with_related(offer_details::Entity)
        .all(db)
        .await?;
    Ok(found
        .into_iter()
        .next()
        .map(|(offer, details)| OfferSummary::new(offer, details)))
}

/// An offer row of the list query with the minima over its tiers.
#[derive(Debug, FromQueryResult)]
struct OfferListRow {
    id: Uuid,
    user_id: Uuid,
    title: String,
    description: String,
    image: Option<String>,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
    min_price: Option<f64>,
    min_delivery_time: Option<i32>,
}

impl OfferListRow {
    fn into_summary(self, details: Vec<offer_details::Model>) -> OfferSummary {
        let offer = offers::Model {
            id: self.id,
            user_id: self.user_id,
            title: self.title,
            description: self.description,
            image: self.image,
            created_at: self.created_at,
            updated_at: self.updated_at,
        };
        OfferSummary::with_minima(offer, details, self.min_price, self.min_delivery_time)
    }
}

/// `MIN(offer_details.<column>)` over the tiers joined to an offer.
fn tier_min(column: offer_details::Column) -> Expr {
    Expr::expr(Func::min(Expr::col((offer_details::Entity, column))))
}

fn lower(column: offers::Column) -> Expr {
    Expr::expr(Func::lower(Expr::col((offers::Entity, column))))
}

/// One page of the filtered, ordered offer list and the total number of
/// matches. Minima, filters, ordering and paging all run in the database; the
/// tiers are loaded for the returned page only. A page past the end comes
/// back empty.
pub async fn list_offers(
    db: &DatabaseConnection,
    query: &OfferListQuery,
    ordering: OfferOrdering,
    request: PageRequest,
) -> Result<(u64, Vec<OfferSummary>), DbErr> {
    let mut select = offers::Entity::find()
        .select_only()
        .columns([
            offers::Column::Id,
            offers::Column::UserId,
            offers::Column::Title,
            offers::Column::Description,
            offers::Column::Image,
            offers::Column::CreatedAt,
            offers::Column::UpdatedAt,
        ])
        .column_as(tier_min(offer_details::Column::Price), "min_price")
        .column_as(tier_min(offer_details::Column::DeliveryTimeInDays), "min_delivery_time")
        .join(JoinType::LeftJoin, offers::Relation::OfferDetails.def())
        .group_by(offers::Column::Id);

    if let Some(creator_id) = query.creator_id {
        select = select.filter(offers::Column::UserId.eq(creator_id));
    }
    if let Some(term) = query.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        let pattern = format!("%{}%", term.to_lowercase());
        select = select.filter(
            Condition::any()
                .add(lower(offers::Column::Title).like(pattern.as_str()))
                .add(lower(offers::Column::Description).like(pattern.as_str())),
        );
    }
    // Offers without tiers have no minima and fail both bounds.
    if let Some(floor) = query.min_price {
        select = select.having(tier_min(offer_details::Column::Price).gte(floor));
    }
    if let Some(ceiling) = query.max_delivery_time {
        select = select.having(tier_min(offer_details::Column::DeliveryTimeInDays).lte(ceiling));
    }

    select = match ordering.key {
        OfferSortKey::CreatedAt => select.order_by(offers::Column::CreatedAt, ordering.order()),
        OfferSortKey::UpdatedAt => select.order_by(offers::Column::UpdatedAt, ordering.order()),
        OfferSortKey::MinPrice => select.order_by_with_nulls(
            tier_min(offer_details::Column::Price),
            ordering.order(),
            NullOrdering::Last,
        ),
    };
    let paginator = select
        .order_by(offers::Column::Id, Order::Asc)
        .into_model::<OfferListRow>()
        .paginate(db, request.page_size);

    let count = paginator.num_items().await?;
    if !request.is_within(count) {
        return Ok((count, Vec::new()));
    }
    let rows = paginator.fetch_page(request.index()).await?;
    if rows.is_empty() {
        return Ok((count, Vec::new()));
    }

    let mut tiers: HashMap<Uuid, Vec<offer_details::Model>> = HashMap::new();
    for detail in offer_details::Entity::find()
        .filter(offer_details::Column::OfferId.is_in(rows.iter().map(|r| r.id)))
        .all(db)
        .await?
    {
        tiers.entry(detail.offer_id).or_default().push(detail);
    }

    let summaries = rows
        .into_iter()
        .map(|row| {
            let details = tiers.remove(&row.id).unwrap_or_default();
            row.into_summary(details)
        })
        .collect();
    Ok((count, summaries))
}

/// Owner name blocks keyed by user id. Owners without a profile are absent.
pub async fn get_user_details(
    db: &DatabaseConnection,
    user_ids: impl IntoIterator<Item = Uuid>,
) -> Result<HashMap<Uuid, UserDetails>, DbErr> {
    let ids: HashSet<Uuid> = user_ids.into_iter().collect();
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let profiles = profiles::Entity::find()
        .filter(profiles::Column::UserId.is_in(ids))
        .all(db)
        .await?;
    Ok(profiles
        .iter()
        .map(|p| (p.user_id, UserDetails::from(p)))
        .collect())
}

pub async fn get_offer_detail(
    db: &DatabaseConnection,
    id: Uuid,
) -> Result<Option<offer_details::Model>, DbErr> {
    offer_details::Entity::find_by_id(id).one(db).await
}

pub async fn count_offers(db: &DatabaseConnection) -> Result<u64, DbErr> {
    offers::Entity::find().count(db).await
}

/// How a submitted tier list maps onto the tiers an offer already has.
#[derive(Debug, Default, PartialEq)]
pub struct DetailPlan {
    pub overwrite: Vec<(Uuid, NewOfferDetail)>,
    pub create: Vec<NewOfferDetail>,
    pub delete: Vec<Uuid>,
}

/// Reconcile submitted tiers against the current ones by id.
///
/// An id of a current tier overwrites it in place; no id, or an id unknown
/// everywhere, creates a tier; current tiers left unreferenced are deleted.
/// An id owned by another offer (`foreign`) or named twice is rejected.
pub fn plan_detail_changes(
    current: &[Uuid],
    changes: Vec<DetailChange>,
    foreign: &HashSet<Uuid>,
) -> Result<DetailPlan, ApiError> {
    let current: HashSet<Uuid> = current.iter().copied().collect();
    let mut seen = HashSet::new();
    let mut plan = DetailPlan::default();

    for change in changes {
        match change.id {
            Some(id) if !seen.insert(id) => {
                return Err(ApiError::Validation(
                    serde_json::json!({ "details": [messages::DUPLICATE_DETAIL_ID] }),
                ));
            }
            Some(id) if foreign.contains(&id) => {
                return Err(ApiError::Validation(
                    serde_json::json!({ "details": [messages::FOREIGN_DETAIL_ID] }),
                ));
            }
            Some(id) if current.contains(&id) => plan.overwrite.push((id, change.detail)),
            _ => plan.create.push(change.detail),
        }
    }

    let mut delete: Vec<Uuid> = current.difference(&seen).copied().collect();
    delete.sort();
    plan.delete = delete;
    Ok(plan)
}

/// Detach orders from the given tiers and delete them. Order snapshots stay.
async fn delete_details<C: ConnectionTrait>(conn: &C, ids: Vec<Uuid>) -> Result<(), DbErr> {
    if ids.is_empty() {
        return Ok(());
    }
    orders::Entity::update_many()
        .set(orders::ActiveModel {
            offer_detail_id: Set(None),
            ..Default::default()
        })
        .filter(orders::Column::OfferDetailId.is_in(ids.clone()))
        .exec(conn)
        .await?;
    offer_details::Entity::delete_many()
        .filter(offer_details::Column::Id.is_in(ids))
        .exec(conn)
        .await?;
    Ok(())
}

/// Apply a validated partial update, reconciling tiers when they are given.
/// Nothing is written unless every step succeeds.
#[tracing::instrument(skip(db, offer, changes), fields(offer_id = %offer.id))]
pub async fn update_offer(
    db: &DatabaseConnection,
    offer: offers::Model,
    changes: OfferChanges,
) -> Result<OfferSummary, ApiError> {
    let offer_id = offer.id;
    let txn = db.begin().await?;

    if let Some(details) = changes.details {
        let current: Vec<Uuid> = offer_details::Entity::find()
            .filter(offer_details::Column::OfferId.eq(offer_id))
            .all(&txn)
            .await?
            .into_iter()
            .map(|d| d.id)
            .collect();

        let claimed: Vec<Uuid> = details.iter().filter_map(|c| c.id).collect();
        let foreign: HashSet<Uuid> = if claimed.is_empty() {
            HashSet::new()
        } else {
            offer_details::Entity::find()
                .filter(offer_details::Column::Id.is_in(claimed))
                .filter(offer_details::Column::OfferId.ne(offer_id))
                .all(&txn)
                .await?
                .into_iter()
                .map(|d| d.id)
                .collect()
        };

        let plan = plan_detail_changes(&current, details, &foreign)?;

        for (id, detail) in plan.overwrite {
            detail
                .into_active_model(id, offer_id)
                .update(&txn)
                .await?;
        }
        for detail in plan.create {
            detail
                .into_active_model(Uuid::new_v4(), offer_id)
                .insert(&txn)
                .await?;
        }
        delete_details(&txn, plan.delete).await?;
    }

    let mut active: offers::ActiveModel = offer.into();
    if let Some(title) = changes.title {
        active.title = Set(title);
    }
    if let Some(description) = changes.description {
        active.description = Set(description);
    }
    if let Some(image) = changes.image {
        active.image = Set(Some(image).filter(|i| !i.trim().is_empty()));
    }
    active.updated_at = Set(chrono::Utc::now());
    let offer = active.update(&txn).await?;

    let details = offer_details::Entity::find()
        .filter(offer_details::Column::OfferId.eq(offer_id))
        .all(&txn)
        .await?;

    txn.commit().await?;
    info!(offer_id = %offer_id, "Updated offer");
    Ok(OfferSummary::new(offer, details))
}

/// Delete an offer and its tiers. Orders placed on those tiers keep their
/// snapshot and lose the reference.
#[tracing::instrument(skip(db))]
pub async fn delete_offer(db: &DatabaseConnection, id: Uuid) -> Result<(), DbErr> {
    let txn = db.begin().await?;

    let detail_ids: Vec<Uuid> = offer_details::Entity::find()
        .filter(offer_details::Column::OfferId.eq(id))
        .all(&txn)
        .await?
        .into_iter()
        .map(|d| d.id)
        .collect();
    delete_details(&txn, detail_ids).await?;
    offers::Entity::delete_by_id(id).exec(&txn).await?;

    txn.commit().await?;
    info!(offer_id = %id, "Deleted offer");
    Ok(())
}
