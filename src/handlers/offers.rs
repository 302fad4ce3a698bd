use actix_web::{HttpRequest, HttpResponse, web};
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::auth::authorization::{
    OFFER_UPDATE_DENIED, require_business, require_offer_deleter, require_owner_or_admin,
};
use crate::auth::middleware::AuthenticatedUser;
use crate::config::AppConfig;
use crate::db::offers as offer_db;
use crate::error::ApiError;
use crate::models::offer_details::OfferDetailResponse;
use crate::models::offers::{
    CreateOffer, OfferListItem, OfferListQuery, OfferResponse, OfferWriteResponse, UpdateOffer,
};
use crate::models::{Page, PageRequest};
use crate::ordering::OfferOrdering;
use crate::validation::{validate_create_offer, validate_update_offer};

const OFFER_NOT_FOUND: &str = "Das Angebot wurde nicht gefunden.";
const DETAIL_NOT_FOUND: &str = "Das Angebotsdetail wurde nicht gefunden.";
const PAGE_NOT_FOUND: &str = "Ungültige Seite.";

/// GET /api/offers: filtered, ordered and paginated offer list.
pub async fn list_offers(
    req: HttpRequest,
    db: web::Data<DatabaseConnection>,
    config: web::Data<AppConfig>,
    query: web::Query<OfferListQuery>,
) -> Result<HttpResponse, ApiError> {
    let query = query.into_inner();
    let ordering = OfferOrdering::parse(query.ordering.as_deref());
    let request = PageRequest::new(query.page, query.page_size, config.offer_page_size);

    let (count, offers) = offer_db::list_offers(db.get_ref(), &query, ordering, request).await?;
    if !request.is_within(count) {
        return Err(ApiError::NotFound(PAGE_NOT_FOUND.into()));
    }

    let owners =
        offer_db::get_user_details(db.get_ref(), offers.iter().map(|o| o.offer.user_id)).await?;
    let page = Page::new(count, offers, request, "/api/offers/", req.query_string()).map(
        |summary| {
            let owner = owners.get(&summary.offer.user_id).cloned().unwrap_or_default();
            OfferListItem::new(summary, owner)
        },
    );

    Ok(HttpResponse::Ok().json(page))
}

/// POST /api/offers: a business publishes an offer with its three tiers.
pub async fn create_offer(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    body: web::Json<CreateOffer>,
) -> Result<HttpResponse, ApiError> {
    require_business(&user.0)?;
    let input = validate_create_offer(&body)?;

    let summary = offer_db::insert_offer(db.get_ref(), user.0.user_id, input).await?;
    Ok(HttpResponse::Created().json(OfferWriteResponse::new(summary.offer, summary.details)))
}

/// GET /api/offers/{id}: full offer with nested tiers.
pub async fn get_offer(
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let summary = offer_db::get_offer_with_details(db.get_ref(), path.into_inner())
        .await?
        .ok_or_else(|| ApiError::NotFound(OFFER_NOT_FOUND.into()))?;

    let owner = offer_db::get_user_details(db.get_ref(), [summary.offer.user_id])
        .await?
        .remove(&summary.offer.user_id)
        .unwrap_or_default();
    Ok(HttpResponse::Ok().json(OfferResponse::new(summary, owner)))
}

/// PATCH /api/offers/{id}: partial update by the owner or an admin.
pub async fn update_offer(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateOffer>,
) -> Result<HttpResponse, ApiError> {
    let existing = offer_db::get_offer_with_details(db.get_ref(), path.into_inner())
        .await?
        .ok_or_else(|| ApiError::NotFound(OFFER_NOT_FOUND.into()))?;
    require_owner_or_admin(&user.0, existing.offer.user_id, OFFER_UPDATE_DENIED)?;

    let changes = validate_update_offer(&body)?;
    let summary = offer_db::update_offer(db.get_ref(), existing.offer, changes).await?;
    Ok(HttpResponse::Ok().json(OfferWriteResponse::new(summary.offer, summary.details)))
}

/// DELETE /api/offers/{id}
pub async fn delete_offer(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let existing = offer_db::get_offer_with_details(db.get_ref(), id)
        .await?
        .ok_or_else(|| ApiError::NotFound(OFFER_NOT_FOUND.into()))?;
    require_offer_deleter(&user.0, existing.offer.user_id)?;

    offer_db::delete_offer(db.get_ref(), id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// GET /api/offerdetails/{id}
pub async fn get_offer_detail(
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let detail = offer_db::get_offer_detail(db.get_ref(), path.into_inner())
        .await?
        .ok_or_else(|| ApiError::NotFound(DETAIL_NOT_FOUND.into()))?;
    Ok(HttpResponse::Ok().json(OfferDetailResponse::from(detail)))
}
