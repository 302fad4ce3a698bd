use actix_web::{HttpResponse, web};
use sea_orm::DatabaseConnection;
use serde_json::json;
use uuid::Uuid;

use crate::auth::authorization::{
    ONLY_CUSTOMERS_REVIEW, REVIEW_DELETE_DENIED, REVIEW_UPDATE_DENIED, require_customer,
    require_owner_or_admin,
};
use crate::auth::middleware::AuthenticatedUser;
use crate::db::profiles as profile_db;
use crate::db::reviews as review_db;
use crate::error::ApiError;
use crate::models::profiles::ProfileType;
use crate::models::reviews::{CreateReview, ReviewListQuery, UpdateReview};
use crate::ordering::ReviewOrdering;
use crate::validation::{validate_create_review, validate_update_review};

const REVIEW_NOT_FOUND: &str = "Die Bewertung wurde nicht gefunden.";
const FOREIGN_REVIEWER: &str =
    "Sie können keine Bewertung im Namen eines anderen Benutzers erstellen.";
const ALREADY_REVIEWED: &str = "Sie können nur eine Bewertung pro Geschäftsprofil abgeben.";
const NOT_A_BUSINESS: &str = "Bewertungen sind nur für Geschäftsprofile möglich.";

/// GET /api/reviews: public, filterable, no pagination.
pub async fn list_reviews(
    db: web::Data<DatabaseConnection>,
    query: web::Query<ReviewListQuery>,
) -> Result<HttpResponse, ApiError> {
    let ordering = ReviewOrdering::parse(query.ordering.as_deref());
    let reviews =
        review_db::list_reviews(db.get_ref(), query.business_user_id, query.reviewer_id, ordering)
            .await?;
    Ok(HttpResponse::Ok().json(reviews))
}

/// POST /api/reviews: one review per customer and business.
pub async fn create_review(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    body: web::Json<CreateReview>,
) -> Result<HttpResponse, ApiError> {
    let actor = &user.0;
    require_customer(actor, ONLY_CUSTOMERS_REVIEW)?;
    if body.reviewer.is_some_and(|reviewer| reviewer != actor.user_id) {
        return Err(ApiError::detail(FOREIGN_REVIEWER));
    }

    let input = validate_create_review(&body)?;
    let business = profile_db::get_profile(db.get_ref(), input.business_user).await?;
    if !business.is_some_and(|p| p.profile_type == ProfileType::Business) {
        return Err(ApiError::Validation(json!({ "business_user": [NOT_A_BUSINESS] })));
    }
    if review_db::review_exists(db.get_ref(), actor.user_id, input.business_user).await? {
        return Err(ApiError::Conflict(ALREADY_REVIEWED.into()));
    }

    let review = review_db::insert_review(db.get_ref(), actor.user_id, input).await?;
    Ok(HttpResponse::Created().json(review))
}

/// GET /api/reviews/{id}
pub async fn get_review(
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let review = review_db::get_review_by_id(db.get_ref(), path.into_inner())
        .await?
        .ok_or_else(|| ApiError::NotFound(REVIEW_NOT_FOUND.into()))?;
    Ok(HttpResponse::Ok().json(review))
}

/// PATCH /api/reviews/{id}: rating and description only.
pub async fn update_review(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateReview>,
) -> Result<HttpResponse, ApiError> {
    let review = review_db::get_review_by_id(db.get_ref(), path.into_inner())
        .await?
        .ok_or_else(|| ApiError::NotFound(REVIEW_NOT_FOUND.into()))?;
    require_owner_or_admin(&user.0, review.reviewer, REVIEW_UPDATE_DENIED)?;

    let input = validate_update_review(&body)?;
    let updated = review_db::update_review(db.get_ref(), review, input).await?;
    Ok(HttpResponse::Ok().json(updated))
}

/// DELETE /api/reviews/{id}
pub async fn delete_review(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let review = review_db::get_review_by_id(db.get_ref(), id)
        .await?
        .ok_or_else(|| ApiError::NotFound(REVIEW_NOT_FOUND.into()))?;
    require_owner_or_admin(&user.0, review.reviewer, REVIEW_DELETE_DENIED)?;

    review_db::delete_review(db.get_ref(), id).await?;
    Ok(HttpResponse::NoContent().finish())
}
