use actix_web::{HttpResponse, web};
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::auth::authorization::require_same_user;
use crate::auth::middleware::AuthenticatedUser;
use crate::db::profiles as profile_db;
use crate::error::ApiError;
use crate::models::profiles::{
    BusinessProfileItem, CustomerProfileItem, ProfileResponse, ProfileType,
};
use crate::validation::validate_profile_update;

const PROFILE_NOT_FOUND: &str = "Das Benutzerprofil wurde nicht gefunden.";
const EMAIL_TAKEN: &str = "Email bereits vorhanden.";

/// GET /api/profile/{user_id}: public profile view.
pub async fn get_profile(
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let profile = profile_db::get_profile(db.get_ref(), path.into_inner())
        .await?
        .ok_or_else(|| ApiError::NotFound(PROFILE_NOT_FOUND.into()))?;
    Ok(HttpResponse::Ok().json(ProfileResponse::from(profile)))
}

/// PATCH /api/profile/{user_id}: the owner edits their own profile.
pub async fn update_profile(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
    body: web::Json<serde_json::Map<String, serde_json::Value>>,
) -> Result<HttpResponse, ApiError> {
    let user_id = path.into_inner();
    if profile_db::get_profile(db.get_ref(), user_id).await?.is_none() {
        return Err(ApiError::NotFound(PROFILE_NOT_FOUND.into()));
    }
    require_same_user(&user.0, user_id)?;

    let update = validate_profile_update(&body)?;
    if let Some(email) = update.email.as_deref() {
        if profile_db::email_taken_by_other(db.get_ref(), email.trim(), user_id).await? {
            return Err(ApiError::Conflict(EMAIL_TAKEN.into()));
        }
    }

    let profile = profile_db::update_profile(db.get_ref(), user_id, update).await?;
    Ok(HttpResponse::Ok().json(ProfileResponse::from(profile)))
}

/// GET /api/profiles/business
pub async fn list_business_profiles(
    _user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    let profiles = profile_db::list_profiles_by_type(db.get_ref(), ProfileType::Business).await?;
    let items: Vec<BusinessProfileItem> = profiles.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(items))
}

/// GET /api/profiles/customer
pub async fn list_customer_profiles(
    _user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    let profiles = profile_db::list_profiles_by_type(db.get_ref(), ProfileType::Customer).await?;
    let items: Vec<CustomerProfileItem> = profiles.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(items))
}
