use actix_web::FromRequest;
use actix_web::{HttpRequest, dev::Payload, web};
use actix_web_httpauth::extractors::bearer::BearerAuth;
use sea_orm::DatabaseConnection;
use std::future::Future;
use std::pin::Pin;

use crate::auth::authorization::Actor;
use crate::auth::jwt;
use crate::config::AppConfig;
use crate::db::users::get_user_with_profile;
use crate::error::ApiError;

const INVALID_CREDENTIALS: &str = "Authentifizierungsdaten wurden nicht angegeben oder sind ungültig.";

/// The caller of a request that requires a valid bearer token.
pub struct AuthenticatedUser(pub Actor);

impl FromRequest for AuthenticatedUser {
    type Error = ApiError;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let req = req.clone();

        Box::pin(async move {
            // 1. Extract the bearer token from the Authorization header.
            let bearer = BearerAuth::extract(&req)
                .await
                .map_err(|_| ApiError::Unauthorized(INVALID_CREDENTIALS.into()))?;

            // 2. Validate it against the configured secret.
            let config = req
                .app_data::<web::Data<AppConfig>>()
                .ok_or_else(|| ApiError::Internal("AppConfig not configured".into()))?;

            let claims = jwt::validate_token(bearer.token(), &config.jwt_secret).map_err(|e| {
                tracing::debug!("Rejected bearer token: {e}");
                ApiError::Unauthorized(INVALID_CREDENTIALS.into())
            })?;

            let user_id = claims
                .user_id()
                .map_err(|_| ApiError::Unauthorized(INVALID_CREDENTIALS.into()))?;

            // 3. Load the user and their profile. A token for a deleted user is invalid.
            let db = req
                .app_data::<web::Data<DatabaseConnection>>()
                .ok_or_else(|| ApiError::Internal("Database not configured".into()))?;

            let (user, profile) = get_user_with_profile(db.get_ref(), user_id)
                .await?
                .ok_or_else(|| ApiError::Unauthorized(INVALID_CREDENTIALS.into()))?;

            Ok(AuthenticatedUser(Actor {
                user_id: user.id,
                username: user.username,
                role: profile.map(|p| p.profile_type),
                is_staff: user.is_staff,
            }))
        })
    }
}
