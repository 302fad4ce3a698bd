use actix_web::{HttpResponse, web};
use sea_orm::DatabaseConnection;

use crate::auth::{jwt, password};
use crate::config::AppConfig;
use crate::db::users as user_db;
use crate::error::ApiError;
use crate::models::users::{self, AuthResponse, Login, Registration};
use crate::validation::validate_registration;

const DUPLICATE_ACCOUNT: &str = "Benutzername oder Email bereits vorhanden.";
const BAD_CREDENTIALS: &str = "Falsche Username oder Passwort.";

fn auth_response(user: &users::Model, config: &AppConfig) -> Result<AuthResponse, ApiError> {
    let token = jwt::issue_token(user.id, &user.username, &config.jwt_secret, config.token_ttl_hours)
        .map_err(ApiError::Internal)?;
    Ok(AuthResponse {
        token,
        user_id: user.id,
        username: user.username.clone(),
        email: user.email.clone(),
    })
}

/// POST /api/registration: create an account with a profile and log it in.
pub async fn register(
    db: web::Data<DatabaseConnection>,
    config: web::Data<AppConfig>,
    body: web::Json<Registration>,
) -> Result<HttpResponse, ApiError> {
    let input = validate_registration(&body)?;

    if user_db::username_or_email_taken(db.get_ref(), &input.username, &input.email).await? {
        return Err(ApiError::Conflict(DUPLICATE_ACCOUNT.into()));
    }

    let password_hash = password::hash_password(&input.password).map_err(ApiError::Internal)?;
    let (user, _profile) = user_db::register_user(
        db.get_ref(),
        user_db::NewAccount {
            username: input.username,
            email: input.email,
            password_hash,
            profile_type: input.profile_type,
        },
    )
    .await?;

    Ok(HttpResponse::Created().json(auth_response(&user, &config)?))
}

/// POST /api/login: exchange username and password for a token.
pub async fn login(
    db: web::Data<DatabaseConnection>,
    config: web::Data<AppConfig>,
    body: web::Json<Login>,
) -> Result<HttpResponse, ApiError> {
    let (Some(username), Some(password)) = (body.username.as_deref(), body.password.as_deref())
    else {
        return Err(ApiError::detail(BAD_CREDENTIALS));
    };

    let user = user_db::find_by_username(db.get_ref(), username.trim())
        .await?
        .filter(|user| password::verify_password(password, &user.password_hash))
        .ok_or_else(|| ApiError::detail(BAD_CREDENTIALS))?;

    tracing::info!(user_id = %user.id, "User logged in");
    Ok(HttpResponse::Ok().json(auth_response(&user, &config)?))
}
