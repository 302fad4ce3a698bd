use sea_orm::*;
use tracing::info;
use uuid::Uuid;

use crate::models::profiles::{self, ProfileType};
use crate::models::users;

/// Fetch a single user by ID.
pub async fn get_user_by_id(
    db: &DatabaseConnection,
    id: Uuid,
) -> Result<Option<users::Model>, DbErr> {
    users::Entity::find_by_id(id).one(db).await
}

/// Fetch a user together with their profile, if they have one.
pub async fn get_user_with_profile(
    db: &DatabaseConnection,
    id: Uuid,
) -> Result<Option<(users::Model, Option<profiles::Model>)>, DbErr> {
    users::Entity::find_by_id(id)
        .find_also_related(profiles::Entity)
        .one(db)
        .await
}

pub async fn find_by_username(
    db: &DatabaseConnection,
    username: &str,
) -> Result<Option<users::Model>, DbErr> {
    users::Entity::find()
        .filter(users::Column::Username.eq(username))
        .one(db)
        .await
}

/// Whether the username or the email is already used by any account.
pub async fn username_or_email_taken(
    db: &DatabaseConnection,
    username: &str,
    email: &str,
) -> Result<bool, DbErr> {
    let users = users::Entity::find()
        .filter(
            Condition::any()
                .add(users::Column::Username.eq(username))
                .add(users::Column::Email.eq(email)),
        )
        .count(db)
        .await?;
    let profiles = profiles::Entity::find()
        .filter(profiles::Column::Email.eq(email))
        .count(db)
        .await?;
    Ok(users + profiles > 0)
}

/// Fields of a new account, already validated and hashed.
pub struct NewAccount {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub profile_type: ProfileType,
}

/// Insert a user and their default profile in one transaction.
#[tracing::instrument(skip(db, account), fields(username = %account.username))]
pub async fn register_user(
    db: &DatabaseConnection,
    account: NewAccount,
) -> Result<(users::Model, profiles::Model), DbErr> {
    let now = chrono::Utc::now();
    let txn = db.begin().await?;

    let user = users::ActiveModel {
        id: Set(Uuid::new_v4()),
        username: Set(account.username.clone()),
        email: Set(account.email.clone()),
        password_hash: Set(account.password_hash),
        is_staff: Set(false),
        created_at: Set(now),
    }
    .insert(&txn)
    .await?;

    let profile = profiles::new_profile(user.id, account.profile_type, &account.username, &account.email, now)
        .insert(&txn)
        .await?;

    txn.commit().await?;
    info!(user_id = %user.id, profile_type = ?profile.profile_type, "Registered user");
    Ok((user, profile))
}
