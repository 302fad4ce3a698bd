use sea_orm::*;
use tracing::info;
use uuid::Uuid;

use crate::models::profiles::{self, ProfileType, UpdateProfile};
use crate::models::users;

/// Fetch a profile by the ID of the user it belongs to.
pub async fn get_profile(
    db: &DatabaseConnection,
    user_id: Uuid,
) -> Result<Option<profiles::Model>, DbErr> {
    profiles::Entity::find_by_id(user_id).one(db).await
}

/// All profiles of one type, oldest first.
pub async fn list_profiles_by_type(
    db: &DatabaseConnection,
    profile_type: ProfileType,
) -> Result<Vec<profiles::Model>, DbErr> {
    profiles::Entity::find()
        .filter(profiles::Column::ProfileType.eq(profile_type))
        .order_by_asc(profiles::Column::CreatedAt)
        .order_by_asc(profiles::Column::UserId)
        .all(db)
        .await
}

pub async fn count_profiles_by_type(
    db: &DatabaseConnection,
    profile_type: ProfileType,
) -> Result<u64, DbErr> {
    profiles::Entity::find()
        .filter(profiles::Column::ProfileType.eq(profile_type))
        .count(db)
        .await
}

/// Whether `email` is used by any account other than `user_id`.
pub async fn email_taken_by_other(
    db: &DatabaseConnection,
    email: &str,
    user_id: Uuid,
) -> Result<bool, DbErr> {
    let profiles = profiles::Entity::find()
        .filter(profiles::Column::Email.eq(email))
        .filter(profiles::Column::UserId.ne(user_id))
        .count(db)
        .await?;
    let users = users::Entity::find()
        .filter(users::Column::Email.eq(email))
        .filter(users::Column::Id.ne(user_id))
        .count(db)
        .await?;
    Ok(profiles + users > 0)
}

/// Apply a validated partial update. A changed email is mirrored onto the user.
#[tracing::instrument(skip(db, input))]
pub async fn update_profile(
    db: &DatabaseConnection,
    user_id: Uuid,
    input: UpdateProfile,
) -> Result<profiles::Model, DbErr> {
    let txn = db.begin().await?;

    let profile = profiles::Entity::find_by_id(user_id)
        .one(&txn)
        .await?
        .ok_or(DbErr::RecordNotFound("Profile not found".to_string()))?;

    let mut active: profiles::ActiveModel = profile.into();

    if let Some(email) = input.email {
        let email = email.trim().to_string();
        users::ActiveModel {
            id: Set(user_id),
            email: Set(email.clone()),
            ..Default::default()
        }
        .update(&txn)
        .await?;
        active.email = Set(email);
    }
    if let Some(first_name) = input.first_name {
        active.first_name = Set(first_name);
    }
    if let Some(last_name) = input.last_name {
        active.last_name = Set(last_name);
    }
    if let Some(file) = input.file {
        active.file = Set(Some(file).filter(|f| !f.is_empty()));
    }
    if let Some(location) = input.location {
        active.location = Set(location);
    }
    if let Some(description) = input.description {
        active.description = Set(description);
    }
    if let Some(working_hours) = input.working_hours {
        active.working_hours = Set(working_hours);
    }
    if let Some(tel) = input.tel {
        active.tel = Set(tel);
    }
    active.uploaded_at = Set(chrono::Utc::now());

    let updated = active.update(&txn).await?;
    txn.commit().await?;
    info!(user_id = %user_id, "Updated profile");
    Ok(updated)
}
