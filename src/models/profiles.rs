use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// The account role. Chosen once at registration; no endpoint changes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "lowercase")]
pub enum ProfileType {
    #[sea_orm(string_value = "business")]
    Business,
    #[sea_orm(string_value = "customer")]
    Customer,
}

impl ProfileType {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "business" => Some(Self::Business),
            "customer" => Some(Self::Customer),
            _ => None,
        }
    }
}

pub const DEFAULT_FIRST_NAME: &str = "Max";
pub const DEFAULT_LAST_NAME: &str = "Mustermann";
pub const DEFAULT_LOCATION: &str = "Lappland";
pub const DEFAULT_DESCRIPTION: &str = "Lappland Business";
pub const DEFAULT_WORKING_HOURS: &str = "8 - 16";
pub const DEFAULT_TEL: &str = "0123456789";

/// SeaORM entity for the `profiles` table (1:1 with `users`).
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "profiles")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: Uuid,
    pub profile_type: ProfileType,
    pub username: String,
    #[sea_orm(unique)]
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub file: Option<String>,
    pub location: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub working_hours: String,
    pub tel: String,
    pub created_at: DateTimeUtc,
    pub uploaded_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    User,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// A fresh profile carrying the default contact details.
pub fn new_profile(
    user_id: Uuid,
    profile_type: ProfileType,
    username: &str,
    email: &str,
    now: DateTimeUtc,
) -> ActiveModel {
    ActiveModel {
        user_id: sea_orm::Set(user_id),
        profile_type: sea_orm::Set(profile_type),
        username: sea_orm::Set(username.to_string()),
        email: sea_orm::Set(email.to_string()),
        first_name: sea_orm::Set(DEFAULT_FIRST_NAME.to_string()),
        last_name: sea_orm::Set(DEFAULT_LAST_NAME.to_string()),
        file: sea_orm::Set(None),
        location: sea_orm::Set(DEFAULT_LOCATION.to_string()),
        description: sea_orm::Set(DEFAULT_DESCRIPTION.to_string()),
        working_hours: sea_orm::Set(DEFAULT_WORKING_HOURS.to_string()),
        tel: sea_orm::Set(DEFAULT_TEL.to_string()),
        created_at: sea_orm::Set(now),
        uploaded_at: sea_orm::Set(now),
    }
}

// ── DTOs ──

/// The only profile fields a user may change about themselves.
pub const UPDATABLE_FIELDS: [&str; 8] = [
    "email",
    "first_name",
    "last_name",
    "file",
    "location",
    "description",
    "working_hours",
    "tel",
];

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProfile {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub file: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub working_hours: Option<String>,
    pub tel: Option<String>,
}

/// `GET /api/profile/{user_id}` representation.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileResponse {
    pub user: Uuid,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub file: Option<String>,
    pub location: String,
    pub tel: String,
    pub description: String,
    pub working_hours: String,
    #[serde(rename = "type")]
    pub profile_type: ProfileType,
    pub email: String,
    pub created_at: DateTimeUtc,
}

impl From<Model> for ProfileResponse {
    fn from(m: Model) -> Self {
        Self {
            user: m.user_id,
            username: m.username,
            first_name: m.first_name,
            last_name: m.last_name,
            file: m.file,
            location: m.location,
            tel: m.tel,
            description: m.description,
            working_hours: m.working_hours,
            profile_type: m.profile_type,
            email: m.email,
            created_at: m.created_at,
        }
    }
}

/// Nested `user` object of the profile list endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileUser {
    pub pk: Uuid,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

impl From<&Model> for ProfileUser {
    fn from(m: &Model) -> Self {
        Self {
            pk: m.user_id,
            username: m.username.clone(),
            first_name: m.first_name.clone(),
            last_name: m.last_name.clone(),
        }
    }
}

/// Entry of `GET /api/profiles/business`.
#[derive(Debug, Clone, Serialize)]
pub struct BusinessProfileItem {
    pub user: ProfileUser,
    #[serde(rename = "type")]
    pub profile_type: ProfileType,
    pub file: Option<String>,
    pub location: String,
    pub description: String,
    pub working_hours: String,
    pub tel: String,
}

impl From<Model> for BusinessProfileItem {
    fn from(m: Model) -> Self {
        Self {
            user: ProfileUser::from(&m),
            profile_type: m.profile_type,
            file: m.file,
            location: m.location,
            description: m.description,
            working_hours: m.working_hours,
            tel: m.tel,
        }
    }
}

/// Entry of `GET /api/profiles/customer`.
#[derive(Debug, Clone, Serialize)]
pub struct CustomerProfileItem {
    pub user: ProfileUser,
    #[serde(rename = "type")]
    pub profile_type: ProfileType,
    pub file: Option<String>,
    pub uploaded_at: DateTimeUtc,
}

impl From<Model> for CustomerProfileItem {
    fn from(m: Model) -> Self {
        Self {
            user: ProfileUser::from(&m),
            profile_type: m.profile_type,
            file: m.file,
            uploaded_at: m.uploaded_at,
        }
    }
}
