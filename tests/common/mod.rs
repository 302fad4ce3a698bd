//! Shared setup for the HTTP integration tests: an in-memory SQLite database
//! with all migrations applied, plus helpers to seed accounts and offers.
#![allow(dead_code)]

use actix_web::http::header;
use migration::{Migrator, MigratorTrait};
use sea_orm::{ActiveModelTrait, Database, DatabaseConnection, Set};
use uuid::Uuid;

use coderr_backend::auth::{jwt, password};
use coderr_backend::config::AppConfig;
use coderr_backend::db::offers as offer_db;
use coderr_backend::db::pool_options;
use coderr_backend::db::users::{self as user_db, NewAccount};
use coderr_backend::models::offer_details::{NewOfferDetail, OfferType};
use coderr_backend::models::offers::{NewOffer, OfferSummary};
use coderr_backend::models::profiles::ProfileType;
use coderr_backend::models::users;

pub const TEST_SECRET: &str = "test-secret-at-least-256-bits-long-for-hs256-xxxxxxx";
pub const PASSWORD: &str = "geheim123";

/// Build the app service the way `main` does, against `$db`.
macro_rules! test_app {
    ($db:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .wrap(actix_web::middleware::NormalizePath::trim())
                .app_data(actix_web::web::Data::new($db.clone()))
                .app_data(actix_web::web::Data::new(common::test_config()))
                .service(
                    actix_web::web::scope("/api")
                        .configure(coderr_backend::handlers::init_routes),
                ),
        )
        .await
    };
}

pub fn test_config() -> AppConfig {
    AppConfig {
        database_url: "sqlite::memory:".to_string(),
        database_max_connections: 1,
        jwt_secret: TEST_SECRET.to_string(),
        port: 0,
        token_ttl_hours: 1,
        offer_page_size: 6,
        run_migrations: true,
    }
}

/// A fresh, migrated in-memory database. A single pooled connection keeps
/// every query on the same in-memory instance.
pub async fn setup_db() -> DatabaseConnection {
    let db = Database::connect(pool_options("sqlite::memory:", 1))
        .await
        .expect("Failed to open in-memory SQLite");
    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");
    db
}

/// A registered account and a valid token for it.
pub struct TestUser {
    pub id: Uuid,
    pub username: String,
    pub token: String,
}

impl TestUser {
    pub fn bearer(&self) -> (header::HeaderName, String) {
        (header::AUTHORIZATION, format!("Bearer {}", self.token))
    }
}

pub async fn create_user(db: &DatabaseConnection, username: &str, kind: ProfileType) -> TestUser {
    let (user, _) = user_db::register_user(
        db,
        NewAccount {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password_hash: password::hash_password(PASSWORD).expect("hash"),
            profile_type: kind,
        },
    )
    .await
    .expect("Failed to register test user");

    let token = jwt::issue_token(user.id, &user.username, TEST_SECRET, 1).expect("token");
    TestUser {
        id: user.id,
        username: user.username,
        token,
    }
}

pub async fn create_business(db: &DatabaseConnection, username: &str) -> TestUser {
    create_user(db, username, ProfileType::Business).await
}

pub async fn create_customer(db: &DatabaseConnection, username: &str) -> TestUser {
    create_user(db, username, ProfileType::Customer).await
}

/// Grant staff rights. There is no endpoint for this.
pub async fn make_staff(db: &DatabaseConnection, user_id: Uuid) {
    users::ActiveModel {
        id: Set(user_id),
        is_staff: Set(true),
        ..Default::default()
    }
    .update(db)
    .await
    .expect("Failed to promote user");
}

pub fn tier(offer_type: OfferType, price: f64, days: i32) -> NewOfferDetail {
    NewOfferDetail {
        title: format!("{offer_type:?} Paket"),
        revisions: 2,
        delivery_time_in_days: days,
        price,
        features: vec!["Logo Design".to_string(), "Visitenkarte".to_string()],
        offer_type,
    }
}

/// Seed an offer with the usual three tiers, cheapest first.
pub async fn create_offer(
    db: &DatabaseConnection,
    owner: Uuid,
    title: &str,
    prices: [f64; 3],
    days: [i32; 3],
) -> OfferSummary {
    offer_db::insert_offer(
        db,
        owner,
        NewOffer {
            title: title.to_string(),
            description: format!("{title} für kleine Unternehmen"),
            image: None,
            details: OfferType::ALL
                .iter()
                .zip(prices.iter().zip(days.iter()))
                .map(|(t, (p, d))| tier(*t, *p, *d))
                .collect(),
        },
    )
    .await
    .expect("Failed to seed offer")
}

/// A valid tier payload as a client would send it.
pub fn tier_json(offer_type: &str, price: f64, days: i32) -> serde_json::Value {
    serde_json::json!({
        "title": format!("{offer_type} Paket"),
        "revisions": 3,
        "delivery_time_in_days": days,
        "price": price,
        "features": ["Logo Design", "Flyer"],
        "offer_type": offer_type,
    })
}
