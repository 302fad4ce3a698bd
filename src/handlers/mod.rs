pub mod auth;
pub mod base_info;
pub mod offers;
pub mod orders;
pub mod profiles;
pub mod reviews;

use actix_web::{ResponseError, error, web};
use std::fmt::{Debug, Display};

use crate::error::ApiError;

fn reject<E: Debug + Display + 'static>(err: E, api: ApiError) -> actix_web::Error {
    error::InternalError::from_response(err, api.error_response()).into()
}

/// Body, query and path extraction failures use the same error bodies as handlers.
fn extractor_config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        let msg = err.to_string();
        reject(err, ApiError::detail(msg))
    }));
    cfg.app_data(web::QueryConfig::default().error_handler(|err, _req| {
        let msg = err.to_string();
        reject(err, ApiError::detail(msg))
    }));
    // A malformed id cannot name an existing resource.
    cfg.app_data(web::PathConfig::default().error_handler(|err, _req| {
        let msg = err.to_string();
        reject(err, ApiError::NotFound(msg))
    }));
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    extractor_config(cfg);

    // ── Account routes (public) ──
    cfg.service(web::resource("/registration").route(web::post().to(auth::register)));
    cfg.service(web::resource("/login").route(web::post().to(auth::login)));

    // ── Profile routes ──
    cfg.service(
        web::resource("/profile/{user_id}")
            .route(web::get().to(profiles::get_profile))
            .route(web::patch().to(profiles::update_profile)),
    );
    cfg.service(
        web::scope("/profiles")
            .route("/business", web::get().to(profiles::list_business_profiles))
            .route("/customer", web::get().to(profiles::list_customer_profiles)),
    );

    // ── Offer routes (reads public, writes require a valid JWT) ──
    cfg.service(
        web::scope("/offers")
            .route("", web::get().to(offers::list_offers))
            .route("", web::post().to(offers::create_offer))
            .route("/{id}", web::get().to(offers::get_offer))
            .route("/{id}", web::patch().to(offers::update_offer))
            .route("/{id}", web::delete().to(offers::delete_offer)),
    );
    cfg.service(
        web::resource("/offerdetails/{id}").route(web::get().to(offers::get_offer_detail)),
    );

    // ── Order routes (all protected, require valid JWT) ──
    cfg.service(
        web::scope("/orders")
            .route("", web::get().to(orders::list_orders))
            .route("", web::post().to(orders::create_order))
            .route("/{id}", web::get().to(orders::get_order))
            .route("/{id}", web::patch().to(orders::update_order))
            .route("/{id}", web::delete().to(orders::delete_order)),
    );
    cfg.service(
        web::resource("/order-count/{business_user_id}")
            .route(web::get().to(orders::order_count)),
    );
    cfg.service(
        web::resource("/completed-order-count/{business_user_id}")
            .route(web::get().to(orders::completed_order_count)),
    );

    // ── Review routes (reads public, writes require a valid JWT) ──
    cfg.service(
        web::scope("/reviews")
            .route("", web::get().to(reviews::list_reviews))
            .route("", web::post().to(reviews::create_review))
            .route("/{id}", web::get().to(reviews::get_review))
            .route("/{id}", web::patch().to(reviews::update_review))
            .route("/{id}", web::delete().to(reviews::delete_review)),
    );

    cfg.service(web::resource("/base-info").route(web::get().to(base_info::base_info)));
}
