//! Offer aggregate: create, list, update with tier reconciliation, delete.
use actix_web::http::StatusCode;
use actix_web::test;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use serde_json::{Value, json};
use uuid::Uuid;

#[macro_use]
mod common;

use coderr_backend::db::orders as order_db;
use coderr_backend::models::{offer_details, offers, orders};

fn offer_body() -> Value {
    json!({
        "title": "Grafikdesign-Paket",
        "description": "Ein umfassendes Grafikdesign-Paket für Unternehmen.",
        "image": null,
        "details": [
            common::tier_json("basic", 100.0, 7),
            common::tier_json("standard", 200.0, 5),
            common::tier_json("premium", 500.0, 10),
        ]
    })
}

#[actix_web::test]
async fn test_create_offer_persists_offer_and_tiers() {
    let db = common::setup_db().await;
    let app = test_app!(db);
    let business = common::create_business(&db, "firma").await;

    let req = test::TestRequest::post()
        .uri("/api/offers/")
        .insert_header(business.bearer())
        .set_json(offer_body())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["title"], "Grafikdesign-Paket");
    assert_eq!(body["details"].as_array().unwrap().len(), 3);
    assert_eq!(body["details"][0]["offer_type"], "basic");
    assert_eq!(body["details"][0]["features"], json!(["Logo Design", "Flyer"]));

    assert_eq!(offers::Entity::find().count(&db).await.unwrap(), 1);
    assert_eq!(offer_details::Entity::find().count(&db).await.unwrap(), 3);

    let req = test::TestRequest::get()
        .uri(&format!("/api/offers/{}", body["id"].as_str().unwrap()))
        .to_request();
    let offer: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(offer["min_price"], json!(100.0));
    assert_eq!(offer["min_delivery_time"], json!(5));
    assert_eq!(offer["user"], json!(business.id));
    assert_eq!(offer["user_details"]["username"], "firma");
}

#[actix_web::test]
async fn test_only_businesses_create_offers() {
    let db = common::setup_db().await;
    let app = test_app!(db);
    let customer = common::create_customer(&db, "kunde").await;

    let req = test::TestRequest::post()
        .uri("/api/offers")
        .insert_header(customer.bearer())
        .set_json(offer_body())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["detail"][0], "Nur Unternehmen können Angebote erstellen.");

    let req = test::TestRequest::post().uri("/api/offers").set_json(offer_body()).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(offers::Entity::find().count(&db).await.unwrap(), 0);
}

#[actix_web::test]
async fn test_invalid_tier_rejects_the_whole_offer() {
    let db = common::setup_db().await;
    let app = test_app!(db);
    let business = common::create_business(&db, "firma").await;

    let mut body = offer_body();
    body["details"][1]["price"] = json!(0);
    body["details"][2]["delivery_time_in_days"] = json!(0);
    body["details"][2]["features"] = json!([]);

    let req = test::TestRequest::post()
        .uri("/api/offers")
        .insert_header(business.bearer())
        .set_json(body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let errors: Value = test::read_body_json(resp).await;
    assert_eq!(errors["details"][0], json!({}));
    assert_eq!(errors["details"][1]["price"][0], "Preis muss höher als 1 sein.");
    assert_eq!(
        errors["details"][2]["delivery_time_in_days"][0],
        "Lieferzeit muss mindestens 1 Tag sein."
    );
    assert_eq!(
        errors["details"][2]["features"][0],
        "Mindestens eine Feature muss vorhanden sein."
    );

    let mut body = offer_body();
    body["details"][0]["revisions"] = json!(-2);
    let req = test::TestRequest::post()
        .uri("/api/offers")
        .insert_header(business.bearer())
        .set_json(body)
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

    assert_eq!(offers::Entity::find().count(&db).await.unwrap(), 0);
    assert_eq!(offer_details::Entity::find().count(&db).await.unwrap(), 0);
}

#[actix_web::test]
async fn test_mistyped_tier_field_is_reported_on_that_tier() {
    let db = common::setup_db().await;
    let app = test_app!(db);
    let business = common::create_business(&db, "firma").await;

    let mut body = offer_body();
    body["details"][1]["price"] = json!("abc");
    body["details"][2]["revisions"] = json!("viele");
    let req = test::TestRequest::post()
        .uri("/api/offers")
        .insert_header(business.bearer())
        .set_json(body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let errors: Value = test::read_body_json(resp).await;
    assert_eq!(
        errors,
        json!({
            "details": [
                {},
                { "price": ["Ungültiger Preis."] },
                { "revisions": ["Ungültiger Wert für Revisionen."] },
            ]
        })
    );
    assert_eq!(offers::Entity::find().count(&db).await.unwrap(), 0);
}

#[actix_web::test]
async fn test_create_requires_all_three_tiers() {
    let db = common::setup_db().await;
    let app = test_app!(db);
    let business = common::create_business(&db, "firma").await;

    let mut body = offer_body();
    body["details"] = json!([common::tier_json("basic", 10.0, 1), common::tier_json("basic", 20.0, 2)]);
    let req = test::TestRequest::post()
        .uri("/api/offers")
        .insert_header(business.bearer())
        .set_json(body)
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
    assert_eq!(offers::Entity::find().count(&db).await.unwrap(), 0);
}

#[actix_web::test]
async fn test_list_filters_orders_and_paginates() {
    let db = common::setup_db().await;
    let app = test_app!(db);
    let a = common::create_business(&db, "anna").await;
    let b = common::create_business(&db, "bernd").await;

    for i in 0..5 {
        let base = 10.0 * (i + 1) as f64;
        common::create_offer(&db, a.id, &format!("Logo {i}"), [base, base * 2.0, base * 3.0], [7, 5, 3]).await;
    }
    common::create_offer(&db, b.id, "Website Relaunch", [500.0, 900.0, 1500.0], [30, 20, 14]).await;
    common::create_offer(&db, b.id, "Video Schnitt", [80.0, 120.0, 200.0], [4, 3, 2]).await;

    // Default page size is 6.
    let req = test::TestRequest::get().uri("/api/offers").to_request();
    let page: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(page["count"], 7);
    assert_eq!(page["results"].as_array().unwrap().len(), 6);
    assert!(page["next"].as_str().unwrap().contains("page=2"));
    assert!(page["previous"].is_null());

    let req = test::TestRequest::get().uri("/api/offers?page=2").to_request();
    let page: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(page["results"].as_array().unwrap().len(), 1);
    assert!(page["next"].is_null());

    let req = test::TestRequest::get().uri("/api/offers?page=9").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    // Filters.
    let req = test::TestRequest::get()
        .uri(&format!("/api/offers?creator_id={}", b.id))
        .to_request();
    let page: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(page["count"], 2);

    let req = test::TestRequest::get().uri("/api/offers?min_price=45").to_request();
    let page: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(page["count"], 3, "50, 500 and 80 are at least 45");

    let req = test::TestRequest::get().uri("/api/offers?max_delivery_time=2").to_request();
    let page: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(page["count"], 1);
    assert_eq!(page["results"][0]["title"], "Video Schnitt");

    let req = test::TestRequest::get().uri("/api/offers?search=website").to_request();
    let page: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(page["count"], 1);
    assert_eq!(page["results"][0]["user_details"]["username"], "bernd");
    assert_eq!(page["results"][0]["details"].as_array().unwrap().len(), 3);
    assert!(
        page["results"][0]["details"][0]["url"]
            .as_str()
            .unwrap()
            .starts_with("/api/offerdetails/")
    );

    // Ordering by the cheapest tier.
    let req = test::TestRequest::get()
        .uri("/api/offers?ordering=-min_price&page_size=100")
        .to_request();
    let page: Value = test::call_and_read_body_json(&app, req).await;
    let prices: Vec<f64> = page["results"]
        .as_array()
        .unwrap()
        .iter()
        .map(|o| o["min_price"].as_f64().unwrap())
        .collect();
    assert_eq!(prices, vec![500.0, 80.0, 50.0, 40.0, 30.0, 20.0, 10.0]);
}

#[actix_web::test]
async fn test_next_links_keep_the_filters() {
    let db = common::setup_db().await;
    let app = test_app!(db);
    let business = common::create_business(&db, "firma").await;

    for i in 0..8 {
        let base = 10.0 * (i + 1) as f64;
        common::create_offer(&db, business.id, &format!("Logo {i}"), [base, base * 2.0, base * 3.0], [7, 5, 3]).await;
    }
    common::create_offer(&db, business.id, "Video Schnitt", [80.0, 120.0, 200.0], [4, 3, 2]).await;

    let mut uri = Some("/api/offers?search=logo&page_size=3&ordering=created_at".to_string());
    let mut seen = Vec::new();
    let mut pages = 0;
    while let Some(current) = uri {
        let req = test::TestRequest::get().uri(&current).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK, "{current}");
        let page: Value = test::read_body_json(resp).await;
        assert_eq!(page["count"], 8, "{current}");
        for offer in page["results"].as_array().unwrap() {
            assert!(offer["title"].as_str().unwrap().starts_with("Logo"));
            seen.push(offer["id"].as_str().unwrap().to_string());
        }
        if let Some(previous) = page["previous"].as_str() {
            assert!(previous.contains("search=logo"), "{previous}");
            assert!(previous.contains("page_size=3"), "{previous}");
        }
        uri = page["next"].as_str().map(str::to_string);
        if let Some(next) = &uri {
            assert!(next.contains("search=logo"), "{next}");
            assert!(next.contains("ordering=created_at"), "{next}");
            assert!(next.contains("page_size=3"), "{next}");
            assert_eq!(next.matches("&page=").count(), 1, "{next}");
        }
        pages += 1;
    }

    assert_eq!(pages, 3);
    assert_eq!(seen.len(), 8);
    seen.sort();
    seen.dedup();
    assert_eq!(seen.len(), 8);
}

#[actix_web::test]
async fn test_offer_without_tiers_sorts_last() {
    let db = common::setup_db().await;
    let app = test_app!(db);
    let business = common::create_business(&db, "firma").await;

    common::create_offer(&db, business.id, "Logo Basic", [10.0, 20.0, 30.0], [7, 5, 3]).await;
    let bare = common::create_offer(&db, business.id, "Leeres Angebot", [40.0, 50.0, 60.0], [7, 5, 3]).await;
    offer_details::Entity::delete_many()
        .filter(offer_details::Column::OfferId.eq(bare.offer.id))
        .exec(&db)
        .await
        .unwrap();
    common::create_offer(&db, business.id, "Logo Premium", [90.0, 95.0, 99.0], [7, 5, 3]).await;

    for (ordering, expected) in [
        ("min_price", ["Logo Basic", "Logo Premium", "Leeres Angebot"]),
        ("-min_price", ["Logo Premium", "Logo Basic", "Leeres Angebot"]),
    ] {
        let req = test::TestRequest::get()
            .uri(&format!("/api/offers?ordering={ordering}"))
            .to_request();
        let page: Value = test::call_and_read_body_json(&app, req).await;
        let titles: Vec<&str> = page["results"]
            .as_array()
            .unwrap()
            .iter()
            .map(|o| o["title"].as_str().unwrap())
            .collect();
        assert_eq!(titles, expected, "{ordering}");
        assert!(page["results"][2]["min_price"].is_null());
    }

    // A price floor cannot match an offer without any price.
    let req = test::TestRequest::get().uri("/api/offers?min_price=1").to_request();
    let page: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(page["count"], 2);
}

#[actix_web::test]
async fn test_patch_reconciles_tiers_by_id() {
    let db = common::setup_db().await;
    let app = test_app!(db);
    let business = common::create_business(&db, "firma").await;
    let seeded = common::create_offer(&db, business.id, "Logo", [100.0, 200.0, 300.0], [7, 5, 3]).await;
    let keep = seeded.details[0].id;

    let mut overwrite = common::tier_json("basic", 150.0, 6);
    overwrite["id"] = json!(keep);
    let req = test::TestRequest::patch()
        .uri(&format!("/api/offers/{}", seeded.offer.id))
        .insert_header(business.bearer())
        .set_json(json!({
            "title": "Logo Deluxe",
            "details": [overwrite, common::tier_json("premium", 900.0, 2)]
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["title"], "Logo Deluxe");

    let details = offer_details::Entity::find()
        .filter(offer_details::Column::OfferId.eq(seeded.offer.id))
        .all(&db)
        .await
        .unwrap();
    assert_eq!(details.len(), 2);
    let kept = details.iter().find(|d| d.id == keep).expect("overwritten in place");
    assert_eq!(kept.price, 150.0);
    assert_eq!(kept.delivery_time_in_days, 6);
    let created = details.iter().find(|d| d.id != keep).unwrap();
    assert_eq!(created.price, 900.0);
    assert!(seeded.details[1..].iter().all(|old| details.iter().all(|d| d.id != old.id)));

    let offer = offers::Entity::find_by_id(seeded.offer.id).one(&db).await.unwrap().unwrap();
    assert!(offer.updated_at > seeded.offer.updated_at);
}

#[actix_web::test]
async fn test_patch_without_details_keeps_tiers() {
    let db = common::setup_db().await;
    let app = test_app!(db);
    let business = common::create_business(&db, "firma").await;
    let seeded = common::create_offer(&db, business.id, "Logo", [100.0, 200.0, 300.0], [7, 5, 3]).await;

    let req = test::TestRequest::patch()
        .uri(&format!("/api/offers/{}", seeded.offer.id))
        .insert_header(business.bearer())
        .set_json(json!({ "description": "Neu" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["description"], "Neu");
    assert_eq!(body["details"].as_array().unwrap().len(), 3);
}

#[actix_web::test]
async fn test_patch_rejects_foreign_and_duplicate_tier_ids() {
    let db = common::setup_db().await;
    let app = test_app!(db);
    let business = common::create_business(&db, "firma").await;
    let mine = common::create_offer(&db, business.id, "Mein Angebot", [100.0, 200.0, 300.0], [7, 5, 3]).await;
    let other = common::create_offer(&db, business.id, "Anderes", [10.0, 20.0, 30.0], [7, 5, 3]).await;

    let mut foreign = common::tier_json("basic", 1.5, 1);
    foreign["id"] = json!(other.details[0].id);
    let mut dup_a = common::tier_json("basic", 2.0, 1);
    dup_a["id"] = json!(mine.details[0].id);
    let dup_b = dup_a.clone();

    for details in [json!([foreign]), json!([dup_a, dup_b])] {
        let req = test::TestRequest::patch()
            .uri(&format!("/api/offers/{}", mine.offer.id))
            .insert_header(business.bearer())
            .set_json(json!({ "details": details }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
    }

    let count = offer_details::Entity::find()
        .filter(offer_details::Column::OfferId.eq(mine.offer.id))
        .count(&db)
        .await
        .unwrap();
    assert_eq!(count, 3);
    let untouched = offer_details::Entity::find_by_id(other.details[0].id)
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(untouched.price, 10.0);
}

#[actix_web::test]
async fn test_non_owner_cannot_patch_or_delete() {
    let db = common::setup_db().await;
    let app = test_app!(db);
    let owner = common::create_business(&db, "owner").await;
    let intruder = common::create_business(&db, "intruder").await;
    let seeded = common::create_offer(&db, owner.id, "Logo", [100.0, 200.0, 300.0], [7, 5, 3]).await;
    let uri = format!("/api/offers/{}", seeded.offer.id);

    let req = test::TestRequest::patch()
        .uri(&uri)
        .insert_header(intruder.bearer())
        .set_json(json!({ "title": "Gekapert" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::delete().uri(&uri).insert_header(intruder.bearer()).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

    let offer = offers::Entity::find_by_id(seeded.offer.id).one(&db).await.unwrap().unwrap();
    assert_eq!(offer.title, "Logo");

    // Staff may edit anything.
    common::make_staff(&db, intruder.id).await;
    let req = test::TestRequest::patch()
        .uri(&uri)
        .insert_header(intruder.bearer())
        .set_json(json!({ "title": "Moderiert" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_delete_offer_keeps_order_snapshots() {
    let db = common::setup_db().await;
    let app = test_app!(db);
    let business = common::create_business(&db, "firma").await;
    let customer = common::create_customer(&db, "kunde").await;
    let seeded = common::create_offer(&db, business.id, "Logo", [100.0, 200.0, 300.0], [7, 5, 3]).await;
    let order = order_db::create_order(&db, seeded.details[0].id, customer.id)
        .await
        .unwrap()
        .unwrap();

    let req = test::TestRequest::delete()
        .uri(&format!("/api/offers/{}", seeded.offer.id))
        .insert_header(business.bearer())
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NO_CONTENT);

    assert_eq!(offers::Entity::find().count(&db).await.unwrap(), 0);
    assert_eq!(offer_details::Entity::find().count(&db).await.unwrap(), 0);
    let kept = orders::Entity::find_by_id(order.id).one(&db).await.unwrap().unwrap();
    assert_eq!(kept.offer_detail_id, None);
    assert_eq!(kept.price, 100.0);

    let req = test::TestRequest::get()
        .uri(&format!("/api/offers/{}", seeded.offer.id))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_offer_detail_endpoint() {
    let db = common::setup_db().await;
    let app = test_app!(db);
    let business = common::create_business(&db, "firma").await;
    let seeded = common::create_offer(&db, business.id, "Logo", [100.0, 200.0, 300.0], [7, 5, 3]).await;
    let premium = &seeded.details[2];

    let req = test::TestRequest::get()
        .uri(&format!("/api/offerdetails/{}/", premium.id))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["offer_type"], "premium");
    assert_eq!(body["price"], json!(300.0));
    assert_eq!(body["features"], json!(["Logo Design", "Visitenkarte"]));

    let req = test::TestRequest::get()
        .uri(&format!("/api/offerdetails/{}", Uuid::new_v4()))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}
