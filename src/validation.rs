//! Field-level validation for request bodies.
//!
//! Validators never stop at the first problem: every field is checked and all
//! messages are collected, so a client can fix a form in one round trip.
//! Messages are German because the existing frontend displays them as-is.

use serde_json::{Value, json};
use std::collections::HashSet;
use uuid::Uuid;

use crate::error::{ApiError, FieldErrors};
use crate::models::offer_details::{DetailChange, NewOfferDetail, OfferDetailInput, OfferType};
use crate::models::offers::{CreateOffer, NewOffer, OfferChanges, UpdateOffer};
use crate::models::profiles::{ProfileType, UpdateProfile};
use crate::models::reviews::{CreateReview, NewReview, UpdateReview};
use crate::models::users::Registration;

pub mod messages {
    pub const REQUIRED: &str = "Dieses Feld ist erforderlich.";
    pub const INVALID: &str = "Ungültiger Wert.";
    pub const INVALID_PRICE: &str = "Ungültiger Preis.";
    pub const INVALID_REVISIONS: &str = "Ungültiger Wert für Revisionen.";
    pub const BLANK: &str = "Dieses Feld darf nicht leer sein.";
    pub const PRICE: &str = "Preis muss höher als 1 sein.";
    pub const DELIVERY_TIME: &str = "Lieferzeit muss mindestens 1 Tag sein.";
    pub const REVISIONS: &str = "Revisionen müssen -1 (unbegrenzt) oder eine positive Zahl sein.";
    pub const FEATURES: &str = "Mindestens eine Feature muss vorhanden sein.";
    pub const TIER_SET: &str =
        "Ein Angebot muss genau drei Details enthalten: basic, standard und premium.";
    pub const DUPLICATE_DETAIL_ID: &str = "Jedes Detail darf nur einmal referenziert werden.";
    pub const FOREIGN_DETAIL_ID: &str = "Dieses Detail gehört zu einem anderen Angebot.";
    pub const EMAIL_INVALID: &str = "E-Mail ist ungültig.";
    pub const PASSWORD_MISMATCH: &str = "Passwörter stimmen nicht überein.";
    pub const PROFILE_TYPE: &str = "Ungültiger Profiltyp. Erlaubt sind business oder customer.";
    pub const RATING: &str = "Die Bewertung muss zwischen 1 und 5 liegen.";
    pub const NOTHING_TO_UPDATE: &str = "Keine Felder zum Aktualisieren angegeben.";
}

/// Smallest and largest accepted review rating.
pub const RATING_RANGE: std::ops::RangeInclusive<i32> = 1..=5;

fn push(errors: &mut FieldErrors, field: &str, msg: &str) {
    errors.entry(field.to_string()).or_default().push(msg.to_string());
}

/// A required, non-blank string. Records an error and yields `None` otherwise.
fn required_text(errors: &mut FieldErrors, field: &str, value: Option<&String>) -> Option<String> {
    match value {
        None => {
            push(errors, field, messages::REQUIRED);
            None
        }
        Some(v) if v.trim().is_empty() => {
            push(errors, field, messages::BLANK);
            None
        }
        Some(v) => Some(v.trim().to_string()),
    }
}

/// An optional string that, when present, must not be blank.
fn optional_text(errors: &mut FieldErrors, field: &str, value: Option<&String>) -> Option<String> {
    match value {
        Some(v) if v.trim().is_empty() => {
            push(errors, field, messages::BLANK);
            None
        }
        other => other.map(|v| v.trim().to_string()),
    }
}

/// A required JSON value decoded with `parse`. A missing value records
/// `REQUIRED`, one `parse` rejects records `invalid`.
fn required_value<T>(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<&Value>,
    invalid: &str,
    parse: impl FnOnce(&Value) -> Option<T>,
) -> Option<T> {
    let Some(value) = value else {
        push(errors, field, messages::REQUIRED);
        return None;
    };
    let parsed = parse(value);
    if parsed.is_none() {
        push(errors, field, invalid);
    }
    parsed
}

/// A JSON number, or a string holding one.
fn decimal(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|n| n.is_finite())
}

/// A whole JSON number in `i32` range, or a string holding one.
fn integer(value: &Value) -> Option<i32> {
    match value {
        Value::Number(n) => n.as_i64().and_then(|n| i32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn text_list(value: &Value) -> Option<Vec<String>> {
    value
        .as_array()?
        .iter()
        .map(|v| v.as_str().map(str::to_string))
        .collect()
}

/// Check one tier in isolation.
pub fn validate_offer_detail(input: &OfferDetailInput) -> Result<DetailChange, FieldErrors> {
    let mut errors = FieldErrors::new();

    let id = match &input.id {
        None | Some(Value::Null) => None,
        Some(v) => {
            let id = serde_json::from_value::<Uuid>(v.clone()).ok();
            if id.is_none() {
                push(&mut errors, "id", messages::INVALID);
            }
            id
        }
    };

    let title = match required_value(&mut errors, "title", input.title.as_ref(), messages::INVALID, |v| {
        v.as_str().map(|t| t.trim().to_string())
    }) {
        Some(t) if t.is_empty() => {
            push(&mut errors, "title", messages::BLANK);
            None
        }
        other => other,
    };

    let price = match required_value(&mut errors, "price", input.price.as_ref(), messages::INVALID_PRICE, decimal) {
        Some(p) if p <= 0.0 => {
            push(&mut errors, "price", messages::PRICE);
            None
        }
        other => other,
    };

    let delivery_time_in_days = match required_value(
        &mut errors,
        "delivery_time_in_days",
        input.delivery_time_in_days.as_ref(),
        messages::INVALID,
        integer,
    ) {
        Some(d) if d <= 0 => {
            push(&mut errors, "delivery_time_in_days", messages::DELIVERY_TIME);
            None
        }
        other => other,
    };

    let revisions = match required_value(
        &mut errors,
        "revisions",
        input.revisions.as_ref(),
        messages::INVALID_REVISIONS,
        integer,
    ) {
        Some(r) if r < -1 => {
            push(&mut errors, "revisions", messages::REVISIONS);
            None
        }
        other => other,
    };

    let features = match required_value(&mut errors, "features", input.features.as_ref(), messages::INVALID, text_list) {
        Some(f) if f.is_empty() => {
            push(&mut errors, "features", messages::FEATURES);
            None
        }
        other => other,
    };

    let offer_type = required_value(&mut errors, "offer_type", input.offer_type.as_ref(), messages::INVALID, |v| {
        serde_json::from_value::<OfferType>(v.clone()).ok()
    });

    match (title, price, delivery_time_in_days, revisions, features, offer_type) {
        (Some(title), Some(price), Some(delivery_time_in_days), Some(revisions), Some(features), Some(offer_type))
            if errors.is_empty() =>
        {
            Ok(DetailChange {
                id,
                detail: NewOfferDetail {
                    title,
                    revisions,
                    delivery_time_in_days,
                    price,
                    features,
                    offer_type,
                },
            })
        }
        _ => Err(errors),
    }
}

/// Validate every submitted tier. On any failure the error body carries one
/// entry per submitted tier, in order, with `{}` for tiers that were fine.
pub fn validate_offer_details(inputs: &[OfferDetailInput]) -> Result<Vec<DetailChange>, ApiError> {
    let results: Vec<_> = inputs.iter().map(validate_offer_detail).collect();
    if results.iter().all(Result::is_ok) {
        return Ok(results.into_iter().filter_map(Result::ok).collect());
    }

    let per_detail: Vec<Value> = results
        .into_iter()
        .map(|r| match r {
            Ok(_) => json!({}),
            Err(errors) => json!(errors),
        })
        .collect();
    Err(ApiError::Validation(json!({ "details": per_detail })))
}

/// An offer is published with exactly one tier of each type.
pub fn is_complete_tier_set(details: &[NewOfferDetail]) -> bool {
    let types: HashSet<OfferType> = details.iter().map(|d| d.offer_type).collect();
    details.len() == OfferType::ALL.len() && OfferType::ALL.iter().all(|t| types.contains(t))
}

pub fn validate_create_offer(input: &CreateOffer) -> Result<NewOffer, ApiError> {
    let mut errors = FieldErrors::new();
    let title = required_text(&mut errors, "title", input.title.as_ref());
    let description = required_text(&mut errors, "description", input.description.as_ref());

    let details = match &input.details {
        None => {
            push(&mut errors, "details", messages::REQUIRED);
            None
        }
        Some(details) => Some(details),
    };
    if !errors.is_empty() {
        return Err(ApiError::fields(errors));
    }

    let details: Vec<NewOfferDetail> = validate_offer_details(details.map(Vec::as_slice).unwrap_or_default())?
        .into_iter()
        .map(|c| c.detail)
        .collect();
    if !is_complete_tier_set(&details) {
        return Err(ApiError::Validation(json!({ "details": [messages::TIER_SET] })));
    }

    match (title, description) {
        (Some(title), Some(description)) => Ok(NewOffer {
            title,
            description,
            image: input.image.clone().filter(|i| !i.trim().is_empty()),
            details,
        }),
        _ => Err(ApiError::detail(messages::REQUIRED)),
    }
}

/// Validate a partial offer update. Identifier ambiguity inside the payload
/// (the same tier id twice) is rejected here; ids owned by another offer are
/// caught by the database layer, which can see them.
pub fn validate_update_offer(input: &UpdateOffer) -> Result<OfferChanges, ApiError> {
    let mut errors = FieldErrors::new();
    let title = optional_text(&mut errors, "title", input.title.as_ref());
    let description = optional_text(&mut errors, "description", input.description.as_ref());
    if !errors.is_empty() {
        return Err(ApiError::fields(errors));
    }

    let details = match &input.details {
        None => None,
        Some(inputs) => {
            let changes = validate_offer_details(inputs)?;
            let mut seen = HashSet::new();
            if changes.iter().filter_map(|c| c.id).any(|id| !seen.insert(id)) {
                return Err(ApiError::Validation(
                    json!({ "details": [messages::DUPLICATE_DETAIL_ID] }),
                ));
            }
            Some(changes)
        }
    };

    Ok(OfferChanges {
        title,
        description,
        image: input.image.clone(),
        details,
    })
}

/// Loose syntactic check: one `@`, something before it and a dotted domain after.
pub fn is_valid_email(email: &str) -> bool {
    let mut parts = email.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => {
            !local.is_empty()
                && !email.contains(char::is_whitespace)
                && domain.split('.').count() >= 2
                && domain.split('.').all(|label| !label.is_empty())
        }
        _ => false,
    }
}

/// Validated registration fields.
#[derive(Debug, Clone)]
pub struct RegistrationInput {
    pub username: String,
    pub email: String,
    pub password: String,
    pub profile_type: ProfileType,
}

pub fn validate_registration(input: &Registration) -> Result<RegistrationInput, ApiError> {
    let mut errors = FieldErrors::new();
    let username = required_text(&mut errors, "username", input.username.as_ref());
    let email = required_text(&mut errors, "email", input.email.as_ref());
    if let Some(email) = &email {
        if !is_valid_email(email) {
            push(&mut errors, "email", messages::EMAIL_INVALID);
        }
    }
    let password = match &input.password {
        None => {
            push(&mut errors, "password", messages::REQUIRED);
            None
        }
        Some(p) if p.is_empty() => {
            push(&mut errors, "password", messages::BLANK);
            None
        }
        Some(p) => Some(p.clone()),
    };
    if input.repeated_password.is_none() {
        push(&mut errors, "repeated_password", messages::REQUIRED);
    }
    let profile_type = match input.profile_type.as_deref() {
        None => {
            push(&mut errors, "type", messages::REQUIRED);
            None
        }
        Some(t) => {
            let parsed = ProfileType::parse(t);
            if parsed.is_none() {
                push(&mut errors, "type", messages::PROFILE_TYPE);
            }
            parsed
        }
    };
    if !errors.is_empty() {
        return Err(ApiError::fields(errors));
    }

    match (username, email, password, profile_type) {
        (Some(username), Some(email), Some(password), Some(profile_type)) => {
            if input.repeated_password.as_deref() != Some(password.as_str()) {
                return Err(ApiError::detail(messages::PASSWORD_MISMATCH));
            }
            Ok(RegistrationInput {
                username,
                email,
                password,
                profile_type,
            })
        }
        _ => Err(ApiError::detail(messages::REQUIRED)),
    }
}

fn check_rating(errors: &mut FieldErrors, rating: i32) {
    if !RATING_RANGE.contains(&rating) {
        push(errors, "rating", messages::RATING);
    }
}

pub fn validate_create_review(input: &CreateReview) -> Result<NewReview, ApiError> {
    let mut errors = FieldErrors::new();
    if input.business_user.is_none() {
        push(&mut errors, "business_user", messages::REQUIRED);
    }
    match input.rating {
        None => push(&mut errors, "rating", messages::REQUIRED),
        Some(r) => check_rating(&mut errors, r),
    }
    let description = required_text(&mut errors, "description", input.description.as_ref());
    if !errors.is_empty() {
        return Err(ApiError::fields(errors));
    }

    match (input.business_user, input.rating, description) {
        (Some(business_user), Some(rating), Some(description)) => Ok(NewReview {
            business_user,
            rating,
            description,
        }),
        _ => Err(ApiError::detail(messages::REQUIRED)),
    }
}

pub fn validate_update_review(input: &UpdateReview) -> Result<UpdateReview, ApiError> {
    let mut errors = FieldErrors::new();
    if let Some(r) = input.rating {
        check_rating(&mut errors, r);
    }
    let description = optional_text(&mut errors, "description", input.description.as_ref());
    if !errors.is_empty() {
        return Err(ApiError::fields(errors));
    }
    if input.rating.is_none() && description.is_none() {
        return Err(ApiError::detail(messages::NOTHING_TO_UPDATE));
    }
    Ok(UpdateReview {
        rating: input.rating,
        description,
    })
}

/// Reject any key outside the profile allow-list, then check the values.
pub fn validate_profile_update(
    payload: &serde_json::Map<String, Value>,
) -> Result<UpdateProfile, ApiError> {
    use crate::models::profiles::UPDATABLE_FIELDS;

    let rejected: Vec<&str> = payload
        .keys()
        .map(String::as_str)
        .filter(|k| !UPDATABLE_FIELDS.contains(k))
        .collect();
    if !rejected.is_empty() {
        return Err(ApiError::detail(format!(
            "Die Felder {} können nicht aktualisiert werden. Nur die Felder {} dürfen aktualisiert werden.",
            rejected.join(", "),
            UPDATABLE_FIELDS.join(", ")
        )));
    }
    if payload.is_empty() {
        return Err(ApiError::detail(format!(
            "Es können nur die Felder {} aktualisiert werden.",
            UPDATABLE_FIELDS.join(", ")
        )));
    }

    let update: UpdateProfile = serde_json::from_value(Value::Object(payload.clone()))
        .map_err(|e| ApiError::detail(e.to_string()))?;

    let mut errors = FieldErrors::new();
    let checked = [
        ("email", &update.email),
        ("first_name", &update.first_name),
        ("last_name", &update.last_name),
        ("location", &update.location),
        ("description", &update.description),
        ("working_hours", &update.working_hours),
        ("tel", &update.tel),
    ];
    for (field, value) in checked {
        if value.as_ref().is_some_and(|v| v.trim().is_empty()) {
            push(&mut errors, field, messages::BLANK);
        }
    }
    if let Some(email) = &update.email {
        if !email.trim().is_empty() && !is_valid_email(email.trim()) {
            push(&mut errors, "email", messages::EMAIL_INVALID);
        }
    }
    if !errors.is_empty() {
        return Err(ApiError::fields(errors));
    }
    Ok(update)
}
