//! Permission checks.
//!
//! Every check takes the acting user explicitly and is free of I/O; the
//! handlers load whatever resource is involved and pass its owner in.

use uuid::Uuid;

use crate::error::ApiError;
use crate::models::profiles::ProfileType;

/// The authenticated caller of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub user_id: Uuid,
    pub username: String,
    /// `None` for accounts created without a profile, such as staff accounts.
    pub role: Option<ProfileType>,
    pub is_staff: bool,
}

impl Actor {
    pub fn is_business(&self) -> bool {
        self.role == Some(ProfileType::Business)
    }

    pub fn is_customer(&self) -> bool {
        self.role == Some(ProfileType::Customer)
    }
}

pub const ONLY_BUSINESS_CREATES_OFFERS: &str = "Nur Unternehmen können Angebote erstellen.";
pub const OFFER_UPDATE_DENIED: &str = "Nur der Besitzer oder ein Admin kann das Angebot bearbeiten.";
pub const OFFER_DELETE_DENIED: &str = "Nur der Besitzer oder ein Admin kann das Angebot löschen.";
pub const OFFER_DELETE_NEEDS_BUSINESS: &str = "Nur ein Unternehmen kann ein Angebot löschen.";
pub const ONLY_CUSTOMERS_ORDER: &str = "Nur Kunden können Bestellungen aufgeben.";
pub const ORDER_VIEW_DENIED: &str = "Sie sind nicht berechtigt, diese Bestellung anzusehen.";
pub const ORDER_UPDATE_DENIED: &str = "Sie sind nicht berechtigt, diese Bestellung zu ändern.";
pub const ORDER_DELETE_DENIED: &str = "Sie sind nicht berechtigt, diese Bestellung zu löschen.";
pub const ONLY_CUSTOMERS_REVIEW: &str =
    "Nur Benutzer mit einem Kundenprofil können Bewertungen erstellen.";
pub const REVIEW_UPDATE_DENIED: &str = "Nur der Ersteller oder ein Admin kann eine Bewertung bearbeiten.";
pub const REVIEW_DELETE_DENIED: &str = "Nur der Ersteller oder ein Admin kann eine Bewertung löschen.";
pub const NOT_PROFILE_OWNER: &str = "Sie haben keine Berechtigung, dieses Profil zu ändern.";

pub fn require_business(actor: &Actor) -> Result<(), ApiError> {
    if actor.is_business() {
        Ok(())
    } else {
        Err(ApiError::Forbidden(ONLY_BUSINESS_CREATES_OFFERS.into()))
    }
}

pub fn require_customer(actor: &Actor, msg: &str) -> Result<(), ApiError> {
    if actor.is_customer() {
        Ok(())
    } else {
        Err(ApiError::Forbidden(msg.into()))
    }
}

pub fn require_admin(actor: &Actor, msg: &str) -> Result<(), ApiError> {
    if actor.is_staff {
        Ok(())
    } else {
        Err(ApiError::Forbidden(msg.into()))
    }
}

/// The actor owns the resource, or is staff.
pub fn require_owner_or_admin(actor: &Actor, owner: Uuid, msg: &str) -> Result<(), ApiError> {
    if actor.user_id == owner || actor.is_staff {
        Ok(())
    } else {
        Err(ApiError::Forbidden(msg.into()))
    }
}

/// Deleting an offer: owner or staff, and a business account unless staff.
pub fn require_offer_deleter(actor: &Actor, owner: Uuid) -> Result<(), ApiError> {
    require_owner_or_admin(actor, owner, OFFER_DELETE_DENIED)?;
    if actor.is_business() || actor.is_staff {
        Ok(())
    } else {
        Err(ApiError::Forbidden(OFFER_DELETE_NEEDS_BUSINESS.into()))
    }
}

/// The actor is the customer or the business of an order, or is staff.
pub fn is_order_party(actor: &Actor, customer_user: Uuid, business_user: Uuid) -> bool {
    actor.is_staff || actor.user_id == customer_user || actor.user_id == business_user
}

/// Profiles may only be edited by the user they belong to.
pub fn require_same_user(actor: &Actor, user_id: Uuid) -> Result<(), ApiError> {
    if actor.user_id == user_id {
        Ok(())
    } else {
        Err(ApiError::Forbidden(NOT_PROFILE_OWNER.into()))
    }
}
