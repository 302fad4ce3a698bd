use sea_orm::*;
use serde::Serialize;

use crate::db::{offers, profiles, reviews};
use crate::models::profiles::ProfileType;

/// Platform statistics shown on the landing page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BaseInfo {
    pub review_count: u64,
    pub average_rating: f64,
    pub business_profile_count: u64,
    pub offer_count: u64,
}

/// Mean rating rounded to one decimal, or 0 without ratings.
pub fn round_rating(mean: Option<f64>) -> f64 {
    mean.map_or(0.0, |m| (m * 10.0).round() / 10.0)
}

/// Gather the statistics. Nothing is cached; every call hits the database.
pub async fn get_base_info(db: &DatabaseConnection) -> Result<BaseInfo, DbErr> {
    let (review_count, mean) = reviews::rating_stats(db).await?;
    Ok(BaseInfo {
        review_count,
        average_rating: round_rating(mean),
        business_profile_count: profiles::count_profiles_by_type(db, ProfileType::Business).await?,
        offer_count: offers::count_offers(db).await?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn average_is_zero_without_reviews() {
        assert_eq!(round_rating(None), 0.0);
    }

    #[test]
    fn average_rounds_to_one_decimal() {
        assert_eq!(round_rating(Some(13.0 / 3.0)), 4.3);
        assert_eq!(round_rating(Some(1.5)), 1.5);
        assert_eq!(round_rating(Some(14.0 / 3.0)), 4.7);
        assert_eq!(round_rating(Some(3.0)), 3.0);
    }
}
