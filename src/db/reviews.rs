use sea_orm::sea_query::{Expr, Func};
use sea_orm::*;
use tracing::info;
use uuid::Uuid;

use crate::models::reviews::{self, NewReview, UpdateReview};
use crate::ordering::ReviewOrdering;

#[tracing::instrument(skip(db, input), fields(business_user = %input.business_user))]
pub async fn insert_review(
    db: &DatabaseConnection,
    reviewer: Uuid,
    input: NewReview,
) -> Result<reviews::Model, DbErr> {
    let now = chrono::Utc::now();
    let review = reviews::ActiveModel {
        id: Set(Uuid::new_v4()),
        reviewer: Set(reviewer),
        business_user: Set(input.business_user),
        rating: Set(input.rating),
        description: Set(input.description),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?;
    info!(review_id = %review.id, "Created review");
    Ok(review)
}

/// Whether `reviewer` already reviewed `business_user`.
pub async fn review_exists(
    db: &DatabaseConnection,
    reviewer: Uuid,
    business_user: Uuid,
) -> Result<bool, DbErr> {
    let count = reviews::Entity::find()
        .filter(reviews::Column::Reviewer.eq(reviewer))
        .filter(reviews::Column::BusinessUser.eq(business_user))
        .count(db)
        .await?;
    Ok(count > 0)
}

pub async fn list_reviews(
    db: &DatabaseConnection,
    business_user: Option<Uuid>,
    reviewer: Option<Uuid>,
    ordering: ReviewOrdering,
) -> Result<Vec<reviews::Model>, DbErr> {
    let mut query = reviews::Entity::find();
    if let Some(business_user) = business_user {
        query = query.filter(reviews::Column::BusinessUser.eq(business_user));
    }
    if let Some(reviewer) = reviewer {
        query = query.filter(reviews::Column::Reviewer.eq(reviewer));
    }
    query
        .order_by(ordering.column, ordering.order())
        .order_by_asc(reviews::Column::Id)
        .all(db)
        .await
}

pub async fn get_review_by_id(
    db: &DatabaseConnection,
    id: Uuid,
) -> Result<Option<reviews::Model>, DbErr> {
    reviews::Entity::find_by_id(id).one(db).await
}

#[tracing::instrument(skip(db, review, input), fields(review_id = %review.id))]
pub async fn update_review(
    db: &DatabaseConnection,
    review: reviews::Model,
    input: UpdateReview,
) -> Result<reviews::Model, DbErr> {
    let mut active: reviews::ActiveModel = review.into();
    if let Some(rating) = input.rating {
        active.rating = Set(rating);
    }
    if let Some(description) = input.description {
        active.description = Set(description);
    }
    active.updated_at = Set(chrono::Utc::now());
    let updated = active.update(db).await?;
    info!(review_id = %updated.id, "Updated review");
    Ok(updated)
}

#[tracing::instrument(skip(db))]
pub async fn delete_review(db: &DatabaseConnection, id: Uuid) -> Result<DeleteResult, DbErr> {
    let result = reviews::Entity::delete_by_id(id).exec(db).await?;
    info!(review_id = %id, "Deleted review");
    Ok(result)
}

/// Number of reviews and their mean rating, computed by the database. The
/// mean is `None` without reviews.
pub async fn rating_stats(db: &DatabaseConnection) -> Result<(u64, Option<f64>), DbErr> {
    let rating = || Expr::col((reviews::Entity, reviews::Column::Rating));
    let stats = reviews::Entity::find()
        .select_only()
        .column_as(Expr::expr(Func::count(rating())), "review_count")
        .column_as(
            Expr::expr(Func::cast_as(Func::avg(rating()), "DOUBLE PRECISION")),
            "average_rating",
        )
        .into_tuple::<(i64, Option<f64>)>()
        .one(db)
        .await?;
    Ok(stats.map_or((0, None), |(count, mean)| (Ord::max(count, 0) as u64, mean)))
}
