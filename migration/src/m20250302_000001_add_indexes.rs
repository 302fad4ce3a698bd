use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Offers {
    Table,
    UserId,
}

#[derive(DeriveIden)]
enum OfferDetails {
    Table,
    OfferId,
}

#[derive(DeriveIden)]
enum Orders {
    Table,
    BusinessUser,
    CustomerUser,
}

#[derive(DeriveIden)]
enum Reviews {
    Table,
    Reviewer,
    BusinessUser,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Index on offers.user_id for the creator_id filter
        manager
            .create_index(
                Index::create()
                    .name("idx_offers_user_id")
                    .table(Offers::Table)
                    .col(Offers::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_offer_details_offer_id")
                    .table(OfferDetails::Table)
                    .col(OfferDetails::OfferId)
                    .to_owned(),
            )
            .await?;

        // Order counts and order listings go through either party
        manager
            .create_index(
                Index::create()
                    .name("idx_orders_business_user")
                    .table(Orders::Table)
                    .col(Orders::BusinessUser)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_orders_customer_user")
                    .table(Orders::Table)
                    .col(Orders::CustomerUser)
                    .to_owned(),
            )
            .await?;

        // One review per customer per business
        manager
            .create_index(
                Index::create()
                    .name("idx_reviews_reviewer_business_unique")
                    .table(Reviews::Table)
                    .col(Reviews::Reviewer)
                    .col(Reviews::BusinessUser)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_offers_user_id").to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_offer_details_offer_id").to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_orders_business_user").to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_orders_customer_user").to_owned())
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx_reviews_reviewer_business_unique")
                    .table(Reviews::Table)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }
}
