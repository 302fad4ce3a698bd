use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Identifiers for the `offer_details` table and its columns.
#[derive(DeriveIden)]
enum OfferDetails {
    Table,
    Id,
    OfferId,
    Title,
    Revisions,
    DeliveryTimeInDays,
    Price,
    Features,
    OfferType,
}

#[derive(DeriveIden)]
enum Offers {
    Table,
    Id,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(OfferDetails::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(OfferDetails::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(OfferDetails::OfferId).uuid().not_null())
                    .col(ColumnDef::new(OfferDetails::Title).string().not_null())
                    .col(ColumnDef::new(OfferDetails::Revisions).integer().not_null())
                    .col(
                        ColumnDef::new(OfferDetails::DeliveryTimeInDays)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(OfferDetails::Price).double().not_null())
                    .col(ColumnDef::new(OfferDetails::Features).json().not_null())
                    .col(ColumnDef::new(OfferDetails::OfferType).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_offer_details_offer_id")
                            .from(OfferDetails::Table, OfferDetails::OfferId)
                            .to(Offers::Table, Offers::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(OfferDetails::Table).to_owned())
            .await
    }
}
