use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Identifiers for the `orders` table and its columns.
#[derive(DeriveIden)]
enum Orders {
    Table,
    Id,
    OfferDetailId,
    CustomerUser,
    BusinessUser,
    Title,
    Revisions,
    DeliveryTimeInDays,
    Price,
    Features,
    OfferType,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum OfferDetails {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Orders::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Orders::Id).uuid().not_null().primary_key())
                    // Nullable: the snapshot outlives the tier it was taken from.
                    .col(ColumnDef::new(Orders::OfferDetailId).uuid().null())
                    .col(ColumnDef::new(Orders::CustomerUser).uuid().not_null())
                    .col(ColumnDef::new(Orders::BusinessUser).uuid().not_null())
                    .col(ColumnDef::new(Orders::Title).string().not_null())
                    .col(ColumnDef::new(Orders::Revisions).integer().not_null())
                    .col(
                        ColumnDef::new(Orders::DeliveryTimeInDays)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Orders::Price).double().not_null())
                    .col(ColumnDef::new(Orders::Features).json().not_null())
                    .col(ColumnDef::new(Orders::OfferType).string().not_null())
                    .col(ColumnDef::new(Orders::Status).string().not_null())
                    .col(
                        ColumnDef::new(Orders::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Orders::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_orders_offer_detail_id")
                            .from(Orders::Table, Orders::OfferDetailId)
                            .to(OfferDetails::Table, OfferDetails::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_orders_customer_user")
                            .from(Orders::Table, Orders::CustomerUser)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_orders_business_user")
                            .from(Orders::Table, Orders::BusinessUser)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Orders::Table).to_owned())
            .await
    }
}
