use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Identifiers for the `profiles` table and its columns.
#[derive(DeriveIden)]
enum Profiles {
    Table,
    UserId,
    ProfileType,
    Username,
    Email,
    FirstName,
    LastName,
    File,
    Location,
    Description,
    WorkingHours,
    Tel,
    CreatedAt,
    UploadedAt,
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
                    .table(Profiles::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Profiles::UserId)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Profiles::ProfileType).string().not_null())
                    .col(ColumnDef::new(Profiles::Username).string().not_null())
                    .col(
                        ColumnDef::new(Profiles::Email)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Profiles::FirstName).string().not_null())
                    .col(ColumnDef::new(Profiles::LastName).string().not_null())
                    .col(ColumnDef::new(Profiles::File).text().null())
                    .col(ColumnDef::new(Profiles::Location).string().not_null())
                    .col(ColumnDef::new(Profiles::Description).text().not_null())
                    .col(ColumnDef::new(Profiles::WorkingHours).string().not_null())
                    .col(ColumnDef::new(Profiles::Tel).string().not_null())
                    .col(
                        ColumnDef::new(Profiles::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Profiles::UploadedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_profiles_user_id")
                            .from(Profiles::Table, Profiles::UserId)
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
            .drop_table(Table::drop().table(Profiles::Table).to_owned())
            .await
    }
}
