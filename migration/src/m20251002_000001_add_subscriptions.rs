use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum SubscriptionPlans {
    Table,
    Id,
    Name,
    Price,
    DurationMonths,
    Active,
    CreatedAt,
}

#[derive(DeriveIden)]
enum SubscriptionRequests {
    Table,
    Id,
    TenantId,
    PlanId,
    Status,
    ProofUrl,
    Note,
    CreatedAt,
    ReviewedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SubscriptionPlans::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SubscriptionPlans::Id)
                            .string_len(36)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(SubscriptionPlans::Name)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SubscriptionPlans::Price)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SubscriptionPlans::DurationMonths)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SubscriptionPlans::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(SubscriptionPlans::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SubscriptionRequests::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SubscriptionRequests::Id)
                            .string_len(36)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(SubscriptionRequests::TenantId)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SubscriptionRequests::PlanId)
                            .string_len(36)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SubscriptionRequests::Status)
                            .string_len(16)
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(SubscriptionRequests::ProofUrl).text().null())
                    .col(ColumnDef::new(SubscriptionRequests::Note).text().null())
                    .col(
                        ColumnDef::new(SubscriptionRequests::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SubscriptionRequests::ReviewedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_subscription_requests_plan")
                            .from(SubscriptionRequests::Table, SubscriptionRequests::PlanId)
                            .to(SubscriptionPlans::Table, SubscriptionPlans::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_subscription_requests_status")
                    .table(SubscriptionRequests::Table)
                    .col(SubscriptionRequests::Status)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .if_exists()
                    .table(SubscriptionRequests::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(
                Table::drop()
                    .if_exists()
                    .table(SubscriptionPlans::Table)
                    .to_owned(),
            )
            .await?;
        Ok(())
    }
}
