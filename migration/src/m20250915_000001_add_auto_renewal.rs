use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum AutoRenewalConfigs {
    Table,
    TenantId,
    Enabled,
    DayOfMonth,
    NotifyOnly,
    LastRunAt,
    LastRunPeriod,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum RenewalRuns {
    Table,
    Id,
    TenantId,
    Period,
    NotifyOnly,
    DueCount,
    RenewedCount,
    FailedCount,
    StartedAt,
    FinishedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AutoRenewalConfigs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AutoRenewalConfigs::TenantId)
                            .string_len(64)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(AutoRenewalConfigs::Enabled)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(AutoRenewalConfigs::DayOfMonth)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(
                        ColumnDef::new(AutoRenewalConfigs::NotifyOnly)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(AutoRenewalConfigs::LastRunAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(AutoRenewalConfigs::LastRunPeriod)
                            .string_len(7)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(AutoRenewalConfigs::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(RenewalRuns::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RenewalRuns::Id)
                            .string_len(36)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(RenewalRuns::TenantId).string_len(64).not_null())
                    .col(ColumnDef::new(RenewalRuns::Period).string_len(7).not_null())
                    .col(
                        ColumnDef::new(RenewalRuns::NotifyOnly)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(RenewalRuns::DueCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(RenewalRuns::RenewedCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(RenewalRuns::FailedCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(RenewalRuns::StartedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RenewalRuns::FinishedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        // 每个租户每个月只允许一条自动续费记录
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_renewal_runs_tenant_period")
                    .table(RenewalRuns::Table)
                    .col(RenewalRuns::TenantId)
                    .col(RenewalRuns::Period)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().if_exists().table(RenewalRuns::Table).to_owned())
            .await?;
        manager
            .drop_table(
                Table::drop()
                    .if_exists()
                    .table(AutoRenewalConfigs::Table)
                    .to_owned(),
            )
            .await?;
        Ok(())
    }
}
