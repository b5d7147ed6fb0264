use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum Tenants {
    Table,
    Id,
    Name,
    LogoUrl,
    SubscriptionPlanId,
    SubscriptionEndsOn,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Members {
    Table,
    Id,
    TenantId,
    FirstName,
    LastName,
    Email,
    Phone,
    Status,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Activities {
    Table,
    Id,
    TenantId,
    Name,
    CreatedAt,
}

#[derive(DeriveIden)]
enum ActivityTiers {
    Table,
    Id,
    ActivityId,
    Position,
    Name,
    Cost,
    DurationMonths,
}

#[derive(DeriveIden)]
enum MembershipPlans {
    Table,
    Id,
    TenantId,
    ActivityId,
    Name,
    Cost,
    DurationMonths,
    MaxAttendances,
    CreatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Tenants::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Tenants::Id)
                            .string_len(64)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Tenants::Name).string_len(255).not_null())
                    .col(ColumnDef::new(Tenants::LogoUrl).text().null())
                    .col(ColumnDef::new(Tenants::SubscriptionPlanId).string_len(36).null())
                    .col(ColumnDef::new(Tenants::SubscriptionEndsOn).date().null())
                    .col(
                        ColumnDef::new(Tenants::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Members::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Members::Id)
                            .string_len(36)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Members::TenantId).string_len(64).not_null())
                    .col(ColumnDef::new(Members::FirstName).string_len(100).not_null())
                    .col(ColumnDef::new(Members::LastName).string_len(100).not_null())
                    .col(ColumnDef::new(Members::Email).string_len(255).null())
                    .col(ColumnDef::new(Members::Phone).string_len(32).null())
                    .col(
                        ColumnDef::new(Members::Status)
                            .string_len(16)
                            .not_null()
                            .default("active"),
                    )
                    .col(
                        ColumnDef::new(Members::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_members_tenant")
                            .from(Members::Table, Members::TenantId)
                            .to(Tenants::Table, Tenants::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_members_tenant")
                    .table(Members::Table)
                    .col(Members::TenantId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Activities::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Activities::Id)
                            .string_len(36)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Activities::TenantId).string_len(64).not_null())
                    .col(ColumnDef::new(Activities::Name).string_len(255).not_null())
                    .col(
                        ColumnDef::new(Activities::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_activities_tenant")
                            .from(Activities::Table, Activities::TenantId)
                            .to(Tenants::Table, Tenants::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ActivityTiers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ActivityTiers::Id)
                            .string_len(36)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ActivityTiers::ActivityId)
                            .string_len(36)
                            .not_null(),
                    )
                    .col(ColumnDef::new(ActivityTiers::Position).integer().not_null())
                    .col(ColumnDef::new(ActivityTiers::Name).string_len(255).not_null())
                    .col(ColumnDef::new(ActivityTiers::Cost).big_integer().not_null())
                    .col(
                        ColumnDef::new(ActivityTiers::DurationMonths)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_activity_tiers_activity")
                            .from(ActivityTiers::Table, ActivityTiers::ActivityId)
                            .to(Activities::Table, Activities::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_activity_tiers_activity_position")
                    .table(ActivityTiers::Table)
                    .col(ActivityTiers::ActivityId)
                    .col(ActivityTiers::Position)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(MembershipPlans::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MembershipPlans::Id)
                            .string_len(36)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(MembershipPlans::TenantId)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MembershipPlans::ActivityId)
                            .string_len(36)
                            .not_null(),
                    )
                    .col(ColumnDef::new(MembershipPlans::Name).string_len(255).not_null())
                    .col(ColumnDef::new(MembershipPlans::Cost).big_integer().not_null())
                    .col(
                        ColumnDef::new(MembershipPlans::DurationMonths)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(ColumnDef::new(MembershipPlans::MaxAttendances).integer().null())
                    .col(
                        ColumnDef::new(MembershipPlans::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_membership_plans_activity")
                            .from(MembershipPlans::Table, MembershipPlans::ActivityId)
                            .to(Activities::Table, Activities::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().if_exists().table(MembershipPlans::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(ActivityTiers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(Activities::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(Members::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(Tenants::Table).to_owned())
            .await?;
        Ok(())
    }
}
