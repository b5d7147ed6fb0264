use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum Memberships {
    Table,
    Id,
    TenantId,
    MemberId,
    MemberName,
    ActivityId,
    ActivityName,
    MembershipPlanId,
    Cost,
    StartDate,
    EndDate,
    Status,
    PaymentStatus,
    AutoRenewal,
    MaxAttendances,
    CurrentAttendances,
    PreviousMembershipId,
    RenewedToId,
    PriceSource,
    RenewalTrigger,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum PendingPayments {
    Table,
    Id,
    TenantId,
    MembershipId,
    MemberId,
    Amount,
    Status,
    DueDate,
    PaymentType,
    ProofUrl,
    PaidAt,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Members {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Activities {
    Table,
    Id,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Memberships::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Memberships::Id)
                            .string_len(36)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Memberships::TenantId).string_len(64).not_null())
                    .col(ColumnDef::new(Memberships::MemberId).string_len(36).not_null())
                    .col(ColumnDef::new(Memberships::MemberName).string_len(255).not_null())
                    .col(ColumnDef::new(Memberships::ActivityId).string_len(36).not_null())
                    .col(
                        ColumnDef::new(Memberships::ActivityName)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Memberships::MembershipPlanId)
                            .string_len(36)
                            .null(),
                    )
                    .col(ColumnDef::new(Memberships::Cost).big_integer().not_null())
                    .col(ColumnDef::new(Memberships::StartDate).date().not_null())
                    .col(ColumnDef::new(Memberships::EndDate).date().not_null())
                    .col(
                        ColumnDef::new(Memberships::Status)
                            .string_len(16)
                            .not_null()
                            .default("active"),
                    )
                    .col(
                        ColumnDef::new(Memberships::PaymentStatus)
                            .string_len(16)
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(Memberships::AutoRenewal)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Memberships::MaxAttendances).integer().null())
                    .col(
                        ColumnDef::new(Memberships::CurrentAttendances)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Memberships::PreviousMembershipId)
                            .string_len(36)
                            .null(),
                    )
                    .col(ColumnDef::new(Memberships::RenewedToId).string_len(36).null())
                    .col(ColumnDef::new(Memberships::PriceSource).string_len(32).null())
                    .col(ColumnDef::new(Memberships::RenewalTrigger).string_len(16).null())
                    .col(
                        ColumnDef::new(Memberships::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Memberships::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_memberships_member")
                            .from(Memberships::Table, Memberships::MemberId)
                            .to(Members::Table, Members::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_memberships_activity")
                            .from(Memberships::Table, Memberships::ActivityId)
                            .to(Activities::Table, Activities::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        // 过期扫描按 (tenant_id, end_date) 走索引
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_memberships_tenant_end_date")
                    .table(Memberships::Table)
                    .col(Memberships::TenantId)
                    .col(Memberships::EndDate)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_memberships_member_activity")
                    .table(Memberships::Table)
                    .col(Memberships::MemberId)
                    .col(Memberships::ActivityId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PendingPayments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PendingPayments::Id)
                            .string_len(36)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PendingPayments::TenantId)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PendingPayments::MembershipId)
                            .string_len(36)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PendingPayments::MemberId)
                            .string_len(36)
                            .not_null(),
                    )
                    .col(ColumnDef::new(PendingPayments::Amount).big_integer().not_null())
                    .col(
                        ColumnDef::new(PendingPayments::Status)
                            .string_len(16)
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(PendingPayments::DueDate).date().not_null())
                    .col(
                        ColumnDef::new(PendingPayments::PaymentType)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(PendingPayments::ProofUrl).text().null())
                    .col(
                        ColumnDef::new(PendingPayments::PaidAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(PendingPayments::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_pending_payments_membership")
                            .from(PendingPayments::Table, PendingPayments::MembershipId)
                            .to(Memberships::Table, Memberships::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_pending_payments_tenant_status")
                    .table(PendingPayments::Table)
                    .col(PendingPayments::TenantId)
                    .col(PendingPayments::Status)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().if_exists().table(PendingPayments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(Memberships::Table).to_owned())
            .await?;
        Ok(())
    }
}
