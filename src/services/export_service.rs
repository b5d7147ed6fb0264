//! 月度报表 CSV 导出

use crate::entities::{
    MembershipStatus, PaymentStatus, PriceSource, RenewalTrigger,
    membership_entity as memberships,
};
use crate::error::{AppError, AppResult};
use crate::utils::dates::month_bounds;
use chrono::NaiveDate;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct MembershipRow {
    id: String,
    member: String,
    activity: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
    cost: i64,
    status: MembershipStatus,
    payment_status: PaymentStatus,
    auto_renewal: bool,
}

impl From<memberships::Model> for MembershipRow {
    fn from(m: memberships::Model) -> Self {
        Self {
            id: m.id,
            member: m.member_name,
            activity: m.activity_name,
            start_date: m.start_date,
            end_date: m.end_date,
            cost: m.cost,
            status: m.status,
            payment_status: m.payment_status,
            auto_renewal: m.auto_renewal,
        }
    }
}

#[derive(Debug, Serialize)]
struct RenewalRow {
    id: String,
    previous_membership_id: String,
    member: String,
    activity: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
    cost: i64,
    price_source: Option<PriceSource>,
    trigger: Option<RenewalTrigger>,
    payment_status: PaymentStatus,
}

#[derive(Debug)]
pub struct CsvExport {
    pub filename: String,
    pub content: Vec<u8>,
}

fn write_csv<T: Serialize>(rows: impl IntoIterator<Item = T>) -> AppResult<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer.serialize(row)?;
    }
    writer
        .into_inner()
        .map_err(|e| AppError::InternalError(format!("Failed to flush CSV: {e}")))
}

#[derive(Clone)]
pub struct ExportService {
    pool: DatabaseConnection,
}

impl ExportService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// 有效期与该月有交集的会员卡
    pub async fn membership_snapshot(&self, tenant_id: &str, month: &str) -> AppResult<CsvExport> {
        let (first, last) = month_bounds(month)?;
        let rows = memberships::Entity::find()
            .filter(memberships::Column::TenantId.eq(tenant_id))
            .filter(memberships::Column::StartDate.lte(last))
            .filter(memberships::Column::EndDate.gte(first))
            .order_by_asc(memberships::Column::MemberName)
            .order_by_asc(memberships::Column::StartDate)
            .all(&self.pool)
            .await?;

        Ok(CsvExport {
            filename: format!("memberships-{month}.csv"),
            content: write_csv(rows.into_iter().map(MembershipRow::from))?,
        })
    }

    /// 该月开始的续费记录
    pub async fn renewal_log(&self, tenant_id: &str, month: &str) -> AppResult<CsvExport> {
        let (first, last) = month_bounds(month)?;
        let rows = memberships::Entity::find()
            .filter(memberships::Column::TenantId.eq(tenant_id))
            .filter(memberships::Column::PreviousMembershipId.is_not_null())
            .filter(memberships::Column::StartDate.between(first, last))
            .order_by_asc(memberships::Column::StartDate)
            .all(&self.pool)
            .await?;

        let rows = rows.into_iter().filter_map(|m| {
            Some(RenewalRow {
                previous_membership_id: m.previous_membership_id?,
                id: m.id,
                member: m.member_name,
                activity: m.activity_name,
                start_date: m.start_date,
                end_date: m.end_date,
                cost: m.cost,
                price_source: m.price_source,
                trigger: m.renewal_trigger,
                payment_status: m.payment_status,
            })
        });

        Ok(CsvExport {
            filename: format!("renewals-{month}.csv"),
            content: write_csv(rows)?,
        })
    }
}
