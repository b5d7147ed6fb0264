//! Background scheduled tasks.
//!
//! One recurring job keeps membership statuses current and runs the monthly
//! automatic renewal pass for every tenant. Call `spawn_all` once during startup.

use crate::services::{AutomationService, ExpirationService};
use crate::utils::dates::today;
use std::time::Duration;

/// One scheduler tick: flip overdue memberships to expired, then give every
/// tenant a chance to run its monthly renewal.
pub async fn run_once(expiration_service: &ExpirationService, automation_service: &AutomationService) {
    let today = today();
    match expiration_service.expire_overdue(today).await {
        Ok(n) if n > 0 => log::info!("Expired memberships processed: {n}"),
        Ok(_) => {}
        Err(e) => log::error!("Failed to expire memberships: {e:?}"),
    }

    match automation_service.run_due_tenants(today).await {
        Ok(runs) if !runs.is_empty() => {
            let renewed: i32 = runs.iter().map(|r| r.renewed_count).sum();
            log::info!("Automatic renewal runs completed: {}, renewed {renewed}", runs.len());
        }
        Ok(_) => {}
        Err(e) => log::error!("Failed to run automatic renewals: {e:?}"),
    }
}

/// Spawn all background tasks. Detaches via `tokio::spawn`; does not block.
pub fn spawn_all(
    expiration_service: ExpirationService,
    automation_service: AutomationService,
    interval_secs: u64,
) {
    // 启动时立即执行一次，之后按间隔执行
    tokio::spawn(async move {
        loop {
            run_once(&expiration_service, &automation_service).await;
            tokio::time::sleep(Duration::from_secs(interval_secs)).await;
        }
    });
}
