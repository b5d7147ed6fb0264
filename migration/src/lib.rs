pub use sea_orm_migration::prelude::*;

mod m20250901_000001_initial;
mod m20250901_000002_add_memberships;
mod m20250915_000001_add_auto_renewal;
mod m20251002_000001_add_subscriptions;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250901_000001_initial::Migration),
            Box::new(m20250901_000002_add_memberships::Migration),
            Box::new(m20250915_000001_add_auto_renewal::Migration),
            Box::new(m20251002_000001_add_subscriptions::Migration),
        ]
    }
}
