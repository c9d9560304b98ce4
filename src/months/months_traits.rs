use crate::errors::Result;
use crate::months::months_model::{Month, NewMonth};
use async_trait::async_trait;
use rust_decimal::Decimal;

/// Trait for month repository operations
#[async_trait]
pub trait MonthRepositoryTrait: Send + Sync {
    /// Get the month for a (user, year, month) tuple; `None` means no data
    /// yet for that period, not an error
    fn get_month(&self, user_id: &str, year: i32, month: i32) -> Result<Option<Month>>;

    /// Get a month by ID
    fn get_month_by_id(&self, id: &str) -> Result<Option<Month>>;

    /// Get all months of a user, most recent first
    fn list_months(&self, user_id: &str) -> Result<Vec<Month>>;

    /// Create a month; fails if the (user, year, month) row already exists
    async fn create_month(&self, new_month: NewMonth) -> Result<Month>;

    /// Update the revenue of a month and return the stored row
    async fn update_revenue(&self, id: &str, revenue: String) -> Result<Month>;
}

/// Trait for month service operations
#[async_trait]
pub trait MonthServiceTrait: Send + Sync {
    /// Look up a month without creating it
    fn get_month(&self, user_id: &str, year: i32, month: i32) -> Result<Option<Month>>;

    /// Get all months of a user, most recent first
    fn list_months(&self, user_id: &str) -> Result<Vec<Month>>;

    /// Create a month with zero revenue
    async fn create_month(&self, user_id: &str, year: i32, month: i32) -> Result<Month>;

    /// Update the revenue of a month
    async fn update_revenue(&self, month_id: &str, revenue: Decimal) -> Result<Month>;
}
