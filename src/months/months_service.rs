use crate::errors::{Error, Result, ValidationError};
use crate::months::months_model::{Month, NewMonth};
use crate::months::months_traits::{MonthRepositoryTrait, MonthServiceTrait};
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::Arc;

pub struct MonthService {
    month_repo: Arc<dyn MonthRepositoryTrait>,
}

impl MonthService {
    pub fn new(month_repo: Arc<dyn MonthRepositoryTrait>) -> Self {
        MonthService { month_repo }
    }

    fn validate_period(year: i32, month: i32) -> Result<()> {
        if !(1..=9999).contains(&year) {
            return Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Year {} is out of range",
                year
            ))));
        }
        if !(1..=12).contains(&month) {
            return Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Month {} is out of range",
                month
            ))));
        }
        Ok(())
    }
}

#[async_trait]
impl MonthServiceTrait for MonthService {
    fn get_month(&self, user_id: &str, year: i32, month: i32) -> Result<Option<Month>> {
        Self::validate_period(year, month)?;
        self.month_repo.get_month(user_id, year, month)
    }

    fn list_months(&self, user_id: &str) -> Result<Vec<Month>> {
        self.month_repo.list_months(user_id)
    }

    async fn create_month(&self, user_id: &str, year: i32, month: i32) -> Result<Month> {
        Self::validate_period(year, month)?;

        let new_month = NewMonth {
            id: None,
            user_id: user_id.to_string(),
            year,
            month,
            revenue: Decimal::ZERO.to_string(),
            created_at: None,
        };

        self.month_repo.create_month(new_month).await
    }

    async fn update_revenue(&self, month_id: &str, revenue: Decimal) -> Result<Month> {
        if revenue < Decimal::ZERO {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Revenue cannot be negative".to_string(),
            )));
        }

        self.month_repo
            .update_revenue(month_id, revenue.to_string())
            .await
    }
}
