use crate::categories::categories_traits::CategoryRepositoryTrait;
use crate::errors::{Error, Result, ValidationError};
use crate::expenses::expenses_model::{Expense, ExpenseUpdate, NewExpense, UpdateExpense};
use crate::expenses::expenses_traits::{ExpenseRepositoryTrait, ExpenseServiceTrait};
use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::sync::Arc;

pub struct ExpenseService {
    expense_repo: Arc<dyn ExpenseRepositoryTrait>,
    category_repo: Arc<dyn CategoryRepositoryTrait>,
}

impl ExpenseService {
    pub fn new(
        expense_repo: Arc<dyn ExpenseRepositoryTrait>,
        category_repo: Arc<dyn CategoryRepositoryTrait>,
    ) -> Self {
        ExpenseService {
            expense_repo,
            category_repo,
        }
    }

    fn validate_amount(amount: Decimal) -> Result<()> {
        if amount < Decimal::ZERO {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Amount cannot be negative".to_string(),
            )));
        }
        Ok(())
    }

    fn validate_date(date: &str) -> Result<()> {
        NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| {
            Error::Validation(ValidationError::InvalidInput(format!(
                "'{}' is not an ISO calendar date",
                date
            )))
        })?;
        Ok(())
    }

    /// The category must exist and be bound to the expense's month.
    fn validate_category_binding(&self, month_id: &str, category_id: &str) -> Result<()> {
        let category = self
            .category_repo
            .get_category_by_id(category_id)?
            .ok_or_else(|| Error::NotFound(format!("Category {}", category_id)))?;

        if category.month_id.as_deref() != Some(month_id) {
            return Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Category {} is not bound to month {}",
                category_id, month_id
            ))));
        }
        Ok(())
    }
}

#[async_trait]
impl ExpenseServiceTrait for ExpenseService {
    async fn list_for_month(&self, month_id: &str) -> Result<Vec<Expense>> {
        let repo = Arc::clone(&self.expense_repo);
        let month_id = month_id.to_string();
        tokio::task::spawn_blocking(move || repo.list_for_month(&month_id))
            .await
            .map_err(|e| Error::Unexpected(format!("expense load task failed: {}", e)))?
    }

    fn list_for_category(&self, month_id: &str, category_id: &str) -> Result<Vec<Expense>> {
        self.expense_repo.list_for_category(month_id, category_id)
    }

    async fn create_expense(
        &self,
        month_id: &str,
        category_id: &str,
        amount: Decimal,
        description: &str,
        date: &str,
    ) -> Result<Expense> {
        Self::validate_amount(amount)?;
        Self::validate_date(date)?;
        self.validate_category_binding(month_id, category_id)?;

        let new_expense = NewExpense {
            id: None,
            month_id: month_id.to_string(),
            category_id: category_id.to_string(),
            amount: amount.to_string(),
            description: description.to_string(),
            date: date.to_string(),
            created_at: None,
        };

        self.expense_repo.create_expense(new_expense).await
    }

    async fn update_expense(&self, id: &str, changes: ExpenseUpdate) -> Result<Expense> {
        if let Some(amount) = changes.amount {
            Self::validate_amount(amount)?;
        }
        if let Some(ref date) = changes.date {
            Self::validate_date(date)?;
        }
        if let Some(ref category_id) = changes.category_id {
            let expense = self
                .expense_repo
                .get_expense_by_id(id)?
                .ok_or_else(|| Error::NotFound(format!("Expense {}", id)))?;
            self.validate_category_binding(&expense.month_id, category_id)?;
        }

        let update = UpdateExpense {
            category_id: changes.category_id,
            amount: changes.amount.map(|amount| amount.to_string()),
            description: changes.description,
            date: changes.date,
        };

        self.expense_repo.update_expense(id, update).await
    }

    async fn delete_expense(&self, id: &str) -> Result<usize> {
        self.expense_repo.delete_expense(id).await
    }
}
