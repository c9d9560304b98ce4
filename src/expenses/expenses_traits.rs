use crate::errors::Result;
use crate::expenses::expenses_model::{Expense, ExpenseUpdate, NewExpense, UpdateExpense};
use async_trait::async_trait;
use rust_decimal::Decimal;

/// Trait for expense repository operations
#[async_trait]
pub trait ExpenseRepositoryTrait: Send + Sync {
    /// Get all expenses of a month, most recent date first
    fn list_for_month(&self, month_id: &str) -> Result<Vec<Expense>>;

    /// Get the expenses of one category in a month, most recent date first
    fn list_for_category(&self, month_id: &str, category_id: &str) -> Result<Vec<Expense>>;

    /// Get an expense by ID
    fn get_expense_by_id(&self, id: &str) -> Result<Option<Expense>>;

    /// Create an expense
    async fn create_expense(&self, new_expense: NewExpense) -> Result<Expense>;

    /// Update an expense; fails with NotFound if the id is unknown
    async fn update_expense(&self, id: &str, update: UpdateExpense) -> Result<Expense>;

    /// Delete an expense
    async fn delete_expense(&self, id: &str) -> Result<usize>;
}

/// Trait for expense service operations
#[async_trait]
pub trait ExpenseServiceTrait: Send + Sync {
    /// Get all expenses of a month. Async so the session store can load
    /// expenses and categories for a month concurrently.
    async fn list_for_month(&self, month_id: &str) -> Result<Vec<Expense>>;

    /// Get the expenses of one category in a month
    fn list_for_category(&self, month_id: &str, category_id: &str) -> Result<Vec<Expense>>;

    /// Create an expense against a category bound to the same month
    async fn create_expense(
        &self,
        month_id: &str,
        category_id: &str,
        amount: Decimal,
        description: &str,
        date: &str,
    ) -> Result<Expense>;

    /// Partially update an expense
    async fn update_expense(&self, id: &str, changes: ExpenseUpdate) -> Result<Expense>;

    /// Delete an expense
    async fn delete_expense(&self, id: &str) -> Result<usize>;
}
