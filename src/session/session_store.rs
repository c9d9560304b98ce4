use crate::categories::{Category, CategoryServiceTrait, CategoryUpdate};
use crate::errors::{Error, Result};
use crate::expenses::{Expense, ExpenseServiceTrait, ExpenseUpdate};
use crate::metrics;
use crate::metrics::{CategoryWithExpenses, MonthSummary};
use crate::months::{Month, MonthServiceTrait};
use crate::session::session_model::SessionUpdate;
use log::error;
use rust_decimal::Decimal;
use std::sync::Arc;

/// The working set of one budgeting session: the currently loaded month, its
/// bound categories, and its expenses. Constructed once per logical user
/// session and passed to call sites; there is no global instance.
///
/// The in-memory mirror is only ever updated from rows returned by a
/// successful persistence round-trip, so it cannot diverge from a completed
/// remote mutation. Derived views are recomputed on every read.
pub struct BudgetSession {
    months: Arc<dyn MonthServiceTrait>,
    categories: Arc<dyn CategoryServiceTrait>,
    expenses: Arc<dyn ExpenseServiceTrait>,

    current_month: Option<Month>,
    month_categories: Vec<Category>,
    month_expenses: Vec<Expense>,
    loading: bool,
    last_error: Option<String>,
}

impl BudgetSession {
    pub fn new(
        months: Arc<dyn MonthServiceTrait>,
        categories: Arc<dyn CategoryServiceTrait>,
        expenses: Arc<dyn ExpenseServiceTrait>,
    ) -> Self {
        BudgetSession {
            months,
            categories,
            expenses,
            current_month: None,
            month_categories: Vec::new(),
            month_expenses: Vec::new(),
            loading: false,
            last_error: None,
        }
    }

    pub fn current_month(&self) -> Option<&Month> {
        self.current_month.as_ref()
    }

    pub fn categories(&self) -> &[Category] {
        &self.month_categories
    }

    pub fn expenses(&self) -> &[Expense] {
        &self.month_expenses
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Last failure message, observable independently of the returned errors
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Records a failure in the observable error slot and propagates it
    fn fail<T>(&mut self, context: &str, err: Error) -> Result<T> {
        let message = format!("{}: {}", context, err);
        error!("{}", message);
        self.last_error = Some(message);
        Err(err)
    }

    /// Loads the working set for a (user, year, month). A period with no
    /// month row yet is normal: the working set is cleared, not an error.
    pub async fn load_month(&mut self, user_id: &str, year: i32, month: i32) -> Result<()> {
        self.loading = true;
        self.last_error = None;

        let outcome = self.load_month_inner(user_id, year, month).await;

        self.loading = false;
        match outcome {
            Ok(()) => Ok(()),
            Err(err) => self.fail("Failed to load month", err),
        }
    }

    async fn load_month_inner(&mut self, user_id: &str, year: i32, month: i32) -> Result<()> {
        match self.months.get_month(user_id, year, month)? {
            Some(current) => {
                self.replace_working_set(current).await?;
            }
            None => {
                self.current_month = None;
                self.month_categories.clear();
                self.month_expenses.clear();
            }
        }
        Ok(())
    }

    /// Creates the month (zero revenue), materializes the user's default
    /// categories into it, and loads the working set. Fails if the month
    /// already exists.
    pub async fn initialize_month(&mut self, user_id: &str, year: i32, month: i32) -> Result<()> {
        self.loading = true;
        self.last_error = None;

        let outcome = self.initialize_month_inner(user_id, year, month).await;

        self.loading = false;
        match outcome {
            Ok(()) => Ok(()),
            Err(err) => self.fail("Failed to initialize month", err),
        }
    }

    async fn initialize_month_inner(
        &mut self,
        user_id: &str,
        year: i32,
        month: i32,
    ) -> Result<()> {
        let created = self.months.create_month(user_id, year, month).await?;
        self.categories
            .materialize_for_month(user_id, &created.id)
            .await?;
        self.replace_working_set(created).await
    }

    /// Loads categories and expenses concurrently; the working set is
    /// replaced only once both have arrived.
    async fn replace_working_set(&mut self, month: Month) -> Result<()> {
        let (month_categories, month_expenses) = futures::try_join!(
            self.categories.list_month_categories(&month.id),
            self.expenses.list_for_month(&month.id),
        )?;

        self.current_month = Some(month);
        self.month_categories = month_categories;
        self.month_expenses = month_expenses;
        Ok(())
    }

    /// Persists a new revenue for the loaded month; the in-memory month is
    /// replaced with the row the gateway returns.
    pub async fn update_revenue(&mut self, revenue: Decimal) -> Result<SessionUpdate<Month>> {
        let Some(month_id) = self.current_month.as_ref().map(|m| m.id.clone()) else {
            return Ok(SessionUpdate::NoMonthLoaded);
        };

        match self.months.update_revenue(&month_id, revenue).await {
            Ok(updated) => {
                self.current_month = Some(updated.clone());
                Ok(SessionUpdate::Applied(updated))
            }
            Err(err) => self.fail("Failed to update revenue", err),
        }
    }

    /// Persists an expense and prepends it to the working set: the session
    /// keeps most-recent-first order regardless of persisted ordering.
    pub async fn add_expense(
        &mut self,
        category_id: &str,
        amount: Decimal,
        description: &str,
        date: &str,
    ) -> Result<SessionUpdate<Expense>> {
        let Some(month_id) = self.current_month.as_ref().map(|m| m.id.clone()) else {
            return Ok(SessionUpdate::NoMonthLoaded);
        };

        match self
            .expenses
            .create_expense(&month_id, category_id, amount, description, date)
            .await
        {
            Ok(expense) => {
                self.month_expenses.insert(0, expense.clone());
                Ok(SessionUpdate::Applied(expense))
            }
            Err(err) => self.fail("Failed to add expense", err),
        }
    }

    pub async fn update_expense(
        &mut self,
        expense_id: &str,
        changes: ExpenseUpdate,
    ) -> Result<SessionUpdate<Expense>> {
        match self.expenses.update_expense(expense_id, changes).await {
            Ok(updated) => {
                match self
                    .month_expenses
                    .iter_mut()
                    .find(|expense| expense.id == expense_id)
                {
                    Some(slot) => {
                        *slot = updated.clone();
                        Ok(SessionUpdate::Applied(updated))
                    }
                    None => Ok(SessionUpdate::NotFoundLocally(updated)),
                }
            }
            Err(err) => self.fail("Failed to update expense", err),
        }
    }

    pub async fn delete_expense(&mut self, expense_id: &str) -> Result<SessionUpdate<()>> {
        match self.expenses.delete_expense(expense_id).await {
            Ok(_) => {
                let before = self.month_expenses.len();
                self.month_expenses.retain(|expense| expense.id != expense_id);
                if self.month_expenses.len() < before {
                    Ok(SessionUpdate::Applied(()))
                } else {
                    Ok(SessionUpdate::NotFoundLocally(()))
                }
            }
            Err(err) => self.fail("Failed to delete expense", err),
        }
    }

    /// Adds a category bound to the loaded month (not mirrored back to the
    /// user's default templates).
    pub async fn add_category(
        &mut self,
        user_id: &str,
        name: &str,
        budget_limit: Decimal,
        icon: Option<String>,
    ) -> Result<SessionUpdate<Category>> {
        let Some(month_id) = self.current_month.as_ref().map(|m| m.id.clone()) else {
            return Ok(SessionUpdate::NoMonthLoaded);
        };

        match self
            .categories
            .create_month_category(user_id, &month_id, name, budget_limit, icon)
            .await
        {
            Ok(category) => {
                self.month_categories.push(category.clone());
                Ok(SessionUpdate::Applied(category))
            }
            Err(err) => self.fail("Failed to add category", err),
        }
    }

    pub async fn update_category(
        &mut self,
        category_id: &str,
        changes: CategoryUpdate,
    ) -> Result<SessionUpdate<Category>> {
        match self.categories.update_category(category_id, changes).await {
            Ok(updated) => {
                match self
                    .month_categories
                    .iter_mut()
                    .find(|category| category.id == category_id)
                {
                    Some(slot) => {
                        *slot = updated.clone();
                        Ok(SessionUpdate::Applied(updated))
                    }
                    None => Ok(SessionUpdate::NotFoundLocally(updated)),
                }
            }
            Err(err) => self.fail("Failed to update category", err),
        }
    }

    /// Overrides one bound category's budget for the loaded month, then
    /// reloads the month's categories.
    pub async fn update_category_budget(
        &mut self,
        category_id: &str,
        budget_limit: Decimal,
    ) -> Result<SessionUpdate<()>> {
        let Some(month_id) = self.current_month.as_ref().map(|m| m.id.clone()) else {
            return Ok(SessionUpdate::NoMonthLoaded);
        };

        let changes = CategoryUpdate {
            budget_limit: Some(budget_limit),
            ..CategoryUpdate::default()
        };

        let outcome = async {
            self.categories.update_category(category_id, changes).await?;
            self.categories.list_month_categories(&month_id).await
        }
        .await;

        match outcome {
            Ok(month_categories) => {
                self.month_categories = month_categories;
                Ok(SessionUpdate::Applied(()))
            }
            Err(err) => self.fail("Failed to update category budget", err),
        }
    }

    pub async fn delete_category(&mut self, category_id: &str) -> Result<SessionUpdate<()>> {
        match self.categories.delete_category(category_id).await {
            Ok(_) => {
                let before = self.month_categories.len();
                self.month_categories
                    .retain(|category| category.id != category_id);
                if self.month_categories.len() < before {
                    Ok(SessionUpdate::Applied(()))
                } else {
                    Ok(SessionUpdate::NotFoundLocally(()))
                }
            }
            Err(err) => self.fail("Failed to delete category", err),
        }
    }

    /// Per-category rollups over the working set, recomputed on every call
    pub fn categories_with_expenses(&self) -> Vec<CategoryWithExpenses> {
        if self.current_month.is_none() {
            return Vec::new();
        }

        self.month_categories
            .iter()
            .map(|category| {
                let for_category: Vec<Expense> = self
                    .month_expenses
                    .iter()
                    .filter(|expense| expense.category_id == category.id)
                    .cloned()
                    .collect();
                metrics::category_with_expenses(category.clone(), &for_category)
            })
            .collect()
    }

    /// Month snapshot over the working set; `None` when no month is loaded
    pub fn month_summary(&self) -> Option<MonthSummary> {
        let current = self.current_month.as_ref()?;
        Some(metrics::month_summary(
            current.revenue_decimal(),
            self.categories_with_expenses(),
        ))
    }
}
