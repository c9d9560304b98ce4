#[cfg(test)]
mod tests {
    use crate::categories::{Category, CategoryServiceTrait, CategoryUpdate};
    use crate::errors::{Error, Result, ValidationError};
    use crate::expenses::{Expense, ExpenseServiceTrait, ExpenseUpdate};
    use crate::metrics::ProgressClass;
    use crate::months::{Month, MonthServiceTrait};
    use crate::session::session_model::SessionUpdate;
    use crate::session::session_store::BudgetSession;
    use async_trait::async_trait;
    use chrono::Utc;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::sync::{Arc, Mutex};

    fn now() -> String {
        Utc::now().to_rfc3339()
    }

    fn month_row(id: &str, user_id: &str, year: i32, month: i32, revenue: Decimal) -> Month {
        Month {
            id: id.to_string(),
            user_id: user_id.to_string(),
            year,
            month,
            revenue: revenue.to_string(),
            created_at: now(),
        }
    }

    fn category_row(id: &str, month_id: Option<&str>, name: &str, budget_limit: Decimal) -> Category {
        Category {
            id: id.to_string(),
            user_id: "user-1".to_string(),
            month_id: month_id.map(|m| m.to_string()),
            name: name.to_string(),
            budget_limit: budget_limit.to_string(),
            icon: None,
            is_default: month_id.is_none(),
            sort_order: 0,
            created_at: now(),
            updated_at: now(),
        }
    }

    fn expense_row(id: &str, month_id: &str, category_id: &str, amount: Decimal) -> Expense {
        Expense {
            id: id.to_string(),
            month_id: month_id.to_string(),
            category_id: category_id.to_string(),
            amount: amount.to_string(),
            description: "test expense".to_string(),
            date: "2025-05-10".to_string(),
            created_at: now(),
        }
    }

    // --- Mock month service ---

    #[derive(Default)]
    struct MockMonthService {
        months: Mutex<Vec<Month>>,
        fail_updates: bool,
    }

    impl MockMonthService {
        fn with_months(months: Vec<Month>) -> Self {
            MockMonthService {
                months: Mutex::new(months),
                fail_updates: false,
            }
        }
    }

    #[async_trait]
    impl MonthServiceTrait for MockMonthService {
        fn get_month(&self, user_id: &str, year: i32, month: i32) -> Result<Option<Month>> {
            Ok(self
                .months
                .lock()
                .unwrap()
                .iter()
                .find(|m| m.user_id == user_id && m.year == year && m.month == month)
                .cloned())
        }

        fn list_months(&self, user_id: &str) -> Result<Vec<Month>> {
            Ok(self
                .months
                .lock()
                .unwrap()
                .iter()
                .filter(|m| m.user_id == user_id)
                .cloned()
                .collect())
        }

        async fn create_month(&self, user_id: &str, year: i32, month: i32) -> Result<Month> {
            let mut months = self.months.lock().unwrap();
            if months
                .iter()
                .any(|m| m.user_id == user_id && m.year == year && m.month == month)
            {
                return Err(Error::Validation(ValidationError::InvalidInput(format!(
                    "Month {}-{:02} already exists for this user",
                    year, month
                ))));
            }
            let row = month_row(
                &format!("month-{}-{}", year, month),
                user_id,
                year,
                month,
                dec!(0),
            );
            months.push(row.clone());
            Ok(row)
        }

        async fn update_revenue(&self, month_id: &str, revenue: Decimal) -> Result<Month> {
            if self.fail_updates {
                return Err(Error::Unexpected("mock revenue update failure".to_string()));
            }
            let mut months = self.months.lock().unwrap();
            let slot = months
                .iter_mut()
                .find(|m| m.id == month_id)
                .ok_or_else(|| Error::NotFound(format!("Month {}", month_id)))?;
            slot.revenue = revenue.to_string();
            Ok(slot.clone())
        }
    }

    // --- Mock category service ---

    #[derive(Default)]
    struct MockCategoryService {
        categories: Mutex<Vec<Category>>,
    }

    impl MockCategoryService {
        fn with_categories(categories: Vec<Category>) -> Self {
            MockCategoryService {
                categories: Mutex::new(categories),
            }
        }
    }

    #[async_trait]
    impl CategoryServiceTrait for MockCategoryService {
        fn list_default_categories(&self, user_id: &str) -> Result<Vec<Category>> {
            Ok(self
                .categories
                .lock()
                .unwrap()
                .iter()
                .filter(|c| c.user_id == user_id && c.is_default)
                .cloned()
                .collect())
        }

        async fn list_month_categories(&self, month_id: &str) -> Result<Vec<Category>> {
            Ok(self
                .categories
                .lock()
                .unwrap()
                .iter()
                .filter(|c| c.month_id.as_deref() == Some(month_id))
                .cloned()
                .collect())
        }

        fn get_category(&self, id: &str) -> Result<Option<Category>> {
            Ok(self
                .categories
                .lock()
                .unwrap()
                .iter()
                .find(|c| c.id == id)
                .cloned())
        }

        async fn create_default_category(
            &self,
            user_id: &str,
            name: &str,
            budget_limit: Decimal,
            _icon: Option<String>,
        ) -> Result<Category> {
            let mut categories = self.categories.lock().unwrap();
            let mut row = category_row(&format!("cat-{}", categories.len() + 1), None, name, budget_limit);
            row.user_id = user_id.to_string();
            categories.push(row.clone());
            Ok(row)
        }

        async fn create_month_category(
            &self,
            user_id: &str,
            month_id: &str,
            name: &str,
            budget_limit: Decimal,
            _icon: Option<String>,
        ) -> Result<Category> {
            let mut categories = self.categories.lock().unwrap();
            let mut row = category_row(
                &format!("cat-{}", categories.len() + 1),
                Some(month_id),
                name,
                budget_limit,
            );
            row.user_id = user_id.to_string();
            categories.push(row.clone());
            Ok(row)
        }

        async fn update_category(&self, id: &str, changes: CategoryUpdate) -> Result<Category> {
            let mut categories = self.categories.lock().unwrap();
            let slot = categories
                .iter_mut()
                .find(|c| c.id == id)
                .ok_or_else(|| Error::NotFound(format!("Category {}", id)))?;
            if let Some(name) = changes.name {
                slot.name = name;
            }
            if let Some(budget_limit) = changes.budget_limit {
                slot.budget_limit = budget_limit.to_string();
            }
            if let Some(icon) = changes.icon {
                slot.icon = Some(icon);
            }
            Ok(slot.clone())
        }

        async fn delete_category(&self, id: &str) -> Result<usize> {
            let mut categories = self.categories.lock().unwrap();
            let before = categories.len();
            categories.retain(|c| c.id != id);
            Ok(before - categories.len())
        }

        async fn materialize_for_month(
            &self,
            user_id: &str,
            month_id: &str,
        ) -> Result<Vec<Category>> {
            let mut categories = self.categories.lock().unwrap();
            let existing: Vec<Category> = categories
                .iter()
                .filter(|c| c.month_id.as_deref() == Some(month_id))
                .cloned()
                .collect();
            if !existing.is_empty() {
                return Ok(existing);
            }

            let copies: Vec<Category> = categories
                .iter()
                .filter(|c| c.user_id == user_id && c.is_default)
                .map(|template| {
                    let mut copy = template.clone();
                    copy.id = format!("{}-{}", template.id, month_id);
                    copy.month_id = Some(month_id.to_string());
                    copy.is_default = false;
                    copy
                })
                .collect();
            categories.extend(copies.clone());
            Ok(copies)
        }

        async fn seed_default_categories(&self, _user_id: &str) -> Result<Vec<Category>> {
            Err(Error::Unexpected(
                "MockCategoryService::seed_default_categories not implemented".to_string(),
            ))
        }
    }

    // --- Mock expense service ---

    #[derive(Default)]
    struct MockExpenseService {
        expenses: Mutex<Vec<Expense>>,
        fail_list: bool,
        fail_create: bool,
    }

    impl MockExpenseService {
        fn with_expenses(expenses: Vec<Expense>) -> Self {
            MockExpenseService {
                expenses: Mutex::new(expenses),
                fail_list: false,
                fail_create: false,
            }
        }
    }

    #[async_trait]
    impl ExpenseServiceTrait for MockExpenseService {
        async fn list_for_month(&self, month_id: &str) -> Result<Vec<Expense>> {
            if self.fail_list {
                return Err(Error::Unexpected("mock expense load failure".to_string()));
            }
            Ok(self
                .expenses
                .lock()
                .unwrap()
                .iter()
                .filter(|e| e.month_id == month_id)
                .cloned()
                .collect())
        }

        fn list_for_category(&self, month_id: &str, category_id: &str) -> Result<Vec<Expense>> {
            Ok(self
                .expenses
                .lock()
                .unwrap()
                .iter()
                .filter(|e| e.month_id == month_id && e.category_id == category_id)
                .cloned()
                .collect())
        }

        async fn create_expense(
            &self,
            month_id: &str,
            category_id: &str,
            amount: Decimal,
            description: &str,
            date: &str,
        ) -> Result<Expense> {
            if self.fail_create {
                return Err(Error::Unexpected("mock expense create failure".to_string()));
            }
            let mut expenses = self.expenses.lock().unwrap();
            let mut row = expense_row(
                &format!("exp-{}", expenses.len() + 1),
                month_id,
                category_id,
                amount,
            );
            row.description = description.to_string();
            row.date = date.to_string();
            expenses.push(row.clone());
            Ok(row)
        }

        async fn update_expense(&self, id: &str, changes: ExpenseUpdate) -> Result<Expense> {
            let mut expenses = self.expenses.lock().unwrap();
            let slot = expenses
                .iter_mut()
                .find(|e| e.id == id)
                .ok_or_else(|| Error::NotFound(format!("Expense {}", id)))?;
            if let Some(category_id) = changes.category_id {
                slot.category_id = category_id;
            }
            if let Some(amount) = changes.amount {
                slot.amount = amount.to_string();
            }
            if let Some(description) = changes.description {
                slot.description = description;
            }
            if let Some(date) = changes.date {
                slot.date = date;
            }
            Ok(slot.clone())
        }

        async fn delete_expense(&self, id: &str) -> Result<usize> {
            let mut expenses = self.expenses.lock().unwrap();
            let before = expenses.len();
            expenses.retain(|e| e.id != id);
            Ok(before - expenses.len())
        }
    }

    fn session(
        months: &Arc<MockMonthService>,
        categories: &Arc<MockCategoryService>,
        expenses: &Arc<MockExpenseService>,
    ) -> BudgetSession {
        BudgetSession::new(months.clone(), categories.clone(), expenses.clone())
    }

    /// One month loaded with one bound category and one expense
    async fn loaded_session() -> (
        BudgetSession,
        Arc<MockMonthService>,
        Arc<MockCategoryService>,
        Arc<MockExpenseService>,
    ) {
        let months = Arc::new(MockMonthService::with_months(vec![month_row(
            "month-1",
            "user-1",
            2025,
            5,
            dec!(2000),
        )]));
        let categories = Arc::new(MockCategoryService::with_categories(vec![category_row(
            "cat-groceries",
            Some("month-1"),
            "Groceries",
            dec!(400),
        )]));
        let expenses = Arc::new(MockExpenseService::with_expenses(vec![expense_row(
            "exp-1",
            "month-1",
            "cat-groceries",
            dec!(50),
        )]));

        let mut sess = session(&months, &categories, &expenses);
        sess.load_month("user-1", 2025, 5).await.unwrap();
        (sess, months, categories, expenses)
    }

    #[tokio::test]
    async fn load_month_missing_clears_working_set() {
        let months = Arc::new(MockMonthService::default());
        let categories = Arc::new(MockCategoryService::default());
        let expenses = Arc::new(MockExpenseService::default());
        let mut sess = session(&months, &categories, &expenses);

        sess.load_month("user-1", 2025, 5).await.unwrap();

        assert!(sess.current_month().is_none());
        assert!(sess.categories().is_empty());
        assert!(sess.expenses().is_empty());
        assert!(!sess.is_loading());
        assert!(sess.last_error().is_none());
    }

    #[tokio::test]
    async fn load_month_populates_working_set() {
        let (sess, _, _, _) = loaded_session().await;

        assert_eq!(sess.current_month().unwrap().id, "month-1");
        assert_eq!(sess.categories().len(), 1);
        assert_eq!(sess.expenses().len(), 1);
        assert!(!sess.is_loading());
    }

    #[tokio::test]
    async fn load_month_failure_records_error_and_resets_loading() {
        let months = Arc::new(MockMonthService::with_months(vec![month_row(
            "month-1", "user-1", 2025, 5, dec!(0),
        )]));
        let categories = Arc::new(MockCategoryService::default());
        let expenses = Arc::new(MockExpenseService {
            fail_list: true,
            ..Default::default()
        });
        let mut sess = session(&months, &categories, &expenses);

        let result = sess.load_month("user-1", 2025, 5).await;

        assert!(result.is_err());
        assert!(sess.last_error().unwrap().contains("Failed to load month"));
        assert!(!sess.is_loading());
    }

    #[tokio::test]
    async fn initialize_month_materializes_defaults() {
        let months = Arc::new(MockMonthService::default());
        let categories = Arc::new(MockCategoryService::with_categories(vec![
            category_row("cat-food", None, "Food", dec!(300)),
            category_row("cat-rent", None, "Rent", dec!(800)),
        ]));
        let expenses = Arc::new(MockExpenseService::default());
        let mut sess = session(&months, &categories, &expenses);

        sess.initialize_month("user-1", 2025, 6).await.unwrap();

        let current = sess.current_month().unwrap();
        assert_eq!(current.revenue_decimal(), Decimal::ZERO);
        assert_eq!(sess.categories().len(), 2);
        assert!(sess.categories().iter().all(|c| !c.is_default));
        assert!(sess
            .categories()
            .iter()
            .all(|c| c.month_id.as_deref() == Some(current.id.as_str())));
    }

    #[tokio::test]
    async fn initialize_month_fails_when_month_exists() {
        let (mut sess, _, _, _) = loaded_session().await;

        let result = sess.initialize_month("user-1", 2025, 5).await;

        assert!(result.is_err());
        assert!(sess
            .last_error()
            .unwrap()
            .contains("Failed to initialize month"));
        assert!(!sess.is_loading());
    }

    #[tokio::test]
    async fn update_revenue_replaces_month_with_returned_row() {
        let (mut sess, _, _, _) = loaded_session().await;

        let outcome = sess.update_revenue(dec!(2500)).await.unwrap();

        assert!(outcome.is_applied());
        assert_eq!(sess.current_month().unwrap().revenue_decimal(), dec!(2500));
    }

    #[tokio::test]
    async fn update_revenue_without_month_is_no_month_loaded() {
        let months = Arc::new(MockMonthService::default());
        let categories = Arc::new(MockCategoryService::default());
        let expenses = Arc::new(MockExpenseService::default());
        let mut sess = session(&months, &categories, &expenses);

        let outcome = sess.update_revenue(dec!(100)).await.unwrap();

        assert_eq!(outcome, SessionUpdate::NoMonthLoaded);
        assert!(months.months.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_revenue_failure_records_error() {
        let months = Arc::new(MockMonthService {
            months: Mutex::new(vec![month_row("month-1", "user-1", 2025, 5, dec!(0))]),
            fail_updates: true,
        });
        let categories = Arc::new(MockCategoryService::default());
        let expenses = Arc::new(MockExpenseService::default());
        let mut sess = session(&months, &categories, &expenses);
        sess.load_month("user-1", 2025, 5).await.unwrap();

        let result = sess.update_revenue(dec!(100)).await;

        assert!(result.is_err());
        assert!(sess
            .last_error()
            .unwrap()
            .contains("Failed to update revenue"));
    }

    #[tokio::test]
    async fn add_expense_prepends_to_working_set() {
        let (mut sess, _, _, _) = loaded_session().await;

        let outcome = sess
            .add_expense("cat-groceries", dec!(12.50), "coffee", "2025-05-20")
            .await
            .unwrap();

        let added = outcome.applied().unwrap();
        assert_eq!(sess.expenses().len(), 2);
        assert_eq!(sess.expenses()[0].id, added.id);
        assert_eq!(sess.expenses()[1].id, "exp-1");
    }

    #[tokio::test]
    async fn add_expense_without_month_persists_nothing() {
        let months = Arc::new(MockMonthService::default());
        let categories = Arc::new(MockCategoryService::default());
        let expenses = Arc::new(MockExpenseService::default());
        let mut sess = session(&months, &categories, &expenses);

        let outcome = sess
            .add_expense("cat-groceries", dec!(10), "coffee", "2025-05-20")
            .await
            .unwrap();

        assert_eq!(outcome, SessionUpdate::NoMonthLoaded);
        assert!(expenses.expenses.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn add_expense_failure_records_error() {
        let months = Arc::new(MockMonthService::with_months(vec![month_row(
            "month-1", "user-1", 2025, 5, dec!(0),
        )]));
        let categories = Arc::new(MockCategoryService::default());
        let expenses = Arc::new(MockExpenseService {
            fail_create: true,
            ..Default::default()
        });
        let mut sess = session(&months, &categories, &expenses);
        sess.load_month("user-1", 2025, 5).await.unwrap();

        let result = sess
            .add_expense("cat-groceries", dec!(10), "coffee", "2025-05-20")
            .await;

        assert!(result.is_err());
        assert!(sess.last_error().unwrap().contains("Failed to add expense"));
        assert!(sess.expenses().is_empty());
    }

    #[tokio::test]
    async fn update_expense_reconciles_by_id() {
        let (mut sess, _, _, _) = loaded_session().await;

        let changes = ExpenseUpdate {
            amount: Some(dec!(75)),
            ..ExpenseUpdate::default()
        };
        let outcome = sess.update_expense("exp-1", changes).await.unwrap();

        assert!(outcome.is_applied());
        assert_eq!(sess.expenses()[0].amount_decimal(), dec!(75));
    }

    #[tokio::test]
    async fn update_expense_stale_id_leaves_list_unchanged() {
        let (mut sess, _, _, expenses) = loaded_session().await;

        // A second client added an expense the session never loaded.
        expenses
            .expenses
            .lock()
            .unwrap()
            .push(expense_row("exp-other", "month-1", "cat-groceries", dec!(5)));

        let changes = ExpenseUpdate {
            amount: Some(dec!(9)),
            ..ExpenseUpdate::default()
        };
        let outcome = sess.update_expense("exp-other", changes).await.unwrap();

        assert!(matches!(outcome, SessionUpdate::NotFoundLocally(_)));
        assert_eq!(sess.expenses().len(), 1);
        assert_eq!(sess.expenses()[0].id, "exp-1");
    }

    #[tokio::test]
    async fn delete_expense_removes_from_working_set() {
        let (mut sess, _, _, expenses) = loaded_session().await;

        let outcome = sess.delete_expense("exp-1").await.unwrap();

        assert_eq!(outcome, SessionUpdate::Applied(()));
        assert!(sess.expenses().is_empty());
        assert!(expenses.expenses.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn add_category_appends_to_working_set() {
        let (mut sess, _, _, _) = loaded_session().await;

        let outcome = sess
            .add_category("user-1", "Travel", dec!(250), None)
            .await
            .unwrap();

        let added = outcome.applied().unwrap();
        assert_eq!(sess.categories().len(), 2);
        assert_eq!(sess.categories()[1].id, added.id);
        assert_eq!(added.month_id.as_deref(), Some("month-1"));
    }

    #[tokio::test]
    async fn update_category_budget_reloads_categories() {
        let (mut sess, _, _, _) = loaded_session().await;

        let outcome = sess
            .update_category_budget("cat-groceries", dec!(999))
            .await
            .unwrap();

        assert_eq!(outcome, SessionUpdate::Applied(()));
        assert_eq!(sess.categories()[0].budget_limit_decimal(), dec!(999));
    }

    #[tokio::test]
    async fn delete_category_keeps_expenses() {
        let (mut sess, _, _, expenses) = loaded_session().await;

        let outcome = sess.delete_category("cat-groceries").await.unwrap();

        assert_eq!(outcome, SessionUpdate::Applied(()));
        assert!(sess.categories().is_empty());
        // The expense rows survive, both remotely and in the working set.
        assert_eq!(expenses.expenses.lock().unwrap().len(), 1);
        assert_eq!(sess.expenses().len(), 1);
    }

    #[tokio::test]
    async fn derived_views_group_expenses_by_category() {
        let (mut sess, _, _, _) = loaded_session().await;
        sess.add_expense("cat-groceries", dec!(150), "big shop", "2025-05-21")
            .await
            .unwrap();

        let rollups = sess.categories_with_expenses();
        assert_eq!(rollups.len(), 1);
        assert_eq!(rollups[0].spent, dec!(200));
        assert_eq!(rollups[0].percentage, 50);
        assert_eq!(rollups[0].progress_class(), ProgressClass::Ok);

        let summary = sess.month_summary().unwrap();
        assert_eq!(summary.revenue, dec!(2000));
        assert_eq!(summary.total_expenses, dec!(200));
        assert_eq!(summary.balance, dec!(1800));
    }

    #[tokio::test]
    async fn derived_views_are_empty_without_month() {
        let months = Arc::new(MockMonthService::default());
        let categories = Arc::new(MockCategoryService::default());
        let expenses = Arc::new(MockExpenseService::default());
        let sess = session(&months, &categories, &expenses);

        assert!(sess.categories_with_expenses().is_empty());
        assert!(sess.month_summary().is_none());
    }
}
