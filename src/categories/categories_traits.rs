use crate::categories::categories_model::{Category, CategoryUpdate, NewCategory, UpdateCategory};
use crate::errors::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;

/// Trait for category repository operations
#[async_trait]
pub trait CategoryRepositoryTrait: Send + Sync {
    /// Get the default (template) categories of a user, ordered by sort order
    fn list_default_categories(&self, user_id: &str) -> Result<Vec<Category>>;

    /// Get the categories bound to one month, ordered by sort order
    fn list_month_categories(&self, month_id: &str) -> Result<Vec<Category>>;

    /// Get a category by ID
    fn get_category_by_id(&self, id: &str) -> Result<Option<Category>>;

    /// Create a category; a `None` sort order is resolved to the next slot in
    /// the category's scope inside the writer transaction
    async fn create_category(&self, new_category: NewCategory) -> Result<Category>;

    /// Insert a batch of categories in one transaction (materialization)
    async fn insert_categories(&self, new_categories: Vec<NewCategory>) -> Result<Vec<Category>>;

    /// Update a category; fails with NotFound if the id is unknown
    async fn update_category(&self, id: &str, update: UpdateCategory) -> Result<Category>;

    /// Delete a category row; dependent expenses are left untouched
    async fn delete_category(&self, id: &str) -> Result<usize>;
}

/// Trait for the category lifecycle: default templates, month-bound copies,
/// and the one-time materialization between them
#[async_trait]
pub trait CategoryServiceTrait: Send + Sync {
    /// Get the default (template) categories of a user
    fn list_default_categories(&self, user_id: &str) -> Result<Vec<Category>>;

    /// Get the categories bound to one month. Async so the session store can
    /// load categories and expenses for a month concurrently.
    async fn list_month_categories(&self, month_id: &str) -> Result<Vec<Category>>;

    /// Get a category by ID
    fn get_category(&self, id: &str) -> Result<Option<Category>>;

    /// Create a default (template) category for a user
    async fn create_default_category(
        &self,
        user_id: &str,
        name: &str,
        budget_limit: Decimal,
        icon: Option<String>,
    ) -> Result<Category>;

    /// Create a category bound to one month, not mirrored to the templates
    async fn create_month_category(
        &self,
        user_id: &str,
        month_id: &str,
        name: &str,
        budget_limit: Decimal,
        icon: Option<String>,
    ) -> Result<Category>;

    /// Partially update a category
    async fn update_category(&self, id: &str, changes: CategoryUpdate) -> Result<Category>;

    /// Delete a category; its expenses stay in place
    async fn delete_category(&self, id: &str) -> Result<usize>;

    /// Copy the user's default categories into a month, once. If the month
    /// already has bound categories they are returned unchanged.
    async fn materialize_for_month(&self, user_id: &str, month_id: &str) -> Result<Vec<Category>>;

    /// Create the starter template set for a new user
    async fn seed_default_categories(&self, user_id: &str) -> Result<Vec<Category>>;
}
