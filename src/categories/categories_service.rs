use crate::categories::categories_model::{Category, CategoryUpdate, NewCategory, UpdateCategory};
use crate::categories::categories_traits::{CategoryRepositoryTrait, CategoryServiceTrait};
use crate::errors::{Error, Result, ValidationError};
use async_trait::async_trait;
use chrono::Utc;
use log::debug;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;

/// Starter template set created for a new user
const STARTER_CATEGORIES: [(&str, Decimal, &str); 5] = [
    ("Food", dec!(300), "🍔"),
    ("Transport", dec!(150), "🚗"),
    ("Leisure", dec!(200), "🎮"),
    ("Housing", dec!(800), "🏠"),
    ("Health", dec!(100), "💊"),
];

pub struct CategoryService {
    category_repo: Arc<dyn CategoryRepositoryTrait>,
}

impl CategoryService {
    pub fn new(category_repo: Arc<dyn CategoryRepositoryTrait>) -> Self {
        CategoryService { category_repo }
    }

    fn validate(name: &str, budget_limit: Decimal) -> Result<()> {
        if name.trim().is_empty() {
            return Err(Error::Validation(ValidationError::MissingField(
                "name".to_string(),
            )));
        }
        if budget_limit < Decimal::ZERO {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Budget limit cannot be negative".to_string(),
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl CategoryServiceTrait for CategoryService {
    fn list_default_categories(&self, user_id: &str) -> Result<Vec<Category>> {
        self.category_repo.list_default_categories(user_id)
    }

    async fn list_month_categories(&self, month_id: &str) -> Result<Vec<Category>> {
        let repo = Arc::clone(&self.category_repo);
        let month_id = month_id.to_string();
        tokio::task::spawn_blocking(move || repo.list_month_categories(&month_id))
            .await
            .map_err(|e| Error::Unexpected(format!("category load task failed: {}", e)))?
    }

    fn get_category(&self, id: &str) -> Result<Option<Category>> {
        self.category_repo.get_category_by_id(id)
    }

    async fn create_default_category(
        &self,
        user_id: &str,
        name: &str,
        budget_limit: Decimal,
        icon: Option<String>,
    ) -> Result<Category> {
        Self::validate(name, budget_limit)?;

        let new_category = NewCategory {
            id: None,
            user_id: user_id.to_string(),
            month_id: None,
            name: name.to_string(),
            budget_limit: budget_limit.to_string(),
            icon,
            is_default: true,
            sort_order: None,
            created_at: None,
            updated_at: None,
        };

        self.category_repo.create_category(new_category).await
    }

    async fn create_month_category(
        &self,
        user_id: &str,
        month_id: &str,
        name: &str,
        budget_limit: Decimal,
        icon: Option<String>,
    ) -> Result<Category> {
        Self::validate(name, budget_limit)?;

        let new_category = NewCategory {
            id: None,
            user_id: user_id.to_string(),
            month_id: Some(month_id.to_string()),
            name: name.to_string(),
            budget_limit: budget_limit.to_string(),
            icon,
            is_default: false,
            sort_order: None,
            created_at: None,
            updated_at: None,
        };

        self.category_repo.create_category(new_category).await
    }

    async fn update_category(&self, id: &str, changes: CategoryUpdate) -> Result<Category> {
        if let Some(ref name) = changes.name {
            if name.trim().is_empty() {
                return Err(Error::Validation(ValidationError::MissingField(
                    "name".to_string(),
                )));
            }
        }
        if let Some(budget_limit) = changes.budget_limit {
            if budget_limit < Decimal::ZERO {
                return Err(Error::Validation(ValidationError::InvalidInput(
                    "Budget limit cannot be negative".to_string(),
                )));
            }
        }

        let update = UpdateCategory {
            name: changes.name,
            budget_limit: changes.budget_limit.map(|limit| limit.to_string()),
            icon: changes.icon,
            updated_at: Utc::now().to_rfc3339(),
        };

        self.category_repo.update_category(id, update).await
    }

    async fn delete_category(&self, id: &str) -> Result<usize> {
        self.category_repo.delete_category(id).await
    }

    async fn materialize_for_month(&self, user_id: &str, month_id: &str) -> Result<Vec<Category>> {
        // Copy once, diverge after: a month that already has bound categories
        // keeps them as they are, including any per-month budget overrides.
        let existing = self.category_repo.list_month_categories(month_id)?;
        if !existing.is_empty() {
            return Ok(existing);
        }

        let defaults = self.category_repo.list_default_categories(user_id)?;
        let copies: Vec<NewCategory> = defaults
            .iter()
            .map(|template| NewCategory {
                id: None,
                user_id: user_id.to_string(),
                month_id: Some(month_id.to_string()),
                name: template.name.clone(),
                budget_limit: template.budget_limit.clone(),
                icon: template.icon.clone(),
                is_default: false,
                sort_order: Some(template.sort_order),
                created_at: None,
                updated_at: None,
            })
            .collect();

        if copies.is_empty() {
            return Ok(Vec::new());
        }

        let created = self.category_repo.insert_categories(copies).await?;
        debug!(
            "Materialized {} categories for month {}",
            created.len(),
            month_id
        );
        Ok(created)
    }

    async fn seed_default_categories(&self, user_id: &str) -> Result<Vec<Category>> {
        let mut created = Vec::with_capacity(STARTER_CATEGORIES.len());
        for (name, budget_limit, icon) in STARTER_CATEGORIES {
            let category = self
                .create_default_category(user_id, name, budget_limit, Some(icon.to_string()))
                .await?;
            created.push(category);
        }
        Ok(created)
    }
}
