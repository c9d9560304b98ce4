use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Database model for categories. A row with `month_id = NULL` and
/// `is_default = true` is a per-user template; a row with `month_id` set is a
/// copy bound to one month, free to diverge from the template afterwards.
#[derive(
    Queryable, Identifiable, AsChangeset, Selectable, PartialEq, Serialize, Deserialize, Debug, Clone,
)]
#[diesel(table_name = crate::schema::categories)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub user_id: String,
    pub month_id: Option<String>,
    pub name: String,
    pub budget_limit: String,
    pub icon: Option<String>,
    pub is_default: bool,
    pub sort_order: i32,
    pub created_at: String,
    pub updated_at: String,
}

impl Category {
    pub fn budget_limit_decimal(&self) -> Decimal {
        self.budget_limit.parse().unwrap_or(Decimal::ZERO)
    }

    pub fn is_month_bound(&self) -> bool {
        self.month_id.is_some()
    }
}

/// Model for creating a new category. A `None` sort order means "next slot in
/// the target scope", resolved inside the writer transaction.
#[derive(Insertable, Serialize, Deserialize, Debug, Clone)]
#[diesel(table_name = crate::schema::categories)]
#[serde(rename_all = "camelCase")]
pub struct NewCategory {
    pub id: Option<String>,
    pub user_id: String,
    pub month_id: Option<String>,
    pub name: String,
    pub budget_limit: String,
    pub icon: Option<String>,
    pub is_default: bool,
    pub sort_order: Option<i32>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

/// Changeset for updating a category
#[derive(AsChangeset, Serialize, Deserialize, Debug, Clone)]
#[diesel(table_name = crate::schema::categories)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCategory {
    pub name: Option<String>,
    pub budget_limit: Option<String>,
    pub icon: Option<String>,
    pub updated_at: String,
}

/// Partial update accepted by the service layer
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct CategoryUpdate {
    pub name: Option<String>,
    pub budget_limit: Option<Decimal>,
    pub icon: Option<String>,
}
