use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Database model for an expense. Always belongs to exactly one month and one
/// category bound to that month.
#[derive(
    Queryable, Identifiable, AsChangeset, Selectable, PartialEq, Serialize, Deserialize, Debug, Clone,
)]
#[diesel(table_name = crate::schema::expenses)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: String,
    pub month_id: String,
    pub category_id: String,
    pub amount: String,
    pub description: String,
    pub date: String,
    pub created_at: String,
}

impl Expense {
    pub fn amount_decimal(&self) -> Decimal {
        self.amount.parse().unwrap_or(Decimal::ZERO)
    }
}

/// Input for creating an expense
#[derive(Insertable, Serialize, Deserialize, Debug, Clone)]
#[diesel(table_name = crate::schema::expenses)]
#[serde(rename_all = "camelCase")]
pub struct NewExpense {
    pub id: Option<String>,
    pub month_id: String,
    pub category_id: String,
    pub amount: String,
    pub description: String,
    pub date: String,
    pub created_at: Option<String>,
}

/// Changeset for updating an expense
#[derive(AsChangeset, Serialize, Deserialize, Debug, Clone)]
#[diesel(table_name = crate::schema::expenses)]
#[serde(rename_all = "camelCase")]
pub struct UpdateExpense {
    pub category_id: Option<String>,
    pub amount: Option<String>,
    pub description: Option<String>,
    pub date: Option<String>,
}

/// Partial update accepted by the service layer
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseUpdate {
    pub category_id: Option<String>,
    pub amount: Option<Decimal>,
    pub description: Option<String>,
    pub date: Option<String>,
}
