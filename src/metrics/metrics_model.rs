use crate::categories::Category;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// How far into its budget a category is
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProgressClass {
    Ok,
    Warn,
    Over,
}

/// Category enriched with its spending rollup. Derived on every read, never
/// persisted.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CategoryWithExpenses {
    #[serde(flatten)]
    pub category: Category,
    pub spent: Decimal,
    pub percentage: i32,
}

impl CategoryWithExpenses {
    pub fn progress_class(&self) -> ProgressClass {
        super::budget_calculator::progress_class(self.percentage)
    }
}

/// Snapshot of a month: revenue, total spending, and the remaining balance
/// (which may be negative)
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MonthSummary {
    pub revenue: Decimal,
    pub total_expenses: Decimal,
    pub balance: Decimal,
    pub categories: Vec<CategoryWithExpenses>,
}
