use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Database model for a budget month: one row per (user, year, month)
#[derive(
    Queryable, Identifiable, AsChangeset, Selectable, PartialEq, Serialize, Deserialize, Debug, Clone,
)]
#[diesel(table_name = crate::schema::months)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct Month {
    pub id: String,
    pub user_id: String,
    pub year: i32,
    pub month: i32,
    pub revenue: String,
    pub created_at: String,
}

impl Month {
    pub fn revenue_decimal(&self) -> Decimal {
        self.revenue.parse().unwrap_or(Decimal::ZERO)
    }
}

/// Input for creating a month
#[derive(Insertable, Serialize, Deserialize, Debug, Clone)]
#[diesel(table_name = crate::schema::months)]
#[serde(rename_all = "camelCase")]
pub struct NewMonth {
    pub id: Option<String>,
    pub user_id: String,
    pub year: i32,
    pub month: i32,
    pub revenue: String,
    pub created_at: Option<String>,
}
