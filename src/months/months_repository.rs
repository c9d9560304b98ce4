use crate::db::{get_connection, WriteHandle};
use crate::errors::{Error, Result, ValidationError};
use crate::months::months_model::{Month, NewMonth};
use crate::months::months_traits::MonthRepositoryTrait;
use crate::schema::months;
use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::SqliteConnection;
use std::sync::Arc;
use uuid::Uuid;

pub struct MonthRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl MonthRepository {
    pub fn new(
        pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
        writer: WriteHandle,
    ) -> Self {
        MonthRepository { pool, writer }
    }
}

#[async_trait]
impl MonthRepositoryTrait for MonthRepository {
    fn get_month(&self, user_id: &str, year: i32, month: i32) -> Result<Option<Month>> {
        let mut conn = get_connection(&self.pool)?;
        Ok(months::table
            .filter(months::user_id.eq(user_id))
            .filter(months::year.eq(year))
            .filter(months::month.eq(month))
            .first::<Month>(&mut conn)
            .optional()?)
    }

    fn get_month_by_id(&self, id: &str) -> Result<Option<Month>> {
        let mut conn = get_connection(&self.pool)?;
        Ok(months::table
            .find(id)
            .first::<Month>(&mut conn)
            .optional()?)
    }

    fn list_months(&self, user_id: &str) -> Result<Vec<Month>> {
        let mut conn = get_connection(&self.pool)?;
        Ok(months::table
            .filter(months::user_id.eq(user_id))
            .order((months::year.desc(), months::month.desc()))
            .load::<Month>(&mut conn)?)
    }

    async fn create_month(&self, new_month: NewMonth) -> Result<Month> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Month> {
                // Uniqueness of (user, year, month) is enforced here, inside
                // the writer transaction, not by the schema.
                let existing: Option<Month> = months::table
                    .filter(months::user_id.eq(&new_month.user_id))
                    .filter(months::year.eq(new_month.year))
                    .filter(months::month.eq(new_month.month))
                    .first::<Month>(conn)
                    .optional()?;

                if existing.is_some() {
                    return Err(Error::Validation(ValidationError::InvalidInput(format!(
                        "Month {}-{:02} already exists for this user",
                        new_month.year, new_month.month
                    ))));
                }

                let now = Utc::now().to_rfc3339();
                let mut month = new_month;
                if month.id.is_none() {
                    month.id = Some(Uuid::new_v4().to_string());
                }
                if month.created_at.is_none() {
                    month.created_at = Some(now);
                }

                Ok(diesel::insert_into(months::table)
                    .values(&month)
                    .get_result::<Month>(conn)?)
            })
            .await
    }

    async fn update_revenue(&self, id: &str, revenue: String) -> Result<Month> {
        let id_owned = id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Month> {
                let updated = diesel::update(months::table.find(&id_owned))
                    .set(months::revenue.eq(&revenue))
                    .execute(conn)?;

                if updated == 0 {
                    return Err(Error::NotFound(format!("Month {}", id_owned)));
                }

                Ok(months::table.find(&id_owned).first::<Month>(conn)?)
            })
            .await
    }
}
