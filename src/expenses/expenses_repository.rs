use crate::db::{get_connection, WriteHandle};
use crate::errors::{Error, Result};
use crate::expenses::expenses_model::{Expense, NewExpense, UpdateExpense};
use crate::expenses::expenses_traits::ExpenseRepositoryTrait;
use crate::schema::expenses;
use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::SqliteConnection;
use std::sync::Arc;
use uuid::Uuid;

pub struct ExpenseRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl ExpenseRepository {
    pub fn new(
        pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
        writer: WriteHandle,
    ) -> Self {
        ExpenseRepository { pool, writer }
    }
}

#[async_trait]
impl ExpenseRepositoryTrait for ExpenseRepository {
    fn list_for_month(&self, month_id: &str) -> Result<Vec<Expense>> {
        let mut conn = get_connection(&self.pool)?;
        Ok(expenses::table
            .filter(expenses::month_id.eq(month_id))
            .order((expenses::date.desc(), expenses::created_at.desc()))
            .load::<Expense>(&mut conn)?)
    }

    fn list_for_category(&self, month_id: &str, category_id: &str) -> Result<Vec<Expense>> {
        let mut conn = get_connection(&self.pool)?;
        Ok(expenses::table
            .filter(expenses::month_id.eq(month_id))
            .filter(expenses::category_id.eq(category_id))
            .order((expenses::date.desc(), expenses::created_at.desc()))
            .load::<Expense>(&mut conn)?)
    }

    fn get_expense_by_id(&self, id: &str) -> Result<Option<Expense>> {
        let mut conn = get_connection(&self.pool)?;
        Ok(expenses::table
            .find(id)
            .first::<Expense>(&mut conn)
            .optional()?)
    }

    async fn create_expense(&self, new_expense: NewExpense) -> Result<Expense> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Expense> {
                let mut expense = new_expense;
                if expense.id.is_none() {
                    expense.id = Some(Uuid::new_v4().to_string());
                }
                if expense.created_at.is_none() {
                    expense.created_at = Some(Utc::now().to_rfc3339());
                }

                Ok(diesel::insert_into(expenses::table)
                    .values(&expense)
                    .get_result::<Expense>(conn)?)
            })
            .await
    }

    async fn update_expense(&self, id: &str, update: UpdateExpense) -> Result<Expense> {
        let id_owned = id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Expense> {
                let updated = diesel::update(expenses::table.find(&id_owned))
                    .set(&update)
                    .execute(conn)?;

                if updated == 0 {
                    return Err(Error::NotFound(format!("Expense {}", id_owned)));
                }

                Ok(expenses::table.find(&id_owned).first::<Expense>(conn)?)
            })
            .await
    }

    async fn delete_expense(&self, id: &str) -> Result<usize> {
        let id_owned = id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                Ok(diesel::delete(expenses::table.find(&id_owned)).execute(conn)?)
            })
            .await
    }
}
