use crate::categories::categories_model::{Category, NewCategory, UpdateCategory};
use crate::categories::categories_traits::CategoryRepositoryTrait;
use crate::db::{get_connection, WriteHandle};
use crate::errors::{Error, Result};
use crate::schema::categories;
use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::SqliteConnection;
use std::sync::Arc;
use uuid::Uuid;

pub struct CategoryRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl CategoryRepository {
    pub fn new(
        pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
        writer: WriteHandle,
    ) -> Self {
        CategoryRepository { pool, writer }
    }
}

fn next_category_id() -> String {
    format!(
        "cat_{}",
        &Uuid::new_v4().to_string().replace('-', "")[..12]
    )
}

/// Next sort order within the category's scope: the month it is bound to, or
/// the user's default set. Runs on the writer connection, so the count and
/// the following insert are atomic within this process.
fn next_sort_order(conn: &mut SqliteConnection, new_category: &NewCategory) -> Result<i32> {
    let count: i64 = match new_category.month_id {
        Some(ref month_id) => categories::table
            .filter(categories::month_id.eq(month_id))
            .count()
            .get_result(conn)?,
        None => categories::table
            .filter(categories::user_id.eq(&new_category.user_id))
            .filter(categories::is_default.eq(true))
            .count()
            .get_result(conn)?,
    };
    Ok(count as i32)
}

fn fill_insert_defaults(conn: &mut SqliteConnection, category: &mut NewCategory) -> Result<()> {
    let now = Utc::now().to_rfc3339();
    if category.id.is_none() {
        category.id = Some(next_category_id());
    }
    if category.sort_order.is_none() {
        category.sort_order = Some(next_sort_order(conn, category)?);
    }
    if category.created_at.is_none() {
        category.created_at = Some(now.clone());
    }
    if category.updated_at.is_none() {
        category.updated_at = Some(now);
    }
    Ok(())
}

#[async_trait]
impl CategoryRepositoryTrait for CategoryRepository {
    fn list_default_categories(&self, user_id: &str) -> Result<Vec<Category>> {
        let mut conn = get_connection(&self.pool)?;
        Ok(categories::table
            .filter(categories::user_id.eq(user_id))
            .filter(categories::is_default.eq(true))
            .filter(categories::month_id.is_null())
            .order(categories::sort_order.asc())
            .load::<Category>(&mut conn)?)
    }

    fn list_month_categories(&self, month_id: &str) -> Result<Vec<Category>> {
        let mut conn = get_connection(&self.pool)?;
        Ok(categories::table
            .filter(categories::month_id.eq(month_id))
            .order(categories::sort_order.asc())
            .load::<Category>(&mut conn)?)
    }

    fn get_category_by_id(&self, id: &str) -> Result<Option<Category>> {
        let mut conn = get_connection(&self.pool)?;
        Ok(categories::table
            .find(id)
            .first::<Category>(&mut conn)
            .optional()?)
    }

    async fn create_category(&self, new_category: NewCategory) -> Result<Category> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Category> {
                let mut category = new_category;
                fill_insert_defaults(conn, &mut category)?;

                Ok(diesel::insert_into(categories::table)
                    .values(&category)
                    .get_result::<Category>(conn)?)
            })
            .await
    }

    async fn insert_categories(&self, new_categories: Vec<NewCategory>) -> Result<Vec<Category>> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Vec<Category>> {
                let mut rows = new_categories;
                for category in rows.iter_mut() {
                    fill_insert_defaults(conn, category)?;
                }

                diesel::insert_into(categories::table)
                    .values(&rows)
                    .execute(conn)?;

                let ids: Vec<String> = rows.into_iter().filter_map(|c| c.id).collect();
                Ok(categories::table
                    .filter(categories::id.eq_any(ids))
                    .order(categories::sort_order.asc())
                    .load::<Category>(conn)?)
            })
            .await
    }

    async fn update_category(&self, id: &str, update: UpdateCategory) -> Result<Category> {
        let id_owned = id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Category> {
                let updated = diesel::update(categories::table.find(&id_owned))
                    .set(&update)
                    .execute(conn)?;

                if updated == 0 {
                    return Err(Error::NotFound(format!("Category {}", id_owned)));
                }

                Ok(categories::table
                    .find(&id_owned)
                    .first::<Category>(conn)?)
            })
            .await
    }

    async fn delete_category(&self, id: &str) -> Result<usize> {
        let id_owned = id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                // Expenses referencing the category are left in place.
                Ok(diesel::delete(categories::table.find(&id_owned)).execute(conn)?)
            })
            .await
    }
}
