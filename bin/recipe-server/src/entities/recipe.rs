use std::future::Future;

use chrono::NaiveDateTime;
use tracing::{info, warn};

use crate::entities::SqliteStore;
use crate::entities::dao::{NewRecipe, Recipe, RecipeUpdate, TIMESTAMP_FORMAT, format_timestamp};

pub trait RecipeStore: Send + Sync + 'static {
    /// Prepare the `recipes` table.
    ///
    /// With `reset` the table is dropped, recreated and seeded with the two
    /// fixed rows. Without it the table is created only when missing, and
    /// seeded only in that case.
    fn initialize(&self, reset: bool) -> impl Future<Output = Result<(), sqlx::Error>> + Send;
    fn list_all(&self) -> impl Future<Output = Result<Vec<Recipe>, sqlx::Error>> + Send;
    fn get_by_id(&self, id: i64) -> impl Future<Output = Result<Option<Recipe>, sqlx::Error>> + Send;
    /// Returns the generated id.
    fn insert(&self, recipe: NewRecipe) -> impl Future<Output = Result<i64, sqlx::Error>> + Send;
    /// Returns the number of rows changed (0 when `id` is absent).
    fn update_by_id(&self, id: i64, update: RecipeUpdate) -> impl Future<Output = Result<u64, sqlx::Error>> + Send;
    /// Returns the number of rows removed (0 when `id` is absent).
    fn delete_by_id(&self, id: i64) -> impl Future<Output = Result<u64, sqlx::Error>> + Send;
}

// AUTOINCREMENT keeps ids monotonic: a deleted id is never handed out again.
const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS recipes (\
     id INTEGER PRIMARY KEY AUTOINCREMENT, \
     title TEXT NOT NULL, \
     making_time TEXT NOT NULL, \
     serves TEXT NOT NULL, \
     ingredients TEXT NOT NULL, \
     cost INTEGER NOT NULL, \
     created_at TEXT NOT NULL, \
     updated_at TEXT NOT NULL\
     )";

const SELECT_COLUMNS: &str =
    "SELECT id, title, making_time, serves, ingredients, cost, created_at, updated_at FROM recipes";

/// `(id, title, making_time, serves, ingredients, cost, timestamp)`
pub(crate) const SEED_RECIPES: [(i64, &str, &str, &str, &str, i64, &str); 2] = [
    (1, "チキンカレー", "45分", "4人", "玉ねぎ,肉,スパイス", 1000, "2016-01-10 12:10:12"),
    (2, "オムライス", "30分", "2人", "玉ねぎ,卵,スパイス,醤油", 700, "2016-01-11 13:10:12"),
];

type RecipeRow = (i64, String, String, String, String, i64, String, String);

/// A stored timestamp that does not match [`TIMESTAMP_FORMAT`] fails the read;
/// substituting a value would let `created_at` drift between reads.
fn parse_timestamp(raw: &str, column: &str) -> Result<NaiveDateTime, sqlx::Error> {
    NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT).map_err(|e| {
        warn!(raw = %raw, column, error = %e, "failed to parse recipe timestamp");
        sqlx::Error::Decode(format!("recipes.{column}: {e} (value {raw:?})").into())
    })
}

fn from_row(
    (id, title, making_time, serves, ingredients, cost, created_at, updated_at): RecipeRow,
) -> Result<Recipe, sqlx::Error> {
    Ok(Recipe {
        id,
        title,
        making_time,
        serves,
        ingredients,
        cost,
        created_at: parse_timestamp(&created_at, "created_at")?,
        updated_at: parse_timestamp(&updated_at, "updated_at")?,
    })
}

impl SqliteStore {
    async fn table_exists(&self) -> Result<bool, sqlx::Error> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT name FROM sqlite_master WHERE type = 'table' AND name = 'recipes'")
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.is_some())
    }

    async fn seed(&self) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        for (id, title, making_time, serves, ingredients, cost, ts) in SEED_RECIPES {
            sqlx::query(
                "INSERT INTO recipes (id, title, making_time, serves, ingredients, cost, created_at, updated_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )
            .bind(id)
            .bind(title)
            .bind(making_time)
            .bind(serves)
            .bind(ingredients)
            .bind(cost)
            .bind(ts)
            .bind(ts)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await
    }
}

impl RecipeStore for SqliteStore {
    async fn initialize(&self, reset: bool) -> Result<(), sqlx::Error> {
        if reset {
            warn!("dropping recipes table; all existing rows are discarded");
            sqlx::query("DROP TABLE IF EXISTS recipes").execute(&self.pool).await?;
        }
        let existed = self.table_exists().await?;
        sqlx::query(CREATE_TABLE).execute(&self.pool).await?;
        if !existed {
            self.seed().await?;
            info!(rows = SEED_RECIPES.len(), "recipes table created and seeded");
        } else {
            info!("keeping existing recipes table");
        }
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<Recipe>, sqlx::Error> {
        let rows: Vec<RecipeRow> = sqlx::query_as(&format!("{SELECT_COLUMNS} ORDER BY id"))
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(from_row).collect()
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Recipe>, sqlx::Error> {
        let row: Option<RecipeRow> = sqlx::query_as(&format!("{SELECT_COLUMNS} WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(from_row).transpose()
    }

    async fn insert(&self, recipe: NewRecipe) -> Result<i64, sqlx::Error> {
        let created_at = format_timestamp(&recipe.created_at);
        let updated_at = format_timestamp(&recipe.updated_at);
        let result = sqlx::query(
            "INSERT INTO recipes (title, making_time, serves, ingredients, cost, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )
        .bind(&recipe.title)
        .bind(&recipe.making_time)
        .bind(&recipe.serves)
        .bind(&recipe.ingredients)
        .bind(recipe.cost)
        .bind(&created_at)
        .bind(&updated_at)
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    async fn update_by_id(&self, id: i64, update: RecipeUpdate) -> Result<u64, sqlx::Error> {
        let updated_at = format_timestamp(&update.updated_at);
        let result = sqlx::query(
            "UPDATE recipes SET title = ?1, making_time = ?2, serves = ?3, ingredients = ?4, \
             cost = ?5, updated_at = ?6 WHERE id = ?7",
        )
        .bind(&update.title)
        .bind(&update.making_time)
        .bind(&update.serves)
        .bind(&update.ingredients)
        .bind(update.cost)
        .bind(&updated_at)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn delete_by_id(&self, id: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM recipes WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
