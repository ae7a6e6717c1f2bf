//! Postgres-backed inventory store.
//!
//! ## Error Mapping
//!
//! | PostgreSQL Error Code | StoreError | Scenario |
//! |----------------------|------------|----------|
//! | `23505` | `Conflict` | `product_id` already used by another record |
//! | `23514` | `Validation` | A count check constraint failed (e.g. restock past the u32 range) |
//! | `22003` | `Validation` | Numeric overflow |
//! | Any other / pool / IO | `Backend` | Infrastructure fault |
//!
//! ## Atomicity
//!
//! `create`, `delete`, `restock` and `list` are single statements. `update` is a
//! read-modify-write inside one transaction holding the row lock
//! (`SELECT ... FOR UPDATE`), so concurrent updates to one id serialize and the
//! last write wins.

use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use tracing::instrument;

use async_trait::async_trait;
use stocktrack_core::ItemId;
use stocktrack_inventory::{Condition, InventoryFilter, InventoryItem, ItemChanges, ItemFields};

use super::{InventoryStore, StoreError, StoreResult};

const COLUMNS: &str = "id, product_id, condition, quantity, restock_level, restock_amount, description";

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS inventory (
    id             BIGSERIAL PRIMARY KEY,
    product_id     BIGINT NOT NULL UNIQUE CHECK (product_id >= 0),
    condition      TEXT   NOT NULL CHECK (condition IN ('NEW', 'USED', 'OPEN_BOX')),
    quantity       BIGINT NOT NULL CHECK (quantity BETWEEN 0 AND 4294967295),
    restock_level  BIGINT NOT NULL DEFAULT 0 CHECK (restock_level BETWEEN 0 AND 4294967295),
    restock_amount BIGINT NOT NULL DEFAULT 0 CHECK (restock_amount BETWEEN 0 AND 4294967295),
    description    TEXT   NOT NULL DEFAULT ''
)
"#;

/// Inventory store backed by a single `inventory` table.
#[derive(Debug, Clone)]
pub struct PostgresInventoryStore {
    pool: PgPool,
}

impl PostgresInventoryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a pool against `database_url` and make sure the table exists.
    pub async fn connect(database_url: &str, max_connections: u32) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", None, e))?;

        let store = Self::new(pool);
        store.ensure_schema().await?;
        Ok(store)
    }

    pub async fn ensure_schema(&self) -> StoreResult<()> {
        sqlx::query(SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("ensure_schema", None, e))?;
        Ok(())
    }
}

#[async_trait]
impl InventoryStore for PostgresInventoryStore {
    #[instrument(skip(self, fields), fields(product_id = fields.product_id), err)]
    async fn create(&self, fields: ItemFields) -> StoreResult<InventoryItem> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO inventory (product_id, condition, quantity, restock_level, restock_amount, description)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(fields.product_id)
        .bind(fields.condition.as_str())
        .bind(i64::from(fields.quantity))
        .bind(i64::from(fields.restock_level))
        .bind(i64::from(fields.restock_amount))
        .bind(&fields.description)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("create", Some(fields.product_id), e))?;

        item_from_row(&row)
    }

    #[instrument(skip(self), fields(id = %id), err)]
    async fn get(&self, id: ItemId) -> StoreResult<InventoryItem> {
        let row = sqlx::query(&format!("SELECT {COLUMNS} FROM inventory WHERE id = $1"))
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get", None, e))?;

        match row {
            Some(row) => item_from_row(&row),
            None => Err(StoreError::NotFound(id)),
        }
    }

    #[instrument(skip(self, changes), fields(id = %id), err)]
    async fn update(&self, id: ItemId, changes: ItemChanges) -> StoreResult<InventoryItem> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("update", None, e))?;

        let row = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM inventory WHERE id = $1 FOR UPDATE"
        ))
        .bind(id.get())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("update", None, e))?;

        let mut item = match row {
            Some(row) => item_from_row(&row)?,
            None => return Err(StoreError::NotFound(id)),
        };
        item.apply_changes(changes);

        let row = sqlx::query(&format!(
            r#"
            UPDATE inventory
            SET product_id = $2, condition = $3, quantity = $4,
                restock_level = $5, restock_amount = $6, description = $7
            WHERE id = $1
            RETURNING {COLUMNS}
            "#
        ))
        .bind(id.get())
        .bind(item.product_id)
        .bind(item.condition.as_str())
        .bind(i64::from(item.quantity))
        .bind(i64::from(item.restock_level))
        .bind(i64::from(item.restock_amount))
        .bind(&item.description)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("update", Some(item.product_id), e))?;

        let updated = item_from_row(&row)?;
        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("update", None, e))?;
        Ok(updated)
    }

    #[instrument(skip(self), fields(id = %id), err)]
    async fn delete(&self, id: ItemId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM inventory WHERE id = $1")
            .bind(id.get())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete", None, e))?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self), err)]
    async fn list(&self, filter: &InventoryFilter) -> StoreResult<Vec<InventoryItem>> {
        // Optional predicates via NULL checks keep this a single parameterized query.
        let rows = sqlx::query(&format!(
            r#"
            SELECT {COLUMNS}
            FROM inventory
            WHERE ($1::bigint IS NULL OR product_id = $1)
              AND ($2::text IS NULL OR condition = $2)
              AND ($3::text IS NULL OR strpos(description, $3) > 0)
            ORDER BY id ASC
            "#
        ))
        .bind(filter.product_id)
        .bind(filter.condition.map(|c| c.as_str()))
        .bind(filter.description.as_deref())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list", None, e))?;

        rows.iter().map(item_from_row).collect()
    }

    #[instrument(skip(self), fields(id = %id), err)]
    async fn restock(&self, id: ItemId) -> StoreResult<InventoryItem> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE inventory
            SET quantity = CASE
                WHEN quantity <= restock_level THEN quantity + restock_amount
                ELSE quantity
            END
            WHERE id = $1
            RETURNING {COLUMNS}
            "#
        ))
        .bind(id.get())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("restock", None, e))?;

        match row {
            Some(row) => item_from_row(&row),
            None => Err(StoreError::NotFound(id)),
        }
    }

    #[instrument(skip(self), err)]
    async fn remove_all(&self) -> StoreResult<()> {
        sqlx::query("DELETE FROM inventory")
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("remove_all", None, e))?;
        Ok(())
    }
}

fn item_from_row(row: &PgRow) -> StoreResult<InventoryItem> {
    let corrupt = |e: sqlx::Error| StoreError::Backend(format!("unreadable inventory row: {e}"));

    let count = |col: &str| -> StoreResult<u32> {
        let v: i64 = row.try_get(col).map_err(corrupt)?;
        u32::try_from(v).map_err(|_| StoreError::Backend(format!("{col} out of range: {v}")))
    };

    let condition: String = row.try_get("condition").map_err(corrupt)?;
    let condition: Condition = condition
        .parse()
        .map_err(|_| StoreError::Backend(format!("unknown condition in row: {condition}")))?;

    Ok(InventoryItem {
        id: ItemId::new(row.try_get("id").map_err(corrupt)?),
        product_id: row.try_get("product_id").map_err(corrupt)?,
        condition,
        quantity: count("quantity")?,
        restock_level: count("restock_level")?,
        restock_amount: count("restock_amount")?,
        description: row.try_get("description").map_err(corrupt)?,
    })
}

fn map_sqlx_error(operation: &str, product_id: Option<i64>, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {operation}: {}", db_err.message());
            match db_err.code().as_deref() {
                Some("23505") => match product_id {
                    Some(p) => StoreError::duplicate_product(p),
                    None => StoreError::Conflict(msg),
                },
                Some("23514") | Some("22003") => StoreError::Validation(format!(
                    "Invalid Inventory: value out of range in {operation}"
                )),
                _ => StoreError::Backend(msg),
            }
        }
        sqlx::Error::PoolClosed => {
            StoreError::Backend(format!("connection pool closed in {operation}"))
        }
        _ => StoreError::Backend(format!("sqlx error in {operation}: {err}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_database_errors_name_the_operation() {
        assert_eq!(
            map_sqlx_error("delete", None, sqlx::Error::PoolClosed),
            StoreError::Backend("connection pool closed in delete".to_string())
        );
        assert!(matches!(
            map_sqlx_error("get", Some(1), sqlx::Error::RowNotFound),
            StoreError::Backend(ref m) if m.starts_with("sqlx error in get: ")
        ));
    }

    // Requires a reachable database; skipped unless TEST_DATABASE_URL is set.
    #[tokio::test]
    async fn postgres_store_contract() {
        let Ok(url) = std::env::var("TEST_DATABASE_URL") else {
            eprintln!("TEST_DATABASE_URL not set; skipping postgres store test");
            return;
        };

        let store = PostgresInventoryStore::connect(&url, 2).await.unwrap();
        store.remove_all().await.unwrap();

        let item = store
            .create(ItemFields::new(11111, Condition::New, 10).with_restock(5, 20))
            .await
            .unwrap();
        assert_eq!(store.get(item.id).await.unwrap(), item);
        assert_eq!(item.description, "");

        store
            .create(ItemFields::new(22222, Condition::Used, 1).with_description("used stock"))
            .await
            .unwrap();

        let dup = store.create(ItemFields::new(11111, Condition::Used, 1)).await;
        assert!(matches!(dup, Err(StoreError::Conflict(_))));

        let news = store
            .list(&InventoryFilter::all().condition(Condition::New))
            .await
            .unwrap();
        assert_eq!(news.len(), 1);
        assert_eq!(news[0].product_id, 11111);

        let used = store
            .list(&InventoryFilter::all().description_contains("used"))
            .await
            .unwrap();
        assert_eq!(used.len(), 1);

        assert_eq!(store.restock(item.id).await.unwrap().quantity, 10);
        store
            .update(item.id, ItemChanges::default().quantity(5))
            .await
            .unwrap();
        let restocked = store.restock(item.id).await.unwrap();
        assert_eq!(restocked.quantity, 25);
        assert_eq!(restocked.restock_level, 5);

        assert!(store.delete(item.id).await.unwrap());
        assert!(matches!(store.get(item.id).await, Err(StoreError::NotFound(_))));
        assert!(!store.delete(item.id).await.unwrap());

        store.remove_all().await.unwrap();
    }
}
