//! One cache table per resource type.
//!
//! Rows store the mapped record as a JSON payload next to the columns the
//! cache itself needs: the id, the parent foreign key, and the pending-delete
//! flag. Every write bumps a `watch` counter; observation streams re-run their
//! query whenever the counter moves.

use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

use chrono::Utc;
use futures::stream::BoxStream;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::{SqliteConnection, SqlitePool};
use tokio::sync::watch;

use super::StoreError;

/// A record that can live in a cache [`Table`].
pub trait CachedRecord: Clone + Serialize + DeserializeOwned + Send + Sync + Unpin + 'static {
    fn id(&self) -> &str;

    /// Foreign key of child resources (the list of a list item, ...).
    fn parent_id(&self) -> Option<&str> {
        None
    }

    fn pending_delete(&self) -> bool;

    fn set_pending_delete(&mut self, pending: bool);
}

pub struct Table<T> {
    inner: Arc<TableInner>,
    _record: PhantomData<fn() -> T>,
}

struct TableInner {
    pool: SqlitePool,
    name: &'static str,
    changes: watch::Sender<u64>,
}

impl<T> Clone for Table<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            _record: PhantomData,
        }
    }
}

#[derive(sqlx::FromRow)]
struct PayloadRow {
    payload: String,
    pending_delete: bool,
}

impl<T: CachedRecord> Table<T> {
    /// `name` must be one of the tables created by the migrations.
    pub fn new(pool: SqlitePool, name: &'static str) -> Self {
        let (changes, _) = watch::channel(0);
        Self {
            inner: Arc::new(TableInner {
                pool,
                name,
                changes,
            }),
            _record: PhantomData,
        }
    }

    pub fn name(&self) -> &'static str {
        self.inner.name
    }

    fn notify(&self) {
        self.inner.changes.send_modify(|v| *v = v.wrapping_add(1));
    }

    fn decode(row: PayloadRow) -> Result<T, StoreError> {
        let mut record: T = serde_json::from_str(&row.payload)?;
        record.set_pending_delete(row.pending_delete);
        Ok(record)
    }

    async fn write_row(
        &self,
        conn: &mut SqliteConnection,
        record: &T,
        cached_at: &str,
    ) -> Result<(), StoreError> {
        let payload = serde_json::to_string(record)?;
        let sql = format!(
            "INSERT INTO {} (id, parent_id, payload, pending_delete, cached_at) VALUES (?, ?, ?, 0, ?) \
             ON CONFLICT(id) DO UPDATE SET parent_id = excluded.parent_id, payload = excluded.payload, \
             pending_delete = 0, cached_at = excluded.cached_at",
            self.inner.name
        );
        sqlx::query(&sql)
            .bind(record.id())
            .bind(record.parent_id())
            .bind(&payload)
            .bind(cached_at)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }

    async fn pending_ids(&self, conn: &mut SqliteConnection) -> Result<Vec<String>, StoreError> {
        let sql = format!("SELECT id FROM {} WHERE pending_delete = 1", self.inner.name);
        let rows: Vec<(String,)> = sqlx::query_as(&sql).fetch_all(&mut *conn).await?;
        Ok(rows.into_iter().map(|r| r.0).collect())
    }

    async fn restore_pending(
        &self,
        conn: &mut SqliteConnection,
        ids: &[String],
    ) -> Result<(), StoreError> {
        let sql = format!(
            "UPDATE {} SET pending_delete = 1 WHERE id = ?",
            self.inner.name
        );
        for id in ids {
            sqlx::query(&sql).bind(id).execute(&mut *conn).await?;
        }
        Ok(())
    }

    /// Inserts or replaces one record. Clears its pending-delete flag.
    pub async fn upsert(&self, record: &T) -> Result<(), StoreError> {
        let mut conn = self.inner.pool.acquire().await?;
        self.write_row(&mut conn, record, &Utc::now().to_rfc3339())
            .await?;
        self.notify();
        Ok(())
    }

    pub async fn upsert_all(&self, records: &[T]) -> Result<(), StoreError> {
        let mut tx = self.inner.pool.begin().await?;
        let cached_at = Utc::now().to_rfc3339();
        for record in records {
            self.write_row(&mut tx, record, &cached_at).await?;
        }
        tx.commit().await?;
        self.notify();
        Ok(())
    }

    /// Returns whether a row was removed.
    pub async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let sql = format!("DELETE FROM {} WHERE id = ?", self.inner.name);
        let result = sqlx::query(&sql)
            .bind(id)
            .execute(&self.inner.pool)
            .await?;
        let removed = result.rows_affected() > 0;
        if removed {
            self.notify();
        }
        Ok(removed)
    }

    pub async fn delete_by_parent(&self, parent_id: &str) -> Result<u64, StoreError> {
        let sql = format!("DELETE FROM {} WHERE parent_id = ?", self.inner.name);
        let result = sqlx::query(&sql)
            .bind(parent_id)
            .execute(&self.inner.pool)
            .await?;
        if result.rows_affected() > 0 {
            self.notify();
        }
        Ok(result.rows_affected())
    }

    pub async fn clear_all(&self) -> Result<(), StoreError> {
        let sql = format!("DELETE FROM {}", self.inner.name);
        sqlx::query(&sql).execute(&self.inner.pool).await?;
        self.notify();
        Ok(())
    }

    /// Clears the table and inserts `records` in one transaction.
    ///
    /// Rows flagged pending-delete keep their flag when the new set still
    /// contains them.
    pub async fn replace_all(&self, records: &[T]) -> Result<(), StoreError> {
        let mut tx = self.inner.pool.begin().await?;
        let pending = self.pending_ids(&mut tx).await?;

        let sql = format!("DELETE FROM {}", self.inner.name);
        sqlx::query(&sql).execute(&mut *tx).await?;

        let cached_at = Utc::now().to_rfc3339();
        for record in records {
            self.write_row(&mut tx, record, &cached_at).await?;
        }
        self.restore_pending(&mut tx, &pending).await?;

        tx.commit().await?;
        self.notify();
        Ok(())
    }

    /// Replaces the children of `refreshed` parents with `records`, and drops
    /// children whose parent is not in `live`. Children of live parents that
    /// were not refreshed are left untouched. One transaction.
    pub async fn replace_scoped(
        &self,
        refreshed: &[String],
        live: &[String],
        records: &[T],
    ) -> Result<(), StoreError> {
        let mut tx = self.inner.pool.begin().await?;
        let pending = self.pending_ids(&mut tx).await?;

        let by_parent = format!("DELETE FROM {} WHERE parent_id = ?", self.inner.name);
        for parent_id in refreshed {
            sqlx::query(&by_parent)
                .bind(parent_id)
                .execute(&mut *tx)
                .await?;
        }

        let parents_sql = format!("SELECT DISTINCT parent_id FROM {}", self.inner.name);
        let cached_parents: Vec<(Option<String>,)> =
            sqlx::query_as(&parents_sql).fetch_all(&mut *tx).await?;
        for (parent_id,) in cached_parents {
            match parent_id {
                Some(parent_id) if !live.contains(&parent_id) => {
                    sqlx::query(&by_parent)
                        .bind(&parent_id)
                        .execute(&mut *tx)
                        .await?;
                }
                None => {
                    let sql = format!("DELETE FROM {} WHERE parent_id IS NULL", self.inner.name);
                    sqlx::query(&sql).execute(&mut *tx).await?;
                }
                Some(_) => {}
            }
        }

        let cached_at = Utc::now().to_rfc3339();
        for record in records {
            self.write_row(&mut tx, record, &cached_at).await?;
        }
        self.restore_pending(&mut tx, &pending).await?;

        tx.commit().await?;
        self.notify();
        Ok(())
    }

    /// Returns whether the row exists.
    pub async fn set_pending_delete(&self, id: &str, pending: bool) -> Result<bool, StoreError> {
        let sql = format!(
            "UPDATE {} SET pending_delete = ? WHERE id = ?",
            self.inner.name
        );
        let result = sqlx::query(&sql)
            .bind(pending)
            .bind(id)
            .execute(&self.inner.pool)
            .await?;
        let found = result.rows_affected() > 0;
        if found {
            self.notify();
        }
        Ok(found)
    }

    pub async fn get_all(&self) -> Result<Vec<T>, StoreError> {
        let sql = format!(
            "SELECT payload, pending_delete FROM {} ORDER BY rowid",
            self.inner.name
        );
        let rows: Vec<PayloadRow> = sqlx::query_as(&sql).fetch_all(&self.inner.pool).await?;
        rows.into_iter().map(Self::decode).collect()
    }

    pub async fn get(&self, id: &str) -> Result<Option<T>, StoreError> {
        let sql = format!(
            "SELECT payload, pending_delete FROM {} WHERE id = ?",
            self.inner.name
        );
        let row: Option<PayloadRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.inner.pool)
            .await?;
        row.map(Self::decode).transpose()
    }

    pub async fn find_by_parent(&self, parent_id: &str) -> Result<Vec<T>, StoreError> {
        let sql = format!(
            "SELECT payload, pending_delete FROM {} WHERE parent_id = ? ORDER BY rowid",
            self.inner.name
        );
        let rows: Vec<PayloadRow> = sqlx::query_as(&sql)
            .bind(parent_id)
            .fetch_all(&self.inner.pool)
            .await?;
        rows.into_iter().map(Self::decode).collect()
    }

    pub async fn pending_deletes(&self) -> Result<Vec<T>, StoreError> {
        let sql = format!(
            "SELECT payload, pending_delete FROM {} WHERE pending_delete = 1 ORDER BY rowid",
            self.inner.name
        );
        let rows: Vec<PayloadRow> = sqlx::query_as(&sql).fetch_all(&self.inner.pool).await?;
        rows.into_iter().map(Self::decode).collect()
    }

    pub async fn ids(&self) -> Result<Vec<String>, StoreError> {
        let sql = format!("SELECT id FROM {} ORDER BY rowid", self.inner.name);
        let rows: Vec<(String,)> = sqlx::query_as(&sql).fetch_all(&self.inner.pool).await?;
        Ok(rows.into_iter().map(|r| r.0).collect())
    }

    pub async fn count(&self) -> Result<i64, StoreError> {
        let sql = format!("SELECT COUNT(*) FROM {}", self.inner.name);
        let (count,): (i64,) = sqlx::query_as(&sql).fetch_one(&self.inner.pool).await?;
        Ok(count)
    }

    /// Live view of the whole table: emits the current rows, then again after
    /// every write.
    pub fn observe_all(&self) -> BoxStream<'static, Vec<T>> {
        let table = self.clone();
        self.observe_with(move || {
            let table = table.clone();
            async move { table.get_all().await }
        })
    }

    pub fn observe_one(&self, id: &str) -> BoxStream<'static, Option<T>> {
        let table = self.clone();
        let id = id.to_string();
        self.observe_with(move || {
            let table = table.clone();
            let id = id.clone();
            async move { table.get(&id).await }
        })
    }

    pub fn observe_by_parent(&self, parent_id: &str) -> BoxStream<'static, Vec<T>> {
        let table = self.clone();
        let parent_id = parent_id.to_string();
        self.observe_with(move || {
            let table = table.clone();
            let parent_id = parent_id.clone();
            async move { table.find_by_parent(&parent_id).await }
        })
    }

    fn observe_with<V, F, Fut>(&self, query: F) -> BoxStream<'static, V>
    where
        V: Send + 'static,
        F: Fn() -> Fut + Send + 'static,
        Fut: Future<Output = Result<V, StoreError>> + Send + 'static,
    {
        // Subscribe before the first query so no write between the two is missed.
        let mut changes = self.inner.changes.subscribe();
        let name = self.inner.name;
        Box::pin(async_stream::stream! {
            loop {
                match query().await {
                    Ok(value) => yield value,
                    Err(e) => tracing::warn!(table = name, error = %e, "Cache query failed"),
                }
                if changes.changed().await.is_err() {
                    break;
                }
            }
        })
    }
}
