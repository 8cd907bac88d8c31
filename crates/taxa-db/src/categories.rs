//! Category repository implementation.

use std::time::Instant;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, Row, Transaction};
use tracing::{debug, info};
use uuid::Uuid;

use taxa_core::{
    new_v7, slugify, validate_slug, Category, CategoryRepository, CreateCategoryRequest, Error,
    Result,
};

use crate::map_db_err;

/// Column list shared by every query that materializes a [`Category`].
pub(crate) const CATEGORY_COLUMNS: &str = "id, parent_id, slug, created_at_utc, updated_at_utc";

pub(crate) fn row_to_category(row: &PgRow) -> Category {
    Category {
        id: row.get("id"),
        parent_id: row.get("parent_id"),
        slug: row.get("slug"),
        created_at_utc: row.get("created_at_utc"),
        updated_at_utc: row.get("updated_at_utc"),
    }
}

pub(crate) async fn category_exists(pool: &PgPool, id: Uuid) -> Result<bool> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM category WHERE id = $1)")
        .bind(id)
        .fetch_one(pool)
        .await
        .map_err(map_db_err)?;
    Ok(exists)
}

/// PostgreSQL implementation of CategoryRepository.
pub struct PgCategoryRepository {
    pool: PgPool,
}

impl PgCategoryRepository {
    /// Create a new PgCategoryRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Ids of the subtree rooted at `id` (the node included), collected
    /// with one recursive query inside the caller's transaction.
    async fn subtree_ids_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
    ) -> Result<Vec<Uuid>> {
        let ids: Vec<Uuid> = sqlx::query_scalar(
            r#"
            WITH RECURSIVE subtree AS (
                SELECT id FROM category WHERE id = $1
                UNION ALL
                SELECT c.id FROM category c
                JOIN subtree s ON c.parent_id = s.id
            )
            SELECT id FROM subtree
            "#,
        )
        .bind(id)
        .fetch_all(&mut **tx)
        .await
        .map_err(map_db_err)?;
        Ok(ids)
    }
}

#[async_trait]
impl CategoryRepository for PgCategoryRepository {
    async fn create(&self, req: CreateCategoryRequest) -> Result<Category> {
        let slug = match (req.slug, req.name.as_deref()) {
            (Some(slug), _) => slug,
            (None, Some(name)) => slugify(name),
            (None, None) => {
                return Err(Error::Validation(
                    "either slug or name must be provided".to_string(),
                ))
            }
        };
        validate_slug(&slug).map_err(Error::Validation)?;

        let id = new_v7();
        let now = Utc::now();

        let mut tx = self.pool.begin().await.map_err(map_db_err)?;

        if let Some(parent_id) = req.parent_id {
            let parent_exists: bool =
                sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM category WHERE id = $1)")
                    .bind(parent_id)
                    .fetch_one(&mut *tx)
                    .await
                    .map_err(map_db_err)?;
            if !parent_exists {
                return Err(Error::Validation(format!(
                    "parent category {} does not exist",
                    parent_id
                )));
            }
        }

        // Unique-violation on the slug surfaces as Validation via map_db_err.
        sqlx::query(
            "INSERT INTO category (id, parent_id, slug, created_at_utc, updated_at_utc)
             VALUES ($1, $2, $3, $4, $4)",
        )
        .bind(id)
        .bind(req.parent_id)
        .bind(&slug)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(|e| match map_db_err(e) {
            Error::Validation(_) => Error::Validation(format!("slug '{}' already exists", slug)),
            other => other,
        })?;

        tx.commit().await.map_err(map_db_err)?;

        info!(
            subsystem = "database",
            component = "categories",
            op = "create",
            category_id = %id,
            slug = %slug,
            "Category created"
        );

        Ok(Category {
            id,
            parent_id: req.parent_id,
            slug,
            created_at_utc: now,
            updated_at_utc: now,
        })
    }

    async fn get(&self, id: Uuid) -> Result<Category> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM category WHERE id = $1",
            CATEGORY_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_err)?;

        row.map(|r| row_to_category(&r))
            .ok_or(Error::CategoryNotFound(id))
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Category> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM category WHERE slug = $1",
            CATEGORY_COLUMNS
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_err)?;

        row.map(|r| row_to_category(&r))
            .ok_or_else(|| Error::NotFound(format!("category with slug '{}'", slug)))
    }

    async fn move_category(&self, id: Uuid, new_parent_id: Option<Uuid>) -> Result<Category> {
        let mut tx = self.pool.begin().await.map_err(map_db_err)?;

        // Serialize all tree-shape writers. Per-row locks are not enough:
        // two moves touching disjoint rows can each pass the cycle check
        // on the pre-move snapshot and commit an indirect cycle. The
        // advisory lock is released with the transaction.
        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended('category_tree', 0))")
            .execute(&mut *tx)
            .await
            .map_err(map_db_err)?;

        // Lock the moved row; the cycle check below reads inside this
        // transaction and therefore sees every committed move.
        let current = sqlx::query(&format!(
            "SELECT {} FROM category WHERE id = $1 FOR UPDATE",
            CATEGORY_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_db_err)?
        .ok_or(Error::CategoryNotFound(id))?;

        if let Some(parent_id) = new_parent_id {
            if parent_id == id {
                return Err(Error::Cycle(format!(
                    "category {} cannot be its own parent",
                    id
                )));
            }

            let parent_exists: bool =
                sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM category WHERE id = $1)")
                    .bind(parent_id)
                    .fetch_one(&mut *tx)
                    .await
                    .map_err(map_db_err)?;
            if !parent_exists {
                return Err(Error::CategoryNotFound(parent_id));
            }

            let in_subtree: bool = sqlx::query_scalar(
                r#"
                WITH RECURSIVE subtree AS (
                    SELECT id FROM category WHERE parent_id = $1
                    UNION ALL
                    SELECT c.id FROM category c
                    JOIN subtree s ON c.parent_id = s.id
                )
                SELECT EXISTS(SELECT 1 FROM subtree WHERE id = $2)
                "#,
            )
            .bind(id)
            .bind(parent_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(map_db_err)?;

            if in_subtree {
                return Err(Error::Cycle(format!(
                    "cannot move category {} under its own descendant {}",
                    id, parent_id
                )));
            }
        }

        let now = Utc::now();
        sqlx::query("UPDATE category SET parent_id = $1, updated_at_utc = $2 WHERE id = $3")
            .bind(new_parent_id)
            .bind(now)
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(map_db_err)?;

        tx.commit().await.map_err(map_db_err)?;

        info!(
            subsystem = "database",
            component = "categories",
            op = "move",
            category_id = %id,
            "Category moved"
        );

        Ok(Category {
            parent_id: new_parent_id,
            updated_at_utc: now,
            ..row_to_category(&current)
        })
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let start = Instant::now();
        let mut tx = self.pool.begin().await.map_err(map_db_err)?;

        let locked: Option<Uuid> =
            sqlx::query_scalar("SELECT id FROM category WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(map_db_err)?;
        if locked.is_none() {
            return Err(Error::CategoryNotFound(id));
        }

        let subtree = self.subtree_ids_tx(&mut tx, id).await?;

        sqlx::query("DELETE FROM category_association WHERE category_id = ANY($1)")
            .bind(&subtree)
            .execute(&mut *tx)
            .await
            .map_err(map_db_err)?;

        sqlx::query("DELETE FROM category WHERE id = ANY($1)")
            .bind(&subtree)
            .execute(&mut *tx)
            .await
            .map_err(map_db_err)?;

        tx.commit().await.map_err(map_db_err)?;

        info!(
            subsystem = "database",
            component = "categories",
            op = "cascade_delete",
            category_id = %id,
            cascade_count = subtree.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Category deleted with descendants and associations"
        );
        Ok(())
    }

    async fn exists(&self, id: Uuid) -> Result<bool> {
        let exists = category_exists(&self.pool, id).await?;
        debug!(
            subsystem = "database",
            component = "categories",
            op = "exists",
            category_id = %id,
            success = exists,
            "Existence check"
        );
        Ok(exists)
    }
}
