//! Tree query engine over the category store's backing relation.
//!
//! Root, leaf, and child lookups are single filters; descendants and
//! ancestors are one recursive query each; depth/path annotation fetches
//! the whole adjacency once and delegates to the pure
//! [`TreeIndex`](taxa_core::tree::TreeIndex), so the cost is O(total
//! categories) per call no matter how many nodes are annotated.

use std::time::Instant;

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use tracing::debug;
use uuid::Uuid;

use taxa_core::{Category, Error, Result, TreeAnnotation, TreeIndex, TreeQueryRepository};

use crate::categories::{category_exists, row_to_category, CATEGORY_COLUMNS};
use crate::map_db_err;

/// PostgreSQL implementation of TreeQueryRepository.
pub struct PgTreeQuery {
    pool: PgPool,
}

impl PgTreeQuery {
    /// Create a new PgTreeQuery with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Fetch the whole `(id, parent_id)` adjacency in one round trip.
    async fn adjacency(&self) -> Result<TreeIndex> {
        let rows = sqlx::query("SELECT id, parent_id FROM category")
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_err)?;

        Ok(TreeIndex::from_edges(rows.iter().map(|r| {
            (r.get::<Uuid, _>("id"), r.get::<Option<Uuid>, _>("parent_id"))
        })))
    }

    async fn require_category(&self, id: Uuid) -> Result<()> {
        if category_exists(&self.pool, id).await? {
            Ok(())
        } else {
            Err(Error::CategoryNotFound(id))
        }
    }
}

#[async_trait]
impl TreeQueryRepository for PgTreeQuery {
    async fn roots(&self) -> Result<Vec<Category>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM category WHERE parent_id IS NULL ORDER BY id",
            CATEGORY_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_err)?;

        Ok(rows.iter().map(row_to_category).collect())
    }

    async fn leaves(&self) -> Result<Vec<Category>> {
        // Membership test against the parent ids in use, not a per-node
        // child count. An empty table yields an empty set.
        let rows = sqlx::query(&format!(
            "SELECT {} FROM category
             WHERE id NOT IN (
                 SELECT parent_id FROM category WHERE parent_id IS NOT NULL
             )
             ORDER BY id",
            CATEGORY_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_err)?;

        Ok(rows.iter().map(row_to_category).collect())
    }

    async fn children(&self, id: Uuid) -> Result<Vec<Category>> {
        self.require_category(id).await?;

        let rows = sqlx::query(&format!(
            "SELECT {} FROM category WHERE parent_id = $1 ORDER BY id",
            CATEGORY_COLUMNS
        ))
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_err)?;

        Ok(rows.iter().map(row_to_category).collect())
    }

    async fn descendants(&self, id: Uuid) -> Result<Vec<Category>> {
        let start = Instant::now();
        self.require_category(id).await?;

        // Breadth-first: level by level, ascending id within a level.
        let rows = sqlx::query(&format!(
            r#"
            WITH RECURSIVE subtree AS (
                SELECT {cols}, 1 AS level FROM category WHERE parent_id = $1
                UNION ALL
                SELECT {prefixed}, s.level + 1 FROM category c
                JOIN subtree s ON c.parent_id = s.id
            )
            SELECT {cols} FROM subtree ORDER BY level, id
            "#,
            cols = CATEGORY_COLUMNS,
            prefixed = "c.id, c.parent_id, c.slug, c.created_at_utc, c.updated_at_utc",
        ))
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_err)?;

        debug!(
            subsystem = "database",
            component = "tree_query",
            op = "descendants",
            category_id = %id,
            row_count = rows.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Descendant query complete"
        );

        Ok(rows.iter().map(row_to_category).collect())
    }

    async fn ancestors(&self, id: Uuid) -> Result<Vec<Category>> {
        self.require_category(id).await?;

        // Walk upward, then flip so the root comes first.
        let rows = sqlx::query(&format!(
            r#"
            WITH RECURSIVE chain AS (
                SELECT {prefixed}, 1 AS height FROM category c
                WHERE c.id = (SELECT parent_id FROM category WHERE id = $1)
                UNION ALL
                SELECT {prefixed}, ch.height + 1 FROM category c
                JOIN chain ch ON c.id = ch.parent_id
            )
            SELECT {cols} FROM chain ORDER BY height DESC
            "#,
            cols = CATEGORY_COLUMNS,
            prefixed = "c.id, c.parent_id, c.slug, c.created_at_utc, c.updated_at_utc",
        ))
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_err)?;

        Ok(rows.iter().map(row_to_category).collect())
    }

    async fn with_tree_fields(
        &self,
        categories: Vec<Category>,
    ) -> Result<Vec<(Category, TreeAnnotation)>> {
        let start = Instant::now();
        let index = self.adjacency().await?;
        let annotations = index.annotations();

        // Input order preserved; nodes gone from the snapshot are skipped.
        let annotated: Vec<(Category, TreeAnnotation)> = categories
            .into_iter()
            .filter_map(|category| {
                annotations
                    .get(&category.id)
                    .cloned()
                    .map(|ann| (category, ann))
            })
            .collect();

        debug!(
            subsystem = "database",
            component = "tree_query",
            op = "with_tree_fields",
            row_count = annotated.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Tree annotation complete"
        );

        Ok(annotated)
    }
}
