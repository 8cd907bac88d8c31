//! Subject-category association repository implementation.
//!
//! Associations are written wholesale: a subject's entire category set is
//! replaced in one transaction with one delete and one batched insert.
//! There is no per-row add/remove API and no per-row hooks; callers
//! needing a diff or an audit event compute it themselves, once per call.

use std::collections::HashSet;
use std::time::Instant;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Row};
use tracing::info;
use uuid::Uuid;

use taxa_core::{
    AssociationRepository, Category, CategoryAssociation, Error, Result, SubjectRef,
};

use crate::categories::row_to_category;
use crate::map_db_err;

/// PostgreSQL implementation of AssociationRepository.
pub struct PgAssociationRepository {
    pool: PgPool,
}

impl PgAssociationRepository {
    /// Create a new PgAssociationRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AssociationRepository for PgAssociationRepository {
    async fn replace_subject_categories(
        &self,
        subject: &SubjectRef,
        ordered_category_ids: &[Uuid],
    ) -> Result<()> {
        let start = Instant::now();

        let mut seen: HashSet<Uuid> = HashSet::with_capacity(ordered_category_ids.len());
        for id in ordered_category_ids {
            if !seen.insert(*id) {
                return Err(Error::Validation(format!(
                    "duplicate category {} in replace list",
                    id
                )));
            }
        }

        let mut tx = self.pool.begin().await.map_err(map_db_err)?;

        // Same-subject replaces must serialize even when the subject has
        // no rows yet; with an empty prior set the delete locks nothing
        // and two whole-set writes would otherwise merge. Keyed per
        // subject so unrelated subjects proceed in parallel.
        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
            .bind(subject.to_string())
            .execute(&mut *tx)
            .await
            .map_err(map_db_err)?;

        if !ordered_category_ids.is_empty() {
            let known: Vec<Uuid> =
                sqlx::query_scalar("SELECT id FROM category WHERE id = ANY($1)")
                    .bind(ordered_category_ids)
                    .fetch_all(&mut *tx)
                    .await
                    .map_err(map_db_err)?;

            if known.len() != ordered_category_ids.len() {
                let known: HashSet<Uuid> = known.into_iter().collect();
                if let Some(missing) = ordered_category_ids.iter().find(|id| !known.contains(id)) {
                    return Err(Error::Validation(format!(
                        "category {} does not exist",
                        missing
                    )));
                }
            }
        }

        sqlx::query("DELETE FROM category_association WHERE subject_type = $1 AND subject_id = $2")
            .bind(&subject.subject_type)
            .bind(subject.subject_id)
            .execute(&mut *tx)
            .await
            .map_err(map_db_err)?;

        if !ordered_category_ids.is_empty() {
            // One batched insert; sort_order is each entry's position.
            let orders: Vec<i32> = (0..ordered_category_ids.len() as i32).collect();
            let now = Utc::now();

            sqlx::query(
                r#"
                INSERT INTO category_association
                    (category_id, subject_type, subject_id, sort_order, created_at_utc)
                SELECT u.category_id, $3, $4, u.sort_order, $5
                FROM UNNEST($1::uuid[], $2::int4[]) AS u(category_id, sort_order)
                "#,
            )
            .bind(ordered_category_ids)
            .bind(&orders)
            .bind(&subject.subject_type)
            .bind(subject.subject_id)
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(map_db_err)?;
        }

        tx.commit().await.map_err(map_db_err)?;

        info!(
            subsystem = "database",
            component = "associations",
            op = "replace",
            subject = %subject,
            row_count = ordered_category_ids.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Subject categories replaced"
        );
        Ok(())
    }

    async fn categories_for_subject(&self, subject: &SubjectRef) -> Result<Vec<Category>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {prefixed}
            FROM category c
            JOIN category_association ca ON ca.category_id = c.id
            WHERE ca.subject_type = $1 AND ca.subject_id = $2
            ORDER BY ca.sort_order, c.id
            "#,
            prefixed = "c.id, c.parent_id, c.slug, c.created_at_utc, c.updated_at_utc",
        ))
        .bind(&subject.subject_type)
        .bind(subject.subject_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_err)?;

        Ok(rows.iter().map(row_to_category).collect())
    }

    async fn associations_for_subject(
        &self,
        subject: &SubjectRef,
    ) -> Result<Vec<CategoryAssociation>> {
        let rows = sqlx::query(
            r#"
            SELECT category_id, subject_type, subject_id, sort_order, created_at_utc
            FROM category_association
            WHERE subject_type = $1 AND subject_id = $2
            ORDER BY sort_order, category_id
            "#,
        )
        .bind(&subject.subject_type)
        .bind(subject.subject_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_err)?;

        Ok(rows
            .into_iter()
            .map(|r| CategoryAssociation {
                category_id: r.get("category_id"),
                subject_type: r.get("subject_type"),
                subject_id: r.get("subject_id"),
                order: r.get("sort_order"),
                created_at_utc: r.get("created_at_utc"),
            })
            .collect())
    }

    async fn subjects_for_category(
        &self,
        category_id: Uuid,
        subject_type: &str,
    ) -> Result<Vec<i64>> {
        let ids: Vec<i64> = sqlx::query_scalar(
            "SELECT subject_id FROM category_association
             WHERE category_id = $1 AND subject_type = $2
             ORDER BY subject_id",
        )
        .bind(category_id)
        .bind(subject_type)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_err)?;
        Ok(ids)
    }

    async fn delete_for_category(&self, category_id: Uuid) -> Result<u64> {
        let result = sqlx::query("DELETE FROM category_association WHERE category_id = $1")
            .bind(category_id)
            .execute(&self.pool)
            .await
            .map_err(map_db_err)?;
        Ok(result.rows_affected())
    }

    async fn delete_for_subject(&self, subject: &SubjectRef) -> Result<u64> {
        let result = sqlx::query(
            "DELETE FROM category_association WHERE subject_type = $1 AND subject_id = $2",
        )
        .bind(&subject.subject_type)
        .bind(subject.subject_id)
        .execute(&self.pool)
        .await
        .map_err(map_db_err)?;
        Ok(result.rows_affected())
    }
}
