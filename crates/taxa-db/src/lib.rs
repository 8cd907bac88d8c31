//! # taxa-db
//!
//! PostgreSQL persistence layer for the taxa taxonomy library.
//!
//! This crate provides:
//! - Connection pool management
//! - Repository implementations for categories, tree queries, and
//!   subject associations
//! - Schema-isolated test fixtures for integration tests
//!
//! ## Example
//!
//! ```rust,ignore
//! use taxa_db::{Database, CreateCategoryRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("postgres://localhost/taxa").await?;
//!
//!     let rust = db.categories.create(CreateCategoryRequest {
//!         parent_id: None,
//!         slug: None,
//!         name: Some("Rust".to_string()),
//!     }).await?;
//!
//!     println!("Created category: {} ({})", rust.slug, rust.id);
//!     Ok(())
//! }
//! ```

pub mod associations;
pub mod categories;
pub mod pool;
pub mod tree;


// Test fixtures for integration tests
// Note: Always compiled so integration tests (in tests/) can use DEFAULT_TEST_DATABASE_URL
pub mod test_fixtures;

// Re-export core types
pub use taxa_core::*;

// Re-export repository implementations
pub use associations::PgAssociationRepository;
pub use categories::PgCategoryRepository;
pub use pool::{create_pool, create_pool_with_config, log_pool_metrics, PoolConfig};
pub use tree::PgTreeQuery;

/// Map a database error to the taxonomy error taxonomy.
///
/// Unique and foreign-key violations are caller mistakes (duplicate slug
/// or association, unknown category id) and surface as `Validation`;
/// serialization failures and deadlocks surface as `Conflict` so callers
/// can decide whether to retry. Everything else stays `Database`.
pub(crate) fn map_db_err(e: sqlx::Error) -> Error {
    if let sqlx::Error::Database(ref db_err) = e {
        if let Some(code) = db_err.code() {
            match code.as_ref() {
                // unique_violation, foreign_key_violation
                "23505" | "23503" => return Error::Validation(db_err.message().to_string()),
                // serialization_failure, deadlock_detected
                "40001" | "40P01" => return Error::Conflict(db_err.message().to_string()),
                _ => {}
            }
        }
    }
    Error::Database(e)
}

/// Combined database context with all repositories.
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::PgPool,
    /// Category repository owning nodes and parent links.
    pub categories: PgCategoryRepository,
    /// Tree query engine for root/leaf/descendant/annotation reads.
    pub tree: PgTreeQuery,
    /// Association repository owning subject-category edges.
    pub associations: PgAssociationRepository,
}

impl Database {
    /// Create a new Database instance from a connection pool.
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self {
            categories: PgCategoryRepository::new(pool.clone()),
            tree: PgTreeQuery::new(pool.clone()),
            associations: PgAssociationRepository::new(pool.clone()),
            pool,
        }
    }

    /// Create a new Database instance by connecting to the given URL.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = create_pool(url).await?;
        Ok(Self::new(pool))
    }

    /// Create with custom pool configuration.
    pub async fn connect_with_config(url: &str, config: PoolConfig) -> Result<Self> {
        let pool = create_pool_with_config(url, config).await?;
        Ok(Self::new(pool))
    }

    /// Run pending migrations.
    #[cfg(feature = "migrations")]
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Database(sqlx::Error::Migrate(Box::new(e))))?;
        Ok(())
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &sqlx::PgPool {
        &self.pool
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self::new(self.pool.clone())
    }
}

#[cfg(test)]
mod map_db_err_tests {
    use super::*;

    #[test]
    fn test_non_database_errors_stay_wrapped() {
        let err = map_db_err(sqlx::Error::RowNotFound);
        assert!(matches!(err, Error::Database(_)));
    }
}
