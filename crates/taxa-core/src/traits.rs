//! Repository trait definitions.
//!
//! These traits are the seams between the domain layer and `taxa-db`'s
//! PostgreSQL implementations. Hosts that want an alternative backend
//! implement these against their own store.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{
    Category, CategoryAssociation, CreateCategoryRequest, LocalizedText, SubjectRef,
    TreeAnnotation,
};

/// Repository for category nodes and their parent links.
///
/// Owns the `category` relation exclusively; every mutating operation
/// executes inside one transaction so a concurrent reader never observes
/// a half-applied create, move, or cascade delete.
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// Create a category, deriving the slug from the request's display
    /// name when no explicit slug is given.
    ///
    /// Fails with `Validation` on a duplicate slug or an unknown parent.
    async fn create(&self, req: CreateCategoryRequest) -> Result<Category>;

    /// Fetch a category by id. Fails with `CategoryNotFound` when absent.
    async fn get(&self, id: Uuid) -> Result<Category>;

    /// Fetch a category by its slug. Fails with `NotFound` when absent.
    async fn get_by_slug(&self, slug: &str) -> Result<Category>;

    /// Reassign a category's parent (None = promote to root).
    ///
    /// Fails with `Cycle` when the new parent is the category itself or
    /// any of its descendants; the cycle check and the parent update are
    /// read-then-write atomic within one transaction.
    async fn move_category(&self, id: Uuid, new_parent_id: Option<Uuid>) -> Result<Category>;

    /// Delete a category together with all its descendants and every
    /// association referencing any deleted id, in one transaction.
    async fn delete(&self, id: Uuid) -> Result<()>;

    /// Check whether a category exists.
    async fn exists(&self, id: Uuid) -> Result<bool>;
}

/// Pure read queries over the category tree.
#[async_trait]
pub trait TreeQueryRepository: Send + Sync {
    /// All categories with no parent, ascending id order.
    async fn roots(&self) -> Result<Vec<Category>>;

    /// All categories no other category references as parent.
    ///
    /// An empty tree yields an empty vec, not an error.
    async fn leaves(&self) -> Result<Vec<Category>>;

    /// Direct children only, ascending id order.
    ///
    /// Fails with `CategoryNotFound` for an unknown id; a childless
    /// category yields an empty vec.
    async fn children(&self, id: Uuid) -> Result<Vec<Category>>;

    /// Full transitive closure below a category, breadth-first order,
    /// the category itself excluded.
    ///
    /// Fails with `CategoryNotFound` for an unknown id.
    async fn descendants(&self, id: Uuid) -> Result<Vec<Category>>;

    /// Chain of ancestors root-first, the category itself excluded.
    ///
    /// Fails with `CategoryNotFound` for an unknown id.
    async fn ancestors(&self, id: Uuid) -> Result<Vec<Category>>;

    /// Annotate an arbitrary set of categories with depth and root-first
    /// ancestor path, using a single traversal of the whole tree
    /// regardless of input size. Input order is preserved; categories
    /// missing from the current tree snapshot are skipped.
    async fn with_tree_fields(
        &self,
        categories: Vec<Category>,
    ) -> Result<Vec<(Category, TreeAnnotation)>>;
}

/// Repository for subject-category association rows.
///
/// Owns the `category_association` relation exclusively; it never
/// mutates category rows.
#[async_trait]
pub trait AssociationRepository: Send + Sync {
    /// Atomically replace a subject's entire association set.
    ///
    /// Deletes all existing rows for the subject and inserts one row per
    /// entry with `order` equal to its position, as a single batch inside
    /// one transaction. Fails with `Validation` on duplicate ids in the
    /// list or ids that do not resolve to an existing category; any
    /// failure leaves the prior set intact.
    ///
    /// This is a bulk, hook-free operation: callers needing notification
    /// or audit invoke it once per call, not once per row.
    async fn replace_subject_categories(
        &self,
        subject: &SubjectRef,
        ordered_category_ids: &[Uuid],
    ) -> Result<()>;

    /// Categories for a subject in ascending `order`.
    async fn categories_for_subject(&self, subject: &SubjectRef) -> Result<Vec<Category>>;

    /// Raw association rows for a subject in ascending `order`.
    async fn associations_for_subject(
        &self,
        subject: &SubjectRef,
    ) -> Result<Vec<CategoryAssociation>>;

    /// Subject ids of one type attached to a category.
    async fn subjects_for_category(
        &self,
        category_id: Uuid,
        subject_type: &str,
    ) -> Result<Vec<i64>>;

    /// Remove every association referencing a category. Idempotent;
    /// returns the number of rows removed.
    async fn delete_for_category(&self, category_id: Uuid) -> Result<u64>;

    /// Remove every association of a subject. Idempotent; returns the
    /// number of rows removed.
    async fn delete_for_subject(&self, subject: &SubjectRef) -> Result<u64>;
}

/// Localized display text resolution, consumed from the host.
///
/// The core stores no text; callers compose this with category results
/// when building user-facing output. Implementations may fall back to a
/// default locale when the exact locale is absent.
#[async_trait]
pub trait LocalizationProvider: Send + Sync {
    async fn resolve(&self, category_id: Uuid, locale: &str) -> Result<LocalizedText>;
}
