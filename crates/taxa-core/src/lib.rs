//! # taxa-core
//!
//! Core types, traits, and tree algorithms for the taxa taxonomy library.
//!
//! This crate defines the domain model (categories, subject associations,
//! tree annotations), the repository traits implemented by `taxa-db`, and
//! the pure in-process tree traversal used for depth/path annotation.

pub mod error;
pub mod logging;
pub mod models;
pub mod slug;
pub mod tree;
pub mod traits;
pub mod uuid_utils;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use models::{
    Category, CategoryAssociation, CreateCategoryRequest, LocalizedText, SubjectRef,
    TreeAnnotation,
};
pub use slug::{slugify, validate_slug};
pub use traits::{
    AssociationRepository, CategoryRepository, LocalizationProvider, TreeQueryRepository,
};
pub use tree::TreeIndex;
pub use uuid_utils::new_v7;
