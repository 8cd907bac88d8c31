//! Core data models for the taxa taxonomy library.
//!
//! These types are shared across all taxa crates and represent the
//! persisted and transient domain entities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};

// =============================================================================
// CATEGORY TYPES
// =============================================================================

/// A node in the category tree.
///
/// The core stores no display text; names and descriptions come from the
/// host's [`LocalizationProvider`](crate::traits::LocalizationProvider).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    /// Parent category id for the tree hierarchy (None = root)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<Uuid>,
    /// Unique URL-safe identifier, fixed at creation
    pub slug: String,
    pub created_at_utc: DateTime<Utc>,
    pub updated_at_utc: DateTime<Utc>,
}

impl Category {
    /// True if this category has no parent.
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// Request payload for creating a category.
///
/// Either `slug` or `name` must be present; when `slug` is absent it is
/// derived by slugifying `name`, mirroring the admin convention of typing
/// a display name and letting the slug follow.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateCategoryRequest {
    pub parent_id: Option<Uuid>,
    pub slug: Option<String>,
    /// Display name used only for slug derivation; never stored
    pub name: Option<String>,
}

// =============================================================================
// SUBJECT ASSOCIATION TYPES
// =============================================================================

/// Identifier pair for an external entity that carries categories.
///
/// `subject_type` is a short, globally-unique tag chosen by the host
/// application; `subject_id` is only unique within its type. The core
/// never dereferences the subject.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubjectRef {
    pub subject_type: String,
    pub subject_id: i64,
}

impl SubjectRef {
    /// Build a validated subject reference.
    ///
    /// Fails with [`Error::Validation`] on an empty type tag or a
    /// negative id.
    pub fn new(subject_type: impl Into<String>, subject_id: i64) -> Result<Self> {
        let subject_type = subject_type.into();
        if subject_type.is_empty() {
            return Err(Error::Validation(
                "subject_type cannot be empty".to_string(),
            ));
        }
        if subject_id < 0 {
            return Err(Error::Validation(format!(
                "subject_id must be non-negative, got {}",
                subject_id
            )));
        }
        Ok(Self {
            subject_type,
            subject_id,
        })
    }
}

impl std::fmt::Display for SubjectRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.subject_type, self.subject_id)
    }
}

/// One edge between a category and a subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryAssociation {
    pub category_id: Uuid,
    pub subject_type: String,
    pub subject_id: i64,
    /// Presentation order within one subject's association set; an opaque
    /// sort key, not required to be contiguous
    pub order: i32,
    pub created_at_utc: DateTime<Utc>,
}

// =============================================================================
// TRANSIENT TREE TYPES
// =============================================================================

/// Depth and ancestor path computed on demand by the tree query engine.
///
/// Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeAnnotation {
    /// Edge-distance from the nearest root ancestor (0 for roots)
    pub depth: u32,
    /// Ancestor ids from root to the node itself, node included
    pub path: Vec<Uuid>,
}

// =============================================================================
// LOCALIZATION TYPES
// =============================================================================

/// Localized display text resolved by the host's localization provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedText {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subject_ref_valid() {
        let s = SubjectRef::new("blog_post", 42).unwrap();
        assert_eq!(s.subject_type, "blog_post");
        assert_eq!(s.subject_id, 42);
        assert_eq!(s.to_string(), "blog_post:42");
    }

    #[test]
    fn test_subject_ref_zero_id_allowed() {
        assert!(SubjectRef::new("page", 0).is_ok());
    }

    #[test]
    fn test_subject_ref_empty_type_rejected() {
        let err = SubjectRef::new("", 1).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_subject_ref_negative_id_rejected() {
        let err = SubjectRef::new("page", -1).unwrap_err();
        assert!(err.to_string().contains("non-negative"));
    }

    #[test]
    fn test_category_is_root() {
        let now = chrono::Utc::now();
        let root = Category {
            id: Uuid::now_v7(),
            parent_id: None,
            slug: "root".to_string(),
            created_at_utc: now,
            updated_at_utc: now,
        };
        assert!(root.is_root());

        let child = Category {
            parent_id: Some(root.id),
            ..root.clone()
        };
        assert!(!child.is_root());
    }

    #[test]
    fn test_category_serde_round_trip() {
        let now = chrono::Utc::now();
        let cat = Category {
            id: Uuid::now_v7(),
            parent_id: Some(Uuid::now_v7()),
            slug: "programming".to_string(),
            created_at_utc: now,
            updated_at_utc: now,
        };
        let json = serde_json::to_string(&cat).unwrap();
        let back: Category = serde_json::from_str(&json).unwrap();
        assert_eq!(cat, back);
    }

    #[test]
    fn test_root_category_omits_parent_in_json() {
        let now = chrono::Utc::now();
        let cat = Category {
            id: Uuid::now_v7(),
            parent_id: None,
            slug: "root".to_string(),
            created_at_utc: now,
            updated_at_utc: now,
        };
        let json = serde_json::to_string(&cat).unwrap();
        assert!(!json.contains("parent_id"));
    }
}
