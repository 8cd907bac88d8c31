//! Integration test for cascade delete across the category and
//! association stores: deleting a category removes its whole subtree and
//! every association referencing any removed node, atomically.

use taxa_db::test_fixtures::TestDatabase;
use taxa_db::{
    AssociationRepository, CategoryRepository, CreateCategoryRequest, Error, SubjectRef,
    TreeQueryRepository,
};

#[tokio::test]
async fn test_cascade_delete_removes_subtree_and_associations() {
    let test_db = TestDatabase::new().await;
    let db = &test_db.db;

    // a -> b -> c, with a subject attached to the deepest node.
    let a = db
        .categories
        .create(CreateCategoryRequest {
            parent_id: None,
            slug: Some("casc-a".to_string()),
            name: None,
        })
        .await
        .unwrap();
    let b = db
        .categories
        .create(CreateCategoryRequest {
            parent_id: Some(a.id),
            slug: Some("casc-b".to_string()),
            name: None,
        })
        .await
        .unwrap();
    let c = db
        .categories
        .create(CreateCategoryRequest {
            parent_id: Some(b.id),
            slug: Some("casc-c".to_string()),
            name: None,
        })
        .await
        .unwrap();

    let s = SubjectRef::new("article", 99).unwrap();
    db.associations
        .replace_subject_categories(&s, &[c.id])
        .await
        .unwrap();

    // Preview the impact the way a dry-run caller would.
    let doomed = db.tree.descendants(a.id).await.unwrap();
    assert_eq!(doomed.len(), 2);

    db.categories.delete(a.id).await.expect("cascade delete");

    for gone in [a.id, b.id, c.id] {
        assert!(matches!(
            db.categories.get(gone).await,
            Err(Error::CategoryNotFound(_))
        ));
    }

    // The subject's association set is empty, not dangling.
    assert!(db
        .associations
        .categories_for_subject(&s)
        .await
        .unwrap()
        .is_empty());
    assert!(db
        .associations
        .associations_for_subject(&s)
        .await
        .unwrap()
        .is_empty());

    test_db.cleanup().await;
}

#[tokio::test]
async fn test_cascade_delete_spares_unrelated_associations() {
    let test_db = TestDatabase::new().await;
    let db = &test_db.db;

    let doomed = db
        .categories
        .create(CreateCategoryRequest {
            parent_id: None,
            slug: Some("sp-doomed".to_string()),
            name: None,
        })
        .await
        .unwrap();
    let survivor = db
        .categories
        .create(CreateCategoryRequest {
            parent_id: None,
            slug: Some("sp-survivor".to_string()),
            name: None,
        })
        .await
        .unwrap();

    let s = SubjectRef::new("article", 7).unwrap();
    db.associations
        .replace_subject_categories(&s, &[doomed.id, survivor.id])
        .await
        .unwrap();

    db.categories.delete(doomed.id).await.unwrap();

    let remaining = db.associations.categories_for_subject(&s).await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, survivor.id);

    test_db.cleanup().await;
}
