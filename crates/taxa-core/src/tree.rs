//! Pure in-process tree traversal over parent/child adjacency.
//!
//! [`TreeIndex`] is built once per query from `(id, parent_id)` pairs
//! fetched in a single round trip, then answers root/leaf/child/
//! descendant questions and computes depth/path annotations without
//! touching the store again. One full top-down traversal costs O(total
//! categories) regardless of how many nodes are being annotated.

use std::collections::{HashMap, HashSet, VecDeque};

use uuid::Uuid;

use crate::models::TreeAnnotation;

/// Adjacency index over a snapshot of the category tree.
#[derive(Debug, Clone, Default)]
pub struct TreeIndex {
    parent: HashMap<Uuid, Option<Uuid>>,
    children: HashMap<Uuid, Vec<Uuid>>,
    roots: Vec<Uuid>,
}

impl TreeIndex {
    /// Build an index from `(id, parent_id)` pairs.
    ///
    /// Children of each node and the root set are kept in ascending id
    /// order, which for UUIDv7 ids equals creation order.
    pub fn from_edges<I>(edges: I) -> Self
    where
        I: IntoIterator<Item = (Uuid, Option<Uuid>)>,
    {
        let mut parent: HashMap<Uuid, Option<Uuid>> = HashMap::new();
        let mut children: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
        let mut roots = Vec::new();

        for (id, parent_id) in edges {
            parent.insert(id, parent_id);
            match parent_id {
                Some(pid) => children.entry(pid).or_default().push(id),
                None => roots.push(id),
            }
        }

        roots.sort_unstable();
        for siblings in children.values_mut() {
            siblings.sort_unstable();
        }

        Self {
            parent,
            children,
            roots,
        }
    }

    /// Number of nodes in the snapshot.
    pub fn len(&self) -> usize {
        self.parent.len()
    }

    /// True when the snapshot holds no nodes.
    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }

    /// True when the id is part of the snapshot.
    pub fn contains(&self, id: Uuid) -> bool {
        self.parent.contains_key(&id)
    }

    /// Root ids in ascending order.
    pub fn roots(&self) -> &[Uuid] {
        &self.roots
    }

    /// Leaf ids in ascending order.
    ///
    /// A leaf is a node no other node references as parent; computed as
    /// a membership test against the set of parent ids actually in use.
    pub fn leaves(&self) -> Vec<Uuid> {
        let parents_in_use: HashSet<Uuid> = self
            .parent
            .values()
            .filter_map(|p| p.as_ref().copied())
            .collect();

        let mut leaves: Vec<Uuid> = self
            .parent
            .keys()
            .filter(|id| !parents_in_use.contains(id))
            .copied()
            .collect();
        leaves.sort_unstable();
        leaves
    }

    /// Direct children in ascending id order; empty for leaves and for
    /// ids outside the snapshot.
    pub fn children_of(&self, id: Uuid) -> &[Uuid] {
        self.children.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All ids below `id` in breadth-first order (level by level,
    /// ascending id within a level), `id` itself excluded.
    ///
    /// Expands until no new ids are discovered; the visited guard makes
    /// the walk terminate even on corrupt (cyclic) input.
    pub fn descendants_of(&self, id: Uuid) -> Vec<Uuid> {
        let mut out = Vec::new();
        let mut visited: HashSet<Uuid> = HashSet::new();
        visited.insert(id);

        let mut queue: VecDeque<Uuid> = self.children_of(id).iter().copied().collect();
        while let Some(current) = queue.pop_front() {
            if !visited.insert(current) {
                continue;
            }
            out.push(current);
            queue.extend(self.children_of(current).iter().copied());
        }
        out
    }

    /// Ancestor ids of `id` ordered root-first, `id` itself excluded.
    pub fn ancestors_of(&self, id: Uuid) -> Vec<Uuid> {
        let mut chain = Vec::new();
        let mut seen: HashSet<Uuid> = HashSet::new();
        seen.insert(id);

        let mut current = self.parent.get(&id).copied().flatten();
        while let Some(ancestor) = current {
            if !seen.insert(ancestor) {
                break;
            }
            chain.push(ancestor);
            current = self.parent.get(&ancestor).copied().flatten();
        }
        chain.reverse();
        chain
    }

    /// Depth and root-first path for every reachable node, computed by
    /// one breadth-first traversal seeded at all roots.
    pub fn annotations(&self) -> HashMap<Uuid, TreeAnnotation> {
        let mut out: HashMap<Uuid, TreeAnnotation> = HashMap::with_capacity(self.parent.len());
        let mut queue: VecDeque<Uuid> = self.roots.iter().copied().collect();

        for root in &self.roots {
            out.insert(
                *root,
                TreeAnnotation {
                    depth: 0,
                    path: vec![*root],
                },
            );
        }

        while let Some(current) = queue.pop_front() {
            // Clone the parent annotation once per node, not per child.
            let parent_ann = out[&current].clone();
            for child in self.children_of(current) {
                if out.contains_key(child) {
                    continue;
                }
                let mut path = parent_ann.path.clone();
                path.push(*child);
                out.insert(
                    *child,
                    TreeAnnotation {
                        depth: parent_ann.depth + 1,
                        path,
                    },
                );
                queue.push_back(*child);
            }
        }
        out
    }

    /// Annotation for a single node; None when the node is outside the
    /// snapshot or unreachable from any root.
    pub fn annotate(&self, id: Uuid) -> Option<TreeAnnotation> {
        if !self.contains(id) {
            return None;
        }
        let ancestors = self.ancestors_of(id);
        // Unreachable when the chain does not bottom out at a root.
        match ancestors.first() {
            Some(top) if self.parent.get(top) != Some(&None) => return None,
            None if self.parent.get(&id) != Some(&None) => return None,
            _ => {}
        }
        let depth = ancestors.len() as u32;
        let mut path = ancestors;
        path.push(id);
        Some(TreeAnnotation { depth, path })
    }
}
