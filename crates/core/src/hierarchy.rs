//! Folder hierarchy reconstruction.
//!
//! The content service returns a flat batch of items, each naming its parent by stable id. This
//! module turns one batch into a forest of owned [`FolderNode`]s and answers lookups against it.
//!
//! Everything here is a pure function of its arguments. Each request builds a fresh forest from a
//! fresh batch and drops it after the response is written.
//!
//! ## Identifier policy
//!
//! Malformed identifiers are not rejected:
//! - A version tag without a comma yields the whole (unquoted) tag as the id.
//! - An empty or missing tag yields the empty id, which is an ordinary key and can collide.
//! - When two items share an id the later item replaces the earlier one. The replacement keeps
//!   the position of the first insertion, so output order follows first appearance.
//!
//! Collisions are logged at `warn` level.
//!
//! A batch whose parent links form a cycle would otherwise leave those items unreachable from
//! any root. One node per cycle is promoted to a root so every indexed item is still emitted
//! exactly once.

use crate::item::{ContentKind, RemoteItem};
use crate::{CoreError, CoreResult};
use docbridge_types::{EntityId, SequenceId};
use indexmap::IndexMap;
use serde::Serialize;

/// A node in a reconstructed folder forest.
///
/// Nodes own their children and borrow the item they were built from, so a forest cannot
/// outlive its batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FolderNode<'a> {
    pub name: Option<String>,
    #[serde(rename = "serverID")]
    pub id: EntityId,
    #[serde(rename = "parentID")]
    pub parent_id: Option<EntityId>,
    pub children: Vec<FolderNode<'a>>,
    #[serde(rename = "rawItem")]
    pub raw: &'a RemoteItem,
}

impl<'a> FolderNode<'a> {
    fn new(id: EntityId, raw: &'a RemoteItem) -> Self {
        Self {
            name: raw.display_name().map(str::to_string),
            id,
            parent_id: raw.parent_entity_id().cloned(),
            children: Vec::new(),
            raw,
        }
    }

    /// List-item id of the originating item, used to reach the drive addressing scheme.
    pub fn sequence_id(&self) -> Option<SequenceId> {
        self.raw.sequence_id()
    }
}

/// Reconstructs the folder forest for one batch.
///
/// Roots are nodes with no parent id or whose parent id is not in the batch. Roots and each
/// node's children are ordered by first appearance of their id in `items`.
pub fn build_hierarchy(items: &[RemoteItem]) -> Vec<FolderNode<'_>> {
    let mut index: IndexMap<EntityId, &RemoteItem> = IndexMap::with_capacity(items.len());
    for item in items {
        let id = item.entity_id();
        if let Some(previous) = index.insert(id.clone(), item) {
            tracing::warn!(
                id = %id,
                replaced = ?previous.display_name(),
                replacement = ?item.display_name(),
                "duplicate entity id in batch, later item wins"
            );
        }
    }

    let mut parent_of: Vec<Option<usize>> = index
        .values()
        .map(|item| {
            item.parent_entity_id()
                .and_then(|parent| index.get_index_of(parent))
        })
        .collect();
    break_parent_cycles(&mut parent_of, &index);

    let mut children_of: Vec<Vec<usize>> = vec![Vec::new(); parent_of.len()];
    let mut roots = Vec::new();
    for (position, parent) in parent_of.iter().enumerate() {
        match parent {
            Some(parent) => children_of[*parent].push(position),
            None => roots.push(position),
        }
    }

    // Parents precede their descendants in `order`; walking it backwards assembles every
    // subtree before the node that owns it.
    let mut order = Vec::with_capacity(parent_of.len());
    let mut stack: Vec<usize> = roots.iter().rev().copied().collect();
    while let Some(position) = stack.pop() {
        order.push(position);
        stack.extend(children_of[position].iter().rev().copied());
    }

    let mut slots: Vec<Option<FolderNode<'_>>> = index
        .iter()
        .map(|(id, item)| Some(FolderNode::new(id.clone(), *item)))
        .collect();

    for &position in order.iter().rev() {
        let children: Vec<FolderNode<'_>> = children_of[position]
            .iter()
            .filter_map(|child| slots[*child].take())
            .collect();
        if let Some(node) = slots[position].as_mut() {
            node.children = children;
        }
    }

    roots
        .iter()
        .filter_map(|root| slots[*root].take())
        .collect()
}

/// Detaches one node of every parent cycle so it becomes a root.
fn break_parent_cycles(parent_of: &mut [Option<usize>], index: &IndexMap<EntityId, &RemoteItem>) {
    const UNVISITED: u8 = 0;
    const ON_PATH: u8 = 1;
    const DONE: u8 = 2;

    let mut state = vec![UNVISITED; parent_of.len()];
    let mut path = Vec::new();

    for start in 0..parent_of.len() {
        if state[start] != UNVISITED {
            continue;
        }

        let mut current = start;
        loop {
            match state[current] {
                DONE => break,
                ON_PATH => {
                    if let Some((id, _)) = index.get_index(current) {
                        tracing::warn!(id = %id, "parent cycle in batch, treating item as a root");
                    }
                    parent_of[current] = None;
                    break;
                }
                _ => {}
            }
            state[current] = ON_PATH;
            path.push(current);
            match parent_of[current] {
                Some(parent) => current = parent,
                None => break,
            }
        }

        for visited in path.drain(..) {
            state[visited] = DONE;
        }
    }
}

/// Depth-first, pre-order search for `target` across the forest.
///
/// Returns a borrow of the node inside the forest (children attached), or `None` when no node
/// has that id. A found node with no children is still `Some`.
pub fn find_by_id<'f, 'a>(
    forest: &'f [FolderNode<'a>],
    target: &EntityId,
) -> Option<&'f FolderNode<'a>> {
    for node in forest {
        if &node.id == target {
            return Some(node);
        }
        if let Some(found) = find_by_id(&node.children, target) {
            return Some(found);
        }
    }
    None
}

/// One direct child returned by [`immediate_children_of`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChildEntry {
    pub name: Option<String>,
    pub id: EntityId,
}

/// A single level of the hierarchy around one item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChildListing {
    pub name: Option<String>,
    pub parent_id: Option<EntityId>,
    /// Display name of the parent, when the parent is part of the batch.
    pub parent_name: Option<String>,
    pub children: Vec<ChildEntry>,
}

/// Lists the direct children of `target` without building the forest.
///
/// When ids repeat in the batch, `target` and its parent resolve to the last item carrying
/// the id, matching the node [`build_hierarchy`] keeps. Children are items declaring `target` as their parent and, when `kind_filter` is given,
/// having that content kind. They are sorted by name, case-insensitively, with unnamed items
/// first.
///
/// # Errors
///
/// Returns `CoreError::NotFound` if no item in the batch has the id `target`.
pub fn immediate_children_of(
    items: &[RemoteItem],
    target: &EntityId,
    kind_filter: Option<&ContentKind>,
) -> CoreResult<ChildListing> {
    let item = last_with_id(items, target)
        .ok_or_else(|| CoreError::NotFound(format!("no item with id '{target}'")))?;

    let parent_id = item.parent_entity_id().cloned();
    let parent_name = parent_id.as_ref().and_then(|parent_id| {
        last_with_id(items, parent_id)
            .and_then(|parent| parent.display_name())
            .map(str::to_string)
    });

    let mut children: Vec<ChildEntry> = items
        .iter()
        .filter(|candidate| candidate.parent_entity_id() == Some(target))
        .filter(|candidate| match kind_filter {
            Some(kind) => candidate.content_kind().as_ref() == Some(kind),
            None => true,
        })
        .map(|child| ChildEntry {
            name: child.display_name().map(str::to_string),
            id: child.entity_id(),
        })
        .collect();
    children.sort_by_cached_key(|child| child.name.as_deref().unwrap_or_default().to_lowercase());

    Ok(ChildListing {
        name: item.display_name().map(str::to_string),
        parent_id,
        parent_name,
        children,
    })
}

/// Last item carrying `id`, the one that wins when ids repeat.
pub fn last_with_id<'a>(items: &'a [RemoteItem], id: &EntityId) -> Option<&'a RemoteItem> {
    items.iter().rev().find(|item| &item.entity_id() == id)
}
