use std::fmt::Write as _;

use log::{debug, warn};

use crate::{
    storage::pager::Pager,
    types::{
        INTERNAL_NODE_MAX_KEYS, Key, LEAF_NODE_MAX_CELLS, PageId,
        error::DatabaseError,
        page::{InternalCell, InternalNode, LeafCell, LeafNode, Page},
        row::Row,
    },
};

/// Where a key lives, or would be inserted, inside a leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub page_id: PageId,
    pub cell_index: usize,
}

/// B+ tree keyed by row id, stored in the pages of a [`Pager`].
///
/// The root always lives at `root_page_id`. When the root splits its content
/// moves to a fresh page and the root page is rewritten as an internal node,
/// so the entry point never changes.
pub struct BPlusTree {
    pub root_page_id: PageId,
    pub pager: Pager,
    pub leaf_max_cells: usize,
    pub internal_max_keys: usize,
}

impl BPlusTree {
    pub fn new(pager: Pager, root_page_id: PageId) -> Result<Self, DatabaseError> {
        let mut tree = Self {
            root_page_id,
            pager,
            leaf_max_cells: LEAF_NODE_MAX_CELLS,
            internal_max_keys: INTERNAL_NODE_MAX_KEYS,
        };
        if tree.pager.page_count() <= root_page_id {
            let page_id = tree.pager.allocate_page()?;
            tree.write_page(page_id, &Page::Leaf(LeafNode::new(true)))?;
            debug!("Initialized empty root leaf at page {}", page_id);
        }
        Ok(tree)
    }

    /// Override node fanout. Values are clamped to what fits in a page.
    pub fn with_fanout(mut self, leaf_max_cells: usize, internal_max_keys: usize) -> Self {
        self.leaf_max_cells = leaf_max_cells.clamp(1, LEAF_NODE_MAX_CELLS);
        self.internal_max_keys = internal_max_keys.clamp(1, INTERNAL_NODE_MAX_KEYS);
        self
    }

    pub fn read_page(&mut self, page_id: PageId) -> Result<Page, DatabaseError> {
        let buffer = self.pager.get_page(page_id)?;
        Page::from_bytes(page_id, buffer)
    }

    fn write_page(&mut self, page_id: PageId, page: &Page) -> Result<(), DatabaseError> {
        let bytes = page.to_bytes(page_id)?;
        self.pager.get_page(page_id)?.copy_from_slice(&bytes);
        Ok(())
    }

    fn read_internal(&mut self, page_id: PageId) -> Result<InternalNode, DatabaseError> {
        match self.read_page(page_id)? {
            Page::Internal(node) => Ok(node),
            Page::Leaf(_) => Err(DatabaseError::CorruptedPage {
                page_id,
                reason: "Expected an internal node".to_string(),
            }),
        }
    }

    pub fn read_leaf(&mut self, page_id: PageId) -> Result<LeafNode, DatabaseError> {
        match self.read_page(page_id)? {
            Page::Leaf(node) => Ok(node),
            Page::Internal(_) => Err(DatabaseError::CorruptedPage {
                page_id,
                reason: "Expected a leaf node".to_string(),
            }),
        }
    }

    fn set_parent(&mut self, page_id: PageId, parent: PageId) -> Result<(), DatabaseError> {
        let mut page = self.read_page(page_id)?;
        page.set_parent_page_id(Some(parent));
        self.write_page(page_id, &page)
    }

    /// Descend from the root to the leaf that holds, or would hold, `key`.
    pub fn find(&mut self, key: Key) -> Result<Position, DatabaseError> {
        let mut page_id = self.root_page_id;
        loop {
            match self.read_page(page_id)? {
                Page::Leaf(leaf) => {
                    return Ok(Position {
                        page_id,
                        cell_index: leaf.search(key),
                    });
                }
                Page::Internal(node) => page_id = node.child_for(key),
            }
        }
    }

    pub fn get(&mut self, key: Key) -> Result<Option<Row>, DatabaseError> {
        let position = self.find(key)?;
        let leaf = self.read_leaf(position.page_id)?;
        match leaf.cells.get(position.cell_index) {
            Some(cell) if cell.key == key => Ok(Some(Row::from_bytes(&cell.value)?)),
            _ => Ok(None),
        }
    }

    /// Leftmost leaf, where an ascending scan starts.
    pub fn first_leaf(&mut self) -> Result<PageId, DatabaseError> {
        let mut page_id = self.root_page_id;
        loop {
            match self.read_page(page_id)? {
                Page::Leaf(_) => return Ok(page_id),
                Page::Internal(node) => {
                    page_id = node
                        .cells
                        .first()
                        .map(|cell| cell.child_page_id)
                        .unwrap_or(node.right_child_page_id);
                }
            }
        }
    }

    pub fn insert(&mut self, row: &Row) -> Result<(), DatabaseError> {
        let key = row.id;
        let position = self.find(key)?;
        let mut leaf = self.read_leaf(position.page_id)?;

        if leaf
            .cells
            .get(position.cell_index)
            .is_some_and(|cell| cell.key == key)
        {
            return Err(DatabaseError::DuplicateKey { key });
        }

        let needed = self.pages_needed(position.page_id, &leaf)?;
        if self.pager.page_count() + needed > self.pager.max_pages() {
            warn!(
                "Insert of key {} needs {} new page(s); {} of {} in use",
                key,
                needed,
                self.pager.page_count(),
                self.pager.max_pages()
            );
            return Err(DatabaseError::CapacityExceeded {
                max_pages: self.pager.max_pages(),
            });
        }

        let value = row.to_bytes()?;
        leaf.cells.insert(position.cell_index, LeafCell { key, value });

        if leaf.cells.len() <= self.leaf_max_cells {
            return self.write_page(position.page_id, &Page::Leaf(leaf));
        }
        self.split_leaf(position.page_id, leaf)
    }

    /// Pages an insert into `leaf` will allocate: one per node that splits on
    /// the way up, plus one more when the root itself splits.
    fn pages_needed(&mut self, leaf_page_id: PageId, leaf: &LeafNode) -> Result<u32, DatabaseError> {
        if leaf.cells.len() < self.leaf_max_cells {
            return Ok(0);
        }

        let mut needed = 1;
        let mut page_id = leaf_page_id;
        let mut parent = leaf.parent_page_id;
        loop {
            if page_id == self.root_page_id {
                return Ok(needed + 1);
            }
            let parent_id = parent.ok_or_else(|| DatabaseError::CorruptedPage {
                page_id,
                reason: "Non-root node without a parent".to_string(),
            })?;
            let node = self.read_internal(parent_id)?;
            if node.cells.len() < self.internal_max_keys {
                return Ok(needed);
            }
            needed += 1;
            page_id = parent_id;
            parent = node.parent_page_id;
        }
    }

    fn split_leaf(&mut self, page_id: PageId, mut leaf: LeafNode) -> Result<(), DatabaseError> {
        let right_page_id = self.pager.allocate_page()?;

        // Left keeps the lower half including any remainder.
        let split_at = leaf.cells.len() - leaf.cells.len() / 2;
        let right_cells = leaf.cells.split_off(split_at);
        let right = LeafNode {
            is_root: false,
            parent_page_id: leaf.parent_page_id,
            next_leaf_page_id: leaf.next_leaf_page_id,
            cells: right_cells,
        };
        leaf.next_leaf_page_id = Some(right_page_id);

        let separator = leaf.max_key().ok_or_else(|| DatabaseError::CorruptedPage {
            page_id,
            reason: "Leaf split produced an empty left half".to_string(),
        })?;
        debug!(
            "Split leaf {} at key {}: {} | {} cells, new page {}",
            page_id,
            separator,
            leaf.cells.len(),
            right.cells.len(),
            right_page_id
        );

        self.promote(page_id, Page::Leaf(leaf), right_page_id, Page::Leaf(right), separator)
    }

    fn split_internal(&mut self, page_id: PageId, mut node: InternalNode) -> Result<(), DatabaseError> {
        let right_page_id = self.pager.allocate_page()?;

        let mid = node.cells.len() / 2;
        let mut right_cells = node.cells.split_off(mid);
        let middle = right_cells.remove(0);
        let right = InternalNode {
            is_root: false,
            parent_page_id: node.parent_page_id,
            right_child_page_id: node.right_child_page_id,
            cells: right_cells,
        };
        node.right_child_page_id = middle.child_page_id;

        for child in right.children() {
            self.set_parent(child, right_page_id)?;
        }
        debug!(
            "Split internal {} at key {}: {} | {} keys, new page {}",
            page_id,
            middle.key,
            node.cells.len(),
            right.cells.len(),
            right_page_id
        );

        self.promote(page_id, Page::Internal(node), right_page_id, Page::Internal(right), middle.key)
    }

    /// Hook a freshly split `right` sibling into the parent of `left`.
    /// `separator` is the largest key left under `left`.
    fn promote(
        &mut self,
        left_page_id: PageId,
        left: Page,
        right_page_id: PageId,
        right: Page,
        separator: Key,
    ) -> Result<(), DatabaseError> {
        if left.is_root() {
            return self.split_root(left, right_page_id, right, separator);
        }

        let parent_id = left.parent_page_id().ok_or_else(|| DatabaseError::CorruptedPage {
            page_id: left_page_id,
            reason: "Non-root node without a parent".to_string(),
        })?;
        self.write_page(left_page_id, &left)?;
        self.write_page(right_page_id, &right)?;

        let mut parent = self.read_internal(parent_id)?;
        let index = parent
            .child_index(left_page_id)
            .ok_or_else(|| DatabaseError::CorruptedPage {
                page_id: parent_id,
                reason: format!("Page {} is not a child of its parent", left_page_id),
            })?;

        if index < parent.cells.len() {
            let upper_bound = parent.cells[index].key;
            parent.cells[index].key = separator;
            parent.cells.insert(
                index + 1,
                InternalCell {
                    child_page_id: right_page_id,
                    key: upper_bound,
                },
            );
        } else {
            parent.cells.push(InternalCell {
                child_page_id: left_page_id,
                key: separator,
            });
            parent.right_child_page_id = right_page_id;
        }

        if parent.cells.len() <= self.internal_max_keys {
            return self.write_page(parent_id, &Page::Internal(parent));
        }
        self.split_internal(parent_id, parent)
    }

    fn split_root(
        &mut self,
        mut left: Page,
        right_page_id: PageId,
        mut right: Page,
        separator: Key,
    ) -> Result<(), DatabaseError> {
        let root_page_id = self.root_page_id;
        let left_page_id = self.pager.allocate_page()?;

        left.set_root(false);
        left.set_parent_page_id(Some(root_page_id));
        right.set_parent_page_id(Some(root_page_id));

        if let Page::Internal(node) = &left {
            let children: Vec<PageId> = node.children().collect();
            for child in children {
                self.set_parent(child, left_page_id)?;
            }
        }

        self.write_page(left_page_id, &left)?;
        self.write_page(right_page_id, &right)?;

        let root = InternalNode {
            is_root: true,
            parent_page_id: None,
            right_child_page_id: right_page_id,
            cells: vec![InternalCell {
                child_page_id: left_page_id,
                key: separator,
            }],
        };
        debug!(
            "Root {} split: left page {}, right page {}, separator {}",
            root_page_id, left_page_id, right_page_id, separator
        );
        self.write_page(root_page_id, &Page::Internal(root))
    }

    /// Human-readable rendering of the node structure.
    pub fn dump(&mut self) -> Result<String, DatabaseError> {
        let mut out = String::from("Tree:\n");
        self.dump_node(self.root_page_id, 0, &mut out)?;
        Ok(out)
    }

    fn dump_node(&mut self, page_id: PageId, level: usize, out: &mut String) -> Result<(), DatabaseError> {
        let indent = "  ".repeat(level);
        match self.read_page(page_id)? {
            Page::Leaf(leaf) => {
                let _ = writeln!(out, "{}leaf (size {})", indent, leaf.cells.len());
                for (index, cell) in leaf.cells.iter().enumerate() {
                    let _ = writeln!(out, "{}  - {} : {}", indent, index, cell.key);
                }
            }
            Page::Internal(node) => {
                let _ = writeln!(out, "{}internal (size {})", indent, node.cells.len());
                for cell in &node.cells {
                    self.dump_node(cell.child_page_id, level + 1, out)?;
                    let _ = writeln!(out, "{}  - key {}", indent, cell.key);
                }
                self.dump_node(node.right_child_page_id, level + 1, out)?;
            }
        }
        Ok(())
    }
}
