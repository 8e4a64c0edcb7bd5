use crate::types::{
    ID_SIZE, INTERNAL_NODE_CELL_SIZE, INTERNAL_NODE_HEADER_SIZE,
    INTERNAL_NODE_MAX_KEYS, INTERNAL_NODE_NUM_KEYS_OFFSET, INTERNAL_NODE_RIGHT_CHILD_OFFSET,
    INVALID_PAGE_ID, IS_ROOT_OFFSET, Key, LEAF_NODE_CELL_SIZE, LEAF_NODE_HEADER_SIZE,
    LEAF_NODE_MAX_CELLS, LEAF_NODE_NEXT_LEAF_OFFSET, LEAF_NODE_NUM_CELLS_OFFSET, NODE_TYPE_OFFSET,
    PAGE_SIZE, PARENT_POINTER_OFFSET, PageId, ROW_SIZE, error::DatabaseError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageType {
    Internal = 5,
    Leaf = 13,
}

impl PageType {
    pub fn from_u8(value: u8) -> Result<Self, DatabaseError> {
        match value {
            5 => Ok(PageType::Internal),
            13 => Ok(PageType::Leaf),
            _ => Err(DatabaseError::InvalidPageType(value)),
        }
    }

    pub fn as_u8(&self) -> u8 {
        match self {
            PageType::Internal => 5,
            PageType::Leaf => 13,
        }
    }
}

/*
 * Node Layout on Disk
 * ┌─────────────────────────────────────────────────────────────────┐
 * │ COMMON HEADER (6 bytes)                                         │
 * │  node_type(1) | is_root(1) | parent(4)                          │
 * ├─────────────────────────────────────────────────────────────────┤
 * │ LEAF:     num_cells(4) | next_leaf(4)                           │
 * │           [key(4) | row(291)] * num_cells                       │
 * │ INTERNAL: num_keys(4)  | right_child(4)                         │
 * │           [child(4) | key(4)] * num_keys                        │
 * └─────────────────────────────────────────────────────────────────┘
 * u32::MAX in a page pointer means "none".
 */

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafCell {
    pub key: Key,
    pub value: [u8; ROW_SIZE],
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafNode {
    pub is_root: bool,
    pub parent_page_id: Option<PageId>,
    pub next_leaf_page_id: Option<PageId>,
    pub cells: Vec<LeafCell>,
}

impl LeafNode {
    pub fn new(is_root: bool) -> Self {
        Self {
            is_root,
            parent_page_id: None,
            next_leaf_page_id: None,
            cells: Vec::new(),
        }
    }

    /// Index of `key`, or the slot it would be inserted at.
    pub fn search(&self, key: Key) -> usize {
        match self.cells.binary_search_by_key(&key, |cell| cell.key) {
            Ok(index) | Err(index) => index,
        }
    }

    pub fn max_key(&self) -> Option<Key> {
        self.cells.last().map(|cell| cell.key)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InternalCell {
    pub child_page_id: PageId,
    pub key: Key,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InternalNode {
    pub is_root: bool,
    pub parent_page_id: Option<PageId>,
    pub right_child_page_id: PageId,
    pub cells: Vec<InternalCell>,
}

impl InternalNode {
    /// Child whose subtree covers `key`: the first cell with key >= target,
    /// otherwise the right child.
    pub fn child_for(&self, key: Key) -> PageId {
        let index = self.cells.partition_point(|cell| cell.key < key);
        self.cells
            .get(index)
            .map(|cell| cell.child_page_id)
            .unwrap_or(self.right_child_page_id)
    }

    /// Position of `child` among the children; `cells.len()` for the right child.
    pub fn child_index(&self, child: PageId) -> Option<usize> {
        if let Some(index) = self.cells.iter().position(|cell| cell.child_page_id == child) {
            return Some(index);
        }
        (self.right_child_page_id == child).then_some(self.cells.len())
    }

    pub fn children(&self) -> impl Iterator<Item = PageId> + '_ {
        self.cells
            .iter()
            .map(|cell| cell.child_page_id)
            .chain(std::iter::once(self.right_child_page_id))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Page {
    Leaf(LeafNode),
    Internal(InternalNode),
}

impl Page {
    pub fn page_type(&self) -> PageType {
        match self {
            Page::Leaf(_) => PageType::Leaf,
            Page::Internal(_) => PageType::Internal,
        }
    }

    pub fn is_root(&self) -> bool {
        match self {
            Page::Leaf(node) => node.is_root,
            Page::Internal(node) => node.is_root,
        }
    }

    pub fn set_root(&mut self, is_root: bool) {
        match self {
            Page::Leaf(node) => node.is_root = is_root,
            Page::Internal(node) => node.is_root = is_root,
        }
    }

    pub fn parent_page_id(&self) -> Option<PageId> {
        match self {
            Page::Leaf(node) => node.parent_page_id,
            Page::Internal(node) => node.parent_page_id,
        }
    }

    pub fn set_parent_page_id(&mut self, parent: Option<PageId>) {
        match self {
            Page::Leaf(node) => node.parent_page_id = parent,
            Page::Internal(node) => node.parent_page_id = parent,
        }
    }

    /// Number of cells in a leaf, or keys in an internal node.
    pub fn cell_count(&self) -> usize {
        match self {
            Page::Leaf(node) => node.cells.len(),
            Page::Internal(node) => node.cells.len(),
        }
    }

    /// Serialize the node into a full page buffer following the documented layout
    pub fn to_bytes(&self, page_id: PageId) -> Result<Vec<u8>, DatabaseError> {
        let mut buffer = vec![0u8; PAGE_SIZE];
        buffer[NODE_TYPE_OFFSET] = self.page_type().as_u8();
        buffer[IS_ROOT_OFFSET] = self.is_root() as u8;
        put_page_id(&mut buffer, PARENT_POINTER_OFFSET, self.parent_page_id());

        match self {
            Page::Leaf(node) => {
                if node.cells.len() > LEAF_NODE_MAX_CELLS {
                    return Err(DatabaseError::PageFull { page_id });
                }
                put_u32(&mut buffer, LEAF_NODE_NUM_CELLS_OFFSET, node.cells.len() as u32);
                put_page_id(&mut buffer, LEAF_NODE_NEXT_LEAF_OFFSET, node.next_leaf_page_id);

                let mut offset = LEAF_NODE_HEADER_SIZE;
                for cell in &node.cells {
                    buffer[offset..offset + ID_SIZE].copy_from_slice(&cell.key.to_le_bytes());
                    buffer[offset + ID_SIZE..offset + LEAF_NODE_CELL_SIZE].copy_from_slice(&cell.value);
                    offset += LEAF_NODE_CELL_SIZE;
                }
            }
            Page::Internal(node) => {
                if node.cells.len() > INTERNAL_NODE_MAX_KEYS {
                    return Err(DatabaseError::PageFull { page_id });
                }
                put_u32(&mut buffer, INTERNAL_NODE_NUM_KEYS_OFFSET, node.cells.len() as u32);
                put_u32(&mut buffer, INTERNAL_NODE_RIGHT_CHILD_OFFSET, node.right_child_page_id);

                let mut offset = INTERNAL_NODE_HEADER_SIZE;
                for cell in &node.cells {
                    put_u32(&mut buffer, offset, cell.child_page_id);
                    buffer[offset + 4..offset + 8].copy_from_slice(&cell.key.to_le_bytes());
                    offset += INTERNAL_NODE_CELL_SIZE;
                }
            }
        }

        Ok(buffer)
    }

    /// Deserialize a node from a full page buffer
    pub fn from_bytes(page_id: PageId, bytes: &[u8]) -> Result<Self, DatabaseError> {
        if bytes.len() != PAGE_SIZE {
            return Err(DatabaseError::InvalidPageSize {
                expected: PAGE_SIZE,
                actual: bytes.len(),
            });
        }

        let page_type = PageType::from_u8(bytes[NODE_TYPE_OFFSET]).map_err(|_| {
            DatabaseError::CorruptedPage {
                page_id,
                reason: format!("Unknown node type {}", bytes[NODE_TYPE_OFFSET]),
            }
        })?;
        let is_root = bytes[IS_ROOT_OFFSET] != 0;
        let parent_page_id = get_page_id(bytes, PARENT_POINTER_OFFSET);

        match page_type {
            PageType::Leaf => {
                let cell_count = get_u32(bytes, LEAF_NODE_NUM_CELLS_OFFSET) as usize;
                if cell_count > LEAF_NODE_MAX_CELLS {
                    return Err(DatabaseError::CorruptedPage {
                        page_id,
                        reason: format!("Leaf cell count {} exceeds {}", cell_count, LEAF_NODE_MAX_CELLS),
                    });
                }
                let next_leaf_page_id = get_page_id(bytes, LEAF_NODE_NEXT_LEAF_OFFSET);

                let mut cells = Vec::with_capacity(cell_count);
                let mut offset = LEAF_NODE_HEADER_SIZE;
                for _ in 0..cell_count {
                    let key = get_key(bytes, offset);
                    let mut value = [0u8; ROW_SIZE];
                    value.copy_from_slice(&bytes[offset + ID_SIZE..offset + LEAF_NODE_CELL_SIZE]);
                    cells.push(LeafCell { key, value });
                    offset += LEAF_NODE_CELL_SIZE;
                }

                Ok(Page::Leaf(LeafNode {
                    is_root,
                    parent_page_id,
                    next_leaf_page_id,
                    cells,
                }))
            }
            PageType::Internal => {
                let key_count = get_u32(bytes, INTERNAL_NODE_NUM_KEYS_OFFSET) as usize;
                if key_count > INTERNAL_NODE_MAX_KEYS {
                    return Err(DatabaseError::CorruptedPage {
                        page_id,
                        reason: format!("Internal key count {} exceeds {}", key_count, INTERNAL_NODE_MAX_KEYS),
                    });
                }
                let right_child_page_id = get_u32(bytes, INTERNAL_NODE_RIGHT_CHILD_OFFSET);

                let mut cells = Vec::with_capacity(key_count);
                let mut offset = INTERNAL_NODE_HEADER_SIZE;
                for _ in 0..key_count {
                    cells.push(InternalCell {
                        child_page_id: get_u32(bytes, offset),
                        key: get_key(bytes, offset + 4),
                    });
                    offset += INTERNAL_NODE_CELL_SIZE;
                }

                Ok(Page::Internal(InternalNode {
                    is_root,
                    parent_page_id,
                    right_child_page_id,
                    cells,
                }))
            }
        }
    }
}

fn get_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

fn get_key(bytes: &[u8], offset: usize) -> Key {
    Key::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

fn get_page_id(bytes: &[u8], offset: usize) -> Option<PageId> {
    let raw = get_u32(bytes, offset);
    if raw == INVALID_PAGE_ID { None } else { Some(raw) }
}

fn put_u32(buffer: &mut [u8], offset: usize, value: u32) {
    buffer[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}

fn put_page_id(buffer: &mut [u8], offset: usize, page_id: Option<PageId>) {
    put_u32(buffer, offset, page_id.unwrap_or(INVALID_PAGE_ID));
}
