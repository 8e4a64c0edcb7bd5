pub mod error;
pub mod page;
pub mod row;

// Common type aliases
pub type PageId = u32;
pub type Key = i32;

pub const PAGE_SIZE: usize = 4096;
pub const TABLE_MAX_PAGES: u32 = 100;
pub const INVALID_PAGE_ID: PageId = u32::MAX;

// Row layout
pub const ID_SIZE: usize = size_of::<Key>();
pub const USERNAME_SIZE: usize = 32;
pub const EMAIL_SIZE: usize = 255;
pub const ID_OFFSET: usize = 0;
pub const USERNAME_OFFSET: usize = ID_OFFSET + ID_SIZE;
pub const EMAIL_OFFSET: usize = USERNAME_OFFSET + USERNAME_SIZE;
pub const ROW_SIZE: usize = ID_SIZE + USERNAME_SIZE + EMAIL_SIZE;

// Common node header
pub const NODE_TYPE_OFFSET: usize = 0;
pub const IS_ROOT_OFFSET: usize = NODE_TYPE_OFFSET + 1;
pub const PARENT_POINTER_OFFSET: usize = IS_ROOT_OFFSET + 1;
pub const COMMON_NODE_HEADER_SIZE: usize = PARENT_POINTER_OFFSET + size_of::<PageId>();

// Leaf node layout
pub const LEAF_NODE_NUM_CELLS_OFFSET: usize = COMMON_NODE_HEADER_SIZE;
pub const LEAF_NODE_NEXT_LEAF_OFFSET: usize = LEAF_NODE_NUM_CELLS_OFFSET + size_of::<u32>();
pub const LEAF_NODE_HEADER_SIZE: usize = LEAF_NODE_NEXT_LEAF_OFFSET + size_of::<PageId>();
pub const LEAF_NODE_CELL_SIZE: usize = ID_SIZE + ROW_SIZE;
pub const LEAF_NODE_MAX_CELLS: usize = (PAGE_SIZE - LEAF_NODE_HEADER_SIZE) / LEAF_NODE_CELL_SIZE;

// Internal node layout
pub const INTERNAL_NODE_NUM_KEYS_OFFSET: usize = COMMON_NODE_HEADER_SIZE;
pub const INTERNAL_NODE_RIGHT_CHILD_OFFSET: usize = INTERNAL_NODE_NUM_KEYS_OFFSET + size_of::<u32>();
pub const INTERNAL_NODE_HEADER_SIZE: usize = INTERNAL_NODE_RIGHT_CHILD_OFFSET + size_of::<PageId>();
pub const INTERNAL_NODE_CELL_SIZE: usize = size_of::<PageId>() + ID_SIZE;
pub const INTERNAL_NODE_MAX_KEYS: usize =
    (PAGE_SIZE - INTERNAL_NODE_HEADER_SIZE) / INTERNAL_NODE_CELL_SIZE;
