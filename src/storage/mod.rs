pub mod bplus_tree;
pub mod pager;
pub mod table;
