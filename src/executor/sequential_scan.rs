use crate::{
    executor::scan::Scanner,
    storage::bplus_tree::BPlusTree,
    types::{PageId, error::DatabaseError, page::LeafNode, row::Row},
};

/// Walks the leaf chain left to right, yielding rows in key order.
pub struct SequentialScanner<'a> {
    tree: &'a mut BPlusTree,
    current_page_id: Option<PageId>,
    current_leaf: Option<LeafNode>,
    current_slot_index: usize,
    batch_size: usize,
    is_exhausted: bool,
}

impl<'a> SequentialScanner<'a> {
    pub fn new(tree: &'a mut BPlusTree, batch_size: Option<usize>) -> Self {
        Self {
            tree,
            current_page_id: None,
            current_leaf: None,
            current_slot_index: 0,
            batch_size: batch_size.unwrap_or(32),
            is_exhausted: false,
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    fn load_leaf(&mut self, page_id: PageId) -> Result<(), DatabaseError> {
        let leaf = self.tree.read_leaf(page_id)?;
        self.current_page_id = Some(page_id);
        self.current_leaf = Some(leaf);
        self.current_slot_index = 0;
        Ok(())
    }
}

impl Scanner for SequentialScanner<'_> {
    fn scan(&mut self) -> Result<Option<Row>, DatabaseError> {
        if self.is_exhausted {
            return Ok(None);
        }
        if self.current_page_id.is_none() {
            let first_leaf_id = self.tree.first_leaf()?;
            self.load_leaf(first_leaf_id)?;
        }
        loop {
            let Some(leaf) = &self.current_leaf else {
                self.is_exhausted = true;
                return Ok(None);
            };
            if let Some(cell) = leaf.cells.get(self.current_slot_index) {
                let row = Row::from_bytes(&cell.value)?;
                self.current_slot_index += 1;
                return Ok(Some(row));
            }
            let next_leaf_page_id = leaf.next_leaf_page_id;
            match next_leaf_page_id {
                Some(next_page_id) => self.load_leaf(next_page_id)?,
                None => {
                    self.is_exhausted = true;
                    return Ok(None);
                }
            }
        }
    }

    fn scan_batch(&mut self, batch_size: usize) -> Result<Vec<Row>, DatabaseError> {
        let mut rows = Vec::with_capacity(batch_size);
        for _ in 0..batch_size {
            match self.scan()? {
                Some(row) => rows.push(row),
                None => break,
            }
        }
        Ok(rows)
    }

    fn reset(&mut self) -> Result<(), DatabaseError> {
        self.current_page_id = None;
        self.current_leaf = None;
        self.current_slot_index = 0;
        self.is_exhausted = false;
        Ok(())
    }
}
