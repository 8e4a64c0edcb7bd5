use tinysql::types::{EMAIL_SIZE, USERNAME_SIZE, row::Row};

#[derive(Debug, Clone, Copy)]
pub enum RowType {
    Short,
    Full,
}

pub struct DataGenerator {
    seed: u64,
}

impl DataGenerator {
    pub fn new() -> Self {
        Self { seed: 42 }
    }

    pub fn generate_row(&self, id: i32, row_type: RowType) -> Row {
        match row_type {
            RowType::Short => Row::new(id, format!("user{}", id), format!("person{}@example.com", id)),
            RowType::Full => {
                let username = format!("{:0>width$}", id, width = USERNAME_SIZE);
                let domain = "@example.com";
                let local = "x".repeat(EMAIL_SIZE - domain.len());
                Row::new(id, username, format!("{}{}", local, domain))
            }
        }
    }

    /// Ids `0..count` in a fixed pseudo-random order.
    pub fn shuffled_ids(&self, count: usize) -> Vec<i32> {
        let mut ids: Vec<i32> = (0..count as i32).collect();
        let mut state = self.seed;
        for i in (1..ids.len()).rev() {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            let j = (state >> 33) as usize % (i + 1);
            ids.swap(i, j);
        }
        ids
    }
}

impl Default for DataGenerator {
    fn default() -> Self {
        Self::new()
    }
}
