// Answer buffer: one integer slot per dataset row, pre-filled with the
// sentinel so rows that were never reached are still written out.

/// Value stored for rows the annotator did not get to.
pub const SENTINEL: i64 = -1;

/// Ordered labels for a session, indexed by row position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerBuffer {
    values: Vec<i64>,
}

impl AnswerBuffer {
    /// Create a buffer with `rows` sentinel entries.
    pub fn new(rows: usize) -> Self {
        AnswerBuffer {
            values: vec![SENTINEL; rows],
        }
    }

    /// Store `value` for row `index`. Returns `false` when the index is out of
    /// range, which only happens if the caller iterates a different table.
    pub fn record(&mut self, index: usize, value: i64) -> bool {
        match self.values.get_mut(index) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// Number of rows holding something other than the sentinel.
    pub fn labeled(&self) -> usize {
        self.values.iter().filter(|v| **v != SENTINEL).count()
    }

    #[cfg(test)]
    pub(crate) fn values(&self) -> &[i64] {
        &self.values
    }

    /// Render every slot as a cell for the label column.
    pub fn into_cells(self) -> Vec<String> {
        self.values.into_iter().map(|v| v.to_string()).collect()
    }
}
