//! Change Batch Module
//!
//! Values gathered during one tick, grouped by change category.

// == Change Batch ==
/// Created, updated and deleted values collected by a single tick.
///
/// Callbacks receive the categories as slices; the batch helpers stay
/// internal:
///
/// ```compile_fail
/// assert!(tickcache::ChangeBatch::<i32>::new().is_empty());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeBatch<T> {
    pub created: Vec<T>,
    pub updated: Vec<T>,
    /// Deleted values, including the ones removed by expiry
    pub deleted: Vec<T>,
}

impl<T> Default for ChangeBatch<T> {
    fn default() -> Self {
        Self {
            created: Vec::new(),
            updated: Vec::new(),
            deleted: Vec::new(),
        }
    }
}

impl<T> ChangeBatch<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if no category holds a value.
    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.created.is_empty() && self.updated.is_empty() && self.deleted.is_empty()
    }

    /// Empties every category, keeping the allocations.
    pub fn clear(&mut self) {
        self.created.clear();
        self.updated.clear();
        self.deleted.clear();
    }
}
