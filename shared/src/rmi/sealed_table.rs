use crate::rmi::error::RmiError;

/// Entries are addressed by a single byte on the wire
pub const RMI_TABLE_CAPACITY: usize = 256;

/// An append-only table that can be sealed. Storage is reserved up front,
/// so indices handed out stay valid for the table's lifetime.
pub struct SealedTable<T> {
    items: Vec<T>,
    sealed: bool,
}

impl<T> SealedTable<T> {
    pub fn new() -> Self {
        Self {
            items: Vec::with_capacity(RMI_TABLE_CAPACITY),
            sealed: false,
        }
    }

    /// Appends an entry and returns its index
    pub fn try_push(&mut self, item: T) -> Result<u8, RmiError> {
        if self.sealed {
            return Err(RmiError::TableSealed);
        }
        if self.items.len() >= RMI_TABLE_CAPACITY {
            return Err(RmiError::TableFull {
                capacity: RMI_TABLE_CAPACITY,
            });
        }
        let index = self.items.len() as u8;
        self.items.push(item);
        Ok(index)
    }

    pub fn get(&self, index: u8) -> Option<&T> {
        self.items.get(index as usize)
    }

    pub fn seal(&mut self) {
        self.sealed = true;
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }
}

impl<T> Default for SealedTable<T> {
    fn default() -> Self {
        Self::new()
    }
}
