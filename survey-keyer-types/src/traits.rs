use crate::AnswerRecord;

/// Trait for storage backends that keep completed records.
///
/// Stores are addressed by position: the index of a record is its position
/// in [`RecordStore::all`]. The entry session consults the store for
/// duplicate-ID checks before every save.
pub trait RecordStore {
    /// The error type for this store.
    type Error: Into<anyhow::Error>;

    /// Append a record, returning its index.
    fn add(&mut self, record: AnswerRecord) -> Result<usize, Self::Error>;

    /// Replace the record at `index`.
    fn update(&mut self, index: usize, record: AnswerRecord) -> Result<(), Self::Error>;

    /// Remove and return the record at `index`.
    fn delete(&mut self, index: usize) -> Result<AnswerRecord, Self::Error>;

    /// All records, in insertion order.
    fn all(&self) -> &[AnswerRecord];

    /// Number of stored records.
    fn count(&self) -> usize {
        self.all().len()
    }

    /// Get the record at `index`.
    fn get(&self, index: usize) -> Option<&AnswerRecord> {
        self.all().get(index)
    }

    /// Whether another record (ignoring `exclude_index`) already uses `id`.
    ///
    /// Ids are compared after trimming surrounding whitespace.
    fn is_duplicate_id(&self, id: &str, exclude_index: Option<usize>) -> bool {
        let id = id.trim();
        self.all()
            .iter()
            .enumerate()
            .any(|(idx, record)| Some(idx) != exclude_index && record.id.trim() == id)
    }
}
