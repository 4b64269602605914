use super::Record;

/// Writes records to some destination.
pub trait Recorder {
    /// Writes a record.
    fn write(&mut self, record: Record);
}
