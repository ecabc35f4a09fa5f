use super::{Record, RecordStorage, Recorder, RecordValue};

/// Buffered recorder.
///
/// Keeps every written record in memory. Stored records are aggregated on
/// [`Recorder::flush`] and the aggregate is buffered as well, tagged with the
/// flush step under the key `"step"`. Useful for inspecting training runs in
/// tests and for recording sequences of observations during evaluation.
#[derive(Default)]
pub struct BufferedRecorder {
    buf: Vec<Record>,
    storage: RecordStorage,
}

impl BufferedRecorder {
    /// Construct the recorder.
    pub fn new() -> Self {
        Self {
            buf: Vec::default(),
            storage: RecordStorage::new(),
        }
    }

    /// Returns an iterator over the records.
    pub fn iter(&self) -> std::slice::Iter<Record> {
        self.buf.iter()
    }

    /// Returns the number of buffered records.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Returns `true` if nothing has been written yet.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}

impl Recorder for BufferedRecorder {
    /// Write a [`Record`] to the buffer.
    fn write(&mut self, record: Record) {
        self.buf.push(record);
    }

    fn store(&mut self, record: Record) {
        self.storage.store(record);
    }

    fn flush(&mut self, step: i64) {
        let mut record = self.storage.aggregate();
        if !record.is_empty() {
            record.insert("step", RecordValue::Scalar(step as f32));
            self.buf.push(record);
        }
    }
}
