use super::{Record, RecordStorage, RecordValue, Recorder};
use log::info;

/// Writes records through the [`log`] facade.
///
/// Keys are printed in sorted order so consecutive lines line up.
#[derive(Default)]
pub struct LogRecorder {
    storage: RecordStorage,
}

impl LogRecorder {
    /// Construct the recorder.
    pub fn new() -> Self {
        Self {
            storage: RecordStorage::new(),
        }
    }

    fn format(record: &Record) -> String {
        let mut items: Vec<_> = record.iter().collect();
        items.sort_by(|a, b| a.0.cmp(b.0));
        items
            .into_iter()
            .map(|(k, v)| match v {
                RecordValue::Scalar(v) => format!("{}={:.4}", k, v),
                RecordValue::String(s) => format!("{}={}", k, s),
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl Recorder for LogRecorder {
    fn write(&mut self, record: Record) {
        info!("{}", Self::format(&record));
    }

    fn store(&mut self, record: Record) {
        self.storage.store(record);
    }

    fn flush(&mut self, step: i64) {
        let record = self.storage.aggregate();
        if !record.is_empty() {
            info!("[{}] {}", step, Self::format(&record));
        }
    }
}
