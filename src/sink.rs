//! Output sinks for assembled records

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::Mutex;

use crate::error::SinkError;
use crate::record::AttributeRecord;

/// Append-only destination for records. Implementations must accept
/// concurrent callers.
pub trait RecordSink: Send + Sync {
    fn write(&self, record: &AttributeRecord) -> Result<(), SinkError>;

    fn flush(&self) -> Result<(), SinkError> {
        Ok(())
    }
}

/// One JSON object per line. Lines from concurrent writers never interleave.
pub struct JsonLinesSink<W: Write + Send> {
    writer: Mutex<W>,
}

impl<W: Write + Send> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> Result<W, SinkError> {
        self.writer.into_inner().map_err(|_| SinkError::Poisoned)
    }
}

impl JsonLinesSink<BufWriter<File>> {
    /// Create or truncate `path`.
    pub fn to_path(path: impl AsRef<Path>) -> io::Result<Self> {
        Ok(Self::new(BufWriter::new(File::create(path)?)))
    }
}

impl JsonLinesSink<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> RecordSink for JsonLinesSink<W> {
    fn write(&self, record: &AttributeRecord) -> Result<(), SinkError> {
        let mut line = serde_json::to_string(record)?;
        line.push('\n');
        let mut writer = self.writer.lock().map_err(|_| SinkError::Poisoned)?;
        writer.write_all(line.as_bytes())?;
        Ok(())
    }

    fn flush(&self) -> Result<(), SinkError> {
        let mut writer = self.writer.lock().map_err(|_| SinkError::Poisoned)?;
        writer.flush()?;
        Ok(())
    }
}

/// Keeps records in memory, in arrival order.
#[derive(Default)]
pub struct MemorySink {
    records: Mutex<Vec<AttributeRecord>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Result<Vec<AttributeRecord>, SinkError> {
        let records = self.records.lock().map_err(|_| SinkError::Poisoned)?;
        Ok(records.clone())
    }
}

impl RecordSink for MemorySink {
    fn write(&self, record: &AttributeRecord) -> Result<(), SinkError> {
        self.records
            .lock()
            .map_err(|_| SinkError::Poisoned)?
            .push(record.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use url::Url;

    use super::*;
    use crate::extractors::ExtractedValue;
    use crate::record::FieldOutcome;

    fn record(n: i64) -> AttributeRecord {
        AttributeRecord::new(
            Url::parse(&format!("https://catalog.test/leaf-{n}/")).unwrap(),
            vec![("hp".into(), FieldOutcome::Value(ExtractedValue::Integer(n)))],
        )
    }

    #[test]
    fn test_concurrent_writers_produce_whole_lines() {
        let sink = Arc::new(JsonLinesSink::new(Vec::new()));

        let handles: Vec<_> = (0..8)
            .map(|n| {
                let sink = Arc::clone(&sink);
                std::thread::spawn(move || {
                    for _ in 0..25 {
                        sink.write(&record(n)).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let sink = Arc::try_unwrap(sink).ok().unwrap();
        let output = String::from_utf8(sink.into_inner().unwrap()).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 200);
        for line in lines {
            let value: serde_json::Value = serde_json::from_str(line).unwrap();
            assert!(value["url"].as_str().unwrap().starts_with("https://catalog.test/leaf-"));
        }
    }

    #[test]
    fn test_file_sink() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.jsonl");

        let sink = JsonLinesSink::to_path(&path).unwrap();
        sink.write(&record(1)).unwrap();
        sink.write(&record(2)).unwrap();
        sink.flush().unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            "{\"url\":\"https://catalog.test/leaf-1/\",\"hp\":1}\n{\"url\":\"https://catalog.test/leaf-2/\",\"hp\":2}\n"
        );
    }

    #[test]
    fn test_memory_sink() {
        let sink = MemorySink::new();
        sink.write(&record(3)).unwrap();
        assert_eq!(sink.records().unwrap(), vec![record(3)]);
    }

    #[test]
    fn test_memory_sink_reports_poisoned_lock() {
        let sink = Arc::new(MemorySink::new());
        let poisoner = Arc::clone(&sink);
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.records.lock().unwrap();
            panic!("writer crashed");
        })
        .join();

        assert!(matches!(sink.records(), Err(SinkError::Poisoned)));
        assert!(matches!(sink.write(&record(4)), Err(SinkError::Poisoned)));
    }
}
