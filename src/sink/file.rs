//! Append-only file backend.

use std::path::Path;

use async_trait::async_trait;
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncWriteExt, BufWriter};

use crate::entry::Entry;
use crate::sink::{Backend, SinkError};

/// One JSON object per line, flushed per entry so the file stays in step
/// with delivery order. The worker owns the handle exclusively; the
/// `Option` makes a second close a no-op.
pub(crate) struct FileBackend {
    writer: Option<BufWriter<File>>,
}

impl FileBackend {
    pub(crate) async fn open(path: &Path) -> Result<Self, SinkError> {
        let file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(path)
            .await
            .map_err(|source| SinkError::Open {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(FileBackend {
            writer: Some(BufWriter::new(file)),
        })
    }
}

#[async_trait]
impl Backend for FileBackend {
    async fn write(&mut self, entry: Entry) {
        let line = match serde_json::to_string(&entry) {
            Ok(line) => line,
            Err(_) => return,
        };
        if let Some(writer) = self.writer.as_mut() {
            let _ = writer.write_all(line.as_bytes()).await;
            let _ = writer.write_all(b"\n").await;
            let _ = writer.flush().await;
        }
    }

    async fn close(mut self: Box<Self>) {
        if let Some(mut writer) = self.writer.take() {
            let _ = writer.flush().await;
            let _ = writer.shutdown().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::Severity;
    use crate::key::Key;

    #[tokio::test]
    async fn writes_one_json_line_per_entry() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.log");

        let mut backend = FileBackend::open(&path).await.unwrap();
        let key = Key::detached();
        backend
            .write(Entry::record(Severity::Info, &key, "a", "first", Vec::new()))
            .await;
        backend
            .write(Entry::record(Severity::Info, &key, "a", "second", Vec::new()))
            .await;
        Box::new(backend).close().await;

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: Entry = serde_json::from_str(lines[0]).unwrap();
        let second: Entry = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(first.message, "first");
        assert_eq!(second.message, "second");
    }

    #[tokio::test]
    async fn appends_to_an_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.log");
        std::fs::write(&path, "existing\n").unwrap();

        let mut backend = FileBackend::open(&path).await.unwrap();
        let key = Key::detached();
        backend
            .write(Entry::record(Severity::Info, &key, "a", "new", Vec::new()))
            .await;
        Box::new(backend).close().await;

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("existing\n"));
        assert_eq!(contents.lines().count(), 2);
    }

    #[tokio::test]
    async fn open_fails_for_an_unwritable_path() {
        let result = FileBackend::open(Path::new("/nonexistent-dir/out.log")).await;
        assert!(matches!(result, Err(SinkError::Open { .. })));
    }
}
