//! Dev-mode logging configuration.
//!
//! Writes structured JSONL to a central file that can be tailed by external
//! tools. Several portal processes may append to the same file.

use crate::json_layer::JsonLayer;
use crate::{default_log_path, LogConfig};
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter};
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Append-only writer for the central log file.
#[derive(Clone)]
pub struct CentralLogWriter {
    inner: Arc<Mutex<BufWriter<File>>>,
}

impl CentralLogWriter {
    pub fn new(path: &Path) -> io::Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;

        Ok(Self {
            inner: Arc::new(Mutex::new(BufWriter::with_capacity(8192, file))),
        })
    }
}

impl io::Write for CentralLogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut guard = self.inner.lock();
        let written = guard.write(buf)?;
        // One flush per line keeps concurrent appenders from interleaving.
        guard.flush()?;
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.lock().flush()
    }
}

impl<'a> MakeWriter<'a> for CentralLogWriter {
    type Writer = CentralLogWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

fn filter_or(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Installs the JSONL file layer plus the optional stderr layer.
pub fn init_dev_subscriber(config: &LogConfig) -> io::Result<()> {
    let log_path = config.log_path.clone().unwrap_or_else(default_log_path);
    let writer = CentralLogWriter::new(&log_path)?;

    let json_layer = JsonLayer::new(config.service_name.clone(), writer);

    let stderr_layer = config.also_stderr.then(|| {
        tracing_subscriber::fmt::layer()
            .with_target(false)
            .compact()
            .with_writer(io::stderr)
            .with_filter(filter_or(&config.stderr_level))
    });

    tracing_subscriber::registry()
        .with(json_layer.with_filter(filter_or(&config.default_level)))
        .with(stderr_layer)
        .try_init()
        .map_err(io::Error::other)?;

    tracing::debug!(
        log_path = %log_path.display(),
        service = %config.service_name,
        "Logging initialized"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use tempfile::tempdir;

    #[test]
    fn test_central_log_writer_appends() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("logs").join("dev.jsonl");

        let mut first = CentralLogWriter::new(&path).unwrap();
        first.write_all(b"one\n").unwrap();
        let mut second = CentralLogWriter::new(&path).unwrap();
        second.write_all(b"two\n").unwrap();

        let mut content = String::new();
        File::open(&path)
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, "one\ntwo\n");
    }

    #[test]
    fn test_writer_creates_parent_dirs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("deeply").join("nested").join("dev.jsonl");

        assert!(CentralLogWriter::new(&path).is_ok());
        assert!(path.parent().unwrap().exists());
    }
}
