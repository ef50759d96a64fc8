use anyhow::Result;
use chrono::Local;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::{self, time::ChronoUtc};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry};

const BYTES_PER_MB: u64 = 1024 * 1024;

pub struct LogSettings<'a> {
    pub quiet: bool,
    pub debug: bool,
    /// `None` logs to stderr only.
    pub file: Option<&'a Path>,
    pub max_size_mb: u64,
}

/// Install the global subscriber. Keep the returned guard alive until exit so
/// buffered file writes get flushed.
pub fn init_logging(settings: LogSettings<'_>) -> Result<Option<WorkerGuard>> {
    let filter = if settings.quiet {
        EnvFilter::new("error")
    } else if settings.debug {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("debug,hyper::proto::h1=warn,hyper::client::pool=warn"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    let json = std::env::var("RUST_LOG_JSON")
        .map(|v| v == "true")
        .unwrap_or(false);

    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();
    if json {
        layers.push(
            fmt::layer()
                .json()
                .with_timer(ChronoUtc::rfc_3339())
                .with_writer(io::stderr)
                .boxed(),
        );
    } else {
        layers.push(
            fmt::layer()
                .with_timer(ChronoUtc::rfc_3339())
                .with_writer(io::stderr)
                .boxed(),
        );
    }

    let mut guard = None;
    if let Some(path) = settings.file {
        let writer = SizeRotatingWriter::open(path, settings.max_size_mb.saturating_mul(BYTES_PER_MB))?;
        let (non_blocking, worker_guard) = tracing_appender::non_blocking(writer);
        guard = Some(worker_guard);

        if json {
            layers.push(
                fmt::layer()
                    .json()
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_writer(non_blocking)
                    .boxed(),
            );
        } else {
            layers.push(
                fmt::layer()
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_ansi(false) // Disable ANSI codes when writing to file
                    .with_writer(non_blocking)
                    .boxed(),
            );
        }
    }

    tracing_subscriber::registry().with(layers).with(filter).init();
    Ok(guard)
}

/// Appends to a log file; once it grows past `max_bytes` the file is gzipped
/// to `<name>_<YYYYmmdd_HHMM>.log.gz` beside it and started over.
///
/// A `max_bytes` of zero disables rotation.
pub struct SizeRotatingWriter {
    path: PathBuf,
    max_bytes: u64,
    file: File,
    size: u64,
}

impl SizeRotatingWriter {
    pub fn open(path: &Path, max_bytes: u64) -> io::Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let size = file.metadata()?.len();
        Ok(Self {
            path: path.to_path_buf(),
            max_bytes,
            file,
            size,
        })
    }

    fn backup_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "sickadd.log".to_string());
        let stamp = Local::now().format("%Y%m%d_%H%M");

        let mut candidate = self.path.with_file_name(format!("{}_{}.log.gz", name, stamp));
        let mut n = 1;
        while candidate.exists() {
            candidate = self.path.with_file_name(format!("{}_{}_{}.log.gz", name, stamp, n));
            n += 1;
        }
        candidate
    }

    fn rotate(&mut self) -> io::Result<()> {
        self.file.flush()?;
        let backup = self.backup_path();

        let mut input = File::open(&self.path)?;
        let mut encoder = GzEncoder::new(File::create(&backup)?, Compression::default());
        io::copy(&mut input, &mut encoder)?;
        encoder.finish()?;

        self.file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&self.path)?;
        self.size = 0;
        Ok(())
    }
}

impl Write for SizeRotatingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.max_bytes > 0 && self.size > 0 && self.size + buf.len() as u64 > self.max_bytes {
            // On a failed rotation keep appending to the current file
            if let Err(e) = self.rotate() {
                eprintln!("Failed to rotate log file {}: {}", self.path.display(), e);
            }
        }
        let written = self.file.write(buf)?;
        self.size += written as u64;
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}
