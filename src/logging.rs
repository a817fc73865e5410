//! Process-wide log setup: one call at startup, nothing changes it afterwards.

use anyhow::{Context, Result};
use log::LevelFilter;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

pub const LOG_FILE_NAME: &str = "janus.log";

/// Writes every record to the log file and to stderr
struct TeeWriter {
    file: File,
    console: io::Stderr,
}

impl Write for TeeWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.write_all(buf)?;
        self.console.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()?;
        self.console.flush()
    }
}

/// Log to `<log_dir>/janus.log` (appended) and stderr.
///
/// `info` by default, `debug` with `--debug`; `RUST_LOG` still wins when set.
pub fn init(debug: bool, log_dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(log_dir).with_context(|| format!("Failed to create log directory: {:?}", log_dir))?;
    let log_path = log_dir.join(LOG_FILE_NAME);

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file: {:?}", log_path))?;

    env_logger::Builder::new()
        .filter_level(level(debug))
        .filter_module("hyper", LevelFilter::Warn)
        .filter_module("hyper_util", LevelFilter::Warn)
        .filter_module("reqwest", LevelFilter::Warn)
        .parse_default_env()
        .format(|buf, record| {
            writeln!(
                buf,
                "{} - {} - {} - {}",
                chrono::Local::now().format("%m-%d %H:%M:%S"),
                record.target(),
                record.level(),
                record.args()
            )
        })
        .target(env_logger::Target::Pipe(Box::new(TeeWriter {
            file,
            console: io::stderr(),
        })))
        .try_init()
        .context("Logger was already initialised")?;

    Ok(log_path)
}

fn level(debug: bool) -> LevelFilter {
    if debug { LevelFilter::Debug } else { LevelFilter::Info }
}
