//! File Transport - Shared-Directory Waveform Exchange
//!
//! Waveforms travel between processes as plain text files in one
//! shared directory, a line per sample, real and imaginary parts
//! separated by whitespace. Each endpoint has a single inbox file: the
//! station reads `bs_rx_waveform.txt`, terminal `n` reads
//! `user<n>_rx_waveform.txt`. Writing an inbox replaces whatever was
//! there; an unread frame that gets overwritten is simply lost, which
//! matches the lossy single-mailbox design.
//!
//! Reading is tolerant of formatting: values are split on any
//! whitespace, so line breaks are cosmetic. A missing or empty inbox
//! means "nothing to receive"; a token that does not parse as a float
//! or a dangling real value without its imaginary partner is a
//! malformed file.

use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use olink_core::IQSample;

/// Station inbox file name inside the buffer directory.
pub const STATION_INBOX: &str = "bs_rx_waveform.txt";

/// Transport failures. I/O errors carry the underlying cause;
/// malformed files name the offending path.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("transport i/o: {0}")]
    Io(#[from] io::Error),

    #[error("malformed waveform file {path}: {detail}")]
    Malformed { path: PathBuf, detail: String },
}

/// One shared buffer directory and the naming scheme inside it.
#[derive(Debug, Clone)]
pub struct FileTransport {
    dir: PathBuf,
}

impl FileTransport {
    /// Open a transport rooted at `dir`, creating the directory if
    /// needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, TransportError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// The buffer directory this transport works in.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the station's inbox.
    pub fn station_inbox(&self) -> PathBuf {
        self.dir.join(STATION_INBOX)
    }

    /// Path of a terminal's inbox.
    pub fn terminal_inbox(&self, user_id: u8) -> PathBuf {
        self.dir.join(format!("user{user_id}_rx_waveform.txt"))
    }

    /// Read a waveform from an inbox. A missing or empty file yields
    /// `Ok(None)`; the frame, whatever its length, is returned as-is
    /// and the caller decides whether it is complete.
    pub fn read(&self, inbox: &Path) -> Result<Option<Vec<IQSample>>, TransportError> {
        let content = match fs::read_to_string(inbox) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let mut values = Vec::new();
        for token in content.split_whitespace() {
            let value: f64 = token.parse().map_err(|_| TransportError::Malformed {
                path: inbox.to_path_buf(),
                detail: format!("bad float token {token:?}"),
            })?;
            values.push(value);
        }
        if values.is_empty() {
            return Ok(None);
        }
        if values.len() % 2 != 0 {
            return Err(TransportError::Malformed {
                path: inbox.to_path_buf(),
                detail: format!("odd value count {}", values.len()),
            });
        }
        Ok(Some(
            values
                .chunks_exact(2)
                .map(|pair| IQSample::new(pair[0], pair[1]))
                .collect(),
        ))
    }

    /// Write a waveform to an inbox, replacing any previous content.
    pub fn write(&self, inbox: &Path, waveform: &[IQSample]) -> Result<(), TransportError> {
        let mut content = String::with_capacity(waveform.len() * 16);
        for sample in waveform {
            // Infallible for String, but write! keeps the formatting
            // in one expression.
            let _ = writeln!(content, "{} {}", sample.re, sample.im);
        }
        fs::write(inbox, content)?;
        Ok(())
    }

    /// Truncate an inbox to empty, creating it if missing.
    pub fn clear(&self, inbox: &Path) -> Result<(), TransportError> {
        fs::write(inbox, "")?;
        Ok(())
    }
}
