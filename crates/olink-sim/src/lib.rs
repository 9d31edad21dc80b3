//! # olink-sim
//!
//! File-backed simulator around `olink-core`. One station process and
//! up to four terminal processes share a buffer directory; each
//! endpoint polls its own inbox file and writes waveforms, with AWGN
//! applied, into its peer's. Running the whole network needs nothing
//! but a shared filesystem:
//!
//! ```text
//! olink-station &
//! olink-terminal 0
//! olink-terminal 1
//! ```
//!
//! Configuration comes from `OLINK_CONFIG`, `./olink.yaml` or the
//! built-in defaults; see [`config::SimConfig`].

pub mod config;
pub mod station;
pub mod terminal;
pub mod transport;

use olink_core::LinkError;

pub use config::{ConfigError, SimConfig};
pub use station::StationRuntime;
pub use terminal::TerminalRuntime;
pub use transport::{FileTransport, TransportError};

/// Anything a runtime operation can fail with.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Link(#[from] LinkError),
}
