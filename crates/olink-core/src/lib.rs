//! # olink-core
//!
//! Frame processing for a small OFDMA star network: one base station,
//! up to four user terminals, QPSK on eight evenly spaced active bins
//! of a 64-bin grid. All coordination flows through the station, which
//! owns the bin allocator and relays every data frame.
//!
//! A frame's life, terminal to terminal:
//!
//! ```text
//! active symbols -> project -> IFFT -> waveform -> (channel)
//!     -> FFT -> extract -> decode @ station -> re-encode
//!     -> project -> IFFT -> waveform -> (channel) -> FFT -> extract
//! ```
//!
//! The crate is transport-agnostic: stations and terminals consume and
//! produce plain `Vec<IQSample>` waveforms, and whatever carries them
//! (files, sockets, a test harness) lives elsewhere.
//!
//! ## Example
//!
//! ```rust
//! use olink_core::{BaseStation, Terminal};
//!
//! let mut station = BaseStation::new();
//! let mut alice = Terminal::new(0);
//! let mut bob = Terminal::new(1);
//!
//! // Both terminals obtain a run of bins.
//! for terminal in [&mut alice, &mut bob] {
//!     let request = terminal.build_access_request(2).unwrap();
//!     let reply = station.process_waveform(&request).unwrap().unwrap();
//!     terminal.handle_waveform(&reply.waveform).unwrap();
//!     terminal.next_message();
//! }
//!
//! // Alice sends bob a payload through the station.
//! let data = alice.build_data(1, 11).unwrap();
//! let forwarded = station.process_waveform(&data).unwrap().unwrap();
//! assert_eq!(forwarded.dest, 1);
//! bob.handle_waveform(&forwarded.waveform).unwrap();
//! assert!(bob.next_message().unwrap().contains("payload 11"));
//! ```

pub mod allocator;
pub mod channel;
pub mod frame;
pub mod grid;
pub mod qpsk;
pub mod station;
pub mod terminal;
pub mod transform;
pub mod types;

/// Transform block length in samples.
pub const FFT_SIZE: usize = 64;
/// Number of occupied frequency bins per frame.
pub const ACTIVE_BINS: usize = 8;
/// Spacing between consecutive active bins on the full grid.
pub const BIN_SPACING: usize = FFT_SIZE / ACTIVE_BINS;
/// Highest valid user id; ids run `0..=MAX_USER_ID`.
pub const MAX_USER_ID: u8 = 3;

pub use allocator::{BinAllocator, Lease, MAX_REQUEST_BINS};
pub use channel::AwgnChannel;
pub use frame::{ControlCode, Frame};
pub use station::{BaseStation, StationReply};
pub use terminal::Terminal;
pub use types::{IQSample, LinkError, LinkResult};
