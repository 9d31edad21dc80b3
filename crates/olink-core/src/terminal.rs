//! Terminal - User-Side Protocol Endpoint
//!
//! A terminal tracks at most one lease and a queue of human-readable
//! notices. Inbound waveforms update the lease (responses) or append a
//! notice (data, release notices, strays); outbound traffic is built
//! with the `build_*` methods, which return ready-to-send time-domain
//! waveforms.
//!
//! The terminal never talks to another terminal. Everything it sends
//! goes to the station, which is why a data frame names the departure
//! run (its own lease) and the destination user only.
//!
//! ## Example
//!
//! ```rust
//! use olink_core::{BaseStation, Terminal};
//!
//! let mut station = BaseStation::new();
//! let mut terminal = Terminal::new(0);
//!
//! let request = terminal.build_access_request(2).unwrap();
//! let reply = station.process_waveform(&request).unwrap().unwrap();
//! terminal.handle_waveform(&reply.waveform).unwrap();
//!
//! assert_eq!(terminal.lease().unwrap().count, 2);
//! assert!(terminal.next_message().unwrap().contains("granted 2"));
//! ```

use std::collections::VecDeque;

use tracing::debug;

use crate::allocator::{Lease, MAX_REQUEST_BINS};
use crate::frame::{self, Frame};
use crate::grid;
use crate::transform;
use crate::types::{IQSample, LinkError, LinkResult};
use crate::ACTIVE_BINS;

/// User-side endpoint: one lease, one notice queue.
#[derive(Debug)]
pub struct Terminal {
    user_id: u8,
    lease: Option<Lease>,
    messages: VecDeque<String>,
}

impl Terminal {
    /// A terminal with no lease and an empty queue. Valid user ids are
    /// `0..=3`; the caller enforces the range.
    pub fn new(user_id: u8) -> Self {
        Self {
            user_id,
            lease: None,
            messages: VecDeque::new(),
        }
    }

    pub fn user_id(&self) -> u8 {
        self.user_id
    }

    /// The run currently granted to this terminal, if any.
    pub fn lease(&self) -> Option<Lease> {
        self.lease
    }

    /// Largest payload the current lease can carry.
    pub fn max_payload(&self) -> Option<u32> {
        self.lease.map(|lease| lease.max_payload())
    }

    /// Number of queued notices.
    pub fn pending_messages(&self) -> usize {
        self.messages.len()
    }

    /// Pop the oldest queued notice.
    pub fn next_message(&mut self) -> Option<String> {
        self.messages.pop_front()
    }

    /// Decode one received waveform, updating the lease or queueing a
    /// notice.
    pub fn handle_waveform(&mut self, rx: &[IQSample]) -> LinkResult<()> {
        let spectrum = transform::forward(rx)?;
        let active = grid::extract(&spectrum)?;

        match Frame::decode(&active)? {
            Frame::Response {
                user_id: _,
                granted,
                start,
            } => {
                // The user id echo is informational; a terminal only
                // ever sees frames addressed to its own inbox.
                self.lease = well_formed_grant(granted, start);
                debug!(
                    user = self.user_id,
                    granted, start, "grant response received"
                );
                self.messages.push_back(format!(
                    "response: granted {granted} bins starting at slot {start}"
                ));
            }
            Frame::DataTx { sender, .. } => {
                let payload = match self.lease {
                    Some(lease) => frame::read_payload(&active, lease),
                    None => 0,
                };
                self.messages
                    .push_back(format!("data from user {sender}: payload {payload}"));
            }
            Frame::Deallocate { user_id } => {
                // A release notice does not clear the local lease; only
                // a later zero grant would.
                self.messages
                    .push_back(format!("deallocation notice for user {user_id}"));
            }
            Frame::AccessRequest { .. } => {
                self.messages.push_back(format!(
                    "unknown control code {}",
                    frame::ControlCode::AccessRequest as u8
                ));
            }
        }
        Ok(())
    }

    /// Waveform asking the station for `requested` bins, clamped to
    /// `1..=MAX_REQUEST_BINS`.
    pub fn build_access_request(&self, requested: u8) -> LinkResult<Vec<IQSample>> {
        let requested = requested.clamp(1, MAX_REQUEST_BINS as u8);
        to_waveform(frame::access_request(self.user_id, requested))
    }

    /// Waveform carrying `payload` to `dest` through the station.
    /// Payloads above the lease capacity saturate to the maximum.
    ///
    /// Returns `LinkError::UnknownUser` when this terminal holds no
    /// lease.
    pub fn build_data(&self, dest: u8, payload: u32) -> LinkResult<Vec<IQSample>> {
        let lease = self.lease.ok_or(LinkError::UnknownUser(self.user_id))?;
        let payload = payload.min(lease.max_payload());
        let mut active = frame::data_header(frame::padded_block(), dest, self.user_id);
        frame::write_payload(&mut active, lease, payload);
        to_waveform(active)
    }

    /// Waveform releasing this terminal's run.
    pub fn build_deallocate(&self) -> LinkResult<Vec<IQSample>> {
        to_waveform(frame::deallocate(self.user_id))
    }
}

/// A grant is only usable when its run fits the grid; anything else,
/// the denial sentinel included, leaves the terminal without a lease.
fn well_formed_grant(granted: u8, start: u8) -> Option<Lease> {
    let count = granted as usize;
    let start = start as usize;
    if count == 0 || start + count > ACTIVE_BINS {
        return None;
    }
    Some(Lease { start, count })
}

fn to_waveform(active: Vec<IQSample>) -> LinkResult<Vec<IQSample>> {
    transform::inverse(&grid::project(&active)?)
}
