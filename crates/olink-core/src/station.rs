//! Base Station - Central Frame Dispatcher
//!
//! The station owns the bin allocator and terminals only ever talk to
//! it, never to each other. Every inbound waveform goes through the
//! same pipeline: forward transform, active-slot extraction, header
//! decode, then dispatch on the control code. Replies walk the pipeline
//! in reverse and come back as time-domain waveforms addressed to a
//! single user.
//!
//! The identifying-field slots are reserved at construction so no
//! payload run can ever overlap a frame header.
//!
//! ## Example
//!
//! ```rust
//! use olink_core::{frame, grid, transform, BaseStation};
//!
//! let mut station = BaseStation::new();
//! let request = transform::inverse(&grid::project(&frame::access_request(0, 2)).unwrap()).unwrap();
//!
//! let reply = station.process_waveform(&request).unwrap().unwrap();
//! assert_eq!(reply.dest, 0);
//! assert_eq!(station.allocator().lease(0).unwrap().count, 2);
//! ```

use tracing::{info, warn};

use crate::allocator::BinAllocator;
use crate::frame::{self, Frame, SLOT_FIELD_A, SLOT_FIELD_B, START_NONE};
use crate::grid;
use crate::transform;
use crate::types::{IQSample, LinkError, LinkResult};

/// A station reply: a time-domain waveform addressed to one user.
#[derive(Debug, Clone, PartialEq)]
pub struct StationReply {
    pub dest: u8,
    pub waveform: Vec<IQSample>,
}

/// Central endpoint of the link. Grants runs, forwards data frames and
/// acknowledges releases.
#[derive(Debug)]
pub struct BaseStation {
    allocator: BinAllocator,
}

impl Default for BaseStation {
    fn default() -> Self {
        Self::new()
    }
}

impl BaseStation {
    /// A station with an empty grid. The identifying-field slots are
    /// reserved up front and never granted.
    pub fn new() -> Self {
        Self {
            allocator: BinAllocator::with_reserved(&[SLOT_FIELD_A, SLOT_FIELD_B]),
        }
    }

    /// Allocation state, for inspection and tests.
    pub fn allocator(&self) -> &BinAllocator {
        &self.allocator
    }

    /// Process one received waveform and produce the reply to send, if
    /// any.
    ///
    /// Access requests always produce a response, a denial included.
    /// Data frames produce a forwarded frame, or
    /// `LinkError::UnknownUser` when sender or destination holds no
    /// run; the caller drops the frame and keeps going. A response
    /// code arriving at the station is ignored.
    pub fn process_waveform(&mut self, rx: &[IQSample]) -> LinkResult<Option<StationReply>> {
        let spectrum = transform::forward(rx)?;
        let active = grid::extract(&spectrum)?;

        let reply = match Frame::decode(&active)? {
            Frame::AccessRequest { user_id, requested } => {
                Some(self.grant(user_id, requested))
            }
            Frame::DataTx { dest, sender } => Some(self.forward_data(&active, dest, sender)?),
            Frame::Deallocate { user_id } => Some(self.release(user_id)),
            Frame::Response { user_id, .. } => {
                warn!(user_id, "response code received at station, ignoring");
                None
            }
        };

        match reply {
            Some((dest, active_reply)) => {
                let waveform = transform::inverse(&grid::project(&active_reply)?)?;
                Ok(Some(StationReply { dest, waveform }))
            }
            None => Ok(None),
        }
    }

    fn grant(&mut self, user_id: u8, requested: u8) -> (u8, Vec<IQSample>) {
        match self.allocator.allocate(user_id, requested as usize) {
            Some(lease) => {
                info!(
                    user_id,
                    start = lease.start,
                    count = lease.count,
                    "granted run"
                );
                (
                    user_id,
                    frame::response(user_id, lease.count as u8, lease.start as u8),
                )
            }
            None => {
                warn!(user_id, requested, "no free run, denying request");
                (user_id, frame::response(user_id, 0, START_NONE))
            }
        }
    }

    fn forward_data(
        &self,
        active: &[IQSample],
        dest: u8,
        sender: u8,
    ) -> LinkResult<(u8, Vec<IQSample>)> {
        let sender_lease = self
            .allocator
            .lease(sender)
            .ok_or(LinkError::UnknownUser(sender))?;
        let dest_lease = self
            .allocator
            .lease(dest)
            .ok_or(LinkError::UnknownUser(dest))?;

        let payload = frame::read_payload(active, sender_lease);
        info!(sender, dest, payload, "forwarding data frame");

        // Re-encode into the destination's run. A narrower run keeps
        // only the low bits, a wider one pads with zero symbols.
        let mut forwarded = frame::data_header(frame::zero_block(), dest, sender);
        frame::write_payload(&mut forwarded, dest_lease, payload);
        Ok((dest, forwarded))
    }

    fn release(&mut self, user_id: u8) -> (u8, Vec<IQSample>) {
        match self.allocator.deallocate(user_id) {
            Some(lease) => info!(
                user_id,
                start = lease.start,
                count = lease.count,
                "released run"
            ),
            None => info!(user_id, "release for user with no run, nothing to free"),
        }
        // The acknowledgement is a zero grant, which also clears the
        // terminal's local lease.
        (user_id, frame::response(user_id, 0, 0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocator::Lease;
    use crate::qpsk;

    fn to_waveform(active: &[IQSample]) -> Vec<IQSample> {
        transform::inverse(&grid::project(active).unwrap()).unwrap()
    }

    fn decode_reply(reply: &StationReply) -> Vec<IQSample> {
        grid::extract(&transform::forward(&reply.waveform).unwrap()).unwrap()
    }

    #[test]
    fn test_grant_reserves_header_slots() {
        let mut station = BaseStation::new();
        let reply = station
            .process_waveform(&to_waveform(&frame::access_request(0, 2)))
            .unwrap()
            .unwrap();
        assert_eq!(reply.dest, 0);
        // Slots 1 and 2 are reserved, so the first grant starts at 3.
        assert_eq!(
            station.allocator().lease(0),
            Some(Lease { start: 3, count: 2 })
        );
        let active = decode_reply(&reply);
        assert_eq!(
            Frame::decode(&active).unwrap(),
            Frame::Response {
                user_id: 0,
                granted: 2,
                start: 3
            }
        );
    }

    #[test]
    fn test_denied_request_still_replies() {
        let mut station = BaseStation::new();
        for user in 0..3u8 {
            station
                .process_waveform(&to_waveform(&frame::access_request(user, 3)))
                .unwrap();
        }
        // Slots 3..=7 are exhausted: (3,3), (6,2), then a denial.
        assert_eq!(station.allocator().lease(2), None);
        let reply = station
            .process_waveform(&to_waveform(&frame::access_request(3, 1)))
            .unwrap()
            .unwrap();
        assert_eq!(reply.dest, 3);
        assert_eq!(
            Frame::decode(&decode_reply(&reply)).unwrap(),
            Frame::Response {
                user_id: 3,
                granted: 0,
                start: START_NONE
            }
        );
    }

    #[test]
    fn test_data_forwarded_into_destination_run() {
        let mut station = BaseStation::new();
        station
            .process_waveform(&to_waveform(&frame::access_request(0, 2)))
            .unwrap();
        station
            .process_waveform(&to_waveform(&frame::access_request(1, 2)))
            .unwrap();
        let sender_lease = station.allocator().lease(0).unwrap();
        let dest_lease = station.allocator().lease(1).unwrap();

        let mut data = frame::data_header(frame::padded_block(), 1, 0);
        frame::write_payload(&mut data, sender_lease, 11);
        let reply = station
            .process_waveform(&to_waveform(&data))
            .unwrap()
            .unwrap();
        assert_eq!(reply.dest, 1);

        let active = decode_reply(&reply);
        assert_eq!(
            Frame::decode(&active).unwrap(),
            Frame::DataTx { dest: 1, sender: 0 }
        );
        assert_eq!(frame::read_payload(&active, dest_lease), 11);
    }

    #[test]
    fn test_forward_truncates_into_narrower_run() {
        let mut station = BaseStation::new();
        station
            .process_waveform(&to_waveform(&frame::access_request(0, 3)))
            .unwrap();
        station
            .process_waveform(&to_waveform(&frame::access_request(1, 2)))
            .unwrap();
        let sender_lease = station.allocator().lease(0).unwrap();
        let dest_lease = station.allocator().lease(1).unwrap();
        assert_eq!(sender_lease.count, 3);
        assert_eq!(dest_lease.count, 2);

        let mut data = frame::data_header(frame::padded_block(), 1, 0);
        frame::write_payload(&mut data, sender_lease, 53);
        let reply = station
            .process_waveform(&to_waveform(&data))
            .unwrap()
            .unwrap();
        // Only the low 4 bits survive: 53 & 0xF == 5.
        assert_eq!(
            frame::read_payload(&decode_reply(&reply), dest_lease),
            5
        );
    }

    #[test]
    fn test_data_from_user_without_run_is_dropped() {
        let mut station = BaseStation::new();
        station
            .process_waveform(&to_waveform(&frame::access_request(1, 2)))
            .unwrap();
        let data = frame::data_header(frame::padded_block(), 1, 0);
        assert_eq!(
            station.process_waveform(&to_waveform(&data)),
            Err(LinkError::UnknownUser(0))
        );
    }

    #[test]
    fn test_data_to_user_without_run_is_dropped() {
        let mut station = BaseStation::new();
        station
            .process_waveform(&to_waveform(&frame::access_request(0, 2)))
            .unwrap();
        let data = frame::data_header(frame::padded_block(), 3, 0);
        assert_eq!(
            station.process_waveform(&to_waveform(&data)),
            Err(LinkError::UnknownUser(3))
        );
    }

    #[test]
    fn test_release_frees_and_acknowledges() {
        let mut station = BaseStation::new();
        station
            .process_waveform(&to_waveform(&frame::access_request(2, 2)))
            .unwrap();
        let lease = station.allocator().lease(2).unwrap();

        let reply = station
            .process_waveform(&to_waveform(&frame::deallocate(2)))
            .unwrap()
            .unwrap();
        assert_eq!(reply.dest, 2);
        // The ack is a zero grant addressed to the releasing user.
        assert_eq!(
            Frame::decode(&decode_reply(&reply)).unwrap(),
            Frame::Response {
                user_id: 2,
                granted: 0,
                start: 0
            }
        );
        assert_eq!(station.allocator().lease(2), None);
        assert!(station.allocator().is_free(lease.start));
    }

    #[test]
    fn test_release_without_run_still_acknowledged() {
        let mut station = BaseStation::new();
        let reply = station
            .process_waveform(&to_waveform(&frame::deallocate(1)))
            .unwrap();
        assert!(reply.is_some());
        assert_eq!(station.allocator().lease_count(), 0);
    }

    #[test]
    fn test_response_code_at_station_is_ignored() {
        let mut station = BaseStation::new();
        let stray = frame::response(1, 2, 3);
        let reply = station.process_waveform(&to_waveform(&stray)).unwrap();
        assert_eq!(reply, None);
        assert_eq!(station.allocator().lease_count(), 0);
    }

    #[test]
    fn test_all_zero_symbol_block_grants_minimum_run() {
        // A block of zero symbols decodes as user 0 requesting 0 bins,
        // which clamps up to a single slot.
        let mut station = BaseStation::new();
        let blank = vec![qpsk::zero_symbol(); crate::ACTIVE_BINS];
        let reply = station.process_waveform(&to_waveform(&blank)).unwrap();
        assert!(reply.is_some());
        assert_eq!(
            station.allocator().lease(0),
            Some(Lease { start: 3, count: 1 })
        );
    }
}
