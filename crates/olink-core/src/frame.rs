//! Control Frames - Active-Slot Wire Layout
//!
//! Everything that gives the active slots their meaning lives here: the
//! 2-bit control code space, the slot positions of the identifying
//! fields, the split encoding of the 4-bit start slot, and the
//! MSB-first payload packing. Station and terminal code never touches
//! slot indices directly.
//!
//! Frame layout, one QPSK symbol (2 bits) per active slot:
//!
//! ```text
//! slot      0      1         2          3..4          5..7
//! request   code   userId    reqCount   zero          zero
//! response  code   userId    grant      start hi/lo   zero
//! data      code   destId    senderId   payload in sender's run
//! dealloc   code   userId    zero       zero          zero
//! ```
//!
//! The start slot of a grant is 4 bits wide and is carried as two
//! symbols, high half then low half. A denied grant carries count 0 and
//! the start sentinel [`START_NONE`].
//!
//! ## Example
//!
//! ```rust
//! use olink_core::frame::{self, Frame};
//!
//! let active = frame::access_request(2, 3);
//! assert_eq!(
//!     Frame::decode(&active).unwrap(),
//!     Frame::AccessRequest { user_id: 2, requested: 3 }
//! );
//! ```

use crate::allocator::Lease;
use crate::qpsk;
use crate::types::{IQSample, LinkError, LinkResult};
use crate::ACTIVE_BINS;

/// Slot carrying the control code.
pub const SLOT_CTRL: usize = 0;
/// Slot carrying the first identifying field (user or destination id).
pub const SLOT_FIELD_A: usize = 1;
/// Slot carrying the second identifying field (count or sender id).
pub const SLOT_FIELD_B: usize = 2;
/// Slot carrying the high two bits of a grant's start slot.
pub const SLOT_START_HI: usize = 3;
/// Slot carrying the low two bits of a grant's start slot.
pub const SLOT_START_LO: usize = 4;

/// 4-bit start value signalling "no run granted".
pub const START_NONE: u8 = 0xF;

/// The four control codes of the 2-bit code space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ControlCode {
    /// Terminal asks the station for a run of bins.
    AccessRequest = 0b00,
    /// Payload transfer, terminal to station or station to terminal.
    DataTx = 0b01,
    /// Station's reply to an access request.
    Response = 0b10,
    /// Terminal's release of its run.
    Deallocate = 0b11,
}

impl TryFrom<u8> for ControlCode {
    type Error = LinkError;

    fn try_from(value: u8) -> LinkResult<Self> {
        match value {
            0b00 => Ok(ControlCode::AccessRequest),
            0b01 => Ok(ControlCode::DataTx),
            0b10 => Ok(ControlCode::Response),
            0b11 => Ok(ControlCode::Deallocate),
            other => Err(LinkError::UnknownControlCode(other)),
        }
    }
}

/// A decoded control frame. Data payloads are not part of the header;
/// they are read separately against the sender's lease with
/// [`read_payload`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frame {
    AccessRequest { user_id: u8, requested: u8 },
    DataTx { dest: u8, sender: u8 },
    Response { user_id: u8, granted: u8, start: u8 },
    Deallocate { user_id: u8 },
}

impl Frame {
    /// Decode the header fields of an active-slot block.
    ///
    /// Returns `LinkError::InvalidLength` unless
    /// `active.len() == ACTIVE_BINS`.
    pub fn decode(active: &[IQSample]) -> LinkResult<Frame> {
        if active.len() != ACTIVE_BINS {
            return Err(LinkError::InvalidLength {
                expected: ACTIVE_BINS,
                actual: active.len(),
            });
        }
        // A demodulated value is always in the 2-bit space, so every
        // block maps onto one of the four codes.
        let code = ControlCode::try_from(read_field(active, SLOT_CTRL))?;
        Ok(match code {
            ControlCode::AccessRequest => Frame::AccessRequest {
                user_id: read_field(active, SLOT_FIELD_A),
                requested: read_field(active, SLOT_FIELD_B),
            },
            ControlCode::DataTx => Frame::DataTx {
                dest: read_field(active, SLOT_FIELD_A),
                sender: read_field(active, SLOT_FIELD_B),
            },
            ControlCode::Response => Frame::Response {
                user_id: read_field(active, SLOT_FIELD_A),
                granted: read_field(active, SLOT_FIELD_B),
                start: read_start(active),
            },
            ControlCode::Deallocate => Frame::Deallocate {
                user_id: read_field(active, SLOT_FIELD_A),
            },
        })
    }
}

/// An active block filled with the zero symbol, the padding used by
/// terminal-built frames.
pub fn padded_block() -> Vec<IQSample> {
    vec![qpsk::zero_symbol(); ACTIVE_BINS]
}

/// An active block of complex zeros, the base of station-forwarded
/// data frames.
pub fn zero_block() -> Vec<IQSample> {
    vec![IQSample::new(0.0, 0.0); ACTIVE_BINS]
}

/// Demodulate the 2-bit value in one slot.
pub fn read_field(active: &[IQSample], slot: usize) -> u8 {
    qpsk::demodulate_value(active[slot])
}

/// Modulate the low two bits of `value` into one slot.
pub fn write_field(active: &mut [IQSample], slot: usize, value: u8) {
    active[slot] = qpsk::modulate_value(value & 0x3);
}

/// Reassemble the 4-bit start slot from its two symbols.
pub fn read_start(active: &[IQSample]) -> u8 {
    (read_field(active, SLOT_START_HI) << 2) | read_field(active, SLOT_START_LO)
}

/// Split the low four bits of `start` across the two start slots.
pub fn write_start(active: &mut [IQSample], start: u8) {
    let start = start & START_NONE;
    write_field(active, SLOT_START_HI, start >> 2);
    write_field(active, SLOT_START_LO, start);
}

/// Read a payload out of a leased run, most significant symbol first.
pub fn read_payload(active: &[IQSample], lease: Lease) -> u32 {
    let mut payload = 0u32;
    for slot in lease.start..lease.start + lease.count {
        payload = (payload << 2) | u32::from(read_field(active, slot));
    }
    payload
}

/// Write a payload into a leased run, most significant symbol first.
/// Bits beyond the run's capacity are dropped; unused high positions
/// of the run carry the zero symbol.
pub fn write_payload(active: &mut [IQSample], lease: Lease, payload: u32) {
    let payload = payload & lease.max_payload();
    for i in 0..lease.count {
        let shift = 2 * (lease.count - 1 - i);
        write_field(active, lease.start + i, ((payload >> shift) & 0x3) as u8);
    }
}

/// Terminal-built request for `requested` bins.
pub fn access_request(user_id: u8, requested: u8) -> Vec<IQSample> {
    let mut active = padded_block();
    write_field(&mut active, SLOT_CTRL, ControlCode::AccessRequest as u8);
    write_field(&mut active, SLOT_FIELD_A, user_id);
    write_field(&mut active, SLOT_FIELD_B, requested);
    active
}

/// Station-built grant reply. A denial carries `granted == 0` and
/// `start == START_NONE`.
pub fn response(user_id: u8, granted: u8, start: u8) -> Vec<IQSample> {
    let mut active = padded_block();
    write_field(&mut active, SLOT_CTRL, ControlCode::Response as u8);
    write_field(&mut active, SLOT_FIELD_A, user_id);
    write_field(&mut active, SLOT_FIELD_B, granted);
    write_start(&mut active, start);
    active
}

/// Terminal-built release request. The station acknowledges it with a
/// zero-grant [`response`].
pub fn deallocate(user_id: u8) -> Vec<IQSample> {
    let mut active = padded_block();
    write_field(&mut active, SLOT_CTRL, ControlCode::Deallocate as u8);
    write_field(&mut active, SLOT_FIELD_A, user_id);
    active
}

/// Header of a data frame over the given base block. The payload is
/// written separately against a lease.
pub fn data_header(mut active: Vec<IQSample>, dest: u8, sender: u8) -> Vec<IQSample> {
    write_field(&mut active, SLOT_CTRL, ControlCode::DataTx as u8);
    write_field(&mut active, SLOT_FIELD_A, dest);
    write_field(&mut active, SLOT_FIELD_B, sender);
    active
}
