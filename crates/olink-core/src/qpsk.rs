//! QPSK Mapper - Bit-Pair to Symbol Conversion
//!
//! Unit-energy QPSK with 1/sqrt(2) per axis. The first bit selects the
//! sign of the real axis, the second the sign of the imaginary axis,
//! and a 0 bit maps to the positive half:
//!
//! ```text
//! (0,0) -> (+A, +A)      (0,1) -> (+A, -A)
//! (1,0) -> (-A, +A)      (1,1) -> (-A, -A)      A = 1/sqrt(2)
//! ```
//!
//! This is a direct sign mapping, not a Gray code. Demodulation is a
//! hard decision per axis: a bit is 1 only when its axis is strictly
//! negative, so a zeroed axis decodes to 0.
//!
//! ## Example
//!
//! ```rust
//! use olink_core::qpsk;
//!
//! let symbol = qpsk::modulate(1, 0);
//! assert!(symbol.re < 0.0 && symbol.im > 0.0);
//! assert_eq!(qpsk::demodulate(symbol), (1, 0));
//! assert_eq!(qpsk::demodulate_value(qpsk::modulate_value(0b10)), 0b10);
//! ```

use crate::types::IQSample;

/// Per-axis amplitude, giving unit symbol energy.
pub const AXIS_AMPLITUDE: f64 = std::f64::consts::FRAC_1_SQRT_2;

/// Map a bit pair to a QPSK symbol. Any nonzero bit value is treated
/// as 1.
pub fn modulate(bit0: u8, bit1: u8) -> IQSample {
    let re = if bit0 == 0 {
        AXIS_AMPLITUDE
    } else {
        -AXIS_AMPLITUDE
    };
    let im = if bit1 == 0 {
        AXIS_AMPLITUDE
    } else {
        -AXIS_AMPLITUDE
    };
    IQSample::new(re, im)
}

/// Hard-decision demodulation of one symbol back to a bit pair.
pub fn demodulate(symbol: IQSample) -> (u8, u8) {
    let bit0 = if symbol.re < 0.0 { 1 } else { 0 };
    let bit1 = if symbol.im < 0.0 { 1 } else { 0 };
    (bit0, bit1)
}

/// Map the low two bits of `value` to a symbol, most significant bit
/// on the real axis.
pub fn modulate_value(value: u8) -> IQSample {
    modulate((value >> 1) & 0x1, value & 0x1)
}

/// Demodulate one symbol to a 2-bit value in `0..=3`.
pub fn demodulate_value(symbol: IQSample) -> u8 {
    let (bit0, bit1) = demodulate(symbol);
    (bit0 << 1) | bit1
}

/// The symbol carrying the value 0, used to pad unused slots.
pub fn zero_symbol() -> IQSample {
    modulate(0, 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constellation_signs() {
        assert_eq!(modulate(0, 0), IQSample::new(AXIS_AMPLITUDE, AXIS_AMPLITUDE));
        assert_eq!(modulate(0, 1), IQSample::new(AXIS_AMPLITUDE, -AXIS_AMPLITUDE));
        assert_eq!(modulate(1, 0), IQSample::new(-AXIS_AMPLITUDE, AXIS_AMPLITUDE));
        assert_eq!(
            modulate(1, 1),
            IQSample::new(-AXIS_AMPLITUDE, -AXIS_AMPLITUDE)
        );
    }

    #[test]
    fn test_unit_energy() {
        for value in 0..4u8 {
            let symbol = modulate_value(value);
            assert!((symbol.norm() - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_round_trip_all_pairs() {
        for bit0 in 0..2u8 {
            for bit1 in 0..2u8 {
                assert_eq!(demodulate(modulate(bit0, bit1)), (bit0, bit1));
            }
        }
        for value in 0..4u8 {
            assert_eq!(demodulate_value(modulate_value(value)), value);
        }
    }

    #[test]
    fn test_zero_axis_decodes_to_zero() {
        // Hard decision is strict: exactly 0.0 on an axis is not
        // negative, so it yields bit 0.
        assert_eq!(demodulate(IQSample::new(0.0, 0.0)), (0, 0));
        assert_eq!(demodulate(IQSample::new(-0.3, 0.0)), (1, 0));
    }

    #[test]
    fn test_noisy_symbols_within_quadrant() {
        let symbol = modulate(1, 1) + IQSample::new(-0.2, -0.1);
        assert_eq!(demodulate(symbol), (1, 1));
    }

    #[test]
    fn test_value_masks_high_bits() {
        assert_eq!(demodulate_value(modulate_value(0b111)), 0b11);
    }
}
