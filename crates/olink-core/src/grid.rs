//! Frequency Grid - Active Bin Placement
//!
//! The link only occupies [`ACTIVE_BINS`](crate::ACTIVE_BINS) of the
//! [`FFT_SIZE`](crate::FFT_SIZE) frequency bins, spaced
//! [`BIN_SPACING`](crate::BIN_SPACING) apart: active slot `k` lives at
//! absolute bin `k * BIN_SPACING`. [`project`] scatters a block of
//! active symbols onto the full grid (all other bins zero) and
//! [`extract`] gathers them back, so `extract(project(x)) == x`.

use crate::types::{IQSample, LinkError, LinkResult};
use crate::{ACTIVE_BINS, BIN_SPACING, FFT_SIZE};

/// Place `ACTIVE_BINS` symbols onto a zeroed `FFT_SIZE` spectrum.
///
/// Returns `LinkError::InvalidLength` unless
/// `active.len() == ACTIVE_BINS`.
pub fn project(active: &[IQSample]) -> LinkResult<Vec<IQSample>> {
    if active.len() != ACTIVE_BINS {
        return Err(LinkError::InvalidLength {
            expected: ACTIVE_BINS,
            actual: active.len(),
        });
    }
    let mut full = vec![IQSample::new(0.0, 0.0); FFT_SIZE];
    for (slot, symbol) in active.iter().enumerate() {
        full[slot * BIN_SPACING] = *symbol;
    }
    Ok(full)
}

/// Gather the `ACTIVE_BINS` occupied bins out of a full spectrum.
///
/// Returns `LinkError::InvalidLength` unless
/// `full.len() == FFT_SIZE`.
pub fn extract(full: &[IQSample]) -> LinkResult<Vec<IQSample>> {
    if full.len() != FFT_SIZE {
        return Err(LinkError::InvalidLength {
            expected: FFT_SIZE,
            actual: full.len(),
        });
    }
    Ok((0..ACTIVE_BINS)
        .map(|slot| full[slot * BIN_SPACING])
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qpsk;

    #[test]
    fn test_project_places_at_spaced_bins() {
        let active: Vec<IQSample> = (0..ACTIVE_BINS)
            .map(|slot| IQSample::new(slot as f64, -(slot as f64)))
            .collect();
        let full = project(&active).unwrap();
        assert_eq!(full.len(), FFT_SIZE);
        for (bin, sample) in full.iter().enumerate() {
            if bin % BIN_SPACING == 0 {
                let slot = bin / BIN_SPACING;
                assert_eq!(*sample, active[slot]);
            } else {
                assert_eq!(*sample, IQSample::new(0.0, 0.0));
            }
        }
    }

    #[test]
    fn test_extract_inverts_project() {
        let active: Vec<IQSample> = (0..ACTIVE_BINS as u8).map(qpsk::modulate_value).collect();
        let full = project(&active).unwrap();
        assert_eq!(extract(&full).unwrap(), active);
    }

    #[test]
    fn test_length_validation() {
        let short = vec![IQSample::new(0.0, 0.0); ACTIVE_BINS - 1];
        assert!(matches!(
            project(&short),
            Err(LinkError::InvalidLength { expected, .. }) if expected == ACTIVE_BINS
        ));
        let long = vec![IQSample::new(0.0, 0.0); FFT_SIZE + 1];
        assert!(matches!(
            extract(&long),
            Err(LinkError::InvalidLength { expected, .. }) if expected == FFT_SIZE
        ));
    }
}
