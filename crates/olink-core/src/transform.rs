//! Transform Engine - Radix-2 FFT/IFFT
//!
//! Recursive decimation-in-time Cooley-Tukey transform over fixed
//! 64-sample blocks. The forward transform maps a time-domain waveform
//! to the frequency grid; the inverse is computed as
//! `conj(FFT(conj(x))) / n`, which gives the unscaled-forward /
//! 1/n-inverse convention: `inverse(forward(x)) == x`.
//!
//! Both entry points reject any block whose length is not exactly
//! [`FFT_SIZE`](crate::FFT_SIZE). The interior recursion assumes a
//! power-of-two length and is kept private.
//!
//! ## Example
//!
//! ```rust
//! use olink_core::{transform, IQSample, FFT_SIZE};
//!
//! let mut time = vec![IQSample::new(0.0, 0.0); FFT_SIZE];
//! time[0] = IQSample::new(1.0, 0.0);
//!
//! // An impulse has a flat spectrum.
//! let freq = transform::forward(&time).unwrap();
//! assert!(freq.iter().all(|s| (s.re - 1.0).abs() < 1e-12));
//!
//! let back = transform::inverse(&freq).unwrap();
//! assert!((back[0].re - 1.0).abs() < 1e-12);
//! ```

use std::f64::consts::PI;

use crate::types::{IQSample, LinkError, LinkResult};
use crate::FFT_SIZE;

/// Forward transform: time domain to frequency domain.
///
/// Returns `LinkError::InvalidLength` unless `input.len() == FFT_SIZE`.
pub fn forward(input: &[IQSample]) -> LinkResult<Vec<IQSample>> {
    check_block(input)?;
    Ok(radix2(input))
}

/// Inverse transform: frequency domain to time domain.
///
/// Implemented by conjugating, running the forward recursion, then
/// conjugating and scaling by `1/n`.
///
/// Returns `LinkError::InvalidLength` unless `input.len() == FFT_SIZE`.
pub fn inverse(input: &[IQSample]) -> LinkResult<Vec<IQSample>> {
    check_block(input)?;
    let conjugated: Vec<IQSample> = input.iter().map(|s| s.conj()).collect();
    let transformed = radix2(&conjugated);
    let n = input.len() as f64;
    Ok(transformed.into_iter().map(|s| s.conj() / n).collect())
}

fn check_block(input: &[IQSample]) -> LinkResult<()> {
    if input.len() != FFT_SIZE {
        return Err(LinkError::InvalidLength {
            expected: FFT_SIZE,
            actual: input.len(),
        });
    }
    Ok(())
}

/// Recursive radix-2 decimation in time. `input.len()` must be a power
/// of two; the public wrappers guarantee this.
fn radix2(input: &[IQSample]) -> Vec<IQSample> {
    let n = input.len();
    if n <= 1 {
        return input.to_vec();
    }

    let even: Vec<IQSample> = input.iter().step_by(2).copied().collect();
    let odd: Vec<IQSample> = input.iter().skip(1).step_by(2).copied().collect();
    let even_out = radix2(&even);
    let odd_out = radix2(&odd);

    let mut output = vec![IQSample::new(0.0, 0.0); n];
    for k in 0..n / 2 {
        let twiddle = IQSample::from_polar(1.0, -2.0 * PI * k as f64 / n as f64);
        let t = twiddle * odd_out[k];
        output[k] = even_out[k] + t;
        output[k + n / 2] = even_out[k] - t;
    }
    output
}
