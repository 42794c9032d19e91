
use std::sync::Arc;

use rustfft::{FFTplanner, FFT as FftAlgorithm};
use num_complex::Complex;
use num_traits::Zero;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
	Forward,
	Inverse,
}

/// A planned transform of a fixed length.  Inverse transforms are normalized by 1/n so that a
/// forward transform followed by an inverse transform returns the original sequence.
#[derive(Clone)]
pub struct FFT {
	n: usize,
	direction: Direction,
	plan: Arc<dyn FftAlgorithm<f64>>,
}

impl FFT {

	pub fn new(n:usize, direction:Direction) -> Self {
		let mut planner = FFTplanner::new(direction == Direction::Inverse);
		let plan = planner.plan_fft(n);
		FFT { n, direction, plan }
	}

	pub fn len(&self) -> usize { self.n }

	pub fn direction(&self) -> Direction { self.direction }

	pub fn execute(&self, x:&[Complex<f64>]) -> Vec<Complex<f64>> {
		assert_eq!(x.len(), self.n, "Wrong-sized input for FFT");

		// rustfft uses the input as scratch space, so work on a copy
		let mut input:Vec<Complex<f64>> = x.to_vec();
		let mut output:Vec<Complex<f64>> = vec![Complex::zero(); self.n];
		self.plan.process(&mut input, &mut output);

		match self.direction {
			Direction::Forward => output,
			Direction::Inverse => {
				let scale:f64 = 1.0 / (self.n as f64);
				output.into_iter().map(|c| c * scale).collect()
			}
		}
	}

}

/// Moves the zero-frequency bin to the center; element i lands at (i + n/2) mod n
pub fn fftshift<T: Copy>(x:&[T]) -> Vec<T> {
	let mut ans:Vec<T> = x.to_vec();
	ans.rotate_right(x.len() / 2);
	ans
}

/// Inverse of `fftshift`, moving the center bin back to index zero.  The two differ for odd lengths.
pub fn ifftshift<T: Copy>(x:&[T]) -> Vec<T> {
	let mut ans:Vec<T> = x.to_vec();
	ans.rotate_left(x.len() / 2);
	ans
}

/// Resamples a length-n time sequence at (2*nint+1) times its native rate by padding its spectrum.
///
/// The spectrum is centered, `nint*n` zero bins are prepended and appended, and the padded
/// spectrum is shifted back so that time zero stays at index zero.  `spectrum` is the unshifted
/// forward transform of the sequence and `inv` must be an inverse plan of length (2*nint+1)*n.
pub fn interpolate_spectrum(spectrum:&[Complex<f64>], nint:usize, inv:&FFT) -> Vec<Complex<f64>> {
	let n:usize = spectrum.len();
	let n_pad:usize = nint * n;

	let mut padded:Vec<Complex<f64>> = Vec::with_capacity(n + 2*n_pad);
	padded.extend(std::iter::repeat(Complex::zero()).take(n_pad));
	padded.extend(fftshift(spectrum));
	padded.extend(std::iter::repeat(Complex::zero()).take(n_pad));

	inv.execute(&ifftshift(&padded))
}

/// Physical frequencies of the bins of a centered (fftshift-ed) length-n spectrum
#[derive(Debug, Clone)]
pub struct FrequencyGrid {
	pub fs:f64,
	pub resolution_hz:f64,
	freqs:Vec<f64>,
}

impl FrequencyGrid {

	pub fn new(fs:f64, n:usize) -> Self {
		let resolution_hz:f64 = fs / (n as f64);
		let start:f64 = -((n / 2) as f64) * resolution_hz;
		let freqs:Vec<f64> = (0..n).map(|k| start + (k as f64) * resolution_hz).collect();
		FrequencyGrid { fs, resolution_hz, freqs }
	}

	pub fn len(&self) -> usize { self.freqs.len() }

	pub fn freq_hz(&self, bin:usize) -> f64 { self.freqs[bin] }

	pub fn iter(&self) -> impl Iterator<Item = &f64> { self.freqs.iter() }

}
