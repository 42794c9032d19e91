
use std::f64::consts;

use num_complex::Complex;

use crate::RangingErr;
use crate::fourier_analysis::{self, Direction, FrequencyGrid, FFT};
use crate::utils;

/// Bins of a centered spectrum that fall strictly inside the squared search window
/// (2*(foffset - frange), 2*(foffset + frange)).  Squaring a PSK carrier doubles its frequency,
/// so the window is doubled too.
#[derive(Debug, Clone)]
pub struct SearchMask {
	bins:Vec<usize>,
}

impl SearchMask {

	pub fn new(grid:&FrequencyGrid, foffset_hz:f64, frange_hz:f64) -> Result<Self, RangingErr> {
		if !(frange_hz > 0.0) {
			return Err(RangingErr::Configuration("Frequency search half-width must be positive"));
		}

		let lo:f64 = 2.0 * (foffset_hz - frange_hz);
		let hi:f64 = 2.0 * (foffset_hz + frange_hz);
		let bins:Vec<usize> = grid.iter().enumerate()
			.filter(|(_, f)| **f > lo && **f < hi)
			.map(|(k, _)| k)
			.collect();

		if bins.is_empty() {
			Err(RangingErr::Configuration("Frequency search window contains no bins"))
		} else {
			Ok(SearchMask { bins })
		}
	}

	pub fn len(&self) -> usize { self.bins.len() }

	pub fn is_empty(&self) -> bool { self.bins.is_empty() }

	pub fn bins(&self) -> &[usize] { &self.bins }

}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrequencyEstimate {
	/// Bin of the centered spectrum of the squared samples
	pub bin:usize,
	/// Frequency of the squared-signal tone, twice the carrier offset
	pub squared_freq_hz:f64,
	pub freq_hz:f64,
	pub magnitude:f64,
}

/// Residual carrier estimation by squaring: a BPSK carrier squared loses its ±1 modulation and
/// leaves a tone at twice the carrier offset.
pub struct FrequencyEstimator {
	grid:FrequencyGrid,
	mask:SearchMask,
	fwd:FFT,
}

impl FrequencyEstimator {

	pub fn new(fs:f64, n:usize, foffset_hz:f64, frange_hz:f64) -> Result<Self, RangingErr> {
		let grid = FrequencyGrid::new(fs, n);
		let mask = SearchMask::new(&grid, foffset_hz, frange_hz)?;
		let fwd = FFT::new(n, Direction::Forward);
		Ok(FrequencyEstimator { grid, mask, fwd })
	}

	pub fn grid(&self) -> &FrequencyGrid { &self.grid }

	pub fn mask(&self) -> &SearchMask { &self.mask }

	pub fn estimate(&self, samples:&[Complex<f64>]) -> FrequencyEstimate {
		let squared:Vec<Complex<f64>> = samples.iter().map(|x| x*x).collect();
		let spectrum:Vec<Complex<f64>> = fourier_analysis::fftshift(&self.fwd.execute(&squared));

		// The mask is in ascending bin order, so the first maximum is also the lowest bin
		let best:usize = utils::first_argmax(self.mask.bins().iter().map(|k| spectrum[*k].norm())).unwrap_or(0);
		let bin:usize = self.mask.bins()[best];

		let squared_freq_hz:f64 = self.grid.freq_hz(bin);
		FrequencyEstimate { bin, squared_freq_hz, freq_hz: squared_freq_hz / 2.0, magnitude: spectrum[bin].norm() }
	}

}

/// Wipes a carrier at `freq_hz` off the samples, multiplying sample i by exp(-j*2*pi*freq_hz*i/fs)
pub fn derotate(samples:&[Complex<f64>], freq_hz:f64, fs:f64) -> Vec<Complex<f64>> {
	let phase_step_rad:f64 = (-2.0 * consts::PI * freq_hz) / fs;
	samples.iter().enumerate().map(|(idx, x)| {
		let phase = phase_step_rad * (idx as f64);
		x * Complex{ re: phase.cos(), im: phase.sin() }
	}).collect()
}
