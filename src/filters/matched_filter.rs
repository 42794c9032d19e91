use num_complex::Complex;

use crate::RangingErr;
use crate::code::CodeKernel;
use crate::fourier_analysis::{self, Direction, FFT};
use crate::utils;

/// Circular correlation against a code kernel, with the result resampled at (2*nint+1) times the
/// input rate by zero-padding the cross-power spectrum
pub struct MatchedFilter {
	n: usize,
	nint: usize,
	fwd:  FFT,
	inv: FFT,
	waveform_freq_domain_conj: Vec<Complex<f64>>,
	filter_power: f64,
}

impl MatchedFilter {

	pub fn new(kernel:&CodeKernel, nint:usize) -> Self {
		let n = kernel.len();
		let fwd = FFT::new(n, Direction::Forward);
		let inv = FFT::new((2*nint + 1) * n, Direction::Inverse);

		let waveform_freq_domain_conj:Vec<Complex<f64>> = kernel.as_slice().to_vec();

		// Parseval: the time-domain energy of the waveform
		let filter_power:f64 = waveform_freq_domain_conj.iter().map(|x| x.norm_sqr()).sum::<f64>() / (n as f64);

		MatchedFilter { n, nint, fwd, inv, waveform_freq_domain_conj, filter_power }
	}

	pub fn len(&self) -> usize {
		self.n
	}

	pub fn is_empty(&self) -> bool {
		self.n == 0
	}

	/// Factor between the correlation index space and the input sample index space
	pub fn upsampling(&self) -> usize {
		2*self.nint + 1
	}

	/// Inverse plan of the upsampled length, shared with anything that resamples the same way
	pub fn inverse_plan(&self) -> &FFT {
		&self.inv
	}

	pub fn apply(&self, signal_time_domain:&[Complex<f64>]) -> Result<MatchedFilterResponse, RangingErr> {
		if signal_time_domain.len() != self.n {
			Err(RangingErr::Configuration("Wrong-sized input for matched filter"))
		} else {
			let signal_power:f64 = signal_time_domain.iter().map(|x| x.norm_sqr()).sum();

			let signal_freq_domain:Vec<Complex<f64>> = self.fwd.execute(signal_time_domain);

			let correlation_freq_domain:Vec<Complex<f64>> = signal_freq_domain.iter().zip(self.waveform_freq_domain_conj.iter()).map(|(a,b)| a*b).collect();
			let correlation_time_domain:Vec<Complex<f64>> = fourier_analysis::interpolate_spectrum(&correlation_freq_domain, self.nint, &self.inv);

			Ok(MatchedFilterResponse{ signal_freq_domain, correlation_time_domain, upsampling: self.upsampling(), signal_power, filter_power: self.filter_power })
		}
	}

}

pub struct MatchedFilterResponse {
	/// Unshifted spectrum of the filtered signal
	pub signal_freq_domain: Vec<Complex<f64>>,
	pub correlation_time_domain: Vec<Complex<f64>>,
	pub upsampling: usize,
	pub signal_power: f64,
	pub filter_power: f64,
}

/// The correlation maximum and its two circular neighbors
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CorrelationPeak {
	pub idx: usize,
	pub prev: Complex<f64>,
	pub val: Complex<f64>,
	pub next: Complex<f64>,
}

impl MatchedFilterResponse {

	pub fn len(&self) -> usize {
		self.correlation_time_domain.len()
	}

	pub fn is_empty(&self) -> bool {
		self.correlation_time_domain.is_empty()
	}

	/// Normalized correlation, 1.0 for a noiseless copy of the waveform
	pub fn test_stat_at_idx(&self, k:usize) -> f64 {
		let unnormalized:f64 = self.correlation_time_domain[k].norm_sqr() * (self.upsampling * self.upsampling) as f64;
		unnormalized / (self.signal_power * self.filter_power)
	}

	/// First maximum of the correlation magnitude.  Neighbors wrap around the ends of the buffer.
	pub fn peak(&self) -> CorrelationPeak {
		let len:usize = self.len();
		let idx:usize = utils::first_argmax(self.correlation_time_domain.iter().map(|c| c.norm())).unwrap_or(0);

		CorrelationPeak {
			idx,
			prev: self.correlation_time_domain[(idx + len - 1) % len],
			val:  self.correlation_time_domain[idx],
			next: self.correlation_time_domain[(idx + 1) % len],
		}
	}

}

#[cfg(test)]
mod tests {

	use super::*;
	use crate::code::{ReferenceCode, lfsr::Lfsr};
	use crate::utils::rotate_left_by;

	fn reference() -> ReferenceCode {
		let chips = Lfsr::new(10, (1 << 2) | (1 << 9), 1).unwrap().generate(1024).unwrap();
		ReferenceCode::new(chips, 2).unwrap()
	}

	fn delayed(code:&ReferenceCode, delay:usize) -> Vec<Complex<f64>> {
		let n = code.len();
		rotate_left_by(&code.replica.to_complex(), n - (delay % n))
	}

	#[test]
	fn peak_at_injected_delay() {
		let code = reference();
		let mf = MatchedFilter::new(&code.kernel, 1);

		for delay in &[0, 1, 37, 1000, 2047] {
			let response = mf.apply(&delayed(&code, *delay)).unwrap();
			assert_eq!(response.len(), 3 * code.len());

			let peak = response.peak();
			assert_eq!(peak.idx, 3 * delay);
			assert!((response.test_stat_at_idx(peak.idx) - 1.0).abs() < 1.0e-6);
		}
	}

	#[test]
	fn neighbors_wrap_at_zero() {
		let code = reference();
		let mf = MatchedFilter::new(&code.kernel, 1);
		let response = mf.apply(&delayed(&code, 0)).unwrap();

		let peak = response.peak();
		assert_eq!(peak.idx, 0);
		assert_eq!(peak.prev, response.correlation_time_domain[response.len() - 1]);
		assert_eq!(peak.next, response.correlation_time_domain[1]);
		// The main lobe is symmetric
		assert!((peak.prev.norm() - peak.next.norm()).abs() < 1.0e-6 * peak.val.norm());
	}

	#[test]
	fn wrong_size_is_rejected() {
		let code = reference();
		let mf = MatchedFilter::new(&code.kernel, 1);
		assert!(mf.apply(&[Complex{ re: 1.0, im: 0.0 }; 16]).is_err());
	}

}
