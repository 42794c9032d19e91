
use num_complex::Complex;
use serde::{Serialize, Deserialize};

use crate::RangingErr;
use crate::code::CodeReplica;
use crate::fourier_analysis::{self, FFT};
use crate::utils::{self, rotate_left_by};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SnrEstimate {
	pub snr_real:f64,
	pub snr_imag:f64,
	pub snr_db:f64,
}

/// mean^2 / var of one component of the despread signal.  A component that is identically zero
/// contributes nothing; a non-zero constant has no noise to measure against.
fn component_snr(x:&[f64]) -> Result<f64, RangingErr> {
	let (mean, var) = utils::mean_and_var(x);
	if var > 0.0 {
		Ok(mean * mean / var)
	} else if mean == 0.0 {
		Ok(0.0)
	} else {
		Err(RangingErr::DegenerateVariance)
	}
}

/// Aligns `upsampled` so that index `peak_idx` lands on the first template sample, strips the
/// code by multiplying with the ±1 template and scores the result
pub fn despread_snr(upsampled:&[Complex<f64>], template:&[f64], peak_idx:usize) -> Result<SnrEstimate, RangingErr> {
	let aligned:Vec<Complex<f64>> = rotate_left_by(upsampled, peak_idx);

	let re:Vec<f64> = aligned.iter().zip(template.iter()).map(|(y, c)| y.re * c).collect();
	let im:Vec<f64> = aligned.iter().zip(template.iter()).map(|(y, c)| y.im * c).collect();

	if utils::mean_and_var(&re).1 + utils::mean_and_var(&im).1 == 0.0 {
		return Err(RangingErr::DegenerateVariance);
	}

	let snr_real:f64 = component_snr(&re)?;
	let snr_imag:f64 = component_snr(&im)?;
	Ok(SnrEstimate{ snr_real, snr_imag, snr_db: 10.0 * (snr_real + snr_imag).log10() })
}

/// Correlation quality score, computed on the signal resampled the same way as the correlation
pub struct SnrEstimator {
	nint:usize,
	template:Vec<f64>,
	inv:FFT,
}

impl SnrEstimator {

	/// `inv` is an inverse plan of length (2*nint+1) times the replica length
	pub fn new(replica:&CodeReplica, nint:usize, inv:FFT) -> Self {
		let template:Vec<f64> = replica.repeated(2*nint + 1);
		SnrEstimator{ nint, template, inv }
	}

	pub fn template(&self) -> &[f64] { &self.template }

	/// `signal_freq_domain` is the unshifted spectrum of the (possibly de-rotated) channel samples
	pub fn estimate(&self, signal_freq_domain:&[Complex<f64>], peak_idx:usize) -> Result<SnrEstimate, RangingErr> {
		let upsampled:Vec<Complex<f64>> = fourier_analysis::interpolate_spectrum(signal_freq_domain, self.nint, &self.inv);
		despread_snr(&upsampled, &self.template, peak_idx)
	}

}

#[cfg(test)]
mod tests {

	use super::*;

	fn template(len:usize) -> Vec<f64> {
		(0..len).map(|i| if (i * 7 + 3) % 5 < 2 { 1.0 } else { -1.0 }).collect()
	}

	#[test]
	fn aligned_signal_scores_high() {
		let len:usize = 60;
		let delay:usize = 17;
		let t = template(len);

		// After alignment the despread real part alternates 2.1, 1.9
		let signal:Vec<Complex<f64>> = (0..len).map(|j| {
			let i = (j + len - delay) % len;
			let v = if i % 2 == 0 { 2.1 } else { 1.9 };
			Complex{ re: t[i] * v, im: 0.0 }
		}).collect();

		let est = despread_snr(&signal, &t, delay).unwrap();
		assert!((est.snr_real - 400.0).abs() < 1.0e-6);
		assert_eq!(est.snr_imag, 0.0);
		assert!((est.snr_db - 26.0206).abs() < 1.0e-3);

		// Misaligned by one sample the code no longer strips off
		let off = despread_snr(&signal, &t, delay + 1).unwrap();
		assert!(off.snr_db < est.snr_db - 10.0);
	}

	#[test]
	fn degenerate_inputs() {
		let t = template(20);
		let zeros = vec![Complex{ re: 0.0, im: 0.0 }; 20];
		assert_eq!(despread_snr(&zeros, &t, 0), Err(RangingErr::DegenerateVariance));

		// Despreads to a constant real part with a noisy imaginary part
		let constant:Vec<Complex<f64>> = t.iter().enumerate().map(|(i, c)| Complex{ re: *c, im: (i % 3) as f64 }).collect();
		assert_eq!(despread_snr(&constant, &t, 0), Err(RangingErr::DegenerateVariance));
	}

}
