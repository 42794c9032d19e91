
use rand::Rng;
use rand_distr::{Distribution, Normal};
use num_complex::Complex;

use crate::RangingErr;
use crate::acquisition::derotate;
use crate::code::CodeReplica;
use crate::utils::rotate_left_by;

/// The replica circularly delayed by `delay` samples, scaled by `amplitude` and placed on a
/// carrier at `freq_hz`
pub fn delayed_replica(replica:&CodeReplica, delay:usize, freq_hz:f64, fs:f64, amplitude:f64) -> Vec<Complex<f64>> {
	let n:usize = replica.len();
	let delayed:Vec<Complex<f64>> = rotate_left_by(&replica.to_complex(), n - (delay % n));
	derotate(&delayed, -freq_hz, fs).into_iter().map(|x| x * amplitude).collect()
}

/// Adds independent Gaussian noise with standard deviation `std_dev` to I and Q
pub fn add_noise<R: Rng>(x:&mut [Complex<f64>], std_dev:f64, rng:&mut R) -> Result<(), RangingErr> {
	if std_dev == 0.0 { return Ok(()); }
	let normal = Normal::new(0.0, std_dev).map_err(|_| RangingErr::Configuration("Noise standard deviation must be non-negative"))?;
	for c in x.iter_mut() {
		c.re += normal.sample(rng);
		c.im += normal.sample(rng);
	}
	Ok(())
}

#[cfg(test)]
mod tests {

	use rand::SeedableRng;
	use rand::rngs::StdRng;

	use super::*;
	use crate::code::ChipSequence;

	#[test]
	fn delay_and_scale() {
		let chips = ChipSequence::from_bytes(vec![1, 0, 0]).unwrap();
		let replica = CodeReplica::new(&chips, 1).unwrap();
		let x = delayed_replica(&replica, 1, 0.0, 1.0, 2.0);
		let re:Vec<f64> = x.iter().map(|c| c.re).collect();
		assert_eq!(re, vec![-2.0, 2.0, -2.0]);
	}

	#[test]
	fn noise_has_requested_spread() {
		let mut x = vec![Complex{ re: 0.0, im: 0.0 }; 20000];
		let mut rng = StdRng::seed_from_u64(7);
		add_noise(&mut x, 3.0, &mut rng).unwrap();

		let var:f64 = x.iter().map(|c| c.re * c.re).sum::<f64>() / (x.len() as f64);
		assert!((var.sqrt() - 3.0).abs() < 0.1);
		assert!(add_noise(&mut x, -1.0, &mut rng).is_err());
	}

}
