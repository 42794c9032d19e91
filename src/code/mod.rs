
use std::path::Path;

use num_complex::Complex;

use crate::RangingErr;
use crate::fourier_analysis::{Direction, FFT};

pub mod lfsr;

/// The chips of a ranging code, one 0/1 value per chip
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChipSequence {
	chips: Vec<u8>,
}

impl ChipSequence {

	pub fn from_bytes(chips:Vec<u8>) -> Result<Self, RangingErr> {
		if chips.is_empty() {
			Err(RangingErr::CodeLoad("Code contains no chips"))
		} else if chips.iter().any(|c| *c > 1) {
			Err(RangingErr::CodeLoad("Code contains values other than 0 and 1"))
		} else {
			Ok(ChipSequence { chips })
		}
	}

	pub fn load<P: AsRef<Path>>(path:P) -> Result<Self, RangingErr> {
		crate::io::read_code_file(path)
	}

	pub fn len(&self) -> usize { self.chips.len() }

	pub fn is_empty(&self) -> bool { self.chips.is_empty() }

	pub fn as_bytes(&self) -> &[u8] { &self.chips }

	pub fn count_ones(&self) -> usize { self.chips.iter().filter(|c| **c == 1).count() }

}

/// Each chip repeated `oversampling` times and mapped 0 => -1.0, 1 => +1.0
#[derive(Debug, Clone)]
pub struct CodeReplica {
	pub oversampling:usize,
	samples:Vec<f64>,
}

impl CodeReplica {

	pub fn new(chips:&ChipSequence, oversampling:usize) -> Result<Self, RangingErr> {
		if oversampling == 0 {
			return Err(RangingErr::Configuration("Oversampling factor must be at least 1"));
		}

		let samples:Vec<f64> = chips.as_bytes().iter()
			.flat_map(|c| std::iter::repeat(2.0 * (*c as f64) - 1.0).take(oversampling))
			.collect();

		Ok(CodeReplica { oversampling, samples })
	}

	pub fn len(&self) -> usize { self.samples.len() }

	pub fn is_empty(&self) -> bool { self.samples.is_empty() }

	pub fn samples(&self) -> &[f64] { &self.samples }

	pub fn to_complex(&self) -> Vec<Complex<f64>> {
		self.samples.iter().map(|x| Complex{ re: *x, im: 0.0 }).collect()
	}

	/// Each replica sample repeated `factor` times, matching a correlation upsampled by `factor`
	pub fn repeated(&self, factor:usize) -> Vec<f64> {
		self.samples.iter().flat_map(|x| std::iter::repeat(*x).take(factor)).collect()
	}

}

/// Complex conjugate of the DFT of a CodeReplica
#[derive(Debug, Clone)]
pub struct CodeKernel {
	conj_spectrum:Vec<Complex<f64>>,
}

impl CodeKernel {

	pub fn new(replica:&CodeReplica) -> Self {
		let fwd = FFT::new(replica.len(), Direction::Forward);
		let conj_spectrum:Vec<Complex<f64>> = fwd.execute(&replica.to_complex()).into_iter().map(|x| x.conj()).collect();
		CodeKernel { conj_spectrum }
	}

	pub fn len(&self) -> usize { self.conj_spectrum.len() }

	pub fn is_empty(&self) -> bool { self.conj_spectrum.is_empty() }

	pub fn as_slice(&self) -> &[Complex<f64>] { &self.conj_spectrum }

}

/// Everything derived from the code file once at start-up
#[derive(Debug, Clone)]
pub struct ReferenceCode {
	pub chips:ChipSequence,
	pub replica:CodeReplica,
	pub kernel:CodeKernel,
}

impl ReferenceCode {

	pub fn new(chips:ChipSequence, oversampling:usize) -> Result<Self, RangingErr> {
		let replica = CodeReplica::new(&chips, oversampling)?;
		let kernel = CodeKernel::new(&replica);
		Ok(ReferenceCode { chips, replica, kernel })
	}

	pub fn load<P: AsRef<Path>>(path:P, oversampling:usize) -> Result<Self, RangingErr> {
		Self::new(ChipSequence::load(path)?, oversampling)
	}

	/// Block length N in samples
	pub fn len(&self) -> usize { self.replica.len() }

	pub fn is_empty(&self) -> bool { self.replica.is_empty() }

}
