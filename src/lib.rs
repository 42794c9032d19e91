
pub mod acquisition;
pub mod code;
pub mod filters;
pub mod fourier_analysis;
pub mod io;
pub mod ranging;
pub mod snr;
pub mod synth;

pub mod utils;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum RangingErr {
	Configuration(&'static str),
	CodeLoad(&'static str),
	Io(&'static str),
	Worker(&'static str),
	CorrectionUndefined,
	DegenerateVariance,
}

impl std::fmt::Display for RangingErr {

	fn fmt(&self, f:&mut std::fmt::Formatter) -> std::fmt::Result {
		match self {
			Self::Configuration(msg) => write!(f, "Configuration error: {}", msg),
			Self::CodeLoad(msg)      => write!(f, "Unable to load code: {}", msg),
			Self::Io(msg)            => write!(f, "I/O error: {}", msg),
			Self::Worker(msg)        => write!(f, "Worker failure: {}", msg),
			Self::CorrectionUndefined => write!(f, "Sub-sample correction undefined (flat correlation peak)"),
			Self::DegenerateVariance  => write!(f, "SNR undefined (zero variance after despreading)"),
		}
	}

}

impl std::error::Error for RangingErr {}
