use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Serialize, Deserialize};

use crate::RangingErr;

/// Fixed start-up parameters of the ranging pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RangingConfig {
	pub sample_rate_sps:f64,
	/// Center of the carrier offset search
	pub foffset_hz:f64,
	/// Half-width of the carrier offset search
	pub frange_hz:f64,
	/// Capture samples per code chip
	pub oversampling:usize,
	/// The correlation is resampled at 2*nint+1 times the capture rate
	pub nint:usize,
	/// Remove the channel 1 carrier estimate from channel 2 as well
	pub derotate_channel2:bool,
	/// Search channel 2 for its own carrier offset and remove that instead
	pub channel2_frequency_search:bool,
	/// Measurements below this SNR are flagged in the operator output
	pub snr_warn_db:f64,
}

impl Default for RangingConfig {

	fn default() -> Self {
		RangingConfig {
			sample_rate_sps: 5.0e6,
			foffset_hz: 0.0,
			frange_hz: 8000.0,
			oversampling: 2,
			nint: 1,
			derotate_channel2: false,
			channel2_frequency_search: false,
			snr_warn_db: 3.0,
		}
	}

}

impl RangingConfig {

	/// Reads a JSON object; missing fields take their default values
	pub fn from_json_file<P: AsRef<Path>>(path:P) -> Result<Self, RangingErr> {
		let file = File::open(path).map_err(|_| RangingErr::Configuration("Unable to open JSON configuration file"))?;
		let reader = BufReader::new(file);
		serde_json::from_reader(reader).map_err(|_| RangingErr::Configuration("Unable to parse JSON configuration"))
	}

	pub fn validate(&self) -> Result<(), RangingErr> {
		if !(self.sample_rate_sps > 0.0) || !self.sample_rate_sps.is_finite() {
			Err(RangingErr::Configuration("Sample rate must be positive"))
		} else if !(self.frange_hz > 0.0) {
			Err(RangingErr::Configuration("Frequency search half-width must be positive"))
		} else if !self.foffset_hz.is_finite() {
			Err(RangingErr::Configuration("Frequency search center must be finite"))
		} else if self.oversampling == 0 {
			Err(RangingErr::Configuration("Oversampling factor must be at least 1"))
		} else if self.nint == 0 {
			Err(RangingErr::Configuration("Interpolation factor must be at least 1"))
		} else {
			Ok(())
		}
	}

	pub fn upsampling(&self) -> usize { 2*self.nint + 1 }

}

#[cfg(test)]
mod tests {

	use super::*;

	#[test]
	fn defaults_are_valid() {
		let config = RangingConfig::default();
		assert_eq!(config.validate(), Ok(()));
		assert_eq!(config.upsampling(), 3);
	}

	#[test]
	fn rejects_bad_parameters() {
		let bad = vec![
			RangingConfig{ sample_rate_sps: 0.0, ..Default::default() },
			RangingConfig{ sample_rate_sps: -5.0e6, ..Default::default() },
			RangingConfig{ frange_hz: 0.0, ..Default::default() },
			RangingConfig{ frange_hz: -1.0, ..Default::default() },
			RangingConfig{ oversampling: 0, ..Default::default() },
			RangingConfig{ nint: 0, ..Default::default() },
		];
		for config in bad {
			match config.validate() {
				Err(RangingErr::Configuration(_)) => {},
				other => panic!("{:?} accepted: {:?}", config, other),
			}
		}
	}

	#[test]
	fn partial_json_uses_defaults() {
		let config:RangingConfig = serde_json::from_str(r#"{ "sample_rate_sps": 2.5e6, "derotate_channel2": true }"#).unwrap();
		assert_eq!(config.sample_rate_sps, 2.5e6);
		assert!(config.derotate_channel2);
		assert_eq!(config.frange_hz, 8000.0);
		assert_eq!(config.nint, 1);
	}

}
