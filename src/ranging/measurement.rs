use serde::{Serialize, Deserialize};

use crate::filters::peak::RefinedPeak;

/// What one channel contributed to a block's measurement
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChannelEstimate {
	/// Carrier frequency wiped off before correlation, zero if the channel was left as captured
	pub derotation_hz:f64,
	pub peak:RefinedPeak,
	pub test_statistic:f64,
	/// Negative infinity when the despread variance was degenerate
	pub snr_db:f64,
	pub snr_valid:bool,
}

impl ChannelEstimate {

	pub fn is_valid(&self) -> bool { self.peak.correction_valid && self.snr_valid }

}

/// One output record per processed block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
	pub block_idx:usize,
	pub freq_offset_hz:f64,
	pub snr1_db:f64,
	pub snr2_db:f64,
	/// Channel 1 minus channel 2 code delay [sec]
	pub delay_s:f64,
	pub ch1:ChannelEstimate,
	pub ch2:ChannelEstimate,
	pub valid:bool,
}

impl Measurement {

	/// `upsampling` is the factor between the correlation index space and the capture sample rate
	pub fn new(block_idx:usize, freq_offset_hz:f64, ch1:ChannelEstimate, ch2:ChannelEstimate, fs:f64, upsampling:usize) -> Self {
		let delay_s:f64 = (ch1.peak.position() - ch2.peak.position()) / fs / (upsampling as f64);
		Measurement {
			block_idx,
			freq_offset_hz,
			snr1_db: ch1.snr_db,
			snr2_db: ch2.snr_db,
			delay_s,
			ch1,
			ch2,
			valid: ch1.is_valid() && ch2.is_valid(),
		}
	}

	/// `block: freq_hz snr1_db snr2_db delay_s`
	pub fn to_line(&self) -> String {
		format!("{}: {} {} {} {:e}", self.block_idx, self.freq_offset_hz, self.snr1_db, self.snr2_db, self.delay_s)
	}

}

/// Append-only sequence of measurements in block order
#[derive(Debug, Default)]
pub struct MeasurementEmitter {
	records:Vec<Measurement>,
}

impl MeasurementEmitter {

	pub fn new() -> Self { MeasurementEmitter{ records: vec![] } }

	pub fn emit(&mut self, measurement:Measurement) -> &Measurement {
		self.records.push(measurement);
		&self.records[self.records.len() - 1]
	}

	pub fn len(&self) -> usize { self.records.len() }

	pub fn is_empty(&self) -> bool { self.records.is_empty() }

	pub fn records(&self) -> &[Measurement] { &self.records }

	pub fn into_records(self) -> Vec<Measurement> { self.records }

}

#[cfg(test)]
mod tests {

	use super::*;

	fn channel(idx:usize, correction:f64, snr_db:f64) -> ChannelEstimate {
		ChannelEstimate {
			derotation_hz: 0.0,
			peak: RefinedPeak{ idx, correction, correction_valid: true },
			test_statistic: 1.0,
			snr_db,
			snr_valid: snr_db.is_finite(),
		}
	}

	#[test]
	fn differential_delay() {
		let m = Measurement::new(4, 12.5, channel(300, 0.25, 20.0), channel(420, -0.5, 18.0), 2.0e6, 3);
		let expected = (300.0 - 420.0 + 0.25 + 0.5) / 2.0e6 / 3.0;
		assert!((m.delay_s - expected).abs() < 1.0e-18);
		assert_eq!(m.snr1_db, 20.0);
		assert_eq!(m.snr2_db, 18.0);
		assert!(m.valid);
		assert!(m.to_line().starts_with("4: 12.5 20 18 "));
	}

	#[test]
	fn degenerate_channel_invalidates() {
		let m = Measurement::new(0, 0.0, channel(3, 0.0, f64::NEG_INFINITY), channel(3, 0.0, 10.0), 1.0, 3);
		assert!(!m.valid);
		assert_eq!(m.delay_s, 0.0);
	}

	#[test]
	fn emitter_appends_in_order() {
		let mut emitter = MeasurementEmitter::new();
		for idx in 0..3 {
			let m = emitter.emit(Measurement::new(idx, 0.0, channel(1, 0.0, 1.0), channel(1, 0.0, 1.0), 1.0, 3));
			assert_eq!(m.block_idx, idx);
		}
		let idxs:Vec<usize> = emitter.into_records().iter().map(|m| m.block_idx).collect();
		assert_eq!(idxs, vec![0, 1, 2]);
	}

}
