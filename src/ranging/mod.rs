use std::io::Read;

use num_complex::Complex;

use crate::RangingErr;
use crate::acquisition::{self, FrequencyEstimate, FrequencyEstimator};
use crate::code::ReferenceCode;
use crate::filters::matched_filter::MatchedFilter;
use crate::filters::peak::RefinedPeak;
use crate::io::{BlockSource, CaptureBlock};
use crate::snr::SnrEstimator;

pub mod concurrent;
pub mod config;
pub mod measurement;

pub use self::config::RangingConfig;
pub use self::measurement::{ChannelEstimate, Measurement, MeasurementEmitter};


/// Everything one block produces on its way from the frequency search to the measurement
#[derive(Debug, Clone)]
pub struct BlockContext {
	pub block_idx:usize,
	pub freq:FrequencyEstimate,
	pub ch1:ChannelEstimate,
	pub ch2:ChannelEstimate,
}

/// Block-wise code delay estimation for a two-channel capture.  All tables are built once in
/// `new` and only read afterwards, so one pipeline can serve blocks from several threads.
pub struct Pipeline {
	config:RangingConfig,
	code:ReferenceCode,
	estimator:FrequencyEstimator,
	filter:MatchedFilter,
	snr:SnrEstimator,
}

impl Pipeline {

	pub fn new(config:RangingConfig, code:ReferenceCode) -> Result<Self, RangingErr> {
		config.validate()?;
		if code.replica.oversampling != config.oversampling {
			return Err(RangingErr::Configuration("Code replica oversampling does not match the configuration"));
		}

		let n:usize = code.len();
		let estimator = FrequencyEstimator::new(config.sample_rate_sps, n, config.foffset_hz, config.frange_hz)?;
		let filter = MatchedFilter::new(&code.kernel, config.nint);
		let snr = SnrEstimator::new(&code.replica, config.nint, filter.inverse_plan().clone());

		Ok(Pipeline { config, code, estimator, filter, snr })
	}

	pub fn config(&self) -> &RangingConfig { &self.config }

	pub fn code(&self) -> &ReferenceCode { &self.code }

	pub fn estimator(&self) -> &FrequencyEstimator { &self.estimator }

	/// Samples per block on each channel
	pub fn block_len(&self) -> usize { self.code.len() }

	pub fn open_source<S: Read>(&self, src:S) -> Result<BlockSource<S>, RangingErr> {
		BlockSource::new(src, self.block_len())
	}

	fn process_channel(&self, samples:&[Complex<f64>], derotation_hz:f64) -> Result<ChannelEstimate, RangingErr> {
		let derotated:Vec<Complex<f64>> = if derotation_hz != 0.0 {
			acquisition::derotate(samples, derotation_hz, self.config.sample_rate_sps)
		} else {
			samples.to_vec()
		};

		let response = self.filter.apply(&derotated)?;
		let coarse = response.peak();
		let peak = RefinedPeak::refine(&coarse);

		let (snr_db, snr_valid) = match self.snr.estimate(&response.signal_freq_domain, coarse.idx) {
			Ok(est) => (est.snr_db, true),
			Err(_)  => (f64::NEG_INFINITY, false),
		};

		Ok(ChannelEstimate{ derotation_hz, peak, test_statistic: response.test_stat_at_idx(coarse.idx), snr_db, snr_valid })
	}

	/// Runs the frequency search and both channel correlations on one block
	pub fn correlate_block(&self, mut block:CaptureBlock) -> Result<BlockContext, RangingErr> {
		if block.len() != self.block_len() || block.ch2.len() != self.block_len() {
			return Err(RangingErr::Configuration("Capture block length does not match the code"));
		}
		block.remove_dc();

		let freq:FrequencyEstimate = self.estimator.estimate(&block.ch1);

		let ch2_derotation_hz:f64 = if self.config.channel2_frequency_search {
			self.estimator.estimate(&block.ch2).freq_hz
		} else if self.config.derotate_channel2 {
			freq.freq_hz
		} else {
			0.0
		};

		let ch1 = self.process_channel(&block.ch1, freq.freq_hz)?;
		let ch2 = self.process_channel(&block.ch2, ch2_derotation_hz)?;

		Ok(BlockContext{ block_idx: block.idx, freq, ch1, ch2 })
	}

	pub fn measure(&self, context:&BlockContext) -> Measurement {
		Measurement::new(context.block_idx, context.freq.freq_hz, context.ch1, context.ch2,
			self.config.sample_rate_sps, self.config.upsampling())
	}

	pub fn process_block(&self, block:CaptureBlock) -> Result<Measurement, RangingErr> {
		let context = self.correlate_block(block)?;
		Ok(self.measure(&context))
	}

	/// Processes blocks in order until the source runs dry, calling `on_emit` for every record
	pub fn run<S: Read, F: FnMut(&Measurement)>(&self, source:&mut BlockSource<S>, emitter:&mut MeasurementEmitter, on_emit:F) -> Result<(), RangingErr> {
		self.run_limited(source, emitter, None, on_emit)
	}

	/// Like `run`, but stops after `max_records` blocks when a limit is given.  A read failure
	/// before the limit is reached is still an error.
	pub fn run_limited<S: Read, F: FnMut(&Measurement)>(&self, source:&mut BlockSource<S>, emitter:&mut MeasurementEmitter,
		max_records:Option<usize>, mut on_emit:F) -> Result<(), RangingErr> {

		let mut processed:usize = 0;
		while max_records.map_or(true, |max| processed < max) {
			match source.next() {
				Some(block) => {
					let measurement = self.process_block(block)?;
					on_emit(emitter.emit(measurement));
					processed += 1;
				},
				None => break,
			}
		}

		match source.last_error() {
			Some(e) => Err(e),
			None    => Ok(()),
		}
	}

}
