use serde::{Serialize, Deserialize};

use crate::RangingErr;
use super::matched_filter::CorrelationPeak;

/// Three-point amplitude interpolation around a correlation maximum.
///
/// With a = |x[-1]|, b = |x[0]| and c = |x[+1]|, the vertex of the parabola through the three
/// points sits at (a - c) / (2*(a + c - 2b)) samples from the center.  A flat top makes the
/// denominator vanish and the correction undefined.
pub fn parabolic_correction(prev:f64, val:f64, next:f64) -> Result<f64, RangingErr> {
	let denom:f64 = 2.0 * (prev + next - 2.0*val);
	let correction:f64 = (prev - next) / denom;
	if denom == 0.0 || !correction.is_finite() {
		Err(RangingErr::CorrectionUndefined)
	} else {
		Ok(correction)
	}
}

/// Peak position in the upsampled correlation index space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RefinedPeak {
	pub idx:usize,
	pub correction:f64,
	/// False when the correction could not be computed and was replaced by zero
	pub correction_valid:bool,
}

impl RefinedPeak {

	pub fn refine(peak:&CorrelationPeak) -> Self {
		match parabolic_correction(peak.prev.norm(), peak.val.norm(), peak.next.norm()) {
			Ok(correction) => RefinedPeak{ idx: peak.idx, correction, correction_valid: true },
			Err(_)         => RefinedPeak{ idx: peak.idx, correction: 0.0, correction_valid: false },
		}
	}

	pub fn position(&self) -> f64 { self.idx as f64 + self.correction }

}
