
use crate::RangingErr;
use super::ChipSequence;

/// Smallest maximal-length tap mask for each register length from 2 to 32 bits
const DEFAULT_TAPS:[u64; 31] = [
	0x3, 0x5, 0x9, 0x12, 0x21, 0x41, 0x8e, 0x108,
	0x204, 0x402, 0x829, 0x100d, 0x2015, 0x4001, 0x8016, 0x10004,
	0x20013, 0x40013, 0x80004, 0x100002, 0x200001, 0x400010, 0x80000d, 0x1000004,
	0x2000023, 0x4000013, 0x8000004, 0x10000002, 0x20000029, 0x40000004, 0x80000057,
];

/// Tap mask giving a maximal-length sequence (period 2^bit_len - 1) for registers of 2 to 32 bits
pub fn default_taps(bit_len:u32) -> Option<u64> {
	if bit_len < 2 { return None; }
	DEFAULT_TAPS.get((bit_len - 2) as usize).cloned()
}

/// Parses a tap mask or seed given in decimal or as 0x-prefixed hex
pub fn parse_register_value(s:&str) -> Result<u64, RangingErr> {
	let parsed = if s.starts_with("0x") || s.starts_with("0X") { u64::from_str_radix(&s[2..], 16) } else { s.parse() };
	parsed.map_err(|_| RangingErr::Configuration("Unable to parse LFSR tap mask or seed"))
}

pub fn parse_bit_len(s:&str) -> Result<u32, RangingErr> {
	s.parse().map_err(|_| RangingErr::Configuration("Unable to parse LFSR length as a u32"))
}

/// Fibonacci linear-feedback shift register used to generate ranging codes.
///
/// Stage 1 is bit 0 of `state`.  On every clock the register outputs its last stage, XORs the
/// tapped stages together, shifts toward the last stage and inserts the feedback at stage 1.
/// Bit i of `taps` selects stage i+1.
#[derive(Debug, Clone)]
pub struct Lfsr {
	bit_len:u32,
	taps:u64,
	seed:u64,
	state:u64,
}

impl Lfsr {

	pub fn new(bit_len:u32, taps:u64, seed:u64) -> Result<Self, RangingErr> {
		if bit_len == 0 || bit_len > 63 {
			return Err(RangingErr::Configuration("LFSR length must be between 1 and 63 bits"));
		}
		let mask:u64 = (1u64 << bit_len) - 1;
		if taps & mask == 0 || taps & !mask != 0 {
			return Err(RangingErr::Configuration("LFSR taps must select stages within the register"));
		}
		if (taps >> (bit_len - 1)) & 1 == 0 {
			// Without the last stage in the feedback the register loses state and never returns to its seed
			return Err(RangingErr::Configuration("LFSR taps must include the last stage"));
		}
		if seed & mask == 0 {
			return Err(RangingErr::Configuration("LFSR seed must be non-zero"));
		}

		let seed = seed & mask;
		Ok(Lfsr { bit_len, taps, seed, state: seed })
	}

	pub fn reset(&mut self) { self.state = self.seed; }

	pub fn state(&self) -> u64 { self.state }

	pub fn clock(&mut self) -> u8 {
		let out:u8 = ((self.state >> (self.bit_len - 1)) & 1) as u8;
		let feedback:u64 = ((self.state & self.taps).count_ones() & 1) as u64;
		let mask:u64 = (1u64 << self.bit_len) - 1;
		self.state = ((self.state << 1) | feedback) & mask;
		out
	}

	/// Resets the register and emits `noise_len` chips
	pub fn generate(&mut self, noise_len:usize) -> Result<ChipSequence, RangingErr> {
		self.reset();
		let chips:Vec<u8> = (0..noise_len).map(|_| self.clock()).collect();
		ChipSequence::from_bytes(chips)
	}

}

impl Iterator for Lfsr {
	type Item = u8;

	fn next(&mut self) -> Option<u8> { Some(self.clock()) }
}
