
use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind, Read, Write};
use std::path::Path;

use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};
use num_complex::Complex;

use crate::RangingErr;
use crate::code::ChipSequence;

/// Two channels x {I, Q} x 2 bytes
pub const BYTES_PER_SAMPLE:usize = 8;

/// One window of samples from both receiver channels
#[derive(Debug, Clone)]
pub struct CaptureBlock {
	pub idx:usize,
	pub ch1:Vec<Complex<f64>>,
	pub ch2:Vec<Complex<f64>>,
}

impl CaptureBlock {

	/// Decodes interleaved little-endian `I1, Q1, I2, Q2` 16-bit words
	pub fn from_bytes(idx:usize, bytes:&[u8]) -> Self {
		let n:usize = bytes.len() / BYTES_PER_SAMPLE;
		let mut ch1:Vec<Complex<f64>> = Vec::with_capacity(n);
		let mut ch2:Vec<Complex<f64>> = Vec::with_capacity(n);

		for quad in bytes.chunks_exact(BYTES_PER_SAMPLE) {
			ch1.push(Complex{ re: LittleEndian::read_i16(&quad[0..2]) as f64, im: LittleEndian::read_i16(&quad[2..4]) as f64 });
			ch2.push(Complex{ re: LittleEndian::read_i16(&quad[4..6]) as f64, im: LittleEndian::read_i16(&quad[6..8]) as f64 });
		}

		CaptureBlock { idx, ch1, ch2 }
	}

	pub fn len(&self) -> usize { self.ch1.len() }

	pub fn is_empty(&self) -> bool { self.ch1.is_empty() }

	/// Subtracts each channel's mean in place
	pub fn remove_dc(&mut self) {
		remove_mean(&mut self.ch1);
		remove_mean(&mut self.ch2);
	}

}

fn remove_mean(x:&mut [Complex<f64>]) {
	if x.is_empty() { return; }
	let mean:Complex<f64> = x.iter().sum::<Complex<f64>>() / (x.len() as f64);
	for c in x.iter_mut() {
		*c -= mean;
	}
}

/// Pulls fixed-size dual-channel blocks from a capture stream.  A short read ends the stream
/// and the leftover bytes are discarded.
pub struct BlockSource<S: Read> {
	src:S,
	buffer:Vec<u8>,
	next_idx:usize,
	finished:bool,
	trailing_bytes:usize,
	last_error:Option<RangingErr>,
}

impl BlockSource<BufReader<File>> {

	pub fn open<P: AsRef<Path>>(path:P, block_len:usize) -> Result<Self, RangingErr> {
		let file = File::open(path).map_err(|_| RangingErr::Io("Unable to open capture file"))?;
		Self::new(BufReader::new(file), block_len)
	}

}

impl<S: Read> BlockSource<S> {

	pub fn new(src:S, block_len:usize) -> Result<Self, RangingErr> {
		if block_len == 0 {
			return Err(RangingErr::Configuration("Block length must be at least one sample"));
		}
		let buffer:Vec<u8> = vec![0; block_len * BYTES_PER_SAMPLE];
		Ok(BlockSource { src, buffer, next_idx: 0, finished: false, trailing_bytes: 0, last_error: None })
	}

	pub fn block_bytes(&self) -> usize { self.buffer.len() }

	/// Bytes read after the last complete block; only meaningful once the stream has ended
	pub fn trailing_bytes(&self) -> usize { self.trailing_bytes }

	/// A read failure other than end-of-file, if one stopped the stream
	pub fn last_error(&self) -> Option<RangingErr> { self.last_error }

	fn fill_buffer(&mut self) -> Result<usize, RangingErr> {
		let mut filled:usize = 0;
		while filled < self.buffer.len() {
			match self.src.read(&mut self.buffer[filled..]) {
				Ok(0) => break,
				Ok(bytes_read) => filled += bytes_read,
				Err(ref e) if e.kind() == ErrorKind::Interrupted => {},
				Err(_) => return Err(RangingErr::Io("Unable to read from capture stream")),
			}
		}
		Ok(filled)
	}

}

impl<S: Read> Iterator for BlockSource<S> {
	type Item = CaptureBlock;

	fn next(&mut self) -> Option<CaptureBlock> {
		if self.finished {
			return None;
		}

		match self.fill_buffer() {
			Ok(filled) if filled == self.buffer.len() => {
				let block = CaptureBlock::from_bytes(self.next_idx, &self.buffer);
				self.next_idx += 1;
				Some(block)
			},
			Ok(filled) => {
				self.finished = true;
				self.trailing_bytes = filled;
				None
			},
			Err(e) => {
				self.finished = true;
				self.last_error = Some(e);
				None
			}
		}
	}
}

/// Writes dual-channel samples in the capture stream format, rounding and saturating to i16
pub struct CaptureWriter<W: Write> {
	dst:W,
}

impl CaptureWriter<BufWriter<File>> {

	pub fn create<P: AsRef<Path>>(path:P) -> Result<Self, RangingErr> {
		let file = File::create(path).map_err(|_| RangingErr::Io("Unable to create capture file"))?;
		Ok(CaptureWriter { dst: BufWriter::new(file) })
	}

}

impl<W: Write> CaptureWriter<W> {

	pub fn new(dst:W) -> Self { CaptureWriter { dst } }

	pub fn write_samples(&mut self, ch1:&[Complex<f64>], ch2:&[Complex<f64>]) -> Result<(), RangingErr> {
		if ch1.len() != ch2.len() {
			return Err(RangingErr::Io("Channels must have the same number of samples"));
		}

		for (a, b) in ch1.iter().zip(ch2.iter()) {
			for x in &[a.re, a.im, b.re, b.im] {
				self.dst.write_i16::<LittleEndian>(to_i16(*x)).map_err(|_| RangingErr::Io("Unable to write to capture stream"))?;
			}
		}
		Ok(())
	}

	pub fn into_inner(mut self) -> Result<W, RangingErr> {
		self.dst.flush().map_err(|_| RangingErr::Io("Unable to flush capture stream"))?;
		Ok(self.dst)
	}

}

fn to_i16(x:f64) -> i16 {
	x.round().max(i16::MIN as f64).min(i16::MAX as f64) as i16
}

/// Loads a code file of one byte per chip
pub fn read_code_file<P: AsRef<Path>>(path:P) -> Result<ChipSequence, RangingErr> {
	let mut file = File::open(path).map_err(|_| RangingErr::CodeLoad("Unable to open code file"))?;
	let mut bytes:Vec<u8> = vec![];
	file.read_to_end(&mut bytes).map_err(|_| RangingErr::CodeLoad("Unable to read code file"))?;
	ChipSequence::from_bytes(bytes)
}

pub fn write_code_file<P: AsRef<Path>>(path:P, chips:&ChipSequence) -> Result<(), RangingErr> {
	let mut file = File::create(path).map_err(|_| RangingErr::Io("Unable to create code file"))?;
	file.write_all(chips.as_bytes()).map_err(|_| RangingErr::Io("Unable to write code file"))
}

#[cfg(test)]
mod tests {

	use std::io::Cursor;

	use super::*;

	fn stream(words:&[i16]) -> Vec<u8> {
		let mut bytes:Vec<u8> = vec![];
		for w in words {
			bytes.write_i16::<LittleEndian>(*w).unwrap();
		}
		bytes
	}

	#[test]
	fn decodes_interleaved_channels() {
		let bytes = stream(&[1, 2, 3, 4, -5, -6, -7, -8]);
		let mut src = BlockSource::new(Cursor::new(bytes), 2).unwrap();

		let block = src.next().unwrap();
		assert_eq!(block.idx, 0);
		assert_eq!(block.ch1, vec![Complex{ re: 1.0, im: 2.0 }, Complex{ re: -5.0, im: -6.0 }]);
		assert_eq!(block.ch2, vec![Complex{ re: 3.0, im: 4.0 }, Complex{ re: -7.0, im: -8.0 }]);
		assert!(src.next().is_none());
		assert_eq!(src.trailing_bytes(), 0);
	}

	#[test]
	fn short_final_read_ends_stream() {
		// Two full blocks of one sample each plus six stray bytes
		let mut bytes = stream(&[1, 1, 1, 1, 2, 2, 2, 2]);
		bytes.extend_from_slice(&[9, 9, 9, 9, 9, 9]);
		let mut src = BlockSource::new(Cursor::new(bytes), 1).unwrap();

		let idxs:Vec<usize> = src.by_ref().map(|b| b.idx).collect();
		assert_eq!(idxs, vec![0, 1]);
		assert_eq!(src.trailing_bytes(), 6);
		assert_eq!(src.last_error(), None);
		assert!(src.next().is_none());
	}

	#[test]
	fn dc_removal() {
		let mut block = CaptureBlock::from_bytes(0, &stream(&[10, 0, 4, 4, 20, 2, 4, 4]));
		block.remove_dc();
		assert_eq!(block.ch1, vec![Complex{ re: -5.0, im: -1.0 }, Complex{ re: 5.0, im: 1.0 }]);
		assert_eq!(block.ch2, vec![Complex{ re: 0.0, im: 0.0 }, Complex{ re: 0.0, im: 0.0 }]);
	}

	#[test]
	fn writer_saturates() {
		let mut writer = CaptureWriter::new(vec![]);
		writer.write_samples(&[Complex{ re: 40000.0, im: -1.6 }], &[Complex{ re: 0.4, im: -40000.0 }]).unwrap();
		let bytes = writer.into_inner().unwrap();

		let block = CaptureBlock::from_bytes(0, &bytes);
		assert_eq!(block.ch1[0], Complex{ re: 32767.0, im: -2.0 });
		assert_eq!(block.ch2[0], Complex{ re: 0.0, im: -32768.0 });
	}

}
