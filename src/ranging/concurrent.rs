use std::collections::VecDeque;
use std::io::Read;
use std::sync::Arc;

use tokio::task::{self, JoinHandle};

use crate::RangingErr;
use crate::io::BlockSource;
use super::{Measurement, MeasurementEmitter, Pipeline};

/// Spreads whole blocks over the blocking thread pool with at most `workers` in flight.
/// Results are awaited in submission order, so records come out in block order exactly as
/// `Pipeline::run` would emit them.
pub async fn process_concurrent<S: Read, F: FnMut(&Measurement)>(pipeline:Arc<Pipeline>, source:&mut BlockSource<S>,
	workers:usize, emitter:&mut MeasurementEmitter, mut on_emit:F) -> Result<(), RangingErr> {

	let workers:usize = workers.max(1);
	let mut in_flight:VecDeque<JoinHandle<Result<Measurement, RangingErr>>> = VecDeque::new();

	while let Some(block) = source.next() {
		if in_flight.len() >= workers {
			if let Some(handle) = in_flight.pop_front() {
				let measurement = handle.await.map_err(|_| RangingErr::Worker("Block worker panicked"))??;
				on_emit(emitter.emit(measurement));
			}
		}

		let p = pipeline.clone();
		in_flight.push_back(task::spawn_blocking(move || p.process_block(block)));
	}

	while let Some(handle) = in_flight.pop_front() {
		let measurement = handle.await.map_err(|_| RangingErr::Worker("Block worker panicked"))??;
		on_emit(emitter.emit(measurement));
	}

	match source.last_error() {
		Some(e) => Err(e),
		None    => Ok(()),
	}
}
