
/// Index of the first maximum of `values`, or None if the iterator is empty.
/// Ties go to the lowest index; NaN never wins.
pub fn first_argmax<I: IntoIterator<Item = f64>>(values:I) -> Option<usize> {
	let mut best:Option<(usize, f64)> = None;
	for (idx, v) in values.into_iter().enumerate() {
		if v.is_nan() { continue; }
		match best {
			Some((_, best_v)) if v <= best_v => {},
			_ => best = Some((idx, v)),
		}
	}
	best.map(|(idx, _)| idx)
}

/// Mean and population variance (divides by n, like numpy's default)
pub fn mean_and_var(x:&[f64]) -> (f64, f64) {
	let n:f64 = x.len() as f64;
	if x.is_empty() { return (0.0, 0.0); }
	let mean:f64 = x.iter().sum::<f64>() / n;
	let var:f64 = x.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
	(mean, var)
}

/// Element i of the result is x[(i + shift) mod n]
pub fn rotate_left_by<T: Copy>(x:&[T], shift:usize) -> Vec<T> {
	let mut ans:Vec<T> = x.to_vec();
	if !ans.is_empty() {
		ans.rotate_left(shift % x.len());
	}
	ans
}

#[cfg(test)]
mod tests {

	use super::*;

	#[test]
	fn argmax_first_of_ties() {
		assert_eq!(first_argmax(vec![1.0, 3.0, 2.0, 3.0]), Some(1));
		assert_eq!(first_argmax(vec![f64::NAN, 0.5, 0.5]), Some(1));
		assert_eq!(first_argmax(Vec::<f64>::new()), None);
	}

	#[test]
	fn mean_var() {
		let (m, v) = mean_and_var(&[1.0, 2.0, 3.0, 4.0]);
		assert_eq!(m, 2.5);
		assert_eq!(v, 1.25);
	}

	#[test]
	fn rotate() {
		assert_eq!(rotate_left_by(&[0, 1, 2, 3, 4], 2), vec![2, 3, 4, 0, 1]);
		assert_eq!(rotate_left_by(&[0, 1, 2], 7), vec![1, 2, 0]);
	}

}
