use clap::{Arg, App, ArgMatches};
use colored::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use twstft_ranging::RangingErr;
use twstft_ranging::code::ReferenceCode;
use twstft_ranging::io::CaptureWriter;
use twstft_ranging::synth;

fn parse_or<T: std::str::FromStr>(matches:&ArgMatches, name:&str, default:T, msg:&'static str) -> Result<T, RangingErr> {
	match matches.value_of(name) {
		Some(s) => s.parse().map_err(|_| RangingErr::Configuration(msg)),
		None    => Ok(default),
	}
}

fn main() -> Result<(), RangingErr> {

	let matches = App::new("Synthetic Capture")
		.version("0.1.0")
		.author("John Stanford (johnwstanford@gmail.com)")
		.about("Writes a dual-channel i16 capture carrying a PRN code at known delays, carrier offset and noise level")
		.arg(Arg::with_name("filename")
			.short("f").long("filename")
			.help("Output capture filename")
			.required(true).takes_value(true))
		.arg(Arg::with_name("code")
			.short("c").long("code")
			.help("Code filename, one byte (0 or 1) per chip")
			.required(true).takes_value(true))
		.arg(Arg::with_name("sample_rate_sps")
			.short("s").long("sample_rate_sps")
			.takes_value(true).required(true))
		.arg(Arg::with_name("oversampling")
			.short("r").long("oversampling")
			.takes_value(true))
		.arg(Arg::with_name("blocks")
			.short("n").long("blocks")
			.takes_value(true))
		.arg(Arg::with_name("delay1")
			.long("delay1")
			.help("Channel 1 delay [samples]")
			.takes_value(true))
		.arg(Arg::with_name("delay2")
			.long("delay2")
			.help("Channel 2 delay [samples]")
			.takes_value(true))
		.arg(Arg::with_name("freq1_hz")
			.long("freq1_hz")
			.takes_value(true)
			.allow_hyphen_values(true))
		.arg(Arg::with_name("freq2_hz")
			.long("freq2_hz")
			.takes_value(true)
			.allow_hyphen_values(true))
		.arg(Arg::with_name("amplitude")
			.short("a").long("amplitude")
			.takes_value(true))
		.arg(Arg::with_name("noise_std")
			.long("noise_std")
			.takes_value(true))
		.arg(Arg::with_name("seed")
			.long("seed")
			.takes_value(true))
		.get_matches();

	let fname:&str = matches.value_of("filename").ok_or(RangingErr::Configuration("No output filename provided"))?;
	let code_fname:&str = matches.value_of("code").ok_or(RangingErr::Configuration("No code filename provided"))?;
	let fs:f64 = parse_or(&matches, "sample_rate_sps", 5.0e6, "Unable to parse sample rate as an f64")?;
	let oversampling:usize = parse_or(&matches, "oversampling", 2, "Unable to parse oversampling factor")?;
	let n_blocks:usize = parse_or(&matches, "blocks", 3, "Unable to parse number of blocks")?;
	let delay1:usize = parse_or(&matches, "delay1", 100, "Unable to parse channel 1 delay")?;
	let delay2:usize = parse_or(&matches, "delay2", 140, "Unable to parse channel 2 delay")?;
	let freq1_hz:f64 = parse_or(&matches, "freq1_hz", 0.0, "Unable to parse channel 1 frequency")?;
	let freq2_hz:f64 = parse_or(&matches, "freq2_hz", 0.0, "Unable to parse channel 2 frequency")?;
	let amplitude:f64 = parse_or(&matches, "amplitude", 1000.0, "Unable to parse amplitude")?;
	let noise_std:f64 = parse_or(&matches, "noise_std", 0.0, "Unable to parse noise standard deviation")?;
	let seed:u64 = parse_or(&matches, "seed", 0, "Unable to parse seed")?;

	let code = ReferenceCode::load(code_fname, oversampling)?;
	let mut rng = StdRng::seed_from_u64(seed);
	let mut writer = CaptureWriter::create(fname)?;

	for block_idx in 0..n_blocks {
		let mut ch1 = synth::delayed_replica(&code.replica, delay1, freq1_hz, fs, amplitude);
		let mut ch2 = synth::delayed_replica(&code.replica, delay2, freq2_hz, fs, amplitude);
		synth::add_noise(&mut ch1, noise_std, &mut rng)?;
		synth::add_noise(&mut ch2, noise_std, &mut rng)?;
		writer.write_samples(&ch1, &ch2)?;
		eprintln!("Block {} of {} written", block_idx + 1, n_blocks);
	}
	writer.into_inner()?;

	eprintln!("{}", format!("Wrote {} blocks of {} samples to {}", n_blocks, code.len(), fname).green());
	Ok(())

}
