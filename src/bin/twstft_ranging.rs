use std::sync::Arc;

use clap::{Arg, App, ArgMatches};
use colored::*;
use twstft_ranging::RangingErr;
use twstft_ranging::code::ReferenceCode;
use twstft_ranging::io::BlockSource;
use twstft_ranging::ranging::{concurrent, Measurement, MeasurementEmitter, Pipeline, RangingConfig};

fn parse_arg<T: std::str::FromStr>(matches:&ArgMatches, name:&str, msg:&'static str) -> Result<Option<T>, RangingErr> {
	match matches.value_of(name) {
		Some(s) => s.parse().map(Some).map_err(|_| RangingErr::Configuration(msg)),
		None    => Ok(None),
	}
}

fn report(m:&Measurement, snr_warn_db:f64) {
	let result_str = format!("{:9.2} [Hz], {:7.2} [dB], {:7.2} [dB], {:.6e} [sec]", m.freq_offset_hz, m.snr1_db, m.snr2_db, m.delay_s);
	if !m.valid {
		eprintln!("Block {:5} {}", m.block_idx, result_str.red());
	} else if m.snr1_db < snr_warn_db || m.snr2_db < snr_warn_db {
		eprintln!("Block {:5} {}", m.block_idx, result_str.yellow());
	} else {
		eprintln!("Block {:5} {}", m.block_idx, result_str.green());
	}
}

#[tokio::main]
pub async fn main() -> Result<(), RangingErr> {

	let matches = App::new("TWSTFT Ranging")
		.version("0.1.0")
		.author("John Stanford (johnwstanford@gmail.com)")
		.about("Takes dual-channel IQ captures and a PRN code file and produces per-block carrier offset, SNR and differential code delay")
		.arg(Arg::with_name("filename")
			.short("f").long("filename")
			.help("Capture filename, interleaved i16 I1 Q1 I2 Q2")
			.required(true).takes_value(true))
		.arg(Arg::with_name("code")
			.short("c").long("code")
			.help("Code filename, one byte (0 or 1) per chip")
			.required(true).takes_value(true))
		.arg(Arg::with_name("json_config")
			.short("j").long("json_config")
			.help("JSON configuration; command line values take precedence")
			.takes_value(true))
		.arg(Arg::with_name("sample_rate_sps")
			.short("s").long("sample_rate_sps")
			.takes_value(true))
		.arg(Arg::with_name("foffset_hz")
			.long("foffset_hz")
			.takes_value(true)
			.allow_hyphen_values(true))
		.arg(Arg::with_name("frange_hz")
			.long("frange_hz")
			.takes_value(true))
		.arg(Arg::with_name("oversampling")
			.short("r").long("oversampling")
			.help("Capture samples per chip")
			.takes_value(true))
		.arg(Arg::with_name("nint")
			.long("nint")
			.help("Correlation is resampled at 2*nint+1 times the capture rate")
			.takes_value(true))
		.arg(Arg::with_name("derotate_channel2")
			.long("derotate_channel2")
			.help("Remove the channel 1 carrier estimate from channel 2 too"))
		.arg(Arg::with_name("channel2_frequency_search")
			.long("channel2_frequency_search")
			.help("Estimate and remove the channel 2 carrier independently"))
		.arg(Arg::with_name("workers")
			.short("w").long("workers")
			.help("Number of blocks processed concurrently")
			.takes_value(true))
		.arg(Arg::with_name("max_records")
			.short("m").long("max_records")
			.takes_value(true))
		.arg(Arg::with_name("json")
			.long("json")
			.help("Print all records as JSON at the end instead of one line per block"))
		.get_matches();

	let mut config:RangingConfig = match matches.value_of("json_config") {
		Some(fname) => RangingConfig::from_json_file(fname)?,
		None        => RangingConfig::default(),
	};
	if let Some(fs) = parse_arg(&matches, "sample_rate_sps", "Unable to parse sample rate as an f64")? { config.sample_rate_sps = fs; }
	if let Some(f) = parse_arg(&matches, "foffset_hz", "Unable to parse frequency offset as an f64")? { config.foffset_hz = f; }
	if let Some(f) = parse_arg(&matches, "frange_hz", "Unable to parse frequency range as an f64")? { config.frange_hz = f; }
	if let Some(r) = parse_arg(&matches, "oversampling", "Unable to parse oversampling factor")? { config.oversampling = r; }
	if let Some(nint) = parse_arg(&matches, "nint", "Unable to parse interpolation factor")? { config.nint = nint; }
	if matches.is_present("derotate_channel2") { config.derotate_channel2 = true; }
	if matches.is_present("channel2_frequency_search") { config.channel2_frequency_search = true; }
	config.validate()?;

	let workers:usize = parse_arg(&matches, "workers", "Unable to parse number of workers")?.unwrap_or(1);
	let opt_max_records:Option<usize> = parse_arg(&matches, "max_records", "Unable to parse max records")?;
	let print_json:bool = matches.is_present("json");

	let fname:&str = matches.value_of("filename").ok_or(RangingErr::Configuration("No capture filename provided"))?;
	let code_fname:&str = matches.value_of("code").ok_or(RangingErr::Configuration("No code filename provided"))?;

	let code = ReferenceCode::load(code_fname, config.oversampling)?;
	eprintln!("Loaded {} chips from {}, {} samples per block", code.chips.len(), code_fname, code.len());

	let snr_warn_db:f64 = config.snr_warn_db;
	let pipeline = Arc::new(Pipeline::new(config, code)?);
	eprintln!("Processing {} at {} [samples/sec], {} search bins, {} worker(s)", &fname, pipeline.config().sample_rate_sps,
		pipeline.estimator().mask().len(), workers);

	let mut source = BlockSource::open(fname, pipeline.block_len())?;
	let mut emitter = MeasurementEmitter::new();

	let on_emit = |m:&Measurement| {
		report(m, snr_warn_db);
		if !print_json { println!("{}", m.to_line()); }
	};

	let result = match opt_max_records {
		// Bounding the record count only makes sense in order, so it always runs sequentially
		Some(_) => pipeline.run_limited(&mut source, &mut emitter, opt_max_records, on_emit),
		None if workers > 1 => concurrent::process_concurrent(pipeline.clone(), &mut source, workers, &mut emitter, on_emit).await,
		None => pipeline.run(&mut source, &mut emitter, on_emit),
	};

	if let Err(e) = result {
		eprintln!("{}", format!("Error: {}", e).red());
		return Err(e);
	}

	if source.trailing_bytes() > 0 {
		eprintln!("{}", format!("Discarded {} trailing bytes (short final block)", source.trailing_bytes()).yellow());
	}
	eprintln!("{} measurements", emitter.len());

	// Output data in JSON format
	if print_json {
		println!("{}", serde_json::to_string_pretty(emitter.records()).map_err(|_| RangingErr::Io("Unable to serialize measurements"))?);
	}

	Ok(())

}
