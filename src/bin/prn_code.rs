use clap::{Arg, App};
use colored::*;
use twstft_ranging::RangingErr;
use twstft_ranging::code::lfsr::{self, Lfsr};
use twstft_ranging::io;

fn main() -> Result<(), RangingErr> {

	let matches = App::new("PRN Code")
		.version("0.1.0")
		.author("John Stanford (johnwstanford@gmail.com)")
		.about("Generates a ranging code file from a linear-feedback shift register, or verifies an existing one")
		.arg(Arg::with_name("filename")
			.short("f").long("filename")
			.help("Code filename, one byte (0 or 1) per chip")
			.required(true).takes_value(true))
		.arg(Arg::with_name("generate")
			.long("generate")
			.help("Write a new code file instead of verifying one"))
		.arg(Arg::with_name("bit_len")
			.short("b").long("bit_len")
			.help("LFSR length in bits")
			.takes_value(true).default_value("19"))
		.arg(Arg::with_name("taps")
			.short("t").long("taps")
			.help("Tap mask; bit i selects stage i+1 (decimal or 0x-prefixed hex). Defaults to a maximal-length mask for bit_len")
			.takes_value(true))
		.arg(Arg::with_name("seed")
			.long("seed")
			.help("Initial register state")
			.takes_value(true).default_value("1"))
		.arg(Arg::with_name("noise_len")
			.short("n").long("noise_len")
			.help("Number of chips before the register resets")
			.takes_value(true).default_value("500000"))
		.get_matches();

	let fname:&str = matches.value_of("filename").ok_or(RangingErr::Configuration("No code filename provided"))?;

	if matches.is_present("generate") {
		let bit_len:u32 = lfsr::parse_bit_len(matches.value_of("bit_len").unwrap_or("19"))?;
		let taps:u64 = match matches.value_of("taps") {
			Some(s) => lfsr::parse_register_value(s)?,
			None    => lfsr::default_taps(bit_len).ok_or(RangingErr::Configuration("No default taps for this LFSR length, provide --taps"))?,
		};
		let seed:u64 = lfsr::parse_register_value(matches.value_of("seed").unwrap_or("1"))?;
		let noise_len:usize = matches.value_of("noise_len").unwrap_or("500000").parse()
			.map_err(|_| RangingErr::Configuration("Unable to parse noise length"))?;

		let chips = Lfsr::new(bit_len, taps, seed)?.generate(noise_len)?;
		io::write_code_file(fname, &chips)?;
		eprintln!("{}", format!("Wrote {} chips to {} (bit_len={}, taps={:#x}, seed={:#x})", chips.len(), fname, bit_len, taps, seed).green());
	} else {
		match io::read_code_file(fname) {
			Ok(chips) => {
				let ones:usize = chips.count_ones();
				let zeros:usize = chips.len() - ones;
				let imbalance:f64 = (ones as f64 - zeros as f64) / (chips.len() as f64);
				let result_str = format!("{}: {} chips, {} ones, {} zeros, imbalance {:.6}", fname, chips.len(), ones, zeros, imbalance);
				if imbalance.abs() < 0.01 {
					eprintln!("{}", result_str.green());
				} else {
					eprintln!("{}", result_str.yellow());
				}
			},
			Err(e) => {
				eprintln!("{}", format!("{}: {}", fname, e).red());
				return Err(e);
			}
		}
	}

	Ok(())

}
