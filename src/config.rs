use std::env::var;

use dotenv::dotenv;
use log::LevelFilter;

use crate::error::YtFetchError;

pub const DEFAULT_ENGINE: &str = "yt-dlp";

/// Runtime settings read from the environment (and an optional `.env`).
#[derive(Debug, Clone)]
pub struct Config {
	pub engine: String,
	pub log_level: LevelFilter,
	/// Extra `c=key` short flag mappings for the passthrough translator.
	pub short_flags: Vec<(char, String)>,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			engine: DEFAULT_ENGINE.to_owned(),
			log_level: LevelFilter::Warn,
			short_flags: Vec::new(),
		}
	}
}

impl Config {
	pub fn from_env() -> Result<Self, YtFetchError> {
		// A missing .env file is fine, a broken one is not.
		if let Err(e) = dotenv() {
			if !e.not_found() {
				return Err(YtFetchError::Error(e.to_string()));
			}
		}

		let mut config = Config::default();

		if let Ok(engine) = var("YTFETCH_YTDLP") {
			config.engine = engine;
		}

		if let Ok(level) = var("YTFETCH_LOG") {
			config.log_level = level
				.parse()
				.map_err(|_| YtFetchError::Invalid(format!("YTFETCH_LOG={}", level)))?;
		}

		if let Ok(flags) = var("YTFETCH_SHORT_FLAGS") {
			config.short_flags = parse_short_flags(&flags)?;
		}

		Ok(config)
	}
}

/// Parse `o=outtmpl,x=extract_audio` into short flag pairs.
pub fn parse_short_flags(input: &str) -> Result<Vec<(char, String)>, YtFetchError> {
	input
		.split(',')
		.map(str::trim)
		.filter(|pair| !pair.is_empty())
		.map(|pair| {
			let invalid = || YtFetchError::Invalid(format!("short flag mapping '{}'", pair));
			let (short, key) = pair.split_once('=').ok_or_else(invalid)?;

			let mut chars = short.trim().chars();
			let short = match (chars.next(), chars.next()) {
				(Some(c), None) => c,
				_ => return Err(invalid()),
			};

			let key = key.trim();
			if key.is_empty() {
				return Err(invalid());
			}

			Ok((short, key.replace('-', "_")))
		})
		.collect()
}
