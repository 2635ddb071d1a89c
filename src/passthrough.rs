//! Translation of the tokens ytfetch does not understand into yt-dlp options.
//!
//! The walk is a heuristic: it knows nothing about which yt-dlp options take
//! a value, so a long flag swallows the following token unless that token
//! looks like another flag or a URL.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::YtFetchError;
use crate::parse::is_url;

/// Short flags that are known under a different option name.
const SHORT_FLAGS: &[(char, &str)] = &[
	('o', "outtmpl"),
	('f', "format"),
	('j', "dumpjson"),
	('F', "listformats"),
	('r', "limitrate"),
	('I', "playlist_items"),
	('a', "auto_number"),
	('s', "simulate"),
	('g', "geturl"),
	('J', "dump_single_json"),
];

/// Command line spellings for option names that do not follow the
/// `--name-with-dashes` rule.
const LONG_SPELLINGS: &[(&str, &str)] = &[
	("outtmpl", "--output"),
	("dumpjson", "--dump-json"),
	("listformats", "--list-formats"),
	("limitrate", "--limit-rate"),
	("geturl", "--get-url"),
	("auto_number", "--batch-file"),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum OptionValue {
	Flag(bool),
	Text(String),
}

/// Short flag lookup table. Unknown short flags pass through under their own
/// letter instead of being dropped.
#[derive(Debug, Clone)]
pub struct FlagTable {
	shorts: Vec<(char, String)>,
}

impl Default for FlagTable {
	fn default() -> Self {
		Self {
			shorts: SHORT_FLAGS
				.iter()
				.map(|(short, key)| (*short, (*key).to_owned()))
				.collect(),
		}
	}
}

impl FlagTable {
	/// Default table extended (and overridden) by `extra`.
	pub fn with_extra(extra: &[(char, String)]) -> Self {
		let mut table = Self::default();
		for (short, key) in extra {
			table.shorts.retain(|(c, _)| c != short);
			table.shorts.push((*short, key.clone()));
		}
		table
	}

	/// Option name for a single dash key.
	pub fn resolve(&self, key: &str) -> String {
		let mut chars = key.chars();
		if let (Some(c), None) = (chars.next(), chars.next()) {
			if let Some((_, name)) = self.shorts.iter().find(|(short, _)| *short == c) {
				return name.clone();
			}
		}
		key.to_owned()
	}

	fn long_spelling(key: &str) -> String {
		LONG_SPELLINGS
			.iter()
			.find(|(name, _)| *name == key)
			.map(|(_, flag)| (*flag).to_owned())
			.unwrap_or_else(|| format!("--{}", key.replace('_', "-")))
	}

	/// Command line flag for an option name.
	pub fn spelling(&self, key: &str) -> String {
		if key.chars().count() == 1 {
			format!("-{}", key)
		} else {
			Self::long_spelling(key)
		}
	}

	pub fn negated_spelling(&self, key: &str) -> String {
		format!("--no-{}", Self::long_spelling(key).trim_start_matches("--"))
	}
}

/// Options the user set explicitly, keyed by normalized name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PassthroughOptions(BTreeMap<String, OptionValue>);

impl PassthroughOptions {
	#[cfg(test)]
	pub fn get(&self, key: &str) -> Option<&OptionValue> {
		self.0.get(key)
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	fn insert(&mut self, key: String, value: OptionValue) {
		self.0.insert(key, value);
	}

	/// Render back into yt-dlp arguments.
	pub fn to_args(&self, table: &FlagTable) -> Vec<String> {
		let mut args = Vec::new();
		for (key, value) in &self.0 {
			match value {
				OptionValue::Flag(true) => args.push(table.spelling(key)),
				OptionValue::Flag(false) => args.push(table.negated_spelling(key)),
				OptionValue::Text(text) => {
					args.push(table.spelling(key));
					args.push(text.clone());
				}
			}
		}
		args
	}
}

fn normalize(key: &str) -> String {
	key.replace('-', "_")
}

fn malformed(token: &str) -> YtFetchError {
	YtFetchError::MalformedArgument(format!("unrecognized option '{}'", token))
}

/// Value for a flag at `tokens[i]` given without `=`. Returns how many tokens
/// were consumed.
fn bind_next(tokens: &[String], i: usize) -> (OptionValue, usize) {
	match tokens.get(i + 1) {
		Some(next) if !next.starts_with('-') && !is_url(next) => (OptionValue::Text(next.clone()), 2),
		_ => (OptionValue::Flag(true), 1),
	}
}

pub fn translate(tokens: &[String], table: &FlagTable) -> Result<PassthroughOptions, YtFetchError> {
	let mut options = PassthroughOptions::default();
	let mut i = 0;

	while i < tokens.len() {
		let token = &tokens[i];

		if let Some(long) = token.strip_prefix("--") {
			let (key, inline) = match long.split_once('=') {
				Some((key, value)) => (normalize(key), Some(value)),
				None => (normalize(long), None),
			};
			if key.is_empty() {
				return Err(malformed(token));
			}

			// --no-x and --no-x=anything both switch x off
			if let Some(negated) = key.strip_prefix("no_").filter(|k| !k.is_empty()) {
				options.insert(negated.to_owned(), OptionValue::Flag(false));
				i += 1;
				continue;
			}

			match inline {
				Some(value) => {
					options.insert(key, OptionValue::Text(value.to_owned()));
					i += 1;
				}
				None => {
					let (value, consumed) = bind_next(tokens, i);
					options.insert(key, value);
					i += consumed;
				}
			}
		} else if let Some(short) = token.strip_prefix('-') {
			if short.is_empty() {
				return Err(malformed(token));
			}

			// -abc is three switches
			if token.chars().count() > 2 && !token.contains('=') {
				for c in short.chars() {
					options.insert(c.to_string(), OptionValue::Flag(true));
				}
				i += 1;
				continue;
			}

			match short.split_once('=') {
				Some((key, _)) if key.is_empty() => return Err(malformed(token)),
				Some((key, value)) => {
					options.insert(table.resolve(key), OptionValue::Text(value.to_owned()));
					i += 1;
				}
				None => {
					let (value, consumed) = bind_next(tokens, i);
					options.insert(table.resolve(short), value);
					i += consumed;
				}
			}
		} else {
			i += 1;
		}
	}

	Ok(options)
}
