use std::ffi::OsString;

use clap::Parser;

use crate::args::Args;
use crate::error::YtFetchError;

/// Scheme prefixes that mark a token as a URL.
pub const URL_SCHEMES: &[&str] = &["http://", "https://"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Arity {
	Switch,
	One,
	OneOrMore,
	Optional,
}

struct WrapperFlag {
	names: &'static [&'static str],
	/// Spelling handed to clap.
	canonical: &'static str,
	arity: Arity,
}

const WRAPPER_FLAGS: &[WrapperFlag] = &[
	WrapperFlag {
		names: &["-q", "--quality"],
		canonical: "--quality",
		arity: Arity::One,
	},
	WrapperFlag {
		names: &["-o", "--output"],
		canonical: "--output",
		arity: Arity::One,
	},
	WrapperFlag {
		names: &["-mp3", "--mp3"],
		canonical: "--mp3",
		arity: Arity::Switch,
	},
	WrapperFlag {
		names: &["-audio", "--audio"],
		canonical: "--audio",
		arity: Arity::Switch,
	},
	WrapperFlag {
		names: &["-avcmp3", "--avcmp3"],
		canonical: "--avcmp3",
		arity: Arity::Switch,
	},
	WrapperFlag {
		names: &["-fetch", "--fetch"],
		canonical: "--fetch",
		arity: Arity::OneOrMore,
	},
	WrapperFlag {
		names: &["-list", "--list"],
		canonical: "--list",
		arity: Arity::Optional,
	},
	WrapperFlag {
		names: &["-h", "--help"],
		canonical: "--help",
		arity: Arity::Switch,
	},
	WrapperFlag {
		names: &["-help"],
		canonical: "--engine-help",
		arity: Arity::Switch,
	},
];

pub fn is_url(token: &str) -> bool {
	URL_SCHEMES.iter().any(|scheme| token.starts_with(scheme))
}

/// Command line tokens as strings. A token that is not valid UTF-8 is an
/// error instead of a panic.
pub fn utf8_tokens<I>(tokens: I) -> Result<Vec<String>, YtFetchError>
where
	I: IntoIterator<Item = OsString>,
{
	tokens
		.into_iter()
		.map(|token| {
			token.into_string().map_err(|token| {
				YtFetchError::Invalid(format!("argument is not valid UTF-8: {}", token.to_string_lossy()))
			})
		})
		.collect()
}

fn lookup(name: &str) -> Option<&'static WrapperFlag> {
	WRAPPER_FLAGS.iter().find(|flag| flag.names.contains(&name))
}

/// One command line, split into the wrapper's flags, the URLs and whatever
/// is left for yt-dlp.
#[derive(Debug)]
pub struct Invocation {
	pub args: Args,
	pub urls: Vec<String>,
	pub leftover: Vec<String>,
}

impl Invocation {
	pub fn from_tokens<I>(tokens: I) -> Result<Invocation, YtFetchError>
	where
		I: IntoIterator,
		I::Item: Into<String>,
	{
		let mut urls = Vec::new();
		let mut leftover = Vec::new();
		let mut wrapper = vec!["ytfetch".to_owned()];

		let mut tokens = tokens.into_iter().map(Into::<String>::into).peekable();

		while let Some(token) = tokens.next() {
			// URLs win over everything else.
			if is_url(&token) {
				urls.push(token);
				continue;
			}

			let (name, inline) = match token.split_once('=') {
				Some((name, value)) if lookup(name).is_some() => (name, Some(value.to_owned())),
				_ => (token.as_str(), None),
			};

			let Some(flag) = lookup(name) else {
				leftover.push(token);
				continue;
			};

			let check = |value: String| {
				if is_url(&value) {
					Err(YtFetchError::ArgumentOrder {
						flag: name.to_owned(),
						value,
					})
				} else {
					Ok(value)
				}
			};

			let takes_next = |next: Option<&String>| next.is_some_and(|t| !t.starts_with('-'));

			match flag.arity {
				Arity::Switch => {
					if inline.is_some() {
						return Err(YtFetchError::MalformedArgument(format!(
							"{} does not take a value",
							name
						)));
					}
					wrapper.push(flag.canonical.to_owned());
				}
				Arity::One => {
					let value = match inline {
						Some(value) => value,
						None if takes_next(tokens.peek()) => tokens.next().unwrap_or_default(),
						None => return Err(YtFetchError::MissingValue(name.to_owned())),
					};
					wrapper.push(format!("{}={}", flag.canonical, check(value)?));
				}
				Arity::Optional => match inline {
					Some(value) => wrapper.push(format!("{}={}", flag.canonical, check(value)?)),
					None if takes_next(tokens.peek()) => {
						let value = check(tokens.next().unwrap_or_default())?;
						wrapper.push(format!("{}={}", flag.canonical, value));
					}
					None => wrapper.push(flag.canonical.to_owned()),
				},
				Arity::OneOrMore => {
					let mut values = Vec::new();
					if let Some(value) = inline {
						values.push(check(value)?);
					}
					while takes_next(tokens.peek()) {
						values.push(check(tokens.next().unwrap_or_default())?);
					}
					if values.is_empty() {
						return Err(YtFetchError::MissingValue(name.to_owned()));
					}

					wrapper.push(flag.canonical.to_owned());
					wrapper.extend(values);
				}
			}
		}

		log::debug!("wrapper flags: {:?}", &wrapper[1..]);

		let args = Args::try_parse_from(wrapper)?;

		Ok(Invocation {
			args,
			urls,
			leftover,
		})
	}

	/// Check URL presence and fetch range cardinality.
	pub fn validate(&self) -> Result<(), YtFetchError> {
		if self.urls.is_empty() && !self.args.list_mode().is_on() {
			return Err(YtFetchError::NoUrls);
		}

		validate_fetch_ranges(&self.args.fetch, &self.urls)
	}

	/// Pair every URL with the playlist range that applies to it.
	pub fn url_ranges(&self) -> Vec<(&str, Option<&str>)> {
		let ranges = &self.args.fetch;

		self.urls
			.iter()
			.enumerate()
			.map(|(i, url)| {
				let range = match ranges.len() {
					0 => None,
					1 => Some(ranges[0].as_str()),
					_ => ranges.get(i).map(String::as_str),
				};
				(url.as_str(), range)
			})
			.collect()
	}
}

/// A single range applies to every URL, otherwise there must be one per URL.
pub fn validate_fetch_ranges(ranges: &[String], urls: &[String]) -> Result<(), YtFetchError> {
	match ranges.len() {
		0 | 1 => Ok(()),
		n if n == urls.len() => Ok(()),
		n => Err(YtFetchError::FetchRangeMismatch {
			ranges: n,
			urls: urls.len(),
		}),
	}
}

#[cfg(test)]
mod tests {
	use assert_matches::assert_matches;

	use super::*;
	use crate::args::ListMode;

	fn invocation(tokens: &[&str]) -> Result<Invocation, YtFetchError> {
		Invocation::from_tokens(tokens.iter().copied())
	}

	#[test]
	fn splits_urls_flags_and_leftovers() {
		let inv = invocation(&[
			"-q",
			"720",
			"-mp3",
			"https://x/v1",
			"--embed-thumbnail",
			"http://x/v2",
		])
		.unwrap();

		assert_eq!(inv.urls, vec!["https://x/v1", "http://x/v2"]);
		assert_eq!(inv.leftover, vec!["--embed-thumbnail"]);
		assert_eq!(inv.args.quality, "720");
		assert!(inv.args.mp3);
		assert!(inv.validate().is_ok());
	}

	#[test]
	fn urls_keep_their_order_and_never_leak_into_leftovers() {
		let inv = invocation(&["https://a", "--limit-rate", "https://b", "-x", "https://c"]).unwrap();

		assert_eq!(inv.urls, vec!["https://a", "https://b", "https://c"]);
		assert_eq!(inv.leftover, vec!["--limit-rate", "-x"]);
	}

	#[test]
	fn double_dash_spellings_are_accepted() {
		let inv = invocation(&["--avcmp3", "--quality=480p", "https://x"]).unwrap();

		assert!(inv.args.avcmp3);
		assert_eq!(inv.args.quality, "480p");
	}

	#[test]
	fn no_urls_without_list_is_fatal() {
		let inv = invocation(&["-mp3"]).unwrap();

		assert_matches!(inv.validate(), Err(YtFetchError::NoUrls));
	}

	#[test]
	fn list_mode_tolerates_no_urls() {
		let inv = invocation(&["-list"]).unwrap();

		assert_eq!(inv.args.list_mode(), ListMode::All);
		assert!(inv.validate().is_ok());
	}

	#[test]
	fn list_takes_a_search_term() {
		let inv = invocation(&["https://x/p", "-list", "foo"]).unwrap();

		assert_eq!(inv.args.list_mode(), ListMode::Search("foo".to_owned()));
		assert_eq!(inv.urls, vec!["https://x/p"]);
	}

	#[test]
	fn url_in_list_value_position_is_an_ordering_error() {
		assert_matches!(
			invocation(&["-list", "https://x/p"]),
			Err(YtFetchError::ArgumentOrder { flag, .. }) if flag == "-list"
		);
	}

	#[test]
	fn url_in_fetch_values_is_an_ordering_error() {
		assert_matches!(
			invocation(&["-fetch", "1-3", "https://x/p"]),
			Err(YtFetchError::ArgumentOrder { .. })
		);
	}

	#[test]
	fn mismatched_fetch_ranges_are_rejected() {
		let inv = invocation(&["https://x/p", "-fetch", "1-3", "5"]).unwrap();

		assert_eq!(inv.args.fetch, vec!["1-3", "5"]);
		assert_matches!(
			inv.validate(),
			Err(YtFetchError::FetchRangeMismatch { ranges: 2, urls: 1 })
		);
	}

	#[test]
	fn fetch_range_cardinality() {
		let urls: Vec<String> = vec!["https://a".into(), "https://b".into(), "https://c".into()];
		let ranges = |k: usize| (0..k).map(|i| format!("{}", i + 1)).collect::<Vec<_>>();

		for k in 0..6 {
			let result = validate_fetch_ranges(&ranges(k), &urls);
			assert_eq!(result.is_ok(), k <= 1 || k == urls.len(), "k = {}", k);
		}
	}

	#[test]
	fn single_range_applies_to_every_url() {
		let inv = invocation(&["https://a", "https://b", "-fetch", "2-4"]).unwrap();

		assert_eq!(
			inv.url_ranges(),
			vec![("https://a", Some("2-4")), ("https://b", Some("2-4"))]
		);
	}

	#[test]
	fn ranges_zip_positionally() {
		let inv = invocation(&["https://a", "https://b", "-fetch", "1", "3-"]).unwrap();

		assert_eq!(
			inv.url_ranges(),
			vec![("https://a", Some("1")), ("https://b", Some("3-"))]
		);
	}

	#[test]
	fn quality_without_value_is_missing() {
		assert_matches!(
			invocation(&["https://a", "-q"]),
			Err(YtFetchError::MissingValue(flag)) if flag == "-q"
		);
	}

	#[test]
	fn help_is_reported_as_usage() {
		let error = invocation(&["-h"]).unwrap_err();

		assert_matches!(error, YtFetchError::Usage(_));
		assert_eq!(error.exit_code(), 0);
	}

	#[test]
	fn engine_help_is_its_own_flag() {
		let inv = invocation(&["-help"]).unwrap();

		assert!(inv.args.engine_help);
	}

	#[test]
	fn utf8_tokens_pass_through() {
		let tokens = utf8_tokens(vec![OsString::from("-mp3"), OsString::from("https://x")]).unwrap();

		assert_eq!(tokens, vec!["-mp3", "https://x"]);
	}

	#[cfg(unix)]
	#[test]
	fn non_utf8_token_is_invalid() {
		use std::os::unix::ffi::OsStringExt;

		let tokens = vec![OsString::from("-q"), OsString::from_vec(vec![0x66, 0x6f, 0xff])];

		assert_matches!(
			utf8_tokens(tokens),
			Err(YtFetchError::Invalid(msg)) if msg.contains("not valid UTF-8")
		);
	}
}
