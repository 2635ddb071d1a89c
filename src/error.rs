use core::fmt;
use std::io::ErrorKind;

use log::SetLoggerError;

#[derive(Debug)]
pub enum YtFetchError {
	Error(String),
	Usage(clap::Error),
	NoUrls,
	FetchRangeMismatch { ranges: usize, urls: usize },
	ArgumentOrder { flag: String, value: String },
	MissingValue(String),
	MalformedArgument(String),
	EngineNotFound(String),
	EngineFailed(String),
	IoError(ErrorKind, String),
	Invalid(String),
}

impl YtFetchError {
	/// Process exit status for a fatal error.
	pub fn exit_code(&self) -> i32 {
		match self {
			YtFetchError::Usage(e) if !e.use_stderr() => 0,
			_ => 1,
		}
	}
}

impl fmt::Display for YtFetchError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			YtFetchError::Error(e) => write!(f, "{}", e),
			YtFetchError::Usage(e) => write!(f, "{}", e),
			YtFetchError::NoUrls => write!(f, "No URLs provided."),
			YtFetchError::FetchRangeMismatch { ranges, urls } => write!(
				f,
				"Provided {} fetch ranges for {} URLs (mismatched counts).",
				ranges, urls
			),
			YtFetchError::ArgumentOrder { flag, value } => write!(
				f,
				"Argument ordering error: {} received URL '{}' as its value. Put URLs before or after the option and its value.",
				flag, value
			),
			YtFetchError::MissingValue(flag) => write!(f, "Option {} expects a value", flag),
			YtFetchError::MalformedArgument(e) => write!(f, "Malformed argument: {}", e),
			YtFetchError::EngineNotFound(e) => write!(f, "Download engine '{}' not found on PATH", e),
			YtFetchError::EngineFailed(e) => write!(f, "{}", e),
			YtFetchError::IoError(kind, e) => write!(f, "IO error: {:?} - {}", kind, e),
			YtFetchError::Invalid(e) => write!(f, "Invalid: {}", e),
		}
	}
}

impl std::error::Error for YtFetchError {}

impl From<std::io::Error> for YtFetchError {
	fn from(e: std::io::Error) -> Self {
		Self::IoError(e.kind(), e.to_string())
	}
}

impl From<serde_json::Error> for YtFetchError {
	fn from(e: serde_json::Error) -> Self {
		Self::Invalid(e.to_string())
	}
}

impl From<SetLoggerError> for YtFetchError {
	fn from(e: SetLoggerError) -> Self {
		Self::Error(e.to_string())
	}
}

impl From<clap::Error> for YtFetchError {
	fn from(e: clap::Error) -> Self {
		Self::Usage(e)
	}
}
