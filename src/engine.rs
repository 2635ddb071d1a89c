use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;
use serde::Deserialize;

use crate::error::YtFetchError;
use crate::options::EngineOptions;

/// Marker the progress template puts in front of every progress line.
pub const PROGRESS_MARKER: &str = "[ytfetch:progress]";

pub type EventStream<'a> = Pin<Box<dyn Stream<Item = Result<EngineEvent, YtFetchError>> + Send + 'a>>;

/// The external media engine.
#[async_trait]
pub trait Engine {
	/// Top level metadata without downloading anything.
	async fn fetch_metadata(&self, url: &str, options: &EngineOptions) -> Result<MediaInfo, YtFetchError>;

	/// Download `url`, reporting what the engine does while it runs. The
	/// stream ends with an error if the engine fails.
	fn download<'a>(&'a self, url: &'a str, options: &'a EngineOptions) -> EventStream<'a>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
	Downloading,
	Finished,
	Other(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressEvent {
	pub phase: Phase,
	pub percent: String,
	pub total: String,
	pub speed: String,
}

impl ProgressEvent {
	/// Parse a line produced by [`progress_template`].
	pub fn parse(line: &str) -> Option<Self> {
		let fields = line.trim().strip_prefix(PROGRESS_MARKER)?;
		let mut fields = fields.split('|').map(str::trim);

		let phase = match fields.next()? {
			"downloading" => Phase::Downloading,
			"finished" => Phase::Finished,
			other => Phase::Other(other.to_owned()),
		};
		let mut field = |fallback: &str| {
			fields
				.next()
				.filter(|f| !f.is_empty() && *f != "NA")
				.map(str::to_owned)
				.unwrap_or_else(|| fallback.to_owned())
		};

		Some(Self {
			phase,
			percent: field("0.0%"),
			total: field("N/A"),
			speed: field("N/A"),
		})
	}
}

/// Progress template handed to yt-dlp so progress can be parsed back.
pub fn progress_template() -> String {
	format!(
		"download:{}%(progress.status)s|%(progress._percent_str)s|%(progress._total_bytes_str,progress._total_bytes_estimate_str)s|%(progress._speed_str)s",
		PROGRESS_MARKER
	)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
	Progress(ProgressEvent),
	Debug(String),
	Warning(String),
	Error(String),
}

impl EngineEvent {
	pub fn from_stdout(line: &str) -> Self {
		match ProgressEvent::parse(line) {
			Some(progress) => EngineEvent::Progress(progress),
			None => EngineEvent::Debug(line.to_owned()),
		}
	}

	pub fn from_stderr(line: &str) -> Self {
		if line.starts_with("WARNING:") {
			EngineEvent::Warning(line.to_owned())
		} else if line.starts_with("ERROR:") {
			EngineEvent::Error(line.to_owned())
		} else {
			EngineEvent::Debug(line.to_owned())
		}
	}
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MediaInfo {
	pub title: Option<String>,
	/// Present for playlists only.
	pub entries: Option<Vec<Entry>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Entry {
	pub title: Option<String>,
	pub playlist_index: Option<u64>,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_progress_lines() {
		let line = format!("{}downloading|  42.0%|12.34MiB|1.20MiB/s", PROGRESS_MARKER);

		assert_eq!(
			ProgressEvent::parse(&line),
			Some(ProgressEvent {
				phase: Phase::Downloading,
				percent: "42.0%".to_owned(),
				total: "12.34MiB".to_owned(),
				speed: "1.20MiB/s".to_owned(),
			})
		);
	}

	#[test]
	fn missing_fields_fall_back() {
		let line = format!("{}finished| 100%|NA|NA", PROGRESS_MARKER);
		let event = ProgressEvent::parse(&line).unwrap();

		assert_eq!(event.phase, Phase::Finished);
		assert_eq!(event.total, "N/A");
		assert_eq!(event.speed, "N/A");
	}

	#[test]
	fn ordinary_output_is_debug() {
		assert_eq!(
			EngineEvent::from_stdout("[download] Destination: a.webm"),
			EngineEvent::Debug("[download] Destination: a.webm".to_owned())
		);
		assert_eq!(
			EngineEvent::from_stderr("WARNING: slow"),
			EngineEvent::Warning("WARNING: slow".to_owned())
		);
		assert_eq!(
			EngineEvent::from_stderr("ERROR: gone"),
			EngineEvent::Error("ERROR: gone".to_owned())
		);
	}

	#[test]
	fn metadata_tolerates_missing_fields() {
		let info: MediaInfo = serde_json::from_str(
			r#"{"title": "Mix", "entries": [{"title": "a", "playlist_index": 3}, {"id": "x"}], "extractor": "yt"}"#,
		)
		.unwrap();

		let entries = info.entries.unwrap();
		assert_eq!(entries[0].playlist_index, Some(3));
		assert_eq!(entries[1], Entry::default());
	}
}
