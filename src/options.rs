use serde::Serialize;

use crate::args::Args;
use crate::format::{Quality, Strategy};
use crate::passthrough::{FlagTable, PassthroughOptions};

/// A step yt-dlp runs through ffmpeg once the streams are downloaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "key")]
pub enum PostProcessor {
	#[serde(rename = "FFmpegExtractAudio")]
	ExtractAudio {
		#[serde(rename = "preferredcodec")]
		codec: String,
		#[serde(rename = "preferredquality", serialize_with = "as_string")]
		quality: u32,
	},
	#[serde(rename = "FFmpegVideoConvertor")]
	VideoConvertor {
		#[serde(rename = "preferredformat")]
		format: String,
		#[serde(rename = "postprocessor_args")]
		args: Vec<String>,
	},
}

fn as_string<S: serde::Serializer>(value: &u32, serializer: S) -> Result<S::Ok, S::Error> {
	serializer.collect_str(value)
}

impl PostProcessor {
	pub fn to_args(&self) -> Vec<String> {
		match self {
			PostProcessor::ExtractAudio { codec, quality } => vec![
				"--extract-audio".to_owned(),
				"--audio-format".to_owned(),
				codec.clone(),
				"--audio-quality".to_owned(),
				format!("{}K", quality),
			],
			PostProcessor::VideoConvertor { format, args } => vec![
				"--recode-video".to_owned(),
				format.clone(),
				"--postprocessor-args".to_owned(),
				format!("VideoConvertor:{}", args.join(" ")),
			],
		}
	}
}

/// Everything handed to yt-dlp for one call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EngineOptions {
	pub outtmpl: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub format: Option<String>,
	#[serde(skip_serializing_if = "Vec::is_empty")]
	pub postprocessors: Vec<PostProcessor>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub merge_output_format: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub playlist_items: Option<String>,
	#[serde(skip_serializing_if = "std::ops::Not::not")]
	pub extract_flat: bool,
	#[serde(flatten)]
	pub passthrough: PassthroughOptions,
}

impl EngineOptions {
	/// Options for a download run.
	pub fn for_download(args: &Args, passthrough: PassthroughOptions) -> Self {
		let strategy = Strategy::from_args(args);
		let quality = Quality::new(&args.quality);

		Self {
			outtmpl: args.output_template().to_owned(),
			format: Some(strategy.format_selector(&quality)),
			postprocessors: strategy.post_processors(),
			merge_output_format: strategy.merge_output_format().map(str::to_owned),
			passthrough,
			..Default::default()
		}
	}

	/// Options for listing: flat extraction, no format selection.
	pub fn for_listing(args: &Args, passthrough: PassthroughOptions) -> Self {
		Self {
			outtmpl: args.output_template().to_owned(),
			extract_flat: true,
			passthrough,
			..Default::default()
		}
	}

	pub fn with_playlist_items(&self, items: Option<&str>) -> Self {
		Self {
			playlist_items: items.map(str::to_owned),
			..self.clone()
		}
	}

	/// Render as yt-dlp arguments. Passthrough options come last so they win
	/// over anything ytfetch derived itself.
	pub fn to_args(&self, table: &FlagTable) -> Vec<String> {
		let mut args = vec!["-o".to_owned(), self.outtmpl.clone()];

		if let Some(format) = &self.format {
			args.push("-f".to_owned());
			args.push(format.clone());
		}
		if let Some(merge) = &self.merge_output_format {
			args.push("--merge-output-format".to_owned());
			args.push(merge.clone());
		}
		for post_processor in &self.postprocessors {
			args.extend(post_processor.to_args());
		}
		if let Some(items) = &self.playlist_items {
			args.push("--playlist-items".to_owned());
			args.push(items.clone());
		}
		if self.extract_flat {
			args.push("--flat-playlist".to_owned());
		}

		args.extend(self.passthrough.to_args(table));
		args
	}
}

#[cfg(test)]
mod tests {
	use clap::Parser;

	use super::*;
	use crate::passthrough::translate;

	fn args(tokens: &[&str]) -> Args {
		Args::try_parse_from(std::iter::once("ytfetch").chain(tokens.iter().copied())).unwrap()
	}

	#[test]
	fn mp3_download_options() {
		let options = EngineOptions::for_download(&args(&["--quality=720", "--mp3"]), Default::default());

		assert_eq!(options.format.as_deref(), Some("bestaudio"));
		assert_eq!(
			options.to_args(&FlagTable::default()),
			vec![
				"-o",
				"%(title)s.%(ext)s",
				"-f",
				"bestaudio",
				"--extract-audio",
				"--audio-format",
				"mp3",
				"--audio-quality",
				"192K",
			]
		);
	}

	#[test]
	fn avc_download_forces_mp4() {
		let options = EngineOptions::for_download(&args(&["--avcmp3"]), Default::default());
		let rendered = options.to_args(&FlagTable::default());

		assert!(rendered.windows(2).any(|w| w == ["--merge-output-format", "mp4"]));
		assert!(rendered
			.windows(2)
			.any(|w| w == ["--postprocessor-args", "VideoConvertor:-c:v copy -c:a libmp3lame -b:a 192k"]));
	}

	#[test]
	fn listing_never_selects_a_format() {
		let options = EngineOptions::for_listing(&args(&["--list", "--mp3"]), Default::default())
			.with_playlist_items(Some("1-3"));

		assert_eq!(options.format, None);
		assert!(options.postprocessors.is_empty());
		assert_eq!(
			options.to_args(&FlagTable::default()),
			vec!["-o", "%(title)s.%(ext)s", "--playlist-items", "1-3", "--flat-playlist"]
		);
	}

	#[test]
	fn passthrough_is_rendered_last() {
		let table = FlagTable::default();
		let passthrough = translate(&["-f".to_owned(), "worst".to_owned()], &table).unwrap();
		let options = EngineOptions::for_download(&args(&[]), passthrough);
		let rendered = options.to_args(&table);

		assert_eq!(&rendered[rendered.len() - 2..], ["--format", "worst"]);
	}

	#[test]
	fn serializes_in_engine_shape() {
		let options = EngineOptions::for_download(&args(&["--mp3"]), Default::default());
		let json = serde_json::to_value(&options).unwrap();

		assert_eq!(
			json["postprocessors"][0],
			serde_json::json!({
				"key": "FFmpegExtractAudio",
				"preferredcodec": "mp3",
				"preferredquality": "192",
			})
		);
		assert_eq!(json["format"], "bestaudio");
		assert!(json.get("extract_flat").is_none());
	}
}
