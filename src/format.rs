use crate::args::{Args, DEFAULT_QUALITY};
use crate::options::PostProcessor;

/// Target bitrate (kbps) for every MP3 ytfetch produces.
pub const MP3_BITRATE: u32 = 192;
/// Container forced when AVC video is muxed with MP3 audio.
pub const AVC_CONTAINER: &str = "mp4";

/// Height ceiling for video downloads, e.g. `720` from `720p`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quality(String);

impl Quality {
	pub fn new(value: &str) -> Self {
		if value == DEFAULT_QUALITY {
			return Self(value.to_owned());
		}
		Self(value.trim_end_matches(['p', 'P']).to_owned())
	}

	pub fn height(&self) -> &str {
		&self.0
	}
}

/// What kind of file a download should end up as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
	/// Best audio stream, kept in its own codec.
	Audio,
	/// Best audio stream, converted to MP3.
	Mp3,
	/// AVC video up to the height ceiling, audio re-encoded to MP3.
	AvcMp3,
	/// Best video up to the height ceiling with best audio.
	Video,
}

impl Strategy {
	/// Resolve the mode flags. `-mp3` beats `-audio`, both beat `-avcmp3`.
	pub fn from_flags(mp3: bool, audio: bool, avcmp3: bool) -> Self {
		match (mp3, audio, avcmp3) {
			(true, _, _) => Strategy::Mp3,
			(false, true, _) => Strategy::Audio,
			(false, false, true) => Strategy::AvcMp3,
			(false, false, false) => Strategy::Video,
		}
	}

	pub fn from_args(args: &Args) -> Self {
		Self::from_flags(args.mp3, args.audio, args.avcmp3)
	}

	pub fn format_selector(&self, quality: &Quality) -> String {
		let height = quality.height();

		match self {
			Strategy::Audio | Strategy::Mp3 => "bestaudio".to_owned(),
			Strategy::AvcMp3 => format!(
				"bestvideo[vcodec^=avc1][height<={h}]+bestaudio/best[height<={h}]",
				h = height
			),
			Strategy::Video => format!(
				"bestvideo[height<={h}]+bestaudio/best[height<={h}]",
				h = height
			),
		}
	}

	pub fn post_processors(&self) -> Vec<PostProcessor> {
		match self {
			Strategy::Mp3 => vec![PostProcessor::ExtractAudio {
				codec: "mp3".to_owned(),
				quality: MP3_BITRATE,
			}],
			Strategy::AvcMp3 => vec![PostProcessor::VideoConvertor {
				format: AVC_CONTAINER.to_owned(),
				args: vec![
					"-c:v".to_owned(),
					"copy".to_owned(),
					"-c:a".to_owned(),
					"libmp3lame".to_owned(),
					"-b:a".to_owned(),
					format!("{}k", MP3_BITRATE),
				],
			}],
			Strategy::Audio | Strategy::Video => Vec::new(),
		}
	}

	/// Container yt-dlp must merge into, if any.
	pub fn merge_output_format(&self) -> Option<&'static str> {
		match self {
			Strategy::AvcMp3 => Some(AVC_CONTAINER),
			_ => None,
		}
	}
}
