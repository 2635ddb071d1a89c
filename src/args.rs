use clap::Parser;

pub const DEFAULT_QUALITY: &str = "1080";
pub const DEFAULT_OUTPUT_TEMPLATE: &str = "%(title)s.%(ext)s";
/// Value bound to `-list` when it is given without a search term.
pub const LIST_ALL: &str = "default";

/// The wrapper's own flags. URLs and yt-dlp options never reach this parser,
/// they are split off by [`crate::parse::Invocation`] first.
#[derive(Parser, Debug, Default)]
#[command(
	name = "ytfetch",
	args_override_self = true,
	about = "ytfetch: yt-dlp wrapper with flexible args and custom output.",
	override_usage = "ytfetch [OPTIONS] URL... [yt-dlp OPTIONS]",
	after_help = "type yt-dlp -h (or ytfetch -help) for yt-dlp options\nAvoid mixing up options"
)]
pub struct Args {
	#[arg(
		short,
		long,
		default_value = DEFAULT_QUALITY,
		help = "Video quality (e.g., 1080, 720). Default is 1080."
	)]
	pub quality: String,

	#[arg(long, help = "Extract audio only as MP3")]
	pub mp3: bool,

	#[arg(long, help = "Extract audio only (bestaudio)")]
	pub audio: bool,

	#[arg(
		long,
		help = "Download video in AVC (h.264) format (mp4) + extract audio"
	)]
	pub avcmp3: bool,

	#[arg(
		long,
		num_args = 1..,
		value_name = "RANGE",
		help = "Alternate for --playlist-items. Single arg applies globally.\nMultiple args must match number of playlist URLs provided."
	)]
	pub fetch: Vec<String>,

	#[arg(
		long,
		num_args = 0..=1,
		default_missing_value = LIST_ALL,
		value_name = "TERM",
		help = "List playlist contents. Accepts values for searching across playlist"
	)]
	pub list: Option<String>,

	#[arg(
		short,
		long,
		value_name = "TEMPLATE",
		help = "Output filename template (yt-dlp syntax)"
	)]
	pub output: Option<String>,

	#[arg(long = "engine-help", hide = true)]
	pub engine_help: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListMode {
	Off,
	All,
	Search(String),
}

impl ListMode {
	pub fn is_on(&self) -> bool {
		!matches!(self, ListMode::Off)
	}
}

impl Args {
	pub fn list_mode(&self) -> ListMode {
		match self.list.as_deref() {
			None => ListMode::Off,
			Some(LIST_ALL) => ListMode::All,
			Some(term) => ListMode::Search(term.to_owned()),
		}
	}

	pub fn output_template(&self) -> &str {
		self.output.as_deref().unwrap_or(DEFAULT_OUTPUT_TEMPLATE)
	}
}
