/// Engine messages worth showing during a download.
const DEBUG_PHRASES: &[&str] = &[
	"Downloading playlist:",
	"Downloading item",
	"Resuming",
	"Destination:",
	"already been downloaded",
	"Finished downloading",
];

/// Harmless warning yt-dlp prints for many YouTube videos.
const NOISE_WARNING: &str = "Some web client https formats have been skipped";

/// Receives the messages the engine reports while it works.
pub trait Notifier {
	fn on_debug(&self, msg: &str);
	fn on_warning(&self, msg: &str);
	fn on_error(&self, msg: &str);
}

/// Used for downloads: a filtered view of what the engine is doing.
pub struct VerboseNotifier;

impl VerboseNotifier {
	/// What, if anything, to print for a debug message.
	pub fn debug_line(msg: &str) -> Option<String> {
		if DEBUG_PHRASES.iter().any(|phrase| msg.contains(phrase)) {
			return Some(msg.replace("[download] ", ""));
		}
		if msg.contains("Merging formats") {
			return Some(msg.replace("[Merger] ", ""));
		}
		None
	}

	pub fn is_noise(msg: &str) -> bool {
		msg.contains(NOISE_WARNING)
	}
}

impl Notifier for VerboseNotifier {
	fn on_debug(&self, msg: &str) {
		if let Some(line) = Self::debug_line(msg) {
			println!("{}", line);
		}
	}

	fn on_warning(&self, msg: &str) {
		if !Self::is_noise(msg) {
			println!("{}", msg);
		}
	}

	fn on_error(&self, msg: &str) {
		println!("{}", msg);
	}
}

/// Used for listing, where only failures matter.
pub struct ErrorOnlyNotifier;

impl Notifier for ErrorOnlyNotifier {
	fn on_debug(&self, _msg: &str) {}

	fn on_warning(&self, _msg: &str) {}

	fn on_error(&self, msg: &str) {
		println!("{}", msg);
	}
}

pub fn for_mode(listing: bool) -> Box<dyn Notifier> {
	if listing {
		Box::new(ErrorOnlyNotifier)
	} else {
		Box::new(VerboseNotifier)
	}
}
