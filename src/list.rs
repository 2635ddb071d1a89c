use crate::args::ListMode;
use crate::engine::{Engine, MediaInfo};
use crate::notify::Notifier;
use crate::options::EngineOptions;
use crate::style::Palette;

/// Lines to print for one URL's metadata.
pub fn render(info: &MediaInfo, mode: &ListMode, palette: &Palette) -> Vec<String> {
	let title = info.title.as_deref().unwrap_or("Unknown");

	let Some(entries) = &info.entries else {
		return vec![format!("Single Video: {}", title)];
	};

	let mut lines = vec![
		format!("{} Playlist: {}", palette.accent(">"), palette.accent(title)),
		" -".repeat(20),
	];

	let pattern = match mode {
		ListMode::Search(term) => Some(term.to_lowercase()),
		_ => None,
	};

	let mut found = false;
	for (i, entry) in entries.iter().enumerate() {
		let index = entry.playlist_index.unwrap_or(i as u64 + 1);
		let entry_title = entry.title.as_deref().unwrap_or("Unknown");

		if let Some(pattern) = &pattern {
			if !entry_title.to_lowercase().contains(pattern.as_str()) {
				continue;
			}
		}

		found = true;
		lines.push(format!(
			"{} - {}",
			palette.accent(&format!("{:>4}", index)),
			entry_title
		));
	}

	if let (Some(pattern), false) = (&pattern, found) {
		lines.push(format!("No match found for {}", palette.highlight(pattern)));
	}

	lines
}

/// List (or search) each URL, handing every line to `emit`. A URL that fails
/// is reported and skipped.
pub async fn list_all<E: Engine>(
	engine: &E,
	jobs: &[(&str, Option<&str>)],
	options: &EngineOptions,
	mode: &ListMode,
	notifier: &dyn Notifier,
	palette: &Palette,
	emit: &mut dyn FnMut(String),
) {
	for (url, range) in jobs {
		let options = options.with_playlist_items(*range);

		match engine.fetch_metadata(url, &options).await {
			Ok(info) => render(&info, mode, palette).into_iter().for_each(&mut *emit),
			Err(e) => {
				log::debug!("listing {} failed: {:?}", url, e);
				notifier.on_error(&palette.error(&format!("Error listing {}: {}", url, e)));
			}
		}
	}
}
