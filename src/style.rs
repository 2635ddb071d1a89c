use std::io::{stdout, IsTerminal, Write};

use colored::Colorize;

use crate::engine::{Phase, ProgressEvent};

/// Output formatting settings, decided once at startup.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
	color: bool,
}

impl Palette {
	pub fn new(color: bool) -> Self {
		Self { color }
	}

	/// Color when stdout is a terminal and `NO_COLOR` is unset.
	pub fn detect() -> Self {
		Self::new(stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none())
	}

	#[cfg(test)]
	pub fn plain() -> Self {
		Self::new(false)
	}

	pub fn accent(&self, text: &str) -> String {
		if self.color {
			text.cyan().to_string()
		} else {
			text.to_owned()
		}
	}

	pub fn highlight(&self, text: &str) -> String {
		if self.color {
			text.yellow().to_string()
		} else {
			text.to_owned()
		}
	}

	pub fn error(&self, text: &str) -> String {
		if self.color {
			text.red().to_string()
		} else {
			text.to_owned()
		}
	}
}

/// Rewrites a single status line in place while a download runs.
#[derive(Default)]
pub struct ProgressLine {
	open: bool,
}

impl ProgressLine {
	pub fn render(event: &ProgressEvent) -> String {
		format!("{} of {} at {}", event.percent, event.total, event.speed)
	}

	pub fn update(&mut self, event: &ProgressEvent) {
		match event.phase {
			Phase::Downloading => {
				print!("\r{}", Self::render(event));
				let _ = stdout().flush();
				self.open = true;
			}
			Phase::Finished => self.close(),
			Phase::Other(_) => {}
		}
	}

	/// End the status line so the next message starts on its own line.
	pub fn close(&mut self) {
		if self.open {
			println!();
			self.open = false;
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn plain_palette_leaves_text_alone() {
		let palette = Palette::plain();

		assert_eq!(palette.accent("Mix"), "Mix");
		assert_eq!(palette.highlight("foo"), "foo");
	}

	#[test]
	fn renders_progress_status() {
		let event = ProgressEvent {
			phase: Phase::Downloading,
			percent: "5.0%".to_owned(),
			total: "3.00MiB".to_owned(),
			speed: "N/A".to_owned(),
		};

		assert_eq!(ProgressLine::render(&event), "5.0% of 3.00MiB at N/A");
	}
}
