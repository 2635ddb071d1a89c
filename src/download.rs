use std::process::{ExitStatus, Stdio};

use async_stream::try_stream;
use async_trait::async_trait;
use futures::{Stream, StreamExt};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;

use crate::engine::{progress_template, Engine, EngineEvent, EventStream, MediaInfo};
use crate::error::YtFetchError;
use crate::notify::Notifier;
use crate::options::EngineOptions;
use crate::passthrough::FlagTable;
use crate::style::{Palette, ProgressLine};

/// yt-dlp run as an external process.
pub struct YtDlp {
	binary: String,
	flags: FlagTable,
}

impl YtDlp {
	/// Resolve `binary` on PATH.
	pub fn new(binary: &str, flags: FlagTable) -> Result<Self, YtFetchError> {
		which::which(binary).map_err(|_| YtFetchError::EngineNotFound(binary.to_owned()))?;

		Ok(Self {
			binary: binary.to_owned(),
			flags,
		})
	}

	fn command(&self, options: &EngineOptions) -> Command {
		let args = options.to_args(&self.flags);
		log::debug!("{} {:?}", self.binary, args);

		let mut command = Command::new(&self.binary);
		command.args(args).kill_on_drop(true);
		command
	}

	/// Show yt-dlp's own help.
	pub async fn print_help(&self) -> Result<ExitStatus, YtFetchError> {
		Ok(Command::new(&self.binary).arg("--help").status().await?)
	}
}

/// Exit code for `-help`: yt-dlp's own, or failure if it was killed.
pub fn help_exit_code(status: ExitStatus) -> i32 {
	status.code().unwrap_or(1)
}

/// Last `ERROR:` line of the engine's stderr, or all of it.
fn failure_message(stderr: &str, status: ExitStatus) -> String {
	stderr
		.lines()
		.rev()
		.find(|line| line.starts_with("ERROR:"))
		.map(str::to_owned)
		.unwrap_or_else(|| format!("yt-dlp exited with status: {}", status))
}

#[async_trait]
impl Engine for YtDlp {
	async fn fetch_metadata(&self, url: &str, options: &EngineOptions) -> Result<MediaInfo, YtFetchError> {
		let output = self
			.command(options)
			.arg("--dump-single-json")
			.arg(url)
			.stdin(Stdio::null())
			.output()
			.await?;

		if !output.status.success() {
			return Err(YtFetchError::EngineFailed(failure_message(
				&String::from_utf8_lossy(&output.stderr),
				output.status,
			)));
		}

		Ok(serde_json::from_slice(&output.stdout)?)
	}

	fn download<'a>(&'a self, url: &'a str, options: &'a EngineOptions) -> EventStream<'a> {
		Box::pin(self.run(url, options))
	}
}

impl YtDlp {
	fn run<'a>(
		&'a self,
		url: &'a str,
		options: &'a EngineOptions,
	) -> impl Stream<Item = Result<EngineEvent, YtFetchError>> + Send + 'a {
		try_stream! {
			let mut child = self
				.command(options)
				.arg("--newline")
				.arg("--progress-template")
				.arg(progress_template())
				.arg(url)
				.stdin(Stdio::null())
				.stdout(Stdio::piped())
				.stderr(Stdio::piped())
				.spawn()?;

			let stdout = child
				.stdout
				.take()
				.ok_or_else(|| YtFetchError::Error("yt-dlp stdout unavailable".to_owned()))?;
			let stderr = child
				.stderr
				.take()
				.ok_or_else(|| YtFetchError::Error("yt-dlp stderr unavailable".to_owned()))?;

			let mut stdout = BufReader::new(stdout).lines();
			let mut stderr = BufReader::new(stderr).lines();
			let (mut stdout_done, mut stderr_done) = (false, false);
			let mut last_error = String::new();

			while !(stdout_done && stderr_done) {
				let (line, from_stderr) = tokio::select! {
					line = stdout.next_line(), if !stdout_done => (line, false),
					line = stderr.next_line(), if !stderr_done => (line, true),
				};

				match line? {
					Some(line) if from_stderr => {
						let event = EngineEvent::from_stderr(&line);
						if let EngineEvent::Error(message) = &event {
							last_error = message.clone();
						}
						yield event;
					}
					Some(line) => yield EngineEvent::from_stdout(&line),
					None if from_stderr => stderr_done = true,
					None => stdout_done = true,
				}
			}

			let status = child.wait().await?;
			if !status.success() {
				Err(YtFetchError::EngineFailed(failure_message(&last_error, status)))?;
			}
		}
	}
}

/// Drive one download to completion, printing as it goes.
pub async fn download_one<E: Engine>(
	engine: &E,
	url: &str,
	options: &EngineOptions,
	notifier: &dyn Notifier,
) -> Result<(), YtFetchError> {
	let mut progress = ProgressLine::default();
	let mut events = engine.download(url, options);

	while let Some(event) = events.next().await {
		let event = match event {
			Ok(event) => event,
			Err(e) => {
				progress.close();
				return Err(e);
			}
		};

		match event {
			EngineEvent::Progress(event) => progress.update(&event),
			EngineEvent::Debug(msg) => {
				progress.close();
				notifier.on_debug(&msg);
			}
			EngineEvent::Warning(msg) => {
				progress.close();
				notifier.on_warning(&msg);
			}
			EngineEvent::Error(msg) => {
				progress.close();
				notifier.on_error(&msg);
			}
		}
	}

	progress.close();
	Ok(())
}

/// Download every URL with its playlist range. Failures are reported and the
/// batch carries on; the number of failed URLs is returned.
pub async fn download_all<E: Engine>(
	engine: &E,
	jobs: &[(&str, Option<&str>)],
	options: &EngineOptions,
	notifier: &dyn Notifier,
	palette: &Palette,
) -> usize {
	let mut failed = 0;

	for (url, range) in jobs {
		let options = options.with_playlist_items(*range);
		log::debug!("options for {}: {}", url, serde_json::to_string(&options).unwrap_or_default());

		if let Err(e) = download_one(engine, url, &options, notifier).await {
			log::warn!("download of {} failed: {:?}", url, e);
			println!("{}", palette.error(&format!("Download failed for {}: {}", url, e)));
			failed += 1;
		}
	}

	failed
}

#[cfg(test)]
pub mod stub {
	use std::sync::Mutex;

	use super::*;

	/// Engine that replays canned answers and records what it was asked.
	#[derive(Default)]
	pub struct EngineStub {
		pub metadata: Vec<(String, Result<MediaInfo, String>)>,
		pub events: Vec<EngineEvent>,
		pub failing: Vec<String>,
		pub calls: Mutex<Vec<(String, Option<String>)>>,
	}

	#[async_trait]
	impl Engine for EngineStub {
		async fn fetch_metadata(&self, url: &str, options: &EngineOptions) -> Result<MediaInfo, YtFetchError> {
			self.calls
				.lock()
				.unwrap()
				.push((url.to_owned(), options.playlist_items.clone()));

			match self.metadata.iter().find(|(u, _)| u == url) {
				Some((_, Ok(info))) => Ok(info.clone()),
				Some((_, Err(e))) => Err(YtFetchError::EngineFailed(e.clone())),
				None => Err(YtFetchError::EngineFailed(format!("ERROR: unsupported URL: {}", url))),
			}
		}

		fn download<'a>(&'a self, url: &'a str, options: &'a EngineOptions) -> EventStream<'a> {
			self.calls
				.lock()
				.unwrap()
				.push((url.to_owned(), options.playlist_items.clone()));

			let fail = self.failing.iter().any(|u| u == url);
			Box::pin(replay(self.events.clone(), fail))
		}
	}

	fn replay(
		events: Vec<EngineEvent>,
		fail: bool,
	) -> impl Stream<Item = Result<EngineEvent, YtFetchError>> + Send {
		try_stream! {
			for event in events {
				yield event;
			}
			if fail {
				Err(YtFetchError::EngineFailed("ERROR: boom".to_owned()))?;
			}
		}
	}
}
