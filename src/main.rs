use std::env;
use std::process::exit;

use config::Config;
use download::YtDlp;
use error::YtFetchError;
use options::EngineOptions;
use parse::Invocation;
use passthrough::FlagTable;
use simple_logger::SimpleLogger;
use style::Palette;

mod args;
mod config;
mod download;
mod engine;
mod error;
mod format;
mod list;
mod notify;
mod options;
mod parse;
mod passthrough;
mod style;

fn setup_logging(config: &Config) -> Result<(), YtFetchError> {
	SimpleLogger::new()
		.with_level(log::LevelFilter::Off)
		.with_module_level("ytfetch", config.log_level)
		.init()?;
	Ok(())
}

/// How a run ended.
enum Outcome {
	Done(Result<i32, YtFetchError>),
	Aborted,
}

impl Outcome {
	fn exit_code(&self) -> i32 {
		match self {
			Outcome::Done(Ok(code)) => *code,
			Outcome::Done(Err(error)) => error.exit_code(),
			Outcome::Aborted => 1,
		}
	}
}

const ABORTED_MESSAGE: &str = "Process aborted by user.";

#[tokio::main(flavor = "current_thread")]
async fn main() {
	let palette = Palette::detect();

	let outcome = tokio::select! {
		result = run(palette) => Outcome::Done(result),
		_ = tokio::signal::ctrl_c() => Outcome::Aborted,
	};

	match &outcome {
		Outcome::Done(Err(error)) => report(error, &palette),
		Outcome::Aborted => println!("\n\n{}", ABORTED_MESSAGE),
		Outcome::Done(Ok(_)) => {}
	}

	exit(outcome.exit_code());
}

fn report(error: &YtFetchError, palette: &Palette) {
	match error {
		YtFetchError::Usage(e) => {
			let _ = e.print();
		}
		error => {
			log::debug!("{:?}", error);
			eprintln!("{}", palette.error(&format!("Error: {}", error)));
		}
	}
}

async fn run(palette: Palette) -> Result<i32, YtFetchError> {
	let config = Config::from_env()?;
	setup_logging(&config)?;

	let invocation = Invocation::from_tokens(parse::utf8_tokens(env::args_os().skip(1))?)?;
	let flags = FlagTable::with_extra(&config.short_flags);

	if invocation.args.engine_help {
		let engine = YtDlp::new(&config.engine, flags)?;
		return Ok(download::help_exit_code(engine.print_help().await?));
	}

	invocation.validate()?;

	let passthrough = passthrough::translate(&invocation.leftover, &flags)?;
	if !passthrough.is_empty() {
		log::debug!("{} passthrough options: {:?}", passthrough.len(), passthrough);
	}

	let engine = YtDlp::new(&config.engine, flags)?;

	let jobs = invocation.url_ranges();
	let mode = invocation.args.list_mode();
	let notifier = notify::for_mode(mode.is_on());

	if mode.is_on() {
		let options = EngineOptions::for_listing(&invocation.args, passthrough);
		list::list_all(
			&engine,
			&jobs,
			&options,
			&mode,
			notifier.as_ref(),
			&palette,
			&mut |line| println!("{}", line),
		)
		.await;
		return Ok(0);
	}

	let options = EngineOptions::for_download(&invocation.args, passthrough);
	let failed = download::download_all(&engine, &jobs, &options, notifier.as_ref(), &palette).await;
	if failed > 0 {
		log::info!("{} of {} downloads failed", failed, jobs.len());
	}

	Ok(0)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn interrupt_exits_with_failure() {
		assert_eq!(Outcome::Aborted.exit_code(), 1);
		assert_eq!(ABORTED_MESSAGE, "Process aborted by user.");
	}

	#[test]
	fn finished_runs_keep_their_code() {
		assert_eq!(Outcome::Done(Ok(0)).exit_code(), 0);
		assert_eq!(Outcome::Done(Ok(2)).exit_code(), 2);
		assert_eq!(Outcome::Done(Err(YtFetchError::NoUrls)).exit_code(), 1);
	}
}
