mod app;
mod buffer;
mod command;
mod completion;
mod config;
mod controller;
mod error;
mod evaluator;
mod history;
mod keymap;
mod keypad;
mod parser;
mod render;
mod repl;
mod terminal;
mod token;
mod util;

use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::mpsc;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use crate::config::{Args, Config, FrontEnd};
use crate::controller::Controller;
use crate::evaluator::HttpEvaluator;
use crate::terminal::{is_tty, KeypadRenderer, LineRenderer, RawMode};

fn main() -> Result<()> {
    let args = Args::parse();
    let config = Config::load(args.config.as_deref())?.with_args(&args);
    init_tracing(config.log_file.as_deref())?;

    let evaluator = HttpEvaluator::new(config.server_url()?, config.request_timeout())
        .context("building HTTP client")?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("starting runtime")?;

    if args.check {
        return runtime.block_on(check(&evaluator));
    }
    runtime.block_on(run(config, evaluator))
}

fn init_tracing(log_file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("keycalc=warn"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("opening log file {}", path.display()))?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).init();
        }
        None => builder.with_writer(io::stderr).init(),
    }
    Ok(())
}

async fn check(evaluator: &HttpEvaluator) -> Result<()> {
    let status = evaluator
        .health()
        .await
        .with_context(|| format!("evaluation service at {} is unreachable", evaluator.base()))?;
    println!("{}: {}", evaluator.base(), status);
    Ok(())
}

async fn run(config: Config, evaluator: HttpEvaluator) -> Result<()> {
    if let Err(err) = evaluator.health().await {
        warn!(base = %evaluator.base(), "evaluation service health check failed: {err}");
    }

    let (tx, rx) = mpsc::channel(64);
    let keypad = config.front_end == FrontEnd::Keypad
        && is_tty(libc::STDIN_FILENO)
        && is_tty(libc::STDOUT_FILENO);

    if keypad {
        let _raw = RawMode::enable(libc::STDIN_FILENO).context("switching terminal to raw mode")?;
        keypad::spawn_reader(libc::STDIN_FILENO, tx).context("starting keypad reader")?;
        let renderer = KeypadRenderer::new(io::stdout());
        let mut controller = Controller::new(renderer, config.mode, config.error_reset());
        app::run(&mut controller, &evaluator, rx).await;
        let _ = util::write_ignore_broken_pipe(io::stdout(), "", "\r\n");
    } else {
        repl::spawn_line_reader(tx).context("starting line editor")?;
        let renderer = LineRenderer::new(io::stdout(), is_tty(libc::STDOUT_FILENO));
        let mut controller = Controller::new(renderer, config.mode, config.error_reset());
        app::run(&mut controller, &evaluator, rx).await;
    }
    Ok(())
}
