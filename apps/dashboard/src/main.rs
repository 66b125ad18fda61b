use anyhow::{bail, Context, Result};
use clap::Parser;
use client_core::{
    load_settings, ApiBase, ApiStatus, CommitPolicy, DashboardApi, HttpFetcher, JsonFetcher,
    ViewController,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod commands;
mod render;

use commands::{dispatch, parse_command, Flow, Redraw, HELP};
use render::{render, Screen};

#[derive(Parser, Debug)]
#[command(about = "Terminal dashboard for Brent crude change-point analytics")]
struct Args {
    /// Base URL of the analytics API; overrides dashboard.toml and the environment.
    #[arg(long)]
    api_base: Option<String>,
    #[arg(long)]
    start: Option<String>,
    #[arg(long)]
    end: Option<String>,
    /// Change-point window in days.
    #[arg(long, value_parser = clap::value_parser!(u32).range(14..=90))]
    window: Option<u32>,
    /// Load once, print the dashboard, and exit non-zero when the API is offline.
    #[arg(long)]
    once: bool,
    /// Let a slow, superseded reload overwrite newer results.
    #[arg(long)]
    legacy_commit: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = load_settings().context("failed to load dashboard settings")?;
    if let Some(v) = args.api_base {
        settings.api_base = v;
    }
    if let Some(v) = args.start {
        settings.query.start = v;
    }
    if let Some(v) = args.end {
        settings.query.end = v;
    }
    if let Some(v) = args.window {
        settings.query.window = v;
    }

    let policy = if args.legacy_commit {
        CommitPolicy::LastWriteWins
    } else {
        CommitPolicy::LatestOnly
    };
    let base = ApiBase::new(&settings.api_base);
    info!(api_base = base.as_str(), ?policy, "starting dashboard");

    let mut ctl = ViewController::new(
        DashboardApi::new(HttpFetcher::new(base)),
        settings.query,
        policy,
    );
    ctl.mount();

    if args.once {
        ctl.settle().await;
        print!("{}", render(&Screen::from_controller(&ctl)));
        if ctl.status() == ApiStatus::Offline {
            bail!("API offline: {}", ctl.error().unwrap_or_default());
        }
        return Ok(());
    }

    run_interactive(&mut ctl).await
}

async fn run_interactive<F>(ctl: &mut ViewController<F>) -> Result<()>
where
    F: JsonFetcher + 'static,
{
    println!("{HELP}\n");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut redraw = Redraw::default();

    loop {
        tokio::select! {
            commit = ctl.next_outcome(), if ctl.is_loading() => {
                if redraw.after_commit(commit, ctl.is_loading()) {
                    print!("{}", render(&Screen::from_controller(ctl)));
                }
            }
            line = lines.next_line() => {
                let Some(line) = line.context("failed to read stdin")? else {
                    break;
                };
                let command = match parse_command(&line) {
                    Ok(Some(command)) => command,
                    Ok(None) => continue,
                    Err(message) => {
                        println!("{message}");
                        continue;
                    }
                };
                match dispatch(ctl, command).await {
                    Flow::Loading => println!("loading..."),
                    Flow::Render => print!("{}", render(&Screen::from_controller(ctl))),
                    Flow::Print(text) => println!("{text}"),
                    Flow::Quit => break,
                }
            }
        }
    }

    Ok(())
}
