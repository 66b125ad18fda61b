//! Interactive commands typed at the dashboard prompt, and their dispatch
//! onto the view controller.

use client_core::{Commit, JsonFetcher, ViewController};
use shared::domain::clamp_window;
use tracing::debug;

pub const HELP: &str = "\
commands:
  range <start> <end>   set the date range (YYYY-MM-DD)
  start <date>          set the range start
  end <date>            set the range end
  window <days>         change-point window, clamped to 14..=90
  select <n>            mark event #n of the event strip on the price panel
  clear                 clear the selected event
  show                  redraw the dashboard
  reload                fetch everything again with the current parameters
  health                query /api/health
  help                  this text
  quit                  exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiCommand {
    Range { start: String, end: String },
    Start(String),
    End(String),
    Window(u32),
    Select(usize),
    Clear,
    Show,
    Reload,
    Health,
    Help,
    Quit,
}

/// Blank input parses to `None`.
pub fn parse_command(line: &str) -> Result<Option<UiCommand>, String> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(None);
    };
    let args: Vec<&str> = words.collect();

    let command = match (verb.to_ascii_lowercase().as_str(), args.as_slice()) {
        ("range", [start, end]) => UiCommand::Range {
            start: start.to_string(),
            end: end.to_string(),
        },
        ("start", [date]) => UiCommand::Start(date.to_string()),
        ("end", [date]) => UiCommand::End(date.to_string()),
        ("window", [days]) => {
            let days: i64 = days
                .parse()
                .map_err(|_| format!("window must be a whole number of days, got '{days}'"))?;
            UiCommand::Window(clamp_window(days))
        }
        ("select", [index]) => match index.parse::<usize>() {
            Ok(n) if n > 0 => UiCommand::Select(n),
            _ => return Err(format!("select expects an event number, got '{index}'")),
        },
        ("clear", []) => UiCommand::Clear,
        ("show", []) => UiCommand::Show,
        ("reload", []) => UiCommand::Reload,
        ("health", []) => UiCommand::Health,
        ("help" | "?", []) => UiCommand::Help,
        ("quit" | "exit" | "q", []) => UiCommand::Quit,
        (verb, _) => return Err(format!("unrecognised command '{verb}' (try 'help')")),
    };
    Ok(Some(command))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flow {
    /// Parameters changed; a reload is in flight.
    Loading,
    Render,
    Print(String),
    Quit,
}

pub async fn dispatch<F>(ctl: &mut ViewController<F>, command: UiCommand) -> Flow
where
    F: JsonFetcher + 'static,
{
    debug!(?command, "dispatching ui command");
    match command {
        UiCommand::Range { start, end } => reload_flow(ctl.update_date_range(start, end)),
        UiCommand::Start(start) => {
            let end = ctl.params().end.clone();
            reload_flow(ctl.update_date_range(start, end))
        }
        UiCommand::End(end) => {
            let start = ctl.params().start.clone();
            reload_flow(ctl.update_date_range(start, end))
        }
        UiCommand::Window(window) => reload_flow(ctl.update_window(window)),
        UiCommand::Select(n) => {
            let event = n
                .checked_sub(1)
                .and_then(|i| ctl.sorted_events().get(i).cloned());
            match event {
                Some(event) => {
                    ctl.select_event(Some(event));
                    Flow::Render
                }
                None => Flow::Print(format!("no event #{n} in the current range")),
            }
        }
        UiCommand::Clear => {
            ctl.select_event(None);
            Flow::Render
        }
        UiCommand::Show => Flow::Render,
        UiCommand::Reload => {
            ctl.reload();
            Flow::Loading
        }
        UiCommand::Health => match ctl.api().health().await {
            Ok(health) => Flow::Print(format!(
                "API health: {} ({})",
                health.status, health.service
            )),
            Err(err) => Flow::Print(format!(
                "API health check failed: {}",
                err.user_message()
            )),
        },
        UiCommand::Help => Flow::Print(HELP.to_string()),
        UiCommand::Quit => Flow::Quit,
    }
}

/// Tracks whether a committed reload still has to reach the screen.
#[derive(Debug, Default)]
pub struct Redraw {
    dirty: bool,
}

impl Redraw {
    /// Records one commit and reports whether to draw now. A frame is drawn
    /// once nothing is loading, even when the last outcome to arrive was a
    /// superseded one.
    pub fn after_commit(&mut self, commit: Option<Commit>, loading: bool) -> bool {
        if matches!(commit, Some(Commit::Applied { .. } | Commit::Failed { .. })) {
            self.dirty = true;
        }
        if loading || !self.dirty {
            return false;
        }
        self.dirty = false;
        true
    }
}

fn reload_flow(dispatched: Option<u64>) -> Flow {
    match dispatched {
        Some(_) => Flow::Loading,
        None => Flow::Print("parameters unchanged".to_string()),
    }
}
