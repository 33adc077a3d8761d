// repl.rs

use std::io;
use std::thread::{self, JoinHandle};

use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::{CompletionType, Config, Editor};
use tokio::sync::{mpsc, oneshot};
use tracing::warn;

use crate::app::Event;
use crate::command::Command;
use crate::completion::WordCompleter;
use crate::parser::parse_line;

const PROMPT: &str = "calc> ";

/// Run the line editor on a dedicated thread. Each line is handed to the
/// event loop and the prompt returns once it has been fully applied.
pub fn spawn_line_reader(tx: mpsc::Sender<Event>) -> io::Result<JoinHandle<()>> {
    thread::Builder::new().name("line-input".into()).spawn(move || {
        if let Err(err) = read_lines(&tx) {
            warn!("line editor failed: {err}");
        }
        let _ = tx.blocking_send(Event::Key(Command::Quit));
    })
}

fn read_lines(tx: &mpsc::Sender<Event>) -> rustyline::Result<()> {
    let config = Config::builder()
        .completion_type(CompletionType::List)
        .auto_add_history(false)
        .build();
    let mut rl: Editor<WordCompleter, DefaultHistory> = Editor::with_config(config)?;
    rl.set_helper(Some(WordCompleter::new()));
    loop {
        match rl.readline(PROMPT) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(trimmed);
                let commands = match parse_line(trimmed) {
                    Ok(commands) => commands,
                    Err(err) => {
                        eprintln!("error: {err}");
                        continue;
                    }
                };
                let quit = commands.contains(&Command::Quit);
                let (done, applied) = oneshot::channel();
                if tx.blocking_send(Event::Line(commands, done)).is_err() {
                    return Ok(());
                }
                let _ = applied.blocking_recv();
                if quit {
                    return Ok(());
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => return Ok(()),
            Err(err) => return Err(err),
        }
    }
}
