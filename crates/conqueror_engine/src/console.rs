//! Console command ingestion.
//!
//! Blocking input lives on its own threads and only touches shared state
//! through the same locked entry points any other caller uses. The ingestion
//! loop is a channel select over input lines and a stop signal, so engine
//! shutdown never hangs on a blocked read: the stop send (or the line
//! sender dropping at EOF) wakes it immediately.

use std::io::BufRead;
use std::str::FromStr;
use std::sync::Arc;
use std::thread::JoinHandle;

use crossbeam_channel::{bounded, select, unbounded, Receiver, Sender};

use conqueror_core::unit::{GridPos, UnitId};

use crate::chat::ChatModule;
use crate::engine::StopHandle;
use crate::government::{GovernmentKind, GovernmentModule};
use crate::units::UnitModule;

/// A parsed console command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `move <id> <x> <y>` - command a unit to a destination.
    Move {
        /// Target unit.
        id: UnitId,
        /// Destination cell.
        destination: GridPos,
    },
    /// `status` - log a snapshot of every unit.
    Status,
    /// `say <text>` - post a chat message.
    Say(String),
    /// `govern <kind>` - change the form of government.
    Govern(GovernmentKind),
    /// `quit` - request engine stop.
    Quit,
}

/// Parse one console line.
///
/// # Errors
///
/// Returns a human-readable description of what was wrong with the line.
pub fn parse_command(line: &str) -> Result<Command, String> {
    let mut tokens = line.split_whitespace();
    let Some(verb) = tokens.next() else {
        return Err("empty command".to_string());
    };

    match verb {
        "move" => {
            let mut arg = |name: &str| {
                tokens
                    .next()
                    .ok_or_else(|| format!("move: missing <{name}>"))
                    .and_then(|t| {
                        t.parse::<u32>()
                            .map_err(|_| format!("move: <{name}> must be a non-negative integer"))
                    })
            };
            let id = arg("id")?;
            let x = arg("x")?;
            let y = arg("y")?;
            Ok(Command::Move {
                id,
                destination: GridPos::new(x, y),
            })
        }
        "status" => Ok(Command::Status),
        "say" => {
            let text = line.trim_start().strip_prefix("say").unwrap_or("").trim();
            if text.is_empty() {
                Err("say: missing message".to_string())
            } else {
                Ok(Command::Say(text.to_string()))
            }
        }
        "govern" => {
            let kind = tokens
                .next()
                .ok_or_else(|| "govern: missing <kind>".to_string())?;
            GovernmentKind::from_str(kind).map(Command::Govern)
        }
        "quit" => Ok(Command::Quit),
        other => Err(format!("unknown command '{other}'")),
    }
}

/// Routes parsed commands to the modules that handle them.
///
/// Holds typed handles to exactly the modules it addresses; the scheduler's
/// registry is never searched or downcast.
pub struct ConsoleRouter {
    /// Unit movement commands.
    pub units: Arc<UnitModule>,
    /// Chat messages.
    pub chat: Arc<ChatModule>,
    /// Government transitions.
    pub government: Arc<GovernmentModule>,
    /// Engine stop requests.
    pub stop: StopHandle,
}

impl ConsoleRouter {
    /// Dispatch one raw input line. Unparseable lines are logged and
    /// dropped; no command outcome is ever reported as an error.
    pub fn dispatch(&self, line: &str) {
        if line.trim().is_empty() {
            return;
        }
        match parse_command(line) {
            Ok(Command::Move { id, destination }) => self.units.set_destination(id, destination),
            Ok(Command::Status) => {
                for unit in self.units.status() {
                    tracing::info!(
                        id = unit.id,
                        name = %unit.name,
                        health = unit.health,
                        position = %unit.position,
                        destination = %unit.destination,
                        moving = unit.moving,
                        "unit status"
                    );
                }
            }
            Ok(Command::Say(text)) => self.chat.post(text),
            Ok(Command::Govern(kind)) => self.government.change_government(kind),
            Ok(Command::Quit) => {
                self.stop.request_stop();
            }
            Err(reason) => tracing::warn!(%line, %reason, "console input dropped"),
        }
    }
}

/// The console ingestion thread.
///
/// Consumes lines from a channel (stdin pump or test sender) and dispatches
/// them until either the stop signal arrives or the line sender is dropped.
pub struct Console {
    handle: JoinHandle<()>,
    stop_tx: Sender<()>,
}

impl Console {
    /// Spawn the ingestion thread over a line source.
    ///
    /// # Panics
    ///
    /// Panics if the ingestion thread cannot be spawned.
    #[must_use]
    pub fn spawn(lines: Receiver<String>, router: ConsoleRouter) -> Self {
        let (stop_tx, stop_rx) = bounded::<()>(1);
        let handle = std::thread::Builder::new()
            .name("console-ingest".into())
            .spawn(move || {
                loop {
                    select! {
                        recv(lines) -> msg => match msg {
                            Ok(line) => router.dispatch(&line),
                            Err(_) => {
                                tracing::debug!("console input closed");
                                break;
                            }
                        },
                        recv(stop_rx) -> _ => break,
                    }
                }
            })
            .expect("failed to spawn console thread");
        Self { handle, stop_tx }
    }

    /// Signal the ingestion thread and join it.
    pub fn shutdown(self) {
        let _ = self.stop_tx.send(());
        let _ = self.handle.join();
        tracing::info!("console ingestion stopped");
    }
}

/// Pump stdin lines into a channel from a detached thread.
///
/// The pump thread performs the only blocking reads in the engine; it exits
/// when stdin reaches EOF or the receiving side is dropped.
#[must_use]
pub fn stdin_source() -> Receiver<String> {
    let (tx, rx) = unbounded::<String>();
    let _ = std::thread::Builder::new()
        .name("stdin-pump".into())
        .spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else { break };
                if tx.send(line).is_err() {
                    break;
                }
            }
        });
    rx
}
