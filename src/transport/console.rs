//! Line-oriented console transport
//!
//! Stands in for a chat platform: every input line is a command carrying the
//! participant id it acts for, and every outbound message is printed with the
//! recipient's id in front.

use crate::error::Result;
use crate::leaderboard::{InMemoryDirectory, ParticipantProfile};
use crate::transport::handlers::GameService;
use crate::transport::notifier::{BoardView, Notice, Notifier};
use crate::types::{OpponentPreference, ParticipantId, Symbol, UiHandle};
use anyhow::{anyhow, bail, Context};
use async_trait::async_trait;
use std::str::FromStr;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::{broadcast, Mutex};
use tokio_stream::wrappers::LinesStream;
use tokio_stream::StreamExt;
use tracing::{debug, info, warn};

/// Recipient of `leaderboard` when no participant id is given
pub const CONSOLE_OPERATOR: ParticipantId = 0;

pub const HELP: &str = "\
commands:
  play <id> <size> bot <x|o>   play the bot with the chosen symbol
  play <id> <size> human       wait for another participant
  move <id> <cell>             place a mark (cells are numbered from 0, row by row)
  surrender <id>
  exit <id>                    leave the current game or queue
  board <id>                   show the board again
  name <id> <username>         set the name used on the leaderboard
  leaderboard [id]
  help";

/// One parsed input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Play {
        participant_id: ParticipantId,
        size: usize,
        preference: OpponentPreference,
    },
    Move {
        participant_id: ParticipantId,
        position: usize,
    },
    Surrender {
        participant_id: ParticipantId,
    },
    Exit {
        participant_id: ParticipantId,
    },
    Board {
        participant_id: ParticipantId,
    },
    Name {
        participant_id: ParticipantId,
        username: String,
    },
    Leaderboard {
        participant_id: ParticipantId,
    },
    Help,
}

fn parse_id(token: Option<&str>) -> Result<ParticipantId> {
    let token = token.ok_or_else(|| anyhow!("missing participant id"))?;
    token
        .parse()
        .with_context(|| format!("invalid participant id '{}'", token))
}

fn parse_index(token: Option<&str>, what: &str) -> Result<usize> {
    let token = token.ok_or_else(|| anyhow!("missing {}", what))?;
    token
        .parse()
        .with_context(|| format!("invalid {} '{}'", what, token))
}

fn parse_symbol(token: Option<&str>) -> Result<Symbol> {
    match token.map(str::to_ascii_lowercase).as_deref() {
        Some("x") => Ok(Symbol::X),
        Some("o") => Ok(Symbol::O),
        Some(other) => bail!("unknown symbol '{}', expected x or o", other),
        None => bail!("missing symbol, expected x or o"),
    }
}

impl FromStr for ConsoleCommand {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> Result<Self> {
        let mut tokens = line.split_whitespace();
        let verb = tokens
            .next()
            .ok_or_else(|| anyhow!("empty command"))?
            .to_ascii_lowercase();

        let command = match verb.as_str() {
            "play" => {
                let participant_id = parse_id(tokens.next())?;
                let size = parse_index(tokens.next(), "board size")?;
                let preference = match tokens.next().map(str::to_ascii_lowercase).as_deref() {
                    Some("bot") => OpponentPreference::Bot {
                        symbol: parse_symbol(tokens.next())?,
                    },
                    Some("human") => OpponentPreference::Human,
                    Some(other) => bail!("unknown opponent '{}', expected bot or human", other),
                    None => bail!("missing opponent, expected bot or human"),
                };
                ConsoleCommand::Play {
                    participant_id,
                    size,
                    preference,
                }
            }
            "move" => ConsoleCommand::Move {
                participant_id: parse_id(tokens.next())?,
                position: parse_index(tokens.next(), "cell")?,
            },
            "surrender" => ConsoleCommand::Surrender {
                participant_id: parse_id(tokens.next())?,
            },
            "exit" => ConsoleCommand::Exit {
                participant_id: parse_id(tokens.next())?,
            },
            "board" => ConsoleCommand::Board {
                participant_id: parse_id(tokens.next())?,
            },
            "name" => {
                let participant_id = parse_id(tokens.next())?;
                let username = tokens
                    .next()
                    .ok_or_else(|| anyhow!("missing username"))?
                    .to_string();
                ConsoleCommand::Name {
                    participant_id,
                    username,
                }
            }
            "leaderboard" => ConsoleCommand::Leaderboard {
                participant_id: tokens
                    .next()
                    .map(|t| parse_id(Some(t)))
                    .transpose()?
                    .unwrap_or(CONSOLE_OPERATOR),
            },
            "help" => ConsoleCommand::Help,
            other => bail!("unknown command '{}'", other),
        };

        if let Some(extra) = tokens.next() {
            bail!("unexpected argument '{}'", extra);
        }
        Ok(command)
    }
}

/// Notifier printing to any async writer
pub struct ConsoleNotifier {
    out: Mutex<Box<dyn AsyncWrite + Send + Unpin>>,
    next_handle: AtomicI64,
}

impl ConsoleNotifier {
    /// Notifier writing to stdout
    pub fn stdout() -> Self {
        Self::with_writer(tokio::io::stdout())
    }

    pub fn with_writer(writer: impl AsyncWrite + Send + Unpin + 'static) -> Self {
        Self {
            out: Mutex::new(Box::new(writer)),
            next_handle: AtomicI64::new(1),
        }
    }

    /// Write raw text followed by a newline
    pub async fn write_line(&self, text: &str) -> Result<()> {
        let mut out = self.out.lock().await;
        out.write_all(text.as_bytes()).await?;
        out.write_all(b"\n").await?;
        out.flush().await?;
        Ok(())
    }
}

impl std::fmt::Debug for ConsoleNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsoleNotifier")
            .field("next_handle", &self.next_handle)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Notifier for ConsoleNotifier {
    async fn notify(&self, participant_id: ParticipantId, notice: Notice) -> Result<()> {
        self.write_line(&format!("[{}] {}", participant_id, notice.text()))
            .await
    }

    async fn present_board(
        &self,
        participant_id: ParticipantId,
        view: BoardView,
    ) -> Result<UiHandle> {
        let (handle, verb) = match view.ui_handle {
            Some(handle) => (handle, "updated"),
            None => (self.next_handle.fetch_add(1, Ordering::Relaxed), "new"),
        };

        let mut text = format!("[{}] board #{} ({})\n{}", participant_id, handle, verb, view.render());
        if view.interactive {
            let cells: Vec<String> = view
                .playable_positions()
                .iter()
                .map(ToString::to_string)
                .collect();
            text.push_str(&format!("free cells: {}", cells.join(" ")));
        }
        self.write_line(text.trim_end()).await?;
        Ok(handle)
    }
}

/// Reads commands and routes them to the game service
pub struct ConsoleTransport {
    service: Arc<GameService>,
    directory: Arc<InMemoryDirectory>,
    notifier: Arc<ConsoleNotifier>,
}

impl ConsoleTransport {
    pub fn new(
        service: Arc<GameService>,
        directory: Arc<InMemoryDirectory>,
        notifier: Arc<ConsoleNotifier>,
    ) -> Self {
        Self {
            service,
            directory,
            notifier,
        }
    }

    /// Execute one command
    pub async fn dispatch(&self, command: ConsoleCommand) -> Result<()> {
        debug!("Dispatching console command {:?}", command);

        match command {
            ConsoleCommand::Play {
                participant_id,
                size,
                preference,
            } => {
                self.service
                    .handle_match_request(participant_id, size, preference)
                    .await
            }
            ConsoleCommand::Move {
                participant_id,
                position,
            } => self.service.handle_move(participant_id, position).await,
            ConsoleCommand::Surrender { participant_id } => {
                self.service.handle_surrender(participant_id).await
            }
            ConsoleCommand::Exit { participant_id } => {
                self.service.handle_exit(participant_id).await
            }
            ConsoleCommand::Board { participant_id } => {
                self.service.handle_board(participant_id).await
            }
            ConsoleCommand::Name {
                participant_id,
                username,
            } => {
                self.directory
                    .upsert(participant_id, ParticipantProfile::with_username(username))?;
                self.notifier
                    .write_line(&format!("[{}] name saved", participant_id))
                    .await
            }
            ConsoleCommand::Leaderboard { participant_id } => {
                self.service.handle_leaderboard(participant_id).await
            }
            ConsoleCommand::Help => self.notifier.write_line(HELP).await,
        }
    }

    /// Parse and execute a raw input line; blank lines are ignored
    pub async fn handle_line(&self, line: &str) -> Result<()> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(());
        }

        match line.parse::<ConsoleCommand>() {
            Ok(command) => self.dispatch(command).await,
            Err(e) => {
                self.notifier
                    .write_line(&format!("error: {} (type 'help')", e))
                    .await
            }
        }
    }

    /// Run until input ends or a shutdown signal arrives
    pub async fn run<R>(&self, reader: R, mut shutdown_rx: broadcast::Receiver<()>) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = LinesStream::new(reader.lines());
        info!("Console transport ready, type 'help' for commands");

        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => {
                    info!("Console transport shutdown signal received");
                    break;
                }
                line = lines.next() => match line {
                    Some(Ok(line)) => {
                        if let Err(e) = self.handle_line(&line).await {
                            warn!("Console command failed: {}", e);
                        }
                    }
                    Some(Err(e)) => {
                        warn!("Failed to read console input: {}", e);
                        break;
                    }
                    None => {
                        info!("Console input closed");
                        break;
                    }
                },
            }
        }

        Ok(())
    }
}
