//! Participant-facing side of the service
//!
//! `GameService` turns commands into arena calls and arena outcomes into
//! notices. A transport supplies a `Notifier`; the console one ships here.

pub mod console;
pub mod handlers;
pub mod notifier;

pub use console::{ConsoleCommand, ConsoleNotifier, ConsoleTransport};
pub use handlers::GameService;
pub use notifier::{BoardView, Notice, Notifier};
