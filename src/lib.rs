//! A tiny, embeddable interactive command shell.
//!
//! This crate provides the building blocks for giving a larger CLI tool a
//! REPL surface: a dispatch loop that prompts, reads a line, routes it to a
//! handler keyed by the first word, and threads an application-defined state
//! value from one command to the next. It is intentionally small and easy to
//! read; anything resembling a shell language (pipes, quoting, job control)
//! is out of scope.
//!
//! The main entry point is [`Shell`], which owns the command registry and the
//! running state. Commands are plain closures or typed [`command::FlagCommand`]
//! structs parsed with [`argh`]. All input and output goes through the
//! [`channel::Channel`] trait, so the same shell runs unchanged against a
//! terminal, a byte stream, or an in-memory queue in tests.

pub mod args;
pub mod channel;
pub mod command;
mod readline;
mod shell;

/// Convenient re-export of the dispatch loop.
///
/// See [`Shell`] for the high-level API and examples.
pub use shell::{EXIT_KEYWORD, Shell};

pub use args::Args;
pub use channel::{Channel, QueueChannel, StreamChannel};
pub use command::{Command, FlagCommand};
pub use readline::ReadlineChannel;
