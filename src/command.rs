use crate::args::Args;
use crate::channel::Channel;
use anyhow::Result;
use argh::{EarlyExit, FromArgs};

/// Object-safe trait for anything that can handle a dispatched command line.
///
/// A handler receives the tokenized line, a read-only view of the current
/// state and the channel to write through. Returning `Some(next)` replaces
/// the shell state with `next`; returning `None` keeps the current state
/// unchanged. The two are distinct on purpose: a handler can reset the state
/// to `T::default()` and that is not the same thing as leaving it alone.
///
/// Errors are not recovered by the shell; an `Err` aborts the dispatch loop
/// and surfaces from [`Shell::start`](crate::Shell::start).
pub trait Command<T> {
    /// Execute the command.
    fn run(&mut self, args: &Args, state: &T, io: &mut dyn Channel) -> Result<Option<T>>;
}

impl<T, F> Command<T> for F
where
    F: FnMut(&Args, &T, &mut dyn Channel) -> Result<Option<T>>,
{
    fn run(&mut self, args: &Args, state: &T, io: &mut dyn Channel) -> Result<Option<T>> {
        self(args, state, io)
    }
}

/// Commands with a typed, self-documenting flag grammar.
///
/// Implementors derive [`argh::FromArgs`] and get flag validation, `--help`
/// output and usage errors for free. The raw token tail of the line is handed
/// to [`argh`] untouched, so the dynamic flag convention used elsewhere never
/// interferes with the declared grammar.
pub trait FlagCommand<T>: Sized + FromArgs {
    /// Canonical name of the command, e.g. "echo".
    fn name() -> &'static str;

    /// Executes the parsed command.
    fn execute(self, state: &T, io: &mut dyn Channel) -> Result<Option<T>>;
}

/// Adapter that parses the raw token tail into a [`FlagCommand`] on each
/// dispatch.
///
/// Parse failures and `--help` requests never reach `execute`: argh's own
/// output is emitted through the channel and the state is kept unchanged.
pub(crate) struct Typed<C> {
    _phantom: std::marker::PhantomData<C>,
}

impl<C> Default for Typed<C> {
    fn default() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

impl<T, C: FlagCommand<T>> Command<T> for Typed<C> {
    fn run(&mut self, args: &Args, state: &T, io: &mut dyn Channel) -> Result<Option<T>> {
        let tail: Vec<&str> = args.tail().iter().map(String::as_str).collect();
        match C::from_args(&[C::name()], &tail) {
            Ok(command) => command.execute(state, io),
            Err(EarlyExit { output, .. }) => {
                io.emit(&output)?;
                if !output.ends_with('\n') {
                    io.emit("\n")?;
                }
                Ok(None)
            }
        }
    }
}
