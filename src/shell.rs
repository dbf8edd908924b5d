use crate::args::Args;
use crate::channel::Channel;
use crate::command::{Command, FlagCommand, Typed};
use anyhow::Result;
use log::{debug, warn};
use std::collections::HashMap;

/// Reserved first token that terminates the dispatch loop.
///
/// It is checked before the registry, so no handler can ever be bound to it.
pub const EXIT_KEYWORD: &str = "exit";

const DEFAULT_PROMPT: &str = "> ";

type InitFn<T> = Box<dyn FnMut(&mut dyn Channel) -> Result<Option<T>>>;
type PromptFn<T> = Box<dyn Fn(&T) -> String>;

/// An interactive command shell: a registry of named commands plus the
/// dispatch loop that drives them.
///
/// `T` is the application-defined state threaded through command
/// invocations. It is fixed per shell instance, created by the optional
/// initializer (or `T::default()`) and replaced wholesale whenever a command
/// returns a new value. Registry and state are owned by the instance, so any
/// number of independent shells can run side by side without
/// cross-contamination.
///
/// Example
/// ```no_run
/// use repl_shell::{Args, Channel, Shell, StreamChannel};
///
/// let mut shell: Shell<u32> = Shell::new().prompt(|count: &u32| format!("[{count}] > "));
/// shell.register("bump", |_args: &Args, count: &u32, io: &mut dyn Channel| {
///     io.emit(&format!("{}\n", count + 1))?;
///     Ok(Some(count + 1))
/// });
/// shell.start(&mut StreamChannel::stdio()).unwrap();
/// ```
pub struct Shell<T> {
    commands: HashMap<String, Box<dyn Command<T>>>,
    init: Option<InitFn<T>>,
    prompt: Option<PromptFn<T>>,
}

impl<T: Default> Shell<T> {
    /// Create a shell with an empty registry, no initializer and the default
    /// prompt.
    pub fn new() -> Self {
        Self {
            commands: HashMap::new(),
            init: None,
            prompt: None,
        }
    }

    /// Install an initializer, invoked once before the first cycle.
    ///
    /// It may perform setup I/O through the channel. `Ok(Some(state))` sets
    /// the initial state; `Ok(None)` falls back to `T::default()`.
    pub fn init(mut self, f: impl FnMut(&mut dyn Channel) -> Result<Option<T>> + 'static) -> Self {
        self.init = Some(Box::new(f));
        self
    }

    /// Install a prompt formatter, invoked with the current state on every
    /// cycle.
    pub fn prompt(mut self, f: impl Fn(&T) -> String + 'static) -> Self {
        self.prompt = Some(Box::new(f));
        self
    }

    /// Insert or replace the handler registered under `name`.
    ///
    /// Re-registration silently overwrites: the last registration wins.
    /// The reserved [`EXIT_KEYWORD`] is refused.
    pub fn register(&mut self, name: impl Into<String>, command: impl Command<T> + 'static) {
        let name = name.into();
        if name == EXIT_KEYWORD {
            warn!("refusing to register reserved command name {:?}", name);
            return;
        }
        self.commands.insert(name, Box::new(command));
    }

    /// Register the typed command `C` under its canonical name.
    pub fn register_flag<C>(&mut self)
    where
        C: FlagCommand<T> + 'static,
    {
        self.register(C::name(), Typed::<C>::default());
    }

    /// Run the dispatch loop against `io` until termination.
    ///
    /// Does not return while input keeps coming: the loop ends when a line
    /// starts with the exit keyword or the channel signals end of input, both
    /// of which are normal termination. Errors raised by the channel, the
    /// initializer or a handler are not caught here; they abort the loop and
    /// propagate to the caller, which owns any retry policy.
    pub fn start(&mut self, io: &mut dyn Channel) -> Result<()> {
        let mut state = match self.init.as_mut() {
            Some(init) => init(io)?.unwrap_or_default(),
            None => T::default(),
        };

        loop {
            // visual spacing between cycles
            io.emit("\n")?;

            let prompt = match &self.prompt {
                Some(format) => format(&state),
                None => DEFAULT_PROMPT.to_string(),
            };

            let line = match io.request_line(&prompt)? {
                Some(line) => line,
                None => break,
            };

            let Some(args) = Args::parse(&line) else {
                continue;
            };

            let name = args.name();
            if name == EXIT_KEYWORD {
                break;
            }

            match self.commands.get_mut(name) {
                Some(command) => {
                    debug!("dispatching {:?}", name);
                    if let Some(next) = command.run(&args, &state, io)? {
                        state = next;
                    }
                }
                None => {
                    io.emit(&format!("command not found: {}\n", name))?;
                }
            }
        }

        Ok(())
    }
}

impl<T: Default> Default for Shell<T> {
    fn default() -> Self {
        Self::new()
    }
}
