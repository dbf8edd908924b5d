//! Interactive scratchpad shell for session variables.
//!
//! A small front-end demonstrating the library: every command here is an
//! ordinary application-level registration, nothing is baked into the
//! dispatch loop itself.

use anyhow::Result;
use argh::FromArgs;
use regex::Regex;
use repl_shell::{Channel, FlagCommand, ReadlineChannel, Shell};
use std::collections::BTreeMap;

/// Variables bound during one interactive session.
///
/// Commands never mutate the current value in place; they clone, adjust and
/// return the replacement.
#[derive(Debug, Clone, Default)]
struct Session {
    vars: BTreeMap<String, String>,
}

#[derive(FromArgs)]
/// Write the arguments to the session output, separated by spaces.
/// By default, a trailing newline is printed.
struct Echo {
    #[argh(switch, short = 'n')]
    /// do not output the trailing newline.
    no_newline: bool,

    #[argh(positional, greedy)]
    /// values to print as-is, separated by spaces.
    args: Vec<String>,
}

impl FlagCommand<Session> for Echo {
    fn name() -> &'static str {
        "echo"
    }

    fn execute(self, _state: &Session, io: &mut dyn Channel) -> Result<Option<Session>> {
        let s = self.args.join(" ");
        if self.no_newline {
            io.emit(&s)?;
        } else {
            io.emit(&format!("{}\n", s))?;
        }
        Ok(None)
    }
}

#[derive(FromArgs)]
/// Bind a session variable. Multiple value words are joined with spaces.
struct Set {
    #[argh(positional)]
    /// variable name
    name: String,

    #[argh(positional, greedy)]
    /// value words
    value: Vec<String>,
}

impl FlagCommand<Session> for Set {
    fn name() -> &'static str {
        "set"
    }

    fn execute(self, state: &Session, _io: &mut dyn Channel) -> Result<Option<Session>> {
        let mut next = state.clone();
        next.vars.insert(self.name, self.value.join(" "));
        Ok(Some(next))
    }
}

#[derive(FromArgs)]
/// Print the value of a session variable.
struct Get {
    #[argh(positional)]
    /// variable name
    name: String,
}

impl FlagCommand<Session> for Get {
    fn name() -> &'static str {
        "get"
    }

    fn execute(self, state: &Session, io: &mut dyn Channel) -> Result<Option<Session>> {
        match state.vars.get(&self.name) {
            Some(value) => io.emit(&format!("{}\n", value))?,
            None => io.emit(&format!("get: {} is not set\n", self.name))?,
        }
        Ok(None)
    }
}

#[derive(FromArgs)]
/// Remove a session variable.
struct Unset {
    #[argh(positional)]
    /// variable name
    name: String,
}

impl FlagCommand<Session> for Unset {
    fn name() -> &'static str {
        "unset"
    }

    fn execute(self, state: &Session, io: &mut dyn Channel) -> Result<Option<Session>> {
        if !state.vars.contains_key(&self.name) {
            io.emit(&format!("unset: {} is not set\n", self.name))?;
            return Ok(None);
        }
        let mut next = state.clone();
        next.vars.remove(&self.name);
        Ok(Some(next))
    }
}

#[derive(FromArgs)]
/// List session variables as name=value lines.
struct Vars {
    #[argh(option, short = 'f')]
    /// only list variables whose name matches this regular expression
    filter: Option<String>,
}

impl FlagCommand<Session> for Vars {
    fn name() -> &'static str {
        "vars"
    }

    fn execute(self, state: &Session, io: &mut dyn Channel) -> Result<Option<Session>> {
        let filter = match &self.filter {
            Some(pattern) => match Regex::new(pattern) {
                Ok(re) => Some(re),
                Err(err) => {
                    // a typo'd pattern should not tear down the session
                    io.emit(&format!("vars: invalid pattern {:?}: {}\n", pattern, err))?;
                    return Ok(None);
                }
            },
            None => None,
        };

        for (name, value) in &state.vars {
            if filter.as_ref().is_none_or(|re| re.is_match(name)) {
                io.emit(&format!("{}={}\n", name, value))?;
            }
        }
        Ok(None)
    }
}

#[derive(FromArgs)]
/// Clear the terminal screen.
struct Clear {}

impl FlagCommand<Session> for Clear {
    fn name() -> &'static str {
        "clear"
    }

    fn execute(self, _state: &Session, io: &mut dyn Channel) -> Result<Option<Session>> {
        io.emit("\x1b[2J\x1b[H")?;
        Ok(None)
    }
}

fn build_shell(quiet: bool) -> Shell<Session> {
    let mut shell = Shell::new().prompt(|state: &Session| format!("[{}] > ", state.vars.len()));
    if !quiet {
        shell = shell.init(|io: &mut dyn Channel| {
            io.emit("session scratchpad; `exit` or Ctrl-D quits\n")?;
            Ok(None)
        });
    }

    shell.register_flag::<Echo>();
    shell.register_flag::<Set>();
    shell.register_flag::<Get>();
    shell.register_flag::<Unset>();
    shell.register_flag::<Vars>();
    shell.register_flag::<Clear>();
    shell
}

#[derive(FromArgs)]
/// Interactive scratchpad shell for session variables.
struct CliOpts {
    #[argh(switch, short = 'q')]
    /// skip the welcome banner
    quiet: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp(None)
        .init();

    let opts: CliOpts = argh::from_env();

    let mut io = ReadlineChannel::new()?;
    build_shell(opts.quiet).start(&mut io)
}

#[cfg(test)]
mod tests {
    use super::*;
    use repl_shell::QueueChannel;

    #[test]
    fn test_set_and_get_round_trip() {
        let mut shell = build_shell(true);
        let mut io = QueueChannel::new(["set who world", "get who", "exit"]);

        shell.start(&mut io).unwrap();

        let output = io.output();
        assert_eq!(output[1], "[0] > ");
        assert_eq!(output[3], "[1] > ");
        assert_eq!(output[4], "world\n");
    }

    #[test]
    fn test_set_joins_value_words() {
        let mut shell = build_shell(true);
        let mut io = QueueChannel::new(["set greeting hello there", "get greeting", "exit"]);

        shell.start(&mut io).unwrap();

        assert_eq!(io.output()[4], "hello there\n");
    }

    #[test]
    fn test_get_reports_unset_variable() {
        let mut shell = build_shell(true);
        let mut io = QueueChannel::new(["get nope", "exit"]);

        shell.start(&mut io).unwrap();

        assert_eq!(io.output()[2], "get: nope is not set\n");
    }

    #[test]
    fn test_unset_removes_the_binding() {
        let mut shell = build_shell(true);
        let mut io = QueueChannel::new(["set tmp 1", "unset tmp", "vars", "exit"]);

        shell.start(&mut io).unwrap();

        let output = io.output();
        // prompt is back to zero bound variables and vars prints nothing
        assert_eq!(output[5], "[0] > ");
        assert_eq!(output[6], "\n");
    }

    #[test]
    fn test_vars_lists_sorted_bindings() {
        let mut shell = build_shell(true);
        let mut io = QueueChannel::new(["set b 2", "set a 1", "vars", "exit"]);

        shell.start(&mut io).unwrap();

        let output = io.output();
        assert_eq!(output[6], "a=1\n");
        assert_eq!(output[7], "b=2\n");
    }

    #[test]
    fn test_vars_filter_narrows_the_listing() {
        let mut shell = build_shell(true);
        let mut io = QueueChannel::new([
            "set host localhost",
            "set port 8080",
            "vars -f ^h",
            "exit",
        ]);

        shell.start(&mut io).unwrap();

        let output = io.output();
        assert_eq!(output[6], "host=localhost\n");
        assert_eq!(output[7], "\n");
    }

    #[test]
    fn test_vars_rejects_a_bad_pattern_without_dying() {
        let mut shell = build_shell(true);
        let mut io = QueueChannel::new(["vars -f ([", "echo still alive", "exit"]);

        shell.start(&mut io).unwrap();

        let output = io.output();
        assert!(output[2].starts_with("vars: invalid pattern"));
        assert_eq!(output[5], "still alive\n");
    }

    #[test]
    fn test_echo_without_newline() {
        let mut shell = build_shell(true);
        let mut io = QueueChannel::new(["echo -n no break", "exit"]);

        shell.start(&mut io).unwrap();

        assert_eq!(io.output()[2], "no break");
    }

    #[test]
    fn test_help_is_emitted_through_the_channel() {
        let mut shell = build_shell(true);
        let mut io = QueueChannel::new(["set --help", "exit"]);

        shell.start(&mut io).unwrap();

        assert!(io.output()[2].contains("Usage"));
    }

    #[test]
    fn test_banner_is_emitted_first() {
        let mut shell = build_shell(false);
        let mut io = QueueChannel::new(["exit"]);

        shell.start(&mut io).unwrap();

        let output = io.output();
        assert_eq!(output[0], "session scratchpad; `exit` or Ctrl-D quits\n");
        assert_eq!(output[1], "\n");
        assert_eq!(output[2], "[0] > ");
    }
}
