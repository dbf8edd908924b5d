use anyhow::Result;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::io::{self, BufRead, BufReader, Write};
use std::rc::Rc;

/// Uniform line-based request/emit interface over any underlying transport.
///
/// The dispatch loop depends only on this trait, so the same shell can run
/// against a live terminal, process streams or an in-memory queue without
/// modification.
pub trait Channel {
    /// Present `prompt` on the output side and block until one full line of
    /// input is available.
    ///
    /// The returned line has its trailing newline/whitespace stripped.
    /// `Ok(None)` signals end of input; the loop treats it exactly like the
    /// `exit` command.
    fn request_line(&mut self, prompt: &str) -> Result<Option<String>>;

    /// Write `text` verbatim to the output sink.
    ///
    /// No newline is appended; callers that want newline-terminated output
    /// must include it themselves.
    fn emit(&mut self, text: &str) -> Result<()>;
}

/// Channel backed by a readable byte stream and a writable byte sink.
pub struct StreamChannel<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> StreamChannel<R, W> {
    /// Wrap an arbitrary buffered reader and writer.
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl StreamChannel<BufReader<io::Stdin>, io::Stdout> {
    /// Channel over the process standard streams.
    pub fn stdio() -> Self {
        Self::new(BufReader::new(io::stdin()), io::stdout())
    }
}

impl<R: BufRead, W: Write> Channel for StreamChannel<R, W> {
    fn request_line(&mut self, prompt: &str) -> Result<Option<String>> {
        self.output.write_all(prompt.as_bytes())?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        line.truncate(line.trim_end().len());
        Ok(Some(line))
    }

    fn emit(&mut self, text: &str) -> Result<()> {
        self.output.write_all(text.as_bytes())?;
        self.output.flush()?;
        Ok(())
    }
}

/// Memory-backed channel for deterministic testing.
///
/// Input lines come from a pre-supplied queue; everything written through the
/// channel (prompts included) is collected chunk by chunk into a shared log
/// that the test can inspect afterwards.
pub struct QueueChannel {
    queue: VecDeque<String>,
    written: Rc<RefCell<Vec<String>>>,
}

impl QueueChannel {
    /// Create a channel that will serve the given lines, in order.
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            queue: lines.into_iter().map(Into::into).collect(),
            written: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Convenience: create a channel and return (channel, output_handle).
    ///
    /// The handle observes writes while the channel itself is lent out.
    pub fn with_handle<I, S>(lines: I) -> (Self, Rc<RefCell<Vec<String>>>)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let channel = Self::new(lines);
        let handle = channel.written.clone();
        (channel, handle)
    }

    /// Everything written so far, one entry per `emit`/prompt.
    pub fn output(&self) -> Vec<String> {
        self.written.borrow().clone()
    }
}

impl Channel for QueueChannel {
    fn request_line(&mut self, prompt: &str) -> Result<Option<String>> {
        self.written.borrow_mut().push(prompt.to_string());
        Ok(self.queue.pop_front())
    }

    fn emit(&mut self, text: &str) -> Result<()> {
        self.written.borrow_mut().push(text.to_string());
        Ok(())
    }
}
