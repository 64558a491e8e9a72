use std::io::{self, BufRead, Stdout, StdinLock, Write};

pub const USER_PROMPT: &str = "You: ";
pub const AGENT_LABEL: &str = "Tars";

/// Line-oriented operator I/O.
///
/// A terminal is owned by one session or one single-shot call and dropped when
/// that call returns, which releases the underlying handles.
pub trait Terminal {
    /// Writes `prompt`, then reads one line. Returns `None` once input is closed.
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>>;

    fn print_line(&mut self, line: &str) -> io::Result<()>;
}

impl<T: Terminal + ?Sized> Terminal for &mut T {
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        (**self).read_line(prompt)
    }

    fn print_line(&mut self, line: &str) -> io::Result<()> {
        (**self).print_line(line)
    }
}

pub struct Console<R, W> {
    input: R,
    output: W,
}

impl Console<StdinLock<'static>, Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R, W> Console<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn output(&self) -> &W {
        &self.output
    }
}

impl<R: BufRead, W: Write> Terminal for Console<R, W> {
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }

        let trimmed_len = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(trimmed_len);
        Ok(Some(line))
    }

    fn print_line(&mut self, line: &str) -> io::Result<()> {
        writeln!(self.output, "{line}")?;
        self.output.flush()
    }
}

pub fn agent_line(text: &str) -> String {
    format!("{AGENT_LABEL}: {text}")
}

#[cfg(test)]
mod tests {
    use super::{Console, Terminal, agent_line};

    fn output_text(console: &Console<&[u8], Vec<u8>>) -> String {
        String::from_utf8(console.output().clone()).expect("output should be utf-8")
    }

    #[test]
    fn read_line_writes_prompt_and_strips_line_terminator() {
        let mut console = Console::new("hello there\r\nsecond\n".as_bytes(), Vec::new());

        let first = console.read_line("You: ").expect("read should succeed");
        let second = console.read_line("You: ").expect("read should succeed");

        assert_eq!(first.as_deref(), Some("hello there"));
        assert_eq!(second.as_deref(), Some("second"));
        assert_eq!(output_text(&console), "You: You: ");
    }

    #[test]
    fn read_line_keeps_inner_whitespace() {
        let mut console = Console::new("  spaced out  \n".as_bytes(), Vec::new());
        let line = console.read_line("> ").expect("read should succeed");
        assert_eq!(line.as_deref(), Some("  spaced out  "));
    }

    #[test]
    fn read_line_returns_none_at_end_of_input() {
        let mut console = Console::new("".as_bytes(), Vec::new());
        assert_eq!(console.read_line("You: ").expect("read should succeed"), None);
    }

    #[test]
    fn last_line_without_newline_is_returned() {
        let mut console = Console::new("tail".as_bytes(), Vec::new());
        let line = console.read_line("").expect("read should succeed");
        assert_eq!(line.as_deref(), Some("tail"));
    }

    #[test]
    fn print_line_appends_newline() {
        let mut console = Console::new("".as_bytes(), Vec::new());
        console
            .print_line(&agent_line("hi"))
            .expect("print should succeed");
        assert_eq!(output_text(&console), "Tars: hi\n");
    }
}
