use std::io::{self, BufRead, Write};

/// Console seam used by every workflow.
pub trait Terminal {
    /// Prints `message` without a newline and reads one line, line ending removed.
    fn prompt(&mut self, message: &str) -> io::Result<String>;

    /// Same as [`Terminal::prompt`] for secrets. Echo suppression is up to the implementation.
    fn prompt_secret(&mut self, message: &str) -> io::Result<String> {
        self.prompt(message)
    }

    fn say(&mut self, message: &str);

    fn clear(&mut self) {}
}

/// Stdin/stdout terminal. End of input is reported as `UnexpectedEof`.
#[derive(Debug, Default)]
pub struct StdTerminal;

impl Terminal for StdTerminal {
    fn prompt(&mut self, message: &str) -> io::Result<String> {
        let mut out = io::stdout().lock();
        out.write_all(message.as_bytes())?;
        out.flush()?;
        drop(out);

        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "input closed"));
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    fn say(&mut self, message: &str) {
        println!("{message}");
    }

    fn clear(&mut self) {
        print!("\x1b[H\x1b[2J");
        let _ = io::stdout().flush();
    }
}
