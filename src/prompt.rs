use std::io::{self, BufRead, Write};

pub const DESCRIPTION_PROMPT: &str = "Enter description (leave empty to skip): ";

/// What the operator typed at the prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// A line of input, trimmed of surrounding whitespace (possibly empty)
    Line(String),
    /// End of input or an interrupted read
    Interrupted,
}

/// Print `prompt` and read one line from `input`
pub fn ask<R: BufRead, W: Write>(input: &mut R, out: &mut W, prompt: &str) -> io::Result<Reply> {
    write!(out, "{}", prompt)?;
    out.flush()?;

    let mut line = String::new();
    match input.read_line(&mut line) {
        Ok(0) => Ok(Reply::Interrupted),
        Ok(_) => Ok(Reply::Line(line.trim().to_string())),
        Err(e) if e.kind() == io::ErrorKind::Interrupted => Ok(Reply::Interrupted),
        Err(e) => Err(e),
    }
}
