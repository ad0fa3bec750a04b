use std::env;
use std::io::{self, Write};
use std::process::{Command, Stdio};

/// Pager used when `PAGER` is unset or blank.
pub const DEFAULT_PAGER: &str = "less -R";

/// The pager command line from `PAGER`, or [`DEFAULT_PAGER`].
pub fn pager_command() -> String {
    env::var("PAGER")
        .ok()
        .filter(|p| !p.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_PAGER.to_string())
}

/// Pipe `text` through `command` and wait for the pager to exit.
///
/// The command is split with shell quoting rules into program and arguments.
pub fn page(text: &str, command: &str) -> io::Result<()> {
    let words = shlex::split(command)
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "unbalanced quotes in pager command"))?;
    let (program, args) = words
        .split_first()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "empty pager command"))?;

    let mut child = Command::new(program).args(args).stdin(Stdio::piped()).spawn()?;

    if let Some(mut stdin) = child.stdin.take() {
        match stdin.write_all(text.as_bytes()) {
            // The reader quit before consuming everything.
            Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {}
            other => other?,
        }
    }

    child.wait()?;
    Ok(())
}
