use std::io::{self, Write};

use tokio::runtime::{Handle, RuntimeFlavor};

/// Source of interactive input during login: username, password, MFA and
/// challenge codes.
///
/// Calls are synchronous and made from inside the async login, so an
/// implementation that waits on a person blocks its runtime thread.
/// `TerminalPrompter` hands its thread over with `block_in_place` on a
/// multi-threaded runtime.
pub trait Prompter: Send + Sync {
    /// Read one visible line, trimmed.
    fn read_line(&self, message: &str) -> io::Result<String>;

    /// Read one line without echo.
    fn read_secret(&self, message: &str) -> io::Result<String>;
}

/// Reads from the controlling terminal.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn read_line(&self, message: &str) -> io::Result<String> {
        blocking(|| {
            // stderr keeps stdout clean for command output
            eprint!("{}", message);
            io::stderr().flush()?;

            let mut input = String::new();
            if io::stdin().read_line(&mut input)? == 0 {
                return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "stdin closed"));
            }
            Ok(input.trim().to_string())
        })
    }

    fn read_secret(&self, message: &str) -> io::Result<String> {
        blocking(|| rpassword::prompt_password(message))
    }
}

/// Run `f` on the current thread, moving other tasks off it first when
/// called from a multi-threaded runtime worker.
fn blocking<T>(f: impl FnOnce() -> T) -> T {
    match Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
            tokio::task::block_in_place(f)
        }
        _ => f(),
    }
}
