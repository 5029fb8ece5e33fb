use std::process::Stdio;

use crate::EncoderCommand;

/// What came back from a finished child process.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandOutput {
    /// Exit code, or `None` if the process was terminated by a signal.
    pub code: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Human-readable diagnostic: stderr if the process wrote any, otherwise
    /// stdout.
    pub fn diagnostic(&self) -> String {
        let stderr = String::from_utf8_lossy(&self.stderr);
        let stderr = stderr.trim();
        if !stderr.is_empty() {
            return stderr.to_string();
        }
        String::from_utf8_lossy(&self.stdout).trim().to_string()
    }
}

impl From<std::process::Output> for CommandOutput {
    fn from(output: std::process::Output) -> Self {
        Self {
            code: output.status.code(),
            stdout: output.stdout,
            stderr: output.stderr,
        }
    }
}

/// Runs an [EncoderCommand] to completion.
///
/// An `Err` means the process could not be started (or waited on). A process
/// that ran and exited unsuccessfully is an `Ok` with a non-zero code.
pub trait ProcessLauncher {
    fn run(&self, command: &EncoderCommand) -> std::io::Result<CommandOutput>;
}

impl<T: ProcessLauncher + ?Sized> ProcessLauncher for &T {
    fn run(&self, command: &EncoderCommand) -> std::io::Result<CommandOutput> {
        (**self).run(command)
    }
}

/// Launch as a real child process and block until it exits.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemLauncher;

impl ProcessLauncher for SystemLauncher {
    fn run(&self, command: &EncoderCommand) -> std::io::Result<CommandOutput> {
        // stdin is closed so ffmpeg can never block on an interactive prompt
        // (e.g. "overwrite? [y/N]").
        let child = command
            .to_command()
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;
        let output = child.wait_with_output()?;
        Ok(output.into())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_diagnostic_prefers_stderr() {
        let out = CommandOutput {
            code: Some(1),
            stdout: b"stdout text\n".to_vec(),
            stderr: b"  frame_%04d.ppm: No such file or directory\n".to_vec(),
        };
        assert!(!out.success());
        assert_eq!(out.diagnostic(), "frame_%04d.ppm: No such file or directory");

        let out = CommandOutput {
            code: Some(0),
            stdout: b"only stdout\n".to_vec(),
            stderr: vec![],
        };
        assert!(out.success());
        assert_eq!(out.diagnostic(), "only stdout");
    }

    #[test]
    fn test_missing_program() {
        let cmd = EncoderCommand::new("frame-encoder-test-no-such-program");
        let err = SystemLauncher.run(&cmd).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
    }

    #[cfg(unix)]
    #[test]
    fn test_captures_output() {
        let cmd = EncoderCommand::new("sh")
            .flag("-c", "echo hello; echo oops >&2; exit 3");
        let out = SystemLauncher.run(&cmd).unwrap();
        assert_eq!(out.code, Some(3));
        assert_eq!(out.stdout, b"hello\n");
        assert_eq!(out.diagnostic(), "oops");
    }
}
