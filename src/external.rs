use crate::command::ExitCode;
use std::io;
use std::path::Path;
use std::process::{ExitStatus, Stdio};

/// Captured result of a finished child process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ExternalOutput {
    pub stdout: String,
    pub stderr: String,
    pub code: ExitCode,
}

impl ExternalOutput {
    pub fn success(&self) -> bool {
        self.code == 0
    }
}

/// Command that is not a builtin.
///
/// The program is looked up through `PATH` by the operating system. The child
/// inherits stdin and has its stdout and stderr captured; the call blocks until
/// it exits.
pub(crate) struct ExternalCommand<'a> {
    name: &'a str,
    args: &'a [String],
}

impl<'a> ExternalCommand<'a> {
    pub fn new(name: &'a str, args: &'a [String]) -> Self {
        Self { name, args }
    }

    /// Run the program in `current_dir`.
    ///
    /// An error means the child never started; `io::ErrorKind::NotFound`
    /// signals an unknown program.
    pub fn execute(&self, current_dir: &Path) -> io::Result<ExternalOutput> {
        let output = std::process::Command::new(self.name)
            .args(self.args)
            .current_dir(current_dir)
            .stdin(Stdio::inherit())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()?;

        let code = match output.status.code() {
            Some(x) => x,
            None => terminated_by_signal(output.status),
        };
        Ok(ExternalOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            code,
        })
    }
}

#[cfg(unix)]
fn terminated_by_signal(exit_status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    if let Some(signal) = ExitStatusExt::signal(&exit_status) {
        128 + signal
    } else if ExitStatusExt::core_dumped(&exit_status) {
        255
    } else {
        -1
    }
}

#[cfg(not(unix))]
fn terminated_by_signal(_exit_status: ExitStatus) -> i32 {
    -1
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn args(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn captures_stdout_and_code() {
        let a = args(&["hello", "world"]);
        let out = ExternalCommand::new("echo", &a).execute(Path::new("/")).unwrap();
        assert_eq!(out.stdout, "hello world\n");
        assert_eq!(out.code, 0);
        assert!(out.success());
    }

    #[test]
    fn nonzero_exit_keeps_output() {
        let a = args(&["-c", "echo partial; echo oops >&2; exit 3"]);
        let out = ExternalCommand::new("sh", &a).execute(Path::new("/")).unwrap();
        assert_eq!(out.code, 3);
        assert_eq!(out.stdout, "partial\n");
        assert_eq!(out.stderr, "oops\n");
        assert!(!out.success());
    }

    #[test]
    fn runs_in_given_directory() {
        let dir = tempfile::tempdir().unwrap();
        let out = ExternalCommand::new("pwd", &[]).execute(dir.path()).unwrap();
        let reported = std::fs::canonicalize(out.stdout.trim_end()).unwrap();
        assert_eq!(reported, std::fs::canonicalize(dir.path()).unwrap());
    }

    #[test]
    fn killed_by_signal() {
        let a = args(&["-c", "kill -9 $$"]);
        let out = ExternalCommand::new("sh", &a).execute(Path::new("/")).unwrap();
        assert_eq!(out.code, 128 + 9);
    }

    #[test]
    fn unknown_program_is_not_found() {
        let err = ExternalCommand::new("nonexistent_command_for_pipesh_tests", &[])
            .execute(Path::new("/"))
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
