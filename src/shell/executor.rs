use std::fs::{File, OpenOptions};
use std::io;
use std::process::{Command, Stdio};

use log::debug;

use super::parser::{Redirect, RedirectOp};

/// Execution collaborator for resolved scripts. The interpreter hands a
/// script name and expanded arguments across this boundary and only ever
/// looks at the exit code that comes back.
pub trait ScriptExecutor {
    fn exec(
        &mut self,
        script: &str,
        args: &[String],
        stdin: Option<&Redirect>,
        stdout: Option<&Redirect>,
    ) -> io::Result<i32>;
}

/// Default executor: runs the script as an external process, foregrounded
/// on the controlling terminal. When a runner program is configured the
/// script path is handed to it as the first argument; otherwise the
/// script itself must be executable.
pub struct ProcessExecutor {
    runner: Option<String>,
}

impl ProcessExecutor {
    pub fn new(runner: Option<String>) -> Self {
        Self { runner }
    }

    fn build(&self, script: &str, args: &[String]) -> Command {
        let mut command = match &self.runner {
            Some(runner) => {
                let mut command = Command::new(runner);
                command.arg(script);
                command
            }
            None => Command::new(script),
        };
        command.args(args);
        command
    }
}

impl ScriptExecutor for ProcessExecutor {
    fn exec(
        &mut self,
        script: &str,
        args: &[String],
        stdin: Option<&Redirect>,
        stdout: Option<&Redirect>,
    ) -> io::Result<i32> {
        let mut command = self.build(script, args);
        if let Some(redirect) = stdin {
            command.stdin(Stdio::from(File::open(&redirect.target)?));
        }
        if let Some(redirect) = stdout {
            let file = match redirect.op {
                RedirectOp::Append => OpenOptions::new()
                    .append(true)
                    .create(true)
                    .open(&redirect.target)?,
                _ => File::create(&redirect.target)?,
            };
            command.stdout(Stdio::from(file));
        }
        debug!("exec {script} {args:?}");
        run(&mut command)
    }
}

#[cfg(unix)]
fn run(command: &mut Command) -> io::Result<i32> {
    super::launcher::launch_foreground(command)
}

#[cfg(not(unix))]
fn run(command: &mut Command) -> io::Result<i32> {
    let status = command.status()?;
    Ok(status.code().unwrap_or(1))
}
