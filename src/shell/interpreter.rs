use std::io;

use log::{debug, error};

use super::env::Environment;
use super::executor::ScriptExecutor;
use super::parser::{parse_command, ParseError, Pipeline, StatementOp};

/// Result of processing one input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    pub exit_code: i32,
    /// `false` only when an `exit`/`quit` verb asked to end the shell.
    pub keep_running: bool,
}

/// Verbs handled by the interpreter itself. Everything else resolves to
/// an external script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Builtin {
    Exit,
    Pwd,
    Cd,
    Repl,
}

impl Builtin {
    fn lookup(verb: &str) -> Option<Builtin> {
        match verb {
            "exit" | "quit" => Some(Builtin::Exit),
            "pwd" => Some(Builtin::Pwd),
            "cd" => Some(Builtin::Cd),
            "repl" => Some(Builtin::Repl),
            _ => None,
        }
    }
}

/// Walks a parsed command, dispatching builtins and handing everything
/// else to the script executor, with `&&` short-circuit semantics
/// across statements.
pub struct Interpreter<'a> {
    env: &'a mut dyn Environment,
    executor: &'a mut dyn ScriptExecutor,
    script_suffix: &'a str,
}

impl<'a> Interpreter<'a> {
    pub fn new(
        env: &'a mut dyn Environment,
        executor: &'a mut dyn ScriptExecutor,
        script_suffix: &'a str,
    ) -> Self {
        Self {
            env,
            executor,
            script_suffix,
        }
    }

    /// Parses and executes one input line.
    ///
    /// Pipeline stages run one after another against the session streams;
    /// stage N's output is not piped into stage N+1 (see DESIGN.md). A
    /// non-zero stage under a `&&` statement stops the rest of the
    /// command; nothing short of `exit`/`quit` ends the shell itself.
    pub fn process(&mut self, line: &str) -> Result<Outcome, ParseError> {
        let command = parse_command(line)?;

        for statement in &command.statements {
            let stop_on_error = statement.operator == StatementOp::And;
            for pipeline in &statement.pipelines {
                let exit_code = match Builtin::lookup(&pipeline.command) {
                    Some(Builtin::Exit) => {
                        return Ok(Outcome {
                            exit_code: 0,
                            keep_running: false,
                        })
                    }
                    Some(Builtin::Pwd) => self.builtin_pwd(),
                    Some(Builtin::Cd) => self.builtin_cd(&pipeline.args),
                    Some(Builtin::Repl) => self.nested_prompt(),
                    None => self.run_external(pipeline),
                };
                if exit_code != 0 && stop_on_error {
                    return Ok(Outcome {
                        exit_code,
                        keep_running: true,
                    });
                }
            }
        }

        Ok(Outcome {
            exit_code: 0,
            keep_running: true,
        })
    }

    fn builtin_pwd(&mut self) -> i32 {
        let pwd = self.env.get("PWD").unwrap_or_else(|| "/".to_string());
        if let Err(err) = writeln!(self.env.writer(), "{pwd}") {
            error!("pwd: write failed: {err}");
            return 1;
        }
        0
    }

    fn builtin_cd(&mut self, args: &[String]) -> i32 {
        let target = args.first().map(|arg| self.expand(arg)).unwrap_or_default();
        let target = if target.is_empty() || target == "~" {
            match self.env.get("HOME") {
                Some(home) => home,
                None => {
                    self.report("cd: HOME not set");
                    return 1;
                }
            }
        } else {
            target
        };

        let pwd = self.env.get("PWD").unwrap_or_else(|| "/".to_string());
        let path = if target.starts_with('/') {
            target
        } else {
            format!("{pwd}/{target}")
        };
        let path = clean_path(&path);

        if !self.env.dir_exists(&path) {
            self.report(&format!("cd: no such directory: {path}"));
            return 1;
        }
        self.env.set("PWD", Some(path));
        0
    }

    /// Nested prompt mode: feeds lines from the session reader back
    /// through the interpreter until `exit`/`quit` or EOF.
    fn nested_prompt(&mut self) -> i32 {
        loop {
            let prompted = write!(self.env.writer(), "embsh* ")
                .and_then(|_| self.env.writer().flush());
            if let Err(err) = prompted {
                error!("nested prompt: write failed: {err}");
                return 1;
            }

            let mut line = String::new();
            match self.env.reader().read_line(&mut line) {
                Ok(0) => return 0,
                Ok(_) => {}
                Err(err) => {
                    error!("nested prompt: read failed: {err}");
                    return 1;
                }
            }

            match self.process(line.trim_end()) {
                Ok(outcome) if !outcome.keep_running => return outcome.exit_code,
                Ok(_) => {}
                Err(err) => self.report(&err.to_string()),
            }
        }
    }

    fn run_external(&mut self, pipeline: &Pipeline) -> i32 {
        let script = resolve_script(&pipeline.command, self.script_suffix);
        let args: Vec<String> = pipeline.args.iter().map(|arg| self.expand(arg)).collect();
        debug!("dispatching {script} {args:?}");

        match self.executor.exec(
            &script,
            &args,
            pipeline.stdin.as_ref(),
            pipeline.stdout.as_ref(),
        ) {
            Ok(exit_code) => exit_code,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                self.report(&format!("{}: command not found", pipeline.command));
                127
            }
            Err(err) => {
                error!("failed to launch {script}: {err}");
                self.report(&format!("{script}: {err}"));
                126
            }
        }
    }

    /// Simple `$VAR` substitution from the session variables; unknown
    /// names are left untouched.
    fn expand(&self, input: &str) -> String {
        shellexpand::env_with_context_no_errors(input, |var| self.env.get(var)).into_owned()
    }

    fn report(&mut self, message: &str) {
        if let Err(err) = writeln!(self.env.writer(), "{message}") {
            error!("failed to write diagnostic: {err}");
        }
    }
}

/// Appends the script suffix to a bare verb unless already present.
pub fn resolve_script(verb: &str, suffix: &str) -> String {
    if verb.ends_with(suffix) {
        verb.to_string()
    } else {
        format!("{verb}{suffix}")
    }
}

/// Normalizes `.` and `..` segments of an absolute path.
fn clean_path(path: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for part in path.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            part => parts.push(part),
        }
    }
    if parts.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", parts.join("/"))
    }
}
