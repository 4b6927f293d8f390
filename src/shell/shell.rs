use colored::Colorize;
use log::{debug, error, warn};
use std::error::Error;
use std::io::Write;

use crate::shell::env::SessionEnv;
use crate::shell::executor::ProcessExecutor;
use crate::shell::interpreter::Interpreter;
use crate::shell::readline::{ReadlineError, ReadlineManager};
use crate::utils::config::Config;

/// Interactive front-end: owns the session state and feeds prompt lines
/// through the interpreter until it asks to stop.
pub struct Shell<'a> {
    config: &'a Config,
    readline: ReadlineManager<'a>,
    env: SessionEnv,
    executor: ProcessExecutor,
}

impl<'a> Shell<'a> {
    pub fn new(config: &'a Config) -> Result<Self, Box<dyn Error>> {
        Ok(Self {
            config,
            readline: ReadlineManager::new(config)?,
            env: SessionEnv::new(),
            executor: ProcessExecutor::new(config.runner.clone()),
        })
    }

    pub fn run(&mut self) -> Result<(), Box<dyn Error>> {
        debug!("starting {}...", self.config.name);
        self.readline.load_history();

        loop {
            std::io::stdout().flush()?;
            let prompt = format!("{} ", "embsh>".red());

            match self.readline.readline(&prompt) {
                Ok(line) => {
                    if line.trim().is_empty() {
                        continue;
                    }
                    self.readline.add_history(&line);
                    if !self.handle_input(&line) {
                        break;
                    }
                }
                Err(ReadlineError::Eof) => {
                    debug!("EOF, leaving the prompt loop");
                    println!();
                    break;
                }
                Err(ReadlineError::Interrupted) => {
                    warn!("interrupted at the prompt");
                    println!();
                }
                Err(err) => {
                    error!("readline error: {err}");
                    eprintln!("{}: {err}", "error".red());
                }
            }
        }

        self.readline.save_history();
        debug!("exiting {}...", self.config.name);
        Ok(())
    }

    /// Returns `false` when the line asked the shell to terminate.
    fn handle_input(&mut self, line: &str) -> bool {
        debug!("processing line: {line}");
        let mut interpreter = Interpreter::new(
            &mut self.env,
            &mut self.executor,
            &self.config.script_suffix,
        );
        match interpreter.process(line) {
            Ok(outcome) => {
                if outcome.exit_code != 0 {
                    eprintln!("{} exit {}", "✗".red(), outcome.exit_code);
                }
                outcome.keep_running
            }
            Err(err) => {
                error!("parse error: {err}");
                eprintln!("{} {}", "✗".red(), err.to_string().bright_red());
                true
            }
        }
    }
}
