use std::collections::HashMap;
use std::fs;
use std::io::{self, BufRead, BufReader, Write};

/// Session environment supplied by the embedding host: variable lookup
/// plus the reader and writer the shell and its children talk to.
///
/// Builtins go through this boundary only; `pwd` reads `PWD` and writes
/// to the writer, `cd` probes and mutates, and the nested prompt mode
/// reads lines from the reader.
pub trait Environment {
    fn get(&self, key: &str) -> Option<String>;
    /// `None` removes the variable.
    fn set(&mut self, key: &str, value: Option<String>);
    fn reader(&mut self) -> &mut dyn BufRead;
    fn writer(&mut self) -> &mut dyn Write;

    fn dir_exists(&self, path: &str) -> bool {
        fs::metadata(path).map(|m| m.is_dir()).unwrap_or(false)
    }
}

/// Default environment: a variable map over real stdio.
pub struct SessionEnv {
    vars: HashMap<String, String>,
    reader: Box<dyn BufRead>,
    writer: Box<dyn Write>,
}

impl SessionEnv {
    pub fn new() -> Self {
        Self::with_streams(
            Box::new(BufReader::new(io::stdin())),
            Box::new(io::stdout()),
        )
    }

    pub fn with_streams(reader: Box<dyn BufRead>, writer: Box<dyn Write>) -> Self {
        let mut vars = HashMap::new();
        let pwd = std::env::current_dir()
            .ok()
            .and_then(|dir| dir.to_str().map(String::from))
            .unwrap_or_else(|| "/".to_string());
        vars.insert("PWD".to_string(), pwd);
        if let Ok(home) = std::env::var("HOME") {
            vars.insert("HOME".to_string(), home);
        }
        Self {
            vars,
            reader,
            writer,
        }
    }
}

impl Default for SessionEnv {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment for SessionEnv {
    fn get(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: Option<String>) {
        match value {
            Some(value) => {
                self.vars.insert(key.to_string(), value);
            }
            None => {
                self.vars.remove(key);
            }
        }
    }

    fn reader(&mut self) -> &mut dyn BufRead {
        &mut self.reader
    }

    fn writer(&mut self) -> &mut dyn Write {
        &mut self.writer
    }
}

#[allow(clippy::unwrap_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_set_get_remove() {
        let mut env = SessionEnv::with_streams(
            Box::new(Cursor::new(Vec::new())),
            Box::new(Vec::new()),
        );
        env.set("NAME", Some("value".to_string()));
        assert_eq!(env.get("NAME"), Some("value".to_string()));
        env.set("NAME", None);
        assert_eq!(env.get("NAME"), None);
    }

    #[test]
    fn test_pwd_is_seeded() {
        let env = SessionEnv::with_streams(
            Box::new(Cursor::new(Vec::new())),
            Box::new(Vec::new()),
        );
        assert!(env.get("PWD").is_some());
    }
}
