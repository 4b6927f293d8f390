use dotenv::dotenv;
use rustyline::EditMode;
use std::env;
use std::fs;
use std::path::PathBuf;

pub struct Config {
    pub name: String,
    pub history_file: PathBuf,
    pub editor_mode: String,
    pub logger_level: String,
    pub logger_dir: PathBuf,
    /// Extension appended to a bare verb when resolving it to a script.
    pub script_suffix: String,
    /// Program that runs a resolved script; the script runs directly
    /// when unset.
    pub runner: Option<String>,
}

impl Config {
    fn get_config_dir() -> PathBuf {
        if let Ok(home) = env::var("HOME") {
            PathBuf::from(home).join(".config/embsh")
        } else {
            PathBuf::from("tmp")
        }
    }

    fn default() -> Self {
        let config_dir = Self::get_config_dir();
        Config {
            name: String::from("embsh"),
            history_file: config_dir.join("history"),
            editor_mode: String::from("emacs"),
            logger_level: String::from("info"),
            logger_dir: config_dir.join("logs"),
            script_suffix: String::from(".js"),
            runner: None,
        }
    }

    pub fn new() -> Self {
        if cfg!(debug_assertions) {
            dotenv::from_filename(".env.development").ok();
        } else {
            dotenv().ok();
        }

        let mut config = Config::default();

        if let Ok(editor) = env::var("EMBSH_EDITOR") {
            config.editor_mode = editor;
        }
        if let Ok(history) = env::var("EMBSH_HISTORY") {
            config.history_file = PathBuf::from(history);
        }
        if let Ok(level) = env::var("EMBSH_LOG_LEVEL") {
            config.logger_level = level;
        }
        if let Ok(dir) = env::var("EMBSH_LOG_DIR") {
            config.logger_dir = PathBuf::from(dir);
        }
        if let Ok(suffix) = env::var("EMBSH_SCRIPT_SUFFIX") {
            config.script_suffix = suffix;
        }
        if let Ok(runner) = env::var("EMBSH_RUNNER") {
            if !runner.is_empty() {
                config.runner = Some(runner);
            }
        }

        if let Some(parent) = config.history_file.parent() {
            fs::create_dir_all(parent).ok();
        }

        config
    }

    pub fn get_edit_mode(&self) -> EditMode {
        match self.editor_mode.to_lowercase().as_str() {
            "vi" => EditMode::Vi,
            _ => EditMode::Emacs,
        }
    }
}
