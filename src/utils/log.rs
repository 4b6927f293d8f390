use crate::utils::config::Config;
use chrono::Local;
use env_logger::{Builder, Target};
use log::LevelFilter;
use std::fs::{self, File};
use std::io::Write;
use std::process;

pub fn init_logger(config: &Config) {
    let level = match config.logger_level.to_lowercase().as_str() {
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        "off" => LevelFilter::Off,
        _ => LevelFilter::Info,
    };

    // Log lines must not interleave with the prompt, so they go to a
    // dated file rather than the terminal.
    fs::create_dir_all(&config.logger_dir).ok();
    let date = Local::now().format("%Y-%m-%d");
    let log_file = config.logger_dir.join(format!("embsh_{date}.log"));
    let target = match File::options().create(true).append(true).open(log_file) {
        Ok(file) => Target::Pipe(Box::new(file)),
        Err(_) => Target::Stderr,
    };

    Builder::new()
        .format(|buf, record| {
            writeln!(
                buf,
                "[PID:{}][{}] {} - {}",
                process::id(),
                record.level(),
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.args()
            )
        })
        .target(target)
        .filter(None, level)
        .init();

    log::debug!("log level set to {level}");
}
