use std::{
    fs::{self, File, OpenOptions},
    io::Write,
    path::PathBuf,
    time::{SystemTime, UNIX_EPOCH},
};

use anyhow::Result;
use serde_json::json;

/// Console output mirrored to a JSON-lines file when
/// `GESTURE_REPLAY_LOG_JSON_PATH` is set.
pub struct Logger {
    json_file: Option<File>,
}

impl Logger {
    pub fn from_env() -> Result<Self> {
        let path = std::env::var("GESTURE_REPLAY_LOG_JSON_PATH").ok();
        Self::new(path.map(PathBuf::from))
    }

    pub fn new(path: Option<PathBuf>) -> Result<Self> {
        let json_file = match path {
            Some(path) => {
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent)?;
                }
                let file = OpenOptions::new().create(true).append(true).open(path)?;
                Some(file)
            }
            None => None,
        };
        Ok(Self { json_file })
    }

    pub fn info(&mut self, message: impl AsRef<str>) {
        println!("{}", message.as_ref());
        self.event("info", message.as_ref());
    }

    pub fn warn(&mut self, message: impl AsRef<str>) {
        eprintln!("{}", message.as_ref());
        self.event("warn", message.as_ref());
    }

    pub fn error(&mut self, message: impl AsRef<str>) {
        eprintln!("{}", message.as_ref());
        self.event("error", message.as_ref());
    }

    /// Structured record only; nothing is printed.
    pub fn record(&mut self, kind: &str, fields: serde_json::Value) {
        let Some(file) = &mut self.json_file else {
            return;
        };
        let entry = json!({
            "ts_ms": now_ms(),
            "level": "data",
            "kind": kind,
            "fields": fields,
        });
        let _ = writeln!(file, "{}", entry);
        let _ = file.flush();
    }

    fn event(&mut self, level: &str, message: &str) {
        let Some(file) = &mut self.json_file else {
            return;
        };

        let entry = json!({
            "ts_ms": now_ms(),
            "level": level,
            "msg": message,
        });

        let _ = writeln!(file, "{}", entry);
        let _ = file.flush();
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
