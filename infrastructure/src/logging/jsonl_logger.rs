//! JSONL audit trail writer.
//!
//! Each [`AuditEvent`] becomes one JSON line carrying a `type` and a
//! `timestamp` next to the event's own fields, so a captured run can be
//! inspected with line-oriented tools.

use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Value, json};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;
use triage_application::ports::audit_logger::{AuditEvent, AuditLogger};
use triage_domain::SessionId;

/// Audit logger appending one JSON object per line.
///
/// Thread-safe via `Mutex<BufWriter<File>>`. Flushes on `Drop`.
pub struct JsonlAuditLogger {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl JsonlAuditLogger {
    /// Open (or create) the log at `path` for appending.
    ///
    /// Parent directories are created. Returns `None` if the file cannot be
    /// opened; auditing is then simply skipped.
    pub fn new(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            warn!(
                "Could not create audit log directory {}: {}",
                parent.display(),
                e
            );
            return None;
        }

        let file = match OpenOptions::new().create(true).append(true).open(path) {
            Ok(f) => f,
            Err(e) => {
                warn!("Could not open audit log {}: {}", path.display(), e);
                return None;
            }
        };

        Some(Self {
            writer: Mutex::new(BufWriter::new(file)),
            path: path.to_path_buf(),
        })
    }

    /// A fresh log under `dir`, named after the session and the start time.
    pub fn for_session(dir: impl AsRef<Path>, session_id: &SessionId) -> Option<Self> {
        let stamp = Utc::now().format("%Y%m%dT%H%M%S");
        let name = format!("{}-{}.audit.jsonl", stamp, file_safe(session_id.as_str()));
        Self::new(dir.as_ref().join(name))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn file_safe(raw: &str) -> String {
    raw.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

fn record(event: AuditEvent) -> Value {
    let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
    match event.payload {
        Value::Object(fields) => {
            let mut map = Map::with_capacity(fields.len() + 2);
            map.insert("type".to_string(), Value::String(event.event_type.to_string()));
            map.insert("timestamp".to_string(), Value::String(timestamp));
            map.extend(fields);
            Value::Object(map)
        }
        other => json!({
            "type": event.event_type,
            "timestamp": timestamp,
            "data": other,
        }),
    }
}

impl AuditLogger for JsonlAuditLogger {
    fn log(&self, event: AuditEvent) {
        let Ok(line) = serde_json::to_string(&record(event)) else {
            return;
        };

        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", line);
            // A run can be killed mid-stream; keep every complete line on disk.
            let _ = writer.flush();
        }
    }
}

impl Drop for JsonlAuditLogger {
    fn drop(&mut self) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writer.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use triage_domain::{EventType, Frame, Payload};

    fn lines(path: &Path) -> Vec<Value> {
        fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn writes_one_line_per_event() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.audit.jsonl");
        let logger = JsonlAuditLogger::new(&path).unwrap();
        let session_id = SessionId::new("debug_session").unwrap();

        let frame = Frame::new(
            EventType::ClassificationResult,
            Payload::Json(json!({"risk_level": "High"})),
        );
        logger.log(AuditEvent::frame(&session_id, &frame));
        logger.log(AuditEvent::new("stream_end", json!({"end": "finished"})));
        drop(logger);

        let records = lines(&path);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["type"], "frame");
        assert_eq!(records[0]["event"], "classification_result");
        assert_eq!(records[0]["session_id"], "debug_session");
        assert_eq!(records[0]["payload"]["value"]["risk_level"], "High");
        assert!(records[0]["timestamp"].is_string());
        assert_eq!(records[1]["type"], "stream_end");
    }

    #[test]
    fn wraps_non_object_payload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("raw.audit.jsonl");
        let logger = JsonlAuditLogger::new(&path).unwrap();
        logger.log(AuditEvent::new("note", json!("just text")));
        drop(logger);

        let records = lines(&path);
        assert_eq!(records[0]["type"], "note");
        assert_eq!(records[0]["data"], "just text");
    }

    #[test]
    fn appends_to_existing_log() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("append.audit.jsonl");
        for _ in 0..2 {
            let logger = JsonlAuditLogger::new(&path).unwrap();
            logger.log(AuditEvent::new("note", json!({})));
        }
        assert_eq!(lines(&path).len(), 2);
    }

    #[test]
    fn session_file_name_is_sanitized() {
        let dir = tempfile::tempdir().unwrap();
        let session_id = SessionId::new("case/1 2").unwrap();
        let logger = JsonlAuditLogger::for_session(dir.path(), &session_id).unwrap();

        let name = logger.path().file_name().unwrap().to_string_lossy().to_string();
        assert!(name.ends_with("-case_1_2.audit.jsonl"));
        assert_eq!(logger.path().parent().unwrap(), dir.path());
    }
}
