//! Saved camera credentials, one plain-text file per camera
//!
//! Each record is four lines: host, port, username, password.

use crate::error::StoreError;
use crate::models::{parse_port, ConnectionRecord};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const RECORD_EXT: &str = "txt";

pub struct CredentialStore {
    dir: PathBuf,
}

impl CredentialStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn record_path(&self, name: &str) -> Result<PathBuf, StoreError> {
        let trimmed = name.trim();
        if trimmed.is_empty()
            || trimmed.contains(['/', '\\'])
            || trimmed == "."
            || trimmed == ".."
        {
            return Err(StoreError::InvalidName(name.to_string()));
        }
        Ok(self.dir.join(format!("{}.{}", trimmed, RECORD_EXT)))
    }

    /// Write the record under `name`, replacing any existing one
    pub fn save(&self, name: &str, record: &ConnectionRecord) -> Result<(), StoreError> {
        let path = self.record_path(name)?;
        fs::create_dir_all(&self.dir)?;
        let content = format!(
            "{}\n{}\n{}\n{}",
            record.host, record.port, record.username, record.password
        );
        fs::write(&path, content)?;
        log::info!("Camera '{}' saved to {}", name.trim(), path.display());
        Ok(())
    }

    /// Saved camera names, sorted so numbered menus stay stable
    pub fn list(&self) -> Result<Vec<String>, StoreError> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut names = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some(RECORD_EXT) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    pub fn load(&self, name: &str) -> Result<ConnectionRecord, StoreError> {
        let path = self.record_path(name)?;
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StoreError::NotFound(name.trim().to_string()))
            }
            Err(e) => return Err(e.into()),
        };
        parse_record(name.trim(), &content)
    }
}

fn parse_record(name: &str, content: &str) -> Result<ConnectionRecord, StoreError> {
    let malformed = |reason: String| StoreError::Malformed {
        name: name.to_string(),
        reason,
    };

    // split, not lines(): an empty password is a legitimate empty last line
    let mut lines = content.split('\n').map(|l| l.trim_end_matches('\r'));
    let mut field = |label: &str| {
        lines
            .next()
            .map(str::to_string)
            .ok_or_else(|| malformed(format!("missing {}", label)))
    };

    let host = field("host")?.trim().to_string();
    let port = field("port")?;
    let username = field("username")?;
    let password = field("password")?;

    if host.is_empty() {
        return Err(malformed("empty host".to_string()));
    }
    if username.is_empty() {
        return Err(malformed("empty username".to_string()));
    }
    if lines.any(|extra| !extra.is_empty()) {
        return Err(malformed("unexpected data after password".to_string()));
    }

    let port = parse_port(&port).map_err(malformed)?;
    Ok(ConnectionRecord {
        host,
        port,
        username,
        password,
    })
}
