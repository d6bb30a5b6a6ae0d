//! Data models for the snapshot viewer

use chrono::{DateTime, Local};

/// Connection parameters for one camera/NVR
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionRecord {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
}

impl ConnectionRecord {
    pub fn new(host: &str, port: u16, username: &str, password: &str) -> Self {
        Self {
            host: host.to_string(),
            port,
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    /// Base URL of the device, e.g. `http://192.168.1.64:80`
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

/// Parse a TCP port in the range 1-65535
pub fn parse_port(value: &str) -> Result<u16, String> {
    let port: u16 = value
        .trim()
        .parse()
        .map_err(|_| format!("invalid port '{}'", value.trim()))?;
    if port == 0 {
        return Err("port must be between 1 and 65535".to_string());
    }
    Ok(port)
}

/// A device-addressable video source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Channel {
    /// Device channel token, e.g. "101" (device 1, main stream)
    pub id: String,
    /// Human label, empty when the device does not report one
    pub label: String,
}

impl Channel {
    pub fn new(id: &str, label: &str) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    Rgb8,
}

impl PixelFormat {
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            PixelFormat::Rgb8 => 3,
        }
    }
}

/// Decoded snapshot, ready for display
#[derive(Debug, Clone)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    pub pixels: Vec<u8>,
    /// Channel this frame was fetched for
    pub channel_id: String,
    pub captured_at: DateTime<Local>,
}

impl Frame {
    /// Text drawn on top of the image
    pub fn overlay_text(&self, label: &str) -> String {
        let time = self.captured_at.format("%Y-%m-%d %H:%M:%S");
        if label.is_empty() {
            format!("Channel: {}  {}", self.channel_id, time)
        } else {
            format!("Channel: {} ({})  {}", self.channel_id, label, time)
        }
    }
}

/// Result of a single snapshot request
#[derive(Debug, Clone)]
pub enum FetchOutcome {
    Success(Frame),
    HttpError(u16),
    TransportError(String),
    DecodeError,
}

impl FetchOutcome {
    /// One-line description used for logs and the status bar
    pub fn describe(&self) -> String {
        match self {
            FetchOutcome::Success(frame) => format!("{}x{} frame", frame.width, frame.height),
            FetchOutcome::HttpError(status) => format!("Failed to get snapshot: HTTP {}", status),
            FetchOutcome::TransportError(cause) => format!("Error fetching snapshot: {}", cause),
            FetchOutcome::DecodeError => "Snapshot could not be decoded as an image".to_string(),
        }
    }
}

/// Operator commands accepted by the acquisition loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Quit,
    Next,
    Previous,
    JumpManual(String),
}

impl Command {
    /// Map a single-letter control key (q/n/p) to a command
    pub fn from_key(key: char) -> Option<Self> {
        match key.to_ascii_lowercase() {
            'q' => Some(Command::Quit),
            'n' => Some(Command::Next),
            'p' => Some(Command::Previous),
            _ => None,
        }
    }
}
