//! ISAPI HTTP client - snapshot and channel list requests

use crate::error::RequestError;
use crate::models::{ConnectionRecord, FetchOutcome, Frame, PixelFormat};
use base64::Engine as _;
use std::time::Duration;

/// Largest snapshot body accepted (4K JPEGs are well under this)
const MAX_SNAPSHOT_BYTES: u64 = 32 * 1024 * 1024;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Anything that can produce a snapshot for a channel id.
///
/// Implementations are called from worker threads.
pub trait SnapshotSource: Send + Sync + 'static {
    fn fetch(&self, channel_id: &str) -> FetchOutcome;
}

pub struct IsapiClient {
    connection: ConnectionRecord,
    auth_header: String,
    agent: ureq::Agent,
}

impl IsapiClient {
    pub fn new(connection: &ConnectionRecord) -> Self {
        Self {
            auth_header: basic_auth_header(&connection.username, &connection.password),
            agent: build_agent(DEFAULT_TIMEOUT),
            connection: connection.clone(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.agent = build_agent(timeout);
        self
    }

    pub fn connection(&self) -> &ConnectionRecord {
        &self.connection
    }

    pub fn channels_url(&self) -> String {
        format!("{}/ISAPI/Streaming/channels", self.connection.base_url())
    }

    pub fn snapshot_url(&self, channel_id: &str) -> String {
        format!(
            "{}/ISAPI/Streaming/channels/{}/picture",
            self.connection.base_url(),
            channel_id
        )
    }

    fn get(&self, url: &str) -> Result<Vec<u8>, RequestError> {
        let mut response = match self
            .agent
            .get(url)
            .header("Authorization", self.auth_header.as_str())
            .call()
        {
            Ok(response) => response,
            Err(e) => return Err(RequestError::Transport(e.to_string())),
        };

        let status = response.status().as_u16();
        if status != 200 {
            return Err(RequestError::Http(status));
        }

        response
            .body_mut()
            .with_config()
            .limit(MAX_SNAPSHOT_BYTES)
            .read_to_vec()
            .map_err(|e| RequestError::Transport(format!("Read failed: {}", e)))
    }

    /// Raw XML of the device's streaming channel list
    pub fn get_channel_list(&self) -> Result<String, RequestError> {
        let body = self.get(&self.channels_url())?;
        Ok(String::from_utf8_lossy(&body).into_owned())
    }

    /// Request and decode one snapshot. Never retries.
    pub fn fetch_snapshot(&self, channel_id: &str) -> FetchOutcome {
        match self.get(&self.snapshot_url(channel_id)) {
            Ok(body) => match decode_snapshot(&body, channel_id) {
                Some(frame) => FetchOutcome::Success(frame),
                None => FetchOutcome::DecodeError,
            },
            Err(RequestError::Http(status)) => FetchOutcome::HttpError(status),
            Err(RequestError::Transport(cause)) => FetchOutcome::TransportError(cause),
        }
    }
}

impl SnapshotSource for IsapiClient {
    fn fetch(&self, channel_id: &str) -> FetchOutcome {
        self.fetch_snapshot(channel_id)
    }
}

fn build_agent(timeout: Duration) -> ureq::Agent {
    ureq::Agent::config_builder()
        .timeout_global(Some(timeout))
        .http_status_as_error(false)
        .build()
        .new_agent()
}

/// `Basic base64(username:password)`
pub fn basic_auth_header(username: &str, password: &str) -> String {
    let key = base64::engine::general_purpose::STANDARD.encode(format!("{}:{}", username, password));
    format!("Basic {}", key)
}

/// Decode an image payload into an RGB8 frame; None if it is not an image
pub fn decode_snapshot(bytes: &[u8], channel_id: &str) -> Option<Frame> {
    let image = match image::load_from_memory(bytes) {
        Ok(image) => image,
        Err(e) => {
            log::debug!("Snapshot for channel {} failed to decode: {}", channel_id, e);
            return None;
        }
    };
    let rgb = image.to_rgb8();
    let (width, height) = rgb.dimensions();

    Some(Frame {
        width,
        height,
        format: PixelFormat::Rgb8,
        pixels: rgb.into_raw(),
        channel_id: channel_id.to_string(),
        captured_at: chrono::Local::now(),
    })
}

#[cfg(test)]
#[path = "api_tests.rs"]
mod tests;
