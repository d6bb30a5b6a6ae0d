//! Current-channel tracking over a fixed, non-empty channel list

use crate::error::{AcquisitionError, SelectError};
use crate::models::Channel;

#[derive(Debug, Clone)]
pub struct ChannelSelector {
    channels: Vec<Channel>,
    current: usize,
}

impl ChannelSelector {
    pub fn new(channels: Vec<Channel>) -> Result<Self, AcquisitionError> {
        if channels.is_empty() {
            return Err(AcquisitionError::NoChannels);
        }
        Ok(Self { channels, current: 0 })
    }

    pub fn current(&self) -> &Channel {
        &self.channels[self.current]
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn next(&mut self) -> &Channel {
        self.current = (self.current + 1) % self.channels.len();
        self.current()
    }

    pub fn previous(&mut self) -> &Channel {
        let len = self.channels.len();
        self.current = (self.current + len - 1) % len;
        self.current()
    }

    /// Select the first channel with `id`; leaves the selection untouched if there is none
    pub fn jump_to(&mut self, id: &str) -> Result<&Channel, SelectError> {
        let id = id.trim();
        let index = self
            .channels
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| SelectError::InvalidChannel(id.to_string()))?;
        self.current = index;
        Ok(self.current())
    }
}
