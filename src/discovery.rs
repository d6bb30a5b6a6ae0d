//! Channel discovery via `/ISAPI/Streaming/channels`
//!
//! Devices answer with a `StreamingChannelList` document:
//!
//! ```xml
//! <StreamingChannelList xmlns="http://www.hikvision.com/ver20/XMLSchema">
//!   <StreamingChannel>
//!     <id>101</id>
//!     <channelName>Camera 01</channelName>
//!     <Video>...</Video>
//!   </StreamingChannel>
//! </StreamingChannelList>
//! ```
//!
//! Many firmwares do not expose the endpoint at all, so an empty result is
//! normal and callers fall back to a synthesized list.

use crate::api::IsapiClient;
use crate::models::Channel;
use quick_xml::events::Event;
use quick_xml::reader::Reader;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Field {
    Id,
    Name,
}

/// Query the device for its streaming channels.
///
/// Any failure (HTTP status, transport, bad XML) yields an empty list.
pub fn discover(client: &IsapiClient) -> Vec<Channel> {
    let xml = match client.get_channel_list() {
        Ok(xml) => xml,
        Err(e) => {
            log::info!("Channel discovery unavailable: {}", e);
            return Vec::new();
        }
    };

    match parse_channel_list(&xml) {
        Ok(channels) => channels,
        Err(e) => {
            log::info!("Channel discovery returned unparseable XML: {}", e);
            Vec::new()
        }
    }
}

/// `count` channels with ids `101, 201, ... <count>01` and labels `Camera <n>`
pub fn fallback(count: usize) -> Vec<Channel> {
    (1..=count)
        .map(|n| Channel {
            id: format!("{}01", n),
            label: format!("Camera {}", n),
        })
        .collect()
}

/// Discover channels, falling back to `fallback(fallback_count)` when none are found
pub fn resolve(client: &IsapiClient, fallback_count: usize) -> Vec<Channel> {
    let channels = discover(client);
    if channels.is_empty() {
        log::info!("No channels discovered, assuming {} channels", fallback_count);
        fallback(fallback_count)
    } else {
        log::info!("Discovered {} channels", channels.len());
        channels
    }
}

/// Extract every `StreamingChannel`'s direct `id` (and `channelName`, if any)
pub fn parse_channel_list(xml: &str) -> Result<Vec<Channel>, String> {
    // Whitespace is trimmed per field, not per event: entity references split text events
    let mut reader = Reader::from_str(xml);

    let mut channels = Vec::new();
    let mut depth = 0usize;
    let mut channel_depth: Option<usize> = None;
    let mut current: Option<Channel> = None;
    let mut field: Option<Field> = None;
    let mut text_buf = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                depth += 1;
                let name = e.local_name();
                match channel_depth {
                    None if name.as_ref() == b"StreamingChannel" => {
                        channel_depth = Some(depth);
                        current = Some(Channel::new("", ""));
                    }
                    Some(d) if depth == d + 1 => {
                        field = match name.as_ref() {
                            b"id" => Some(Field::Id),
                            b"channelName" => Some(Field::Name),
                            _ => None,
                        };
                        text_buf.clear();
                    }
                    _ => {}
                }
            }
            Ok(Event::Text(ref e)) => {
                if field.is_some() {
                    let raw = String::from_utf8_lossy(e.as_ref());
                    text_buf.push_str(&raw);
                }
            }
            Ok(Event::GeneralRef(ref e)) => {
                if field.is_some() {
                    let name = String::from_utf8_lossy(e.as_ref());
                    match resolve_entity(&name) {
                        Some(c) => text_buf.push(c),
                        None => {
                            text_buf.push('&');
                            text_buf.push_str(&name);
                            text_buf.push(';');
                        }
                    }
                }
            }
            Ok(Event::End(_)) => {
                match channel_depth {
                    Some(d) if depth == d + 1 => {
                        if let (Some(f), Some(chan)) = (field.take(), current.as_mut()) {
                            let value = text_buf.trim().to_string();
                            match f {
                                Field::Id => chan.id = value,
                                Field::Name => chan.label = value,
                            }
                        }
                    }
                    Some(d) if depth == d => {
                        if let Some(chan) = current.take() {
                            if !chan.id.is_empty() {
                                channels.push(chan);
                            }
                        }
                        channel_depth = None;
                    }
                    _ => {}
                }
                depth = depth.saturating_sub(1);
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(format!(
                    "XML error at byte {}: {}",
                    reader.error_position(),
                    e
                ))
            }
            _ => {}
        }
    }

    Ok(channels)
}

/// Predefined XML entities and numeric character references
fn resolve_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let code = name.strip_prefix('#')?;
            let value = match code.strip_prefix('x') {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => code.parse().ok()?,
            };
            char::from_u32(value)
        }
    }
}
