//! Tests for the ISAPI client

#[cfg(test)]
mod tests {
    use crate::api::*;
    use crate::error::RequestError;
    use crate::models::{ConnectionRecord, FetchOutcome, PixelFormat};
    use crate::test_support::{closed_port, png_bytes, serve_once, serve_silent};
    use std::time::{Duration, Instant};

    fn local(port: u16) -> ConnectionRecord {
        ConnectionRecord::new("127.0.0.1", port, "admin", "12345")
    }

    #[test]
    fn test_basic_auth_header() {
        // base64("admin:12345")
        assert_eq!(basic_auth_header("admin", "12345"), "Basic YWRtaW46MTIzNDU=");
        assert_eq!(basic_auth_header("user", ""), "Basic dXNlcjo=");
    }

    #[test]
    fn test_urls() {
        let client = IsapiClient::new(&ConnectionRecord::new("10.1.1.5", 8000, "a", "b"));
        assert_eq!(client.channels_url(), "http://10.1.1.5:8000/ISAPI/Streaming/channels");
        assert_eq!(
            client.snapshot_url("1701"),
            "http://10.1.1.5:8000/ISAPI/Streaming/channels/1701/picture"
        );
    }

    #[test]
    fn test_decode_snapshot_rgb8() {
        let frame = decode_snapshot(&png_bytes(4, 3), "101").unwrap();
        assert_eq!((frame.width, frame.height), (4, 3));
        assert_eq!(frame.format, PixelFormat::Rgb8);
        assert_eq!(frame.pixels.len(), 4 * 3 * 3);
        assert_eq!(&frame.pixels[..3], &[200, 10, 10]);
        assert_eq!(frame.channel_id, "101");
    }

    #[test]
    fn test_decode_snapshot_garbage() {
        assert!(decode_snapshot(b"<html>login required</html>", "101").is_none());
        assert!(decode_snapshot(&[], "101").is_none());
    }

    #[test]
    fn test_fetch_success_sends_auth_and_path() {
        let (port, server) = serve_once(200, "image/png", png_bytes(8, 6));
        let client = IsapiClient::new(&local(port));

        match client.fetch_snapshot("201") {
            FetchOutcome::Success(frame) => {
                assert_eq!((frame.width, frame.height), (8, 6));
                assert_eq!(frame.channel_id, "201");
            }
            other => panic!("expected success, got {:?}", other),
        }

        let request = server.join().unwrap();
        assert!(request.starts_with("GET /ISAPI/Streaming/channels/201/picture HTTP/1.1\r\n"));
        let lower = request.to_ascii_lowercase();
        assert!(lower.contains("authorization: basic ywrtaw46mtizndu="));
    }

    #[test]
    fn test_fetch_not_found_is_http_error() {
        let (port, server) = serve_once(404, "text/plain", b"no such channel".to_vec());
        let client = IsapiClient::new(&local(port));
        assert!(matches!(client.fetch_snapshot("999"), FetchOutcome::HttpError(404)));
        server.join().unwrap();
    }

    #[test]
    fn test_fetch_unauthorized_is_http_error() {
        let (port, server) = serve_once(401, "text/plain", Vec::new());
        let client = IsapiClient::new(&local(port));
        assert!(matches!(client.fetch_snapshot("101"), FetchOutcome::HttpError(401)));
        server.join().unwrap();
    }

    #[test]
    fn test_fetch_bad_body_is_decode_error() {
        let (port, server) = serve_once(200, "image/jpeg", b"\xff\xd8 truncated".to_vec());
        let client = IsapiClient::new(&local(port));
        assert!(matches!(client.fetch_snapshot("101"), FetchOutcome::DecodeError));
        server.join().unwrap();
    }

    #[test]
    fn test_fetch_refused_is_transport_error() {
        let client = IsapiClient::new(&local(closed_port()));
        assert!(matches!(client.fetch_snapshot("101"), FetchOutcome::TransportError(_)));
    }

    #[test]
    fn test_fetch_timeout_is_bounded() {
        let port = serve_silent(Duration::from_secs(4));
        let client = IsapiClient::new(&local(port)).with_timeout(Duration::from_secs(1));

        let started = Instant::now();
        let outcome = client.fetch_snapshot("101");
        let elapsed = started.elapsed();

        assert!(matches!(outcome, FetchOutcome::TransportError(_)), "got {:?}", outcome);
        assert!(elapsed >= Duration::from_millis(900), "returned too early: {:?}", elapsed);
        assert!(elapsed < Duration::from_secs(3), "timeout not honoured: {:?}", elapsed);
    }

    #[test]
    fn test_channel_list_body() {
        let xml = b"<StreamingChannelList><StreamingChannel><id>101</id></StreamingChannel></StreamingChannelList>";
        let (port, server) = serve_once(200, "application/xml", xml.to_vec());
        let client = IsapiClient::new(&local(port));
        let body = client.get_channel_list().unwrap();
        assert!(body.contains("<id>101</id>"));
        let request = server.join().unwrap();
        assert!(request.starts_with("GET /ISAPI/Streaming/channels HTTP/1.1\r\n"));
    }

    #[test]
    fn test_channel_list_http_error() {
        let (port, server) = serve_once(403, "text/plain", Vec::new());
        let client = IsapiClient::new(&local(port));
        assert_eq!(client.get_channel_list(), Err(RequestError::Http(403)));
        assert_eq!(RequestError::Http(403).to_string(), "HTTP error: 403");
        server.join().unwrap();
    }
}
