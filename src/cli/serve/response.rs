//! HTTP response handlers.
//!
//! `HEAD` needs no special casing: tiny_http sends headers only for it.

use crate::utils::mime::types::PLAIN;
use anyhow::{Context, Result, anyhow};
use std::{fs, path::Path};
use tiny_http::{Header, Request, Response, StatusCode};

/// Parsed `Range` header against a known file size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ByteRange {
    /// No usable range; send the whole file
    Full,
    /// Inclusive byte span
    Partial(u64, u64),
    /// Well-formed but outside the file (416)
    Unsatisfiable,
}

/// Respond with a file's bytes, honoring `Range` requests.
pub fn respond_file(request: Request, path: &Path, content_type: &str) -> Result<()> {
    let file = fs::File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let file_size = file.metadata()?.len();

    let range = get_range_header(&request)
        .map_or(ByteRange::Full, |range| parse_range(&range, file_size));

    match range {
        ByteRange::Full => {
            let response = Response::from_file(file)
                .with_header(make_header("Content-Type", content_type)?)
                .with_header(make_header("Accept-Ranges", "bytes")?);
            request.respond(response)?;
            Ok(())
        }
        ByteRange::Partial(start, end) => {
            respond_range(request, file, content_type, (start, end), file_size)
        }
        ByteRange::Unsatisfiable => {
            let response = Response::empty(StatusCode(416))
                .with_header(make_header("Content-Range", &format!("bytes */{file_size}"))?);
            request.respond(response)?;
            Ok(())
        }
    }
}

/// Send an inclusive byte span as 206 Partial Content (media seeking).
fn respond_range(
    request: Request,
    mut file: fs::File,
    content_type: &str,
    (start, end): (u64, u64),
    file_size: u64,
) -> Result<()> {
    use std::io::{Read, Seek, SeekFrom};

    let length = end - start + 1;

    // Stream the requested range
    file.seek(SeekFrom::Start(start))?;
    let reader = file.take(length);

    let content_range = format!("bytes {start}-{end}/{file_size}");
    let response = Response::new(
        StatusCode(206),
        vec![
            make_header("Content-Type", content_type)?,
            make_header("Content-Range", &content_range)?,
            make_header("Accept-Ranges", "bytes")?,
        ],
        reader,
        Some(usize::try_from(length)?),
        None,
    );

    request.respond(response)?;
    Ok(())
}

/// Parse a `Range` header value (`bytes=start-end`, `bytes=start-`,
/// `bytes=-suffix`). Only the first range of a list is honored; anything
/// malformed falls back to the full file.
fn parse_range(header: &str, file_size: u64) -> ByteRange {
    let Some(ranges) = header.trim().strip_prefix("bytes=") else {
        return ByteRange::Full;
    };
    let first = ranges.split(',').next().unwrap_or_default().trim();
    let Some((s, e)) = first.split_once('-') else {
        return ByteRange::Full;
    };
    let (s, e) = (s.trim(), e.trim());

    let parsed = match (s.parse::<u64>(), e.parse::<u64>()) {
        // "0-499"
        (Ok(start), Ok(end)) if start <= end => Some((start, Some(end))),
        // "500-"
        (Ok(start), Err(_)) if e.is_empty() => Some((start, None)),
        // "-500": last 500 bytes
        (Err(_), Ok(suffix)) if s.is_empty() => {
            if suffix == 0 || file_size == 0 {
                return ByteRange::Unsatisfiable;
            }
            Some((file_size.saturating_sub(suffix), None))
        }
        _ => None,
    };

    let Some((start, end)) = parsed else {
        return ByteRange::Full;
    };
    if start >= file_size {
        return ByteRange::Unsatisfiable;
    }

    let last = file_size - 1;
    ByteRange::Partial(start, end.map_or(last, |end| end.min(last)))
}

/// Extract Range header from request.
fn get_range_header(request: &Request) -> Option<String> {
    request
        .headers()
        .iter()
        .find(|h| h.field.as_str().as_str().eq_ignore_ascii_case("range"))
        .map(|h| h.value.to_string())
}

/// Respond with 404.
pub fn respond_not_found(request: Request) -> Result<()> {
    send_body(request, 404, PLAIN, b"404 Not Found".to_vec())
}

/// Respond with 405 for anything but GET and HEAD.
pub fn respond_method_not_allowed(request: Request) -> Result<()> {
    let response = Response::from_data(b"405 Method Not Allowed".to_vec())
        .with_status_code(StatusCode(405))
        .with_header(make_header("Content-Type", PLAIN)?)
        .with_header(make_header("Allow", "GET, HEAD")?);
    request.respond(response)?;
    Ok(())
}

/// Respond with 503 Service Unavailable (server shutting down).
pub fn respond_unavailable(request: Request) -> Result<()> {
    send_body(request, 503, PLAIN, b"503 Service Unavailable".to_vec())
}

fn send_body(request: Request, status: u16, content_type: &str, body: Vec<u8>) -> Result<()> {
    let response = Response::from_data(body)
        .with_status_code(StatusCode(status))
        .with_header(make_header("Content-Type", content_type)?);
    request.respond(response)?;
    Ok(())
}

/// Content types may come from user config, so header construction can fail.
fn make_header(key: &str, value: &str) -> Result<Header> {
    Header::from_bytes(key, value).map_err(|()| anyhow!("invalid header {key}: {value:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_range_forms() {
        assert_eq!(parse_range("bytes=0-4", 10), ByteRange::Partial(0, 4));
        assert_eq!(parse_range("bytes=2-", 10), ByteRange::Partial(2, 9));
        assert_eq!(parse_range("bytes=-3", 10), ByteRange::Partial(7, 9));
        assert_eq!(parse_range("bytes=-30", 10), ByteRange::Partial(0, 9));
        assert_eq!(parse_range("bytes=5-100", 10), ByteRange::Partial(5, 9));
        assert_eq!(parse_range(" bytes=1-2, 5-6", 10), ByteRange::Partial(1, 2));
    }

    #[test]
    fn test_parse_range_unsatisfiable() {
        assert_eq!(parse_range("bytes=10-", 10), ByteRange::Unsatisfiable);
        assert_eq!(parse_range("bytes=20-30", 10), ByteRange::Unsatisfiable);
        assert_eq!(parse_range("bytes=-0", 10), ByteRange::Unsatisfiable);
        assert_eq!(parse_range("bytes=0-", 0), ByteRange::Unsatisfiable);
    }

    #[test]
    fn test_parse_range_malformed_is_full() {
        assert_eq!(parse_range("items=0-4", 10), ByteRange::Full);
        assert_eq!(parse_range("bytes=4-2", 10), ByteRange::Full);
        assert_eq!(parse_range("bytes=abc", 10), ByteRange::Full);
        assert_eq!(parse_range("bytes=-", 10), ByteRange::Full);
    }

    #[test]
    fn test_make_header_rejects_non_ascii() {
        assert!(make_header("Content-Type", "text/plain").is_ok());
        assert!(make_header("Content-Type", "tëxt/plain").is_err());
    }
}
