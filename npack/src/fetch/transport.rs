//! The transport boundary: URL in, headers and byte stream out.
//!
//! [`Transport`] is the seam the scheduler fetches through. The production
//! implementation is [`HttpTransport`] on reqwest's blocking client; tests
//! substitute in-memory fakes.

use std::io::Read;
use std::time::{Duration, SystemTime};

use percent_encoding::percent_decode_str;
use reqwest::blocking::Client;
use reqwest::header::{CONTENT_DISPOSITION, LAST_MODIFIED};
use url::Url;

use super::error::FetchError;

/// Default timeout for HTTP requests in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 300; // 5 minutes

/// Response metadata plus the (not yet consumed) body stream.
///
/// The scheduler decides from the metadata whether the body is read at
/// all; a fresh local file means the stream is dropped unread.
pub struct FetchResponse {
    /// The final URL after any redirects.
    pub resolved_url: Url,

    /// Parsed `Last-Modified` header, when the server sent one.
    pub last_modified: Option<SystemTime>,

    /// Filename carried by a `Content-Disposition` header, when present.
    pub content_disposition_filename: Option<String>,

    pub body: Box<dyn Read>,
}

impl FetchResponse {
    /// The server-derived filename for this resource.
    ///
    /// Preference order: the `Content-Disposition` filename parameter,
    /// then the last path segment of the resolved URL (percent-decoded).
    /// `None` when neither yields a non-empty name.
    pub fn server_filename(&self) -> Option<String> {
        if let Some(name) = &self.content_disposition_filename {
            if !name.is_empty() {
                return Some(name.clone());
            }
        }

        let segment = self.resolved_url.path_segments()?.next_back()?;
        let decoded = percent_decode_str(segment).decode_utf8().ok()?;
        if decoded.is_empty() {
            None
        } else {
            Some(decoded.into_owned())
        }
    }
}

/// Fetches a URL, yielding response metadata and a byte stream.
pub trait Transport {
    fn fetch(&self, url: &Url) -> Result<FetchResponse, FetchError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn fetch(&self, url: &Url) -> Result<FetchResponse, FetchError> {
        (**self).fetch(url)
    }
}

/// HTTP transport on reqwest's blocking client.
#[derive(Debug)]
pub struct HttpTransport {
    client: Client,
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpTransport {
    /// Create an HTTP transport with the default timeout.
    pub fn new() -> Self {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create an HTTP transport with a custom timeout.
    pub fn with_timeout(timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self { client }
    }
}

impl Transport for HttpTransport {
    fn fetch(&self, url: &Url) -> Result<FetchResponse, FetchError> {
        let response =
            self.client
                .get(url.clone())
                .send()
                .map_err(|e| FetchError::FetchFailed {
                    url: url.to_string(),
                    reason: e.to_string(),
                })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::FetchFailed {
                url: url.to_string(),
                reason: format!("request failed with status {}", status),
            });
        }

        let resolved_url = response.url().clone();
        let last_modified = response
            .headers()
            .get(LAST_MODIFIED)
            .and_then(|value| value.to_str().ok())
            .and_then(parse_http_date);
        let content_disposition_filename = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|value| value.to_str().ok())
            .and_then(content_disposition_filename);

        Ok(FetchResponse {
            resolved_url,
            last_modified,
            content_disposition_filename,
            body: Box::new(response),
        })
    }
}

/// Parse an RFC 2822 HTTP date such as `Tue, 15 Nov 1994 12:45:26 GMT`.
fn parse_http_date(value: &str) -> Option<SystemTime> {
    chrono::DateTime::parse_from_rfc2822(value)
        .ok()
        .map(SystemTime::from)
}

/// Pull the filename parameter out of a `Content-Disposition` value like
/// `attachment; filename="archive.zip"`.
fn content_disposition_filename(value: &str) -> Option<String> {
    let (_, parameters) = value.split_once(';')?;
    for parameter in parameters.split(';') {
        if let Some(rest) = parameter.trim_start().strip_prefix("filename=") {
            let name = rest.trim().trim_matches('"').trim();
            if !name.is_empty() {
                return Some(name.to_string());
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn response(resolved: &str, disposition: Option<&str>) -> FetchResponse {
        FetchResponse {
            resolved_url: Url::parse(resolved).unwrap(),
            last_modified: None,
            content_disposition_filename: disposition.map(str::to_string),
            body: Box::new(Cursor::new(Vec::new())),
        }
    }

    #[test]
    fn test_server_filename_prefers_content_disposition() {
        let response = response("http://example.com/download?id=5", Some("archive.zip"));
        assert_eq!(response.server_filename().unwrap(), "archive.zip");
    }

    #[test]
    fn test_server_filename_falls_back_to_path_segment() {
        let response = response("http://example.com/files/library.dll", None);
        assert_eq!(response.server_filename().unwrap(), "library.dll");
    }

    #[test]
    fn test_server_filename_percent_decodes_segment() {
        let response = response("http://example.com/files/My%20Library.dll", None);
        assert_eq!(response.server_filename().unwrap(), "My Library.dll");
    }

    #[test]
    fn test_server_filename_empty_for_trailing_slash() {
        let response = response("http://example.com/files/", None);
        assert!(response.server_filename().is_none());
    }

    #[test]
    fn test_parse_http_date() {
        let parsed = parse_http_date("Tue, 15 Nov 1994 12:45:26 GMT").unwrap();
        assert!(parsed > SystemTime::UNIX_EPOCH);
        assert!(parse_http_date("not a date").is_none());
    }

    #[test]
    fn test_content_disposition_filename_quoted() {
        assert_eq!(
            content_disposition_filename("attachment; filename=\"archive.zip\"").unwrap(),
            "archive.zip"
        );
    }

    #[test]
    fn test_content_disposition_filename_unquoted() {
        assert_eq!(
            content_disposition_filename("attachment; filename=archive.zip").unwrap(),
            "archive.zip"
        );
    }

    #[test]
    fn test_content_disposition_without_filename() {
        assert!(content_disposition_filename("inline").is_none());
        assert!(content_disposition_filename("attachment; name=field").is_none());
    }
}
