//! Raw request text to executor input
//!
//! Only as much HTTP parsing as sending needs: request line, headers up to
//! the first blank line, and everything after as the body.

use repeater_common::{ExecuteOptions, RequestRecord};

use crate::error::{RepeaterError, RepeaterResult};

/// Headers the transport computes itself
const SKIPPED_HEADERS: [&str; 2] = ["host", "content-length"];

/// A raw request split into the pieces the executor needs
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRequest {
    pub method: String,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl ParsedRequest {
    /// Executor arguments, dropping headers the transport sets
    pub fn into_execute(self) -> (String, ExecuteOptions) {
        let headers = self
            .headers
            .into_iter()
            .filter(|(name, _)| !SKIPPED_HEADERS.contains(&name.to_ascii_lowercase().as_str()))
            .collect();
        (
            self.url,
            ExecuteOptions {
                method: self.method,
                headers,
                body: self.body,
            },
        )
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Parse raw request text, building the URL from `Host` and the scheme flag
/// unless the request target is already absolute
pub fn parse_raw_request(raw: &str, use_https: bool) -> RepeaterResult<ParsedRequest> {
    let normalized = raw.replace("\r\n", "\n");
    let normalized = normalized.trim_start_matches('\n');
    let (head, body) = match normalized.split_once("\n\n") {
        Some((head, body)) => (head, body),
        None => (normalized, ""),
    };

    let mut lines = head.lines();
    let request_line = lines
        .next()
        .filter(|line| !line.trim().is_empty())
        .ok_or_else(|| RepeaterError::malformed_request("missing request line"))?;

    let mut parts = request_line.split_whitespace();
    let (method, target) = match (parts.next(), parts.next()) {
        (Some(method), Some(target)) => (method.to_string(), target.to_string()),
        _ => return Err(RepeaterError::malformed_request("request line needs a method and a target")),
    };

    let mut headers = Vec::new();
    for line in lines {
        match line.split_once(':') {
            Some((name, value)) if !name.trim().is_empty() => {
                headers.push((name.trim().to_string(), value.trim().to_string()));
            }
            _ => {
                return Err(RepeaterError::malformed_request(&format!(
                    "invalid header line '{}'",
                    line
                )))
            }
        }
    }

    let mut parsed = ParsedRequest {
        method,
        url: String::new(),
        headers,
        body: if body.is_empty() { None } else { Some(body.to_string()) },
    };

    parsed.url = if target.starts_with("http://") || target.starts_with("https://") {
        target
    } else {
        let host = parsed
            .header("host")
            .filter(|host| !host.is_empty())
            .ok_or_else(|| RepeaterError::malformed_request("missing Host header"))?;
        let scheme = if use_https { "https" } else { "http" };
        let path = if target.starts_with('/') {
            target
        } else {
            format!("/{}", target)
        };
        format!("{}://{}{}", scheme, host, path)
    };

    url::Url::parse(&parsed.url)
        .map_err(|e| RepeaterError::malformed_request(&format!("invalid URL '{}': {}", parsed.url, e)))?;

    Ok(parsed)
}

/// Build a request record from raw text
pub fn record_from_raw(raw: &str, use_https: bool) -> RepeaterResult<RequestRecord> {
    let parsed = parse_raw_request(raw, use_https)?;
    Ok(RequestRecord::new(parsed.method, parsed.url, raw, use_https))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_get() {
        let raw = "GET /api/users?page=2 HTTP/1.1\r\nHost: example.com\r\nAccept: */*\r\n\r\n";
        let parsed = parse_raw_request(raw, true).unwrap();
        assert_eq!(parsed.method, "GET");
        assert_eq!(parsed.url, "https://example.com/api/users?page=2");
        assert_eq!(parsed.header("accept"), Some("*/*"));
        assert_eq!(parsed.body, None);
    }

    #[test]
    fn test_parse_post_body_and_plain_http() {
        let raw = "POST /login HTTP/1.1\nHost: example.com:8080\nContent-Type: application/json\nContent-Length: 17\n\n{\"user\":\"admin\"}\n";
        let parsed = parse_raw_request(raw, false).unwrap();
        assert_eq!(parsed.url, "http://example.com:8080/login");
        assert_eq!(parsed.body.as_deref(), Some("{\"user\":\"admin\"}\n"));

        let (url, options) = parsed.into_execute();
        assert_eq!(url, "http://example.com:8080/login");
        assert_eq!(options.method, "POST");
        assert_eq!(
            options.headers,
            vec![("Content-Type".to_string(), "application/json".to_string())]
        );
    }

    #[test]
    fn test_absolute_target() {
        let parsed = parse_raw_request("GET http://other.test/x HTTP/1.1\n\n", true).unwrap();
        assert_eq!(parsed.url, "http://other.test/x");
    }

    #[test]
    fn test_header_value_with_colon() {
        let raw = "GET / HTTP/1.1\nHost: example.com\nReferer: https://example.com/a\n\n";
        let parsed = parse_raw_request(raw, true).unwrap();
        assert_eq!(parsed.header("Referer"), Some("https://example.com/a"));
    }

    #[test]
    fn test_malformed_requests() {
        assert!(matches!(parse_raw_request("", true), Err(RepeaterError::MalformedRequest { .. })));
        assert!(matches!(parse_raw_request("GET\n\n", true), Err(RepeaterError::MalformedRequest { .. })));
        assert!(matches!(
            parse_raw_request("GET / HTTP/1.1\n\n", true),
            Err(RepeaterError::MalformedRequest { .. })
        ));
        assert!(matches!(
            parse_raw_request("GET / HTTP/1.1\nHost example.com\n\n", true),
            Err(RepeaterError::MalformedRequest { .. })
        ));
    }

    #[test]
    fn test_record_from_raw() {
        let record = record_from_raw("DELETE /items/4 HTTP/1.1\nHost: api.test\n\n", true).unwrap();
        assert_eq!(record.method, "DELETE");
        assert_eq!(record.url, "https://api.test/items/4");
        assert!(record.use_https);
    }
}
