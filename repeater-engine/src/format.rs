//! Formatting of executor responses for display

use repeater_common::ExecutedResponse;

/// CSS class for transport failures and 5xx responses
pub const STATUS_ERROR_CLASS: &str = "status-server-error";

/// Reformat a JSON body with indentation; anything else is returned as is
pub fn pretty_body(body: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(value) => serde_json::to_string_pretty(&value).unwrap_or_else(|_| body.to_string()),
        Err(_) => body.to_string(),
    }
}

/// Raw HTTP response text: status line, headers, blank line, body
pub fn format_response(response: &ExecutedResponse, format_json: bool) -> String {
    let mut raw = format!("HTTP/1.1 {} {}", response.status, response.status_text)
        .trim_end()
        .to_string();
    raw.push('\n');
    for (name, value) in &response.headers {
        raw.push_str(name);
        raw.push_str(": ");
        raw.push_str(value);
        raw.push('\n');
    }
    raw.push('\n');
    if format_json {
        raw.push_str(&pretty_body(&response.body));
    } else {
        raw.push_str(&response.body);
    }
    raw
}

/// Status badge class for an HTTP status code
pub fn status_class(status: u16) -> &'static str {
    match status {
        200..=299 => "status-success",
        300..=399 => "status-redirect",
        400..=499 => "status-client-error",
        _ => STATUS_ERROR_CLASS,
    }
}

pub fn format_duration(duration_ms: u64) -> String {
    format!("{}ms", duration_ms)
}

pub fn format_size(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;

    let size = bytes as f64;
    if size < KB {
        format!("{} B", bytes)
    } else if size < MB {
        format!("{:.1} KB", size / KB)
    } else {
        format!("{:.1} MB", size / MB)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(body: &str) -> ExecutedResponse {
        ExecutedResponse {
            status: 200,
            status_text: "OK".to_string(),
            duration: 12,
            size: body.len() as u64,
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            body: body.to_string(),
        }
    }

    #[test]
    fn test_pretty_body_keeps_key_order() {
        let pretty = pretty_body(r#"{"b":1,"a":[true]}"#);
        assert_eq!(pretty, "{\n  \"b\": 1,\n  \"a\": [\n    true\n  ]\n}");
    }

    #[test]
    fn test_pretty_body_leaves_non_json() {
        assert_eq!(pretty_body("<html></html>"), "<html></html>");
        assert_eq!(pretty_body("{broken"), "{broken");
    }

    #[test]
    fn test_format_response() {
        let raw = format_response(&response(r#"{"ok":true}"#), true);
        assert_eq!(
            raw,
            "HTTP/1.1 200 OK\nContent-Type: application/json\n\n{\n  \"ok\": true\n}"
        );

        let raw = format_response(&response(r#"{"ok":true}"#), false);
        assert!(raw.ends_with("\n\n{\"ok\":true}"));
    }

    #[test]
    fn test_empty_status_text() {
        let mut resp = response("");
        resp.status_text = String::new();
        assert!(format_response(&resp, true).starts_with("HTTP/1.1 200\n"));
    }

    #[test]
    fn test_status_class() {
        assert_eq!(status_class(204), "status-success");
        assert_eq!(status_class(302), "status-redirect");
        assert_eq!(status_class(404), "status-client-error");
        assert_eq!(status_class(503), STATUS_ERROR_CLASS);
        assert_eq!(status_class(0), STATUS_ERROR_CLASS);
    }

    #[test]
    fn test_sizes_and_durations() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.0 MB");
        assert_eq!(format_duration(0), "0ms");
    }
}
