//! Response rendering: highlighting and baseline diffs
//!
//! The session layer only decides which of the two operations to call.
//! Front-ends with their own highlighter implement [`ResponseRenderer`];
//! [`PlainRenderer`] is a fallback producing simple HTML.

use similar::{capture_diff_slices_deadline, Algorithm, DiffTag};
use std::time::{Duration, Instant};

/// Past this the diff degrades to coarser hunks instead of stalling the send
const DIFF_DEADLINE: Duration = Duration::from_millis(500);

/// Rendering operations consumed by the session layer
pub trait ResponseRenderer {
    /// Structural diff of two raw HTTP responses
    fn render_diff(&self, old: &str, new: &str) -> String;

    /// Syntax-highlighted form of a raw HTTP message
    fn highlight_http(&self, text: &str) -> String;
}

/// Line-based HTML renderer
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainRenderer;

/// One line of a line-level diff
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffLine<'a> {
    Same(&'a str),
    Removed(&'a str),
    Added(&'a str),
}

/// Line-level Myers diff
///
/// Lines are compared without their terminators, so a missing trailing
/// newline never shows up as a change. Memory stays linear in the input.
pub fn diff_lines<'a>(old: &'a str, new: &'a str) -> Vec<DiffLine<'a>> {
    let a: Vec<&str> = old.lines().collect();
    let b: Vec<&str> = new.lines().collect();
    let deadline = Instant::now() + DIFF_DEADLINE;

    let mut out = Vec::with_capacity(a.len().max(b.len()));
    for op in capture_diff_slices_deadline(Algorithm::Myers, &a, &b, Some(deadline)) {
        let (tag, old_range, new_range) = op.as_tag_tuple();
        match tag {
            DiffTag::Equal => out.extend(a[old_range].iter().map(|line| DiffLine::Same(*line))),
            DiffTag::Delete => out.extend(a[old_range].iter().map(|line| DiffLine::Removed(*line))),
            DiffTag::Insert => out.extend(b[new_range].iter().map(|line| DiffLine::Added(*line))),
            DiffTag::Replace => {
                out.extend(a[old_range].iter().map(|line| DiffLine::Removed(*line)));
                out.extend(b[new_range].iter().map(|line| DiffLine::Added(*line)));
            }
        }
    }
    out
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

impl ResponseRenderer for PlainRenderer {
    fn render_diff(&self, old: &str, new: &str) -> String {
        diff_lines(old, new)
            .into_iter()
            .map(|line| match line {
                DiffLine::Same(text) => escape_html(text),
                DiffLine::Removed(text) => format!("<del>{}</del>", escape_html(text)),
                DiffLine::Added(text) => format!("<ins>{}</ins>", escape_html(text)),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn highlight_http(&self, text: &str) -> String {
        let mut out = Vec::new();
        let mut in_headers = true;
        for (index, line) in text.lines().enumerate() {
            if index == 0 {
                out.push(format!("<span class=\"http-start\">{}</span>", escape_html(line)));
                continue;
            }
            if in_headers && line.is_empty() {
                in_headers = false;
                out.push(String::new());
                continue;
            }
            match line.split_once(':') {
                Some((name, value)) if in_headers => out.push(format!(
                    "<span class=\"http-header\">{}</span>:{}",
                    escape_html(name),
                    escape_html(value)
                )),
                _ => out.push(escape_html(line)),
            }
        }
        out.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diff_identical() {
        let lines = diff_lines("a\nb", "a\nb");
        assert_eq!(lines, vec![DiffLine::Same("a"), DiffLine::Same("b")]);
    }

    #[test]
    fn test_diff_changed_line() {
        let lines = diff_lines("HTTP/1.1 200 OK\nx: 1\n\nbody", "HTTP/1.1 200 OK\nx: 2\n\nbody");
        assert_eq!(
            lines,
            vec![
                DiffLine::Same("HTTP/1.1 200 OK"),
                DiffLine::Removed("x: 1"),
                DiffLine::Added("x: 2"),
                DiffLine::Same(""),
                DiffLine::Same("body"),
            ]
        );
    }

    #[test]
    fn test_diff_appended_and_truncated() {
        assert_eq!(diff_lines("a", "a\nb"), vec![DiffLine::Same("a"), DiffLine::Added("b")]);
        assert_eq!(diff_lines("a\nb", ""), vec![DiffLine::Removed("a"), DiffLine::Removed("b")]);
    }

    fn json_lines(count: usize, marker: &str) -> String {
        let mut body = String::from("HTTP/1.1 200 OK\nContent-Type: application/json\n\n[\n");
        for i in 0..count {
            body.push_str(&format!("  {{\"id\": {}, \"name\": \"item-{}-{}\"}},\n", i, i, marker));
        }
        body.push(']');
        body
    }

    #[test]
    fn test_large_bodies_diff_in_linear_memory() {
        // ~15k lines each; a quadratic table here would need gigabytes
        let old = json_lines(15_000, "a");
        let mut new = old.replacen("\"item-7000-a\"", "\"item-7000-b\"", 1);
        new.push_str("\n");

        let lines = diff_lines(&old, &new);
        let removed: Vec<_> = lines.iter().filter(|l| matches!(l, DiffLine::Removed(_))).collect();
        let added: Vec<_> = lines.iter().filter(|l| matches!(l, DiffLine::Added(_))).collect();
        assert_eq!(removed, vec![&DiffLine::Removed("  {\"id\": 7000, \"name\": \"item-7000-a\"},")]);
        assert_eq!(added, vec![&DiffLine::Added("  {\"id\": 7000, \"name\": \"item-7000-b\"},")]);

        let html = PlainRenderer.render_diff(&old, &new);
        assert_eq!(html.matches("<del>").count(), 1);
        assert_eq!(html.matches("<ins>").count(), 1);
    }

    #[test]
    fn test_unrelated_large_bodies_cover_every_line() {
        let old = json_lines(15_000, "a");
        let new = json_lines(15_000, "b");

        let lines = diff_lines(&old, &new);
        let old_side = lines.iter().filter(|l| !matches!(l, DiffLine::Added(_))).count();
        let new_side = lines.iter().filter(|l| !matches!(l, DiffLine::Removed(_))).count();
        assert_eq!(old_side, old.lines().count());
        assert_eq!(new_side, new.lines().count());
    }

    #[test]
    fn test_render_diff_markup() {
        let html = PlainRenderer.render_diff("<a>", "<b>");
        assert_eq!(html, "<del>&lt;a&gt;</del>\n<ins>&lt;b&gt;</ins>");
    }

    #[test]
    fn test_highlight_http() {
        let html = PlainRenderer.highlight_http("HTTP/1.1 200 OK\nContent-Type: text/html\n\n<p>a: b</p>");
        let lines: Vec<&str> = html.lines().collect();
        assert_eq!(lines[0], "<span class=\"http-start\">HTTP/1.1 200 OK</span>");
        assert_eq!(lines[1], "<span class=\"http-header\">Content-Type</span>: text/html");
        assert_eq!(lines[2], "");
        assert_eq!(lines[3], "&lt;p&gt;a: b&lt;/p&gt;");
    }
}
