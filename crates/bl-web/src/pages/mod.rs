//! Server-rendered HTML pages.
//!
//! Every page is a fragment dropped into `layout.html`. Values that came from
//! the API are escaped; the surrounding markup is ours.

pub mod builder;
pub mod dashboard;
pub mod message;

use chrono::{DateTime, Utc};
use std::time::Duration;

/// Page shell with `__TITLE__` and `__CONTENT__` placeholders (embedded at compile time).
static LAYOUT: &str = include_str!("layout.html");

/// Wrap a content fragment in the shared page shell.
pub fn layout(title: &str, content: &str) -> String {
    LAYOUT
        .replacen("__TITLE__", &escape_html(title), 1)
        .replacen("__CONTENT__", content, 1)
}

pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// `1234.5` → `$1,234.50`, `-3` → `-$3.00`
pub fn usd(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let sign = if value < 0.0 && fixed != "0.00" { "-" } else { "" };
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    format!("{}${}.{}", sign, group_thousands(whole), cents)
}

/// Token amounts: up to six decimals, trailing zeros trimmed.
pub fn amount(value: f64) -> String {
    let fixed = format!("{:.6}", value);
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    match trimmed {
        "" | "-0" => "0".to_string(),
        t => t.to_string(),
    }
}

pub fn count(value: usize) -> String {
    group_thousands(&value.to_string())
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// CSS class for a signed value.
pub fn sign_class(value: f64) -> &'static str {
    if value > 0.0 {
        "gain"
    } else if value < 0.0 {
        "loss"
    } else {
        ""
    }
}

/// `0x4838b106fce9647bdf1e7877bf73ce8b0bad5f97` → `0x4838…5f97`
pub fn short_hash(hash: &str) -> String {
    if hash.len() > 12 && hash.is_ascii() {
        format!("{}…{}", &hash[..6], &hash[hash.len() - 4..])
    } else {
        hash.to_string()
    }
}

/// Line describing when the data shown was fetched.
pub fn freshness(fetched_at: DateTime<Utc>, age: Duration, stale: bool) -> String {
    let mut html = format!(
        r#"<p class="meta">Data fetched {} UTC ({}s ago)</p>"#,
        fetched_at.format("%Y-%m-%d %H:%M:%S"),
        age.as_secs()
    );
    if stale {
        html.push_str(
            r#"<p class="notice">The API could not be reached, so this page shows the last data fetched successfully.</p>"#,
        );
    }
    html
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usd_formatting() {
        assert_eq!(usd(0.0), "$0.00");
        assert_eq!(usd(1234.5), "$1,234.50");
        assert_eq!(usd(-1_000_000.004), "-$1,000,000.00");
        assert_eq!(usd(999.999), "$1,000.00");
        assert_eq!(usd(-0.001), "$0.00");
    }

    #[test]
    fn amount_trims_zeros() {
        assert_eq!(amount(10.0), "10");
        assert_eq!(amount(0.25), "0.25");
        assert_eq!(amount(-0.0000001), "0");
        assert_eq!(amount(1.1234567), "1.123457");
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(escape_html(r#"<a href="x">'&'</a>"#), "&lt;a href=&quot;x&quot;&gt;&#39;&amp;&#39;&lt;/a&gt;");
    }

    #[test]
    fn layout_fills_placeholders() {
        let html = layout("A & B", "<p>body</p>");
        assert!(html.contains("<title>A &amp; B</title>"));
        assert!(html.contains("<p>body</p>"));
        assert!(!html.contains("__CONTENT__"));
    }

    #[test]
    fn short_hash_keeps_short_values() {
        assert_eq!(short_hash("0x4838b106fce9647bdf1e7877bf73ce8b0bad5f97"), "0x4838…5f97");
        assert_eq!(short_hash("Unknown"), "Unknown");
    }
}
