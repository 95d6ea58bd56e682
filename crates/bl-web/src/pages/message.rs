//! Single-message pages: fetch failures, refresh confirmation.

use super::{escape_html, layout};

pub const FETCH_FAILED: &str = "Could not fetch data from API";
pub const INVALID_FORMAT: &str = "Invalid data format from API";

/// Error page with a plain-text message.
pub fn error_page(message: &str) -> String {
    render("Error", &escape_html(message))
}

/// Builder page requested before anything has been fetched.
pub fn no_cache_page() -> String {
    render(
        "Error",
        r#"No cached data available. Please visit the <a href="/">dashboard</a> first to load data."#,
    )
}

pub fn refreshed_page(stale: bool) -> String {
    if stale {
        render(
            "Refresh failed",
            r#"Could not reach the API; the previously cached data is still being served. <a href="/">Go back to dashboard</a>"#,
        )
    } else {
        render("Cache refreshed", r#"Cache refreshed successfully! <a href="/">Go back to dashboard</a>"#)
    }
}

/// `body_html` is trusted markup.
fn render(heading: &str, body_html: &str) -> String {
    let content = format!("<h1>{}</h1>\n<p>{}</p>", escape_html(heading), body_html);
    layout(&format!("{} - Builder Dashboard", heading), &content)
}
