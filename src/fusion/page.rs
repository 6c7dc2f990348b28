//! Extraction of JSON payloads embedded in rendered portal pages.
//!
//! Portal API URLs opened in a browser render the raw JSON inside a single
//! `<pre>` element. A login redirect or error page has no such element.

use scraper::{Html, Selector};
use serde::de::DeserializeOwned;

use crate::error::ParseError;

const PAYLOAD_SELECTOR: &str = "pre";

/// Creates a CSS selector from a string.
fn html_selector(selector: &str) -> Result<Selector, ParseError> {
    Selector::parse(selector).map_err(|e| {
        ParseError::UnexpectedStructure(format!("invalid selector '{}': {}", selector, e))
    })
}

/// Returns the text of the first `<pre>` element, entities decoded.
pub fn extract_payload(page_source: &str) -> Result<String, ParseError> {
    let document = Html::parse_document(page_source);
    let selector = html_selector(PAYLOAD_SELECTOR)?;
    let element = document
        .select(&selector)
        .next()
        .ok_or_else(|| ParseError::missing_marker("<pre>"))?;
    Ok(element.text().collect::<String>())
}

/// Extracts and decodes the JSON payload of a rendered page.
pub fn parse_embedded_json<T: DeserializeOwned>(page_source: &str) -> Result<T, ParseError> {
    let payload = extract_payload(page_source)?;
    Ok(serde_json::from_str(payload.trim())?)
}
