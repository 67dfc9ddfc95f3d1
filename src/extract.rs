//! Layout-tolerant result extraction.
//!
//! The target rotates its markup between requests, so nothing here assumes a
//! single layout. Titles are located through a prioritized selector chain
//! (first chain link with any matches wins), each title is tied back to its
//! enclosing result container by walking the ancestor chain, and snippet and
//! date extraction degrade gracefully instead of failing. The whole module
//! is total: any input, however malformed, yields a (possibly empty) record
//! list.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::response::ResultRecord;

/// Maximum number of title candidates considered per page.
const MAX_CANDIDATES: usize = 20;
/// Maximum ancestor levels walked when locating the result container.
const CONTAINER_WALK_LEVELS: usize = 5;
/// Length cap applied to normalized text.
const MAX_TEXT_LEN: usize = 500;

/// Known title locations across observed layout variants, in priority order.
static TITLE_SELECTORS: Lazy<Vec<Selector>> = Lazy::new(|| {
    [
        "div[data-ved] h3",
        "div.g h3",
        "div.rc h3",
        "div[data-hveid] h3",
        ".g .r h3",
    ]
    .iter()
    .map(|s| Selector::parse(s).expect("hardcoded selector"))
    .collect()
});

/// Known snippet locations, in priority order.
static SNIPPET_SELECTORS: Lazy<Vec<Selector>> = Lazy::new(|| {
    [
        "span[data-ved]",
        ".s",
        ".st",
        "div[data-sncf]",
        r#"div[style*="color"]"#,
    ]
    .iter()
    .map(|s| Selector::parse(s).expect("hardcoded selector"))
    .collect()
});

static LINK_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a[href]").expect("hardcoded selector"));

static GENERIC_TEXT_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div, span").expect("hardcoded selector"));

/// Date-like patterns tested against the container text, first match wins.
static DATE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"\d{1,2}\s+\w+\s+\d{4}",
        r"\d{1,2}/\d{1,2}/\d{4}",
        r"\w+\s+\d{1,2},\s+\d{4}",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("hardcoded pattern"))
    .collect()
});

static DISALLOWED_CHARS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"[^\w\s.,!?;:\-()'"áéíóúñüÁÉÍÓÚÑÜ@]"#).expect("hardcoded pattern")
});

static WHITESPACE_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("hardcoded pattern"));

/// Collapses whitespace, strips characters outside the permitted set and
/// caps the length on a char boundary.
pub fn normalize_text(text: &str) -> String {
    let stripped = DISALLOWED_CHARS.replace_all(text, "");
    let collapsed = WHITESPACE_RUN.replace_all(&stripped, " ");
    collapsed.trim().chars().take(MAX_TEXT_LEN).collect()
}

/// Recovers the destination URL from a result hyperlink.
///
/// Redirect-wrapped links (`/url?q=<dest>&...`) are unwrapped; absolute URLs
/// pass through; internal navigation links (`/search...`) become empty.
/// Anything else passes through unchanged and is rejected downstream by the
/// scheme check.
pub fn unwrap_redirect(href: &str) -> String {
    if let Some(wrapped) = href.strip_prefix("/url?q=") {
        wrapped.split('&').next().unwrap_or(wrapped).to_string()
    } else if href.starts_with("http") {
        href.to_string()
    } else if href.starts_with("/search") {
        String::new()
    } else {
        href.to_string()
    }
}

/// Walks up from a title element to the enclosing result container: a `div`
/// carrying a `data-ved` or `class` attribute within a bounded number of
/// levels, else the furthest ancestor reached.
fn enclosing_container(title: ElementRef<'_>) -> ElementRef<'_> {
    let mut container = title;
    for _ in 0..CONTAINER_WALK_LEVELS {
        let parent = match container.parent().and_then(ElementRef::wrap) {
            Some(parent) => parent,
            None => break,
        };
        container = parent;
        let element = container.value();
        if element.name() == "div"
            && (element.attr("data-ved").is_some() || element.attr("class").is_some())
        {
            break;
        }
    }
    container
}

fn extract_snippet(container: ElementRef<'_>) -> String {
    for selector in SNIPPET_SELECTORS.iter() {
        if let Some(element) = container.select(selector).next() {
            let text = normalize_text(&element.text().collect::<String>());
            if !text.is_empty() {
                return text;
            }
        }
    }
    // No snippet variant matched: fall back to the last generic text-bearing
    // child of the container.
    container
        .select(&GENERIC_TEXT_SELECTOR)
        .filter_map(|element| {
            let text = normalize_text(&element.text().collect::<String>());
            (!text.is_empty()).then_some(text)
        })
        .last()
        .unwrap_or_default()
}

fn extract_date(container_text: &str) -> String {
    DATE_PATTERNS
        .iter()
        .find_map(|pattern| pattern.find(container_text))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

/// Extracts ordered result records from a result page body.
///
/// Never fails: malformed or empty input yields an empty list, and one bad
/// candidate never aborts extraction of the rest.
pub fn extract(body: &str) -> Vec<ResultRecord> {
    let document = Html::parse_document(body);

    let mut candidates = Vec::new();
    for selector in TITLE_SELECTORS.iter() {
        candidates = document.select(selector).collect();
        if !candidates.is_empty() {
            break;
        }
    }

    let mut records: Vec<ResultRecord> = Vec::new();
    for title_element in candidates.into_iter().take(MAX_CANDIDATES) {
        let title = normalize_text(&title_element.text().collect::<String>());
        if title.is_empty() {
            continue;
        }

        let container = enclosing_container(title_element);

        let url = container
            .select(&LINK_SELECTOR)
            .next()
            .and_then(|a| a.value().attr("href"))
            .map(unwrap_redirect)
            .unwrap_or_default();
        if !url.starts_with("http://") && !url.starts_with("https://") {
            continue;
        }

        let snippet = extract_snippet(container);
        let container_text = container.text().collect::<String>();
        let date = extract_date(&container_text);

        records.push(ResultRecord {
            title,
            url,
            snippet,
            date,
            position: records.len() as u32 + 1,
        });
    }

    records
}
