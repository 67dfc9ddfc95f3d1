//! Search request options.

use serde::{Deserialize, Serialize};

/// Bounds for the requested result count.
pub const MIN_RESULTS: usize = 1;
/// Upper bound for the requested result count.
pub const MAX_RESULTS: usize = 50;

/// Date-range filter for search results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateRange {
    Day,
    Week,
    Month,
    Year,
}

impl DateRange {
    /// Parses a date-range name; unknown values yield `None` and are
    /// silently dropped by the query builder.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "day" => Some(Self::Day),
            "week" => Some(Self::Week),
            "month" => Some(Self::Month),
            "year" => Some(Self::Year),
            _ => None,
        }
    }

    /// Returns the compact recency token used in the query string.
    pub fn param(&self) -> &'static str {
        match self {
            Self::Day => "d",
            Self::Week => "w",
            Self::Month => "m",
            Self::Year => "y",
        }
    }
}

/// A search request with all filters.
///
/// Immutable once constructed; build with `new` plus the `with_*` setters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchOptions {
    /// The search term.
    pub term: String,
    /// Number of results to return (clamped to 1..=50).
    pub num_results: usize,
    /// Language code (e.g., "en").
    pub language: String,
    /// Restrict results to a single domain (`site:` modifier).
    pub site: Option<String>,
    /// Restrict results to a file extension (`filetype:` modifier).
    pub filetype: Option<String>,
    /// Recency filter.
    pub date_range: Option<DateRange>,
    /// Whether safe search is requested.
    pub safe_search: bool,
}

impl SearchOptions {
    /// Creates options for the given term with defaults for everything else.
    pub fn new(term: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            num_results: 10,
            language: "en".to_string(),
            site: None,
            filetype: None,
            date_range: None,
            safe_search: false,
        }
    }

    /// Sets the requested result count, clamped to the allowed bounds.
    pub fn with_num_results(mut self, num: usize) -> Self {
        self.num_results = num.clamp(MIN_RESULTS, MAX_RESULTS);
        self
    }

    /// Sets the language code.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Restricts the search to a single domain.
    pub fn with_site(mut self, site: impl Into<String>) -> Self {
        self.site = Some(site.into());
        self
    }

    /// Restricts the search to a file extension.
    pub fn with_filetype(mut self, filetype: impl Into<String>) -> Self {
        self.filetype = Some(filetype.into());
        self
    }

    /// Sets the recency filter.
    pub fn with_date_range(mut self, range: DateRange) -> Self {
        self.date_range = Some(range);
        self
    }

    /// Enables or disables safe search.
    pub fn with_safe_search(mut self, safe: bool) -> Self {
        self.safe_search = safe;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_new_defaults() {
        let opts = SearchOptions::new("rust programming");
        assert_eq!(opts.term, "rust programming");
        assert_eq!(opts.num_results, 10);
        assert_eq!(opts.language, "en");
        assert!(opts.site.is_none());
        assert!(opts.filetype.is_none());
        assert!(opts.date_range.is_none());
        assert!(!opts.safe_search);
    }

    #[test]
    fn test_options_builder_chain() {
        let opts = SearchOptions::new("rust")
            .with_num_results(20)
            .with_language("de")
            .with_site("reddit.com")
            .with_filetype("pdf")
            .with_date_range(DateRange::Week)
            .with_safe_search(true);
        assert_eq!(opts.num_results, 20);
        assert_eq!(opts.language, "de");
        assert_eq!(opts.site, Some("reddit.com".to_string()));
        assert_eq!(opts.filetype, Some("pdf".to_string()));
        assert_eq!(opts.date_range, Some(DateRange::Week));
        assert!(opts.safe_search);
    }

    #[test]
    fn test_options_num_results_clamped() {
        let opts = SearchOptions::new("x").with_num_results(500);
        assert_eq!(opts.num_results, MAX_RESULTS);
        let opts = SearchOptions::new("x").with_num_results(0);
        assert_eq!(opts.num_results, MIN_RESULTS);
    }

    #[test]
    fn test_date_range_parse() {
        assert_eq!(DateRange::parse("day"), Some(DateRange::Day));
        assert_eq!(DateRange::parse("Week"), Some(DateRange::Week));
        assert_eq!(DateRange::parse("MONTH"), Some(DateRange::Month));
        assert_eq!(DateRange::parse("year"), Some(DateRange::Year));
        assert_eq!(DateRange::parse("fortnight"), None);
        assert_eq!(DateRange::parse(""), None);
    }

    #[test]
    fn test_date_range_param() {
        assert_eq!(DateRange::Day.param(), "d");
        assert_eq!(DateRange::Week.param(), "w");
        assert_eq!(DateRange::Month.param(), "m");
        assert_eq!(DateRange::Year.param(), "y");
    }

    #[test]
    fn test_date_range_serialization() {
        let json = serde_json::to_string(&DateRange::Month).unwrap();
        assert_eq!(json, "\"month\"");
        let parsed: DateRange = serde_json::from_str("\"year\"").unwrap();
        assert_eq!(parsed, DateRange::Year);
    }

    #[test]
    fn test_options_serialization() {
        let opts = SearchOptions::new("test").with_site("example.com");
        let json = serde_json::to_string(&opts).unwrap();
        assert!(json.contains("\"term\":\"test\""));
        assert!(json.contains("\"site\":\"example.com\""));
    }
}
