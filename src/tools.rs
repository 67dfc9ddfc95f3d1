//! Tool-invocation facade.
//!
//! Exposes the scraper as two named operations with declared JSON input
//! schemas, for embedding in tool-calling hosts. Responses are serialized
//! as a JSON text payload. Like the REST facade, this layer is stateless
//! and validates all input before the core is reached.

use serde::Deserialize;
use serde_json::{json, Value};

use crate::options::{DateRange, SearchOptions, MAX_RESULTS, MIN_RESULTS};
use crate::search::Scraper;
use crate::{Result, ScrapeError};

/// A named operation with its input schema.
#[derive(Debug, Clone)]
pub struct ToolDefinition {
    /// Operation name.
    pub name: &'static str,
    /// Human-readable description.
    pub description: &'static str,
    /// JSON schema for the arguments object.
    pub input_schema: Value,
}

/// Returns the declared tool set: `search` and `search_advanced`.
pub fn tool_definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            name: "search",
            description: "Searches the web and returns structured results extracted from the result page",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "Search term"
                    },
                    "num_results": {
                        "type": "integer",
                        "description": "Number of results (default: 10)",
                        "minimum": MIN_RESULTS,
                        "maximum": MAX_RESULTS
                    },
                    "language": {
                        "type": "string",
                        "description": "Language code (default: \"en\")"
                    },
                    "safe_search": {
                        "type": "boolean",
                        "description": "Enable safe search (default: false)"
                    }
                },
                "required": ["query"]
            }),
        },
        ToolDefinition {
            name: "search_advanced",
            description: "Web search with site, file-type and date-range filters",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "Search term"
                    },
                    "site": {
                        "type": "string",
                        "description": "Restrict results to a domain (e.g. reddit.com)"
                    },
                    "filetype": {
                        "type": "string",
                        "description": "Restrict results to a file extension (pdf, doc, ...)"
                    },
                    "date_range": {
                        "type": "string",
                        "description": "Recency filter",
                        "enum": ["day", "week", "month", "year"]
                    },
                    "num_results": {
                        "type": "integer",
                        "description": "Number of results (default: 10)",
                        "minimum": MIN_RESULTS,
                        "maximum": MAX_RESULTS
                    },
                    "language": {
                        "type": "string",
                        "description": "Language code (default: \"en\")"
                    },
                    "safe_search": {
                        "type": "boolean",
                        "description": "Enable safe search (default: false)"
                    }
                },
                "required": ["query"]
            }),
        },
    ]
}

#[derive(Debug, Deserialize)]
struct SearchArgs {
    query: String,
    num_results: Option<usize>,
    language: Option<String>,
    safe_search: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct AdvancedSearchArgs {
    query: String,
    site: Option<String>,
    filetype: Option<String>,
    date_range: Option<String>,
    num_results: Option<usize>,
    language: Option<String>,
    safe_search: Option<bool>,
}

fn validated_base(query: &str, num_results: Option<usize>) -> Result<SearchOptions> {
    let term = query.trim();
    if term.is_empty() {
        return Err(ScrapeError::InvalidInput("query is required".to_string()));
    }
    let num = num_results.unwrap_or(10);
    if !(MIN_RESULTS..=MAX_RESULTS).contains(&num) {
        return Err(ScrapeError::InvalidInput(format!(
            "num_results must be between {} and {}",
            MIN_RESULTS, MAX_RESULTS
        )));
    }
    Ok(SearchOptions::new(term).with_num_results(num))
}

fn parse_search_args(arguments: Value) -> Result<SearchOptions> {
    let args: SearchArgs = serde_json::from_value(arguments)
        .map_err(|e| ScrapeError::InvalidInput(e.to_string()))?;
    let mut options = validated_base(&args.query, args.num_results)?;
    if let Some(language) = args.language {
        options = options.with_language(language);
    }
    options = options.with_safe_search(args.safe_search.unwrap_or(false));
    Ok(options)
}

fn parse_advanced_args(arguments: Value) -> Result<SearchOptions> {
    let args: AdvancedSearchArgs = serde_json::from_value(arguments)
        .map_err(|e| ScrapeError::InvalidInput(e.to_string()))?;
    let mut options = validated_base(&args.query, args.num_results)?;
    if let Some(language) = args.language {
        options = options.with_language(language);
    }
    options = options.with_safe_search(args.safe_search.unwrap_or(false));
    if let Some(site) = args.site {
        options = options.with_site(site);
    }
    if let Some(filetype) = args.filetype {
        options = options.with_filetype(filetype);
    }
    if let Some(range) = args.date_range.as_deref().and_then(DateRange::parse) {
        options = options.with_date_range(range);
    }
    Ok(options)
}

/// Dispatches a tool invocation and returns the response as a JSON text
/// payload. Unknown names and malformed arguments are validation errors.
pub async fn call_tool(scraper: &Scraper, name: &str, arguments: Value) -> Result<String> {
    let options = match name {
        "search" => parse_search_args(arguments)?,
        "search_advanced" => parse_advanced_args(arguments)?,
        _ => return Err(ScrapeError::UnknownTool(name.to_string())),
    };
    let response = scraper.search(&options).await;
    Ok(serde_json::to_string_pretty(&response)?)
}
