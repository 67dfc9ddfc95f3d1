//! Target query string construction.

use url::form_urlencoded;

use crate::options::{SearchOptions, MAX_RESULTS};

/// Extra results requested from the target to compensate for records that
/// extraction later rejects.
const EXTRACTION_HEADROOM: usize = 5;

/// Builds the full search URL for the given mirror and options.
///
/// `site:` and `filetype:` filters become space-joined term modifiers; the
/// date range becomes a compact `tbs=qdr:` token. Mirrors that already carry
/// a scheme are used as-is, bare hostnames are fetched over HTTPS.
pub fn build_url(mirror: &str, options: &SearchOptions) -> String {
    let mut term = options.term.clone();
    if let Some(site) = &options.site {
        term.push_str(&format!(" site:{}", site));
    }
    if let Some(filetype) = &options.filetype {
        term.push_str(&format!(" filetype:{}", filetype));
    }

    let num = (options.num_results + EXTRACTION_HEADROOM).min(MAX_RESULTS);

    let mut params = form_urlencoded::Serializer::new(String::new());
    params
        .append_pair("q", &term)
        .append_pair("num", &num.to_string())
        .append_pair("hl", &options.language)
        .append_pair("lr", &format!("lang_{}", options.language))
        .append_pair("safe", if options.safe_search { "active" } else { "off" })
        .append_pair("start", "0");
    if let Some(range) = options.date_range {
        params.append_pair("tbs", &format!("qdr:{}", range.param()));
    }
    let query_string = params.finish();

    let base = if mirror.contains("://") {
        mirror.trim_end_matches('/').to_string()
    } else {
        format!("https://{}", mirror)
    };

    format!("{}/search?{}", base, query_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::DateRange;

    #[test]
    fn test_build_url_basic() {
        let opts = SearchOptions::new("rust programming");
        let url = build_url("www.google.com", &opts);
        assert!(url.starts_with("https://www.google.com/search?"));
        assert!(url.contains("q=rust+programming"));
        assert!(url.contains("num=15"));
        assert!(url.contains("hl=en"));
        assert!(url.contains("lr=lang_en"));
        assert!(url.contains("safe=off"));
        assert!(url.contains("start=0"));
        assert!(!url.contains("tbs="));
    }

    #[test]
    fn test_build_url_site_and_filetype_modifiers() {
        let opts = SearchOptions::new("manual")
            .with_site("reddit.com")
            .with_filetype("pdf");
        let url = build_url("www.google.com", &opts);
        assert!(url.contains("q=manual+site%3Areddit.com+filetype%3Apdf"));
    }

    #[test]
    fn test_build_url_date_range_token() {
        let opts = SearchOptions::new("news").with_date_range(DateRange::Week);
        let url = build_url("www.google.com", &opts);
        assert!(url.contains("tbs=qdr%3Aw"));
    }

    #[test]
    fn test_build_url_headroom_capped() {
        let opts = SearchOptions::new("x").with_num_results(50);
        let url = build_url("www.google.com", &opts);
        assert!(url.contains("num=50"));

        let opts = SearchOptions::new("x").with_num_results(48);
        let url = build_url("www.google.com", &opts);
        assert!(url.contains("num=50"));

        let opts = SearchOptions::new("x").with_num_results(10);
        let url = build_url("www.google.com", &opts);
        assert!(url.contains("num=15"));
    }

    #[test]
    fn test_build_url_safe_search_active() {
        let opts = SearchOptions::new("x").with_safe_search(true);
        let url = build_url("www.google.com", &opts);
        assert!(url.contains("safe=active"));
    }

    #[test]
    fn test_build_url_percent_encodes_term() {
        let opts = SearchOptions::new("c++ & rust?");
        let url = build_url("www.google.com", &opts);
        assert!(url.contains("q=c%2B%2B+%26+rust%3F"));
    }

    #[test]
    fn test_build_url_scheme_mirror_used_as_is() {
        let opts = SearchOptions::new("x");
        let url = build_url("http://127.0.0.1:9000/", &opts);
        assert!(url.starts_with("http://127.0.0.1:9000/search?"));
    }

    #[test]
    fn test_build_url_language_propagates() {
        let opts = SearchOptions::new("x").with_language("es");
        let url = build_url("www.google.es", &opts);
        assert!(url.contains("hl=es"));
        assert!(url.contains("lr=lang_es"));
    }
}
