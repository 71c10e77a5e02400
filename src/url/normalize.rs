use crate::UrlError;
use url::Url;

/// Scheme assumed when the input names none
const DEFAULT_SCHEME: &str = "https";

/// Normalizes a caller-supplied URL string into a canonical absolute URL
///
/// # Normalization Steps
///
/// 1. Trim surrounding whitespace; reject empty input
/// 2. If the input carries no `scheme://` prefix, prepend `https://`
/// 3. Parse the URL; reject if malformed
/// 4. Reject any scheme other than http and https
/// 5. Reject URLs without a host
///
/// An explicit `http://` scheme is kept as given. Host lowercasing, default
/// port removal and percent-encoding follow the URL grammar.
///
/// # Arguments
///
/// * `raw` - The URL string to normalize
///
/// # Returns
///
/// * `Ok(Url)` - Normalized URL
/// * `Err(UrlError)` - Failed to parse or validate the URL
///
/// # Examples
///
/// ```
/// use open_crawler::url::normalize_url;
///
/// let url = normalize_url("EXAMPLE.com/page").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/page");
///
/// let url = normalize_url("http://example.com").unwrap();
/// assert_eq!(url.as_str(), "http://example.com/");
/// ```
pub fn normalize_url(raw: &str) -> Result<Url, UrlError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(UrlError::Parse("empty URL".to_string()));
    }

    // "localhost:8080" parses as scheme "localhost", so look for "://" instead
    let candidate = if has_scheme(trimmed) {
        trimmed.to_string()
    } else {
        format!("{}://{}", DEFAULT_SCHEME, trimmed)
    };

    let url = Url::parse(&candidate).map_err(|e| UrlError::Parse(format!("{}: {}", raw, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(url),
        _ => Err(UrlError::MissingHost),
    }
}

fn has_scheme(input: &str) -> bool {
    match input.find("://") {
        Some(idx) => {
            let scheme = &input[..idx];
            !scheme.is_empty()
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        None => false,
    }
}
