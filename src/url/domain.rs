use url::Url;

/// Extracts the key under which per-host state is stored
///
/// The key is the lowercase host, followed by `:port` when the URL names an
/// explicit non-default port. The scheme does not take part, so `http://` and
/// `https://` URLs for one host share robots and rate-limit state.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use open_crawler::url::host_key;
///
/// let url = Url::parse("https://Example.com/path").unwrap();
/// assert_eq!(host_key(&url), Some("example.com".to_string()));
///
/// let url = Url::parse("http://127.0.0.1:8080/").unwrap();
/// assert_eq!(host_key(&url), Some("127.0.0.1:8080".to_string()));
/// ```
pub fn host_key(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_lowercase();
    Some(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host,
    })
}

/// Builds the robots.txt location for the URL's origin
///
/// Returns `None` if the URL has no host.
pub fn robots_url(url: &Url) -> Option<String> {
    let host = host_key(url)?;
    Some(format!("{}://{}/robots.txt", url.scheme(), host))
}
