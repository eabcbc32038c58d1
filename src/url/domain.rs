use url::Url;

/// Extracts the network location (`host[:port]`) from a URL
///
/// The host is lowercased; an explicit port is kept unless it is the default
/// port for the scheme, which the `url` crate already drops when parsing.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use sumi_audit::url::extract_netloc;
///
/// let url = Url::parse("https://auto.gluon.ai/stable/index.html").unwrap();
/// assert_eq!(extract_netloc(&url), Some("auto.gluon.ai".to_string()));
///
/// let url = Url::parse("http://127.0.0.1:8080/docs/").unwrap();
/// assert_eq!(extract_netloc(&url), Some("127.0.0.1:8080".to_string()));
/// ```
pub fn extract_netloc(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_lowercase();
    match url.port() {
        Some(port) => Some(format!("{}:{}", host, port)),
        None => Some(host),
    }
}

/// Returns the first path segment of a URL, or an empty string for `/`
pub fn first_path_segment(url: &Url) -> String {
    url.path_segments()
        .and_then(|mut segments| segments.next())
        .unwrap_or_default()
        .to_string()
}
