use url::Url;

/// Returns the file extension of a URL's trailing path segment
///
/// The trailing segment is split on `.` and the last piece returned. Segments
/// without a dot have no extension. Strings that do not parse as URLs fall
/// back to their text after the last `/`, ignoring any query or fragment.
///
/// # Examples
///
/// ```
/// use sumi_audit::url::file_extension;
///
/// assert_eq!(file_extension("https://example.com/docs/tutorial.ipynb").as_deref(), Some("ipynb"));
/// assert_eq!(file_extension("https://example.com/docs/a.html#intro").as_deref(), Some("html"));
/// assert_eq!(file_extension("https://example.com/docs/"), None);
/// assert_eq!(file_extension("https://example.com/ipynb"), None);
/// ```
pub fn file_extension(url: &str) -> Option<String> {
    let segment = match Url::parse(url) {
        Ok(parsed) => parsed
            .path_segments()
            .and_then(|segments| segments.last())
            .map(str::to_string),
        Err(_) => url
            .split(['?', '#'])
            .next()
            .and_then(|rest| rest.rsplit('/').next())
            .map(str::to_string),
    }?;

    segment
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_string())
        .filter(|ext| !ext.is_empty())
}

/// Checks if a URL's trailing segment carries one of the given extensions
pub fn has_extension(url: &str, extensions: &[String]) -> Option<String> {
    let ext = file_extension(url)?;
    extensions.iter().find(|candidate| **candidate == ext).cloned()
}

/// Returns the first ignore-substring contained in the URL
pub fn matching_substring(url: &str, substrings: &[String]) -> Option<String> {
    substrings
        .iter()
        .find(|needle| url.contains(needle.as_str()))
        .cloned()
}
