use chrono::Utc;
use url::Url;

/// Derives the storage file name for a downloaded document
///
/// The final path segment is used, with spaces and `%20` sequences replaced by
/// hyphens. Links without a usable segment get a timestamp-based name.
pub fn file_name_for(link: &str) -> String {
    let segment = Url::parse(link).ok().and_then(|url| {
        url.path_segments()
            .and_then(|mut segments| segments.next_back())
            .map(|s| s.to_string())
    });

    match segment {
        Some(name) if is_usable(&name) => name.replace("%20", "-").replace(' ', "-"),
        _ => fallback_file_name(),
    }
}

/// Timestamp-based name used when a link has no usable final segment
pub fn fallback_file_name() -> String {
    format!("download_{}.csv", Utc::now().timestamp_millis())
}

fn is_usable(segment: &str) -> bool {
    !segment.is_empty() && segment != "." && segment != ".." && !segment.contains('\\')
}
