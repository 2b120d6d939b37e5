//! Content identifier extraction and media type detection
//!
//! Recognised URL shapes:
//! - `http://www.youtube.com/watch?feature=player_embedded&v=yyWWXSwtPP0`
//! - `http://www.youtube.com/v/VIDEO_ID?version=3`
//! - `http://youtu.be/Djd6tPrxc08`
//!
//! Identifier syntax is not validated.

/// MIME type assigned to provider URLs
pub const PROVIDER_MIME_TYPE: &str = "video/youtube";

/// MIME types this renderer can play
pub const SUPPORTED_MIME_TYPES: [&str; 2] = ["video/youtube", "video/x-youtube"];

/// Extract the provider content id from a media reference URL
///
/// The `v` query parameter wins when present; otherwise the last path
/// segment (before any query string) is the id. Only an absent input yields
/// `None`; a URL without a usable segment yields an empty id.
pub fn extract_id(url: Option<&str>) -> Option<String> {
    let url = url?;

    let has_query = matches!(url.find('?'), Some(index) if index > 0);
    if has_query {
        let id = id_from_param(url);
        if id.is_empty() {
            return Some(id_from_path(url).to_string());
        }
        return Some(id.to_string());
    }

    Some(id_from_path(url).to_string())
}

/// Value of the `v` parameter, empty if absent
fn id_from_param(url: &str) -> &str {
    let query = url.split('?').nth(1).unwrap_or("");

    query
        .split('&')
        .find_map(|param| {
            let mut parts = param.split('=');
            match parts.next() {
                Some("v") => Some(parts.next().unwrap_or("")),
                _ => None,
            }
        })
        .unwrap_or("")
}

/// Last path segment, ignoring the query string
fn id_from_path(url: &str) -> &str {
    let path = url.split('?').next().unwrap_or(url);
    match path.rfind('/') {
        Some(index) => &path[index + 1..],
        None => path,
    }
}

/// Detect the provider MIME type from a URL
pub fn detect_media_type(url: &str) -> Option<&'static str> {
    let url = url.to_lowercase();
    if url.contains("youtube") || url.contains("youtu.be") {
        Some(PROVIDER_MIME_TYPE)
    } else {
        None
    }
}

/// Whether media of the given MIME type can be played through the provider
pub fn can_play_type(mime_type: &str) -> bool {
    SUPPORTED_MIME_TYPES.contains(&mime_type)
}
