use thiserror::Error;
use url::Url;

use super::VideoId;

const VIDEO_ID_LEN: usize = 11;

/// Hosts that serve `youtu.be/<id>` short links
const SHORT_LINK_HOSTS: &[&str] = &["youtu.be", "www.youtu.be"];

/// Domain families that serve watch, embed and shorts pages
const STANDARD_DOMAINS: &[&str] = &["youtube.com", "youtube-nocookie.com"];

/// Path prefixes that are followed by a video id
const ID_PATH_PREFIXES: &[&str] = &["embed", "shorts"];

/// Why a reference could not be turned into a video id
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResolveError {
    #[error("not a raw video id and not a valid URL: {reference} ({reason})")]
    InvalidUrl { reference: String, reason: String },

    #[error("short link has no video id in its path: {reference}")]
    EmptyShortLink { reference: String },

    #[error("no `v` parameter or /embed/, /shorts/ path on {host}{path}: {reference}")]
    NoVideoId {
        reference: String,
        host: String,
        path: String,
    },

    #[error("unsupported host '{host}': {reference}")]
    UnsupportedHost { reference: String, host: String },
}

/// Check whether the input is exactly an 11-character id made of `[A-Za-z0-9_-]`
pub fn is_raw_video_id(input: &str) -> bool {
    input.len() == VIDEO_ID_LEN
        && input
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}

/// Resolve a reference into a canonical video id, logging the reason on failure
pub fn resolve_video_id(reference: &str) -> Result<VideoId, ResolveError> {
    parse_video_id(reference).map_err(|err| {
        tracing::error!(reference, error = %err, "Unable to extract video id");
        err
    })
}

/// Resolve a reference into a canonical video id without logging
///
/// Supported shapes, first match wins:
/// - raw 11-character ids
/// - `https://youtu.be/VIDEO_ID`
/// - `https://www.youtube.com/watch?v=VIDEO_ID` (any `youtube.com` or `youtube-nocookie.com` host)
/// - `https://www.youtube.com/embed/VIDEO_ID` and `https://www.youtube.com/shorts/VIDEO_ID`
pub fn parse_video_id(reference: &str) -> Result<VideoId, ResolveError> {
    if is_raw_video_id(reference) {
        return Ok(VideoId::new(reference));
    }

    let parsed = Url::parse(reference).map_err(|e| ResolveError::InvalidUrl {
        reference: reference.to_string(),
        reason: e.to_string(),
    })?;
    let host = parsed.host_str().unwrap_or_default().to_lowercase();

    if SHORT_LINK_HOSTS.contains(&host.as_str()) {
        return first_path_segment(&parsed)
            .map(VideoId::new)
            .ok_or_else(|| ResolveError::EmptyShortLink {
                reference: reference.to_string(),
            });
    }

    if STANDARD_DOMAINS.iter().any(|domain| host.contains(domain)) {
        if let Some(id) = query_video_id(&parsed) {
            return Ok(VideoId::new(id));
        }
        if let Some(id) = prefixed_path_id(&parsed) {
            return Ok(VideoId::new(id));
        }
        return Err(ResolveError::NoVideoId {
            reference: reference.to_string(),
            host,
            path: parsed.path().to_string(),
        });
    }

    Err(ResolveError::UnsupportedHost {
        reference: reference.to_string(),
        host,
    })
}

fn first_path_segment(url: &Url) -> Option<String> {
    url.path_segments()?
        .find(|segment| !segment.is_empty())
        .map(str::to_string)
}

/// First non-empty `v` query value
fn query_video_id(url: &Url) -> Option<String> {
    url.query_pairs()
        .filter(|(key, _)| key == "v")
        .map(|(_, value)| value.into_owned())
        .find(|value| !value.is_empty())
}

/// Id following an `/embed/` or `/shorts/` segment anywhere in the path
fn prefixed_path_id(url: &Url) -> Option<String> {
    let segments: Vec<&str> = url.path_segments()?.collect();
    segments
        .windows(2)
        .find(|pair| ID_PATH_PREFIXES.contains(&pair[0]) && !pair[1].is_empty())
        .map(|pair| pair[1].to_string())
}
