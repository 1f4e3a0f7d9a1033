//! Source maps embedded in stylesheet comments.
//!
//! Compilers append a `/*# sourceMappingURL=... */` comment to their output.
//! When the reference is a `data:` URL the map travels with the stylesheet.

use crate::SourceMapError;
use base64::Engine;
use percent_encoding::percent_decode_str;

const DIRECTIVE: &str = "sourceMappingURL=";

/// Extracts the reference from a `/*# sourceMappingURL=... */` comment.
///
/// Accepts the legacy `@` marker as well as `#`. Returns `None` when the
/// comment is not a source map directive.
pub fn source_mapping_url(comment: &str) -> Option<&str> {
    let body = comment.strip_prefix("/*")?;
    let body = body.strip_suffix("*/").unwrap_or(body).trim();
    let body = body
        .strip_prefix('#')
        .or_else(|| body.strip_prefix('@'))?
        .trim_start();
    let url = body.strip_prefix(DIRECTIVE)?;

    url.split_whitespace().next()
}

/// Decodes the JSON payload of a `data:` URL carrying a source map.
///
/// The media type must be JSON (`application/json` or `text/json`, with any
/// parameters). Base64 payloads are decoded; anything else is percent-decoded.
pub fn decode_data_url(url: &str) -> Result<Vec<u8>, SourceMapError> {
    let invalid = |reason: &str| SourceMapError::InvalidDataUrl(reason.to_string());

    let rest = url
        .get(..5)
        .filter(|scheme| scheme.eq_ignore_ascii_case("data:"))
        .map(|_| &url[5..])
        .ok_or_else(|| invalid("not a data URL"))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| invalid("missing payload separator"))?;

    let mut params = header.split(';');
    let media_type = params.next().unwrap_or_default().trim();
    if !is_json_media_type(media_type) {
        return Err(SourceMapError::InvalidDataUrl(format!(
            "unsupported media type `{media_type}`"
        )));
    }

    let is_base64 = params.any(|p| p.trim().eq_ignore_ascii_case("base64"));
    if is_base64 {
        base64::engine::general_purpose::STANDARD
            .decode(payload.trim())
            .map_err(|err| SourceMapError::InvalidDataUrl(err.to_string()))
    } else {
        Ok(percent_decode_str(payload).collect())
    }
}

fn is_json_media_type(media_type: &str) -> bool {
    media_type.eq_ignore_ascii_case("application/json")
        || media_type.eq_ignore_ascii_case("text/json")
}
