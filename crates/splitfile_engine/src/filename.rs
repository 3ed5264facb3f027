/// Extract the filename from a Content-Disposition header value.
///
/// Accepts an optionally quoted value after `filename=`; quotes are
/// stripped. Returns `None` when the header carries no usable name.
pub fn from_content_disposition(value: &str) -> Option<String> {
    value.split(';').find_map(|part| {
        let (key, raw) = part.split_once('=')?;
        if !key.trim().eq_ignore_ascii_case("filename") {
            return None;
        }
        let trimmed = raw.trim().trim_matches(|c| c == '"' || c == '\'');
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// Default artifact name when the response offers no usable hint.
pub fn fallback_report_filename(stem: &str, area: &str) -> String {
    format!("{stem}_{area}.zip")
}

/// Resolve the on-disk name for a report artifact: prefer the server hint,
/// fall back to `{stem}_{area}.zip`. Either way the result is made safe for
/// the local filesystem.
pub fn resolve_report_filename(hint: Option<&str>, stem: &str, area: &str) -> String {
    if let Some(hint) = hint {
        let safe = sanitize(hint);
        if !safe.is_empty() {
            return safe;
        }
    }
    sanitize(&fallback_report_filename(stem, area))
}

fn sanitize(input: &str) -> String {
    let cleaned: String = input
        .chars()
        .map(|c| if is_forbidden(c) { '_' } else { c })
        .collect();
    cleaned.trim_matches(&['_', ' ', '.'][..]).to_string()
}

fn is_forbidden(c: char) -> bool {
    matches!(c,
        '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0'..='\u{1F}'
    )
}
