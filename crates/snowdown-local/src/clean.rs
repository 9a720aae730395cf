use crate::textprep;

fn is_leading_junk(c: char) -> bool {
    c.is_whitespace() || matches!(c, ',' | '.' | ';' | ':' | '–' | '—' | '-')
}

/// Strip `prefix` from the front of `s`, ignoring case. Returns `None` when
/// `s` does not start with it.
fn strip_prefix_ignore_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let mut rest = s.chars();
    for want in prefix.chars() {
        let got = rest.next()?;
        if !got.to_uppercase().eq(want.to_uppercase()) {
            return None;
        }
    }
    Some(rest.as_str())
}

/// Turn a raw slice of schedule text into display text.
///
/// Whitespace is collapsed, common entities decoded, a repeated leading
/// location dropped, and stray leading punctuation left behind by the slice
/// (", the Silver Bullet awaits.") trimmed. `None` when nothing remains.
pub fn clean_segment(raw: &str, location: &str) -> Option<String> {
    let text = textprep::decode_entities(&textprep::norm_ws(raw));
    let location = textprep::norm_ws(location);

    let mut body = text.as_str();
    if !location.is_empty() {
        if let Some(rest) = strip_prefix_ignore_case(body, &location) {
            body = rest.trim();
        }
    }
    let body = body.trim_start_matches(is_leading_junk).trim();
    if body.is_empty() {
        None
    } else {
        Some(body.to_string())
    }
}
