//! Rewrites plain-text URLs in answer text into anchor markup.

/// Replace every `http://` / `https://` run in `text` with an anchor element
/// opening in a new context. Non-URL text passes through untouched.
///
/// A URL is the maximal run of non-whitespace characters starting at the
/// scheme, so trailing punctuation glued to a URL ends up inside the link
/// target. That matches the backend's rendering contract and is intentional.
pub fn linkify(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pos = 0;

    while let Some(rel) = next_scheme(&text[pos..]) {
        let start = pos + rel;
        let end = text[start..]
            .find(char::is_whitespace)
            .map(|w| start + w)
            .unwrap_or(text.len());

        out.push_str(&text[pos..start]);
        let url = &text[start..end];
        out.push_str("<a href=\"");
        out.push_str(url);
        out.push_str("\" target=\"_blank\">");
        out.push_str(url);
        out.push_str("</a>");
        pos = end;
    }

    out.push_str(&text[pos..]);
    out
}

/// Byte offset of the earliest URL scheme in `s`, if any.
fn next_scheme(s: &str) -> Option<usize> {
    match (s.find("http://"), s.find("https://")) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}
