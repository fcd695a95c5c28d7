//! Textual cleanup applied to raw registry responses before extraction.

/// Canonicalize line endings and whitespace in a raw WHOIS response.
///
/// CRLF and lone CR become LF, trailing whitespace is trimmed per line,
/// and runs of blank lines collapse to a single one. The pass is purely
/// textual and idempotent: `normalize(normalize(t)) == normalize(t)`.
pub fn normalize(raw: &str) -> String {
    let unified = raw.replace("\r\n", "\n").replace('\r', "\n");

    let mut out = String::with_capacity(unified.len());
    let mut prev_blank = false;

    for line in unified.split('\n') {
        let line = line.trim_end();
        if line.is_empty() {
            if prev_blank {
                continue;
            }
            prev_blank = true;
        } else {
            prev_blank = false;
        }
        out.push_str(line);
        out.push('\n');
    }

    // A lone trailing newline survives; an all-blank input collapses to
    // the empty string.
    while out.ends_with("\n\n") {
        out.pop();
    }
    if out == "\n" {
        out.clear();
    }
    out
}
