use std::borrow::Cow;

const MAX_ERROR_CHARS: usize = 200;

/// Key prefixes issued by completion providers.
const PREFIX_PATTERNS: [&str; 3] = ["sk-", "sk_", "AIza"];

/// Header, query and JSON markers that precede a credential.
const MARKER_PATTERNS: [&str; 7] = [
    "Authorization: Bearer ",
    "authorization: bearer ",
    "Bearer ",
    "apiKey=",
    "api_key=",
    "\"api_key\":\"",
    "\"apiKey\":\"",
];

fn is_secret_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ':' | '+' | '/' | '=')
}

fn token_end(input: &str, from: usize) -> usize {
    let mut end = from;
    for (i, c) in input[from..].char_indices() {
        if is_secret_char(c) {
            end = from + i + c.len_utf8();
        } else {
            break;
        }
    }
    end
}

fn scrub_after_marker(scrubbed: &mut String, marker: &str, keep_marker: bool) {
    let mut search_from = 0;
    while let Some(rel) = scrubbed[search_from..].find(marker) {
        let start = search_from + rel;
        let content_start = start + marker.len();
        let end = token_end(scrubbed, content_start);

        // Skip bare markers without a token value.
        if end == content_start {
            search_from = content_start;
            continue;
        }

        let replace_from = if keep_marker { content_start } else { start };
        scrubbed.replace_range(replace_from..end, "[REDACTED]");
        search_from = replace_from + "[REDACTED]".len();
    }
}

/// Redact credential-looking tokens from text that may reach the user or logs.
///
/// Transport errors from reqwest embed the request URL, which for the
/// registration lookup carries `apiKey=...`.
pub fn scrub_secret_patterns(input: &str) -> Cow<'_, str> {
    let needs_scrubbing = PREFIX_PATTERNS
        .iter()
        .chain(MARKER_PATTERNS.iter())
        .any(|pattern| input.contains(pattern));
    if !needs_scrubbing {
        return Cow::Borrowed(input);
    }

    let mut scrubbed = input.to_string();
    for marker in MARKER_PATTERNS {
        scrub_after_marker(&mut scrubbed, marker, true);
    }
    for pattern in PREFIX_PATTERNS {
        scrub_after_marker(&mut scrubbed, pattern, false);
    }
    Cow::Owned(scrubbed)
}

/// Scrub secrets and bound the length of an upstream error message.
pub fn sanitize_error(input: &str) -> String {
    let scrubbed = scrub_secret_patterns(input);

    if scrubbed.chars().count() <= MAX_ERROR_CHARS {
        return scrubbed.into_owned();
    }

    let truncated: String = scrubbed.chars().take(MAX_ERROR_CHARS).collect();
    format!("{truncated}...")
}

/// Remove a known secret value wherever it appears, then apply pattern scrubbing.
pub fn redact_secret(input: &str, secret: &str) -> String {
    let secret = secret.trim();
    let replaced = if secret.is_empty() {
        input.to_string()
    } else {
        input.replace(secret, "[REDACTED]")
    };
    sanitize_error(&replaced)
}
