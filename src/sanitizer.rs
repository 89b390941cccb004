//! Removal of inline javadoc markup from comment text.
//!
//! Inline tags such as `{@link Item}` or `{@code id}` are replaced by their
//! trimmed inner text, so `Fetch an {@link Item}.` becomes `Fetch an Item.`.

use regex::Regex;
use std::sync::OnceLock;

fn inline_tag_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\{@\w+\b(.*?)\}").expect("inline tag pattern is valid"))
}

/// Sanitizes a javadoc comment by removing all inline markup.
///
/// Each pass replaces every `{@tag inner}` span with `inner` trimmed. Passes
/// repeat until the text stops changing, which also unwraps nested markup
/// like `{@code {@link Foo}}`. Every replacement drops at least the `{@`,
/// the tag word and the closing brace, so the loop always terminates.
pub fn sanitize_comment(comment: &str) -> String {
    let pattern = inline_tag_pattern();
    let mut sanitized = comment.to_string();

    loop {
        let next = pattern.replace_all(&sanitized, |caps: &regex::Captures| {
            caps.get(1).map_or("", |m| m.as_str()).trim().to_string()
        });
        if next == sanitized {
            return sanitized;
        }
        sanitized = next.into_owned();
    }
}
