//! Description chunking for ticket bodies and follow-up comments.
//!
//! Jira imposes two independent size ceilings: one on the ticket body
//! and one on each comment. Oversized SAST descriptions (ordered
//! fragment sequences) are split into a body plus greedily-packed
//! comments under the hard ceilings; an additional *configured* cut
//! (`max_description_size`) truncates the body itself, spilling the
//! remainder into marked comment chunks.
//!
//! All sizes are measured in characters after normalization, never in
//! encoded bytes.

/// Hard ceiling on a ticket body, in characters.
pub const JIRA_DESCRIPTION_MAX_SIZE: usize = 61908;

/// Hard ceiling on a single comment, in characters.
pub const JIRA_COMMENT_MAX_SIZE: usize = 32767;

/// Marker appended wherever text was truncated to fit a ceiling.
pub const JIRA_DESCRIPTION_CUT: &str = "\n\n_the line below was cut by size limit_";

/// Separator inserted between fragments packed into the same comment.
const COMMENT_SEPARATOR: &str = "  \n  \n";

/// Replaces escaped periods with literal periods.
///
/// DAST descriptions receive only this; SAST fragments additionally go
/// through [`normalize_fragment`].
pub fn unescape_periods(raw: &str) -> String {
    raw.replace("\\.", ".")
}

/// Normalizes one description fragment into tracker markup: escaped
/// periods become literal, `<pre>`/`</pre>` pairs become `{code}`
/// blocks, `<br />` becomes a newline.
pub fn normalize_fragment(raw: &str) -> String {
    unescape_periods(raw)
        .replace("<pre>", "{code:collapse=true}\n\n")
        .replace("</pre>", "\n\n{code}")
        .replace("<br />", "\n")
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Splits at a character (not byte) boundary.
fn split_at_chars(s: &str, n: usize) -> (&str, &str) {
    match s.char_indices().nth(n) {
        Some((byte_index, _)) => s.split_at(byte_index),
        None => (s, ""),
    }
}

/// Cuts a single comment chunk down to the comment ceiling, appending
/// the truncation marker when anything was dropped.
pub fn cut_comment(chunk: &str) -> String {
    if char_len(chunk) <= JIRA_COMMENT_MAX_SIZE {
        return chunk.to_string();
    }
    let keep = JIRA_COMMENT_MAX_SIZE - char_len(JIRA_DESCRIPTION_CUT);
    let (head, _) = split_at_chars(chunk, keep);
    format!("{head}{JIRA_DESCRIPTION_CUT}")
}

/// Splits normalized description fragments into `(body, comments)`.
///
/// When the joined fragments fit the body ceiling the full text is the
/// body and no comments are produced. Otherwise the first fragment
/// seeds the body and the rest are greedily packed into comments: a new
/// comment starts whenever appending the next fragment (plus separator)
/// to the current last comment would reach the comment ceiling.
///
/// Comment order follows fragment order and must be preserved when
/// attaching.
pub fn chunk_fragments(fragments: &[String]) -> (String, Vec<String>) {
    let joined = fragments.join("\n\n");
    if char_len(&joined) <= JIRA_DESCRIPTION_MAX_SIZE {
        return (joined, Vec::new());
    }

    let body = fragments.first().cloned().unwrap_or_default();
    let mut comments: Vec<String> = Vec::new();
    for fragment in fragments.iter().skip(1) {
        let fits_last = comments.last().map(|last| {
            char_len(last) + char_len(COMMENT_SEPARATOR) + char_len(fragment)
                < JIRA_COMMENT_MAX_SIZE
        });
        match fits_last {
            Some(true) => {
                let last = comments.last_mut().unwrap();
                last.push_str(COMMENT_SEPARATOR);
                last.push_str(&cut_comment(fragment));
            }
            _ => comments.push(cut_comment(fragment)),
        }
    }
    (body, comments)
}

/// Applies the configured body cut (`max_description_size`).
///
/// When the body exceeds `max_size` characters it is truncated at
/// `max_size - marker` and the marker appended; the remainder is
/// re-chunked under `min(comment ceiling, max_size)` with each
/// non-final chunk marked. The new chunks are inserted *before* any
/// comments produced by the fragment pass, preserving read order.
pub fn apply_configured_cut(description: &mut String, comments: &mut Vec<String>, max_size: usize) {
    if char_len(description) <= max_size {
        return;
    }
    let cut_len = char_len(JIRA_DESCRIPTION_CUT);
    if max_size <= cut_len {
        tracing::warn!(
            max_size,
            "max_description_size is smaller than the cut marker, leaving description uncut"
        );
        return;
    }

    let full = std::mem::take(description);
    let (head, mut rest) = split_at_chars(&full, max_size - cut_len);
    *description = format!("{head}{JIRA_DESCRIPTION_CUT}");

    let threshold = JIRA_COMMENT_MAX_SIZE.min(max_size);
    let chunk_point = threshold - cut_len;

    let mut chunks: Vec<String> = Vec::new();
    while !rest.is_empty() {
        if char_len(rest) > threshold {
            let (chunk, tail) = split_at_chars(rest, chunk_point);
            chunks.push(format!("{chunk}{JIRA_DESCRIPTION_CUT}"));
            rest = tail;
        } else {
            chunks.push(rest.to_string());
            break;
        }
    }

    chunks.append(comments);
    *comments = chunks;
}
