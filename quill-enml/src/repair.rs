//! Void-element repair
//!
//! The note markup dialect requires `br`, `en-todo` and `en-media` to be
//! self-closed, a convention the HTML serializer cannot express (it emits
//! `<br>` and `<en-todo></en-todo>`). This pass runs over the serialized
//! text after structural rewriting and normalizes every opening occurrence:
//! the nearest `/>` must occur at or before the nearest `>`, otherwise the
//! terminating `>` is rewritten to `/>`. Separate closing tags for the
//! to-do and media elements are removed wherever they appear.
//!
//! Pre-condition: input is serialized markup text. Post-condition: every
//! `br`/`en-todo`/`en-media` opening tag is self-closed and no stray
//! closing tag for them remains. The pass is idempotent.

/// Tags that must be self-closed in the output dialect.
const VOID_TAGS: &[&str] = &["<br", "<en-todo", "<en-media"];

/// Normalize the dialect's void elements in serialized markup text.
pub fn repair_void_elements(content: &str) -> String {
    let mut content = content.replace("</input>", "");
    content = content.replace("<hr>", "<hr/>");
    content = content.replace("<br clear=\"none\">", "<br/>");
    content = content.replace("</en-todo>", "");
    content = content.replace("</en-media>", "");
    for tag in VOID_TAGS {
        content = self_close_open_tags(&content, tag);
    }
    content
}

/// Rewrite every opening occurrence of `open` (e.g. `<br`) so it terminates
/// with `/>`. Occurrences that are already self-closed are left alone.
fn self_close_open_tags(content: &str, open: &str) -> String {
    let mut result = String::with_capacity(content.len() + 16);
    let mut rest = content;

    while let Some(pos) = rest.find(open) {
        let after = pos + open.len();
        // Token boundary: don't treat e.g. "<en-todoX" as a match.
        let at_boundary = matches!(
            rest.as_bytes().get(after),
            Some(b' ') | Some(b'\t') | Some(b'\n') | Some(b'\r') | Some(b'>') | Some(b'/')
        );
        if !at_boundary {
            result.push_str(&rest[..after]);
            rest = &rest[after..];
            continue;
        }

        let Some(end_rel) = rest[pos..].find('>') else {
            break;
        };
        let end = pos + end_rel;
        let already_closed = rest[pos..]
            .find("/>")
            .map(|i| pos + i < end)
            .unwrap_or(false);

        if already_closed {
            result.push_str(&rest[..end + 1]);
        } else {
            result.push_str(&rest[..end]);
            result.push_str("/>");
        }
        rest = &rest[end + 1..];
    }

    result.push_str(rest);
    result
}
