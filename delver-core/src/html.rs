//! Minimal HTML-to-text conversion for fetched pages.
//!
//! Good enough for feeding page text to a summarizer: drops tags, skips
//! script/style bodies, decodes common entities, and collapses whitespace.
//! Not a spec-compliant HTML parser.

/// Block-level tags that force a line break in the extracted text.
const BLOCK_TAGS: [&str; 14] = [
    "p", "br", "div", "li", "tr", "h1", "h2", "h3", "h4", "h5", "h6", "ul", "ol", "table",
];

/// Convert an HTML document to readable plain text.
pub fn html_to_text(html: &str) -> String {
    let mut text = String::with_capacity(html.len() / 2);
    let mut rest = html;

    while let Some(open) = rest.find('<') {
        text.push_str(&rest[..open]);
        rest = &rest[open..];

        let Some(close) = rest.find('>') else {
            // Dangling '<' with no closing bracket: keep the remainder as text.
            text.push_str(rest);
            rest = "";
            break;
        };

        let tag = tag_name(&rest[1..close]);
        rest = &rest[close + 1..];

        // Skip embedded script/style bodies entirely.
        if tag == "script" || tag == "style" {
            let closer = format!("</{tag}");
            match find_ci(rest, &closer) {
                Some(end) => {
                    let after = rest[end..].find('>').map(|i| end + i + 1).unwrap_or(rest.len());
                    rest = &rest[after..];
                }
                None => {
                    rest = "";
                    break;
                }
            }
            continue;
        }

        let bare = tag.strip_prefix('/').unwrap_or(&tag);
        if BLOCK_TAGS.contains(&bare) {
            text.push('\n');
        }
    }
    text.push_str(rest);

    collapse_whitespace(&decode_entities(&text))
}

/// Lowercased tag name up to the first whitespace, with any self-closing
/// slash kept only in leading position (`/div` vs `div`).
fn tag_name(tag_body: &str) -> String {
    tag_body
        .trim()
        .split_whitespace()
        .next()
        .unwrap_or("")
        .trim_end_matches('/')
        .to_lowercase()
}

/// ASCII case-insensitive substring search. Matches always begin at the
/// needle's leading ASCII byte, so returned indices are char boundaries.
fn find_ci(haystack: &str, needle: &str) -> Option<usize> {
    let h = haystack.as_bytes();
    let n = needle.as_bytes();
    if n.is_empty() || h.len() < n.len() {
        return None;
    }
    (0..=h.len() - n.len()).find(|&i| h[i..i + n.len()].eq_ignore_ascii_case(n))
}

fn decode_entities(text: &str) -> String {
    text.replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
}

/// Trim every line and drop empty ones.
fn collapse_whitespace(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_basic_extraction() {
        let html = "<html><body><h1>Hello World</h1><p>This is a <b>test</b> paragraph.</p></body></html>";
        let text = html_to_text(html);
        assert!(text.contains("Hello World"));
        assert!(text.contains("This is a test paragraph."));
    }

    #[test]
    fn test_script_and_style_skipped() {
        let html = "<p>keep</p><script>var x = 1;</script><style>.a { color: red; }</style><p>also keep</p>";
        let text = html_to_text(html);
        assert!(text.contains("keep"));
        assert!(text.contains("also keep"));
        assert!(!text.contains("var x"));
        assert!(!text.contains("color: red"));
    }

    #[test]
    fn test_entities_decoded() {
        let text = html_to_text("<p>A &amp; B &lt; C &gt; D &quot;E&quot;</p>");
        assert_eq!(text, "A & B < C > D \"E\"");
    }

    #[test]
    fn test_list_items_on_separate_lines() {
        let text = html_to_text("<ul><li>Item 1</li><li>Item 2</li></ul>");
        assert_eq!(text, "Item 1\nItem 2");
    }

    #[test]
    fn test_unclosed_tag_keeps_remainder() {
        let text = html_to_text("before <unterminated");
        assert!(text.contains("before"));
    }

    #[test]
    fn test_unterminated_script() {
        let text = html_to_text("<p>visible</p><script>never closed");
        assert_eq!(text, "visible");
    }
}
