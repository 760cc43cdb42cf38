//! Tag-aware truncation of rendered HTML for post previews.

use kuchikiki::NodeRef;

use super::html::{Document, element_name};

/// Appended where visible text was cut.
pub const ELLIPSIS: &str = "...";

/// Cut `html` down to `limit` visible characters.
///
/// Markup does not count toward the limit, and an entity such as `&amp;`
/// counts as one character. Everything after the cut point is dropped and
/// the tree is serialized again, so open elements get closed. Input that
/// already fits is returned unchanged, without an ellipsis.
pub fn truncate_html(html: &str, limit: usize) -> String {
    let doc = Document::parse_fragment(html);
    let texts: Vec<NodeRef> = doc
        .root()
        .descendants()
        .filter(|node| node.as_text().is_some() && !is_raw_text(node))
        .collect();

    let visible: usize = texts.iter().map(char_count).sum();
    if visible <= limit {
        return html.to_string();
    }

    let mut remaining = limit;
    for node in &texts {
        let len = char_count(node);
        if len < remaining {
            remaining -= len;
            continue;
        }
        if let Some(text) = node.as_text() {
            let mut text = text.borrow_mut();
            let cut = text
                .char_indices()
                .nth(remaining)
                .map_or(text.len(), |(index, _)| index);
            text.truncate(cut);
            text.push_str(ELLIPSIS);
        }
        drop_following(node);
        break;
    }

    doc.to_html()
}

fn char_count(node: &NodeRef) -> usize {
    node.as_text()
        .map_or(0, |text| text.borrow().chars().count())
}

/// Script and style bodies are not visible text.
fn is_raw_text(node: &NodeRef) -> bool {
    node.parent()
        .and_then(|parent| element_name(&parent))
        .is_some_and(|name| matches!(name.as_str(), "script" | "style"))
}

/// Detach every node that comes after `node` in document order.
fn drop_following(node: &NodeRef) {
    let mut current = Some(node.clone());
    while let Some(node) = current {
        while let Some(next) = node.next_sibling() {
            next.detach();
        }
        current = node.parent();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_input_unchanged() {
        let html = "<p>Hello <em>world</em></p>";
        assert_eq!(truncate_html(html, 11), html);
        assert_eq!(truncate_html(html, 100), html);
    }

    #[test]
    fn test_cut_closes_open_tags() {
        let html = "<p>Hello <em>wonderful</em> world</p>";
        assert_eq!(truncate_html(html, 9), "<p>Hello <em>won...</em></p>");
    }

    #[test]
    fn test_cut_on_text_boundary() {
        let html = "<p>Hello</p><p>again</p>";
        assert_eq!(truncate_html(html, 5), "<p>Hello...</p>");
    }

    #[test]
    fn test_entities_count_as_one() {
        let html = "<p>a &amp; b and more</p>";
        assert_eq!(truncate_html(html, 5), "<p>a &amp; b...</p>");
    }

    #[test]
    fn test_multibyte_text() {
        let html = "<p>héllo wörld</p>";
        assert_eq!(truncate_html(html, 4), "<p>héll...</p>");
    }

    #[test]
    fn test_void_elements_are_not_closed() {
        let html = "<p>one<br>two three</p>";
        assert_eq!(truncate_html(html, 6), "<p>one<br>two...</p>");
    }

    #[test]
    fn test_code_block_markup_not_counted() {
        let html = "<pre><code class=\"language-rust\">fn main() {}</code></pre><p>after</p>";
        assert_eq!(
            truncate_html(html, 7),
            "<pre><code class=\"language-rust\">fn main...</code></pre>"
        );
    }

    #[test]
    fn test_unclosed_list_items() {
        let html = "<ul><li>first<li>second item</ul>";
        assert_eq!(
            truncate_html(html, 8),
            "<ul><li>first</li><li>sec...</li></ul>"
        );
    }
}
