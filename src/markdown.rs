//! Markdown-to-HTML rendering with XSS sanitization (§10.5).
//!
//! A pure function: CommonMark + tables + strikethrough via `pulldown-cmark`,
//! piped through `ammonia`'s allow-list sanitizer. The allow-list mirrors the
//! reference implementation's `bleach` configuration.

use std::collections::HashSet;

use ammonia::Builder;
use pulldown_cmark::{Options, Parser, html};

fn sanitizer() -> Builder<'static> {
    let tags: HashSet<&str> = [
        "h1", "h2", "h3", "h4", "h5", "h6", "p", "br", "hr", "strong", "em", "del", "code", "pre",
        "a", "img", "ul", "ol", "li", "blockquote", "table", "thead", "tbody", "tr", "th", "td",
        "div", "span",
    ]
    .into_iter()
    .collect();

    let mut builder = Builder::default();
    builder.tags(tags);
    builder.add_tag_attributes("a", &["href", "title", "rel"]);
    builder.add_tag_attributes("img", &["src", "alt", "title", "width", "height"]);
    builder.add_tag_attributes("code", &["class"]);
    builder.add_tag_attributes("div", &["class"]);
    builder.add_tag_attributes("span", &["class"]);
    builder.add_tag_attributes("pre", &["class"]);
    builder.add_tag_attributes("td", &["align"]);
    builder.add_tag_attributes("th", &["align"]);
    builder
}

/// Render a `SKILL.md` body to sanitized HTML, cached on `Skill.readme_html`.
pub fn render(raw_markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let parser = Parser::new_ext(raw_markdown, options);
    let mut unsafe_html = String::new();
    html::push_html(&mut unsafe_html, parser);

    sanitizer().clean(&unsafe_html).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_basic_markdown() {
        let html = render("# Title\n\nSome **bold** text.");
        assert!(html.contains("<h1>"));
        assert!(html.contains("<strong>bold</strong>"));
    }

    #[test]
    fn renders_tables() {
        let html = render("| a | b |\n|---|---|\n| 1 | 2 |\n");
        assert!(html.contains("<table>"));
    }

    #[test]
    fn renders_strikethrough() {
        let html = render("~~gone~~");
        assert!(html.contains("<del>"));
    }

    #[test]
    fn strips_script_tags() {
        let html = render("<script>alert('xss')</script>\n\nhello");
        assert!(!html.contains("<script"));
        assert!(html.contains("hello"));
    }

    #[test]
    fn strips_disallowed_attributes() {
        let html = render("<div onclick=\"evil()\">hi</div>");
        assert!(!html.contains("onclick"));
    }

    #[test]
    fn keeps_allowed_link_attributes() {
        let html = render("[text](https://example.test \"title\")");
        assert!(html.contains("href=\"https://example.test/\"") || html.contains("href=\"https://example.test\""));
    }
}
