//! Allow-list HTML sanitiser for link notes.
//!
//! Notes are rich text written in the editor and rendered unescaped on the dashboard. Only a
//! small set of formatting tags survives; every attribute is dropped except `href` on `a`, and
//! only when it points at `http:`, `https:` or `mailto:`. Unknown tags are unwrapped so their
//! text stays visible, while script-like elements are removed together with their content.

use scraper::{ElementRef, Html, Node};

const ALLOWED_TAGS: &[&str] = &[
    "p", "br", "strong", "b", "em", "i", "u", "s", "ol", "ul", "li", "a", "h1", "h2", "h3", "blockquote", "code", "pre", "span",
];

const DROPPED_WITH_CONTENT: &[&str] = &[
    "script", "style", "iframe", "object", "embed", "noscript", "template", "textarea", "title",
];

const ALLOWED_SCHEMES: &[&str] = &["http:", "https:", "mailto:"];

pub fn sanitize_html(input: &str) -> String {
    let fragment = Html::parse_fragment(input);
    let mut out = String::with_capacity(input.len());
    write_children(fragment.root_element(), &mut out);
    out
}

fn write_children(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => escape_into(text, out),
            Node::Element(_) => {
                if let Some(child) = ElementRef::wrap(child) {
                    write_element(child, out);
                }
            }
            _ => {}
        }
    }
}

fn write_element(element: ElementRef<'_>, out: &mut String) {
    let name = element.value().name();

    if DROPPED_WITH_CONTENT.contains(&name) {
        return;
    }
    if !ALLOWED_TAGS.contains(&name) {
        write_children(element, out);
        return;
    }
    if name == "br" {
        out.push_str("<br>");
        return;
    }

    out.push('<');
    out.push_str(name);
    if name == "a" {
        if let Some(href) = element.value().attr("href").filter(|href| is_safe_href(href)) {
            out.push_str(" href=\"");
            escape_into(href.trim(), out);
            out.push_str("\" rel=\"noopener noreferrer\"");
        }
    }
    out.push('>');

    write_children(element, out);

    out.push_str("</");
    out.push_str(name);
    out.push('>');
}

/// Whether a URL may be placed in an `href`: only `http:`, `https:` and `mailto:`
pub fn is_safe_href(href: &str) -> bool {
    let href = href.trim().to_ascii_lowercase();
    ALLOWED_SCHEMES.iter().any(|scheme| href.starts_with(scheme))
}

fn escape_into(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
}
