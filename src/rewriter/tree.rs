
//! Element classification used to maintain the open element stack.

use content::Namespace;
use parse;

const VOID: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "keygen", "link", "meta",
    "param", "source", "track", "wbr", "basefont", "bgsound", "frame", "menuitem",
];

const RAW_TEXT: &[&str] = &[
    "script", "style", "textarea", "title", "xmp", "iframe", "noembed", "noframes",
];

const CLOSES_PARAGRAPH: &[&str] = &[
    "address", "article", "aside", "blockquote", "center", "details", "dialog", "dir", "div",
    "dl", "dd", "dt", "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2", "h3",
    "h4", "h5", "h6", "header", "hgroup", "hr", "li", "listing", "main", "menu", "nav", "ol",
    "p", "plaintext", "pre", "search", "section", "summary", "table", "ul", "xmp",
];

/// Elements a `<p>` is never implicitly closed across.
pub(crate) const BUTTON_SCOPE: &[&str] = &[
    "applet", "button", "caption", "html", "marquee", "object", "table", "td", "template",
    "th",
];

/// Elements an `<li>`, `<dt>` or `<dd>` is never implicitly closed across.
pub(crate) const LIST_ITEM_SCOPE: &[&str] = &[
    "applet", "button", "caption", "html", "marquee", "object", "table", "td", "template",
    "th", "ol", "ul", "dl", "body", "select", "fieldset", "form",
];

pub(crate) const TABLE_SCOPE: &[&str] = &["html", "table", "template"];

pub(crate) const ROW_SCOPE: &[&str] = &["html", "table", "template", "tr"];

const SVG_HTML_INTEGRATION: &[&str] = &["foreignobject", "desc", "title"];

const MATHML_TEXT_INTEGRATION: &[&str] = &["mi", "mo", "mn", "ms", "mtext"];

/// Elements to close before a start tag is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Implied {
    /// Close the nearest of `targets` unless one of `boundaries` comes first.
    InScope {
        targets: &'static [&'static str],
        boundaries: &'static [&'static str],
    },
    /// Close the current element if it is one of `targets`.
    Current {
        targets: &'static [&'static str],
    },
}

fn contains(list: &[&str], name: &str) -> bool {
    list.iter().any(|&entry| entry == name)
}

/// Whether the HTML element never has contents.
pub(crate) fn is_void(name: &str) -> bool { contains(VOID, name) }

/// End tags implied by an HTML start tag, in the order they are applied.
pub(crate) fn implied_by(name: &str) -> Vec<Implied> {
    let mut implied = Vec::new();
    match name {
        "li" => implied.push(Implied::InScope {
            targets: &["li"],
            boundaries: LIST_ITEM_SCOPE,
        }),
        "dt" | "dd" => implied.push(Implied::InScope {
            targets: &["dt", "dd"],
            boundaries: LIST_ITEM_SCOPE,
        }),
        "option" => implied.push(Implied::Current { targets: &["option"] }),
        "optgroup" => {
            implied.push(Implied::Current { targets: &["option"] });
            implied.push(Implied::Current { targets: &["optgroup"] });
        },
        "tr" => implied.push(Implied::InScope {
            targets: &["tr"],
            boundaries: TABLE_SCOPE,
        }),
        "td" | "th" => implied.push(Implied::InScope {
            targets: &["td", "th"],
            boundaries: ROW_SCOPE,
        }),
        "thead" | "tbody" | "tfoot" => implied.push(Implied::InScope {
            targets: &["thead", "tbody", "tfoot"],
            boundaries: TABLE_SCOPE,
        }),
        _ => (),
    }
    if contains(CLOSES_PARAGRAPH, name) {
        implied.push(Implied::InScope {
            targets: &["p"],
            boundaries: BUTTON_SCOPE,
        });
    }
    implied
}

/// Namespace of a child element, given the innermost open element.
pub(crate) fn child_namespace(parent: Option<(&str, Namespace)>, name: &str) -> Namespace {
    let context = match parent {
        None => Namespace::Html,
        Some((parent, Namespace::Svg)) if contains(SVG_HTML_INTEGRATION, parent) =>
            Namespace::Html,
        Some((parent, Namespace::MathMl)) if contains(MATHML_TEXT_INTEGRATION, parent) =>
            Namespace::Html,
        Some((_, namespace)) => namespace,
    };
    match (context, name) {
        (Namespace::Html, "svg") => Namespace::Svg,
        (Namespace::Html, "math") => Namespace::MathMl,
        (context, _) => context,
    }
}

/// Tokenizer mode for the contents of an opened element.
pub(crate) fn content_mode(name: &str, namespace: Namespace) -> Option<parse::Mode> {
    if namespace != Namespace::Html {
        return None;
    }
    if name == "plaintext" {
        return Some(parse::Mode::PlainText);
    }
    RAW_TEXT.iter()
        .find(|&&entry| entry == name)
        .map(|&entry| parse::Mode::RawText(entry))
}
