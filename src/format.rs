//! Docblock text to display-safe HTML.
//!
//! Summaries go through [`format_summary`]; parameter, return and since
//! descriptions through [`format_param_description`], which also resolves
//! inline references and hash notation.

use crate::escape::{encode_entities, Quotes};
use crate::hash::format_hash_param;
use crate::resolve::Resolver;
use regex::Regex;
use std::sync::LazyLock;

static RE_BACKTICK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"`([^`]*)`").unwrap());

static RE_TAG_TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^ >]+>").unwrap());

static RE_DOCLINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{@(?:link|see) ([^\}]+)\}").unwrap());

/// Tags that survive entity encoding in parameter descriptions.
const ALLOWED_TAGS: &[&str] = &["code"];

/// Format an excerpt: backticks become `<code>`, comment markers and
/// stray tag-like tokens are escaped. Applying it twice changes nothing.
pub fn format_summary(text: &str) -> String {
    let mut text = if text.contains('`') {
        RE_BACKTICK
            .replace_all(text, |caps: &regex::Captures<'_>| {
                format!("<code>{}</code>", encode_entities(&caps[1], Quotes::Both, true))
            })
            .into_owned()
    } else {
        text.to_string()
    };

    text = text
        .replace("<!--", "<code>&lt;!--")
        .replace("-->", "--&gt;</code>");

    if text.contains('<') {
        text = rescue_tag_tokens(&text);
    }
    text
}

/// Escape `<tag>` tokens that stand alone between whitespace; they are
/// almost always a mention of a tag rather than markup. Matched
/// `<code>`/`</code>` pairs are markup and stay.
fn rescue_tag_tokens(text: &str) -> String {
    let tokens: Vec<_> = RE_TAG_TOKEN.find_iter(text).collect();
    let paired = paired_code_tags(tokens.iter().map(|m| m.as_str()));

    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for (i, m) in tokens.iter().enumerate() {
        if paired[i] {
            continue;
        }
        let token = m.as_str();
        let before = text[..m.start()].chars().next_back();
        let after = text[m.end()..].chars().next();
        let standalone = before.is_some_and(char::is_whitespace) && after.is_some_and(char::is_whitespace);
        if !standalone {
            continue;
        }
        out.push_str(&text[last..m.start()]);
        out.push_str("<code>");
        out.push_str(&encode_entities(token, Quotes::Both, true));
        out.push_str("</code>");
        last = m.end();
    }
    out.push_str(&text[last..]);
    out
}

/// For each token, whether it is a `<code>` or `</code>` with a partner.
/// Closers match the nearest open tag.
fn paired_code_tags<'t>(tokens: impl Iterator<Item = &'t str>) -> Vec<bool> {
    let mut paired = Vec::new();
    let mut open = Vec::new();
    for (i, token) in tokens.enumerate() {
        paired.push(false);
        match token {
            "<code>" => open.push(i),
            "</code>" => {
                if let Some(start) = open.pop() {
                    paired[start] = true;
                    paired[i] = true;
                }
            }
            _ => {}
        }
    }
    paired
}

/// Format a parameter (or return / since) description.
pub fn format_param_description(text: &str, resolver: &Resolver<'_>) -> String {
    // `*` turned into emphasis upstream is nearly always a literal asterisk.
    let text = text.replace("<em>", "*").replace("</em>", "*");

    let mut text = encode_entities(&text, Quotes::Double, false);
    for tag in ALLOWED_TAGS {
        text = text
            .replace(&format!("&lt;{tag}&gt;"), &format!("<{tag}>"))
            .replace(&format!("&lt;/{tag}&gt;"), &format!("</{tag}>"));
    }

    // Inline "* item" lists: one item per line.
    if text.contains(" * ") {
        text = text.replace(" * ", "<br /> * ");
    }

    let text = make_doclinks_clickable(&text, resolver);
    format_hash_param(&text)
}

/// Replace `{@link ...}` and `{@see ...}` tokens with resolved links.
pub fn make_doclinks_clickable(text: &str, resolver: &Resolver<'_>) -> String {
    if !text.contains("{@link ") && !text.contains("{@see ") {
        return text.to_string();
    }
    RE_DOCLINK
        .replace_all(text, |caps: &regex::Captures<'_>| resolver.resolve(&caps[1]))
        .into_owned()
}
