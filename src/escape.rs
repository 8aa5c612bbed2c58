//! HTML entity, URL and slug helpers shared by the formatter and resolver.
//!
//! Encoding follows the HTML 4.01 entity set for Latin-1 plus the common
//! typographic punctuation; anything else passes through as UTF-8.

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use regex::Regex;
use std::sync::LazyLock;

/// Named entities for U+00A0..=U+00FF, in code point order.
const LATIN1: &[&str] = &[
    "nbsp", "iexcl", "cent", "pound", "curren", "yen", "brvbar", "sect", "uml", "copy", "ordf",
    "laquo", "not", "shy", "reg", "macr", //
    "deg", "plusmn", "sup2", "sup3", "acute", "micro", "para", "middot", "cedil", "sup1", "ordm",
    "raquo", "frac14", "frac12", "frac34", "iquest", //
    "Agrave", "Aacute", "Acirc", "Atilde", "Auml", "Aring", "AElig", "Ccedil", "Egrave", "Eacute",
    "Ecirc", "Euml", "Igrave", "Iacute", "Icirc", "Iuml", //
    "ETH", "Ntilde", "Ograve", "Oacute", "Ocirc", "Otilde", "Ouml", "times", "Oslash", "Ugrave",
    "Uacute", "Ucirc", "Uuml", "Yacute", "THORN", "szlig", //
    "agrave", "aacute", "acirc", "atilde", "auml", "aring", "aelig", "ccedil", "egrave", "eacute",
    "ecirc", "euml", "igrave", "iacute", "icirc", "iuml", //
    "eth", "ntilde", "ograve", "oacute", "ocirc", "otilde", "ouml", "divide", "oslash", "ugrave",
    "uacute", "ucirc", "uuml", "yacute", "thorn", "yuml",
];

const PUNCTUATION: &[(char, &str)] = &[
    ('\u{2013}', "ndash"),
    ('\u{2014}', "mdash"),
    ('\u{2018}', "lsquo"),
    ('\u{2019}', "rsquo"),
    ('\u{201A}', "sbquo"),
    ('\u{201C}', "ldquo"),
    ('\u{201D}', "rdquo"),
    ('\u{201E}', "bdquo"),
    ('\u{2020}', "dagger"),
    ('\u{2021}', "Dagger"),
    ('\u{2022}', "bull"),
    ('\u{2026}', "hellip"),
    ('\u{2030}', "permil"),
    ('\u{2039}', "lsaquo"),
    ('\u{203A}', "rsaquo"),
    ('\u{20AC}', "euro"),
    ('\u{2122}', "trade"),
];

static RE_ENTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[A-Za-z][A-Za-z0-9]{1,31});").unwrap()
});

static RE_ENTITY_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^&(#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[A-Za-z][A-Za-z0-9]{1,31});").unwrap()
});

static RE_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());

static RE_WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

static RE_DASHES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-+").unwrap());

/// Characters percent-encoded inside URLs emitted into `href` attributes.
const URL_UNSAFE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'<')
    .add(b'>')
    .add(b'`')
    .add(b'{')
    .add(b'}')
    .add(b'|')
    .add(b'\\')
    .add(b'^');

const ALLOWED_SCHEMES: &[&str] = &["http", "https", "ftp", "ftps", "mailto", "news", "irc", "feed"];

/// Which quote characters [`encode_entities`] converts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quotes {
    /// Double quotes only (`ENT_COMPAT`).
    Double,
    /// Double and single quotes.
    Both,
}

fn named_entity(c: char) -> Option<&'static str> {
    let cp = c as u32;
    if (0xA0..=0xFF).contains(&cp) {
        return LATIN1.get((cp - 0xA0) as usize).copied();
    }
    PUNCTUATION
        .iter()
        .find(|(ch, _)| *ch == c)
        .map(|(_, name)| *name)
}

fn entity_char(name: &str) -> Option<char> {
    match name {
        "amp" => return Some('&'),
        "lt" => return Some('<'),
        "gt" => return Some('>'),
        "quot" => return Some('"'),
        "apos" => return Some('\''),
        _ => {}
    }
    if let Some(pos) = LATIN1.iter().position(|n| *n == name) {
        return char::from_u32(0xA0 + pos as u32);
    }
    PUNCTUATION
        .iter()
        .find(|(_, n)| *n == name)
        .map(|(c, _)| *c)
}

fn numeric_char(body: &str) -> Option<char> {
    let digits = body.strip_prefix('#')?;
    let code = match digits.strip_prefix(['x', 'X']) {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => digits.parse::<u32>().ok()?,
    };
    char::from_u32(code)
}

/// True when `text` begins with a well-formed, known entity reference.
fn starts_with_entity(text: &str) -> bool {
    let Some(caps) = RE_ENTITY_PREFIX.captures(text) else {
        return false;
    };
    let body = &caps[1];
    if body.starts_with('#') {
        numeric_char(body).is_some()
    } else {
        entity_char(body).is_some()
    }
}

/// Encode `&`, `<`, `>`, the selected quotes and every character that has a
/// named entity. With `double_encode == false`, existing entity references
/// are left alone.
pub fn encode_entities(text: &str, quotes: Quotes, double_encode: bool) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 8);
    for (i, c) in text.char_indices() {
        match c {
            '&' => {
                if !double_encode && starts_with_entity(&text[i..]) {
                    out.push('&');
                } else {
                    out.push_str("&amp;");
                }
            }
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' if quotes == Quotes::Both => out.push_str("&#039;"),
            _ => match named_entity(c) {
                Some(name) => {
                    out.push('&');
                    out.push_str(name);
                    out.push(';');
                }
                None => out.push(c),
            },
        }
    }
    out
}

/// Decode named and numeric entity references. Unknown names are kept.
pub fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    RE_ENTITY
        .replace_all(text, |caps: &regex::Captures<'_>| {
            let body = &caps[1];
            let decoded = if body.starts_with('#') {
                numeric_char(body)
            } else {
                entity_char(body)
            };
            match decoded {
                Some(c) => c.to_string(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// Escape for HTML text and attribute context without double-encoding.
pub fn esc_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for (i, c) in text.char_indices() {
        match c {
            '&' if starts_with_entity(&text[i..]) => out.push('&'),
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

/// Clean a URL for an `href` attribute. Returns an empty string for URLs
/// with a scheme outside the allow-list (e.g. `javascript:`).
pub fn esc_url(url: &str) -> String {
    let url = url.trim();
    if url.is_empty() {
        return String::new();
    }
    if let Some(colon) = url.find(':') {
        let before = &url[..colon];
        if !before.contains(['/', '?', '#']) {
            let scheme = before.to_ascii_lowercase();
            if !ALLOWED_SCHEMES.contains(&scheme.as_str()) {
                return String::new();
            }
        }
    }
    esc_html(&utf8_percent_encode(url, URL_UNSAFE).to_string())
}

/// Remove anything that looks like an HTML tag.
pub fn strip_tags(text: &str) -> String {
    RE_TAG.replace_all(text, "").into_owned()
}

/// Turn a title into a URL slug: lowercase ASCII letters, digits, `_` and
/// `-`, with whitespace and dots becoming dashes.
pub fn slugify(text: &str) -> String {
    let stripped = strip_tags(text).to_lowercase();
    let mut slug = String::with_capacity(stripped.len());
    for c in stripped.chars() {
        if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
            slug.push(c);
        } else if c.is_whitespace() || c == '.' {
            slug.push('-');
        }
    }
    RE_DASHES
        .replace_all(&slug, "-")
        .trim_matches('-')
        .to_string()
}

/// Lowercase and keep only `[a-z0-9_-]`.
pub fn sanitize_key(key: &str) -> String {
    key.to_ascii_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '_' || *c == '-')
        .collect()
}

/// Strip tags and collapse all whitespace runs into single spaces.
pub fn sanitize_text(text: &str) -> String {
    let stripped = strip_tags(text);
    RE_WHITESPACE
        .replace_all(stripped.trim(), " ")
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latin1_table_covers_range() {
        assert_eq!(LATIN1.len(), 96);
        assert_eq!(named_entity('\u{A0}'), Some("nbsp"));
        assert_eq!(named_entity('é'), Some("eacute"));
        assert_eq!(named_entity('ÿ'), Some("yuml"));
    }

    #[test]
    fn encode_basic() {
        assert_eq!(
            encode_entities("<b>\"x\" & 'y'</b>", Quotes::Double, true),
            "&lt;b&gt;&quot;x&quot; &amp; 'y'&lt;/b&gt;"
        );
        assert_eq!(
            encode_entities("'y'", Quotes::Both, true),
            "&#039;y&#039;"
        );
    }

    #[test]
    fn encode_named() {
        assert_eq!(encode_entities("café…", Quotes::Double, true), "caf&eacute;&hellip;");
    }

    #[test]
    fn encode_without_double_encoding() {
        assert_eq!(
            encode_entities("a &amp; b & c &#8217; &bogus;", Quotes::Double, false),
            "a &amp; b &amp; c &#8217; &amp;bogus;"
        );
        assert_eq!(encode_entities("&amp;", Quotes::Double, true), "&amp;amp;");
    }

    #[test]
    fn decode_roundtrip_and_numeric() {
        assert_eq!(decode_entities("&lt;a href=&quot;x&quot;&gt;"), "<a href=\"x\">");
        assert_eq!(decode_entities("&#8216;hook&#8217;"), "\u{2018}hook\u{2019}");
        assert_eq!(decode_entities("&#x41;&eacute;"), "Aé");
        assert_eq!(decode_entities("&nope; stays"), "&nope; stays");
    }

    #[test]
    fn esc_html_quotes_and_entities() {
        assert_eq!(esc_html("'a' & \"b\""), "&#039;a&#039; &amp; &quot;b&quot;");
        assert_eq!(esc_html("already &amp; fine"), "already &amp; fine");
    }

    #[test]
    fn esc_url_rejects_scripts() {
        assert_eq!(esc_url("javascript:alert(1)"), "");
        assert_eq!(esc_url("http://example.com/a b"), "http://example.com/a%20b");
        assert_eq!(esc_url("/reference/functions/x/"), "/reference/functions/x/");
        assert_eq!(esc_url("http://e.com/?a=1&b=2"), "http://e.com/?a=1&amp;b=2");
    }

    #[test]
    fn slugify_titles() {
        assert_eq!(slugify("esc_attr()"), "esc_attr");
        assert_eq!(slugify("my_hook"), "my_hook");
        assert_eq!(slugify("Some Title.v2"), "some-title-v2");
        assert_eq!(slugify("  --a  b--  "), "a-b");
        assert_eq!(slugify("<b>bold</b> name"), "bold-name");
    }

    #[test]
    fn sanitize_key_drops_specials() {
        assert_eq!(sanitize_key("Foo_Bar"), "foo_bar");
        assert_eq!(sanitize_key("WP Query!"), "wpquery");
    }

    #[test]
    fn sanitize_text_collapses() {
        assert_eq!(sanitize_text("  <i>Use</i>\n  foo()  "), "Use foo()");
    }
}
