//! Cross-reference resolution for `{@link ...}` / `{@see ...}` payloads.
//!
//! A payload is classified by its lexical shape into a [`Reference`], which
//! carries the slug to look up. A hit becomes an anchor labelled with the
//! payload exactly as the author wrote it; anything else comes back as the
//! unmodified payload.

use crate::config::Config;
use crate::escape::{decode_entities, esc_html, esc_url, sanitize_key, slugify};
use crate::links::Permalinks;
use crate::model::Kind;
use crate::repository::ContentRepository;
use regex::Regex;
use std::sync::LazyLock;

static RE_ANCHOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^<a .*href=['"]([^'"]+)['"]>(.*)</a>(.*)$"#).unwrap());

// 'hook', &#8216;hook&#8217;, &lsquo;hook&rsquo; or ‘hook’
static RE_HOOK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:'|&#8216;|&lsquo;|\x{2018})([\$\w&;-]+)(?:'|&#8217;|&rsquo;|\x{2019})$").unwrap()
});

static RE_TYPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^_?[A-Z][a-zA-Z0-9]+_\w+").unwrap());

/// What a reference payload points at, with the slug derived from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reference {
    /// `http(s)://url [label]`
    External { url: String, label: String },
    /// `Class::method()`
    Method { slug: String },
    /// `'hook_name'`
    Hook { slug: String },
    /// `Class_Name`: a class, trait or interface.
    Type { slug: String },
    /// `function_name()` and anything else.
    Function { slug: String },
    /// `Class::$property`; not linkable.
    ClassMember,
}

impl Reference {
    /// Classify a payload (already unwrapped, see [`unwrap_payload`]).
    pub fn classify(link: &str) -> Self {
        if link.starts_with("https://") || link.starts_with("http://") {
            let (url, label) = match link.split_once(' ') {
                Some((url, label)) => (url, label),
                None => (link, link),
            };
            return Reference::External {
                url: url.to_string(),
                label: label.to_string(),
            };
        }
        Self::classify_internal(link)
    }

    fn classify_internal(link: &str) -> Self {
        if link.contains("::$") {
            return Reference::ClassMember;
        }
        if link.contains("::") {
            return Reference::Method {
                slug: link.replace("::", "/").replace("()", ""),
            };
        }
        if let Some(caps) = RE_HOOK.captures(link) {
            return Reference::Hook {
                slug: slugify(&decode_entities(&caps[1])),
            };
        }
        if RE_TYPE.is_match(link) {
            return Reference::Type {
                slug: sanitize_key(link),
            };
        }
        Reference::Function {
            slug: slugify(&decode_entities(link)),
        }
    }

    /// Kinds of entry the reference may resolve to.
    pub fn kinds(&self) -> &'static [Kind] {
        match self {
            Reference::Method { .. } => &[Kind::Method],
            Reference::Hook { .. } => &[Kind::Hook],
            Reference::Type { .. } => &Kind::CLASS_LIKE,
            Reference::Function { .. } => &[Kind::Function],
            Reference::External { .. } | Reference::ClassMember => &[],
        }
    }

    pub fn slug(&self) -> Option<&str> {
        match self {
            Reference::Method { slug }
            | Reference::Hook { slug }
            | Reference::Type { slug }
            | Reference::Function { slug } => Some(slug),
            Reference::External { .. } | Reference::ClassMember => None,
        }
    }
}

/// Undo markup earlier passes may have wrapped around a payload: an
/// entity-encoded anchor is decoded, and an anchor becomes its `href` plus
/// any text that trailed it.
pub fn unwrap_payload(payload: &str) -> String {
    let mut link = if payload.starts_with("&lt;a ") {
        decode_entities(payload)
    } else {
        payload.to_string()
    };

    if link.starts_with("<a ") {
        if let Some(caps) = RE_ANCHOR.captures(&link) {
            let rest = caps[3].trim();
            let unwrapped = if rest.is_empty() {
                caps[1].to_string()
            } else {
                format!("{} {}", &caps[1], rest)
            };
            link = unwrapped;
        }
    }
    link
}

/// Resolves references against a content repository.
#[derive(Clone, Copy)]
pub struct Resolver<'a> {
    repo: &'a dyn ContentRepository,
    links: Permalinks<'a>,
    strict: bool,
}

impl<'a> Resolver<'a> {
    pub fn new(repo: &'a dyn ContentRepository, config: &'a Config) -> Self {
        Self {
            repo,
            links: Permalinks::new(config),
            strict: config.strict_links,
        }
    }

    pub fn links(&self) -> Permalinks<'a> {
        self.links
    }

    pub fn repository(&self) -> &'a dyn ContentRepository {
        self.repo
    }

    /// Resolve the inside of a `{@link ...}` / `{@see ...}` token.
    pub fn resolve(&self, payload: &str) -> String {
        let link = unwrap_payload(payload);
        match Reference::classify(&link) {
            Reference::External { url, label } => {
                let href = esc_url(&url);
                if href.is_empty() {
                    return esc_html(&label);
                }
                format!("<a href=\"{}\">{}</a>", href, esc_html(&label))
            }
            reference => self.link_internal(&link, &reference),
        }
    }

    /// Resolve a bare internal reference such as `WP_Query::query()`.
    pub fn resolve_internal(&self, link: &str) -> String {
        let reference = Reference::classify_internal(link);
        self.link_internal(link, &reference)
    }

    fn link_internal(&self, link: &str, reference: &Reference) -> String {
        let Some(url) = self.url_for(reference) else {
            tracing::debug!(reference = link, kind = ?reference, "reference left unresolved");
            return link.to_string();
        };
        let href = esc_url(&url);
        if href.is_empty() {
            return link.to_string();
        }
        format!("<a href=\"{}\">{}</a>", href, esc_html(link))
    }

    fn url_for(&self, reference: &Reference) -> Option<String> {
        let slug = reference.slug().filter(|s| !s.is_empty())?;
        let kinds = reference.kinds();
        if self.strict {
            return self.lookup(slug, kinds);
        }
        match reference {
            Reference::Function { .. } | Reference::Hook { .. } => {
                Some(format!("{}{}/", self.links.archive_url(kinds[0]), slug))
            }
            _ => None,
        }
    }

    /// Permalink of the first published entry named `slug` with one of
    /// `kinds`, if any.
    pub fn lookup(&self, slug: &str, kinds: &[Kind]) -> Option<String> {
        let entry = self.repo.find(slug, kinds)?;
        Some(self.links.permalink(entry, self.repo))
    }
}
