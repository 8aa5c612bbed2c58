//! Data model for parsed reference content — storage-agnostic.
//!
//! Entries arrive already parsed (one per function, class, method, hook...)
//! and are only ever read here.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of an entry in the content repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(pub u64);

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of documented symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    Class,
    Trait,
    Interface,
    Function,
    Method,
    Hook,
}

impl Kind {
    pub const ALL: [Kind; 6] = [
        Kind::Class,
        Kind::Trait,
        Kind::Interface,
        Kind::Function,
        Kind::Method,
        Kind::Hook,
    ];

    /// Kinds that own methods.
    pub const CLASS_LIKE: [Kind; 3] = [Kind::Class, Kind::Trait, Kind::Interface];

    pub fn as_str(self) -> &'static str {
        match self {
            Kind::Class => "class",
            Kind::Trait => "trait",
            Kind::Interface => "interface",
            Kind::Function => "function",
            Kind::Method => "method",
            Kind::Hook => "hook",
        }
    }

    /// Plural form used as the archive path segment.
    pub fn archive_slug(self) -> &'static str {
        match self {
            Kind::Class => "classes",
            Kind::Trait => "traits",
            Kind::Interface => "interfaces",
            Kind::Function => "functions",
            Kind::Method => "methods",
            Kind::Hook => "hooks",
        }
    }

    pub fn is_class_like(self) -> bool {
        Self::CLASS_LIKE.contains(&self)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A directed link between two entries, recorded on the entry it starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    /// Calls a function, method or hook; for classes, uses a trait.
    Uses,
    /// Class inheritance.
    Extends,
    /// Class implementing an interface.
    Implements,
}

impl Relation {
    pub const ALL: [Relation; 3] = [Relation::Uses, Relation::Extends, Relation::Implements];

    /// Whether an entry of kind `from` can hold this relation to `to`.
    pub fn allows(self, from: Kind, to: Kind) -> bool {
        use Kind::*;
        match self {
            Relation::Uses => matches!(
                (from, to),
                (Class, Trait) | (Function | Method, Function | Method | Hook)
            ),
            Relation::Extends => from == Class && to == Class,
            Relation::Implements => from == Class && to == Interface,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Publish,
    Draft,
}

/// One parsed docblock annotation (`@param`, `@return`, `@since`, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocTag {
    pub name: String,
    pub variable: Option<String>,
    pub types: Vec<String>,
    pub content: String,
    /// Target of `@see` / `@deprecated` references.
    pub refers: Option<String>,
    /// Secondary text, e.g. the note after a `@since` version.
    pub description: Option<String>,
}

impl DocTag {
    pub fn is(&self, name: &str) -> bool {
        self.name == name
    }
}

/// A formal parameter as declared in the signature.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Argument {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: Option<String>,
    pub default: Option<String>,
}

/// Parameter row as displayed: an `@param` tag merged with its argument.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParamRecord {
    pub name: String,
    /// Types wrapped in `<span class="TYPE">` and joined with `|`.
    pub types: String,
    /// Formatted description HTML.
    pub content: String,
    pub required: bool,
    pub default: Option<String>,
}

/// A documented symbol as stored in the content repository.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entry {
    pub id: EntryId,
    /// Normalized slug, e.g. `wp_query` or `wp_query-get_posts` for a method.
    pub name: String,
    pub title: String,
    pub kind: Kind,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub parent: Option<EntryId>,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<DocTag>,
    #[serde(default)]
    pub args: Vec<Argument>,
    /// `action`, `filter`, `action_reference`, `filter_deprecated`, ...
    #[serde(default)]
    pub hook_type: Option<String>,
    #[serde(default)]
    pub visibility: Option<String>,
    #[serde(default)]
    pub source_file: Option<String>,
    #[serde(default)]
    pub line_num: Option<u32>,
    #[serde(default)]
    pub end_line_num: Option<u32>,
    /// `@since` versions, oldest first.
    #[serde(default)]
    pub since: Vec<String>,
    /// Namespace parts from the root down.
    #[serde(default)]
    pub namespaces: Vec<String>,
    /// Explicit permalink; generated from the config when absent.
    #[serde(default)]
    pub permalink: Option<String>,
    /// Functions, methods and hooks called; traits used by a class.
    #[serde(default)]
    pub uses: Vec<EntryId>,
    #[serde(default)]
    pub extends: Vec<EntryId>,
    #[serde(default)]
    pub implements: Vec<EntryId>,
}

impl Entry {
    pub fn new(id: u64, name: &str, kind: Kind) -> Self {
        Self {
            id: EntryId(id),
            name: name.to_string(),
            title: name.to_string(),
            kind,
            status: Status::Publish,
            parent: None,
            summary: String::new(),
            description: String::new(),
            tags: Vec::new(),
            args: Vec::new(),
            hook_type: None,
            visibility: None,
            source_file: None,
            line_num: None,
            end_line_num: None,
            since: Vec::new(),
            namespaces: Vec::new(),
            permalink: None,
            uses: Vec::new(),
            extends: Vec::new(),
            implements: Vec::new(),
        }
    }

    pub fn is_published(&self) -> bool {
        self.status == Status::Publish
    }

    /// Tags with the given name, in docblock order.
    pub fn tags_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a DocTag> + 'a {
        self.tags.iter().filter(move |t| t.is(name))
    }

    pub fn first_tag(&self, name: &str) -> Option<&DocTag> {
        self.tags.iter().find(|t| t.is(name))
    }

    /// Targets of `relation` as listed in the catalog.
    pub fn related_ids(&self, relation: Relation) -> &[EntryId] {
        match relation {
            Relation::Uses => &self.uses,
            Relation::Extends => &self.extends,
            Relation::Implements => &self.implements,
        }
    }
}
