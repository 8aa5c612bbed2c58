//! Display fields for one entry: what a reference page shows, already
//! formatted and linked.
//!
//! Every builder takes the entry plus a [`Context`] and returns plain data;
//! nothing here writes output or fails. [`Page::build`] collects them all.

use crate::config::Config;
use crate::escape::{encode_entities, esc_html, esc_url, sanitize_text, Quotes};
use crate::format::{format_param_description, format_summary};
use crate::links::Permalinks;
use crate::model::{DocTag, Entry, EntryId, Kind, ParamRecord, Relation};
use crate::repository::ContentRepository;
use crate::resolve::Resolver;
use crate::source::SourceReader;
use serde::Serialize;

const PRIVATE_ACCESS: &str = "This function&#8217;s access is marked private. This means it is not \
intended for use by other plugin or theme developers, only in this plugin itself. It is listed here \
for completeness.";

/// Everything a field builder may consult.
#[derive(Clone, Copy)]
pub struct Context<'a> {
    pub repo: &'a dyn ContentRepository,
    pub config: &'a Config,
    pub resolver: Resolver<'a>,
    pub sources: &'a SourceReader,
}

/// One row of the changelog table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChangelogRow {
    pub version: String,
    pub description: String,
    pub since_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeeAlso {
    /// Link HTML, or the reference text when it did not resolve.
    pub refers: String,
    pub content: String,
}

/// Declared type of a signature argument.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArgumentType {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
}

/// A method as listed on its class page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MethodSummary {
    pub title: String,
    pub url: String,
    pub excerpt: String,
    pub deprecated: bool,
}

/// One list of the Related section, e.g. "Used By".
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelatedGroup {
    /// `uses`, `extends`, `implements`, `used-by`, `extended-by`, `implemented-by`
    pub slug: &'static str,
    pub heading: &'static str,
    pub items: Vec<RelatedItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelatedItem {
    pub source_file: String,
    /// Title, with `()` for functions and methods.
    pub title: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceSection {
    pub file: String,
    pub archive_url: String,
    pub github_url: String,
    pub line: Option<u32>,
    pub code: String,
}

impl<'a> Context<'a> {
    pub fn new(repo: &'a dyn ContentRepository, config: &'a Config, sources: &'a SourceReader) -> Self {
        Self {
            repo,
            config,
            resolver: Resolver::new(repo, config),
            sources,
        }
    }

    pub fn links(&self) -> Permalinks<'a> {
        self.resolver.links()
    }

    /// Formatted excerpt; empty stays empty.
    pub fn summary(&self, entry: &Entry) -> String {
        if entry.summary.is_empty() {
            return String::new();
        }
        format_summary(&entry.summary)
    }

    /// Stored description, used as-is.
    pub fn description(&self, entry: &Entry) -> String {
        entry.description.clone()
    }

    pub fn signature(&self, entry: &Entry) -> String {
        let title = esc_html(&entry.title);
        if entry.kind.is_class_like() {
            return title;
        }

        let types = param_types(entry);

        if entry.kind == Kind::Hook {
            let call = hook_call(entry.hook_type.as_deref().unwrap_or(""));
            let quote = if entry.title.contains('$') { '"' } else { '\'' };
            let mut signature = format!("<span class=\"hook-func\">{call}</span>( {quote}{title}{quote}");
            let hook_args: Vec<String> = types
                .iter()
                .map(|(name, ty)| {
                    format!(
                        " <nobr><span class=\"arg-type\">{}</span> <span class=\"arg-name\">{}</span></nobr>",
                        esc_html(ty),
                        esc_html(name)
                    )
                })
                .collect();
            if !hook_args.is_empty() {
                signature.push_str(", ");
                signature.push_str(&hook_args.join(", "));
            }
            signature.push_str(" )");
            return signature;
        }

        let args: Vec<String> = entry
            .args
            .iter()
            .map(|arg| {
                let mut s = String::new();
                if !arg.name.is_empty() {
                    if let Some((_, ty)) = types.iter().find(|(name, ty)| *name == arg.name && !ty.is_empty()) {
                        s.push_str(&format!(" <span class=\"arg-type\">{}</span>", esc_html(ty)));
                    }
                    s.push_str(&format!("&nbsp;<span class=\"arg-name\">{}</span>", esc_html(&arg.name)));
                }
                if let Some(default) = arg.default.as_deref().filter(|d| !d.is_empty()) {
                    s.push_str(&format!(
                        "&nbsp;=&nbsp;<span class=\"arg-default\">{}</span>",
                        encode_entities(default, Quotes::Both, true)
                    ));
                }
                s
            })
            .collect();
        let args = args.join(", ");

        let mut signature = format!("{title}(");
        if !args.is_empty() {
            signature.push_str(&args);
            signature.push_str("&nbsp;");
        }
        signature.push(')');
        signature
    }

    /// Parameter rows in `@param` order.
    ///
    /// Once a parameter is marked optional every later one is too; an
    /// argument default also makes a parameter optional, and the
    /// description's "Default X." sentence is dropped since the default is
    /// shown separately.
    pub fn params(&self, entry: &Entry) -> Vec<ParamRecord> {
        let mut params: Vec<ParamRecord> = Vec::new();
        let mut encountered_optional = false;

        for tag in entry.tags_named("param") {
            let tag = undo_strong(tag);
            let Some(variable) = tag.variable.as_deref().filter(|v| !v.is_empty()) else {
                continue;
            };

            let types = tag
                .types
                .iter()
                .map(|t| {
                    let t = esc_html(t);
                    format!("<span class=\"{t}\">{t}</span>")
                })
                .collect::<Vec<_>>()
                .join("|");

            let mut content = tag.content.clone();
            if let Some(rest) = content.strip_prefix('{') {
                content = format!("{{ {}", rest.trim());
            }

            if let Some(rest) = after_optional(&content, 0, "optional") {
                content = rest.trim_start().to_string();
                encountered_optional = true;
            } else if let Some(rest) = after_optional(&content, 2, "optional.") {
                // `{ Optional. ...`
                content = format!("{{ {rest}");
                encountered_optional = true;
            }
            let required = !encountered_optional;

            let record = ParamRecord {
                name: variable.to_string(),
                types,
                content: format_param_description(&content, &self.resolver),
                required,
                default: None,
            };
            match params.iter_mut().find(|p| p.name == record.name) {
                Some(existing) => *existing = record,
                None => params.push(record),
            }
        }

        for arg in &entry.args {
            if arg.name.is_empty() {
                continue;
            }
            let Some(param) = params.iter_mut().find(|p| p.name == arg.name) else {
                continue;
            };
            param.default = arg.default.clone().filter(|d| !d.is_empty());
            let Some(default) = param.default.as_deref() else {
                continue;
            };

            param.required = false;
            // Encoded the way descriptions are, so the sentence matches.
            let encoded = encode_entities(default, Quotes::Double, true);
            let mut redundant = vec![format!("default is {encoded}."), format!("Default {encoded}.")];
            match default {
                "''" => redundant.extend(
                    ["Default empty.", "Default empty string.", "default is empty string."].map(String::from),
                ),
                "array()" => redundant.extend(["Default empty array.", "Default empty."].map(String::from)),
                _ => {}
            }
            for sentence in &redundant {
                param.content = param.content.replace(sentence.as_str(), "");
            }
        }

        params
    }

    /// Declared argument types by name.
    pub fn arguments(&self, entry: &Entry) -> Vec<ArgumentType> {
        entry
            .args
            .iter()
            .filter_map(|arg| {
                let ty = arg.ty.as_deref().filter(|t| !t.is_empty())?;
                Some(ArgumentType {
                    name: arg.name.clone(),
                    ty: ty.to_string(),
                })
            })
            .collect()
    }

    pub fn return_value(&self, entry: &Entry) -> String {
        let Some(tag) = entry.first_tag("return") else {
            return String::new();
        };
        let description = if tag.content.is_empty() {
            String::new()
        } else {
            format_param_description(&tag.content, &self.resolver)
        };
        format!(
            "<span class=\"return-type\">({})</span> {}",
            esc_html(&tag.types.join("|")),
            description
        )
    }

    /// Since versions paired with their `@since` tags, oldest first. A
    /// deprecation whose version is a known term gets a row of its own.
    pub fn changelog(&self, entry: &Entry) -> Vec<ChangelogRow> {
        let mut terms: Vec<&str> = entry.since.iter().map(String::as_str).collect();
        let mut since_tags: Vec<&DocTag> = entry.tags_named("since").collect();

        if let Some(deprecated) = entry.first_tag("deprecated") {
            if self.repo.has_version(&deprecated.content) {
                terms.push(&deprecated.content);
                since_tags.push(deprecated);
            }
        }

        let links = self.links();
        let mut rows: Vec<ChangelogRow> = Vec::new();
        for term in terms {
            for (index, tag) in since_tags.iter().enumerate() {
                if tag.content != term {
                    continue;
                }
                let description = match tag.description.as_deref().filter(|d| !d.is_empty()) {
                    Some(text) => format!(
                        "<span class=\"since-description\">{}</span>",
                        format_param_description(text, &self.resolver)
                    ),
                    None if tag.is("deprecated") => self.deprecated(entry, false),
                    None if index == 0 => "Introduced.".to_string(),
                    None => String::new(),
                };
                let row = ChangelogRow {
                    version: term.to_string(),
                    description,
                    since_url: links.since_url(term),
                };
                match rows.iter_mut().find(|r| r.version == row.version) {
                    Some(existing) => *existing = row,
                    None => rows.push(row),
                }
            }
        }
        rows
    }

    pub fn see_also(&self, entry: &Entry) -> Vec<SeeAlso> {
        entry
            .tags_named("see")
            .filter_map(|tag| {
                let refers = tag.refers.as_deref().filter(|r| !r.is_empty())?;
                Some(SeeAlso {
                    refers: self.resolver.resolve_internal(refers),
                    content: tag.content.clone(),
                })
            })
            .collect()
    }

    /// Deprecation notice, empty unless the entry has a `@deprecated` tag.
    pub fn deprecated(&self, entry: &Entry, formatted: bool) -> String {
        let Some(tag) = entry.first_tag("deprecated") else {
            return String::new();
        };

        let mut info = String::new();
        if let Some(refers) = self.referral(entry) {
            let mut refers = refers;
            if matches!(entry.kind, Kind::Function | Kind::Method) && !refers.contains("()") {
                refers.push_str("()");
            }
            info = format!("Use {} instead.", self.resolver.resolve_internal(&refers));
        }
        if info.is_empty() {
            if let Some(description) = tag.description.as_deref() {
                info = sanitize_text(description);
                if !info.is_empty() && !info.contains("instead") {
                    info = format!("{} instead.", info.trim_end_matches(['.', ' ']));
                }
            }
        }

        let mut contents = format!("This {} has been deprecated.", entry.kind);
        if !info.is_empty() {
            contents.push(' ');
            contents.push_str(&info);
        }

        if formatted {
            format!("<div class=\"deprecated notice notice-warning\"><p>{contents}</p></div>")
        } else {
            contents
        }
    }

    /// Notice for entries marked `@access private` or with private visibility.
    pub fn private_access(&self, entry: &Entry) -> String {
        let tagged = entry.tags_named("access").any(|t| t.content == "private");
        if !tagged && entry.visibility.as_deref() != Some("private") {
            return String::new();
        }

        let mut contents = PRIVATE_ACCESS.to_string();
        if let Some(refers) = self.referral(entry) {
            contents.push_str(&format!(" Use {} instead.", self.resolver.resolve_internal(&refers)));
        }
        format!("<div class=\"private-access notice notice-error\"><p>{contents}</p></div>")
    }

    /// `refers` of the first `@see` tag, cleaned; the suggested alternative.
    fn referral(&self, entry: &Entry) -> Option<String> {
        let refers = entry.first_tag("see")?.refers.as_deref()?;
        Some(sanitize_text(refers)).filter(|r| !r.is_empty())
    }

    /// Published methods of a class, trait or interface, sorted by name.
    pub fn methods(&self, entry: &Entry) -> Vec<&'a Entry> {
        if !entry.kind.is_class_like() {
            return Vec::new();
        }
        let mut methods = self.repo.children(entry.id, Kind::Method);
        methods.sort_by(|a, b| a.name.cmp(&b.name));
        methods
    }

    /// `<div class="namespace">A\B</div>` relative to the configured root
    /// namespace; empty for the global namespace.
    pub fn namespace(&self, entry: &Entry, with_links: bool) -> String {
        let root: Vec<&str> = self
            .config
            .root_namespace
            .split('\\')
            .filter(|p| !p.is_empty())
            .collect();
        let all: Vec<&str> = entry.namespaces.iter().map(String::as_str).collect();
        let skip = if !root.is_empty() && all.starts_with(&root) { root.len() } else { 0 };
        if all.len() <= skip {
            return String::new();
        }

        let links = self.links();
        let parts: Vec<String> = (skip..all.len())
            .map(|i| {
                let name = esc_html(all[i]);
                if with_links {
                    let url = links.namespace_url(&all[..=i].join("\\"));
                    format!("<a href=\"{}\">{}</a>", esc_url(&url), name)
                } else {
                    name
                }
            })
            .collect();
        format!("<div class=\"namespace\">{}</div>", parts.join("\\"))
    }

    pub fn source(&self, entry: &Entry, force: bool) -> String {
        self.sources.read(entry, force)
    }

    fn source_section(&self, entry: &Entry) -> Option<SourceSection> {
        let file = entry.source_file.as_deref().filter(|f| !f.is_empty())?;
        let links = self.links();
        Some(SourceSection {
            file: file.to_string(),
            archive_url: links.source_file_url(file),
            github_url: links.github_source_url(entry, true),
            line: entry.line_num,
            code: self.source(entry, false),
        })
    }

    /// Entries this one points at, then entries pointing at it. Empty
    /// groups are left out.
    pub fn related(&self, entry: &Entry) -> Vec<RelatedGroup> {
        const GROUPS: [(Relation, &str, &str, &str, &str); 3] = [
            (Relation::Uses, "uses", "Uses", "used-by", "Used By"),
            (Relation::Extends, "extends", "Extends", "extended-by", "Extended By"),
            (Relation::Implements, "implements", "Implements", "implemented-by", "Implemented By"),
        ];

        let mut forward = Vec::new();
        let mut reverse = Vec::new();
        for (relation, slug, heading, back_slug, back_heading) in GROUPS {
            let mut targets: Vec<&Entry> = Vec::new();
            for &id in entry.related_ids(relation) {
                let Some(target) = self.repo.find_by_id(id) else {
                    continue;
                };
                if target.is_published()
                    && relation.allows(entry.kind, target.kind)
                    && !targets.iter().any(|t| t.id == target.id)
                {
                    targets.push(target);
                }
            }
            forward.push(self.related_group(slug, heading, targets));

            let sources: Vec<&Entry> = self
                .repo
                .referrers(entry.id, relation)
                .into_iter()
                .filter(|source| relation.allows(source.kind, entry.kind))
                .collect();
            reverse.push(self.related_group(back_slug, back_heading, sources));
        }

        forward
            .into_iter()
            .chain(reverse)
            .filter(|group| !group.items.is_empty())
            .collect()
    }

    fn related_group(&self, slug: &'static str, heading: &'static str, entries: Vec<&Entry>) -> RelatedGroup {
        let links = self.links();
        let items = entries
            .into_iter()
            .map(|e| {
                let parens = if matches!(e.kind, Kind::Function | Kind::Method) { "()" } else { "" };
                RelatedItem {
                    source_file: e.source_file.clone().unwrap_or_default(),
                    title: format!("{}{}", e.title, parens),
                    url: links.permalink(e, self.repo),
                }
            })
            .collect();
        RelatedGroup { slug, heading, items }
    }

    fn method_summary(&self, method: &Entry) -> MethodSummary {
        let title = match method.title.rfind(':') {
            Some(i) => &method.title[i + 1..],
            None => method.title.as_str(),
        };
        MethodSummary {
            title: title.to_string(),
            url: self.links().permalink(method, self.repo),
            excerpt: sanitize_text(&method.summary),
            deprecated: method.first_tag("deprecated").is_some(),
        }
    }
}

/// `@param` types by variable, in tag order.
fn param_types(entry: &Entry) -> Vec<(String, String)> {
    let mut types: Vec<(String, String)> = Vec::new();
    for tag in entry.tags_named("param") {
        let Some(variable) = tag.variable.as_deref() else {
            continue;
        };
        let joined = tag.types.join("|");
        match types.iter_mut().find(|(name, _)| name == variable) {
            Some(existing) => existing.1 = joined,
            None => types.push((variable.to_string(), joined)),
        }
    }
    types
}

/// Function that fires a hook of the given type.
fn hook_call(hook_type: &str) -> &'static str {
    if hook_type.contains("action") {
        match hook_type {
            "action_reference" => "do_action_ref_array",
            "action_deprecated" => "do_action_deprecated",
            _ => "do_action",
        }
    } else {
        match hook_type {
            "filter_reference" => "apply_filters_ref_array",
            "filter_deprecated" => "apply_filters_deprecated",
            _ => "apply_filters",
        }
    }
}

// The docblock parser turns `__foo__` into `<strong>foo</strong>`.
fn undo_strong(tag: &DocTag) -> DocTag {
    let fix = |s: &str| s.replace("<strong>", "__").replace("</strong>", "__");
    DocTag {
        name: tag.name.clone(),
        variable: tag.variable.as_deref().map(fix),
        types: tag.types.iter().map(|t| fix(t)).collect(),
        content: fix(&tag.content),
        refers: tag.refers.as_deref().map(fix),
        description: tag.description.as_deref().map(fix),
    }
}

/// Text following an ASCII `marker` found at byte `at`, skipping the one
/// separator character after it.
fn after_optional<'t>(text: &'t str, at: usize, marker: &str) -> Option<&'t str> {
    let end = at + marker.len();
    if !text.get(at..end)?.eq_ignore_ascii_case(marker) {
        return None;
    }
    let rest = &text[end..];
    let mut chars = rest.chars();
    chars.next();
    Some(chars.as_str())
}

/// Everything shown on one reference page.
#[derive(Debug, Clone, Serialize)]
pub struct Page {
    pub id: EntryId,
    pub kind: Kind,
    pub name: String,
    pub title: String,
    pub url: String,
    pub signature: String,
    pub summary: String,
    pub description: String,
    pub namespace: String,
    pub deprecated: String,
    pub private_access: String,
    pub params: Vec<ParamRecord>,
    pub arguments: Vec<ArgumentType>,
    pub return_value: String,
    pub source: Option<SourceSection>,
    pub changelog: Vec<ChangelogRow>,
    pub see_also: Vec<SeeAlso>,
    pub related: Vec<RelatedGroup>,
    pub methods: Vec<MethodSummary>,
}

impl Page {
    pub fn build(entry: &Entry, ctx: &Context<'_>) -> Self {
        let mut see_also = ctx.see_also(entry);
        // Methods point back at their class.
        if entry.kind == Kind::Method {
            if let Some(parent) = entry.parent.and_then(|id| ctx.repo.find_by_id(id)) {
                see_also.push(SeeAlso {
                    refers: format!(
                        "<a href=\"{}\">{}</a>",
                        esc_url(&ctx.links().permalink(parent, ctx.repo)),
                        esc_html(&parent.title)
                    ),
                    content: String::new(),
                });
            }
        }

        let namespace = if entry.kind == Kind::Hook {
            String::new()
        } else {
            ctx.namespace(entry, true)
        };

        Page {
            id: entry.id,
            kind: entry.kind,
            name: entry.name.clone(),
            title: entry.title.clone(),
            url: ctx.links().permalink(entry, ctx.repo),
            signature: ctx.signature(entry),
            summary: ctx.summary(entry),
            description: ctx.description(entry),
            namespace,
            deprecated: ctx.deprecated(entry, true),
            private_access: ctx.private_access(entry),
            params: ctx.params(entry),
            arguments: ctx.arguments(entry),
            return_value: ctx.return_value(entry),
            source: ctx.source_section(entry),
            changelog: ctx.changelog(entry),
            see_also,
            related: ctx.related(entry),
            methods: ctx.methods(entry).into_iter().map(|m| ctx.method_summary(m)).collect(),
        }
    }
}
