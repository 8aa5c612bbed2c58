//! HTML renderer — standalone reference page with semantic markup.
//!
//! Field values from [`Page`] are already formatted HTML; only plain-text
//! values (versions, file names, defaults, source code) are escaped here.

use crate::escape::{encode_entities, esc_html, esc_url, Quotes};
use crate::fields::{Page, RelatedGroup, SourceSection};
use crate::model::{Kind, ParamRecord};
use crate::render::Renderer;
use anyhow::Result;

pub struct HtmlRenderer;

impl Renderer for HtmlRenderer {
    fn render(&self, page: &Page) -> Result<String> {
        let mut out = String::new();

        out.push_str("<!DOCTYPE html>\n<html>\n<head>\n");
        out.push_str("<meta charset=\"utf-8\">\n");
        out.push_str(&format!("<title>{}</title>\n", esc_html(&page.title)));
        out.push_str(&format!("<link rel=\"canonical\" href=\"{}\">\n", esc_url(&page.url)));
        out.push_str("<style>\n");
        out.push_str("body { font-family: system-ui, sans-serif; max-width: 48em; margin: 2em auto; padding: 0 1em; }\n");
        out.push_str("code { background: #f4f4f4; padding: 0.15em 0.3em; border-radius: 3px; }\n");
        out.push_str("pre { background: #f4f4f4; padding: 1em; border-radius: 5px; overflow-x: auto; }\n");
        out.push_str("dt { font-weight: bold; margin-top: 0.5em; }\n");
        out.push_str("dd { margin-left: 1.5em; }\n");
        out.push_str(".notice { padding: 0.5em 1em; border-left: 4px solid; }\n");
        out.push_str(".notice-warning { border-color: #dba617; }\n");
        out.push_str(".notice-error { border-color: #d63638; }\n");
        out.push_str(".arg-type, .return-type, .type { color: #50575e; }\n");
        out.push_str("</style>\n");
        out.push_str("</head>\n<body>\n");

        out.push_str(&format!(
            "<article id=\"entry-{}\" class=\"type-{}\">\n",
            page.id,
            page.kind.as_str()
        ));
        out.push_str(&render_header(page));

        out.push_str("<div class=\"entry-content\">\n");
        if !page.summary.is_empty() {
            out.push_str(&format!("<div class=\"summary\">{}</div>\n", page.summary));
        }

        out.push_str("<h2>Description</h2>\n");
        out.push_str(&render_description(page));
        out.push_str(&render_params(&page.params, page.kind));

        if !page.return_value.is_empty() {
            out.push_str("<div class=\"return\">\n<h3>Return</h3>\n");
            out.push_str(&format!("<p>{}</p>\n</div>\n", page.return_value));
        }

        if let Some(ref source) = page.source {
            out.push_str(&render_source(source));
        }
        out.push_str(&render_changelog(page));
        out.push_str(&render_related(&page.related));
        out.push_str(&render_methods(page));
        out.push_str("</div>\n</article>\n");

        out.push_str("</body>\n</html>\n");
        Ok(out)
    }

    fn file_extension(&self) -> &str {
        "html"
    }
}

fn render_header(page: &Page) -> String {
    let mut out = String::from("<header class=\"entry-header\">\n");
    for notice in [&page.deprecated, &page.private_access, &page.namespace] {
        if !notice.is_empty() {
            out.push_str(notice);
            out.push('\n');
        }
    }
    out.push_str(&format!("<h1 class=\"signature\">{}</h1>\n", page.signature));
    out.push_str("</header>\n");
    out
}

fn render_description(page: &Page) -> String {
    if page.description.is_empty() && page.see_also.is_empty() {
        return String::new();
    }
    let mut out = String::from("<div class=\"description\">\n");
    if !page.description.is_empty() {
        out.push_str(&page.description);
        out.push('\n');
    }
    if !page.see_also.is_empty() {
        out.push_str("<h3>See also</h3>\n<ul>\n");
        for see in &page.see_also {
            if see.content.is_empty() {
                out.push_str(&format!("  <li>{}</li>\n", see.refers));
            } else {
                out.push_str(&format!("  <li>{}: {}</li>\n", see.refers, esc_html(&see.content)));
            }
        }
        out.push_str("</ul>\n");
    }
    out.push_str("</div>\n");
    out
}

fn render_params(params: &[ParamRecord], kind: Kind) -> String {
    if params.is_empty() {
        return String::new();
    }
    let mut out = String::from("<div class=\"parameters\">\n<h3>Parameters</h3>\n<dl>\n");
    for param in params {
        out.push_str(&format!("  <dt>{}</dt>\n", esc_html(&param.name)));
        out.push_str("  <dd>\n    <p class=\"desc\">");
        if !param.types.is_empty() {
            out.push_str(&format!("<span class=\"type\">({})</span> ", param.types));
        }
        // Hook parameters are passed by the caller, never "required".
        if param.required && kind != Kind::Hook {
            out.push_str("<span class=\"required\">(Required)</span>");
        } else {
            out.push_str("<span class=\"required\">(Optional)</span>");
        }
        if !param.content.is_empty() {
            out.push_str(&format!(" <span class=\"description\">{}</span>", param.content));
        }
        out.push_str("</p>\n");
        if let Some(ref default) = param.default {
            out.push_str(&format!(
                "    <p class=\"default\">Default value: {}</p>\n",
                esc_html(default)
            ));
        }
        out.push_str("  </dd>\n");
    }
    out.push_str("</dl>\n</div>\n");
    out
}

fn render_source(source: &SourceSection) -> String {
    let mut out = String::from("<div class=\"source-content\">\n<h3>Source</h3>\n");
    out.push_str(&format!(
        "<p>File: <a href=\"{}\">{}</a></p>\n",
        esc_url(&source.archive_url),
        esc_html(&source.file)
    ));
    if !source.code.is_empty() {
        let first_line = source.line.unwrap_or(1);
        out.push_str(&format!(
            "<pre class=\"brush: php; toolbar: false; first-line: {}\">{}</pre>\n",
            first_line,
            encode_entities(&source.code, Quotes::Both, true)
        ));
    }
    if !source.github_url.is_empty() {
        out.push_str(&format!(
            "<p><a href=\"{}\">View on GitHub</a></p>\n",
            esc_url(&source.github_url)
        ));
    }
    out.push_str("</div>\n");
    out
}

fn render_changelog(page: &Page) -> String {
    if page.changelog.is_empty() {
        return String::new();
    }
    let mut out = String::from("<div class=\"changelog\">\n<h3>Changelog</h3>\n<table>\n");
    out.push_str("<thead><tr><th class=\"changelog-version\">Version</th><th class=\"changelog-desc\">Description</th></tr></thead>\n");
    out.push_str("<tbody>\n");
    for row in &page.changelog {
        out.push_str(&format!(
            "  <tr><td><a href=\"{}\">{}</a></td><td>{}</td></tr>\n",
            esc_url(&row.since_url),
            esc_html(&row.version),
            row.description
        ));
    }
    out.push_str("</tbody>\n</table>\n</div>\n");
    out
}

fn render_related(groups: &[RelatedGroup]) -> String {
    if groups.is_empty() {
        return String::new();
    }
    let mut out = String::from("<div class=\"related\">\n<h2>Related</h2>\n");
    for group in groups {
        out.push_str(&format!(
            "<div class=\"{}\">\n<h3>{}</h3>\n<ul>\n",
            group.slug, group.heading
        ));
        for item in &group.items {
            out.push_str(&format!(
                "  <li><span>{}:</span> <a href=\"{}\">{}</a></li>\n",
                esc_html(&item.source_file),
                esc_url(&item.url),
                esc_html(&item.title)
            ));
        }
        out.push_str("</ul>\n</div>\n");
    }
    out.push_str("</div>\n");
    out
}

fn render_methods(page: &Page) -> String {
    if page.methods.is_empty() {
        return String::new();
    }
    let mut out = String::from("<div class=\"methods\">\n<h2>Methods</h2>\n<ul>\n");
    for method in &page.methods {
        out.push_str(&format!(
            "  <li><a href=\"{}\">{}</a>",
            esc_url(&method.url),
            esc_html(&method.title)
        ));
        if !method.excerpt.is_empty() {
            out.push_str(&format!(" &mdash; {}", esc_html(&method.excerpt)));
        }
        if method.deprecated {
            out.push_str(" &mdash; <span class=\"deprecated-method\">deprecated</span>");
        }
        out.push_str("</li>\n");
    }
    out.push_str("</ul>\n</div>\n");
    out
}
