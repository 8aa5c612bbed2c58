//! JSON renderer — structured output for tooling integration.
//!
//! Serializes the Page model directly; every HTML field is included as a
//! string so another front end can place it.

use crate::fields::Page;
use crate::render::Renderer;
use anyhow::{Context, Result};

pub struct JsonRenderer;

impl Renderer for JsonRenderer {
    fn render(&self, page: &Page) -> Result<String> {
        let mut out = serde_json::to_string_pretty(page)
            .with_context(|| format!("serializing page for {}", page.name))?;
        out.push('\n');
        Ok(out)
    }

    fn file_extension(&self) -> &str {
        "json"
    }
}
