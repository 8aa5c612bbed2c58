//! Hash notation: `@type` sub-tags describing the keys of an array parameter.
//!
//! ```text
//! {
//!     Optional. Arguments.
//!
//!     @type string $name  Name.
//!     @type array  $size {
//!         @type int $w Width.
//!         @type int $h Height. }
//! }
//! ```
//!
//! The upstream parser leaves this as one blob of text; here it becomes a
//! nested `<ul class="param-hash">` list. Unbalanced braces never fail,
//! they just produce imperfect nesting.

const LIST_OPEN: &str = "<ul class=\"param-hash\">";

/// One open `<ul>`. `item_open` is set while the current `<li>` owns a
/// nested list and is still waiting for it to close.
#[derive(Debug, Default)]
struct Level {
    item_open: bool,
}

#[derive(Debug, Default)]
struct Lists {
    out: String,
    stack: Vec<Level>,
}

impl Lists {
    fn begin_item(&mut self) {
        match self.stack.last_mut() {
            None => {
                self.out.push_str(LIST_OPEN);
                self.stack.push(Level::default());
            }
            Some(level) if level.item_open => {
                self.out.push_str("</li>\n");
                level.item_open = false;
            }
            Some(_) => {}
        }
        self.out.push_str("<li>");
    }

    fn open_nested(&mut self) {
        if let Some(level) = self.stack.last_mut() {
            level.item_open = true;
        }
        self.out.push_str(LIST_OPEN);
        self.out.push('\n');
        self.stack.push(Level::default());
    }

    /// Close the innermost list; returns false at the root, which only
    /// closes at the end of input or before interstitial text.
    fn close_nested(&mut self) -> bool {
        if self.stack.len() < 2 {
            return false;
        }
        self.pop();
        if let Some(owner) = self.stack.last_mut() {
            if owner.item_open {
                self.out.push_str("</li>\n");
                owner.item_open = false;
            }
        }
        true
    }

    fn pop(&mut self) {
        if let Some(level) = self.stack.pop() {
            if level.item_open {
                self.out.push_str("</li>");
            }
            self.out.push_str("</ul>\n");
        }
    }

    fn close_all(&mut self) {
        while !self.stack.is_empty() {
            self.pop();
        }
    }
}

/// Fields of one `@type` record.
#[derive(Debug, PartialEq)]
struct Record<'a> {
    marker: &'a str,
    ty: &'a str,
    name: &'a str,
    description: &'a str,
}

fn split_record(line: &str) -> Record<'_> {
    let mut parts = line.splitn(4, ' ');
    Record {
        marker: parts.next().unwrap_or(""),
        ty: parts.next().unwrap_or(""),
        name: parts.next().unwrap_or(""),
        description: parts.next().unwrap_or("").trim(),
    }
}

/// Render hash-notation text as nested lists. Text that does not start
/// with `{` is returned unchanged.
pub fn format_hash_param(text: &str) -> String {
    let Some(body) = text.strip_prefix('{') else {
        return text.to_string();
    };
    let body = body.strip_suffix('}').unwrap_or(body).trim();
    let body = body.replace("@type", "\n@type");

    let mut lists = Lists::default();
    for raw in body.split('\n') {
        let line = raw.split_whitespace().collect::<Vec<_>>().join(" ");
        let record = split_record(&line);

        if record.marker != "@type" {
            lists.close_all();
            lists.out.push_str(&line);
            continue;
        }

        lists.begin_item();

        let nested = record.name == "{" || record.description.starts_with('{');
        let mut description = record.description;
        let mut closers = 0;
        if nested {
            description = description.trim_start_matches('{').trim_start();
        } else {
            while let Some(rest) = description.strip_suffix('}') {
                description = rest.trim_end();
                closers += 1;
            }
        }

        if record.name != "{" {
            let name = record.name.trim_start_matches('$');
            if !name.is_empty() {
                lists.out.push_str(&format!("<b>'{name}'</b><br />"));
            }
        }
        lists.out.push_str(&format!(
            "<i><span class='type'>({})</span></i> {}",
            record.ty, description
        ));

        if nested {
            lists.open_nested();
            continue;
        }

        lists.out.push_str("</li>\n");
        let mut unmatched = 0;
        for _ in 0..closers {
            if !lists.close_nested() {
                unmatched += 1;
            }
        }
        if unmatched > 0 {
            // Nothing left to close: keep the braces as text after the item.
            lists.out.push_str(&"}".repeat(unmatched));
            lists.out.push('\n');
        }
    }
    lists.close_all();
    lists.out
}
