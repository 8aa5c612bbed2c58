//! URL generation for entries, archives and taxonomy terms.

use crate::config::Config;
use crate::escape::slugify;
use crate::model::{Entry, Kind};
use crate::repository::ContentRepository;

#[derive(Debug, Clone, Copy)]
pub struct Permalinks<'a> {
    config: &'a Config,
}

impl<'a> Permalinks<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// `reference/` or empty, depending on `use_prefix`.
    pub fn prefix(&self) -> &'static str {
        if self.config.use_prefix {
            "reference/"
        } else {
            ""
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}{}", self.config.home_url, self.prefix(), path)
    }

    pub fn archive_url(&self, kind: Kind) -> String {
        self.url(&format!("{}/", kind.archive_slug()))
    }

    /// Entry permalink. Methods of classes, traits and interfaces nest under
    /// their owner: `.../classes/wp_query/get_posts/`.
    pub fn permalink(&self, entry: &Entry, repo: &dyn ContentRepository) -> String {
        if let Some(url) = &entry.permalink {
            return url.clone();
        }
        if entry.kind == Kind::Method {
            if let Some(url) = self.method_permalink(entry, repo) {
                return url;
            }
        }
        format!("{}{}/", self.archive_url(entry.kind), entry.name)
    }

    fn method_permalink(&self, entry: &Entry, repo: &dyn ContentRepository) -> Option<String> {
        let parent = repo.find_by_id(entry.parent?)?;
        if !parent.kind.is_class_like() {
            return None;
        }
        let method = entry
            .name
            .strip_prefix(parent.name.as_str())?
            .strip_prefix('-')?;
        Some(self.url(&format!(
            "{}/{}/{}/",
            parent.kind.archive_slug(),
            parent.name,
            method
        )))
    }

    pub fn since_url(&self, version: &str) -> String {
        self.url(&format!("since/{}/", slugify(version)))
    }

    pub fn source_file_url(&self, file: &str) -> String {
        self.url(&format!("files/{}/", slugify(&file.replace('/', " "))))
    }

    /// `namespace` is the full path, e.g. `Vendor\Project\Http`.
    pub fn namespace_url(&self, namespace: &str) -> String {
        self.url(&format!("namespace/{}/", slugify(&namespace.replace('\\', " "))))
    }

    /// Link to the entry's file on GitHub, optionally anchored at its first
    /// line. Empty when no repository is configured or the file is unknown.
    pub fn github_source_url(&self, entry: &Entry, with_line: bool) -> String {
        let source = &self.config.source;
        let repository = source.github_repository.trim_matches('/');
        if repository.is_empty() {
            return String::new();
        }
        let Some(file) = entry.source_file.as_deref().filter(|f| !f.is_empty()) else {
            return String::new();
        };

        let mut root = source.github_root_dir.trim_matches('/').to_string();
        if !root.is_empty() {
            root.push('/');
        }
        let version = if source.project_version.is_empty() {
            "master"
        } else {
            source.project_version.as_str()
        };

        let mut url = format!("https://github.com/{repository}/tree/{version}/{root}{file}");
        if with_line {
            if let Some(line) = entry.line_num.filter(|n| *n > 0) {
                url.push_str(&format!("#L{line}"));
            }
        }
        url
    }
}
