//! Keyword to FAQ document resolution.
//!
//! Documents live under a content root. Keywords are mapped either directly
//! onto `faq/<keyword>.md` or through the `triggers.md` manifest, whose lines
//! look like `- [dividend, distributions](./faq/dividends.md)`. Nothing here
//! is cached: every lookup reads the current files.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use log::{debug, error, warn};

use crate::config::FaqStrategy;

pub const MANIFEST_FILE: &str = "triggers.md";
pub const MANIFEST_FALLBACK: &str = "template/unknown.md";
pub const DIRECT_DIR: &str = "faq";
pub const DIRECT_FALLBACK: &str = "faq/unknown.md";

/// Served when the selected document does not exist.
pub const FAQ_NOT_FOUND: &str = "Sorry, I couldn't find the FAQ file.";
/// Served when the selected document exists but cannot be read.
pub const FAQ_READ_ERROR: &str = "Sorry, there was an error reading the FAQ.";

/// One qualifying manifest line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerEntry {
    pub aliases: Vec<String>,
    pub path: String,
}

impl TriggerEntry {
    #[must_use]
    pub fn matches(&self, keyword: &str) -> bool {
        self.aliases.iter().any(|alias| alias == keyword)
    }
}

/// Parse a single manifest line, returning `None` for lines that do not qualify.
#[must_use]
pub fn parse_trigger_line(line: &str) -> Option<TriggerEntry> {
    let line = line.trim();
    if !line.starts_with("- [") || !line.contains("](") {
        return None;
    }

    let aliases_start = line.find('[')? + 1;
    let aliases_end = line.find(']')?;
    if aliases_end <= aliases_start {
        return None;
    }

    let aliases: Vec<String> = line[aliases_start..aliases_end]
        .split(',')
        .map(|alias| alias.trim().to_lowercase())
        .filter(|alias| !alias.is_empty())
        .collect();
    if aliases.is_empty() {
        return None;
    }

    let path_start = line.find("](")? + 2;
    let path_end = path_start + line[path_start..].find(')')?;
    let path = line[path_start..path_end].trim();
    if path.is_empty() {
        return None;
    }

    Some(TriggerEntry {
        aliases,
        path: path.to_string(),
    })
}

/// Parse every qualifying line of a manifest, in file order.
#[must_use]
pub fn parse_manifest(contents: &str) -> Vec<TriggerEntry> {
    contents.lines().filter_map(parse_trigger_line).collect()
}

/// Returns the first entry listing `keyword` (already lowercased) as an alias.
#[must_use]
pub fn find_trigger<'a>(entries: &'a [TriggerEntry], keyword: &str) -> Option<&'a TriggerEntry> {
    entries.iter().find(|entry| entry.matches(keyword))
}

/// Which document a keyword resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Matched(PathBuf),
    Fallback(PathBuf),
}

impl Resolution {
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Resolution::Matched(path) | Resolution::Fallback(path) => path,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FaqResolver {
    root: PathBuf,
    strategy: FaqStrategy,
}

impl FaqResolver {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, strategy: FaqStrategy) -> Self {
        Self {
            root: root.into(),
            strategy,
        }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Select the document for `keyword` without reading it.
    #[must_use]
    pub fn resolve(&self, keyword: &str) -> Resolution {
        let keyword = keyword.trim().to_lowercase();
        let resolution = match self.strategy {
            FaqStrategy::Direct => self.resolve_direct(&keyword),
            FaqStrategy::Manifest => self.resolve_manifest(&keyword),
        };
        debug!(
            "Keyword '{keyword}' resolved to {:?}",
            resolution.path().display()
        );
        resolution
    }

    /// Read the FAQ text for `keyword`, substituting an apology on failure.
    #[must_use]
    pub fn read(&self, keyword: &str) -> String {
        let resolution = self.resolve(keyword);
        match read_trimmed(resolution.path()) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!("FAQ file {} not found", resolution.path().display());
                FAQ_NOT_FOUND.to_string()
            }
            Err(e) => {
                error!(
                    "Error reading FAQ file {}: {e}",
                    resolution.path().display()
                );
                FAQ_READ_ERROR.to_string()
            }
        }
    }

    fn resolve_direct(&self, keyword: &str) -> Resolution {
        let fallback = Resolution::Fallback(self.root.join(DIRECT_FALLBACK));
        if keyword.is_empty() || !keyword.chars().all(|c| c.is_alphanumeric() || c == '_') {
            return fallback;
        }

        let path = self.root.join(DIRECT_DIR).join(format!("{keyword}.md"));
        if path.is_file() {
            Resolution::Matched(path)
        } else {
            fallback
        }
    }

    fn resolve_manifest(&self, keyword: &str) -> Resolution {
        let fallback = Resolution::Fallback(self.root.join(MANIFEST_FALLBACK));
        let manifest_path = self.root.join(MANIFEST_FILE);

        let contents = match fs::read_to_string(&manifest_path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!("{MANIFEST_FILE} not found, using {MANIFEST_FALLBACK}");
                return fallback;
            }
            Err(e) => {
                error!("Error reading {}: {e}", manifest_path.display());
                return fallback;
            }
        };

        let entries = parse_manifest(&contents);
        match find_trigger(&entries, keyword) {
            Some(entry) => Resolution::Matched(self.root.join(entry.path.trim_start_matches("./"))),
            None => fallback,
        }
    }
}

/// Read a UTF-8 file and trim surrounding whitespace.
pub(crate) fn read_trimmed(path: &Path) -> io::Result<String> {
    fs::read_to_string(path).map(|content| content.trim().to_string())
}
