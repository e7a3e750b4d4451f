//! Reply composition: FAQ text plus the shared footer.

use std::{io, path::PathBuf};

use log::error;

use crate::config::ContentConfig;
use crate::faq::{FaqResolver, read_trimmed};

pub const FOOTER_FILE: &str = "template/footer.md";

const BLANK_LINE: &str = "\n\n";
const RULED: &str = "\n\n*****\n\n";

#[derive(Debug, Clone)]
pub struct ResponseComposer {
    resolver: FaqResolver,
    footer_path: PathBuf,
    separator: &'static str,
}

impl ResponseComposer {
    #[must_use]
    pub fn new(resolver: FaqResolver, footer_rule: bool) -> Self {
        let footer_path = resolver.root().join(FOOTER_FILE);
        Self {
            resolver,
            footer_path,
            separator: if footer_rule { RULED } else { BLANK_LINE },
        }
    }

    #[must_use]
    pub fn from_config(config: &ContentConfig) -> Self {
        Self::new(
            FaqResolver::new(&config.content_dir, config.strategy),
            config.footer_rule,
        )
    }

    /// Build the full reply body for `keyword`.
    #[must_use]
    pub fn compose(&self, keyword: &str) -> String {
        let faq = self.resolver.read(keyword);
        let footer = self.footer();

        if footer.is_empty() {
            faq
        } else {
            format!("{faq}{}{footer}", self.separator)
        }
    }

    /// Trimmed footer text, or empty when it is missing or unreadable.
    #[must_use]
    pub fn footer(&self) -> String {
        match read_trimmed(&self.footer_path) {
            Ok(footer) => footer,
            Err(e) if e.kind() == io::ErrorKind::NotFound => String::new(),
            Err(e) => {
                error!("Error reading footer {}: {e}", self.footer_path.display());
                String::new()
            }
        }
    }
}
