//! Env-style configuration file edited by the installer.

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fs;
use std::io::Read;
use std::path::Path;

/// Group of related configuration entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Section {
    App,
    Database,
    UrlShortener,
    Redirects,
    /// Entries the installer does not manage. Kept untouched.
    Other,
}

impl Section {
    pub const MANAGED: [Section; 4] = [
        Section::App,
        Section::Database,
        Section::UrlShortener,
        Section::Redirects,
    ];

    /// Section an environment variable belongs to.
    pub fn of(key: &str) -> Self {
        match key {
            "SECRET" => Self::App,
            "DATABASE_URL" => Self::Database,
            "DEFAULT_DOMAIN" | "SHORT_URL_SCHEMA" => Self::UrlShortener,
            "DEFAULT_BASE_URL_REDIRECT"
            | "DEFAULT_REGULAR_404_REDIRECT"
            | "DEFAULT_INVALID_SHORT_URL_REDIRECT" => Self::Redirects,
            _ => Self::Other,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::App => "app",
            Self::Database => "database",
            Self::UrlShortener => "url_shortener",
            Self::Redirects => "redirects",
            Self::Other => "other",
        }
    }
}

/// Configuration being built by the installer, grouped by [`Section`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallConfig {
    sections: BTreeMap<Section, BTreeMap<String, String>>,
}

impl InstallConfig {
    /// Reads `path`. A missing file yields an empty configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let file = fs::File::open(path)
            .with_context(|| format!("Failed to open {}", path.display()))?;
        Self::parse(file).with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Parses `KEY=VALUE` lines with `dotenvy` rules (comments, quotes, escapes).
    pub fn parse<R: Read>(reader: R) -> Result<Self> {
        let mut config = Self::default();

        for entry in dotenvy::from_read_iter(reader) {
            let (key, value) = entry?;
            config.insert(key, value);
        }

        Ok(config)
    }

    fn insert(&mut self, key: String, value: String) {
        self.sections
            .entry(Section::of(&key))
            .or_default()
            .insert(key, value);
    }

    /// Whether any entry of `section` is present.
    pub fn has(&self, section: Section) -> bool {
        self.sections.get(&section).is_some_and(|s| !s.is_empty())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.sections
            .get(&Section::of(key))
            .and_then(|s| s.get(key))
            .map(String::as_str)
    }

    /// Replaces the whole content of `section`.
    pub fn set<I, K, V>(&mut self, section: Section, entries: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let entries = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self.sections.insert(section, entries);
    }

    /// Renders the configuration as an env file, one commented block per section.
    pub fn render(&self) -> String {
        let mut out = String::new();

        for (section, entries) in &self.sections {
            if entries.is_empty() {
                continue;
            }

            if !out.is_empty() {
                out.push('\n');
            }
            out.push_str(&format!("# {}\n", section.label()));
            for (key, value) in entries {
                out.push_str(&format!("{}={}\n", key, quote(value)));
            }
        }

        out
    }

    /// Writes the rendered configuration to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, self.render())
            .with_context(|| format!("Failed to write {}", path.display()))
    }
}

fn quote(value: &str) -> String {
    let needs_quotes = value.is_empty()
        || value
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '#' | '"' | '\'' | '\\' | '$'));

    if !needs_quotes {
        return value.to_string();
    }

    let escaped = value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('$', "\\$");
    format!("\"{escaped}\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_groups_entries_by_section() {
        let content = "# comment\nSECRET=abc\nDEFAULT_DOMAIN=s.test\nRUST_LOG=debug\n";
        let config = InstallConfig::parse(content.as_bytes()).unwrap();

        assert!(config.has(Section::App));
        assert!(config.has(Section::UrlShortener));
        assert!(!config.has(Section::Database));
        assert_eq!(config.get("SECRET"), Some("abc"));
        assert_eq!(config.get("RUST_LOG"), Some("debug"));
    }

    #[test]
    fn test_set_replaces_section() {
        let mut config =
            InstallConfig::parse("DEFAULT_DOMAIN=a.test\nSHORT_URL_SCHEMA=http\n".as_bytes())
                .unwrap();

        config.set(Section::UrlShortener, [("DEFAULT_DOMAIN", "b.test")]);

        assert_eq!(config.get("DEFAULT_DOMAIN"), Some("b.test"));
        assert_eq!(config.get("SHORT_URL_SCHEMA"), None);
    }

    #[test]
    fn test_render_and_parse_back() {
        let mut config = InstallConfig::default();
        config.set(Section::App, [("SECRET", "with space #hash")]);
        config.set(
            Section::Database,
            [("DATABASE_URL", "postgres://u:p@localhost:5432/db")],
        );

        let rendered = config.render();
        assert!(rendered.starts_with("# app\n"));
        assert!(rendered.contains("# database\nDATABASE_URL=postgres://u:p@localhost:5432/db\n"));

        let parsed = InstallConfig::parse(rendered.as_bytes()).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let config = InstallConfig::load(Path::new("/nonexistent/urlkeeper/.env")).unwrap();
        assert_eq!(config, InstallConfig::default());
    }
}
