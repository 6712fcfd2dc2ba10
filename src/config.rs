//! Configuration module for the method resolver.
//!
//! This module provides a layered configuration system that supports:
//! - Default values
//! - TOML configuration file
//! - Environment variable overrides
//! - CLI argument overrides
//!
//! # Environment Variables
//!
//! Environment variables must be prefixed with `ML_` and use double underscores
//! to separate nested levels:
//! - `ML_EXTRACTION__DEDENT_SOURCE=false` sets `extraction.dedent_source`
//! - `ML_FALLBACK__ENABLED=false` sets `fallback.enabled`
//! - `ML_DEBUG=true` sets `debug`

use crate::extract::Syntax;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

const CONFIG_DIR: &str = ".methodlens";
const CONFIG_FILE: &str = "settings.toml";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    /// Version of the configuration schema
    #[serde(default = "default_version")]
    pub version: u32,

    /// Global debug mode
    #[serde(default = "default_false")]
    pub debug: bool,

    /// Source extraction settings
    #[serde(default)]
    pub extraction: ExtractionConfig,

    /// Fallback documentation provider settings
    #[serde(default)]
    pub fallback: FallbackConfig,

    /// Language-specific syntax tables
    #[serde(default)]
    pub languages: HashMap<String, LanguageConfig>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ExtractionConfig {
    /// Strip the common indentation of extracted source
    #[serde(default = "default_true")]
    pub dedent_source: bool,

    /// Files larger than this are treated as unreadable
    #[serde(default = "default_max_file_bytes")]
    pub max_file_bytes: u64,

    /// Language used for files whose extension matches no `[languages]` entry
    #[serde(default = "default_syntax_name")]
    pub default_syntax: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct FallbackConfig {
    /// Consult the documentation store for primitives
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Documentation store location; a missing file means no provider
    #[serde(default = "default_store_path", skip_serializing_if = "Option::is_none")]
    pub store_path: Option<PathBuf>,

    /// Tool named in the placeholder shown when no provider is available
    #[serde(default = "default_tool")]
    pub tool: String,

    /// How to install `tool`
    #[serde(default = "default_install")]
    pub install: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LanguageConfig {
    /// Whether this language is enabled
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// File extensions for this language
    #[serde(default)]
    pub extensions: Vec<String>,

    /// Comment marker, openers, closer and brackets
    #[serde(flatten)]
    pub syntax: Syntax,
}

// Default value functions
fn default_version() -> u32 {
    1
}
fn default_true() -> bool {
    true
}
fn default_false() -> bool {
    false
}
fn default_max_file_bytes() -> u64 {
    4 * 1024 * 1024
}
fn default_syntax_name() -> String {
    "ruby".to_string()
}
fn default_store_path() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join("methodlens").join("docs.json"))
}
fn default_tool() -> String {
    "pry-doc".to_string()
}
fn default_install() -> String {
    "gem install pry-doc".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: default_version(),
            debug: false,
            extraction: ExtractionConfig::default(),
            fallback: FallbackConfig::default(),
            languages: default_languages(),
        }
    }
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            dedent_source: true,
            max_file_bytes: default_max_file_bytes(),
            default_syntax: default_syntax_name(),
        }
    }
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            store_path: default_store_path(),
            tool: default_tool(),
            install: default_install(),
        }
    }
}

fn default_languages() -> HashMap<String, LanguageConfig> {
    let mut langs = HashMap::new();

    langs.insert(
        "ruby".to_string(),
        LanguageConfig {
            enabled: true,
            extensions: vec!["rb".to_string(), "rake".to_string(), "gemspec".to_string()],
            syntax: Syntax::ruby(),
        },
    );

    // Brace-delimited sources (native extensions, host-language shims)
    langs.insert(
        "brace".to_string(),
        LanguageConfig {
            enabled: true,
            extensions: vec![
                "c".to_string(),
                "h".to_string(),
                "rs".to_string(),
                "java".to_string(),
            ],
            syntax: Syntax::brace(),
        },
    );

    langs
}

fn env_layer() -> Env {
    // Double underscore separates nesting, single underscore stays in the key
    Env::prefixed("ML_").map(|key| key.as_str().to_lowercase().replace("__", ".").into())
}

impl Settings {
    /// Load configuration from all sources
    pub fn load() -> Result<Self, Box<figment::Error>> {
        let config_path = Self::find_workspace_config()
            .unwrap_or_else(|| PathBuf::from(CONFIG_DIR).join(CONFIG_FILE));
        Self::load_from(config_path)
    }

    /// Find `.methodlens/settings.toml`, searching from the current directory up
    fn find_workspace_config() -> Option<PathBuf> {
        Self::workspace_root().map(|root| root.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    /// Check if configuration is properly initialized
    pub fn check_init() -> Result<(), String> {
        let config_path = Self::find_workspace_config()
            .unwrap_or_else(|| PathBuf::from(CONFIG_DIR).join(CONFIG_FILE));

        if !config_path.exists() {
            return Err("No configuration file found".to_string());
        }

        match std::fs::read_to_string(&config_path) {
            Ok(content) => {
                if let Err(e) = toml::from_str::<Settings>(&content) {
                    return Err(format!(
                        "Configuration file is corrupted: {e}\nRun 'methodlens init --force' to regenerate."
                    ));
                }
            }
            Err(e) => {
                return Err(format!("Cannot read configuration file: {e}"));
            }
        }

        Ok(())
    }

    /// Get the workspace root directory (where .methodlens is located)
    pub fn workspace_root() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;

        current
            .ancestors()
            .find(|ancestor| ancestor.join(CONFIG_DIR).is_dir())
            .map(Path::to_path_buf)
    }

    /// Load configuration from a specific file, then environment overrides
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, Box<figment::Error>> {
        Figment::new()
            .merge(Serialized::defaults(Settings::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(env_layer())
            .extract()
            .map_err(Box::new)
    }

    /// Save current configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), Box<dyn std::error::Error>> {
        let parent = path.as_ref().parent().ok_or("Invalid path")?;
        std::fs::create_dir_all(parent)?;

        let toml_string = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_string)?;

        Ok(())
    }

    /// Create a default settings file with helpful comments
    pub fn init_config_file(force: bool) -> Result<PathBuf, Box<dyn std::error::Error>> {
        Self::init_config_file_in(Path::new("."), force)
    }

    /// Same as [`Settings::init_config_file`], rooted at `root`
    pub fn init_config_file_in(
        root: &Path,
        force: bool,
    ) -> Result<PathBuf, Box<dyn std::error::Error>> {
        let config_path = root.join(CONFIG_DIR).join(CONFIG_FILE);

        if !force && config_path.exists() {
            return Err("Configuration file already exists. Use --force to overwrite".into());
        }

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let store_path = default_store_path()
            .map(|path| format!("store_path = '{}'", path.display()))
            .unwrap_or_else(|| "# store_path = 'docs.json'".to_string());
        let template = format!(
            r##"# methodlens configuration file

# Version of the configuration schema
version = 1

# Global debug mode (debug-level logging unless METHODLENS_LOG is set)
debug = false

[extraction]
# Strip the common indentation of extracted source so nested
# definitions display flush-left. false keeps the exact file text.
dedent_source = true

# Files larger than this many bytes are not read
max_file_bytes = {max_file_bytes}

# Language used when a file's extension matches no [languages] entry
default_syntax = "ruby"

[fallback]
# Look up primitives (methods without source) in the documentation store
enabled = true

# JSON map of "Owner#name" -> {{ docstring, source }}.
# When the file is missing the placeholder below is shown instead.
{store_path}

# Tool named in the placeholder and how to install it
tool = "pry-doc"
install = "gem install pry-doc"

# Syntax tables, selected by file extension.
# Keys: comment, openers, statement_openers, loop_keywords, closer,
#       definition, brackets, quotes, heredocs, regex_literals, body_required

[languages.ruby]
enabled = true
extensions = ["rb", "rake", "gemspec"]
comment = "#"
openers = ["def", "class", "module", "do", "begin", "case", "for"]
statement_openers = ["if", "unless", "while", "until"]
loop_keywords = ["while", "until", "for"]
closer = "end"
definition = "def"
brackets = ["()", "[]", "{{}}"]
quotes = "\"'`"
heredocs = true
regex_literals = true

[languages.brace]
enabled = true
extensions = ["c", "h", "rs", "java"]
comment = "//"
brackets = ["()", "[]", "{{}}"]
quotes = "\""
body_required = true
"##,
            max_file_bytes = default_max_file_bytes(),
        );

        std::fs::write(&config_path, template)?;

        Ok(config_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.version, 1);
        assert!(settings.extraction.dedent_source);
        assert_eq!(settings.extraction.default_syntax, "ruby");
        assert_eq!(settings.fallback.tool, "pry-doc");
        assert!(settings.languages.contains_key("ruby"));
        assert_eq!(settings.languages["ruby"].syntax, Syntax::ruby());
    }

    #[test]
    fn test_load_from_toml() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("settings.toml");

        let toml_content = r#"
version = 2

[extraction]
dedent_source = false
max_file_bytes = 1024

[fallback]
enabled = false
store_path = "/opt/docs.json"

[languages.ruby]
enabled = false
"#;

        fs::write(&config_path, toml_content).unwrap();

        let settings = Settings::load_from(&config_path).unwrap();
        assert_eq!(settings.version, 2);
        assert!(!settings.extraction.dedent_source);
        assert_eq!(settings.extraction.max_file_bytes, 1024);
        assert!(!settings.fallback.enabled);
        assert_eq!(
            settings.fallback.store_path,
            Some(PathBuf::from("/opt/docs.json"))
        );
        assert!(!settings.languages["ruby"].enabled);
        // Syntax fields not named in the file keep their defaults
        assert_eq!(settings.languages["ruby"].syntax.closer.as_deref(), Some("end"));
    }

    #[test]
    fn test_custom_language_table() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("settings.toml");

        let toml_content = r#"
[languages.lua]
extensions = ["lua"]
comment = "--"
openers = ["function", "do"]
statement_openers = ["if", "while"]
closer = "end"
definition = "function"
"#;

        fs::write(&config_path, toml_content).unwrap();

        let settings = Settings::load_from(&config_path).unwrap();
        let lua = &settings.languages["lua"];
        assert!(lua.enabled);
        assert_eq!(lua.syntax.comment, "--");
        assert!(lua.syntax.is_opener("function"));
        assert_eq!(lua.syntax.brackets.len(), 3);
        // Built-in tables survive alongside
        assert!(settings.languages.contains_key("ruby"));
    }

    #[test]
    fn test_save_settings() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nested").join("settings.toml");

        let mut settings = Settings::default();
        settings.extraction.max_file_bytes = 2048;
        settings.fallback.tool = "ri".to_string();

        settings.save(&config_path).unwrap();

        let loaded = Settings::load_from(&config_path).unwrap();
        assert_eq!(loaded.extraction.max_file_bytes, 2048);
        assert_eq!(loaded.fallback.tool, "ri");
        assert_eq!(loaded.languages["brace"].syntax, Syntax::brace());
    }

    #[test]
    fn test_env_overrides_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("settings.toml");
        fs::write(&config_path, "[fallback]\ntool = \"yard\"\n").unwrap();

        unsafe {
            std::env::set_var("ML_FALLBACK__TOOL", "ri");
        }
        let settings = Settings::load_from(&config_path).unwrap();
        unsafe {
            std::env::remove_var("ML_FALLBACK__TOOL");
        }

        assert_eq!(settings.fallback.tool, "ri");
    }

    #[test]
    fn test_init_template_parses() {
        let temp_dir = TempDir::new().unwrap();

        let path = Settings::init_config_file_in(temp_dir.path(), false).unwrap();
        assert!(path.ends_with(".methodlens/settings.toml"));

        let content = fs::read_to_string(&path).unwrap();
        let parsed: Settings = toml::from_str(&content).unwrap();
        assert_eq!(parsed.languages["ruby"].syntax, Syntax::ruby());
        assert_eq!(parsed.languages["brace"].syntax, Syntax::brace());
        assert_eq!(parsed.fallback.install, "gem install pry-doc");

        assert!(Settings::init_config_file_in(temp_dir.path(), false).is_err());
        assert!(Settings::init_config_file_in(temp_dir.path(), true).is_ok());
    }
}
