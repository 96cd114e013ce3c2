use anyhow::{bail, Context, Result};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};

/// Language bundle folder relative to the project root
pub const BUNDLE_DIR: &str = "assets/i18n";
/// Stores the language selected for previews
pub const SETTINGS_FILE: &str = "settings/i18n.json";

pub struct Project {
    root: PathBuf,
}

impl Project {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn bundle_dir(&self) -> PathBuf {
        self.root.join(BUNDLE_DIR)
    }

    fn meta_path(&self, language: &str) -> PathBuf {
        self.bundle_dir().join(format!("{language}.meta"))
    }

    /// Language bundle names, sorted; `.meta` files and dotted names are skipped
    pub fn list(&self) -> Result<Vec<String>> {
        let dir = self.bundle_dir();
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut languages = Vec::new();
        for entry in std::fs::read_dir(&dir).with_context(|| format!("Failed to read {}", dir.display()))? {
            let name = entry?.file_name().to_string_lossy().to_string();
            if Path::new(&name).extension().is_some_and(|ext| ext == "meta") {
                continue;
            }
            let language = match name.rfind('.') {
                Some(dot) => &name[..dot],
                None => name.as_str(),
            };
            if !language.contains('.') && !language.is_empty() {
                languages.push(language.to_string());
            }
        }
        languages.sort();
        languages.dedup();
        Ok(languages)
    }

    /// Create the bundle folder and mark it as an asset bundle in its meta file
    pub fn create(&self, language: &str) -> Result<PathBuf> {
        validate_name(language)?;
        let path = self.bundle_dir().join(language);
        std::fs::create_dir_all(&path).with_context(|| format!("Failed to create {}", path.display()))?;

        let meta_path = self.meta_path(language);
        let mut meta: Value = if meta_path.exists() {
            let text = std::fs::read_to_string(&meta_path)?;
            serde_json::from_str(&text).with_context(|| format!("Invalid meta file {}", meta_path.display()))?
        } else {
            json!({ "importer": "directory", "imported": true, "files": [], "subMetas": {} })
        };

        let Some(object) = meta.as_object_mut() else {
            bail!("Meta file {} is not an object", meta_path.display());
        };
        let user_data = object.entry("userData").or_insert_with(|| json!({}));
        if !user_data.is_object() {
            *user_data = json!({});
        }
        user_data["isBundle"] = json!(true);
        user_data["bundleName"] = json!(language);

        std::fs::write(&meta_path, serde_json::to_string_pretty(&meta)?)
            .with_context(|| format!("Failed to write {}", meta_path.display()))?;
        Ok(path)
    }

    /// Remove the bundle folder and its meta file
    pub fn delete(&self, language: &str) -> Result<()> {
        validate_name(language)?;
        let path = self.bundle_dir().join(language);
        if !path.exists() {
            bail!("Language bundle {language} does not exist");
        }
        std::fs::remove_dir_all(&path).with_context(|| format!("Failed to delete {}", path.display()))?;
        let meta_path = self.meta_path(language);
        if meta_path.exists() {
            std::fs::remove_file(&meta_path)?;
        }
        Ok(())
    }

    /// Language selected for previews, empty when unset
    pub fn current_language(&self) -> Result<String> {
        let path = self.root.join(SETTINGS_FILE);
        if !path.exists() {
            return Ok(String::new());
        }
        let settings: Value = serde_json::from_str(&std::fs::read_to_string(&path)?)
            .with_context(|| format!("Invalid settings file {}", path.display()))?;
        Ok(settings["language"].as_str().unwrap_or_default().to_string())
    }

    pub fn set_current_language(&self, language: &str) -> Result<()> {
        if !language.is_empty() {
            validate_name(language)?;
        }
        if !language.is_empty() && !self.list()?.iter().any(|l| l == language) {
            bail!("Language bundle {language} does not exist");
        }
        let path = self.root.join(SETTINGS_FILE);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, serde_json::to_string_pretty(&json!({ "language": language }))?)?;
        Ok(())
    }
}

/// Bundle names must contain at least one ASCII letter
pub fn validate_name(language: &str) -> Result<()> {
    if !language.chars().any(|c| c.is_ascii_alphabetic()) {
        bail!("Language names may only use a-z A-Z, {language:?} is not valid");
    }
    if language.contains(['/', '\\', '.']) {
        bail!("Language name {language:?} must not contain path separators or dots");
    }
    Ok(())
}

pub fn project_root(path: Option<&String>) -> PathBuf {
    path.map_or_else(|| PathBuf::from("."), PathBuf::from)
}
