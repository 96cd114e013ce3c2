//! Localization
//!
//! Strings live in a `{bundle: {language: {key: value}}}` dictionary. Lookups
//! fall back from the requested bundle to the fallback bundle (`"main"` by
//! default) and finally to the key itself, so a missing entry never fails.

mod renderers;

use crate::config::{Config, ConfigError};
use crate::core::config::I18nSettings;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::rc::{Rc, Weak};

pub use renderers::{Localized, LocalizedLabel, LocalizedSpine, LocalizedSprite};

/// One language file: flat key to text map
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LanguageFile {
    /// Entries
    pub entries: BTreeMap<String, String>,
}

impl Config for LanguageFile {}

type Dictionary = HashMap<String, String>;

#[derive(Default)]
struct I18nState {
    language: String,
    bundle: Option<String>,
    ready: bool,
    languages: HashMap<String, HashMap<String, Dictionary>>,
    renderers: Vec<Weak<RefCell<dyn Localized>>>,
}

/// Shared localization handle
///
/// Cheap to clone; clones share the dictionary and the active language.
#[derive(Clone)]
pub struct I18n {
    inner: Rc<RefCell<I18nState>>,
    settings: Rc<I18nSettings>,
}

impl I18n {
    /// Create with the default language active
    pub fn new(settings: I18nSettings) -> Self {
        let state = I18nState {
            language: settings.default_language.clone(),
            ..I18nState::default()
        };
        Self {
            inner: Rc::new(RefCell::new(state)),
            settings: Rc::new(settings),
        }
    }

    fn resolve_language<'a>(&'a self, language: &'a str) -> &'a str {
        if language.is_empty() {
            &self.settings.default_language
        } else {
            language
        }
    }

    /// Mark ready and select `language` (the default when empty)
    pub fn init(&self, language: &str) {
        let language = self.resolve_language(language).to_string();
        let mut state = self.inner.borrow_mut();
        state.ready = true;
        state.language = language;
    }

    /// Whether `init` ran
    pub fn is_ready(&self) -> bool {
        self.inner.borrow().ready
    }

    /// Active language
    pub fn language(&self) -> String {
        self.inner.borrow().language.clone()
    }

    /// Bundle consulted first by [`t`](Self::t); `None` uses the fallback bundle
    pub fn set_bundle(&self, bundle: Option<&str>) {
        self.inner.borrow_mut().bundle = bundle.map(str::to_string);
    }

    /// Active bundle
    pub fn bundle(&self) -> Option<String> {
        self.inner.borrow().bundle.clone()
    }

    /// Translate `key` in the active bundle
    pub fn t(&self, key: &str) -> String {
        let bundle = self
            .bundle()
            .unwrap_or_else(|| self.settings.fallback_bundle.clone());
        self.t_in(&bundle, key)
    }

    /// Translate `key` in `bundle`, falling back to the fallback bundle, then to the key
    pub fn t_in(&self, bundle: &str, key: &str) -> String {
        let state = self.inner.borrow();
        let lookup = |bundle: &str| {
            state
                .languages
                .get(bundle)
                .and_then(|languages| languages.get(&state.language))
                .and_then(|dictionary| dictionary.get(key))
                .filter(|value| !value.is_empty())
                .cloned()
        };

        lookup(bundle)
            .or_else(|| lookup(&self.settings.fallback_bundle))
            .unwrap_or_else(|| {
                log::debug!("Missing translation for {key} ({bundle}/{})", state.language);
                key.to_string()
            })
    }

    /// Merge entries into `bundle`/`language`
    pub fn insert_language<I, K, V>(&self, bundle: &str, language: &str, entries: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut state = self.inner.borrow_mut();
        let dictionary = state
            .languages
            .entry(bundle.to_string())
            .or_default()
            .entry(language.to_string())
            .or_default();
        dictionary.extend(entries.into_iter().map(|(k, v)| (k.into(), v.into())));
    }

    /// Load a TOML, RON or JSON language file into `bundle`/`language`; returns the entry count
    pub fn load_language_file(
        &self,
        bundle: &str,
        language: &str,
        path: impl AsRef<Path>,
    ) -> Result<usize, ConfigError> {
        let file = LanguageFile::load_from_file(path.as_ref())?;
        let count = file.entries.len();
        self.insert_language(bundle, language, file.entries);
        log::info!("Loaded {count} strings for {bundle}/{language} from {}", path.as_ref().display());
        Ok(count)
    }

    /// Languages available in `bundle`, sorted
    pub fn languages(&self, bundle: &str) -> Vec<String> {
        let mut languages: Vec<String> = self
            .inner
            .borrow()
            .languages
            .get(bundle)
            .map(|languages| languages.keys().cloned().collect())
            .unwrap_or_default();
        languages.sort();
        languages
    }

    /// Switch language and refresh every registered renderer
    ///
    /// Returns false when `language` is already active.
    pub fn change_language(&self, language: &str) -> bool {
        let language = self.resolve_language(language).to_string();
        {
            let mut state = self.inner.borrow_mut();
            if state.language == language {
                return false;
            }
            log::info!("Language changed to {language}");
            state.language = language;
        }
        self.update_scene_renderers();
        true
    }

    /// Keep `renderer` in sync with the active language; it is refreshed now
    ///
    /// Only a weak reference is kept, so dropping the renderer unregisters it.
    pub fn register_renderer<R: Localized + 'static>(&self, renderer: &Rc<RefCell<R>>) {
        let erased: Rc<RefCell<dyn Localized>> = renderer.clone();
        self.inner.borrow_mut().renderers.push(Rc::downgrade(&erased));
        renderer.borrow_mut().refresh(self);
    }

    /// Refresh every live, active renderer; returns how many were refreshed
    pub fn update_scene_renderers(&self) -> usize {
        let live: Vec<Rc<RefCell<dyn Localized>>> = {
            let mut state = self.inner.borrow_mut();
            state.renderers.retain(|renderer| renderer.strong_count() > 0);
            state.renderers.iter().filter_map(Weak::upgrade).collect()
        };

        let mut refreshed = 0;
        for renderer in live {
            let mut renderer = renderer.borrow_mut();
            if renderer.is_active() {
                renderer.refresh(self);
                refreshed += 1;
            }
        }
        refreshed
    }

    /// Number of live registered renderers
    pub fn renderer_count(&self) -> usize {
        self.inner
            .borrow()
            .renderers
            .iter()
            .filter(|renderer| renderer.strong_count() > 0)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn i18n() -> I18n {
        let i18n = I18n::new(I18nSettings::default());
        i18n.insert_language("main", "en", [("ok", "OK"), ("cancel", "Cancel"), ("blank", "Blank")]);
        i18n.insert_language("main", "zh", [("ok", "确定")]);
        i18n.insert_language("shop", "en", [("buy", "Buy"), ("ok", "Deal"), ("blank", "")]);
        i18n.init("en");
        i18n
    }

    #[test]
    fn test_bundle_key_falls_back_to_main() {
        let i18n = i18n();
        assert_eq!(i18n.t_in("shop", "cancel"), "Cancel");
        assert_eq!(i18n.t_in("shop", "ok"), "Deal");
        assert_eq!(i18n.t_in("shop", "buy"), "Buy");
    }

    #[test]
    fn test_missing_key_returns_key() {
        let i18n = i18n();
        assert_eq!(i18n.t_in("shop", "nowhere"), "nowhere");
        assert_eq!(i18n.t_in("unknown_bundle", "nowhere"), "nowhere");
    }

    #[test]
    fn test_empty_value_counts_as_missing() {
        let i18n = i18n();
        assert_eq!(i18n.t_in("shop", "blank"), "Blank");
    }

    #[test]
    fn test_t_uses_active_bundle() {
        let i18n = i18n();
        assert_eq!(i18n.t("ok"), "OK");
        i18n.set_bundle(Some("shop"));
        assert_eq!(i18n.t("ok"), "Deal");
    }

    #[test]
    fn test_init_and_change_language() {
        let i18n = I18n::new(I18nSettings::default());
        assert!(!i18n.is_ready());
        i18n.init("");
        assert!(i18n.is_ready());
        assert_eq!(i18n.language(), "zh");

        assert!(i18n.change_language("en"));
        assert!(!i18n.change_language("en"));
        assert!(i18n.change_language(""));
        assert_eq!(i18n.language(), "zh");
    }

    #[test]
    fn test_languages_are_listed() {
        let i18n = i18n();
        assert_eq!(i18n.languages("main"), vec!["en".to_string(), "zh".to_string()]);
        assert!(i18n.languages("missing").is_empty());
    }

    #[test]
    fn test_load_language_file() {
        let dir = std::env::temp_dir().join(format!("game_shell_i18n_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("fr.json");
        std::fs::write(&path, r#"{"ok": "D'accord", "cancel": "Annuler"}"#).unwrap();

        let i18n = i18n();
        assert_eq!(i18n.load_language_file("main", "fr", &path).unwrap(), 2);
        i18n.change_language("fr");
        assert_eq!(i18n.t("cancel"), "Annuler");

        assert!(i18n.load_language_file("main", "fr", dir.join("fr.txt")).is_err());
        std::fs::remove_dir_all(&dir).ok();
    }
}
