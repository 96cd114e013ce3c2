//! Loads scoped to the active game bundle

use super::{AssetCallback, DirCallback, PrefabCallback, SharedAssets};
use std::cell::RefCell;

/// How a localized resource path is completed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResKind {
    /// Path used as given
    #[default]
    Raw,
    /// Image sub-asset, `/spriteFrame` suffix
    SpriteFrame,
    /// Texture sub-asset, `/texture` suffix
    Texture,
}

impl ResKind {
    const fn suffix(self) -> Option<&'static str> {
        match self {
            Self::Raw => None,
            Self::SpriteFrame => Some("spriteFrame"),
            Self::Texture => Some("texture"),
        }
    }
}

/// Resource facade bound to the current game bundle
///
/// `load_res` and `load_dir` resolve against whichever bundle was last passed
/// to [`init_bundle`](Self::init_bundle); `load_common_dir` always uses the
/// shared default bundle.
pub struct ResManager {
    assets: SharedAssets,
    default_bundle: String,
    current: RefCell<String>,
}

impl ResManager {
    /// Facade over `assets`; the current bundle starts as `default_bundle`
    pub fn new(assets: SharedAssets, default_bundle: impl Into<String>) -> Self {
        let default_bundle = default_bundle.into();
        Self {
            assets,
            current: RefCell::new(default_bundle.clone()),
            default_bundle,
        }
    }

    /// Make `bundle` the target of bundle-relative loads
    pub fn init_bundle(&self, bundle: &str) {
        log::debug!("Resource bundle set to {bundle}");
        *self.current.borrow_mut() = bundle.to_string();
    }

    /// Bundle used by bundle-relative loads
    pub fn current_bundle(&self) -> String {
        self.current.borrow().clone()
    }

    /// Underlying loader
    pub fn assets(&self) -> &SharedAssets {
        &self.assets
    }

    /// Load an asset from the current bundle
    pub fn load_res(&self, path: &str, done: AssetCallback) {
        let bundle = self.current_bundle();
        self.assets.load_asset(&bundle, path, done);
    }

    /// Load a prefab from the current bundle
    pub fn load_prefab(&self, path: &str, done: PrefabCallback) {
        let bundle = self.current_bundle();
        self.assets.load_prefab(&bundle, path, done);
    }

    /// Load a directory from the current bundle
    pub fn load_dir(&self, dir: &str, done: DirCallback) {
        let bundle = self.current_bundle();
        self.assets.load_dir(&bundle, dir, done);
    }

    /// Load a directory from a named bundle
    pub fn load_bundle_dir(&self, bundle: &str, dir: &str, done: DirCallback) {
        self.assets.load_dir(bundle, dir, done);
    }

    /// Load a directory from the shared default bundle
    pub fn load_common_dir(&self, dir: &str, done: DirCallback) {
        self.assets.load_dir(&self.default_bundle, dir, done);
    }

    /// Path of a localized resource inside a language bundle
    ///
    /// Resources live under `<current bundle>/res/`; image kinds get their
    /// sub-asset suffix unless the path already names it.
    pub fn language_res_path(&self, path: &str, kind: ResKind) -> String {
        let mut url = format!("{}/res/{path}", self.current.borrow());
        if let Some(suffix) = kind.suffix() {
            if !path.split('/').any(|part| part == suffix) {
                url.push('/');
                url.push_str(suffix);
            }
        }
        url
    }

    /// Load a localized resource from the bundle named `language`
    pub fn load_language_res(&self, language: &str, path: &str, kind: ResKind, done: AssetCallback) {
        let url = self.language_res_path(path, kind);
        self.assets.load_asset(language, &url, done);
    }
}
