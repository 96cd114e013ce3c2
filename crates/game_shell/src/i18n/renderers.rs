//! Components that follow the active language

use super::I18n;
use crate::assets::{AssetHandle, SharedAssets};
use std::cell::RefCell;
use std::rc::Rc;

/// Something rendered from localized data
pub trait Localized {
    /// Inactive renderers are skipped by `update_scene_renderers`
    fn is_active(&self) -> bool {
        true
    }

    /// Re-render for the active language
    fn refresh(&mut self, i18n: &I18n);
}

/// Text looked up by key
#[derive(Debug, Clone)]
pub struct LocalizedLabel {
    key: String,
    text: String,
    active: bool,
}

impl LocalizedLabel {
    /// Label showing `key` until first refreshed
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            text: key.clone(),
            key,
            active: true,
        }
    }

    /// Wrap for registration with [`I18n::register_renderer`]
    pub fn shared(key: impl Into<String>) -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self::new(key)))
    }

    /// Change the key and re-render
    pub fn set_key(&mut self, key: impl Into<String>, i18n: &I18n) {
        self.key = key.into();
        self.refresh(i18n);
    }

    /// Displayed text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Toggle participation in scene refreshes
    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }
}

impl Localized for LocalizedLabel {
    fn is_active(&self) -> bool {
        self.active
    }

    fn refresh(&mut self, i18n: &I18n) {
        self.text = i18n.t(&self.key);
    }
}

/// Asset at a fixed path inside the bundle named after the active language
struct LanguageAsset {
    path: String,
    assets: SharedAssets,
    current: Rc<RefCell<Option<AssetHandle>>>,
}

impl LanguageAsset {
    fn new(path: String, assets: SharedAssets) -> Self {
        Self {
            path,
            assets,
            current: Rc::new(RefCell::new(None)),
        }
    }

    fn current(&self) -> Option<AssetHandle> {
        self.current.borrow().clone()
    }

    /// Swap in the asset from `language`; a failed load keeps the previous one
    fn load(&self, language: &str, kind: &'static str) {
        let current = self.current.clone();
        let assets = self.assets.clone();
        let path = self.path.clone();
        self.assets.load_asset(
            language,
            &self.path,
            Box::new(move |result| match result {
                Ok(handle) => {
                    let previous = current.borrow_mut().replace(handle.clone());
                    if let Some(previous) = previous.filter(|p| *p != handle) {
                        assets.release(&previous.path, &previous.bundle);
                    }
                }
                Err(error) => log::warn!("Localized {kind} {path} failed to load: {error}"),
            }),
        );
    }
}

/// Image loaded from the bundle named after the active language
pub struct LocalizedSprite {
    asset: LanguageAsset,
    active: bool,
}

impl LocalizedSprite {
    /// Sprite for `path` inside each language bundle
    pub fn new(path: impl Into<String>, assets: SharedAssets) -> Self {
        Self {
            asset: LanguageAsset::new(path.into(), assets),
            active: true,
        }
    }

    /// Currently displayed asset
    pub fn frame(&self) -> Option<AssetHandle> {
        self.asset.current()
    }

    /// Toggle participation in scene refreshes
    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }
}

impl Localized for LocalizedSprite {
    fn is_active(&self) -> bool {
        self.active
    }

    fn refresh(&mut self, i18n: &I18n) {
        self.asset.load(&i18n.language(), "sprite");
    }
}

/// Skeletal animation data loaded from the active language bundle
pub struct LocalizedSpine {
    asset: LanguageAsset,
    active: bool,
}

impl LocalizedSpine {
    /// Skeleton for `path` inside each language bundle
    pub fn new(path: impl Into<String>, assets: SharedAssets) -> Self {
        Self {
            asset: LanguageAsset::new(path.into(), assets),
            active: true,
        }
    }

    /// Currently bound skeleton data
    pub fn skeleton(&self) -> Option<AssetHandle> {
        self.asset.current()
    }

    /// Toggle participation in scene refreshes
    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }
}

impl Localized for LocalizedSpine {
    fn is_active(&self) -> bool {
        self.active
    }

    fn refresh(&mut self, i18n: &I18n) {
        self.asset.load(&i18n.language(), "skeleton");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{LoadMode, MemoryAssetLoader};
    use crate::core::config::I18nSettings;

    fn i18n() -> I18n {
        let i18n = I18n::new(I18nSettings::default());
        i18n.insert_language("main", "en", [("title", "Welcome")]);
        i18n.insert_language("main", "zh", [("title", "欢迎")]);
        i18n.init("en");
        i18n
    }

    #[test]
    fn test_label_follows_language() {
        let i18n = i18n();
        let label = LocalizedLabel::shared("title");
        i18n.register_renderer(&label);
        assert_eq!(label.borrow().text(), "Welcome");

        i18n.change_language("zh");
        assert_eq!(label.borrow().text(), "欢迎");
    }

    #[test]
    fn test_inactive_renderers_are_skipped() {
        let i18n = i18n();
        let label = LocalizedLabel::shared("title");
        i18n.register_renderer(&label);
        label.borrow_mut().set_active(false);

        assert_eq!(i18n.update_scene_renderers(), 0);
        i18n.change_language("zh");
        assert_eq!(label.borrow().text(), "Welcome");
    }

    #[test]
    fn test_dropped_renderers_are_pruned() {
        let i18n = i18n();
        let kept = LocalizedLabel::shared("title");
        i18n.register_renderer(&kept);
        {
            let temporary = LocalizedLabel::shared("title");
            i18n.register_renderer(&temporary);
            assert_eq!(i18n.renderer_count(), 2);
        }
        assert_eq!(i18n.update_scene_renderers(), 1);
        assert_eq!(i18n.renderer_count(), 1);
    }

    #[test]
    fn test_sprite_loads_from_language_bundle() {
        let i18n = i18n();
        let loader = MemoryAssetLoader::shared(LoadMode::Immediate);
        loader.register_asset("en", "textures/logo");
        loader.register_asset("zh", "textures/logo");
        let assets: SharedAssets = loader.clone();

        let sprite = Rc::new(RefCell::new(LocalizedSprite::new("textures/logo", assets)));
        i18n.register_renderer(&sprite);
        assert_eq!(sprite.borrow().frame().map(|f| f.bundle), Some("en".to_string()));

        i18n.change_language("zh");
        assert_eq!(sprite.borrow().frame().map(|f| f.bundle), Some("zh".to_string()));
        assert_eq!(loader.release_count("en", "textures/logo"), 1);
    }

    #[test]
    fn test_sprite_keeps_frame_when_language_missing() {
        let i18n = i18n();
        let loader = MemoryAssetLoader::shared(LoadMode::Immediate);
        loader.register_asset("en", "textures/logo");
        let assets: SharedAssets = loader.clone();

        let sprite = Rc::new(RefCell::new(LocalizedSprite::new("textures/logo", assets)));
        i18n.register_renderer(&sprite);
        i18n.change_language("zh");
        assert_eq!(sprite.borrow().frame().map(|f| f.bundle), Some("en".to_string()));
    }

    #[test]
    fn test_spine_swaps_skeleton_per_language() {
        let i18n = i18n();
        let loader = MemoryAssetLoader::shared(LoadMode::Deferred);
        loader.register_asset("en", "spine/hero");
        loader.register_asset("zh", "spine/hero");
        let assets: SharedAssets = loader.clone();

        let spine = Rc::new(RefCell::new(LocalizedSpine::new("spine/hero", assets)));
        i18n.register_renderer(&spine);
        assert!(spine.borrow().skeleton().is_none());
        loader.complete_all();
        assert_eq!(spine.borrow().skeleton().map(|s| s.bundle), Some("en".to_string()));

        spine.borrow_mut().set_active(false);
        i18n.change_language("zh");
        assert_eq!(loader.complete_all(), 0);

        spine.borrow_mut().set_active(true);
        i18n.update_scene_renderers();
        loader.complete_all();
        assert_eq!(spine.borrow().skeleton().map(|s| s.bundle), Some("zh".to_string()));
        assert_eq!(loader.release_count("en", "spine/hero"), 1);
    }
}
