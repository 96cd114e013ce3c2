//! Shared confirm / cancel prompt window

use super::{UiManager, ViewParams, WeakUiManager, WindowComponent};
use crate::foundation::collections::NodeId;
use crate::foundation::logging::TARGET_VIEW;
use crate::i18n::{I18n, LocalizedLabel};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Button action of a prompt
pub type PromptAction = Rc<dyn Fn()>;

/// Arguments of a prompt window, passed as its `UiArgs`
///
/// Every text is a localization key.
#[derive(Clone)]
pub struct PromptOptions {
    /// Title key
    pub title: String,
    /// Body key
    pub content: String,
    /// Confirm button key
    pub ok_word: String,
    /// Cancel button key
    pub cancel_word: String,
    /// Whether the cancel button is shown
    pub need_cancel: bool,
    /// Runs before closing on confirm
    pub on_ok: Option<PromptAction>,
    /// Runs before closing on cancel
    pub on_cancel: Option<PromptAction>,
    /// Runs before closing through the close button
    pub on_close: Option<PromptAction>,
}

impl Default for PromptOptions {
    fn default() -> Self {
        Self {
            title: String::new(),
            content: String::new(),
            ok_word: "common_prompt_ok".to_string(),
            cancel_word: "common_prompt_cancel".to_string(),
            need_cancel: false,
            on_ok: None,
            on_cancel: None,
            on_close: None,
        }
    }
}

impl PromptOptions {
    /// Prompt with a title and body, confirm button only
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            ..Self::default()
        }
    }

    /// Confirm action
    #[must_use]
    pub fn on_ok(mut self, action: impl Fn() + 'static) -> Self {
        self.on_ok = Some(Rc::new(action));
        self
    }

    /// Show the cancel button with this action
    #[must_use]
    pub fn on_cancel(mut self, action: impl Fn() + 'static) -> Self {
        self.need_cancel = true;
        self.on_cancel = Some(Rc::new(action));
        self
    }

    /// Close button action
    #[must_use]
    pub fn on_close(mut self, action: impl Fn() + 'static) -> Self {
        self.on_close = Some(Rc::new(action));
        self
    }

    /// Override the button keys
    #[must_use]
    pub fn with_words(mut self, ok: impl Into<String>, cancel: impl Into<String>) -> Self {
        self.ok_word = ok.into();
        self.cancel_word = cancel.into();
        self
    }
}

impl fmt::Debug for PromptOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PromptOptions")
            .field("title", &self.title)
            .field("content", &self.content)
            .field("need_cancel", &self.need_cancel)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Copy)]
enum Button {
    Ok,
    Cancel,
    Close,
}

struct PromptState {
    gui: WeakUiManager,
    i18n: I18n,
    title: Rc<RefCell<LocalizedLabel>>,
    content: Rc<RefCell<LocalizedLabel>>,
    ok: Rc<RefCell<LocalizedLabel>>,
    cancel: Rc<RefCell<LocalizedLabel>>,
    options: Option<PromptOptions>,
    node: Option<NodeId>,
}

/// Window component showing localized title, body and buttons
///
/// Clones share one prompt, so the host can keep a handle to press buttons
/// while the window owns the component. Pressing any button runs its action
/// and then removes the window through [`UiManager::remove_by_node`].
#[derive(Clone)]
pub struct CommonPrompt {
    inner: Rc<RefCell<PromptState>>,
}

impl CommonPrompt {
    /// Prompt whose labels follow `i18n` and which closes itself through `gui`
    pub fn new(gui: &UiManager, i18n: &I18n) -> Self {
        let labels = [(); 4].map(|()| LocalizedLabel::shared(""));
        for label in &labels {
            i18n.register_renderer(label);
        }
        let [title, content, ok, cancel] = labels;
        Self {
            inner: Rc::new(RefCell::new(PromptState {
                gui: gui.downgrade(),
                i18n: i18n.clone(),
                title,
                content,
                ok,
                cancel,
                options: None,
                node: None,
            })),
        }
    }

    /// Rendered title
    pub fn title(&self) -> String {
        self.inner.borrow().title.borrow().text().to_string()
    }

    /// Rendered body
    pub fn content(&self) -> String {
        self.inner.borrow().content.borrow().text().to_string()
    }

    /// Rendered confirm button text
    pub fn ok_text(&self) -> String {
        self.inner.borrow().ok.borrow().text().to_string()
    }

    /// Rendered cancel button text
    pub fn cancel_text(&self) -> String {
        self.inner.borrow().cancel.borrow().text().to_string()
    }

    /// Whether the cancel button is visible
    pub fn cancel_visible(&self) -> bool {
        self.inner
            .borrow()
            .options
            .as_ref()
            .is_some_and(|options| options.need_cancel)
    }

    /// Whether the prompt is on stage
    pub fn is_open(&self) -> bool {
        self.inner.borrow().node.is_some()
    }

    /// Confirm button
    pub fn ok(&self) {
        self.press(Button::Ok);
    }

    /// Cancel button
    pub fn cancel(&self) {
        self.press(Button::Cancel);
    }

    /// Close button
    pub fn close(&self) {
        self.press(Button::Close);
    }

    fn press(&self, button: Button) {
        let (action, node, gui) = {
            let state = self.inner.borrow();
            let action = state.options.as_ref().and_then(|options| match button {
                Button::Ok => options.on_ok.clone(),
                Button::Cancel => options.on_cancel.clone(),
                Button::Close => options.on_close.clone(),
            });
            (action, state.node, state.gui.upgrade())
        };
        let Some(node) = node else {
            log::warn!(target: TARGET_VIEW, "Prompt button pressed while closed");
            return;
        };
        if let Some(action) = action {
            action();
        }
        if let Some(gui) = gui {
            gui.remove_by_node(node, true);
        }
    }
}

impl WindowComponent for CommonPrompt {
    fn on_added(&mut self, params: &ViewParams) -> bool {
        let options = params.args.get::<PromptOptions>().cloned().unwrap_or_default();
        let mut state = self.inner.borrow_mut();
        let i18n = state.i18n.clone();
        state.title.borrow_mut().set_key(options.title.as_str(), &i18n);
        state.content.borrow_mut().set_key(options.content.as_str(), &i18n);
        state.ok.borrow_mut().set_key(options.ok_word.as_str(), &i18n);
        state.cancel.borrow_mut().set_key(options.cancel_word.as_str(), &i18n);
        state.options = Some(options);
        state.node = params.node;
        true
    }

    fn on_removed(&mut self, _params: &ViewParams) {
        let mut state = self.inner.borrow_mut();
        state.options = None;
        state.node = None;
    }
}
