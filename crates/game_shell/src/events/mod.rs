//! Process-wide synchronous event bus
//!
//! Key behaviors:
//! - Listeners are bound to an event name together with a scope
//! - Dispatch runs a snapshot of the bindings taken before the first listener
//!   is called; bindings added or removed during dispatch take effect on the
//!   next dispatch only
//! - `once` bindings unregister themselves before their body runs, so a
//!   re-entrant dispatch of the same event cannot fire them twice
//! - Registering the same (listener, scope) pair twice logs a warning but
//!   still registers it

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

/// Well-known event names
pub struct EventMessage;

impl EventMessage {
    /// Game came back from background
    pub const GAME_SHOW: &'static str = "GAME_ENTER";
    /// Game went to background
    pub const GAME_HIDE: &'static str = "GAME_EXIT";
    /// Canvas size changed
    pub const GAME_RESIZE: &'static str = "GAME_RESIZE";
    /// Entered full screen
    pub const GAME_FULL_SCREEN: &'static str = "GAME_FULL_SCREEN";
    /// Screen orientation changed
    pub const GAME_ORIENTATION: &'static str = "GAME_ORIENTATION";
    /// Active language changed; argument is the new language
    pub const LANGUAGE_CHANGED: &'static str = "LANGUAGE_CHANGED";
    /// An entry became current; argument is its bundle name
    pub const ENTRY_ENTER: &'static str = "ENTRY_ENTER";
}

/// Event argument value
#[derive(Clone)]
pub enum EventArg {
    /// Text
    Str(String),
    /// Integer
    Int(i64),
    /// Floating point
    Float(f64),
    /// Flag
    Bool(bool),
    /// Arbitrary payload, recovered with [`EventArg::downcast`]
    Any(Rc<dyn Any>),
}

impl EventArg {
    /// Text value, if this is a string argument
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Integer value, if this is an integer argument
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Typed view of an `Any` payload
    pub fn downcast<T: Any>(&self) -> Option<&T> {
        match self {
            Self::Any(value) => value.downcast_ref(),
            _ => None,
        }
    }
}

impl fmt::Debug for EventArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => write!(f, "Str({s:?})"),
            Self::Int(v) => write!(f, "Int({v})"),
            Self::Float(v) => write!(f, "Float({v})"),
            Self::Bool(v) => write!(f, "Bool({v})"),
            Self::Any(_) => f.write_str("Any(..)"),
        }
    }
}

impl From<&str> for EventArg {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for EventArg {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<i64> for EventArg {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<bool> for EventArg {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// Event listener: receives the event name and its arguments
pub type Listener = Rc<dyn Fn(&str, &[EventArg])>;

/// Owner identity of a binding; `off` matches on (listener, scope)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(u64);

static NEXT_SCOPE: AtomicU64 = AtomicU64::new(1);

impl ScopeId {
    /// Scope for bindings that belong to no particular owner
    pub const GLOBAL: Self = Self(0);

    /// Allocate a fresh, unique scope
    pub fn unique() -> Self {
        Self(NEXT_SCOPE.fetch_add(1, Ordering::Relaxed))
    }
}

/// Identifies one registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BindingId(u64);

#[derive(Clone)]
struct EventBinding {
    id: BindingId,
    listener: Listener,
    scope: ScopeId,
}

fn same_listener(a: &Listener, b: &Listener) -> bool {
    std::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b))
}

#[derive(Default)]
struct MessageInner {
    events: RefCell<HashMap<String, Vec<EventBinding>>>,
    next_binding: Cell<u64>,
}

/// Global message bus
///
/// Cheap to clone; clones share the same bindings.
#[derive(Clone, Default)]
pub struct MessageManager {
    inner: Rc<MessageInner>,
}

impl MessageManager {
    /// Create an empty bus
    pub fn new() -> Self {
        Self::default()
    }

    fn downgrade(&self) -> Weak<MessageInner> {
        Rc::downgrade(&self.inner)
    }

    /// Register `listener` for `event`
    ///
    /// Returns `None` when the event name is empty.
    pub fn on(&self, event: &str, listener: Listener, scope: ScopeId) -> Option<BindingId> {
        if event.is_empty() {
            log::warn!("Listener registration for an empty event name ignored");
            return None;
        }

        let id = BindingId(self.inner.next_binding.get() + 1);
        self.inner.next_binding.set(id.0);

        let mut events = self.inner.events.borrow_mut();
        let bindings = events.entry(event.to_string()).or_default();
        if bindings
            .iter()
            .any(|b| b.scope == scope && same_listener(&b.listener, &listener))
        {
            log::warn!("Event '{event}' registered the same listener twice");
        }
        bindings.push(EventBinding { id, listener, scope });
        Some(id)
    }

    /// Register a closure for `event`
    pub fn on_fn<F>(&self, event: &str, listener: F, scope: ScopeId) -> Option<BindingId>
    where
        F: Fn(&str, &[EventArg]) + 'static,
    {
        self.on(event, Rc::new(listener), scope)
    }

    /// Register `listener` for a single delivery of `event`
    pub fn once(&self, event: &str, listener: Listener, scope: ScopeId) -> Option<BindingId> {
        let slot: Rc<Cell<Option<BindingId>>> = Rc::new(Cell::new(None));
        let own_slot = slot.clone();
        let bus = self.downgrade();
        let event_name = event.to_string();

        let wrapper: Listener = Rc::new(move |name: &str, args: &[EventArg]| {
            let Some(id) = own_slot.take() else {
                return;
            };
            if let Some(inner) = bus.upgrade() {
                Self { inner }.off_binding(&event_name, id);
            }
            listener(name, args);
        });

        let id = self.on(event, wrapper, scope)?;
        slot.set(Some(id));
        Some(id)
    }

    /// Remove the first binding matching (listener, scope)
    pub fn off(&self, event: &str, listener: &Listener, scope: ScopeId) -> bool {
        self.remove_where(event, |b| b.scope == scope && same_listener(&b.listener, listener))
    }

    /// Remove a binding by id
    pub fn off_binding(&self, event: &str, id: BindingId) -> bool {
        self.remove_where(event, |b| b.id == id)
    }

    /// Remove every binding owned by `scope`, across all events
    pub fn off_scope(&self, scope: ScopeId) -> usize {
        let mut events = self.inner.events.borrow_mut();
        let mut removed = 0;
        events.retain(|_, bindings| {
            let before = bindings.len();
            bindings.retain(|b| b.scope != scope);
            removed += before - bindings.len();
            !bindings.is_empty()
        });
        removed
    }

    fn remove_where(&self, event: &str, matches: impl Fn(&EventBinding) -> bool) -> bool {
        let mut events = self.inner.events.borrow_mut();
        let Some(bindings) = events.get_mut(event) else {
            log::debug!("Event '{event}' has no listeners");
            return false;
        };

        let removed = bindings
            .iter()
            .position(matches)
            .map(|index| bindings.remove(index))
            .is_some();

        if bindings.is_empty() {
            events.remove(event);
        }
        removed
    }

    /// Deliver `event` to every listener bound when the call starts
    ///
    /// Returns how many listeners were invoked.
    pub fn dispatch_event(&self, event: &str, args: &[EventArg]) -> usize {
        let snapshot: Vec<Listener> = match self.inner.events.borrow().get(event) {
            Some(bindings) => bindings.iter().map(|b| b.listener.clone()).collect(),
            None => return 0,
        };

        for listener in &snapshot {
            listener(event, args);
        }
        snapshot.len()
    }

    /// Whether any listener is bound to `event`
    pub fn has_event(&self, event: &str) -> bool {
        self.inner.events.borrow().contains_key(event)
    }

    /// Number of bindings for `event`
    pub fn listener_count(&self, event: &str) -> usize {
        self.inner
            .events
            .borrow()
            .get(event)
            .map_or(0, Vec::len)
    }
}

/// Batch registration helper
///
/// Remembers the bindings it created so an owner can drop all of them at once.
pub struct MessageEventData {
    bus: MessageManager,
    scope: ScopeId,
    events: HashMap<String, Vec<BindingId>>,
}

impl MessageEventData {
    /// Create a helper registering on `bus` under a fresh scope
    pub fn new(bus: &MessageManager) -> Self {
        Self {
            bus: bus.clone(),
            scope: ScopeId::unique(),
            events: HashMap::new(),
        }
    }

    /// Scope used for every registration made through this helper
    pub const fn scope(&self) -> ScopeId {
        self.scope
    }

    /// Register a listener and remember the binding
    pub fn on(&mut self, event: &str, listener: Listener) {
        if let Some(id) = self.bus.on(event, listener, self.scope) {
            self.events.entry(event.to_string()).or_default().push(id);
        }
    }

    /// Remove every binding this helper made for `event`
    pub fn off(&mut self, event: &str) {
        if let Some(ids) = self.events.remove(event) {
            for id in ids {
                self.bus.off_binding(event, id);
            }
        }
    }

    /// Dispatch through the underlying bus
    pub fn dispatch_event(&self, event: &str, args: &[EventArg]) -> usize {
        self.bus.dispatch_event(event, args)
    }

    /// Remove every binding this helper made
    pub fn clear(&mut self) {
        let events: Vec<String> = self.events.keys().cloned().collect();
        for event in events {
            self.off(&event);
        }
    }
}

impl Drop for MessageEventData {
    fn drop(&mut self) {
        self.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counter() -> (Rc<Cell<usize>>, Listener) {
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        (count, Rc::new(move |_: &str, _: &[EventArg]| c.set(c.get() + 1)))
    }

    #[test]
    fn test_dispatch_reaches_all_listeners() {
        let bus = MessageManager::new();
        let (a, listener_a) = counter();
        let (b, listener_b) = counter();
        bus.on("score", listener_a, ScopeId::GLOBAL);
        bus.on("score", listener_b, ScopeId::GLOBAL);

        assert_eq!(bus.dispatch_event("score", &[EventArg::Int(3)]), 2);
        assert_eq!((a.get(), b.get()), (1, 1));
        assert_eq!(bus.dispatch_event("unknown", &[]), 0);
    }

    #[test]
    fn test_arguments_are_delivered() {
        let bus = MessageManager::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        bus.on_fn(
            "login",
            move |event, args| {
                sink.borrow_mut().push(format!("{event}:{}", args[0].as_str().unwrap_or("")));
            },
            ScopeId::GLOBAL,
        );
        bus.dispatch_event("login", &["alice".into()]);
        assert_eq!(*seen.borrow(), vec!["login:alice".to_string()]);
    }

    #[test]
    fn test_duplicate_registration_still_registers() {
        let bus = MessageManager::new();
        let (count, listener) = counter();
        let scope = ScopeId::unique();
        bus.on("tick", listener.clone(), scope);
        bus.on("tick", listener.clone(), scope);

        assert_eq!(bus.listener_count("tick"), 2);
        bus.dispatch_event("tick", &[]);
        assert_eq!(count.get(), 2);

        assert!(bus.off("tick", &listener, scope));
        assert_eq!(bus.listener_count("tick"), 1);
    }

    #[test]
    fn test_off_last_listener_removes_event_key() {
        let bus = MessageManager::new();
        let (_, listener) = counter();
        bus.on("tick", listener.clone(), ScopeId::GLOBAL);
        assert!(bus.has_event("tick"));

        assert!(bus.off("tick", &listener, ScopeId::GLOBAL));
        assert!(!bus.has_event("tick"));
        assert!(!bus.off("tick", &listener, ScopeId::GLOBAL));
    }

    #[test]
    fn test_off_requires_matching_scope() {
        let bus = MessageManager::new();
        let (_, listener) = counter();
        bus.on("tick", listener.clone(), ScopeId::unique());
        assert!(!bus.off("tick", &listener, ScopeId::GLOBAL));
        assert_eq!(bus.listener_count("tick"), 1);
    }

    #[test]
    fn test_once_fires_once_under_reentrant_dispatch() {
        let bus = MessageManager::new();
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        let inner_bus = bus.clone();
        bus.once(
            "boom",
            Rc::new(move |event: &str, _: &[EventArg]| {
                c.set(c.get() + 1);
                inner_bus.dispatch_event(event, &[]);
            }),
            ScopeId::GLOBAL,
        );

        bus.dispatch_event("boom", &[]);
        bus.dispatch_event("boom", &[]);
        assert_eq!(count.get(), 1);
        assert!(!bus.has_event("boom"));
    }

    #[test]
    fn test_listener_added_during_dispatch_runs_next_time() {
        let bus = MessageManager::new();
        let (late, late_listener) = counter();
        let registrar = bus.clone();
        let added = Cell::new(false);
        bus.on_fn(
            "wave",
            move |_, _| {
                if !added.replace(true) {
                    registrar.on("wave", late_listener.clone(), ScopeId::GLOBAL);
                }
            },
            ScopeId::GLOBAL,
        );

        assert_eq!(bus.dispatch_event("wave", &[]), 1);
        assert_eq!(late.get(), 0);
        assert_eq!(bus.dispatch_event("wave", &[]), 2);
        assert_eq!(late.get(), 1);
    }

    #[test]
    fn test_listener_removed_during_dispatch_still_runs_in_snapshot() {
        let bus = MessageManager::new();
        let (second_count, second) = counter();
        let remover = bus.clone();
        let target = second.clone();
        bus.on_fn(
            "wave",
            move |_, _| {
                remover.off("wave", &target, ScopeId::GLOBAL);
            },
            ScopeId::GLOBAL,
        );
        bus.on("wave", second, ScopeId::GLOBAL);

        bus.dispatch_event("wave", &[]);
        assert_eq!(second_count.get(), 1);
        bus.dispatch_event("wave", &[]);
        assert_eq!(second_count.get(), 1);
    }

    #[test]
    fn test_off_scope_removes_across_events() {
        let bus = MessageManager::new();
        let scope = ScopeId::unique();
        let (_, a) = counter();
        let (_, b) = counter();
        bus.on("a", a, scope);
        bus.on("b", b.clone(), scope);
        bus.on("b", b, ScopeId::GLOBAL);

        assert_eq!(bus.off_scope(scope), 2);
        assert!(!bus.has_event("a"));
        assert_eq!(bus.listener_count("b"), 1);
    }

    #[test]
    fn test_empty_event_name_is_rejected() {
        let bus = MessageManager::new();
        let (_, listener) = counter();
        assert!(bus.on("", listener, ScopeId::GLOBAL).is_none());
    }

    #[test]
    fn test_event_data_clears_its_own_bindings() {
        let bus = MessageManager::new();
        let (_, other) = counter();
        bus.on("shared", other, ScopeId::GLOBAL);

        let mut data = MessageEventData::new(&bus);
        let (count, listener) = counter();
        data.on("shared", listener.clone());
        data.on("private", listener);
        assert_eq!(data.dispatch_event("shared", &[]), 2);
        assert_eq!(count.get(), 1);

        data.clear();
        assert_eq!(bus.listener_count("shared"), 1);
        assert!(!bus.has_event("private"));
    }
}
