//! Window lifecycle scenarios against the in-memory host

use super::*;
use crate::assets::{LoadMode, MemoryAssetLoader, Prefab, SharedAssets};
use crate::core::config::UiSettings;
use crate::foundation::collections::NodeId;
use crate::scene::{MemoryScene, SceneHost, SharedScene};
use std::cell::{Cell, RefCell};
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::sync::Arc;
use std::task::{Context, Poll, Wake, Waker};

type EventLog = Rc<RefCell<Vec<String>>>;

struct Recorder {
    name: String,
    log: EventLog,
    accept: bool,
}

impl WindowComponent for Recorder {
    fn on_added(&mut self, _params: &ViewParams) -> bool {
        self.log.borrow_mut().push(format!("{}:added", self.name));
        self.accept
    }

    fn on_before_remove(&mut self, _params: &ViewParams) {
        self.log.borrow_mut().push(format!("{}:before_remove", self.name));
    }

    fn on_removed(&mut self, _params: &ViewParams) {
        self.log.borrow_mut().push(format!("{}:removed", self.name));
    }
}

fn recorded_prefab(name: &str, log: &EventLog, refusing: Option<&'static str>) -> Prefab {
    let log = log.clone();
    let prefix = name.to_string();
    Prefab::with_components(name, move || {
        ["a", "b", "c"]
            .iter()
            .map(|part| {
                Box::new(Recorder {
                    name: format!("{prefix}.{part}"),
                    log: log.clone(),
                    accept: refusing != Some(*part),
                }) as Box<dyn WindowComponent>
            })
            .collect()
    })
}

struct Fixture {
    scene: Rc<RefCell<MemoryScene>>,
    loader: Rc<MemoryAssetLoader>,
    gui: UiManager,
    log: EventLog,
}

impl Fixture {
    fn new(mode: LoadMode) -> Self {
        let scene = MemoryScene::shared();
        let loader = MemoryAssetLoader::shared(LoadMode::Immediate);
        let log: EventLog = Rc::new(RefCell::new(Vec::new()));

        let shared_scene: SharedScene = scene.clone();
        let shared_assets: SharedAssets = loader.clone();
        let gui = UiManager::new(UiSettings::default(), shared_scene, shared_assets);
        let root = scene.borrow_mut().create_node("Canvas");
        gui.init(root);

        gui.init_config(
            &WindowConfigTable::new()
                .with("shop", WindowConfig::new(layer_type::UI, "gui/shop"))
                .with("bag", WindowConfig::new(layer_type::UI, "gui/bag"))
                .with("keep", WindowConfig::new(layer_type::UI, "gui/keep").with_destroy(false))
                .with("broken", WindowConfig::new(layer_type::UI, "gui/broken"))
                .with("tips", WindowConfig::new(layer_type::POPUP, "gui/tips"))
                .with(
                    "reward",
                    WindowConfig::new(layer_type::POPUP, "gui/reward")
                        .with_mask()
                        .with_vacancy(),
                )
                .with("alert", WindowConfig::new(layer_type::DIALOG, "gui/alert"))
                .with("confirm", WindowConfig::new(layer_type::DIALOG, "gui/confirm"))
                .with("lost", WindowConfig::new("LayerMissing", "gui/lost")),
        );

        for name in ["shop", "bag", "keep", "tips", "reward", "alert", "confirm"] {
            loader.register_prefab("resources", &format!("gui/{name}"), recorded_prefab(name, &log, None));
        }
        loader.register_prefab("resources", "gui/broken", recorded_prefab("broken", &log, Some("b")));
        loader.register_prefab("resources", "common/prefab/mask", Prefab::new("mask"));
        loader.register_prefab("resources", "common/prefab/notify", Prefab::new("toast"));
        loader.register_prefab("resources", "common/prefab/wait", Prefab::new("wait"));
        loader.set_mode(mode);

        Self {
            scene,
            loader,
            gui,
            log,
        }
    }

    fn events(&self) -> Vec<String> {
        self.log.borrow().clone()
    }

    fn layer(&self, name: &str) -> Rc<Layer> {
        self.gui.layer(name).unwrap()
    }
}

struct NoopWake;

impl Wake for NoopWake {
    fn wake(self: Arc<Self>) {}
}

#[test]
fn test_open_attaches_and_notifies_in_order() {
    let f = Fixture::new(LoadMode::Immediate);
    let added: Rc<Cell<Option<(NodeId, Option<u32>)>>> = Rc::new(Cell::new(None));
    let sink = added.clone();
    f.gui.open(
        "shop",
        UiArgs::new(7_u32),
        UiCallbacks::new().on_added(move |node, args| sink.set(Some((node, args.get::<u32>().copied())))),
    );

    let node = f.gui.get("shop").unwrap();
    assert_eq!(added.get(), Some((node, Some(7))));
    assert_eq!(f.scene.borrow().parent(node), Some(f.layer(layer_type::UI).node()));
    assert_eq!(f.events(), vec!["shop.a:added", "shop.b:added", "shop.c:added"]);
}

#[test]
fn test_missing_config_or_layer_is_a_no_op() {
    let f = Fixture::new(LoadMode::Immediate);
    let nodes_before = f.scene.borrow().node_count();

    f.gui.open("nope", UiArgs::none(), UiCallbacks::new());
    assert!(!f.gui.has("nope"));
    assert!(f.gui.get("nope").is_none());
    f.gui.remove("nope", true);

    let mut handle = f.gui.open_async("nope", UiArgs::none());
    assert_eq!(handle.try_result(), OpenResult::Failed);

    let mut lost = f.gui.open_async("lost", UiArgs::none());
    assert_eq!(lost.try_result(), OpenResult::Failed);
    assert!(!f.gui.has("lost"));
    assert_eq!(f.scene.borrow().node_count(), nodes_before);
}

#[test]
fn test_open_async_resolves_for_synchronous_open() {
    let f = Fixture::new(LoadMode::Immediate);
    let mut handle = f.gui.open_async("shop", UiArgs::none());
    let node = f.gui.get("shop").unwrap();
    assert_eq!(handle.try_result(), OpenResult::Opened(node));
    assert_eq!(handle.try_result(), OpenResult::Opened(node));
}

#[test]
fn test_open_async_waits_for_deferred_load() {
    let f = Fixture::new(LoadMode::Deferred);
    let mut handle = f.gui.open_async("shop", UiArgs::none());
    assert_eq!(handle.try_result(), OpenResult::Pending);
    assert!(f.gui.has("shop"));
    assert!(f.gui.get("shop").is_none());

    assert!(f.loader.complete_next());
    let node = f.gui.get("shop").unwrap();
    assert_eq!(handle.try_result(), OpenResult::Opened(node));
}

#[test]
fn test_open_handle_as_future() {
    let f = Fixture::new(LoadMode::Deferred);
    let mut handle = f.gui.open_async("shop", UiArgs::none());
    let waker = Waker::from(Arc::new(NoopWake));
    let mut cx = Context::from_waker(&waker);

    assert!(Pin::new(&mut handle).poll(&mut cx).is_pending());
    f.loader.complete_next();
    match Pin::new(&mut handle).poll(&mut cx) {
        Poll::Ready(Some(node)) => assert_eq!(Some(node), f.gui.get("shop")),
        other => panic!("unexpected poll result {other:?}"),
    }
}

#[test]
fn test_duplicate_open_while_loading_loads_once() {
    let f = Fixture::new(LoadMode::Deferred);
    let mut first = f.gui.open_async("shop", UiArgs::none());
    let mut second = f.gui.open_async("shop", UiArgs::none());

    assert_eq!(second.try_result(), OpenResult::Failed);
    assert_eq!(f.loader.load_count("resources", "gui/shop"), 1);

    f.loader.complete_all();
    assert!(matches!(first.try_result(), OpenResult::Opened(_)));
    assert_eq!(f.layer(layer_type::UI).open_ids(), vec!["shop".to_string()]);
}

#[test]
fn test_duplicate_open_of_visible_window_is_ignored() {
    let f = Fixture::new(LoadMode::Immediate);
    f.gui.open("shop", UiArgs::none(), UiCallbacks::new());
    let mut again = f.gui.open_async("shop", UiArgs::none());
    assert_eq!(again.try_result(), OpenResult::Failed);
    assert_eq!(f.events().len(), 3);
}

#[test]
fn test_remove_without_destroy_caches_for_reuse() {
    let f = Fixture::new(LoadMode::Immediate);
    f.gui.open("shop", UiArgs::none(), UiCallbacks::new());
    let node = f.gui.get("shop").unwrap();
    let layer = f.layer(layer_type::UI);

    f.gui.remove("shop", false);
    assert!(!f.gui.has("shop"));
    assert!(layer.is_cached("shop"));
    assert!(f.scene.borrow().is_valid(node));
    assert_eq!(f.scene.borrow().parent(node), None);

    f.gui.open("shop", UiArgs::none(), UiCallbacks::new());
    assert_eq!(f.gui.get("shop"), Some(node));
    assert!(!layer.is_cached("shop"));
    assert_eq!(f.loader.load_count("resources", "gui/shop"), 1);
    assert_eq!(f.events().iter().filter(|e| *e == "shop.a:added").count(), 2);

    f.gui.remove("shop", true);
    assert!(!f.scene.borrow().is_valid(node));
    assert!(!layer.is_cached("shop"));
    assert_eq!(f.loader.release_count("resources", "gui/shop"), 1);
}

#[test]
fn test_config_destroy_flag_overrides_caller() {
    let f = Fixture::new(LoadMode::Immediate);
    f.gui.open("keep", UiArgs::none(), UiCallbacks::new());
    f.gui.remove("keep", true);
    assert!(f.layer(layer_type::UI).is_cached("keep"));
    assert_eq!(f.loader.release_count("resources", "gui/keep"), 0);

    assert!(f.gui.remove_cache("keep"));
    assert!(!f.layer(layer_type::UI).is_cached("keep"));
    assert_eq!(f.loader.release_count("resources", "gui/keep"), 1);
}

#[test]
fn test_destroying_remove_purges_cached_window() {
    let f = Fixture::new(LoadMode::Immediate);
    let layer = f.layer(layer_type::UI);
    f.gui.open("shop", UiArgs::none(), UiCallbacks::new());
    let node = f.gui.get("shop").unwrap();

    f.gui.remove("shop", false);
    assert!(layer.is_cached("shop"));
    f.gui.remove("shop", false);
    assert!(layer.is_cached("shop"));

    f.gui.remove("shop", true);
    assert!(!layer.is_cached("shop"));
    assert!(!f.scene.borrow().is_valid(node));
    assert_eq!(f.loader.release_count("resources", "gui/shop"), 1);
}

#[test]
fn test_remove_by_node_reaches_cached_window() {
    let f = Fixture::new(LoadMode::Immediate);
    let layer = f.layer(layer_type::UI);
    f.gui.open("bag", UiArgs::none(), UiCallbacks::new());
    let node = f.gui.get("bag").unwrap();
    f.gui.remove("bag", false);
    assert_eq!(layer.id_of(node), Some("bag".to_string()));

    f.gui.remove_by_node(node, true);
    assert!(!layer.is_cached("bag"));
    assert!(!f.scene.borrow().is_valid(node));
    assert_eq!(f.loader.release_count("resources", "gui/bag"), 1);
}

#[test]
fn test_remove_runs_hooks_in_order() {
    let f = Fixture::new(LoadMode::Immediate);
    let before_log = f.log.clone();
    let removed_log = f.log.clone();
    let removed_node: Rc<Cell<Option<Option<NodeId>>>> = Rc::new(Cell::new(None));
    let removed_sink = removed_node.clone();
    f.gui.open(
        "shop",
        UiArgs::none(),
        UiCallbacks::new()
            .on_before_remove(move |_, next| {
                before_log.borrow_mut().push("caller:before_remove".to_string());
                next.proceed();
            })
            .on_removed(move |node, _| {
                removed_log.borrow_mut().push("caller:removed".to_string());
                removed_sink.set(Some(node));
            }),
    );
    f.log.borrow_mut().clear();

    f.gui.remove("shop", true);
    assert_eq!(
        f.events(),
        vec![
            "shop.a:before_remove",
            "shop.b:before_remove",
            "shop.c:before_remove",
            "caller:before_remove",
            "shop.a:removed",
            "shop.b:removed",
            "shop.c:removed",
            "caller:removed",
        ]
    );
    assert_eq!(removed_node.get(), Some(None));
}

#[test]
fn test_before_remove_continuation_delays_teardown() {
    let f = Fixture::new(LoadMode::Immediate);
    let pending: Rc<RefCell<Option<RemoveContinuation>>> = Rc::new(RefCell::new(None));
    let sink = pending.clone();
    let removed = Rc::new(Cell::new(false));
    let removed_flag = removed.clone();
    f.gui.open(
        "shop",
        UiArgs::none(),
        UiCallbacks::new()
            .on_before_remove(move |_, next| *sink.borrow_mut() = Some(next))
            .on_removed(move |_, _| removed_flag.set(true)),
    );
    let node = f.gui.get("shop").unwrap();

    f.gui.remove("shop", true);
    assert!(f.gui.has("shop"));
    assert!(f.scene.borrow().is_valid(node));
    assert!(!removed.get());

    let next = pending.borrow_mut().take().unwrap();
    assert_eq!(next.window_id(), "shop");
    next.proceed();
    assert!(!f.gui.has("shop"));
    assert!(!f.scene.borrow().is_valid(node));
    assert!(removed.get());
}

#[test]
fn test_second_remove_skips_before_remove_phase() {
    let f = Fixture::new(LoadMode::Immediate);
    let pending: Rc<RefCell<Option<RemoveContinuation>>> = Rc::new(RefCell::new(None));
    let sink = pending.clone();
    let removed_count = Rc::new(Cell::new(0));
    let counter = removed_count.clone();
    f.gui.open(
        "shop",
        UiArgs::none(),
        UiCallbacks::new()
            .on_before_remove(move |_, next| *sink.borrow_mut() = Some(next))
            .on_removed(move |_, _| counter.set(counter.get() + 1)),
    );
    f.log.borrow_mut().clear();

    f.gui.remove("shop", true);
    f.gui.remove("shop", true);
    assert!(!f.gui.has("shop"));
    assert_eq!(removed_count.get(), 1);
    assert_eq!(
        f.events().iter().filter(|e| e.ends_with(":before_remove")).count(),
        3
    );

    if let Some(stale) = pending.borrow_mut().take() {
        stale.proceed();
    }
    assert_eq!(removed_count.get(), 1);
}

#[test]
fn test_stale_continuation_does_not_close_reopened_window() {
    let f = Fixture::new(LoadMode::Immediate);
    let pending: Rc<RefCell<Option<RemoveContinuation>>> = Rc::new(RefCell::new(None));
    let sink = pending.clone();
    f.gui.open(
        "shop",
        UiArgs::none(),
        UiCallbacks::new().on_before_remove(move |_, next| *sink.borrow_mut() = Some(next)),
    );

    f.gui.remove("shop", false);
    f.gui.remove("shop", false);
    f.gui.open("shop", UiArgs::none(), UiCallbacks::new());
    assert!(f.gui.get("shop").is_some());

    if let Some(stale) = pending.borrow_mut().take() {
        stale.proceed();
    }
    assert!(f.gui.get("shop").is_some());
}

#[test]
fn test_component_refusal_aborts_open() {
    let f = Fixture::new(LoadMode::Immediate);
    let nodes_before = f.scene.borrow().node_count();
    let failed = Rc::new(Cell::new(false));
    let failed_flag = failed.clone();
    let reported: Rc<RefCell<Vec<String>>> = Rc::new(RefCell::new(Vec::new()));
    let report_sink = reported.clone();
    f.gui.set_open_failure(move |id| report_sink.borrow_mut().push(id.to_string()));

    let added = Rc::new(Cell::new(false));
    let added_flag = added.clone();
    f.gui.open(
        "broken",
        UiArgs::none(),
        UiCallbacks::new()
            .on_added(move |_, _| added_flag.set(true))
            .on_load_failure(move || failed_flag.set(true)),
    );

    assert_eq!(f.events(), vec!["broken.a:added", "broken.b:added"]);
    assert!(failed.get());
    assert!(!added.get());
    assert_eq!(*reported.borrow(), vec!["broken".to_string()]);
    assert!(!f.gui.has("broken"));
    assert_eq!(f.scene.borrow().node_count(), nodes_before);
}

#[test]
fn test_load_failure_reports_through_callbacks() {
    let f = Fixture::new(LoadMode::Deferred);
    let failed = Rc::new(Cell::new(false));
    let failed_flag = failed.clone();
    f.gui.open("shop", UiArgs::none(), UiCallbacks::new().on_load_failure(move || failed_flag.set(true)));
    let mut handle = f.gui.open_async("bag", UiArgs::none());

    assert!(f.loader.fail_next("timeout"));
    assert!(failed.get());
    assert!(!f.gui.has("shop"));

    assert!(f.loader.fail_next("timeout"));
    assert_eq!(handle.try_result(), OpenResult::Failed);
}

#[test]
fn test_remove_while_loading_cancels_and_releases_late_asset() {
    let f = Fixture::new(LoadMode::Deferred);
    let nodes_before = f.scene.borrow().node_count();
    let mut handle = f.gui.open_async("shop", UiArgs::none());

    f.gui.remove("shop", true);
    assert!(!f.gui.has("shop"));
    assert_eq!(handle.try_result(), OpenResult::Failed);

    assert!(f.loader.complete_next());
    assert!(f.gui.get("shop").is_none());
    assert_eq!(f.loader.release_count("resources", "gui/shop"), 1);
    assert_eq!(f.scene.borrow().node_count(), nodes_before);
    assert!(f.events().is_empty());
}

#[test]
fn test_reopen_after_cancel_ignores_stale_completion() {
    let f = Fixture::new(LoadMode::Deferred);
    f.gui.open("shop", UiArgs::none(), UiCallbacks::new());
    f.gui.remove("shop", true);
    let mut handle = f.gui.open_async("shop", UiArgs::none());

    assert!(f.loader.complete_next());
    assert_eq!(handle.try_result(), OpenResult::Pending);
    assert!(f.loader.complete_next());
    assert!(matches!(handle.try_result(), OpenResult::Opened(_)));
    assert_eq!(f.layer(layer_type::UI).open_ids().len(), 1);
}

#[test]
fn test_replace_adds_new_before_removing_old() {
    let f = Fixture::new(LoadMode::Immediate);
    f.gui.open("shop", UiArgs::none(), UiCallbacks::new());
    f.log.borrow_mut().clear();

    let mut handle = f.gui.replace_async("shop", "bag", UiArgs::none());
    assert!(matches!(handle.try_result(), OpenResult::Opened(_)));
    assert!(!f.gui.has("shop"));
    assert!(f.gui.has("bag"));

    let events = f.events();
    let bag_added = events.iter().position(|e| e == "bag.c:added").unwrap();
    let shop_leaving = events.iter().position(|e| e == "shop.a:before_remove").unwrap();
    assert!(bag_added < shop_leaving);
}

#[test]
fn test_replace_keeps_old_window_while_new_loads() {
    let f = Fixture::new(LoadMode::Immediate);
    f.gui.open("shop", UiArgs::none(), UiCallbacks::new());
    f.loader.set_mode(LoadMode::Deferred);

    let seen_old = Rc::new(Cell::new(false));
    let seen = seen_old.clone();
    let gui = f.gui.clone();
    f.gui.replace(
        "shop",
        "bag",
        UiArgs::none(),
        UiCallbacks::new().on_added(move |_, _| seen.set(gui.has("shop"))),
    );
    assert!(f.gui.get("shop").is_some());
    assert!(f.gui.get("bag").is_none());

    f.loader.complete_next();
    assert!(f.gui.get("bag").is_some());
    assert!(!f.gui.has("shop"));
    assert!(!seen_old.get());
}

#[test]
fn test_dialogs_open_one_at_a_time() {
    let f = Fixture::new(LoadMode::Immediate);
    let mut first = f.gui.open_async("alert", UiArgs::none());
    let mut second = f.gui.open_async("confirm", UiArgs::none());
    let dialogs = f.layer(layer_type::DIALOG);

    assert!(matches!(first.try_result(), OpenResult::Opened(_)));
    assert_eq!(second.try_result(), OpenResult::Pending);
    assert_eq!(dialogs.queued_count(), 1);

    f.gui.remove("alert", true);
    assert!(matches!(second.try_result(), OpenResult::Opened(_)));
    assert_eq!(dialogs.open_ids(), vec!["confirm".to_string()]);
    assert_eq!(dialogs.queued_count(), 0);
}

#[test]
fn test_replace_between_dialogs_swaps_active_dialog() {
    let f = Fixture::new(LoadMode::Immediate);
    let dialogs = f.layer(layer_type::DIALOG);
    f.gui.open("alert", UiArgs::none(), UiCallbacks::new());

    let mut swapped = f.gui.replace_async("alert", "confirm", UiArgs::none());
    assert!(matches!(swapped.try_result(), OpenResult::Opened(_)));
    assert_eq!(dialogs.open_ids(), vec!["confirm".to_string()]);
    assert_eq!(dialogs.queued_count(), 0);
}

#[test]
fn test_replace_on_dialog_layer_still_queues_behind_other_dialogs() {
    let f = Fixture::new(LoadMode::Immediate);
    let dialogs = f.layer(layer_type::DIALOG);
    f.gui.open("alert", UiArgs::none(), UiCallbacks::new());

    let mut pending = f.gui.replace_async("shop", "confirm", UiArgs::none());
    assert_eq!(pending.try_result(), OpenResult::Pending);
    assert_eq!(dialogs.queued_count(), 1);
}

#[test]
fn test_removing_queued_dialog_drops_it() {
    let f = Fixture::new(LoadMode::Immediate);
    f.gui.open("alert", UiArgs::none(), UiCallbacks::new());
    let mut queued = f.gui.open_async("confirm", UiArgs::none());

    f.gui.remove("confirm", true);
    assert_eq!(queued.try_result(), OpenResult::Failed);
    f.gui.remove("alert", true);
    assert!(!f.gui.has("confirm"));
}

#[test]
fn test_popup_mask_sits_under_masked_window() {
    let f = Fixture::new(LoadMode::Immediate);
    let popups = f.layer(layer_type::POPUP);
    f.gui.open("tips", UiArgs::none(), UiCallbacks::new());
    assert!(popups.mask_node().is_none());

    f.gui.open("reward", UiArgs::none(), UiCallbacks::new());
    let mask = popups.mask_node().unwrap();
    let tips = f.gui.get("tips").unwrap();
    let reward = f.gui.get("reward").unwrap();
    assert_eq!(f.scene.borrow().children(popups.node()), vec![tips, mask, reward]);

    f.gui.remove("reward", true);
    assert!(popups.mask_node().is_none());
    assert_eq!(f.scene.borrow().children(popups.node()), vec![tips]);
}

#[test]
fn test_touch_outside_closes_vacancy_popup() {
    let f = Fixture::new(LoadMode::Immediate);
    f.gui.open("tips", UiArgs::none(), UiCallbacks::new());
    assert!(!f.gui.touch_outside(layer_type::POPUP));

    f.gui.open("reward", UiArgs::none(), UiCallbacks::new());
    assert!(f.gui.touch_outside(layer_type::POPUP));
    assert!(!f.gui.has("reward"));
    assert!(f.gui.has("tips"));
}

#[test]
fn test_open_path_config_is_deleted_after_destroy() {
    let f = Fixture::new(LoadMode::Immediate);
    f.loader.register_prefab("resources", "gui/help", Prefab::new("help"));
    let id = f.gui.open_path(layer_type::UI, "gui/help", None, UiArgs::none(), UiCallbacks::new());

    assert!(f.gui.has(&id));
    assert!(f.gui.config(&id).is_some_and(|c| c.auto));
    f.gui.remove(&id, true);
    assert!(f.gui.config(&id).is_none());
}

#[test]
fn test_open_path_on_missing_layer_leaves_no_config() {
    let f = Fixture::new(LoadMode::Immediate);
    let failed = Rc::new(Cell::new(false));
    let sink = failed.clone();
    let id = f.gui.open_path(
        "LayerMissing",
        "gui/help",
        None,
        UiArgs::none(),
        UiCallbacks::new().on_added(move |_, _| sink.set(true)),
    );

    assert!(!f.gui.has(&id));
    assert!(f.gui.config(&id).is_none());
    assert!(!failed.get());
}

#[test]
fn test_open_path_with_bundle() {
    let f = Fixture::new(LoadMode::Immediate);
    f.loader.register_prefab("activity", "gui/banner", Prefab::new("banner"));
    let id = f.gui.open_path(layer_type::UI, "gui/banner", Some("activity"), UiArgs::none(), UiCallbacks::new());
    assert!(f.gui.get(&id).is_some());
    f.gui.remove(&id, true);
    assert_eq!(f.loader.release_count("activity", "gui/banner"), 1);
}

#[test]
fn test_remove_by_node_and_clear() {
    let f = Fixture::new(LoadMode::Immediate);
    f.gui.open("shop", UiArgs::none(), UiCallbacks::new());
    f.gui.open("reward", UiArgs::none(), UiCallbacks::new());
    f.gui.open("alert", UiArgs::none(), UiCallbacks::new());

    let shop = f.gui.get("shop").unwrap();
    f.gui.remove_by_node(shop, true);
    assert!(!f.gui.has("shop"));

    f.gui.open("bag", UiArgs::none(), UiCallbacks::new());
    f.gui.remove("bag", false);
    f.gui.clear(true);
    for id in ["reward", "alert", "bag"] {
        assert!(!f.gui.has(id), "{id} still open");
    }
    assert!(!f.layer(layer_type::UI).is_cached("bag"));
}

#[test]
fn test_toast_expires_with_clock() {
    let f = Fixture::new(LoadMode::Immediate);
    let notify = f.gui.notify().unwrap();
    let layer_node = f.layer(layer_type::NOTIFY).node();

    f.gui.toast("hello", false);
    assert_eq!(notify.toasts(), vec!["hello".to_string()]);
    assert_eq!(f.scene.borrow().children(layer_node).len(), 1);

    f.gui.update(1.0);
    assert_eq!(notify.toasts().len(), 1);
    f.gui.update(2.5);
    assert!(notify.toasts().is_empty());
    assert!(f.scene.borrow().children(layer_node).is_empty());
}

#[test]
fn test_localized_toast_uses_translator() {
    let f = Fixture::new(LoadMode::Immediate);
    f.gui.set_translator(Rc::new(|key: &str| format!("<{key}>")));
    f.gui.toast("greet", true);
    f.gui.toast("plain", false);
    assert_eq!(f.gui.notify().unwrap().toasts(), vec!["<greet>".to_string(), "plain".to_string()]);
}

#[test]
fn test_wait_prompt_is_single() {
    let f = Fixture::new(LoadMode::Immediate);
    let notify = f.gui.notify().unwrap();
    let layer_node = f.layer(layer_type::NOTIFY).node();

    f.gui.wait_open();
    f.gui.wait_open();
    assert!(notify.is_waiting());
    assert_eq!(f.scene.borrow().children(layer_node).len(), 1);

    f.gui.wait_close();
    assert!(!notify.is_waiting());
    assert!(f.scene.borrow().children(layer_node).is_empty());
}

#[test]
fn test_custom_layer_registration() {
    let scene = MemoryScene::shared();
    let loader = MemoryAssetLoader::shared(LoadMode::Immediate);
    let shared_scene: SharedScene = scene.clone();
    let shared_assets: SharedAssets = loader;
    let gui = UiManager::new(UiSettings::default(), shared_scene, shared_assets);

    gui.register_layer_kind("LayerTop", LayerKind::PopUp);
    gui.register_layer_kind(layer_type::UI, LayerKind::Dialog);
    let root = scene.borrow_mut().create_node("Canvas");
    gui.init(root);

    assert_eq!(gui.layer("LayerTop").map(|l| l.kind()), Some(LayerKind::PopUp));
    assert_eq!(gui.layer(layer_type::UI).map(|l| l.kind()), Some(LayerKind::Ui));
    assert_eq!(scene.borrow().children(root).len(), 8);
}
