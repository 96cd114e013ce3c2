//! Headless shell demo
//!
//! Runs a scripted session against the in-memory scene and asset loader: a
//! lobby entry opens its launch window, a popup with a mask is shown and
//! dismissed, a loopback connection echoes traffic, the language is switched
//! while a localized label follows along and a confirm prompt closes itself.

use game_shell::core::config::ShellConfig;
use game_shell::entry::EntryKey;
use game_shell::foundation::time::Timer;
use game_shell::network::{NetworkTips, ProtocolHelper};
use game_shell::prelude::*;
use std::cell::RefCell;
use std::rc::Rc;

const FRAME: f64 = 1.0 / 30.0;

#[derive(thiserror::Error, Debug)]
enum DemoError {
    #[error(transparent)]
    Config(#[from] game_shell::config::ConfigError),

    #[error(transparent)]
    Entry(#[from] EntryError),

    #[error(transparent)]
    Net(#[from] game_shell::network::NetError),
}

struct Lobby;

impl Entry for Lobby {
    fn bundle(&self) -> &str {
        "lobby"
    }

    fn game_id(&self) -> u32 {
        1
    }

    fn is_main(&self) -> bool {
        true
    }

    fn launch_ui(&self) -> Option<&str> {
        Some("lobby")
    }

    fn window_configs(&self) -> WindowConfigTable {
        WindowConfigTable::new()
            .with("lobby", WindowConfig::new(layer_type::UI, "gui/lobby").with_bundle("lobby"))
            .with(
                "daily_reward",
                WindowConfig::new(layer_type::POPUP, "gui/daily_reward")
                    .with_bundle("lobby")
                    .with_mask()
                    .with_vacancy(),
            )
    }

    fn run(&mut self, ctx: &EntryContext) {
        let listeners = ctx.message.listener_count(EventMessage::ENTRY_ENTER);
        log::info!("Lobby module registered, {listeners} listeners on enter");
    }
}

struct Slots;

impl Entry for Slots {
    fn bundle(&self) -> &str {
        "slots"
    }

    fn game_id(&self) -> u32 {
        7
    }

    fn launch_ui(&self) -> Option<&str> {
        Some("slots_main")
    }

    fn window_configs(&self) -> WindowConfigTable {
        WindowConfigTable::new().with(
            "slots_main",
            WindowConfig::new(layer_type::UI, "gui/slots_main").with_bundle("slots"),
        )
    }
}

struct Banner;

impl WindowComponent for Banner {
    fn on_added(&mut self, params: &ViewParams) -> bool {
        log::info!("Banner shown in window {}", params.id);
        true
    }

    fn on_removed(&mut self, params: &ViewParams) {
        log::info!("Banner of window {} removed", params.id);
    }
}

struct LogTips;

impl NetworkTips for LogTips {
    fn connect_tips(&mut self, show: bool) {
        log::info!("connect prompt: {show}");
    }

    fn reconnect_tips(&mut self, show: bool) {
        log::info!("reconnect prompt: {show}");
    }

    fn request_tips(&mut self, show: bool) {
        log::info!("request prompt: {show}");
    }
}

struct Ping;

impl ProtocolHelper for Ping {
    fn heartbeat(&self) -> NetData {
        NetData::from("ping")
    }
}

fn register_assets(loader: &MemoryAssetLoader) {
    loader.register_prefab("lobby", "gui/lobby", Prefab::new("lobby"));
    loader.register_prefab(
        "lobby",
        "gui/daily_reward",
        Prefab::with_components("daily_reward", || vec![Box::new(Banner) as Box<dyn WindowComponent>]),
    );
    loader.register_prefab("slots", "gui/slots_main", Prefab::new("slots_main"));
    for prefab in ["common/prefab/mask", "common/prefab/notify", "common/prefab/wait"] {
        loader.register_prefab("resources", prefab, Prefab::new(prefab));
    }
    loader.register_asset("slots", "audio/spin");
    loader.register_asset("slots", "audio/win");
    loader.register_asset("en", "textures/title");
    loader.register_asset("zh", "textures/title");
}

fn register_strings(i18n: &I18n) {
    i18n.insert_language(
        "main",
        "en",
        [("welcome", "Welcome"), ("reward", "Reward claimed"), ("leave", "Leave the lobby?")],
    );
    i18n.insert_language(
        "main",
        "zh",
        [("welcome", "欢迎"), ("reward", "领取成功"), ("leave", "离开大厅？")],
    );
    i18n.insert_language("slots", "en", [("welcome", "Spin to win")]);
}

fn run() -> Result<(), DemoError> {
    let config = ShellConfig::load_or_default("shell.toml")?;
    let scene = MemoryScene::shared();
    let loader = MemoryAssetLoader::shared(LoadMode::Deferred);
    register_assets(&loader);
    let root = scene.borrow_mut().create_node("Canvas");

    let assets: SharedAssets = loader.clone();
    let mut app = Framework::new(config, scene.clone(), assets.clone());
    app.init_logging();
    app.set_launch_url("https://game.example/index.html?lang=en&user=guest%201");
    register_strings(app.i18n());

    app.register_entry(Box::new(Lobby));
    app.register_entry(Box::new(Slots));
    app.on_load(root);
    log::info!("Launch user: {:?}", app.query().get("user"));

    let title = LocalizedLabel::shared("welcome");
    let logo = Rc::new(RefCell::new(LocalizedSprite::new("textures/title", assets)));
    app.i18n().register_renderer(&title);
    app.i18n().register_renderer(&logo);

    let prompt = CommonPrompt::new(app.gui(), app.i18n());
    let component = prompt.clone();
    loader.register_prefab(
        "resources",
        "common/prefab/prompt",
        Prefab::with_components("prompt", move || vec![Box::new(component.clone()) as Box<dyn WindowComponent>]),
    );
    app.gui().add_config(&WindowConfigTable::new().with(
        "prompt",
        WindowConfig::new(layer_type::DIALOG, "common/prefab/prompt"),
    ));

    let _binding = app.message().on_fn(
        EventMessage::ENTRY_ENTER,
        |_, args| log::info!("Entered {}", args.first().and_then(EventArg::as_str).unwrap_or("?")),
        ScopeId::GLOBAL,
    );

    let socket = LoopbackSocket::new();
    socket.set_auto_accept(true);
    socket.set_echo(true);
    app.net_mut().init(Box::new(socket.clone()), Some(Box::new(LogTips)));
    app.net_mut().set_protocol_helper(Box::new(Ping));
    app.net_mut()
        .set_message_handler(|data| log::info!("received {} bytes", data.len()));
    app.net_mut()
        .connect(NetConnectOptions::with_url("ws://localhost:9000").auto_reconnect(3));
    app.net_mut().send(NetData::from("hello"), false)?;

    app.enter_game(EntryKey::Id(1))?;
    let mut reward = app.gui().open_async("daily_reward", UiArgs::new(100_u32));

    let mut clock = Timer::new();
    let mut now = 0.0;
    for frame in 0..90 {
        clock.update();
        now += FRAME;
        loader.complete_all();
        app.update(now);

        match frame {
            10 => log::info!("Reward window: {:?}", reward.try_result()),
            20 => {
                app.gui().toast("reward", true);
                app.gui().touch_outside(layer_type::POPUP);
            }
            40 => {
                app.change_language("zh");
                log::info!("Title now reads {}", title.borrow().text());
            }
            50 => {
                let options = PromptOptions::new("welcome", "leave")
                    .on_ok(|| log::info!("Prompt confirmed"));
                app.gui().open("prompt", UiArgs::new(options), UiCallbacks::new());
            }
            55 => {
                log::info!("Prompt reads {}", prompt.content());
                prompt.ok();
            }
            60 => {
                socket.drop_connection();
            }
            75 => {
                app.enter_game("slots")?;
                log::info!("Title in slots: {}", app.i18n().t("welcome"));
                app.res().load_dir(
                    "audio",
                    Box::new(|result| match result {
                        Ok(clips) => log::info!("Loaded {} slots clips", clips.len()),
                        Err(error) => log::warn!("Slots audio unavailable: {error}"),
                    }),
                );
            }
            _ => {}
        }
    }

    log::info!(
        "Session over: state {:?}, {} frames sent, {} scene nodes, sprite from {:?}",
        app.net().state(),
        socket.sent().len(),
        scene.borrow().node_count(),
        logo.borrow().frame().map(|frame| frame.bundle),
    );
    log::debug!(
        "Simulated {:.1}s in {} frames, {:.4}s wall clock",
        now,
        clock.frame_count(),
        clock.total_time()
    );
    app.on_destroy();
    Ok(())
}

fn main() {
    if let Err(error) = run() {
        log::error!("Demo failed: {error}");
        eprintln!("Demo failed: {error}");
        std::process::exit(1);
    }
}
