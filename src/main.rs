//! Gamegen engine entry point
//!
//! On the web this boots the game described by the page's manifest and runs
//! the frame loop. Natively it simulates a manifest headlessly and logs the
//! outcome.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, KeyboardEvent, MouseEvent};

    use gamegen_engine::audio::MusicPlayer;
    use gamegen_engine::platform::{self, web};
    use gamegen_engine::renderer::CanvasBackend;
    use gamegen_engine::{AssetKind, AssetTable, FrameDriver, GameSession, HostEvent, Key, Phase, TickResult};

    /// Game instance holding all state
    struct Game {
        session: GameSession,
        backend: CanvasBackend,
        driver: FrameDriver,
        music: MusicPlayer,
        assets: Rc<RefCell<AssetTable>>,
        /// Set once the frame loop has been scheduled
        running: bool,
    }

    impl Game {
        /// Run simulation ticks for this refresh and draw once
        fn frame(&mut self, time: f64) {
            let steps = self.driver.advance(time);
            for _ in 0..steps {
                let out = self.session.tick();
                self.dispatch(&out);
            }
            let list = self.session.render(self.assets.borrow().loaded());
            self.backend.draw(&list);
        }

        fn handle(&mut self, event: HostEvent) {
            let out = self.session.handle(&event);
            self.dispatch(&out);
        }

        /// Mute toggle; unmuting mid-round resumes the track
        fn toggle_mute(&mut self) {
            let muted = !self.music.muted();
            self.music.set_muted(muted);
            if !muted && self.session.phase() == Phase::Playing {
                self.music.play();
            }
            log::info!("Music {}", if muted { "muted" } else { "unmuted" });
        }

        fn dispatch(&self, out: &TickResult) {
            self.music.handle_events(&out.events);
        }
    }

    pub async fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            web_sys::console::warn_1(&"Logger already initialized".into());
        }

        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let document = window.document().ok_or_else(|| JsValue::from_str("no document"))?;

        let manifest = web::read_manifest(&document)?;
        let session = GameSession::from_manifest(&manifest, platform::fallback_seed());
        let canvas = web::game_canvas(&document, manifest.template)?;
        let assets = Rc::new(RefCell::new(AssetTable::new(&manifest.assets)));

        let game = Rc::new(RefCell::new(Game {
            session,
            backend: CanvasBackend::new(canvas.clone())?,
            driver: FrameDriver::new(),
            music: MusicPlayer::new(manifest.assets.get(AssetKind::Music).as_deref(), manifest.audio.clone()),
            assets: assets.clone(),
            running: false,
        }));

        let on_settled: Rc<dyn Fn()> = {
            let game = game.clone();
            Rc::new(move || start_when_ready(&game))
        };
        for (kind, image) in web::load_images(assets, on_settled)? {
            game.borrow_mut().backend.set_image(kind, image);
        }

        setup_input_handlers(&canvas, game.clone())?;

        // Templates with no required visuals start right away
        start_when_ready(&game);

        log::info!("{} ready", manifest.template.title());
        Ok(())
    }

    /// Schedule the frame loop once every required asset has settled
    fn start_when_ready(game: &Rc<RefCell<Game>>) {
        {
            let mut g = game.borrow_mut();
            let required = g.session.template().required_assets();
            if g.running || !g.assets.borrow().ready(required) {
                return;
            }
            g.running = true;
        }
        log::info!("Assets settled, starting frame loop");
        request_animation_frame(game.clone());
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) -> Result<(), JsValue> {
        // Pointer, scaled from CSS pixels to canvas pixels
        {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let rect = canvas_clone.get_bounding_client_rect();
                if rect.width() <= 0.0 || rect.height() <= 0.0 {
                    return;
                }
                let sx = canvas_clone.width() as f64 / rect.width();
                let sy = canvas_clone.height() as f64 / rect.height();
                let x = (event.client_x() as f64 - rect.left()) * sx;
                let y = (event.client_y() as f64 - rect.top()) * sy;
                game.borrow_mut().handle(HostEvent::PointerDown {
                    x: x as f32,
                    y: y as f32,
                });
            });
            canvas.add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Keyboard
        {
            let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let key = Key::from_dom(&event.key());
                // Keep arrows and space from scrolling the page
                if matches!(
                    key,
                    Key::Space | Key::ArrowUp | Key::ArrowDown | Key::ArrowLeft | Key::ArrowRight
                ) {
                    event.prevent_default();
                }
                if key == Key::Char('m') {
                    game.borrow_mut().toggle_mute();
                    return;
                }
                game.borrow_mut().handle(HostEvent::KeyDown(key));
            });
            window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }
        Ok(())
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        game.borrow_mut().frame(time);
        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run().await
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::path::{Path, PathBuf};

    use gamegen_engine::assembly::{AssemblyError, manifest_from_page};
    use gamegen_engine::assets::LoadedAssets;
    use gamegen_engine::config::ConfigError;
    use gamegen_engine::platform;
    use gamegen_engine::sim::GameEvent;
    use gamegen_engine::{Command, GameManifest, GameSession, Phase};

    /// Frames simulated when no count is given (one minute of game time)
    const DEFAULT_FRAMES: u32 = 3600;

    /// Manifest from a JSON file or an assembled HTML page
    fn load_manifest(path: &Path) -> Result<GameManifest, AssemblyError> {
        let is_page = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("html") || ext.eq_ignore_ascii_case("htm"));
        if is_page {
            let page = std::fs::read_to_string(path).map_err(ConfigError::from)?;
            manifest_from_page(&page)
        } else {
            Ok(GameManifest::load(path)?)
        }
    }

    pub const USAGE: &str = "usage: gamegen-engine <manifest.json|page.html> [frames]";

    #[derive(Debug, PartialEq)]
    pub struct RunArgs {
        pub path: PathBuf,
        pub frames: u32,
    }

    /// Command line arguments, or `None` when no manifest path was given
    pub fn parse_args(args: &[String]) -> Option<RunArgs> {
        let path = PathBuf::from(args.get(1)?);
        let frames = match args.get(2) {
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                log::warn!("Invalid frame count {:?}, using {}", raw, DEFAULT_FRAMES);
                DEFAULT_FRAMES
            }),
            None => DEFAULT_FRAMES,
        };
        Some(RunArgs { path, frames })
    }

    pub fn run(args: &RunArgs) -> Result<(), AssemblyError> {
        let frames = args.frames;
        let manifest = load_manifest(&args.path)?;
        let mut session = GameSession::from_manifest(&manifest, platform::fallback_seed());
        session.apply(Command::Activate);

        let mut ticked = 0;
        for _ in 0..frames {
            let out = session.tick();
            ticked += 1;
            if out.events.iter().any(|e| matches!(e, GameEvent::GameOver { .. })) {
                break;
            }
        }

        let list = session.render(LoadedAssets::all());
        log::info!(
            "{} (seed {}): {} ticks, phase {:?}, score {}, {} draw commands",
            session.template().id(),
            session.seed(),
            ticked,
            session.phase(),
            session.score(),
            list.len()
        );
        if session.phase() == Phase::GameOver {
            log::info!("Game over after frame {}", session.frame());
        }
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Gamegen engine (native, headless) starting...");

    let args: Vec<String> = std::env::args().collect();
    let Some(run_args) = headless::parse_args(&args) else {
        log::error!("{}", headless::USAGE);
        std::process::exit(2);
    };
    if let Err(e) = headless::run(&run_args) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::headless::{RunArgs, parse_args};
    use std::path::PathBuf;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_missing_path_is_rejected() {
        assert_eq!(parse_args(&args(&["gamegen-engine"])), None);
    }

    #[test]
    fn test_frame_count_parsing() {
        assert_eq!(
            parse_args(&args(&["gamegen-engine", "game.json", "120"])),
            Some(RunArgs {
                path: PathBuf::from("game.json"),
                frames: 120,
            })
        );
        let fallback = parse_args(&args(&["gamegen-engine", "page.html", "lots"])).unwrap();
        assert_eq!(fallback.frames, 3600);
    }
}
