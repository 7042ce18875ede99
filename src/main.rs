//! Stack Tower entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, HtmlCanvasElement, HtmlElement, KeyboardEvent, MouseEvent};

    use stack_tower::Tuning;
    use stack_tower::audio::{AudioManager, SoundEffect};
    use stack_tower::consts::*;
    use stack_tower::present::{Presentation, apply_events};
    use stack_tower::renderer::{Scene, SceneRenderState};
    use stack_tower::sim::{AutoPlayer, GameEvent, GameSession, HitKind, TickInput, step};

    /// HUD, feedback popup, game over overlay and sounds
    struct DomPresentation {
        document: Document,
        audio: AudioManager,
    }

    impl DomPresentation {
        fn new(document: Document) -> Self {
            Self {
                document,
                audio: AudioManager::new(),
            }
        }

        fn set_text(&self, id: &str, text: &str) {
            if let Some(el) = self.document.get_element_by_id(id) {
                el.set_text_content(Some(text));
            }
        }

        /// Briefly scale the feedback element up, then back
        fn pop_feedback(&self) {
            let Some(el) = self
                .document
                .get_element_by_id("feedback")
                .and_then(|el| el.dyn_into::<HtmlElement>().ok())
            else {
                return;
            };
            let _ = el.style().set_property("transform", "scale(1.3)");

            let reset = Closure::once_into_js(move || {
                let _ = el.style().set_property("transform", "scale(1)");
            });
            if let Some(window) = web_sys::window() {
                let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(
                    reset.unchecked_ref(),
                    150,
                );
            }
        }
    }

    impl Presentation for DomPresentation {
        fn report_score(&mut self, score: u32) {
            self.set_text("scoreValue", &score.to_string());
        }

        fn report_feedback(&mut self, kind: HitKind, combo: u32) {
            if let Some(el) = self.document.get_element_by_id("feedback") {
                el.set_class_name(kind.css_class(combo));
                el.set_text_content(Some(&kind.label(combo)));
            }
            self.pop_feedback();
            self.audio.play(SoundEffect::for_hit(kind, combo));
        }

        fn report_game_over(&mut self, final_score: u32) {
            if let Some(el) = self.document.get_element_by_id("gameOver") {
                let _ = el.class_list().remove_1("hidden");
            }
            self.set_text("finalScore", &format!("Your Score: {}", final_score));
            self.audio.play(SoundEffect::GameOver);
        }

        fn clear(&mut self) {
            if let Some(el) = self.document.get_element_by_id("feedback") {
                el.set_class_name("");
                el.set_text_content(Some(""));
            }
            if let Some(el) = self.document.get_element_by_id("gameOver") {
                let _ = el.class_list().add_1("hidden");
            }
        }
    }

    /// Game instance holding all state
    struct Game {
        session: GameSession,
        scene: Scene,
        presentation: DomPresentation,
        render_state: Option<SceneRenderState>,
        accumulator: f32,
        last_time: f64,
        input: TickInput,
        events: Vec<GameEvent>,
        autoplayer: AutoPlayer,
    }

    impl Game {
        fn new(tuning: Tuning, seed: u64, aspect: f32, document: Document) -> Self {
            let mut events = Vec::new();
            let scene = Scene::new(seed, aspect, tuning.block_height, tuning.block_depth);
            let session = GameSession::new(tuning, &mut events);
            let mut game = Self {
                session,
                scene,
                presentation: DomPresentation::new(document),
                render_state: None,
                accumulator: 0.0,
                last_time: 0.0,
                input: TickInput::default(),
                events,
                autoplayer: AutoPlayer::new(seed),
            };
            game.flush_events();
            game
        }

        /// Hand queued simulation events to the scene and the DOM
        fn flush_events(&mut self) {
            apply_events(&self.events, &mut self.scene, &mut self.presentation);
            self.events.clear();
        }

        /// Run simulation ticks
        fn update(&mut self, dt: f32) {
            let dt = dt.min(MAX_FRAME_DT);
            self.accumulator += dt;

            let mut substeps = 0;
            while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
                step(
                    &mut self.session,
                    &self.input,
                    &mut self.autoplayer,
                    &mut self.events,
                );
                self.accumulator -= SIM_DT;
                substeps += 1;

                // Clear one-shot inputs after processing
                self.input.drop = false;
                self.input.restart = false;
            }

            self.flush_events();
        }

        /// Render the current frame
        fn render(&mut self) {
            if let Some(ref mut render_state) = self.render_state {
                match render_state.render(&self.scene) {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost) => {
                        render_state.resize(render_state.size.0, render_state.size.1);
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("Out of memory!");
                    }
                    Err(e) => log::warn!("Render error: {:?}", e),
                }
            }
        }

        fn resize(&mut self, width: u32, height: u32) {
            self.scene.set_aspect(width, height);
            if let Some(ref mut render_state) = self.render_state {
                render_state.resize(width, height);
            }
        }
    }

    /// Size the canvas backing store to its CSS size times the pixel ratio
    fn fit_canvas(canvas: &HtmlCanvasElement) -> (u32, u32) {
        let dpr = web_sys::window().map(|w| w.device_pixel_ratio()).unwrap_or(1.0);
        let width = (canvas.client_width() as f64 * dpr) as u32;
        let height = (canvas.client_height() as f64 * dpr) as u32;
        canvas.set_width(width);
        canvas.set_height(height);
        (width, height)
    }

    /// Keep the loading screen up briefly, fade it out, then remove it
    fn fade_out_loading_screen(document: &Document) {
        let Some(loading) = document
            .get_element_by_id("loadingScreen")
            .and_then(|el| el.dyn_into::<HtmlElement>().ok())
        else {
            return;
        };
        let Some(window) = web_sys::window() else {
            return;
        };

        let fade = Closure::once_into_js(move || {
            let _ = loading.class_list().add_1("fading");
            let style = loading.style();
            let _ = style.set_property(
                "transition",
                &format!("opacity {}ms", LOADING_FADE_MS),
            );
            let _ = style.set_property("opacity", "0");
            let _ = style.set_property("pointer-events", "none");

            let remove = Closure::once_into_js(move || loading.remove());
            if let Some(window) = web_sys::window() {
                let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(
                    remove.unchecked_ref(),
                    LOADING_FADE_MS,
                );
            }
        });
        let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(
            fade.unchecked_ref(),
            LOADING_SCREEN_MS,
        );
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Stack Tower starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        fade_out_loading_screen(&document);
        if let Some(body) = document.body() {
            let _ = body.class_list().add_1("game-bg");
        }

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");
        let (width, height) = fit_canvas(&canvas);

        // Initialize game
        let tuning = Tuning::load();
        let seed = js_sys::Date::now() as u64;
        let aspect = width as f32 / height.max(1) as f32;
        let game = Rc::new(RefCell::new(Game::new(tuning, seed, aspect, document.clone())));

        log::info!("Game initialized with seed: {}", seed);

        // Initialize WebGPU
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .expect("Failed to create surface");

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .expect("Failed to get adapter");

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let render_state = SceneRenderState::new(surface, &adapter, width, height).await;
        game.borrow_mut().render_state = Some(render_state);

        setup_input_handlers(game.clone());
        setup_restart_button(game.clone());
        setup_resize(&canvas, game.clone());

        // Start game loop
        request_animation_frame(game);

        log::info!("Stack Tower running!");
    }

    fn setup_input_handlers(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let document = window.document().unwrap();

        // Click / tap anywhere - drop (also unlocks audio)
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                let mut g = game.borrow_mut();
                g.presentation.audio.resume();
                g.input.drop = true;
            });
            let _ = document
                .add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Keyboard
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut g = game.borrow_mut();
                match event.code().as_str() {
                    "Space" => {
                        event.prevent_default();
                        g.presentation.audio.resume();
                        g.input.drop = true;
                    }
                    "KeyI" => {
                        g.input.autoplay = !g.input.autoplay;
                        log::info!("Autoplay: {}", g.input.autoplay);
                    }
                    "KeyM" => {
                        let muted = !g.presentation.audio.is_muted();
                        g.presentation.audio.set_muted(muted);
                        log::info!("Muted: {}", muted);
                    }
                    _ => {}
                }
            });
            let _ = document
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_restart_button(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let document = window.document().unwrap();

        // The same click bubbles to the document and requests a drop, which
        // becomes the catch-up spawn of the new run.
        if let Some(btn) = document.get_element_by_id("restart-btn") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                game.borrow_mut().input.restart = true;
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_resize(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let canvas = canvas.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::UiEvent| {
            let (width, height) = fit_canvas(&canvas);
            game.borrow_mut().resize(width, height);
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();

            // Calculate delta time
            let dt = if g.last_time > 0.0 {
                ((time - g.last_time) / 1000.0) as f32
            } else {
                SIM_DT
            };
            g.last_time = time;

            g.update(dt);
            g.render();
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
mod native_demo {
    use anyhow::Context;

    use stack_tower::Tuning;
    use stack_tower::present::{LogPresentation, apply_events};
    use stack_tower::renderer::Scene;
    use stack_tower::sim::{AutoPlayer, GameSession, TickInput, step};

    /// Hard stop for the headless run (ten simulated minutes at 60 Hz)
    const MAX_DEMO_STEPS: u64 = 60 * 60 * 10;

    /// Tuning from the JSON file named by the first argument, or defaults
    pub fn load_tuning() -> anyhow::Result<Tuning> {
        let Some(path) = std::env::args().nth(1) else {
            return Ok(Tuning::default());
        };
        let json = std::fs::read_to_string(&path)
            .with_context(|| format!("reading tuning file {}", path))?;
        let tuning =
            Tuning::from_json(&json).with_context(|| format!("parsing tuning file {}", path))?;
        log::info!("Loaded tuning from {}", path);
        Ok(tuning)
    }

    /// Seed from the second argument, or the clock
    pub fn seed() -> anyhow::Result<u64> {
        match std::env::args().nth(2) {
            Some(s) => s.parse().with_context(|| format!("invalid seed {:?}", s)),
            None => Ok(std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_nanos() as u64)
                .unwrap_or(0)),
        }
    }

    /// Play one autoplay run headlessly, driving the scene model and a log presenter
    pub fn run(tuning: Tuning, seed: u64) -> anyhow::Result<()> {
        log::info!("Headless autoplay run with seed {}", seed);

        let mut events = Vec::new();
        let mut scene = Scene::new(seed, 16.0 / 9.0, tuning.block_height, tuning.block_depth);
        let mut session = GameSession::new(tuning, &mut events);
        let mut presentation = LogPresentation::default();
        let mut player = AutoPlayer::new(seed);

        let input = TickInput {
            autoplay: true,
            ..Default::default()
        };

        let mut steps = 0;
        while !session.state.is_over() && steps < MAX_DEMO_STEPS {
            step(&mut session, &input, &mut player, &mut events);
            apply_events(&events, &mut scene, &mut presentation);
            events.clear();
            steps += 1;
        }

        log::info!(
            "Run finished after {} ticks: score {}, tower height {}, camera y {:.1}",
            steps,
            session.state.score,
            session.height(),
            scene.camera.eye.y
        );
        log::debug!(
            "Final state: {}",
            serde_json::to_string(&session.state).context("serializing final state")?
        );
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Stack Tower (native) starting...");
    log::info!("Native mode runs a headless autoplay demo - run with `trunk serve` for the web version");

    let tuning = native_demo::load_tuning()?;
    let seed = native_demo::seed()?;
    native_demo::run(tuning, seed)
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
