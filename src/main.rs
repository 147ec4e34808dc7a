//! Classic Pong entry point
//!
//! The browser build runs the interactive game; the native build plays a
//! headless AI-vs-AI attract match and logs how it went.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use web_sys::HtmlCanvasElement;

    use classic_pong::Settings;
    use classic_pong::audio::AudioManager;
    use classic_pong::consts::*;
    use classic_pong::controls::{HeldKeys, control_for_key, is_mute_key};
    use classic_pong::renderer::text_layer::TextLayer;
    use classic_pong::renderer::{SdfRenderState, Viewport};
    use classic_pong::scene::{self, DrawList};
    use classic_pong::sim::{ControlEvent, Flow, GameState, tick};

    /// Game instance holding all state
    struct Game {
        state: GameState,
        render_state: Option<SdfRenderState>,
        text_layer: Option<TextLayer>,
        canvas: HtmlCanvasElement,
        scene: DrawList,
        keys: HeldKeys,
        audio: AudioManager,
        settings: Settings,
        accumulator: f32,
        last_time: f64,
        running: bool,
        // FPS tracking
        frame_times: [f64; 60],
        frame_index: usize,
        fps: u32,
    }

    impl Game {
        fn new(seed: u64, canvas: HtmlCanvasElement, text_layer: Option<TextLayer>) -> Self {
            let settings = Settings::load();
            let mut audio = AudioManager::new();
            audio.apply_settings(&settings);
            Self {
                state: GameState::new(seed),
                render_state: None,
                text_layer,
                canvas,
                scene: DrawList::new(),
                keys: HeldKeys::default(),
                audio,
                settings,
                accumulator: 0.0,
                last_time: 0.0,
                running: true,
                frame_times: [0.0; 60],
                frame_index: 0,
                fps: 0,
            }
        }

        /// Run simulation ticks
        fn update(&mut self, dt: f32, time: f64) {
            let dt = dt.min(0.1);
            self.accumulator += dt;

            let mut substeps = 0;
            while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
                let input = self.keys.tick_input();
                tick(&mut self.state, &input);
                self.accumulator -= SIM_DT;
                substeps += 1;
            }
            self.play_pending_cues();

            // Track frame times for FPS
            self.frame_times[self.frame_index] = time;
            self.frame_index = (self.frame_index + 1) % 60;

            let oldest_time = self.frame_times[self.frame_index];
            if oldest_time > 0.0 {
                let elapsed = time - oldest_time;
                if elapsed > 0.0 {
                    self.fps = (60000.0 / elapsed).round() as u32;
                }
            }
        }

        fn play_pending_cues(&mut self) {
            let events = self.state.drain_events();
            self.audio.play_events(&events);
        }

        /// Returns true if the key was consumed
        fn key_down(&mut self, key: &str) -> bool {
            // Browsers only allow audio after a user gesture
            self.audio.resume();

            if self.keys.key_down(key) {
                return true;
            }
            if is_mute_key(key) {
                self.toggle_mute();
                return true;
            }
            match control_for_key(key) {
                Some(event) => {
                    self.dispatch(event);
                    true
                }
                None => false,
            }
        }

        fn dispatch(&mut self, event: ControlEvent) {
            let flow = self.state.handle_discrete_event(event);
            self.play_pending_cues();
            if flow == Flow::Exit {
                self.stop();
            }
        }

        fn toggle_mute(&mut self) {
            self.settings.muted = !self.settings.muted;
            self.audio.apply_settings(&self.settings);
            self.settings.save();
            log::info!("Sound {}", if self.settings.muted { "off" } else { "on" });
        }

        fn blur(&mut self) {
            self.keys.release_all();
            if self.settings.mute_on_blur {
                self.audio.set_muted(true);
            }
        }

        fn focus(&mut self) {
            self.audio.apply_settings(&self.settings);
        }

        /// Leave the frame loop and show the goodbye screen
        fn stop(&mut self) {
            if !self.running {
                return;
            }
            self.running = false;
            self.keys.release_all();
            log::info!("Exiting after {} ticks", self.state.time_ticks);

            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            for id in ["canvas", "text-layer", "hud"] {
                if let Some(el) = document.get_element_by_id(id) {
                    let _ = el.set_attribute("class", "hidden");
                }
            }
            if let Some(el) = document.get_element_by_id("goodbye") {
                let _ = el.set_attribute("class", "");
            }
        }

        /// Match the backing store to the canvas' displayed size
        fn sync_canvas_size(&mut self) {
            let Some(window) = web_sys::window() else {
                return;
            };
            let dpr = window.device_pixel_ratio();
            let width = (self.canvas.client_width() as f64 * dpr) as u32;
            let height = (self.canvas.client_height() as f64 * dpr) as u32;
            if let Some(ref mut render_state) = self.render_state {
                if (width, height) != render_state.size && width > 0 && height > 0 {
                    self.canvas.set_width(width);
                    self.canvas.set_height(height);
                    render_state.resize(width, height);
                }
            }
        }

        /// Render the current frame
        fn render(&mut self, time: f64) {
            self.scene.clear();
            scene::render(&self.state, &mut self.scene);

            if let Some(ref mut render_state) = self.render_state {
                match render_state.render(&self.scene, time) {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        render_state.reconfigure();
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("Out of memory!");
                    }
                    Err(e) => log::warn!("Render error: {:?}", e),
                }
            }

            if let Some(ref mut text_layer) = self.text_layer {
                // Text is laid out in CSS pixels, not device pixels
                let viewport = Viewport::fit(
                    Vec2::new(
                        self.canvas.client_width() as f32,
                        self.canvas.client_height() as f32,
                    ),
                    Vec2::new(PLAYFIELD_WIDTH, PLAYFIELD_HEIGHT),
                );
                text_layer.sync(&self.scene, &viewport);
            }
        }

        /// Update HUD elements in DOM
        fn update_hud(&self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };

            if let Some(el) = document.get_element_by_id("hud-fps") {
                if self.settings.show_fps {
                    let _ = el.set_attribute("class", "hud-item");
                    if let Some(val) = document.query_selector("#hud-fps .hud-value").ok().flatten() {
                        val.set_text_content(Some(&self.fps.to_string()));
                    }
                } else {
                    let _ = el.set_attribute("class", "hud-item hidden");
                }
            }

            if let Some(el) = document.get_element_by_id("hud-match") {
                el.set_text_content(Some(self.state.match_length.as_str()));
            }

            if let Some(el) = document.get_element_by_id("hud-muted") {
                let class = if self.settings.muted { "hud-item" } else { "hud-item hidden" };
                let _ = el.set_attribute("class", class);
            }
        }
    }

    pub async fn run() -> Result<(), JsValue> {
        log::info!("Classic Pong starting...");

        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?;

        // Hide loading indicator
        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .ok_or_else(|| JsValue::from_str("no canvas"))?
            .dyn_into()?;

        // Set canvas size
        let dpr = window.device_pixel_ratio();
        let width = (canvas.client_width() as f64 * dpr) as u32;
        let height = (canvas.client_height() as f64 * dpr) as u32;
        canvas.set_width(width);
        canvas.set_height(height);

        let text_layer = TextLayer::attach(&document, "text-layer");
        if text_layer.is_none() {
            log::warn!("No #text-layer element - scores and menus will not be shown");
        }

        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(seed, canvas.clone(), text_layer)));
        log::info!("Game initialized with seed: {}", seed);

        match init_gpu(&canvas, width, height).await {
            Ok(render_state) => {
                game.borrow_mut().render_state = Some(render_state);
            }
            Err(e) => {
                log::error!("WebGPU unavailable: {}", e);
                if let Some(el) = document.get_element_by_id("gpu-error") {
                    let _ = el.set_attribute("class", "");
                }
            }
        }

        setup_input_handlers(game.clone());
        setup_focus_handlers(game.clone());

        if let Some(hud) = document.get_element_by_id("hud") {
            let _ = hud.set_attribute("class", "");
        }

        request_animation_frame(game);

        log::info!("Classic Pong running!");
        Ok(())
    }

    async fn init_gpu(
        canvas: &HtmlCanvasElement,
        width: u32,
        height: u32,
    ) -> Result<SdfRenderState, String> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU,
            ..Default::default()
        });

        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .map_err(|e| e.to_string())?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| e.to_string())?;

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        SdfRenderState::new(surface, &adapter, width, height)
            .await
            .map_err(|e| e.to_string())
    }

    fn setup_input_handlers(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };

        // Key down
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                let mut g = game.borrow_mut();
                if !g.running {
                    return;
                }
                if event.repeat() {
                    // Held keys are already tracked; repeats must not re-fire menu keys
                    if g.keys.key_down(&event.key()) {
                        event.prevent_default();
                    }
                    return;
                }
                if g.key_down(&event.key()) {
                    event.prevent_default();
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Key up
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                game.borrow_mut().keys.key_up(&event.key());
            });
            let _ = window
                .add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Page going away counts as quitting
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                game.borrow_mut().dispatch(ControlEvent::Quit);
            });
            let _ = window
                .add_event_listener_with_callback("pagehide", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_focus_handlers(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };

        // Window blur (click outside): drop held keys so the paddle stops
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                game.borrow_mut().blur();
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                game.borrow_mut().focus();
            });
            let _ =
                window.add_event_listener_with_callback("focus", closure.as_ref().unchecked_ref());
            closure.forget();
        }
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
        {
            let mut g = game.borrow_mut();
            if !g.running {
                return;
            }

            let dt = if g.last_time > 0.0 {
                ((time - g.last_time) / 1000.0) as f32
            } else {
                SIM_DT
            };
            g.last_time = time;

            g.sync_canvas_size();
            g.update(dt, time);
            g.render(time);
            g.update_hud();
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"Logger already initialized".into());
    }

    if let Err(e) = wasm_game::run().await {
        log::error!("Startup failed: {:?}", e);
    }
}

/// Attract mode gives up on a match after this many ticks (ten minutes)
#[cfg(not(target_arch = "wasm32"))]
const ATTRACT_TICK_LIMIT: u64 = 60 * 60 * 10;

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use std::time::{SystemTime, UNIX_EPOCH};

    use classic_pong::Settings;
    use classic_pong::audio::AudioManager;
    use classic_pong::consts::PLAYFIELD_WIDTH;
    use classic_pong::controls::autopilot;
    use classic_pong::scene::{self, DrawList};
    use classic_pong::sim::{GameEvent, GameState, tick};

    env_logger::init();

    let seed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default();
    log::info!("Classic Pong (native attract mode) starting, seed {}", seed);

    let mut state = GameState::new(seed);
    let mut audio = AudioManager::new();
    audio.apply_settings(&Settings::load());
    let mut frame = DrawList::new();

    // The stand-in player only reacts once the ball is in the near third
    let reach = PLAYFIELD_WIDTH / 3.0;

    while !state.is_game_over() && state.time_ticks < ATTRACT_TICK_LIMIT {
        let input = autopilot(&state.player, &state.ball, reach);
        tick(&mut state, &input);

        let events = state.drain_events();
        for event in &events {
            match event {
                GameEvent::PointScored { scorer } => log::info!(
                    "{:?} scores ({}:{})",
                    scorer,
                    state.score.player,
                    state.score.ai
                ),
                other => log::trace!("{:?}", other),
            }
        }
        audio.play_events(&events);

        frame.clear();
        scene::render(&state, &mut frame);
    }

    match state.winner {
        Some(_) => log::info!(
            "{} {}:{} after {} ticks",
            state.winner_text(),
            state.score.player,
            state.score.ai,
            state.time_ticks
        ),
        None => log::info!(
            "No winner after {} ticks ({}:{})",
            state.time_ticks,
            state.score.player,
            state.score.ai
        ),
    }
    log::debug!("Final frame: {:?}", frame.texts().collect::<Vec<_>>());
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
