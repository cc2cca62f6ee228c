use std::cell::RefCell;
use std::rc::Rc;

use flock_core::{config::PAGE_BACKGROUND, Flock, SimulationConfig, Viewport};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{HtmlCanvasElement, MouseEvent, Window};

mod canvas;
pub mod gate;
pub mod setup;

pub use canvas::CanvasSurface;
use gate::{Decision, HomeRoute, MOUNTED_ATTRIBUTE};

/// Installs the panic hook and routes `log` output to the browser console.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::new(log::Level::Info));
}

/// CSS colour of the page behind the flock.
#[wasm_bindgen(js_name = pageBackground)]
pub fn page_background() -> String {
    PAGE_BACKGROUND.to_string()
}

/// Flocking background bound to a canvas element.
///
/// The host wires DOM events to `pointerMove`, `pointerLeave` and `resize`;
/// `start` drives frames with `requestAnimationFrame` until `stop`.
#[wasm_bindgen]
pub struct FlockBackground {
    inner: Rc<RefCell<Background>>,
}

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

struct Background {
    flock: Flock,
    canvas: HtmlCanvasElement,
    surface: CanvasSurface,
    /// Id of the requested animation frame, while the loop runs.
    pending_frame: Option<i32>,
    /// Loop closure. Released by `stop`, `start` or drop, never from inside
    /// its own call.
    frame_callback: Option<FrameCallback>,
}

impl Background {
    /// Runs one frame. A failed frame leaves the flock stopped.
    fn frame(&mut self) -> Result<bool, JsValue> {
        self.flock.frame(&mut self.surface).map_err(|err| {
            log::error!("frame failed, flock stopped: {:?}", err);
            err
        })
    }

    /// Cancels any requested frame and hands back the loop closure for the
    /// caller to drop once this borrow is released.
    fn detach_loop(&mut self) -> Option<FrameCallback> {
        if let Some(id) = self.pending_frame.take() {
            if let Some(window) = web_sys::window() {
                if let Err(err) = window.cancel_animation_frame(id) {
                    log::warn!("cancelAnimationFrame failed: {:?}", err);
                }
            }
        }
        self.frame_callback.take()
    }

    fn resize(&mut self, width: f64, height: f64) {
        let viewport = Viewport::new(width, height);
        self.canvas.set_width(viewport.width as u32);
        self.canvas.set_height(viewport.height as u32);
        self.flock.resize(viewport.width, viewport.height);
    }
}

#[wasm_bindgen]
impl FlockBackground {
    /// Binds a flock to the canvas with id `canvas_id`, sized to the window.
    ///
    /// `preset` is `"sea"` (default) or `"classic"`; `overrides` is a JSON
    /// object of config fields to change.
    #[wasm_bindgen(constructor)]
    pub fn new(
        canvas_id: &str,
        preset: Option<String>,
        overrides: Option<String>,
    ) -> Result<FlockBackground, JsValue> {
        let config = setup::resolve_config(preset.as_deref(), overrides.as_deref())?;

        let window = web_sys::window().ok_or("no global window")?;
        let canvas = find_canvas(&window, canvas_id)?;
        let surface = CanvasSurface::from_canvas(&canvas)?;
        let (width, height) = window_size(&window)?;

        log::info!(
            "starting flock of {} boids on #{} ({}x{})",
            config.count,
            canvas_id,
            width,
            height
        );

        let flock =
            Flock::new(config, Viewport::new(width, height)).map_err(setup::SetupError::from)?;
        let mut background = Background {
            flock,
            canvas,
            surface,
            pending_frame: None,
            frame_callback: None,
        };
        background.resize(width, height);

        Ok(FlockBackground {
            inner: Rc::new(RefCell::new(background)),
        })
    }

    /// Creates and starts a flock when the current page is the home page and
    /// the canvas has not been mounted yet. Returns `undefined` otherwise.
    pub fn mount(
        canvas_id: &str,
        preset: Option<String>,
        overrides: Option<String>,
    ) -> Result<Option<FlockBackground>, JsValue> {
        Self::mount_on(&HomeRoute::default(), canvas_id, preset, overrides)
    }

    /// Like `mount`, for a site served under `base_path` instead of
    /// `/tech-base/`.
    #[wasm_bindgen(js_name = mountAt)]
    pub fn mount_at(
        canvas_id: &str,
        base_path: &str,
        preset: Option<String>,
        overrides: Option<String>,
    ) -> Result<Option<FlockBackground>, JsValue> {
        let route = HomeRoute {
            base_paths: vec![base_path.to_string()],
            ..HomeRoute::default()
        };
        Self::mount_on(&route, canvas_id, preset, overrides)
    }

    /// Starts the animation loop. Calling it while the loop runs does nothing.
    pub fn start(&self) -> Result<(), JsValue> {
        let stale = {
            let mut background = self.inner.borrow_mut();
            if background.pending_frame.is_some() {
                return Ok(());
            }
            if !background.flock.is_running() {
                log::warn!("flock was stopped; reload the page to restart it");
                return Ok(());
            }
            background.frame_callback.take()
        };
        release(stale);

        let window = web_sys::window().ok_or("no global window")?;
        let callback: FrameCallback = Rc::new(RefCell::new(None));
        let handle = Rc::downgrade(&callback);
        let inner = self.inner.clone();
        let scheduler = window.clone();

        *callback.borrow_mut() = Some(Closure::new(move || {
            let mut background = inner.borrow_mut();
            background.pending_frame = None;
            if !matches!(background.frame(), Ok(true)) {
                return;
            }
            let Some(handle) = handle.upgrade() else {
                return;
            };
            if let Some(next) = handle.borrow().as_ref() {
                match request_frame(&scheduler, next) {
                    Ok(id) => background.pending_frame = Some(id),
                    Err(err) => log::error!("requestAnimationFrame failed: {:?}", err),
                }
            };
        }));

        let id = match callback.borrow().as_ref() {
            Some(first) => request_frame(&window, first)?,
            None => return Ok(()),
        };
        let mut background = self.inner.borrow_mut();
        background.pending_frame = Some(id);
        background.frame_callback = Some(callback);
        Ok(())
    }

    /// Stops the flock, cancels the pending frame and releases the loop.
    pub fn stop(&self) {
        let detached = {
            let mut background = self.inner.borrow_mut();
            background.flock.stop();
            background.detach_loop()
        };
        release(detached);
    }

    /// Whether an animation frame is currently requested.
    #[wasm_bindgen(js_name = isLooping)]
    pub fn is_looping(&self) -> bool {
        self.inner.borrow().pending_frame.is_some()
    }

    #[wasm_bindgen(js_name = isRunning)]
    pub fn is_running(&self) -> bool {
        self.inner.borrow().flock.is_running()
    }

    /// Runs a single frame without scheduling another, for hosts that drive
    /// their own loop. Returns whether the flock is still running.
    #[wasm_bindgen(js_name = renderFrame)]
    pub fn render_frame(&self) -> Result<bool, JsValue> {
        self.inner.borrow_mut().frame()
    }

    #[wasm_bindgen(js_name = pointerMove)]
    pub fn pointer_move(&self, x: f64, y: f64) {
        self.inner.borrow_mut().flock.set_pointer(x, y);
    }

    #[wasm_bindgen(js_name = pointerLeave)]
    pub fn pointer_leave(&self) {
        self.inner.borrow_mut().flock.clear_pointer();
    }

    /// Convenience for `mousemove` listeners on a full-window canvas.
    #[wasm_bindgen(js_name = handleMouseMove)]
    pub fn handle_mouse_move(&self, event: MouseEvent) {
        self.pointer_move(event.client_x() as f64, event.client_y() as f64);
    }

    pub fn resize(&self, width: f64, height: f64) {
        self.inner.borrow_mut().resize(width, height);
    }

    /// Resizes to the current window size, for `resize` listeners.
    #[wasm_bindgen(js_name = fitWindow)]
    pub fn fit_window(&self) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or("no global window")?;
        let (width, height) = window_size(&window)?;
        self.resize(width, height);
        Ok(())
    }

    #[wasm_bindgen(js_name = boidCount)]
    pub fn boid_count(&self) -> usize {
        self.inner.borrow().flock.boid_count()
    }

    /// Active config as a plain JS object.
    pub fn config(&self) -> Result<JsValue, JsValue> {
        let config: SimulationConfig = *self.inner.borrow().flock.config();
        let json = serde_json::to_string(&config).map_err(setup::SetupError::from)?;
        js_sys::JSON::parse(&json)
    }
}

impl FlockBackground {
    fn mount_on(
        route: &HomeRoute,
        canvas_id: &str,
        preset: Option<String>,
        overrides: Option<String>,
    ) -> Result<Option<FlockBackground>, JsValue> {
        let window = web_sys::window().ok_or("no global window")?;
        let path = window.location().pathname()?;
        let canvas = find_canvas(&window, canvas_id)?;
        let already_mounted = canvas.has_attribute(MOUNTED_ATTRIBUTE);

        match gate::decide(route, &path, already_mounted) {
            Decision::Mount => {}
            decision => {
                log::debug!("not mounting flock on {}: {:?}", path, decision);
                return Ok(None);
            }
        }

        let background = FlockBackground::new(canvas_id, preset, overrides)?;
        canvas.set_attribute(MOUNTED_ATTRIBUTE, "")?;
        background.start()?;
        Ok(Some(background))
    }
}

impl Drop for FlockBackground {
    fn drop(&mut self) {
        self.stop();
    }
}

fn release(callback: Option<FrameCallback>) {
    if let Some(callback) = callback {
        drop(callback.borrow_mut().take());
    }
}

fn find_canvas(window: &Window, canvas_id: &str) -> Result<HtmlCanvasElement, JsValue> {
    let document = window.document().ok_or("no document")?;
    let canvas = document
        .get_element_by_id(canvas_id)
        .ok_or("canvas not found")?
        .dyn_into::<HtmlCanvasElement>()?;
    Ok(canvas)
}

fn window_size(window: &Window) -> Result<(f64, f64), JsValue> {
    let width = window.inner_width()?.as_f64().ok_or("window width is not a number")?;
    let height = window.inner_height()?.as_f64().ok_or("window height is not a number")?;
    Ok((width, height))
}

fn request_frame(window: &Window, callback: &Closure<dyn FnMut()>) -> Result<i32, JsValue> {
    window.request_animation_frame(callback.as_ref().unchecked_ref())
}
