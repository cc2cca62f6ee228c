#![cfg(target_arch = "wasm32")]

use flock_core::{render, Boid, Rgba, Surface, Vector2D, Viewport};
use flock_wasm::gate::MOUNTED_ATTRIBUTE;
use flock_wasm::{CanvasSurface, FlockBackground};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

wasm_bindgen_test_configure!(run_in_browser);

/// Appends a canvas with the given id to the document body
fn add_canvas(id: &str, width: u32, height: u32) -> Result<HtmlCanvasElement, JsValue> {
    let document = web_sys::window()
        .ok_or("no global window")?
        .document()
        .ok_or("no document")?;
    let canvas = document
        .create_element("canvas")?
        .dyn_into::<HtmlCanvasElement>()?;
    canvas.set_id(id);
    canvas.set_width(width);
    canvas.set_height(height);
    document.body().ok_or("no body")?.append_child(&canvas)?;
    Ok(canvas)
}

fn context(canvas: &HtmlCanvasElement) -> CanvasRenderingContext2d {
    canvas
        .get_context("2d")
        .unwrap()
        .unwrap()
        .dyn_into::<CanvasRenderingContext2d>()
        .unwrap()
}

fn painted_pixels(canvas: &HtmlCanvasElement) -> usize {
    let width = canvas.width() as f64;
    let height = canvas.height() as f64;
    let data = context(canvas)
        .get_image_data(0.0, 0.0, width, height)
        .unwrap()
        .data();
    data.chunks(4).filter(|pixel| pixel[3] > 0).count()
}

#[wasm_bindgen_test]
fn test_missing_canvas_is_an_error() {
    let result = FlockBackground::new("no-such-canvas", None, None);
    assert!(result.is_err());
}

#[wasm_bindgen_test]
fn test_bad_config_is_an_error() {
    add_canvas("flock-bad-config", 100, 100).unwrap();
    let result = FlockBackground::new(
        "flock-bad-config",
        Some("storm".to_string()),
        None,
    );
    assert!(result.is_err());

    let result = FlockBackground::new(
        "flock-bad-config",
        None,
        Some(r#"{"speedLimit": -1}"#.to_string()),
    );
    assert!(result.is_err());
}

#[wasm_bindgen_test]
fn test_background_uses_config_overrides() {
    add_canvas("flock-overrides", 100, 100).unwrap();
    let background = FlockBackground::new(
        "flock-overrides",
        Some("classic".to_string()),
        Some(r#"{"count": 7}"#.to_string()),
    )
    .unwrap();

    assert_eq!(background.boid_count(), 7);
    assert!(background.is_running());
}

#[wasm_bindgen_test]
fn test_render_frame_paints_canvas() {
    let canvas = add_canvas("flock-paint", 100, 100).unwrap();
    let background = FlockBackground::new(
        "flock-paint",
        None,
        Some(r#"{"count": 40}"#.to_string()),
    )
    .unwrap();

    assert_eq!(background.render_frame(), Ok(true));
    assert!(painted_pixels(&canvas) > 0);

    background.stop();
    assert!(!background.is_running());
    assert_eq!(background.render_frame(), Ok(false));
}

#[wasm_bindgen_test]
fn test_mount_runs_once_per_canvas() {
    let canvas = add_canvas("flock-mount", 100, 100).unwrap();
    let path = web_sys::window().unwrap().location().pathname().unwrap();
    let overrides = Some(r#"{"count": 5}"#.to_string());

    let first = FlockBackground::mount_at("flock-mount", &path, None, overrides.clone())
        .unwrap()
        .expect("home page canvas should mount");
    assert!(canvas.has_attribute(MOUNTED_ATTRIBUTE));
    assert!(first.is_running());
    assert!(first.is_looping());

    let second = FlockBackground::mount_at("flock-mount", &path, None, overrides).unwrap();
    assert!(second.is_none());

    first.stop();
}

#[wasm_bindgen_test]
fn test_stop_ends_animation_loop() {
    add_canvas("flock-loop", 100, 100).unwrap();
    let background = FlockBackground::new("flock-loop", None, None).unwrap();

    background.start().unwrap();
    assert!(background.is_looping());
    background.start().unwrap();
    assert!(background.is_looping());

    background.stop();
    assert!(!background.is_looping());
    assert!(!background.is_running());

    background.start().unwrap();
    assert!(!background.is_looping());
}

#[wasm_bindgen_test]
fn test_resize_updates_canvas() {
    let canvas = add_canvas("flock-resize", 100, 100).unwrap();
    let background = FlockBackground::new("flock-resize", None, None).unwrap();

    background.resize(320.0, 240.0);

    assert_eq!(canvas.width(), 320);
    assert_eq!(canvas.height(), 240);
}

#[wasm_bindgen_test]
fn test_canvas_surface_draws_a_boid() {
    let canvas = add_canvas("flock-surface", 50, 50).unwrap();
    let mut surface = CanvasSurface::from_canvas(&canvas).unwrap();
    let boid = Boid::new(Vector2D::new(25.0, 25.0), Vector2D::new(1.0, 0.0));

    surface.clear(Viewport::new(50.0, 50.0)).unwrap();
    assert_eq!(painted_pixels(&canvas), 0);

    render(&mut surface, &boid, &Rgba::new(100, 200, 255, 0.6)).unwrap();

    let pixel = context(&canvas)
        .get_image_data(26.0, 25.0, 1.0, 1.0)
        .unwrap()
        .data();
    assert!(pixel[3] > 0, "centre of the boid should be painted");
}

#[wasm_bindgen_test]
fn test_page_background() {
    assert_eq!(flock_wasm::page_background(), "#0d1b2a");
}
