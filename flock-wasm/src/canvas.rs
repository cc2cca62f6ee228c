use flock_core::{Rgba, Surface, Viewport};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

/// `Surface` backed by a canvas 2D context.
pub struct CanvasSurface {
    context: CanvasRenderingContext2d,
    // CSS text of the last fill colour, reformatted only when the colour changes
    fill_color: Option<Rgba>,
    fill_css: String,
}

impl CanvasSurface {
    pub fn from_canvas(canvas: &HtmlCanvasElement) -> Result<Self, JsValue> {
        let context = canvas
            .get_context("2d")?
            .ok_or("no 2d context")?
            .dyn_into::<CanvasRenderingContext2d>()?;

        Ok(Self {
            context,
            fill_color: None,
            fill_css: String::new(),
        })
    }
}

impl Surface for CanvasSurface {
    type Error = JsValue;

    fn clear(&mut self, viewport: Viewport) -> Result<(), JsValue> {
        self.context.clear_rect(0.0, 0.0, viewport.width, viewport.height);
        Ok(())
    }

    fn save(&mut self) {
        self.context.save();
    }

    fn restore(&mut self) {
        self.context.restore();
    }

    fn translate(&mut self, x: f64, y: f64) -> Result<(), JsValue> {
        self.context.translate(x, y)
    }

    fn rotate(&mut self, angle: f64) -> Result<(), JsValue> {
        self.context.rotate(angle)
    }

    fn begin_path(&mut self) {
        self.context.begin_path();
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.context.move_to(x, y);
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.context.line_to(x, y);
    }

    fn close_path(&mut self) {
        self.context.close_path();
    }

    fn fill(&mut self, color: &Rgba) {
        if self.fill_color != Some(*color) {
            self.fill_css = color.to_string();
            self.fill_color = Some(*color);
        }
        // restore() resets the fill style, so it is set on every fill
        self.context.set_fill_style_str(&self.fill_css);
        self.context.fill();
    }
}
