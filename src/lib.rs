mod utils;

pub mod color;
pub mod config;
pub mod obstacle;
pub mod particle;
pub mod pointer;
pub mod simulation;
pub mod surface;

#[cfg(target_arch = "wasm32")]
pub mod app;

use obstacle::ObstacleRect;
use pointer::PointerState;
use simulation::{FrameOutcome, Simulation};
use surface::{CanvasSurface, PixelBuffer};
use wasm_bindgen::prelude::*;
use web_sys::{console, CanvasRenderingContext2d};

// When the `wee_alloc` feature is enabled, use `wee_alloc` as the global
// allocator.
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen]
pub fn initialize() {
    utils::set_panic_hook();
    utils::set_logger();
}

pub struct Timer<'a> {
    name: &'a str,
}

impl<'a> Timer<'a> {
    pub fn new(name: &'a str) -> Timer<'a> {
        console::time_with_label(name);
        Timer { name }
    }
}

impl<'a> Drop for Timer<'a> {
    fn drop(&mut self) {
        console::time_end_with_label(self.name);
    }
}

// Rain effect driven from JS: the page forwards animation frame timestamps,
// pointer events, the logo rect and window resizes.
#[wasm_bindgen]
pub struct RainCanvas {
    simulation: Simulation,
    pointer: PointerState,
    obstacle: Option<ObstacleRect>,
    pixels: PixelBuffer,
}

#[wasm_bindgen]
impl RainCanvas {
    pub fn new(width: u32, height: u32) -> RainCanvas {
        RainCanvas {
            simulation: Simulation::new(width as f64, height as f64),
            pointer: PointerState::new(),
            obstacle: None,
            pixels: PixelBuffer::new(width, height),
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.simulation
            .resize(width as f64, height as f64, &self.obstacle);
        self.pixels.resize(width, height);
    }

    pub fn pointer_move(&mut self, x: f64, y: f64) {
        self.pointer.move_to(x, y);
    }

    pub fn pointer_down(&mut self) {
        self.pointer.press();
    }

    pub fn pointer_up(&mut self) {
        self.pointer.release();
    }

    pub fn touch_start(&mut self, x: f64, y: f64) {
        self.pointer.touch_at(x, y);
    }

    pub fn touch_move(&mut self, x: f64, y: f64) {
        self.pointer.move_to(x, y);
    }

    pub fn touch_end(&mut self) {
        self.pointer.release();
    }

    pub fn set_obstacle(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.obstacle = Some(ObstacleRect::new(x, y, width, height));
    }

    pub fn clear_obstacle(&mut self) {
        self.obstacle = None;
    }

    // Draws with one 2d context call per square. Returns false when the frame
    // was skipped; the caller should request the next frame either way.
    pub fn frame(&mut self, timestamp: f64, ctx: &CanvasRenderingContext2d) -> bool {
        let _timer = Timer::new("RainCanvas::frame()");
        let mut surface = CanvasSurface::new(
            ctx,
            self.simulation.width(),
            self.simulation.height(),
        );
        let outcome = self
            .simulation
            .frame(timestamp, &self.pointer, &self.obstacle, &mut surface);
        matches!(outcome, FrameOutcome::Stepped { .. })
    }

    // Rasterizes into the pixel buffer and uploads it with a single put_image_data
    pub fn frame_to_image(
        &mut self,
        timestamp: f64,
        ctx: &CanvasRenderingContext2d,
    ) -> Result<bool, JsValue> {
        let _timer = Timer::new("RainCanvas::frame_to_image()");
        let outcome = {
            let _timer = Timer::new("simulate and rasterize");
            self.simulation
                .frame(timestamp, &self.pointer, &self.obstacle, &mut self.pixels)
        };
        match outcome {
            FrameOutcome::Stepped { .. } => {
                let _timer = Timer::new("ctx.put_image_data");
                self.pixels.put_to(ctx)?;
                Ok(true)
            }
            FrameOutcome::Skipped { .. } => Ok(false),
        }
    }

    pub fn particle_count(&self) -> usize {
        self.simulation.particles().len()
    }

    pub fn width(&self) -> f64 {
        self.simulation.width()
    }

    pub fn height(&self) -> f64 {
        self.simulation.height()
    }

    pub fn engaged(&self) -> bool {
        self.pointer.engaged
    }
}
