// Self contained page wiring: sizes the canvas to the window, follows the logo
// element, listens for mouse / touch / resize and runs the animation frame loop.

use crate::config::RainConfig;
use crate::obstacle::{ObstacleProvider, ObstacleRect};
use crate::pointer::PointerState;
use crate::simulation::Simulation;
use crate::surface::CanvasSurface;
use crate::utils;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    CanvasRenderingContext2d, Document, Event, EventTarget, HtmlCanvasElement, MouseEvent,
    TouchEvent, Window,
};

fn js_err(msg: &str) -> JsValue {
    JsValue::from_str(msg)
}

// Reads the logo's bounding client rect by element id. A missing element just
// means no obstacle this frame.
pub struct ElementObstacle {
    document: Document,
    id: String,
}

impl ElementObstacle {
    pub fn new(document: Document, id: &str) -> Self {
        ElementObstacle {
            document,
            id: id.to_owned(),
        }
    }
}

impl ObstacleProvider for ElementObstacle {
    fn obstacle_rect(&self) -> Option<ObstacleRect> {
        let rect = self
            .document
            .get_element_by_id(&self.id)?
            .get_bounding_client_rect();
        Some(ObstacleRect::new(
            rect.left(),
            rect.top(),
            rect.width(),
            rect.height(),
        ))
    }
}

struct RainApp {
    window: Window,
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    logo: ElementObstacle,
    simulation: Simulation,
    pointer: PointerState,
}

impl RainApp {
    fn frame(&mut self, timestamp: f64) {
        let mut surface = CanvasSurface::new(
            &self.ctx,
            self.canvas.width() as f64,
            self.canvas.height() as f64,
        );
        self.simulation
            .frame(timestamp, &self.pointer, &self.logo, &mut surface);
    }

    // Canvas follows the viewport, and the rain is reseeded for the new area
    fn fit_to_window(&mut self) -> Result<(), JsValue> {
        let (width, height) = window_size(&self.window)?;
        self.canvas.set_width(width);
        self.canvas.set_height(height);
        self.simulation
            .resize(width as f64, height as f64, &self.logo);
        Ok(())
    }
}

fn window_size(window: &Window) -> Result<(u32, u32), JsValue> {
    let width = window
        .inner_width()?
        .as_f64()
        .ok_or_else(|| js_err("window.innerWidth is not a number"))?;
    let height = window
        .inner_height()?
        .as_f64()
        .ok_or_else(|| js_err("window.innerHeight is not a number"))?;
    Ok((width as u32, height as u32))
}

fn listen<F>(target: &EventTarget, kind: &str, handler: F) -> Result<(), JsValue>
where
    F: FnMut(Event) + 'static,
{
    let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
    target.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

fn first_touch(event: &Event) -> Option<(f64, f64)> {
    let touch = event.dyn_ref::<TouchEvent>()?.touches().get(0)?;
    Some((touch.client_x() as f64, touch.client_y() as f64))
}

fn request_animation_frame(
    window: &Window,
    callback: &Closure<dyn FnMut(f64)>,
) -> Result<i32, JsValue> {
    window.request_animation_frame(callback.as_ref().unchecked_ref())
}

/// Starts the rain on the canvas with id `canvas_id`, colliding with the
/// element `logo_id`. Runs until the page goes away.
#[wasm_bindgen]
pub fn start_rain(canvas_id: &str, logo_id: &str) -> Result<(), JsValue> {
    utils::set_panic_hook();
    utils::set_logger();

    let window = web_sys::window().ok_or_else(|| js_err("missing window"))?;
    let document = window
        .document()
        .ok_or_else(|| js_err("missing document"))?;
    let canvas = document
        .get_element_by_id(canvas_id)
        .ok_or_else(|| js_err("missing canvas element"))?
        .dyn_into::<HtmlCanvasElement>()?;
    let ctx = canvas
        .get_context("2d")?
        .ok_or_else(|| js_err("2d context not supported"))?
        .dyn_into::<CanvasRenderingContext2d>()?;

    let mut app = RainApp {
        window: window.clone(),
        canvas: canvas.clone(),
        ctx,
        logo: ElementObstacle::new(document.clone(), logo_id),
        simulation: Simulation::with_config(RainConfig::default(), StdRng::from_entropy()),
        pointer: PointerState::new(),
    };
    app.fit_to_window()?;
    log::info!(
        "rain started with {} particles",
        app.simulation.particles().len()
    );
    let app = Rc::new(RefCell::new(app));

    {
        let app = app.clone();
        listen(&document, "mousemove", move |event| {
            if let Some(e) = event.dyn_ref::<MouseEvent>() {
                app.borrow_mut()
                    .pointer
                    .move_to(e.client_x() as f64, e.client_y() as f64);
            }
        })?;
    }
    {
        let app = app.clone();
        listen(&document, "mousedown", move |_| app.borrow_mut().pointer.press())?;
    }
    {
        let app = app.clone();
        listen(&document, "mouseup", move |_| app.borrow_mut().pointer.release())?;
    }
    {
        let app = app.clone();
        listen(&canvas, "touchstart", move |event| {
            let mut app = app.borrow_mut();
            match first_touch(&event) {
                Some((x, y)) => app.pointer.touch_at(x, y),
                None => app.pointer.press(),
            }
        })?;
    }
    {
        let app = app.clone();
        listen(&canvas, "touchmove", move |event| {
            if let Some((x, y)) = first_touch(&event) {
                app.borrow_mut().pointer.move_to(x, y);
            }
        })?;
    }
    {
        let app = app.clone();
        listen(&canvas, "touchend", move |_| app.borrow_mut().pointer.release())?;
    }
    {
        let app = app.clone();
        listen(&window, "resize", move |_| {
            if let Err(e) = app.borrow_mut().fit_to_window() {
                log::error!("resize failed: {:?}", e);
            }
        })?;
    }

    // The loop callback has to reschedule itself, so it holds a handle to its own closure
    let tick: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>> = Rc::new(RefCell::new(None));
    let next = tick.clone();
    let loop_window = window.clone();
    *tick.borrow_mut() = Some(Closure::wrap(Box::new(move |timestamp: f64| {
        app.borrow_mut().frame(timestamp);
        if let Some(callback) = next.borrow().as_ref() {
            if let Err(e) = request_animation_frame(&loop_window, callback) {
                log::error!("requestAnimationFrame failed: {:?}", e);
            }
        }
    }) as Box<dyn FnMut(f64)>));

    let first = tick.borrow();
    let callback = first
        .as_ref()
        .ok_or_else(|| js_err("animation loop not set up"))?;
    request_animation_frame(&window, callback)?;
    Ok(())
}
