//! Browser host for the drag engine.
//!
//! [`SlideCanvas`] is exported to JavaScript. The page forwards pointer
//! events from its slide elements and receives geometry back as JSON.
//! Painting happens in the `on_frame` callback, which the render loop
//! calls at most once per frame window.

use crate::frame_loop::FrameLoopSlot;
use kurbo::Rect;
use slidecraft_core::{
    DragEngine, ElementData, EngineConfig, FrameOutcome, GestureKind, HistoryEntry,
    InputSuppression, Modifiers, PointerEvent,
};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_time::Instant;

/// Drag cursor and selection lock on `document.body`.
struct BodyStyleSuppression {
    document: web_sys::Document,
}

impl BodyStyleSuppression {
    fn body_style(&self) -> Option<web_sys::CssStyleDeclaration> {
        self.document.body().map(|body| body.style())
    }
}

impl InputSuppression for BodyStyleSuppression {
    fn acquire(&self) {
        if let Some(style) = self.body_style() {
            let _ = style.set_property("cursor", "grabbing");
            let _ = style.set_property("user-select", "none");
        }
    }

    fn release(&self) {
        if let Some(style) = self.body_style() {
            let _ = style.remove_property("cursor");
            let _ = style.remove_property("user-select");
        }
    }
}

fn js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value).map_err(js_error)
}

fn pointer_event(event: &web_sys::MouseEvent) -> PointerEvent {
    let modifiers = Modifiers {
        shift: event.shift_key(),
        ctrl: event.ctrl_key(),
        alt: event.alt_key(),
        meta: event.meta_key(),
    };
    PointerEvent::new(f64::from(event.client_x()), f64::from(event.client_y()))
        .with_modifiers(modifiers)
}

/// Direct-manipulation surface bound to one container element.
#[wasm_bindgen]
pub struct SlideCanvas {
    engine: Rc<RefCell<DragEngine>>,
    window: web_sys::Window,
    document: web_sys::Document,
    container: web_sys::Element,
    /// Last committed slide geometry.
    elements: RefCell<Vec<ElementData>>,
    on_frame: Rc<RefCell<Option<js_sys::Function>>>,
    /// Owns the frame closure; the closure itself only holds a weak ref.
    frame_loop: FrameLoopSlot<Closure<dyn FnMut(f64)>>,
    pending_frame: Rc<Cell<Option<i32>>>,
    on_blur: Closure<dyn Fn()>,
    on_visibility: Closure<dyn Fn()>,
}

#[wasm_bindgen]
impl SlideCanvas {
    /// Bind to `container`. `config_json` is an optional partial
    /// `EngineConfig` object.
    #[wasm_bindgen(constructor)]
    pub fn new(
        container: web_sys::Element,
        config_json: Option<String>,
    ) -> Result<SlideCanvas, JsValue> {
        let config = match config_json {
            Some(json) => EngineConfig::from_json(&json).map_err(js_error)?,
            None => EngineConfig::default(),
        };
        let window = web_sys::window().ok_or_else(|| js_error("No window"))?;
        let document = window.document().ok_or_else(|| js_error("No document"))?;

        let suppression = Rc::new(BodyStyleSuppression {
            document: document.clone(),
        });
        let engine = Rc::new(RefCell::new(
            DragEngine::with_suppression(config, suppression).map_err(js_error)?,
        ));

        // Safety net: a gesture whose pointer-up never arrives is cancelled.
        let engine_blur = engine.clone();
        let on_blur = Closure::wrap(Box::new(move || {
            if let Ok(mut engine) = engine_blur.try_borrow_mut() {
                if engine.cancel() {
                    log::info!("Gesture cancelled on window blur");
                }
            }
        }) as Box<dyn Fn()>);
        window.add_event_listener_with_callback("blur", on_blur.as_ref().unchecked_ref())?;

        let engine_visibility = engine.clone();
        let document_visibility = document.clone();
        let on_visibility = Closure::wrap(Box::new(move || {
            if !document_visibility.hidden() {
                return;
            }
            if let Ok(mut engine) = engine_visibility.try_borrow_mut() {
                if engine.cancel() {
                    log::info!("Gesture cancelled on hidden page");
                }
            }
        }) as Box<dyn Fn()>);
        document.add_event_listener_with_callback(
            "visibilitychange",
            on_visibility.as_ref().unchecked_ref(),
        )?;

        Ok(Self {
            engine,
            window,
            document,
            container,
            elements: RefCell::new(Vec::new()),
            on_frame: Rc::new(RefCell::new(None)),
            frame_loop: FrameLoopSlot::new(),
            pending_frame: Rc::new(Cell::new(None)),
            on_blur,
            on_visibility,
        })
    }

    /// Replace the slide geometry with a JSON array of elements.
    #[wasm_bindgen(js_name = setElements)]
    pub fn set_elements(&self, json: &str) -> Result<(), JsValue> {
        let elements: Vec<ElementData> = serde_json::from_str(json).map_err(js_error)?;
        *self.elements.borrow_mut() = elements;
        Ok(())
    }

    /// Current slide geometry as JSON.
    pub fn elements(&self) -> Result<String, JsValue> {
        to_json(&*self.elements.borrow())
    }

    /// Start a gesture. `kind_json` is `"move"`, `"rotate"` or
    /// `{"resize":"<handle>"}`. Returns the initial transform as JSON.
    #[wasm_bindgen(js_name = pointerDown)]
    pub fn pointer_down(
        &self,
        event: &web_sys::PointerEvent,
        element_id: &str,
        kind_json: Option<String>,
    ) -> Result<String, JsValue> {
        let kind = match kind_json {
            Some(json) => serde_json::from_str::<GestureKind>(&json).map_err(js_error)?,
            None => GestureKind::Move,
        };
        let container = self.container_rect();
        let elements = self.elements.borrow();
        let transform = self
            .engine
            .borrow_mut()
            .start_drag(&pointer_event(event), element_id, kind, &elements, container)
            .map_err(js_error)?;
        to_json(&transform)
    }

    /// Track the pointer. Returns the provisional transform as JSON, or
    /// `undefined` while idle.
    #[wasm_bindgen(js_name = pointerMove)]
    pub fn pointer_move(&self, event: &web_sys::PointerEvent) -> Option<String> {
        let transform = self.engine.borrow_mut().pointer_move(&pointer_event(event))?;
        serde_json::to_string(&transform).ok()
    }

    /// Commit the gesture and paint immediately. Returns the committed
    /// slide as JSON, or `undefined` while idle.
    #[wasm_bindgen(js_name = pointerUp)]
    pub fn pointer_up(&self) -> Result<Option<String>, JsValue> {
        let outcome = self.engine.borrow_mut().pointer_up();
        let Some(outcome) = outcome else {
            return Ok(None);
        };
        let json = to_json(&outcome.slide)?;
        *self.elements.borrow_mut() = outcome.slide;
        self.paint();
        Ok(Some(json))
    }

    /// Abort the gesture. Returns `true` if one was active.
    pub fn cancel(&self) -> bool {
        self.engine.borrow_mut().cancel()
    }

    /// Geometry to paint for `element_id` as JSON.
    #[wasm_bindgen(js_name = elementTransform)]
    pub fn element_transform(&self, element_id: &str) -> Option<String> {
        let fallback = self
            .elements
            .borrow()
            .iter()
            .find(|element| element.id == element_id)?
            .transform();
        let transform = self.engine.borrow().element_transform(element_id, fallback);
        serde_json::to_string(&transform).ok()
    }

    /// Snap candidates that captured the latest move, as JSON.
    #[wasm_bindgen(js_name = activeSnaps)]
    pub fn active_snaps(&self) -> Result<String, JsValue> {
        to_json(&self.engine.borrow().active_snaps())
    }

    #[wasm_bindgen(js_name = isDragging)]
    pub fn is_dragging(&self) -> bool {
        self.engine.borrow().is_dragging()
    }

    /// Undo the last gesture. Returns the restored slide as JSON.
    pub fn undo(&self) -> Result<Option<String>, JsValue> {
        let entry = self.engine.borrow_mut().undo();
        self.apply_history(entry)
    }

    /// Redo the last undone gesture. Returns the restored slide as JSON.
    pub fn redo(&self) -> Result<Option<String>, JsValue> {
        let entry = self.engine.borrow_mut().redo();
        self.apply_history(entry)
    }

    #[wasm_bindgen(js_name = canUndo)]
    pub fn can_undo(&self) -> bool {
        self.engine.borrow().can_undo()
    }

    #[wasm_bindgen(js_name = canRedo)]
    pub fn can_redo(&self) -> bool {
        self.engine.borrow().can_redo()
    }

    /// Start the render loop, calling `on_frame` at most once per frame window.
    #[wasm_bindgen(js_name = startRenderLoop)]
    pub fn start_render_loop(&self, on_frame: js_sys::Function) -> Result<(), JsValue> {
        *self.on_frame.borrow_mut() = Some(on_frame);
        if self.engine.borrow().is_render_loop_running() {
            return Ok(());
        }
        self.cancel_pending_frame();
        let handle = self.engine.borrow_mut().start_render_loop();

        let engine = self.engine.clone();
        let on_frame = self.on_frame.clone();
        let frame_loop = self.frame_loop.downgrade();
        let pending_frame = self.pending_frame.clone();
        let window = self.window.clone();
        let tick = Closure::wrap(Box::new(move |_timestamp: f64| {
            pending_frame.set(None);
            let outcome = match engine.try_borrow_mut() {
                Ok(mut engine) => engine.poll_frame(handle, Instant::now()),
                Err(_) => FrameOutcome::Coalesced,
            };
            if outcome == FrameOutcome::Rendered {
                let callback = on_frame.borrow().clone();
                if let Some(callback) = callback {
                    if let Err(err) = callback.call0(&JsValue::NULL) {
                        log::error!("Frame callback failed: {:?}", err);
                    }
                }
            }
            if outcome.should_reschedule() {
                let requested = frame_loop
                    .with(|tick| window.request_animation_frame(tick.as_ref().unchecked_ref()));
                if let Some(Ok(id)) = requested {
                    pending_frame.set(Some(id));
                }
            }
        }) as Box<dyn FnMut(f64)>);

        let id = self.window.request_animation_frame(tick.as_ref().unchecked_ref())?;
        self.pending_frame.set(Some(id));
        self.frame_loop.install(tick);
        Ok(())
    }

    /// Stop the render loop.
    #[wasm_bindgen(js_name = stopRenderLoop)]
    pub fn stop_render_loop(&self) {
        self.engine.borrow_mut().stop_render_loop();
        self.cancel_pending_frame();
    }
}

impl SlideCanvas {
    /// Container rect in viewport coordinates, or `None` if detached.
    fn container_rect(&self) -> Option<Rect> {
        if !self.container.is_connected() {
            return None;
        }
        let rect = self.container.get_bounding_client_rect();
        Some(Rect::new(rect.left(), rect.top(), rect.right(), rect.bottom()))
    }

    fn cancel_pending_frame(&self) {
        if let Some(id) = self.pending_frame.take() {
            let _ = self.window.cancel_animation_frame(id);
        }
    }

    /// Invoke the frame callback now. No engine borrow may be held.
    fn paint(&self) {
        let callback = self.on_frame.borrow().clone();
        if let Some(callback) = callback {
            if let Err(err) = callback.call0(&JsValue::NULL) {
                log::error!("Frame callback failed: {:?}", err);
            }
        }
    }

    fn apply_history(&self, entry: Option<HistoryEntry>) -> Result<Option<String>, JsValue> {
        let Some(entry) = entry else {
            return Ok(None);
        };
        let restored = entry.restore(&self.elements.borrow());
        let json = to_json(&restored)?;
        *self.elements.borrow_mut() = restored;
        self.paint();
        Ok(Some(json))
    }
}

impl Drop for SlideCanvas {
    fn drop(&mut self) {
        let _ = self
            .window
            .remove_event_listener_with_callback("blur", self.on_blur.as_ref().unchecked_ref());
        let _ = self.document.remove_event_listener_with_callback(
            "visibilitychange",
            self.on_visibility.as_ref().unchecked_ref(),
        );
        if let Ok(mut engine) = self.engine.try_borrow_mut() {
            engine.cancel();
            engine.stop_render_loop();
        }
        self.cancel_pending_frame();
        self.frame_loop.clear();
        log::debug!("SlideCanvas dropped");
    }
}

/// Initialize logging for the WASM build.
#[wasm_bindgen(start)]
pub fn run_wasm() {
    // Set up panic hook for better error messages
    console_error_panic_hook::set_once();

    if let Err(err) = console_log::init_with_level(log::Level::Info) {
        web_sys::console::warn_1(&format!("Logger already initialized: {err}").into());
    }

    log::info!("Starting SlideCraft (WASM)");
}
