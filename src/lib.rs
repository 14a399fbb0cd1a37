// Re-export all public modules so they can be used from main.rs
pub mod config;
pub mod error;
pub mod logging;
pub mod utils;
pub mod ui;

// MVC Architecture
pub mod model;
pub mod view;
pub mod controller;

#[cfg(target_arch = "wasm32")]
pub use web::start;

#[cfg(target_arch = "wasm32")]
mod web {
    use std::cell::RefCell;
    use std::rc::Rc;

    use tracing::{debug, info, warn};
    use wasm_bindgen::closure::Closure;
    use wasm_bindgen::{prelude::wasm_bindgen, JsCast, JsValue};
    use web_sys::{Document, Event, EventTarget, HtmlCanvasElement, KeyboardEvent, MouseEvent, Window};

    use crate::config::DemoConfig;
    use crate::controller::{frame_dt, input, FrameLoopContext, InputEvent, InputState, KeyBindings};
    use crate::error::DemoError;
    use crate::logging;
    use crate::model::Scene;
    use crate::ui;
    use crate::view::{GpuContext, RenderState};

    #[wasm_bindgen(start)]
    pub async fn start() -> Result<(), JsValue> {
        logging::init();
        let config = load_config();
        let (window, document, canvas) = init_canvas(&config)?;
        setup_app(config, &window, &document, &canvas).await?;
        Ok(())
    }

    /// Defaults overridden by the page query string, e.g. `?variant=wave&bodies=20`
    fn load_config() -> DemoConfig {
        let mut config = DemoConfig::default();
        let query = web_sys::window()
            .and_then(|w| w.location().search().ok())
            .unwrap_or_default();
        let pairs = DemoConfig::decode_query(&query, |part| {
            js_sys::decode_uri_component(part).ok().and_then(|s| s.as_string())
        });
        for err in config.apply_pairs(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))) {
            warn!("ignoring query override: {err}");
        }
        info!(?config, "config loaded");
        config
    }

    async fn setup_app(
        config: DemoConfig,
        window: &Window,
        document: &Document,
        canvas: &HtmlCanvasElement,
    ) -> Result<(), DemoError> {
        let gpu = GpuContext::new(canvas, canvas.width(), canvas.height()).await?;
        let width = gpu.config.width;
        let height = gpu.config.height;

        let scene = Rc::new(RefCell::new(Scene::new(&config, width, height)));
        let input_state = Rc::new(RefCell::new(InputState::new()));
        setup_input_listeners(document, window, canvas, input_state.clone(), KeyBindings::default())?;

        let mut render_state = RenderState::new(
            gpu.device.as_ref(),
            gpu.format,
            width,
            height,
            &scene.borrow(),
            config.seed,
        );
        let mut frame_ctx = FrameLoopContext::new(&config, scene, input_state);
        let egui_ctx = egui::Context::default();
        let mut gpu = gpu;

        let performance = window.performance();
        let mut last_time = performance.as_ref().map(|p| p.now()).unwrap_or(0.0);

        let f = RcCellCallback::new(window.clone(), {
            let window = window.clone();
            move || {
                let now = performance.as_ref().map(|p| p.now()).unwrap_or(last_time);
                let dt = frame_dt(last_time, now);
                last_time = now;

                handle_resize(&window, &mut gpu, &mut render_state, &frame_ctx);
                let stats = frame_ctx.update(dt);

                let dpr = window.device_pixel_ratio() as f32;
                let mut scene = frame_ctx.scene.borrow_mut();
                let raw_input = ui::screen_input(render_state.width, render_state.height, dpr, now);
                let mut full_output = ui::build_ui(&egui_ctx, raw_input, &mut scene, &stats);
                let primitives = egui_ctx.tessellate(std::mem::take(&mut full_output.shapes), dpr);
                render_state.set_ui(primitives, full_output.textures_delta, dpr);

                render_state.prepare(gpu.queue.as_ref(), &scene);
                drop(scene);

                match render_state.draw_frame(gpu.device.as_ref(), gpu.queue.as_ref(), &gpu.surface) {
                    Ok(()) => {}
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        warn!("surface lost, reconfiguring");
                        let (w, h) = (gpu.config.width, gpu.config.height);
                        gpu.resize(w, h);
                    }
                    Err(e) => warn!("skipping frame: {e:?}"),
                }
            }
        });
        f.start()?;

        Ok(())
    }

    fn handle_resize(window: &Window, gpu: &mut GpuContext, render_state: &mut RenderState, frame_ctx: &FrameLoopContext) {
        if let (Ok(w), Ok(h)) = (window.inner_width(), window.inner_height()) {
            let nw = w.as_f64().unwrap_or(800.0) as u32;
            let nh = h.as_f64().unwrap_or(600.0) as u32;
            if nw != render_state.width || nh != render_state.height {
                gpu.resize(nw, nh);
                render_state.resize(gpu.device.as_ref(), nw, nh);
                frame_ctx.scene.borrow_mut().camera.set_aspect(nw, nh);
            }
        }
    }

    /// Keyboard, mouse and focus listeners feeding the shared input state
    fn setup_input_listeners(
        document: &Document,
        window: &Window,
        canvas: &HtmlCanvasElement,
        input_state: Rc<RefCell<InputState>>,
        bindings: KeyBindings,
    ) -> Result<(), JsValue> {
        for (event_name, is_down) in [("keydown", true), ("keyup", false)] {
            let input_state = input_state.clone();
            let bindings = bindings.clone();
            let listener = Closure::wrap(Box::new(move |e: KeyboardEvent| {
                let event = input::wasm::keyboard_event_to_input(&e, is_down);
                if input_state.borrow_mut().process_event(&event, &bindings) {
                    e.prevent_default();
                } else {
                    debug!(key = %e.key(), "ignoring unbound key");
                }
            }) as Box<dyn FnMut(KeyboardEvent)>);
            document.add_event_listener_with_callback(event_name, listener.as_ref().unchecked_ref())?;
            listener.forget();
        }

        // Mouse down starts a drag only on the canvas; release and motion are
        // tracked on the whole document so a drag may leave the canvas
        let canvas_target: &EventTarget = canvas.as_ref();
        let document_target: &EventTarget = document.as_ref();
        for (target, event_name, is_down) in [(canvas_target, "mousedown", true), (document_target, "mouseup", false)] {
            let input_state = input_state.clone();
            let bindings = bindings.clone();
            let listener = Closure::wrap(Box::new(move |e: MouseEvent| {
                let event = input::wasm::mouse_click_to_input(&e, is_down);
                input_state.borrow_mut().process_event(&event, &bindings);
            }) as Box<dyn FnMut(MouseEvent)>);
            target.add_event_listener_with_callback(event_name, listener.as_ref().unchecked_ref())?;
            listener.forget();
        }

        // Mouse move
        {
            let input_state = input_state.clone();
            let bindings = bindings.clone();
            let mm = Closure::wrap(Box::new(move |e: MouseEvent| {
                let event = input::wasm::mouse_move_to_input(&e);
                input_state.borrow_mut().process_event(&event, &bindings);
            }) as Box<dyn FnMut(MouseEvent)>);
            document.add_event_listener_with_callback("mousemove", mm.as_ref().unchecked_ref())?;
            mm.forget();
        }

        // Mouse wheel
        {
            let input_state = input_state.clone();
            let bindings = bindings.clone();
            let wheel = Closure::wrap(Box::new(move |e: Event| {
                if let Some(event) = input::wasm::mouse_wheel_to_input(&e) {
                    input_state.borrow_mut().process_event(&event, &bindings);
                }
            }) as Box<dyn FnMut(Event)>);
            canvas.add_event_listener_with_callback("wheel", wheel.as_ref().unchecked_ref())?;
            wheel.forget();
        }

        // Focus loss - clear all keys
        {
            let input_state = input_state.clone();
            let bindings = bindings.clone();
            let blur = Closure::wrap(Box::new(move |_e: Event| {
                input_state.borrow_mut().process_event(&InputEvent::FocusLost, &bindings);
            }) as Box<dyn FnMut(Event)>);
            window.add_event_listener_with_callback("blur", blur.as_ref().unchecked_ref())?;
            blur.forget();
        }

        // Visibility change - clear all keys
        {
            let input_state = input_state.clone();
            let doc = document.clone();
            let visibility = Closure::wrap(Box::new(move |_e: Event| {
                let visible = !doc.hidden();
                input_state
                    .borrow_mut()
                    .process_event(&InputEvent::VisibilityChanged { visible }, &bindings);
            }) as Box<dyn FnMut(Event)>);
            document.add_event_listener_with_callback("visibilitychange", visibility.as_ref().unchecked_ref())?;
            visibility.forget();
        }

        Ok(())
    }

    fn init_canvas(config: &DemoConfig) -> Result<(Window, Document, HtmlCanvasElement), JsValue> {
        let window = web_sys::window().ok_or(js_error("no global `window`"))?;
        let document = window.document().ok_or(js_error("no document on window"))?;
        let body = document.body().ok_or(js_error("no body on document"))?;
        let canvas_el = document
            .create_element("canvas")?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| js_error("failed to create canvas"))?;

        let width = window.inner_width().ok().and_then(|w| w.as_f64()).map_or(config.width, |w| w as u32);
        let height = window.inner_height().ok().and_then(|h| h.as_f64()).map_or(config.height, |h| h as u32);
        canvas_el.set_width(width);
        canvas_el.set_height(height);
        body.append_child(&canvas_el)?;
        Ok((window, document, canvas_el))
    }

    fn js_error<E: Into<String>>(msg: E) -> JsValue {
        JsValue::from_str(&msg.into())
    }

    /// requestAnimationFrame loop that keeps rescheduling itself
    struct RcCellCallback {
        inner: Rc<RefCell<Box<dyn FnMut()>>>,
        window: Window,
    }

    impl RcCellCallback {
        fn new(window: Window, f: impl FnMut() + 'static) -> Self {
            Self {
                inner: Rc::new(RefCell::new(Box::new(f))),
                window,
            }
        }

        fn start(self) -> Result<(), JsValue> {
            let inner = self.inner.clone();
            let window = self.window.clone();

            let callback = Rc::new(RefCell::new(None::<Closure<dyn FnMut()>>));
            let callback_clone = callback.clone();

            *callback.borrow_mut() = Some(Closure::wrap(Box::new(move || {
                inner.borrow_mut().as_mut()();

                if let Some(cb) = callback_clone.borrow().as_ref() {
                    if let Err(err) = window.request_animation_frame(cb.as_ref().unchecked_ref()) {
                        tracing::error!("requestAnimationFrame failed: {err:?}");
                    }
                }
            }) as Box<dyn FnMut()>));

            if let Some(cb) = callback.borrow().as_ref() {
                self.window.request_animation_frame(cb.as_ref().unchecked_ref())?;
            }

            // The closure reschedules itself for the lifetime of the page
            std::mem::forget(callback);
            Ok(())
        }
    }
}
