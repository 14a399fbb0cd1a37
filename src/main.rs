use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, error, info, warn};
use winit::{
    event::*,
    event_loop::EventLoop,
    window::Window,
};

// Import from the library crate
use boxfall::{controller, logging, ui};
use boxfall::config::DemoConfig;
use boxfall::error::DemoError;
use boxfall::model::Scene;
use boxfall::view::{GpuContext, RenderState};

use controller::input::native::{key_event_to_input, mouse_button_to_input, wheel_to_input};
use controller::{FrameLoopContext, InputEvent, InputState, KeyBindings};

struct App {
    window: Arc<Window>,
    gpu: GpuContext,
    render_state: RenderState,

    // egui
    egui_state: egui_winit::State,
    egui_ctx: egui::Context,

    // Frame state
    frame_ctx: FrameLoopContext,
    input_state: Rc<RefCell<InputState>>,
    bindings: KeyBindings,
    /// Last cursor position, for turning absolute positions into drag deltas
    cursor: Option<winit::dpi::PhysicalPosition<f64>>,
    last_frame_time: Instant,
}

impl App {
    async fn new(window: Arc<Window>, config: &DemoConfig) -> Result<Self, DemoError> {
        let gpu = GpuContext::new_native(window.clone()).await?;
        let width = gpu.config.width;
        let height = gpu.config.height;

        let scene = Rc::new(RefCell::new(Scene::new(config, width, height)));
        let render_state = RenderState::new(
            gpu.device.as_ref(),
            gpu.format,
            width,
            height,
            &scene.borrow(),
            config.seed,
        );

        let egui_ctx = egui::Context::default();
        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            None,
            None,
            None,
        );

        let input_state = Rc::new(RefCell::new(InputState::new()));
        let frame_ctx = FrameLoopContext::new(config, scene, input_state.clone());

        Ok(Self {
            window,
            gpu,
            render_state,
            egui_state,
            egui_ctx,
            frame_ctx,
            input_state,
            bindings: KeyBindings::default(),
            cursor: None,
            last_frame_time: Instant::now(),
        })
    }

    /// Returns true when the event was consumed
    fn input(&mut self, event: &WindowEvent) -> bool {
        if self.egui_state.on_window_event(self.window.as_ref(), event).consumed {
            return true;
        }

        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                if let Some(input_event) = key_event_to_input(event) {
                    if !self.input_state.borrow_mut().process_event(&input_event, &self.bindings) {
                        debug!(event = ?input_event, "ignoring unbound key");
                    }
                }
                true
            }
            WindowEvent::MouseInput { state, button, .. } => {
                if let Some(input_event) = mouse_button_to_input(*state, *button) {
                    self.input_state.borrow_mut().process_event(&input_event, &self.bindings);
                }
                true
            }
            WindowEvent::CursorMoved { position, .. } => {
                if let Some(last) = self.cursor.replace(*position) {
                    let input_event = InputEvent::MouseMove {
                        dx: (position.x - last.x) as f32,
                        dy: (position.y - last.y) as f32,
                    };
                    self.input_state.borrow_mut().process_event(&input_event, &self.bindings);
                }
                true
            }
            WindowEvent::CursorLeft { .. } => {
                self.cursor = None;
                false
            }
            WindowEvent::MouseWheel { delta, .. } => {
                self.input_state.borrow_mut().process_event(&wheel_to_input(delta), &self.bindings);
                true
            }
            WindowEvent::Focused(false) => {
                self.input_state.borrow_mut().process_event(&InputEvent::FocusLost, &self.bindings);
                true
            }
            WindowEvent::Occluded(occluded) => {
                self.input_state
                    .borrow_mut()
                    .process_event(&InputEvent::VisibilityChanged { visible: !occluded }, &self.bindings);
                true
            }
            _ => false,
        }
    }

    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.gpu.resize(new_size.width, new_size.height);
            self.render_state.resize(self.gpu.device.as_ref(), new_size.width, new_size.height);
            self.frame_ctx.scene.borrow_mut().camera.set_aspect(new_size.width, new_size.height);
        }
    }

    fn update(&mut self, dt: f32) {
        let stats = self.frame_ctx.update(dt);

        let raw_input = self.egui_state.take_egui_input(&self.window);
        let mut scene = self.frame_ctx.scene.borrow_mut();
        let output = ui::build_ui(&self.egui_ctx, raw_input, &mut scene, &stats);
        self.egui_state.handle_platform_output(&self.window, output.platform_output);

        let dpr = self.window.scale_factor() as f32;
        let primitives = self.egui_ctx.tessellate(output.shapes, dpr);
        self.render_state.set_ui(primitives, output.textures_delta, dpr);
        self.render_state.prepare(self.gpu.queue.as_ref(), &scene);
    }

    fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        self.render_state
            .draw_frame(self.gpu.device.as_ref(), self.gpu.queue.as_ref(), &self.gpu.surface)
    }
}

fn main() {
    logging::init();

    let (config, rejected) = DemoConfig::from_env();
    for err in rejected {
        warn!("ignoring env override: {err}");
    }
    info!(?config, "config loaded");

    if let Err(err) = run(config) {
        error!("{err}");
        std::process::exit(1);
    }
}

fn run(config: DemoConfig) -> Result<(), Box<dyn std::error::Error>> {
    let event_loop = EventLoop::new()?;
    let window_attributes = Window::default_attributes()
        .with_title("boxfall")
        .with_inner_size(winit::dpi::LogicalSize::new(config.width, config.height));
    #[allow(deprecated)]
    let window = Arc::new(event_loop.create_window(window_attributes)?);

    let mut app = pollster::block_on(App::new(window, &config))?;

    #[allow(deprecated)]
    event_loop.run(move |event, elwt| {
        match event {
            Event::WindowEvent {
                ref event,
                window_id,
            } if window_id == app.window.id() => {
                if !app.input(event) {
                    match event {
                        WindowEvent::CloseRequested => elwt.exit(),
                        WindowEvent::Resized(physical_size) => {
                            app.resize(*physical_size);
                        }
                        WindowEvent::RedrawRequested => {
                            let now = Instant::now();
                            let dt = (now - app.last_frame_time).as_secs_f32();
                            app.last_frame_time = now;

                            app.update(dt);

                            match app.render() {
                                Ok(_) => {}
                                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                                    warn!("surface lost, reconfiguring");
                                    app.resize(app.window.inner_size());
                                }
                                Err(wgpu::SurfaceError::OutOfMemory) => elwt.exit(),
                                Err(e) => warn!("skipping frame: {e:?}"),
                            }
                        }
                        _ => {}
                    }
                }
            }
            Event::AboutToWait => {
                app.window.request_redraw();
            }
            _ => {}
        }
    })?;

    Ok(())
}
