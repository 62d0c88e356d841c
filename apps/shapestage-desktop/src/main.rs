use anyhow::{Context, Result};
use clap::Parser;
use egui::Context as EguiContext;
use glam::Vec2;
use shapestage_common::Color;
use shapestage_input::PointerDispatcher;
use shapestage_kernel::{ComposedScene, FrameClock, FrameTime, SceneError, SceneVariant, compose};
use shapestage_params::{ParamSpec, ParamStore, ParamValue, load_overrides};
use shapestage_render_wgpu::{OrbitCamera, WgpuRenderer};
use shapestage_tools::{EventTally, SceneInspector};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event::{ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

#[derive(Parser)]
#[command(name = "shapestage-desktop", about = "Shapestage desktop viewer")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Scene variant: basic or tunable
    #[arg(long, default_value = "tunable")]
    variant: SceneVariant,

    /// JSON file of parameter overrides, e.g. {"lightIntensity": 3.0}
    #[arg(long)]
    params: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Drag {
    Orbit,
    Pan,
}

/// Application state.
struct AppState {
    composed: ComposedScene,
    params: ParamStore,
    camera: OrbitCamera,
    clock: FrameClock,
    pointer: PointerDispatcher,
    activity: EventTally,
    show_panel: bool,
    size: PhysicalSize<u32>,
    cursor: Option<PhysicalPosition<f64>>,
    drag: Option<Drag>,
    /// Set once a frame fails so the log is not flooded every redraw.
    halted: bool,
}

impl AppState {
    fn new(variant: SceneVariant, overrides: Option<PathBuf>) -> Result<Self> {
        let mut params = ParamStore::new();
        let mut composed = compose(variant, &mut params)?;
        if let Some(path) = overrides {
            let overrides = load_overrides(&path)
                .with_context(|| format!("reading parameter overrides from {}", path.display()))?;
            params.apply_overrides(&overrides)?;
            composed.sync_params(&mut params)?;
        }
        let camera = OrbitCamera::from_settings(&composed.orbit);
        Ok(Self {
            composed,
            params,
            camera,
            clock: FrameClock::new(),
            pointer: PointerDispatcher::new(),
            activity: EventTally::new(),
            show_panel: true,
            size: PhysicalSize::new(1280, 720),
            cursor: None,
            drag: None,
            halted: false,
        })
    }

    fn aspect(&self) -> f32 {
        self.size.width as f32 / self.size.height.max(1) as f32
    }

    /// One frame: pointer dispatch, parameter sync, animation.
    fn update(&mut self) {
        let frame = self.clock.tick();
        if self.halted {
            return;
        }
        if let Err(e) = self.advance(frame) {
            tracing::error!("frame {} failed: {e}", frame.frame);
            self.halted = true;
        }
        self.activity.absorb(&mut self.composed.scene);
    }

    fn advance(&mut self, frame: FrameTime) -> Result<(), SceneError> {
        self.pointer.flush(&mut self.composed.scene)?;
        self.composed.sync_params(&mut self.params)?;
        self.composed.scene.step(frame)
    }

    fn cursor_moved(&mut self, position: PhysicalPosition<f64>) {
        if let (Some(last), Some(drag)) = (self.cursor, self.drag) {
            let dx = (position.x - last.x) as f32;
            let dy = (position.y - last.y) as f32;
            match drag {
                Drag::Orbit => self.camera.orbit(dx, dy),
                Drag::Pan => self.camera.pan(dx, dy),
            }
        }
        self.cursor = Some(position);

        let ndc = Vec2::new(
            (position.x as f32 / self.size.width.max(1) as f32) * 2.0 - 1.0,
            1.0 - (position.y as f32 / self.size.height.max(1) as f32) * 2.0,
        );
        let ray = self.camera.render_view().ray_through(ndc, self.aspect());
        self.pointer.pointer_moved(ray);
    }

    fn cursor_left(&mut self) {
        self.cursor = None;
        self.drag = None;
        self.pointer.pointer_left();
    }

    fn mouse_button(&mut self, button: MouseButton, pressed: bool) {
        let drag = match button {
            MouseButton::Left => Drag::Orbit,
            MouseButton::Right => Drag::Pan,
            _ => return,
        };
        if pressed {
            self.drag = Some(drag);
        } else if self.drag == Some(drag) {
            self.drag = None;
        }
    }

    fn scroll(&mut self, delta: MouseScrollDelta) {
        let lines = match delta {
            MouseScrollDelta::LineDelta(_, y) => y,
            MouseScrollDelta::PixelDelta(p) => p.y as f32 / 40.0,
        };
        if !self.camera.zoom(lines) {
            tracing::debug!("zoom disabled for this scene");
        }
    }

    fn handle_key(&mut self, key: KeyCode, pressed: bool) {
        if !pressed {
            return;
        }
        match key {
            KeyCode::F1 => self.show_panel = !self.show_panel,
            KeyCode::KeyR => {
                self.camera = OrbitCamera::from_settings(&self.composed.orbit);
                tracing::info!("camera reset");
            }
            _ => {}
        }
    }

    fn set_param(&mut self, name: &str, value: ParamValue) {
        match self.params.set(name, value) {
            Ok(stored) => tracing::debug!(name, %stored, "parameter edited"),
            Err(e) => tracing::warn!("parameter edit rejected: {e}"),
        }
    }

    fn draw_ui(&mut self, ctx: &EguiContext) {
        if !self.show_panel {
            return;
        }

        let summary = SceneInspector::summary(&self.composed.scene);
        let entries: Vec<(String, ParamSpec, ParamValue)> = self
            .params
            .entries()
            .map(|e| (e.name.to_string(), e.spec.clone(), e.value))
            .collect();

        egui::SidePanel::left("inspector")
            .default_width(280.0)
            .show(ctx, |ui| {
                ui.heading("Shapestage");
                ui.separator();
                ui.label(format!("Variant: {}", self.composed.variant));
                ui.label(format!(
                    "Frame: {}  Elapsed: {:.2}s",
                    summary.frame, summary.elapsed
                ));
                ui.label(format!(
                    "Shapes: {}  Hovered: {}",
                    summary.shape_count, summary.hovered
                ));
                let eye = self.camera.eye();
                ui.label(format!("Camera: ({:.1}, {:.1}, {:.1})", eye.x, eye.y, eye.z));
                if let (Some(color), Some(intensity)) = (summary.light_color, summary.light_intensity) {
                    ui.label(format!("Light: {color} x{intensity:.1}"));
                }
                ui.label(format!(
                    "Hover: +{} / -{}  Edits: {}",
                    self.activity.hover_enters,
                    self.activity.hover_leaves,
                    self.activity.descriptor_changes
                ));
                if self.halted {
                    ui.colored_label(egui::Color32::RED, "Animation halted, see log");
                }

                if !entries.is_empty() {
                    ui.separator();
                    ui.heading("Parameters");
                }
                for (name, spec, value) in &entries {
                    ui.horizontal(|ui| {
                        ui.label(name.as_str());
                        match (spec, value) {
                            (ParamSpec::Number { range: Some(r), .. }, ParamValue::Number(v)) => {
                                let mut edited = *v;
                                let slider = egui::Slider::new(&mut edited, r.min..=r.max).step_by(r.step);
                                if ui.add(slider).changed() {
                                    self.set_param(name, ParamValue::Number(edited));
                                }
                            }
                            (ParamSpec::Number { range: None, .. }, ParamValue::Number(v)) => {
                                let mut edited = *v;
                                if ui.add(egui::DragValue::new(&mut edited).speed(0.1)).changed() {
                                    self.set_param(name, ParamValue::Number(edited));
                                }
                            }
                            (ParamSpec::Color { .. }, ParamValue::Color(c)) => {
                                let mut rgb = [c.r, c.g, c.b];
                                if ui.color_edit_button_srgb(&mut rgb).changed() {
                                    let edited = Color::rgb(rgb[0], rgb[1], rgb[2]);
                                    self.set_param(name, ParamValue::Color(edited));
                                }
                            }
                            _ => {
                                ui.label(value.to_string());
                            }
                        }
                    });
                }

                ui.separator();
                ui.heading("Shapes");
                for id in SceneInspector::list_shapes(&self.composed.scene) {
                    if let Some(info) = SceneInspector::inspect_shape(&self.composed.scene, id) {
                        let text = format!("{} {} {}", info.name, info.kind, info.color);
                        ui.selectable_label(info.hovered, text);
                    }
                }

                ui.separator();
                let zoom = if self.camera.enable_zoom { " | Wheel: Zoom" } else { "" };
                ui.small(format!("F1: Toggle Panel | LMB: Orbit | RMB: Pan{zoom} | R: Reset"));
            });
    }
}

struct GpuApp {
    state: AppState,
    window: Option<Arc<Window>>,
    surface: Option<wgpu::Surface<'static>>,
    device: Option<wgpu::Device>,
    queue: Option<wgpu::Queue>,
    config: Option<wgpu::SurfaceConfiguration>,
    renderer: Option<WgpuRenderer>,
    egui_ctx: EguiContext,
    egui_winit: Option<egui_winit::State>,
    egui_renderer: Option<egui_wgpu::Renderer>,
}

impl GpuApp {
    fn new(state: AppState) -> Self {
        Self {
            state,
            window: None,
            surface: None,
            device: None,
            queue: None,
            config: None,
            renderer: None,
            egui_ctx: EguiContext::default(),
            egui_winit: None,
            egui_renderer: None,
        }
    }

    fn draw_egui(&mut self, view: &wgpu::TextureView) {
        let (Some(device), Some(queue), Some(window), Some(egui_winit), Some(egui_renderer), Some(config)) = (
            &self.device,
            &self.queue,
            &self.window,
            &mut self.egui_winit,
            &mut self.egui_renderer,
            &self.config,
        ) else {
            return;
        };

        let raw_input = egui_winit.take_egui_input(window);
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            self.state.draw_ui(ctx);
        });
        egui_winit.handle_platform_output(window, full_output.platform_output);

        let paint_jobs = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [config.width, config.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        for (id, image_delta) in &full_output.textures_delta.set {
            egui_renderer.update_texture(device, queue, *id, image_delta);
        }
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("egui_encoder"),
        });
        egui_renderer.update_buffers(device, queue, &mut encoder, &paint_jobs, &screen_descriptor);
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui_pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();
            egui_renderer.render(&mut pass, &paint_jobs, &screen_descriptor);
        }
        queue.submit(std::iter::once(encoder.finish()));
        for id in &full_output.textures_delta.free {
            egui_renderer.free_texture(id);
        }
    }
}

impl ApplicationHandler for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attrs = Window::default_attributes()
            .with_title("Shapestage")
            .with_inner_size(PhysicalSize::new(1280u32, 720));
        let window = Arc::new(event_loop.create_window(attrs).expect("create window"));

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .expect("create surface");

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .expect("find adapter");

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("shapestage_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .expect("create device");

        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);
        self.state.size = size;

        let renderer = WgpuRenderer::new(&device, surface_format, size.width, size.height);

        let egui_winit = egui_winit::State::new(
            self.egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&device, surface_format, None, 1, false);

        self.window = Some(window);
        self.surface = Some(surface);
        self.device = Some(device);
        self.queue = Some(queue);
        self.config = Some(config);
        self.renderer = Some(renderer);
        self.egui_winit = Some(egui_winit);
        self.egui_renderer = Some(egui_renderer);

        tracing::info!(
            "GPU initialized with {} backend",
            adapter.get_info().backend.to_str()
        );
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let (Some(egui_winit), Some(window)) = (&mut self.egui_winit, &self.window) {
            let response = egui_winit.on_window_event(window, &event);
            if response.consumed {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                self.state.composed.unmount(&mut self.state.params);
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                self.state.size = new_size;
                if let (Some(surface), Some(device), Some(config)) =
                    (&self.surface, &self.device, &mut self.config)
                {
                    config.width = new_size.width.max(1);
                    config.height = new_size.height.max(1);
                    surface.configure(device, config);
                    if let Some(renderer) = &mut self.renderer {
                        renderer.resize(device, config.width, config.height);
                    }
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: key_state,
                        ..
                    },
                ..
            } => {
                self.state
                    .handle_key(key, key_state == ElementState::Pressed);
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.state.cursor_moved(position);
            }
            WindowEvent::CursorLeft { .. } => {
                self.state.cursor_left();
            }
            WindowEvent::MouseInput { button, state, .. } => {
                self.state
                    .mouse_button(button, state == ElementState::Pressed);
            }
            WindowEvent::MouseWheel { delta, .. } => {
                self.state.scroll(delta);
            }
            WindowEvent::RedrawRequested => {
                self.state.update();

                let (Some(surface), Some(device), Some(queue)) =
                    (&self.surface, &self.device, &self.queue)
                else {
                    return;
                };

                let output = match surface.get_current_texture() {
                    Ok(t) => t,
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        if let Some(config) = &self.config {
                            surface.configure(device, config);
                        }
                        return;
                    }
                    Err(e) => {
                        tracing::error!("surface error: {e}");
                        return;
                    }
                };

                let view = output
                    .texture
                    .create_view(&wgpu::TextureViewDescriptor::default());

                if let Some(renderer) = &mut self.renderer {
                    renderer.render(
                        device,
                        queue,
                        &view,
                        &self.state.camera.render_view(),
                        self.state.aspect(),
                        &self.state.composed.scene,
                    );
                }

                self.draw_egui(&view);

                output.present();
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!(variant = %cli.variant, "shapestage-desktop starting");

    let state = AppState::new(cli.variant, cli.params)?;

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = GpuApp::new(state);
    event_loop.run_app(&mut app)?;

    Ok(())
}
