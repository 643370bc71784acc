use glam::Vec3;
use rand::Rng;
use std::{sync::Arc, time::Instant};
use strangeflow::{SimulationConfig, SimulationHandle};
use winit::{
    dpi::{PhysicalPosition, PhysicalSize},
    event::{ElementState, Event, MouseButton, WindowEvent},
    event_loop::{ControlFlow, EventLoop, EventLoopWindowTarget},
    keyboard::{KeyCode, PhysicalKey},
    window::WindowBuilder,
};

mod renderer;
use renderer::Renderer;

// --- Global Constants ---
const WINDOW_WIDTH: u32 = 1280;
const WINDOW_HEIGHT: u32 = 720;
const INJECTION_JITTER: f32 = 3.0;
const TITLE_UPDATE_INTERVAL_SECS: f64 = 1.0;

// --- Cursor Picking ---

/// Map a cursor position to world space by casting the view ray through
/// it and intersecting the attractor's x-z plane (y = 0).
fn cursor_to_world(cursor: PhysicalPosition<f64>, size: PhysicalSize<u32>) -> Vec3 {
    let ndc_x = (cursor.x as f32 / size.width.max(1) as f32) * 2.0 - 1.0;
    let ndc_y = 1.0 - (cursor.y as f32 / size.height.max(1) as f32) * 2.0;
    let inverse = renderer::view_projection(size).inverse();
    let near = inverse.project_point3(Vec3::new(ndc_x, ndc_y, 0.0));
    let far = inverse.project_point3(Vec3::new(ndc_x, ndc_y, 1.0));
    let direction = (far - near).normalize_or_zero();
    if direction.y.abs() > 1e-6 {
        let t = -near.y / direction.y;
        if t > 0.0 {
            return near + direction * t;
        }
    }
    renderer::CAMERA_TARGET
}

fn inject_at(
    simulation: &SimulationHandle,
    cursor: PhysicalPosition<f64>,
    size: PhysicalSize<u32>,
    rng: &mut impl Rng,
) {
    let anchor = cursor_to_world(cursor, size);
    let jitter = Vec3::new(
        rng.gen_range(-INJECTION_JITTER..INJECTION_JITTER),
        rng.gen_range(-INJECTION_JITTER..INJECTION_JITTER),
        rng.gen_range(-INJECTION_JITTER..INJECTION_JITTER),
    );
    if !simulation.inject(anchor + jitter) {
        log::debug!("injection queue full, spawn request dropped");
    }
}

// --- Main Function ---
fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let event_loop = EventLoop::new()?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title("Strangeflow")
            .with_inner_size(PhysicalSize::new(WINDOW_WIDTH, WINDOW_HEIGHT))
            .build(&event_loop)?,
    );
    let mut renderer = pollster::block_on(Renderer::new(window.clone()));
    let mut simulation = Some(SimulationHandle::start(SimulationConfig::default())?);
    let mut rng = rand::thread_rng();
    let mut cursor_position: Option<PhysicalPosition<f64>> = None;
    let mut mouse_pressed = false;
    let mut last_stats_update = Instant::now();
    let mut frames_since_stats = 0u32;

    event_loop.run(move |event, elwt: &EventLoopWindowTarget<()>| {
        elwt.set_control_flow(ControlFlow::Poll);
        match event {
            Event::AboutToWait => {
                window.request_redraw();
            }
            Event::WindowEvent { window_id, event } if window_id == window.id() => match event {
                WindowEvent::CloseRequested => {
                    if let Some(simulation) = simulation.take() {
                        simulation.stop();
                    }
                    elwt.exit();
                }
                WindowEvent::Resized(physical_size) => renderer.resize(physical_size),
                WindowEvent::ScaleFactorChanged { .. } => renderer.resize(window.inner_size()),
                WindowEvent::CursorMoved { position, .. } => {
                    cursor_position = Some(position);
                    if mouse_pressed {
                        if let Some(simulation) = simulation.as_ref() {
                            inject_at(simulation, position, renderer.size, &mut rng);
                        }
                    }
                }
                WindowEvent::MouseInput {
                    state,
                    button: MouseButton::Left,
                    ..
                } => {
                    mouse_pressed = state == ElementState::Pressed;
                    if mouse_pressed {
                        if let (Some(simulation), Some(position)) =
                            (simulation.as_ref(), cursor_position)
                        {
                            inject_at(simulation, position, renderer.size, &mut rng);
                        }
                    }
                }
                WindowEvent::KeyboardInput {
                    event: key_event, ..
                } => {
                    if key_event.state == ElementState::Pressed && !key_event.repeat {
                        if let PhysicalKey::Code(KeyCode::Escape) = key_event.physical_key {
                            if let Some(simulation) = simulation.take() {
                                simulation.stop();
                            }
                            elwt.exit();
                        }
                    }
                }
                WindowEvent::RedrawRequested => {
                    let Some(simulation) = simulation.as_mut() else {
                        return;
                    };
                    // Re-upload only when a fresh snapshot arrived; stale
                    // frames redraw the last-known state.
                    if let Some(snapshot) = simulation.try_get_latest() {
                        renderer.upload(&snapshot.particles);
                    }
                    match renderer.render() {
                        Ok(_) => {}
                        Err(wgpu::SurfaceError::Lost) => renderer.resize(renderer.size),
                        Err(wgpu::SurfaceError::OutOfMemory) => {
                            eprintln!("WGPU Error: OutOfMemory");
                            elwt.exit();
                        }
                        Err(e) => eprintln!("WGPU Error: {:?}", e),
                    }
                    frames_since_stats += 1;
                    let now = Instant::now();
                    let elapsed_secs = now.duration_since(last_stats_update).as_secs_f64();
                    if elapsed_secs >= TITLE_UPDATE_INTERVAL_SECS {
                        let fps = frames_since_stats as f64 / elapsed_secs;
                        last_stats_update = now;
                        frames_since_stats = 0;
                        let (particle_count, sim_time) = simulation
                            .latest()
                            .map(|s| (s.len(), s.time))
                            .unwrap_or((0, 0.0));
                        window.set_title(&format!(
                            "Strangeflow - Particles: {} - Queued: {} - t: {:.1}s - FPS: {:.1}",
                            particle_count,
                            simulation.injection_backlog(),
                            sim_time,
                            fps
                        ));
                    }
                }
                _ => {}
            },
            _ => {}
        }
    })?;
    Ok(())
}
