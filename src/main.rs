use anyhow::Result;
use glam::Vec3;
use log::{error, info};
use std::sync::Arc;
use winit::{
    event::{Event, WindowEvent},
    event_loop::EventLoop,
    keyboard::{KeyCode, PhysicalKey},
    window::WindowBuilder,
};

mod config;
mod core;
mod engine;
mod sandbox;

use config::SandboxConfig;
use engine::audio::open_cue_player;
use engine::input::InputManager;
use engine::renderer::{RenderBackend, Renderer};
use sandbox::{SimulationContext, SpawnRequest};

fn main() -> Result<()> {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info,wgpu_core=warn,wgpu_hal=warn,naga=warn"),
    )
    .init();

    info!("Starting Physics Sandbox...");

    let config = SandboxConfig::load()?;

    let event_loop = EventLoop::new()?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(config.window.title.as_str())
            .with_inner_size(winit::dpi::LogicalSize::new(
                config.window.width,
                config.window.height,
            ))
            .with_resizable(true)
            .build(&event_loop)?,
    );

    info!("Window created successfully");

    let mut renderer = pollster::block_on(Renderer::new(window.clone()))?;
    let cue_player = open_cue_player(config.audio.cue_path.as_deref());
    let mut ctx = SimulationContext::new(&config, cue_player, Box::new(rand::rng()));
    let mut input = InputManager::new();

    let size = window.inner_size();
    ctx.resize(size.width, size.height, &mut renderer);

    // Something to look at before the first click
    if let Err(e) = ctx.spawn(SpawnRequest::sphere(0.5, Vec3::new(0.0, 3.0, 0.0))) {
        error!("Failed to spawn initial sphere: {}", e);
    }

    info!("Controls: [1] Create Sphere, [2] Create Box, [R] Reset Scene, drag to orbit, scroll to zoom");

    // Every frame requests the next one, so one request starts the loop
    renderer.request_frame();

    event_loop
        .run(move |event, elwt| {
            let Event::WindowEvent { event, .. } = event else {
                return;
            };

            match event {
                WindowEvent::CloseRequested => {
                    info!("Close requested, shutting down...");
                    elwt.exit();
                }
                WindowEvent::Resized(physical_size) => {
                    ctx.resize(physical_size.width, physical_size.height, &mut renderer);
                }
                WindowEvent::KeyboardInput { event, .. } => {
                    if event.physical_key == PhysicalKey::Code(KeyCode::Escape) {
                        elwt.exit();
                        return;
                    }
                    input.process_keyboard_event(&event);
                    for action in input.take_actions() {
                        if let Err(e) = ctx.apply(action) {
                            error!("{} failed: {}", action.label(), e);
                        }
                    }
                }
                WindowEvent::MouseInput { state, button, .. } => {
                    input.process_mouse_button(button, state);
                }
                WindowEvent::CursorMoved { position, .. } => {
                    input.process_cursor_moved(position.x, position.y);
                }
                WindowEvent::CursorLeft { .. } => input.process_cursor_left(),
                WindowEvent::MouseWheel { delta, .. } => input.process_scroll(delta),
                WindowEvent::RedrawRequested => {
                    input.apply_orbit(&mut ctx.controls, window.inner_size().height as f32);
                    let elapsed = ctx.clock().elapsed_secs();
                    ctx.run_frame(elapsed, &mut renderer);

                    if ctx.clock().frame_count() % 30 == 0 {
                        window.set_title(&format!(
                            "{} | {:.0} FPS | {} bodies",
                            config.window.title,
                            ctx.clock().fps(),
                            ctx.registry.len()
                        ));
                    }
                }
                _ => {}
            }
        })
        .map_err(|e| anyhow::anyhow!("Event loop error: {}", e))?;

    Ok(())
}
