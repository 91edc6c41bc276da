//! Cardview - renders JSON cards in a desktop window
//!
//! Usage: cardview [--template card.json] [--data data.json] [--layout-log]

use cardview::config::{self, CardStyle, Settings};
use cardview::factory::FactoryRegistry;
use cardview::fetch::HttpFetcher;
use cardview::provider::FileCardProvider;
use cardview::render::{FrameBuffer, TextRenderer};
use cardview::scene::{Scene, SceneOptions};
use cardview::session::{CardSession, ShowReport};
use cardview::logging;
use clap::Parser;
use softbuffer::{Context, Surface};
use std::num::NonZeroU32;
use std::path::PathBuf;
use std::rc::Rc;
use tracing::{error, info, warn};
use winit::{
    dpi::PhysicalSize,
    event::{ElementState, Event, KeyboardInput, MouseScrollDelta, VirtualKeyCode, WindowEvent},
    event_loop::{ControlFlow, EventLoop},
    window::WindowBuilder,
};

#[derive(Debug, Parser)]
#[command(name = "cardview", version, about = "Render a JSON card with bound data")]
struct Args {
    /// Settings file
    #[arg(long, default_value = config::CONFIG_FILENAME)]
    config: PathBuf,

    /// Card template to show instead of the configured one
    #[arg(long)]
    template: Option<PathBuf>,

    /// Data document to bind instead of the configured one
    #[arg(long)]
    data: Option<PathBuf>,

    /// Content width in pixels
    #[arg(long)]
    width: Option<u32>,

    /// Print the laid out widget tree and exit
    #[arg(long)]
    layout_log: bool,
}

const SCROLL_LINE: f32 = 40.0;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    logging::init();

    let mut settings = config::load_settings(&args.config);
    if let Some(template) = &args.template {
        apply_template_override(&mut settings, template);
    }
    let width = args.width.unwrap_or(settings.window.width);
    let data = match &args.data {
        Some(path) => std::fs::read_to_string(path)?,
        None => String::new(),
    };

    let text = TextRenderer::load(settings.text.font_path.as_deref());
    let mut scene = Scene::new(
        text,
        SceneOptions {
            base_font_size: settings.text.base_size,
            placeholder_height: settings.image.placeholder_height,
        },
    );
    let registry = FactoryRegistry::with_defaults(CardStyle::from(&settings));
    let provider = FileCardProvider::from_settings(&settings.cards);
    let mut session =
        CardSession::new(provider, registry, Rc::new(HttpFetcher)).with_width(width);

    let initial = settings.cards.initial.clone();
    if args.layout_log {
        let report = session.show_card(&initial, &data, &mut scene)?;
        print!("{}", scene.describe());
        log_report(&report);
        return Ok(());
    }

    match session.show_card(&initial, &data, &mut scene) {
        Ok(report) => log_report(&report),
        Err(e) => error!("Failed to show {:?}: {}", initial, e),
    }

    // Create window and graphics context
    let event_loop = EventLoop::new();
    let window = WindowBuilder::new()
        .with_inner_size(PhysicalSize::new(width, settings.window.height))
        .with_title(settings.window.title.as_str())
        .build(&event_loop)?;

    let context = unsafe { Context::new(&window) }?;
    let mut surface = unsafe { Surface::new(&context, &window) }?;

    let size = window.inner_size();
    let mut fb = FrameBuffer::new(size.width as usize, size.height as usize);
    let mut scroll_y: u32 = 0;

    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Wait;

        match event {
            Event::WindowEvent { event, .. } => match event {
                WindowEvent::CloseRequested => {
                    *control_flow = ControlFlow::Exit;
                }
                WindowEvent::Resized(new_size) => {
                    let (Some(w), Some(h)) = (
                        NonZeroU32::new(new_size.width),
                        NonZeroU32::new(new_size.height),
                    ) else {
                        return;
                    };
                    if let Err(e) = surface.resize(w, h) {
                        error!("Failed to resize surface: {}", e);
                        return;
                    }
                    fb = FrameBuffer::new(new_size.width as usize, new_size.height as usize);
                    session.on_resize(&mut scene, new_size.width);
                    scroll_y = scroll_y.min(max_scroll(&scene, fb.height));
                    window.request_redraw();
                }
                WindowEvent::MouseWheel { delta, .. } => {
                    let delta = match delta {
                        MouseScrollDelta::LineDelta(_, y) => y * SCROLL_LINE,
                        MouseScrollDelta::PixelDelta(pos) => pos.y as f32,
                    };
                    let next = (scroll_y as f32 - delta).max(0.0) as u32;
                    let next = next.min(max_scroll(&scene, fb.height));
                    if next != scroll_y {
                        scroll_y = next;
                        window.request_redraw();
                    }
                }
                WindowEvent::KeyboardInput {
                    input:
                        KeyboardInput {
                            state: ElementState::Pressed,
                            virtual_keycode: Some(VirtualKeyCode::F5),
                            ..
                        },
                    ..
                } => {
                    match session.reload(&mut scene) {
                        Some(Ok(report)) => log_report(&report),
                        Some(Err(e)) => error!("Reload failed: {}", e),
                        None => warn!("Nothing to reload"),
                    }
                    scroll_y = scroll_y.min(max_scroll(&scene, fb.height));
                    window.request_redraw();
                }
                _ => {}
            },
            Event::RedrawRequested(_) => {
                draw(&scene, &mut fb, scroll_y);

                // Present framebuffer
                let mut buffer = match surface.buffer_mut() {
                    Ok(buffer) => buffer,
                    Err(e) => {
                        error!("Failed to map surface buffer: {}", e);
                        return;
                    }
                };
                if buffer.len() == fb.pixels.len() {
                    buffer.copy_from_slice(&fb.pixels);
                }
                if let Err(e) = buffer.present() {
                    error!("Failed to present frame: {}", e);
                }
            }
            _ => {}
        }
    });
}

/// `--template some/dir/card.json` reads cards from `some/dir`.
fn apply_template_override(settings: &mut Settings, template: &std::path::Path) {
    if let Some(dir) = template.parent().filter(|d| !d.as_os_str().is_empty()) {
        settings.cards.dir = dir.to_path_buf();
    }
    if let Some(name) = template.file_name() {
        settings.cards.template = name.to_string_lossy().into_owned();
    }
}

fn log_report(report: &ShowReport) {
    if report.is_complete() {
        info!("{:?}: all {} bindings resolved", report.locator, report.sinks);
    } else {
        warn!(
            "{:?}: {} of {} bindings unresolved",
            report.locator,
            report.unresolved.len(),
            report.sinks
        );
    }
}

fn max_scroll(scene: &Scene, viewport_height: usize) -> u32 {
    scene.content_height().saturating_sub(viewport_height as u32)
}

/// Paint the whole card off-screen, then copy the visible rows.
fn draw(scene: &Scene, fb: &mut FrameBuffer, scroll_y: u32) {
    let full_height = (scene.content_height() as usize).max(fb.height);
    let mut content = FrameBuffer::new(fb.width, full_height);
    scene.paint(&mut content);

    let offset = (scroll_y as usize).min(full_height - fb.height);
    let start = offset * fb.width;
    let end = start + fb.height * fb.width;
    fb.pixels.copy_from_slice(&content.pixels[start..end]);
}
