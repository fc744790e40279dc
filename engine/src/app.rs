use std::error::Error;

use pixels::{Pixels, PixelsBuilder, SurfaceTexture};
use winit::dpi::PhysicalSize;
use winit::event::{Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::WindowBuilder;

use crate::profiling::TickTimings;
use crate::timing::FrameTiming;
use crate::{FrameLoop, SystemClock, TickApp};

pub struct HeadfulConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub vsync: Option<bool>,
}

impl Default for HeadfulConfig {
    fn default() -> Self {
        Self {
            title: "runner".to_string(),
            width: 960,
            height: 540,
            vsync: None,
        }
    }
}

/// Wraps a [`TickApp`] and a pixel-buffer draw callback so the pair can be
/// driven by the frame loop as one app: `render` fills the RGBA frame and
/// presents it.
struct Headful<A, F> {
    app: A,
    pixels: Pixels,
    width: u32,
    height: u32,
    draw: F,
}

impl<A, F> TickApp for Headful<A, F>
where
    A: TickApp,
    F: FnMut(&mut A, &mut [u8], u32, u32),
{
    fn update(&mut self, dt_ms: f64, now_ms: f64) {
        self.app.update(dt_ms, now_ms);
    }

    fn render(&mut self) {
        self.app.render();
        (self.draw)(&mut self.app, self.pixels.frame_mut(), self.width, self.height);
        if let Err(err) = self.pixels.render() {
            log::error!("present failed: {err}");
        }
    }

    fn post_render(&mut self, timing: &FrameTiming, timings: TickTimings, now_ms: f64) {
        self.app.post_render(timing, timings, now_ms);
    }

    fn should_exit(&self) -> bool {
        self.app.should_exit()
    }
}

/// Run a [`TickApp`] inside a window, one tick per display-driven redraw.
///
/// This is the production loop driver; headless and test drivers call
/// [`FrameLoop::tick`] directly with a [`crate::ManualClock`] instead.
pub fn run_headful<A, F>(config: HeadfulConfig, app: A, draw: F) -> Result<(), Box<dyn Error>>
where
    A: TickApp + 'static,
    F: FnMut(&mut A, &mut [u8], u32, u32) + 'static,
{
    let event_loop = EventLoop::new();
    let window = WindowBuilder::new()
        .with_title(&config.title)
        .with_inner_size(PhysicalSize::new(config.width, config.height))
        .build(&event_loop)?;

    let window_size = window.inner_size();
    let surface_texture = SurfaceTexture::new(window_size.width, window_size.height, &window);
    let mut builder = PixelsBuilder::new(window_size.width, window_size.height, surface_texture);
    if let Some(vsync) = config.vsync {
        builder = builder.enable_vsync(vsync);
    }
    let pixels = builder.build()?;

    let mut headful = Headful {
        app,
        pixels,
        width: window_size.width,
        height: window_size.height,
        draw,
    };
    let mut frame_loop = FrameLoop::new(SystemClock::new());

    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Poll;

        match event {
            Event::WindowEvent { event, .. } => match event {
                WindowEvent::CloseRequested => {
                    *control_flow = ControlFlow::Exit;
                }
                WindowEvent::Resized(size) => {
                    if let Err(err) = headful.pixels.resize_surface(size.width, size.height) {
                        log::error!("surface resize failed: {err}");
                    }
                }
                _ => {}
            },
            Event::RedrawRequested(_) => {
                frame_loop.tick(&mut headful);
                if frame_loop.stop_requested() {
                    *control_flow = ControlFlow::Exit;
                }
            }
            Event::MainEventsCleared => {
                window.request_redraw();
            }
            _ => {}
        }
    });

    #[allow(unreachable_code)]
    Ok(())
}
