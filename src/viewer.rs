//! Live viewer window (eframe/egui)
//!
//! Keys: `q` quit, `n` next channel, `p` previous channel, `m` enter a channel id.

use crate::acquisition::{Acquisition, DisplaySink, Flow};
use crate::api::SnapshotSource;
use crate::config::AppConfig;
use crate::error::ViewerError;
use crate::models::{Command, Frame};
use eframe::egui;
use std::time::{Duration, Instant};

/// How often the UI wakes up to collect fetch results
const REPAINT_INTERVAL: Duration = Duration::from_millis(10);

const OVERLAY_COLOR: egui::Color32 = egui::Color32::from_rgb(0, 255, 0);

/// Display sink backed by an egui texture
#[derive(Default)]
pub struct TextureSink {
    pending: Option<egui::ColorImage>,
    texture: Option<egui::TextureHandle>,
    overlay: String,
    last_error: Option<String>,
    closed: bool,
}

impl TextureSink {
    /// Move the latest frame into GPU memory
    fn upload(&mut self, ctx: &egui::Context) {
        let Some(image) = self.pending.take() else {
            return;
        };
        match self.texture {
            Some(ref mut texture) => texture.set(image, egui::TextureOptions::LINEAR),
            None => {
                self.texture = Some(ctx.load_texture("snapshot", image, egui::TextureOptions::LINEAR));
            }
        }
    }
}

impl DisplaySink for TextureSink {
    fn show(&mut self, frame: &Frame, overlay: &str) {
        let expected = frame.width as usize * frame.height as usize * frame.format.bytes_per_pixel();
        if frame.pixels.len() != expected {
            log::warn!(
                "Dropping frame with {} bytes, expected {} for {}x{}",
                frame.pixels.len(),
                expected,
                frame.width,
                frame.height
            );
            return;
        }
        self.pending = Some(egui::ColorImage::from_rgb(
            [frame.width as usize, frame.height as usize],
            &frame.pixels,
        ));
        self.overlay = overlay.to_string();
        self.last_error = None;
    }

    fn close(&mut self) {
        self.pending = None;
        self.texture = None;
        self.closed = true;
    }

    fn report(&mut self, message: &str) {
        self.last_error = Some(message.to_string());
    }
}

pub struct ViewerApp<S: SnapshotSource> {
    acquisition: Acquisition<S>,
    sink: TextureSink,
    /// Channel id being typed after pressing `m`
    manual_entry: Option<String>,
}

impl<S: SnapshotSource> ViewerApp<S> {
    pub fn new(acquisition: Acquisition<S>) -> Self {
        Self {
            acquisition,
            sink: TextureSink::default(),
            manual_entry: None,
        }
    }

    fn collect_commands(&mut self, ctx: &egui::Context) -> Vec<Command> {
        let mut commands = Vec::new();

        if ctx.input(|i| i.viewport().close_requested()) {
            commands.push(Command::Quit);
            return commands;
        }

        // Letter keys belong to the text field while a channel id is being typed
        if self.manual_entry.is_some() {
            return commands;
        }

        ctx.input(|i| {
            for (key, letter) in [(egui::Key::Q, 'q'), (egui::Key::N, 'n'), (egui::Key::P, 'p')] {
                if i.key_pressed(key) {
                    commands.extend(Command::from_key(letter));
                }
            }
        });

        if ctx.input(|i| i.key_pressed(egui::Key::M)) {
            self.manual_entry = Some(String::new());
        }

        commands
    }

    fn apply(&mut self, ctx: &egui::Context, command: Command) {
        match self.acquisition.handle(command) {
            Ok(Flow::Quit) => {
                self.sink.close();
                ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            }
            Ok(Flow::Continue) => {}
            Err(e) => {
                log::warn!("{}", e);
                self.sink.report(&e.to_string());
            }
        }
    }

    fn manual_entry_window(&mut self, ctx: &egui::Context) -> Option<Command> {
        let entry = self.manual_entry.as_mut()?;
        let mut submitted = false;
        let mut cancelled = false;

        egui::Window::new("Manual channel")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label("Enter channel ID (e.g. 101, 201, 1701):");
                let response = ui.text_edit_singleline(entry);
                response.request_focus();
                if ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                    submitted = true;
                }
                if ui.input(|i| i.key_pressed(egui::Key::Escape)) {
                    cancelled = true;
                }
                ui.horizontal(|ui| {
                    if ui.button("Switch").clicked() {
                        submitted = true;
                    }
                    if ui.button("Cancel").clicked() {
                        cancelled = true;
                    }
                });
            });

        if cancelled {
            self.manual_entry = None;
            return None;
        }
        if submitted {
            let id = self.manual_entry.take().unwrap_or_default();
            let id = id.trim();
            if !id.is_empty() {
                return Some(Command::JumpManual(id.to_string()));
            }
        }
        None
    }

    fn status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let selector = self.acquisition.selector();
                let channel = selector.current();
                let mut text = format!(
                    "Channel {} ({}/{})",
                    channel.id,
                    selector.current_index() + 1,
                    selector.len()
                );
                if !channel.label.is_empty() {
                    text.push_str(&format!(" - {}", channel.label));
                }
                ui.label(text);
                if self.acquisition.is_fetching() {
                    ui.spinner();
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.weak("q quit | n next | p previous | m manual");
                    if let Some(ref error) = self.sink.last_error {
                        ui.colored_label(egui::Color32::RED, error);
                    }
                });
            });
        });
    }

    fn frame_panel(&self, ctx: &egui::Context) {
        egui::CentralPanel::default()
            .frame(egui::Frame::NONE.fill(egui::Color32::BLACK))
            .show(ctx, |ui| {
                let Some(ref texture) = self.sink.texture else {
                    ui.centered_and_justified(|ui| {
                        ui.spinner();
                    });
                    return;
                };

                // Letterbox into the available area, keeping aspect ratio
                let available = ui.available_rect_before_wrap();
                let tex_size = texture.size_vec2();
                let scale = (available.width() / tex_size.x).min(available.height() / tex_size.y);
                let rect = egui::Rect::from_center_size(available.center(), tex_size * scale);

                let painter = ui.painter();
                painter.image(
                    texture.id(),
                    rect,
                    egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                    egui::Color32::WHITE,
                );
                painter.text(
                    rect.left_top() + egui::vec2(10.0, 10.0),
                    egui::Align2::LEFT_TOP,
                    &self.sink.overlay,
                    egui::FontId::proportional(20.0),
                    OVERLAY_COLOR,
                );
            });
    }
}

impl<S: SnapshotSource> eframe::App for ViewerApp<S> {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        for command in self.collect_commands(ctx) {
            self.apply(ctx, command);
        }
        if self.sink.closed {
            return;
        }

        self.acquisition.tick(Instant::now(), &mut self.sink);
        self.sink.upload(ctx);

        if let Some(command) = self.manual_entry_window(ctx) {
            self.apply(ctx, command);
        }
        self.status_bar(ctx);
        self.frame_panel(ctx);

        ctx.request_repaint_after(REPAINT_INTERVAL);
    }
}

/// Open the viewer window and block until it closes
pub fn run<S: SnapshotSource>(
    host: &str,
    acquisition: Acquisition<S>,
    config: &AppConfig,
) -> Result<(), ViewerError> {
    let title = format!("HikVision Camera {}", host);
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(title.clone())
            .with_inner_size([config.window_width, config.window_height])
            .with_min_inner_size([320.0, 240.0])
            .with_resizable(true),
        ..Default::default()
    };

    eframe::run_native(
        &title,
        options,
        Box::new(move |cc| {
            cc.egui_ctx.set_visuals(egui::Visuals::dark());
            Ok(Box::new(ViewerApp::new(acquisition)))
        }),
    )?;
    Ok(())
}
