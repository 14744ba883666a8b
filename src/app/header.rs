//! Header bar with connection status and feed stats

use std::time::Instant;

use eframe::egui;

use super::ViewerApp;
use crate::broker::SessionState;
use crate::config::PARTICLE_TOPIC;
use crate::theme::colors;

impl ViewerApp {
    pub(crate) fn render_header(&mut self, ui: &mut egui::Ui) {
        self.fps_counter.tick();

        let session = self.session.lock().clone();
        let (points, frames) = {
            let scatter = self.scatter.lock();
            (scatter.len(), scatter.frames_applied)
        };

        ui.horizontal(|ui| {
            // LEFT: the topic being watched
            ui.label(egui::RichText::new(PARTICLE_TOPIC).color(colors::TEXT_MUTED));

            // RIGHT: status and stats (right-to-left order)
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.checkbox(
                    &mut self.auto_rotate,
                    egui::RichText::new("rotate").color(colors::TEXT_SECONDARY),
                );

                ui.add_space(10.0);

                ui.label(
                    egui::RichText::new(format!("{:.0} fps", self.fps_counter.fps()))
                        .color(colors::TEXT_SECONDARY),
                );
                ui.label(egui::RichText::new("/").color(colors::TEXT_MUTED));
                ui.label(
                    egui::RichText::new(format!("frame {}", frames)).color(colors::TEXT_MUTED),
                );
                ui.label(egui::RichText::new("/").color(colors::TEXT_MUTED));
                ui.label(
                    egui::RichText::new(format!("{} points", points)).color(colors::TEXT_MUTED),
                );

                ui.add_space(10.0);

                let (status_color, status_text) = match &session {
                    SessionState::Connected => {
                        (egui::Color32::from_rgb(100, 200, 100), "Connected")
                    }
                    SessionState::Connecting => {
                        (egui::Color32::from_rgb(200, 200, 100), "Connecting...")
                    }
                    SessionState::Disconnected => {
                        (egui::Color32::from_rgb(200, 100, 100), "Disconnected")
                    }
                    SessionState::Error(_) => (egui::Color32::from_rgb(200, 100, 100), "Error"),
                };
                ui.colored_label(status_color, egui::RichText::new(status_text));
            });
        });
    }
}

/// FPS counter over a sliding window of recent update timestamps
pub struct FpsCounter {
    frames: Vec<Instant>,
}

impl FpsCounter {
    pub fn new() -> Self {
        Self {
            frames: Vec::with_capacity(60),
        }
    }

    pub fn tick(&mut self) {
        self.frames.push(Instant::now());
        if self.frames.len() > 60 {
            self.frames.remove(0);
        }
    }

    pub fn fps(&self) -> f64 {
        if self.frames.len() < 2 {
            return 0.0;
        }
        let elapsed =
            self.frames[self.frames.len() - 1].duration_since(self.frames[0]).as_secs_f64();
        if elapsed == 0.0 {
            return 0.0;
        }
        (self.frames.len() as f64 - 1.0) / elapsed
    }
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self::new()
    }
}
