//! 3D scatter projection drawn with egui_plot
//!
//! Orthographic yaw/pitch camera: particles and the bounding cube are
//! projected to 2D on the CPU each frame and handed to a fixed-bounds
//! plot, so the view never rescales with the data.

use std::collections::BTreeMap;

use eframe::egui;
use egui_plot::{Line, Plot, PlotPoints, Points};

use super::ViewerApp;
use crate::theme::colors;

/// Particle coordinates live in this fixed cube; the view never rescales.
pub(crate) const AXIS_BOUND: f64 = 1.2;

/// Marker radius for particles that arrive without a size.
const DEFAULT_RADIUS: f32 = 2.5;

/// Project a 3D point through the yaw/pitch camera onto screen x/y.
pub(crate) fn project(yaw: f32, pitch: f32, p: [f64; 3]) -> [f64; 2] {
    let (sin_y, cos_y) = (yaw as f64).sin_cos();
    let (sin_x, cos_x) = (pitch as f64).sin_cos();
    let x1 = p[0] * cos_y + p[2] * sin_y;
    let z1 = -p[0] * sin_y + p[2] * cos_y;
    let y1 = p[1] * cos_x - z1 * sin_x;
    [x1, y1]
}

/// Marker area (pt^2, matplotlib convention) to an on-screen radius.
pub(crate) fn point_radius(area: f64) -> f32 {
    let radius = (area.max(0.0) / std::f64::consts::PI).sqrt() as f32;
    radius.clamp(0.5, 30.0)
}

/// The 12 edges of the bounding cube at the fixed axis limits.
fn cube_edges() -> Vec<[[f64; 3]; 2]> {
    let b = AXIS_BOUND;
    let corner = |i: usize| -> [f64; 3] {
        [
            if i & 1 == 0 { -b } else { b },
            if i & 2 == 0 { -b } else { b },
            if i & 4 == 0 { -b } else { b },
        ]
    };
    let mut edges = Vec::with_capacity(12);
    for i in 0..8 {
        for bit in [1usize, 2, 4] {
            if i & bit == 0 {
                edges.push([corner(i), corner(i | bit)]);
            }
        }
    }
    edges
}

impl ViewerApp {
    pub(crate) fn render_scatter(&mut self, ui: &mut egui::Ui) {
        let (coords, sizes, point_colors) = {
            let scatter = self.scatter.lock();
            (scatter.coords.clone(), scatter.sizes.clone(), scatter.colors.clone())
        };

        if self.auto_rotate {
            self.yaw += 0.005;
            ui.ctx().request_repaint();
        }

        let yaw = self.yaw;
        let pitch = self.pitch;

        // Group projected points by (radius, color): one Points item can
        // only carry a single radius and color.
        let n = coords[0].len().min(coords[1].len()).min(coords[2].len());
        let mut buckets: BTreeMap<(u32, [u8; 3]), Vec<[f64; 2]>> = BTreeMap::new();
        for i in 0..n {
            let point = project(yaw, pitch, [coords[0][i], coords[1][i], coords[2][i]]);
            let radius = if sizes.is_empty() {
                DEFAULT_RADIUS
            } else {
                point_radius(sizes[i % sizes.len()])
            };
            let color = if point_colors.is_empty() {
                colors::POINT_COLOR
            } else {
                let [r, g, b] = point_colors[i % point_colors.len()];
                egui::Color32::from_rgb(
                    (r.clamp(0.0, 1.0) * 255.0) as u8,
                    (g.clamp(0.0, 1.0) * 255.0) as u8,
                    (b.clamp(0.0, 1.0) * 255.0) as u8,
                )
            };
            let key = ((radius * 10.0) as u32, [color.r(), color.g(), color.b()]);
            buckets.entry(key).or_default().push(point);
        }

        // Fixed bounds fit the cube diagonal, so rotation never rescales.
        let view = AXIS_BOUND * 3.0f64.sqrt();

        let response = Plot::new("scatter")
            .show_axes([false, false])
            .show_grid(false)
            .allow_zoom(false)
            .allow_drag(false)
            .allow_scroll(false)
            .show_background(false)
            .include_x(-view)
            .include_x(view)
            .include_y(-view)
            .include_y(view)
            .data_aspect(1.0)
            .label_formatter(|_name, value| format!("({:.2}, {:.2})", value.x, value.y))
            .show(ui, |plot_ui| {
                for edge in cube_edges() {
                    let a = project(yaw, pitch, edge[0]);
                    let b = project(yaw, pitch, edge[1]);
                    plot_ui.line(
                        Line::new(PlotPoints::from(vec![a, b]))
                            .color(colors::BORDER)
                            .width(1.0),
                    );
                }

                for ((radius_tenths, [r, g, b]), points) in buckets {
                    plot_ui.points(
                        Points::new(PlotPoints::from(points))
                            .color(egui::Color32::from_rgb(r, g, b))
                            .radius(radius_tenths as f32 / 10.0)
                            .filled(true),
                    );
                }
            });

        // Drag to orbit
        if response.response.dragged() {
            let delta = response.response.drag_delta();
            self.yaw += delta.x * 0.005;
            self.pitch = (self.pitch + delta.y * 0.005).clamp(-1.5, 1.5);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_projection_drops_depth() {
        let p = project(0.0, 0.0, [0.3, -0.7, 0.9]);
        assert!((p[0] - 0.3).abs() < 1e-9);
        assert!((p[1] + 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_quarter_turn_swaps_x_and_z() {
        let p = project(std::f32::consts::FRAC_PI_2, 0.0, [1.0, 0.0, 0.0]);
        assert!(p[0].abs() < 1e-6);
        let q = project(std::f32::consts::FRAC_PI_2, 0.0, [0.0, 0.0, 1.0]);
        assert!((q[0] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_pitch_lifts_depth_into_view() {
        // Looking straight down puts +z on -y.
        let p = project(0.0, std::f32::consts::FRAC_PI_2, [0.0, 0.0, 1.0]);
        assert!(p[0].abs() < 1e-6);
        assert!((p[1] + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_point_radius_follows_marker_area() {
        assert!((point_radius(std::f64::consts::PI) - 1.0).abs() < 1e-6);
        let expected = (1000.0f64 / std::f64::consts::PI).sqrt() as f32;
        assert!((point_radius(1000.0) - expected).abs() < 1e-3);
    }

    #[test]
    fn test_point_radius_is_clamped() {
        assert_eq!(point_radius(0.0), 0.5);
        assert_eq!(point_radius(-5.0), 0.5);
        assert_eq!(point_radius(1e9), 30.0);
    }

    #[test]
    fn test_cube_has_twelve_edges() {
        assert_eq!(cube_edges().len(), 12);
    }
}
