use egui::Context;

use crate::config::DemoVariant;
use crate::controller::FrameStats;
use crate::model::Scene;

/// Build the overlay and return egui output
pub fn build_ui(
    egui_ctx: &Context,
    raw_input: egui::RawInput,
    scene: &mut Scene,
    stats: &FrameStats,
) -> egui::FullOutput {
    egui_ctx.run(raw_input, |ctx| {
        draw_debug_window(ctx, scene, stats);
        draw_settings_window(ctx, scene);
    })
}

/// Raw input for hosts without an egui platform integration (the browser canvas)
pub fn screen_input(width: u32, height: u32, dpr: f32, now_ms: f64) -> egui::RawInput {
    egui::RawInput {
        time: Some(now_ms / 1000.0),
        screen_rect: Some(egui::Rect::from_min_size(
            egui::Pos2::ZERO,
            egui::vec2(width as f32 / dpr, height as f32 / dpr),
        )),
        ..Default::default()
    }
}

fn small(text: String) -> egui::RichText {
    egui::RichText::new(text).small()
}

fn draw_debug_window(ctx: &Context, scene: &Scene, stats: &FrameStats) {
    let pos = scene.camera.position;

    egui::Window::new("Debug")
        .default_pos([8.0, 8.0])
        .show(ctx, |ui| {
            ui.label(small(format!("FPS: {:.0}", stats.fps)));
            ui.label(small(format!("Pos: x: {:.1} y: {:.1} z: {:.1}", pos.x, pos.y, pos.z)));
            ui.label(small(format!(
                "Yaw: {:.1} Pitch: {:.1}",
                scene.camera.yaw().to_degrees(),
                scene.camera.pitch().to_degrees()
            )));
            if scene.variant == DemoVariant::Boxes {
                ui.label(small(format!("Bodies: {}", scene.bodies.len())));
                ui.label(small(format!("On ground: {}", stats.highlight.on_reference)));
                ui.label(small(format!("Touching: {}", stats.highlight.touching)));
            } else {
                ui.label(small(format!("Time: {:.1}s", scene.elapsed)));
            }
            ui.separator();
            ui.label(small("Controls:".to_string()));
            if scene.variant == DemoVariant::Boxes {
                ui.label(small("WASD / Arrows - Move".to_string()));
                ui.label(small("Q / E - Turn".to_string()));
            } else {
                ui.label(small("Drag - Orbit".to_string()));
                ui.label(small("Wheel - Zoom".to_string()));
            }
        });
}

fn draw_settings_window(ctx: &Context, scene: &mut Scene) {
    egui::Window::new("Settings")
        .anchor(egui::Align2::RIGHT_TOP, [-8.0, 8.0])
        .default_size([130.0, 60.0])
        .show(ctx, |ui| {
            let mut fov_deg = scene.camera.fov_y.to_degrees().clamp(30.0, 120.0);
            ui.label(small("FOV".to_string()));
            if ui.add(egui::Slider::new(&mut fov_deg, 30.0..=120.0).step_by(5.0)).changed() {
                scene.camera.fov_y = fov_deg.to_radians();
            }
        });
}
