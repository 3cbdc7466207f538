use eframe::egui::{self, Ui, Vec2};

use crate::util::format_count;

use super::super::ViewModel;

impl ViewModel {
    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui) {
        ui.heading("Dataset");
        ui.add_space(4.0);
        ui.label(format!(
            "{} communities, {} links",
            format_count(self.graph.node_count() as u64),
            format_count(self.graph.link_count() as u64),
        ));
        ui.label(format!("highest degree: {}", self.graph.max_degree()));

        ui.add_space(8.0);
        ui.separator();
        ui.heading("Simulation");
        ui.add_space(4.0);
        ui.checkbox(&mut self.live_physics, "Run simulation");
        ui.add(
            egui::Slider::new(&mut self.charge_strength, 0.0..=400.0).text("charge strength"),
        );
        ui.add(
            egui::Slider::new(&mut self.collide_radius, 0.0..=40.0).text("collision radius"),
        );
        ui.add(
            egui::Slider::new(&mut self.collide_strength, 0.0..=1.0).text("collision strength"),
        );
        ui.add(egui::Slider::new(&mut self.link_strength, 0.1..=3.0).text("link strength"));
        ui.add(
            egui::Slider::new(&mut self.velocity_damping, 0.6..=0.98).text("velocity damping"),
        );

        ui.add_space(4.0);
        ui.horizontal(|ui| {
            if ui.button("Reheat").clicked() {
                self.reheat_simulation();
            }
            if ui.button("Reset forces").clicked() {
                self.charge_strength = Self::DEFAULT_CHARGE_STRENGTH;
                self.collide_radius = Self::DEFAULT_COLLIDE_RADIUS;
                self.collide_strength = Self::DEFAULT_COLLIDE_STRENGTH;
                self.link_strength = Self::DEFAULT_LINK_STRENGTH;
                self.velocity_damping = Self::DEFAULT_VELOCITY_DAMPING;
            }
        });

        ui.add_space(8.0);
        ui.separator();
        ui.heading("View");
        ui.add_space(4.0);
        ui.horizontal(|ui| {
            ui.label("Search:");
            ui.text_edit_singleline(&mut self.search);
            if !self.search.is_empty() && ui.button("x").clicked() {
                self.search.clear();
            }
        });
        if ui.button("Reset view").clicked() {
            self.pan = Vec2::ZERO;
            self.zoom = Self::DEFAULT_ZOOM;
        }
        ui.checkbox(&mut self.show_fps_bar, "Show FPS");
    }
}
