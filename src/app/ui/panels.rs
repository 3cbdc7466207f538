use std::collections::VecDeque;

use eframe::egui::{self, Align, Context, Layout, Vec2};

use crate::data::GraphData;

use super::super::ViewModel;

impl ViewModel {
    pub(in crate::app) const DEFAULT_ZOOM: f32 = 0.35;
    pub(in crate::app) const DEFAULT_CHARGE_STRENGTH: f32 = 96.0;
    pub(in crate::app) const DEFAULT_COLLIDE_RADIUS: f32 = 12.0;
    pub(in crate::app) const DEFAULT_COLLIDE_STRENGTH: f32 = 0.1;
    pub(in crate::app) const DEFAULT_LINK_STRENGTH: f32 = 1.0;
    pub(in crate::app) const DEFAULT_VELOCITY_DAMPING: f32 = 0.85;

    pub(in crate::app) fn new(graph: GraphData, source_label: String) -> Self {
        Self {
            graph,
            source_label,
            search: String::new(),
            pan: Vec2::ZERO,
            zoom: Self::DEFAULT_ZOOM,
            live_physics: true,
            charge_strength: Self::DEFAULT_CHARGE_STRENGTH,
            collide_radius: Self::DEFAULT_COLLIDE_RADIUS,
            collide_strength: Self::DEFAULT_COLLIDE_STRENGTH,
            link_strength: Self::DEFAULT_LINK_STRENGTH,
            velocity_damping: Self::DEFAULT_VELOCITY_DAMPING,
            graph_dirty: true,
            render_graph_revision: 0,
            graph_cache: None,
            search_match_cache: None,
            dragged: None,
            show_fps_bar: true,
            fps_current: 0.0,
            fps_samples: VecDeque::new(),
            visible_node_count: 0,
            visible_link_count: 0,
        }
    }

    pub(in crate::app) fn show(
        &mut self,
        ctx: &Context,
        reload_requested: &mut bool,
        is_loading: bool,
    ) {
        self.update_fps_counter(ctx);
        if self.graph_dirty {
            self.rebuild_render_graph();
        }

        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("commgraph");
                    ui.separator();
                    ui.label(format!("dataset: {}", self.source_label));
                    ui.label(format!("communities: {}", self.graph.node_count()));
                    ui.label(format!("links: {}", self.graph.link_count()));
                    let reload_button =
                        ui.add_enabled(!is_loading, egui::Button::new("Reload dataset"));
                    if reload_button.clicked() {
                        *reload_requested = true;
                    }
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        if let Some(visible_graph_text) = self.visible_graph_text() {
                            ui.label(visible_graph_text);
                        }
                        if let Some(fps_text) = self.fps_display_text() {
                            ui.label(fps_text);
                        }
                    });
                });
            });

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(300.0)
            .show(ctx, |ui| self.draw_controls(ui));

        egui::CentralPanel::default().show(ctx, |ui| {
            if is_loading {
                ui.vertical_centered(|ui| {
                    ui.add_space(120.0);
                    ui.heading("Reloading community graph...");
                    ui.add_space(8.0);
                    ui.spinner();
                });
            } else {
                self.draw_graph(ui);
            }
        });
    }
}
