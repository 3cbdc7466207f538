use std::collections::HashSet;
use std::sync::Arc;

use eframe::egui::{self, Align2, Color32, FontId, Sense, Stroke, Ui, vec2};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use super::super::physics::step_physics;
use super::super::render_utils::{
    HOVER_FILL, NODE_FILL, SEARCH_FILL, blend_color, circle_visible, dim_color, draw_background,
    world_to_screen,
};
use super::super::{ForceConfig, SearchMatchCache, ViewModel};

const LABEL_COLOR: Color32 = Color32::from_gray(32);
const NODE_STROKE: Color32 = Color32::WHITE;

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_ascii_lowercase(), &query.to_ascii_lowercase()))
}

impl ViewModel {
    fn update_screen_space(
        rect: egui::Rect,
        pan: egui::Vec2,
        zoom: f32,
        cache: &mut super::super::RenderGraph,
    ) {
        cache.view_scratch.screen_positions.clear();
        cache.view_scratch.screen_radii.clear();
        for render_node in &cache.nodes {
            cache
                .view_scratch
                .screen_positions
                .push(world_to_screen(rect, pan, zoom, render_node.world_pos));
            cache
                .view_scratch
                .screen_radii
                .push((render_node.base_radius * zoom.powf(0.40)).clamp(2.5, 46.0));
        }
    }

    fn cached_search_matches(&mut self) -> Option<Arc<HashSet<usize>>> {
        let search_query = self.search.trim();
        if search_query.is_empty() {
            return None;
        }

        if let Some(cached) = &self.search_match_cache
            && cached.graph_revision == self.render_graph_revision
            && cached.query == search_query
        {
            return Some(Arc::clone(&cached.matches));
        }

        let matcher = SkimMatcherV2::default();
        let matches = self
            .graph
            .nodes
            .iter()
            .enumerate()
            .filter_map(|(index, node)| {
                fuzzy_match_score(&matcher, &node.name, search_query).map(|_| index)
            })
            .collect::<HashSet<_>>();
        let matches = Arc::new(matches);

        self.search_match_cache = Some(SearchMatchCache {
            query: search_query.to_owned(),
            graph_revision: self.render_graph_revision,
            matches: Arc::clone(&matches),
        });

        Some(matches)
    }

    pub(in crate::app) fn draw_graph(&mut self, ui: &mut Ui) {
        if self.graph_dirty {
            self.rebuild_render_graph();
        }

        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);

        draw_background(&painter, rect, self.pan, self.zoom);

        self.handle_graph_zoom(ui, rect, &response);

        let search_matches = self.cached_search_matches();
        let pan = self.pan;
        let zoom = self.zoom;
        let frame_delta_seconds = ui
            .ctx()
            .input(|input| input.stable_dt)
            .clamp(1.0 / 240.0, 1.0 / 20.0);
        let forces = ForceConfig {
            link_strength: self.link_strength,
            charge_strength: self.charge_strength,
            collide_radius: self.collide_radius,
            collide_strength: self.collide_strength,
            velocity_damping: self.velocity_damping,
            delta_seconds: frame_delta_seconds,
        };

        let Some(cache) = self.graph_cache.as_mut() else {
            self.visible_node_count = 0;
            self.visible_link_count = 0;
            ui.label("The dataset produced no nodes.");
            return;
        };

        let mut physics_moving = false;
        if self.live_physics {
            physics_moving = step_physics(cache, forces);
        }

        Self::update_screen_space(rect, pan, zoom, cache);

        let hovered = Self::hovered_index(
            ui,
            &cache.view_scratch.screen_positions,
            &cache.view_scratch.screen_radii,
        );
        let hovered_index = hovered.map(|(index, _)| index);

        Self::apply_node_drag(
            &mut self.dragged,
            cache,
            rect,
            pan,
            zoom,
            &response,
            hovered_index,
        );
        Self::apply_graph_pan(&mut self.pan, self.dragged.is_some(), &response);

        // A dragged node was just snapped to the pointer; refresh its
        // projected position so this frame already draws it there.
        if let Some(index) = self.dragged
            && let Some(node) = cache.nodes.get(index)
            && let Some(position) = cache.view_scratch.screen_positions.get_mut(index)
        {
            *position = world_to_screen(rect, pan, zoom, node.world_pos);
        }

        if self.dragged.is_some() {
            ui.output_mut(|output| {
                output.cursor_icon = egui::CursorIcon::Grabbing;
            });
        } else if hovered.is_some() {
            ui.output_mut(|output| {
                output.cursor_icon = egui::CursorIcon::PointingHand;
            });
        }

        let search_active = search_matches
            .as_ref()
            .is_some_and(|matches| !matches.is_empty());

        let line_width = (2.0 * zoom.sqrt()).clamp(0.8, 3.5);
        let mut visible_link_count = 0usize;
        for link in &cache.links {
            if link.from == link.to
                || link.from >= cache.nodes.len()
                || link.to >= cache.nodes.len()
            {
                continue;
            }

            let start = cache.view_scratch.screen_positions[link.from];
            let end = cache.view_scratch.screen_positions[link.to];
            let start_radius = cache.view_scratch.screen_radii[link.from];
            let end_radius = cache.view_scratch.screen_radii[link.to];

            let delta = end - start;
            let length = delta.length();
            if length <= start_radius + end_radius + 1.0 {
                continue;
            }
            let direction = delta / length;

            // Lines stop at the node outlines instead of running under them.
            let trimmed_start = start + direction * start_radius;
            let trimmed_end = end - direction * end_radius;

            if !circle_visible(rect, trimmed_start, 1.0) && !circle_visible(rect, trimmed_end, 1.0)
            {
                continue;
            }

            painter.line_segment([trimmed_start, trimmed_end], Stroke::new(line_width, link.color));
            visible_link_count += 1;
        }
        self.visible_link_count = visible_link_count;

        let mut visible_node_count = 0usize;
        for index in 0..cache.nodes.len() {
            let position = cache.view_scratch.screen_positions[index];
            let radius = cache.view_scratch.screen_radii[index];
            if !circle_visible(rect, position, radius) {
                continue;
            }
            visible_node_count += 1;

            let record = &self.graph.nodes[index];
            let is_hovered = hovered_index == Some(index);
            let is_match = search_matches
                .as_ref()
                .is_some_and(|matches| matches.contains(&index));

            let color = if is_hovered {
                HOVER_FILL
            } else if is_match {
                blend_color(NODE_FILL, SEARCH_FILL, 0.68)
            } else if search_active {
                dim_color(NODE_FILL, 0.45)
            } else {
                NODE_FILL
            };

            painter.circle_filled(position, radius, color);
            painter.circle_stroke(position, radius, Stroke::new(1.5, NODE_STROKE));

            let id_font = (radius * 0.85).clamp(7.0, 14.0);
            painter.text(
                position,
                Align2::CENTER_CENTER,
                record.id.to_string(),
                FontId::proportional(id_font),
                Color32::WHITE,
            );

            if radius >= 4.0 {
                painter.text(
                    position - vec2(0.0, radius + 4.0),
                    Align2::CENTER_BOTTOM,
                    &record.name,
                    FontId::proportional(12.0),
                    LABEL_COLOR,
                );
            }
        }
        self.visible_node_count = visible_node_count;

        if let Some(index) = hovered_index {
            let description = self.graph.nodes[index].description.as_str();
            if !description.is_empty() {
                let position = cache.view_scratch.screen_positions[index];
                let radius = cache.view_scratch.screen_radii[index];
                Self::draw_tooltip(&painter, rect, position, radius, description);
            }
        }

        if physics_moving || response.dragged() {
            ui.ctx().request_repaint();
        }
    }

    fn draw_tooltip(
        painter: &egui::Painter,
        rect: egui::Rect,
        node_position: egui::Pos2,
        node_radius: f32,
        description: &str,
    ) {
        let galley = painter.layout_no_wrap(
            description.to_owned(),
            FontId::proportional(12.5),
            LABEL_COLOR,
        );

        let padding = vec2(8.0, 5.0);
        let size = galley.size() + padding * 2.0;
        let mut anchor = node_position - vec2(size.x * 0.5, node_radius + 22.0 + size.y);

        // Keep the overlay inside the graph area.
        anchor.x = anchor.x.clamp(rect.left() + 4.0, (rect.right() - size.x - 4.0).max(rect.left() + 4.0));
        anchor.y = anchor.y.max(rect.top() + 4.0);

        let tooltip_rect = egui::Rect::from_min_size(anchor, size);
        painter.rect_filled(
            tooltip_rect,
            4.0,
            Color32::from_rgba_unmultiplied(255, 255, 255, 242),
        );
        painter.rect_stroke(
            tooltip_rect,
            4.0,
            Stroke::new(1.0, Color32::from_rgba_unmultiplied(120, 130, 140, 160)),
            egui::StrokeKind::Outside,
        );
        painter.galley(tooltip_rect.min + padding, galley, LABEL_COLOR);
    }
}
