use eframe::egui::{self, Pos2, Rect, Ui, Vec2};

use super::super::render_utils::screen_to_world;
use super::super::{RenderGraph, ViewModel};

impl ViewModel {
    pub(in crate::app) fn handle_graph_zoom(
        &mut self,
        ui: &Ui,
        rect: Rect,
        response: &egui::Response,
    ) {
        if !response.hovered() {
            return;
        }

        let scroll = ui.input(|input| input.raw_scroll_delta.y);
        if scroll.abs() <= f32::EPSILON {
            return;
        }

        let pointer = ui
            .input(|input| input.pointer.hover_pos())
            .unwrap_or_else(|| rect.center());
        let world_before = screen_to_world(rect, self.pan, self.zoom, pointer);

        let zoom_factor = (1.0 + (scroll * 0.0018)).clamp(0.85, 1.15);
        self.zoom = (self.zoom * zoom_factor).clamp(0.05, 6.0);
        self.pan = pointer - rect.center() - (world_before * self.zoom);
    }

    /// Pans with the secondary or middle button anywhere, and with the
    /// primary button when it is not dragging a node.
    pub(in crate::app) fn apply_graph_pan(
        pan: &mut Vec2,
        node_drag_active: bool,
        response: &egui::Response,
    ) {
        if response.dragged_by(egui::PointerButton::Secondary)
            || response.dragged_by(egui::PointerButton::Middle)
            || (!node_drag_active && response.dragged_by(egui::PointerButton::Primary))
        {
            *pan += response.drag_delta();
        }
    }

    pub(in crate::app) fn hovered_index(
        ui: &Ui,
        screen_positions: &[Pos2],
        screen_radii: &[f32],
    ) -> Option<(usize, f32)> {
        let pointer_pos = ui.input(|input| input.pointer.hover_pos());
        pointer_pos.and_then(|pointer| {
            screen_positions
                .iter()
                .enumerate()
                .filter_map(|(index, position)| {
                    let distance = position.distance(pointer);
                    if distance <= screen_radii[index].max(8.0) {
                        Some((index, distance))
                    } else {
                        None
                    }
                })
                .min_by(|a, b| a.1.total_cmp(&b.1))
        })
    }

    /// Drag lifecycle for a single node: free, then pinned to the pointer
    /// for as long as the primary drag lasts, then free again. Releasing
    /// only clears the pin; the node stays where it was dropped until the
    /// next simulation tick.
    pub(in crate::app) fn apply_node_drag(
        dragged: &mut Option<usize>,
        cache: &mut RenderGraph,
        rect: Rect,
        pan: Vec2,
        zoom: f32,
        response: &egui::Response,
        hovered: Option<usize>,
    ) {
        if response.drag_started_by(egui::PointerButton::Primary) {
            *dragged = hovered;
        }

        if let Some(index) = *dragged
            && (response.drag_started_by(egui::PointerButton::Primary)
                || response.dragged_by(egui::PointerButton::Primary))
            && let Some(pointer) = response.interact_pointer_pos()
            && let Some(node) = cache.nodes.get_mut(index)
        {
            let world = screen_to_world(rect, pan, zoom, pointer);
            node.pinned = Some(world);
            node.world_pos = world;
            node.velocity = Vec2::ZERO;
        }

        if response.drag_stopped_by(egui::PointerButton::Primary)
            && let Some(index) = dragged.take()
            && let Some(node) = cache.nodes.get_mut(index)
        {
            node.pinned = None;
        }
    }
}
