use std::collections::HashMap;

use eframe::egui::{Color32, Vec2, vec2};

use crate::util::stable_pair;

use super::super::{RenderGraph, RenderLink, RenderNode, ViewModel, ViewScratch};

fn jitter_direction(id: u64, index: usize) -> Vec2 {
    let (jx, jy) = stable_pair(id);
    let mut direction = vec2(jx, jy);
    if direction.length_sq() <= 0.0001 {
        let angle = ((index as f32) * 0.618_034 + 0.11) * std::f32::consts::TAU;
        direction = vec2(angle.cos(), angle.sin());
    } else {
        direction = direction.normalized();
    }
    direction
}

fn initial_speed(base_radius: f32) -> f32 {
    1.15 + (base_radius * 0.022)
}

impl ViewModel {
    fn make_render_node(id: u64, index: usize, degree: usize, base_radius: f32) -> RenderNode {
        RenderNode {
            id,
            world_pos: Vec2::ZERO,
            velocity: jitter_direction(id, index) * initial_speed(base_radius),
            pinned: None,
            degree,
            base_radius,
        }
    }

    /// Rebuilds the mutable render cache from the immutable graph data.
    /// Render nodes keep the order of `graph.nodes`, so the two stay
    /// index-aligned; nodes surviving a rebuild keep their simulated
    /// position and velocity.
    pub(in crate::app) fn rebuild_render_graph(&mut self) {
        self.render_graph_revision = self.render_graph_revision.wrapping_add(1);
        self.search_match_cache = None;
        self.dragged = None;

        if self.graph.nodes.is_empty() {
            self.graph_cache = None;
            self.visible_node_count = 0;
            self.visible_link_count = 0;
            self.graph_dirty = false;
            return;
        }

        let mut index_by_id = HashMap::with_capacity(self.graph.nodes.len());
        for (index, record) in self.graph.nodes.iter().enumerate() {
            index_by_id.insert(record.id, index);
        }

        let links = self
            .graph
            .links
            .iter()
            .filter_map(|record| {
                let (Some(&from), Some(&to)) = (
                    index_by_id.get(&record.source_id),
                    index_by_id.get(&record.target_id),
                ) else {
                    return None;
                };

                Some(RenderLink {
                    from,
                    to,
                    length: record.distance,
                    color: Color32::from_rgb(record.color[0], record.color[1], record.color[2]),
                })
            })
            .collect::<Vec<_>>();

        if let Some(mut cache) = self.graph_cache.take() {
            let mut prior_nodes = cache
                .nodes
                .into_iter()
                .map(|node| (node.id, node))
                .collect::<HashMap<_, _>>();

            let mut next_nodes = Vec::with_capacity(self.graph.nodes.len());
            for (index, record) in self.graph.nodes.iter().enumerate() {
                let base_radius = record.size * 0.5;
                if let Some(mut node) = prior_nodes.remove(&record.id) {
                    node.degree = record.degree;
                    node.base_radius = base_radius;
                    node.pinned = None;
                    next_nodes.push(node);
                } else {
                    next_nodes.push(Self::make_render_node(
                        record.id,
                        index,
                        record.degree,
                        base_radius,
                    ));
                }
            }

            cache.nodes = next_nodes;
            cache.links = links;
            self.graph_cache = Some(cache);
        } else {
            let nodes = self
                .graph
                .nodes
                .iter()
                .enumerate()
                .map(|(index, record)| {
                    Self::make_render_node(record.id, index, record.degree, record.size * 0.5)
                })
                .collect::<Vec<_>>();

            self.graph_cache = Some(RenderGraph {
                nodes,
                links,
                forces_scratch: Vec::new(),
                view_scratch: ViewScratch {
                    screen_positions: Vec::new(),
                    screen_radii: Vec::new(),
                },
            });
        }

        if let Some(cache) = &self.graph_cache {
            self.visible_node_count = cache.nodes.len();
            self.visible_link_count = cache.links.len();
        }
        self.graph_dirty = false;
    }

    /// Gives every free node a fresh kick so a settled layout starts
    /// moving again without rebuilding anything.
    pub(in crate::app) fn reheat_simulation(&mut self) {
        let Some(cache) = self.graph_cache.as_mut() else {
            return;
        };

        for (index, node) in cache.nodes.iter_mut().enumerate() {
            if node.pinned.is_some() {
                continue;
            }
            node.velocity += jitter_direction(node.id, index) * (initial_speed(node.base_radius) * 3.0);
        }
    }
}
