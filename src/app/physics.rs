use eframe::egui::{Vec2, vec2};

use super::{ForceConfig, RenderGraph};

const FORCE_SOFTENING: f32 = 1.0;
const MAX_FORCE: f32 = 200.0;
const MAX_SPEED: f32 = 30.0;
const MIN_SLEEP_SPEED: f32 = 0.02;
const MIN_SLEEP_FORCE: f32 = 0.08;

/// Advances the simulation by one tick. Returns whether any node is still
/// in motion, so the caller can keep requesting repaints until the layout
/// settles. There is no centering force anywhere in here: the layout is
/// free to drift to wherever the springs and charges take it.
pub(super) fn step_physics(cache: &mut RenderGraph, config: ForceConfig) -> bool {
    let node_count = cache.nodes.len();
    if node_count == 0 {
        return false;
    }

    cache.forces_scratch.resize(node_count, Vec2::ZERO);
    cache.forces_scratch.fill(Vec2::ZERO);

    let spring_strength = 0.016 * config.link_strength;
    let spring_damping = 0.22;
    let min_collision_distance = config.collide_radius * 2.0;
    let time_step_scale = (config.delta_seconds * 60.0).clamp(0.25, 3.0);
    let damping_factor = config.velocity_damping.clamp(0.5, 0.99).powf(time_step_scale);

    // Repulsion and collision over every pair. A node emits
    // charge / (1 + degree), so hubs push each single neighbor away less
    // strongly; collision uses one fixed radius for all nodes.
    for i in 0..node_count {
        for j in (i + 1)..node_count {
            let delta = cache.nodes[i].world_pos - cache.nodes[j].world_pos;
            let raw_distance = delta.length();
            let direction = if raw_distance > 0.0001 {
                delta / raw_distance
            } else {
                let angle =
                    ((i as f32) * 0.618_034 + (j as f32) * 0.414_214) * std::f32::consts::TAU;
                vec2(angle.cos(), angle.sin())
            };
            let distance = raw_distance.max(FORCE_SOFTENING);

            let emitted_i = config.charge_strength / (1.0 + cache.nodes[i].degree as f32);
            let emitted_j = config.charge_strength / (1.0 + cache.nodes[j].degree as f32);
            cache.forces_scratch[i] += direction * (emitted_j / distance);
            cache.forces_scratch[j] -= direction * (emitted_i / distance);

            if distance < min_collision_distance {
                let overlap_push = (min_collision_distance - distance) * config.collide_strength;
                cache.forces_scratch[i] += direction * overlap_push;
                cache.forces_scratch[j] -= direction * overlap_push;
            }
        }
    }

    // One spring pass per tick; every link pulls its endpoints toward its
    // own precomputed target length.
    for link in &cache.links {
        if link.from >= node_count || link.to >= node_count || link.from == link.to {
            continue;
        }

        let delta = cache.nodes[link.from].world_pos - cache.nodes[link.to].world_pos;
        let distance_sq = delta.length_sq();
        if distance_sq <= 0.0001 * 0.0001 {
            continue;
        }
        let distance = distance_sq.sqrt();
        let direction = delta / distance;

        let spring = (distance - link.length) * spring_strength;
        let relative_velocity = cache.nodes[link.from].velocity - cache.nodes[link.to].velocity;
        let damping_force = relative_velocity.dot(direction) * spring_damping;
        let correction = direction * (spring + damping_force);

        cache.forces_scratch[link.from] -= correction;
        cache.forces_scratch[link.to] += correction;
    }

    let mut any_motion = false;
    for index in 0..node_count {
        let force_value = cache.forces_scratch[index];
        let node = &mut cache.nodes[index];

        // A pinned node is owned by the pointer: it sits exactly at the pin
        // with no velocity and ignores whatever forces accumulated.
        if let Some(pin) = node.pinned {
            node.world_pos = pin;
            node.velocity = Vec2::ZERO;
            continue;
        }

        let mut force = force_value;
        let force_sq = force.length_sq();
        if force_sq > MAX_FORCE * MAX_FORCE {
            force *= MAX_FORCE / force_sq.sqrt();
        }

        let mut velocity = (node.velocity + (force * (0.055 * time_step_scale))) * damping_factor;
        let mut speed_sq = velocity.length_sq();
        if speed_sq > MAX_SPEED * MAX_SPEED {
            velocity *= MAX_SPEED / speed_sq.sqrt();
            speed_sq = MAX_SPEED * MAX_SPEED;
        }

        if speed_sq < MIN_SLEEP_SPEED * MIN_SLEEP_SPEED && force_sq < MIN_SLEEP_FORCE * MIN_SLEEP_FORCE
        {
            velocity = Vec2::ZERO;
            speed_sq = 0.0;
        }

        node.velocity = velocity;
        node.world_pos += velocity * time_step_scale;
        if speed_sq > 0.000_001 {
            any_motion = true;
        }
    }

    any_motion
}

#[cfg(test)]
mod tests {
    use eframe::egui::{Vec2, vec2};

    use super::super::{ForceConfig, RenderGraph, RenderLink, RenderNode, ViewScratch};
    use super::step_physics;

    fn node(id: u64, position: Vec2, degree: usize) -> RenderNode {
        RenderNode {
            id,
            world_pos: position,
            velocity: Vec2::ZERO,
            pinned: None,
            degree,
            base_radius: 6.0,
        }
    }

    fn link(from: usize, to: usize, length: f32) -> RenderLink {
        RenderLink {
            from,
            to,
            length,
            color: eframe::egui::Color32::BLACK,
        }
    }

    fn graph(nodes: Vec<RenderNode>, links: Vec<RenderLink>) -> RenderGraph {
        RenderGraph {
            nodes,
            links,
            forces_scratch: Vec::new(),
            view_scratch: ViewScratch {
                screen_positions: Vec::new(),
                screen_radii: Vec::new(),
            },
        }
    }

    fn config() -> ForceConfig {
        ForceConfig {
            link_strength: 1.0,
            charge_strength: 96.0,
            collide_radius: 12.0,
            collide_strength: 0.1,
            velocity_damping: 0.85,
            delta_seconds: 1.0 / 60.0,
        }
    }

    fn distance(cache: &RenderGraph, a: usize, b: usize) -> f32 {
        (cache.nodes[a].world_pos - cache.nodes[b].world_pos).length()
    }

    #[test]
    fn empty_graph_reports_no_motion() {
        let mut cache = graph(Vec::new(), Vec::new());
        assert!(!step_physics(&mut cache, config()));
    }

    #[test]
    fn linked_pair_settles_near_its_target_distance() {
        let target = 166.67;
        let mut cache = graph(
            vec![
                node(0, vec2(-450.0, 0.0), 1),
                node(1, vec2(450.0, 0.0), 1),
            ],
            vec![link(0, 1, target)],
        );

        for _ in 0..2000 {
            step_physics(&mut cache, config());
        }

        // Repulsion holds the equilibrium slightly beyond the spring target.
        let settled = distance(&cache, 0, 1);
        assert!(
            (140.0..260.0).contains(&settled),
            "settled at {settled}, expected near {target}"
        );
    }

    #[test]
    fn pinned_node_holds_its_position_under_forces() {
        let pin = vec2(50.0, 50.0);
        let mut cache = graph(
            vec![node(0, pin, 1), node(1, vec2(700.0, 0.0), 1)],
            vec![link(0, 1, 100.0)],
        );
        cache.nodes[0].pinned = Some(pin);

        for _ in 0..200 {
            step_physics(&mut cache, config());
        }

        assert_eq!(cache.nodes[0].world_pos, pin);
        assert_eq!(cache.nodes[0].velocity, Vec2::ZERO);
        // The free endpoint still reacted to the spring.
        assert!(distance(&cache, 0, 1) < 300.0);
    }

    #[test]
    fn released_node_keeps_its_position_until_the_next_tick() {
        let pin = vec2(300.0, -120.0);
        let mut cache = graph(
            vec![node(0, vec2(0.0, 0.0), 1), node(1, vec2(40.0, 0.0), 1)],
            vec![link(0, 1, 166.67)],
        );

        cache.nodes[0].pinned = Some(pin);
        step_physics(&mut cache, config());
        assert_eq!(cache.nodes[0].world_pos, pin);

        // Releasing the pin moves nothing by itself.
        cache.nodes[0].pinned = None;
        assert_eq!(cache.nodes[0].world_pos, pin);

        // From the next tick on, the node rejoins the free simulation.
        for _ in 0..50 {
            step_physics(&mut cache, config());
        }
        assert_ne!(cache.nodes[0].world_pos, pin);
    }

    #[test]
    fn layout_does_not_drift_toward_the_origin() {
        let center = vec2(5000.0, 3000.0);
        let mut cache = graph(
            vec![
                node(0, center + vec2(-100.0, 0.0), 1),
                node(1, center + vec2(100.0, 0.0), 1),
            ],
            vec![link(0, 1, 166.67)],
        );

        for _ in 0..300 {
            step_physics(&mut cache, config());
        }

        let midpoint = (cache.nodes[0].world_pos + cache.nodes[1].world_pos) * 0.5;
        assert!(
            (midpoint - center).length() < 1.0,
            "midpoint drifted to {midpoint:?}"
        );
    }

    #[test]
    fn collision_pushes_overlapping_nodes_apart() {
        let mut cache = graph(
            vec![node(0, vec2(0.0, 0.0), 0), node(1, vec2(4.0, 0.0), 0)],
            Vec::new(),
        );

        for _ in 0..400 {
            step_physics(&mut cache, config());
        }

        let separated = distance(&cache, 0, 1);
        assert!(separated > 4.0, "nodes still overlap at {separated}");
    }

    #[test]
    fn self_loop_links_are_ignored_by_the_spring_pass() {
        let start = vec2(10.0, 10.0);
        let mut cache = graph(vec![node(0, start, 2)], vec![link(0, 0, 166.67)]);

        let moving = step_physics(&mut cache, config());
        assert!(!moving);
        assert_eq!(cache.nodes[0].world_pos, start);
    }
}
