use std::collections::HashMap;

use super::{EdgeRecord, GraphData, LinkRecord, NodeRecord};

pub const MIN_SIZE: f32 = 10.0;
pub const MAX_SIZE: f32 = 40.0;
pub const SIZE_PER_DEGREE: f32 = 5.0;

pub const BASE_DISTANCE: f32 = 1000.0;
pub const DISTANCE_ALPHA: f32 = 10.0;

const LINK_COLOR: [u8; 3] = [0, 0, 0];

/// Maps a node's incident-edge count to a bounded visual size.
pub fn scale_size(degree: usize) -> f32 {
    (MIN_SIZE + (degree as f32 * SIZE_PER_DEGREE)).min(MAX_SIZE)
}

/// Shared subscribers over the total subscribers of both endpoints, with the
/// empty-pair case defined as zero overlap.
pub fn overlap_ratio(edge: &EdgeRecord) -> f32 {
    let total = edge.subscribers_source + edge.subscribers_target;
    if total == 0 {
        0.0
    } else {
        edge.common_subscribers as f32 / total as f32
    }
}

/// Target rendering distance for an edge: more subscriber overlap pulls the
/// endpoints closer together. Always in `(0, BASE_DISTANCE]`.
pub fn link_distance(edge: &EdgeRecord) -> f32 {
    BASE_DISTANCE / (1.0 + (DISTANCE_ALPHA * overlap_ratio(edge)))
}

fn aggregate_nodes(edges: &[EdgeRecord]) -> Vec<NodeRecord> {
    let mut index_by_id: HashMap<u64, usize> = HashMap::with_capacity(edges.len() * 2);
    let mut nodes = Vec::new();

    for edge in edges {
        let endpoints = [
            (edge.source_id, &edge.name_source, &edge.desc_source),
            (edge.target_id, &edge.name_target, &edge.desc_target),
        ];

        // Both endpoints of every edge count toward degree, so a duplicate
        // edge contributes twice and a self-loop bumps one node twice. The
        // first edge naming an id supplies its display metadata.
        for (id, name, description) in endpoints {
            let index = *index_by_id.entry(id).or_insert_with(|| {
                nodes.push(NodeRecord {
                    id,
                    name: name.clone(),
                    description: description.clone(),
                    degree: 0,
                    size: MIN_SIZE,
                });
                nodes.len() - 1
            });
            nodes[index].degree += 1;
        }
    }

    for node in &mut nodes {
        node.size = scale_size(node.degree);
    }

    nodes
}

/// Derives the renderer input from a flat edge dataset. Every link endpoint
/// is guaranteed to exist in the node set, since both come from the same
/// edge list.
pub fn build_graph_data(edges: &[EdgeRecord]) -> GraphData {
    let nodes = aggregate_nodes(edges);
    let links = edges
        .iter()
        .map(|edge| LinkRecord {
            source_id: edge.source_id,
            target_id: edge.target_id,
            color: LINK_COLOR,
            distance: link_distance(edge),
        })
        .collect();

    GraphData { nodes, links }
}

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, HashSet};

    use super::*;

    fn edge(
        source_id: u64,
        target_id: u64,
        subscribers_source: u64,
        subscribers_target: u64,
        common_subscribers: u64,
    ) -> EdgeRecord {
        EdgeRecord {
            source_id,
            target_id,
            subscribers_source,
            subscribers_target,
            common_subscribers,
            name_source: format!("Community {source_id}"),
            desc_source: format!("About community {source_id}"),
            name_target: format!("Community {target_id}"),
            desc_target: format!("About community {target_id}"),
        }
    }

    fn worked_example() -> Vec<EdgeRecord> {
        vec![
            edge(0, 1, 20, 20, 20),
            edge(0, 2, 100, 30, 1),
            edge(2, 3, 100, 20, 10),
            edge(3, 4, 40, 20, 14),
        ]
    }

    #[test]
    fn scale_size_stays_bounded_and_non_decreasing() {
        let mut previous = 0.0_f32;
        for degree in 0..100 {
            let size = scale_size(degree);
            assert!((MIN_SIZE..=MAX_SIZE).contains(&size), "size {size} out of bounds");
            assert!(size >= previous, "size shrank at degree {degree}");
            previous = size;
        }
        assert_eq!(scale_size(0), MIN_SIZE);
        assert_eq!(scale_size(6), MAX_SIZE);
        assert_eq!(scale_size(1000), MAX_SIZE);
    }

    #[test]
    fn distance_of_empty_pair_is_base_distance() {
        assert_eq!(link_distance(&edge(0, 1, 0, 0, 0)), BASE_DISTANCE);
    }

    #[test]
    fn distance_shrinks_as_overlap_grows() {
        let mut previous = f32::INFINITY;
        for common in 0..=40 {
            let distance = link_distance(&edge(0, 1, 20, 20, common));
            assert!(distance > 0.0 && distance <= BASE_DISTANCE);
            assert!(
                distance < previous,
                "distance did not shrink at common={common}"
            );
            previous = distance;
        }
    }

    #[test]
    fn distance_matches_worked_example() {
        // ratio 20/40 = 0.5 -> 1000 / (1 + 10 * 0.5)
        let distance = link_distance(&edge(0, 1, 20, 20, 20));
        assert!((distance - 166.666_67).abs() < 0.01, "got {distance}");
    }

    #[test]
    fn aggregation_matches_worked_example() {
        let data = build_graph_data(&worked_example());

        let degrees: HashMap<u64, usize> = data
            .nodes
            .iter()
            .map(|node| (node.id, node.degree))
            .collect();
        assert_eq!(
            degrees,
            HashMap::from([(0, 2), (1, 1), (2, 2), (3, 2), (4, 1)])
        );

        let sizes: HashMap<u64, f32> = data
            .nodes
            .iter()
            .map(|node| (node.id, node.size))
            .collect();
        assert_eq!(
            sizes,
            HashMap::from([(0, 20.0), (1, 15.0), (2, 20.0), (3, 20.0), (4, 15.0)])
        );
    }

    #[test]
    fn aggregation_keeps_first_seen_order_and_metadata() {
        let mut edges = worked_example();
        edges[1].name_source = "Renamed later".to_string();
        edges[1].desc_source = "Should not win".to_string();

        let data = build_graph_data(&edges);
        let ids: Vec<u64> = data.nodes.iter().map(|node| node.id).collect();
        assert_eq!(ids, vec![0, 1, 2, 3, 4]);

        // The first edge mentioning id 0 seeded its metadata; edge 1 does not
        // overwrite it.
        assert_eq!(data.nodes[0].name, "Community 0");
        assert_eq!(data.nodes[0].description, "About community 0");
    }

    #[test]
    fn aggregation_is_idempotent_over_the_edge_list() {
        let edges = worked_example();
        let first = build_graph_data(&edges);
        let second = build_graph_data(&edges);

        assert_eq!(first.node_count(), second.node_count());
        for (a, b) in first.nodes.iter().zip(second.nodes.iter()) {
            assert_eq!(a.id, b.id);
            assert_eq!(a.degree, b.degree);
            assert_eq!(a.size, b.size);
        }
    }

    #[test]
    fn duplicate_edges_double_count_degree_and_links() {
        let edges = vec![edge(7, 9, 50, 50, 5), edge(7, 9, 50, 50, 5)];
        let data = build_graph_data(&edges);

        assert_eq!(data.node_count(), 2);
        assert_eq!(data.link_count(), 2);
        for node in &data.nodes {
            assert_eq!(node.degree, 2);
        }
    }

    #[test]
    fn self_loop_counts_both_endpoints() {
        let data = build_graph_data(&[edge(3, 3, 10, 10, 10)]);
        assert_eq!(data.node_count(), 1);
        assert_eq!(data.nodes[0].degree, 2);
        assert_eq!(data.link_count(), 1);
    }

    #[test]
    fn every_link_endpoint_resolves_to_a_node() {
        let data = build_graph_data(&worked_example());
        let ids: HashSet<u64> = data.nodes.iter().map(|node| node.id).collect();
        for link in &data.links {
            assert!(ids.contains(&link.source_id));
            assert!(ids.contains(&link.target_id));
        }
    }
}
