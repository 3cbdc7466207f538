use super::EdgeRecord;

struct SampleCommunity {
    id: u64,
    name: &'static str,
    description: &'static str,
}

static COMMUNITIES: [SampleCommunity; 5] = [
    SampleCommunity {
        id: 0,
        name: "Systems Guild",
        description: "Low-level programming, allocators, and profilers",
    },
    SampleCommunity {
        id: 1,
        name: "Kernel Corner",
        description: "Operating system internals and driver talk",
    },
    SampleCommunity {
        id: 2,
        name: "Synthwave FM",
        description: "Retro synth production and weekly listening threads",
    },
    SampleCommunity {
        id: 3,
        name: "Pixel Forge",
        description: "Pixel art, palettes, and game jam showcases",
    },
    SampleCommunity {
        id: 4,
        name: "Indie Devlog",
        description: "Small-team game development diaries",
    },
];

fn community(id: u64) -> &'static SampleCommunity {
    COMMUNITIES
        .iter()
        .find(|community| community.id == id)
        .unwrap_or(&COMMUNITIES[0])
}

fn sample_edge(
    source_id: u64,
    target_id: u64,
    subscribers_source: u64,
    subscribers_target: u64,
    common_subscribers: u64,
) -> EdgeRecord {
    let source = community(source_id);
    let target = community(target_id);

    EdgeRecord {
        source_id,
        target_id,
        subscribers_source,
        subscribers_target,
        common_subscribers,
        name_source: source.name.to_string(),
        desc_source: source.description.to_string(),
        name_target: target.name.to_string(),
        desc_target: target.description.to_string(),
    }
}

/// The built-in dataset used when no `--data` file is given. Constructed on
/// demand so the graph derivation has an explicit input value rather than a
/// process-wide global.
pub fn sample_edges() -> Vec<EdgeRecord> {
    vec![
        sample_edge(0, 1, 20, 20, 20),
        sample_edge(0, 2, 100, 30, 1),
        sample_edge(2, 3, 100, 20, 10),
        sample_edge(3, 4, 40, 20, 14),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::build_graph_data;

    #[test]
    fn sample_derives_the_expected_graph() {
        let data = build_graph_data(&sample_edges());
        assert_eq!(data.node_count(), 5);
        assert_eq!(data.link_count(), 4);
        assert!(data.nodes.iter().all(|node| !node.name.is_empty()));
        assert!(data.nodes.iter().all(|node| !node.description.is_empty()));
    }
}
