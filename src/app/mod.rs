use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use eframe::egui::{self, Color32, Context, Pos2, Vec2};

use crate::data::{GraphData, build_graph_data, load_edge_dataset, sample_edges};

mod graph;
mod physics;
mod render_utils;
mod ui;

pub struct CommunityGraphApp {
    data_path: Option<String>,
    state: AppState,
    reload_rx: Option<Receiver<LoadResult>>,
}

type LoadResult = Result<(GraphData, String), String>;

enum AppState {
    Loading {
        rx: Receiver<LoadResult>,
    },
    Ready(Box<ViewModel>),
    Error(String),
}

struct ViewModel {
    graph: GraphData,
    source_label: String,
    search: String,
    pan: Vec2,
    zoom: f32,
    live_physics: bool,
    charge_strength: f32,
    collide_radius: f32,
    collide_strength: f32,
    link_strength: f32,
    velocity_damping: f32,
    graph_dirty: bool,
    render_graph_revision: u64,
    graph_cache: Option<RenderGraph>,
    search_match_cache: Option<SearchMatchCache>,
    dragged: Option<usize>,
    show_fps_bar: bool,
    fps_current: f32,
    fps_samples: VecDeque<f32>,
    visible_node_count: usize,
    visible_link_count: usize,
}

struct SearchMatchCache {
    query: String,
    graph_revision: u64,
    matches: Arc<HashSet<usize>>,
}

struct RenderGraph {
    nodes: Vec<RenderNode>,
    links: Vec<RenderLink>,
    forces_scratch: Vec<Vec2>,
    view_scratch: ViewScratch,
}

struct ViewScratch {
    screen_positions: Vec<Pos2>,
    screen_radii: Vec<f32>,
}

struct RenderNode {
    id: u64,
    world_pos: Vec2,
    velocity: Vec2,
    /// Drag pin: while `Some`, the simulation holds the node at this world
    /// position; `None` means the node moves freely.
    pinned: Option<Vec2>,
    degree: usize,
    base_radius: f32,
}

struct RenderLink {
    from: usize,
    to: usize,
    length: f32,
    color: Color32,
}

/// Every force the simulation applies, named with its parameters. Built
/// fresh from the view model each tick and handed to the physics step as a
/// value; the simulation itself carries no force state to mutate.
#[derive(Clone, Copy)]
struct ForceConfig {
    link_strength: f32,
    charge_strength: f32,
    collide_radius: f32,
    collide_strength: f32,
    velocity_damping: f32,
    delta_seconds: f32,
}

fn load_graph(data_path: Option<&str>) -> anyhow::Result<(GraphData, String)> {
    let (edges, source_label) = match data_path {
        Some(path) => (load_edge_dataset(path)?, path.to_owned()),
        None => (sample_edges(), "built-in sample".to_owned()),
    };

    let data = build_graph_data(&edges);
    log::info!(
        "loaded {} edges from {source_label}: {} communities, {} links",
        edges.len(),
        data.node_count(),
        data.link_count()
    );

    Ok((data, source_label))
}

impl CommunityGraphApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, data_path: Option<String>) -> Self {
        let state = Self::start_load(data_path.clone());
        Self {
            data_path,
            state,
            reload_rx: None,
        }
    }

    fn spawn_load(data_path: Option<String>) -> Receiver<LoadResult> {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let result = load_graph(data_path.as_deref()).map_err(|error| {
                log::warn!("dataset load failed: {error:#}");
                format!("{error:#}")
            });
            let _ = tx.send(result);
        });

        rx
    }

    fn start_load(data_path: Option<String>) -> AppState {
        AppState::Loading {
            rx: Self::spawn_load(data_path),
        }
    }
}

impl eframe::App for CommunityGraphApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;

        match &mut self.state {
            AppState::Loading { rx } => {
                if let Ok(result) = rx.try_recv() {
                    transition = Some(match result {
                        Ok((graph, source_label)) => {
                            AppState::Ready(Box::new(ViewModel::new(graph, source_label)))
                        }
                        Err(error) => AppState::Error(error),
                    });
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading community graph...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
            }
            AppState::Error(error) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load the community graph");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    if ui.button("Retry").clicked() {
                        transition = Some(Self::start_load(self.data_path.clone()));
                    }
                });
            }
            AppState::Ready(model) => {
                let mut reload_requested = false;
                let is_reloading = self.reload_rx.is_some();
                model.show(ctx, &mut reload_requested, is_reloading);

                if reload_requested && self.reload_rx.is_none() {
                    self.reload_rx = Some(Self::spawn_load(self.data_path.clone()));
                }

                if let Some(rx) = self.reload_rx.take() {
                    match rx.try_recv() {
                        Ok(result) => {
                            transition = Some(match result {
                                Ok((graph, source_label)) => {
                                    AppState::Ready(Box::new(ViewModel::new(graph, source_label)))
                                }
                                Err(error) => AppState::Error(error),
                            });
                        }
                        Err(TryRecvError::Empty) => {
                            self.reload_rx = Some(rx);
                        }
                        Err(TryRecvError::Disconnected) => {
                            transition =
                                Some(AppState::Error("Background load worker disconnected".to_owned()));
                        }
                    }
                }
            }
        }

        if let Some(next_state) = transition {
            self.reload_rx = None;
            self.state = next_state;
        }
    }
}
