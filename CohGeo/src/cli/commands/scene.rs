//! Scene graph CLI commands

use std::path::Path;
use std::time::Instant;

use anyhow::Context;
use serde::Serialize;

use crate::cli::progress::{CUBE, DISK, LOOKING_GLASS, print_done, print_step};
use crate::config::ImportConfig;
use crate::formats::bin_store::{BinStore, MAX_STRING_LEN};
use crate::formats::scene_graph::parse_scene_graph;
use crate::scene::{NodeState, SceneGraph, split_map_path};
use crate::session::ImportSession;
use crate::utils::path::normalize_path;

/// Print a summary of the records in a scene graph bin.
pub fn inspect(path: &Path, crc: u32) -> anyhow::Result<()> {
    println!("Inspecting scene graph: {}", path.display());
    println!();

    let mut store = BinStore::open(path, crc)
        .with_context(|| format!("Failed to open {}", path.display()))?
        .with_max_string_len(MAX_STRING_LEN);
    let files: Vec<String> = store.entries().iter().map(|e| e.name.clone()).collect();
    let data = parse_scene_graph(&mut store).context("Failed to decode scene graph")?;

    println!("Version:     {}", data.version);
    println!("Scene file:  {}", data.scene_file);
    println!("Source files ({}):", files.len());
    for name in &files {
        println!("  - {name}");
    }
    println!();

    println!("Definitions ({}):", data.defs.len());
    for def in &data.defs {
        let obj = if def.obj.is_empty() { "-" } else { def.obj.as_str() };
        println!(
            "  {:40} obj {:40} {} groups, {} props",
            def.name,
            obj,
            def.groups.len(),
            def.properties.len()
        );
    }
    println!();

    println!("References ({}):", data.refs.len());
    for root in &data.refs {
        println!(
            "  {:40} at ({:.1}, {:.1}, {:.1})",
            root.name, root.pos.x, root.pos.y, root.pos.z
        );
    }
    Ok(())
}

#[derive(Serialize)]
struct NodeSummary<'a> {
    name: &'a str,
    dir: &'a str,
    state: NodeState,
    model: Option<&'a str>,
    children: usize,
    center: [f32; 3],
    radius: f32,
    vis_dist: f32,
}

#[derive(Serialize)]
struct MapSummary<'a> {
    map: String,
    nodes: usize,
    roots: usize,
    top_level: Vec<NodeSummary<'a>>,
}

fn summarize<'a>(map: String, graph: &'a mut SceneGraph) -> MapSummary<'a> {
    let top = graph.calculate_usages();
    let graph: &'a SceneGraph = graph;
    let top_level = top
        .values()
        .filter_map(|id| graph.node(*id))
        .map(|node| NodeSummary {
            name: &node.name,
            dir: &node.dir,
            state: graph.node_state(node.id),
            model: node.model.as_ref().map(|m| m.name.as_str()),
            children: node.children.len(),
            center: node.center.to_array(),
            radius: node.radius,
            vis_dist: node.vis_dist,
        })
        .collect();
    MapSummary {
        map,
        nodes: graph.nodes.len(),
        roots: graph.root_refs().count(),
        top_level,
    }
}

/// Load a whole map through an import session and list its top-level nodes.
pub fn load(path: &Path, data: Option<&Path>, config: Option<&Path>, json: Option<&Path>) -> anyhow::Result<()> {
    let started = Instant::now();
    let config = match config {
        Some(cfg) => ImportConfig::from_json_file(cfg)
            .with_context(|| format!("Failed to read config {}", cfg.display()))?,
        None => ImportConfig::default(),
    };
    let map_path = normalize_path(path);
    let base = match data {
        Some(dir) => dir.to_path_buf(),
        None => split_map_path(&map_path, &config.geobin_dir, Path::new(".")).0,
    };

    print_step(1, 3, &LOOKING_GLASS, "Reading defnames and tricks...");
    let mut session = ImportSession::prepare(&base, config)
        .with_context(|| format!("Failed to prepare session under {}", base.display()))?;

    print_step(2, 3, &CUBE, "Loading scene graph...");
    let mut graph = session
        .load_whole_map(&map_path)
        .with_context(|| format!("Failed to load map {map_path}"))?;

    let summary = summarize(map_path, &mut graph);
    println!();
    println!(
        "{} nodes, {} root placements, {} geosets",
        summary.nodes,
        summary.roots,
        session.geosets.len()
    );
    println!("Top-level nodes ({}):", summary.top_level.len());
    for node in &summary.top_level {
        println!(
            "  {:40} center ({:.1}, {:.1}, {:.1}) radius {:.1} vis {:.1}",
            node.name, node.center[0], node.center[1], node.center[2], node.radius, node.vis_dist
        );
    }

    if let Some(out) = json {
        print_step(3, 3, &DISK, "Writing summary...");
        let text = serde_json::to_string_pretty(&summary)?;
        std::fs::write(out, text).with_context(|| format!("Failed to write {}", out.display()))?;
        println!("Written to: {}", out.display());
    }

    print_done(started.elapsed());
    Ok(())
}
