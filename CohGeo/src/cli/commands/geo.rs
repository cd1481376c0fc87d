//! GEO CLI commands
//!
//! Commands for inspecting, extracting and validating `.geo` files.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use console::style;
use serde::Serialize;
use walkdir::WalkDir;

use crate::cli::progress::{GEAR, print_done, print_step, simple_bar};
use crate::formats::geo::{GeoSet, GeoSetId};
use crate::geometry::MeshBuffers;

fn open_geoset(path: &Path) -> anyhow::Result<GeoSet> {
    let geopath = path.to_string_lossy().replace('\\', "/");
    GeoSet::read(path, GeoSetId(0), geopath).with_context(|| format!("Failed to read {}", path.display()))
}

/// Print the header of a GEO file.
pub fn inspect(path: &Path) -> anyhow::Result<()> {
    println!("Inspecting GEO file: {}", path.display());
    println!();

    let geoset = open_geoset(path)?;

    println!("GEO File Information");
    println!("====================");
    println!("Name:        {}", geoset.name);
    println!("Data size:   {} bytes", geoset.geo_data_size);
    println!("Data offset: {}", geoset.data_offset());
    println!();

    println!("Textures ({}):", geoset.tex_names.len());
    for (index, tex) in geoset.tex_names.iter().enumerate() {
        println!("  [{index:2}] {tex}");
    }
    println!();

    println!("Models ({}):", geoset.models.len());
    for model in &geoset.models {
        println!(
            "  - {} ({} vertices, {} triangles, blend {:?})",
            model.name, model.vertex_count, model.tri_count, model.blend_mode
        );
        println!("      flags: {:?}", model.flags);
        if let Some(trick) = &model.trick {
            println!("      trick: {:?}", trick.flags);
        }
        let binds: Vec<String> = model
            .texture_binds
            .iter()
            .map(|b| format!("{}x{}", b.tex_idx, b.tri_count))
            .collect();
        if !binds.is_empty() {
            println!("      binds: {}", binds.join(", "));
        }
    }

    Ok(())
}

#[derive(Serialize)]
struct ExtractedModel<'a> {
    name: &'a str,
    textures: Vec<&'a str>,
    submesh_triangles: Vec<usize>,
    mesh: MeshBuffers,
}

/// Decode meshes to JSON.
pub fn extract(path: &Path, output: &Path, model: Option<&str>) -> anyhow::Result<()> {
    println!("Extracting GEO meshes to JSON: {}", path.display());

    let mut geoset = open_geoset(path)?;
    geoset.load_data().context("Failed to read geometry payload")?;

    let mut extracted = Vec::new();
    for (index, m) in geoset.models.iter().enumerate() {
        if model.is_some_and(|wanted| !m.name.eq_ignore_ascii_case(wanted)) {
            continue;
        }
        let mesh = geoset
            .model_geometry(index, true)
            .with_context(|| format!("Failed to decode model {}", m.name))?;
        let submesh_triangles = mesh
            .submesh_triangles(&m.texture_binds)
            .map(|ranges| ranges.iter().map(|r| r.len()).collect())
            .unwrap_or_default();
        let textures = m
            .texture_binds
            .iter()
            .map(|b| geoset.tex_names.get(b.tex_idx as usize).map_or("", String::as_str))
            .collect();
        extracted.push(ExtractedModel {
            name: &m.name,
            textures,
            submesh_triangles,
            mesh,
        });
    }

    if let Some(wanted) = model {
        if extracted.is_empty() {
            anyhow::bail!("Model {wanted} not found in {}", path.display());
        }
    }

    let json = serde_json::to_string_pretty(&extracted)?;
    std::fs::write(output, json)?;

    println!("Written {} models to: {}", extracted.len(), output.display());
    Ok(())
}

fn validate_file(path: &Path) -> Result<usize, String> {
    let mut geoset = GeoSet::read(path, GeoSetId(0), path.to_string_lossy()).map_err(|e| e.to_string())?;
    geoset.load_data().map_err(|e| e.to_string())?;
    for (index, model) in geoset.models.iter().enumerate() {
        let mesh = geoset
            .model_geometry(index, true)
            .map_err(|e| format!("{}: {e}", model.name))?;
        mesh.submesh_triangles(&model.texture_binds)
            .map_err(|e| format!("{}: {e}", model.name))?;
    }
    Ok(geoset.models.len())
}

/// Decode every model of every GEO file under `dir`.
pub fn validate(dir: &Path, quiet: bool) -> anyhow::Result<()> {
    let started = Instant::now();
    let files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            e.path()
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("geo"))
        })
        .map(walkdir::DirEntry::into_path)
        .collect();

    print_step(1, 1, &GEAR, &format!("Validating {} GEO files...", files.len()));
    let pb = (!quiet).then(|| simple_bar(files.len() as u64, "Decoding"));

    let mut models = 0;
    let mut failures = Vec::new();
    for path in &files {
        match validate_file(path) {
            Ok(count) => models += count,
            Err(e) => failures.push((path, e)),
        }
        if let Some(pb) = &pb {
            pb.inc(1);
        }
    }
    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    println!("{} models decoded from {} files", models, files.len() - failures.len());
    if !failures.is_empty() {
        println!("{} files failed:", style(failures.len()).red().bold());
        for (path, error) in &failures {
            println!("  {} {}", style(path.display()).yellow(), error);
        }
    }
    print_done(started.elapsed());
    Ok(())
}
