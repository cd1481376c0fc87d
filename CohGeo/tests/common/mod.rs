//! On-disk game data fixtures for integration tests

#![allow(dead_code)]

#[path = "../../src/test_support.rs"]
mod support;

use std::fs;
use std::path::{Path, PathBuf};

use glam::Vec3;

pub use support::{Chunk, GeoFile, GeoModel, TRIS, VERTS, bin_file};

pub const SCENE_GRAPH_CRC: u32 = cohgeo::formats::scene_graph::SCENE_GRAPH_CRC;
pub const TRICKS_CRC: u32 = cohgeo::formats::modifiers::TRICKS_CRC;

// one triangle (0, 1, 2)
pub const TRIS_RAW: [u8; 4] = [0x11, 0x00, 126, 128];
// vertices (1, 0, 0), (1, 1, 0), (1, 1, 1)
pub const VERTS_RAW: [u8; 7] = [0x01, 0x01, 0x01, 0x00, 128, 128, 128];

pub fn write(base: &Path, relative: &str, bytes: &[u8]) -> PathBuf {
    let path = base.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, bytes).unwrap();
    path
}

pub fn def(name: &str, obj: &str) -> Chunk {
    Chunk::new().string(name).string("").i32(0).string(obj)
}

pub fn group(name: &str, pos: Vec3) -> Chunk {
    Chunk::new().string(name).vec3(pos).vec3(Vec3::ZERO)
}

pub fn root_ref(name: &str, pos: Vec3) -> Chunk {
    Chunk::new().string(name).vec3(pos).vec3(Vec3::ZERO)
}

pub fn scene_bin(source: &str, defs: Vec<Chunk>, refs: Vec<Chunk>) -> Vec<u8> {
    let mut root = Chunk::new().i32(1).string(source);
    for d in defs {
        root = root.child("Def", d);
    }
    for r in refs {
        root = root.child("Ref", r);
    }
    bin_file(SCENE_GRAPH_CRC, &[(source, 0)], &root)
}

pub fn door_geo() -> GeoFile {
    GeoFile::new("doors").texture("door_wood").model(
        GeoModel::new("door_01")
            .vertices(3)
            .triangles(1)
            .bind(0, 1)
            .bounds(Vec3::new(-1.0, 0.0, -1.0), Vec3::new(1.0, 2.0, 1.0))
            .stream(TRIS, &TRIS_RAW, false)
            .stream(VERTS, &VERTS_RAW, true),
    )
}

/// A data root with one prefab library and one map.
///
/// The map places `grp_Door` (holding the library's `door_01` ten units
/// along x) and `grp_Broken`, whose only member exists nowhere.
/// Directory casing on disk differs from the names used in the bins.
pub fn game_data(base: &Path) {
    write(base, "bin/defnames.bin", b"object_library/City/doors.geo/door_01\0");
    write(base, "bin/tricks.bin", &bin_file(TRICKS_CRC, &[("tricks.txt", 0)], &Chunk::new()));
    write(base, "Object_Library/city/DOORS.geo", &door_geo().encode());

    let library = scene_bin(
        "object_library/City/doors.txt",
        vec![def("object_library/City/door_01", "object_library/City/door_01")],
        vec![],
    );
    write(base, "geobin/object_library/City/doors.bin", &library);

    let map = scene_bin(
        "maps/City_Zones/City_01_01/City_01_01.txt",
        vec![
            def("grp_Door", "").child("Group", group("object_library/City/door_01", Vec3::new(10.0, 0.0, 0.0))),
            def("grp_Broken", "").child("Group", group("missing_thing", Vec3::ZERO)),
        ],
        vec![root_ref("grp_Door", Vec3::ZERO), root_ref("grp_Broken", Vec3::ZERO)],
    );
    write(base, "geobin/maps/city_zones/City_01_01/city_01_01.bin", &map);
}
