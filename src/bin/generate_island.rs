//! Island generator binary: builds one island and reports mesh statistics.
//!
//! Usage: cargo run --release --bin generate_island -- [OPTIONS]
//!
//! Options:
//!   --config <PATH>    JSON island config (default: built-in defaults)
//!   --seed <SEED>      Noise seed override
//!   --size <WxHxD>     Field size override, e.g. 40x60x40
//!   --mode <MODE>      Extraction mode: cubes | tetrahedron
//!   --smooth           Sample smooth normals from the field gradient
//!   --dig <X,Y,Z>      Dig at a mesh-space point after generation
//!   --out <PATH>       Write a JSON summary (default: print to stdout)

use std::path::PathBuf;
use std::time::Instant;

use serde_json::json;

use flylands::core::logging;
use flylands::core::types::Vec3;
use flylands::generation::{Island, IslandConfig, IslandGenerator};
use flylands::mesh::ExtractionMode;
use flylands::voxel::Material;

fn main() {
    logging::init();

    let args: Vec<String> = std::env::args().collect();

    let mut config = match parse_str_arg(&args, "--config") {
        Some(path) => match IslandConfig::load(&path) {
            Ok(config) => config,
            Err(e) => {
                log::error!("Failed to load config {}: {}", path, e);
                std::process::exit(1);
            }
        },
        None => IslandConfig::default(),
    };

    if let Some(seed) = parse_u32_arg(&args, "--seed") {
        config.heightmap.seed = seed;
    }
    if let Some((w, h, d)) = parse_size_arg(&args, "--size") {
        config.width = w;
        config.height = h;
        config.depth = d;
    }
    if let Some(mode) = parse_mode_arg(&args, "--mode") {
        config.extraction_mode = mode;
    }
    if args.iter().any(|a| a == "--smooth") {
        config.smooth_normals = true;
    }
    let dig_point = parse_vec3_arg(&args, "--dig");
    let out = parse_str_arg(&args, "--out").map(PathBuf::from);

    println!("=== Flylands Island Generator ===");
    println!("Size:  {}x{}x{}", config.width, config.height, config.depth);
    println!("Seed:  {}", config.heightmap.seed);
    println!("Mode:  {:?}{}", config.extraction_mode, if config.smooth_normals { " (smooth)" } else { "" });
    println!();

    let start = Instant::now();
    let mut island = match IslandGenerator::generate(&config) {
        Ok(island) => island,
        Err(e) => {
            log::error!("Generation failed: {}", e);
            std::process::exit(1);
        }
    };
    let elapsed = start.elapsed();

    let dug = dig_point.map(|p| {
        let changed = island.dig(p);
        if changed {
            println!("Dug at ({}, {}, {}), remeshed", p.x, p.y, p.z);
        } else {
            println!("Nothing to dig at ({}, {}, {})", p.x, p.y, p.z);
        }
        changed
    });

    let summary = summarize(&island, elapsed.as_secs_f64() * 1000.0, dug);
    let text = match serde_json::to_string_pretty(&summary) {
        Ok(text) => text,
        Err(e) => {
            log::error!("Failed to encode summary: {}", e);
            std::process::exit(1);
        }
    };

    match out {
        Some(path) => {
            if let Err(e) = std::fs::write(&path, text) {
                log::error!("Failed to write {}: {}", path.display(), e);
                std::process::exit(1);
            }
            println!("Summary: {}", path.display());
        }
        None => println!("{}", text),
    }

    let mesh = island.mesh();
    println!();
    println!("=== Generation Complete ===");
    println!("Vertices:  {}", mesh.vertex_count());
    println!("Triangles: {}", mesh.triangle_count());
    println!("Time:      {:.1}ms", elapsed.as_secs_f64() * 1000.0);
}

fn summarize(island: &Island, millis: f64, dug: Option<bool>) -> serde_json::Value {
    let field = island.field();
    let mesh = island.mesh();

    let materials: Vec<_> = Material::SOLID
        .iter()
        .map(|m| {
            let count = field.materials().iter().filter(|c| *c == m).count();
            json!({ "material": m, "voxels": count })
        })
        .collect();

    let bounds = island.bounds().map(|b| {
        json!({
            "min": b.min.to_array(),
            "max": b.max.to_array(),
        })
    });

    let lattice_bounds = mesh.lattice_bounds().map(|b| {
        json!({
            "min": b.min.to_array(),
            "max": b.max.to_array(),
        })
    });

    json!({
        "config": island.config(),
        "field": {
            "dims": [field.width(), field.height(), field.depth()],
            "solid_voxels": field.solid_count(),
            "materials": materials,
        },
        "mesh": {
            "vertices": mesh.vertex_count(),
            "triangles": mesh.triangle_count(),
            "has_normals": mesh.normals().is_some(),
            "signed_volume": mesh.signed_volume(),
            "open_edges": mesh.open_edges(),
            "offset": mesh.offset.to_array(),
            "bounds": bounds,
            "lattice_bounds": lattice_bounds,
        },
        "dug": dug,
        "elapsed_ms": millis,
    })
}

fn parse_u32_arg(args: &[String], flag: &str) -> Option<u32> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
}

fn parse_str_arg(args: &[String], flag: &str) -> Option<String> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

fn parse_mode_arg(args: &[String], flag: &str) -> Option<ExtractionMode> {
    parse_str_arg(args, flag).and_then(|s| match s.parse() {
        Ok(mode) => Some(mode),
        Err(e) => {
            log::warn!("Ignoring {}: {}", flag, e);
            None
        }
    })
}

/// `WxHxD`
fn parse_size_arg(args: &[String], flag: &str) -> Option<(usize, usize, usize)> {
    let s = parse_str_arg(args, flag)?;
    let parts: Vec<usize> = s.split('x').filter_map(|p| p.trim().parse().ok()).collect();
    match parts[..] {
        [w, h, d] => Some((w, h, d)),
        _ => {
            log::warn!("Ignoring {} '{}': expected WxHxD", flag, s);
            None
        }
    }
}

/// `X,Y,Z`
fn parse_vec3_arg(args: &[String], flag: &str) -> Option<Vec3> {
    let s = parse_str_arg(args, flag)?;
    let parts: Vec<f32> = s.split(',').filter_map(|p| p.trim().parse().ok()).collect();
    match parts[..] {
        [x, y, z] => Some(Vec3::new(x, y, z)),
        _ => {
            log::warn!("Ignoring {} '{}': expected X,Y,Z", flag, s);
            None
        }
    }
}
