use pointgroups::convert::{
    convert_batch, load_or_convert, source_id, spawn_conversion, DirStore, ResultStore,
};
use pointgroups::core::{NoProgress, ProgressEvent};
use pointgroups::io::write_ply_binary;
use pointgroups::{ConvertConfig, Converter, PointRecord};
use std::fs::{self, File};
use std::path::{Path, PathBuf};

/// Synthetic scene: a 100x100 ground grid at z ≈ 0 plus an elevated block, far
/// from the origin like a georeferenced scan.
fn write_scene(dir: &Path, name: &str) -> PathBuf {
    let mut records = Vec::new();
    for i in 0..100 {
        for j in 0..100 {
            records.push(PointRecord::new(
                [500_000.0 + i as f64 * 0.5, 4_000_000.0 + j as f64 * 0.5, (i * j) as f64 * 1e-3],
                [90, 140, 60],
            ));
        }
    }
    for k in 0..500 {
        records.push(PointRecord::new(
            [500_010.0 + (k % 10) as f64, 4_000_010.0 + (k / 10) as f64 * 0.2, 25.0],
            [200, 40, 40],
        ));
    }
    write_ply_binary(File::create(dir.join(format!("{}.ply", name))).unwrap(), &records).unwrap();
    dir.join(name)
}

/// End-to-end: convert -> store -> reload, with re-based positions staying
/// small and reproducible.
#[test]
fn pipeline_convert_store_reload() {
    let dir = tempfile::tempdir().unwrap();
    let base = write_scene(dir.path(), "scene");
    let config = ConvertConfig {
        capacity: 4_000,
        ..Default::default()
    };
    let converter = Converter::new(config);
    let mut store = DirStore::new(dir.path().join("meshes"));

    let id = source_id(&base);
    assert_eq!(id, "scene");

    let mut events = Vec::new();
    let mut progress = |f: f32, m: &str| events.push((f, m.to_string()));
    let result = load_or_convert(&id, &base, &mut store, &converter, false, &mut progress).unwrap();

    assert_eq!(result.total_points, 10_500);
    assert_eq!(result.groups.len(), 3);
    assert_eq!(result.groups[2].len(), 2_500);
    assert_eq!(result.origin, Some([500_000.0, 4_000_000.0, 0.0]));

    // Re-based coordinates stay within the scene's extent.
    for (p, _) in result.iter_points() {
        assert!(p.iter().all(|v| (0.0..=60.0).contains(v)), "{:?}", p);
    }

    assert!(events.iter().any(|(_, m)| m.ends_with("loaded")));
    assert!(events.iter().any(|(_, m)| m.ends_with("point groups built")));
    assert!(store.contains("scene"));

    // Second call hits the store, even with the source removed.
    fs::remove_file(dir.path().join("scene.ply")).unwrap();
    let reloaded =
        load_or_convert(&id, &base, &mut store, &converter, false, &mut NoProgress).unwrap();
    assert_eq!(reloaded, result);
}

#[test]
fn worker_thread_matches_inline_conversion() {
    let dir = tempfile::tempdir().unwrap();
    let base = write_scene(dir.path(), "scene");
    let config = ConvertConfig::default();

    let handle = spawn_conversion(base.clone(), config);
    let events: Vec<ProgressEvent> = handle.events().iter().collect();
    let threaded = handle.join().unwrap();
    let inline = Converter::new(config).convert_path(&base, &mut NoProgress).unwrap();

    assert_eq!(threaded, inline);
    let loaded: Vec<f32> = events
        .iter()
        .filter(|e| e.message.ends_with("loaded"))
        .map(|e| e.fraction)
        .collect();
    assert!(!loaded.is_empty());
    assert!(loaded.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn batch_converts_independent_sources() {
    let dir = tempfile::tempdir().unwrap();
    let a = write_scene(dir.path(), "a");
    let b = write_scene(dir.path(), "b");
    fs::write(dir.path().join("c.off"), "OFF\n2 0\n1 1 1\n2 2 2\n").unwrap();
    let c = dir.path().join("c");

    let results = convert_batch(&[a, b, c], &ConvertConfig::default());
    let a = results[0].as_ref().unwrap();
    let b = results[1].as_ref().unwrap();
    let c = results[2].as_ref().unwrap();
    assert_eq!(a, b);
    assert_eq!(c.total_points, 2);
    assert_eq!(c.origin, Some([1.0, 1.0, 1.0]));
}
