use pointgroups::io::write_ply_binary;
use pointgroups::{convert, ConvertConfig, ParseError, PointRecord};
use pointgroups_core::{ErrorKind, DEFAULT_COLOR};
use std::fs;
use std::path::{Path, PathBuf};

const TRIANGLE_OFF: &str = "OFF\n3 0\n0 0 0\n1 0 0\n0 1 0\n";

fn write_source(dir: &Path, file: &str, contents: &[u8]) -> PathBuf {
    fs::write(dir.join(file), contents).unwrap();
    dir.join(Path::new(file).file_stem().unwrap())
}

#[test]
fn scenario_a_off_triangle() {
    let dir = tempfile::tempdir().unwrap();
    let base = write_source(dir.path(), "tri.off", TRIANGLE_OFF.as_bytes());

    let result = convert(&base, &ConvertConfig::default()).unwrap();
    assert_eq!(result.total_points, 3);
    assert_eq!(result.origin, Some([0.0, 0.0, 0.0]));
    assert_eq!(result.groups.len(), 1);

    let group = &result.groups[0];
    assert_eq!(
        group.positions,
        vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]
    );
    assert!(group.colors.iter().all(|&c| c == DEFAULT_COLOR));
}

#[test]
fn scenario_b_scale_and_invert_yz() {
    let dir = tempfile::tempdir().unwrap();
    let base = write_source(dir.path(), "tri.off", TRIANGLE_OFF.as_bytes());
    let config = ConvertConfig {
        scale: 2.0,
        invert_yz: true,
        ..Default::default()
    };

    let result = convert(&base, &config).unwrap();
    assert_eq!(
        result.groups[0].positions,
        vec![[0.0, 0.0, 0.0], [2.0, 0.0, 0.0], [0.0, 0.0, 2.0]]
    );
}

#[test]
fn scenario_c_seventy_thousand_points_make_two_groups() {
    let records: Vec<PointRecord> = (0..70_000)
        .map(|i| {
            let f = i as f64;
            PointRecord::new([f * 0.5, 100.0 - f * 0.001, 7.0], [(i % 251) as u8, 3, 4])
        })
        .collect();
    let mut bytes = Vec::new();
    write_ply_binary(&mut bytes, &records).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let base = write_source(dir.path(), "big.ply", &bytes);

    let result = convert(&base, &ConvertConfig::default()).unwrap();
    assert_eq!(result.total_points, 70_000);
    assert_eq!(result.groups.len(), 2);
    assert_eq!(result.groups[0].len(), 65_000);
    assert_eq!(result.groups[1].len(), 5_000);
    assert_eq!(result.groups[1].index, 1);

    // first record of the second group is source record 65000
    let origin = result.origin.unwrap();
    let back = result.groups[1].absolute_position(0, origin);
    assert!((back[0] - 32_500.0).abs() < 1e-2);
    assert_eq!(result.groups[1].colors[0], [(65_000 % 251) as u8, 3, 4]);
}

#[test]
fn scenario_d_big_endian_is_rejected() {
    let header = "ply\nformat binary_big_endian 1.0\nelement vertex 2\n\
                  property float x\nproperty float y\nproperty float z\nend_header\n";
    let dir = tempfile::tempdir().unwrap();
    let base = write_source(dir.path(), "be.ply", header.as_bytes());

    let err = convert(&base, &ConvertConfig::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedEncoding);
}

#[test]
fn scenario_e_missing_z() {
    let header = "ply\nformat binary_little_endian 1.0\nelement vertex 1\n\
                  property float x\nproperty float y\nproperty uchar red\nend_header\n";
    let dir = tempfile::tempdir().unwrap();
    let base = write_source(dir.path(), "flat.ply", header.as_bytes());

    let err = convert(&base, &ConvertConfig::default()).unwrap_err();
    assert!(matches!(err, ParseError::MissingPositionProperty("z")));
}

#[test]
fn neither_extension_exists() {
    let dir = tempfile::tempdir().unwrap();
    let err = convert(dir.path().join("nothing"), &ConvertConfig::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::FileNotFound);
}

#[test]
fn zero_capacity_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let base = write_source(dir.path(), "tri.off", TRIANGLE_OFF.as_bytes());
    let config = ConvertConfig {
        capacity: 0,
        ..Default::default()
    };
    assert_eq!(
        convert(&base, &config).unwrap_err().kind(),
        ErrorKind::InvalidCapacity
    );
}

#[test]
fn positive_cloud_origin_is_its_minimum_corner() {
    let src = "OFF\n3 0\n10 20 30\n12 19 31\n11 25 35\n";
    let dir = tempfile::tempdir().unwrap();
    let base = write_source(dir.path(), "pos.off", src.as_bytes());

    let result = convert(&base, &ConvertConfig::default()).unwrap();
    assert_eq!(result.origin, Some([10.0, 19.0, 30.0]));
    assert_eq!(
        result.groups[0].positions,
        vec![[0.0, 1.0, 0.0], [2.0, 0.0, 1.0], [1.0, 6.0, 5.0]]
    );
}

#[test]
fn converting_twice_is_bit_identical() {
    let records: Vec<PointRecord> = (0..1_000)
        .map(|i| {
            let f = i as f64;
            PointRecord::new([431_000.0 + f * 0.37, 5_200_000.0 - f * 0.11, f.sin()], [1, 2, 3])
        })
        .collect();
    let mut bytes = Vec::new();
    write_ply_binary(&mut bytes, &records).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let base = write_source(dir.path(), "survey.ply", &bytes);
    let config = ConvertConfig {
        capacity: 300,
        ..Default::default()
    };

    let a = convert(&base, &config).unwrap();
    let b = convert(&base, &config).unwrap();
    assert_eq!(a.groups.len(), 4);
    for (ga, gb) in a.groups.iter().zip(&b.groups) {
        let bits_a: Vec<[u32; 3]> = ga.positions.iter().map(|p| p.map(f32::to_bits)).collect();
        let bits_b: Vec<[u32; 3]> = gb.positions.iter().map(|p| p.map(f32::to_bits)).collect();
        assert_eq!(bits_a, bits_b);
        assert_eq!(ga.colors, gb.colors);
    }
    assert_eq!(
        a.origin.map(|o| o.map(f64::to_bits)),
        b.origin.map(|o| o.map(f64::to_bits))
    );
}
