use asp::kernel::camera::PinholeCamera;
use asp::kernel::nalgebra::{Point3, UnitQuaternion};
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// `asp` running in an empty directory, so no stray `asp.toml` is picked up.
fn asp(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("asp").unwrap();
    cmd.current_dir(dir.path()).env_remove("RUST_LOG");
    cmd
}

fn save_pinhole(dir: &Path, name: &str, x: f64) -> PathBuf {
    let path = dir.join(name);
    PinholeCamera::new(Point3::new(x, 0.0, -100.0), UnitQuaternion::identity(), 800.0, 800.0, 400.0, 300.0)
        .unwrap()
        .save(&path)
        .unwrap();
    path
}

fn parse_point(stdout: &[u8]) -> Vec<f64> {
    let text = String::from_utf8_lossy(stdout);
    let line = text.lines().find_map(|l| l.strip_prefix("point: ")).unwrap();
    line.split_whitespace().map(|v| v.parse().unwrap()).collect()
}

#[test]
fn capabilities_report_matches_the_build() {
    let dir = TempDir::new().unwrap();
    let expected = if cfg!(asp_isis) { "isis: present" } else { "isis: absent" };

    asp(&dir).arg("capabilities").assert().success().stdout(predicate::str::contains(expected));
}

#[test]
fn logs_stay_off_stdout() {
    let dir = TempDir::new().unwrap();
    let expected = if cfg!(asp_isis) { "isis: present\n" } else { "isis: absent\n" };

    asp(&dir)
        .args(["-v", "capabilities"])
        .assert()
        .success()
        .stdout(expected)
        .stderr(predicate::str::contains("Starting asp"));
}

#[test]
fn capabilities_json_is_machine_readable() {
    let dir = TempDir::new().unwrap();
    let output = asp(&dir).args(["capabilities", "--json"]).output().unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let isis = report.as_array().unwrap().iter().find(|s| s["name"] == "isis").unwrap();
    assert_eq!(isis["present"], cfg!(asp_isis));
}

#[test]
fn triangulates_a_pinhole_pair() {
    let dir = TempDir::new().unwrap();
    let left = save_pinhole(dir.path(), "left.json", -5.0);
    let right = save_pinhole(dir.path(), "right.json", 5.0);

    // (1, 2, 0) seen from x = -5 and x = 5 at 100 m.
    let output = asp(&dir)
        .arg("triangulate")
        .arg("--left")
        .arg(&left)
        .arg("--right")
        .arg(&right)
        .args(["--left-pixel", "448,316", "--right-pixel", "368,316"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let point = parse_point(&output.stdout);
    assert_eq!(point.len(), 3);
    for (got, want) in point.iter().zip([1.0, 2.0, 0.0]) {
        assert!((got - want).abs() < 1e-6, "{point:?}");
    }
}

#[test]
fn config_file_limits_the_ray_gap() {
    let dir = TempDir::new().unwrap();
    let left = save_pinhole(dir.path(), "left.json", -5.0);
    let right = save_pinhole(dir.path(), "right.json", 5.0);
    let config = dir.path().join("strict.toml");
    fs::write(&config, "[stereo]\nmax_triangulation_error = 0.01\n").unwrap();

    asp(&dir)
        .arg("--config")
        .arg(&config)
        .arg("triangulate")
        .arg("--left")
        .arg(&left)
        .arg("--right")
        .arg(&right)
        .args(["--left-pixel", "448,300", "--right-pixel", "368,316"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("exceeds"));
}

#[test]
fn working_directory_config_selects_the_session() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("asp.toml"), "[stereo]\nsession = \"rpc\"\n").unwrap();

    asp(&dir)
        .args(["triangulate", "--left", "l.json", "--right", "r.json", "--left-pixel", "0,0", "--right-pixel", "0,0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("rpc"));
}

#[test]
fn missing_config_file_is_fatal() {
    let dir = TempDir::new().unwrap();

    asp(&dir)
        .args(["--config", "nowhere.toml", "capabilities"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration is malformed"));
}

#[test]
fn malformed_pixels_are_rejected_by_the_parser() {
    let dir = TempDir::new().unwrap();

    asp(&dir)
        .args(["triangulate", "--left", "l.json", "--right", "r.json", "--left-pixel", "12", "--right-pixel", "0,0"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("expected `x,y`"));
}

#[test]
fn isis_session_follows_the_capability() {
    let dir = TempDir::new().unwrap();
    let assert = asp(&dir)
        .args(["triangulate", "-s", "isis", "--left", "l.cub", "--right", "r.cub"])
        .args(["--left-pixel", "0,0", "--right-pixel", "0,0"])
        .assert()
        .failure();

    if cfg!(asp_isis) {
        // Session accepted; the cubes are missing.
        assert.stderr(predicate::str::contains("Failed to open isis session"));
    } else {
        assert.stderr(predicate::str::contains("lacks"));
    }
}

#[cfg(not(asp_isis))]
#[test]
fn cube_info_requires_the_isis_capability() {
    let dir = TempDir::new().unwrap();

    asp(&dir)
        .args(["cube-info", "scene.cub"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--features isis"));
}

#[cfg(asp_isis)]
#[test]
fn cube_info_describes_a_cube() {
    let dir = TempDir::new().unwrap();
    let cube = dir.path().join("scene.cub");

    let label = "Object = IsisCube\n  Object = Core\n    StartByte = 1025\n    Format = BandSequential\n    \
                 Group = Dimensions\n      Samples = 4\n      Lines = 2\n      Bands = 1\n    End_Group\n    \
                 Group = Pixels\n      Type = UnsignedByte\n      Base = 0.0\n      Multiplier = 1.0\n    \
                 End_Group\n  End_Object\nEnd_Object\nEnd\n";
    let mut bytes = label.as_bytes().to_vec();
    bytes.resize(1024, b' ');
    bytes.extend([0, 10, 20, 30, 40, 50, 60, 255]);
    fs::write(&cube, bytes).unwrap();

    asp(&dir)
        .arg("cube-info")
        .arg(&cube)
        .assert()
        .success()
        .stdout(predicate::str::contains("size: 4 x 2 x 1"))
        .stdout(predicate::str::contains("band 1: valid 6 min 10 max 60"));
}
