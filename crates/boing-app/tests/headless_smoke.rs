use std::io::Write;
use std::process::Command;

fn boing() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_boing"));
    cmd.env("RUST_LOG", "off")
        .env_remove("BOING_CONFIG")
        .env_remove("BOING_SEED")
        .env_remove("BOING_SINK");
    cmd
}

#[test]
fn unpaced_run_prints_frames() {
    let output = boing()
        .args(["--ticks", "30", "--unpaced", "--sink", "null", "--frames"])
        .output()
        .expect("failed to run boing binary");
    assert!(output.status.success(), "headless run failed: {output:?}");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("tick 1\n"));
    assert!(stdout.contains("tick 30\n"));
    assert_eq!(stdout.lines().filter(|l| l.starts_with("tick ")).count(), 30);
}

#[test]
fn same_seed_prints_same_frames() {
    let run = || {
        boing()
            .args(["--ticks", "60", "--unpaced", "--sink", "null", "--frames", "--seed", "99"])
            .output()
            .expect("failed to run boing binary")
    };
    let first = run();
    let second = run();
    assert!(first.status.success());
    assert_eq!(first.stdout, second.stdout);
}

#[test]
fn reads_json_config_file() {
    let mut file = tempfile::NamedTempFile::new().expect("temp config");
    write!(
        file,
        r#"{{ "size": 5, "rng_seed": 12, "populations": [
            {{ "name": "pad", "max_population": 2, "birth_rate": 1, "motion": "DOWN" }}
        ] }}"#
    )
    .expect("write config");

    let output = boing()
        .arg("--config")
        .arg(file.path())
        .arg("--dump-config")
        .output()
        .expect("failed to run boing binary");
    assert!(output.status.success(), "dump failed: {output:?}");
    let dumped: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("dumped config is JSON");
    assert_eq!(dumped["size"], 5);
    assert_eq!(dumped["populations"][0]["motion"], "DOWN");

    let output = boing()
        .arg("--config")
        .arg(file.path())
        .args(["--ticks", "10", "--unpaced", "--sink", "log"])
        .output()
        .expect("failed to run boing binary");
    assert!(output.status.success(), "configured run failed: {output:?}");
}

#[test]
fn invalid_config_fails() {
    let mut file = tempfile::NamedTempFile::new().expect("temp config");
    write!(file, r#"{{ "size": 1 }}"#).expect("write config");
    let output = boing()
        .arg("--config")
        .arg(file.path())
        .args(["--ticks", "1", "--unpaced", "--sink", "null"])
        .output()
        .expect("failed to run boing binary");
    assert!(!output.status.success());
}
