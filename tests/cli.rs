//! End-to-end checks of the `viewer_packager` binary.

use assert_cmd::Command;
use predicates::prelude::*;

fn packager() -> Command {
    Command::cargo_bin("viewer_packager").unwrap()
}

#[test]
fn help_lists_packaging_flags() {
    packager()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--platform"))
        .stdout(predicate::str::contains("--actions"));
}

#[test]
fn unknown_platform_is_rejected() {
    packager()
        .args(["--platform", "beos", "--arch", "x86_64"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("beos"));
}

#[test]
fn missing_source_root_exits_with_usage_code() {
    let dir = tempfile::tempdir().unwrap();
    let build = dir.path().join("build");
    std::fs::create_dir_all(&build).unwrap();

    packager()
        .env_clear()
        .args(["--platform", "linux", "--arch", "x86_64"])
        .args(["--channel", "Singularity Release", "--version", "1.8.7.6861"])
        .args(["--configuration", "Release", "--actions", "copy"])
        .arg("--source")
        .arg(dir.path().join("missing"))
        .arg("--build")
        .arg(&build)
        .arg("--dest")
        .arg(dir.path().join("packaged"))
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--source"));
}

#[test]
fn copy_only_run_stages_the_tree() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("source");
    let build = dir.path().join("build");
    std::fs::create_dir_all(&source).unwrap();
    std::fs::create_dir_all(dir.path().join("llplugin/slplugin")).unwrap();
    std::fs::write(build.join("singularity-bin"), b"elf").unwrap();
    std::fs::write(dir.path().join("llplugin/slplugin/SLPlugin"), b"elf").unwrap();
    let dest = dir.path().join("packaged");

    packager()
        .env_clear()
        .args(["--platform", "linux", "--arch", "x86_64"])
        .args(["--channel", "Singularity Release", "--version", "1.8.7.6861"])
        .args(["--configuration", "Release", "--actions", "copy", "--quiet"])
        .arg("--source")
        .arg(&source)
        .arg("--build")
        .arg(&build)
        .arg("--dest")
        .arg(&dest)
        .assert()
        .success();

    assert!(dest.join("bin/do-not-directly-run-singularity-bin").is_file());
    assert!(dest.join("bin/SLPlugin").is_file());
}
