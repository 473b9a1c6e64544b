mod test_util;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use test_util::{run_batch, run_line};

#[test]
fn pwd_prints_cwd() {
    let dir = tempfile::tempdir().unwrap();
    let r = run_line(dir.path(), "pwd").unwrap();
    assert_eq!(r.stdout.trim_end(), dir.path().canonicalize().unwrap().to_str().unwrap());
}

#[test]
fn cd_changes_directory_for_later_commands() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join("sub")).unwrap();
    fs::write(dir.path().join("sub/inside.txt"), "").unwrap();
    let r = run_batch(dir.path(), &[], &["cd sub", "ls"]).unwrap();
    assert_eq!(r.stdout, "inside.txt\n");
}

#[test]
fn cd_dash_returns_to_the_previous_directory() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().canonicalize().unwrap();
    fs::create_dir(root.join("a")).unwrap();
    fs::create_dir(root.join("b")).unwrap();
    let r = run_batch(&root, &[], &["cd a", "cd ../b", "cd -", "pwd", "cd -", "pwd"]).unwrap();
    let a = root.join("a");
    let b = root.join("b");
    assert_eq!(r.stdout, format!("{}\n{}\n", a.display(), b.display()));
    assert_eq!(r.stderr, "");
}

#[test]
fn cd_dash_without_history_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let r = run_batch(dir.path(), &[], &["cd -", "pwd"]).unwrap();
    assert!(r.stderr.contains("cd: no previous directory"), "{}", r.stderr);
    assert_eq!(r.stdout.trim_end(), dir.path().canonicalize().unwrap().to_str().unwrap());
}

#[test]
fn failed_cd_leaves_directory_and_history_alone() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().canonicalize().unwrap();
    let r = run_batch(&root, &[], &["cd does-not-exist", "pwd", "cd -"]).unwrap();
    assert!(r.stderr.contains("cd failed: does-not-exist"), "{}", r.stderr);
    assert!(r.stderr.contains("cd: no previous directory"));
    assert_eq!(r.stdout, format!("{}\n", root.display()));
}

#[test]
fn cd_needs_exactly_one_argument() {
    let dir = tempfile::tempdir().unwrap();
    let r = run_batch(dir.path(), &[], &["cd", "cd a b"]).unwrap();
    assert_eq!(test_util::count(&r.stderr, "cd: Invalid number of arguments"), 2, "{}", r.stderr);
}

#[test]
fn exit_stops_the_shell_with_zero() {
    let dir = tempfile::tempdir().unwrap();
    let r = run_batch(dir.path(), &[], &["echo before", "exit 3 ignored", "echo after"]).unwrap();
    assert_eq!(r.code, 0);
    assert_eq!(r.stdout, "before\n");
}

fn bin_dir() -> tempfile::TempDir {
    let bin = tempfile::tempdir().unwrap();
    let tool = bin.path().join("tool");
    fs::write(&tool, "#!/bin/sh\n").unwrap();
    fs::set_permissions(&tool, fs::Permissions::from_mode(0o755)).unwrap();
    let plain = bin.path().join("plain");
    fs::write(&plain, "").unwrap();
    fs::set_permissions(&plain, fs::Permissions::from_mode(0o644)).unwrap();
    bin
}

#[test]
fn which_searches_configured_dirs_in_order() {
    let empty = tempfile::tempdir().unwrap();
    let bin = bin_dir();
    let dirs = format!("{}:{}", empty.path().display(), bin.path().display());
    let r = run_batch(empty.path(), &["--which-dirs", &dirs], &["which tool", "which plain"]).unwrap();
    assert_eq!(r.stdout, format!("{}\n{}\n", bin.path().join("tool").display(), bin.path().join("plain").display()));
}

#[test]
fn which_executable_mode_skips_plain_files() {
    let bin = bin_dir();
    let dirs = bin.path().display().to_string();
    let r = run_batch(bin.path(), &["--which-dirs", &dirs, "--which-mode", "executable"], &["which tool", "which plain"]).unwrap();
    assert_eq!(r.stdout, format!("{}\n", bin.path().join("tool").display()));
    assert!(r.stderr.contains("which: plain not found"), "{}", r.stderr);
}

#[test]
fn which_uses_path_by_default() {
    let bin = bin_dir();
    let r = test_util::mysh(bin.path())
        .env("PATH", bin.path())
        .arg("-c").arg("which tool")
        .output().unwrap();
    assert_eq!(String::from_utf8_lossy(&r.stdout), format!("{}\n", bin.path().join("tool").display()));
}

#[test]
fn which_reports_missing_commands() {
    let dir = tempfile::tempdir().unwrap();
    let dirs = dir.path().display().to_string();
    let r = run_batch(dir.path(), &["--which-dirs", &dirs], &["which nothing-here", "which"]).unwrap();
    assert!(r.stderr.contains("which: nothing-here not found"), "{}", r.stderr);
    assert!(r.stderr.contains("which: missing command name"));
    assert_eq!(r.stdout, "");
}
