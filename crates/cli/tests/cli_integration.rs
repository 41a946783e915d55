use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

fn make_temp_dir(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock is before UNIX_EPOCH")
        .as_nanos();
    let pid = std::process::id();
    let dir = std::env::temp_dir().join(format!("cmdflow-integ-{prefix}-{pid}-{nanos}"));
    fs::create_dir_all(&dir).expect("failed to create temp dir");
    dir
}

fn cmdflow(dir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_cmdflow"));
    cmd.current_dir(dir).env_remove("RUST_LOG");
    cmd
}

fn run(dir: &Path, args: &[&str]) -> Output {
    cmdflow(dir)
        .args(args)
        .output()
        .expect("failed to run cmdflow")
}

fn stdout(out: &Output) -> String {
    String::from_utf8_lossy(&out.stdout).into_owned()
}

fn stderr(out: &Output) -> String {
    String::from_utf8_lossy(&out.stderr).into_owned()
}

fn assert_success(out: &Output, what: &str) {
    assert!(
        out.status.success(),
        "{what} failed:\nstatus: {}\nstderr:\n{}",
        out.status,
        stderr(out),
    );
}

#[test]
fn help_works() {
    let dir = make_temp_dir("help");
    let out = run(&dir, &["--help"]);
    assert_success(&out, "cmdflow --help");

    let text = stdout(&out);
    assert!(
        text.starts_with("Usage: cmdflow [COMMAND] [OPTIONS]"),
        "unexpected help output:\n{text}"
    );
    for needle in ["config, cfg", "config keys", "echo", "manifest", "--[no-]name <string>"] {
        assert!(text.contains(needle), "missing {needle:?} in help:\n{text}");
    }

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn root_handler_greets() {
    let dir = make_temp_dir("greet");
    let out = run(&dir, &["--name", "ada", "-t", "2"]);
    assert_success(&out, "cmdflow --name ada");
    assert_eq!(stdout(&out), "hello, ada!\nhello, ada!\n");
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn shared_command_prints_root_config() {
    let dir = make_temp_dir("config");
    let out = run(&dir, &["config", "--loud"]);
    assert_success(&out, "cmdflow config");

    let json: serde_json::Value = serde_json::from_str(&stdout(&out)).expect("config is JSON");
    assert_eq!(json["name"], "world");
    assert_eq!(json["loud"], true);
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn invalid_option_prints_error_then_help_and_fails() {
    let dir = make_temp_dir("invalid");
    let out = run(&dir, &["--bogus"]);
    assert!(!out.status.success(), "expected failure");
    assert_eq!(out.status.code(), Some(1));

    assert_eq!(stderr(&out), "invalid option '--bogus' for 'cmdflow'\n");
    assert!(stdout(&out).starts_with("Usage: cmdflow"));
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn isolated_command_rejects_root_options() {
    let dir = make_temp_dir("isolated");
    let out = run(&dir, &["echo", "--loud", "hi"]);
    assert_eq!(out.status.code(), Some(1));
    assert_eq!(stderr(&out), "invalid option '--loud' for 'echo'\n");
    assert!(stdout(&out).starts_with("Usage: echo [OPTIONS]"));

    let out = run(&dir, &["echo", "hi", "there", "--upper"]);
    assert_success(&out, "cmdflow echo");
    assert_eq!(stdout(&out), "HI THERE\n");
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn version_reads_nearest_manifest() {
    let dir = make_temp_dir("version");
    let nested = dir.join("src/bin");
    fs::create_dir_all(&nested).unwrap();
    fs::write(
        dir.join("Cargo.toml"),
        "[package]\nname = \"demo\"\nversion = \"3.1.4\"\n",
    )
    .unwrap();

    let out = run(&nested, &["-V"]);
    assert_success(&out, "cmdflow -V");
    assert_eq!(stdout(&out), "cmdflow 3.1.4\n");

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn manifest_command_uses_list_option() {
    let dir = make_temp_dir("manifest");
    fs::write(dir.join("package.json"), r#"{"version": "0.9.0"}"#).unwrap();

    let out = run(&dir, &["manifest", "--names", "package.json"]);
    assert_success(&out, "cmdflow manifest");
    let text = stdout(&out);
    assert!(text.ends_with("package.json\t0.9.0\n"), "unexpected output:\n{text}");

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn handler_errors_are_printed_once() {
    let dir = make_temp_dir("handler-error");
    let out = run(&dir, &["manifest", "does-not-exist"]);
    assert_eq!(out.status.code(), Some(1));
    let err = stderr(&out);
    assert!(
        err.starts_with("error: failed to resolve directory: does-not-exist"),
        "unexpected stderr:\n{err}"
    );
    assert_eq!(stdout(&out), "");
    let _ = fs::remove_dir_all(&dir);
}
