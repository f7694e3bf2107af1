//! Integration tests for vcpkg-cache

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    const PRIMARY: &str = "runnerOS=ubuntu22-vcpkgGitCommit=abc123";

    fn vcpkg_cache() -> Command {
        let mut cmd = cargo_bin_cmd!("vcpkg-cache");
        for var in [
            "ImageVersion",
            "GITHUB_WORKSPACE",
            "VCPKG_CACHE_CONFIG",
            "VCPKG_GIT_COMMIT_ID",
            "RUST_LOG",
        ] {
            cmd.env_remove(var);
        }
        cmd.env("ImageOS", "ubuntu22");
        cmd
    }

    /// Workspace with vcpkg as a submodule at abc123 and a local store
    fn workspace() -> TempDir {
        let dir = TempDir::new().unwrap();
        let root = dir.path();

        let modules = root.join(".git/modules/vcpkg");
        fs::create_dir_all(&modules).unwrap();
        fs::write(modules.join("HEAD"), "abc123\n").unwrap();

        fs::create_dir_all(root.join("vcpkg")).unwrap();
        fs::write(root.join("vcpkg/.git"), "gitdir: ../.git/modules/vcpkg\n").unwrap();
        fs::write(root.join("vcpkg/vcpkg"), b"tool").unwrap();

        let store = root.join("store");
        fs::write(
            root.join("vcpkg-cache.toml"),
            format!("[cache]\nstore_dir = {:?}\n", store.display().to_string()),
        )
        .unwrap();

        dir
    }

    fn in_workspace(root: &Path) -> Command {
        let mut cmd = vcpkg_cache();
        cmd.arg("--workspace").arg(root);
        cmd
    }

    #[test]
    fn help_displays() {
        vcpkg_cache()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("cache vcpkg in CI"));
    }

    #[test]
    fn version_displays() {
        vcpkg_cache()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("vcpkg-cache"));
    }

    #[test]
    fn key_uses_submodule_commit() {
        let ws = workspace();
        in_workspace(ws.path())
            .args(["key", "--format", "plain", "--commit-id", "zzz"])
            .assert()
            .success()
            .stdout(predicate::eq(format!("{PRIMARY}\n")));
    }

    #[test]
    fn key_uses_override_without_git() {
        let ws = TempDir::new().unwrap();
        fs::create_dir_all(ws.path().join("vcpkg")).unwrap();

        in_workspace(ws.path())
            .args(["key", "--format", "plain", "--commit-id", "deadbeef"])
            .assert()
            .success()
            .stdout(predicate::eq(
                "runnerOS=ubuntu22-vcpkgGitCommit=deadbeef\n",
            ));
    }

    #[test]
    fn identity_reports_submodule() {
        let ws = workspace();
        in_workspace(ws.path())
            .args(["identity", "--format", "json"])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"is_submodule\": true"))
            .stdout(predicate::str::contains("abc123"));
    }

    #[test]
    fn save_restore_and_skip() {
        let ws = workspace();

        in_workspace(ws.path())
            .args(["save", "--format", "plain"])
            .assert()
            .success()
            .stdout(predicate::eq("saved\n"));

        in_workspace(ws.path())
            .args(["save", "--format", "plain"])
            .assert()
            .success()
            .stdout(predicate::str::starts_with("conflict"));

        fs::remove_file(ws.path().join("vcpkg/vcpkg")).unwrap();

        in_workspace(ws.path())
            .args(["restore", "--format", "plain"])
            .assert()
            .success()
            .stdout(predicate::eq(format!("{PRIMARY}\n")));
        assert_eq!(fs::read(ws.path().join("vcpkg/vcpkg")).unwrap(), b"tool");

        in_workspace(ws.path())
            .args(["save", "--format", "plain", "--hit-key", PRIMARY])
            .assert()
            .success()
            .stdout(predicate::str::starts_with("skipped"));
    }

    #[test]
    fn save_with_missing_paths_fails() {
        let ws = workspace();
        in_workspace(ws.path())
            .args(["save", "--path", "does/not/exist"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Cache save request rejected"));
    }

    #[test]
    fn disabled_cache_skips_save() {
        let ws = workspace();
        fs::write(ws.path().join("vcpkg-cache.toml"), "[cache]\nenabled = false\n").unwrap();

        in_workspace(ws.path())
            .args(["save", "--format", "plain"])
            .assert()
            .success()
            .stdout(predicate::eq("skipped (caching disabled)\n"));
    }

    #[test]
    fn run_saves_on_miss_then_skips_on_exact_hit() {
        let ws = workspace();

        in_workspace(ws.path())
            .args(["run", "--format", "plain"])
            .assert()
            .success()
            .stdout(predicate::eq("saved\n"));

        in_workspace(ws.path())
            .args(["run", "--format", "plain"])
            .assert()
            .success()
            .stdout(predicate::eq(format!("skipped (exact hit on {PRIMARY})\n")));
    }

    #[test]
    fn run_json_is_a_single_object() {
        let ws = workspace();
        fs::write(ws.path().join("vcpkg.json"), "{}").unwrap();

        let output = in_workspace(ws.path())
            .args(["run", "--format", "json"])
            .output()
            .unwrap();
        assert!(output.status.success());

        let first: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(first["primary"], PRIMARY);
        assert!(first["hit_key"].is_null());
        assert_eq!(first["bootstrapped"], false);
        assert_eq!(first["outcome"], "saved");
        assert!(first["manifest"]
            .as_str()
            .unwrap()
            .ends_with("vcpkg.json"));

        let output = in_workspace(ws.path())
            .args(["run", "--format", "json"])
            .output()
            .unwrap();
        assert!(output.status.success());

        let second: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(second["hit_key"], PRIMARY);
        assert!(second["outcome"].as_str().unwrap().starts_with("skipped"));
    }

    #[test]
    fn run_table_lists_each_step() {
        let ws = workspace();
        in_workspace(ws.path())
            .arg("run")
            .assert()
            .success()
            .stdout(predicate::str::contains("Manifest:"))
            .stdout(predicate::str::contains("Bootstrap:"))
            .stdout(predicate::str::contains(PRIMARY));
    }

    #[test]
    fn config_path() {
        let ws = workspace();
        in_workspace(ws.path())
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("vcpkg-cache.toml"));
    }

    #[test]
    fn config_show() {
        let ws = workspace();
        in_workspace(ws.path())
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[vcpkg]"));
    }
}
