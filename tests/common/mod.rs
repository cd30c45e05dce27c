//! Shared integration-test harness for running the `phaser` binary against
//! a throwaway working directory.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

/// A temporary directory holding `phaser.yaml` and `phaser.state.json`.
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    /// Creates an empty workspace.
    #[allow(clippy::missing_panics_doc)]
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("failed to create temp dir"),
        }
    }

    /// Creates a workspace declaring a single resource.
    pub fn with_resource(name: &str, phases: &[&str]) -> Self {
        let ws = Self::new();
        ws.declare(&[(name, phases)]);
        ws
    }

    /// Rewrites the manifest with the given resources.
    #[allow(clippy::missing_panics_doc)]
    pub fn declare(&self, resources: &[(&str, &[&str])]) {
        let mut yaml = String::from("resources:\n");
        for (name, phases) in resources {
            yaml.push_str(&format!("  {name}:\n    phases: [{}]\n", phases.join(", ")));
        }
        self.write_manifest(&yaml);
    }

    /// Writes raw manifest text.
    #[allow(clippy::missing_panics_doc)]
    pub fn write_manifest(&self, yaml: &str) {
        std::fs::write(self.manifest_path(), yaml).expect("failed to write manifest");
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.dir.path().join("phaser.yaml")
    }

    pub fn state_path(&self) -> PathBuf {
        self.dir.path().join("phaser.state.json")
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Runs `phaser` with `args` inside the workspace.
    #[allow(clippy::missing_panics_doc)]
    pub fn run(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_phaser"))
            .args(args)
            .arg("--quiet")
            .current_dir(self.dir.path())
            .env_remove("PHASER_CONFIG")
            .env_remove("PHASER_STATE")
            .env_remove("PHASER_EVENTS")
            .env_remove("PHASER_LOG_LEVEL")
            .output()
            .expect("failed to spawn phaser")
    }

    /// Runs `phaser apply` and returns the stored phase of `name`.
    #[allow(clippy::missing_panics_doc)]
    pub fn apply_and_read(&self, name: &str) -> String {
        let output = self.run(&["apply"]);
        assert!(
            output.status.success(),
            "apply failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        self.stored_phase(name).expect("resource missing from state")
    }

    /// Reads the stored phase for `name` straight from the state file.
    #[allow(clippy::missing_panics_doc)]
    pub fn stored_phase(&self, name: &str) -> Option<String> {
        let raw = std::fs::read_to_string(self.state_path()).ok()?;
        let state: serde_json::Value = serde_json::from_str(&raw).expect("state is not JSON");
        state["resources"][name]["phase"]
            .as_str()
            .map(ToString::to_string)
    }
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}
