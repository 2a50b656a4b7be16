//! Shared test utilities and fixtures

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::sync::Arc;

use silently_core::{Executor, OrphanPolicy, OrphanSink};
use tempfile::TempDir;

/// Executor with its own sink on the current runtime.
pub fn executor(policy: OrphanPolicy) -> Executor {
    Executor::current(Arc::new(OrphanSink::new(policy))).expect("inside tokio runtime")
}

/// Write `content` as a config file inside a fresh temp dir.
pub fn config_file(content: &str) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("config.toml");
    std::fs::write(&path, content).expect("write config");
    (dir, path)
}

/// Run the `silently` binary against `config`, with no `RUST_LOG` leaking in.
pub fn run_binary(config: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_silently"))
        .args(args)
        .env("SILENTLY_CONFIG", config)
        .env_remove("RUST_LOG")
        .output()
        .expect("spawn silently binary")
}
