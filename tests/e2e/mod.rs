use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use deployer::config::ProjectConfig;

/// A test context that provides an isolated temporary directory.
/// Tests can run in parallel because each has its own temp directory.
pub struct TestContext {
    pub temp_dir: TempDir,
}

impl TestContext {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        Self { temp_dir }
    }

    /// Returns the path to the temporary directory
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Run deployer in this temp directory, with HOME pointed at it so no
    /// user-level config leaks in
    pub fn run_deployer(&self, args: &[&str]) -> CommandResult {
        let mut cmd = Command::cargo_bin("deployer").expect("Failed to find deployer binary");
        cmd.args(args);
        cmd.current_dir(self.path());
        cmd.env("HOME", self.path());
        cmd.env("NO_COLOR", "1");

        let output = cmd.output().expect("Failed to execute deployer command");

        CommandResult {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            status: output.status,
        }
    }

    /// Get full path to a file in the temp directory
    pub fn file_path(&self, path: impl AsRef<Path>) -> PathBuf {
        self.path().join(path)
    }

    /// Read file from temp directory
    pub fn read_file(&self, path: impl AsRef<Path>) -> String {
        let full_path = self.file_path(path);
        fs::read_to_string(&full_path)
            .unwrap_or_else(|_| panic!("Failed to read file: {}", full_path.display()))
    }

    /// Write file to temp directory (creates parent directories)
    pub fn write_file(&self, path: impl AsRef<Path>, content: &str) {
        let full_path = self.file_path(&path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)
                .unwrap_or_else(|_| panic!("Failed to create directory: {}", parent.display()));
        }
        fs::write(&full_path, content)
            .unwrap_or_else(|_| panic!("Failed to write file: {}", full_path.display()));
    }

    /// Assert file exists
    pub fn assert_file_exists(&self, path: impl AsRef<Path>) {
        let full_path = self.file_path(&path);
        assert!(
            full_path.exists(),
            "Expected file to exist: {}",
            full_path.display()
        );
    }

    /// Assert file contains pattern
    pub fn assert_file_contains(&self, path: impl AsRef<Path>, pattern: &str) {
        let content = self.read_file(path);
        assert!(
            content.contains(pattern),
            "Expected file to contain '{}', but it didn't.\n\nContent:\n{}",
            pattern,
            content
        );
    }

    /// Load deploy.toml and return the parsed ProjectConfig
    pub fn load_project_config(&self) -> ProjectConfig {
        let path = self.file_path("deploy.toml");
        ProjectConfig::load(&path).expect("Failed to load deploy.toml config")
    }
}

pub struct CommandResult {
    pub stdout: String,
    pub stderr: String,
    pub status: std::process::ExitStatus,
}

impl CommandResult {
    pub fn success(&self) -> bool {
        self.status.success()
    }
}

pub fn assert_success(result: &CommandResult) {
    assert!(
        result.success(),
        "Expected command to succeed but it failed.\n\nSTDOUT:\n{}\n\nSTDERR:\n{}",
        result.stdout,
        result.stderr
    );
}

pub fn assert_failure(result: &CommandResult) {
    assert!(
        !result.success(),
        "Expected command to fail but it succeeded.\n\nSTDOUT:\n{}\n\nSTDERR:\n{}",
        result.stdout,
        result.stderr
    );
}

pub fn assert_output_contains(result: &CommandResult, pattern: &str) {
    assert!(
        result.stdout.contains(pattern),
        "Expected stdout to contain '{}', but it didn't.\n\nSTDOUT:\n{}\n\nSTDERR:\n{}",
        pattern,
        result.stdout,
        result.stderr
    );
}

pub mod edge_cases;
pub mod happy_path;
pub mod smoke;
