//! Run configuration.
//!
//! Values are layered: built-in defaults, then an optional JSON file, then
//! `DEVFLOW_*` environment variables, then command-line flags.

use crate::errors::DevflowError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The implementation phases used when none are configured.
pub const DEFAULT_PHASES: [&str; 5] = [
    "Project Structure Setup",
    "Core Components Implementation",
    "Business Logic Development",
    "User Interface Development",
    "Integration and Data Handling",
];

/// Default cap on testing iterations.
pub const DEFAULT_MAX_TEST_ITERATIONS: u32 = 3;

/// Which language-model backend to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LlmProvider {
    /// Echo the prompt; no network access.
    #[default]
    Placeholder,
    /// An OpenAI-compatible chat-completions endpoint (requires the `http` feature).
    OpenAiCompatible,
}

/// Language-model settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Backend selection.
    #[serde(default)]
    pub provider: LlmProvider,
    /// Full chat-completions URL.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Model name sent with each request.
    #[serde(default = "default_model")]
    pub model: String,
    /// Name of the environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

fn default_endpoint() -> String {
    "https://api.openai.com/v1/chat/completions".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmProvider::default(),
            endpoint: default_endpoint(),
            model: default_model(),
            api_key_env: default_api_key_env(),
        }
    }
}

impl LlmConfig {
    /// Reads the API key from the configured environment variable.
    #[must_use]
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env).ok().filter(|k| !k.is_empty())
    }
}

/// Configuration for a devflow run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DevflowConfig {
    /// Directory all artifacts are written under.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Directory (relative to `output_dir`) for generated source files.
    #[serde(default = "default_source_dir")]
    pub source_dir: PathBuf,
    /// Directory (relative to `output_dir`) for generated test files.
    #[serde(default = "default_test_dir")]
    pub test_dir: PathBuf,
    /// File extension for generated source files.
    #[serde(default = "default_code_extension")]
    pub code_extension: String,
    /// Maximum number of testing iterations.
    #[serde(default = "default_max_test_iterations")]
    pub max_test_iterations: u32,
    /// Implementation phases, in order.
    #[serde(default = "default_phases")]
    pub phases: Vec<String>,
    /// Whether to offer commits and pushes.
    #[serde(default = "default_git_enabled")]
    pub git_enabled: bool,
    /// System prompt passed with every language-model call.
    #[serde(default)]
    pub system_prompt: Option<String>,
    /// Language-model settings.
    #[serde(default)]
    pub llm: LlmConfig,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_source_dir() -> PathBuf {
    PathBuf::from("src")
}

fn default_test_dir() -> PathBuf {
    PathBuf::from("tests")
}

fn default_code_extension() -> String {
    "py".to_string()
}

fn default_max_test_iterations() -> u32 {
    DEFAULT_MAX_TEST_ITERATIONS
}

fn default_phases() -> Vec<String> {
    DEFAULT_PHASES.iter().map(ToString::to_string).collect()
}

fn default_git_enabled() -> bool {
    true
}

impl Default for DevflowConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            source_dir: default_source_dir(),
            test_dir: default_test_dir(),
            code_extension: default_code_extension(),
            max_test_iterations: default_max_test_iterations(),
            phases: default_phases(),
            git_enabled: default_git_enabled(),
            system_prompt: None,
            llm: LlmConfig::default(),
        }
    }
}

impl DevflowConfig {
    /// Creates a configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a configuration from a JSON file. Missing fields take defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, DevflowError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| DevflowError::file(path, e))?;
        serde_json::from_str(&raw)
            .map_err(|e| DevflowError::Config(format!("{}: {e}", path.display())))
    }

    /// Applies `DEVFLOW_*` overrides from the process environment.
    pub fn apply_env(self) -> Result<Self, DevflowError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Applies overrides from an arbitrary key lookup.
    ///
    /// Recognised keys: `DEVFLOW_OUTPUT_DIR`, `DEVFLOW_MAX_TEST_ITERATIONS`,
    /// `DEVFLOW_GIT_ENABLED`.
    pub fn apply_overrides<F>(mut self, lookup: F) -> Result<Self, DevflowError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup("DEVFLOW_OUTPUT_DIR") {
            self.output_dir = PathBuf::from(dir);
        }
        if let Some(raw) = lookup("DEVFLOW_MAX_TEST_ITERATIONS") {
            self.max_test_iterations = raw.trim().parse().map_err(|_| {
                DevflowError::Config(format!("DEVFLOW_MAX_TEST_ITERATIONS is not a number: {raw}"))
            })?;
        }
        if let Some(raw) = lookup("DEVFLOW_GIT_ENABLED") {
            self.git_enabled = match raw.trim().to_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                other => {
                    return Err(DevflowError::Config(format!(
                        "DEVFLOW_GIT_ENABLED is not a boolean: {other}"
                    )))
                }
            };
        }
        Ok(self)
    }

    /// Sets the output directory.
    #[must_use]
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Sets the testing iteration cap.
    #[must_use]
    pub fn with_max_test_iterations(mut self, iterations: u32) -> Self {
        self.max_test_iterations = iterations;
        self
    }

    /// Replaces the implementation phases.
    #[must_use]
    pub fn with_phases(mut self, phases: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.phases = phases.into_iter().map(Into::into).collect();
        self
    }

    /// Enables or disables version control.
    #[must_use]
    pub fn with_git(mut self, enabled: bool) -> Self {
        self.git_enabled = enabled;
        self
    }

    /// Sets the system prompt.
    #[must_use]
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Checks the configuration for values the stages cannot work with.
    pub fn validate(&self) -> Result<(), DevflowError> {
        if self.max_test_iterations == 0 {
            return Err(DevflowError::Config(
                "max_test_iterations must be at least 1".to_string(),
            ));
        }
        if self.phases.is_empty() {
            return Err(DevflowError::Config(
                "at least one implementation phase is required".to_string(),
            ));
        }
        if self.phases.iter().any(|p| p.trim().is_empty()) {
            return Err(DevflowError::Config("phase names cannot be blank".to_string()));
        }
        if self.code_extension.trim().is_empty() {
            return Err(DevflowError::Config("code_extension cannot be blank".to_string()));
        }
        Ok(())
    }
}
