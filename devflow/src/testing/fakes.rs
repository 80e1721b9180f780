//! Deterministic port fakes.

use crate::context::ComponentRecord;
use crate::errors::DevflowError;
use crate::ports::{
    CommandOutput, FileStore, Interaction, LanguageModel, ShellRunner, StagePorts, TestOracle,
    VersionControl,
};
use crate::utils::preview;
use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use std::collections::{BTreeMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Answers prompts from a queue and confirmations from substring rules.
///
/// A prompt with no queued answer fails like closed stdin does.
#[derive(Debug)]
pub struct ScriptedInteraction {
    answers: Mutex<VecDeque<String>>,
    confirm_rules: Vec<(String, bool)>,
    default_confirm: bool,
    prompts: Mutex<Vec<String>>,
    confirmations: Mutex<Vec<(String, bool)>>,
    displayed: Mutex<Vec<String>>,
}

impl Default for ScriptedInteraction {
    fn default() -> Self {
        Self {
            answers: Mutex::new(VecDeque::new()),
            confirm_rules: Vec::new(),
            default_confirm: true,
            prompts: Mutex::new(Vec::new()),
            confirmations: Mutex::new(Vec::new()),
            displayed: Mutex::new(Vec::new()),
        }
    }
}

impl ScriptedInteraction {
    /// Creates an interaction with no answers that approves everything.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues prompt answers, in order.
    #[must_use]
    pub fn with_answers(self, answers: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.answers.lock().extend(answers.into_iter().map(Into::into));
        self
    }

    /// Answers confirmations whose text contains `pattern`. First match wins.
    #[must_use]
    pub fn confirm_when(mut self, pattern: impl Into<String>, answer: bool) -> Self {
        self.confirm_rules.push((pattern.into(), answer));
        self
    }

    /// Sets the answer for confirmations no rule matches.
    #[must_use]
    pub fn with_default_confirm(mut self, answer: bool) -> Self {
        self.default_confirm = answer;
        self
    }

    /// Returns every prompt shown, in order.
    #[must_use]
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }

    /// Returns every confirmation shown with the answer given.
    #[must_use]
    pub fn confirmations(&self) -> Vec<(String, bool)> {
        self.confirmations.lock().clone()
    }

    /// Returns everything displayed.
    #[must_use]
    pub fn displayed(&self) -> Vec<String> {
        self.displayed.lock().clone()
    }
}

#[async_trait]
impl Interaction for ScriptedInteraction {
    async fn prompt(&self, text: &str) -> Result<String, DevflowError> {
        self.prompts.lock().push(text.to_string());
        self.answers
            .lock()
            .pop_front()
            .ok_or_else(|| DevflowError::Interaction("input closed".to_string()))
    }

    async fn confirm(&self, text: &str) -> Result<bool, DevflowError> {
        let answer = self
            .confirm_rules
            .iter()
            .find(|(pattern, _)| text.contains(pattern.as_str()))
            .map_or(self.default_confirm, |(_, answer)| *answer);
        self.confirmations.lock().push((text.to_string(), answer));
        Ok(answer)
    }

    fn display(&self, text: &str) {
        self.displayed.lock().push(text.to_string());
    }
}

/// Records prompts and answers with numbered, deterministic text.
#[derive(Debug, Default)]
pub struct RecordingModel {
    scripted: Mutex<VecDeque<String>>,
    prompts: Mutex<Vec<String>>,
    system_prompts: Mutex<Vec<Option<String>>>,
    failure: Option<String>,
}

impl RecordingModel {
    /// Creates a model that answers every prompt.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a model whose every call fails with `message`.
    #[must_use]
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::default()
        }
    }

    /// Queues exact responses used before falling back to generated text.
    #[must_use]
    pub fn with_responses(self, responses: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.scripted
            .lock()
            .extend(responses.into_iter().map(Into::into));
        self
    }

    /// Returns every prompt received, in order.
    #[must_use]
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }

    /// Returns the system prompt passed with each call.
    #[must_use]
    pub fn system_prompts(&self) -> Vec<Option<String>> {
        self.system_prompts.lock().clone()
    }

    /// Returns the number of calls made.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.prompts.lock().len()
    }
}

#[async_trait]
impl LanguageModel for RecordingModel {
    async fn complete(&self, prompt: &str, system_prompt: Option<&str>) -> Result<String, DevflowError> {
        let call = {
            let mut prompts = self.prompts.lock();
            prompts.push(prompt.to_string());
            prompts.len()
        };
        self.system_prompts
            .lock()
            .push(system_prompt.map(str::to_string));

        if let Some(message) = &self.failure {
            return Err(DevflowError::LanguageModel(message.clone()));
        }
        Ok(self
            .scripted
            .lock()
            .pop_front()
            .unwrap_or_else(|| format!("[response {call}] {}", preview(prompt.trim(), 40))))
    }

    fn name(&self) -> &str {
        "recording"
    }
}

/// Keeps written files in memory.
#[derive(Debug, Default)]
pub struct InMemoryFileStore {
    files: RwLock<BTreeMap<PathBuf, String>>,
    writes: Mutex<Vec<PathBuf>>,
}

impl InMemoryFileStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current content at `path`.
    #[must_use]
    pub fn get(&self, path: impl AsRef<Path>) -> Option<String> {
        self.files.read().get(path.as_ref()).cloned()
    }

    /// Returns every stored path, sorted.
    #[must_use]
    pub fn paths(&self) -> Vec<PathBuf> {
        self.files.read().keys().cloned().collect()
    }

    /// Returns every write in order, including overwrites.
    #[must_use]
    pub fn writes(&self) -> Vec<PathBuf> {
        self.writes.lock().clone()
    }

    /// Returns the number of stored files.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.read().len()
    }

    /// Returns true if nothing was written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.read().is_empty()
    }
}

#[async_trait]
impl FileStore for InMemoryFileStore {
    async fn write(&self, path: &Path, content: &str) -> Result<(), DevflowError> {
        self.files
            .write()
            .insert(path.to_path_buf(), content.to_string());
        self.writes.lock().push(path.to_path_buf());
        Ok(())
    }

    async fn read(&self, path: &Path) -> Result<String, DevflowError> {
        self.get(path).ok_or_else(|| {
            DevflowError::file(
                path,
                std::io::Error::new(std::io::ErrorKind::NotFound, "not in store"),
            )
        })
    }
}

/// Returns canned results for commands matched by prefix.
#[derive(Debug, Default)]
pub struct ScriptedShell {
    rules: Vec<(String, CommandOutput)>,
    commands: Mutex<Vec<String>>,
}

impl ScriptedShell {
    /// Creates a shell where every command succeeds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `output` for commands starting with `prefix`. First match wins.
    #[must_use]
    pub fn respond(mut self, prefix: impl Into<String>, output: CommandOutput) -> Self {
        self.rules.push((prefix.into(), output));
        self
    }

    /// Returns every command run, in order.
    #[must_use]
    pub fn commands(&self) -> Vec<String> {
        self.commands.lock().clone()
    }
}

#[async_trait]
impl ShellRunner for ScriptedShell {
    async fn run(&self, command: &str) -> CommandOutput {
        self.commands.lock().push(command.to_string());
        self.rules
            .iter()
            .find(|(prefix, _)| command.starts_with(prefix.as_str()))
            .map_or_else(|| CommandOutput::ok(""), |(_, output)| output.clone())
    }
}

#[derive(Debug, Clone, Copy)]
enum Verdict {
    Always(bool),
    PassFrom(u32),
}

/// Decides test verdicts by iteration.
#[derive(Debug)]
pub struct ScriptedOracle {
    verdict: Verdict,
    calls: Mutex<Vec<(String, u32)>>,
}

impl ScriptedOracle {
    /// Returns `passed` for every evaluation.
    #[must_use]
    pub fn always(passed: bool) -> Self {
        Self {
            verdict: Verdict::Always(passed),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Fails every iteration before `iteration`, passes from then on.
    #[must_use]
    pub fn failing_until(iteration: u32) -> Self {
        Self {
            verdict: Verdict::PassFrom(iteration),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Returns `(component, iteration)` for every evaluation.
    #[must_use]
    pub fn calls(&self) -> Vec<(String, u32)> {
        self.calls.lock().clone()
    }
}

impl Default for ScriptedOracle {
    fn default() -> Self {
        Self::always(true)
    }
}

#[async_trait]
impl TestOracle for ScriptedOracle {
    async fn evaluate(&self, component: &ComponentRecord, _test_code: &str, iteration: u32) -> bool {
        self.calls.lock().push((component.phase.clone(), iteration));
        match self.verdict {
            Verdict::Always(passed) => passed,
            Verdict::PassFrom(first) => iteration >= first,
        }
    }
}

/// Records commit messages instead of touching a repository.
#[derive(Debug)]
pub struct RecordingVersionControl {
    messages: Mutex<Vec<String>>,
    result: bool,
}

impl Default for RecordingVersionControl {
    fn default() -> Self {
        Self {
            messages: Mutex::new(Vec::new()),
            result: true,
        }
    }
}

impl RecordingVersionControl {
    /// Creates a recorder whose pushes succeed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the result every push reports.
    #[must_use]
    pub fn with_result(mut self, result: bool) -> Self {
        self.result = result;
        self
    }

    /// Returns every commit message, in order.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().clone()
    }
}

#[async_trait]
impl VersionControl for RecordingVersionControl {
    async fn commit_and_push(&self, message: &str) -> bool {
        self.messages.lock().push(message.to_string());
        self.result
    }
}

/// Handles to the fakes behind a [`fake_ports`] bundle.
#[derive(Debug, Clone)]
pub struct Fakes {
    /// The language model.
    pub model: Arc<RecordingModel>,
    /// The file store.
    pub files: Arc<InMemoryFileStore>,
    /// The version-control recorder.
    pub vcs: Arc<RecordingVersionControl>,
    /// The test oracle.
    pub oracle: Arc<ScriptedOracle>,
}

/// Builds ports around `interaction` with fresh fakes for everything else.
#[must_use]
pub fn fake_ports(interaction: Arc<ScriptedInteraction>) -> (StagePorts, Fakes) {
    let fakes = Fakes {
        model: Arc::new(RecordingModel::new()),
        files: Arc::new(InMemoryFileStore::new()),
        vcs: Arc::new(RecordingVersionControl::new()),
        oracle: Arc::new(ScriptedOracle::default()),
    };
    let ports = StagePorts::new(
        interaction,
        fakes.model.clone(),
        fakes.files.clone(),
        fakes.vcs.clone(),
    )
    .with_oracle(fakes.oracle.clone());
    (ports, fakes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_interaction_rules() {
        let io = ScriptedInteraction::new()
            .with_answers(["first"])
            .confirm_when("Push", false);

        assert_eq!(io.prompt("q1").await.unwrap(), "first");
        assert!(io.prompt("q2").await.is_err());
        assert!(!io.confirm("Push this phase?").await.unwrap());
        assert!(io.confirm("Approve?").await.unwrap());
        assert_eq!(io.prompts(), vec!["q1", "q2"]);
    }

    #[tokio::test]
    async fn test_recording_model_scripted_then_generated() {
        let model = RecordingModel::new().with_responses(["exact"]);

        assert_eq!(model.complete("one", None).await.unwrap(), "exact");
        let generated = model.complete("two", Some("sys")).await.unwrap();

        assert!(generated.starts_with("[response 2]"));
        assert_eq!(model.system_prompts(), vec![None, Some("sys".to_string())]);
    }

    #[tokio::test]
    async fn test_in_memory_store_overwrites() {
        let store = InMemoryFileStore::new();
        store.write(Path::new("a.md"), "1").await.unwrap();
        store.write(Path::new("a.md"), "2").await.unwrap();

        assert_eq!(store.get("a.md").as_deref(), Some("2"));
        assert_eq!(store.len(), 1);
        assert_eq!(store.writes().len(), 2);
        assert!(store.read(Path::new("missing.md")).await.is_err());
    }

    #[tokio::test]
    async fn test_scripted_shell_prefix_match() {
        let shell = ScriptedShell::new().respond("git status", CommandOutput::failed("no repo"));

        assert!(!shell.run("git status").await.success);
        assert!(shell.run("git push").await.success);
        assert_eq!(shell.commands().len(), 2);
    }
}
