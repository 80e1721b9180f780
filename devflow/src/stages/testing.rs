//! Testing: a bounded loop that regenerates tests until they all pass.

use super::{prompts, write_artifact, Stage};
use crate::config::DEFAULT_MAX_TEST_ITERATIONS;
use crate::context::{ComponentRecord, SharedContext, StageRecord, TestResultRecord, TestingData};
use crate::core::{ArtifactKind, ArtifactRecord, StageId, Transition};
use crate::errors::DevflowError;
use crate::ports::StagePorts;
use async_trait::async_trait;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// File the test report is written to.
pub const REPORT_FILE: &str = "test_cases_report.md";

/// What testing reads from the context.
#[derive(Debug, Clone)]
pub struct TestingInput {
    /// Approved components from implementation.
    pub components: Vec<ComponentRecord>,
    /// The solution architecture.
    pub architecture: String,
}

/// Testing results plus the test files written along the way.
#[derive(Debug, Clone)]
pub struct TestingOutput {
    /// Results, pass state and rendered report.
    pub data: TestingData,
    /// One record per test file, latest write only.
    pub artifacts: Vec<ArtifactRecord>,
}

/// Generates and evaluates tests for every component.
///
/// Each iteration re-tests all components. The loop stops when one
/// iteration passes completely or the iteration cap is reached.
#[derive(Debug, Clone)]
pub struct TestingStage {
    ports: StagePorts,
    max_iterations: u32,
    test_dir: PathBuf,
    system_prompt: Option<String>,
}

impl TestingStage {
    /// Creates the stage with the default iteration cap.
    #[must_use]
    pub fn new(ports: StagePorts) -> Self {
        Self {
            ports,
            max_iterations: DEFAULT_MAX_TEST_ITERATIONS,
            test_dir: PathBuf::from("tests"),
            system_prompt: None,
        }
    }

    /// Sets the iteration cap. At least one iteration always runs.
    #[must_use]
    pub fn with_max_iterations(mut self, max: u32) -> Self {
        self.max_iterations = max.max(1);
        self
    }

    /// Sets the directory test files are written to.
    #[must_use]
    pub fn with_test_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.test_dir = dir.into();
        self
    }

    /// Sets the system prompt passed with every model call.
    #[must_use]
    pub fn with_system_prompt(mut self, prompt: Option<String>) -> Self {
        self.system_prompt = prompt;
        self
    }

    async fn test_component(
        &self,
        component: &ComponentRecord,
        iteration: u32,
    ) -> Result<(TestResultRecord, ArtifactRecord), DevflowError> {
        info!(component = %component.phase, iteration, "Testing component");
        let test_code = self
            .ports
            .model
            .complete(&prompts::component_tests(component), self.system_prompt.as_deref())
            .await?;
        let passed = self.ports.oracle.evaluate(component, &test_code, iteration).await;

        let path = self.test_dir.join(format!("test_{}", component.filename));
        let artifact =
            write_artifact(self.ports.files.as_ref(), &path, ArtifactKind::Test, &test_code).await?;

        let result = TestResultRecord {
            component: component.phase.clone(),
            test_code,
            passed,
            iteration,
        };
        Ok((result, artifact))
    }
}

fn upsert_artifact(artifacts: &mut Vec<ArtifactRecord>, record: ArtifactRecord) {
    match artifacts.iter_mut().find(|a| a.path == record.path) {
        Some(existing) => *existing = record,
        None => artifacts.push(record),
    }
}

#[async_trait]
impl Stage for TestingStage {
    type Input = TestingInput;
    type Output = TestingOutput;

    fn id(&self) -> StageId {
        StageId::Testing
    }

    fn prepare(&self, ctx: &SharedContext) -> Result<Self::Input, DevflowError> {
        Ok(TestingInput {
            components: ctx.implementation()?.implemented_components.clone(),
            architecture: ctx.planning()?.solution_architecture.clone(),
        })
    }

    async fn execute(&self, input: &Self::Input) -> Result<Self::Output, DevflowError> {
        self.ports.interaction.display("Creating and running tests...");

        let mut results = Vec::new();
        let mut artifacts = Vec::new();
        let mut all_passed = false;
        let mut iteration = 0;

        while !all_passed && iteration < self.max_iterations {
            iteration += 1;
            info!(iteration, "Testing iteration");

            let mut current = Vec::with_capacity(input.components.len());
            for component in &input.components {
                let (result, artifact) = self.test_component(component, iteration).await?;
                upsert_artifact(&mut artifacts, artifact);
                current.push(result);
            }

            // An empty component list passes vacuously.
            all_passed = current.iter().all(|r| r.passed);
            results.extend(current);

            if all_passed {
                info!(iteration, "All tests passed");
            } else {
                warn!(iteration, "Some tests failed");
            }
        }

        let report = render_test_report(iteration, all_passed, input.components.len(), &results);
        Ok(TestingOutput {
            data: TestingData {
                test_results: results,
                all_tests_passed: all_passed,
                iterations: iteration,
                test_report: report,
                testing_complete: true,
            },
            artifacts,
        })
    }

    async fn finalize(
        &self,
        ctx: &mut SharedContext,
        _input: Self::Input,
        output: Self::Output,
    ) -> Result<Transition, DevflowError> {
        let report = write_artifact(
            self.ports.files.as_ref(),
            Path::new(REPORT_FILE),
            ArtifactKind::Report,
            &output.data.test_report,
        )
        .await?;

        let all_passed = output.data.all_tests_passed;
        ctx.add_artifacts(output.artifacts);
        ctx.add_artifacts([report]);
        ctx.record(StageRecord::Testing(output.data))?;
        info!(all_passed, "Testing completed");
        Ok(self.id().lifecycle_transition())
    }
}

/// Renders `test_cases_report.md`.
#[must_use]
pub fn render_test_report(
    iterations: u32,
    all_passed: bool,
    components_tested: usize,
    results: &[TestResultRecord],
) -> String {
    let mut report = format!(
        "# Test Results Report

## Testing Summary
- Total Iterations: {iterations}
- All Tests Passed: {all_passed}
- Components Tested: {components_tested}

## Test Results by Component
"
    );

    for result in results {
        let status = if result.passed { "✅ PASSED" } else { "❌ FAILED" };
        let _ = write!(
            report,
            "\n### {} - {status}\nIteration: {}\n",
            result.component, result.iteration
        );
    }
    report
}
