//! End-to-end runs of the six-stage lifecycle against in-memory fakes.

use devflow::config::DevflowConfig;
use devflow::context::SharedContext;
use devflow::core::{ArtifactKind, Milestone, StageId};
use devflow::errors::DevflowError;
use devflow::events::CollectingEventSink;
use devflow::pipeline::{lifecycle_builder, Pipeline, LIFECYCLE_PIPELINE};
use devflow::ports::StagePorts;
use devflow::testing::{
    assert_artifacts_written, assert_milestone, assert_stage_order, fake_ports, Fakes,
    RecordingModel, ScriptedInteraction, ScriptedOracle,
};
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn todo_app_answers() -> ScriptedInteraction {
    ScriptedInteraction::new().with_answers([
        "build a to-do app",
        "",
        "",
        "Tasks need titles and due dates",
    ])
}

fn pipeline_with_sink(
    ports: &StagePorts,
    config: &DevflowConfig,
) -> (Pipeline, Arc<CollectingEventSink>) {
    let sink = Arc::new(CollectingEventSink::new());
    let pipeline = lifecycle_builder(ports, config)
        .unwrap()
        .with_event_sink(sink.clone())
        .build()
        .unwrap();
    (pipeline, sink)
}

async fn run_lifecycle(
    interaction: ScriptedInteraction,
    config: &DevflowConfig,
) -> (SharedContext, Fakes, Arc<CollectingEventSink>) {
    let (ports, fakes) = fake_ports(Arc::new(interaction));
    let (pipeline, sink) = pipeline_with_sink(&ports, config);
    let mut ctx = SharedContext::new();
    pipeline.run(&mut ctx).await.unwrap();
    (ctx, fakes, sink)
}

#[tokio::test]
async fn test_todo_app_runs_to_completion() {
    let config = DevflowConfig::default();
    let (ctx, fakes, sink) = run_lifecycle(todo_app_answers(), &config).await;

    assert_milestone(&ctx, Milestone::ProjectComplete);
    assert_stage_order(&sink, &StageId::ALL);
    assert_eq!(ctx.completed_stages(), StageId::ALL.to_vec());

    assert_artifacts_written(
        &fakes.files,
        &[
            "user_requirements.md",
            "plan_and_tasks.md",
            "src/phase_1_project_structure_setup.py",
            "src/phase_5_integration_and_data_handling.py",
            "tests/test_phase_1_project_structure_setup.py",
            "test_cases_report.md",
            "README.md",
            "CHANGELOG.md",
            "docs/ARCHITECTURE.md",
            "docs/INSTALLATION.md",
        ],
    );
    assert_eq!(fakes.files.len(), 17);
    assert_eq!(ctx.artifacts().len(), 17);

    let problem = ctx.problem().unwrap();
    assert_eq!(problem.initial_problem, "build a to-do app");
    assert_eq!(problem.context, "");
    assert_eq!(problem.preferred_tech, "");

    assert_eq!(ctx.implementation().unwrap().implemented_components.len(), 5);
    let testing = ctx.testing().unwrap();
    assert!(testing.all_tests_passed);
    assert_eq!(testing.iterations, 1);
    assert_eq!(testing.test_results.len(), 5);

    // 2 clarification + 3 planning + 5 phases + 5 tests + 2 documentation
    assert_eq!(fakes.model.call_count(), 17);
    // One push per approved phase plus the final documentation push.
    assert_eq!(fakes.vcs.messages().len(), 6);
    assert_eq!(
        fakes.vcs.messages().last().map(String::as_str),
        Some("Add comprehensive documentation and changelog")
    );
}

#[tokio::test]
async fn test_artifacts_match_written_content() {
    let (ctx, fakes, _) = run_lifecycle(todo_app_answers(), &DevflowConfig::default()).await;

    for artifact in ctx.artifacts() {
        let content = fakes.files.get(&artifact.path).unwrap();
        assert_eq!(artifact.bytes, content.len(), "{}", artifact.path.display());
        assert_eq!(
            artifact.sha256,
            devflow::core::content_digest(&content),
            "{}",
            artifact.path.display()
        );
    }

    let sources = ctx
        .artifacts()
        .iter()
        .filter(|a| a.kind == ArtifactKind::Source)
        .count();
    assert_eq!(sources, 5);
}

#[tokio::test]
async fn test_each_stage_sees_earlier_outputs() {
    let (ctx, fakes, _) = run_lifecycle(todo_app_answers(), &DevflowConfig::default()).await;
    let prompts = fakes.model.prompts();

    let clarification = ctx.clarification().unwrap();
    let planning = ctx.planning().unwrap();

    // Planning's first call carries the requirements from clarification.
    assert!(prompts[2].contains(&clarification.requirements_document));
    // Every phase prompt carries the architecture and plan.
    for prompt in &prompts[5..10] {
        assert!(prompt.contains(&planning.solution_architecture));
        assert!(prompt.contains(&planning.implementation_plan));
    }
    assert_eq!(
        ctx.documentation().unwrap().docs_structure[2].content,
        planning.solution_architecture
    );
}

#[tokio::test]
async fn test_all_phases_rejected() {
    let interaction = todo_app_answers().with_default_confirm(false);
    let (ctx, fakes, sink) = run_lifecycle(interaction, &DevflowConfig::default()).await;

    assert_milestone(&ctx, Milestone::ProjectComplete);
    assert_stage_order(&sink, &StageId::ALL);

    let implementation = ctx.implementation().unwrap();
    assert!(implementation.implemented_components.is_empty());
    assert_eq!(implementation.implementation_log.len(), 5);

    let testing = ctx.testing().unwrap();
    assert_eq!(testing.iterations, 1);
    assert!(testing.all_tests_passed);
    assert!(testing.test_results.is_empty());
    assert!(testing.test_report.contains("- Components Tested: 0"));

    assert!(fakes.vcs.messages().is_empty());
    assert!(fakes.files.get("src/phase_1_project_structure_setup.py").is_none());
}

#[tokio::test]
async fn test_zero_iteration_cap_still_tests_once() {
    let interaction = todo_app_answers().with_default_confirm(false);
    let config = DevflowConfig::default().with_max_test_iterations(0);
    let (ctx, _, _) = run_lifecycle(interaction, &config).await;

    let testing = ctx.testing().unwrap();
    assert_eq!(testing.iterations, 1);
    assert!(testing.all_tests_passed);
    assert_milestone(&ctx, Milestone::ProjectComplete);
}

#[tokio::test]
async fn test_testing_loop_is_bounded() {
    let interaction = Arc::new(todo_app_answers());
    let oracle = Arc::new(ScriptedOracle::always(false));
    let (ports, fakes) = fake_ports(interaction);
    let ports = ports.with_oracle(oracle.clone());
    let config = DevflowConfig::default()
        .with_phases(["Setup", "Core"])
        .with_max_test_iterations(3);
    let (pipeline, _) = pipeline_with_sink(&ports, &config);
    let mut ctx = SharedContext::new();

    let summary = pipeline.run(&mut ctx).await.unwrap();

    assert_eq!(summary.pipeline, LIFECYCLE_PIPELINE);
    assert_eq!(summary.final_milestone, Milestone::ProjectComplete);
    let testing = ctx.testing().unwrap();
    assert_eq!(testing.iterations, 3);
    assert!(!testing.all_tests_passed);
    assert_eq!(testing.test_results.len(), 6);
    assert_eq!(oracle.calls().len(), 6);
    assert!(testing.test_report.contains("- All Tests Passed: false"));
    // Rewritten test files are recorded once each.
    assert_eq!(fakes.files.writes().iter().filter(|p| p.starts_with("tests")).count(), 6);
    assert_eq!(
        ctx.artifacts()
            .iter()
            .filter(|a| a.kind == ArtifactKind::Test)
            .count(),
        2
    );
}

#[tokio::test]
async fn test_git_disabled_skips_push_questions() {
    let interaction = Arc::new(todo_app_answers());
    let (ports, fakes) = fake_ports(interaction.clone());
    let config = DevflowConfig::default().with_git(false);
    let (pipeline, _) = pipeline_with_sink(&ports, &config);

    pipeline.run(&mut SharedContext::new()).await.unwrap();

    assert!(fakes.vcs.messages().is_empty());
    assert!(interaction
        .confirmations()
        .iter()
        .all(|(text, _)| text.starts_with("Approve")));
}

#[tokio::test]
async fn test_system_prompt_reaches_every_call() {
    let (ctx, fakes, _) = run_lifecycle(
        todo_app_answers(),
        &DevflowConfig::default().with_system_prompt("You are terse."),
    )
    .await;

    assert_milestone(&ctx, Milestone::ProjectComplete);
    assert!(fakes
        .model
        .system_prompts()
        .iter()
        .all(|s| s.as_deref() == Some("You are terse.")));
}

#[tokio::test]
async fn test_model_failure_stops_at_last_milestone() {
    let interaction = Arc::new(todo_app_answers());
    let (ports, fakes) = fake_ports(interaction);
    let ports = StagePorts::new(
        ports.interaction.clone(),
        Arc::new(RecordingModel::failing("rate limited")),
        ports.files.clone(),
        ports.vcs.clone(),
    );
    let (pipeline, sink) = pipeline_with_sink(&ports, &DevflowConfig::default());
    let mut ctx = SharedContext::new();

    let err = pipeline.run(&mut ctx).await.unwrap_err();

    assert!(matches!(err, DevflowError::LanguageModel(_)));
    assert_milestone(&ctx, Milestone::ProblemAcquired);
    assert_stage_order(&sink, &[StageId::ProblemAcquisition]);
    assert!(fakes.files.is_empty());
}

#[tokio::test]
async fn test_snapshot_serializes_outputs() {
    let (ctx, _, _) = run_lifecycle(todo_app_answers(), &DevflowConfig::default()).await;

    let snapshot = ctx.snapshot().unwrap();

    assert_eq!(snapshot["current_stage"], "project_complete");
    assert_eq!(snapshot["problem_data"]["initial_problem"], "build a to-do app");
    assert_eq!(snapshot["testing_data"]["all_tests_passed"], true);
    assert!(snapshot["identity"]["project_id"]
        .as_str()
        .unwrap()
        .starts_with("project_"));
}
