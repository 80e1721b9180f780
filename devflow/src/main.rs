use anyhow::Context;
use clap::{Parser, ValueEnum};
use devflow::cancellation::CancellationToken;
use devflow::config::{DevflowConfig, LlmProvider};
use devflow::context::SharedContext;
use devflow::observability::{init_tracing, LogFormat};
use devflow::pipeline::default_pipeline;
use devflow::ports::{
    ConsoleInteraction, DisabledVersionControl, GitVersionControl, LanguageModel, LocalFileStore,
    PlaceholderModel, StagePorts, SystemShell, VersionControl,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, Level};

#[derive(Parser)]
#[command(
    name = "devflow",
    about = "Walk a problem through clarification, planning, implementation, testing and documentation",
    version
)]
struct Cli {
    /// JSON configuration file
    #[arg(long, short = 'c', env = "DEVFLOW_CONFIG")]
    config: Option<PathBuf>,

    /// Directory all artifacts are written under
    #[arg(long, short = 'o')]
    output_dir: Option<PathBuf>,

    /// Maximum number of testing iterations
    #[arg(long)]
    max_test_iterations: Option<u32>,

    /// Never offer to commit or push
    #[arg(long)]
    no_git: bool,

    /// System prompt passed with every language-model call
    #[arg(long)]
    system_prompt: Option<String>,

    /// Language-model backend
    #[arg(long, value_enum)]
    provider: Option<ProviderArg>,

    /// Chat-completions endpoint for the openai-compatible provider
    #[arg(long)]
    endpoint: Option<String>,

    /// Model name for the openai-compatible provider
    #[arg(long)]
    model: Option<String>,

    /// Write the final shared context as JSON to this file
    #[arg(long)]
    dump_context: Option<PathBuf>,

    /// Log at debug level
    #[arg(long, short = 'v')]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum ProviderArg {
    Placeholder,
    OpenaiCompatible,
}

impl From<ProviderArg> for LlmProvider {
    fn from(arg: ProviderArg) -> Self {
        match arg {
            ProviderArg::Placeholder => Self::Placeholder,
            ProviderArg::OpenaiCompatible => Self::OpenAiCompatible,
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let format = if cli.log_json { LogFormat::Json } else { LogFormat::Text };
    if let Err(e) = init_tracing(format, level) {
        eprintln!("warning: {e}");
    }

    if let Err(e) = run(cli).await {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(&cli)?;
    let ports = build_ports(&config)?;
    let pipeline = default_pipeline(&ports, &config)?;

    let token = Arc::new(CancellationToken::new());
    {
        let token = Arc::clone(&token);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                token.cancel("interrupted by user");
            }
        });
    }

    println!("Initializing development lifecycle");
    println!("{}", "-".repeat(50));

    let mut ctx = SharedContext::new();
    let result = pipeline.run_with_cancellation(&mut ctx, &token).await;

    if let Some(path) = &cli.dump_context {
        let snapshot = serde_json::to_string_pretty(&ctx.snapshot()?)?;
        std::fs::write(path, snapshot)
            .with_context(|| format!("writing context to {}", path.display()))?;
    }

    match result {
        Ok(summary) => {
            println!("\nDevelopment flow completed successfully!");
            println!("Project ID: {}", summary.project_id);
            println!("Final Stage: {}", summary.final_milestone);
            println!("Artifacts written: {}", summary.artifacts.len());
            Ok(())
        }
        Err(err) => {
            let milestone = ctx.current_stage();
            if err.is_cancelled() {
                println!("\nFlow interrupted by user");
            }
            error!(%milestone, error = %err, "Development flow stopped");
            println!("Current stage: {milestone}");
            Err(err).with_context(|| format!("development flow stopped at {milestone}"))
        }
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<DevflowConfig> {
    let base = match &cli.config {
        Some(path) => DevflowConfig::from_file(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => DevflowConfig::default(),
    };
    let mut config = base.apply_env()?;

    if let Some(dir) = &cli.output_dir {
        config.output_dir.clone_from(dir);
    }
    if let Some(iterations) = cli.max_test_iterations {
        config.max_test_iterations = iterations;
    }
    if cli.no_git {
        config.git_enabled = false;
    }
    if let Some(prompt) = &cli.system_prompt {
        config.system_prompt = Some(prompt.clone());
    }
    if let Some(provider) = cli.provider {
        config.llm.provider = provider.into();
    }
    if let Some(endpoint) = &cli.endpoint {
        config.llm.endpoint.clone_from(endpoint);
    }
    if let Some(model) = &cli.model {
        config.llm.model.clone_from(model);
    }

    config.validate()?;
    Ok(config)
}

fn build_ports(config: &DevflowConfig) -> anyhow::Result<StagePorts> {
    let model: Arc<dyn LanguageModel> = match config.llm.provider {
        LlmProvider::Placeholder => Arc::new(PlaceholderModel),
        LlmProvider::OpenAiCompatible => remote_model(config)?,
    };

    let vcs: Arc<dyn VersionControl> = if config.git_enabled {
        Arc::new(GitVersionControl::new(Arc::new(SystemShell::in_dir(
            &config.output_dir,
        ))))
    } else {
        Arc::new(DisabledVersionControl)
    };

    Ok(StagePorts::new(
        Arc::new(ConsoleInteraction::new()),
        model,
        Arc::new(LocalFileStore::new(&config.output_dir)),
        vcs,
    ))
}

#[cfg(feature = "http")]
fn remote_model(config: &DevflowConfig) -> anyhow::Result<Arc<dyn LanguageModel>> {
    Ok(Arc::new(devflow::ports::OpenAiCompatibleModel::new(
        &config.llm.endpoint,
        &config.llm.model,
        config.llm.api_key(),
    )))
}

#[cfg(not(feature = "http"))]
fn remote_model(_config: &DevflowConfig) -> anyhow::Result<Arc<dyn LanguageModel>> {
    anyhow::bail!("the openai-compatible provider requires building with `--features http`")
}
