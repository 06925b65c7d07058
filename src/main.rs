use agent_lab::assistants::Persona;
use agent_lab::cli::{Args, Command};
use agent_lab::workflow;
use anyhow::{Context, Result};
use clap::Parser;

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "agent_lab=debug"
    } else {
        "agent_lab=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = args.global.into_config()?;
    init_tracing(config.verbose);

    match args.command {
        Command::Validate { idea, output } => {
            workflow::launch_validate(&config, &idea, output.as_deref()).await
        }
        Command::Scan {
            domain,
            mode,
            output,
        } => workflow::launch_scan(&config, &domain, mode, output.as_deref()).await,
        Command::DnsFacts { domain } => workflow::launch_dns_facts(&config, &domain).await,
        Command::Chat {
            dir,
            user,
            resume_session,
        } => workflow::launch_chat(&config, dir, user.as_deref(), resume_session).await,
        Command::Resumes {
            folder,
            job,
            job_file,
            requirements,
            output,
        } => {
            let job_description = match (job, job_file) {
                (Some(job), _) => job,
                (None, Some(path)) => std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read job description {:?}", path))?,
                (None, None) => anyhow::bail!("a job description is required (--job or --job-file)"),
            };
            workflow::launch_resumes(&config, &folder, &job_description, &requirements, &output)
                .await
        }
        Command::Finance { question, output } => {
            workflow::launch_assistant(&config, Persona::Finance, &question, output.as_deref())
                .await
        }
        Command::Pubmed { question, output } => {
            workflow::launch_assistant(&config, Persona::PubMed, &question, output.as_deref())
                .await
        }
        Command::Nutrition { request, output } => {
            workflow::launch_assistant(&config, Persona::Nutrition, &request, output.as_deref())
                .await
        }
        Command::Hn { request, output } => {
            workflow::launch_hn(&config, &request, output.as_deref()).await
        }
        Command::YtSummary { url, style, output } => {
            workflow::launch_video_summary(&config, &url, style, output.as_deref()).await
        }
    }
}
