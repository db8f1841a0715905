//! Evaluation CLI for checking candidate ranking quality.
//!
//! Usage:
//!     eval rank --job job.json --candidates candidates.json --tier excellent --limit 10
//!     eval explain --job job.json --candidates candidates.json --candidate cand-42
//!     eval health --similarity-url http://127.0.0.1:8080

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;
use serde::Serialize;
use talentmatch_explain::{explain_result, summarize_match};
use talentmatch_model::{CandidateProfile, JobRequirement, MatchResult, Ranking, RankingSummary};
use talentmatch_query::{parse_tier, ResultQuery, SortKey};
use talentmatch_rank::{RankConfig, Ranker};
use talentmatch_similarity::{
    EmbeddingBackend, EmbeddingConfig, SimilarityBackend, TokenOverlapBackend,
};

#[derive(Parser)]
#[command(name = "eval")]
#[command(about = "Evaluate candidate ranking quality")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct Inputs {
    /// Path to the job requirement JSON
    #[arg(long)]
    job: PathBuf,

    /// Path to a JSON array of candidate profiles
    #[arg(long)]
    candidates: PathBuf,

    /// Path to a ranking config JSON (partial configs are filled with defaults)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Embedding service URL; token overlap is used when absent
    #[arg(long)]
    similarity_url: Option<String>,

    /// Maximum concurrent semantic scoring calls
    #[arg(long)]
    concurrency: Option<usize>,

    /// Per-candidate semantic scoring timeout in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank candidates for a job
    Rank {
        #[command(flatten)]
        inputs: Inputs,

        /// Only show these tiers (repeatable)
        #[arg(long = "tier")]
        tiers: Vec<String>,

        /// Only show shortlisted applications
        #[arg(long)]
        shortlisted: bool,

        /// Sort key (rank, overall, semantic, skill, experience, education)
        #[arg(long, default_value = "rank")]
        sort: String,

        /// Maximum results shown
        #[arg(short, long)]
        limit: Option<usize>,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Explain one candidate's score
    Explain {
        #[command(flatten)]
        inputs: Inputs,

        /// Candidate id to explain
        #[arg(long)]
        candidate: String,
    },

    /// Check similarity backend health
    Health {
        /// Embedding service URL
        #[arg(long)]
        similarity_url: String,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RankOutput<'a> {
    job_id: &'a str,
    summary: &'a RankingSummary,
    results: &'a [MatchResult],
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("talentmatch_rank=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Rank {
            inputs,
            tiers,
            shortlisted,
            sort,
            limit,
            format,
        } => {
            let mut query = ResultQuery::new().with_tiers(
                tiers
                    .iter()
                    .map(|t| parse_tier(t))
                    .collect::<Result<Vec<_>, _>>()?,
            );
            if shortlisted {
                query = query.shortlisted_only();
            }
            query = query.sorted_by(sort.parse::<SortKey>()?, None);
            query.limit = limit;

            let (job, ranking) = rank_inputs(&inputs).await?;
            print_ranking(&job, &ranking, &query, &format)?;
        }
        Commands::Explain { inputs, candidate } => {
            let (_, ranking) = rank_inputs(&inputs).await?;
            let max_insights = load_config(&inputs)?.scoring.max_insights;
            print_explanation(&ranking, &candidate, max_insights)?;
        }
        Commands::Health { similarity_url } => {
            let backend = EmbeddingBackend::new(EmbeddingConfig {
                base_url: similarity_url,
                ..Default::default()
            })?;
            run_health(&backend).await?;
        }
    }

    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Config file first, then command-line overrides.
fn load_config(inputs: &Inputs) -> Result<RankConfig> {
    let mut config = match &inputs.config {
        Some(path) => read_json::<RankConfig>(path)?,
        None => RankConfig::default(),
    };

    if let Some(concurrency) = inputs.concurrency {
        config.max_concurrency = concurrency;
    }
    if let Some(timeout_ms) = inputs.timeout_ms {
        config.semantic_timeout_ms = timeout_ms;
    }

    config.scoring.weights.validate()?;
    Ok(config)
}

async fn rank_inputs(inputs: &Inputs) -> Result<(JobRequirement, Ranking)> {
    let job: JobRequirement = read_json(&inputs.job)?;
    let candidates: Vec<CandidateProfile> = read_json(&inputs.candidates)?;
    let config = load_config(inputs)?;

    let ranking = match &inputs.similarity_url {
        Some(url) => {
            let backend = EmbeddingBackend::new(EmbeddingConfig {
                base_url: url.clone(),
                ..Default::default()
            })?;
            rank_with(backend, config, &job, &candidates).await?
        }
        None => rank_with(TokenOverlapBackend, config, &job, &candidates).await?,
    };

    Ok((job, ranking))
}

async fn rank_with<B>(
    backend: B,
    config: RankConfig,
    job: &JobRequirement,
    candidates: &[CandidateProfile],
) -> Result<Ranking>
where
    B: SimilarityBackend + Send + Sync + 'static,
{
    tracing::debug!(backend = backend.name(), "Using similarity backend");
    let ranker = Ranker::new(backend, config);
    Ok(ranker.rank_all(job, candidates).await?)
}

fn print_ranking(
    job: &JobRequirement,
    ranking: &Ranking,
    query: &ResultQuery,
    format: &str,
) -> Result<()> {
    let shown = query.apply(&ranking.results)?;

    if format == "json" {
        let output = RankOutput {
            job_id: &job.job_id,
            summary: &ranking.summary,
            results: &shown,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("Ranking for job: {}", job.job_id);
    println!("---");

    for result in &shown {
        let breakdown = result.breakdown();
        let shortlisted = if result.is_shortlisted { " [shortlisted]" } else { "" };
        println!(
            "\n{}. {} (Application: {}){}",
            result.rank, result.candidate_id, result.application_id, shortlisted
        );
        println!(
            "   Semantic: {} | Skills: {} | Experience: {} | Education: {}",
            breakdown.semantic_match,
            breakdown.skill_match,
            breakdown.experience_match,
            breakdown.education_match
        );
        println!("   {}", summarize_match(result));
        if !result.missing_skills().is_empty() {
            let missing: Vec<&str> = result.missing_skills().iter().map(String::as_str).collect();
            println!("   Missing: {}", missing.join(", "));
        }
    }

    let summary = &ranking.summary;
    println!("\n---");
    println!(
        "Total: {} ranked ({} excellent, {} good, {} fair, {} poor), {} shown",
        summary.total,
        summary.excellent,
        summary.good,
        summary.fair,
        summary.poor,
        shown.len()
    );
    if summary.skipped > 0 {
        println!("{} candidates could not be scored", summary.skipped);
    }
    if summary.degraded {
        println!("Ranking temporarily limited: semantic matching unavailable for most candidates");
    }

    Ok(())
}

fn print_explanation(ranking: &Ranking, candidate_id: &str, max_insights: usize) -> Result<()> {
    let Some(result) = ranking
        .results
        .iter()
        .find(|r| r.candidate_id == candidate_id)
    else {
        bail!("Candidate {} was not ranked", candidate_id);
    };

    println!("{} (rank {} of {})", candidate_id, result.rank, ranking.summary.total);
    println!("{}", summarize_match(result));

    let matched: Vec<&str> = result.matched_skills().iter().map(String::as_str).collect();
    let missing: Vec<&str> = result.missing_skills().iter().map(String::as_str).collect();
    println!("Matched skills: {}", matched.join(", "));
    println!("Missing skills: {}", missing.join(", "));

    for (insight, explanation) in explain_result(result, max_insights) {
        let kind = if insight.is_concern() { "concern" } else { "strength" };
        println!(
            "\n- [{}] {} ({}, severity {:.1})",
            insight.label(),
            explanation.summary,
            kind,
            explanation.severity
        );
        println!("  {}", explanation.detail);
        for evidence in &explanation.evidence {
            match &evidence.context {
                Some(context) => {
                    println!("  * {}: {} ({})", evidence.kind, evidence.value, context)
                }
                None => println!("  * {}: {}", evidence.kind, evidence.value),
            }
        }
    }

    Ok(())
}

async fn run_health<B: SimilarityBackend>(backend: &B) -> Result<()> {
    print!("Checking {} backend... ", backend.name());

    match backend.health_check().await {
        Ok(()) => {
            println!("OK");
            Ok(())
        }
        Err(e) => {
            println!("FAILED: {}", e);
            std::process::exit(1);
        }
    }
}
