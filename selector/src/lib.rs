use anyhow::{Context, Result};
use clap::Parser;
use keyswarm_core::persist::{load_records_csv, save_report};
use keyswarm_core::{Codebook, CorpusStore, KeywordSelector, Polarity, SelectionReport, SelectorConfig};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "selector")]
#[command(about = "PSO for automatic keyword selection", long_about = None)]
pub struct Cli {
    /// Path to a CSV file of messages with `text` and `class` columns
    #[arg(short, long)]
    pub tweets: PathBuf,
    /// TOML file with [swarm], [fitness] and [keywords] sections
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Extra candidate keywords, comma-separated, appended after the configured ones
    #[arg(long, value_delimiter = ',')]
    pub keywords: Vec<String>,
    /// Keyword slots per particle
    #[arg(long)]
    pub dimension: Option<usize>,
    #[arg(long)]
    pub swarm_size: Option<usize>,
    #[arg(long)]
    pub iterations: Option<usize>,
    /// Seed for a reproducible run
    #[arg(long)]
    pub seed: Option<u64>,
    /// as-written or favor-irrelevant
    #[arg(long)]
    pub polarity: Option<Polarity>,
    /// Evaluate particles on a single thread
    #[arg(long, default_value_t = false)]
    pub sequential: bool,
    /// Write the JSON report here
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl Cli {
    /// File configuration with command-line overrides applied.
    pub fn resolve_config(&self) -> Result<SelectorConfig> {
        let mut config = match &self.config {
            Some(path) => SelectorConfig::load(path)
                .with_context(|| format!("reading config {}", path.display()))?,
            None => SelectorConfig::default(),
        };
        config.keywords.similar.extend(self.keywords.iter().cloned());
        if let Some(d) = self.dimension { config.swarm.dimension = d; }
        if let Some(s) = self.swarm_size { config.swarm.swarm_size = s; }
        if let Some(n) = self.iterations { config.swarm.iterations = n; }
        if let Some(seed) = self.seed { config.swarm.seed = Some(seed); }
        if let Some(p) = self.polarity { config.fitness.polarity = p; }
        if self.sequential { config.swarm.parallel = false; }
        config.validate().context("invalid configuration")?;
        Ok(config)
    }
}

pub fn run(cli: &Cli) -> Result<SelectionReport> {
    let config = cli.resolve_config()?;

    let rows = load_records_csv(&cli.tweets)
        .with_context(|| format!("reading {}", cli.tweets.display()))?;
    let corpus = CorpusStore::load(rows).context("loading corpus")?;
    let codebook = Codebook::build(config.keywords.candidates()).context("building keyword codebook")?;

    let selector = KeywordSelector::from_config(&corpus, &codebook, &config)?;
    println!("{:?}", selector.bounds().lower());
    println!("{:?}", selector.bounds().upper());

    let report = selector.run();
    println!("{}", report.summary());

    if let Some(out) = &cli.output {
        save_report(out, &report).with_context(|| format!("writing {}", out.display()))?;
        tracing::info!(output = %out.display(), "report written");
    }
    Ok(report)
}
