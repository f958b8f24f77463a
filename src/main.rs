use anyhow::{bail, Context, Result};
use clap::Parser;
use reqwest::Client;
use std::path::PathBuf;
use tracing::{debug, info, warn};

use partisan_cloud::fetch::{CachedTopicSource, FsTopicSource, HttpTopicSource, TopicSource};
use partisan_cloud::months::{parse_selection, Month};
use partisan_cloud::orchestrator::{CloudRenderer, RenderOutcome};
use partisan_cloud::viz_export::write_cloud_bundle;
use partisan_cloud::CloudConfig;

/// Where the dashboard keeps its per-party monthly topic files.
const DEFAULT_DATA_DIR: &str = "data/wordcloud_data";

/// Partisan word cloud - union/intersection keyword layout for a month selection
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Explicit months, comma separated (e.g. 2020-01,2020-02)
    #[arg(short, long, value_delimiter = ',')]
    months: Vec<String>,

    /// First month of an inclusive range (use with --to)
    #[arg(long, requires = "to")]
    from: Option<String>,

    /// Last month of an inclusive range (use with --from)
    #[arg(long, requires = "from")]
    to: Option<String>,

    /// Every month of one year
    #[arg(long, conflicts_with_all = ["from", "to"])]
    year: Option<i32>,

    /// Every month the bundled datasets cover (2008-01 through 2021-12)
    #[arg(long, conflicts_with_all = ["months", "from", "to", "year"])]
    all: bool,

    /// Directory holding <Party>/<YYYY-MM>.json topic files
    #[arg(long, conflicts_with = "base_url")]
    data_dir: Option<PathBuf>,

    /// Base URL serving <Party>/<YYYY-MM>.json topic files
    #[arg(long)]
    base_url: Option<String>,

    /// Path to YAML config file (overrides CLOUD_CONFIG environment variable)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output directory for generated files
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    #[arg(long)]
    width: Option<f64>,

    #[arg(long)]
    height: Option<f64>,

    /// Fixed layout seed for reproducible output
    #[arg(long)]
    seed: Option<u64>,

    /// Also write wordcloud.svg
    #[arg(long)]
    svg: bool,
}

fn selection_from_args(args: &Args) -> Result<Vec<String>> {
    if args.all {
        return Ok(Month::dataset_domain().iter().map(|m| m.to_string()).collect());
    }
    if !args.months.is_empty() {
        return Ok(args.months.clone());
    }
    if let (Some(from), Some(to)) = (&args.from, &args.to) {
        let from: Month = from.parse()?;
        let to: Month = to.parse()?;
        return Ok(Month::range(from, to).iter().map(|m| m.to_string()).collect());
    }
    if let Some(year) = args.year {
        return Ok(Month::months_of_year(year)?.iter().map(|m| m.to_string()).collect());
    }
    bail!("No months selected. Use --months, --from/--to, --year, or --all.");
}

fn apply_overrides(cfg: &mut CloudConfig, args: &Args) {
    if let Some(dir) = &args.data_dir {
        cfg.source.dir = Some(dir.clone());
        cfg.source.base_url = None;
    }
    if let Some(url) = &args.base_url {
        cfg.source.base_url = Some(url.clone());
        cfg.source.dir = None;
    }
    if let Some(out) = &args.output_dir {
        cfg.output_dir = out.clone();
    }
    if let Some(w) = args.width {
        cfg.canvas.width = w;
    }
    if let Some(h) = args.height {
        cfg.canvas.height = h;
    }
    if args.seed.is_some() {
        cfg.seed = args.seed;
    }
}

fn build_source(cfg: &CloudConfig) -> Result<Box<dyn TopicSource>> {
    if let Some(dir) = &cfg.source.dir {
        debug!("Using topic directory: {}", dir.display());
        return Ok(Box::new(FsTopicSource::new(dir.clone())));
    }
    if let Some(url) = &cfg.source.base_url {
        debug!("Using topic base URL: {}", url);
        let client = Client::builder().build()?;
        return Ok(Box::new(HttpTopicSource::new(client, url)?));
    }
    debug!("No source configured, falling back to {}", DEFAULT_DATA_DIR);
    Ok(Box::new(FsTopicSource::new(DEFAULT_DATA_DIR)))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_thread_ids(false)
        .with_line_number(true)
        .init();

    info!("Starting partisan-cloud");

    let args = Args::parse();

    let mut cfg = CloudConfig::resolve(args.config.as_deref()).context("loading config")?;
    apply_overrides(&mut cfg, &args);
    cfg.validate()?;

    let selection = selection_from_args(&args)?;
    info!("Selection - months={}, output_dir={}", selection.len(), cfg.output_dir.display());

    let source = CachedTopicSource::new(build_source(&cfg)?);
    let renderer = CloudRenderer::new(source, cfg.clone());
    let outcome = renderer.render(&selection).await;

    let months = parse_selection(&selection).unwrap_or_default();
    let dir = write_cloud_bundle(&cfg.output_dir, &months, &outcome, &cfg.canvas, args.svg)?;
    info!("Output persisted - directory={}", dir.display());

    match outcome {
        RenderOutcome::Ready { cloud } => {
            info!("Word cloud ready - terms={}, crowded={}", cloud.term_count(), cloud.crowded);
            Ok(())
        }
        RenderOutcome::NoData { message } => {
            warn!("{}", message);
            Ok(())
        }
        RenderOutcome::Failed { message } => bail!(message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_selects_whole_dataset_domain() {
        let args = Args::try_parse_from(["partisan-cloud", "--all"]).unwrap();
        let sel = selection_from_args(&args).unwrap();
        assert_eq!(sel.len(), 14 * 12);
        assert_eq!(sel.first().map(String::as_str), Some("2008-01"));
        assert_eq!(sel.last().map(String::as_str), Some("2021-12"));
    }

    #[test]
    fn test_all_conflicts_with_explicit_months() {
        assert!(Args::try_parse_from(["partisan-cloud", "--all", "--months", "2020-01"]).is_err());
    }

    #[test]
    fn test_range_and_missing_selection() {
        let args = Args::try_parse_from(["partisan-cloud", "--from", "2020-11", "--to", "2021-02"]).unwrap();
        assert_eq!(selection_from_args(&args).unwrap(), vec!["2020-11", "2020-12", "2021-01", "2021-02"]);
        let none = Args::try_parse_from(["partisan-cloud"]).unwrap();
        assert!(selection_from_args(&none).is_err());
    }
}
