//! Command-line grant browser
//!
//! Loads a record file, applies search and filters, and prints one view of
//! the result: a table page, map clusters, facet options or statistics, or
//! the full detail of a single project.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use gb_core::events::{events, handler_from_fn, EventBus};
use gb_core::{BrowseSession, FilterCriteria, StatusFilter, ViewMode};
use gb_data::schema::parse_id;
use gb_data::{open_source, BrowserConfig, SourceConfig};
use gb_views::{ClusterBuilder, GazetteerResolver, MapView};

mod output;

use output::{facets_text, DetailReport, MapReport, StatsReport, TableReport};

#[derive(Parser, Debug)]
#[command(name = "grant-browser")]
#[command(version)]
#[command(about = "Search, filter and map grant application records")]
struct Cli {
    /// Record file (.json or .csv); defaults to the source in the config file
    file: Option<PathBuf>,

    /// Browser configuration file (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Free-text search over name, region and organization
    #[arg(short, long)]
    query: Option<String>,

    /// Exact direction
    #[arg(long)]
    direction: Option<String>,

    /// Exact year
    #[arg(long)]
    year: Option<i32>,

    /// Exact region
    #[arg(long)]
    region: Option<String>,

    /// winner or participant
    #[arg(long)]
    status: Option<StatusFilter>,

    /// Page to show (clamped to the last page)
    #[arg(short, long, default_value_t = 1)]
    page: usize,

    /// What to print
    #[arg(long, value_enum, default_value = "table")]
    view: OutputView,

    /// Show one project by id instead of a view; filters do not apply
    #[arg(long)]
    id: Option<String>,

    /// CSV field delimiter, overriding the configured one
    #[arg(long)]
    delimiter: Option<char>,

    /// Extra cell value to treat as missing (repeatable)
    #[arg(long = "null", value_name = "PATTERN")]
    null_patterns: Vec<String>,

    /// Print JSON instead of text
    #[arg(long)]
    json: bool,

    /// Seed for marker jitter, for reproducible map output
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputView {
    Table,
    Map,
    Facets,
    Stats,
}

impl Cli {
    fn criteria(&self) -> FilterCriteria {
        FilterCriteria {
            query: self.query.clone().unwrap_or_default(),
            direction: self.direction.clone(),
            year: self.year,
            region: self.region.clone(),
            status: self.status,
        }
    }

    /// Record source from the positional file or the config, with CLI overrides
    fn source(&self, configured: Option<SourceConfig>) -> Result<SourceConfig> {
        let mut source = match (&self.file, configured) {
            (Some(file), configured) => {
                let mut source = SourceConfig::new(file.clone());
                if let Some(configured) = configured {
                    source.delimiter = configured.delimiter;
                }
                source
            }
            (None, Some(source)) => source,
            (None, None) => bail!("No record file given and no source in the config"),
        };
        if let Some(delimiter) = self.delimiter {
            source.delimiter = delimiter;
        }
        Ok(source)
    }
}

fn event_bus() -> Arc<EventBus> {
    let bus = Arc::new(EventBus::new());
    bus.subscribe::<events::SourceFailed>(handler_from_fn(|event| {
        if let Some(failed) = event.as_any().downcast_ref::<events::SourceFailed>() {
            warn!("Source '{}' failed: {}", failed.source_name, failed.error);
        }
    }));
    bus.subscribe::<events::CriteriaChanged>(handler_from_fn(|event| {
        if let Some(changed) = event.as_any().downcast_ref::<events::CriteriaChanged>() {
            info!("{} records match the current filters", changed.total_matches);
        }
    }));
    bus
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let text = run(Cli::parse()).await?;
    print!("{}", text);
    Ok(())
}

/// Load, filter and render according to the command line
async fn run(cli: Cli) -> Result<String> {
    let config = match &cli.config {
        Some(path) => BrowserConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => BrowserConfig::default(),
    };

    let source_config = cli.source(config.source.clone())?;
    let mut null_config = config.null_config.clone();
    for pattern in &cli.null_patterns {
        null_config.add_pattern(pattern.clone());
    }

    let bus = event_bus();
    let source = open_source(&source_config, null_config)?;
    let records = match source.load().await {
        Ok(records) => records,
        Err(e) => {
            bus.publish(events::SourceFailed {
                source_name: source.source_name().to_string(),
                error: e.to_string(),
            });
            return Err(e.context(format!("Failed to load {}", source_config.path.display())));
        }
    };

    let session = BrowseSession::new(config.page_size).with_event_bus(bus);
    session.load(source.source_name(), records);

    if let Some(raw) = &cli.id {
        let id = parse_id(raw);
        let Some(report) = DetailReport::find(&session, &id) else {
            bail!("No project with id {}", id);
        };
        return render(cli.json, &report, DetailReport::to_text);
    }

    let criteria = cli.criteria();
    if !criteria.is_empty() {
        session.set_criteria(criteria);
    }
    session.set_page(cli.page);

    let text = match cli.view {
        OutputView::Table => {
            let report = TableReport::from_session(&session);
            render(cli.json, &report, TableReport::to_text)?
        }
        OutputView::Map => {
            session.set_view_mode(ViewMode::Map);
            let resolver = GazetteerResolver::russian_cities().with_default(config.default_coordinate);
            let builder = ClusterBuilder::new(Arc::new(resolver)).with_jitter(config.jitter);
            let map = Arc::new(match cli.seed {
                Some(seed) => MapView::with_seed(builder, seed),
                None => MapView::from_entropy(builder),
            });
            session.add_subscriber(map.clone());

            let report = MapReport::from_session(&session, &map);
            render(cli.json, &report, MapReport::to_text)?
        }
        OutputView::Facets => {
            let facets = session.facets();
            render(cli.json, facets.as_ref(), facets_text)?
        }
        OutputView::Stats => {
            let report = StatsReport::from_session(&session);
            render(cli.json, &report, StatsReport::to_text)?
        }
    };

    Ok(text)
}

fn render<T: serde::Serialize + ?Sized>(json: bool, value: &T, text: impl Fn(&T) -> String) -> Result<String> {
    if json {
        let mut out = serde_json::to_string_pretty(value)?;
        out.push('\n');
        Ok(out)
    } else {
        Ok(text(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use tempfile::TempDir;

    const RECORDS: &str = r#"[
        {"id": 1, "name": "Чистый город", "region": "Казань", "org": "Фонд А", "year": 2023, "winner": true, "money_req_grant": 300000},
        {"id": 2, "name": "Школа волонтёров", "region": "Казань", "year": 2022},
        {"id": 3, "name": "Музей", "region": "Пермь", "goal": "Сохранить коллекцию", "web_site": "https://museum.example"}
    ]"#;

    /// Write the records and a config pointing at them; returns the config path
    fn fixture(dir: &TempDir) -> PathBuf {
        let records = dir.path().join("grants.json");
        std::fs::write(&records, RECORDS).unwrap();

        let config = dir.path().join("browser.json");
        let body = serde_json::json!({
            "page_size": 2,
            "source": { "path": records },
        });
        std::fs::write(&config, body.to_string()).unwrap();
        config
    }

    fn cli(config: &Path, args: &[&str]) -> Cli {
        let mut argv = vec!["grant-browser", "--config", config.to_str().unwrap()];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[tokio::test]
    async fn test_run_table_from_configured_source() {
        let dir = TempDir::new().unwrap();
        let config = fixture(&dir);

        let text = run(cli(&config, &[])).await.unwrap();
        assert!(text.starts_with("grants.json: найдено"));
        assert!(text.contains("Чистый город"));
        assert!(text.contains("Страница 1 из 2"));
    }

    #[tokio::test]
    async fn test_run_stats_with_filter() {
        let dir = TempDir::new().unwrap();
        let config = fixture(&dir);

        let text = run(cli(&config, &["--view", "stats", "--region", "Казань"])).await.unwrap();
        assert!(text.contains("Всего проектов: 2"));
        assert!(text.contains("Сумма грантов победителей: 300 000 ₽"));
    }

    #[tokio::test]
    async fn test_run_detail_by_id() {
        let dir = TempDir::new().unwrap();
        let config = fixture(&dir);

        let text = run(cli(&config, &["--id", "3", "--region", "Казань"])).await.unwrap();
        assert!(text.starts_with("#3 Музей"));
        assert!(text.contains("Цель: Сохранить коллекцию"));
        assert!(text.contains("Сайт: https://museum.example"));
    }

    #[tokio::test]
    async fn test_run_detail_unknown_id() {
        let dir = TempDir::new().unwrap();
        let config = fixture(&dir);

        let err = run(cli(&config, &["--id", "99"])).await.unwrap_err();
        assert!(err.to_string().contains("No project with id 99"));
    }

    #[tokio::test]
    async fn test_run_csv_file_with_delimiter_and_null() {
        let dir = TempDir::new().unwrap();
        let config = fixture(&dir);
        let csv = dir.path().join("grants.csv");
        std::fs::write(&csv, "id;name;region\n7;Сад;н/д\n8;Парк;Пермь\n").unwrap();

        let args = [
            csv.to_str().unwrap(),
            "--delimiter",
            ";",
            "--null",
            "н/д",
            "--view",
            "facets",
        ];
        let text = run(cli(&config, &args)).await.unwrap();
        assert!(text.contains("Регионы: Пермь\n"));
    }

    #[tokio::test]
    async fn test_run_missing_source_file() {
        let dir = TempDir::new().unwrap();
        let config = fixture(&dir);
        let missing = dir.path().join("absent.json");

        let result = run(cli(&config, &[missing.to_str().unwrap()])).await;
        assert!(result.is_err());
    }
}
