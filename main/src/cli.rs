use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use clap::{ArgGroup, Args, Parser, Subcommand};
use common::{
    error::AppError,
    storage::{selection::SelectionState, types::year_range::YearRange},
    utils::config::AppConfig,
};
use concordance_pipeline::{ConcordanceSearch, HttpConcordanceService, SearchSettings};
use corpus_pipeline::{
    AssetSource, CorpusLoader, HttpAssetSource, LocalAssetSource, NbCatalogClient,
    ThumbnailResolver,
};
use tracing::{debug, info};

use crate::session::Session;

#[derive(Debug, Parser)]
#[command(name = "konkordans", version, about = "Concordance search over a curated corpus")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the corpus documents with their selection flag
    Corpus(CorpusArgs),
    /// Run a concordance search over the selected documents
    Search(SearchArgs),
    /// Edit a saved document selection
    Select(SelectArgs),
}

#[derive(Debug, Clone, Args)]
pub struct YearArgs {
    /// Earliest publication year to include (defaults to the corpus minimum)
    #[arg(long)]
    pub year_from: Option<i32>,

    /// Latest publication year to include (defaults to the corpus maximum)
    #[arg(long)]
    pub year_to: Option<i32>,
}

impl YearArgs {
    fn range(&self) -> YearRange {
        YearRange::new(self.year_from, self.year_to)
    }
}

#[derive(Debug, Args)]
pub struct CorpusArgs {
    #[command(flatten)]
    pub years: YearArgs,

    /// Resolve preview thumbnails from the catalog
    #[arg(long, default_value_t = false)]
    pub thumbnails: bool,

    /// Saved selection to display
    #[arg(long)]
    pub selection_file: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Search expression sent to the concordance service
    pub query: String,

    /// Deselect a document for this search
    #[arg(long = "exclude", value_name = "ID")]
    pub exclude: Vec<String>,

    /// Search only these documents
    #[arg(long = "only", value_name = "ID")]
    pub only: Vec<String>,

    #[command(flatten)]
    pub years: YearArgs,

    /// Write the hits to a CSV file in the export directory
    #[arg(long, default_value_t = false)]
    pub export: bool,

    /// Saved selection to start from
    #[arg(long)]
    pub selection_file: Option<PathBuf>,
}

#[derive(Debug, Args)]
#[command(group(
    ArgGroup::new("change")
        .required(true)
        .args(["include", "exclude", "toggle", "all", "none"])
))]
pub struct SelectArgs {
    /// File holding the selection flags
    #[arg(long)]
    pub selection_file: PathBuf,

    #[arg(long, value_name = "ID")]
    pub include: Option<String>,

    #[arg(long, value_name = "ID")]
    pub exclude: Option<String>,

    #[arg(long, value_name = "ID")]
    pub toggle: Option<String>,

    /// Select every document
    #[arg(long)]
    pub all: bool,

    /// Deselect every document
    #[arg(long)]
    pub none: bool,
}

/// Local directory or HTTP origin, picked from the configuration.
pub enum Assets {
    Local(LocalAssetSource),
    Http(HttpAssetSource),
}

impl Assets {
    pub fn from_config(config: &AppConfig, client: &reqwest::Client) -> Result<Self, AppError> {
        match config.asset_base_url.as_deref().map(str::trim) {
            Some(base) if !base.is_empty() => {
                Ok(Self::Http(HttpAssetSource::new(client.clone(), base)?))
            }
            _ => Ok(Self::Local(LocalAssetSource::new(&config.asset_dir))),
        }
    }
}

#[async_trait]
impl AssetSource for Assets {
    async fn fetch(&self, name: &str) -> Result<Vec<u8>, AppError> {
        match self {
            Self::Local(source) => source.fetch(name).await,
            Self::Http(source) => source.fetch(name).await,
        }
    }
}

/// Shared handles for one CLI invocation.
pub struct Runtime {
    pub config: AppConfig,
    pub client: reqwest::Client,
}

pub async fn run(cli: Cli, ctx: Runtime) -> Result<()> {
    match cli.command {
        Command::Corpus(args) => corpus(args, &ctx).await,
        Command::Search(args) => search(args, &ctx).await,
        Command::Select(args) => select(args, &ctx).await,
    }
}

async fn load_session(ctx: &Runtime) -> Result<Session> {
    let assets = Assets::from_config(&ctx.config, &ctx.client)?;
    let loader = CorpusLoader::new(assets, &ctx.config);

    let mut session = Session::new();
    session.load(&loader).await;
    if let Some(err) = session.last_error() {
        bail!("{err}");
    }
    Ok(session)
}

async fn corpus(args: CorpusArgs, ctx: &Runtime) -> Result<()> {
    let mut session = load_session(ctx).await?;
    if let Some(path) = &args.selection_file {
        session.restore_selection(read_selection(path).await?);
    }
    session.set_year_range(args.years.range());

    if args.thumbnails {
        let resolver = ThumbnailResolver::new(NbCatalogClient::new(
            ctx.client.clone(),
            &ctx.config.catalog_url,
        ));
        session.refresh_thumbnails(&resolver).await;
    }

    println!("{}", session.app_name());
    let years = session.effective_years();
    println!(
        "years {}-{}",
        years.from.map_or_else(|| "?".to_string(), |y| y.to_string()),
        years.to.map_or_else(|| "?".to_string(), |y| y.to_string()),
    );
    for doc in session.visible_documents() {
        let mark = if session.is_selected(&doc.id) { "x" } else { " " };
        let thumbnail = session.thumbnail(&doc.id).unwrap_or_default();
        println!(
            "[{mark}] {}\t{}\t{}\t{}\t{thumbnail}",
            doc.id,
            doc.display_year(),
            doc.display_title(),
            doc.urn,
        );
    }

    let counts = session.counts();
    println!(
        "{} of {} visible documents selected ({} in corpus)",
        counts.selected, counts.visible, counts.total
    );
    Ok(())
}

async fn search(args: SearchArgs, ctx: &Runtime) -> Result<()> {
    let mut session = load_session(ctx).await?;
    if let Some(path) = &args.selection_file {
        session.restore_selection(read_selection(path).await?);
    }
    session.set_year_range(args.years.range());

    if !args.only.is_empty() {
        let ids: Vec<String> = session.registry().ids().map(str::to_string).collect();
        session.clear_all(ids.iter().map(String::as_str));
        session.select_all(args.only.iter().map(String::as_str));
    }
    session.clear_all(args.exclude.iter().map(String::as_str));

    let url = session
        .concordance_url()
        .unwrap_or(ctx.config.concordance_url.as_str())
        .to_string();
    debug!(%url, "using concordance endpoint");
    let searcher = ConcordanceSearch::new(
        HttpConcordanceService::new(ctx.client.clone(), url),
        SearchSettings::from_config(&ctx.config)?,
    );

    session.search(&searcher, &args.query).await;
    if let Some(err) = session.last_error() {
        bail!("{err}");
    }

    for hit in session.hits() {
        println!(
            "{} ({})\t{}\n    {}",
            hit.display_title(),
            hit.display_year(),
            hit.document_url,
            common::utils::markup::flatten_markup(&hit.concordance_markup),
        );
    }
    println!("{} hits", session.hits().len());

    if args.export {
        match session.export(chrono::Local::now().date_naive())? {
            Some(payload) => {
                let path = Path::new(&ctx.config.export_dir).join(&payload.file_name);
                tokio::fs::write(&path, &payload.bytes)
                    .await
                    .with_context(|| format!("writing {}", path.display()))?;
                info!(path = %path.display(), "export written");
                println!("exported to {}", path.display());
            }
            None => println!("nothing to export"),
        }
    }
    Ok(())
}

async fn select(args: SelectArgs, ctx: &Runtime) -> Result<()> {
    let mut session = load_session(ctx).await?;
    if tokio::fs::try_exists(&args.selection_file).await? {
        session.restore_selection(read_selection(&args.selection_file).await?);
    }

    let all: Vec<String> = session.registry().ids().map(str::to_string).collect();
    if let Some(id) = &args.include {
        require_known(&session, id)?;
        session.select_all([id.as_str()]);
    } else if let Some(id) = &args.exclude {
        require_known(&session, id)?;
        session.clear_all([id.as_str()]);
    } else if let Some(id) = &args.toggle {
        require_known(&session, id)?;
        session.toggle(id);
    } else if args.all {
        session.select_all(all.iter().map(String::as_str));
    } else if args.none {
        session.clear_all(all.iter().map(String::as_str));
    }

    write_selection(&args.selection_file, session.selection()).await?;
    let counts = session.counts();
    println!("{} of {} documents selected", counts.selected, counts.total);
    Ok(())
}

fn require_known(session: &Session, id: &str) -> Result<()> {
    if !session.registry().contains(id) {
        bail!("unknown document id {id}");
    }
    Ok(())
}

pub async fn read_selection(path: &Path) -> Result<SelectionState> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_slice(&bytes).with_context(|| format!("parsing {}", path.display()))
}

pub async fn write_selection(path: &Path, selection: &SelectionState) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(selection)?;
    tokio::fs::write(path, bytes)
        .await
        .with_context(|| format!("writing {}", path.display()))
}
