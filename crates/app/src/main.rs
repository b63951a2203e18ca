mod documents;

use anyhow::{anyhow, bail, Context};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use documents::{load_documents, JsonDocument, JsonlRecordStore};
use opensearch_bridge_core::{
    map_results, BatchReport, ClusterConfig, HitList, OpenSearchEngine, SearchEngine,
    SearchRequest, SortDirection, DEFAULT_CLUSTER_URL, DEFAULT_PAGE_SIZE,
};
use serde_json::Value;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "opensearch-bridge", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// OpenSearch cluster base URL
    #[arg(long, env = "OPENSEARCH_HOST", default_value = DEFAULT_CLUSTER_URL)]
    url: String,

    /// Send HTTP basic auth credentials with every request
    #[arg(long, env = "OPENSEARCH_BASIC_AUTH", default_value_t = true, action = clap::ArgAction::Set)]
    basic_auth: bool,

    /// Basic auth username
    #[arg(long, env = "OPENSEARCH_USER")]
    user: Option<String>,

    /// Basic auth password
    #[arg(long, env = "OPENSEARCH_PASS", hide_env_values = true)]
    pass: Option<String>,

    /// Attach `__soft_deleted` metadata to documents that carry a `deleted_at` field
    #[arg(long, env = "SCOUT_SOFT_DELETE", default_value_t = false)]
    soft_delete: bool,
}

impl Cli {
    fn cluster_config(&self) -> ClusterConfig {
        ClusterConfig {
            url: self.url.clone(),
            basic_auth: self.basic_auth,
            username: self.user.clone(),
            password: self.pass.clone(),
            soft_delete: self.soft_delete,
        }
    }
}

#[derive(Args)]
struct SearchArgs {
    /// Index to search
    #[arg(long)]
    index: String,

    /// Comma separated fields used for free-text matching
    #[arg(long, value_delimiter = ',')]
    fields: Vec<String>,

    /// Free-text query
    #[arg(long)]
    query: Option<String>,

    /// Equality filter as `field=value`; repeatable
    #[arg(long = "filter", value_parser = parse_filter)]
    filters: Vec<(String, Value)>,

    /// Sort clause as `field:asc` or `field:desc`; repeatable
    #[arg(long = "sort", value_parser = parse_sort)]
    sort: Vec<(String, SortDirection)>,

    /// Maximum number of hits
    #[arg(long)]
    limit: Option<usize>,

    /// JSONL file used to print full records in hit order
    #[arg(long)]
    hydrate_from: Option<PathBuf>,
}

impl SearchArgs {
    fn request(&self) -> SearchRequest {
        let model = JsonDocument::model(&self.index, &self.fields);
        let mut request = SearchRequest::for_model(&model);
        if let Some(query) = &self.query {
            request = request.text(query);
        }
        for (field, value) in &self.filters {
            request = request.filter(field, value.clone());
        }
        for (field, direction) in &self.sort {
            request = request.order_by(field, *direction);
        }
        if let Some(limit) = self.limit {
            request = request.take(limit);
        }
        request
    }
}

#[derive(Subcommand)]
enum Command {
    /// Upsert every document of a JSONL file, one request per document.
    Index {
        #[arg(long)]
        index: String,
        /// JSONL file; each line needs an `id`.
        #[arg(long)]
        file: PathBuf,
        #[arg(long, value_delimiter = ',')]
        fields: Vec<String>,
    },
    /// Delete documents by id.
    Delete {
        #[arg(long)]
        index: String,
        #[arg(long = "id", required = true)]
        ids: Vec<String>,
    },
    /// Search and print ids in relevance order.
    Search {
        #[command(flatten)]
        args: SearchArgs,
    },
    /// Search one page of results.
    Paginate {
        #[command(flatten)]
        args: SearchArgs,
        #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
        per_page: usize,
        #[arg(long, default_value_t = 1)]
        page: usize,
    },
    /// Send a native query document from a file, untouched.
    Raw {
        #[arg(long)]
        index: String,
        #[arg(long)]
        body: PathBuf,
    },
    /// Delete an index and all of its documents.
    DropIndex {
        #[arg(long)]
        index: String,
    },
    /// Indexes are created on first write; kept for parity and always fails.
    CreateIndex {
        #[arg(long)]
        index: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let app_version = env!("CARGO_PKG_VERSION");

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer())
        .init();

    let cli = Cli::parse();
    let engine = OpenSearchEngine::new(&cli.cluster_config())?;

    info!(
        version = app_version,
        cluster = %engine.base_url(),
        transport = ?engine.transport(),
        started_at = %Utc::now().to_rfc3339(),
        "opensearch-bridge boot"
    );

    match cli.command {
        Command::Index { index, file, fields } => {
            let documents = load_documents(&file, &index, &fields)?;
            info!(index = %index, document_count = documents.len(), "indexing documents");

            let report = engine.update(&documents).await?;
            print_report("indexed", &report)?;
        }
        Command::Delete { index, ids } => {
            let report = engine.delete(&index, &ids).await?;
            print_report("deleted", &report)?;
        }
        Command::Search { args } => {
            let hits = engine.search(&args.request()).await?;
            print_hits(&hits, &args).await?;
        }
        Command::Paginate {
            args,
            per_page,
            page,
        } => {
            let hits = engine.paginate(&args.request(), per_page, page).await?;
            println!("page={page} per_page={per_page}");
            print_hits(&hits, &args).await?;
        }
        Command::Raw { index, body } => {
            let contents = tokio::fs::read_to_string(&body)
                .await
                .with_context(|| format!("reading {}", body.display()))?;
            let document: Value = serde_json::from_str(&contents)?;

            let model = JsonDocument::model(&index, &[]);
            let hits = engine
                .raw_search(&SearchRequest::for_model(&model), &document)
                .await?;
            for hit in &hits.hits {
                println!("[{}] id={} score={}", hit.position, hit.id, score(hit.score));
            }
            println!("total={}", hits.total);
        }
        Command::DropIndex { index } => {
            engine.flush(&index).await?;
            println!("index {index} deleted at {}", Utc::now().to_rfc3339());
        }
        Command::CreateIndex { index } => {
            engine
                .create_index(&index, &Value::Null)
                .await
                .map_err(|error| anyhow!(error.to_string()))?;
        }
    }

    Ok(())
}

async fn print_hits(hits: &HitList, args: &SearchArgs) -> anyhow::Result<()> {
    for hit in &hits.hits {
        println!("[{}] id={} score={}", hit.position, hit.id, score(hit.score));
    }
    println!("total={}", hits.total);

    if let Some(path) = &args.hydrate_from {
        let store = JsonlRecordStore::new(load_documents(path, &args.index, &args.fields)?);
        let records = map_results(hits, &store).await?;
        if records.len() < hits.hits.len() {
            warn!(
                missing = hits.hits.len() - records.len(),
                path = %path.display(),
                "some hits have no local record"
            );
        }
        for record in records {
            println!("{} {}", record.id, Value::Object(record.fields));
        }
    }

    Ok(())
}

fn print_report(verb: &str, report: &BatchReport) -> anyhow::Result<()> {
    println!(
        "{verb}={} skipped={} failed={}",
        report.succeeded.len(),
        report.skipped,
        report.failures.len()
    );
    for failure in &report.failures {
        println!(
            "  id={} status={} reason={}",
            failure.id,
            failure
                .status
                .map(|status| status.to_string())
                .unwrap_or_else(|| "-".to_string()),
            failure.reason
        );
    }

    if !report.is_clean() {
        bail!("{} of {} documents failed", report.failures.len(), report.attempted);
    }
    Ok(())
}

fn score(score: Option<f64>) -> String {
    score
        .map(|score| format!("{score:.4}"))
        .unwrap_or_else(|| "-".to_string())
}

fn parse_filter(raw: &str) -> Result<(String, Value), String> {
    let (field, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected field=value, got {raw}"))?;
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((field.trim().to_string(), value))
}

fn parse_sort(raw: &str) -> Result<(String, SortDirection), String> {
    match raw.split_once(':') {
        Some((field, direction)) => Ok((field.trim().to_string(), direction.parse()?)),
        None => Ok((raw.trim().to_string(), SortDirection::Asc)),
    }
}
