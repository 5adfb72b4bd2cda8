//! kgraph CLI: build, grow and lay out research knowledge graphs.
//!
//! Usage:
//!   kgraph parse --parent <id>              (entity list on stdin)
//!   kgraph validate <graph.json>
//!   kgraph layout <graph.json> [--ticks N]
//!   kgraph project <create|list|show|delete> [--db path]
//!   kgraph expand <project> <node> [--label text]
//!   kgraph remove <project> <node>
//!   kgraph regenerate <project> [--document path]

use clap::{Parser, Subcommand};
use kgraph::generation::{CommandClient, Unconfigured};
use kgraph::{
    parse_entities, ChatLog, Config, EntityGenerator, Graph, GraphExtractor, LayoutEngine,
    MutationService, NewProject, NodeId, OpenStore, PersistenceBridge, ProjectId, ProjectStore,
    SqliteStore,
};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::Level;

#[derive(Parser)]
#[command(name = "kgraph", version, about = "Research knowledge graph engine")]
struct Cli {
    /// Path to a YAML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Path to SQLite database file (overrides configuration)
    #[arg(long, global = true)]
    db: Option<PathBuf>,
    /// Log more (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a generated entity list from stdin into a graph delta
    Parse {
        /// Id of the node being expanded
        #[arg(long)]
        parent: String,
    },
    /// Validate a graph file, dropping links to unknown nodes
    Validate {
        /// Graph JSON file
        file: PathBuf,
    },
    /// Run the force layout over a graph file and print node positions
    Layout {
        /// Graph JSON file
        file: PathBuf,
        /// Maximum number of simulation ticks
        #[arg(long, default_value_t = 300)]
        ticks: usize,
    },
    /// Manage stored projects
    Project {
        #[command(subcommand)]
        action: ProjectAction,
    },
    /// Expand a node of a stored project with generated sub-entities
    Expand {
        project: String,
        node: String,
        /// Seed label (defaults to the node's label)
        #[arg(long)]
        label: Option<String>,
    },
    /// Remove a node and its links from a stored project
    Remove { project: String, node: String },
    /// Re-extract a stored project's graph from its document
    Regenerate {
        project: String,
        /// Document to extract from (defaults to the project's document)
        #[arg(long)]
        document: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum ProjectAction {
    /// Create a new project
    Create {
        #[arg(long)]
        owner: String,
        #[arg(long)]
        title: String,
        /// Generated report to attach
        #[arg(long)]
        document: Option<PathBuf>,
        /// Initial graph JSON
        #[arg(long)]
        graph: Option<PathBuf>,
    },
    /// List an owner's projects, newest first
    List {
        #[arg(long)]
        owner: String,
    },
    /// Print a project as JSON
    Show { id: String },
    /// Delete a project
    Delete { id: String },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn read_graph_file(path: &Path) -> Result<Graph, String> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read '{}': {}", path.display(), e))?;
    let raw: serde_json::Value =
        serde_json::from_str(&text)
            .map_err(|e| format!("invalid JSON in '{}': {}", path.display(), e))?;
    Ok(Graph::validate(&raw))
}

fn print_json<T: serde::Serialize>(value: &T) -> i32 {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{}", json);
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn open_store(config: &Config) -> Result<Arc<SqliteStore>, String> {
    let db_path = config.storage.resolved_db_path();
    SqliteStore::open(&db_path)
        .map(Arc::new)
        .map_err(|e| format!("Failed to open database at {}: {}", db_path.display(), e))
}

fn cmd_parse(parent: &str) -> i32 {
    let mut text = String::new();
    if let Err(e) = std::io::stdin().read_to_string(&mut text) {
        eprintln!("Error: cannot read stdin: {}", e);
        return 1;
    }
    print_json(&parse_entities(&NodeId::from(parent), &text))
}

fn cmd_validate(file: &Path) -> i32 {
    match read_graph_file(file) {
        Ok(graph) => print_json(&graph),
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn cmd_layout(config: &Config, file: &Path, ticks: usize) -> i32 {
    let graph = match read_graph_file(file) {
        Ok(graph) => graph,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    let mut engine = LayoutEngine::with_graph(config.layout.clone(), &graph);
    let ran = engine.run_until_settled(ticks);
    tracing::info!(ticks = ran, settled = !engine.simulation().is_active(), "layout finished");
    print_json(&engine.positions())
}

fn cmd_project(store: &SqliteStore, action: ProjectAction) -> i32 {
    match action {
        ProjectAction::Create {
            owner,
            title,
            document,
            graph,
        } => {
            let mut project = NewProject::new(owner, title);
            if let Some(path) = document {
                match std::fs::read_to_string(&path) {
                    Ok(text) => project = project.with_document(text),
                    Err(e) => {
                        eprintln!("Error: cannot read '{}': {}", path.display(), e);
                        return 1;
                    }
                }
            }
            if let Some(path) = graph {
                match read_graph_file(&path) {
                    Ok(graph) => project = project.with_graph(graph),
                    Err(e) => {
                        eprintln!("Error: {}", e);
                        return 1;
                    }
                }
            }
            match store.create_project(project) {
                Ok(record) => {
                    println!("Created project '{}' ({})", record.title, record.id);
                    0
                }
                Err(e) => {
                    eprintln!("Error: {}", e);
                    1
                }
            }
        }
        ProjectAction::List { owner } => match store.list_projects(&owner) {
            Ok(projects) if projects.is_empty() => {
                println!("No projects for '{}'.", owner);
                0
            }
            Ok(projects) => {
                println!("{:<36}  {:<32}  {:>5}  {:<20}", "ID", "TITLE", "NODES", "CREATED");
                println!("{}", "-".repeat(99));
                for project in projects {
                    println!(
                        "{:<36}  {:<32}  {:>5}  {:<20}",
                        project.id,
                        project.title,
                        project.graph().node_count(),
                        project.created_at.format("%Y-%m-%d %H:%M:%S")
                    );
                }
                0
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                1
            }
        },
        ProjectAction::Show { id } => match store.get_project(&ProjectId::from(id.as_str())) {
            Ok(Some(record)) => print_json(&record),
            Ok(None) => {
                eprintln!("Error: project '{}' not found", id);
                1
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                1
            }
        },
        ProjectAction::Delete { id } => match store.delete_project(&ProjectId::from(id.as_str())) {
            Ok(true) => {
                println!("Deleted project '{}'", id);
                0
            }
            Ok(false) => {
                eprintln!("Error: project '{}' not found", id);
                1
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                1
            }
        },
    }
}

/// A session over a stored project, wired to the configured command
fn open_session(
    config: &Config,
    store: Arc<SqliteStore>,
    project: &str,
) -> Result<(MutationService, Arc<ChatLog>), String> {
    let (generator, extractor): (Arc<dyn EntityGenerator>, Arc<dyn GraphExtractor>) =
        match CommandClient::from_config(&config.generation) {
            Some(client) => {
                let client = Arc::new(client);
                (client.clone(), client)
            }
            None => (Arc::new(Unconfigured), Arc::new(Unconfigured)),
        };
    let notes = Arc::new(ChatLog::new());

    let service = MutationService::new(generator, extractor)
        .with_notifier(notes.clone())
        .with_persistence(PersistenceBridge::new(store));
    service
        .open_project(&ProjectId::from(project))
        .map_err(|e| e.to_string())?;
    Ok((service, notes))
}

async fn cmd_expand(
    config: &Config,
    store: Arc<SqliteStore>,
    project: &str,
    node: &str,
    label: Option<String>,
) -> i32 {
    let (service, notes) = match open_session(config, store, project) {
        Ok(session) => session,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    let node_id = NodeId::from(node);
    let label = match label.or_else(|| service.graph().node(&node_id).map(|n| n.label.clone())) {
        Some(label) => label,
        None => {
            eprintln!("Error: node '{}' not found", node);
            return 1;
        }
    };

    let result = service.expand(&node_id, &label).await;
    service.settle().await;
    match result {
        Ok(graph) => {
            for note in notes.messages() {
                tracing::info!(message = %note.message, "chat note");
            }
            print_json(&graph)
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

async fn cmd_remove(config: &Config, store: Arc<SqliteStore>, project: &str, node: &str) -> i32 {
    let (service, _notes) = match open_session(config, store, project) {
        Ok(session) => session,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    let graph = service.delete(&NodeId::from(node));
    service.settle().await;
    print_json(&graph)
}

async fn cmd_regenerate(
    config: &Config,
    store: Arc<SqliteStore>,
    project: &str,
    document: Option<PathBuf>,
) -> i32 {
    let document = match document {
        Some(path) => match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) => {
                eprintln!("Error: cannot read '{}': {}", path.display(), e);
                return 1;
            }
        },
        None => match store.get_project(&ProjectId::from(project)) {
            Ok(Some(record)) => match record.generated_document {
                Some(text) => text,
                None => {
                    eprintln!("Error: project '{}' has no document; pass --document", project);
                    return 1;
                }
            },
            Ok(None) => {
                eprintln!("Error: project '{}' not found", project);
                return 1;
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                return 1;
            }
        },
    };

    let (service, _notes) = match open_session(config, store, project) {
        Ok(session) => session,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    let result = service.regenerate(&document).await;
    service.settle().await;
    match result {
        Ok(graph) => print_json(&graph),
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn run(cli: Cli) -> i32 {
    let mut config = match Config::load_or_default(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    if let Some(db) = cli.db {
        config.storage.db_path = Some(db);
    }

    match cli.command {
        Commands::Parse { parent } => cmd_parse(&parent),
        Commands::Validate { file } => cmd_validate(&file),
        Commands::Layout { file, ticks } => cmd_layout(&config, &file, ticks),
        Commands::Project { action } => match open_store(&config) {
            Ok(store) => cmd_project(&store, action),
            Err(e) => {
                eprintln!("Error: {}", e);
                1
            }
        },
        Commands::Expand {
            project,
            node,
            label,
        } => with_runtime(&config, |rt, store| {
            rt.block_on(cmd_expand(&config, store, &project, &node, label))
        }),
        Commands::Remove { project, node } => with_runtime(&config, |rt, store| {
            rt.block_on(cmd_remove(&config, store, &project, &node))
        }),
        Commands::Regenerate { project, document } => with_runtime(&config, |rt, store| {
            rt.block_on(cmd_regenerate(&config, store, &project, document))
        }),
    }
}

/// Open the store and a runtime, then run `f`
fn with_runtime<F>(config: &Config, f: F) -> i32
where
    F: FnOnce(&tokio::runtime::Runtime, Arc<SqliteStore>) -> i32,
{
    let store = match open_store(config) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("failed to create tokio runtime: {}", e);
            return 1;
        }
    };
    f(&rt, store)
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    std::process::exit(run(cli));
}
