use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::sync::Arc;

use board::color::contrast_color;
use board::consts::{COLOR_PALETTE, IMAGE_COLOR};
use board::element::{ElementId, ElementKind, ElementPatch, parse_snapshot};
use board::input::{HitTarget, PointerSample};
use board::session::{Action, BoardSession};
use clap::{Args, Parser, Subcommand};
use rand::Rng;
use serde_json::{Map, Value};
use store::memory::MemoryStore;
use store::rest::RestStore;
use store::{DocumentStore, StoreError, Subscription};
use tracing::warn;

const SPAWN_X: std::ops::Range<f64> = 100.0..400.0;
const SPAWN_Y: std::ops::Range<f64> = 100.0..300.0;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("--data must be a JSON object")]
    DataNotObject,
    #[error("cannot read {path}: {source}")]
    Input { path: String, source: io::Error },
    #[error("replay line {line}: {message}")]
    Replay { line: usize, message: String },
    #[error("no element with id {0} on this board")]
    UnknownElement(String),
}

#[derive(Parser, Debug)]
#[command(name = "snapboard", about = "SnapBoard shared-whiteboard CLI")]
struct Cli {
    /// Realtime database base URL.
    #[arg(long, env = "SNAPBOARD_STORE_URL", default_value = "http://127.0.0.1:9000")]
    store_url: String,

    /// Database auth token, sent as the `auth` query parameter.
    #[arg(long, env = "SNAPBOARD_AUTH")]
    auth: Option<String>,

    #[arg(long, env = "SNAPBOARD_USER", default_value = "demo")]
    user: String,

    #[arg(long, env = "SNAPBOARD_BOARD", default_value = "default")]
    board: String,

    /// Run against a fresh in-process store instead of a server.
    #[arg(long, default_value_t = false)]
    memory: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Follow the board and print the stacked element list on every change.
    Watch,
    /// Create an element with its kind's defaults.
    Add(AddArgs),
    /// Merge JSON fields into an element.
    Patch {
        id: String,
        /// Sparse update as a JSON object (geometry, color, payload fields).
        #[arg(long)]
        data: String,
    },
    /// Delete an element.
    Rm { id: String },
    /// Delete every element on the board.
    Clear,
    /// Lay the board out in rows, one kind per row.
    Arrange,
    /// Drive the gesture controller from a JSONL pointer-event script.
    Replay {
        /// Input file path, or - for stdin.
        #[arg(default_value = "-")]
        input: String,
    },
}

#[derive(Args, Debug)]
struct AddArgs {
    /// Element kind: formula, note, table, or image.
    kind: ElementKind,

    /// Left edge; random in [100, 400) when omitted.
    #[arg(long)]
    x: Option<f64>,

    /// Top edge; random in [100, 300) when omitted.
    #[arg(long)]
    y: Option<f64>,

    /// Background color; picked from the palette when omitted.
    #[arg(long)]
    color: Option<String>,

    /// Extra payload fields as a JSON object.
    #[arg(long)]
    data: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let store: Arc<dyn DocumentStore> = if cli.memory {
        Arc::new(MemoryStore::new())
    } else {
        Arc::new(RestStore::new(&cli.store_url, cli.auth.clone())?)
    };
    let base = elements_path(&cli.user, &cli.board);

    match cli.command {
        Command::Watch => run_watch(&store, &base).await,
        Command::Add(args) => run_add(&store, &base, args).await,
        Command::Patch { id, data } => run_patch(&store, &base, &id, &data).await,
        Command::Rm { id } => run_rm(&store, &base, &id).await,
        Command::Clear => run_clear(&store, &base).await,
        Command::Arrange => run_arrange(&store, &base).await,
        Command::Replay { input } => run_replay(&store, &base, &input).await,
    }
}

// =============================================================================
// COMMANDS
// =============================================================================

async fn run_watch(store: &Arc<dyn DocumentStore>, base: &str) -> Result<(), CliError> {
    let mut session = new_session(store, base);
    let mut sub = store.subscribe(base).await?;
    while let Some(snapshot) = sub.next().await {
        session.apply_remote_snapshot(parse_snapshot(&snapshot));
        render(&session);
    }
    Ok(())
}

async fn run_add(store: &Arc<dyn DocumentStore>, base: &str, args: AddArgs) -> Result<(), CliError> {
    let fields = match args.data {
        Some(raw) => parse_object(&raw)?,
        None => Map::new(),
    };
    let (x, y, color) = {
        let mut rng = rand::rng();
        (
            args.x.unwrap_or_else(|| rng.random_range(SPAWN_X)),
            args.y.unwrap_or_else(|| rng.random_range(SPAWN_Y)),
            args.color.unwrap_or_else(|| default_color(args.kind, &mut rng)),
        )
    };

    let mut session = new_session(store, base);
    let (id, action) = session.create_element(args.kind, x, y, color, fields);
    perform(store.as_ref(), base, action).await?;
    println!("{id}");
    Ok(())
}

async fn run_patch(
    store: &Arc<dyn DocumentStore>,
    base: &str,
    id: &str,
    data: &str,
) -> Result<(), CliError> {
    let patch: ElementPatch = serde_json::from_str(data)?;
    let (mut session, _sub) = load_session(store, base).await?;
    let id = id.to_string();
    let Some(action) = session.update_element(&id, patch) else {
        return Err(CliError::UnknownElement(id));
    };
    perform(store.as_ref(), base, action).await?;
    Ok(())
}

async fn run_rm(store: &Arc<dyn DocumentStore>, base: &str, id: &str) -> Result<(), CliError> {
    let (mut session, _sub) = load_session(store, base).await?;
    let id = id.to_string();
    let Some(action) = session.delete_element(&id) else {
        return Err(CliError::UnknownElement(id));
    };
    perform(store.as_ref(), base, action).await?;
    println!("deleted {id}");
    Ok(())
}

async fn run_clear(store: &Arc<dyn DocumentStore>, base: &str) -> Result<(), CliError> {
    let mut session = new_session(store, base);
    let action = session.clear_board();
    perform(store.as_ref(), base, action).await?;
    println!("cleared");
    Ok(())
}

async fn run_arrange(store: &Arc<dyn DocumentStore>, base: &str) -> Result<(), CliError> {
    let (mut session, _sub) = load_session(store, base).await?;
    let groups = kind_groups(&session);
    let actions = session.arrange_rows(&groups);
    let moved = actions.len();
    for action in actions {
        perform(store.as_ref(), base, action).await?;
    }
    println!("arranged {moved} element(s)");
    Ok(())
}

async fn run_replay(store: &Arc<dyn DocumentStore>, base: &str, input: &str) -> Result<(), CliError> {
    let (mut session, _sub) = load_session(store, base).await?;

    let reader: Box<dyn BufRead> = if input == "-" {
        Box::new(BufReader::new(io::stdin()))
    } else {
        let file = File::open(input).map_err(|source| CliError::Input {
            path: input.to_string(),
            source,
        })?;
        Box::new(BufReader::new(file))
    };

    let mut aliases: HashMap<String, String> = HashMap::new();
    let mut handles = Vec::new();
    let mut steps = 0_usize;
    let mut writes = 0_usize;

    for (index, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| CliError::Input {
            path: input.to_string(),
            source,
        })?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let step: ReplayStep = serde_json::from_str(trimmed).map_err(|error| CliError::Replay {
            line: index + 1,
            message: error.to_string(),
        })?;
        steps += 1;

        let mut actions: Vec<Action> = Vec::new();
        match step {
            ReplayStep::Create { kind, x, y, color, alias } => {
                let color = color.unwrap_or_else(|| {
                    let mut rng = rand::rng();
                    default_color(kind, &mut rng)
                });
                let (id, action) = session.create_element(kind, x, y, color, Map::new());
                if let Some(alias) = alias {
                    aliases.insert(alias, id.clone());
                }
                println!("created {id}");
                actions.push(action);
            }
            ReplayStep::Down { x, y, id, target } => {
                let id = aliases.get(&id).cloned().unwrap_or(id);
                session.pointer_down(PointerSample { x, y }, &id, target.into());
            }
            ReplayStep::Move { x, y } => session.pointer_move(PointerSample { x, y }),
            ReplayStep::Frame => actions.extend(session.frame_tick()),
            ReplayStep::Up => actions.extend(session.pointer_up()),
        }

        for action in actions {
            writes += 1;
            handles.push(dispatch(store, base, action));
        }
    }

    for handle in handles {
        if handle.await.is_err() {
            warn!("persist task aborted");
        }
    }
    render(&session);
    eprintln!("replay complete: steps={steps} writes={writes}");
    Ok(())
}

// =============================================================================
// REPLAY SCRIPT FORMAT
// =============================================================================

/// One line of a replay script: `{"event": "...", ...}`. Blank lines and
/// `#` comments are skipped by the reader.
#[derive(Debug, serde::Deserialize)]
#[serde(tag = "event", rename_all = "lowercase")]
enum ReplayStep {
    /// Create an element, optionally remembering its id under an alias that
    /// later steps can use in place of the generated id.
    Create {
        kind: ElementKind,
        x: f64,
        y: f64,
        color: Option<String>,
        #[serde(rename = "as")]
        alias: Option<String>,
    },
    Down {
        x: f64,
        y: f64,
        id: String,
        #[serde(default)]
        target: ReplayTarget,
    },
    Move {
        x: f64,
        y: f64,
    },
    Frame,
    Up,
}

#[derive(Debug, Default, Clone, Copy, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
enum ReplayTarget {
    #[default]
    Body,
    Handle,
    Control,
}

impl From<ReplayTarget> for HitTarget {
    fn from(target: ReplayTarget) -> Self {
        match target {
            ReplayTarget::Body => Self::Body,
            ReplayTarget::Handle => Self::ResizeHandle,
            ReplayTarget::Control => Self::Control,
        }
    }
}

// =============================================================================
// SESSION AND STORE PLUMBING
// =============================================================================

fn elements_path(user: &str, board: &str) -> String {
    format!("users/{user}/boards/{board}/elements")
}

fn new_session(store: &Arc<dyn DocumentStore>, base: &str) -> BoardSession {
    let ids = {
        let store = Arc::clone(store);
        let parent = base.to_string();
        move || store.generate_id(&parent)
    };
    BoardSession::new(Box::new(ids))
}

/// Session primed with the board's current remote state. The subscription is
/// returned alongside so callers can keep the feed alive or drop it.
async fn load_session(
    store: &Arc<dyn DocumentStore>,
    base: &str,
) -> Result<(BoardSession, Subscription), CliError> {
    let mut session = new_session(store, base);
    let mut sub = store.subscribe(base).await?;
    if let Some(snapshot) = sub.next().await {
        session.apply_remote_snapshot(parse_snapshot(&snapshot));
    }
    Ok((session, sub))
}

/// Element ids grouped by kind in a fixed row order. Kinds with no
/// elements are dropped so the arranged grid has no blank rows.
fn kind_groups(session: &BoardSession) -> Vec<Vec<ElementId>> {
    let order = [
        ElementKind::Formula,
        ElementKind::Note,
        ElementKind::Table,
        ElementKind::Image,
    ];
    let mut groups: Vec<Vec<ElementId>> = vec![Vec::new(); order.len()];
    for (element, _) in session.current_elements() {
        if let Some(slot) = order.iter().position(|&kind| kind == element.kind()) {
            groups[slot].push(element.id.clone());
        }
    }
    groups.retain(|group| !group.is_empty());
    groups
}

/// Perform one persist intent against the store.
async fn perform(store: &dyn DocumentStore, base: &str, action: Action) -> Result<(), CliError> {
    match action {
        Action::ElementCreated(element) => {
            let path = format!("{base}/{}", element.id);
            let value = serde_json::to_value(&element)?;
            store.write(&path, value).await?;
        }
        Action::ElementUpdated { id, fields } => {
            let path = format!("{base}/{id}");
            let fields = serde_json::to_value(&fields)?
                .as_object()
                .cloned()
                .unwrap_or_default();
            store.update(&path, fields).await?;
        }
        Action::ElementDeleted { id } => {
            store.delete(&format!("{base}/{id}")).await?;
        }
        Action::BoardCleared => {
            store.delete(base).await?;
        }
    }
    Ok(())
}

// Fire-and-forget persist: failures are reported, never propagated, and the
// optimistic session state stays as it is.
fn dispatch(store: &Arc<dyn DocumentStore>, base: &str, action: Action) -> tokio::task::JoinHandle<()> {
    let store = Arc::clone(store);
    let base = base.to_string();
    tokio::spawn(async move {
        if let Err(error) = perform(store.as_ref(), &base, action).await {
            warn!(error = %error, "persist failed; local state retained");
        }
    })
}

// =============================================================================
// OUTPUT
// =============================================================================

fn render(session: &BoardSession) {
    println!("-- {} element(s)", session.len());
    for (element, rank) in session.current_elements() {
        println!(
            "  [{rank}] {id} {kind} \"{title}\" ({x}, {y}) {width}x{height} {bg} on {fg}",
            id = element.id,
            kind = element.kind(),
            title = element.content.title(),
            x = element.x,
            y = element.y,
            width = element.width,
            height = element.height,
            bg = element.color,
            fg = contrast_color(&element.color),
        );
    }
}

fn default_color(kind: ElementKind, rng: &mut impl Rng) -> String {
    if kind == ElementKind::Image {
        return IMAGE_COLOR.to_string();
    }
    COLOR_PALETTE[rng.random_range(0..COLOR_PALETTE.len())].to_string()
}

fn parse_object(raw: &str) -> Result<Map<String, Value>, CliError> {
    let value: Value = serde_json::from_str(raw)?;
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(CliError::DataNotObject),
    }
}
