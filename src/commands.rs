use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::cli::{
    Cli, Commands, ConfigCommand, DownloadArgs, ImportArgs, ModInputs, ProfileCommand,
    SearchArgs, TargetArgs,
};
use crate::core::downloader::Downloader;
use crate::core::error::{PackerError, PackerResult};
use crate::core::http::build_http_client;
use crate::core::mods::ModTarget;
use crate::core::pool::WorkerPool;
use crate::core::profile::import_from_folder;
use crate::core::rate_limit::RateLimiter;
use crate::core::registry::RegistryClient;
use crate::core::session::{Session, SessionEvent};
use crate::core::state::{AppState, Settings};

pub async fn dispatch(cli: Cli) -> PackerResult<()> {
    let mut state = match cli.data_dir {
        Some(dir) => AppState::with_data_dir(dir),
        None => AppState::load(),
    };

    match cli.command {
        Commands::Search(args) => search(&state, args).await,
        Commands::Download(args) => download(&state, args).await,
        Commands::Profile { action } => profile(&state, action).await,
        Commands::Import(args) => import(&state, args).await,
        Commands::Config { action } => config(&mut state, action),
    }
}

async fn search(state: &AppState, args: SearchArgs) -> PackerResult<()> {
    let names = collect_names(state, &args.inputs).await?;
    let Run {
        mut session,
        reporter,
    } = Run::start(&state.settings, &args.target)?;

    session.search(names).await;
    drop(session);
    reporter.finish().await;
    Ok(())
}

async fn download(state: &AppState, args: DownloadArgs) -> PackerResult<()> {
    let names = collect_names(state, &args.inputs).await?;
    let dest = args
        .dest
        .unwrap_or_else(|| state.settings.download_dir.clone());
    let Run {
        mut session,
        reporter,
    } = Run::start(&state.settings, &args.target)?;

    session.search(names).await;
    if args.retry_not_found && !session.not_found().is_empty() {
        info!("Retrying {} names that were not found", session.not_found().len());
        session.research_not_found().await;
    }

    let summary = session.download_all(&dest).await;
    drop(session);
    reporter.finish().await;

    println!(
        "{} downloaded, {} already present, {} failed -> {}",
        summary.downloaded.len(),
        summary.skipped,
        summary.failed.len(),
        dest.display()
    );
    if summary.failed.is_empty() {
        Ok(())
    } else {
        Err(PackerError::Other(format!(
            "{} downloads failed",
            summary.failed.len()
        )))
    }
}

async fn profile(state: &AppState, action: ProfileCommand) -> PackerResult<()> {
    match action {
        ProfileCommand::List => {
            for name in state.profiles.list().await? {
                println!("{name}");
            }
        }
        ProfileCommand::Show { name } => {
            for mod_name in state.profiles.load(&name).await? {
                println!("{mod_name}");
            }
        }
        ProfileCommand::Save { name, inputs } => {
            let names = collect_names(state, &inputs).await?;
            state.profiles.save(&name, &names).await?;
            println!("Saved {} names to profile '{}'", names.len(), name);
        }
        ProfileCommand::Delete { name } => {
            state.profiles.delete(&name).await?;
            println!("Deleted profile '{name}'");
        }
    }
    Ok(())
}

async fn import(state: &AppState, args: ImportArgs) -> PackerResult<()> {
    let names = import_from_folder(&args.folder).await?;
    info!("Imported {} mod names from {:?}", names.len(), args.folder);

    for name in &names {
        println!("{name}");
    }
    if let Some(profile) = args.save_as {
        state.profiles.save(&profile, &names).await?;
        println!("Saved {} names to profile '{}'", names.len(), profile);
    }
    Ok(())
}

fn config(state: &mut AppState, action: ConfigCommand) -> PackerResult<()> {
    match action {
        ConfigCommand::Show => {
            println!("data_dir = {}", state.data_dir.display());
            for key in Settings::KEYS {
                if let Some(value) = state.settings.get(key) {
                    println!("{key} = {value}");
                }
            }
        }
        ConfigCommand::Set { key, value } => {
            state.settings.set(&key, &value)?;
            state.save_settings()?;
            println!("{key} = {}", state.settings.get(&key).unwrap_or(value));
        }
    }
    Ok(())
}

/// Merge the positional names, `--file` and `--profile` into one batch.
async fn collect_names(state: &AppState, inputs: &ModInputs) -> PackerResult<Vec<String>> {
    let mut names: Vec<String> = inputs.names.clone();

    if let Some(file) = &inputs.file {
        names.extend(read_name_file(file).await?);
    }
    if let Some(profile) = &inputs.profile {
        names.extend(state.profiles.load(profile).await?);
    }

    names.retain(|name| !name.trim().is_empty());
    if names.is_empty() {
        return Err(PackerError::Other(
            "no mod names given (pass names, --file or --profile)".into(),
        ));
    }
    Ok(names)
}

async fn read_name_file(path: &Path) -> PackerResult<Vec<String>> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| PackerError::io(path, e))?;
    Ok(raw
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

/// Settings with the per-invocation overrides applied.
fn effective_settings(settings: &Settings, overrides: &TargetArgs) -> Settings {
    let mut effective = settings.clone();
    if let Some(loader) = overrides.loader {
        effective.loader = loader;
    }
    if let Some(version) = &overrides.game_version {
        effective.game_version = version.clone();
    }
    if let Some(threads) = overrides.threads {
        effective.max_threads = threads;
    }
    if let Some(rate) = overrides.rate {
        effective.calls_per_minute = rate;
    }
    effective
}

/// One engine run: a session wired to the live registry plus the task
/// printing its events.
struct Run {
    session: Session,
    reporter: Reporter,
}

impl Run {
    fn start(settings: &Settings, overrides: &TargetArgs) -> PackerResult<Self> {
        let settings = effective_settings(settings, overrides);
        let target: ModTarget = settings.target();
        info!(
            "Target {} {} with {} workers at {} calls/min",
            target.loader, target.game_version, settings.max_threads, settings.calls_per_minute
        );

        let client = build_http_client()?;
        let cancel = CancellationToken::new();
        let registry = Arc::new(RegistryClient::new(
            settings.registry_base_url.clone(),
            client.clone(),
            Arc::new(RateLimiter::new(settings.calls_per_minute)),
            cancel.clone(),
        ));
        let downloader = Arc::new(Downloader::new(client));

        let (tx, rx) = mpsc::unbounded_channel();
        let session = Session::new(
            registry,
            downloader,
            WorkerPool::new(settings.max_threads),
            target,
            cancel.clone(),
            tx,
        );

        Ok(Self {
            session,
            reporter: Reporter::spawn(rx, cancel),
        })
    }
}

/// Prints session events until the session is dropped, and cancels the run
/// on Ctrl-C.
struct Reporter {
    printer: tokio::task::JoinHandle<()>,
    interrupt: tokio::task::JoinHandle<()>,
}

impl Reporter {
    fn spawn(mut rx: mpsc::UnboundedReceiver<SessionEvent>, cancel: CancellationToken) -> Self {
        let printer = tokio::spawn(async move {
            let mut console = ConsoleLines::default();
            while let Some(event) = rx.recv().await {
                if let Some(line) = console.line_for(&event) {
                    println!("{line}");
                }
            }
        });

        let interrupt = tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted, cancelling outstanding work");
                cancel.cancel();
            }
        });

        Self { printer, interrupt }
    }

    async fn finish(self) {
        self.interrupt.abort();
        if let Err(e) = self.printer.await {
            warn!("Event printer stopped: {}", e);
        }
    }
}

/// Turns events into console lines. Progress is printed in 10% steps and
/// only when the size of the transfer is known.
#[derive(Default)]
struct ConsoleLines {
    names: HashMap<String, String>,
    last_percent: HashMap<String, u64>,
}

impl ConsoleLines {
    fn name_of<'a>(&'a self, project_id: &'a str) -> &'a str {
        self.names
            .get(project_id)
            .map(String::as_str)
            .unwrap_or(project_id)
    }

    fn line_for(&mut self, event: &SessionEvent) -> Option<String> {
        match event {
            SessionEvent::ModFound { item, status, .. } => {
                self.names
                    .insert(item.project_id.clone(), item.display_name.clone());
                let query = if item.original_query.is_empty() {
                    item.display_name.as_str()
                } else {
                    item.original_query.as_str()
                };
                Some(format!(
                    "  found     {} -> {} [{}] {}",
                    query, item.display_name, item.filename, status
                ))
            }
            SessionEvent::ModNotFound { name } => Some(format!("  missing   {name}")),
            SessionEvent::SearchComplete { found, total } => {
                Some(format!("Search complete. Found {found} of {total} mods."))
            }
            SessionEvent::ResolutionFinished { queue } => {
                for item in queue {
                    self.names
                        .entry(item.project_id.clone())
                        .or_insert_with(|| item.display_name.clone());
                }
                Some(format!("Download queue: {} files", queue.len()))
            }
            SessionEvent::DownloadProgress {
                project_id,
                received,
                total: Some(total),
            } if *total > 0 => {
                let percent = (received.saturating_mul(100) / total).min(100);
                let step = percent / 10 * 10;
                let last = self.last_percent.insert(project_id.clone(), step);
                if last == Some(step) {
                    return None;
                }
                Some(format!("  {:>3}%     {}", step, self.name_of(project_id)))
            }
            SessionEvent::DownloadProgress { .. } => None,
            SessionEvent::DownloadComplete { project_id, error } => {
                self.last_percent.remove(project_id);
                Some(match error {
                    None => format!("  done      {}", self.name_of(project_id)),
                    Some(e) => format!("  failed    {}: {}", self.name_of(project_id), e),
                })
            }
            SessionEvent::AllDownloadsComplete => Some("All downloads completed.".to_string()),
        }
    }
}
