//! Photos Migrator - move staged photos into a photo library and back
//!
//! A CLI for managing album folders, migrating them into the on-disk
//! photo library and organizing library albums into collections.

use anyhow::Result;
use chrono::Local;
use clap::Parser;
use photos_migrator::catalog::{FileCatalog, Folder, FolderCatalog, Listed};
use photos_migrator::cli::{AlbumsCommand, CollectionsCommand, Command, FilesCommand, LibraryCommand};
use photos_migrator::error::LogicError;
use photos_migrator::library::{AlbumFilter, AuthorizationStatus, Collection};
use photos_migrator::migrate::{self, ExportOutcome, ExportStatus, ImportStatus, Job, JobOutcome, Stage};
use photos_migrator::{
    Cli, Config, LocalFileStore, LocalLibrary, MigrationEvent, MigrationWorker, Notice, PhotoLibrary,
    init_locale, reorganize,
};
use std::path::{Path, PathBuf};
use tracing::{Level, error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, Layer, fmt, prelude::*};

// Initialize i18n for this binary
rust_i18n::i18n!("locales", fallback = "en");

// CLI Output Module
mod cli_output {
    //! Colored terminal output shared by all commands

    use crossterm::{
        ExecutableCommand, cursor,
        style::{Color, Print, Stylize, style},
        terminal::{Clear, ClearType},
    };
    use photos_migrator::{Notice, NoticeLevel};
    use std::io::{Write, stdin, stdout};

    pub struct CliTheme;

    impl CliTheme {
        pub const SUCCESS: Color = Color::Green;
        pub const WARNING: Color = Color::Yellow;
        pub const ERROR: Color = Color::Red;
        pub const HINT: Color = Color::DarkGrey;
        pub const ACCENT: Color = Color::Cyan;
    }

    pub fn print_separator() {
        let _ = stdout().execute(Print(&format!("{}\n", "─".repeat(60))));
    }

    pub fn print_title(title: &str) {
        let _ = stdout().execute(Print(style(title).bold()));
        let _ = stdout().execute(Print("\n"));
        print_separator();
    }

    pub fn print_success(msg: &str) {
        let _ = stdout().execute(Print(style("✓ ").with(CliTheme::SUCCESS).bold()));
        let _ = stdout().execute(Print(format!("{}\n", msg)));
    }

    pub fn print_warning(msg: &str) {
        let _ = stdout().execute(Print(style("⚠ ").with(CliTheme::WARNING).bold()));
        let _ = stdout().execute(Print(format!("{}\n", msg)));
    }

    pub fn print_error(msg: &str) {
        let _ = stdout().execute(Print(style("✗ ").with(CliTheme::ERROR).bold()));
        let _ = stdout().execute(Print(format!("{}\n", msg)));
    }

    pub fn print_hint(msg: &str) {
        let _ = stdout().execute(Print(style("→ ").with(CliTheme::HINT)));
        let _ = stdout().execute(Print(format!("{}\n", msg)));
    }

    /// Print a title with an optional detail line underneath
    pub fn print_notice(notice: &Notice) {
        match notice.level {
            NoticeLevel::Success => print_success(&notice.title),
            NoticeLevel::Warning => print_warning(&notice.title),
            NoticeLevel::Error => print_error(&notice.title),
        }
        if let Some(message) = &notice.message {
            print_hint(message);
        }
    }

    pub fn print_stat(key: &str, value: &str, color: Color) {
        let key_styled = style(key).with(CliTheme::HINT);
        let value_styled = style(value).with(color).bold();
        let _ = stdout().execute(Print("  "));
        let _ = stdout().execute(Print(key_styled));
        let _ = stdout().execute(Print(": "));
        let _ = stdout().execute(Print(value_styled));
        let _ = stdout().execute(Print("\n"));
    }

    /// One listing row: icon, name, dimmed detail
    pub fn print_row(icon: &str, color: Color, name: &str, detail: &str) {
        let _ = stdout().execute(Print("  "));
        let _ = stdout().execute(Print(style(icon).with(color).bold()));
        let _ = stdout().execute(Print(" "));
        let _ = stdout().execute(Print(style(name).with(color)));
        let _ = stdout().execute(Print(" "));
        let _ = stdout().execute(Print(style(detail).with(CliTheme::HINT)));
        let _ = stdout().execute(Print("\n"));
    }

    /// Redraw the progress line in place
    pub fn print_progress(label: &str, completed: u64, total: u64) {
        const WIDTH: u64 = 30;
        let filled = (if total == 0 { WIDTH } else { completed * WIDTH / total }) as usize;
        let bar = format!("{}{}", "█".repeat(filled), "░".repeat(WIDTH as usize - filled));

        let mut out = stdout();
        let _ = out.execute(cursor::MoveToColumn(0));
        let _ = out.execute(Clear(ClearType::CurrentLine));
        let _ = out.execute(Print(style(label).with(CliTheme::HINT)));
        let _ = out.execute(Print(format!(" {} {}/{}", style(bar).with(CliTheme::ACCENT), completed, total)));
        let _ = out.flush();
    }

    pub fn finish_progress() {
        let _ = stdout().execute(Print("\n"));
    }

    /// Ask a yes/no question; anything but yes declines
    pub fn confirm(question: &str, yes: &str) -> bool {
        let _ = stdout().execute(Print(style(question).bold()));
        let _ = stdout().flush();

        let mut answer = String::new();
        if stdin().read_line(&mut answer).is_err() {
            return false;
        }
        let answer = answer.trim().to_lowercase();
        answer == "y" || answer == "yes" || answer == yes
    }

    pub fn print_log_path(label: &str, path: &str) {
        let _ = stdout().execute(Print("\n"));
        let _ = stdout().execute(Print(style("  📁 ").with(CliTheme::ACCENT)));
        let _ = stdout().execute(Print(style(format!("{}: ", label)).with(CliTheme::HINT)));
        let _ = stdout().execute(Print(format!("{}\n", path)));
    }
}

/// Convenience macro for translation
macro_rules! t {
    ($key:expr) => {
        rust_i18n::t!($key)
    };
    ($key:expr, $($tt:tt)*) => {
        rust_i18n::t!($key, $($tt)*)
    };
}

fn main() -> Result<()> {
    // Initialize locale based on system settings
    init_locale();

    let cli = Cli::parse();
    let exe_dir = get_executable_dir()?;
    let config = load_config(&cli, &exe_dir)?;

    let log_path = get_log_path(&config.log_dir, &cli);
    let guard = setup_logging(&cli, &config, &log_path)?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        command = cli.command_name(),
        "Photos Migrator starting"
    );
    if config.verbose {
        info!(?config, "Configuration loaded");
    }

    let succeeded = match run(&cli, &config) {
        Ok(succeeded) => succeeded,
        Err(e) => {
            error!(error = %e, "Command failed");
            match e.downcast_ref::<photos_migrator::Error>() {
                Some(err) => cli_output::print_notice(&Notice::from_error(err)),
                None => cli_output::print_error(&e.to_string()),
            }
            false
        }
    };

    if config.verbose {
        cli_output::print_log_path(&t!("log_file"), &log_path.display().to_string());
    }
    info!(succeeded, "Photos Migrator finished");

    // Flush the log file before leaving
    drop(guard);
    if !succeeded {
        std::process::exit(1);
    }
    Ok(())
}

/// Dispatch the subcommand; `false` means a failure was already reported
fn run(cli: &Cli, config: &Config) -> Result<bool> {
    let store = LocalFileStore::new();
    match &cli.command {
        Command::Init { path, force } => init_config(path, *force),
        Command::Albums(command) => run_albums(command, config, &store),
        Command::Files(command) => run_files(command, config, &store),
        Command::Import { album, yes } => run_import(album, *yes, config, store),
        Command::Export { album, yes } => run_export(album, *yes, config, store),
        Command::Library(command) => run_library(command, config),
        Command::Collections(command) => run_collections(command, config),
    }
}

fn init_config(path: &Path, force: bool) -> Result<bool> {
    if path.exists() && !force {
        anyhow::bail!("{} already exists, use --force to overwrite", path.display());
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, Config::sample_config())?;
    cli_output::print_success(&t!("config_written", path = path.display()));
    Ok(true)
}

fn run_albums(command: &AlbumsCommand, config: &Config, store: &LocalFileStore) -> Result<bool> {
    use cli_output::*;

    let folders = FolderCatalog::new(store, &config.albums_dir);
    folders.ensure_root()?;

    match command {
        AlbumsCommand::List => {
            let rows = folders.list()?;
            if rows.is_empty() {
                print_warning(&t!("no_albums_title"));
                print_hint(&t!("no_albums_hint"));
                return Ok(true);
            }

            print_title(&t!("albums_title"));
            let photos = t!("stat_photos");
            for row in &rows {
                match row {
                    Listed::Entry(folder) => {
                        let color = if folder.file_count == 0 {
                            CliTheme::HINT
                        } else {
                            CliTheme::ACCENT
                        };
                        print_row("▸", color, &folder.name, &format!("{}: {}", photos, folder.file_count));
                    }
                    Listed::Unreadable { path, .. } => print_unreadable(path),
                }
            }
            Ok(true)
        }
        AlbumsCommand::Create { name } => match folders.create(name) {
            Ok(folder) => {
                print_success(&t!("album_created", name = folder.name));
                Ok(true)
            }
            Err(e) => {
                warn!(album = %name, error = %e, "Album folder not created");
                print_error(&t!("cannot_create_album"));
                print_hint(&e.to_string());
                Ok(false)
            }
        },
        AlbumsCommand::Delete { name } => {
            let Some(folder) = find_folder(&folders, name)? else {
                return Ok(false);
            };
            match folders.delete(&folder) {
                Ok(()) => {
                    print_success(&t!("album_deleted", name = folder.name));
                    Ok(true)
                }
                Err(e) => {
                    print_error(&t!("album_not_deleted"));
                    print_hint(&e.to_string());
                    Ok(false)
                }
            }
        }
    }
}

fn run_files(command: &FilesCommand, config: &Config, store: &LocalFileStore) -> Result<bool> {
    use cli_output::*;

    let folders = FolderCatalog::new(store, &config.albums_dir);
    let album = match command {
        FilesCommand::List { album } | FilesCommand::Delete { album, .. } => album,
    };
    let Some(folder) = find_folder(&folders, album)? else {
        return Ok(false);
    };
    let files = FileCatalog::new(store, &folder.path);

    match command {
        FilesCommand::List { .. } => {
            let rows = files.list()?;
            if rows.is_empty() {
                print_warning(&t!("album_empty_title"));
                print_hint(&t!("album_empty_message"));
                return Ok(true);
            }

            print_title(&t!("files_title", album = folder.name));
            for row in &rows {
                match row {
                    Listed::Entry(file) => {
                        let color = if config.is_image_path(&file.path) {
                            CliTheme::ACCENT
                        } else {
                            CliTheme::WARNING
                        };
                        print_row("•", color, &file.name, &format_size(file.size));
                    }
                    Listed::Unreadable { path, .. } => print_unreadable(path),
                }
            }
            Ok(true)
        }
        FilesCommand::Delete { name, .. } => {
            let Some(file) = files.find(name)? else {
                print_error(&t!("photo_not_found", name = name));
                return Ok(false);
            };
            match files.delete(&file) {
                Ok(()) => {
                    print_success(&t!("photo_deleted", name = file.name));
                    Ok(true)
                }
                Err(e) => {
                    print_error(&t!("photo_not_deleted"));
                    print_hint(&e.to_string());
                    Ok(false)
                }
            }
        }
    }
}

fn run_import(album: &str, yes: bool, config: &Config, store: LocalFileStore) -> Result<bool> {
    use cli_output::*;

    let folders = FolderCatalog::new(&store, &config.albums_dir);
    let Some(folder) = find_folder(&folders, album)? else {
        return Ok(false);
    };

    let state = FileCatalog::new(&store, &folder.path).state()?;
    if !state.can_import() {
        print_warning(&t!("album_empty_title"));
        print_hint(&t!("album_empty_message"));
        return Ok(false);
    }

    let question = t!("confirm_import", count = folder.file_count, album = folder.name);
    if !confirmed(config, yes, &question) {
        return Ok(true);
    }

    let library = LocalLibrary::open(&config.library_dir, config)?;
    match run_job(library, store, Job::Import(folder.clone()))? {
        JobOutcome::Imported(report) => {
            print_notice(&Notice::import(&report, &folder.name));
            if config.verbose {
                for file in &report.remaining {
                    print_row("✗", CliTheme::ERROR, &file.name, "");
                }
            }
            Ok(report.status() == ImportStatus::Done)
        }
        JobOutcome::Exported(_) => Ok(false),
    }
}

fn run_export(album: &str, yes: bool, config: &Config, store: LocalFileStore) -> Result<bool> {
    use cli_output::*;

    let folders = FolderCatalog::new(&store, &config.albums_dir);
    let Some(folder) = find_folder(&folders, album)? else {
        return Ok(false);
    };

    let state = FileCatalog::new(&store, &folder.path).state()?;
    if !state.can_export() {
        print_warning(&t!("export_not_empty_title"));
        print_hint(&t!("export_not_empty_message"));
        return Ok(false);
    }

    let question = t!("confirm_export", album = folder.name);
    if !confirmed(config, yes, &question) {
        return Ok(true);
    }

    let library = LocalLibrary::open(&config.library_dir, config)?;
    match run_job(library, store, Job::Export(folder))? {
        JobOutcome::Exported(outcome) => {
            print_notice(&Notice::export(&outcome));
            Ok(matches!(
                outcome,
                ExportOutcome::Exported(ref report)
                    if report.status() == ExportStatus::Done && report.assets_deleted
            ))
        }
        JobOutcome::Imported(_) => Ok(false),
    }
}

/// Hand one job to the background worker and render its events
fn run_job(library: LocalLibrary, store: LocalFileStore, job: Job) -> Result<JobOutcome> {
    let (worker, events) = MigrationWorker::spawn(library, store)?;
    worker.submit(job)?;

    let mut label = String::new();
    let mut drawing = false;
    let mut finished = None;
    for event in events.iter() {
        match event {
            MigrationEvent::Started { folder } => {
                info!(folder = %folder.display(), "Migration started");
            }
            MigrationEvent::Stage { stage, .. } => {
                label = stage_label(stage);
            }
            MigrationEvent::Progress { progress, .. } => {
                cli_output::print_progress(&label, progress.completed, progress.total);
                drawing = true;
            }
            MigrationEvent::Finished { result, .. } => {
                finished = Some(result);
                break;
            }
        }
    }
    if drawing {
        cli_output::finish_progress();
    }
    worker.shutdown();

    match finished {
        Some(result) => Ok(result?),
        None => Err(photos_migrator::Error::from(LogicError::WorkerStopped).into()),
    }
}

fn stage_label(stage: Stage) -> String {
    match stage {
        Stage::ResolvingAlbum => t!("stage_resolving"),
        Stage::Transferring => t!("stage_transferring"),
        Stage::FetchingResources => t!("stage_fetching"),
        Stage::DeletingAssets => t!("stage_deleting"),
        Stage::Finalizing => t!("stage_finalizing"),
    }
    .into_owned()
}

fn run_library(command: &LibraryCommand, config: &Config) -> Result<bool> {
    use cli_output::*;

    let mut library = LocalLibrary::open(&config.library_dir, config)?;
    match command {
        LibraryCommand::Status => {
            let status = library.authorization_status();
            let (label, color) = match status {
                AuthorizationStatus::Authorized => (t!("status_authorized"), CliTheme::SUCCESS),
                AuthorizationStatus::Denied => (t!("status_denied"), CliTheme::ERROR),
                AuthorizationStatus::NotDetermined => (t!("status_not_determined"), CliTheme::WARNING),
            };
            print_stat(&t!("stat_library"), &library.root().display().to_string(), CliTheme::ACCENT);
            print_stat(&t!("stat_access"), &label, color);
            if status == AuthorizationStatus::Authorized {
                let albums = library.find_albums(&AlbumFilter::All)?.len();
                let collections = library.find_collections()?.len();
                print_stat(&t!("stat_albums"), &albums.to_string(), CliTheme::ACCENT);
                print_stat(&t!("collections_title"), &collections.to_string(), CliTheme::ACCENT);
            }
            Ok(true)
        }
        LibraryCommand::Grant => {
            library.set_authorization(AuthorizationStatus::Authorized)?;
            print_success(&t!("access_granted"));
            Ok(true)
        }
        LibraryCommand::Revoke => {
            library.set_authorization(AuthorizationStatus::Denied)?;
            print_warning(&t!("access_revoked"));
            Ok(true)
        }
        LibraryCommand::Albums => {
            migrate::ensure_authorized(&mut library)?;
            let albums = reorganize::movable_albums(&library)?;
            if albums.is_empty() {
                print_warning(&t!("no_albums_title"));
                return Ok(true);
            }
            print_title(&t!("library_albums_title"));
            let photos = t!("stat_photos");
            for album in &albums {
                print_row("▸", CliTheme::ACCENT, &album.title, &format!("{}: {}", photos, album.asset_count));
            }
            Ok(true)
        }
    }
}

fn run_collections(command: &CollectionsCommand, config: &Config) -> Result<bool> {
    use cli_output::*;

    let mut library = LocalLibrary::open(&config.library_dir, config)?;
    migrate::ensure_authorized(&mut library)?;

    match command {
        CollectionsCommand::List => {
            let collections = reorganize::list_collections(&library)?;
            if collections.is_empty() {
                print_warning(&t!("no_collections_title"));
                print_hint(&t!("no_collections_hint"));
                return Ok(true);
            }
            print_title(&t!("collections_title"));
            let albums = t!("stat_albums");
            for collection in &collections {
                print_row(
                    "▾",
                    CliTheme::ACCENT,
                    &collection.title,
                    &format!("{}: {}", albums, collection.album_count),
                );
            }
            Ok(true)
        }
        CollectionsCommand::Create { title } => {
            let collection = reorganize::create_collection(&mut library, title)?;
            print_success(&t!("collection_created", name = collection.title));
            Ok(true)
        }
        CollectionsCommand::Show { title } => {
            let Some(collection) = find_collection(&library, title)? else {
                return Ok(false);
            };
            let albums = reorganize::collection_albums(&library, &collection.id)?;
            print_title(&t!("collection_albums_title", collection = collection.title));
            let photos = t!("stat_photos");
            for album in &albums {
                print_row("▸", CliTheme::ACCENT, &album.title, &format!("{}: {}", photos, album.asset_count));
            }
            Ok(true)
        }
        CollectionsCommand::Move { collection, albums } => {
            let Some(collection) = find_collection(&library, collection)? else {
                return Ok(false);
            };

            let movable = reorganize::movable_albums(&library)?;
            let mut selected = Vec::with_capacity(albums.len());
            let mut unknown = Vec::new();
            for title in albums {
                match migrate::resolve(title, &movable) {
                    Some(album) if !selected.contains(&album.id) => selected.push(album.id.clone()),
                    Some(_) => {}
                    None => unknown.push(title.as_str()),
                }
            }
            if !unknown.is_empty() {
                print_error(&t!("add_albums_failed"));
                print_hint(&t!("unknown_albums", names = unknown.join(", ")));
                return Ok(false);
            }

            match reorganize::move_albums(&mut library, &collection.id, &selected) {
                Ok(count) => {
                    print_success(&t!("albums_moved", count = count, collection = collection.title));
                    Ok(true)
                }
                Err(e) => {
                    print_error(&t!("add_albums_failed"));
                    print_hint(&e.to_string());
                    Ok(false)
                }
            }
        }
    }
}

fn confirmed(config: &Config, yes: bool, question: &str) -> bool {
    if yes || !config.confirm_before_migrating {
        return true;
    }
    if cli_output::confirm(question, &t!("answer_yes")) {
        return true;
    }
    info!("Migration cancelled by user");
    cli_output::print_warning(&t!("operation_cancelled"));
    false
}

fn find_folder(folders: &FolderCatalog<'_>, name: &str) -> Result<Option<Folder>> {
    let folder = folders.find(name)?;
    if folder.is_none() {
        cli_output::print_error(&t!("folder_not_found", name = name));
    }
    Ok(folder)
}

fn find_collection(library: &LocalLibrary, title: &str) -> Result<Option<Collection>> {
    let collection = reorganize::list_collections(library)?
        .into_iter()
        .find(|c| c.title == title);
    if collection.is_none() {
        cli_output::print_error(&t!("collection_not_found", name = title));
    }
    Ok(collection)
}

fn print_unreadable(path: &Path) {
    cli_output::print_row(
        "✗",
        cli_output::CliTheme::ERROR,
        &t!("unreadable_row", path = path.display()),
        "",
    );
}

fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", size, UNITS[unit])
    }
}

/// Get the directory where the executable is located
fn get_executable_dir() -> Result<PathBuf> {
    let exe_path = std::env::current_exe()?;
    Ok(exe_path
        .parent()
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".")))
}

/// Log file path: per config name when one is given, else per command
fn get_log_path(log_dir: &Path, cli: &Cli) -> PathBuf {
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");

    if let Some(config_name) = cli.config_name() {
        log_dir
            .join(&config_name)
            .join(format!("{}_{}_{}.log", config_name, cli.command_name(), timestamp))
    } else {
        log_dir.join(format!("{}_{}.log", cli.command_name(), timestamp))
    }
}

/// Resolve config path - supports shorthand syntax
fn resolve_config_path(exe_dir: &Path, config_path: &Path) -> PathBuf {
    if config_path.exists() {
        return config_path.to_path_buf();
    }

    let with_extension = if config_path.extension().is_none() {
        config_path.with_extension("toml")
    } else {
        config_path.to_path_buf()
    };

    if with_extension.exists() {
        return with_extension;
    }

    let config_dir = exe_dir.join("Config");
    let filename = config_path.file_name().unwrap_or(config_path.as_os_str());

    let mut in_config_dir = config_dir.join(filename);
    if in_config_dir.extension().is_none() {
        in_config_dir = in_config_dir.with_extension("toml");
    }

    if in_config_dir.exists() {
        return in_config_dir;
    }

    config_path.to_path_buf()
}

/// Load configuration from file, then apply CLI overrides
fn load_config(cli: &Cli, exe_dir: &Path) -> Result<Config> {
    let config = match cli.config {
        Some(ref config_path) => {
            let resolved_path = resolve_config_path(exe_dir, config_path);
            Config::load_from_file(&resolved_path)?
        }
        None => Config::default(),
    };

    Ok(cli.merge_with_config(config))
}

/// Setup logging (file + console)
fn setup_logging(cli: &Cli, config: &Config, log_path: &Path) -> Result<WorkerGuard> {
    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(log_path)?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);
    let subscriber = build_subscriber(cli.json_log, log_level(config), non_blocking);
    tracing::subscriber::set_global_default(subscriber)?;

    Ok(guard)
}

/// Default level; `verbose` from either the config file or the CLI enables DEBUG
fn log_level(config: &Config) -> Level {
    if config.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    }
}

/// File layer (plain or JSON) plus a warnings-only console layer
fn build_subscriber<W>(json: bool, level: Level, writer: W) -> Box<dyn tracing::Subscriber + Send + Sync>
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let env_filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();
    let subscriber = tracing_subscriber::registry().with(env_filter);

    if json {
        Box::new(
            subscriber
                .with(fmt::layer().json().with_ansi(false).with_writer(writer))
                .with(console_layer()),
        )
    } else {
        Box::new(
            subscriber
                .with(fmt::layer().with_ansi(false).with_writer(writer))
                .with(console_layer()),
        )
    }
}

/// Console gets warnings only
fn console_layer<S>() -> impl Layer<S>
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(LevelFilter::WARN)
}
