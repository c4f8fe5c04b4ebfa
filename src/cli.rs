//! CLI argument parsing with clap

use crate::config::Config;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Photos Migrator - move staged photos into a photo library and back
///
/// Album folders hold photos as plain files. Importing a folder moves its
/// photos into the library album with the same name; exporting writes the
/// album's photos back into the folder and removes them from the library.
#[derive(Parser, Debug)]
#[command(name = "photos-migrator")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to configuration file (TOML format)
    ///
    /// When specified, settings from the config file are used as defaults.
    /// CLI arguments will override config file settings.
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding the album folders
    #[arg(long, global = true, env = "PHOTOS_MIGRATOR_ALBUMS")]
    pub albums_dir: Option<PathBuf>,

    /// Directory of the photo library
    #[arg(long, global = true, env = "PHOTOS_MIGRATOR_LIBRARY")]
    pub library_dir: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output log format as JSON
    #[arg(long, global = true)]
    pub json_log: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Write a sample configuration file
    Init {
        #[arg(default_value = "photos-migrator.toml")]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Manage album folders
    #[command(subcommand)]
    Albums(AlbumsCommand),

    /// Manage the photos staged in an album folder
    #[command(subcommand)]
    Files(FilesCommand),

    /// Move the photos of an album folder into the library
    Import {
        album: String,

        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Move the photos of a library album into its empty folder
    Export {
        album: String,

        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Inspect the photo library and its access authorization
    #[command(subcommand)]
    Library(LibraryCommand),

    /// Organize library albums into collections
    #[command(subcommand)]
    Collections(CollectionsCommand),
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum AlbumsCommand {
    /// List album folders
    List,
    /// Create an album folder
    Create { name: String },
    /// Delete an album folder and everything in it
    Delete { name: String },
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum FilesCommand {
    /// List the photos in an album folder
    List { album: String },
    /// Delete one photo from an album folder
    Delete { album: String, name: String },
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum LibraryCommand {
    /// Show authorization and library contents
    Status,
    /// Grant access to the library
    Grant,
    /// Revoke access to the library
    Revoke,
    /// List top-level library albums
    Albums,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum CollectionsCommand {
    /// List collections
    List,
    /// Create a collection
    Create { title: String },
    /// List the albums inside a collection
    Show { title: String },
    /// Move top-level albums into a collection
    Move {
        collection: String,

        #[arg(required = true)]
        albums: Vec<String>,
    },
}

impl Cli {
    /// Get config file name (without extension) for log naming
    pub fn config_name(&self) -> Option<String> {
        self.config.as_ref().and_then(|p| {
            p.file_stem()
                .and_then(|s| s.to_str())
                .map(|s| s.to_string())
        })
    }

    /// Short name of the subcommand, used for log file names
    pub fn command_name(&self) -> &'static str {
        match self.command {
            Command::Init { .. } => "Init",
            Command::Albums(_) => "Albums",
            Command::Files(_) => "Files",
            Command::Import { .. } => "Import",
            Command::Export { .. } => "Export",
            Command::Library(_) => "Library",
            Command::Collections(_) => "Collections",
        }
    }

    /// Merge CLI arguments with config from file
    /// CLI arguments take precedence over config file settings
    pub fn merge_with_config(&self, mut config: Config) -> Config {
        if let Some(ref albums_dir) = self.albums_dir {
            config.albums_dir = albums_dir.clone();
        }
        if let Some(ref library_dir) = self.library_dir {
            config.library_dir = library_dir.clone();
        }
        if self.verbose {
            config.verbose = true;
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_import_with_global_flags() {
        let cli = Cli::try_parse_from([
            "photos-migrator",
            "import",
            "Trip",
            "--yes",
            "--verbose",
            "--library-dir",
            "/tmp/lib",
        ])
        .unwrap();

        assert_eq!(
            cli.command,
            Command::Import {
                album: "Trip".into(),
                yes: true
            }
        );
        assert_eq!(cli.command_name(), "Import");

        let config = cli.merge_with_config(Config::default());
        assert!(config.verbose);
        assert_eq!(config.library_dir, PathBuf::from("/tmp/lib"));
        assert_eq!(config.albums_dir, PathBuf::from("Albums"));
    }

    #[test]
    fn test_parse_nested_commands() {
        let cli = Cli::try_parse_from(["photos-migrator", "collections", "move", "Holidays", "Trip", "Beach"])
            .unwrap();
        assert_eq!(
            cli.command,
            Command::Collections(CollectionsCommand::Move {
                collection: "Holidays".into(),
                albums: vec!["Trip".into(), "Beach".into()],
            })
        );

        assert!(Cli::try_parse_from(["photos-migrator", "collections", "move", "Holidays"]).is_err());
        assert!(Cli::try_parse_from(["photos-migrator", "files", "delete", "Trip"]).is_err());
    }

    #[test]
    fn test_config_name() {
        let cli = Cli::try_parse_from(["photos-migrator", "-C", "conf/home.toml", "albums", "list"]).unwrap();
        assert_eq!(cli.config_name().as_deref(), Some("home"));
        assert_eq!(cli.command, Command::Albums(AlbumsCommand::List));
    }
}
