use clap::{ArgGroup, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::OnceLock;

/// "0.3.0" for releases, "0.3.0@abc1234 2024-01-15 14:30" for dev builds.
fn get_version() -> &'static str {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const GIT_HASH: &str = env!("GIT_HASH");
    const GIT_COMMIT_DATE: &str = env!("GIT_COMMIT_DATE");
    const IS_RELEASE: &str = env!("IS_RELEASE");

    static VERSION_STRING: OnceLock<String> = OnceLock::new();
    VERSION_STRING.get_or_init(|| {
        if IS_RELEASE == "true" || GIT_HASH.is_empty() {
            VERSION.to_string()
        } else {
            format!("{}@{} {}", VERSION, GIT_HASH, GIT_COMMIT_DATE)
        }
    })
}

#[derive(Parser, Debug)]
#[command(name = "bd-artifactory")]
#[command(about = "Manage Black Duck properties on Artifactory items", long_about = None)]
#[command(version = get_version())]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (TOML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the Black Duck property vocabulary
    #[command(alias = "vocab")]
    Vocabulary,

    /// Check whether an item carries a property
    Has {
        /// Repository path, e.g. libs-release/com/acme/app-1.0.jar
        path: String,
        /// Property name or key (e.g. blackduck.projectName or projectName)
        property: String,
    },

    /// Print a property value
    Get { path: String, property: String },

    /// Print a property value as an integer
    GetInt { path: String, property: String },

    /// Print a date property in the configured pattern
    GetDate { path: String, property: String },

    /// Set a property value
    Set {
        path: String,
        property: String,
        value: String,
    },

    /// Set a date property (and its converted companion)
    SetDate {
        path: String,
        property: String,
        /// Date in the configured pattern; defaults to now
        #[arg(long)]
        date: Option<String>,
    },

    /// Delete a property and its companion
    #[command(alias = "rm")]
    Delete { path: String, property: String },

    /// Find items in a repository carrying any of the properties
    Find {
        repo: String,
        #[arg(required = true, num_args = 1..)]
        properties: Vec<String>,
    },

    /// Find items by property values (wildcards * and ? allowed)
    Search {
        /// Repository key (repeatable)
        #[arg(long = "repo", required = true)]
        repos: Vec<String>,
        /// Property filter as name=value (repeatable)
        #[arg(long = "prop", required = true)]
        props: Vec<String>,
    },

    /// Decide whether an item needs a (re)scan
    ShouldScan {
        path: String,
        /// Last modification time in the configured pattern
        #[arg(long)]
        last_modified: String,
    },

    /// Print the project name and version of an item
    Project { path: String },

    /// Remove Black Duck properties from a repository or a single item
    #[command(group(ArgGroup::new("target").required(true).args(["repo", "path"])))]
    Cleanup {
        #[arg(long)]
        repo: Option<String>,
        #[arg(long)]
        path: Option<String>,
        /// Property to keep (repeatable)
        #[arg(long)]
        keep: Vec<String>,
    },

    /// Copy Black Duck component metadata onto matching items
    Populate {
        #[arg(long)]
        repo: String,
        /// JSON array of artifact metadata
        #[arg(long)]
        metadata: PathBuf,
    },

    /// Manage repository configuration (requires an Artifactory URL)
    Repo {
        #[command(subcommand)]
        action: RepoCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum RepoCommands {
    /// Create a repository
    Create {
        key: String,
        #[arg(long = "type", value_enum, default_value_t = RepoClass::Local)]
        class: RepoClass,
        #[arg(long, default_value = "generic")]
        package_type: String,
        /// Remote URL (remote repositories)
        #[arg(long)]
        url: Option<String>,
        #[arg(long)]
        layout: Option<String>,
        #[arg(long)]
        external_dependencies: bool,
    },

    /// Print a repository configuration as JSON
    Get { key: String },

    /// Delete a repository
    Delete { key: String },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum RepoClass {
    Local,
    Remote,
    Virtual,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn cleanup_requires_a_target() {
        assert!(Cli::try_parse_from(["bd-artifactory", "cleanup"]).is_err());
        assert!(
            Cli::try_parse_from(["bd-artifactory", "cleanup", "--repo", "a", "--path", "a/b"])
                .is_err()
        );
        let cli = Cli::try_parse_from([
            "bd-artifactory",
            "cleanup",
            "--repo",
            "libs",
            "--keep",
            "projectName",
            "--keep",
            "forge",
        ])
        .unwrap();
        match cli.command {
            Commands::Cleanup { repo, path, keep } => {
                assert_eq!(repo.as_deref(), Some("libs"));
                assert!(path.is_none());
                assert_eq!(keep, vec!["projectName", "forge"]);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn repo_create_defaults() {
        let cli = Cli::try_parse_from(["bd-artifactory", "repo", "create", "libs"]).unwrap();
        match cli.command {
            Commands::Repo {
                action:
                    RepoCommands::Create {
                        key,
                        class,
                        package_type,
                        ..
                    },
            } => {
                assert_eq!(key, "libs");
                assert_eq!(class, RepoClass::Local);
                assert_eq!(package_type, "generic");
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
