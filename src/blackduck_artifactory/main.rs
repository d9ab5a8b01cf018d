use blackduck_artifactory::artifactory::{
    ArtifactoryClient, ArtifactoryPropertyStore, RepositoriesApi, RepositoryConfiguration,
    RepositoryType,
};
use blackduck_artifactory::config::BlackDuckConfig;
use blackduck_artifactory::error::{BlackDuckError, Result};
use blackduck_artifactory::inspection::{populate_metadata_for_repo, ArtifactMetaData};
use blackduck_artifactory::logging::init_logging;
use blackduck_artifactory::model::{PropertyQuery, RepoPath};
use blackduck_artifactory::properties::vocabulary::find_in;
use blackduck_artifactory::properties::{
    CleanupParams, PropertyDefinition, PropertyService, EXCLUDED_PROPERTIES_PARAM,
};
use blackduck_artifactory::scan::should_scan_now;
use blackduck_artifactory::store::fs::FilePropertyStore;
use blackduck_artifactory::store::PropertyStore;
use chrono::Utc;
use clap::Parser;
use colored::*;
use std::fs;

mod args;
use args::{Cli, Commands, RepoClass, RepoCommands};

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = BlackDuckConfig::load(cli.config.as_deref())?;
    let level = if cli.verbose {
        "debug"
    } else {
        config.log_level.as_str()
    };
    init_logging(level)?;

    let date_time = config.date_time_manager()?;
    match config.artifactory_url() {
        Some(url) => {
            let store = ArtifactoryPropertyStore::new(artifactory_client(&config, url)?);
            dispatch(&PropertyService::new(store, date_time), &config, cli.command)
        }
        None => {
            let data_file = config.store_path().ok_or_else(|| {
                BlackDuckError::Store(
                    "could not determine a data directory; set store_file or BD_STORE_FILE"
                        .to_string(),
                )
            })?;
            let store = FilePropertyStore::new(data_file);
            dispatch(&PropertyService::new(store, date_time), &config, cli.command)
        }
    }
}

fn artifactory_client(config: &BlackDuckConfig, url: &str) -> Result<ArtifactoryClient> {
    let client = ArtifactoryClient::new(url)?;
    Ok(match &config.artifactory_username {
        Some(username) => client.with_basic_auth(username, config.artifactory_password.clone()),
        None => client,
    })
}

fn dispatch<S: PropertyStore>(
    service: &PropertyService<S>,
    config: &BlackDuckConfig,
    command: Commands,
) -> Result<()> {
    match command {
        Commands::Vocabulary => handle_vocabulary(service),
        Commands::Has { path, property } => {
            let present = service.has_property(&path.parse::<RepoPath>()?, definition(service, &property)?)?;
            println!("{}", present);
            Ok(())
        }
        Commands::Get { path, property } => {
            let value = service.get_property(&path.parse::<RepoPath>()?, definition(service, &property)?)?;
            print_optional(value);
            Ok(())
        }
        Commands::GetInt { path, property } => {
            let value =
                service.get_property_as_integer(&path.parse::<RepoPath>()?, definition(service, &property)?)?;
            print_optional(value);
            Ok(())
        }
        Commands::GetDate { path, property } => {
            let value =
                service.get_date_from_property(&path.parse::<RepoPath>()?, definition(service, &property)?)?;
            print_optional(value.map(|date| service.date_time().date_to_string(&date)));
            Ok(())
        }
        Commands::Set {
            path,
            property,
            value,
        } => {
            let path: RepoPath = path.parse()?;
            let definition = definition(service, &property)?;
            service.set_property(&path, definition, &value)?;
            print_success(&format!("Set {} on {}", definition.name, path));
            Ok(())
        }
        Commands::SetDate {
            path,
            property,
            date,
        } => {
            let path: RepoPath = path.parse()?;
            let definition = definition(service, &property)?;
            let date = match date {
                Some(value) => service.date_time().string_to_date(&value)?,
                None => Utc::now(),
            };
            service.set_property_from_date(&path, definition, &date)?;
            print_success(&format!(
                "Set {} to {} on {}",
                definition.name,
                service.date_time().date_to_string(&date),
                path
            ));
            Ok(())
        }
        Commands::Delete { path, property } => {
            let path: RepoPath = path.parse()?;
            let definition = definition(service, &property)?;
            service.delete_property(&path, definition)?;
            print_success(&format!("Removed {} from {}", definition.name, path));
            Ok(())
        }
        Commands::Find { repo, properties } => {
            let definitions = properties
                .iter()
                .map(|name| definition(service, name))
                .collect::<Result<Vec<_>>>()?;
            let found = service.get_items_containing_properties(&repo, &definitions)?;
            print_paths(&found);
            Ok(())
        }
        Commands::Search { repos, props } => handle_search(service, &repos, &props),
        Commands::ShouldScan {
            path,
            last_modified,
        } => {
            let last_modified = service.date_time().string_to_date(&last_modified)?;
            let scan = should_scan_now(
                service,
                &path.parse::<RepoPath>()?,
                &last_modified,
                config.artifact_cutoff_date.as_deref(),
            )?;
            println!("{}", scan);
            Ok(())
        }
        Commands::Project { path } => {
            match service.get_project_name_version(&path.parse::<RepoPath>()?)? {
                Some(project) => println!("{}", project),
                None => println!("{}", "No project set".dimmed()),
            }
            Ok(())
        }
        Commands::Cleanup { repo, path, keep } => handle_cleanup(service, repo, path, &keep),
        Commands::Populate { repo, metadata } => {
            let content = fs::read_to_string(&metadata)?;
            let metadata: Vec<ArtifactMetaData> = serde_json::from_str(&content)?;
            match populate_metadata_for_repo(service, &repo, &metadata, &Utc::now())? {
                Some(updated) => print_success(&format!("Updated {} item(s) in {}", updated, repo)),
                None => println!(
                    "{}",
                    format!("{} is not pending inspection; nothing populated", repo).dimmed()
                ),
            }
            Ok(())
        }
        Commands::Repo { action } => handle_repo(config, action),
    }
}

/// Resolves a full property name or bare key against the service's vocabulary.
fn definition<S: PropertyStore>(
    service: &PropertyService<S>,
    name: &str,
) -> Result<&'static PropertyDefinition> {
    find_in(service.vocabulary(), name)
        .ok_or_else(|| BlackDuckError::UnknownProperty(name.to_string()))
}

fn handle_vocabulary<S: PropertyStore>(service: &PropertyService<S>) -> Result<()> {
    for definition in service.vocabulary() {
        println!("{:<42} {}", definition.name, definition.time_name.dimmed());
    }
    Ok(())
}

fn handle_search<S: PropertyStore>(
    service: &PropertyService<S>,
    repos: &[String],
    props: &[String],
) -> Result<()> {
    let mut query = PropertyQuery::new();
    for filter in props {
        let (name, value) = filter.split_once('=').ok_or_else(|| {
            BlackDuckError::Api(format!("expected name=value, got '{}'", filter))
        })?;
        // Names outside the vocabulary are searched as given.
        let name = find_in(service.vocabulary(), name)
            .map(|definition| definition.name.to_string())
            .unwrap_or_else(|| name.trim().to_string());
        query.entry(name).or_default().insert(value.to_string());
    }

    let repo_keys: Vec<&str> = repos.iter().map(String::as_str).collect();
    let found = service.get_items_containing_properties_and_values(&query, &repo_keys)?;
    print_paths(&found);
    Ok(())
}

fn handle_cleanup<S: PropertyStore>(
    service: &PropertyService<S>,
    repo: Option<String>,
    path: Option<String>,
    keep: &[String],
) -> Result<()> {
    let kept = keep
        .iter()
        .map(|name| definition(service, name).map(|definition| definition.name.to_string()))
        .collect::<Result<Vec<_>>>()?;
    let mut params = CleanupParams::new();
    params.insert(EXCLUDED_PROPERTIES_PARAM.to_string(), kept);

    match (repo, path) {
        (Some(repo), _) => {
            let visited = service.delete_all_blackduck_properties_from_repo(&repo, &params)?;
            print_success(&format!(
                "Removed Black Duck properties from {} item(s) in {}",
                visited, repo
            ));
        }
        (None, Some(path)) => {
            let path: RepoPath = path.parse()?;
            service.delete_all_blackduck_properties_from_repo_path(&path, &params)?;
            print_success(&format!("Removed Black Duck properties from {}", path));
        }
        (None, None) => {
            return Err(BlackDuckError::Api(
                "cleanup needs --repo or --path".to_string(),
            ))
        }
    }
    Ok(())
}

fn handle_repo(config: &BlackDuckConfig, action: RepoCommands) -> Result<()> {
    let url = config.artifactory_url().ok_or_else(|| {
        BlackDuckError::Api(
            "repository commands need an Artifactory URL (artifactory_url or BD_ARTIFACTORY_URL)"
                .to_string(),
        )
    })?;
    let api = RepositoriesApi::new(artifactory_client(config, url)?);

    match action {
        RepoCommands::Create {
            key,
            class,
            package_type,
            url,
            layout,
            external_dependencies,
        } => {
            let repository_type = match class {
                RepoClass::Local => RepositoryType::Local,
                RepoClass::Remote => RepositoryType::Remote,
                RepoClass::Virtual => RepositoryType::Virtual,
            };
            let mut configuration = RepositoryConfiguration::new(key, repository_type, package_type)
                .with_external_dependencies(external_dependencies);
            if let Some(url) = url {
                configuration = configuration.with_remote_url(url);
            }
            if let Some(layout) = layout {
                configuration = configuration.with_layout(layout);
            }
            api.create_repository(&configuration)?;
            print_success(&format!(
                "Created {} repository {}",
                configuration.repository_type, configuration.key
            ));
        }
        RepoCommands::Get { key } => {
            let configuration = api.get_repository(&key)?;
            println!("{}", serde_json::to_string_pretty(&configuration)?);
        }
        RepoCommands::Delete { key } => {
            api.delete_repository(&key)?;
            print_success(&format!("Deleted repository {}", key));
        }
    }
    Ok(())
}

fn print_optional(value: Option<impl std::fmt::Display>) {
    match value {
        Some(value) => println!("{}", value),
        None => println!("{}", "Not set".dimmed()),
    }
}

fn print_paths(paths: &[RepoPath]) {
    if paths.is_empty() {
        println!("{}", "No items found".dimmed());
        return;
    }
    for path in paths {
        println!("{}", path);
    }
}

fn print_success(message: &str) {
    println!("{}", message.green());
}
