use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use explorer_core::NodeId;
use explorer_engine::{
    ApiRegistry, BulkReport, JobFileSystem, JobTreeProvider, Poller, TreeStateStore,
};
use explorer_logging::{explorer_info, explorer_warn};

use crate::commands::{self, Command, HELP};
use crate::config;
use crate::render::item_line;
use crate::terminal::{read_answer, TerminalPrompter};

pub async fn run(config_path: &Path) -> anyhow::Result<()> {
    let (config, warning) = config::load(config_path);
    explorer_logging::initialize(
        config.log_destination(),
        config.log_level(),
        config.log_file.as_deref(),
    );
    if let Some(warning) = warning {
        explorer_warn!("{}", warning);
    }

    let registry = Arc::new(
        ApiRegistry::from_profiles(&config.profiles, &config.settings)
            .context("building JES clients")?,
    );
    let fs = Arc::new(JobFileSystem::new(Arc::clone(&registry)));
    let store = TreeStateStore::new(config.state_dir(), config.settings.persistence);
    let mut provider = JobTreeProvider::new(
        &config.settings,
        Arc::clone(&registry),
        fs,
        Poller::default(),
        Arc::new(TerminalPrompter),
    )
    .with_store(store);
    provider.restore().await;
    explorer_info!("Job explorer started with {} profiles", registry.profile_names().len());

    println!("Profiles: {}", registry.profile_names().join(", "));
    println!("Type help for the list of commands.");
    list(&mut provider, None).await?;

    while let Some(line) = read_answer("jobs> ") {
        if line.trim().is_empty() {
            continue;
        }
        let command = match commands::parse(&line) {
            Ok(command) => command,
            Err(message) => {
                eprintln!("{message}");
                continue;
            }
        };
        if command == Command::Quit {
            break;
        }
        if let Err(err) = execute(&mut provider, command).await {
            eprintln!("error: {err:#}");
        }
    }

    provider.shutdown();
    explorer_info!("Job explorer stopped");
    Ok(())
}

async fn list(provider: &mut JobTreeProvider, parent: Option<NodeId>) -> anyhow::Result<()> {
    let depth = match parent {
        Some(id) => {
            println!("{}", item_line(&provider.get_tree_item(id)?, 0));
            1
        }
        None => 0,
    };
    for child in provider.get_children(parent).await {
        println!("{}", item_line(&provider.get_tree_item(child)?, depth));
    }
    Ok(())
}

fn print_report(report: &BulkReport) {
    if !report.skipped.is_empty() {
        println!("Skipped: {}", report.skipped.join(", "));
    }
}

async fn execute(provider: &mut JobTreeProvider, command: Command) -> anyhow::Result<()> {
    match command {
        Command::List(parent) => list(provider, parent).await?,
        Command::AddSession(profile) => match provider.add_session(&profile).await {
            Some(id) => list(provider, Some(id)).await?,
            None => anyhow::bail!("no profile named {profile}"),
        },
        Command::HideSession(id) => provider.delete_session(id).await,
        Command::Search(id) => {
            provider.search_prompt(id).await?;
            list(provider, Some(id)).await?;
        }
        Command::Refresh(id) => {
            provider.refresh(id).await;
            if id.is_some() {
                list(provider, id).await?;
            }
        }
        Command::AddFavorite(id) => provider.add_favorite(id).await,
        Command::RemoveFavorite(id) => provider.remove_favorite(id).await,
        Command::RemoveFavoriteProfile(profile) => {
            provider.remove_favorite_profile(&profile, true).await
        }
        Command::OpenFavorite(id) => {
            provider.open_favorite_search(id).await;
            list(provider, Some(id)).await?;
        }
        Command::Sort(id, sort) => {
            provider.sort_jobs(id, sort).await;
            list(provider, Some(id)).await?;
        }
        Command::Filter(id, text) => {
            provider.filter_jobs(id, &text).await;
            list(provider, Some(id)).await?;
        }
        Command::ClearFilter(id) => provider.clear_filter(id).await,
        Command::Cat(id) => {
            let spool = provider.open_spool(id).await?;
            println!("{}", spool.text);
        }
        Command::Encoding(id, encoding) => provider.set_spool_encoding(id, encoding).await?,
        Command::Poll(id) => provider.poll_data(id).await?,
        Command::Interval(id, text) => provider.set_poll_interval(id, &text).await?,
        Command::Cancel(ids) => print_report(&provider.cancel_jobs(&ids).await?),
        Command::Delete(ids) => print_report(&provider.delete_jobs(&ids).await?),
        Command::Modify(id) => {
            provider.modify_command(id).await?;
        }
        Command::Stop(id) => {
            provider.stop_command(id).await?;
        }
        Command::Focus(profile, job_id) => {
            if provider.focus_on_job(&profile, &job_id).await?.is_none() {
                println!("Job {job_id} not found for {profile}");
            }
        }
        Command::Copy(id) => {
            if let Some(name) = provider.copy_name(id) {
                println!("{name}");
            }
        }
        Command::ForgetSearch(entry) => provider.remove_search_history(&entry).await,
        Command::ForgetAll => provider.reset_search_history().await,
        Command::Help => println!("{HELP}"),
        Command::Quit => {}
    }
    Ok(())
}
