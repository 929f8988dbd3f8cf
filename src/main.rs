// Copyright (c) 2024 Insights CLI contributors. All rights reserved.

mod api;
mod catalog;
mod charts;
mod commands;
mod config;
mod consts;
mod drilldown;
mod environment;
mod events;
mod favorites;
mod filters;
mod logging;
mod login;
mod pretty;
mod session;
mod store;
mod ui;

use crate::api::ApiClient;
use crate::api::error::ApiError;
use crate::catalog::ViewOption;
use crate::commands::{CommandError, Context, FilterUpdate};
use crate::config::{Config, get_config_path, get_preferences_path};
use crate::environment::Environment;
use crate::filters::{DatePreset, Granularity};
use crate::pretty::{print_cmd_error, print_friendly_error_header};
use crate::session::{run_tui_mode, setup_session};
use crate::store::{FileStore, MemoryStore, PreferenceStore};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use std::error::Error;
use std::sync::Arc;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
/// Command-line client for the Insights engineering analytics dashboard
struct Args {
    /// API to talk to: "production", "local", or a base URL
    #[arg(long, global = true, env = "INSIGHTS_ENVIRONMENT", value_name = "ENV_OR_URL")]
    api_url: Option<String>,

    /// Print debug logs to stderr
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    /// Command to execute
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Log in and save the session
    Login {
        #[arg(long, value_name = "EMAIL")]
        email: String,

        #[arg(long, env = "INSIGHTS_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Clear the saved session
    Logout,
    /// List templates and boards, favorites first
    Boards {
        /// Case-insensitive substring of the name
        #[arg(long)]
        search: Option<String>,

        /// all, private, favorites, public or templates
        #[arg(long, default_value = "all")]
        view: ViewOption,
    },
    /// Toggle a template or board as favorite
    Favorite { id: u64 },
    /// Show a board and a chart for each of its metrics
    Board { id: u64 },
    /// Show one metric graph under the current filters
    Chart { metric_key: String },
    /// Show a metric's headline value and benchmark
    Summary { metric_type: String },
    /// Per-team values behind a metric
    Drill { metric_type: String },
    /// Pull request process time series
    Process,
    /// Pull request process phase averages
    ProcessSummary,
    /// List teams
    Teams,
    /// List authors of the selected teams
    Authors,
    /// List branches of the selected repositories
    Branches,
    /// Show or change the saved filters
    Filters {
        #[command(subcommand)]
        command: FiltersCommand,
    },
    /// Browse boards interactively
    Browse {
        /// Paint a dark background behind the browser
        #[arg(long, default_value_t = false)]
        with_background: bool,
    },
}

#[derive(Subcommand)]
enum FiltersCommand {
    /// Print the saved filters
    Show,
    /// Change the date range, granularity or repositories
    Set {
        /// First day, YYYY-MM-DD
        #[arg(long)]
        start: Option<NaiveDate>,

        /// Last day, YYYY-MM-DD
        #[arg(long)]
        end: Option<NaiveDate>,

        /// daily, weekly or monthly
        #[arg(long)]
        granularity: Option<Granularity>,

        /// Comma-separated repository ids
        #[arg(long, value_delimiter = ',')]
        repo_ids: Option<Vec<u64>>,
    },
    /// Use a preset date range: today, yesterday, 7d or 30d
    Preset { preset: DatePreset },
    ToggleTeam { id: u64 },
    ToggleAuthor { id: u64 },
    ToggleBranch { name: String },
    SelectAllTeams,
    SelectAllAuthors,
    SelectAllBranches,
}

impl Command {
    /// Commands that only touch local filters work without a session.
    fn needs_session(&self) -> bool {
        !matches!(
            self,
            Command::Logout
                | Command::Filters {
                    command: FiltersCommand::Show
                        | FiltersCommand::Set { .. }
                        | FiltersCommand::Preset { .. }
                        | FiltersCommand::ToggleTeam { .. }
                        | FiltersCommand::ToggleAuthor { .. }
                        | FiltersCommand::ToggleBranch { .. }
                }
        )
    }
}

fn open_store() -> Arc<dyn PreferenceStore> {
    match get_preferences_path() {
        Ok(path) => Arc::new(FileStore::new(path)),
        Err(e) => {
            log::warn!("Preferences will not be saved: {}", e);
            Arc::new(MemoryStore::new())
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let environment = match args.api_url.as_deref() {
        Some(value) => value.parse::<Environment>().map_err(|_| {
            format!(
                "Unknown environment '{}'. Use production, local or an http(s) URL.",
                value
            )
        })?,
        None => Environment::default(),
    };

    // The browser reports through its activity log instead.
    if !matches!(args.command, Command::Browse { .. }) {
        logging::init(args.verbose);
    }

    let config_path = get_config_path()?;
    match args.command {
        Command::Login { email, password } => {
            let client = ApiClient::new(environment)?;
            login::login(&email, &password, &config_path, &client).await?;
            Ok(())
        }
        Command::Logout => {
            println!("Logging out and clearing the saved session...");
            Config::clear(&config_path).map_err(Into::into)
        }
        Command::Browse { with_background } => {
            let session = login::require_session(&config_path)?;
            let data = setup_session(
                environment,
                session,
                open_store(),
                Utc::now(),
                with_background,
            )?;
            run_tui_mode(data).await
        }
        command => {
            let session = if command.needs_session() {
                login::require_session(&config_path)?
            } else {
                Config::load_from_file(&config_path).unwrap_or_default()
            };
            let client = ApiClient::new(environment)?.with_session(session.clone());
            let ctx = Context {
                api: &client,
                store: open_store(),
                session,
                now: Utc::now(),
            };
            match run_command(&ctx, command).await {
                Ok(output) => {
                    println!("{}", output);
                    Ok(())
                }
                Err(e) => {
                    report_command_error(&e);
                    Err(e.into())
                }
            }
        }
    }
}

async fn run_command(ctx: &Context<'_>, command: Command) -> Result<String, CommandError> {
    match command {
        Command::Boards { search, view } => commands::boards(ctx, search, view).await,
        Command::Favorite { id } => commands::favorite(ctx, id).await,
        Command::Board { id } => commands::board(ctx, id).await,
        Command::Chart { metric_key } => commands::chart(ctx, &metric_key).await,
        Command::Summary { metric_type } => commands::summary(ctx, &metric_type).await,
        Command::Drill { metric_type } => commands::drill(ctx, &metric_type).await,
        Command::Process => commands::process(ctx).await,
        Command::ProcessSummary => commands::process_summary(ctx).await,
        Command::Teams => commands::teams(ctx).await,
        Command::Authors => commands::authors(ctx).await,
        Command::Branches => commands::branches(ctx).await,
        Command::Filters { command } => match command {
            FiltersCommand::Show => Ok(commands::show_filters(ctx)),
            FiltersCommand::Set {
                start,
                end,
                granularity,
                repo_ids,
            } => commands::set_filters(
                ctx,
                FilterUpdate {
                    start,
                    end,
                    granularity,
                    repo_ids,
                },
            ),
            FiltersCommand::Preset { preset } => commands::apply_preset(ctx, preset),
            FiltersCommand::ToggleTeam { id } => commands::toggle_team(ctx, id),
            FiltersCommand::ToggleAuthor { id } => commands::toggle_author(ctx, id),
            FiltersCommand::ToggleBranch { name } => commands::toggle_branch(ctx, &name),
            FiltersCommand::SelectAllTeams => commands::select_all_teams(ctx).await,
            FiltersCommand::SelectAllAuthors => commands::select_all_authors(ctx).await,
            FiltersCommand::SelectAllBranches => commands::select_all_branches(ctx).await,
        },
        Command::Login { .. } | Command::Logout | Command::Browse { .. } => Err(
            CommandError::Invalid("This command is handled before the session is opened".into()),
        ),
    }
}

fn report_command_error(error: &CommandError) {
    match error {
        CommandError::Api(api_error) => {
            if matches!(api_error, ApiError::Http { status, .. } if *status >= 500) {
                print_friendly_error_header();
            }
            match api_error.to_pretty() {
                Some(pretty) => {
                    print_cmd_error!("Request failed.", "{}", pretty);
                }
                None => {
                    print_cmd_error!("Request failed.", "{}", api_error);
                }
            }
        }
        other => {
            print_cmd_error!("Command failed.", "{}", other);
        }
    }
}
