//! # CLI Layer
//!
//! This is the only place in the codebase that:
//! - Knows about terminal I/O (stdout, stderr, piped stdin)
//! - Sets up logging
//! - Chooses between rendered text and JSON output
//!
//! Handlers call one `DreamsApi` method each, then print the result's data
//! and its messages. An `add` whose enrichment failed still returns `Ok`:
//! the failure is one of its messages. A journal that cannot be written
//! comes back as `Err` and the process exits with status 1.
//!
//! With `--output json` stdout carries exactly one JSON document and the
//! messages go to stderr.

use super::render::{
    eprint_messages, print_messages, render_config, render_dream, render_dream_list,
    render_stats,
};
use super::setup::{
    print_grouped_help, print_help_for_command, print_subcommand_help, Cli, Commands,
    JournalCommands, MiscCommands, OutputMode,
};
use clap::Parser;
use dreamsecho::api::{
    CmdMessage, CmdResult, ConfigAction, DreamFilter, DreamsApi, DreamsPaths, MessageLevel,
};
use dreamsecho::config::Settings;
use dreamsecho::error::{DreamError, Result};
use dreamsecho::model::parse_timestamp;
use dreamsecho::services::Services;
use dreamsecho::store::fs::JsonFileStore;
use serde::Serialize;
use std::io::{IsTerminal, Read};
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "DREAMSECHO_LOG";

struct AppContext {
    api: DreamsApi<JsonFileStore>,
    output: OutputMode,
}

impl AppContext {
    fn messages(&self, messages: &[CmdMessage]) {
        match self.output {
            OutputMode::Text => print_messages(messages),
            OutputMode::Json => eprint_messages(messages),
        }
    }
}

pub fn run() -> Result<()> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => e.exit(),
    };

    if cli.help {
        print_subcommand_help(&cli.command);
        return Ok(());
    }

    init_tracing(cli.verbose);

    if let Some(Commands::Misc(MiscCommands::Help { command })) = &cli.command {
        match command {
            Some(name) => print_help_for_command(name),
            None => print_grouped_help(),
        }
        return Ok(());
    }

    let mut ctx = init_context(cli.output)?;

    match cli.command {
        Some(Commands::Journal(cmd)) => match cmd {
            JournalCommands::Add {
                title,
                style,
                size,
                image,
                no_analysis,
                date,
                content,
            } => handle_add(&mut ctx, content, title, style, size, image, no_analysis, date),
            JournalCommands::List {
                period,
                images,
                style,
            } => handle_list(
                &mut ctx,
                DreamFilter {
                    period,
                    images_only: images,
                    style,
                },
            ),
            JournalCommands::View { id } => handle_view(&mut ctx, id),
            JournalCommands::Stats => handle_stats(&mut ctx),
        },
        Some(Commands::Misc(cmd)) => match cmd {
            MiscCommands::Config { key, value } => handle_config(&ctx, key, value),
            MiscCommands::Init => handle_init(&ctx),
            MiscCommands::Help { .. } => Ok(()),
        },
        None => handle_list(&mut ctx, DreamFilter::default()),
    }
}

/// Logs go to stderr so they never mix with rendered or JSON output.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .try_init();
}

fn init_context(output: OutputMode) -> Result<AppContext> {
    let paths = DreamsPaths::resolve()?;
    let settings = Settings::load(paths)?;
    let services = Services::from_settings(&settings)?;
    let store = JsonFileStore::new(&settings.paths.data_dir);
    tracing::debug!(data_dir = %settings.paths.data_dir.display(), "context ready");

    Ok(AppContext {
        api: DreamsApi::new(store, services, settings),
        output,
    })
}

#[allow(clippy::too_many_arguments)]
fn handle_add(
    ctx: &mut AppContext,
    words: Vec<String>,
    title: Option<String>,
    style: Option<String>,
    size: Option<String>,
    image: bool,
    no_analysis: bool,
    date: Option<String>,
) -> Result<()> {
    let content = if words.is_empty() {
        read_piped_stdin()?
    } else {
        words.join(" ")
    };

    let mut draft = ctx.api.draft(content).with_image(image);
    if no_analysis {
        draft = draft.with_analysis(false);
    }
    if let Some(title) = title {
        draft = draft.with_title(title);
    }
    if let Some(style) = style {
        draft = draft.with_style(style);
    }
    if let Some(size) = size {
        draft = draft.with_size(size);
    }
    if let Some(date) = date {
        let at = parse_timestamp(&date)
            .ok_or_else(|| DreamError::Api(format!("Invalid date: {}", date)))?;
        draft = draft.created_at(at);
    }

    let result = ctx.api.add_dream(draft)?;
    if ctx.output == OutputMode::Json {
        print_json(&result.affected_dreams)?;
    }
    ctx.messages(&result.messages);
    Ok(())
}

fn handle_list(ctx: &mut AppContext, filter: DreamFilter) -> Result<()> {
    let result = ctx.api.list_dreams(&filter)?;
    match ctx.output {
        OutputMode::Json => print_json(&result.listed_dreams)?,
        OutputMode::Text => print!("{}", render_dream_list(&result.listed_dreams)),
    }
    ctx.messages(&result.messages);
    Ok(())
}

fn handle_view(ctx: &mut AppContext, id: u64) -> Result<()> {
    let result = ctx.api.view_dream(id)?;
    for dream in &result.listed_dreams {
        match ctx.output {
            OutputMode::Json => print_json(dream)?,
            OutputMode::Text => print!("{}", render_dream(dream)),
        }
    }
    ctx.messages(&result.messages);
    Ok(())
}

fn handle_stats(ctx: &mut AppContext) -> Result<()> {
    let result = ctx.api.stats()?;
    match (ctx.output, &result.stats) {
        (OutputMode::Json, stats) => print_json(stats)?,
        (OutputMode::Text, Some(stats)) => print!("{}", render_stats(stats)),
        (OutputMode::Text, None) => {}
    }
    ctx.messages(&result.messages);
    Ok(())
}

fn handle_config(ctx: &AppContext, key: Option<String>, value: Option<String>) -> Result<()> {
    let action = match (key, value) {
        (None, _) => ConfigAction::ShowAll,
        (Some(key), None) => ConfigAction::ShowKey(key),
        (Some(key), Some(value)) => ConfigAction::Set(key, value),
    };
    let show_all = matches!(action, ConfigAction::ShowAll);

    let result = ctx.api.config(action)?;
    match (ctx.output, &result.config) {
        (OutputMode::Json, Some(config)) => print_json(config)?,
        (OutputMode::Json, None) => {
            let value = result
                .messages
                .iter()
                .find(|m| m.level == MessageLevel::Info)
                .map(|m| &m.content);
            print_json(&value)?
        }
        (OutputMode::Text, Some(config)) if show_all => {
            print!("{}", render_config(&config.list_all()))
        }
        (OutputMode::Text, _) => {}
    }
    ctx.messages(&result.messages);
    Ok(())
}

fn handle_init(ctx: &AppContext) -> Result<()> {
    let result: CmdResult = ctx.api.init()?;
    if ctx.output == OutputMode::Json {
        print_json(&result.paths)?;
    }
    ctx.messages(&result.messages);
    Ok(())
}

/// Dream text piped in on stdin. A terminal on stdin means nothing was piped.
fn read_piped_stdin() -> Result<String> {
    let mut stdin = std::io::stdin();
    if stdin.is_terminal() {
        return Ok(String::new());
    }
    let mut buffer = String::new();
    stdin.read_to_string(&mut buffer)?;
    Ok(buffer)
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
