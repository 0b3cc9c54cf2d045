// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{anyhow, Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{info, warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::Path;

use subbank::app_config::{self, Config};
use subbank::editor::SceneOrigin;
use subbank::model::BankId;
use subbank::session::{EditorSession, RebuildOutcome};

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List loaded language banks
    Banks,

    /// List scenes of the bank being edited
    Scenes {
        /// Only scenes whose name contains this text
        #[arg(short, long)]
        filter: Option<String>,

        /// Instead list scenes of this base bank missing from the edited bank
        #[arg(long)]
        base: Option<BankId>,
    },

    /// Print every line of a scene
    Show {
        scene: String,
    },

    /// Create an empty scene
    AddScene {
        name: String,
    },

    /// Copy a scene from one bank into another
    CopyScene {
        name: String,

        /// Bank to copy from
        #[arg(long)]
        from: BankId,

        /// Bank to copy into
        #[arg(long)]
        to: BankId,
    },

    /// Delete a scene
    DeleteScene {
        name: String,
    },

    /// Add a line to a scene
    AddLine {
        scene: String,

        /// First frame
        #[arg(allow_hyphen_values = true)]
        start: f32,

        /// Last frame
        #[arg(allow_hyphen_values = true)]
        end: f32,

        text: String,

        /// Speaker id
        #[arg(short, long, default_value = "")]
        speaker: String,

        /// Line is spoken off screen
        #[arg(short, long)]
        offscreen: bool,
    },

    /// Delete a line of a scene
    DeleteLine {
        scene: String,
        index: usize,
    },

    /// Change fields of a line; omitted fields keep their value
    UpdateLine {
        scene: String,
        index: usize,

        #[arg(long, allow_hyphen_values = true)]
        start: Option<f32>,

        #[arg(long, allow_hyphen_values = true)]
        end: Option<f32>,

        #[arg(long)]
        text: Option<String>,

        #[arg(long)]
        speaker: Option<String>,

        #[arg(long)]
        offscreen: Option<bool>,
    },

    /// List speaker names of the bank being edited
    Speakers,

    /// Set a speaker's display name; an empty name removes it
    SetSpeaker {
        id: String,
        display: String,
    },

    /// Ask the running game to rebuild and reload its text
    Rebuild,

    /// Generate shell completions for subbank
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// subbank - cutscene subtitle bank editor
///
/// Edits localized cutscene subtitles stored as language banks and tells a
/// running game to reload them through its REPL.
#[derive(Parser, Debug)]
#[command(name = "subbank")]
#[command(version)]
#[command(about = "Cutscene subtitle bank editor")]
#[command(long_about = "subbank edits localized cutscene subtitles and pushes them to a running game.

EXAMPLES:
    subbank banks                                   # List loaded language banks
    subbank scenes -f intro                         # Scenes whose name contains 'intro'
    subbank -b 1 scenes --base 0                    # Scenes of bank 0 missing from bank 1
    subbank -b 1 copy-scene intro --from 0 --to 1   # Copy a scene from the base language
    subbank add-line intro 0 100 'Hello' -s jak     # Add a line spoken by 'jak'
    subbank --no-rebuild delete-line intro 2        # Save without poking the game

CONFIGURATION:
    Configuration is stored in subbank.json by default. If the config file
    doesn't exist, a default one will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, default_value = "subbank.json", global = true)]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum, global = true)]
    log_level: Option<CliLogLevel>,

    /// Bank to edit (defaults to the configured editor language)
    #[arg(short, long, global = true)]
    bank: Option<BankId>,

    /// Save without asking the game to rebuild its text
    #[arg(long, global = true)]
    no_rebuild: bool,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger { level: LevelFilter::Trace }))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI colour and tag for a level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("1;31", "ERROR"),
            Level::Warn => ("1;33", "WARN "),
            Level::Info => ("1;32", "INFO "),
            Level::Debug => ("1;36", "DEBUG"),
            Level::Trace => ("1;35", "TRACE"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (colour, tag) = Self::style_for_level(record.level());
            let _ = writeln!(
                std::io::stderr(),
                "\x1B[{}m{} {} {}\x1B[0m",
                colour, now, tag, record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    if let Commands::Completions { shell } = cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(shell, &mut cmd, "subbank", &mut std::io::stdout());
        return Ok(());
    }

    if let Some(level) = &cli.log_level {
        let level: app_config::LogLevel = level.clone().into();
        log::set_max_level(LevelFilter::from(&level));
    }

    let config = load_or_create_config(&cli.config_path, cli.log_level.clone())?;
    config.validate().context("Configuration validation failed")?;
    if cli.log_level.is_none() {
        log::set_max_level(LevelFilter::from(&config.log_level));
    }

    let mut session = EditorSession::from_config(config);
    session.load().context("Failed to load subtitle banks")?;
    if let Some(bank) = cli.bank {
        session.model_mut().set_current_bank(bank)?;
    }

    run_command(&mut session, cli.command, cli.no_rebuild).await
}

fn load_or_create_config(config_path: &str, log_level: Option<CliLogLevel>) -> Result<Config> {
    if Path::new(config_path).exists() {
        let mut config = Config::load(config_path)?;
        if let Some(level) = log_level {
            config.log_level = level.into();
        }
        Ok(config)
    } else {
        warn!("Config file not found at '{}', creating default config.", config_path);
        let mut config = Config::default();
        if let Some(level) = log_level {
            config.log_level = level.into();
        }
        config.save(config_path)?;
        Ok(config)
    }
}

async fn run_command(session: &mut EditorSession, command: Commands, no_rebuild: bool) -> Result<()> {
    let bank = session.model().selection().current_bank();

    match command {
        Commands::Banks => {
            for loaded in session.model().banks() {
                let marker = if loaded.lang == bank { "*" } else { " " };
                println!("{} {} ({} scenes, text {})", marker, loaded.label(), loaded.scenes.len(), loaded.text_version);
            }
            Ok(())
        }
        Commands::Scenes { filter, base } => {
            if let Some(filter) = filter {
                session.model_mut().set_filter(filter);
            }
            if let Some(base) = base {
                session.model_mut().set_base_bank(base)?;
                session.model_mut().set_show_missing_from_base(true);
                print_listing(session.model().base_listing());
            } else {
                print_listing(session.model().current_listing());
            }
            Ok(())
        }
        Commands::Show { scene } => {
            let lines = session
                .model()
                .scene(bank, &scene)
                .ok_or_else(|| anyhow!("Scene '{}' not found in bank {}", scene, bank))?
                .lines();
            for (i, line) in lines.iter().enumerate() {
                let offscreen = if line.offscreen { " (offscreen)" } else { "" };
                println!("{:>3} {}{}", i, session.line_summary(bank, line), offscreen);
            }
            Ok(())
        }
        Commands::AddScene { name } => {
            session.add_scene_named(&name)?;
            info!("Added scene '{}' to bank {}", name, bank);
            persist(session, no_rebuild).await
        }
        Commands::CopyScene { name, from, to } => {
            session.model_mut().copy_scene(from, to, &name)?;
            info!("Copied scene '{}' from bank {} to bank {}", name, from, to);
            persist(session, no_rebuild).await
        }
        Commands::DeleteScene { name } => {
            if !session.model_mut().delete_scene(bank, &name)? {
                warn!("Scene '{}' does not exist in bank {}", name, bank);
                return Ok(());
            }
            persist(session, no_rebuild).await
        }
        Commands::AddLine { scene, start, end, text, speaker, offscreen } => {
            session.model_mut().select_scene(bank, &scene)?;
            let draft = session.model_mut().line_draft_mut();
            draft.start = start;
            draft.end = end;
            draft.text = text;
            draft.speaker = speaker;
            draft.offscreen = offscreen;
            let index = session.submit_new_line()?;
            info!("Added line {} to scene '{}'", index, scene);
            persist(session, no_rebuild).await
        }
        Commands::DeleteLine { scene, index } => {
            session.model_mut().delete_line(bank, &scene, index)?;
            persist(session, no_rebuild).await
        }
        Commands::UpdateLine { scene, index, start, end, text, speaker, offscreen } => {
            let line = session
                .model()
                .scene(bank, &scene)
                .and_then(|s| s.line(index))
                .ok_or_else(|| anyhow!("Line {} of scene '{}' not found in bank {}", index, scene, bank))?;
            let mut draft = session.line_draft(line);
            if let Some(start) = start {
                draft.start = start;
            }
            if let Some(end) = end {
                draft.end = end;
            }
            if let Some(text) = text {
                draft.text = text;
            }
            if let Some(speaker) = speaker {
                draft.speaker = speaker;
            }
            if let Some(offscreen) = offscreen {
                draft.offscreen = offscreen;
            }
            session.edit_line(bank, &scene, index, &draft)?;
            persist(session, no_rebuild).await
        }
        Commands::Speakers => {
            let loaded = session
                .model()
                .bank(bank)
                .ok_or_else(|| anyhow!("Bank {} is not loaded", bank))?;
            let ids: Vec<String> = if session.roster().is_empty() {
                loaded.speakers.keys().cloned().collect()
            } else {
                session.roster().ids().to_vec()
            };
            for id in ids {
                let index = session.roster().index_by_name(&id);
                let name = session.speaker_display(bank, &id).unwrap_or_else(|| "(unset)".to_string());
                println!("{:>3} {:<20} {}", index, id, name);
            }
            Ok(())
        }
        Commands::SetSpeaker { id, display } => {
            session.set_speaker_display(&id, &display)?;
            persist(session, no_rebuild).await
        }
        Commands::Rebuild => {
            session.rebuild().await?;
            info!("Game text rebuild requested");
            Ok(())
        }
        Commands::Completions { .. } => Ok(()),
    }
}

fn print_listing<'a>(listing: impl Iterator<Item = subbank::ListedScene<'a>>) {
    for listed in listing {
        let origin = match listed.origin {
            SceneOrigin::Current => "",
            SceneOrigin::BaseOnly => " (base only)",
        };
        println!("{} [{} lines]{}", listed.name, listed.scene.len(), origin);
    }
}

// Save every bank and, unless disabled, tell the game to reload
async fn persist(session: &mut EditorSession, no_rebuild: bool) -> Result<()> {
    if !no_rebuild && session.config().repl.auto_rebuild {
        if let Err(e) = session.connect_repl().await {
            warn!("REPL unavailable, saving without rebuild: {}", e);
        }
    }

    let status = session.save().await;
    if !status.saved {
        return Err(anyhow!("Failed to write subtitle banks"));
    }
    match &status.rebuild {
        RebuildOutcome::Failed(_) => warn!("{}", status.summary()),
        _ => info!("{}", status.summary()),
    }
    Ok(())
}
