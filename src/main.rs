use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use carik_loader::application::HostContext;
use carik_loader::domain::traits::Settings;
use carik_loader::extensions::{ExtensionLoader, LoadReport};
use carik_loader::infrastructure::config::Config;
use carik_loader::infrastructure::git::RepoFetcher;
use carik_loader::infrastructure::settings::EnvFileSettings;

#[derive(Parser)]
#[command(name = "carik-loader")]
#[command(about = "Extension loader for carik-bot", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "config.yaml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Load every extension and print a summary
    Load {
        /// Extension directory (overrides config)
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },
    /// Install an extension from a git repository and load it
    Install {
        url: String,
    },
    /// Load extensions and list the registered commands
    Commands,
    /// Resolve a localized text, e.g. `weather:FORECAST`
    Text {
        query: String,

        /// Placeholder substitution, `name=value`
        #[arg(short, long = "set", value_parser = parse_substitution)]
        substitutions: Vec<(String, String)>,

        /// Locale to resolve in (overrides config)
        #[arg(short, long)]
        locale: Option<String>,
    },
    /// Show version
    Version,
    /// Generate default config
    InitConfig,
}

fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Version => {
            println!("carik-loader v{}", env!("CARGO_PKG_VERSION"));
            ExitCode::SUCCESS
        }
        Commands::InitConfig => init_config(&cli.config),
        Commands::Load { dir } => with_loader(&cli.config, |loader, _| load(loader, dir)),
        Commands::Install { url } => with_loader(&cli.config, |loader, _| install(loader, &url)),
        Commands::Commands => with_loader(&cli.config, list_commands),
        Commands::Text {
            query,
            substitutions,
            locale,
        } => with_loader(&cli.config, |loader, auto_load| {
            text(loader, auto_load, &query, substitutions, locale)
        }),
    }
}

fn with_loader(config_path: &str, run: impl FnOnce(&mut ExtensionLoader, bool) -> ExitCode) -> ExitCode {
    match build_loader(config_path) {
        Some((mut loader, auto_load)) => run(&mut loader, auto_load),
        None => ExitCode::FAILURE,
    }
}

/// Loader for the configured host, plus the `auto-load` flag
fn build_loader(config_path: &str) -> Option<(ExtensionLoader, bool)> {
    // Load config
    let config = if std::path::Path::new(config_path).exists() {
        Config::load(config_path).unwrap_or_else(|e| {
            tracing::warn!("Failed to load config: {}, using defaults", e);
            Config::load_env()
        })
    } else {
        Config::load_env()
    };

    let settings: Arc<dyn Settings> = match EnvFileSettings::load(&config.settings.path) {
        Ok(settings) => Arc::new(settings),
        Err(e) => {
            tracing::warn!("Failed to load settings: {}, using empty settings", e);
            Arc::new(EnvFileSettings::in_memory())
        }
    };

    match HostContext::from_config(&config, settings) {
        Ok(context) => {
            tracing::info!(bot = %config.bot.name, locale = %config.bot.locale, "Host context ready");
            Some((ExtensionLoader::new(context), config.extensions.auto_load))
        }
        Err(e) => {
            tracing::error!("Failed to load host locales: {}", e);
            None
        }
    }
}

fn load_all(loader: &mut ExtensionLoader, dir: Option<PathBuf>) -> Option<LoadReport> {
    let dir = dir.unwrap_or_else(|| loader.context().extensions_dir().to_path_buf());
    match loader.load_modules(&dir) {
        Ok(report) => Some(report),
        Err(e) => {
            tracing::error!("Failed to read extension directory {}: {}", dir.display(), e);
            None
        }
    }
}

fn load(loader: &mut ExtensionLoader, dir: Option<PathBuf>) -> ExitCode {
    let Some(report) = load_all(loader, dir) else {
        return ExitCode::FAILURE;
    };

    for outcome in &report.outcomes {
        match &outcome.result {
            Ok(commands) => println!("  ok    {} ({} commands)", outcome.name, commands),
            Err(e) => println!("  fail  {}: {}", outcome.name, e),
        }
    }
    println!("{}", report.summary());

    if report.failed() > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn install(loader: &mut ExtensionLoader, url: &str) -> ExitCode {
    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("Failed to start runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let fetcher = RepoFetcher::new();
    match rt.block_on(loader.install_and_load(url, &fetcher)) {
        Ok(outcome) => match outcome.result {
            Ok(commands) => {
                println!("Installed {} ({} commands)", outcome.name, commands);
                ExitCode::SUCCESS
            }
            Err(e) => {
                println!("Installed {} but loading failed: {}", outcome.name, e);
                ExitCode::FAILURE
            }
        },
        Err(e) => {
            println!("Install failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn list_commands(loader: &mut ExtensionLoader, auto_load: bool) -> ExitCode {
    if auto_load && load_all(loader, None).is_none() {
        return ExitCode::FAILURE;
    }

    let prefix = loader.command_prefix();
    let registry = loader.context().commands();
    if registry.is_empty() {
        println!("No commands registered");
        return ExitCode::SUCCESS;
    }

    println!("Available commands:");
    for command in registry.all() {
        println!(
            "  {}{} - {} [{}]",
            prefix,
            command.name,
            command.description().unwrap_or(""),
            command.extension
        );
    }
    ExitCode::SUCCESS
}

fn text(
    loader: &mut ExtensionLoader,
    auto_load: bool,
    query: &str,
    substitutions: Vec<(String, String)>,
    locale: Option<String>,
) -> ExitCode {
    if auto_load && load_all(loader, None).is_none() {
        return ExitCode::FAILURE;
    }

    if let Some(locale) = locale {
        loader.context().texts_mut().set_locale(locale);
    }

    println!("{}", loader.context().texts().resolve_with(query, substitutions));
    ExitCode::SUCCESS
}

fn init_config(path: &str) -> ExitCode {
    if std::path::Path::new(path).exists() {
        println!("{} already exists", path);
        return ExitCode::FAILURE;
    }

    let yaml = match Config::default().to_yaml() {
        Ok(yaml) => yaml,
        Err(e) => {
            println!("Failed to generate config: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match std::fs::write(path, yaml) {
        Ok(()) => {
            println!("Created {}", path);
            ExitCode::SUCCESS
        }
        Err(e) => {
            println!("Failed to write {}: {}", path, e);
            ExitCode::FAILURE
        }
    }
}

fn parse_substitution(s: &str) -> Result<(String, String), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got '{}'", s))?;
    Ok((name.to_string(), value.to_string()))
}
