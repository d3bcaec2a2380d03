use anyhow::{Context, Result};
use clap::Parser;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use rss_writer::{Config, FeedDefinition, Validator};

/// Get the config directory path (~/.config/rss-writer/)
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    let config_dir = PathBuf::from(home).join(".config").join("rss-writer");
    Ok(config_dir)
}

/// Atomically write `content` to `dst` using write-to-temp-then-rename.
/// A reader polling the feed file never sees a partial document.
fn atomic_write(dst: &Path, content: &[u8]) -> Result<()> {
    // SEC-009: Use randomized temp filename to prevent TOCTOU race conditions.
    use std::time::{SystemTime, UNIX_EPOCH};
    let random_suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    let temp_path = dst.with_extension(format!("tmp.{:016x}", random_suffix));

    let mut temp_file = std::fs::OpenOptions::new()
        .write(true)
        .create_new(true) // Fails atomically if file exists (prevents symlink race)
        .open(&temp_path)
        .with_context(|| {
            format!(
                "Failed to create temporary file '{}': check directory permissions or disk space",
                temp_path.display()
            )
        })?;

    temp_file.write_all(content).with_context(|| {
        let _ = std::fs::remove_file(&temp_path);
        format!(
            "Failed to write to temporary file '{}': disk may be full",
            temp_path.display()
        )
    })?;

    temp_file.sync_all().with_context(|| {
        let _ = std::fs::remove_file(&temp_path);
        format!(
            "Failed to sync temporary file '{}' to disk: disk may be full",
            temp_path.display()
        )
    })?;

    drop(temp_file);

    // On Windows, rename fails if destination exists, so remove it first
    #[cfg(windows)]
    if dst.exists() {
        std::fs::remove_file(dst).with_context(|| {
            let _ = std::fs::remove_file(&temp_path);
            format!(
                "Failed to remove existing '{}' before atomic replace",
                dst.display()
            )
        })?;
    }

    std::fs::rename(&temp_path, dst).with_context(|| {
        let _ = std::fs::remove_file(&temp_path);
        format!(
            "Failed to rename '{}' to '{}': check permissions",
            temp_path.display(),
            dst.display()
        )
    })?;

    Ok(())
}

#[derive(Parser, Debug)]
#[command(
    name = "rss-writer",
    about = "Render an RSS 2.0 feed from a TOML feed definition"
)]
struct Args {
    /// Feed definition (TOML)
    #[arg(value_name = "DEFINITION")]
    definition: PathBuf,

    /// Config file (default: ~/.config/rss-writer/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Write the feed to FILE instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Validate the rendered feed before writing it
    #[arg(long)]
    validate: bool,

    /// Validate against this XSD instead of the bundled RSS 2.0 schema
    #[arg(long, value_name = "FILE")]
    schema: Option<PathBuf>,
}

fn main() -> Result<()> {
    // Logs go to stderr so stdout carries only the feed
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();

    let config_path = match &args.config {
        Some(path) => path.clone(),
        None => get_config_dir()?.join("config.toml"),
    };
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config '{}'", config_path.display()))?;

    let definition = FeedDefinition::load(&args.definition).with_context(|| {
        format!(
            "Failed to load feed definition '{}'",
            args.definition.display()
        )
    })?;
    let mut feed = definition
        .into_feed()
        .context("Invalid feed definition")?;
    config.apply(&mut feed).context("Invalid configuration")?;

    let xml = feed.render().context("Failed to render feed")?;

    let schema_path = args.schema.as_ref().or(config.schema_path.as_ref());
    if args.validate || config.validate || args.schema.is_some() {
        let mut validator = match schema_path {
            Some(path) => Validator::from_path(path)
                .with_context(|| format!("Failed to load schema '{}'", path.display()))?,
            None => Validator::new().context("Failed to compile the bundled RSS schema")?,
        };

        let valid = validator.validate(&xml);
        for problem in validator.last_errors() {
            eprintln!("{}: {}", problem.severity, problem);
        }
        if !valid {
            anyhow::bail!(
                "Rendered feed failed validation with {} problem(s)",
                validator.last_errors().len()
            );
        }
    }

    match &args.output {
        Some(path) => {
            atomic_write(path, xml.as_bytes())?;
            tracing::info!(path = %path.display(), bytes = xml.len(), "Wrote feed");
        }
        None => std::io::stdout()
            .lock()
            .write_all(xml.as_bytes())
            .context("Failed to write feed to stdout")?,
    }

    Ok(())
}
