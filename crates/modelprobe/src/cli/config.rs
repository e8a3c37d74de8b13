//! The `modelprobe config` command for configuration management.

use clap::{Args, Subcommand};
use modelprobe_core::llm::provider::resolve_credential;
use modelprobe_core::Config;
use std::path::Path;

/// Arguments for the `config` command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Subcommands for configuration management.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Display current configuration and which credentials resolve
    Show,

    /// Show config file path
    Path,

    /// Initialize a new config file with defaults
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },

    /// Set one value in the config file, keeping its comments
    Set {
        /// Dotted key, e.g. probe.timeout_ms or providers.groq.models
        key: String,

        /// TOML value (numbers, booleans, arrays); bare words are stored as strings
        value: String,
    },
}

/// Execute the config command.
pub async fn execute(args: ConfigArgs) -> anyhow::Result<()> {
    match args.command {
        ConfigCommand::Show => {
            let config = Config::load()?;
            let toml = config.to_toml()?;
            println!("{}", toml);
            println!("# credentials");
            for line in credential_lines(&config) {
                println!("# {line}");
            }
        }

        ConfigCommand::Path => {
            let path = Config::default_path();
            println!("{}", path.display());
        }

        ConfigCommand::Init { force } => {
            let path = Config::default_path();
            init_at(&path, force)?;
            tracing::info!("Config file created at: {}", path.display());
            println!("Configuration initialized at: {}", path.display());
        }

        ConfigCommand::Set { key, value } => {
            let path = Config::default_path();
            set_in_file(&path, &key, &value)?;
            println!("Set {key} in {}", path.display());
        }
    }

    Ok(())
}

/// One line per provider: a key preview, or why it is missing.
fn credential_lines(config: &Config) -> Vec<String> {
    let p = &config.providers;
    [
        ("gemini", &p.gemini.api_key),
        ("groq", &p.groq.api_key),
        ("huggingface", &p.huggingface.api_key),
    ]
    .into_iter()
    .map(|(name, reference)| match resolve_credential(name, reference) {
        Ok(key) => format!("{name}: {}", key.preview()),
        Err(e) => format!("{name}: {e}"),
    })
    .collect()
}

fn init_at(path: &Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "Config file already exists at: {}\nUse --force to overwrite.",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let toml = Config::default().to_toml()?;
    std::fs::write(path, toml)?;
    Ok(())
}

/// Update `key` in the file at `path`, creating the file if needed.
///
/// The edited document must still load as a valid config before it is written.
fn set_in_file(path: &Path, key: &str, raw: &str) -> anyhow::Result<()> {
    let content = if path.exists() {
        std::fs::read_to_string(path)?
    } else {
        String::new()
    };
    let mut doc: toml_edit::DocumentMut = content
        .parse()
        .map_err(|e| anyhow::anyhow!("{} is not valid TOML: {e}", path.display()))?;

    set_key(&mut doc, key, raw)?;

    let updated = doc.to_string();
    Config::from_toml_str(&updated)?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, updated)?;
    Ok(())
}

fn set_key(doc: &mut toml_edit::DocumentMut, key: &str, raw: &str) -> anyhow::Result<()> {
    let parts: Vec<&str> = key.split('.').map(str::trim).collect();
    if parts.iter().any(|p| p.is_empty()) {
        anyhow::bail!("Invalid key '{key}'");
    }
    let Some((last, parents)) = parts.split_last() else {
        anyhow::bail!("Invalid key '{key}'");
    };

    let mut table = doc.as_table_mut();
    for part in parents {
        let item = table.entry(part).or_insert_with(|| {
            let mut t = toml_edit::Table::new();
            t.set_implicit(true);
            toml_edit::Item::Table(t)
        });
        table = item
            .as_table_mut()
            .ok_or_else(|| anyhow::anyhow!("'{part}' in '{key}' is not a table"))?;
    }

    let mut value = raw
        .parse::<toml_edit::Value>()
        .unwrap_or_else(|_| toml_edit::Value::from(raw));
    value.decor_mut().clear();
    table[*last] = toml_edit::value(value);
    Ok(())
}
