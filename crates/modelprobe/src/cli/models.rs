//! The `modelprobe models` command for browsing provider catalogs.

use super::ProviderName;
use clap::{Args, Subcommand};
use console::Style;
use modelprobe_core::llm::catalog::{self, ModelEntry, ModelInfo};
use modelprobe_core::llm::provider::resolve_credential;
use modelprobe_core::{Config, HttpTransport};
use std::path::{Path, PathBuf};

/// Arguments for the `models` command.
#[derive(Args, Debug)]
pub struct ModelsArgs {
    #[command(subcommand)]
    pub command: ModelsCommand,
}

/// Subcommands for catalog lookups.
#[derive(Subcommand, Debug)]
pub enum ModelsCommand {
    /// List the models a provider serves
    List {
        /// Provider to query (gemini or groq)
        #[arg(short, long, value_enum, default_value = "groq")]
        provider: ProviderName,

        /// Save the listing as JSON to this file
        #[arg(long)]
        save: Option<PathBuf>,
    },

    /// Show HuggingFace Hub metadata for a model
    Info {
        /// Model id, e.g. Qwen/Qwen2-VL-7B-Instruct
        model_id: String,
    },
}

/// Execute the models command.
pub async fn execute(args: ModelsArgs, config: Config) -> anyhow::Result<()> {
    let transport = HttpTransport::new();
    let timeout = config.timeout();

    match args.command {
        ModelsCommand::List { provider, save } => {
            let models = match provider {
                ProviderName::Groq => {
                    let cfg = &config.providers.groq;
                    let key = resolve_credential(provider.as_str(), &cfg.api_key)?;
                    catalog::list_openai_models(&transport, &cfg.endpoint, &key, timeout).await?
                }
                ProviderName::Gemini => {
                    let cfg = &config.providers.gemini;
                    let key = resolve_credential(provider.as_str(), &cfg.api_key)?;
                    catalog::list_gemini_models(&transport, &cfg.endpoint, &key, timeout).await?
                }
                ProviderName::Huggingface => anyhow::bail!(
                    "HuggingFace hosts too many models to list; \
                     use `modelprobe models info <model_id>` instead"
                ),
            };

            tracing::info!("{} lists {} model(s)", provider, models.len());
            println!("{}", format_listing(&models));

            if let Some(path) = save {
                save_listing(&models, &path)?;
                println!("Saved {} model(s) to {}", models.len(), path.display());
            }
        }

        ModelsCommand::Info { model_id } => {
            let hub = &config.providers.huggingface.hub_endpoint;
            let info = catalog::model_info(&transport, hub, &model_id, timeout).await?;
            println!("{}", format_info(&info));
        }
    }

    Ok(())
}

fn format_listing(models: &[ModelEntry]) -> String {
    let width = models.iter().map(|m| m.id.len()).max().unwrap_or(0);
    let dim = Style::new().dim();
    models
        .iter()
        .map(|m| {
            let mut line = format!("  {:<width$}", m.id);
            if let Some(owner) = &m.owned_by {
                line.push_str(&format!("  {}", dim.apply_to(owner)));
            }
            if let Some(ctx) = m.context_window {
                line.push_str(&format!("  {}", dim.apply_to(format!("{ctx} ctx"))));
            }
            line.trim_end().to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn save_listing(models: &[ModelEntry], path: &Path) -> anyhow::Result<()> {
    let path = PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).into_owned());
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, serde_json::to_string_pretty(models)?)?;
    Ok(())
}

fn format_info(info: &ModelInfo) -> String {
    let field = |value: Option<String>| value.unwrap_or_else(|| "-".to_string());
    let json_field = |value: &Option<serde_json::Value>| match value {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => "-".to_string(),
    };
    [
        format!("  Model:      {}", Style::new().bold().apply_to(&info.id)),
        format!("  Pipeline:   {}", field(info.pipeline_tag.clone())),
        format!("  Library:    {}", field(info.library_name.clone())),
        format!("  Downloads:  {}", field(info.downloads.map(|d| d.to_string()))),
        format!("  Inference:  {}", json_field(&info.inference)),
        format!("  Gated:      {}", json_field(&info.gated)),
    ]
    .join("\n")
}
