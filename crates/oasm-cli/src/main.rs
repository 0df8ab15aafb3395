use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

use oasm_core::config::{self, CONFIG_FILE_NAME, ModelConfig};
use oasm_core::{ApiModel, SpecLoader};

#[derive(Parser)]
#[command(
    name = "oasm",
    about = "OpenAPI 2.0-3.2 loader, validator and semantic model inspector",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load, validate and resolve an OpenAPI spec
    Validate {
        /// Path, file:// URI or http(s):// URL of the spec (YAML or JSON)
        #[arg(short, long)]
        input: Option<String>,
    },

    /// Print a summary of the resolved model
    Inspect {
        /// Path, file:// URI or http(s):// URL of the spec (YAML or JSON)
        #[arg(short, long)]
        input: Option<String>,

        /// Output format
        #[arg(long, default_value = "yaml")]
        format: InspectFormat,
    },

    /// Initialize a new oasm configuration
    Init {
        /// Overwrite existing files
        #[arg(long)]
        force: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

#[derive(Clone, ValueEnum)]
enum InspectFormat {
    Yaml,
    Json,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { input } => cmd_validate(input),

        Commands::Inspect { input, format } => cmd_inspect(input, format),

        Commands::Init { force } => cmd_init(force),

        Commands::Completions { shell } => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            clap_complete::generate(shell, &mut cmd, "oasm", &mut std::io::stdout());
            Ok(())
        }
    }
}

/// Try to load the project config file from the current directory.
fn try_load_config() -> Result<Option<ModelConfig>> {
    let config_path = PathBuf::from(CONFIG_FILE_NAME);
    config::load_config(&config_path).map_err(|e| anyhow::anyhow!(e))
}

/// Load the model named on the command line, else the configured input.
fn load_model(input: Option<String>) -> Result<ApiModel> {
    let cfg = try_load_config()?.unwrap_or_default();
    let input = input.unwrap_or_else(|| cfg.input.clone());
    log::debug!("loading {input}");
    ApiModel::load_with(&SpecLoader::new(), &input, &cfg)
        .with_context(|| format!("failed to load {input}"))
}

fn print_diagnostics(model: &ApiModel) {
    let diagnostics = model.diagnostics().entries();
    if diagnostics.is_empty() {
        return;
    }
    eprintln!("{} diagnostic(s):", diagnostics.len());
    for diagnostic in diagnostics {
        eprintln!("  {diagnostic}");
    }
}

fn cmd_validate(input: Option<String>) -> Result<()> {
    let model = load_model(input)?;
    let info = model.document().info();
    let version = model
        .spec_version()
        .map(|v| format!("{} {}", v.kind.as_str(), v.version))
        .unwrap_or_else(|| "unknown".to_string());

    eprintln!("Valid {version} spec: {}", info.title);
    eprintln!("  Version: {}", info.version);
    eprintln!("  Documents: {}", model.cache().len());
    eprintln!("  Operations: {}", model.operations().len());
    eprintln!("  Webhooks: {}", model.webhooks().len());
    eprintln!("  Schemas: {}", model.schema_registry().len());
    eprintln!("  Discriminators: {}", model.discriminators().len());
    eprintln!("  Security schemes: {}", model.security_schemes().len());
    print_diagnostics(&model);

    eprintln!("Validation successful.");
    Ok(())
}

fn cmd_inspect(input: Option<String>, format: InspectFormat) -> Result<()> {
    let model = load_model(input)?;
    let summary = build_inspect_summary(&model)?;

    match format {
        InspectFormat::Yaml => {
            let yaml = serde_yaml_ng::to_string(&summary)?;
            print!("{}", yaml);
        }
        InspectFormat::Json => {
            let json = serde_json::to_string_pretty(&summary)?;
            println!("{}", json);
        }
    }
    print_diagnostics(&model);

    Ok(())
}

fn build_inspect_summary(model: &ApiModel) -> Result<serde_json::Value> {
    let info = model.document().info();

    let schemas: Vec<serde_json::Value> = model
        .ir_schemas()
        .iter()
        .map(|s| {
            serde_json::json!({
                "name": s.name().pascal_case,
                "kind": match s {
                    oasm_core::ir::IrSchema::Object(_) => "object",
                    oasm_core::ir::IrSchema::Enum(_) => "enum",
                    oasm_core::ir::IrSchema::Alias(_) => "alias",
                    oasm_core::ir::IrSchema::Union(_) => "union",
                },
            })
        })
        .collect();

    let operations: Vec<serde_json::Value> = model
        .resources()
        .iter()
        .flat_map(|r| &r.operations)
        .map(|op| {
            let info = &op.operation;
            let params: Vec<serde_json::Value> = model
                .param_serializations(info)
                .iter()
                .map(|p| {
                    serde_json::json!({
                        "name": p.original_name,
                        "in": p.location.as_str(),
                        "style": p.style.as_str(),
                        "explode": p.explode,
                    })
                })
                .collect();
            let responses: Vec<serde_json::Value> = model
                .response_variants(info)
                .iter()
                .map(|v| serde_json::json!({"status": v.status, "kind": v.kind}))
                .collect();
            serde_json::json!({
                "name": op.method_name,
                "method": info.method.as_str(),
                "path": info.path,
                "action": op.action,
                "body": model.body_variant(info).map(|b| b.kind()),
                "parameters": params,
                "responses": responses,
                "deprecated": info.deprecated,
            })
        })
        .collect();

    let discriminators: serde_json::Map<String, serde_json::Value> = model
        .discriminators()
        .iter()
        .map(|(parent, d)| Ok((parent.clone(), serde_json::to_value(d)?)))
        .collect::<Result<_>>()?;

    Ok(serde_json::json!({
        "info": {
            "title": info.title,
            "version": info.version,
        },
        "servers": model.servers().iter().map(|s| s.default_url()).collect::<Vec<_>>(),
        "securitySchemes": serde_json::to_value(model.security_schemes())?,
        "schemas": schemas,
        "discriminators": discriminators,
        "operations": operations,
        "webhooks": model
            .webhooks()
            .iter()
            .map(|w| w.display_name())
            .collect::<Vec<_>>(),
        "resources": model
            .resources()
            .iter()
            .map(|r| &r.name.original)
            .collect::<Vec<_>>(),
    }))
}

fn cmd_init(force: bool) -> Result<()> {
    let config_path = PathBuf::from(CONFIG_FILE_NAME);

    if config_path.exists() && !force {
        anyhow::bail!(
            "{} already exists. Use --force to overwrite.",
            config_path.display()
        );
    }

    fs::write(&config_path, config::default_config_content())
        .with_context(|| format!("failed to write {}", config_path.display()))?;
    eprintln!("Created {}", config_path.display());
    Ok(())
}
