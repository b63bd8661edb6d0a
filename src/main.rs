use std::path::PathBuf;

use anyhow::{Context, Result};
use bluread::core::transfer_engine::TransferEngineType;
use bluread::core::{CopyJob, CopyOutcome};
use bluread::disc::{self, TitleFilter};
use bluread::logging::{self, LogConfig};
use bluread::{config, context};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use serde_json::Value;
use tracing::info;

#[derive(Parser)]
#[command(name = "bluread")]
#[command(about = "Resumable disc imaging and Blu-ray metadata", version, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalArgs,
}

#[derive(Args, Serialize)]
struct GlobalArgs {
    /// Config file to read instead of ./bluread.toml
    #[serde(skip)]
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[arg(
        long,
        global = true,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true"
    )]
    verbose: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[arg(
        long,
        global = true,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true"
    )]
    json_logs: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[arg(
        long,
        global = true,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true"
    )]
    simulation: Option<bool>,
}

#[derive(Subcommand)]
enum Commands {
    /// Copy (or resume copying) a fixed number of blocks
    Copy(CopyArgs),
    /// Print the volume id and geometry of a disc
    Identify(IdentifyArgs),
    /// Identify a disc and image it into the output directory
    Rip(RipArgs),
    /// Print Blu-ray title, chapter and stream metadata
    Info(InfoArgs),
    /// Print the effective configuration
    Config,
}

#[derive(Args, Serialize)]
struct CopyArgs {
    #[serde(skip)]
    source: PathBuf,

    #[serde(skip)]
    destination: PathBuf,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[arg(long, short = 'b')]
    block_size: Option<u64>,

    #[serde(skip)]
    #[arg(long, short = 'c')]
    block_count: u64,

    /// Name used in logs and errors; defaults to the destination file name
    #[serde(skip)]
    #[arg(long)]
    label: Option<String>,

    #[serde(rename = "transfer_engine", skip_serializing_if = "Option::is_none")]
    #[arg(long)]
    engine: Option<TransferEngineType>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[arg(
        long,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true"
    )]
    verify: Option<bool>,

    #[serde(rename = "dd_path", skip_serializing_if = "Option::is_none")]
    #[arg(long)]
    dd: Option<PathBuf>,
}

#[derive(Args, Serialize)]
struct IdentifyArgs {
    #[serde(skip)]
    device: PathBuf,

    #[serde(skip)]
    #[arg(long)]
    json: bool,

    #[serde(rename = "isoinfo_path", skip_serializing_if = "Option::is_none")]
    #[arg(long)]
    isoinfo: Option<PathBuf>,
}

#[derive(Args, Serialize)]
struct RipArgs {
    #[serde(skip)]
    device: PathBuf,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[arg(long, short = 'o')]
    output_directory: Option<PathBuf>,

    #[serde(rename = "transfer_engine", skip_serializing_if = "Option::is_none")]
    #[arg(long)]
    engine: Option<TransferEngineType>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[arg(
        long,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true"
    )]
    verify: Option<bool>,

    #[serde(rename = "isoinfo_path", skip_serializing_if = "Option::is_none")]
    #[arg(long)]
    isoinfo: Option<PathBuf>,

    #[serde(rename = "dd_path", skip_serializing_if = "Option::is_none")]
    #[arg(long)]
    dd: Option<PathBuf>,
}

#[derive(Args, Serialize)]
struct InfoArgs {
    #[serde(skip)]
    device: PathBuf,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[arg(long)]
    keydb: Option<PathBuf>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[arg(long)]
    title_filter: Option<TitleFilter>,

    /// Seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    #[arg(long)]
    min_title_length: Option<u32>,

    #[serde(skip)]
    #[arg(long, value_enum, default_value_t = OutputFormat::Xml)]
    format: OutputFormat,

    /// Single-line output
    #[serde(skip)]
    #[arg(long)]
    compact: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Xml,
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let overrides = cli_overrides(&cli)?;
    let config = config::AppConfig::new(cli.global.config.as_deref(), Some(&overrides))?;
    logging::init(LogConfig::from(&config));

    let ctx = context::AppContext::new(config);

    match &cli.command {
        Commands::Copy(args) => run_copy(&ctx, args).await.context("Copy failed")?,
        Commands::Identify(args) => run_identify(&ctx, args)
            .await
            .context("Failed to identify disc")?,
        Commands::Rip(args) => run_rip(&ctx, args).await.context("Rip failed")?,
        Commands::Info(args) => run_info(&ctx, args)
            .await
            .context("Failed to read disc metadata")?,
        Commands::Config => print!("{}", ctx.config.to_toml()?),
    }

    Ok(())
}

/// Merge the global and per-command flags into one override layer.
fn cli_overrides(cli: &Cli) -> Result<Value> {
    let mut merged = serde_json::to_value(&cli.global)?;
    let command = match &cli.command {
        Commands::Copy(args) => serde_json::to_value(args)?,
        Commands::Identify(args) => serde_json::to_value(args)?,
        Commands::Rip(args) => serde_json::to_value(args)?,
        Commands::Info(args) => serde_json::to_value(args)?,
        Commands::Config => Value::Null,
    };

    if let (Some(target), Value::Object(extra)) = (merged.as_object_mut(), command) {
        target.extend(extra);
    }
    Ok(merged)
}

async fn run_copy(ctx: &context::AppContext, args: &CopyArgs) -> Result<()> {
    let label = args.label.clone().unwrap_or_else(|| {
        args.destination
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| args.destination.display().to_string())
    });

    let job = CopyJob::new(
        &args.source,
        &args.destination,
        ctx.config.block_size,
        args.block_count,
        label,
    )?;

    let outcome = ctx.copier().copy(&job).await?;
    println!("{}", describe(&job, &outcome));
    Ok(())
}

async fn run_identify(ctx: &context::AppContext, args: &IdentifyArgs) -> Result<()> {
    let identity = ctx.identifier().identify(&args.device).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&identity)?);
    } else {
        println!("Volume id:   {}", identity.volume_id.as_deref().unwrap_or("-"));
        println!("Block size:  {}", identity.block_size);
        println!("Block count: {}", identity.block_count);
        println!("Size:        {} bytes", identity.size_bytes());
    }
    Ok(())
}

async fn run_rip(ctx: &context::AppContext, args: &RipArgs) -> Result<()> {
    let identity = ctx.identifier().identify(&args.device).await?;
    let destination = ctx.image_path(&identity);

    tokio::fs::create_dir_all(&ctx.config.output_directory)
        .await
        .with_context(|| {
            format!(
                "Failed to create output directory {}",
                ctx.config.output_directory.display()
            )
        })?;

    info!(
        device = %args.device.display(),
        destination = %destination.display(),
        volume_id = identity.label(),
        "Ripping disc"
    );

    let job = CopyJob::new(
        &args.device,
        &destination,
        identity.block_size,
        identity.block_count,
        identity.label(),
    )?;

    let outcome = ctx.copier().copy(&job).await?;
    println!("{}", describe(&job, &outcome));
    Ok(())
}

async fn run_info(ctx: &context::AppContext, args: &InfoArgs) -> Result<()> {
    let reader = ctx.reader()?;
    let request = ctx.read_request(&args.device);

    let disc = tokio::task::spawn_blocking(move || reader.read(&request))
        .await
        .context("Disc reader task panicked")??;

    let pretty = !args.compact;
    let rendered = match args.format {
        OutputFormat::Xml => disc::xml::to_xml(&disc, pretty),
        OutputFormat::Json if pretty => serde_json::to_string_pretty(&disc)?,
        OutputFormat::Json => serde_json::to_string(&disc)?,
    };
    println!("{}", rendered);
    Ok(())
}

fn describe(job: &CopyJob, outcome: &CopyOutcome) -> String {
    let destination = job.destination.display();
    match outcome {
        CopyOutcome::AlreadyComplete { existing_bytes } => {
            format!("{destination}: already complete ({existing_bytes} bytes)")
        }
        CopyOutcome::Copied { blocks } => {
            format!("{destination}: copied {blocks} blocks")
        }
        CopyOutcome::Resumed {
            aligned_bytes,
            blocks,
        } => format!(
            "{destination}: resumed, aligned {aligned_bytes} bytes and copied {blocks} remaining blocks"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(line: &str) -> Cli {
        Cli::try_parse_from(line.split_whitespace()).unwrap()
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flag_before_subcommand() {
        let cli = parse("bluread --verbose copy /dev/sr0 out.iso -c 10");
        assert_eq!(cli.global.verbose, Some(true));
        match cli.command {
            Commands::Copy(args) => {
                assert_eq!(args.source, PathBuf::from("/dev/sr0"));
                assert_eq!(args.destination, PathBuf::from("out.iso"));
                assert_eq!(args.block_count, 10);
            }
            _ => panic!("expected copy"),
        }
    }

    #[test]
    fn test_flag_before_positionals() {
        let cli = parse("bluread copy --verify /dev/sr0 out.iso -c 10");
        match cli.command {
            Commands::Copy(args) => {
                assert_eq!(args.verify, Some(true));
                assert_eq!(args.source, PathBuf::from("/dev/sr0"));
            }
            _ => panic!("expected copy"),
        }
    }

    #[test]
    fn test_explicit_false_overrides_config() {
        let cli = parse("bluread rip /dev/sr0 --verify=false --simulation");
        assert_eq!(cli.global.simulation, Some(true));
        match &cli.command {
            Commands::Rip(args) => {
                assert_eq!(args.verify, Some(false));
                assert_eq!(args.device, PathBuf::from("/dev/sr0"));
            }
            _ => panic!("expected rip"),
        }

        let overrides = cli_overrides(&cli).unwrap();
        assert_eq!(overrides["verify"], false);
        assert_eq!(overrides["simulation"], true);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = parse("bluread info --json-logs /dev/sr0 --format json");
        assert_eq!(cli.global.json_logs, Some(true));
        assert!(matches!(
            cli.command,
            Commands::Info(InfoArgs {
                format: OutputFormat::Json,
                ..
            })
        ));
    }

    #[test]
    fn test_overrides_use_config_keys() {
        let cli = parse("bluread copy a b -c 4 -b 512 --engine native");
        let overrides = cli_overrides(&cli).unwrap();
        assert_eq!(overrides["block_size"], 512);
        assert_eq!(overrides["transfer_engine"], "native");
        assert!(overrides.get("verify").is_none());
        assert!(overrides.get("block_count").is_none());
    }
}
