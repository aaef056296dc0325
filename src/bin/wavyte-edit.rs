use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use wavyte_edit::{
    Composition, CompositionId, CompositionIR, EditError, EditPlan, EditorConfig, InMemoryAssets,
    Selector, resolve, validate_ir,
};

#[derive(Parser, Debug)]
#[command(name = "wavyte-edit", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check a composition IR against every document invariant.
    Validate(ValidateArgs),
    /// Resolve a selector against a composition IR.
    Resolve(ResolveArgs),
    /// Apply one edit plan and print its receipt.
    Apply(ApplyArgs),
}

#[derive(Parser, Debug)]
struct ValidateArgs {
    /// Input composition IR JSON.
    #[arg(long = "in")]
    in_path: PathBuf,
}

#[derive(Parser, Debug)]
struct ResolveArgs {
    /// Input composition IR JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Selector JSON.
    #[arg(long)]
    selector: PathBuf,
}

#[derive(Parser, Debug)]
struct ApplyArgs {
    /// Input composition IR JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Edit plan JSON.
    #[arg(long)]
    plan: PathBuf,

    /// Asset catalog JSON (array of asset records).
    #[arg(long)]
    assets: Option<PathBuf>,

    /// Write the edited IR here.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Editor config JSON.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Validate(args) => cmd_validate(args),
        Command::Resolve(args) => cmd_resolve(args),
        Command::Apply(args) => cmd_apply(args),
    }
}

fn cmd_validate(args: ValidateArgs) -> anyhow::Result<()> {
    let ir = CompositionIR::from_path(&args.in_path)?;
    let violations = validate_ir(&ir);
    if violations.is_empty() {
        eprintln!("{}: ok ({} elements)", args.in_path.display(), ir.elements.len());
        return Ok(());
    }
    for v in &violations {
        eprintln!("{v}");
    }
    anyhow::bail!(
        "{}: {} invariant violation(s)",
        args.in_path.display(),
        violations.len()
    )
}

fn cmd_resolve(args: ResolveArgs) -> anyhow::Result<()> {
    let ir = CompositionIR::from_path(&args.in_path)?;
    let selector: Selector = read_json(&args.selector)?;
    let resolution = resolve(&selector, &ir)?;
    let out = serde_json::json!({
        "ambiguous": resolution.ambiguous,
        "matches": resolution.ids(),
        "options": resolution.options,
    });
    print_json(&out)
}

fn cmd_apply(args: ApplyArgs) -> anyhow::Result<()> {
    let ir = CompositionIR::from_path(&args.in_path)?;
    let plan: EditPlan = read_json(&args.plan)?;
    let assets = match &args.assets {
        Some(p) => InMemoryAssets::from_path(p)?,
        None => InMemoryAssets::new(),
    };
    let config = match &args.config {
        Some(p) => EditorConfig::from_path(p)?,
        None => EditorConfig::default(),
    };

    let id = CompositionId::new(
        args.in_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "composition".to_string()),
    );
    let mut comp = Composition::from_ir(id, ir, 0, config)?;

    let outcome = match comp.apply_plan(&plan, &assets) {
        Ok(outcome) => outcome,
        Err(EditError::AmbiguousSelector { options }) => {
            eprintln!("selector is ambiguous; choose one of {} options", options.len());
            return print_json(&serde_json::json!({
                "status": "ambiguous",
                "options": options,
            }));
        }
        Err(e) => {
            return Err(anyhow::Error::new(e).context(format!("apply '{}'", args.plan.display())));
        }
    };

    if let Some(out) = &args.out {
        if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create output dir '{}'", parent.display()))?;
        }
        let f = File::create(out).with_context(|| format!("create '{}'", out.display()))?;
        serde_json::to_writer_pretty(f, comp.ir())
            .with_context(|| format!("write IR '{}'", out.display()))?;
        eprintln!("wrote {}", out.display());
    }

    print_json(&serde_json::json!({
        "status": "applied",
        "version": outcome.version,
        "receipt": outcome.receipt,
    }))
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let f = File::open(path).with_context(|| format!("open '{}'", path.display()))?;
    serde_json::from_reader(BufReader::new(f))
        .with_context(|| format!("parse JSON '{}'", path.display()))
}

fn print_json(v: &serde_json::Value) -> anyhow::Result<()> {
    let s = serde_json::to_string_pretty(v).context("serialize output")?;
    println!("{s}");
    Ok(())
}
