use std::collections::BTreeMap;
use std::fmt::Write as _;

use anyhow::{anyhow, bail, Context};
use colored::Colorize;
use hparams_format::{render, LineParser, LoadPolicy, ParserConfig};
use hparams_store::keypath::split_keypath;
use hparams_store::{HierarchicalStore, Value};
use tracing::debug;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let out = execute(&cli)?;
    print!("{out}");
    Ok(())
}

/// Run a command and return what it would print.
fn execute(cli: &Cli) -> anyhow::Result<String> {
    match &cli.command {
        Command::Resolve(args) => cmd_resolve(cli, args),
        Command::Get(args) => cmd_get(cli, args),
        Command::Dump(args) => cmd_dump(cli, args),
        Command::Check(args) => cmd_check(cli, args),
    }
}

fn load(cli: &Cli, source: &SourceArgs) -> anyhow::Result<HierarchicalStore> {
    let policy = if cli.skip_invalid {
        LoadPolicy::SkipInvalid
    } else {
        LoadPolicy::Strict
    };
    let parser = LineParser::default().with_policy(policy);
    let mut store = HierarchicalStore::with_separator(cli.separator);
    for file in &source.files {
        let report = parser
            .load_file(&mut store, file)
            .with_context(|| format!("failed to load {}", file.display()))?;
        debug!(file = %file.display(), applied = report.applied, skipped = report.skipped, "loaded");
        if report.skipped > 0 {
            eprintln!(
                "{} skipped {} invalid line(s) in {}",
                "warning:".yellow().bold(),
                report.skipped,
                file.display()
            );
        }
    }
    Ok(store)
}

fn write_map(cli: &Cli, map: &BTreeMap<String, String>) -> anyhow::Result<String> {
    match cli.format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(map)? + "\n"),
        OutputFormat::Text => {
            let mut out = String::new();
            for (key, value) in map {
                writeln!(out, "{} = {}", key.bold(), value)?;
            }
            Ok(out)
        }
    }
}

fn cmd_resolve(cli: &Cli, args: &ResolveArgs) -> anyhow::Result<String> {
    let store = load(cli, &args.source)?;
    let path = match args.path.as_deref() {
        Some(p) if !p.is_empty() => split_keypath(p, cli.separator)?,
        _ => Vec::new(),
    };
    let resolved = if args.keys.is_empty() {
        store.resolve_all(&path)
    } else {
        let keys: Vec<&str> = args.keys.iter().map(String::as_str).collect();
        store.resolve(&keys, &path)
    };
    write_map(cli, &resolved)
}

fn cmd_get(cli: &Cli, args: &GetArgs) -> anyhow::Result<String> {
    let store = load(cli, &args.source)?;
    match store.get(&args.keypath) {
        Some(Value::Scalar(value)) => match cli.format {
            OutputFormat::Json => Ok(serde_json::to_string(value)? + "\n"),
            OutputFormat::Text => Ok(format!("{value}\n")),
        },
        Some(Value::SubTree(_)) => bail!("{} is a sub-tree, not a value", args.keypath),
        None => Err(anyhow!("{} is not set", args.keypath)),
    }
}

fn cmd_dump(cli: &Cli, args: &DumpArgs) -> anyhow::Result<String> {
    let store = load(cli, &args.source)?;
    match cli.format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(store.root())? + "\n"),
        OutputFormat::Text => Ok(render(&store, &ParserConfig::default())?),
    }
}

fn cmd_check(cli: &Cli, args: &CheckArgs) -> anyhow::Result<String> {
    let store = load(cli, &args.source)?;
    let count = store.scalar_count();
    match cli.format {
        OutputFormat::Json => Ok(serde_json::json!({
            "files": args.source.files.len(),
            "parameters": count,
        })
        .to_string()
            + "\n"),
        OutputFormat::Text => Ok(format!(
            "{} {} parameter(s) in {} file(s)\n",
            "✓".green().bold(),
            count.to_string().bold(),
            args.source.files.len()
        )),
    }
}
