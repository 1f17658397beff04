use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use smart_rx_cli::{order_lines_from_args, read_order_file, read_order_stream, render, OutputFormat};
use smart_rx_core::{BatchParser, Drug, DrugForm};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "smart-rx")]
#[command(about = "Parse prescription shorthand into structured dosing", version)]
struct Cli {
    /// Orders to parse, e.g. "2 BD x 5 days". Reads --file or stdin when empty.
    inputs: Vec<String>,

    /// File with one order per line ('#' starts a comment)
    #[arg(long, short, value_name = "FILE", conflicts_with = "inputs")]
    file: Option<PathBuf>,

    /// Drug form used for quantity rules (tablet, syrup, cream, ...)
    #[arg(long, env = "SMART_RX_FORM")]
    form: Option<String>,

    /// Bottle size in mL for liquid forms
    #[arg(long, value_name = "ML", value_parser = clap::value_parser!(u32).range(1..))]
    bottle_size: Option<u32>,

    /// Output format
    #[arg(long, short, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("SMART_RX_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn drug_from_args(cli: &Cli) -> Result<Option<Drug>> {
    let Some(form) = cli.form.as_deref() else {
        if cli.bottle_size.is_some() {
            tracing::warn!("--bottle-size ignored without --form");
        }
        return Ok(None);
    };

    let form: DrugForm = form.parse().context("Invalid --form")?;
    let mut drug = Drug::new(form);
    if let Some(bottle_size) = cli.bottle_size {
        drug = drug.with_bottle_size(bottle_size);
    }
    Ok(Some(drug))
}

fn run(cli: Cli) -> Result<bool> {
    let drug = drug_from_args(&cli)?;

    let lines = if !cli.inputs.is_empty() {
        order_lines_from_args(&cli.inputs)
    } else if let Some(path) = &cli.file {
        read_order_file(path)?
    } else {
        read_order_stream(io::stdin().lock())?
    };
    tracing::info!(orders = lines.len(), form = ?drug.as_ref().map(|d| d.form), "parsing orders");

    let batch = BatchParser::new(drug.as_ref()).parse_all(&lines);
    print!("{}", render(&batch, cli.output)?);

    Ok(batch.all_valid())
}

fn main() -> ExitCode {
    init_logging();

    match run(Cli::parse()) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(2)
        }
    }
}
