// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod logging;
mod runtime;

use anyhow::{Context, Result, anyhow, bail};
use config::Config;
use logging::LogTarget;
use orcamento_app::{Category, DocumentVariant, LoadingFlag, Quote, SheetState, WorkflowOutcome};
use runtime::{CommandShare, DocumentsDir, SheetHost, StderrNotifier};
use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

fn main() {
    if let Err(error) = run() {
        if !error.is::<AlreadyReported>() {
            eprintln!("{error:#}");
        }
        std::process::exit(1);
    }
}

/// Exit error for a headless run whose notice already reached stderr.
#[derive(Debug)]
struct AlreadyReported;

impl fmt::Display for AlreadyReported {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("document was not generated")
    }
}

impl std::error::Error for AlreadyReported {}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `orcamento --print-example-config` to generate a v1 template",
            options.config_path.display()
        )
    })?;

    let documents_dir = config.documents_dir()?;
    if options.print_documents_dir {
        println!("{}", documents_dir.display());
        return Ok(());
    }

    let headless = options.generate.is_some() || options.check_only;
    let log_target = if headless {
        LogTarget::Stderr
    } else {
        LogTarget::File(documents_dir.clone())
    };
    logging::init(config.log_filter(), &log_target)?;

    let categories = load_categories(&config)?;
    let service = orcamento_pdf::Client::new(config.service_url(), config.service_timeout()?)
        .with_context(|| {
            format!(
                "invalid [service] config in {}; fix url/timeout values",
                options.config_path.display()
            )
        })?;
    let store = DocumentsDir::new(documents_dir);
    tracing::info!(
        config = %options.config_path.display(),
        documents_dir = %store.root().display(),
        service = service.url(),
        timeout_ms = service.timeout().as_millis() as u64,
        categories = categories.len(),
        "startup complete"
    );
    let host = SheetHost::new(service, store, CommandShare::new(config.share_command()));

    if options.check_only {
        return Ok(());
    }

    if let Some(quote_path) = &options.generate {
        return generate_headless(&host, quote_path, options.variant, categories);
    }

    let mut state = SheetState::default();
    let mut quote = Quote::new(categories);
    let mut host = host;
    orcamento_tui::run_app(&mut state, &mut quote, &mut host)
}

fn load_categories(config: &Config) -> Result<Vec<Category>> {
    match config.catalog_path() {
        Some(path) => orcamento_app::load_catalog(&path).with_context(|| {
            format!(
                "load [catalog] path {}; remove it to use the bundled catalog",
                path.display()
            )
        }),
        None => orcamento_app::default_catalog(),
    }
}

/// Reads a quote saved as JSON and runs one generation without the screen.
/// A file without categories is priced against the catalog.
fn generate_headless(
    host: &SheetHost,
    quote_path: &Path,
    variant: Option<DocumentVariant>,
    catalog: Vec<Category>,
) -> Result<()> {
    let quote = read_quote(quote_path, catalog)?;
    match host.generate(&quote, variant, &LoadingFlag::default(), &StderrNotifier) {
        WorkflowOutcome::Succeeded(document) => {
            println!("{}", document.path.display());
            Ok(())
        }
        WorkflowOutcome::MissingVariant => {
            bail!("--generate needs --tipo cliente or --tipo construtor")
        }
        WorkflowOutcome::Rejected(_) | WorkflowOutcome::Failed(_) => Err(AlreadyReported.into()),
    }
}

fn read_quote(path: &Path, catalog: Vec<Category>) -> Result<Quote> {
    let raw =
        fs::read_to_string(path).with_context(|| format!("read quote file {}", path.display()))?;
    let mut quote: Quote = serde_json::from_str(&raw).with_context(|| {
        format!(
            "parse quote file {} (expected an object with \"cliente\" and \"categorias\")",
            path.display()
        )
    })?;

    let client = quote.client.clone();
    quote.client.set_name(&client.name);
    quote.client.set_phone(&client.phone);
    if quote.categories.is_empty() {
        quote.categories = catalog;
    }
    Ok(quote)
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    print_config_path: bool,
    print_documents_dir: bool,
    print_example: bool,
    check_only: bool,
    show_help: bool,
    generate: Option<PathBuf>,
    variant: Option<DocumentVariant>,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        print_config_path: false,
        print_documents_dir: false,
        print_example: false,
        check_only: false,
        show_help: false,
        generate: None,
        variant: None,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-documents-dir" => {
                options.print_documents_dir = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--generate" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--generate requires a quote JSON file"))?;
                options.generate = Some(PathBuf::from(value.as_ref()));
            }
            "--tipo" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--tipo requires cliente or construtor"))?;
                let variant = DocumentVariant::parse(value.as_ref()).ok_or_else(|| {
                    anyhow!(
                        "--tipo must be cliente or construtor, got {:?}",
                        value.as_ref()
                    )
                })?;
                options.variant = Some(variant);
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            unknown => {
                return Err(anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    if options.variant.is_some() && options.generate.is_none() {
        bail!("--tipo only applies together with --generate <quote.json>");
    }

    Ok(options)
}

fn print_help() {
    println!("orcamento");
    println!("  --config <path>            Use a specific config path");
    println!("  --print-config-path        Print resolved config path");
    println!("  --print-documents-dir      Print where generated PDFs are saved");
    println!("  --print-example-config     Print a v1 config template");
    println!("  --check                    Validate config, catalog, and service settings");
    println!("  --generate <quote.json>    Generate a PDF without the interactive sheet");
    println!("  --tipo <cliente|construtor>  Document variant for --generate");
    println!("  --help                     Show this help");
}
