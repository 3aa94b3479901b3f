use std::process::ExitCode;

use anyhow::Context;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use valparse::{
    Checker, Cli, Config, ConfigManager, ErrorReporter, MarkerWriter, Output, OutputFormat,
    Report, dump_suppressions,
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse_args();

    if let Err(e) = cli.validate() {
        eprintln!("Error: {}", e);
        return ExitCode::from(2);
    }

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(cli.verbosity().log_filter())),
        )
        .init();

    let config = match ConfigManager::load_config(&cli).await {
        Ok(config) => config,
        Err(e) => {
            ErrorReporter::new(cli.verbosity()).report_config_error(&e);
            return ExitCode::from(2);
        }
    };
    let verbosity = config.output.verbosity();
    debug!(?config, "loaded configuration");

    let parsed = match tokio::fs::read_to_string(&cli.xmlfile).await {
        Ok(text) => Report::parse_str(&text),
        Err(e) => Err(e.into()),
    };
    let report = match parsed {
        Ok(report) => report,
        Err(e) => {
            ErrorReporter::new(verbosity).report_parse_error(&cli.xmlfile, &e);
            return ExitCode::FAILURE;
        }
    };
    info!(
        path = %cli.xmlfile.display(),
        errors = report.error_count(),
        leaks = report.leak_count(),
        "parsed report"
    );

    match run(&cli, &config, &report).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli, config: &Config, report: &Report) -> anyhow::Result<ExitCode> {
    if let Some(path) = &cli.dump_suppressions {
        let named = report.all_suppressions().enumerate().map(|(i, supp)| {
            let name = match &cli.suppression_prefix {
                Some(prefix) => format!("{}-{}", prefix, i + 1),
                None => supp.name.clone(),
            };
            (name, supp)
        });
        dump_suppressions(path, named, cli.append)
            .with_context(|| format!("Failed to write suppressions to {}", path.display()))?;
    }

    let checker = Checker::new(&config.signals).context("Invalid signal policy")?;
    let verdict = checker.evaluate(report);

    let output = Output::new(config.output.verbosity());
    match config.output.format {
        OutputFormat::Json => println!("{}", output.format_json(report, &verdict)?),
        OutputFormat::Human => print!("{}", output.format_results(report, &verdict)),
    }

    if config.markers.create_files {
        let written = MarkerWriter::new(&config.markers)
            .apply(&verdict)
            .await
            .context("Failed to write marker files")?;
        debug!(?written, "marker files updated");
    }

    Ok(ExitCode::from(verdict.exit_code()))
}
