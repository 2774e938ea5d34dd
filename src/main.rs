use clap::Parser;
use ninja_surfing::cli::commands::{cmd_labels, cmd_run, cmd_settings};
use ninja_surfing::cli::config::{Cli, Commands, load_config};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = load_config(cli.config.as_deref());

    match cli.command {
        Commands::Labels {
            count,
            scheme,
            start,
        } => {
            let scheme = scheme.unwrap_or(config.settings.label_scheme);
            print!("{}", cmd_labels(count, scheme, start));
        }
        Commands::Run {
            scenario,
            trace,
            output,
        } => {
            // Resolve trace path: CLI > config
            let trace = trace.as_deref().or(config.run.trace.as_deref());
            let (report, all_passed) = cmd_run(&scenario, trace)?;
            match output {
                Some(path) => std::fs::write(path, &report)?,
                None => print!("{}", report),
            }
            if !all_passed {
                std::process::exit(1);
            }
        }
        Commands::Settings { set } => {
            print!("{}", cmd_settings(&config, &set)?);
        }
    }

    Ok(())
}

/// `RUST_LOG` wins; otherwise each `-v` raises the level one step.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .init();
}
