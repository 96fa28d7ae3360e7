use clap::Parser;
use pstmargin_cli::{load_config, Cli, Commands};
use tracing::error;
use tracing_subscriber::FmtSubscriber;

mod commands;

fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = load_config(cli.config.as_deref())?;

    match &cli.command {
        Commands::Base { dataset } => commands::base::handle(dataset.as_deref(), &config),
        Commands::Optimize {
            dataset,
            solver,
            time_limit,
            out,
        } => commands::optimize::handle(
            dataset.as_deref(),
            *solver,
            *time_limit,
            out.as_deref(),
            &config,
        ),
        Commands::Evaluate { controls, dataset } => {
            commands::evaluate::handle(controls, dataset.as_deref(), &config)
        }
        Commands::Report {
            dataset,
            out_dir,
            solver,
            time_limit,
        } => commands::report::handle(dataset.as_deref(), out_dir, *solver, *time_limit, &config),
        Commands::Dataset { command } => commands::dataset::handle(command, &config),
    }
}

fn main() {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(cli.log_level)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("failed to install log subscriber: {err}");
    }

    if let Err(err) = run(&cli) {
        error!("{:#}", err);
        std::process::exit(1);
    }
}
