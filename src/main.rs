use clap::Parser;
use form_autofill::cli::commands::{cmd_fill, cmd_profile, cmd_run, cmd_scan};
use form_autofill::cli::config::{load_config, Cli, Commands};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref());

    // Resolve completion settings: CLI > config > defaults
    let endpoint = cli.endpoint.as_deref().or(config.openai.endpoint.as_deref());
    let model = cli.model.as_deref().or(config.openai.model.as_deref());

    match cli.command {
        Commands::Scan { doc, mode, format } => {
            let mode = mode.as_deref().unwrap_or(&config.fill.mode);
            cmd_scan(&doc, mode, &format, cli.verbose)?;
        }
        Commands::Fill {
            doc,
            output,
            mode,
            service,
        } => {
            let mode = mode.as_deref().unwrap_or(&config.fill.mode);
            let succeeded = cmd_fill(
                &doc,
                output.as_deref(),
                mode,
                &service,
                endpoint,
                model,
                &config,
                cli.verbose,
            )?;
            if !succeeded {
                std::process::exit(1);
            }
        }
        Commands::Run { scenario, service } => {
            let all_passed = cmd_run(&scenario, &service, endpoint, model, &config, cli.verbose)?;
            if !all_passed {
                std::process::exit(1);
            }
        }
        Commands::Profile { command } => {
            cmd_profile(&command, &config.fill.store)?;
        }
    }

    Ok(())
}
