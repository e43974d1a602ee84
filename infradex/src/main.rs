use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

mod browse;
mod config;
mod errors;
mod logging;
mod rpc;
mod serve;

use config::Config;
use errors::CliError;

#[derive(Parser)]
#[command(name = "infradex", about = "Blockchain infrastructure provider catalog")]
struct Cli {
    #[arg(long, short, default_value = "infradex.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand)]
enum CliCommand {
    /// Run the catalog API, plus the submission endpoint when configured
    Serve,
    /// Print the catalog of one network as the explorer shows it
    Browse(browse::BrowseArgs),
    /// Print the record line for a form file. Needs no config.
    EncodeRpc {
        form: PathBuf,
        /// Prefix the record header
        #[arg(long)]
        header: bool,
    },
    /// Open a change request adding the form to the network's records
    SubmitRpc { network: String, form: PathBuf },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("infradex: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    if let CliCommand::EncodeRpc { form, header } = &cli.command {
        let _guard = logging::init(None);
        return rpc::encode_rpc(form, *header);
    }

    let config = Config::from_file(&cli.config)?;
    let _guard = logging::init(config.common.logging.as_ref());
    logging::init_metrics(config.common.metrics.as_ref())?;

    match cli.command {
        CliCommand::Serve => serve::run(config).await,
        CliCommand::Browse(args) => browse::run(&config, args).await,
        CliCommand::EncodeRpc { form, header } => rpc::encode_rpc(&form, header),
        CliCommand::SubmitRpc { network, form } => rpc::submit_rpc(&config, &network, &form).await,
    }
}
