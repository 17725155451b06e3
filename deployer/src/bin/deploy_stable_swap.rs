// deployer/src/bin/deploy_stable_swap.rs

use clap::Parser;
use contract_deployer::{
    cli::{connect, init_tracing, parse_cli, DeployArgs},
    config::load_config,
    finish,
    flows::deploy_stable_swap,
    AddressBookReporter,
};
use eyre::Result;
use std::{env, io, process::ExitCode};

#[derive(Parser, Debug)]
#[command(about = "Deploy a fresh StableSwap exchange and record its address")]
struct Cli {
    #[command(flatten)]
    deploy: DeployArgs,
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = match parse_cli::<Cli, _, _, _>(env::args_os(), &mut io::stderr()) {
        Ok(cli) => cli,
        Err(status) => return status.into(),
    };

    let result = run(&cli.deploy).await;
    finish(result, &mut io::stderr()).into()
}

async fn run(args: &DeployArgs) -> Result<()> {
    let config = args.apply(load_config()?);
    let (deployer, signer) = connect(&config).await?;
    let reporter = AddressBookReporter::new(&config.address_book_path);

    let mut stdout = io::stdout();
    let (deployed, outcome) =
        deploy_stable_swap(&deployer, signer, &args.constructor_args, &reporter, &mut stdout).await?;
    if !outcome.is_recorded() {
        tracing::warn!(address = %deployed.checksummed_address(), "Exchange address must be recorded by hand");
    }
    Ok(())
}
