use std::path::PathBuf;

use clap::Parser;

use ::friendfi::integration_tests::registry::ScenarioRegistry;
use ::friendfi::*;

/// Integration test driver for FriendFi. Needs a devnet with the contract
/// deployed and an IPFS node; see the integration_tests module docs.
#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    /// Directory for application data
    #[clap(long, value_name = "PATH", required = true)]
    data_dir: PathBuf,

    /// Directory for application logs
    #[clap(long, value_name = "PATH", required = true)]
    logs_dir: PathBuf,

    /// Run a single scenario by name instead of the whole suite
    #[clap(long, value_name = "NAME")]
    scenario: Option<String>,

    /// JSON-RPC endpoint of the devnet node
    #[clap(long, value_name = "URL")]
    rpc_url: Option<String>,

    /// Address of the deployed contract on the devnet
    #[clap(long, value_name = "ADDRESS")]
    contract_address: Option<String>,

    /// IPFS HTTP API endpoint for uploads
    #[clap(long, value_name = "URL")]
    ipfs_api_url: Option<String>,

    /// IPFS gateway for content fetches
    #[clap(long, value_name = "URL")]
    ipfs_gateway_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), FriendFiError> {
    let args = Args::parse();

    tracing::info!("=== Starting FriendFi Integration Test Suite ===");

    let mut config = FriendFiConfig::new(&args.data_dir, &args.logs_dir);
    config.rpc_url_override = args.rpc_url;
    config.contract_address_override = args.contract_address;
    if let Some(ipfs_api_url) = args.ipfs_api_url {
        config.ipfs_api_url = ipfs_api_url;
    }
    if let Some(ipfs_gateway_url) = args.ipfs_gateway_url {
        config.ipfs_gateway_url = ipfs_gateway_url;
    }

    if let Err(err) = FriendFi::initialize_friendfi(config).await {
        tracing::error!("Failed to initialize FriendFi: {}", err);
        std::process::exit(1);
    }

    let friendfi = FriendFi::get_instance()?;

    match args.scenario {
        Some(name) => ScenarioRegistry::run_scenario(&name, friendfi).await?,
        None => ScenarioRegistry::run_all_scenarios(friendfi).await?,
    }

    tracing::info!("=== Integration Tests Completed Successfully ===");

    Ok(())
}
