use std::time::Duration;

use serde_json::json;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut all_healthy = true;

    println!("Testing devnet JSON-RPC node: http://localhost:8545");
    match test_rpc_node("http://localhost:8545").await {
        Ok(chain_id) => println!("✓ devnet node is healthy (chain id {})", chain_id),
        Err(e) => {
            println!("✗ devnet node failed health check: {}", e);
            all_healthy = false;
        }
    }

    println!("Testing IPFS API: http://localhost:5001");
    match test_ipfs_api("http://localhost:5001").await {
        Ok(version) => println!("✓ IPFS API is healthy (version {})", version),
        Err(e) => {
            println!("✗ IPFS API failed health check: {}", e);
            all_healthy = false;
        }
    }

    println!("Testing IPFS gateway: http://localhost:8080");
    match test_http_endpoint("http://localhost:8080").await {
        Ok(_) => println!("✓ IPFS gateway is healthy"),
        Err(e) => {
            println!("✗ IPFS gateway failed: {}", e);
            all_healthy = false;
        }
    }

    if all_healthy {
        println!("All services are healthy!");
        Ok(())
    } else {
        eprintln!("Some services failed health checks");
        std::process::exit(1);
    }
}

async fn test_rpc_node(url: &str) -> Result<String, Box<dyn std::error::Error>> {
    let client = reqwest::Client::new();
    let request = json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": "eth_chainId",
        "params": []
    });

    let response = tokio::time::timeout(
        Duration::from_secs(10),
        client.post(url).json(&request).send(),
    )
    .await??;

    if !response.status().is_success() {
        return Err(format!("HTTP {} from {}", response.status(), url).into());
    }

    let body: serde_json::Value = response.json().await?;
    if let Some(error) = body.get("error") {
        return Err(format!("RPC error: {}", error).into());
    }
    match body.get("result").and_then(|v| v.as_str()) {
        Some(chain_id) => Ok(chain_id.to_string()),
        None => Err("eth_chainId returned no result".into()),
    }
}

async fn test_ipfs_api(url: &str) -> Result<String, Box<dyn std::error::Error>> {
    let client = reqwest::Client::new();
    // Kubo's API only answers POST
    let response = tokio::time::timeout(
        Duration::from_secs(5),
        client.post(format!("{}/api/v0/version", url)).send(),
    )
    .await??;

    if !response.status().is_success() {
        return Err(format!("HTTP {} from {}", response.status(), url).into());
    }

    let body: serde_json::Value = response.json().await?;
    match body.get("Version").and_then(|v| v.as_str()) {
        Some(version) => Ok(version.to_string()),
        None => Err("version response missing Version field".into()),
    }
}

async fn test_http_endpoint(url: &str) -> Result<(), Box<dyn std::error::Error>> {
    let client = reqwest::Client::new();
    let response = tokio::time::timeout(Duration::from_secs(5), client.get(url).send()).await??;

    if response.status().is_success() || response.status().as_u16() == 404 {
        // 404 is okay for the gateway root path
        Ok(())
    } else {
        Err(format!("HTTP {} from {}", response.status(), url).into())
    }
}
