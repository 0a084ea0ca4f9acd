use std::path::Path;

use alloy_dyn_abi::DynSolValue;
use alloy_primitives::{Address, B256};
use alloy_provider::ProviderBuilder;
use anyhow::{Context, Result};
use tracing::{error, info};
use tracing_subscriber::{self, EnvFilter};
use url::Url;

use event_scanner::export;
use event_scanner::models::common::ReportKind;
use event_scanner::models::filters::{ATTESTED_SIGNATURE, LogFilter, TRANSFER_SINGLE_SIGNATURE};
use event_scanner::scanner::Scanner;
use event_scanner::scanner::aggregations::{
    TransferShape, aggregate_attestations, aggregate_balances,
};
use event_scanner::scanner::rpc::RpcSource;
use event_scanner::utils::load_config;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    // Load config
    let config = match load_config("config.yml") {
        Ok(config) => {
            info!("Config loaded successfully");
            config
        }
        Err(e) => {
            error!("Failed to load config: {}", e);
            return Err(e);
        }
    };

    let contract: Address = config
        .contract_address
        .parse()
        .context("invalid contract_address")?;
    let rpc_url: Url = config.rpc_url.parse().context("invalid rpc_url")?;
    info!("RPC URL: {:?}", config.rpc_url);

    let provider = ProviderBuilder::new().connect_http(rpc_url);
    let scanner = Scanner::new(RpcSource::new(provider), config.scan.clone());

    let signature = config.event_signature.clone().unwrap_or_else(|| {
        match config.report {
            ReportKind::Attestations => ATTESTED_SIGNATURE,
            ReportKind::Holders => TRANSFER_SINGLE_SIGNATURE,
        }
        .to_string()
    });

    let mut filter = LogFilter::new(contract, &signature)?.from_block(config.from_block);
    if let Some(to_block) = config.to_block {
        filter = filter.to_block(to_block);
    }
    if let Some(uid) = &config.schema_uid {
        let uid: B256 = uid.parse().context("invalid schema_uid")?;
        filter = filter.arg("schemaUID", DynSolValue::FixedBytes(uid, 32));
    }

    match config.report {
        ReportKind::Attestations => {
            let entries = scanner.fetch_all_logs(&filter).await?;
            info!("Fetched {} attestation logs", entries.len());

            let timestamps = scanner.resolve_timestamps(&entries).await?;
            let summary = aggregate_attestations(&entries, &timestamps, "recipient");
            info!(
                "{} unique recipients, {} total attestations",
                summary.recipients.len(),
                summary.total_attestations
            );

            if let Some(output) = &config.output {
                export::write_attestations_csv(Path::new(output), &summary)?;
                info!("Wrote {}", output);
            }
        }
        ReportKind::Holders => {
            let entries = scanner.fetch_all_logs(&filter).await?;
            info!("Fetched {} transfer logs", entries.len());

            let summary = aggregate_balances(&entries, &TransferShape::default());
            info!(
                "{} holders, {} tokens minted",
                summary.holders.len(),
                summary.total_minted
            );

            if let Some(output) = &config.output {
                export::write_holders_csv(Path::new(output), &summary)?;
                info!("Wrote {}", output);
            }
        }
    }

    Ok(())
}
