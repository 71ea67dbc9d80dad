mod log_format;

use crate::log_format::LogFormat;
use did_anchor_core::{NotificationEntry, OperationRef};
use did_anchor_graph::{AnchorGraph, AnchorGraphT};
use did_anchor_mock::{MockCredentialBuilder, MockWitness};
use did_anchor_ref_index::{DIDAnchorRefIndex, DIDAnchorRefIndexMem};
use did_anchor_storage_mock::{CASClientMock, VCStorageMock};
use did_anchor_vc_store::VCStore;
use did_anchor_writer::{AnchorWriter, AnchorWriterConfig, Providers};
use std::{sync::Arc, time::Duration};

/// Runs batches of DID operations through an in-memory anchor writer, with mock witnesses and
/// storage, and prints the resulting notifications and per-DID anchor chains.
#[derive(clap::Parser)]
pub struct Root {
    #[command(flatten)]
    pub anchor_writer_config: AnchorWriterConfig,
    /// Comma-separated list of the DIDs to create and then update.
    #[arg(
        name = "did",
        env = "DID_ANCHOR_SIM_DIDS",
        long,
        value_delimiter = ',',
        default_value = "EiA-sim-1,EiB-sim-2,EiC-sim-3"
    )]
    pub did_v: Vec<String>,
    /// Number of update batches to write after the creation batch.
    #[arg(env = "DID_ANCHOR_SIM_UPDATE_ROUNDS", long, default_value = "2")]
    pub update_rounds: u32,
    /// Simulated time taken by the witnesses to return their proofs, in milliseconds.
    #[arg(env = "DID_ANCHOR_SIM_WITNESS_LATENCY_MILLIS", long, default_value = "20")]
    pub witness_latency_millis: u64,
    /// Issuer of the anchor credentials.
    #[arg(
        env = "DID_ANCHOR_SIM_ISSUER",
        long,
        default_value = "https://orb.example.com"
    )]
    pub issuer: String,
    /// Specify the format of the logs.
    #[arg(
        name = "log-format",
        env = "DID_ANCHOR_SIM_LOG_FORMAT",
        long,
        value_name = "FORMAT",
        default_value = "compact",
        value_enum
    )]
    pub log_format: LogFormat,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Ignore errors, since there may not be a .env file.
    let _ = dotenvy::dotenv();

    // It's necessary to specify EnvFilter::from_default_env in order to use RUST_LOG env var.
    let tracing_subscriber_fmt = tracing_subscriber::fmt()
        .with_target(true)
        .with_line_number(true)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env());

    use clap::Parser;
    let root = Root::parse();

    match root.log_format {
        LogFormat::Compact => tracing_subscriber_fmt.compact().init(),
        LogFormat::Pretty => tracing_subscriber_fmt.pretty().init(),
    }

    if root.anchor_writer_config.witness_v.is_empty() {
        tracing::warn!("no witnesses configured; anchors will be committed without witness proofs");
    }
    tracing::info!("Namespace: {}", root.anchor_writer_config.namespace);
    tracing::info!("Witnesses: {:?}", root.anchor_writer_config.witness_v);
    tracing::info!("DIDs: {:?}", root.did_v);

    let anchor_graph_a = Arc::new(AnchorGraph::new(Arc::new(CASClientMock::new())));
    let did_anchor_ref_index_a = Arc::new(DIDAnchorRefIndexMem::new());
    let (completion_tx, completion_rx) =
        AnchorWriter::completion_channel(&root.anchor_writer_config);
    let witness = MockWitness::new(completion_tx)
        .with_latency(Duration::from_millis(root.witness_latency_millis));
    let providers = Providers {
        anchor_graph_a: anchor_graph_a.clone(),
        did_anchor_ref_index_a: did_anchor_ref_index_a.clone(),
        anchor_credential_builder_a: Arc::new(MockCredentialBuilder::new(root.issuer.clone())),
        proof_handler_a: Arc::new(witness),
        vc_store: VCStore::new(Arc::new(VCStorageMock::new())),
    };
    let witness_timeout = root.anchor_writer_config.witness_timeout();
    let anchor_writer = AnchorWriter::new(root.anchor_writer_config, providers, completion_rx);

    let mut cursor = -1i64;
    let create_ref_v = root
        .did_v
        .iter()
        .map(|did| OperationRef::create(did.as_str()))
        .collect::<Vec<_>>();
    anchor_writer
        .write_anchor("0.create", &create_ref_v, 1)
        .await?;
    print_notifications(&await_notification(&anchor_writer, &mut cursor, witness_timeout).await?)?;

    for round in 1..=root.update_rounds {
        let update_ref_v = root
            .did_v
            .iter()
            .map(|did| OperationRef::update(did.as_str()))
            .collect::<Vec<_>>();
        anchor_writer
            .write_anchor(&format!("{}.update", round), &update_ref_v, 1)
            .await?;
        print_notifications(
            &await_notification(&anchor_writer, &mut cursor, witness_timeout).await?,
        )?;
    }

    for did in root.did_v.iter() {
        let last_address = did_anchor_ref_index_a.last(did).await?;
        let did_anchor_v = anchor_graph_a
            .get_did_anchors(last_address.as_str(), did)
            .await?;
        println!("{} ({} anchors, newest first):", did, did_anchor_v.len());
        for (address, anchor_credential) in did_anchor_v.iter() {
            println!(
                "    {}  anchorString: {}, proofs: {}",
                address,
                anchor_credential.credential_subject.anchor_string,
                anchor_credential.proof_v.len()
            );
        }
    }

    anchor_writer.shutdown().await;
    Ok(())
}

/// Wait for the next notifications after `cursor`, acknowledge them, and advance the cursor to
/// the last one read.
async fn await_notification(
    anchor_writer: &AnchorWriter,
    cursor: &mut i64,
    witness_timeout: Duration,
) -> anyhow::Result<Vec<(u64, NotificationEntry)>> {
    let deadline = tokio::time::Instant::now() + witness_timeout;
    loop {
        let (_has_more, entry_v) = anchor_writer.read(*cursor)?;
        if let Some((last_cursor, _)) = entry_v.last() {
            anchor_writer.acknowledge(*last_cursor)?;
            *cursor = *last_cursor as i64;
            return Ok(entry_v);
        }
        if tokio::time::Instant::now() >= deadline {
            anyhow::bail!(
                "no anchor was committed within {:?}; it was probably abandoned",
                witness_timeout
            );
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

fn print_notifications(entry_v: &[(u64, NotificationEntry)]) -> anyhow::Result<()> {
    for (cursor, entry) in entry_v.iter() {
        println!("{} {}", cursor, serde_json::to_string(entry)?);
    }
    Ok(())
}
