use did_anchor_core::{NotificationEntry, OperationRef};
use did_anchor_graph::{AnchorGraph, AnchorGraphT};
use did_anchor_mock::{MockCredentialBuilder, MockWitness, WitnessMode};
use did_anchor_ref_index::{DIDAnchorRefIndex, DIDAnchorRefIndexMem};
use did_anchor_storage_mock::{CASClientMock, VCStorageMock};
use did_anchor_vc_store::VCStore;
use did_anchor_writer::{AnchorStatus, AnchorWriter, AnchorWriterConfig, Error, Providers};
use std::{collections::BTreeSet, sync::Arc, time::Duration};

/// This will run once at load time (i.e. presumably before main function is called).
#[ctor::ctor]
fn overall_init() {
    // It's necessary to specify EnvFilter::from_default_env in order to use RUST_LOG env var.
    tracing_subscriber::fmt()
        .with_target(true)
        .with_line_number(true)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .compact()
        .init();
}

const WITNESS_1: &str = "https://witness1.example.com";
const WITNESS_2: &str = "https://witness2.example.com";

struct Harness {
    anchor_writer: AnchorWriter,
    witness: MockWitness,
    anchor_graph_a: Arc<AnchorGraph>,
    did_anchor_ref_index_a: Arc<DIDAnchorRefIndexMem>,
    vc_storage_mock: VCStorageMock,
}

fn test_config() -> AnchorWriterConfig {
    AnchorWriterConfig {
        witness_v: vec![WITNESS_1.to_string(), WITNESS_2.to_string()],
        ..Default::default()
    }
}

fn harness(config: AnchorWriterConfig, witness_mode: WitnessMode) -> Harness {
    let anchor_graph_a = Arc::new(AnchorGraph::new(Arc::new(CASClientMock::new())));
    let did_anchor_ref_index_a = Arc::new(DIDAnchorRefIndexMem::new());
    let vc_storage_mock = VCStorageMock::new();
    let (completion_tx, completion_rx) = AnchorWriter::completion_channel(&config);
    let witness = MockWitness::new(completion_tx);
    witness.set_mode(witness_mode);
    let providers = Providers {
        anchor_graph_a: anchor_graph_a.clone(),
        did_anchor_ref_index_a: did_anchor_ref_index_a.clone(),
        anchor_credential_builder_a: Arc::new(MockCredentialBuilder::new(
            "https://peer1.example.com",
        )),
        proof_handler_a: Arc::new(witness.clone()),
        vc_store: VCStore::new(Arc::new(vc_storage_mock.clone())),
    };
    Harness {
        anchor_writer: AnchorWriter::new(config, providers, completion_rx),
        witness,
        anchor_graph_a,
        did_anchor_ref_index_a,
        vc_storage_mock,
    }
}

async fn wait_until(condition: impl Fn() -> bool) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("pass");
}

/// Every notification from the start of the stream, without their cursors.
fn read_all(anchor_writer: &AnchorWriter) -> Vec<NotificationEntry> {
    let (_, entry_v) = anchor_writer.read(-1).expect("pass");
    entry_v
        .into_iter()
        .map(|(_, notification_entry)| notification_entry)
        .collect()
}

/// Poll until at least `count` notifications are readable.
async fn read_at_least(anchor_writer: &AnchorWriter, count: usize) -> Vec<NotificationEntry> {
    wait_until(|| read_all(anchor_writer).len() >= count).await;
    read_all(anchor_writer)
}

/// Submit a batch while the witness is holding, returning the id of the new credential.
async fn submit_held(harness: &Harness, operation_ref_v: &[OperationRef]) -> String {
    let held_before_s = harness.witness.held_ids().into_iter().collect::<BTreeSet<_>>();
    harness
        .anchor_writer
        .write_anchor("1.anchor", operation_ref_v, 1)
        .await
        .expect("pass");
    harness
        .witness
        .held_ids()
        .into_iter()
        .find(|id| !held_before_s.contains(id))
        .expect("pass")
}

async fn release_and_wait(harness: &Harness, id: &str) -> AnchorStatus {
    assert!(harness.witness.release(id).await);
    wait_until(|| {
        harness
            .anchor_writer
            .status(id)
            .map_or(false, |anchor_status| anchor_status.is_terminal())
    })
    .await;
    harness.anchor_writer.status(id).expect("pass")
}

fn identifiers(did_v: &[&str]) -> BTreeSet<String> {
    did_v.iter().map(|did| did.to_string()).collect()
}

#[tokio::test]
async fn test_create_is_committed_and_published() {
    let harness = harness(test_config(), WitnessMode::Deliver);
    harness
        .anchor_writer
        .write_anchor("1.anchor", &[OperationRef::create("A")], 1)
        .await
        .expect("pass");

    let entry_v = read_at_least(&harness.anchor_writer, 1).await;
    assert_eq!(entry_v.len(), 1);
    assert_eq!(entry_v[0].did_s, identifiers(&["A"]));
    let address = entry_v[0].address.clone();
    assert_eq!(
        harness.did_anchor_ref_index_a.last("A").await.expect("pass"),
        address
    );
    let (has_more, _) = harness.anchor_writer.read(-1).expect("pass");
    assert!(!has_more);

    // The committed credential carries one proof per witness, and its final form was persisted.
    let anchor_credential = harness.anchor_graph_a.get(&address).await.expect("pass");
    assert_eq!(anchor_credential.credential_subject.namespace, "did:sidetree");
    assert_eq!(anchor_credential.credential_subject.operation_count, 1);
    assert_eq!(
        anchor_credential
            .proof_v
            .iter()
            .map(|proof| proof.jws.as_str())
            .collect::<Vec<_>>(),
        vec!["mock-jws:https://witness1.example.com", "mock-jws:https://witness2.example.com"]
    );
    assert!(harness.vc_storage_mock.contains(&anchor_credential.id));
    assert_eq!(
        harness.anchor_writer.status(&anchor_credential.id),
        Some(AnchorStatus::Committed {
            address,
            persisted: true,
            published: true,
        })
    );
}

#[tokio::test]
async fn test_update_requires_committed_create() {
    let harness = harness(test_config(), WitnessMode::Hold);
    let create_id = submit_held(&harness, &[OperationRef::create("A")]).await;

    // The creation is still being witnessed, so there's nothing to link the update to.
    let err = harness
        .anchor_writer
        .write_anchor("2.anchor", &[OperationRef::update("A")], 1)
        .await
        .expect_err("pass");
    assert!(matches!(err, Error::ReferenceNotFound { .. }));
    assert!(err.to_string().contains("did[A]"));
    assert_eq!(harness.witness.request_count(), 1);

    assert!(matches!(
        release_and_wait(&harness, &create_id).await,
        AnchorStatus::Committed { .. }
    ));
    harness
        .anchor_writer
        .write_anchor("2.anchor", &[OperationRef::update("A")], 1)
        .await
        .expect("pass");
    assert_eq!(harness.witness.request_count(), 2);
}

#[tokio::test]
async fn test_update_links_previous_anchor() {
    let harness = harness(test_config(), WitnessMode::Deliver);
    harness
        .anchor_writer
        .write_anchor("1.anchor", &[OperationRef::create("A")], 1)
        .await
        .expect("pass");
    let cid1 = read_at_least(&harness.anchor_writer, 1).await[0]
        .address
        .clone();

    harness
        .anchor_writer
        .write_anchor("2.anchor", &[OperationRef::update("A")], 1)
        .await
        .expect("pass");
    let entry_v = read_at_least(&harness.anchor_writer, 2).await;
    let cid2 = entry_v[1].address.clone();
    assert_ne!(cid1, cid2);
    assert_eq!(
        harness.did_anchor_ref_index_a.last("A").await.expect("pass"),
        cid2
    );

    let update_credential = harness.anchor_graph_a.get(&cid2).await.expect("pass");
    assert_eq!(
        update_credential.credential_subject.previous_address_o("A"),
        Some(&cid1)
    );
    let did_anchor_v = harness
        .anchor_graph_a
        .get_did_anchors(&cid2, "A")
        .await
        .expect("pass");
    assert_eq!(
        did_anchor_v
            .iter()
            .map(|(address, _)| address.clone())
            .collect::<Vec<_>>(),
        vec![cid2, cid1]
    );
}

#[tokio::test]
async fn test_batch_with_repeated_and_mixed_operations() {
    let harness = harness(test_config(), WitnessMode::Hold);
    let create_id = submit_held(&harness, &[OperationRef::create("A")]).await;
    let cid1 = match release_and_wait(&harness, &create_id).await {
        AnchorStatus::Committed { address, .. } => address,
        other => panic!("unexpected status {:?}", other),
    };

    let batch_id = submit_held(
        &harness,
        &[
            OperationRef::update("A"),
            OperationRef::create("B"),
            OperationRef::update("A"),
        ],
    )
    .await;
    let cid2 = match release_and_wait(&harness, &batch_id).await {
        AnchorStatus::Committed { address, .. } => address,
        other => panic!("unexpected status {:?}", other),
    };

    let batch_credential = harness.anchor_graph_a.get(&cid2).await.expect("pass");
    let anchor_payload = &batch_credential.credential_subject;
    assert_eq!(anchor_payload.operation_count, 3);
    assert_eq!(anchor_payload.referenced_did_s(), identifiers(&["A"]));
    assert_eq!(anchor_payload.previous_address_o("A"), Some(&cid1));
    assert_eq!(
        harness.did_anchor_ref_index_a.last("B").await.expect("pass"),
        cid2
    );
    let entry_v = read_all(&harness.anchor_writer);
    assert_eq!(entry_v.len(), 2);
    assert_eq!(entry_v[1].did_s, identifiers(&["A", "B"]));
}

#[tokio::test]
async fn test_concurrent_updates_do_not_fork() {
    let harness = harness(test_config(), WitnessMode::Hold);
    let create_id = submit_held(&harness, &[OperationRef::create("A")]).await;
    release_and_wait(&harness, &create_id).await;

    // Both updates are built against the creation anchor.
    let first_id = submit_held(&harness, &[OperationRef::update("A")]).await;
    let second_id = submit_held(&harness, &[OperationRef::update("A")]).await;

    // The one witnessed last is committed first, and the other is rejected.
    let second_address = match release_and_wait(&harness, &second_id).await {
        AnchorStatus::Committed { address, .. } => address,
        other => panic!("unexpected status {:?}", other),
    };
    assert!(matches!(
        release_and_wait(&harness, &first_id).await,
        AnchorStatus::Conflict { .. }
    ));

    assert_eq!(
        harness.did_anchor_ref_index_a.last("A").await.expect("pass"),
        second_address
    );
    let entry_v = read_all(&harness.anchor_writer);
    assert_eq!(entry_v.len(), 2);
    assert_eq!(entry_v[1].address, second_address);
    assert!(!harness.vc_storage_mock.contains(&first_id));
}

#[tokio::test]
async fn test_concurrent_creates_of_same_did_do_not_fork() {
    let harness = harness(test_config(), WitnessMode::Hold);
    let first_id = submit_held(&harness, &[OperationRef::create("A")]).await;
    let second_id = submit_held(&harness, &[OperationRef::create("A")]).await;

    assert!(matches!(
        release_and_wait(&harness, &first_id).await,
        AnchorStatus::Committed { .. }
    ));
    assert!(matches!(
        release_and_wait(&harness, &second_id).await,
        AnchorStatus::Conflict { .. }
    ));
    assert_eq!(read_all(&harness.anchor_writer).len(), 1);
}

#[tokio::test]
async fn test_store_failure_does_not_stall_commits() {
    let harness = harness(test_config(), WitnessMode::Hold);
    harness.vc_storage_mock.fail_next_puts(1);

    let a_id = submit_held(&harness, &[OperationRef::create("A")]).await;
    assert!(matches!(
        release_and_wait(&harness, &a_id).await,
        AnchorStatus::Committed {
            persisted: false,
            ..
        }
    ));
    let b_id = submit_held(&harness, &[OperationRef::create("B")]).await;
    assert!(matches!(
        release_and_wait(&harness, &b_id).await,
        AnchorStatus::Committed {
            persisted: true,
            ..
        }
    ));

    assert!(!harness.vc_storage_mock.contains(&a_id));
    assert!(harness.vc_storage_mock.contains(&b_id));
    harness
        .did_anchor_ref_index_a
        .last("A")
        .await
        .expect("pass");
    assert_eq!(read_all(&harness.anchor_writer).len(), 2);
}

#[tokio::test]
async fn test_notifications_follow_commit_order_and_paginate() {
    let config = AnchorWriterConfig {
        read_batch_size: 2,
        ..test_config()
    };
    let harness = harness(config, WitnessMode::Hold);
    let mut id_v = Vec::new();
    for n in 0..5 {
        id_v.push(submit_held(&harness, &[OperationRef::create(format!("D{}", n))]).await);
    }
    // Witnessing completes in the reverse of submission order.
    for id in id_v.iter().rev() {
        release_and_wait(&harness, id).await;
    }
    let expected_v = vec!["D4", "D3", "D2", "D1", "D0"];

    // Page through, resuming from the cursor of the last entry of each page.
    let mut did_v = Vec::new();
    let mut cursor_v = Vec::new();
    let mut since_cursor = -1i64;
    let mut page_len_v = Vec::new();
    loop {
        let (has_more, entry_v) = harness.anchor_writer.read(since_cursor).expect("pass");
        page_len_v.push(entry_v.len());
        for (cursor, notification_entry) in entry_v {
            since_cursor = cursor as i64;
            cursor_v.push(cursor);
            did_v.extend(notification_entry.did_s);
        }
        if !has_more {
            break;
        }
    }
    assert_eq!(page_len_v, vec![2, 2, 1]);
    assert_eq!(cursor_v, vec![0, 1, 2, 3, 4]);
    assert_eq!(did_v, expected_v);

    let (has_more, entry_v) = harness.anchor_writer.read(4).expect("pass");
    assert!(!has_more);
    assert!(entry_v.is_empty());
    assert!(matches!(
        harness.anchor_writer.read(5),
        Err(Error::CursorAhead { next_cursor: 5, .. })
    ));
}

#[tokio::test]
async fn test_slow_reader_sees_every_notification() {
    let harness = harness(test_config(), WitnessMode::Deliver);
    for n in 0..4 {
        harness
            .anchor_writer
            .write_anchor("1.anchor", &[OperationRef::create(format!("D{}", n))], 1)
            .await
            .expect("pass");
        read_at_least(&harness.anchor_writer, n + 1).await;
    }
    let all_v = read_all(&harness.anchor_writer);

    // A fast reader that has seen everything up to cursor 2 doesn't affect a slower one.
    let (_, fast_entry_v) = harness.anchor_writer.read(2).expect("pass");
    assert_eq!(fast_entry_v, vec![(3, all_v[3].clone())]);
    let (_, slow_entry_v) = harness.anchor_writer.read(0).expect("pass");
    assert_eq!(
        slow_entry_v,
        vec![
            (1, all_v[1].clone()),
            (2, all_v[2].clone()),
            (3, all_v[3].clone())
        ]
    );

    // Once acknowledged, a reader that is behind gets an error rather than a gap.
    assert_eq!(harness.anchor_writer.acknowledge(1).expect("pass"), 2);
    assert!(matches!(
        harness.anchor_writer.read(0),
        Err(Error::CursorExpired {
            cursor: 0,
            oldest_cursor: 2
        })
    ));
    let (_, entry_v) = harness.anchor_writer.read(1).expect("pass");
    assert_eq!(entry_v.len(), 2);
}

#[tokio::test]
async fn test_full_notification_queue_blocks_commit_until_acknowledged() {
    let config = AnchorWriterConfig {
        notification_queue_capacity: 1,
        ..test_config()
    };
    let harness = harness(config, WitnessMode::Hold);
    let a_id = submit_held(&harness, &[OperationRef::create("A")]).await;
    let b_id = submit_held(&harness, &[OperationRef::create("B")]).await;
    release_and_wait(&harness, &a_id).await;

    assert!(harness.witness.release(&b_id).await);
    tokio::time::sleep(Duration::from_millis(100)).await;
    // B's commit is waiting for room in the queue; nothing was dropped.
    assert_eq!(
        harness.anchor_writer.status(&b_id),
        Some(AnchorStatus::Submitted)
    );
    let entry_v = read_all(&harness.anchor_writer);
    assert_eq!(entry_v.len(), 1);
    assert_eq!(entry_v[0].did_s, identifiers(&["A"]));

    // Reading alone doesn't make room.
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(
        harness.anchor_writer.status(&b_id),
        Some(AnchorStatus::Submitted)
    );

    // Acknowledging A's entry frees the slot.
    assert_eq!(harness.anchor_writer.acknowledge(0).expect("pass"), 1);
    wait_until(|| {
        matches!(
            harness.anchor_writer.status(&b_id),
            Some(AnchorStatus::Committed {
                published: true,
                ..
            })
        )
    })
    .await;
    let (has_more, entry_v) = harness.anchor_writer.read(0).expect("pass");
    assert!(!has_more);
    assert_eq!(entry_v.len(), 1);
    assert_eq!(entry_v[0].0, 1);
    assert_eq!(entry_v[0].1.did_s, identifiers(&["B"]));
}

#[tokio::test]
async fn test_shutdown_with_full_notification_queue() {
    let config = AnchorWriterConfig {
        notification_queue_capacity: 1,
        ..test_config()
    };
    let harness = harness(config, WitnessMode::Hold);
    let a_id = submit_held(&harness, &[OperationRef::create("A")]).await;
    let b_id = submit_held(&harness, &[OperationRef::create("B")]).await;
    release_and_wait(&harness, &a_id).await;
    // B's commit blocks on the full queue, and nobody acknowledges A.
    assert!(harness.witness.release(&b_id).await);
    tokio::time::sleep(Duration::from_millis(50)).await;

    let Harness {
        anchor_writer,
        did_anchor_ref_index_a,
        vc_storage_mock,
        ..
    } = harness;
    tokio::time::timeout(Duration::from_secs(5), anchor_writer.shutdown())
        .await
        .expect("pass");

    // B was still committed, just not published.
    did_anchor_ref_index_a.last("B").await.expect("pass");
    assert!(vc_storage_mock.contains(&b_id));
}

#[tokio::test]
async fn test_old_statuses_are_forgotten() {
    let config = AnchorWriterConfig {
        status_retention: 2,
        ..test_config()
    };
    let harness = harness(config, WitnessMode::Hold);
    let mut id_v = Vec::new();
    for n in 0..3 {
        let id = submit_held(&harness, &[OperationRef::create(format!("D{}", n))]).await;
        release_and_wait(&harness, &id).await;
        id_v.push(id);
    }
    let in_flight_id = submit_held(&harness, &[OperationRef::create("D3")]).await;

    assert_eq!(harness.anchor_writer.status(&id_v[0]), None);
    assert!(matches!(
        harness.anchor_writer.status(&id_v[1]),
        Some(AnchorStatus::Committed { .. })
    ));
    assert!(matches!(
        harness.anchor_writer.status(&id_v[2]),
        Some(AnchorStatus::Committed { .. })
    ));
    assert_eq!(
        harness.anchor_writer.status(&in_flight_id),
        Some(AnchorStatus::Submitted)
    );
    // Forgetting a status doesn't affect what was committed.
    assert_eq!(read_all(&harness.anchor_writer).len(), 3);
}

#[tokio::test]
async fn test_unwitnessed_anchor_is_abandoned() {
    let config = AnchorWriterConfig {
        witness_timeout_millis: 50,
        sweep_interval_millis: 10,
        ..test_config()
    };
    let harness = harness(config, WitnessMode::Hold);
    let id = submit_held(&harness, &[OperationRef::create("A")]).await;
    assert_eq!(
        harness.anchor_writer.status(&id),
        Some(AnchorStatus::Submitted)
    );

    wait_until(|| harness.anchor_writer.status(&id) == Some(AnchorStatus::Abandoned)).await;
    assert_eq!(harness.anchor_writer.pending_count(), 0);

    // A late delivery is discarded.
    assert!(harness.witness.release(&id).await);
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(
        harness.anchor_writer.status(&id),
        Some(AnchorStatus::Abandoned)
    );
    assert!(matches!(
        harness.did_anchor_ref_index_a.last("A").await,
        Err(did_anchor_ref_index::Error::NotFound(_))
    ));
    assert!(read_all(&harness.anchor_writer).is_empty());
    assert!(harness.vc_storage_mock.is_empty());
}

#[tokio::test]
async fn test_rejected_submission() {
    let harness = harness(test_config(), WitnessMode::Reject);
    let err = harness
        .anchor_writer
        .write_anchor("1.anchor", &[OperationRef::create("A")], 1)
        .await
        .expect_err("pass");
    assert!(matches!(err, Error::Submission(_)));
    assert_eq!(harness.anchor_writer.pending_count(), 0);

    harness.witness.set_mode(WitnessMode::Deliver);
    harness
        .anchor_writer
        .write_anchor("1.anchor", &[OperationRef::create("A")], 1)
        .await
        .expect("pass");
    assert_eq!(read_at_least(&harness.anchor_writer, 1).await.len(), 1);
}

#[tokio::test]
async fn test_build_failure() {
    let config = test_config();
    let (completion_tx, completion_rx) = AnchorWriter::completion_channel(&config);
    let providers = Providers {
        anchor_graph_a: Arc::new(AnchorGraph::new(Arc::new(CASClientMock::new()))),
        did_anchor_ref_index_a: Arc::new(DIDAnchorRefIndexMem::new()),
        anchor_credential_builder_a: Arc::new(MockCredentialBuilder::failing(
            "https://peer1.example.com",
            "sign error",
        )),
        proof_handler_a: Arc::new(MockWitness::new(completion_tx)),
        vc_store: VCStore::new(Arc::new(VCStorageMock::new())),
    };
    let anchor_writer = AnchorWriter::new(config, providers, completion_rx);
    let err = anchor_writer
        .write_anchor("1.anchor", &[OperationRef::create("A")], 1)
        .await
        .expect_err("pass");
    assert_eq!(
        err.to_string(),
        "failed to build anchor credential: sign error"
    );
}

#[tokio::test]
async fn test_shutdown_commits_delivered_credentials() {
    let harness = harness(test_config(), WitnessMode::Hold);
    let id = submit_held(&harness, &[OperationRef::create("A")]).await;
    assert!(harness.witness.release(&id).await);

    let Harness {
        anchor_writer,
        did_anchor_ref_index_a,
        vc_storage_mock,
        ..
    } = harness;
    tokio::time::timeout(Duration::from_secs(5), anchor_writer.shutdown())
        .await
        .expect("pass");

    did_anchor_ref_index_a.last("A").await.expect("pass");
    assert!(vc_storage_mock.contains(&id));
}
