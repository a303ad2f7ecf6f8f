use ferrous_arp_domain::{
    Address, ArpError, ArpOpcode, ConfigError, EngineConfig, InstanceConfig, ResolutionOutcome,
    TableKind,
};
use ferrous_arp_infrastructure::arp::{ArpService, RequestOutcome};
use std::sync::Arc;

mod helpers;
use helpers::{
    ethernet_link, FrameBuilder, Harness, RecordingTransport, PEER_IP, PEER_MAC, STATION_IP,
    STATION_MAC,
};

#[tokio::test]
async fn test_request_without_state_goes_pending_and_transmits_once() {
    let h = Harness::new().await;

    let outcome = h.instance.request(Some(&PEER_IP), None).await.unwrap();

    assert!(matches!(outcome, RequestOutcome::Pending(_)));
    assert_eq!(h.service.table_len(TableKind::Pending), 1);

    let sent = h.transport.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].destination, Address::ethernet([0xff; 6]));

    let frames = h.transport.sent_frames();
    assert_eq!(frames[0].opcode, ArpOpcode::Request);
    assert_eq!(frames[0].sender_protocol, Address::ipv4(STATION_IP));
    assert_eq!(frames[0].sender_hardware, Address::ethernet(STATION_MAC));
    assert_eq!(frames[0].target_protocol, Address::ipv4(PEER_IP));
    assert_eq!(frames[0].target_hardware, Address::ethernet([0; 6]));
}

#[tokio::test]
async fn test_reply_resolves_pending_request_and_later_requests_hit_cache() {
    let h = Harness::new().await;

    let RequestOutcome::Pending(pending) = h.instance.request(Some(&PEER_IP), None).await.unwrap()
    else {
        panic!("expected pending");
    };

    h.service
        .receive_frame(&FrameBuilder::reply(PEER_IP, PEER_MAC, STATION_IP).build())
        .await;

    assert_eq!(
        pending.await,
        ResolutionOutcome::Resolved(Address::ethernet(PEER_MAC))
    );
    assert_eq!(h.service.table_len(TableKind::Pending), 0);
    assert_eq!(h.service.table_len(TableKind::Resolved), 1);

    match h.instance.request(Some(&PEER_IP), None).await.unwrap() {
        RequestOutcome::Resolved(hw) => assert_eq!(hw, Address::ethernet(PEER_MAC)),
        RequestOutcome::Pending(_) => panic!("expected a cache hit"),
    }
    assert_eq!(h.transport.sent().len(), 1, "cache hit must not transmit");
}

#[tokio::test]
async fn test_concurrent_requests_share_one_pending_entry() {
    let h = Harness::new().await;

    let first = h.instance.request(Some(&PEER_IP), None).await.unwrap();
    let second = h.instance.request(Some(&PEER_IP), None).await.unwrap();

    assert_eq!(h.service.table_len(TableKind::Pending), 1);
    assert_eq!(h.transport.sent().len(), 1);

    h.service
        .receive_frame(&FrameBuilder::reply(PEER_IP, PEER_MAC, STATION_IP).build())
        .await;

    let expected = ResolutionOutcome::Resolved(Address::ethernet(PEER_MAC));
    assert_eq!(first.resolve().await, expected);
    assert_eq!(second.resolve().await, expected);
}

#[tokio::test]
async fn test_unanswered_request_is_abandoned_after_retry_count_plus_one_transmissions() {
    let h = Harness::new().await;
    let RequestOutcome::Pending(mut pending) =
        h.instance.request(Some(&PEER_IP), None).await.unwrap()
    else {
        panic!("expected pending");
    };

    // Default retry count is 2 and the retry interval equals the sweep period.
    h.sweeps(2).await;
    assert_eq!(h.transport.sent().len(), 3);
    assert_eq!(h.service.table_len(TableKind::Pending), 1);
    assert_eq!(pending.try_outcome(), None);

    h.sweeps(1).await;
    assert_eq!(h.transport.sent().len(), 3);
    assert_eq!(h.service.table_len(TableKind::Pending), 0);
    assert_eq!(h.service.total_entries(), 0);
    assert_eq!(pending.await, ResolutionOutcome::TimedOut);
}

#[tokio::test]
async fn test_retry_interval_longer_than_period_counts_down() {
    let h = Harness::new().await;
    let instance = h.service.create_instance();
    instance
        .configure(Some(InstanceConfig::ipv4([10, 0, 0, 9]).with_retries(1, 1500)))
        .await
        .unwrap();

    let outcome = instance.request(Some(&PEER_IP), None).await.unwrap();

    h.sweeps(2).await;
    assert_eq!(h.transport.sent().len(), 1, "retry not yet due");
    h.sweeps(1).await;
    assert_eq!(h.transport.sent().len(), 2);

    h.sweeps(3).await;
    assert_eq!(outcome.resolve().await, ResolutionOutcome::TimedOut);
    assert_eq!(h.transport.sent().len(), 2);
}

#[tokio::test]
async fn test_request_for_denied_address_is_refused() {
    let h = Harness::new().await;
    h.instance
        .add(ferrous_arp_infrastructure::arp::StaticEntry {
            deny: true,
            protocol: Some(&PEER_IP),
            ..Default::default()
        })
        .await
        .unwrap();

    let result = h.instance.request(Some(&PEER_IP), None).await;

    assert!(matches!(result, Err(ArpError::AccessDenied)));
    assert_eq!(h.service.table_len(TableKind::Pending), 0);
    assert_eq!(h.service.total_entries(), 1);
    assert!(h.transport.sent().is_empty());
}

#[tokio::test]
async fn test_broadcast_targets_resolve_synchronously() {
    let h = Harness::new().await;

    for target in [None, Some(&[255u8, 255, 255, 255][..])] {
        match h.instance.request(target, None).await.unwrap() {
            RequestOutcome::Resolved(hw) => assert_eq!(hw, Address::ethernet([0xff; 6])),
            RequestOutcome::Pending(_) => panic!("broadcast must not go pending"),
        }
    }
    assert_eq!(h.service.total_entries(), 0);
    assert!(h.transport.sent().is_empty());
}

#[tokio::test]
async fn test_multicast_target_maps_to_ethernet_group_address() {
    let h = Harness::new().await;

    let outcome = h
        .instance
        .request(Some(&[239, 129, 0, 251]), None)
        .await
        .unwrap();

    match outcome {
        RequestOutcome::Resolved(hw) => {
            assert_eq!(hw, Address::ethernet([0x01, 0x00, 0x5e, 0x01, 0x00, 0xfb]))
        }
        RequestOutcome::Pending(_) => panic!("multicast must not go pending"),
    }
    assert_eq!(h.service.total_entries(), 0);
}

#[tokio::test]
async fn test_request_with_wrong_address_length_is_invalid() {
    let h = Harness::new().await;

    let result = h.instance.request(Some(&[10, 0, 0]), None).await;

    assert!(matches!(result, Err(ArpError::InvalidParameter(_))));
    assert_eq!(h.service.total_entries(), 0);
}

#[tokio::test]
async fn test_unconfigured_instance_is_not_started() {
    let h = Harness::new().await;
    let idle = h.service.create_instance();

    assert!(matches!(
        idle.request(Some(&PEER_IP), None).await,
        Err(ArpError::NotStarted)
    ));
    assert!(matches!(idle.cancel(None, None), Err(ArpError::NotStarted)));
    assert!(matches!(idle.flush(), Err(ArpError::NotStarted)));
}

#[tokio::test]
async fn test_waiter_limit_per_entry() {
    let engine = EngineConfig {
        max_waiters_per_entry: 2,
        ..EngineConfig::default()
    };
    let h = Harness::with_engine(engine).await;

    let _first = h.instance.request(Some(&PEER_IP), None).await.unwrap();
    let _second = h.instance.request(Some(&PEER_IP), None).await.unwrap();
    let third = h.instance.request(Some(&PEER_IP), None).await;

    assert!(matches!(third, Err(ArpError::OutOfResources)));
}

#[tokio::test]
async fn test_entry_limit_refuses_new_resolutions() {
    let engine = EngineConfig {
        max_entries: 1,
        ..EngineConfig::default()
    };
    let h = Harness::with_engine(engine).await;

    let _first = h.instance.request(Some(&PEER_IP), None).await.unwrap();
    let second = h.instance.request(Some(&[10, 0, 0, 3]), None).await;

    assert!(matches!(second, Err(ArpError::OutOfResources)));
    assert_eq!(h.service.table_len(TableKind::Pending), 1);
    assert_eq!(h.transport.sent().len(), 1);
}

#[tokio::test]
async fn test_transmit_failure_keeps_request_pending() {
    let h = Harness::new().await;
    h.transport.set_should_fail(true);

    let outcome = h.instance.request(Some(&PEER_IP), None).await.unwrap();
    assert!(matches!(outcome, RequestOutcome::Pending(_)));
    assert_eq!(h.transport.transmit_count(), 1);

    h.transport.set_should_fail(false);
    h.sweeps(1).await;

    assert_eq!(h.transport.sent().len(), 1, "retry goes out once the link is back");
    assert_eq!(h.service.table_len(TableKind::Pending), 1);
}

#[test]
fn test_service_rejects_zero_timer_period() {
    let transport = Arc::new(RecordingTransport::new(ethernet_link()));
    let engine = EngineConfig {
        timer_interval_ms: 0,
        ..EngineConfig::default()
    };

    let result = ArpService::new(engine, transport);
    assert!(matches!(result, Err(ConfigError::Validation(_))));
}

#[test]
fn test_service_rejects_zero_capacity() {
    let transport = Arc::new(RecordingTransport::new(ethernet_link()));
    let engine = EngineConfig {
        max_entries: 0,
        ..EngineConfig::default()
    };

    let result = ArpService::new(engine, transport);
    assert!(matches!(result, Err(ConfigError::Validation(_))));
}
