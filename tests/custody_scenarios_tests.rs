use custody_ledger::{
    Asset, ChaincodeEvent, ErrorKind, Ledger, Participant, StationCommand,
};

async fn seed_participants(ledger: &Ledger) {
    let contract = ledger.contract();
    let mut txn = ledger.begin().await;
    contract.add_participant(&mut txn, "pkA", "customer", "LA").await.unwrap();
    contract.add_participant(&mut txn, "pkB", "carrier", "LB").await.unwrap();
    contract.add_station(&mut txn, "pkS", "pkA", "warehouse").await.unwrap();
    contract.add_station(&mut txn, "pkT", "pkB", "truck").await.unwrap();
    ledger.commit(txn).await.unwrap();
}

fn commands_on(events: &[ChaincodeEvent], topic: &str) -> Vec<StationCommand> {
    events
        .iter()
        .filter(|e| e.topic == topic)
        .map(|e| e.command().unwrap())
        .collect()
}

#[tokio::test]
async fn test_add_and_query_participant() {
    let ledger = Ledger::default();
    let contract = ledger.contract();

    let mut txn = ledger.begin().await;
    contract
        .add_participant(&mut txn, "pkA", "customer", "udp://a")
        .await
        .unwrap();
    ledger.commit(txn).await.unwrap();

    let txn = ledger.begin().await;
    let parti = contract.get_participant(&txn, "pkA").await.unwrap();
    assert_eq!(parti, Participant::new("pkA", "customer", "udp://a"));
    ledger.rollback(txn).await.unwrap();
}

#[tokio::test]
async fn test_change_link_is_recorded_in_history() {
    let ledger = Ledger::default();
    let contract = ledger.contract();

    let mut txn = ledger.begin().await;
    contract
        .add_participant(&mut txn, "pkA", "customer", "udp://a")
        .await
        .unwrap();
    ledger.commit(txn).await.unwrap();

    let mut txn = ledger.begin().await;
    let changed = contract
        .change_participant_link(&mut txn, "pkA", "udp://a2")
        .await
        .unwrap();
    assert_eq!(changed.link, "udp://a2");
    ledger.commit(txn).await.unwrap();

    let txn = ledger.begin().await;
    let history = contract.participant_history(&txn, "pkA").await.unwrap();
    assert!(history.len() >= 2);
    let newest = history.last().unwrap();
    assert_eq!(newest.value.link, "udp://a2");
    assert!(!newest.is_delete);
    assert_eq!(
        contract.get_participant(&txn, "pkA").await.unwrap().link,
        "udp://a2"
    );
}

#[tokio::test]
async fn test_station_permission() {
    let ledger = Ledger::default();
    let contract = ledger.contract();

    let mut txn = ledger.begin().await;
    contract.add_station(&mut txn, "pkS", "pkA", "warehouse").await.unwrap();
    ledger.commit(txn).await.unwrap();

    let txn = ledger.begin().await;
    let err = contract
        .get_station_if_owner(&txn, "pkS", "pkB")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PermissionDenied);

    let station = contract.get_station_if_owner(&txn, "pkS", "pkA").await.unwrap();
    assert_eq!(station.owner, "pkA");
    assert_eq!(station.area_type, "warehouse");
}

#[tokio::test]
async fn test_asset_owner_change_emits_stop_then_send() {
    let ledger = Ledger::default();
    let contract = ledger.contract();
    seed_participants(&ledger).await;

    let mut txn = ledger.begin().await;
    contract.add_asset(&mut txn, "x1", "pkA", "pkA", "pkS").await.unwrap();
    ledger.commit(txn).await.unwrap();

    let mut sub = ledger.subscribe();
    let mut txn = ledger.begin().await;
    let asset = contract
        .change_asset_owner(&mut txn, "x1", "pkA", "pkB")
        .await
        .unwrap();
    assert_eq!(asset.owner, "pkB");

    // Nothing is delivered before commit.
    assert!(sub.drain().is_empty());
    ledger.commit(txn).await.unwrap();

    let events = sub.drain();
    assert_eq!(
        commands_on(&events, "pkS"),
        vec![
            StationCommand::Stop("LA".into()),
            StationCommand::Send("LB".into()),
        ]
    );
    assert_eq!(events.len(), 2);

    let txn = ledger.begin().await;
    assert_eq!(contract.get_asset(&txn, "x1").await.unwrap().owner, "pkB");
}

#[tokio::test]
async fn test_authorization_mismatch_is_silent() {
    let ledger = Ledger::default();
    let contract = ledger.contract();
    seed_participants(&ledger).await;

    let mut txn = ledger.begin().await;
    contract.add_asset(&mut txn, "x1", "pkA", "pkB", "pkS").await.unwrap();
    ledger.commit(txn).await.unwrap();

    let mut sub = ledger.subscribe();
    let mut txn = ledger.begin().await;
    let asset = contract
        .change_asset_owner(&mut txn, "x1", "pkA", "pkC")
        .await
        .unwrap();

    assert_eq!(asset, Asset::new("x1", "pkA", "pkB", "pkS"));
    assert_eq!(txn.write_count(), 0);
    assert_eq!(txn.event_count(), 0);
    ledger.commit(txn).await.unwrap();

    assert!(sub.drain().is_empty());
    let txn = ledger.begin().await;
    assert_eq!(contract.asset_history(&txn, "x1").await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_station_move_emits_four_events() {
    let ledger = Ledger::default();
    let contract = ledger.contract();
    seed_participants(&ledger).await;

    let mut txn = ledger.begin().await;
    contract.add_asset(&mut txn, "x1", "pkA", "pkB", "pkS").await.unwrap();
    ledger.commit(txn).await.unwrap();

    let mut sub = ledger.subscribe();
    let mut txn = ledger.begin().await;
    let asset = contract
        .change_asset_station(&mut txn, "x1", "pkA", "pkT")
        .await
        .unwrap();
    assert_eq!(asset.station, "pkT");
    ledger.commit(txn).await.unwrap();

    let events = sub.drain();
    assert_eq!(
        commands_on(&events, "pkS"),
        vec![
            StationCommand::Stop("LB".into()),
            StationCommand::Stop("LA".into()),
        ]
    );
    assert_eq!(
        commands_on(&events, "pkT"),
        vec![
            StationCommand::Send("LB".into()),
            StationCommand::Send("LA".into()),
        ]
    );
    // Stops on the old station precede sends on the new one.
    let topics: Vec<&str> = events.iter().map(|e| e.topic.as_str()).collect();
    assert_eq!(topics, vec!["pkS", "pkS", "pkT", "pkT"]);
}

#[tokio::test]
async fn test_holder_change_redirects_stream() {
    let ledger = Ledger::default();
    let contract = ledger.contract();
    seed_participants(&ledger).await;

    let mut txn = ledger.begin().await;
    contract.add_asset(&mut txn, "x1", "pkA", "pkA", "pkS").await.unwrap();
    ledger.commit(txn).await.unwrap();

    let mut sub = ledger.subscribe_topic("pkS");
    let mut txn = ledger.begin().await;
    let asset = contract
        .change_asset_holder(&mut txn, "x1", "pkA", "pkB")
        .await
        .unwrap();
    assert_eq!(asset.holder, "pkB");
    assert_eq!(asset.owner, "pkA");
    ledger.commit(txn).await.unwrap();

    let payloads: Vec<Vec<u8>> = sub.drain().into_iter().map(|e| e.payload).collect();
    assert_eq!(payloads, vec![b"Stop:LA".to_vec(), b"Send:LB".to_vec()]);
}

#[tokio::test]
async fn test_asset_without_station_changes_silently() {
    let ledger = Ledger::default();
    let contract = ledger.contract();
    seed_participants(&ledger).await;

    let mut txn = ledger.begin().await;
    contract.add_asset(&mut txn, "x2", "pkA", "pkA", "").await.unwrap();
    ledger.commit(txn).await.unwrap();

    let mut sub = ledger.subscribe();
    let mut txn = ledger.begin().await;
    contract
        .change_asset_owner(&mut txn, "x2", "pkA", "pkB")
        .await
        .unwrap();
    assert_eq!(txn.write_count(), 1);
    assert_eq!(txn.event_count(), 0);
    ledger.commit(txn).await.unwrap();
    assert!(sub.drain().is_empty());

    // Placing it at a station only announces on the new one.
    let mut txn = ledger.begin().await;
    contract
        .change_asset_station(&mut txn, "x2", "pkA", "pkT")
        .await
        .unwrap();
    ledger.commit(txn).await.unwrap();

    let events = sub.drain();
    assert_eq!(
        commands_on(&events, "pkT"),
        vec![
            StationCommand::Send("LB".into()),
            StationCommand::Send("LA".into()),
        ]
    );
    assert_eq!(events.len(), 2);
}

#[tokio::test]
async fn test_station_owner_change() {
    let ledger = Ledger::default();
    let contract = ledger.contract();
    seed_participants(&ledger).await;

    let mut txn = ledger.begin().await;
    let station = contract
        .change_station_owner(&mut txn, "pkS", "pkA", "pkB")
        .await
        .unwrap();
    assert_eq!(station.owner, "pkB");
    ledger.commit(txn).await.unwrap();

    let mut txn = ledger.begin().await;
    let station = contract
        .change_station_area_type(&mut txn, "pkS", "pkB", "port")
        .await
        .unwrap();
    assert_eq!(station.area_type, "port");
    ledger.commit(txn).await.unwrap();

    let txn = ledger.begin().await;
    let history = contract.station_history(&txn, "pkS").await.unwrap();
    assert_eq!(history.len(), 3);
    assert_eq!(history[2].value.owner, "pkB");
    assert_eq!(history[2].value.area_type, "port");
}
