//! Full consent lifecycle against the live mock server.
//!
//! Starts the mock server on a random port, then exercises every client
//! operation over real HTTP through the default `ureq` transport.

use std::net::SocketAddr;

use consent_core::{ClientConfig, Consent, ConsentClient, ConsentError, LegalNotice, Proof, Subject};
use serde_json::json;

const KEY: &str = "integration-key";

fn start_server() -> SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener, KEY).await
        })
        .unwrap();
    });

    addr
}

#[test]
fn consent_lifecycle() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("consent_core=debug")
        .with_test_writer()
        .try_init();

    // Step 1: start mock server on a random port.
    let addr = start_server();
    let mut config = ClientConfig::new(KEY);
    config.base_url = format!("http://{addr}");
    config.timeout_secs = Some(10);
    let client = ConsentClient::from_config(&config).unwrap();

    // Step 2: list: should be empty.
    assert!(client.list_consents(&[]).unwrap().is_empty());

    // Step 3: create a subject; the server assigns id and verified.
    let mut subject = Subject {
        email: Some("ada@example.com".to_string()),
        first_name: Some("Ada".to_string()),
        ..Subject::default()
    };
    client.create_subject(&mut subject).unwrap();
    let subject_id = subject.id.clone().expect("server assigns an id");
    assert_eq!(subject.verified, Some(false));
    assert!(subject.timestamp.is_some());

    // Step 4: update the subject in place.
    subject.last_name = Some("Lovelace".to_string());
    subject.verified = Some(true);
    client.update_subject(&mut subject).unwrap();
    assert_eq!(subject.id.as_deref(), Some(subject_id.as_str()));

    // Step 5: get the subject back.
    let fetched = client.get_subject(&subject_id).unwrap();
    assert_eq!(fetched.last_name.as_deref(), Some("Lovelace"));
    assert_eq!(fetched.verified, Some(true));

    // Step 6: create a consent for that subject.
    let mut consent = Consent::default();
    consent
        .set_subject(Subject {
            id: Some(subject_id.clone()),
            ..Subject::default()
        })
        .unwrap();
    consent.add_proof(Proof::new("{\"newsletter\":true}", "<form/>")).unwrap();
    consent.add_legal_notice(LegalNotice::new("privacy_policy", "3")).unwrap();
    consent.preferences = json!({"newsletter": true}).as_object().cloned().unwrap();
    consent.source = Some("private".to_string());

    client.create_consent(&mut consent).unwrap();
    let consent_id = consent.id.clone().expect("server assigns an id");
    assert!(consent.timestamp.is_some());
    assert_eq!(consent.subject.as_ref().unwrap().id.as_deref(), Some(subject_id.as_str()));

    // Step 7: get the consent; the stored subject comes back embedded.
    let stored = client.get_consent(&consent_id).unwrap();
    assert_eq!(stored.proofs, consent.proofs);
    assert_eq!(stored.legal_notices, consent.legal_notices);
    assert_eq!(stored.preferences, consent.preferences);
    assert_eq!(stored.timestamp, consent.timestamp);
    assert_eq!(stored.subject.unwrap().email.as_deref(), Some("ada@example.com"));

    // Step 8: a second consent, created without a prior subject.
    let mut other = Consent::default();
    other.set_subject(json!({"email": "grace@example.com"}).as_object().cloned().unwrap()).unwrap();
    client.create_consent(&mut other).unwrap();

    // Step 9: list: both, in creation order; filtering by subject narrows it.
    let all = client.list_consents(&[]).unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].id, consent.id);
    assert_eq!(all[1].id, other.id);
    let mine = client.list_consents(&[("subject_id", subject_id.as_str())]).unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].id.as_deref(), Some(consent_id.as_str()));

    // Step 10: unknown ids are NotFound.
    assert!(matches!(client.get_consent("missing"), Err(ConsentError::NotFound)));
    assert!(matches!(client.get_subject("missing"), Err(ConsentError::NotFound)));
    let mut ghost = Subject {
        id: Some("missing".to_string()),
        ..Subject::default()
    };
    assert!(matches!(client.update_subject(&mut ghost), Err(ConsentError::NotFound)));

    // Step 11: a wrong key is rejected.
    let mut bad = ClientConfig::new("wrong-key");
    bad.base_url = format!("http://{addr}");
    let intruder = ConsentClient::from_config(&bad).unwrap();
    assert!(matches!(intruder.list_consents(&[]), Err(ConsentError::Unauthorized)));
}
