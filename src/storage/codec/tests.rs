//! Unit tests for the archive document codec

use chrono::{TimeZone, Utc};
use proptest::prelude::*;

use crate::models::{IncomingMail, MailMedium, MailStatus, MailType, OutgoingMail};

use super::*;

fn incoming(id: &str, year: i32, month: u32, day: u32) -> IncomingMail {
    IncomingMail {
        id: id.to_string(),
        chrono_number: format!("ARR-{year}-{id}"),
        date: Utc.with_ymd_and_hms(year, month, day, 9, 0, 0).unwrap(),
        issue_date: None,
        medium: MailMedium::Email,
        subject: "Objet".to_string(),
        observations: None,
        document_link: None,
        status: MailStatus::Pending,
        mail_type: MailType::Administrative,
        response_date: None,
        sender_name: "Expéditeur".to_string(),
        sender_address: "Douala".to_string(),
        recipient_service: "Normalisation".to_string(),
    }
}

fn outgoing(id: &str, year: i32, month: u32, day: u32) -> OutgoingMail {
    OutgoingMail {
        id: id.to_string(),
        chrono_number: format!("DEP-{year}-{id}"),
        date: Utc.with_ymd_and_hms(year, month, day, 15, 30, 0).unwrap(),
        issue_date: None,
        medium: MailMedium::Physical,
        subject: "Objet".to_string(),
        observations: None,
        document_link: None,
        status: MailStatus::Completed,
        correspondent: "Destinataire".to_string(),
        address: "Yaoundé".to_string(),
        service: "Promotion".to_string(),
        writer: "Jean Dupont".to_string(),
    }
}

#[test]
fn test_encode_uses_document_field_names() {
    let archive = MailArchive {
        incoming_mails: vec![incoming("a", 2024, 3, 10)],
        outgoing_mails: vec![outgoing("b", 2024, 3, 15)],
        ..Default::default()
    };
    let json = encode_archive(&archive).unwrap();
    assert!(json.contains("\"incomingMails\""));
    assert!(json.contains("\"outgoingMails\""));
    assert!(json.contains("\"lastModified\""));
    assert!(json.contains("\"version\""));
}

#[test]
fn test_round_trip() {
    let archive = MailArchive {
        incoming_mails: vec![incoming("a", 2024, 3, 10), incoming("b", 2024, 4, 2)],
        outgoing_mails: vec![outgoing("c", 2024, 3, 15)],
        ..Default::default()
    };
    let json = encode_archive(&archive).unwrap();
    let back = decode_archive(&json);
    assert_eq!(back, archive);
}

#[test]
fn test_decode_malformed_yields_empty_collections() {
    let archive = decode_archive("ceci n'est pas du JSON {");
    assert!(archive.incoming_mails.is_empty());
    assert!(archive.outgoing_mails.is_empty());
    assert_eq!(archive.version, ARCHIVE_VERSION);
}

#[test]
fn test_decode_partial_document_fills_defaults() {
    let archive = decode_archive("{\"incomingMails\": []}");
    assert!(archive.outgoing_mails.is_empty());
    assert_eq!(archive.version, ARCHIVE_VERSION);
}

#[test]
fn test_decode_strict_rejects_malformed() {
    assert!(decode_archive_strict("{oops").is_err());
}

// Property: any archive survives the encode/decode round trip, in
// particular the RFC-3339 date representation keeps day precision.

fn arb_status() -> impl Strategy<Value = MailStatus> {
    prop_oneof![
        Just(MailStatus::Pending),
        Just(MailStatus::Processing),
        Just(MailStatus::Completed),
        Just(MailStatus::Overdue),
    ]
}

fn arb_mail_type() -> impl Strategy<Value = MailType> {
    prop_oneof![
        Just(MailType::Administrative),
        Just(MailType::Technical),
        Just(MailType::Commercial),
        Just(MailType::Financial),
        Just(MailType::Other),
    ]
}

prop_compose! {
    fn arb_date()(secs in 1_500_000_000i64..1_900_000_000i64) -> chrono::DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }
}

prop_compose! {
    fn arb_incoming()(
        id in "[a-f0-9]{8}",
        chrono_number in "ARR-[0-9]{4}-[0-9]{3}",
        date in arb_date(),
        subject in "[a-zA-Z0-9 ]{0,24}",
        status in arb_status(),
        mail_type in arb_mail_type(),
        sender_name in "[a-zA-Z ]{1,16}",
    ) -> IncomingMail {
        IncomingMail {
            id,
            chrono_number,
            date,
            issue_date: None,
            medium: MailMedium::Email,
            subject,
            observations: None,
            document_link: None,
            status,
            mail_type,
            response_date: None,
            sender_name,
            sender_address: "Douala".to_string(),
            recipient_service: "Normalisation".to_string(),
        }
    }
}

proptest! {
    #[test]
    fn prop_archive_round_trips(mails in prop::collection::vec(arb_incoming(), 0..8)) {
        let archive = MailArchive {
            incoming_mails: mails,
            ..Default::default()
        };
        let json = encode_archive(&archive).unwrap();
        let back = decode_archive(&json);
        prop_assert_eq!(back, archive);
    }
}
