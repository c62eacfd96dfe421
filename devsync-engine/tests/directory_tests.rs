mod common;

use common::{contact, FakeContactService};
use devsync_engine::phone::normalize;
use devsync_engine::{ContactDirectory, PhoneNormalizer, Region};
use devsync_types::ContactId;

fn normalizer() -> PhoneNormalizer {
    PhoneNormalizer::new(Region::US)
}

#[tokio::test]
async fn build_fetches_and_indexes_contacts() {
    let service = FakeContactService::with_contacts(vec![
        contact("c1", "Ada", "+15551234567"),
        contact("c2", "Grace", "(555) 987-6543"),
    ]);

    let directory = ContactDirectory::build(&service, normalizer()).await.unwrap();

    assert_eq!(directory.len(), 2);
    assert_eq!(
        directory.resolve("555-123-4567").map(|c| c.id.clone()),
        Some(ContactId::new("c1"))
    );
    assert_eq!(directory.resolve("+1 555 987 6543").unwrap().name, "Grace");
}

#[tokio::test]
async fn build_propagates_backend_failure() {
    let service = FakeContactService::default();
    *service.fail_get.lock().unwrap() = true;

    assert!(ContactDirectory::build(&service, normalizer()).await.is_err());
}

#[test]
fn every_phone_field_is_indexed() {
    let mut multi = contact("c1", "Ada", "555-123-4567");
    multi.alternate_phones = vec!["555-000-1111".into(), "".into(), "+44 20 7946 0958".into()];

    let directory = ContactDirectory::from_contacts(&[multi], normalizer());

    assert_eq!(directory.len(), 3);
    for raw in ["+15551234567", "5550001111", "+44 20 7946 0958"] {
        assert_eq!(directory.resolve(raw).map(|c| c.id.as_str()), Some("c1"), "{raw}");
    }
    let gb = normalize("+442079460958", None).unwrap();
    assert_eq!(directory.get(&gb).unwrap().name, "Ada");
}

#[test]
fn later_contact_wins_shared_number() {
    let directory = ContactDirectory::from_contacts(
        &[
            contact("first", "Home", "555-123-4567"),
            contact("second", "Office", "+1 555 123 4567"),
        ],
        normalizer(),
    );

    assert_eq!(directory.len(), 1);
    assert_eq!(directory.resolve("5551234567").unwrap().id.as_str(), "second");
}

#[test]
fn unparseable_contact_phones_are_skipped() {
    let directory = ContactDirectory::from_contacts(
        &[
            contact("c1", "No phone", ""),
            contact("c2", "Garbage", "call me maybe"),
            contact("c3", "Valid", "555-123-4567"),
        ],
        normalizer(),
    );

    assert_eq!(directory.len(), 1);
}

#[test]
fn unknown_and_unparseable_counterparties_miss() {
    let directory =
        ContactDirectory::from_contacts(&[contact("c1", "Ada", "555-123-4567")], normalizer());

    assert!(directory.resolve("555-999-0000").is_none());
    assert!(directory.resolve("Private number").is_none());
    assert!(directory.resolve("").is_none());
}

#[test]
fn empty_directory() {
    let directory = ContactDirectory::from_contacts(&[], normalizer());
    assert!(directory.is_empty());
    assert!(directory.resolve("555-123-4567").is_none());
}
