use std::net::IpAddr;

use chrono::{TimeZone, Utc};
use folio_core_contact_contracts::{ContactFeatureService, ContactSubmitError};
use folio_demo::{UUID1, UUID2};
use folio_models::contact::{
    ContactMessage, ContactMessageAuthor, ContactMessageDraft, ContactMessageId,
    ContactMessageViolation,
};
use folio_persistence_contracts::{
    contact::MockContactRepository, MockDatabase, MockTransaction,
};
use folio_shared_contracts::{id::MockIdService, time::MockTimeService};
use folio_utils::assert_matches;
use pretty_assertions::assert_eq;

use crate::{tests::Sut, ContactFeatureServiceImpl};

fn draft() -> ContactMessageDraft {
    ContactMessageDraft {
        name: Some(" Ada ".into()),
        email: Some("Ada@Example.com".into()),
        subject: Some("Hi".into()),
        message: Some("Hello there".into()),
    }
}

fn expected(ip: Option<IpAddr>) -> ContactMessage {
    let now = Utc.with_ymd_and_hms(2024, 11, 7, 12, 0, 0).unwrap();
    ContactMessage {
        id: UUID1.into(),
        author: ContactMessageAuthor {
            name: "Ada".try_into().unwrap(),
            email: "ada@example.com".try_into().unwrap(),
        },
        subject: "Hi".try_into().unwrap(),
        content: "Hello there".try_into().unwrap(),
        read: false,
        ip,
        created_at: now,
        updated_at: now,
    }
}

#[tokio::test]
async fn ok() {
    // Arrange
    let ip = Some(IpAddr::from([198, 51, 100, 23]));
    let expected = expected(ip);

    let db = MockDatabase::build(true);
    let id = MockIdService::new().with_generate(ContactMessageId::from(UUID1));
    let time = MockTimeService::new().with_now(expected.created_at);
    let contact_repo = MockContactRepository::new().with_create(expected.clone());

    let sut = ContactFeatureServiceImpl {
        db,
        id,
        time,
        contact_repo,
    };

    // Act
    let result = sut.submit(draft(), ip).await;

    // Assert
    assert_eq!(result.unwrap(), expected);
}

#[tokio::test]
async fn ok_without_ip() {
    // Arrange
    let expected = expected(None);

    let db = MockDatabase::build(true);
    let id = MockIdService::new().with_generate(ContactMessageId::from(UUID1));
    let time = MockTimeService::new().with_now(expected.created_at);
    let contact_repo = MockContactRepository::new().with_create(expected.clone());

    let sut = ContactFeatureServiceImpl {
        db,
        id,
        time,
        contact_repo,
    };

    // Act
    let result = sut.submit(draft(), None).await;

    // Assert
    let message = result.unwrap();
    assert_eq!(message.ip, None);
    assert!(!message.read);
}

#[tokio::test]
async fn duplicate_submissions_are_stored_separately() {
    // Arrange
    let now = Utc.with_ymd_and_hms(2024, 11, 7, 12, 0, 0).unwrap();

    let mut db = MockDatabase::new();
    db.expect_begin_transaction().times(2).returning(|| {
        let mut txn = MockTransaction::new();
        txn.expect_commit()
            .once()
            .return_once(|| Box::pin(std::future::ready(Ok(()))));
        Box::pin(std::future::ready(Ok(txn)))
    });

    let mut ids = [UUID1, UUID2].into_iter();
    let mut id = MockIdService::new();
    id.expect_generate::<ContactMessageId>()
        .times(2)
        .returning(move || ids.next().unwrap().into());

    let mut time = MockTimeService::new();
    time.expect_now().times(2).return_const(now);

    let mut contact_repo = MockContactRepository::<MockTransaction>::new();
    contact_repo
        .expect_create()
        .times(2)
        .returning(|_, _| Box::pin(std::future::ready(Ok(()))));

    let sut = ContactFeatureServiceImpl {
        db,
        id,
        time,
        contact_repo,
    };

    // Act
    let first = sut.submit(draft(), None).await.unwrap();
    let second = sut.submit(draft(), None).await.unwrap();

    // Assert
    assert_eq!(first.id, UUID1.into());
    assert_eq!(second.id, UUID2.into());
    assert_eq!(
        ContactMessage {
            id: first.id,
            ..second.clone()
        },
        first
    );
}

#[tokio::test]
async fn invalid() {
    // Arrange
    let sut = Sut::default();

    // Act
    let result = sut
        .submit(
            ContactMessageDraft {
                email: Some("not-an-email".into()),
                message: Some("m".repeat(2001)),
                ..draft()
            },
            None,
        )
        .await;

    // Assert
    assert_matches!(
        result,
        Err(ContactSubmitError::Invalid(violations)) if violations.as_slice() == [
            ContactMessageViolation::EmailInvalid,
            ContactMessageViolation::MessageTooLong,
        ]
    );
}

#[tokio::test]
async fn missing_fields() {
    // Arrange
    let sut = Sut::default();

    // Act
    let result = sut.submit(ContactMessageDraft::default(), None).await;

    // Assert
    assert_matches!(
        result,
        Err(ContactSubmitError::Invalid(violations)) if violations.as_slice().len() == 4
    );
}

#[tokio::test]
async fn database_error() {
    // Arrange
    let expected = expected(None);

    let db = MockDatabase::build(false);
    let id = MockIdService::new().with_generate(ContactMessageId::from(UUID1));
    let time = MockTimeService::new().with_now(expected.created_at);
    let contact_repo = MockContactRepository::new().with_create_error();

    let sut = ContactFeatureServiceImpl {
        db,
        id,
        time,
        contact_repo,
    };

    // Act
    let result = sut.submit(draft(), None).await;

    // Assert
    assert_matches!(result, Err(ContactSubmitError::Other(_)));
}

#[tokio::test]
async fn database_unavailable() {
    // Arrange
    let expected = expected(None);

    let db = MockDatabase::new().with_failing_begin_transaction();
    let id = MockIdService::new().with_generate(ContactMessageId::from(UUID1));
    let time = MockTimeService::new().with_now(expected.created_at);

    let sut = ContactFeatureServiceImpl {
        db,
        id,
        time,
        ..Sut::default()
    };

    // Act
    let result = sut.submit(draft(), None).await;

    // Assert
    assert_matches!(result, Err(ContactSubmitError::Other(_)));
}
