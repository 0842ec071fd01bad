use std::{net::IpAddr, sync::LazyLock, time::Duration};

use chrono::{TimeZone, Utc};
use folio_models::contact::{ContactMessage, ContactMessageAuthor};
use folio_persistence_contracts::contact::ContactRepository;
use uuid::uuid;

/// Every demo message, newest first.
pub static ALL_MESSAGES: LazyLock<Vec<&ContactMessage>> =
    LazyLock::new(|| vec![&JOB_OFFER, &COLLABORATION, &GREETING]);

pub static GREETING: LazyLock<ContactMessage> = LazyLock::new(|| ContactMessage {
    id: uuid!("0192ef1c-2a40-7b8e-a1f0-3c5d7e9b2a14").into(),
    author: ContactMessageAuthor {
        name: "Ada Lovelace".try_into().unwrap(),
        email: "ada@example.com".try_into().unwrap(),
    },
    subject: "Hi".try_into().unwrap(),
    content: "Hello there".try_into().unwrap(),
    read: true,
    ip: Some(IpAddr::from([203, 0, 113, 7])),
    created_at: Utc.with_ymd_and_hms(2024, 11, 4, 9, 15, 0).unwrap(),
    updated_at: Utc.with_ymd_and_hms(2024, 11, 4, 18, 2, 41).unwrap(),
});

pub static COLLABORATION: LazyLock<ContactMessage> = LazyLock::new(|| ContactMessage {
    id: uuid!("0192f4a8-61d3-7c02-8e47-b95a0d13f6c8").into(),
    author: ContactMessageAuthor {
        name: "Grace Hopper".try_into().unwrap(),
        email: "grace@example.org".try_into().unwrap(),
    },
    subject: "Open source collaboration".try_into().unwrap(),
    content: "I came across your compiler project and would love to contribute."
        .try_into()
        .unwrap(),
    read: false,
    ip: None,
    created_at: GREETING.created_at + Duration::from_secs(2 * 24 * 3600),
    updated_at: GREETING.created_at + Duration::from_secs(2 * 24 * 3600),
});

pub static JOB_OFFER: LazyLock<ContactMessage> = LazyLock::new(|| ContactMessage {
    id: uuid!("0192fb07-9e15-7a6d-b3c8-0f2e4d6a8c31").into(),
    author: ContactMessageAuthor {
        name: "Alan Turing".try_into().unwrap(),
        email: "alan@example.net".try_into().unwrap(),
    },
    subject: "Backend engineer position".try_into().unwrap(),
    content: "We are hiring and your portfolio caught our eye. Are you available for a call?"
        .try_into()
        .unwrap(),
    read: false,
    ip: Some("2001:db8::42".parse().unwrap()),
    created_at: GREETING.created_at + Duration::from_secs(5 * 24 * 3600 + 1337),
    updated_at: GREETING.created_at + Duration::from_secs(5 * 24 * 3600 + 1337),
});

pub async fn create<Txn: Send + Sync + 'static>(
    txn: &mut Txn,
    repo: impl ContactRepository<Txn>,
) -> anyhow::Result<()> {
    for &message in ALL_MESSAGES.iter().rev() {
        repo.create(txn, message).await?;
    }
    Ok(())
}
