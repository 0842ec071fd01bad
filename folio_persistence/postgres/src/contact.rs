use std::net::IpAddr;

use bb8_postgres::tokio_postgres::Row;
use chrono::{DateTime, Utc};
use folio_models::contact::{ContactMessage, ContactMessageAuthor, ContactMessageId};
use folio_persistence_contracts::contact::ContactRepository;
use folio_utils::trace_instrument;
use uuid::Uuid;

use crate::{arg_indices, columns, PostgresTransaction};

#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresContactRepository;

columns!(contact_message as "m": "id", "name", "email", "subject", "message", "read", "ip", "created_at", "updated_at");

impl ContactRepository<PostgresTransaction> for PostgresContactRepository {
    #[trace_instrument(skip(self, txn))]
    async fn list(&self, txn: &mut PostgresTransaction) -> anyhow::Result<Vec<ContactMessage>> {
        txn.txn()?
            .query(
                &format!(
                    "select {CONTACT_MESSAGE_COLS} from contact_messages m order by m.created_at \
                     desc, m.id desc"
                ),
                &[],
            )
            .await
            .map_err(Into::into)
            .and_then(|rows| {
                rows.into_iter()
                    .map(|row| decode_contact_message(&row, &mut 0))
                    .collect()
            })
    }

    #[trace_instrument(skip(self, txn))]
    async fn get(
        &self,
        txn: &mut PostgresTransaction,
        message_id: ContactMessageId,
    ) -> anyhow::Result<Option<ContactMessage>> {
        txn.txn()?
            .query_opt(
                &format!("select {CONTACT_MESSAGE_COLS} from contact_messages m where m.id=$1"),
                &[&*message_id],
            )
            .await
            .map_err(Into::into)
            .and_then(|row| {
                row.map(|row| decode_contact_message(&row, &mut 0))
                    .transpose()
            })
    }

    #[trace_instrument(skip(self, txn))]
    async fn create(
        &self,
        txn: &mut PostgresTransaction,
        message: &ContactMessage,
    ) -> anyhow::Result<()> {
        txn.txn()?
            .execute(
                &format!(
                    "insert into contact_messages ({CONTACT_MESSAGE_COL_NAMES}) values ({})",
                    arg_indices(1..=CONTACT_MESSAGE_CNT)
                ),
                &[
                    &*message.id,
                    &message.author.name.as_str(),
                    &message.author.email.as_str(),
                    &message.subject.as_str(),
                    &message.content.as_str(),
                    &message.read,
                    &message.ip,
                    &message.created_at,
                    &message.updated_at,
                ],
            )
            .await
            .map(|_| ())
            .map_err(Into::into)
    }

    #[trace_instrument(skip(self, txn))]
    async fn mark_read(
        &self,
        txn: &mut PostgresTransaction,
        message_id: ContactMessageId,
        updated_at: DateTime<Utc>,
    ) -> anyhow::Result<Option<ContactMessage>> {
        txn.txn()?
            .query_opt(
                &format!(
                    "update contact_messages m set read=true, updated_at=$2 where m.id=$1 \
                     returning {CONTACT_MESSAGE_COLS}"
                ),
                &[&*message_id, &updated_at],
            )
            .await
            .map_err(Into::into)
            .and_then(|row| {
                row.map(|row| decode_contact_message(&row, &mut 0))
                    .transpose()
            })
    }
}

fn decode_contact_message(row: &Row, offset: &mut usize) -> anyhow::Result<ContactMessage> {
    let mut idx = || {
        *offset += 1;
        *offset - 1
    };

    Ok(ContactMessage {
        id: row.get::<_, Uuid>(idx()).into(),
        author: ContactMessageAuthor {
            name: row.get::<_, String>(idx()).try_into()?,
            email: row.get::<_, String>(idx()).try_into()?,
        },
        subject: row.get::<_, String>(idx()).try_into()?,
        content: row.get::<_, String>(idx()).try_into()?,
        read: row.get(idx()),
        ip: row.get::<_, Option<IpAddr>>(idx()),
        created_at: row.get(idx()),
        updated_at: row.get(idx()),
    })
}
