use std::net::IpAddr;

use anyhow::Context;
use folio_core_contact_contracts::{
    ContactFeatureService, ContactMarkReadError, ContactSubmitError,
};
use folio_models::contact::{ContactMessage, ContactMessageDraft, ContactMessageId};
use folio_persistence_contracts::{contact::ContactRepository, Database, Transaction};
use folio_shared_contracts::{id::IdService, time::TimeService};
use folio_utils::trace_instrument;
use tracing::info;

#[cfg(test)]
mod tests;

#[derive(Debug, Clone)]
#[cfg_attr(test, derive(Default))]
pub struct ContactFeatureServiceImpl<Db, Id, Time, ContactRepo> {
    db: Db,
    id: Id,
    time: Time,
    contact_repo: ContactRepo,
}

impl<Db, Id, Time, ContactRepo> ContactFeatureServiceImpl<Db, Id, Time, ContactRepo> {
    pub fn new(db: Db, id: Id, time: Time, contact_repo: ContactRepo) -> Self {
        Self {
            db,
            id,
            time,
            contact_repo,
        }
    }
}

impl<Db, Id, Time, ContactRepo> ContactFeatureService
    for ContactFeatureServiceImpl<Db, Id, Time, ContactRepo>
where
    Db: Database,
    Id: IdService,
    Time: TimeService,
    ContactRepo: ContactRepository<Db::Transaction>,
{
    #[trace_instrument(skip(self))]
    async fn submit(
        &self,
        draft: ContactMessageDraft,
        source_ip: Option<IpAddr>,
    ) -> Result<ContactMessage, ContactSubmitError> {
        let valid = draft.validate()?;

        let now = self.time.now();
        let message = ContactMessage {
            id: self.id.generate(),
            author: valid.author,
            subject: valid.subject,
            content: valid.content,
            read: false,
            ip: source_ip,
            created_at: now,
            updated_at: now,
        };

        let mut txn = self.db.begin_transaction().await?;

        self.contact_repo
            .create(&mut txn, &message)
            .await
            .context("Failed to save contact message in database")?;

        txn.commit().await?;

        info!(id = %message.id, "contact message received");

        Ok(message)
    }

    #[trace_instrument(skip(self))]
    async fn list_messages(&self) -> anyhow::Result<Vec<ContactMessage>> {
        let mut txn = self.db.begin_transaction().await?;

        self.contact_repo
            .list(&mut txn)
            .await
            .context("Failed to get contact messages from database")
    }

    #[trace_instrument(skip(self))]
    async fn mark_read(
        &self,
        message_id: ContactMessageId,
    ) -> Result<ContactMessage, ContactMarkReadError> {
        let mut txn = self.db.begin_transaction().await?;

        let message = self
            .contact_repo
            .mark_read(&mut txn, message_id, self.time.now())
            .await
            .context("Failed to update contact message in database")?
            .ok_or(ContactMarkReadError::NotFound)?;

        txn.commit().await?;

        Ok(message)
    }
}
