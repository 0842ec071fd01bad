use std::future::Future;

use chrono::{DateTime, Utc};
use folio_models::contact::{ContactMessage, ContactMessageId};

#[cfg_attr(feature = "mock", mockall::automock)]
pub trait ContactRepository<Txn: Send + Sync + 'static>: Send + Sync + 'static {
    /// Return all contact messages, newest first.
    fn list(&self, txn: &mut Txn)
        -> impl Future<Output = anyhow::Result<Vec<ContactMessage>>> + Send;

    /// Return the contact message with the given id.
    fn get(
        &self,
        txn: &mut Txn,
        message_id: ContactMessageId,
    ) -> impl Future<Output = anyhow::Result<Option<ContactMessage>>> + Send;

    /// Create a new contact message.
    fn create(
        &self,
        txn: &mut Txn,
        message: &ContactMessage,
    ) -> impl Future<Output = anyhow::Result<()>> + Send;

    /// Mark the given contact message as read.
    ///
    /// Returns the updated message, or `None` if no message with the given id
    /// exists.
    fn mark_read(
        &self,
        txn: &mut Txn,
        message_id: ContactMessageId,
        updated_at: DateTime<Utc>,
    ) -> impl Future<Output = anyhow::Result<Option<ContactMessage>>> + Send;
}

#[cfg(feature = "mock")]
impl<Txn: Send + Sync + 'static> MockContactRepository<Txn> {
    pub fn with_list(mut self, result: Vec<ContactMessage>) -> Self {
        self.expect_list()
            .once()
            .with(mockall::predicate::always())
            .return_once(|_| Box::pin(std::future::ready(Ok(result))));
        self
    }

    pub fn with_create(mut self, message: ContactMessage) -> Self {
        self.expect_create()
            .once()
            .with(
                mockall::predicate::always(),
                mockall::predicate::eq(message),
            )
            .return_once(|_, _| Box::pin(std::future::ready(Ok(()))));
        self
    }

    pub fn with_create_error(mut self) -> Self {
        self.expect_create().once().return_once(|_, _| {
            Box::pin(std::future::ready(Err(anyhow::anyhow!(
                "duplicate key value violates unique constraint"
            ))))
        });
        self
    }

    pub fn with_mark_read(
        mut self,
        message_id: ContactMessageId,
        updated_at: DateTime<Utc>,
        result: Option<ContactMessage>,
    ) -> Self {
        self.expect_mark_read()
            .once()
            .with(
                mockall::predicate::always(),
                mockall::predicate::eq(message_id),
                mockall::predicate::eq(updated_at),
            )
            .return_once(|_, _, _| Box::pin(std::future::ready(Ok(result))));
        self
    }
}
