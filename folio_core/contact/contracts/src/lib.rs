use std::{future::Future, net::IpAddr};

use folio_models::contact::{
    ContactMessage, ContactMessageDraft, ContactMessageId, ContactMessageViolations,
};
use thiserror::Error;

#[cfg_attr(feature = "mock", mockall::automock)]
pub trait ContactFeatureService: Send + Sync + 'static {
    /// Validate and store a contact form submission.
    ///
    /// `source_ip` is recorded with the message if known.
    fn submit(
        &self,
        draft: ContactMessageDraft,
        source_ip: Option<IpAddr>,
    ) -> impl Future<Output = Result<ContactMessage, ContactSubmitError>> + Send;

    /// Return all stored messages, newest first.
    ///
    /// Requires admin access, which must be checked by the caller.
    fn list_messages(&self) -> impl Future<Output = anyhow::Result<Vec<ContactMessage>>> + Send;

    /// Flag a message as read and return its new state.
    ///
    /// Requires admin access, which must be checked by the caller.
    fn mark_read(
        &self,
        message_id: ContactMessageId,
    ) -> impl Future<Output = Result<ContactMessage, ContactMarkReadError>> + Send;
}

#[derive(Debug, Error)]
pub enum ContactSubmitError {
    #[error("{0}")]
    Invalid(#[from] ContactMessageViolations),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[derive(Debug, Error)]
pub enum ContactMarkReadError {
    #[error("The message does not exist.")]
    NotFound,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[cfg(feature = "mock")]
impl MockContactFeatureService {
    pub fn with_submit(
        mut self,
        draft: ContactMessageDraft,
        source_ip: Option<IpAddr>,
        result: Result<ContactMessage, ContactSubmitError>,
    ) -> Self {
        self.expect_submit()
            .once()
            .with(
                mockall::predicate::eq(draft),
                mockall::predicate::eq(source_ip),
            )
            .return_once(|_, _| Box::pin(std::future::ready(result)));
        self
    }

    pub fn with_list_messages(mut self, result: Vec<ContactMessage>) -> Self {
        self.expect_list_messages()
            .once()
            .return_once(|| Box::pin(std::future::ready(Ok(result))));
        self
    }

    pub fn with_list_messages_error(mut self) -> Self {
        self.expect_list_messages().once().return_once(|| {
            Box::pin(std::future::ready(Err(anyhow::anyhow!(
                "connection refused"
            ))))
        });
        self
    }

    pub fn with_mark_read(
        mut self,
        message_id: ContactMessageId,
        result: Result<ContactMessage, ContactMarkReadError>,
    ) -> Self {
        self.expect_mark_read()
            .once()
            .with(mockall::predicate::eq(message_id))
            .return_once(|_| Box::pin(std::future::ready(result)));
        self
    }
}
