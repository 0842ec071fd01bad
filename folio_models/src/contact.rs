use std::{fmt, net::IpAddr, sync::LazyLock};

use chrono::{DateTime, Utc};
use nutype::nutype;
use regex::Regex;

use crate::macros::id;

id!(ContactMessageId);

/// A message submitted through the contact form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactMessage {
    pub id: ContactMessageId,
    pub author: ContactMessageAuthor,
    pub subject: ContactMessageSubject,
    pub content: ContactMessageContent,
    /// Set once an admin has seen the message. Never reset to `false`.
    pub read: bool,
    /// Address the message was submitted from, if it could be determined.
    pub ip: Option<IpAddr>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactMessageAuthor {
    pub name: ContactMessageAuthorName,
    pub email: ContactEmailAddress,
}

#[nutype(
    sanitize(trim),
    validate(not_empty, len_char_max = ContactMessageAuthorName::MAX_LEN),
    derive(Debug, Clone, PartialEq, Eq, TryFrom, Deref, Display, Serialize, Deserialize)
)]
pub struct ContactMessageAuthorName(String);

impl ContactMessageAuthorName {
    pub const MAX_LEN: usize = 100;
}

#[nutype(
    sanitize(trim, lowercase),
    validate(not_empty, regex = CONTACT_EMAIL_REGEX),
    derive(Debug, Clone, PartialEq, Eq, TryFrom, Deref, Display, Serialize, Deserialize)
)]
pub struct ContactEmailAddress(String);

/// Deliberately loose: something, an `@`, something, a dot, something.
pub static CONTACT_EMAIL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\S+@\S+\.\S+$").unwrap());

#[nutype(
    sanitize(trim),
    validate(not_empty, len_char_max = ContactMessageSubject::MAX_LEN),
    derive(Debug, Clone, PartialEq, Eq, TryFrom, Deref, Display, Serialize, Deserialize)
)]
pub struct ContactMessageSubject(String);

impl ContactMessageSubject {
    pub const MAX_LEN: usize = 200;
}

#[nutype(
    sanitize(trim),
    validate(not_empty, len_char_max = ContactMessageContent::MAX_LEN),
    derive(Debug, Clone, PartialEq, Eq, TryFrom, Deref, Display, Serialize, Deserialize)
)]
pub struct ContactMessageContent(String);

impl ContactMessageContent {
    pub const MAX_LEN: usize = 2000;
}

/// The raw fields of a contact form submission, exactly as received.
///
/// Absent fields are `None` and are reported as missing by
/// [`ContactMessageDraft::validate`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactMessageDraft {
    pub name: Option<String>,
    pub email: Option<String>,
    pub subject: Option<String>,
    pub message: Option<String>,
}

/// A submission whose fields have all passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidContactMessage {
    pub author: ContactMessageAuthor,
    pub subject: ContactMessageSubject,
    pub content: ContactMessageContent,
}

impl ContactMessageDraft {
    /// Sanitize and validate every field.
    ///
    /// Unlike the individual field constructors this does not stop at the
    /// first problem: the error lists every violated rule, in field order.
    pub fn validate(self) -> Result<ValidContactMessage, ContactMessageViolations> {
        use ContactMessageViolation::*;

        let mut violations = Vec::new();

        let name = ContactMessageAuthorName::try_new(self.name.unwrap_or_default())
            .map_err(|err| {
                violations.push(match err {
                    ContactMessageAuthorNameError::NotEmptyViolated => NameRequired,
                    ContactMessageAuthorNameError::LenCharMaxViolated => NameTooLong,
                })
            })
            .ok();

        let email = ContactEmailAddress::try_new(self.email.unwrap_or_default())
            .map_err(|err| {
                violations.push(match err {
                    ContactEmailAddressError::NotEmptyViolated => EmailRequired,
                    ContactEmailAddressError::RegexViolated => EmailInvalid,
                })
            })
            .ok();

        let subject = ContactMessageSubject::try_new(self.subject.unwrap_or_default())
            .map_err(|err| {
                violations.push(match err {
                    ContactMessageSubjectError::NotEmptyViolated => SubjectRequired,
                    ContactMessageSubjectError::LenCharMaxViolated => SubjectTooLong,
                })
            })
            .ok();

        let content = ContactMessageContent::try_new(self.message.unwrap_or_default())
            .map_err(|err| {
                violations.push(match err {
                    ContactMessageContentError::NotEmptyViolated => MessageRequired,
                    ContactMessageContentError::LenCharMaxViolated => MessageTooLong,
                })
            })
            .ok();

        match (name, email, subject, content) {
            (Some(name), Some(email), Some(subject), Some(content)) => Ok(ValidContactMessage {
                author: ContactMessageAuthor { name, email },
                subject,
                content,
            }),
            _ => Err(ContactMessageViolations(violations)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContactMessageViolation {
    NameRequired,
    NameTooLong,
    EmailRequired,
    EmailInvalid,
    SubjectRequired,
    SubjectTooLong,
    MessageRequired,
    MessageTooLong,
}

impl ContactMessageViolation {
    /// Human readable description of the violated rule.
    pub fn description(self) -> &'static str {
        match self {
            Self::NameRequired => "Name is required",
            Self::NameTooLong => "Name cannot exceed 100 characters",
            Self::EmailRequired => "Email is required",
            Self::EmailInvalid => "Please provide a valid email",
            Self::SubjectRequired => "Subject is required",
            Self::SubjectTooLong => "Subject cannot exceed 200 characters",
            Self::MessageRequired => "Message is required",
            Self::MessageTooLong => "Message cannot exceed 2000 characters",
        }
    }
}

impl fmt::Display for ContactMessageViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Every rule a [`ContactMessageDraft`] violated. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactMessageViolations(Vec<ContactMessageViolation>);

impl ContactMessageViolations {
    pub fn as_slice(&self) -> &[ContactMessageViolation] {
        &self.0
    }

    pub fn contains(&self, violation: ContactMessageViolation) -> bool {
        self.0.contains(&violation)
    }
}

impl From<ContactMessageViolation> for ContactMessageViolations {
    fn from(value: ContactMessageViolation) -> Self {
        Self(vec![value])
    }
}

impl fmt::Display for ContactMessageViolations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut it = self.0.iter();
        if let Some(first) = it.next() {
            write!(f, "{first}")?;
        }
        for violation in it {
            write!(f, ", {violation}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ContactMessageViolations {}
