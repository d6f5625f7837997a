//! Lifecycle shared by every transaction document.
//!
//! Draft → Posted (post) → Cancelled (cancel). Drafts can be edited and
//! soft-deleted; posted and cancelled documents cannot. A draft is never
//! cancelled directly.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tally_shared::AppError;
use tally_shared::types::JournalEntryId;
use thiserror::Error;
use uuid::Uuid;

use crate::ledger::SourceType;

/// Document status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    /// Editable, not yet in the ledger.
    Draft,
    /// Booked to the ledger.
    Posted,
    /// Reversed out of the ledger.
    Cancelled,
}

impl DocumentStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Posted => "posted",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The four posting document types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    /// Cash paid out of a cashbox.
    CashPayment,
    /// Cash received into a cashbox.
    CashReceipt,
    /// Cash moved between cashboxes.
    CashTransfer,
    /// Stock count correction.
    InventoryAdjustment,
}

impl DocumentKind {
    /// Human-readable label used in messages.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::CashPayment => "Cash payment",
            Self::CashReceipt => "Cash receipt",
            Self::CashTransfer => "Cash transfer",
            Self::InventoryAdjustment => "Inventory adjustment",
        }
    }

    /// Journal source type for entries this document posts.
    #[must_use]
    pub fn source_type(&self) -> SourceType {
        match self {
            Self::CashPayment => SourceType::CashPayment,
            Self::CashReceipt => SourceType::CashReceipt,
            Self::CashTransfer => SourceType::CashTransfer,
            Self::InventoryAdjustment => SourceType::Adjustment,
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Errors from document status transitions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    /// Document lookup failed (missing or soft-deleted).
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Document type.
        kind: DocumentKind,
        /// Requested id.
        id: Uuid,
    },

    /// Post attempted on a non-draft document.
    #[error("{kind} {number} is already {status}; only drafts can be posted")]
    AlreadyPostedOrCancelled {
        /// Document type.
        kind: DocumentKind,
        /// Document number.
        number: String,
        /// Current status.
        status: DocumentStatus,
    },

    /// Cancel attempted on a non-posted document.
    #[error("{kind} {number} is {status}; only posted documents can be cancelled")]
    NotPosted {
        /// Document type.
        kind: DocumentKind,
        /// Document number.
        number: String,
        /// Current status.
        status: DocumentStatus,
    },

    /// Edit or delete attempted on a non-draft document.
    #[error("{kind} {number} is {status}; only drafts can be modified or deleted")]
    NotEditable {
        /// Document type.
        kind: DocumentKind,
        /// Document number.
        number: String,
        /// Current status.
        status: DocumentStatus,
    },

    /// Posted document carries no journal entry to reverse.
    #[error("{kind} {number} has no journal entry to reverse")]
    NoJournalToReverse {
        /// Document type.
        kind: DocumentKind,
        /// Document number.
        number: String,
    },
}

impl DocumentError {
    /// Returns the error code for logs and API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "DOCUMENT_NOT_FOUND",
            Self::AlreadyPostedOrCancelled { .. } => "ALREADY_POSTED_OR_CANCELLED",
            Self::NotPosted { .. } => "NOT_POSTED",
            Self::NotEditable { .. } => "NOT_EDITABLE",
            Self::NoJournalToReverse { .. } => "NO_JOURNAL_TO_REVERSE",
        }
    }
}

impl From<DocumentError> for AppError {
    fn from(err: DocumentError) -> Self {
        match err {
            DocumentError::NotFound { .. } => Self::NotFound(err.to_string()),
            DocumentError::NoJournalToReverse { .. } => Self::InvariantViolation(err.to_string()),
            _ => Self::StateConflict(err.to_string()),
        }
    }
}

/// A transaction document that carries a [`DocumentHeader`].
pub trait Document: Clone + Send + Sync + 'static {
    /// Document type.
    const KIND: DocumentKind;

    /// Raw id, recorded as the journal entry's source id.
    fn source_id(&self) -> Uuid;

    /// Shared header.
    fn header(&self) -> &DocumentHeader;

    /// Shared header, mutably.
    fn header_mut(&mut self) -> &mut DocumentHeader;

    /// Not-found error for this document type.
    fn not_found(id: Uuid) -> DocumentError {
        DocumentError::NotFound {
            kind: Self::KIND,
            id,
        }
    }
}

/// Header fields and status machine embedded in every document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentHeader {
    /// Document type.
    pub kind: DocumentKind,
    /// Gapless human-readable number.
    pub number: String,
    /// Business date; drives the fiscal period at post time.
    pub date: NaiveDate,
    /// Current status.
    pub status: DocumentStatus,
    /// Journal entry booked at post time.
    pub journal_entry_id: Option<JournalEntryId>,
    /// Who created the document.
    pub created_by: String,
    /// When the document was created.
    pub created_at: DateTime<Utc>,
    /// When the document was posted.
    pub posted_at: Option<DateTime<Utc>>,
    /// When the document was cancelled.
    pub cancelled_at: Option<DateTime<Utc>>,
    /// Who soft-deleted the draft.
    pub deleted_by: Option<String>,
    /// When the draft was soft-deleted.
    pub deleted_at: Option<DateTime<Utc>>,
}

impl DocumentHeader {
    /// Creates a draft header.
    #[must_use]
    pub fn draft(
        kind: DocumentKind,
        number: String,
        date: NaiveDate,
        created_by: &str,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            kind,
            number,
            date,
            status: DocumentStatus::Draft,
            journal_entry_id: None,
            created_by: created_by.to_string(),
            created_at,
            posted_at: None,
            cancelled_at: None,
            deleted_by: None,
            deleted_at: None,
        }
    }

    /// Returns true once the draft was soft-deleted.
    #[must_use]
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Fails unless the document is an editable draft.
    pub fn ensure_editable(&self) -> Result<(), DocumentError> {
        if self.status == DocumentStatus::Draft {
            Ok(())
        } else {
            Err(DocumentError::NotEditable {
                kind: self.kind,
                number: self.number.clone(),
                status: self.status,
            })
        }
    }

    /// Fails unless the document can be posted.
    pub fn ensure_postable(&self) -> Result<(), DocumentError> {
        if self.status == DocumentStatus::Draft {
            Ok(())
        } else {
            Err(DocumentError::AlreadyPostedOrCancelled {
                kind: self.kind,
                number: self.number.clone(),
                status: self.status,
            })
        }
    }

    /// Fails unless the document can be cancelled.
    pub fn ensure_cancellable(&self) -> Result<(), DocumentError> {
        if self.status == DocumentStatus::Posted {
            Ok(())
        } else {
            Err(DocumentError::NotPosted {
                kind: self.kind,
                number: self.number.clone(),
                status: self.status,
            })
        }
    }

    /// Journal entry to reverse on cancel.
    pub fn journal_to_reverse(&self) -> Result<JournalEntryId, DocumentError> {
        self.journal_entry_id
            .ok_or_else(|| DocumentError::NoJournalToReverse {
                kind: self.kind,
                number: self.number.clone(),
            })
    }

    /// Draft → Posted.
    pub fn mark_posted(
        &mut self,
        journal_entry_id: Option<JournalEntryId>,
        posted_at: DateTime<Utc>,
    ) -> Result<(), DocumentError> {
        self.ensure_postable()?;
        self.status = DocumentStatus::Posted;
        self.journal_entry_id = journal_entry_id;
        self.posted_at = Some(posted_at);
        Ok(())
    }

    /// Posted → Cancelled.
    pub fn mark_cancelled(&mut self, cancelled_at: DateTime<Utc>) -> Result<(), DocumentError> {
        self.ensure_cancellable()?;
        self.status = DocumentStatus::Cancelled;
        self.cancelled_at = Some(cancelled_at);
        Ok(())
    }

    /// Soft-deletes a draft.
    pub fn mark_deleted(
        &mut self,
        deleted_by: &str,
        deleted_at: DateTime<Utc>,
    ) -> Result<(), DocumentError> {
        self.ensure_editable()?;
        self.deleted_by = Some(deleted_by.to_string());
        self.deleted_at = Some(deleted_at);
        Ok(())
    }
}
