//! Incoming and outgoing mail records
//!
//! The serde derives on these types are the canonical serialization
//! boundary: date fields are RFC-3339 strings on disk and typed UTC
//! timestamps everywhere else. Field names follow the persisted JSON
//! document format (camelCase).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Transmission medium of a piece of correspondence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum MailMedium {
    #[default]
    Email,
    Physical,
    Fax,
    Other,
}

impl MailMedium {
    /// Convert from the stored string representation
    pub fn from_str(s: &str) -> Self {
        match s {
            "Email" => MailMedium::Email,
            "Physical" => MailMedium::Physical,
            "Fax" => MailMedium::Fax,
            _ => MailMedium::Other,
        }
    }

    /// Convert to the stored string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            MailMedium::Email => "Email",
            MailMedium::Physical => "Physical",
            MailMedium::Fax => "Fax",
            MailMedium::Other => "Other",
        }
    }
}

/// Classification of an incoming piece of correspondence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum MailType {
    Administrative,
    Technical,
    Commercial,
    Financial,
    #[default]
    Other,
}

impl MailType {
    pub fn from_str(s: &str) -> Self {
        match s {
            "Administrative" => MailType::Administrative,
            "Technical" => MailType::Technical,
            "Commercial" => MailType::Commercial,
            "Financial" => MailType::Financial,
            _ => MailType::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MailType::Administrative => "Administrative",
            MailType::Technical => "Technical",
            MailType::Commercial => "Commercial",
            MailType::Financial => "Financial",
            MailType::Other => "Other",
        }
    }

    /// All classifications, in display order
    pub fn all() -> [MailType; 5] {
        [
            MailType::Administrative,
            MailType::Technical,
            MailType::Commercial,
            MailType::Financial,
            MailType::Other,
        ]
    }
}

/// Lifecycle status of a mail record
///
/// Transitions are never enforced: an edit may write any value, including
/// `Overdue`, independently of the derived lateness computed by the
/// statistics module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum MailStatus {
    #[default]
    Pending,
    Processing,
    Completed,
    Overdue,
}

impl MailStatus {
    pub fn from_str(s: &str) -> Self {
        match s {
            "Pending" => MailStatus::Pending,
            "Processing" => MailStatus::Processing,
            "Completed" => MailStatus::Completed,
            "Overdue" => MailStatus::Overdue,
            _ => MailStatus::Pending,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MailStatus::Pending => "Pending",
            MailStatus::Processing => "Processing",
            MailStatus::Completed => "Completed",
            MailStatus::Overdue => "Overdue",
        }
    }
}

/// Incoming mail record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomingMail {
    /// Record unique ID (UUID)
    pub id: String,
    /// Sequential reference code assigned at registration
    pub chrono_number: String,
    /// Registration date
    pub date: DateTime<Utc>,
    /// Issuance date of the correspondence itself
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue_date: Option<DateTime<Utc>>,
    pub medium: MailMedium,
    pub subject: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observations: Option<String>,
    /// Link to a scanned document or attachment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_link: Option<String>,
    #[serde(default)]
    pub status: MailStatus,
    pub mail_type: MailType,
    /// Deadline for answering this correspondence
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_date: Option<DateTime<Utc>>,
    pub sender_name: String,
    pub sender_address: String,
    /// Department the mail was routed to
    pub recipient_service: String,
}

/// Outgoing mail record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutgoingMail {
    /// Record unique ID (UUID)
    pub id: String,
    /// Sequential reference code assigned at registration
    pub chrono_number: String,
    /// Registration date
    pub date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue_date: Option<DateTime<Utc>>,
    pub medium: MailMedium,
    pub subject: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observations: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_link: Option<String>,
    #[serde(default)]
    pub status: MailStatus,
    /// Addressee of the correspondence
    pub correspondent: String,
    pub address: String,
    /// Originating department
    pub service: String,
    /// Author of the correspondence
    pub writer: String,
}

/// Partial update of an incoming mail record
///
/// Set fields are merged over the stored record; unset fields are left
/// untouched. Optional record fields cannot be cleared through a patch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IncomingMailPatch {
    pub chrono_number: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub issue_date: Option<DateTime<Utc>>,
    pub medium: Option<MailMedium>,
    pub subject: Option<String>,
    pub observations: Option<String>,
    pub document_link: Option<String>,
    pub status: Option<MailStatus>,
    pub mail_type: Option<MailType>,
    pub response_date: Option<DateTime<Utc>>,
    pub sender_name: Option<String>,
    pub sender_address: Option<String>,
    pub recipient_service: Option<String>,
}

impl IncomingMailPatch {
    /// Merge the set fields of this patch into `mail`
    pub fn apply_to(&self, mail: &mut IncomingMail) {
        if let Some(v) = &self.chrono_number {
            mail.chrono_number = v.clone();
        }
        if let Some(v) = self.date {
            mail.date = v;
        }
        if let Some(v) = self.issue_date {
            mail.issue_date = Some(v);
        }
        if let Some(v) = self.medium {
            mail.medium = v;
        }
        if let Some(v) = &self.subject {
            mail.subject = v.clone();
        }
        if let Some(v) = &self.observations {
            mail.observations = Some(v.clone());
        }
        if let Some(v) = &self.document_link {
            mail.document_link = Some(v.clone());
        }
        if let Some(v) = self.status {
            mail.status = v;
        }
        if let Some(v) = self.mail_type {
            mail.mail_type = v;
        }
        if let Some(v) = self.response_date {
            mail.response_date = Some(v);
        }
        if let Some(v) = &self.sender_name {
            mail.sender_name = v.clone();
        }
        if let Some(v) = &self.sender_address {
            mail.sender_address = v.clone();
        }
        if let Some(v) = &self.recipient_service {
            mail.recipient_service = v.clone();
        }
    }

    /// Patch that only changes the lifecycle status
    pub fn status(status: MailStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }
}

/// Partial update of an outgoing mail record
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OutgoingMailPatch {
    pub chrono_number: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub issue_date: Option<DateTime<Utc>>,
    pub medium: Option<MailMedium>,
    pub subject: Option<String>,
    pub observations: Option<String>,
    pub document_link: Option<String>,
    pub status: Option<MailStatus>,
    pub correspondent: Option<String>,
    pub address: Option<String>,
    pub service: Option<String>,
    pub writer: Option<String>,
}

impl OutgoingMailPatch {
    /// Merge the set fields of this patch into `mail`
    pub fn apply_to(&self, mail: &mut OutgoingMail) {
        if let Some(v) = &self.chrono_number {
            mail.chrono_number = v.clone();
        }
        if let Some(v) = self.date {
            mail.date = v;
        }
        if let Some(v) = self.issue_date {
            mail.issue_date = Some(v);
        }
        if let Some(v) = self.medium {
            mail.medium = v;
        }
        if let Some(v) = &self.subject {
            mail.subject = v.clone();
        }
        if let Some(v) = &self.observations {
            mail.observations = Some(v.clone());
        }
        if let Some(v) = &self.document_link {
            mail.document_link = Some(v.clone());
        }
        if let Some(v) = self.status {
            mail.status = v;
        }
        if let Some(v) = &self.correspondent {
            mail.correspondent = v.clone();
        }
        if let Some(v) = &self.address {
            mail.address = v.clone();
        }
        if let Some(v) = &self.service {
            mail.service = v.clone();
        }
        if let Some(v) = &self.writer {
            mail.writer = v.clone();
        }
    }

    /// Patch that only changes the lifecycle status
    pub fn status(status: MailStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }
}
