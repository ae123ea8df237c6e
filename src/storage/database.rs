//! Structured local database backend
//!
//! SQLite-based persistence for installations without a configured storage
//! directory. Dates are stored as RFC-3339 TEXT and rehydrated to typed
//! timestamps on read.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use tracing::warn;
use uuid::Uuid;

use crate::models::{
    IncomingMail, IncomingMailPatch, MailMedium, MailStatus, MailType, OutgoingMail,
    OutgoingMailPatch,
};

use super::codec::{decode_archive_strict, encode_archive, MailArchive};
use super::{BackendKind, ImportReport, MailStore, StorageError, StorageInfo};

/// Database file name inside the application data directory
pub const DATABASE_FILENAME: &str = "courrier.db";

/// Structured database backend
pub struct SqliteStore {
    conn: Connection,
    location: String,
}

impl SqliteStore {
    /// Open (or create) the database at `path` and initialize the schema
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(include_str!("schema.sql"))?;
        Ok(Self {
            conn,
            location: path.display().to_string(),
        })
    }

    /// Create an in-memory database for testing
    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(include_str!("schema.sql"))?;
        Ok(Self {
            conn,
            location: ":memory:".to_string(),
        })
    }

    fn get_incoming(&self, id: &str) -> Result<Option<IncomingMail>, StorageError> {
        let result = self.conn.query_row(
            "SELECT id, chrono_number, date, issue_date, medium, subject, observations,
                    document_link, status, mail_type, response_date, sender_name,
                    sender_address, recipient_service
             FROM incoming_mails WHERE id = ?1",
            params![id],
            row_to_incoming,
        );
        match result {
            Ok(mail) => Ok(Some(mail)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn get_outgoing(&self, id: &str) -> Result<Option<OutgoingMail>, StorageError> {
        let result = self.conn.query_row(
            "SELECT id, chrono_number, date, issue_date, medium, subject, observations,
                    document_link, status, correspondent, address, service, writer
             FROM outgoing_mails WHERE id = ?1",
            params![id],
            row_to_outgoing,
        );
        match result {
            Ok(mail) => Ok(Some(mail)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write_incoming(&self, mail: &IncomingMail) -> Result<(), StorageError> {
        self.conn.execute(
            "UPDATE incoming_mails SET chrono_number = ?2, date = ?3, issue_date = ?4,
                    medium = ?5, subject = ?6, observations = ?7, document_link = ?8,
                    status = ?9, mail_type = ?10, response_date = ?11, sender_name = ?12,
                    sender_address = ?13, recipient_service = ?14
             WHERE id = ?1",
            params![
                mail.id,
                mail.chrono_number,
                mail.date.to_rfc3339(),
                mail.issue_date.map(|d| d.to_rfc3339()),
                mail.medium.as_str(),
                mail.subject,
                mail.observations,
                mail.document_link,
                mail.status.as_str(),
                mail.mail_type.as_str(),
                mail.response_date.map(|d| d.to_rfc3339()),
                mail.sender_name,
                mail.sender_address,
                mail.recipient_service,
            ],
        )?;
        Ok(())
    }

    fn write_outgoing(&self, mail: &OutgoingMail) -> Result<(), StorageError> {
        self.conn.execute(
            "UPDATE outgoing_mails SET chrono_number = ?2, date = ?3, issue_date = ?4,
                    medium = ?5, subject = ?6, observations = ?7, document_link = ?8,
                    status = ?9, correspondent = ?10, address = ?11, service = ?12,
                    writer = ?13
             WHERE id = ?1",
            params![
                mail.id,
                mail.chrono_number,
                mail.date.to_rfc3339(),
                mail.issue_date.map(|d| d.to_rfc3339()),
                mail.medium.as_str(),
                mail.subject,
                mail.observations,
                mail.document_link,
                mail.status.as_str(),
                mail.correspondent,
                mail.address,
                mail.service,
                mail.writer,
            ],
        )?;
        Ok(())
    }
}

/// Parse a stored RFC-3339 date, falling back to now on corruption
fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| {
            warn!("date illisible en base: {s}");
            Utc::now()
        })
}

fn parse_opt_datetime(s: Option<String>) -> Option<DateTime<Utc>> {
    s.and_then(|v| {
        DateTime::parse_from_rfc3339(&v)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
    })
}

fn row_to_incoming(row: &Row) -> rusqlite::Result<IncomingMail> {
    let date_str: String = row.get(2)?;
    let issue_date: Option<String> = row.get(3)?;
    let medium: String = row.get(4)?;
    let status: String = row.get(8)?;
    let mail_type: String = row.get(9)?;
    let response_date: Option<String> = row.get(10)?;

    Ok(IncomingMail {
        id: row.get(0)?,
        chrono_number: row.get(1)?,
        date: parse_datetime(&date_str),
        issue_date: parse_opt_datetime(issue_date),
        medium: MailMedium::from_str(&medium),
        subject: row.get(5)?,
        observations: row.get(6)?,
        document_link: row.get(7)?,
        status: MailStatus::from_str(&status),
        mail_type: MailType::from_str(&mail_type),
        response_date: parse_opt_datetime(response_date),
        sender_name: row.get(11)?,
        sender_address: row.get(12)?,
        recipient_service: row.get(13)?,
    })
}

fn row_to_outgoing(row: &Row) -> rusqlite::Result<OutgoingMail> {
    let date_str: String = row.get(2)?;
    let issue_date: Option<String> = row.get(3)?;
    let medium: String = row.get(4)?;
    let status: String = row.get(8)?;

    Ok(OutgoingMail {
        id: row.get(0)?,
        chrono_number: row.get(1)?,
        date: parse_datetime(&date_str),
        issue_date: parse_opt_datetime(issue_date),
        medium: MailMedium::from_str(&medium),
        subject: row.get(5)?,
        observations: row.get(6)?,
        document_link: row.get(7)?,
        status: MailStatus::from_str(&status),
        correspondent: row.get(9)?,
        address: row.get(10)?,
        service: row.get(11)?,
        writer: row.get(12)?,
    })
}

impl MailStore for SqliteStore {
    fn save_incoming(&self, mail: IncomingMail) -> Result<String, StorageError> {
        self.conn.execute(
            "INSERT INTO incoming_mails (id, chrono_number, date, issue_date, medium, subject,
                    observations, document_link, status, mail_type, response_date, sender_name,
                    sender_address, recipient_service)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
            params![
                mail.id,
                mail.chrono_number,
                mail.date.to_rfc3339(),
                mail.issue_date.map(|d| d.to_rfc3339()),
                mail.medium.as_str(),
                mail.subject,
                mail.observations,
                mail.document_link,
                mail.status.as_str(),
                mail.mail_type.as_str(),
                mail.response_date.map(|d| d.to_rfc3339()),
                mail.sender_name,
                mail.sender_address,
                mail.recipient_service,
            ],
        )?;
        Ok(mail.id)
    }

    fn save_outgoing(&self, mail: OutgoingMail) -> Result<String, StorageError> {
        self.conn.execute(
            "INSERT INTO outgoing_mails (id, chrono_number, date, issue_date, medium, subject,
                    observations, document_link, status, correspondent, address, service, writer)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            params![
                mail.id,
                mail.chrono_number,
                mail.date.to_rfc3339(),
                mail.issue_date.map(|d| d.to_rfc3339()),
                mail.medium.as_str(),
                mail.subject,
                mail.observations,
                mail.document_link,
                mail.status.as_str(),
                mail.correspondent,
                mail.address,
                mail.service,
                mail.writer,
            ],
        )?;
        Ok(mail.id)
    }

    fn update_incoming(&self, id: &str, patch: &IncomingMailPatch) -> Result<bool, StorageError> {
        match self.get_incoming(id)? {
            Some(mut mail) => {
                patch.apply_to(&mut mail);
                self.write_incoming(&mail)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn update_outgoing(&self, id: &str, patch: &OutgoingMailPatch) -> Result<bool, StorageError> {
        match self.get_outgoing(id)? {
            Some(mut mail) => {
                patch.apply_to(&mut mail);
                self.write_outgoing(&mail)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn all_incoming(&self) -> Result<Vec<IncomingMail>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, chrono_number, date, issue_date, medium, subject, observations,
                    document_link, status, mail_type, response_date, sender_name,
                    sender_address, recipient_service
             FROM incoming_mails ORDER BY rowid",
        )?;
        let mails = stmt
            .query_map([], row_to_incoming)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(mails)
    }

    fn all_outgoing(&self) -> Result<Vec<OutgoingMail>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, chrono_number, date, issue_date, medium, subject, observations,
                    document_link, status, correspondent, address, service, writer
             FROM outgoing_mails ORDER BY rowid",
        )?;
        let mails = stmt
            .query_map([], row_to_outgoing)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(mails)
    }

    fn delete_incoming(&self, id: &str) -> Result<bool, StorageError> {
        let rows = self
            .conn
            .execute("DELETE FROM incoming_mails WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    fn delete_outgoing(&self, id: &str) -> Result<bool, StorageError> {
        let rows = self
            .conn
            .execute("DELETE FROM outgoing_mails WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    fn export_all(&self, dest_dir: &Path) -> Result<PathBuf, StorageError> {
        let archive = MailArchive {
            incoming_mails: self.all_incoming()?,
            outgoing_mails: self.all_outgoing()?,
            ..Default::default()
        };
        let path = dest_dir.join(super::export_filename(Utc::now()));
        let json = encode_archive(&archive)?;
        super::atomic_fs::atomic_write_str(&path, &json)?;
        Ok(path)
    }

    fn import_all(&self, src: &Path) -> Result<ImportReport, StorageError> {
        let content = std::fs::read_to_string(src)?;
        let imported = decode_archive_strict(&content)?;

        let mut report = ImportReport::default();
        for mut mail in imported.incoming_mails {
            mail.id = Uuid::new_v4().to_string();
            let chrono = mail.chrono_number.clone();
            if let Err(e) = self.save_incoming(mail) {
                report
                    .errors
                    .push(format!("courrier entrant {chrono} non importé: {e}"));
            } else {
                report.imported_count += 1;
            }
        }
        for mut mail in imported.outgoing_mails {
            mail.id = Uuid::new_v4().to_string();
            let chrono = mail.chrono_number.clone();
            if let Err(e) = self.save_outgoing(mail) {
                report
                    .errors
                    .push(format!("courrier sortant {chrono} non importé: {e}"));
            } else {
                report.imported_count += 1;
            }
        }
        report.success = report.errors.is_empty();
        Ok(report)
    }

    fn info(&self) -> StorageInfo {
        StorageInfo {
            kind: BackendKind::Database,
            location: self.location.clone(),
        }
    }
}
