//! Normalized record types and the final assembly step.

use serde::{Deserialize, Serialize};

/// Contact sub-record for a registrant/admin/tech role. Absent fields
/// are omitted from serialized output, never emitted as null.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactBlock {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

impl ContactBlock {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.organization.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.address.is_none()
            && self.city.is_none()
            && self.state.is_none()
            && self.postal_code.is_none()
            && self.country.is_none()
    }
}

/// Fields recognized across WHOIS dialects. A field is present only when
/// an extraction pattern matched non-empty text; "not applicable" and
/// "present but empty" are never conflated.
///
/// The `net_range`/`cidr`/`organization`/`country` fields carry the
/// RIR-style data returned for IP queries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WhoisRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registrar: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creation_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_date: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub name_servers: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub status: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registrant: Option<ContactBlock>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin: Option<ContactBlock>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tech: Option<ContactBlock>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub net_range: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cidr: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

impl WhoisRecord {
    pub fn is_empty(&self) -> bool {
        self.domain_name.is_none()
            && self.registrar.is_none()
            && self.creation_date.is_none()
            && self.expiration_date.is_none()
            && self.updated_date.is_none()
            && self.name_servers.is_empty()
            && self.status.is_empty()
            && self.registrant.is_none()
            && self.admin.is_none()
            && self.tech.is_none()
            && self.net_range.is_none()
            && self.cidr.is_none()
            && self.organization.is_none()
            && self.country.is_none()
    }
}

/// Terminal value of the extraction pipeline. Raw registry text is
/// always retained: extraction is lossy and the raw text is the ground
/// truth callers can display or re-parse later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum ExtractionOutcome {
    /// At least one field was recognized.
    #[serde(rename_all = "camelCase")]
    Structured { record: WhoisRecord, raw_data: String },
    /// No field matched; the raw text is the whole answer.
    #[serde(rename_all = "camelCase")]
    RawFallback { raw_data: String, reason: String },
    /// The registry confirmed the object is not registered. A successful
    /// lookup, not an error.
    #[serde(rename_all = "camelCase")]
    NotFound { raw_data: String },
}

impl ExtractionOutcome {
    pub fn raw_data(&self) -> &str {
        match self {
            ExtractionOutcome::Structured { raw_data, .. }
            | ExtractionOutcome::RawFallback { raw_data, .. }
            | ExtractionOutcome::NotFound { raw_data } => raw_data,
        }
    }
}

/// Merge extracted fields into the final outcome, dropping empty
/// sub-records. An all-empty record degrades to the raw fallback shape
/// rather than posing as an empty success.
pub fn assemble(mut record: WhoisRecord, raw_data: String) -> ExtractionOutcome {
    if record.registrant.as_ref().is_some_and(ContactBlock::is_empty) {
        record.registrant = None;
    }
    if record.admin.as_ref().is_some_and(ContactBlock::is_empty) {
        record.admin = None;
    }
    if record.tech.as_ref().is_some_and(ContactBlock::is_empty) {
        record.tech = None;
    }

    if record.is_empty() {
        ExtractionOutcome::RawFallback {
            raw_data,
            reason: "unable to parse".to_string(),
        }
    } else {
        ExtractionOutcome::Structured { record, raw_data }
    }
}
