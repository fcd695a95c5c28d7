//! Best-effort field extraction from free-text registry responses.
//!
//! There is no grammar to parse against: every registry formats its
//! output differently, so each logical field carries an ordered list of
//! label aliases tried in order. Dialect detection narrows the tables
//! for known formats (Verisign, CNNIC) but always falls back to the
//! generic cross-dialect set, so dialect selection is never load-bearing.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;
use url::Url;

use crate::dates;
use crate::record::{assemble, ContactBlock, ExtractionOutcome, WhoisRecord};

/// Safety cap: a longer "value" is a runaway greedy match, not a field.
const MAX_FIELD_LEN: usize = 500;

// Sentinels confirming the object is not registered. Matched
// case-sensitively; a case-insensitive "not found" would false-positive
// on ordinary field values.
const NOT_FOUND_SENTINELS: &[&str] = &[
    "No match for domain",
    "No match for",
    "NOT FOUND",
    "No Data Found",
    "Domain not found",
    "% No entries found",
    "The queried object does not exist",
];

/// Ordered label-alias tables for one WHOIS dialect.
struct PatternSet {
    domain_name: Vec<Regex>,
    registrar: Vec<Regex>,
    creation_date: Vec<Regex>,
    expiration_date: Vec<Regex>,
    updated_date: Vec<Regex>,
    name_servers: Vec<Regex>,
    status: Vec<Regex>,
}

/// Compile `Label:` alias patterns, anchored to line starts and
/// capturing the rest of the line.
fn labels(aliases: &[&str]) -> Vec<Regex> {
    aliases
        .iter()
        .map(|alias| {
            Regex::new(&format!(
                r"(?mi)^[ \t]*{}:[ \t]*(.+)$",
                regex::escape(alias)
            ))
            .unwrap()
        })
        .collect()
}

static GENERIC: Lazy<PatternSet> = Lazy::new(|| PatternSet {
    domain_name: labels(&["Domain Name", "domain"]),
    registrar: labels(&[
        "Registrar",
        "Registrar Name",
        "Sponsoring Registrar",
        "Registration Service Provider",
        "Sponsoring Registrar Organization",
    ]),
    creation_date: labels(&[
        "Creation Date",
        "Created On",
        "Created Date",
        "Created",
        "Registration Date",
        "Registration Time",
        "Registered on",
        "registered",
        "RegDate",
    ]),
    expiration_date: labels(&[
        "Registry Expiry Date",
        "Registrar Registration Expiration Date",
        "Expiration Date",
        "Expiry Date",
        "Expires On",
        "Expires",
        "Expiry",
        "expire",
        "paid-till",
    ]),
    updated_date: labels(&[
        "Updated Date",
        "Last Updated On",
        "Last Modified",
        "Last Update",
        "Updated",
        "modified",
        "Changed",
        "last-updated",
        "last-modified",
    ]),
    name_servers: labels(&["Name Server", "nserver", "Name Servers", "Nameservers", "DNS"]),
    status: labels(&["Domain Status", "Status"]),
});

// Verisign thick-registry format (.com/.net/.cc/.tv): exact labels, no
// aliases needed.
static VERISIGN: Lazy<PatternSet> = Lazy::new(|| PatternSet {
    domain_name: labels(&["Domain Name"]),
    registrar: labels(&["Registrar"]),
    creation_date: labels(&["Creation Date"]),
    expiration_date: labels(&["Registry Expiry Date", "Registrar Registration Expiration Date"]),
    updated_date: labels(&["Updated Date"]),
    name_servers: labels(&["Name Server"]),
    status: labels(&["Domain Status"]),
});

// CNNIC and other Chinese registries mix Chinese labels with English.
static CNNIC: Lazy<PatternSet> = Lazy::new(|| PatternSet {
    domain_name: labels(&["Domain Name", "域名"]),
    registrar: labels(&["注册商", "Registrar", "Sponsoring Registrar"]),
    creation_date: labels(&[
        "注册时间",
        "注册日期",
        "Registration Time",
        "Registration Date",
        "Creation Date",
    ]),
    expiration_date: labels(&[
        "过期时间",
        "到期日期",
        "Expiration Time",
        "Expiration Date",
        "Registry Expiry Date",
    ]),
    updated_date: labels(&["Updated Date", "Last Updated"]),
    name_servers: labels(&["DNS服务器", "Name Server", "nserver"]),
    status: labels(&["状态", "Domain Status", "Status"]),
});

// RIR-style fields returned for IP queries; only in the generic set.
static NET_RANGE: Lazy<Vec<Regex>> = Lazy::new(|| labels(&["NetRange", "inetnum"]));
static CIDR: Lazy<Vec<Regex>> = Lazy::new(|| labels(&["CIDR"]));
static ORGANIZATION: Lazy<Vec<Regex>> =
    Lazy::new(|| labels(&["Organization", "OrgName", "org-name", "org"]));
static COUNTRY: Lazy<Vec<Regex>> = Lazy::new(|| labels(&["Country"]));

// Indented block of name servers under a bare "Name Servers:" heading,
// used by registries that do not repeat the label per line.
static NS_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?mi)^[ \t]*Name Servers?:[ \t]*$((?:\n[ \t]+\S.*)+)").unwrap());

/// Per-role contact alias tables (`Registrant Name:`, `Admin Email:`, …).
struct ContactPatterns {
    name: Vec<Regex>,
    organization: Vec<Regex>,
    email: Vec<Regex>,
    phone: Vec<Regex>,
    address: Vec<Regex>,
    city: Vec<Regex>,
    state: Vec<Regex>,
    postal_code: Vec<Regex>,
    country: Vec<Regex>,
}

fn role_patterns(role: &str) -> ContactPatterns {
    let field = |suffixes: &[&str]| -> Vec<Regex> {
        suffixes
            .iter()
            .map(|suffix| {
                Regex::new(&format!(
                    r"(?mi)^[ \t]*(?:{role})[ \t_-]+{}:[ \t]*(.+)$",
                    regex::escape(suffix)
                ))
                .unwrap()
            })
            .collect()
    };

    let mut name = field(&["Name", "Contact"]);
    // Some registries (CNNIC among them) put the holder name on a bare
    // role line: "Registrant: ...".
    name.push(Regex::new(&format!(r"(?mi)^[ \t]*(?:{role}):[ \t]*(.+)$")).unwrap());

    ContactPatterns {
        name,
        organization: field(&["Organization", "Org"]),
        email: field(&["Email", "E-mail"]),
        phone: field(&["Phone", "Phone Number"]),
        address: field(&["Street", "Address"]),
        city: field(&["City"]),
        state: field(&["State/Province", "State"]),
        postal_code: field(&["Postal Code", "PostalCode"]),
        country: field(&["Country", "Country/Economy"]),
    }
}

static REGISTRANT: Lazy<ContactPatterns> = Lazy::new(|| role_patterns("Registrant"));
static ADMIN: Lazy<ContactPatterns> = Lazy::new(|| role_patterns("Admin(?:istrative)?"));
static TECH: Lazy<ContactPatterns> = Lazy::new(|| role_patterns("Tech(?:nical)?"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dialect {
    Verisign,
    Cnnic,
    Generic,
}

fn detect_dialect(text: &str, tld_hint: Option<&str>) -> Dialect {
    if tld_hint == Some("cn")
        || text.contains("CNNIC WHOIS")
        || text.contains("注册商")
        || text.contains("域名信息")
    {
        Dialect::Cnnic
    } else if text.contains("Whois Server Version 2.0")
        || text.contains("whois.verisign-grs.com")
    {
        Dialect::Verisign
    } else {
        Dialect::Generic
    }
}

/// Extract a normalized record from (already normalized) response text.
///
/// Total over all inputs: empty text, binary garbage and huge blobs all
/// come back as an [`ExtractionOutcome`], never a panic. `tld_hint`
/// optionally biases dialect selection (e.g. `cn`).
pub fn extract(text: &str, tld_hint: Option<&str>) -> ExtractionOutcome {
    if text.trim().is_empty() {
        return ExtractionOutcome::RawFallback {
            raw_data: text.to_string(),
            reason: "empty response".to_string(),
        };
    }

    if let Some(sentinel) = NOT_FOUND_SENTINELS.iter().find(|s| text.contains(*s)) {
        debug!("Not-found sentinel matched: {}", sentinel);
        return ExtractionOutcome::NotFound {
            raw_data: text.to_string(),
        };
    }

    let dialect = detect_dialect(text, tld_hint);
    let primary: Option<&PatternSet> = match dialect {
        Dialect::Verisign => Some(&VERISIGN),
        Dialect::Cnnic => Some(&CNNIC),
        Dialect::Generic => None,
    };
    debug!("Extracting with dialect {:?}", dialect);

    let mut record = WhoisRecord {
        domain_name: single(text, primary.map(|p| p.domain_name.as_slice()), &GENERIC.domain_name),
        registrar: single(text, primary.map(|p| p.registrar.as_slice()), &GENERIC.registrar),
        creation_date: single(
            text,
            primary.map(|p| p.creation_date.as_slice()),
            &GENERIC.creation_date,
        )
        .map(|v| dates::canonicalize(&v)),
        expiration_date: single(
            text,
            primary.map(|p| p.expiration_date.as_slice()),
            &GENERIC.expiration_date,
        )
        .map(|v| dates::canonicalize(&v)),
        updated_date: single(
            text,
            primary.map(|p| p.updated_date.as_slice()),
            &GENERIC.updated_date,
        )
        .map(|v| dates::canonicalize(&v)),
        status: multi(text, primary.map(|p| p.status.as_slice()), &GENERIC.status),
        net_range: single(text, None, &NET_RANGE),
        cidr: single(text, None, &CIDR),
        organization: single(text, None, &ORGANIZATION),
        country: single(text, None, &COUNTRY),
        ..Default::default()
    };

    let mut name_servers = multi(
        text,
        primary.map(|p| p.name_servers.as_slice()),
        &GENERIC.name_servers,
    );
    if name_servers.is_empty() {
        name_servers = ns_block_fallback(text);
    }
    record.name_servers = dedupe(
        name_servers
            .iter()
            .filter_map(|value| value.split_whitespace().next())
            .map(|host| host.trim_end_matches('.').to_lowercase())
            .filter(|host| !host.is_empty()),
    );

    record.registrant = contact(text, &REGISTRANT);
    record.admin = contact(text, &ADMIN);
    record.tech = contact(text, &TECH);

    assemble(record, text.to_string())
}

/// First sane capture for a single-valued field: dialect table first,
/// generic aliases as the fallback.
fn single(text: &str, primary: Option<&[Regex]>, generic: &[Regex]) -> Option<String> {
    primary
        .and_then(|patterns| first_capture(text, patterns))
        .or_else(|| first_capture(text, generic))
}

fn first_capture(text: &str, patterns: &[Regex]) -> Option<String> {
    for pattern in patterns {
        for caps in pattern.captures_iter(text) {
            if let Some(value) = sanitize(&caps[1]) {
                return Some(value);
            }
        }
    }
    None
}

/// Every sane capture across every pattern, first-seen order, exact
/// duplicates dropped. Generic aliases apply only when the dialect table
/// matched nothing.
fn multi(text: &str, primary: Option<&[Regex]>, generic: &[Regex]) -> Vec<String> {
    let values = collect_all(text, primary.unwrap_or(&[]));
    if values.is_empty() {
        collect_all(text, generic)
    } else {
        values
    }
}

fn collect_all(text: &str, patterns: &[Regex]) -> Vec<String> {
    let mut values: Vec<String> = Vec::new();
    for pattern in patterns {
        for caps in pattern.captures_iter(text) {
            if let Some(value) = sanitize(&caps[1]) {
                if !values.contains(&value) {
                    values.push(value);
                }
            }
        }
    }
    values
}

fn dedupe(items: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for item in items {
        if !out.contains(&item) {
            out.push(item);
        }
    }
    out
}

/// Trim and reject implausible captures: overlong values and bare URLs
/// both indicate a greedy mis-match rather than a real field value.
fn sanitize(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() || value.len() > MAX_FIELD_LEN {
        return None;
    }
    if (value.starts_with("http://") || value.starts_with("https://")) && Url::parse(value).is_ok()
    {
        return None;
    }
    Some(value.to_string())
}

fn ns_block_fallback(text: &str) -> Vec<String> {
    let Some(caps) = NS_BLOCK.captures(text) else {
        return Vec::new();
    };
    caps[1]
        .lines()
        .filter_map(|line| line.split_whitespace().next())
        .filter(|token| token.contains('.'))
        .map(str::to_string)
        .collect()
}

fn contact(text: &str, patterns: &ContactPatterns) -> Option<ContactBlock> {
    let block = ContactBlock {
        name: first_capture(text, &patterns.name),
        organization: first_capture(text, &patterns.organization),
        email: first_capture(text, &patterns.email),
        phone: first_capture(text, &patterns.phone),
        address: first_capture(text, &patterns.address),
        city: first_capture(text, &patterns.city),
        state: first_capture(text, &patterns.state),
        postal_code: first_capture(text, &patterns.postal_code),
        country: first_capture(text, &patterns.country),
    };
    if block.is_empty() {
        None
    } else {
        Some(block)
    }
}
