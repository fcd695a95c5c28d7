//! Routing of queries to authoritative WHOIS servers.
//!
//! The directory is an immutable value built once at startup. Lookups
//! are longest-suffix-first: a compound suffix such as `co.uk` wins over
//! the bare `uk` entry.

use std::collections::HashMap;

use tracing::debug;

use crate::errors::WhoisError;

/// Root WHOIS server, also the default target for IP queries.
pub const IANA_WHOIS_SERVER: &str = "whois.iana.org";

/// What kind of object a query names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    Domain,
    Ip,
}

impl QueryKind {
    /// Classify a query string. Anything that parses as an IPv4/IPv6
    /// literal is an IP query; everything else is treated as a domain.
    pub fn of(query: &str) -> Self {
        if query.parse::<std::net::IpAddr>().is_ok() {
            QueryKind::Ip
        } else {
            QueryKind::Domain
        }
    }
}

// TLD and second-level suffix mappings. Covers the major gTLDs, ccTLDs,
// registry-specific second-level zones and the CentralNic namespaces.
const DOMAIN_SERVER_TABLE: &[(&str, &str)] = &[
    // Generic TLDs
    ("com", "whois.verisign-grs.com"),
    ("net", "whois.verisign-grs.com"),
    ("org", "whois.pir.org"),
    ("info", "whois.afilias.net"),
    ("biz", "whois.biz"),
    ("mobi", "whois.nic.mobi"),
    ("name", "whois.nic.name"),
    ("pro", "whois.afilias.net"),
    ("edu", "whois.educause.edu"),
    ("gov", "whois.dotgov.gov"),
    ("jobs", "jobswhois.verisign-grs.com"),
    ("cat", "whois.nic.cat"),
    ("tel", "whois.nic.tel"),
    ("travel", "whois.nic.travel"),
    ("museum", "whois.museum"),
    ("asia", "whois.nic.asia"),
    ("coop", "whois.nic.coop"),
    // Popular new gTLDs
    ("xyz", "whois.nic.xyz"),
    ("top", "whois.nic.top"),
    ("vip", "whois.nic.vip"),
    ("club", "whois.nic.club"),
    ("shop", "whois.nic.shop"),
    ("site", "whois.nic.site"),
    ("online", "whois.nic.online"),
    ("store", "whois.nic.store"),
    ("tech", "whois.nic.tech"),
    ("blog", "whois.nic.blog"),
    ("live", "whois.nic.live"),
    ("fun", "whois.nic.fun"),
    ("cloud", "whois.nic.cloud"),
    ("app", "whois.nic.google"),
    ("dev", "whois.nic.google"),
    ("wang", "whois.gtld.knet.cn"),
    ("xin", "whois.gtld.knet.cn"),
    ("ltd", "whois.gtld.knet.cn"),
    ("zone", "whois.nic.zone"),
    // Verisign-operated ccTLD registries
    ("cc", "ccwhois.verisign-grs.com"),
    ("tv", "tvwhois.verisign-grs.com"),
    // Europe
    ("uk", "whois.nic.uk"),
    ("co.uk", "whois.nic.uk"),
    ("org.uk", "whois.nic.uk"),
    ("me.uk", "whois.nic.uk"),
    ("net.uk", "whois.nic.uk"),
    ("gov.uk", "whois.ja.net"),
    ("ac.uk", "whois.ja.net"),
    ("de", "whois.denic.de"),
    ("fr", "whois.nic.fr"),
    ("it", "whois.nic.it"),
    ("es", "whois.nic.es"),
    ("nl", "whois.domain-registry.nl"),
    ("be", "whois.dns.be"),
    ("ch", "whois.nic.ch"),
    ("li", "whois.nic.li"),
    ("at", "whois.nic.at"),
    ("se", "whois.iis.se"),
    ("no", "whois.norid.no"),
    ("dk", "whois.dk-hostmaster.dk"),
    ("fi", "whois.fi"),
    ("pl", "whois.dns.pl"),
    ("cz", "whois.nic.cz"),
    ("sk", "whois.sk-nic.sk"),
    ("hu", "whois.nic.hu"),
    ("ro", "whois.rotld.ro"),
    ("bg", "whois.register.bg"),
    ("hr", "whois.dns.hr"),
    ("si", "whois.register.si"),
    ("lt", "whois.domreg.lt"),
    ("lv", "whois.nic.lv"),
    ("lu", "whois.dns.lu"),
    ("ee", "whois.tld.ee"),
    ("ie", "whois.weare.ie"),
    ("pt", "whois.dns.pt"),
    ("gr", "whois.nic.gr"),
    ("is", "whois.isnic.is"),
    ("eu", "whois.eu"),
    // Asia-Pacific
    ("jp", "whois.jprs.jp"),
    ("co.jp", "whois.jprs.jp"),
    ("ne.jp", "whois.jprs.jp"),
    ("kr", "whois.kr"),
    ("cn", "whois.cnnic.cn"),
    ("com.cn", "whois.cnnic.cn"),
    ("net.cn", "whois.cnnic.cn"),
    ("org.cn", "whois.cnnic.cn"),
    ("gov.cn", "whois.cnnic.cn"),
    ("edu.cn", "whois.edu.cn"),
    ("hk", "whois.hkirc.hk"),
    ("tw", "whois.twnic.net.tw"),
    ("sg", "whois.sgnic.sg"),
    ("my", "whois.mynic.my"),
    ("th", "whois.thnic.co.th"),
    ("id", "whois.id"),
    ("ph", "whois.dot.ph"),
    ("vn", "whois.vnnic.vn"),
    ("in", "whois.registry.in"),
    ("co.in", "whois.registry.in"),
    ("au", "whois.auda.org.au"),
    ("com.au", "whois.auda.org.au"),
    ("net.au", "whois.auda.org.au"),
    ("nz", "whois.srs.net.nz"),
    ("co.nz", "whois.srs.net.nz"),
    ("io", "whois.nic.io"),
    ("ai", "whois.nic.ai"),
    ("me", "whois.nic.me"),
    ("co", "whois.nic.co"),
    // Americas
    ("ca", "whois.cira.ca"),
    ("us", "whois.nic.us"),
    ("mx", "whois.mx"),
    ("br", "whois.registro.br"),
    ("com.br", "whois.registro.br"),
    ("ar", "whois.nic.ar"),
    ("cl", "whois.nic.cl"),
    ("pe", "kero.yachay.pe"),
    ("uy", "whois.nic.org.uy"),
    ("ve", "whois.nic.ve"),
    // Russia, Eastern Europe, Middle East, Africa
    ("ru", "whois.tcinet.ru"),
    ("su", "whois.tcinet.ru"),
    ("ua", "whois.ua"),
    ("by", "whois.cctld.by"),
    ("kz", "whois.nic.kz"),
    ("il", "whois.isoc.org.il"),
    ("tr", "whois.nic.tr"),
    ("ae", "whois.aeda.net.ae"),
    ("sa", "whois.nic.net.sa"),
    ("za", "whois.registry.net.za"),
    ("co.za", "whois.registry.net.za"),
    // CentralNic second-level namespaces
    ("uk.com", "whois.centralnic.net"),
    ("us.com", "whois.centralnic.net"),
    ("eu.com", "whois.centralnic.net"),
    ("de.com", "whois.centralnic.net"),
    ("cn.com", "whois.centralnic.net"),
    ("br.com", "whois.centralnic.net"),
    ("ru.com", "whois.centralnic.net"),
    ("sa.com", "whois.centralnic.net"),
    ("se.com", "whois.centralnic.net"),
    ("za.com", "whois.centralnic.net"),
    ("gb.net", "whois.centralnic.net"),
    ("uk.net", "whois.centralnic.net"),
    ("se.net", "whois.centralnic.net"),
];

// Regional Internet Registries, exposed for caller-driven IP re-query
// after reading IANA's referral.
const RIR_SERVER_TABLE: &[(&str, &str)] = &[
    ("arin", "whois.arin.net"),       // North America
    ("ripe", "whois.ripe.net"),       // Europe, Middle East, Central Asia
    ("apnic", "whois.apnic.net"),     // Asia Pacific
    ("afrinic", "whois.afrinic.net"), // Africa
    ("lacnic", "whois.lacnic.net"),   // Latin America and Caribbean
];

/// Read-only mapping from TLD (or second-level suffix) to authoritative
/// WHOIS server, plus the registry servers used for IP lookups.
#[derive(Debug, Clone)]
pub struct ServerDirectory {
    domain_servers: HashMap<String, String>,
    rir_servers: HashMap<String, String>,
    ip_default: String,
}

impl ServerDirectory {
    /// Directory backed by the bundled server table.
    pub fn bundled() -> Self {
        Self::with_entries(DOMAIN_SERVER_TABLE.iter().copied())
    }

    /// Directory over an explicit suffix table. Used with fixture tables
    /// in tests; the RIR map and IP default stay the same.
    pub fn with_entries<'a>(entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let domain_servers = entries
            .into_iter()
            .map(|(suffix, host)| (suffix.to_string(), host.to_string()))
            .collect();
        let rir_servers = RIR_SERVER_TABLE
            .iter()
            .map(|(region, host)| (region.to_string(), host.to_string()))
            .collect();

        Self {
            domain_servers,
            rir_servers,
            ip_default: IANA_WHOIS_SERVER.to_string(),
        }
    }

    /// Resolve the authoritative server for a query.
    ///
    /// Domains try the compound suffix (last two labels) before the bare
    /// TLD, so `co.uk` entries shadow `uk`. IP literals route to the
    /// IANA root server; IANA's response names the responsible RIR and
    /// callers may re-query it explicitly.
    pub fn resolve(&self, query: &str, kind: QueryKind) -> Result<String, WhoisError> {
        match kind {
            QueryKind::Ip => Ok(self.ip_default.clone()),
            QueryKind::Domain => {
                let query = query.to_lowercase();
                let labels: Vec<&str> = query.split('.').collect();
                if labels.len() < 2 || labels.iter().any(|label| label.is_empty()) {
                    return Err(WhoisError::InvalidQuery(query));
                }

                let compound = format!("{}.{}", labels[labels.len() - 2], labels[labels.len() - 1]);
                let tld = labels[labels.len() - 1];

                let server = self
                    .domain_servers
                    .get(compound.as_str())
                    .or_else(|| self.domain_servers.get(tld))
                    .ok_or_else(|| WhoisError::UnsupportedTld(tld.to_string()))?;

                // A query that names the resolved server itself is a
                // caller mistake (whois server passed as the query).
                if server == &query {
                    return Err(WhoisError::InvalidQuery(query));
                }

                debug!("Resolved {} to {}", query, server);
                Ok(server.clone())
            }
        }
    }

    /// WHOIS server for a Regional Internet Registry
    /// (`arin`, `ripe`, `apnic`, `afrinic`, `lacnic`).
    pub fn rir_server(&self, region: &str) -> Option<&str> {
        self.rir_servers.get(&region.to_lowercase()).map(String::as_str)
    }

    /// Default server for IP queries.
    pub fn ip_default(&self) -> &str {
        &self.ip_default
    }
}

impl Default for ServerDirectory {
    fn default() -> Self {
        Self::bundled()
    }
}
