//! # WHOIS Lookup Core
//!
//! An RFC 3912 WHOIS client library: resolves a query to the
//! authoritative registry server, speaks the raw port-43 protocol with a
//! bounded deadline, and extracts structured fields from the free-text
//! response on a best-effort basis.
//!
//! Extraction is lossy by nature, so the contract is graceful
//! degradation: the caller always gets something usable. A recognized
//! response becomes a structured record, a confirmed "not registered"
//! answer is reported as such, and anything unparseable falls back to
//! the raw registry text.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use whois_lookup::{ExtractionOutcome, WhoisClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = WhoisClient::new()?;
//!     let result = client.lookup("example.com").await?;
//!
//!     match &result.outcome {
//!         ExtractionOutcome::Structured { record, .. } => {
//!             println!("Registrar: {:?}", record.registrar);
//!         }
//!         ExtractionOutcome::NotFound { .. } => println!("Not registered"),
//!         ExtractionOutcome::RawFallback { raw_data, .. } => println!("{raw_data}"),
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod dates;
pub mod errors;
pub mod extract;
pub mod normalize;
pub mod query;
pub mod record;
pub mod servers;
pub mod transport;

pub use config::Config;
pub use errors::WhoisError;
pub use record::{ContactBlock, ExtractionOutcome, WhoisRecord};
pub use servers::{QueryKind, ServerDirectory, IANA_WHOIS_SERVER};
pub use transport::{TcpTransport, Transport};

use std::{net::IpAddr, sync::Arc, time::Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Result envelope for one lookup: where the answer came from, how long
/// it took, and the extraction outcome (which always carries the raw
/// registry text).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupResult {
    pub query: String,
    pub server: String,
    pub query_time_ms: u64,
    pub outcome: ExtractionOutcome,
}

/// High-level WHOIS client.
///
/// Holds only immutable state (configuration, server directory, the
/// transport); concurrent lookups share nothing mutable and run fully in
/// parallel. Results are never cached: every lookup is a fresh network
/// round trip.
#[derive(Clone)]
pub struct WhoisClient {
    directory: Arc<ServerDirectory>,
    transport: Arc<dyn Transport>,
}

impl WhoisClient {
    /// Client with configuration from defaults and environment overrides.
    pub fn new() -> Result<Self, WhoisError> {
        Ok(Self::with_config(Config::load()?))
    }

    /// Client over an explicit configuration.
    pub fn with_config(config: Config) -> Self {
        Self {
            directory: Arc::new(ServerDirectory::bundled()),
            transport: Arc::new(TcpTransport::from_config(&config)),
        }
    }

    /// Replace the server directory (fixture tables in tests, or a
    /// caller-maintained table).
    pub fn with_directory(mut self, directory: ServerDirectory) -> Self {
        self.directory = Arc::new(directory);
        self
    }

    /// Replace the transport. The test seam: lets the pipeline run
    /// against canned responses without sockets.
    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = transport;
        self
    }

    /// Look up a domain or IP literal against its authoritative server.
    pub async fn lookup(&self, query: &str) -> Result<LookupResult, WhoisError> {
        let query = validate_query(query)?;
        let kind = QueryKind::of(&query);
        let server = self.directory.resolve(&query, kind)?;
        self.run(query, kind, server).await
    }

    /// Look up against an explicit server, bypassing directory
    /// resolution. Used to follow a `Registrar WHOIS Server:` referral
    /// to a thin registry, or to re-query the RIR named by IANA.
    pub async fn lookup_with_server(
        &self,
        query: &str,
        server: &str,
    ) -> Result<LookupResult, WhoisError> {
        let query = validate_query(query)?;
        let kind = QueryKind::of(&query);
        self.run(query, kind, server.to_string()).await
    }

    async fn run(
        &self,
        query: String,
        kind: QueryKind,
        server: String,
    ) -> Result<LookupResult, WhoisError> {
        let start = Instant::now();
        let query_line = query::format_query(&query, &server);
        debug!("Querying {} with {:?}", server, query_line.trim_end());

        let raw = self.transport.exchange(&server, &query_line).await?;
        let normalized = normalize::normalize(&raw);

        let tld_hint = match kind {
            QueryKind::Domain => query.rsplit('.').next(),
            QueryKind::Ip => None,
        };
        let outcome = extract::extract(&normalized, tld_hint);

        let query_time_ms = start.elapsed().as_millis() as u64;
        info!(
            "Lookup for {} via {} finished in {}ms",
            query, server, query_time_ms
        );

        Ok(LookupResult {
            query,
            server,
            query_time_ms,
            outcome,
        })
    }
}

/// Defensive validation of a caller-supplied query. The front door is
/// expected to strip scheme/path decoration already; this only rejects
/// shapes that could never be a domain or IP literal.
fn validate_query(query: &str) -> Result<String, WhoisError> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return Err(WhoisError::InvalidQuery("empty query".to_string()));
    }
    if query.parse::<IpAddr>().is_ok() {
        return Ok(query);
    }
    if query.len() > 253
        || !query.contains('.')
        || query.contains("..")
        || query.starts_with('.')
        || query.ends_with('.')
        || query.contains(['/', ':', '?', '#', ' '])
    {
        return Err(WhoisError::InvalidQuery(query));
    }
    Ok(query)
}

/// Extract a referral server (`Registrar WHOIS Server:` / `refer:`)
/// from raw response text, for caller-driven follow-up via
/// [`WhoisClient::lookup_with_server`]. The core never auto-follows.
pub fn referral_server(raw_data: &str) -> Option<String> {
    for line in raw_data.lines() {
        let Some((key, value)) = line.trim().split_once(':') else {
            continue;
        };
        let key = key.trim().to_lowercase();
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        if (key.contains("whois") && key.contains("server")) || key == "refer" {
            let host = value
                .trim_start_matches("rwhois://")
                .trim_start_matches("whois://");
            return Some(host.to_string());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Canned-response transport recording every exchange.
    struct MockTransport {
        response: String,
        seen: Mutex<Vec<(String, String)>>,
    }

    impl MockTransport {
        fn new(response: &str) -> Arc<Self> {
            Arc::new(Self {
                response: response.to_string(),
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait::async_trait]
    impl Transport for MockTransport {
        async fn exchange(&self, server: &str, query_line: &str) -> Result<String, WhoisError> {
            self.seen
                .lock()
                .unwrap()
                .push((server.to_string(), query_line.to_string()));
            Ok(self.response.clone())
        }
    }

    fn client_with(mock: Arc<MockTransport>) -> WhoisClient {
        WhoisClient::with_config(Config::default()).with_transport(mock)
    }

    #[tokio::test]
    async fn full_pipeline_for_gtld_domain() {
        let mock = MockTransport::new(
            "Domain Name: EXAMPLE.COM\r\n\
             Registrar: Example Registrar, LLC\r\n\
             Creation Date: 1995-08-14T04:00:00Z\r\n\
             Name Server: A.IANA-SERVERS.NET\r\n\
             Name Server: B.IANA-SERVERS.NET\r\n",
        );
        let client = client_with(mock.clone());

        let result = client.lookup("EXAMPLE.com").await.unwrap();
        assert_eq!(result.server, "whois.verisign-grs.com");

        // Verisign hosts take the thick-registry query syntax.
        let seen = mock.seen.lock().unwrap();
        assert_eq!(
            seen.as_slice(),
            &[(
                "whois.verisign-grs.com".to_string(),
                "domain example.com\r\n".to_string()
            )]
        );

        match result.outcome {
            ExtractionOutcome::Structured { record, .. } => {
                assert_eq!(record.domain_name.as_deref(), Some("EXAMPLE.COM"));
                assert_eq!(
                    record.creation_date.as_deref(),
                    Some("1995-08-14T04:00:00.000Z")
                );
                assert_eq!(
                    record.name_servers,
                    vec!["a.iana-servers.net", "b.iana-servers.net"]
                );
            }
            other => panic!("expected structured outcome, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn ip_queries_go_to_iana() {
        let mock = MockTransport::new(
            "refer:        whois.arin.net\n\norganisation: ARIN\n",
        );
        let client = client_with(mock.clone());

        let result = client.lookup("192.0.2.1").await.unwrap();
        assert_eq!(result.server, IANA_WHOIS_SERVER);
        assert_eq!(
            mock.seen.lock().unwrap()[0].1,
            "192.0.2.1\r\n".to_string()
        );

        // The referral line lets the caller re-query the RIR explicitly.
        assert_eq!(
            referral_server(result.outcome.raw_data()),
            Some("whois.arin.net".to_string())
        );
    }

    #[tokio::test]
    async fn invalid_queries_never_touch_the_network() {
        let mock = MockTransport::new("unused");
        let client = client_with(mock.clone());

        for query in ["", "invalid", "bad..dots", ".leading", "trailing.", "a b.com"] {
            let err = client.lookup(query).await.unwrap_err();
            assert!(matches!(err, WhoisError::InvalidQuery(_)), "query {query:?}");
        }

        let err = client.lookup("example.unknowntld").await.unwrap_err();
        assert!(matches!(err, WhoisError::UnsupportedTld(_)));

        assert!(mock.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn explicit_server_override_bypasses_directory() {
        let mock = MockTransport::new("Domain Name: example.unknowntld\n");
        let client = client_with(mock.clone());

        let result = client
            .lookup_with_server("example.unknowntld", "whois.example-registrar.test")
            .await
            .unwrap();
        assert_eq!(result.server, "whois.example-registrar.test");
        assert!(matches!(
            result.outcome,
            ExtractionOutcome::Structured { .. }
        ));
    }

    #[tokio::test]
    async fn not_found_is_a_successful_lookup() {
        let mock = MockTransport::new("No match for DOMAIN.TEST\r\n");
        let client = client_with(mock);

        let result = client.lookup("domain.test").await;
        // `.test` is not in the bundled table; use an override server.
        assert!(matches!(result, Err(WhoisError::UnsupportedTld(_))));

        let mock = MockTransport::new("No match for DOMAIN.TEST\r\n");
        let client = client_with(mock);
        let result = client
            .lookup_with_server("domain.test", "whois.fixture.test")
            .await
            .unwrap();
        assert!(matches!(result.outcome, ExtractionOutcome::NotFound { .. }));
    }

    #[test]
    fn referral_extraction() {
        let text = "Domain Name: EXAMPLE.COM\n\
            Registrar WHOIS Server: whois.example-registrar.com\n";
        assert_eq!(
            referral_server(text),
            Some("whois.example-registrar.com".to_string())
        );
        assert_eq!(referral_server("Domain Name: EXAMPLE.COM\n"), None);
    }

    #[tokio::test]
    async fn serialized_output_contract() {
        let mock = MockTransport::new("Registrar: Example Registrar, LLC\n");
        let client = client_with(mock);
        let result = client.lookup("example.org").await.unwrap();

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["server"], "whois.pir.org");
        assert_eq!(json["outcome"]["outcome"], "structured");
        assert_eq!(
            json["outcome"]["record"]["registrar"],
            "Example Registrar, LLC"
        );
        assert_eq!(
            json["outcome"]["rawData"],
            "Registrar: Example Registrar, LLC\n"
        );
    }
}
