//! Construction of the protocol request line, including per-registry
//! query-string quirks.

/// How a registry wants its query line decorated.
#[derive(Debug, Clone, Copy)]
enum Rewrite {
    /// Prepend a keyword, e.g. `domain example.com`.
    Prefix(&'static str),
    /// Append a flag, e.g. `example.jp/e`.
    Suffix(&'static str),
}

/// Registry-specific rewrites, matched by suffix on the server hostname.
/// Suffix matching keeps `ccwhois.`/`tvwhois.`/`jobswhois.` Verisign
/// hosts on one rule. First matching rule wins.
const FORMAT_RULES: &[(&str, Rewrite)] = &[
    // Verisign thick-registry syntax; a bare name would trigger a fuzzy
    // "similar domains" search instead of an exact match.
    ("verisign-grs.com", Rewrite::Prefix("domain ")),
    // JPRS: the /e flag requests English output.
    ("whois.jprs.jp", Rewrite::Suffix("/e")),
    // DENIC requires an explicit object-type flag for domain queries.
    ("whois.denic.de", Rewrite::Prefix("-T dn ")),
];

/// Build the RFC 3912 request line for a query against a given server,
/// CRLF-terminated.
pub fn format_query(query: &str, server: &str) -> String {
    for (suffix, rewrite) in FORMAT_RULES {
        if server.ends_with(suffix) {
            return match rewrite {
                Rewrite::Prefix(prefix) => format!("{prefix}{query}\r\n"),
                Rewrite::Suffix(flag) => format!("{query}{flag}\r\n"),
            };
        }
    }
    format!("{query}\r\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_bare_query_line() {
        assert_eq!(format_query("example.org", "whois.pir.org"), "example.org\r\n");
    }

    #[test]
    fn verisign_hosts_get_domain_prefix() {
        assert_eq!(
            format_query("example.com", "whois.verisign-grs.com"),
            "domain example.com\r\n"
        );
        assert_eq!(
            format_query("example.tv", "tvwhois.verisign-grs.com"),
            "domain example.tv\r\n"
        );
    }

    #[test]
    fn jprs_gets_english_flag() {
        assert_eq!(
            format_query("example.jp", "whois.jprs.jp"),
            "example.jp/e\r\n"
        );
    }

    #[test]
    fn denic_gets_type_flag() {
        assert_eq!(
            format_query("example.de", "whois.denic.de"),
            "-T dn example.de\r\n"
        );
    }
}
