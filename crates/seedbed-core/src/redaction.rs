use serde::{Deserialize, Serialize};

/// Connection target as recorded in run artifacts, with secrets masked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedactedConnection {
    pub engine: Option<String>,
    pub user: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub database: Option<String>,
    /// The input URL with the password and sensitive query values replaced by `***`.
    pub redacted: String,
}

const MASK: &str = "***";

/// Mask the password and sensitive query parameters of a connection URL.
///
/// Strings without a `scheme://` prefix are returned with only their query
/// parameters masked.
pub fn redact_connection_string(conn: &str) -> RedactedConnection {
    let (base, query) = match conn.split_once('?') {
        Some((base, query)) => (base, Some(query)),
        None => (conn, None),
    };

    let mut out = RedactedConnection {
        engine: None,
        user: None,
        host: None,
        port: None,
        database: None,
        redacted: String::new(),
    };

    let masked_base = match base.split_once("://") {
        Some((scheme, rest)) => {
            out.engine = Some(scheme.to_string());
            // Userinfo ends at the last '@'; passwords may contain '/'.
            let (credentials, host_and_path) = match rest.rsplit_once('@') {
                Some((credentials, host_and_path)) if is_userinfo(credentials) => {
                    (Some(credentials), host_and_path)
                }
                _ => (None, rest),
            };
            let (host_port, path) = host_and_path.split_once('/').unwrap_or((host_and_path, ""));
            if !path.is_empty() {
                out.database = Some(path.to_string());
            }

            match host_port.rsplit_once(':') {
                Some((host, port))
                    if !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()) =>
                {
                    out.host = Some(host.to_string()).filter(|h| !h.is_empty());
                    out.port = port.parse().ok();
                }
                _ => out.host = Some(host_port.to_string()).filter(|h| !h.is_empty()),
            }

            let credentials = credentials.map(|credentials| match credentials.split_once(':') {
                Some((user, _)) => {
                    out.user = Some(user.to_string());
                    format!("{user}:{MASK}@")
                }
                None => {
                    out.user = Some(credentials.to_string());
                    format!("{credentials}@")
                }
            });

            let mut masked = format!("{scheme}://{}{host_port}", credentials.unwrap_or_default());
            if host_and_path.contains('/') {
                masked.push('/');
                masked.push_str(path);
            }
            masked
        }
        None => base.to_string(),
    };

    out.redacted = match query {
        Some(query) => format!("{masked_base}?{}", redact_query(query)),
        None => masked_base,
    };
    out
}

/// A user name never contains '/', so an '@' after a path segment is not userinfo.
fn is_userinfo(candidate: &str) -> bool {
    let user = candidate.split_once(':').map_or(candidate, |(user, _)| user);
    !user.contains('/')
}

fn redact_query(query: &str) -> String {
    query
        .split('&')
        .map(|pair| match pair.split_once('=') {
            Some((key, _)) if is_sensitive_key(key) => format!("{key}={MASK}"),
            _ => pair.to_string(),
        })
        .collect::<Vec<_>>()
        .join("&")
}

fn is_sensitive_key(key: &str) -> bool {
    matches!(
        key.to_ascii_lowercase().as_str(),
        "password" | "pass" | "token" | "sslpassword"
    )
}
