// Session authentication
//
// rpcd issues an opaque session id from `session.login`; every later request
// carries it as the first positional parameter. Until a login succeeds the
// client sends the all-zero id, which rpcd treats as the anonymous session.

use std::collections::BTreeMap;
use std::fmt;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::client::{Client, decode_payload};
use crate::envelope::to_args;
use crate::error::Error;

/// Session id meaning "no session".
pub const EMPTY_SESSION: &str = "00000000000000000000000000000000";

const SESSION_OBJECT: &str = "session";

/// Access-control lists granted to a session, keyed by scope.
///
/// Each map goes from an object (or group/config) name to the ordered list
/// of permitted methods or permissions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Acls {
    #[serde(default, rename = "access-group")]
    pub access_group: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub ubus: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub uci: BTreeMap<String, Vec<String>>,
}

impl Acls {
    /// Whether the `ubus` scope grants `method` on `object`.
    ///
    /// rpcd patterns may end in `*` to match any suffix; a method list
    /// containing `*` grants every method.
    pub fn allows(&self, object: &str, method: &str) -> bool {
        self.ubus.iter().any(|(pattern, methods)| {
            glob_match(pattern, object) && methods.iter().any(|m| glob_match(m, method))
        })
    }
}

fn glob_match(pattern: &str, name: &str) -> bool {
    match pattern.strip_suffix('*') {
        Some(prefix) => name.starts_with(prefix),
        None => pattern == name,
    }
}

/// Data returned by `session.login`.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    #[serde(rename = "ubus_rpc_session")]
    token: String,
    /// Idle timeout in seconds.
    #[serde(default)]
    pub timeout: u64,
    /// Seconds until expiry at the time of login.
    #[serde(default)]
    pub expires: u64,
    #[serde(default)]
    pub acls: Acls,
    #[serde(default)]
    pub data: serde_json::Map<String, serde_json::Value>,
}

impl Session {
    /// The session id sent as the first positional parameter.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Whether this holds a real session id rather than [`EMPTY_SESSION`].
    pub fn is_authenticated(&self) -> bool {
        self.token != EMPTY_SESSION
    }
}

impl Default for Session {
    fn default() -> Self {
        Self {
            token: EMPTY_SESSION.to_owned(),
            timeout: 0,
            expires: 0,
            acls: Acls::default(),
            data: serde_json::Map::new(),
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = if self.is_authenticated() {
            "[REDACTED]"
        } else {
            EMPTY_SESSION
        };
        f.debug_struct("Session")
            .field("token", &token)
            .field("timeout", &self.timeout)
            .field("expires", &self.expires)
            .field("acls", &self.acls)
            .field("data", &self.data)
            .finish()
    }
}

impl Client {
    /// The current session; [`EMPTY_SESSION`] until a login succeeds.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Authenticate against `session.login`.
    ///
    /// The previous session is discarded before the call is made, so a
    /// failed login leaves the client unauthenticated. On success the whole
    /// session (token, timeouts, ACLs) is replaced by the router's answer.
    pub async fn login(
        &mut self,
        username: &str,
        password: &SecretString,
    ) -> Result<&Session, Error> {
        self.session = Session::default();

        let args = to_args(&json!({
            "username": username,
            "password": password.expose_secret(),
        }))?;

        debug!(username, "logging in");
        let payload = self.call(SESSION_OBJECT, "login", &args).await?;
        self.session = decode_payload(SESSION_OBJECT, "login", &payload)?;

        debug!(expires = self.session.expires, "login successful");
        Ok(&self.session)
    }

    /// Fail with [`Error::NotLoggedIn`] unless a login has succeeded.
    ///
    /// Purely local: says nothing about whether the router still honours
    /// the session. Expiry surfaces later as [`Error::PermissionDenied`].
    pub fn require_login(&self) -> Result<(), Error> {
        if self.session.is_authenticated() {
            Ok(())
        } else {
            Err(Error::NotLoggedIn)
        }
    }

    /// End the current session via `session.destroy`.
    ///
    /// The local session is cleared once the router has answered, including
    /// when it reports the session as already gone. Transport and decode
    /// failures leave the session untouched.
    pub async fn logout(&mut self) -> Result<(), Error> {
        self.require_login()?;

        let args = to_args(&json!({ "ubus_rpc_session": self.session.token() }))?;
        let result = self.call(SESSION_OBJECT, "destroy", &args).await;

        match result {
            Ok(_) => {}
            Err(e) if e.status().is_some() => {
                debug!(error = %e, "session already invalid on the router");
            }
            Err(e) => return Err(e),
        }

        self.session = Session::default();
        debug!("logout complete");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn session_with_acls(ubus: serde_json::Value) -> Session {
        serde_json::from_value(json!({
            "ubus_rpc_session": "abc123",
            "timeout": 300,
            "expires": 299,
            "acls": { "ubus": ubus },
            "data": { "username": "root" }
        }))
        .unwrap()
    }

    #[test]
    fn default_session_is_anonymous() {
        let session = Session::default();
        assert_eq!(session.token(), EMPTY_SESSION);
        assert!(!session.is_authenticated());
    }

    #[test]
    fn login_payload_decodes() {
        let session = session_with_acls(json!({ "file": ["read", "stat"] }));
        assert!(session.is_authenticated());
        assert_eq!(session.token(), "abc123");
        assert_eq!(session.timeout, 300);
        assert_eq!(session.acls.ubus["file"], vec!["read", "stat"]);
        assert_eq!(session.data["username"], "root");
    }

    #[test]
    fn access_group_key_is_hyphenated() {
        let session: Session = serde_json::from_value(json!({
            "ubus_rpc_session": "x",
            "acls": { "access-group": { "uci-access": ["read", "write"] } }
        }))
        .unwrap();
        assert_eq!(
            session.acls.access_group["uci-access"],
            vec!["read", "write"]
        );
    }

    #[test]
    fn acl_wildcards() {
        let session = session_with_acls(json!({
            "network.interface.*": ["status"],
            "uci": ["*"],
        }));
        assert!(session.acls.allows("network.interface.lan", "status"));
        assert!(!session.acls.allows("network.interface.lan", "up"));
        assert!(session.acls.allows("uci", "commit"));
        assert!(!session.acls.allows("file", "read"));
    }

    #[test]
    fn debug_redacts_token() {
        let session = session_with_acls(json!({}));
        let rendered = format!("{session:?}");
        assert!(!rendered.contains("abc123"));
        assert!(rendered.contains("[REDACTED]"));
    }

    #[test]
    fn require_login_is_local() {
        let mut client =
            Client::new("http://127.0.0.1:9/ubus", &crate::TransportConfig::default()).unwrap();
        assert!(matches!(client.require_login(), Err(Error::NotLoggedIn)));

        client.session = session_with_acls(json!({}));
        assert!(client.require_login().is_ok());
        assert_eq!(client.request_id(), 1);
    }
}
