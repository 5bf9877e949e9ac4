use std::fmt;

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value, json};

use crate::error::HardkitError;

pub const SERVICES_KEY: &str = "unnecessary_services";
pub const SSH_HARDENING_KEY: &str = "ssh_hardening";
pub const FIREWALL_RULES_KEY: &str = "firewall_rules";

/// Verdict of a single firewall rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FirewallAction {
    Allow,
    Deny,
}

impl FirewallAction {
    pub fn as_str(self) -> &'static str {
        match self {
            FirewallAction::Allow => "allow",
            FirewallAction::Deny => "deny",
        }
    }
}

impl fmt::Display for FirewallAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of `firewall_rules`, applied in document order
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct FirewallRule {
    pub action: FirewallAction,
    pub port: String,
}

impl FirewallRule {
    pub fn new(action: FirewallAction, port: impl Into<String>) -> Self {
        Self {
            action,
            port: port.into(),
        }
    }
}

/// An sshd directive and the literal value it should be set to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SshDirective {
    pub name: String,
    pub value: String,
}

/// The hardening rules as stored on disk.
///
/// The parsed JSON object is kept as-is and each section is decoded only
/// when an action asks for it, so a document missing one key still serves
/// the actions that do not need that key.
#[derive(Debug, Clone, PartialEq)]
pub struct PolicyDocument {
    root: Map<String, Value>,
}

impl PolicyDocument {
    /// Wrap a parsed JSON value; returns `None` unless it is an object
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(root) => Some(Self { root }),
            _ => None,
        }
    }

    /// Built-in rules written on first run
    pub fn defaults() -> Self {
        let mut root = Map::new();
        root.insert(SERVICES_KEY.to_string(), json!(["ftp", "telnet", "samba"]));
        root.insert(
            SSH_HARDENING_KEY.to_string(),
            json!({
                "PermitRootLogin": "no",
                "PasswordAuthentication": "no"
            }),
        );
        root.insert(
            FIREWALL_RULES_KEY.to_string(),
            json!([
                {"action": "allow", "port": "22"},
                {"action": "deny", "port": "80"}
            ]),
        );
        Self { root }
    }

    pub fn as_value(&self) -> Value {
        Value::Object(self.root.clone())
    }

    /// Services to stop and disable, in order
    pub fn unnecessary_services(&self) -> Result<Vec<String>, HardkitError> {
        self.section(SERVICES_KEY)
    }

    /// sshd directive overrides, in document order
    pub fn ssh_hardening(&self) -> Result<Vec<SshDirective>, HardkitError> {
        let directives: Map<String, Value> = self.section(SSH_HARDENING_KEY)?;
        directives
            .into_iter()
            .map(|(name, value)| {
                let value = serde_json::from_value::<String>(value).map_err(|source| {
                    HardkitError::InvalidSection {
                        key: SSH_HARDENING_KEY,
                        source,
                    }
                })?;
                Ok(SshDirective { name, value })
            })
            .collect()
    }

    /// Firewall rules, in the order they must be applied
    pub fn firewall_rules(&self) -> Result<Vec<FirewallRule>, HardkitError> {
        self.section(FIREWALL_RULES_KEY)
    }

    fn section<T: DeserializeOwned>(&self, key: &'static str) -> Result<T, HardkitError> {
        let value = self
            .root
            .get(key)
            .cloned()
            .ok_or(HardkitError::MissingKey { key })?;
        serde_json::from_value(value).map_err(|source| HardkitError::InvalidSection { key, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn document(value: Value) -> PolicyDocument {
        PolicyDocument::from_value(value).unwrap()
    }

    #[test]
    fn defaults_contain_all_sections() {
        let policy = PolicyDocument::defaults();
        assert_eq!(
            policy.unnecessary_services().unwrap(),
            vec!["ftp", "telnet", "samba"]
        );
        assert_eq!(
            policy.firewall_rules().unwrap(),
            vec![
                FirewallRule::new(FirewallAction::Allow, "22"),
                FirewallRule::new(FirewallAction::Deny, "80"),
            ]
        );
        let directives = policy.ssh_hardening().unwrap();
        assert_eq!(directives.len(), 2);
        assert_eq!(directives[0].name, "PermitRootLogin");
        assert_eq!(directives[0].value, "no");
        assert_eq!(directives[1].name, "PasswordAuthentication");
    }

    #[test]
    fn rejects_non_object_documents() {
        assert!(PolicyDocument::from_value(json!(["ftp"])).is_none());
        assert!(PolicyDocument::from_value(json!("rules")).is_none());
    }

    #[test]
    fn missing_key_only_breaks_its_own_section() {
        let policy = document(json!({ "unnecessary_services": ["telnet"] }));
        assert_eq!(policy.unnecessary_services().unwrap(), vec!["telnet"]);

        let err = policy.firewall_rules().unwrap_err();
        assert!(matches!(
            err,
            HardkitError::MissingKey {
                key: FIREWALL_RULES_KEY
            }
        ));
        assert_eq!(err.kind(), ErrorKind::Config);
        assert!(policy.ssh_hardening().is_err());
    }

    #[test]
    fn rejects_unknown_firewall_action() {
        let policy = document(json!({
            "firewall_rules": [{"action": "reject", "port": "23"}]
        }));
        let err = policy.firewall_rules().unwrap_err();
        assert!(matches!(
            err,
            HardkitError::InvalidSection {
                key: FIREWALL_RULES_KEY,
                ..
            }
        ));
    }

    #[test]
    fn rejects_non_string_ssh_values() {
        let policy = document(json!({ "ssh_hardening": { "MaxAuthTries": 3 } }));
        assert!(policy.ssh_hardening().is_err());
    }

    #[test]
    fn ssh_directives_keep_document_order() {
        let policy: PolicyDocument = document(
            serde_json::from_str(
                r#"{"ssh_hardening": {"X11Forwarding": "no", "AllowTcpForwarding": "no", "MaxAuthTries": "3"}}"#,
            )
            .unwrap(),
        );
        let names: Vec<String> = policy
            .ssh_hardening()
            .unwrap()
            .into_iter()
            .map(|d| d.name)
            .collect();
        assert_eq!(names, vec!["X11Forwarding", "AllowTcpForwarding", "MaxAuthTries"]);
    }
}
