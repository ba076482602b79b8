//! Server configuration and status types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Launch configuration for one registered tool server.
///
/// The server's name is the registry key and is not part of the record.
/// Optional fields are kept as provided so a config reads back exactly as it
/// was stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    /// Executable to launch.
    pub command: String,

    /// Arguments passed to the executable, in order.
    pub args: Vec<String>,

    /// Extra environment variables for the process.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env: Option<BTreeMap<String, String>>,

    /// Whether the server is administratively disabled. Absent means `false`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disabled: Option<bool>,

    /// Tool names a client may invoke without confirmation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_approve: Option<Vec<String>>,
}

impl ServerConfig {
    /// Create a config with a command and arguments and no optional fields.
    #[must_use]
    pub fn new(command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            command: command.into(),
            args,
            ..Self::default()
        }
    }

    /// Set the environment map.
    #[must_use]
    pub fn with_env(mut self, env: BTreeMap<String, String>) -> Self {
        self.env = Some(env);
        self
    }

    /// Set the disabled flag.
    #[must_use]
    pub const fn with_disabled(mut self, disabled: bool) -> Self {
        self.disabled = Some(disabled);
        self
    }

    /// Set the auto-approve tool list.
    #[must_use]
    pub fn with_auto_approve(mut self, tools: Vec<String>) -> Self {
        self.auto_approve = Some(tools);
        self
    }

    /// Effective disabled flag.
    pub fn is_disabled(&self) -> bool {
        self.disabled.unwrap_or(false)
    }

    /// Apply a partial update. Each field present in the patch overwrites the
    /// current value; absent fields are left alone.
    #[must_use]
    pub fn merged(mut self, patch: ServerConfigPatch) -> Self {
        if let Some(command) = patch.command {
            self.command = command;
        }
        if let Some(args) = patch.args {
            self.args = args;
        }
        if patch.env.is_some() {
            self.env = patch.env;
        }
        if patch.disabled.is_some() {
            self.disabled = patch.disabled;
        }
        if patch.auto_approve.is_some() {
            self.auto_approve = patch.auto_approve;
        }
        self
    }

    /// Check the fields that must be non-empty.
    pub fn validate(&self) -> Result<(), String> {
        if self.command.trim().is_empty() {
            return Err("command cannot be empty".to_string());
        }
        Ok(())
    }
}

/// Partial server configuration used by `update`.
///
/// The merge is shallow: a provided `env` replaces the whole map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ServerConfigPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_approve: Option<Vec<String>>,
}

impl ServerConfigPatch {
    /// True when the patch would change nothing.
    pub const fn is_empty(&self) -> bool {
        self.command.is_none()
            && self.args.is_none()
            && self.env.is_none()
            && self.disabled.is_none()
            && self.auto_approve.is_none()
    }
}

/// Observed run state of a registered server.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusKind {
    Running,
    #[default]
    Stopped,
    Error,
}

impl StatusKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Stopped => "stopped",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for StatusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatusKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "running" => Ok(Self::Running),
            "stopped" => Ok(Self::Stopped),
            "error" => Ok(Self::Error),
            other => Err(format!("unknown server status: {other}")),
        }
    }
}

/// Status report for one server name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerStatus {
    pub name: String,
    pub status: StatusKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<String>>,
}

impl ServerStatus {
    /// Status for a name with no record. Absence always reads as `error`.
    #[must_use]
    pub fn missing(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: StatusKind::Error,
            last_error: None,
            tools: Some(Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_config_json_shape() {
        let config = ServerConfig::new("docker", vec!["run".to_string()])
            .with_disabled(false)
            .with_auto_approve(vec!["git_diff_staged".to_string()]);

        let value = serde_json::to_value(&config).unwrap();
        assert_eq!(
            value,
            json!({
                "command": "docker",
                "args": ["run"],
                "disabled": false,
                "autoApprove": ["git_diff_staged"]
            })
        );
    }

    #[test]
    fn test_config_requires_command_and_args() {
        assert!(serde_json::from_value::<ServerConfig>(json!({ "args": [] })).is_err());
        assert!(serde_json::from_value::<ServerConfig>(json!({ "command": "x" })).is_err());
    }

    #[test]
    fn test_merge_overwrites_only_present_fields() {
        let mut env = BTreeMap::new();
        env.insert("A".to_string(), "1".to_string());
        let base = ServerConfig::new("x", vec!["--a".to_string()]).with_env(env.clone());

        let patch = ServerConfigPatch {
            args: Some(vec!["--b".to_string()]),
            disabled: Some(true),
            ..Default::default()
        };
        let merged = base.merged(patch);

        assert_eq!(merged.command, "x");
        assert_eq!(merged.args, vec!["--b".to_string()]);
        assert_eq!(merged.env, Some(env));
        assert!(merged.is_disabled());
    }

    #[test]
    fn test_patch_rejects_unknown_fields() {
        let typo = serde_json::from_value::<ServerConfigPatch>(json!({ "comand": "x" }));
        assert!(typo.is_err());

        let patch: ServerConfigPatch =
            serde_json::from_value(json!({ "autoApprove": ["a"] })).unwrap();
        assert_eq!(patch.auto_approve, Some(vec!["a".to_string()]));
    }

    #[test]
    fn test_validate_rejects_blank_command() {
        assert!(ServerConfig::new("  ", vec![]).validate().is_err());
        assert!(ServerConfig::new("node", vec![]).validate().is_ok());
    }

    #[test]
    fn test_status_kind_parse() {
        assert_eq!("running".parse::<StatusKind>(), Ok(StatusKind::Running));
        assert!("paused".parse::<StatusKind>().is_err());
        assert_eq!(StatusKind::Error.to_string(), "error");
    }

    #[test]
    fn test_missing_status_shape() {
        let value = serde_json::to_value(ServerStatus::missing("ghost")).unwrap();
        assert_eq!(value, json!({ "name": "ghost", "status": "error", "tools": [] }));
    }
}
