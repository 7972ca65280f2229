use std::process::Command;
use std::str::FromStr;

use tracing::debug;
use tracing::warn;

use crate::decode::decode_exec_credential;
use crate::ConfigError;
use crate::Exec;
use crate::TreeAdapter;
use crate::YamlTree;

/// Response printed by a credential plugin
#[derive(Debug, Clone, Eq, PartialEq, Default)]
pub struct ExecCredential {
    pub api_version: Option<String>,
    pub kind: Option<String>,
    pub status: Option<ExecCredentialStatus>,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum ExecCredentialStatus {
    Token {
        token: String,
    },
    ClientCert {
        client_certificate_data: Option<String>,
        client_key_data: Option<String>,
    },
}

impl ExecCredentialStatus {
    pub fn token(&self) -> Option<&str> {
        match self {
            Self::Token { token } => Some(token),
            Self::ClientCert { .. } => None,
        }
    }
}

impl ExecCredential {
    /// decode credential from plugin output; the last document that decodes wins
    pub fn from_str_with<A: TreeAdapter>(adapter: &A, input: &str) -> Result<Self, ConfigError> {
        let mut last_error = None;
        for document in adapter.parse_documents(input)?.iter().rev() {
            match decode_exec_credential(document) {
                Ok(credential) => return Ok(credential),
                Err(err) => {
                    warn!(%err, "skipping exec credential document");
                    last_error.get_or_insert(err);
                }
            }
        }
        match last_error {
            Some(err) => Err(err),
            None => Ok(Self::default()),
        }
    }
}

impl FromStr for ExecCredential {
    type Err = ConfigError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        Self::from_str_with(&YamlTree, input)
    }
}

pub fn parse_exec_credential(input: &str) -> Result<ExecCredential, ConfigError> {
    input.parse()
}

impl Exec {
    /// Run the credential plugin and decode what it prints.
    pub fn credential(&self) -> Result<ExecCredential, ConfigError> {
        let command = self
            .command
            .as_deref()
            .ok_or_else(|| ConfigError::Other("exec command is not set".to_owned()))?;

        debug!(command, args = ?self.args, "running credential plugin");
        let output = Command::new(command)
            .args(&self.args)
            .envs(self.envs.iter().map(|env| (&env.key, &env.value)))
            .output()?;

        if !output.status.success() {
            return Err(ConfigError::Other(format!(
                "credential plugin {} failed with {}: {}",
                command,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let stdout = String::from_utf8(output.stdout).map_err(|err| {
            ConfigError::Other(format!("credential plugin output is not utf-8: {}", err))
        })?;
        stdout.parse()
    }
}
