//! API key resolution.
//!
//! An explicit key always wins. Otherwise the configured variable is looked
//! up in each `Scope` in order and the first non-blank value is used. Nothing
//! is cached: the environment is consulted on every call.

use crate::error::{GeocodeError, Result};

/// Name of the explicit-key override, as reported in error messages.
pub const API_KEY_PARAMETER: &str = "api_key";

/// Default environment variable holding the API key.
pub const DEFAULT_API_KEY_ENV: &str = "OPENCAGE_API_KEY";

/// Lookup scopes, in resolution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Process,
    User,
    Machine,
}

impl Scope {
    pub const ORDER: [Scope; 3] = [Scope::Process, Scope::User, Scope::Machine];
}

/// Named-scope key/value lookup.
pub trait Environment {
    fn lookup(&self, scope: Scope, name: &str) -> Option<String>;
}

/// Reads the real process environment.
///
/// Only `Scope::Process` is backed by anything: user- and machine-level
/// variables are already folded into the process environment by the login
/// shell or service manager on the platforms this crate targets.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemEnvironment;

impl Environment for SystemEnvironment {
    fn lookup(&self, scope: Scope, name: &str) -> Option<String> {
        match scope {
            Scope::Process => std::env::var(name).ok(),
            Scope::User | Scope::Machine => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CredentialResolver<E = SystemEnvironment> {
    env: E,
    variable: String,
}

impl CredentialResolver<SystemEnvironment> {
    pub fn from_env(variable: &str) -> Self {
        Self::new(SystemEnvironment, variable)
    }
}

impl<E: Environment> CredentialResolver<E> {
    pub fn new(env: E, variable: &str) -> Self {
        Self {
            env,
            variable: variable.to_string(),
        }
    }

    pub fn variable(&self) -> &str {
        &self.variable
    }

    pub fn resolve(&self, explicit: Option<&str>) -> Result<String> {
        if let Some(key) = non_blank(explicit) {
            return Ok(key.to_string());
        }
        for scope in Scope::ORDER {
            if let Some(value) = self.env.lookup(scope, &self.variable) {
                if let Some(key) = non_blank(Some(&value)) {
                    tracing::debug!(?scope, variable = %self.variable, "API key resolved from environment");
                    return Ok(key.to_string());
                }
            }
        }
        Err(GeocodeError::MissingCredential {
            env_var: self.variable.clone(),
            parameter: API_KEY_PARAMETER,
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
