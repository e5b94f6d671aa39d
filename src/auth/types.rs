//! Auth configuration types

use std::fmt;

/// Authentication configuration
#[derive(Clone, Default, PartialEq, Eq)]
pub enum AuthConfig {
    /// No authentication required
    #[default]
    None,

    /// HTTP Basic authentication
    Basic {
        /// Username (account SID or API key SID)
        username: String,
        /// Password (auth token or API key secret)
        password: String,
    },

    /// Bearer token authentication
    Bearer {
        /// The bearer token
        token: String,
    },
}

impl AuthConfig {
    /// Basic credentials from an account SID and auth token
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::Basic {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Bearer credentials
    pub fn bearer(token: impl Into<String>) -> Self {
        Self::Bearer {
            token: token.into(),
        }
    }

    /// Username for Basic auth, if any
    pub fn username(&self) -> Option<&str> {
        match self {
            Self::Basic { username, .. } => Some(username),
            _ => None,
        }
    }
}

// Secrets never reach log output.
impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"***")
                .finish(),
            Self::Bearer { .. } => f.debug_struct("Bearer").field("token", &"***").finish(),
        }
    }
}

#[cfg(test)]
mod type_tests {
    use super::*;

    #[test]
    fn test_auth_config_default() {
        let config = AuthConfig::default();
        assert!(matches!(config, AuthConfig::None));
    }

    #[test]
    fn test_auth_config_debug_redacts() {
        let config = AuthConfig::basic("ACxxx", "secret");
        let debug = format!("{config:?}");
        assert!(debug.contains("ACxxx"));
        assert!(!debug.contains("secret"));

        let debug = format!("{:?}", AuthConfig::bearer("abc123"));
        assert!(!debug.contains("abc123"));
    }

    #[test]
    fn test_username() {
        assert_eq!(AuthConfig::basic("ACxxx", "s").username(), Some("ACxxx"));
        assert_eq!(AuthConfig::None.username(), None);
    }
}
