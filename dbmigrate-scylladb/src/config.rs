//! ScyllaDB configuration module.
//!
//! One [`ScyllaConfig`] describes one session. Reader and writer sessions of a
//! [`ScyllaMigrationStore`](crate::ScyllaMigrationStore) may use different
//! configurations (nodes, datacenter, consistency).

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{ScyllaError, ScyllaResult};

/// Default CQL native protocol port.
pub const DEFAULT_PORT: u16 = 9042;

/// Configuration for ScyllaDB connections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScyllaConfig {
    /// Known nodes in the cluster (host:port format).
    known_nodes: Vec<String>,

    /// Keyspace the session uses.
    default_keyspace: Option<String>,

    /// Username for authentication.
    username: Option<String>,

    /// Password for authentication.
    password: Option<String>,

    /// Connection timeout in seconds.
    connection_timeout_secs: u64,

    /// Datacenter preferred by the load balancer.
    local_datacenter: Option<String>,

    /// Compression algorithm (lz4, snappy, or none).
    compression: Option<String>,

    /// Consistency level for every statement of the session.
    consistency: ConsistencyLevel,
}

/// CQL consistency levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConsistencyLevel {
    /// Any node.
    Any,
    /// Single node.
    One,
    /// Two nodes.
    Two,
    /// Three nodes.
    Three,
    /// Quorum of nodes.
    #[default]
    Quorum,
    /// All nodes.
    All,
    /// Local quorum.
    LocalQuorum,
    /// Each quorum.
    EachQuorum,
    /// Local one.
    LocalOne,
}

impl ConsistencyLevel {
    /// Parse a consistency name such as `LOCAL_QUORUM` (case-insensitive).
    pub fn parse(value: &str) -> ScyllaResult<Self> {
        Ok(match value.to_uppercase().as_str() {
            "ANY" => Self::Any,
            "ONE" => Self::One,
            "TWO" => Self::Two,
            "THREE" => Self::Three,
            "QUORUM" => Self::Quorum,
            "ALL" => Self::All,
            "LOCAL_QUORUM" => Self::LocalQuorum,
            "EACH_QUORUM" => Self::EachQuorum,
            "LOCAL_ONE" => Self::LocalOne,
            other => {
                return Err(ScyllaError::config(format!(
                    "unknown consistency level '{other}'"
                )));
            }
        })
    }

    /// Convert to the driver's consistency type.
    #[must_use]
    pub fn to_driver(self) -> scylla::statement::Consistency {
        use scylla::statement::Consistency;

        match self {
            Self::Any => Consistency::Any,
            Self::One => Consistency::One,
            Self::Two => Consistency::Two,
            Self::Three => Consistency::Three,
            Self::Quorum => Consistency::Quorum,
            Self::All => Consistency::All,
            Self::LocalQuorum => Consistency::LocalQuorum,
            Self::EachQuorum => Consistency::EachQuorum,
            Self::LocalOne => Consistency::LocalOne,
        }
    }
}

impl ScyllaConfig {
    /// Create a new configuration builder.
    #[must_use]
    pub fn builder() -> ScyllaConfigBuilder {
        ScyllaConfigBuilder::default()
    }

    /// Parse configuration from a URL.
    ///
    /// URL format: `scylla://[user:pass@]host1[:port1][,host2[:port2],...][/keyspace][?options]`
    /// (`cassandra://` is accepted too). Options: `dc`/`datacenter`,
    /// `consistency`, `compression`, `timeout` (connection timeout, seconds).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use dbmigrate_scylladb::ScyllaConfig;
    ///
    /// let config = ScyllaConfig::from_url("scylla://node1,node2:9043/app?dc=eu-west").unwrap();
    /// assert_eq!(config.known_nodes(), &["node1:9042", "node2:9043"]);
    /// assert_eq!(config.default_keyspace(), Some("app"));
    /// ```
    pub fn from_url(url: &str) -> ScyllaResult<Self> {
        let url = url.trim();

        let rest = url
            .strip_prefix("scylla://")
            .or_else(|| url.strip_prefix("cassandra://"))
            .ok_or_else(|| {
                ScyllaError::config("URL must start with scylla:// or cassandra://")
            })?;

        let (rest, query) = match rest.split_once('?') {
            Some((rest, query)) => (rest, Some(query)),
            None => (rest, None),
        };

        let mut builder = ScyllaConfigBuilder::default();

        let rest = match rest.rsplit_once('@') {
            Some((auth, hosts)) => {
                let (user, pass) = auth
                    .split_once(':')
                    .ok_or_else(|| ScyllaError::config("credentials must be user:password"))?;
                builder = builder.username(user).password(pass);
                hosts
            }
            None => rest,
        };

        let (hosts, keyspace) = match rest.split_once('/') {
            Some((hosts, keyspace)) if !keyspace.is_empty() => (hosts, Some(keyspace)),
            Some((hosts, _)) => (hosts, None),
            None => (rest, None),
        };

        let nodes: Vec<String> = hosts
            .split(',')
            .map(str::trim)
            .map(|s| {
                if s.is_empty() || s.contains(':') {
                    s.to_string()
                } else {
                    format!("{s}:{DEFAULT_PORT}")
                }
            })
            .collect();

        if nodes.iter().any(String::is_empty) {
            return Err(ScyllaError::config("At least one node must be specified"));
        }

        builder = builder.known_nodes(nodes);
        if let Some(keyspace) = keyspace {
            builder = builder.default_keyspace(keyspace);
        }

        for param in query.into_iter().flat_map(|q| q.split('&')) {
            let Some((key, value)) = param.split_once('=') else {
                continue;
            };
            builder = match key {
                "dc" | "datacenter" => builder.local_datacenter(value),
                "consistency" => builder.consistency(ConsistencyLevel::parse(value)?),
                "compression" => builder.compression(value),
                "timeout" => builder.connection_timeout_secs(value.parse().map_err(|_| {
                    ScyllaError::config(format!("invalid timeout '{value}'"))
                })?),
                _ => builder,
            };
        }

        Ok(builder.build())
    }

    /// Get known nodes.
    #[must_use]
    pub fn known_nodes(&self) -> &[String] {
        &self.known_nodes
    }

    /// Get default keyspace.
    #[must_use]
    pub fn default_keyspace(&self) -> Option<&str> {
        self.default_keyspace.as_deref()
    }

    /// Get username.
    #[must_use]
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    /// Get password.
    #[must_use]
    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    /// Get connection timeout.
    #[must_use]
    pub fn connection_timeout(&self) -> Duration {
        Duration::from_secs(self.connection_timeout_secs)
    }

    /// Get local datacenter.
    #[must_use]
    pub fn local_datacenter(&self) -> Option<&str> {
        self.local_datacenter.as_deref()
    }

    /// Get compression algorithm.
    #[must_use]
    pub fn compression(&self) -> Option<&str> {
        self.compression.as_deref()
    }

    /// Get consistency level.
    #[must_use]
    pub fn consistency(&self) -> ConsistencyLevel {
        self.consistency
    }
}

impl Default for ScyllaConfig {
    fn default() -> Self {
        ScyllaConfigBuilder::default().build()
    }
}

/// Builder for `ScyllaConfig`.
#[derive(Debug, Default)]
pub struct ScyllaConfigBuilder {
    known_nodes: Vec<String>,
    default_keyspace: Option<String>,
    username: Option<String>,
    password: Option<String>,
    connection_timeout_secs: u64,
    local_datacenter: Option<String>,
    compression: Option<String>,
    consistency: ConsistencyLevel,
}

impl ScyllaConfigBuilder {
    /// Set known nodes.
    #[must_use]
    pub fn known_nodes<I, S>(mut self, nodes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.known_nodes = nodes.into_iter().map(Into::into).collect();
        self
    }

    /// Set default keyspace.
    #[must_use]
    pub fn default_keyspace<S: Into<String>>(mut self, keyspace: S) -> Self {
        self.default_keyspace = Some(keyspace.into());
        self
    }

    /// Set username for authentication.
    #[must_use]
    pub fn username<S: Into<String>>(mut self, username: S) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Set password for authentication.
    #[must_use]
    pub fn password<S: Into<String>>(mut self, password: S) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Set connection timeout in seconds.
    #[must_use]
    pub fn connection_timeout_secs(mut self, secs: u64) -> Self {
        self.connection_timeout_secs = secs;
        self
    }

    /// Set local datacenter.
    #[must_use]
    pub fn local_datacenter<S: Into<String>>(mut self, dc: S) -> Self {
        self.local_datacenter = Some(dc.into());
        self
    }

    /// Set compression algorithm.
    #[must_use]
    pub fn compression<S: Into<String>>(mut self, compression: S) -> Self {
        self.compression = Some(compression.into());
        self
    }

    /// Set consistency level.
    #[must_use]
    pub fn consistency(mut self, consistency: ConsistencyLevel) -> Self {
        self.consistency = consistency;
        self
    }

    /// Build the configuration.
    #[must_use]
    pub fn build(self) -> ScyllaConfig {
        ScyllaConfig {
            known_nodes: if self.known_nodes.is_empty() {
                vec![format!("127.0.0.1:{DEFAULT_PORT}")]
            } else {
                self.known_nodes
            },
            default_keyspace: self.default_keyspace,
            username: self.username,
            password: self.password,
            connection_timeout_secs: if self.connection_timeout_secs == 0 {
                5
            } else {
                self.connection_timeout_secs
            },
            local_datacenter: self.local_datacenter,
            compression: self.compression,
            consistency: self.consistency,
        }
    }
}
