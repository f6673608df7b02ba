//! ScyllaDB connection management.

use scylla::Session;
use scylla::execution_profile::ExecutionProfile;
use scylla::load_balancing::DefaultPolicy;
use scylla::transport::Compression;
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::ScyllaConfig;
use crate::error::ScyllaResult;

/// A shared ScyllaDB session.
///
/// Cloning is cheap; clones share the session.
#[derive(Clone)]
pub struct ScyllaConnection {
    session: Arc<Session>,
    config: Arc<ScyllaConfig>,
}

impl ScyllaConnection {
    pub(crate) fn new(session: Session, config: ScyllaConfig) -> Self {
        Self {
            session: Arc::new(session),
            config: Arc::new(config),
        }
    }

    /// Get a reference to the underlying session.
    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Get a reference to the configuration.
    #[must_use]
    pub fn config(&self) -> &ScyllaConfig {
        &self.config
    }

    /// Execute one CQL statement without bind values.
    pub async fn execute(&self, cql: &str) -> ScyllaResult<scylla::QueryResult> {
        debug!(cql = %cql, "Executing statement");
        Ok(self.session.query_unpaged(cql, &[]).await?)
    }

    /// Execute one CQL statement with a single text bind value.
    pub async fn execute_with_name(
        &self,
        cql: &str,
        name: &str,
    ) -> ScyllaResult<scylla::QueryResult> {
        debug!(cql = %cql, name = %name, "Executing statement");
        Ok(self.session.query_unpaged(cql, (name,)).await?)
    }
}

impl std::fmt::Debug for ScyllaConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScyllaConnection")
            .field("keyspace", &self.config.default_keyspace())
            .field("nodes", &self.config.known_nodes())
            .finish_non_exhaustive()
    }
}

/// Connect to a ScyllaDB cluster.
pub async fn connect(config: ScyllaConfig) -> ScyllaResult<ScyllaConnection> {
    use scylla::SessionBuilder;

    let mut builder = SessionBuilder::new()
        .known_nodes(config.known_nodes())
        .connection_timeout(config.connection_timeout());

    if let Some(keyspace) = config.default_keyspace() {
        builder = builder.use_keyspace(keyspace, true);
    }

    if let (Some(username), Some(password)) = (config.username(), config.password()) {
        builder = builder.user(username, password);
    }

    let mut profile = ExecutionProfile::builder().consistency(config.consistency().to_driver());
    if let Some(dc) = config.local_datacenter() {
        profile = profile.load_balancing_policy(
            DefaultPolicy::builder()
                .prefer_datacenter(dc.to_string())
                .build(),
        );
    }
    builder = builder.default_execution_profile_handle(profile.build().into_handle());

    if let Some(compression) = config.compression() {
        let compression = match compression.to_lowercase().as_str() {
            "lz4" => Some(Compression::Lz4),
            "snappy" => Some(Compression::Snappy),
            _ => None,
        };
        builder = builder.compression(compression);
    }

    let session = builder.build().await?;
    info!(
        nodes = ?config.known_nodes(),
        keyspace = ?config.default_keyspace(),
        "Connected to ScyllaDB"
    );

    Ok(ScyllaConnection::new(session, config))
}
