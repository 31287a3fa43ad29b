use lapin::uri::{AMQPAuthority, AMQPUri, AMQPUserInfo};
use lapin::{Connection, ConnectionProperties};

use crate::config::AmqpConfig;
use crate::error::{Error, Result};

/// Build the AMQP URI for a broker configuration.
///
/// Fields are set structurally so credentials and vhosts containing `/`
/// or `@` need no percent-encoding.
pub fn amqp_uri(config: &AmqpConfig) -> AMQPUri {
    AMQPUri {
        authority: AMQPAuthority {
            userinfo: AMQPUserInfo {
                username: config.username.clone(),
                password: config.password.clone(),
            },
            host: config.host.clone(),
            port: config.port,
        },
        vhost: config.vhost.clone(),
        ..Default::default()
    }
}

/// Connect to the AMQP broker using the provided configuration.
pub async fn connect(config: &AmqpConfig) -> Result<Connection> {
    if config.host.is_empty() {
        return Err(Error::Config("AMQP host must not be empty".to_string()));
    }

    tracing::info!(endpoint = %config.endpoint(), "Connecting to AMQP broker");

    let connection = tokio::time::timeout(
        config.connect_timeout(),
        Connection::connect_uri(amqp_uri(config), ConnectionProperties::default()),
    )
    .await
    .map_err(|_| Error::AmqpTimeout(config.connect_timeout_ms))??;

    tracing::info!(endpoint = %config.endpoint(), "Connected to AMQP broker");

    Ok(connection)
}
