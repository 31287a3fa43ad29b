//! Broker publishing.

use lapin::options::{BasicPublishOptions, ConfirmSelectOptions, ExchangeDeclareOptions};
use lapin::publisher_confirm::Confirmation;
use lapin::types::FieldTable;
use lapin::{BasicProperties, Channel, Connection, ExchangeKind};

use asterbunny_common::connect;

use crate::error::{BridgeError, Result};
use crate::{AmqpConfig, OutboundMessage};

/// AMQP reply code for a normal close.
const REPLY_SUCCESS: u16 = 200;

/// Destination for translated events.
#[allow(async_fn_in_trait)]
pub trait BrokerPublisher {
    /// Name of the exchange messages are published to.
    fn exchange(&self) -> &str;

    /// Connect and declare the exchange.
    async fn open(&mut self) -> Result<()>;

    /// Publish one message to the exchange.
    async fn publish(&mut self, message: &OutboundMessage) -> Result<()>;

    /// Close the channel, then the connection. Calling it again is a no-op.
    async fn close(&mut self) -> Result<()>;
}

/// Publisher for a durable fanout exchange on an AMQP broker.
pub struct AmqpPublisher {
    config: AmqpConfig,
    connection: Option<Connection>,
    channel: Option<Channel>,
}

impl AmqpPublisher {
    /// Create an unconnected publisher.
    pub fn new(config: AmqpConfig) -> Self {
        Self {
            config,
            connection: None,
            channel: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.channel.is_some()
    }

    fn properties(message: &OutboundMessage) -> BasicProperties {
        BasicProperties::default()
            .with_content_type(message.content_type.into())
            .with_timestamp(message.timestamp)
            .with_delivery_mode(message.delivery_mode())
    }
}

impl BrokerPublisher for AmqpPublisher {
    fn exchange(&self) -> &str {
        &self.config.exchange
    }

    async fn open(&mut self) -> Result<()> {
        let endpoint = self.config.endpoint();

        let connection = connect(&self.config)
            .await
            .map_err(|e| BridgeError::connection(&endpoint, e))?;

        let channel = connection
            .create_channel()
            .await
            .map_err(|e| BridgeError::connection(&endpoint, e))?;

        channel
            .confirm_select(ConfirmSelectOptions::default())
            .await
            .map_err(|e| BridgeError::connection(&endpoint, e))?;

        channel
            .exchange_declare(
                &self.config.exchange,
                ExchangeKind::Fanout,
                ExchangeDeclareOptions {
                    durable: true,
                    ..Default::default()
                },
                FieldTable::default(),
            )
            .await
            .map_err(|e| BridgeError::connection(&endpoint, e))?;

        tracing::info!(exchange = %self.config.exchange, "Fanout exchange declared");

        self.connection = Some(connection);
        self.channel = Some(channel);
        Ok(())
    }

    async fn publish(&mut self, message: &OutboundMessage) -> Result<()> {
        let exchange = &self.config.exchange;
        let channel = self
            .channel
            .as_ref()
            .ok_or_else(|| BridgeError::publish(exchange, "channel is not open"))?;

        let confirmation = channel
            .basic_publish(
                exchange,
                "",
                BasicPublishOptions::default(),
                &message.body,
                Self::properties(message),
            )
            .await
            .map_err(|e| BridgeError::publish(exchange, e))?
            .await
            .map_err(|e| BridgeError::publish(exchange, e))?;

        if let Confirmation::Nack(_) = confirmation {
            return Err(BridgeError::publish(exchange, "message was nacked"));
        }

        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        let mut first_error = None;

        if let Some(channel) = self.channel.take() {
            if let Err(e) = channel.close(REPLY_SUCCESS, "Bye").await {
                tracing::warn!(error = %e, "Error closing AMQP channel");
                first_error.get_or_insert(BridgeError::with_context("Closing AMQP channel", e));
            }
        }

        if let Some(connection) = self.connection.take() {
            if let Err(e) = connection.close(REPLY_SUCCESS, "Bye").await {
                tracing::warn!(error = %e, "Error closing AMQP connection");
                first_error
                    .get_or_insert(BridgeError::with_context("Closing AMQP connection", e));
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
