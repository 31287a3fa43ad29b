//! Integration tests for asterbunny-common library.

use asterbunny_common::{
    AmqpConfig, Format, HeartbeatConfig, ManagerMessage, NotifyConfig, OutboundMessage, decode,
    parse_config,
};
use indexmap::IndexMap;
use serde::Deserialize;

#[test]
fn test_event_to_outbound_workflow() {
    // Build an event the way the manager connection decodes it
    let event: ManagerMessage = vec![
        ("Event".to_string(), "Newstate".to_string()),
        ("Privilege".to_string(), "call,all".to_string()),
        ("Channel".to_string(), "SIP/101-00000002".to_string()),
        ("ChannelStateDesc".to_string(), "Ringing".to_string()),
    ]
    .into_iter()
    .collect();

    let message = OutboundMessage::from_message(&event, Format::Json).expect("translate failed");

    assert_eq!(message.content_type, "application/json");
    assert_eq!(message.delivery_mode(), 2);

    // Subscribers see the same mapping, in frame order
    let decoded: IndexMap<String, String> =
        decode(&message.body, Format::Json).expect("decode failed");
    let keys: Vec<_> = decoded.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["event", "privilege", "channel", "channelstatedesc"]);
    assert_eq!(decoded.get("channelstatedesc").map(String::as_str), Some("Ringing"));
}

#[test]
fn test_sequence_translates_one_to_one() {
    let events: Vec<ManagerMessage> = (0..5)
        .map(|i| {
            ManagerMessage::new()
                .with("Event", "UserEvent")
                .with("Sequence", &i.to_string())
        })
        .collect();

    let messages: Vec<OutboundMessage> = events
        .iter()
        .map(|e| OutboundMessage::from_message(e, Format::Json).unwrap())
        .collect();

    assert_eq!(messages.len(), events.len());
    for (event, message) in events.iter().zip(&messages) {
        let decoded: ManagerMessage = decode(&message.body, Format::Json).unwrap();
        assert_eq!(&decoded, event);
    }
}

#[test]
fn test_full_config_sections() {
    #[derive(Debug, Deserialize)]
    struct Sections {
        amqp: AmqpConfig,
        notify: NotifyConfig,
        heartbeat: HeartbeatConfig,
    }

    let json5 = r#"
    {
        // broker
        amqp: { host: "mq", exchange: "pbx" },
        notify: {
            recipients: ["bridge@example.com", "ops@example.com"],
            smtp_host: "mail.example.com",
        },
        heartbeat: { idle_ticks: 500 },
    }
    "#;

    let sections: Sections = parse_config(json5).unwrap();

    assert_eq!(sections.amqp.host, "mq");
    assert_eq!(sections.amqp.port, 5672);
    assert_eq!(sections.notify.destinations(), &["ops@example.com".to_string()]);
    assert_eq!(sections.notify.smtp_port, 25);
    assert_eq!(sections.heartbeat.idle_ticks, 500);
    assert_eq!(sections.heartbeat.tick_ms, 1);
}
