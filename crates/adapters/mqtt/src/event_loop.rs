//! Drives the rumqttc event loop and feeds inbound messages to the core.

use std::time::Duration;

use rumqttc::{AsyncClient, Event, EventLoop, Packet, QoS};

use lights_app::ports::BusListener;

const INITIAL_BACKOFF: Duration = Duration::from_secs(1);
const MAX_BACKOFF: Duration = Duration::from_secs(60);

/// Poll `eventloop` forever.
///
/// Every (re)connect resubscribes all topics reported by `listener`; each
/// inbound publish is handed to [`BusListener::on_message`]. Connection
/// errors are logged and retried with exponential backoff. Abort the task
/// running this future to stop it.
pub async fn run_event_loop<L: BusListener>(
    mut eventloop: EventLoop,
    client: AsyncClient,
    listener: L,
) {
    let mut backoff = INITIAL_BACKOFF;
    loop {
        match eventloop.poll().await {
            Ok(event) => {
                if handle_event(event, &client, &listener).await {
                    backoff = INITIAL_BACKOFF;
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, retry_in = ?backoff, "MQTT connection error");
                tokio::time::sleep(backoff).await;
                backoff = (backoff * 2).min(MAX_BACKOFF);
            }
        }
    }
}

/// Returns `true` when the event was a successful connect.
async fn handle_event<L: BusListener>(event: Event, client: &AsyncClient, listener: &L) -> bool {
    match event {
        Event::Incoming(Packet::ConnAck(_)) => {
            tracing::info!("connected to MQTT broker");
            resubscribe(client, listener).await;
            true
        }
        Event::Incoming(Packet::Publish(publish)) => {
            listener.on_message(&publish.topic, &publish.payload).await;
            false
        }
        _ => false,
    }
}

// Runs on the event loop task: a blocking subscribe would wait on the very
// loop that has to drain the request queue.
async fn resubscribe<L: BusListener>(client: &AsyncClient, listener: &L) {
    for topic in listener.topics().await {
        match client.try_subscribe(topic.as_str(), QoS::AtMostOnce) {
            Ok(()) => tracing::debug!(topic, "subscribed"),
            Err(err) => tracing::warn!(topic, error = %err, "failed to subscribe"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use rumqttc::{ConnAck, ConnectReturnCode, MqttOptions, Publish};

    use super::*;

    #[derive(Default)]
    struct RecordingListener {
        messages: Mutex<Vec<(String, Vec<u8>)>>,
        topic_queries: Mutex<usize>,
    }

    impl BusListener for RecordingListener {
        async fn on_message(&self, topic: &str, payload: &[u8]) {
            self.messages
                .lock()
                .unwrap()
                .push((topic.to_string(), payload.to_vec()));
        }

        async fn topics(&self) -> Vec<String> {
            *self.topic_queries.lock().unwrap() += 1;
            vec!["home/lamp".to_string(), "home/fan".to_string()]
        }
    }

    fn make_client() -> (AsyncClient, EventLoop) {
        AsyncClient::new(MqttOptions::new("test", "localhost", 1883), 10)
    }

    #[tokio::test]
    async fn should_forward_publish_to_listener() {
        let (client, _eventloop) = make_client();
        let listener = RecordingListener::default();
        let event = Event::Incoming(Packet::Publish(Publish::new(
            "home/lamp",
            QoS::AtMostOnce,
            "on",
        )));

        assert!(!handle_event(event, &client, &listener).await);
        assert_eq!(
            *listener.messages.lock().unwrap(),
            vec![("home/lamp".to_string(), b"on".to_vec())]
        );
        assert_eq!(*listener.topic_queries.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn should_resubscribe_on_connect() {
        let (client, _eventloop) = make_client();
        let listener = RecordingListener::default();
        let event = Event::Incoming(Packet::ConnAck(ConnAck {
            session_present: false,
            code: ConnectReturnCode::Success,
        }));

        assert!(handle_event(event, &client, &listener).await);
        assert_eq!(*listener.topic_queries.lock().unwrap(), 1);
        assert!(listener.messages.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn should_ignore_other_events() {
        let (client, _eventloop) = make_client();
        let listener = RecordingListener::default();

        assert!(!handle_event(Event::Incoming(Packet::PingResp), &client, &listener).await);
        assert!(listener.messages.lock().unwrap().is_empty());
    }
}
