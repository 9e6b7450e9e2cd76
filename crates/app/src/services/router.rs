//! Command router: turns one chat message into a reply and bus effects.
//!
//! Strangers only ever get an answer to `/start`, which also pings the
//! admin with a ready-to-paste `/auth` command. Everything else a stranger
//! sends is ignored so spam bots get no feedback.
//!
//! For authorized users the verb is recognised first, then admin-only verbs
//! are narrowed to the admin, then arguments are parsed and executed.
//!
//! Bus and chat failures are logged and never turned into replies.

use std::fmt::Write as _;

use lights_domain::command::{Command, Invocation, Verb};
use lights_domain::error::BridgeError;
use lights_domain::id::UserId;
use lights_domain::registration::Registration;

use crate::ports::{BusTransport, ChatTransport, InboundMessage, StateStore};
use crate::services::auth_gate::AuthorizationGate;
use crate::services::registry::{Registry, TopicChange};

const WELCOME: &str = "Welcome to the Lights control bot! Try /help for tips.";
const NOT_AUTHORIZED: &str = "Sorry, you are not authorized. Administrator confirmation required.";
const ADMIN_ONLY: &str = "Sorry, only administrators can do that!";
const NOT_UNDERSTOOD: &str = "Sorry, I did not understand. Try /help instead.";
const NOT_REGISTERED: &str = "Sorry, this command is not registered. Try /help instead.";
const INVALID_VALUE: &str = "Sorry, this is not a valid value! Try /help instead.";
const NOW_AUTHORIZED: &str = "You have now been authorized by the admin. Try /help for commands.";
const SELECT_OPTION: &str = "Select option below...";

/// Keyboard to show along with a reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Keyboard {
    /// Clear any custom keyboard.
    Remove,
    /// Offer each entry as a one-tap button.
    Buttons(Vec<String>),
}

/// Text to send back, threaded onto the inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub keyboard: Keyboard,
}

impl Reply {
    fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            keyboard: Keyboard::Remove,
        }
    }

    fn with_buttons(text: impl Into<String>, buttons: Vec<String>) -> Self {
        let keyboard = if buttons.is_empty() {
            Keyboard::Remove
        } else {
            Keyboard::Buttons(buttons)
        };
        Self {
            text: text.into(),
            keyboard,
        }
    }
}

/// Routes chat commands to the registry, the authorization gate and the bus.
pub struct CommandRouter<S, B, C> {
    registry: Registry<S>,
    gate: AuthorizationGate<S>,
    bus: B,
    chat: C,
}

impl<S, B, C> CommandRouter<S, B, C>
where
    S: StateStore,
    B: BusTransport,
    C: ChatTransport,
{
    pub fn new(registry: Registry<S>, gate: AuthorizationGate<S>, bus: B, chat: C) -> Self {
        Self {
            registry,
            gate,
            bus,
            chat,
        }
    }

    /// Route `msg` and send the resulting reply, if any.
    pub async fn handle(&self, msg: &InboundMessage) {
        tracing::info!(user = %msg.display_name, id = %msg.from, text = %msg.text, "chat rx");

        let Some(reply) = self.route(msg).await else {
            return;
        };

        tracing::info!(user = %msg.display_name, text = %reply.text, "chat tx");
        let result = match &reply.keyboard {
            Keyboard::Remove => {
                self.chat
                    .send_reply(msg.chat, msg.message, &reply.text)
                    .await
            }
            Keyboard::Buttons(buttons) => {
                self.chat
                    .send_reply_with_keyboard(msg.chat, msg.message, &reply.text, buttons)
                    .await
            }
        };
        if let Err(err) = result {
            tracing::warn!(error = %err, "failed to send reply");
        }
    }

    /// Compute the reply for `msg`, performing its side effects.
    ///
    /// Returns `None` when the message must be left unanswered.
    pub async fn route(&self, msg: &InboundMessage) -> Option<Reply> {
        let invocation = Invocation::parse(&msg.text);

        if !self.gate.is_authorized(msg.from).await {
            return self.greet_stranger(msg, &invocation).await;
        }

        if invocation.verb.requires_admin() && !self.gate.is_admin(msg.from).await {
            return Some(Reply::plain(ADMIN_ONLY));
        }

        let command = match invocation.into_command() {
            Ok(command) => command,
            Err(err) => return Some(Reply::plain(err.to_string())),
        };

        Some(self.execute(msg.from, command).await)
    }

    /// Only a bare `/start` from a stranger is answered.
    async fn greet_stranger(
        &self,
        msg: &InboundMessage,
        invocation: &Invocation<'_>,
    ) -> Option<Reply> {
        if invocation.verb != Verb::Start || invocation.args.is_some() {
            return None;
        }

        tracing::info!(user = %msg.display_name, id = %msg.from, "message from unauthorized user");
        if let Some(admin) = self.gate.admin().await {
            let text = format!(
                "New connection from {}. Send \"/auth {}\" to authorize.",
                msg.display_name, msg.from
            );
            self.notify(admin, &text).await;
        }
        Some(Reply::plain(NOT_AUTHORIZED))
    }

    async fn execute(&self, from: UserId, command: Command) -> Reply {
        match command {
            Command::Start => Reply::with_buttons(WELCOME, self.command_buttons().await),
            Command::Help => {
                let text = self.help_text(from).await;
                Reply::with_buttons(text, self.command_buttons().await)
            }
            Command::Auth(id) => self.authorize(id).await,
            Command::Send { topic, value } => {
                self.publish(&topic, &value).await;
                Reply::plain(format!("Setting \"{topic}\" to \"{value}\""))
            }
            Command::Register {
                name,
                topic,
                values,
            } => match self.registry.register(&name, &topic, values).await {
                Ok(change) => {
                    self.apply(change).await;
                    Reply::plain(format!("Ok, registered {name}"))
                }
                Err(err) => Reply::plain(format!("Error registering! {err}")),
            },
            Command::Unregister { name } => match self.registry.unregister(&name).await {
                Ok(change) => {
                    self.apply(change).await;
                    Reply::plain(format!("Ok, unregistered {name}"))
                }
                Err(err) => Reply::plain(format!("Error unregistering! {err}")),
            },
            Command::CommandList => Reply::plain(self.command_list().await),
            Command::Device { name, value } => self.device(&name, value).await,
        }
    }

    async fn authorize(&self, id: UserId) -> Reply {
        match self.gate.authorize(id).await {
            Ok(_) => {
                self.notify(id, NOW_AUTHORIZED).await;
                Reply::plain(format!("Ok, authorized {id}."))
            }
            Err(err) => Reply::plain(format!("Error authorizing ID! {err}")),
        }
    }

    async fn device(&self, name: &str, value: Option<String>) -> Reply {
        let registration = self.registry.find_by_name(name).await;
        match (registration, value) {
            (Some(reg), Some(value)) => {
                if !self.registry.is_valid_value(name, &value).await {
                    return Reply::plain(INVALID_VALUE);
                }
                self.publish(&reg.topic, &value).await;
                Reply::plain(format!("Ok, setting {name} to {value}"))
            }
            (None, Some(_)) => Reply::plain(NOT_REGISTERED),
            (Some(reg), None) => {
                let mut text = String::new();
                if let Some(last) = reg.last_value.as_deref().filter(|last| !last.is_empty()) {
                    let _ = writeln!(text, "Current state: \"{last}\"");
                }
                text.push_str(SELECT_OPTION);
                Reply::with_buttons(text, value_buttons(&reg))
            }
            (None, None) => Reply::plain(NOT_UNDERSTOOD),
        }
    }

    async fn help_text(&self, from: UserId) -> String {
        let registrations = self.registry.describe_all().await;
        let mut text = String::new();

        if !registrations.is_empty() {
            text.push_str("You can use the following commands:\n");
            for reg in &registrations {
                let _ = write!(text, " - /{}", reg.name);
                for value in &reg.values {
                    let _ = write!(text, " {value}");
                }
                text.push('\n');
            }
            text.push('\n');
        }

        text.push_str("These commands are always available:\n");
        text.push_str(" - /send TOPIC VALUE\n");
        text.push_str(" - /help\n");
        text.push_str(" - /start\n");

        if self.gate.is_admin(from).await {
            text.push_str("\nYou are an administrator, so you can also use:\n");
            text.push_str(" - /auth ID\n");
            text.push_str(" - /register NAME TOPIC VAL1,VAL2,...\n");
            text.push_str(" - /unregister NAME\n");
            text.push_str(" - /commandlist");
        } else {
            text.push_str("\nAdministrators have further options not available to you.");
        }
        text
    }

    /// Listing in the format expected by Telegram's `/setcommands`.
    async fn command_list(&self) -> String {
        let mut text = String::new();
        for reg in self.registry.describe_all().await {
            let _ = writeln!(text, "{} - Set '{}' state", reg.name, reg.topic);
        }
        text.push_str("help - Show help text and keyboard");
        text
    }

    async fn command_buttons(&self) -> Vec<String> {
        self.registry
            .describe_all()
            .await
            .iter()
            .map(|reg| format!("/{}", reg.name))
            .collect()
    }

    async fn publish(&self, topic: &str, value: &str) {
        tracing::info!(topic, value, "bus tx");
        if let Err(err) = self.bus.publish(topic, value).await {
            tracing::warn!(error = %err, topic, "bus publish failed");
        }
    }

    async fn apply(&self, change: TopicChange) {
        let result = match &change {
            TopicChange::Subscribe(topic) => self.bus.subscribe(topic).await,
            TopicChange::Unsubscribe(topic) => self.bus.unsubscribe(topic).await,
            TopicChange::Keep => Ok(()),
        };
        if let Err(err) = result {
            log_transport_error(&err, &change);
        }
    }

    async fn notify(&self, user: UserId, text: &str) {
        if let Err(err) = self.chat.send_plain(user, text).await {
            tracing::warn!(error = %err, user = %user, "failed to send notification");
        }
    }
}

fn value_buttons(reg: &Registration) -> Vec<String> {
    reg.values
        .iter()
        .map(|value| format!("/{} {value}", reg.name))
        .collect()
}

fn log_transport_error(err: &BridgeError, change: &TopicChange) {
    match change {
        TopicChange::Subscribe(topic) => {
            tracing::warn!(error = %err, topic, "bus subscribe failed");
        }
        TopicChange::Unsubscribe(topic) => {
            tracing::warn!(error = %err, topic, "bus unsubscribe failed");
        }
        TopicChange::Keep => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::future::Future;
    use std::sync::{Arc, Mutex};

    use lights_domain::id::{ChatId, MessageId};
    use lights_domain::state::BridgeState;
    use lights_domain::users::AuthorizedUsers;

    use crate::state::SharedState;
    use crate::state::testing::InMemoryStore;

    const ADMIN: UserId = UserId::new(1000);
    const STRANGER: UserId = UserId::new(42);
    const MEMBER: UserId = UserId::new(7);

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum BusCall {
        Publish(String, String),
        Subscribe(String),
        Unsubscribe(String),
    }

    #[derive(Default)]
    struct FakeBus {
        calls: Mutex<Vec<BusCall>>,
        offline: bool,
    }

    impl FakeBus {
        fn offline() -> Self {
            Self {
                offline: true,
                ..Self::default()
            }
        }

        fn record(&self, call: BusCall) -> impl Future<Output = Result<(), BridgeError>> + Send {
            self.calls.lock().unwrap().push(call);
            let result = if self.offline {
                Err(BridgeError::transport(std::io::Error::other(
                    "connection refused",
                )))
            } else {
                Ok(())
            };
            async { result }
        }

        fn calls(&self) -> Vec<BusCall> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl BusTransport for FakeBus {
        fn publish(
            &self,
            topic: &str,
            value: &str,
        ) -> impl Future<Output = Result<(), BridgeError>> + Send {
            self.record(BusCall::Publish(topic.to_string(), value.to_string()))
        }

        fn subscribe(&self, topic: &str) -> impl Future<Output = Result<(), BridgeError>> + Send {
            self.record(BusCall::Subscribe(topic.to_string()))
        }

        fn unsubscribe(
            &self,
            topic: &str,
        ) -> impl Future<Output = Result<(), BridgeError>> + Send {
            self.record(BusCall::Unsubscribe(topic.to_string()))
        }
    }

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum ChatCall {
        Plain(UserId, String),
        Reply(String),
        Keyboard(String, Vec<String>),
    }

    #[derive(Default)]
    struct FakeChat {
        calls: Mutex<Vec<ChatCall>>,
    }

    impl FakeChat {
        fn calls(&self) -> Vec<ChatCall> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl ChatTransport for FakeChat {
        fn send_plain(
            &self,
            user: UserId,
            text: &str,
        ) -> impl Future<Output = Result<(), BridgeError>> + Send {
            self.calls
                .lock()
                .unwrap()
                .push(ChatCall::Plain(user, text.to_string()));
            async { Ok(()) }
        }

        fn send_reply(
            &self,
            _chat: ChatId,
            _message: MessageId,
            text: &str,
        ) -> impl Future<Output = Result<(), BridgeError>> + Send {
            self.calls
                .lock()
                .unwrap()
                .push(ChatCall::Reply(text.to_string()));
            async { Ok(()) }
        }

        fn send_reply_with_keyboard(
            &self,
            _chat: ChatId,
            _message: MessageId,
            text: &str,
            buttons: &[String],
        ) -> impl Future<Output = Result<(), BridgeError>> + Send {
            self.calls
                .lock()
                .unwrap()
                .push(ChatCall::Keyboard(text.to_string(), buttons.to_vec()));
            async { Ok(()) }
        }
    }

    type TestRouter = CommandRouter<Arc<InMemoryStore>, Arc<FakeBus>, Arc<FakeChat>>;

    struct Harness {
        router: TestRouter,
        registry: Registry<Arc<InMemoryStore>>,
        bus: Arc<FakeBus>,
        chat: Arc<FakeChat>,
    }

    fn harness_with_admin(admin: UserId) -> Harness {
        build(admin, InMemoryStore::default(), FakeBus::default())
    }

    fn build(admin: UserId, store: InMemoryStore, bus: FakeBus) -> Harness {
        let state = BridgeState::new(AuthorizedUsers::new(admin, [MEMBER]), []);
        let shared = Arc::new(SharedState::new(state, Arc::new(store)));
        let registry = Registry::new(Arc::clone(&shared));
        let gate = AuthorizationGate::new(shared);
        let bus = Arc::new(bus);
        let chat = Arc::new(FakeChat::default());
        let router = CommandRouter::new(
            registry.clone(),
            gate,
            Arc::clone(&bus),
            Arc::clone(&chat),
        );
        Harness {
            router,
            registry,
            bus,
            chat,
        }
    }

    fn harness() -> Harness {
        harness_with_admin(ADMIN)
    }

    fn message(from: UserId, text: &str) -> InboundMessage {
        InboundMessage {
            from,
            display_name: format!("user{from}"),
            chat: ChatId::from(from),
            message: MessageId::new(1),
            text: text.to_string(),
        }
    }

    async fn send(h: &Harness, from: UserId, text: &str) -> Option<Reply> {
        h.router.route(&message(from, text)).await
    }

    async fn text(h: &Harness, from: UserId, text: &str) -> String {
        send(h, from, text).await.unwrap().text
    }

    #[tokio::test]
    async fn should_register_then_set_device_value() {
        let h = harness();
        assert_eq!(
            text(&h, ADMIN, "/register lamp home/lamp on,off").await,
            "Ok, registered lamp"
        );
        assert_eq!(text(&h, ADMIN, "/lamp on").await, "Ok, setting lamp to on");
        assert_eq!(
            h.bus.calls(),
            vec![
                BusCall::Subscribe("home/lamp".to_string()),
                BusCall::Publish("home/lamp".to_string(), "on".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn should_let_members_set_device_values() {
        let h = harness();
        send(&h, ADMIN, "/register lamp home/lamp on,off").await;
        assert_eq!(text(&h, MEMBER, "/lamp off").await, "Ok, setting lamp to off");
    }

    #[tokio::test]
    async fn should_refuse_admin_verbs_to_members() {
        let h = harness();
        for cmd in [
            "/register lamp home/lamp on,off",
            "/unregister lamp",
            "/auth 5",
            "/auth not-a-number",
            "/commandlist",
        ] {
            assert_eq!(text(&h, MEMBER, cmd).await, ADMIN_ONLY, "{cmd}");
        }
        assert!(h.registry.describe_all().await.is_empty());
        assert!(h.bus.calls().is_empty());
        assert!(h.chat.calls().is_empty());
    }

    #[tokio::test]
    async fn should_ignore_strangers_except_start() {
        let h = harness();
        for cmd in ["/register lamp home/lamp on,off", "/help", "/send a b", "/lamp on"] {
            assert_eq!(send(&h, STRANGER, cmd).await, None, "{cmd}");
        }
        assert!(h.registry.describe_all().await.is_empty());
        assert!(h.bus.calls().is_empty());
        assert!(h.chat.calls().is_empty());
    }

    #[tokio::test]
    async fn should_ignore_stranger_start_with_arguments() {
        let h = harness();
        assert_eq!(send(&h, STRANGER, "/start please").await, None);
        assert!(h.chat.calls().is_empty());
    }

    #[tokio::test]
    async fn should_report_save_failure_and_skip_subscribe() {
        let h = build(ADMIN, InMemoryStore::failing(), FakeBus::default());
        assert_eq!(
            text(&h, ADMIN, "/register lamp home/lamp on,off").await,
            "Error registering! failed to save state"
        );
        assert!(h.bus.calls().is_empty());
    }

    #[tokio::test]
    async fn should_report_save_failure_and_skip_auth_notification() {
        let h = build(ADMIN, InMemoryStore::failing(), FakeBus::default());
        assert_eq!(
            text(&h, ADMIN, "/auth 42").await,
            "Error authorizing ID! failed to save state"
        );
        assert!(h.chat.calls().is_empty());
    }

    #[tokio::test]
    async fn should_reply_success_when_publish_fails() {
        let h = build(ADMIN, InMemoryStore::default(), FakeBus::offline());
        send(&h, ADMIN, "/register lamp home/lamp on,off").await;
        assert_eq!(text(&h, MEMBER, "/lamp on").await, "Ok, setting lamp to on");
        assert_eq!(
            h.bus.calls().last(),
            Some(&BusCall::Publish("home/lamp".to_string(), "on".to_string()))
        );
    }

    #[tokio::test]
    async fn should_notify_admin_when_stranger_starts() {
        let h = harness();
        assert_eq!(text(&h, STRANGER, "/start").await, NOT_AUTHORIZED);
        assert_eq!(
            h.chat.calls(),
            vec![ChatCall::Plain(
                ADMIN,
                "New connection from user42. Send \"/auth 42\" to authorize.".to_string()
            )]
        );
    }

    #[tokio::test]
    async fn should_skip_admin_notification_without_admin() {
        let h = harness_with_admin(UserId::new(0));
        assert_eq!(text(&h, STRANGER, "/start").await, NOT_AUTHORIZED);
        assert!(h.chat.calls().is_empty());
    }

    #[tokio::test]
    async fn should_authorize_and_notify_user() {
        let h = harness();
        assert_eq!(text(&h, ADMIN, "/auth 42").await, "Ok, authorized 42.");
        assert_eq!(
            h.chat.calls(),
            vec![ChatCall::Plain(STRANGER, NOW_AUTHORIZED.to_string())]
        );
        assert_eq!(text(&h, STRANGER, "/send a b").await, "Setting \"a\" to \"b\"");

        assert_eq!(text(&h, ADMIN, "/auth 42").await, "Ok, authorized 42.");
        assert_eq!(
            text(&h, ADMIN, "/auth 42").await,
            "Ok, authorized 42.",
            "re-authorizing stays idempotent"
        );
    }

    #[tokio::test]
    async fn should_reply_parse_error_for_bad_auth_id() {
        let h = harness();
        let reply = text(&h, ADMIN, "/auth bob").await;
        assert!(reply.starts_with("Error parsing ID! "), "{reply}");
        assert!(h.chat.calls().is_empty());
    }

    #[tokio::test]
    async fn should_send_verbatim_without_registry() {
        let h = harness();
        send(&h, ADMIN, "/register lamp home/lamp on,off").await;
        assert_eq!(
            text(&h, MEMBER, "/send home/lamp blink fast").await,
            "Setting \"home/lamp\" to \"blink fast\""
        );
        assert_eq!(
            h.bus.calls().last(),
            Some(&BusCall::Publish(
                "home/lamp".to_string(),
                "blink fast".to_string()
            ))
        );
        let reg = h.registry.find_by_name("lamp").await.unwrap();
        assert!(reg.last_value.is_none());
    }

    #[tokio::test]
    async fn should_reject_send_without_value() {
        let h = harness();
        assert_eq!(text(&h, MEMBER, "/send home/lamp").await, "Error parsing your message.");
        assert!(h.bus.calls().is_empty());
    }

    #[tokio::test]
    async fn should_report_register_conflicts_and_parse_errors() {
        let h = harness();
        send(&h, ADMIN, "/register lamp home/lamp on,off").await;
        assert_eq!(
            text(&h, ADMIN, "/register lamp home/x a").await,
            "Error registering! already registered"
        );
        assert_eq!(text(&h, ADMIN, "/register lamp").await, "Error parsing name!");
        assert_eq!(text(&h, ADMIN, "/register lamp home/lamp").await, "Error parsing topic!");
        assert_eq!(
            text(&h, ADMIN, "/register help home/help a").await,
            "Error registering! name \"help\" is a built-in command"
        );
        assert_eq!(h.bus.calls().len(), 1);
    }

    #[tokio::test]
    async fn should_unregister_and_unsubscribe() {
        let h = harness();
        send(&h, ADMIN, "/register lamp home/lamp on,off").await;
        assert_eq!(text(&h, ADMIN, "/unregister lamp").await, "Ok, unregistered lamp");
        assert_eq!(
            text(&h, ADMIN, "/unregister lamp").await,
            "Error unregistering! name not found"
        );
        assert_eq!(
            h.bus.calls().last(),
            Some(&BusCall::Unsubscribe("home/lamp".to_string()))
        );
        assert_eq!(text(&h, MEMBER, "/lamp on").await, NOT_REGISTERED);
    }

    #[tokio::test]
    async fn should_reject_invalid_device_value() {
        let h = harness();
        send(&h, ADMIN, "/register lamp home/lamp on,off").await;
        assert_eq!(text(&h, MEMBER, "/lamp dim").await, INVALID_VALUE);
        assert_eq!(text(&h, MEMBER, "/lamp ").await, INVALID_VALUE);
        assert_eq!(h.bus.calls().len(), 1);
    }

    #[tokio::test]
    async fn should_accept_any_value_for_freeform_device() {
        let h = harness();
        send(&h, ADMIN, "/register display home/display ").await;
        assert_eq!(
            text(&h, MEMBER, "/display hello world").await,
            "Ok, setting display to hello world"
        );
    }

    #[tokio::test]
    async fn should_show_current_state_and_value_keyboard() {
        let h = harness();
        send(&h, ADMIN, "/register lamp home/lamp on,off").await;

        let reply = send(&h, MEMBER, "/lamp").await.unwrap();
        assert_eq!(reply.text, SELECT_OPTION);

        h.registry.record_observed_value("home/lamp", "on").await;
        let reply = send(&h, MEMBER, "/lamp").await.unwrap();
        assert_eq!(reply.text, "Current state: \"on\"\nSelect option below...");
        assert_eq!(
            reply.keyboard,
            Keyboard::Buttons(vec!["/lamp on".to_string(), "/lamp off".to_string()])
        );
    }

    #[tokio::test]
    async fn should_not_understand_unknown_verb() {
        let h = harness();
        assert_eq!(text(&h, MEMBER, "/fan").await, NOT_UNDERSTOOD);
        assert_eq!(text(&h, MEMBER, "/fan on").await, NOT_REGISTERED);
    }

    #[tokio::test]
    async fn should_welcome_with_command_keyboard() {
        let h = harness();
        send(&h, ADMIN, "/register lamp home/lamp on,off").await;
        send(&h, ADMIN, "/register fan home/fan on,off").await;

        let reply = send(&h, MEMBER, "/start").await.unwrap();
        assert_eq!(reply.text, WELCOME);
        assert_eq!(
            reply.keyboard,
            Keyboard::Buttons(vec!["/lamp".to_string(), "/fan".to_string()])
        );
    }

    #[tokio::test]
    async fn should_list_devices_and_admin_verbs_in_help() {
        let h = harness();
        send(&h, ADMIN, "/register lamp home/lamp on,off").await;

        let member_help = text(&h, MEMBER, "/help").await;
        assert!(member_help.starts_with("You can use the following commands:\n - /lamp on off\n\n"));
        assert!(member_help.contains(" - /send TOPIC VALUE\n"));
        assert!(member_help.ends_with("Administrators have further options not available to you."));

        let admin_help = text(&h, ADMIN, "/help").await;
        assert!(admin_help.contains(" - /register NAME TOPIC VAL1,VAL2,...\n"));
        assert!(admin_help.ends_with(" - /commandlist"));
    }

    #[tokio::test]
    async fn should_omit_device_section_from_help_when_empty() {
        let h = harness();
        let help = text(&h, MEMBER, "/help").await;
        assert!(help.starts_with("These commands are always available:\n"));
    }

    #[tokio::test]
    async fn should_print_command_list() {
        let h = harness();
        send(&h, ADMIN, "/register lamp home/lamp on,off").await;
        assert_eq!(
            text(&h, ADMIN, "/commandlist").await,
            "lamp - Set 'home/lamp' state\nhelp - Show help text and keyboard"
        );
    }

    #[tokio::test]
    async fn should_send_reply_through_chat_transport() {
        let h = harness();
        send(&h, ADMIN, "/register lamp home/lamp on,off").await;

        h.router.handle(&message(MEMBER, "/lamp")).await;
        h.router.handle(&message(MEMBER, "/lamp on")).await;
        h.router.handle(&message(STRANGER, "/lamp on")).await;

        assert_eq!(
            h.chat.calls(),
            vec![
                ChatCall::Keyboard(
                    SELECT_OPTION.to_string(),
                    vec!["/lamp on".to_string(), "/lamp off".to_string()]
                ),
                ChatCall::Reply("Ok, setting lamp to on".to_string()),
            ]
        );
    }
}
