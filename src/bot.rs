//! Bot bootstrap: owns the registry, the command bodies and the event map.

use std::fmt;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::{
    command::CommandNode,
    config::BotConfig,
    dispatch::{DispatchOutcome, Dispatcher},
    error::{CommandError, CommandResult},
    event::{EventHandlerMap, EventSubscription, build_event_map, run_handlers},
    interaction::Interaction,
    registry::CommandRegistry,
    serialize::{ApplicationCommandBody, build_command_bodies},
};

/// Platform API used to publish command bodies.
#[async_trait]
pub trait CommandRegistrar: Send + Sync {
    /// Returns `true` if the bot can see the guild.
    async fn has_guild(&self, guild_id: &str) -> bool;

    async fn set_guild_commands(
        &self,
        guild_id: &str,
        bodies: &[ApplicationCommandBody],
    ) -> CommandResult<()>;

    async fn set_global_commands(&self, bodies: &[ApplicationCommandBody]) -> CommandResult<()>;
}

/// Where commands were registered.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RegistrationTarget {
    Global,
    Guild(String),
    /// None of the requested guilds was known.
    None,
}

/// Everything needed to build a [`Bot`].
pub struct BotOptions<C> {
    pub commands: Vec<CommandNode<C>>,
    pub events: Vec<EventSubscription<C>>,
    pub config: BotConfig,
}

impl<C> Default for BotOptions<C> {
    fn default() -> Self {
        Self {
            commands: Vec::new(),
            events: Vec::new(),
            config: BotConfig::default(),
        }
    }
}

/// A configured bot, ready to receive interactions and events.
pub struct Bot<C> {
    dispatcher: Dispatcher<C>,
    command_bodies: Vec<ApplicationCommandBody>,
    events: Mutex<EventHandlerMap<C>>,
    config: BotConfig,
}

impl<C> fmt::Debug for Bot<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bot")
            .field("commands", self.dispatcher.registry())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<C: Send + Sync> Bot<C> {
    /// Flatten the command tree, build the command bodies and the event map.
    pub fn new(options: BotOptions<C>) -> CommandResult<Self> {
        let registry = CommandRegistry::flatten(&options.commands)?;
        let command_bodies = build_command_bodies(&options.commands)?;
        let events = build_event_map(options.events);

        Ok(Self {
            dispatcher: Dispatcher::new(registry),
            command_bodies,
            events: Mutex::new(events),
            config: options.config,
        })
    }

    pub fn dispatcher(&self) -> &Dispatcher<C> {
        &self.dispatcher
    }

    pub fn command_bodies(&self) -> &[ApplicationCommandBody] {
        &self.command_bodies
    }

    pub fn config(&self) -> &BotConfig {
        &self.config
    }

    /// Dispatch an interaction, bounded by the configured timeout.
    pub async fn handle_interaction(
        &self,
        client: &C,
        interaction: &dyn Interaction,
    ) -> CommandResult<DispatchOutcome> {
        let dispatch = self.dispatcher.dispatch(client, interaction);
        match self.config.dispatch_timeout() {
            Some(limit) => tokio::time::timeout(limit, dispatch)
                .await
                .map_err(|_| {
                    CommandError::Timeout(self.config.dispatch_timeout_ms.unwrap_or_default())
                })?,
            None => dispatch.await,
        }
    }

    /// Run the handlers subscribed to `event`; returns how many ran.
    ///
    /// The event map is locked only while the due handlers are collected, so
    /// handlers of different events run concurrently and may emit further
    /// events through this bot.
    pub async fn emit_event(&self, event: &str, client: &C, payload: &Value) -> usize {
        let due = self.events.lock().await.take_due(event);
        run_handlers(event, &due, client, payload).await
    }

    /// Register commands to the configured guilds, or globally if none.
    pub async fn register_commands(
        &self,
        registrar: &dyn CommandRegistrar,
    ) -> CommandResult<RegistrationTarget> {
        self.register_commands_to(registrar, &self.config.guild_ids)
            .await
    }

    /// Register commands to the first known guild in `guild_ids`.
    ///
    /// Unknown guilds are logged and skipped. An empty list registers
    /// globally.
    pub async fn register_commands_to(
        &self,
        registrar: &dyn CommandRegistrar,
        guild_ids: &[String],
    ) -> CommandResult<RegistrationTarget> {
        if guild_ids.is_empty() {
            registrar.set_global_commands(&self.command_bodies).await?;
            tracing::info!("Registered {} global commands", self.command_bodies.len());
            return Ok(RegistrationTarget::Global);
        }

        for guild_id in guild_ids {
            if registrar.has_guild(guild_id).await {
                registrar
                    .set_guild_commands(guild_id, &self.command_bodies)
                    .await?;
                tracing::info!(
                    "Registered {} commands to guild {}",
                    self.command_bodies.len(),
                    guild_id
                );
                return Ok(RegistrationTarget::Guild(guild_id.clone()));
            }
            tracing::warn!("Guild {} could not be found, skipping", guild_id);
        }
        Ok(RegistrationTarget::None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        command::{Command, CommandHandler, Group},
        context::DispatchContext,
        event::EventHandler,
        extract::Arguments,
        interaction::InteractionData,
    };
    use serde_json::json;
    use std::sync::{Arc, OnceLock, Weak};
    use std::time::Duration;

    struct Client;

    struct Sleepy(Duration);

    #[async_trait]
    impl CommandHandler for Sleepy {
        async fn handle(
            &self,
            _interaction: &dyn Interaction,
            _args: Arguments,
            _ctx: &mut DispatchContext,
        ) -> CommandResult<()> {
            tokio::time::sleep(self.0).await;
            Ok(())
        }
    }

    struct Counter(std::sync::Mutex<u32>);

    #[async_trait]
    impl EventHandler<Client> for Counter {
        async fn handle(&self, _client: &Client, _payload: &Value) -> CommandResult<()> {
            *self.0.lock().unwrap() += 1;
            Ok(())
        }
    }

    struct SlowEvent(Duration);

    #[async_trait]
    impl EventHandler<Client> for SlowEvent {
        async fn handle(&self, _client: &Client, _payload: &Value) -> CommandResult<()> {
            tokio::time::sleep(self.0).await;
            Ok(())
        }
    }

    /// Re-emits every payload as another event through the owning bot.
    struct Relay {
        bot: OnceLock<Weak<Bot<Client>>>,
        target: &'static str,
    }

    #[async_trait]
    impl EventHandler<Client> for Relay {
        async fn handle(&self, client: &Client, payload: &Value) -> CommandResult<()> {
            if let Some(bot) = self.bot.get().and_then(Weak::upgrade) {
                bot.emit_event(self.target, client, payload).await;
            }
            Ok(())
        }
    }

    #[derive(Default)]
    struct MockRegistrar {
        guilds: Vec<String>,
        calls: std::sync::Mutex<Vec<String>>,
    }

    #[async_trait]
    impl CommandRegistrar for MockRegistrar {
        async fn has_guild(&self, guild_id: &str) -> bool {
            self.guilds.iter().any(|g| g == guild_id)
        }

        async fn set_guild_commands(
            &self,
            guild_id: &str,
            bodies: &[ApplicationCommandBody],
        ) -> CommandResult<()> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("guild:{guild_id}:{}", bodies.len()));
            Ok(())
        }

        async fn set_global_commands(
            &self,
            bodies: &[ApplicationCommandBody],
        ) -> CommandResult<()> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("global:{}", bodies.len()));
            Ok(())
        }
    }

    fn sleepy(name: &str, millis: u64) -> CommandNode<Client> {
        Command::<Client>::new(name, "Sleeps", Arc::new(Sleepy(Duration::from_millis(millis))))
            .unwrap()
            .into()
    }

    fn bot(config: BotConfig) -> Bot<Client> {
        Bot::new(BotOptions {
            commands: vec![
                sleepy("ping", 0),
                Group::new("admin", "Administration", [sleepy("slow", 500)])
                    .unwrap()
                    .into(),
            ],
            events: Vec::new(),
            config,
        })
        .unwrap()
    }

    fn interaction(value: Value) -> InteractionData {
        InteractionData::from_value(value).unwrap()
    }

    #[test]
    fn test_new_builds_registry_and_bodies() {
        let bot = bot(BotConfig::default());
        assert_eq!(bot.command_bodies().len(), 2);
        assert!(bot.dispatcher().registry().contains_key("ping"));
        assert!(bot.dispatcher().registry().contains_key("admin slow"));
    }

    #[test]
    fn test_new_rejects_duplicates() {
        let err = Bot::new(BotOptions {
            commands: vec![sleepy("ping", 0), sleepy("ping", 0)],
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, CommandError::DuplicateCommand(_)));
    }

    #[tokio::test]
    async fn test_handle_interaction_times_out() {
        let bot = bot(BotConfig {
            dispatch_timeout_ms: Some(20),
            ..Default::default()
        });
        let slow = interaction(json!({
            "name": "admin",
            "options": [{ "name": "slow", "type": 1 }]
        }));

        let err = bot.handle_interaction(&Client, &slow).await.unwrap_err();
        assert!(matches!(err, CommandError::Timeout(20)));

        let fast = interaction(json!({ "name": "ping" }));
        let outcome = bot.handle_interaction(&Client, &fast).await.unwrap();
        assert_eq!(outcome, DispatchOutcome::Handled);
    }

    #[tokio::test]
    async fn test_emit_event_runs_handlers() {
        let counter = Arc::new(Counter(std::sync::Mutex::new(0)));
        let bot = Bot::new(BotOptions {
            events: vec![
                EventSubscription::on("ready", counter.clone() as Arc<dyn EventHandler<Client>>),
                EventSubscription::once("ready", counter.clone() as Arc<dyn EventHandler<Client>>),
            ],
            ..Default::default()
        })
        .unwrap();

        assert_eq!(bot.emit_event("ready", &Client, &json!({})).await, 2);
        assert_eq!(bot.emit_event("ready", &Client, &json!({})).await, 1);
        assert_eq!(*counter.0.lock().unwrap(), 3);
    }

    #[tokio::test]
    async fn test_slow_handler_does_not_block_other_events() {
        let counter = Arc::new(Counter(std::sync::Mutex::new(0)));
        let bot = Bot::new(BotOptions {
            events: vec![
                EventSubscription::on(
                    "messageCreate",
                    Arc::new(SlowEvent(Duration::from_millis(300))) as Arc<dyn EventHandler<Client>>,
                ),
                EventSubscription::on("ready", counter.clone() as Arc<dyn EventHandler<Client>>),
            ],
            ..Default::default()
        })
        .unwrap();
        let payload = json!({});

        let slow = bot.emit_event("messageCreate", &Client, &payload);
        let ready = async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            tokio::time::timeout(
                Duration::from_millis(100),
                bot.emit_event("ready", &Client, &payload),
            )
            .await
        };
        let (slow_ran, ready_ran) = tokio::join!(slow, ready);

        assert_eq!(slow_ran, 1);
        assert_eq!(ready_ran.unwrap(), 1);
        assert_eq!(*counter.0.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_handler_can_emit_through_same_bot() {
        let counter = Arc::new(Counter(std::sync::Mutex::new(0)));
        let relay = Arc::new(Relay {
            bot: OnceLock::new(),
            target: "ready",
        });
        let bot = Arc::new(
            Bot::new(BotOptions {
                events: vec![
                    EventSubscription::on("guildCreate", relay.clone() as Arc<dyn EventHandler<Client>>),
                    EventSubscription::on("ready", counter.clone() as Arc<dyn EventHandler<Client>>),
                ],
                ..Default::default()
            })
            .unwrap(),
        );
        relay.bot.set(Arc::downgrade(&bot)).unwrap();

        let ran = tokio::time::timeout(
            Duration::from_millis(500),
            bot.emit_event("guildCreate", &Client, &json!({})),
        )
        .await
        .unwrap();

        assert_eq!(ran, 1);
        assert_eq!(*counter.0.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_register_globally_without_guilds() {
        let bot = bot(BotConfig::default());
        let registrar = MockRegistrar::default();

        let target = bot.register_commands(&registrar).await.unwrap();
        assert_eq!(target, RegistrationTarget::Global);
        assert_eq!(*registrar.calls.lock().unwrap(), vec!["global:2"]);
    }

    #[tokio::test]
    async fn test_register_to_first_known_guild() {
        let bot = bot(BotConfig {
            guild_ids: vec!["404".to_string(), "222".to_string(), "333".to_string()],
            ..Default::default()
        });
        let registrar = MockRegistrar {
            guilds: vec!["222".to_string(), "333".to_string()],
            ..Default::default()
        };

        let target = bot.register_commands(&registrar).await.unwrap();
        assert_eq!(target, RegistrationTarget::Guild("222".to_string()));
        assert_eq!(*registrar.calls.lock().unwrap(), vec!["guild:222:2"]);
    }

    #[tokio::test]
    async fn test_register_with_only_unknown_guilds() {
        let bot = bot(BotConfig::default());
        let registrar = MockRegistrar::default();

        let target = bot
            .register_commands_to(&registrar, &["404".to_string()])
            .await
            .unwrap();
        assert_eq!(target, RegistrationTarget::None);
        assert!(registrar.calls.lock().unwrap().is_empty());
    }
}
