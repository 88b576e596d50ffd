//! Typed slash-command routing for chat bots.
//!
//! Commands are declared as a tree of [`Command`]s and [`Group`]s. The tree
//! is flattened into a [`CommandRegistry`] keyed by routing key (`"admin ban"`)
//! and serialized into registration bodies. At runtime the [`Dispatcher`]
//! resolves an interaction to its command, runs the command's guard chain
//! and finally extracts typed [`Arguments`] for the handler.
//!
//! - **Command model**: [`Command`], [`Group`], [`OptionSpec`]
//! - **Guards**: [`Guard`] middleware composed with [`compose`]
//! - **Dispatch**: [`Dispatcher`], [`Bot`] for the full bootstrap
//!
//! # Example
//! ```no_run
//! use std::sync::Arc;
//!
//! use async_trait::async_trait;
//! use slashkit::{
//!     Arguments, Command, CommandHandler, CommandNode, CommandResult, DispatchContext, Dispatcher,
//!     Interaction, InteractionData, OptionSpec, OptionType, flatten,
//! };
//!
//! struct Echo;
//!
//! #[async_trait]
//! impl CommandHandler for Echo {
//!     async fn handle(
//!         &self,
//!         _interaction: &dyn Interaction,
//!         args: Arguments,
//!         _ctx: &mut DispatchContext,
//!     ) -> CommandResult<()> {
//!         println!("{}", args.string("message").unwrap_or_default());
//!         Ok(())
//!     }
//! }
//!
//! # async fn run() -> CommandResult<()> {
//! let echo = Command::<()>::new("echo", "Echo a message", Arc::new(Echo))?.with_option(
//!     "message",
//!     OptionSpec::new("message", "Text to echo", OptionType::String)?.required(true),
//! );
//! let dispatcher = Dispatcher::new(flatten(&[CommandNode::from(echo)])?);
//!
//! let interaction = InteractionData::from_json(
//!     r#"{"name": "echo", "options": [{"name": "message", "type": 3, "value": "hi"}]}"#,
//! )?;
//! dispatcher.dispatch(&(), &interaction).await?;
//! # Ok(())
//! # }
//! ```

pub mod bot;
pub mod command;
pub mod config;
pub mod context;
pub mod dispatch;
pub mod error;
pub mod event;
pub mod extract;
pub mod guard;
pub mod interaction;
pub mod logging;
pub mod registry;
pub mod serialize;

pub use bot::{Bot, BotOptions, CommandRegistrar, RegistrationTarget};
pub use command::{
    ChannelExtra, ChannelType, Choice, Command, CommandHandler, CommandNode, Group, Localizations,
    NumericExtra, OptionExtra, OptionSpec, OptionType, StringExtra,
};
pub use config::{BotConfig, load_config, load_config_or_default};
pub use context::DispatchContext;
pub use dispatch::{DispatchOutcome, Dispatcher};
pub use error::{CommandError, CommandResult};
pub use event::{EventHandler, EventHandlerMap, EventSubscription, build_event_map};
pub use extract::{Arguments, OptionValue, extract_options};
pub use guard::{Endpoint, Guard, GuardChain, Next, compose};
pub use interaction::{
    Attachment, Channel, Interaction, InteractionData, Member, Mentionable, OptionSource, Role,
    User,
};
pub use logging::{init_tracing, init_tracing_from_config};
pub use registry::{CommandRegistry, flatten, routing_key};
pub use serialize::{ApplicationCommandBody, OptionBody, build_command_bodies};
