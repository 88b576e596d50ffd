//! Runtime dispatch: routing key -> command -> guards -> extraction -> handler.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use crate::{
    command::Command,
    context::DispatchContext,
    error::CommandResult,
    extract::extract_options,
    guard::{Endpoint, compose},
    interaction::Interaction,
    registry::CommandRegistry,
};

/// What happened to a dispatched interaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// No command is registered under the interaction's routing key.
    Unregistered,
    /// Every guard passed and the handler ran.
    Handled,
    /// A guard returned without continuing the chain.
    Halted,
}

/// Final step of a command's chain: extract arguments, then run the handler.
struct HandlerEndpoint<'a, C> {
    command: &'a Command<C>,
    interaction: &'a dyn Interaction,
    invoked: AtomicBool,
}

#[async_trait]
impl<C: Send + Sync> Endpoint for HandlerEndpoint<'_, C> {
    async fn call(&self, ctx: &mut DispatchContext) -> CommandResult<()> {
        self.invoked.store(true, Ordering::SeqCst);
        let args = extract_options(self.interaction.options(), self.command.options())?;
        self.command
            .handler()
            .handle(self.interaction, args, ctx)
            .await
    }
}

/// Routes interactions to registered commands.
///
/// The registry is read-only once built, so one dispatcher can serve
/// concurrent interactions; each dispatch gets its own context.
pub struct Dispatcher<C> {
    registry: Arc<CommandRegistry<C>>,
}

impl<C> Clone for Dispatcher<C> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
        }
    }
}

impl<C> Dispatcher<C> {
    pub fn new(registry: CommandRegistry<C>) -> Self {
        Self::from_shared(Arc::new(registry))
    }

    pub fn from_shared(registry: Arc<CommandRegistry<C>>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &CommandRegistry<C> {
        &self.registry
    }

    /// Look up the command an interaction routes to.
    pub fn resolve(&self, interaction: &dyn Interaction) -> Option<&Arc<Command<C>>> {
        self.registry.get(&interaction.routing_key())
    }
}

impl<C: Send + Sync> Dispatcher<C> {
    /// Dispatch one interaction.
    ///
    /// An unregistered routing key is not an error. Errors from guards,
    /// extraction and the handler are returned unchanged.
    pub async fn dispatch(
        &self,
        client: &C,
        interaction: &dyn Interaction,
    ) -> CommandResult<DispatchOutcome> {
        let key = interaction.routing_key();
        let Some(command) = self.registry.get(&key) else {
            tracing::debug!("No command registered for '{key}', ignoring interaction");
            return Ok(DispatchOutcome::Unregistered);
        };

        tracing::debug!(
            "Dispatching '{key}' (interaction: {})",
            interaction.id().unwrap_or("-")
        );

        let chain = compose(command.guards().iter().cloned());
        let endpoint = HandlerEndpoint {
            command,
            interaction,
            invoked: AtomicBool::new(false),
        };
        let mut ctx = DispatchContext::new();
        chain.run(client, interaction, &endpoint, &mut ctx).await?;

        if endpoint.invoked.load(Ordering::SeqCst) {
            Ok(DispatchOutcome::Handled)
        } else {
            tracing::debug!("Guard chain halted '{key}'");
            Ok(DispatchOutcome::Halted)
        }
    }
}
