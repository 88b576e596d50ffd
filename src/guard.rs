//! Guard chain composition.
//!
//! Guards are middleware run before a command handler. Each guard receives a
//! [`Next`] handle; awaiting [`Next::run`] runs the rest of the chain (and
//! finally the [`Endpoint`]) and returns once all of it has completed, so code
//! after the call observes the handler's effects. A guard that returns without
//! calling `run` halts the chain: later guards and the endpoint never execute.
//!
//! The chain keeps a cursor of the last position entered. Entering a position
//! at or before the cursor means a guard called `run` twice, which fails with
//! [`CommandError::DoubleInvocation`].

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use futures::future::BoxFuture;

use crate::{
    context::DispatchContext,
    error::{CommandError, CommandResult},
    interaction::Interaction,
};

/// Middleware executed before a command handler.
///
/// `C` is the platform client type.
#[async_trait]
pub trait Guard<C>: Send + Sync {
    /// Inspect the interaction and either continue with `next.run(ctx)` or
    /// return without calling it to reject the interaction.
    async fn check(
        &self,
        client: &C,
        interaction: &dyn Interaction,
        next: Next<'_, C>,
        ctx: &mut DispatchContext,
    ) -> CommandResult<()>;
}

/// Final step of a guard chain, run once every guard has passed.
#[async_trait]
pub trait Endpoint: Send + Sync {
    async fn call(&self, ctx: &mut DispatchContext) -> CommandResult<()>;
}

/// One in-flight execution of a guard chain.
struct ChainRun<'a, C> {
    guards: &'a [Arc<dyn Guard<C>>],
    client: &'a C,
    interaction: &'a dyn Interaction,
    endpoint: &'a dyn Endpoint,
    /// Last entered position plus one; zero before the chain starts.
    cursor: AtomicUsize,
}

impl<'a, C: Sync> ChainRun<'a, C> {
    fn dispatch<'b>(
        &'b self,
        index: usize,
        ctx: &'b mut DispatchContext,
    ) -> BoxFuture<'b, CommandResult<()>> {
        Box::pin(async move {
            if self.cursor.load(Ordering::SeqCst) > index {
                return Err(CommandError::DoubleInvocation {
                    guard_index: index.saturating_sub(1),
                });
            }
            self.cursor.store(index + 1, Ordering::SeqCst);

            match self.guards.get(index) {
                Some(guard) => {
                    tracing::trace!("Entering guard {index}");
                    let next = Next {
                        chain: self,
                        index: index + 1,
                    };
                    guard.check(self.client, self.interaction, next, ctx).await
                }
                None => self.endpoint.call(ctx).await,
            }
        })
    }
}

/// Handle a guard uses to pass control to the rest of the chain.
pub struct Next<'a, C> {
    chain: &'a ChainRun<'a, C>,
    index: usize,
}

impl<C: Sync> Next<'_, C> {
    /// Run the remaining guards and the endpoint with `ctx`.
    ///
    /// Must be called at most once per guard.
    pub async fn run(&self, ctx: &mut DispatchContext) -> CommandResult<()> {
        self.chain.dispatch(self.index, ctx).await
    }
}

/// Guards composed into a single chain.
pub struct GuardChain<C> {
    guards: Vec<Arc<dyn Guard<C>>>,
}

/// Compose guards into a chain that runs them in declaration order.
pub fn compose<C>(guards: impl IntoIterator<Item = Arc<dyn Guard<C>>>) -> GuardChain<C> {
    GuardChain {
        guards: guards.into_iter().collect(),
    }
}

impl<C: Sync> GuardChain<C> {
    /// Run the chain, finishing with `endpoint` if no guard halts it.
    ///
    /// An empty chain runs the endpoint immediately. Errors from guards, the
    /// endpoint or a double `next` call are returned unchanged.
    pub async fn run(
        &self,
        client: &C,
        interaction: &dyn Interaction,
        endpoint: &dyn Endpoint,
        ctx: &mut DispatchContext,
    ) -> CommandResult<()> {
        let chain = ChainRun {
            guards: &self.guards,
            client,
            interaction,
            endpoint,
            cursor: AtomicUsize::new(0),
        };
        chain.dispatch(0, ctx).await
    }
}

impl<C> GuardChain<C> {
    pub fn len(&self) -> usize {
        self.guards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.guards.is_empty()
    }
}

/// Adapts an outer `Next` into the endpoint of a nested chain.
struct NextEndpoint<'a, C> {
    next: Next<'a, C>,
}

#[async_trait]
impl<C: Sync> Endpoint for NextEndpoint<'_, C> {
    async fn call(&self, ctx: &mut DispatchContext) -> CommandResult<()> {
        self.next.run(ctx).await
    }
}

/// A composed chain is itself a guard, so chains can be nested.
#[async_trait]
impl<C: Send + Sync> Guard<C> for GuardChain<C> {
    async fn check(
        &self,
        client: &C,
        interaction: &dyn Interaction,
        next: Next<'_, C>,
        ctx: &mut DispatchContext,
    ) -> CommandResult<()> {
        let endpoint = NextEndpoint { next };
        self.run(client, interaction, &endpoint, ctx).await
    }
}
