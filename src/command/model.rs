//! Command tree: leaf commands, groups and the handler trait.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use super::option::{Localizations, OptionSpec};
use crate::{
    context::DispatchContext,
    error::{CommandError, CommandResult},
    extract::Arguments,
    guard::Guard,
    interaction::Interaction,
};

/// Maximum length of a command, group or option name.
pub const MAX_NAME_LENGTH: usize = 32;

/// Maximum length of a description.
pub const MAX_DESCRIPTION_LENGTH: usize = 100;

/// Handler invoked once all guards of a command have passed.
#[async_trait]
pub trait CommandHandler: Send + Sync {
    /// Run the command with its extracted arguments and the context the
    /// guards accumulated.
    async fn handle(
        &self,
        interaction: &dyn Interaction,
        args: Arguments,
        ctx: &mut DispatchContext,
    ) -> CommandResult<()>;
}

pub(crate) fn validate_name(name: &str) -> CommandResult<()> {
    let invalid = |reason: &str| CommandError::InvalidName {
        name: name.to_string(),
        reason: reason.to_string(),
    };

    if name.is_empty() {
        return Err(invalid("name cannot be empty"));
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(invalid("name must be at most 32 characters"));
    }
    if name.chars().any(char::is_uppercase) {
        return Err(invalid("name must be lowercase"));
    }
    // Routing keys are space-joined paths.
    if name.chars().any(char::is_whitespace) {
        return Err(invalid("name cannot contain whitespace"));
    }
    Ok(())
}

pub(crate) fn validate_description(name: &str, description: &str) -> CommandResult<()> {
    let invalid = |reason: &str| CommandError::InvalidDescription {
        name: name.to_string(),
        reason: reason.to_string(),
    };

    if description.is_empty() {
        return Err(invalid("description cannot be empty"));
    }
    if description.chars().count() > MAX_DESCRIPTION_LENGTH {
        return Err(invalid("description must be at most 100 characters"));
    }
    Ok(())
}

/// A leaf slash command.
///
/// `C` is the platform client type handed to guards.
pub struct Command<C> {
    name: String,
    description: String,
    options: Vec<(String, OptionSpec)>,
    guards: Vec<Arc<dyn Guard<C>>>,
    handler: Arc<dyn CommandHandler>,
    name_localizations: Localizations,
    description_localizations: Localizations,
}

impl<C> Command<C> {
    /// Create a command with no options and no guards.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        handler: Arc<dyn CommandHandler>,
    ) -> CommandResult<Self> {
        let name = name.into();
        let description = description.into();
        validate_name(&name)?;
        validate_description(&name, &description)?;

        Ok(Self {
            name,
            description,
            options: Vec::new(),
            guards: Vec::new(),
            handler,
            name_localizations: Localizations::new(),
            description_localizations: Localizations::new(),
        })
    }

    /// Declare an option under the given argument key.
    ///
    /// Re-declaring a key replaces the earlier spec in place.
    pub fn with_option(mut self, key: impl Into<String>, spec: OptionSpec) -> Self {
        let key = key.into();
        match self.options.iter_mut().find(|(existing, _)| *existing == key) {
            Some(slot) => slot.1 = spec,
            None => self.options.push((key, spec)),
        }
        self
    }

    /// Append a guard to the end of the chain.
    pub fn with_guard(mut self, guard: Arc<dyn Guard<C>>) -> Self {
        self.guards.push(guard);
        self
    }

    /// Append several guards, preserving their order.
    pub fn with_guards(mut self, guards: impl IntoIterator<Item = Arc<dyn Guard<C>>>) -> Self {
        self.guards.extend(guards);
        self
    }

    pub fn with_name_localization(
        mut self,
        locale: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        self.name_localizations.insert(locale.into(), name.into());
        self
    }

    pub fn with_description_localization(
        mut self,
        locale: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        self.description_localizations
            .insert(locale.into(), description.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Option schema in declaration order.
    pub fn options(&self) -> &[(String, OptionSpec)] {
        &self.options
    }

    pub fn guards(&self) -> &[Arc<dyn Guard<C>>] {
        &self.guards
    }

    pub fn handler(&self) -> &Arc<dyn CommandHandler> {
        &self.handler
    }

    pub fn name_localizations(&self) -> &Localizations {
        &self.name_localizations
    }

    pub fn description_localizations(&self) -> &Localizations {
        &self.description_localizations
    }
}

impl<C> fmt::Debug for Command<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("options", &self.options)
            .field("guards", &self.guards.len())
            .finish_non_exhaustive()
    }
}

/// A named group of subcommands and nested groups.
pub struct Group<C> {
    name: String,
    description: String,
    commands: Vec<CommandNode<C>>,
    name_localizations: Localizations,
    description_localizations: Localizations,
}

impl<C> Group<C> {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        commands: impl IntoIterator<Item = CommandNode<C>>,
    ) -> CommandResult<Self> {
        let name = name.into();
        let description = description.into();
        validate_name(&name)?;
        validate_description(&name, &description)?;

        Ok(Self {
            name,
            description,
            commands: commands.into_iter().collect(),
            name_localizations: Localizations::new(),
            description_localizations: Localizations::new(),
        })
    }

    pub fn with_command(mut self, node: impl Into<CommandNode<C>>) -> Self {
        self.commands.push(node.into());
        self
    }

    pub fn with_name_localization(
        mut self,
        locale: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        self.name_localizations.insert(locale.into(), name.into());
        self
    }

    pub fn with_description_localization(
        mut self,
        locale: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        self.description_localizations
            .insert(locale.into(), description.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn commands(&self) -> &[CommandNode<C>] {
        &self.commands
    }

    pub fn name_localizations(&self) -> &Localizations {
        &self.name_localizations
    }

    pub fn description_localizations(&self) -> &Localizations {
        &self.description_localizations
    }
}

impl<C> fmt::Debug for Group<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Group")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("commands", &self.commands)
            .finish_non_exhaustive()
    }
}

/// One node of a declared command tree.
pub enum CommandNode<C> {
    Command(Arc<Command<C>>),
    Group(Group<C>),
}

impl<C> CommandNode<C> {
    pub fn name(&self) -> &str {
        match self {
            Self::Command(command) => command.name(),
            Self::Group(group) => group.name(),
        }
    }

    pub fn description(&self) -> &str {
        match self {
            Self::Command(command) => command.description(),
            Self::Group(group) => group.description(),
        }
    }
}

impl<C> fmt::Debug for CommandNode<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Command(command) => fmt::Debug::fmt(command.as_ref(), f),
            Self::Group(group) => fmt::Debug::fmt(group, f),
        }
    }
}

impl<C> From<Command<C>> for CommandNode<C> {
    fn from(command: Command<C>) -> Self {
        Self::Command(Arc::new(command))
    }
}

impl<C> From<Arc<Command<C>>> for CommandNode<C> {
    fn from(command: Arc<Command<C>>) -> Self {
        Self::Command(command)
    }
}

impl<C> From<Group<C>> for CommandNode<C> {
    fn from(group: Group<C>) -> Self {
        Self::Group(group)
    }
}
