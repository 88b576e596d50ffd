//! Flattened command registry.
//!
//! The declared tree is flattened into a map from routing key to leaf command.
//! A routing key is the space-joined path from the root to the leaf, e.g.
//! `"admin user ban"`.

use std::collections::HashMap;
use std::sync::Arc;

use crate::{
    command::{Command, CommandNode},
    error::{CommandError, CommandResult},
};

/// Join path segments into a routing key, skipping empty segments.
pub fn routing_key<'a>(segments: impl IntoIterator<Item = &'a str>) -> String {
    segments
        .into_iter()
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Map from routing key to leaf command.
pub struct CommandRegistry<C> {
    commands: HashMap<String, Arc<Command<C>>>,
}

impl<C> Default for CommandRegistry<C> {
    fn default() -> Self {
        Self {
            commands: HashMap::new(),
        }
    }
}

impl<C> Clone for CommandRegistry<C> {
    fn clone(&self) -> Self {
        Self {
            commands: self.commands.clone(),
        }
    }
}

impl<C> std::fmt::Debug for CommandRegistry<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut keys: Vec<&str> = self.keys().collect();
        keys.sort_unstable();
        f.debug_struct("CommandRegistry")
            .field("commands", &keys)
            .finish()
    }
}

impl<C> CommandRegistry<C> {
    /// Flatten a command tree, failing on the first duplicate routing key.
    pub fn flatten(tree: &[CommandNode<C>]) -> CommandResult<Self> {
        let mut registry = Self::default();
        let mut path = Vec::new();
        for node in tree {
            registry.visit(node, &mut path)?;
        }
        tracing::info!("Flattened {} commands", registry.len());
        Ok(registry)
    }

    fn visit<'t>(
        &mut self,
        node: &'t CommandNode<C>,
        path: &mut Vec<&'t str>,
    ) -> CommandResult<()> {
        match node {
            CommandNode::Command(command) => {
                let key = routing_key(path.iter().copied().chain([command.name()]));
                if self.commands.contains_key(&key) {
                    return Err(CommandError::DuplicateCommand(key));
                }
                tracing::debug!("Registered command: {key}");
                self.commands.insert(key, Arc::clone(command));
            }
            CommandNode::Group(group) => {
                path.push(group.name());
                for child in group.commands() {
                    self.visit(child, path)?;
                }
                path.pop();
            }
        }
        Ok(())
    }

    /// Look up a leaf command by routing key.
    pub fn get(&self, key: &str) -> Option<&Arc<Command<C>>> {
        self.commands.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.commands.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.commands.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<Command<C>>)> {
        self.commands.iter().map(|(key, command)| (key.as_str(), command))
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// Flatten a command tree into a registry.
pub fn flatten<C>(tree: &[CommandNode<C>]) -> CommandResult<CommandRegistry<C>> {
    CommandRegistry::flatten(tree)
}
