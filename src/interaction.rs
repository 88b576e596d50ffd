//! Raw interaction contract consumed by the dispatcher.
//!
//! A transport hands the dispatcher something implementing [`Interaction`]:
//! the routing triple `(command, group?, subcommand?)` plus an
//! [`OptionSource`] exposing one typed accessor per option type.
//! [`InteractionData`] is a ready-made implementation over the platform's
//! JSON payload.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    command::{ChannelType, OptionType},
    error::{CommandError, CommandResult},
    registry::routing_key,
};

/// A platform user.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub global_name: Option<String>,
    #[serde(default)]
    pub bot: bool,
}

/// Guild-specific data for a user.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    #[serde(default)]
    pub nick: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
}

/// A guild role.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// A channel.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: ChannelType,
}

/// An uploaded file.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: String,
    pub filename: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub content_type: Option<String>,
}

/// Value of a mentionable option.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Mentionable {
    User(User),
    Member(User, Member),
    Role(Role),
}

/// Typed accessors over the options of one interaction.
///
/// Each accessor returns `Ok(None)` when the option is absent and an error
/// when it is present with an incompatible value.
pub trait OptionSource: Send + Sync {
    fn string(&self, name: &str) -> CommandResult<Option<String>>;
    fn integer(&self, name: &str) -> CommandResult<Option<i64>>;
    fn number(&self, name: &str) -> CommandResult<Option<f64>>;
    fn boolean(&self, name: &str) -> CommandResult<Option<bool>>;
    fn user(&self, name: &str) -> CommandResult<Option<User>>;
    fn channel(&self, name: &str) -> CommandResult<Option<Channel>>;
    fn role(&self, name: &str) -> CommandResult<Option<Role>>;
    fn mentionable(&self, name: &str) -> CommandResult<Option<Mentionable>>;
    fn attachment(&self, name: &str) -> CommandResult<Option<Attachment>>;
}

/// An incoming command interaction.
pub trait Interaction: Send + Sync {
    /// Top-level command name.
    fn command_name(&self) -> &str;

    /// Subcommand group name, if the invoked command lives in one.
    fn subcommand_group(&self) -> Option<&str>;

    /// Subcommand name, if the top-level command is a group.
    fn subcommand(&self) -> Option<&str>;

    /// Accessors for the invoked command's own options.
    fn options(&self) -> &dyn OptionSource;

    /// Platform interaction id, used for logging.
    fn id(&self) -> Option<&str> {
        None
    }

    /// User who invoked the command.
    fn caller(&self) -> Option<&User> {
        None
    }

    /// Routing key for this interaction.
    fn routing_key(&self) -> String {
        routing_key([
            self.command_name(),
            self.subcommand_group().unwrap_or_default(),
            self.subcommand().unwrap_or_default(),
        ])
    }
}

/// One option of a raw interaction payload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawOption {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: OptionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<RawOption>,
}

/// Entities referenced by id from option values.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ResolvedData {
    #[serde(default)]
    pub users: HashMap<String, User>,
    #[serde(default)]
    pub members: HashMap<String, Member>,
    #[serde(default)]
    pub roles: HashMap<String, Role>,
    #[serde(default)]
    pub channels: HashMap<String, Channel>,
    #[serde(default)]
    pub attachments: HashMap<String, Attachment>,
}

/// JSON-backed command interaction.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct InteractionData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
    #[serde(default)]
    pub options: Vec<RawOption>,
    #[serde(default)]
    pub resolved: ResolvedData,
}

impl InteractionData {
    pub fn from_json(json: &str) -> CommandResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_value(value: Value) -> CommandResult<Self> {
        Ok(serde_json::from_value(value)?)
    }

    fn group_option(&self) -> Option<&RawOption> {
        self.options
            .first()
            .filter(|opt| opt.kind == OptionType::SubcommandGroup)
    }

    fn subcommand_option(&self) -> Option<&RawOption> {
        let siblings = match self.group_option() {
            Some(group) => &group.options,
            None => &self.options,
        };
        siblings
            .first()
            .filter(|opt| opt.kind == OptionType::Subcommand)
    }

    /// Options of the invoked leaf command.
    pub fn leaf_options(&self) -> &[RawOption] {
        match self.subcommand_option() {
            Some(sub) => &sub.options,
            None => &self.options,
        }
    }

    fn find(&self, name: &str) -> Option<&RawOption> {
        self.leaf_options().iter().find(|opt| opt.name == name)
    }

    fn typed<T>(
        &self,
        name: &str,
        expected: OptionType,
        convert: impl FnOnce(&Value) -> Option<T>,
    ) -> CommandResult<Option<T>> {
        let Some(option) = self.find(name) else {
            return Ok(None);
        };
        let mismatch = || CommandError::OptionTypeMismatch {
            name: name.to_string(),
            expected,
        };
        if option.kind != expected {
            return Err(mismatch());
        }
        match option.value.as_ref() {
            None | Some(Value::Null) => Ok(None),
            Some(value) => convert(value).map(Some).ok_or_else(mismatch),
        }
    }

    fn entity<T>(
        &self,
        name: &str,
        expected: OptionType,
        resolve: impl FnOnce(&ResolvedData, &str) -> Option<T>,
    ) -> CommandResult<Option<T>> {
        let Some(id) = self.typed(name, expected, |v| v.as_str().map(str::to_owned))? else {
            return Ok(None);
        };
        resolve(&self.resolved, &id)
            .map(Some)
            .ok_or_else(|| CommandError::UnresolvedEntity {
                name: name.to_string(),
                id,
            })
    }
}

impl OptionSource for InteractionData {
    fn string(&self, name: &str) -> CommandResult<Option<String>> {
        self.typed(name, OptionType::String, |v| v.as_str().map(str::to_owned))
    }

    fn integer(&self, name: &str) -> CommandResult<Option<i64>> {
        self.typed(name, OptionType::Integer, Value::as_i64)
    }

    fn number(&self, name: &str) -> CommandResult<Option<f64>> {
        self.typed(name, OptionType::Number, Value::as_f64)
    }

    fn boolean(&self, name: &str) -> CommandResult<Option<bool>> {
        self.typed(name, OptionType::Boolean, Value::as_bool)
    }

    fn user(&self, name: &str) -> CommandResult<Option<User>> {
        self.entity(name, OptionType::User, |resolved, id| {
            resolved.users.get(id).cloned()
        })
    }

    fn channel(&self, name: &str) -> CommandResult<Option<Channel>> {
        self.entity(name, OptionType::Channel, |resolved, id| {
            resolved.channels.get(id).cloned()
        })
    }

    fn role(&self, name: &str) -> CommandResult<Option<Role>> {
        self.entity(name, OptionType::Role, |resolved, id| {
            resolved.roles.get(id).cloned()
        })
    }

    fn mentionable(&self, name: &str) -> CommandResult<Option<Mentionable>> {
        self.entity(name, OptionType::Mentionable, |resolved, id| {
            if let Some(user) = resolved.users.get(id) {
                return Some(match resolved.members.get(id) {
                    Some(member) => Mentionable::Member(user.clone(), member.clone()),
                    None => Mentionable::User(user.clone()),
                });
            }
            resolved.roles.get(id).cloned().map(Mentionable::Role)
        })
    }

    fn attachment(&self, name: &str) -> CommandResult<Option<Attachment>> {
        self.entity(name, OptionType::Attachment, |resolved, id| {
            resolved.attachments.get(id).cloned()
        })
    }
}

impl Interaction for InteractionData {
    fn command_name(&self) -> &str {
        &self.name
    }

    fn subcommand_group(&self) -> Option<&str> {
        self.group_option().map(|opt| opt.name.as_str())
    }

    fn subcommand(&self) -> Option<&str> {
        self.subcommand_option().map(|opt| opt.name.as_str())
    }

    fn options(&self) -> &dyn OptionSource {
        self
    }

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn caller(&self) -> Option<&User> {
        self.user.as_ref()
    }
}
