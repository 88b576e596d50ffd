//! Option extraction: declared schema + raw payload -> typed argument bag.

use std::collections::HashMap;

use crate::{
    command::{OptionSpec, OptionType},
    error::{CommandError, CommandResult},
    interaction::{Attachment, Channel, Mentionable, OptionSource, Role, User},
};

/// A typed argument value.
#[derive(Clone, Debug, PartialEq)]
pub enum OptionValue {
    String(String),
    Integer(i64),
    Number(f64),
    Boolean(bool),
    User(User),
    Channel(Channel),
    Role(Role),
    Mentionable(Mentionable),
    Attachment(Attachment),
}

impl OptionValue {
    /// Option type this value was extracted as.
    pub fn kind(&self) -> OptionType {
        match self {
            Self::String(_) => OptionType::String,
            Self::Integer(_) => OptionType::Integer,
            Self::Number(_) => OptionType::Number,
            Self::Boolean(_) => OptionType::Boolean,
            Self::User(_) => OptionType::User,
            Self::Channel(_) => OptionType::Channel,
            Self::Role(_) => OptionType::Role,
            Self::Mentionable(_) => OptionType::Mentionable,
            Self::Attachment(_) => OptionType::Attachment,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_user(&self) -> Option<&User> {
        match self {
            Self::User(user) => Some(user),
            _ => None,
        }
    }

    pub fn as_channel(&self) -> Option<&Channel> {
        match self {
            Self::Channel(channel) => Some(channel),
            _ => None,
        }
    }

    pub fn as_role(&self) -> Option<&Role> {
        match self {
            Self::Role(role) => Some(role),
            _ => None,
        }
    }

    pub fn as_mentionable(&self) -> Option<&Mentionable> {
        match self {
            Self::Mentionable(mentionable) => Some(mentionable),
            _ => None,
        }
    }

    pub fn as_attachment(&self) -> Option<&Attachment> {
        match self {
            Self::Attachment(attachment) => Some(attachment),
            _ => None,
        }
    }
}

/// Extracted arguments keyed by the argument keys of the command schema.
///
/// An optional option missing from the payload has no entry.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Arguments {
    values: HashMap<String, OptionValue>,
}

impl Arguments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: OptionValue) -> Option<OptionValue> {
        self.values.insert(key.into(), value)
    }

    pub fn get(&self, key: &str) -> Option<&OptionValue> {
        self.values.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn string(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(OptionValue::as_str)
    }

    pub fn integer(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(OptionValue::as_i64)
    }

    pub fn number(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(OptionValue::as_f64)
    }

    pub fn boolean(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(OptionValue::as_bool)
    }

    pub fn user(&self, key: &str) -> Option<&User> {
        self.get(key).and_then(OptionValue::as_user)
    }

    pub fn channel(&self, key: &str) -> Option<&Channel> {
        self.get(key).and_then(OptionValue::as_channel)
    }

    pub fn role(&self, key: &str) -> Option<&Role> {
        self.get(key).and_then(OptionValue::as_role)
    }

    pub fn mentionable(&self, key: &str) -> Option<&Mentionable> {
        self.get(key).and_then(OptionValue::as_mentionable)
    }

    pub fn attachment(&self, key: &str) -> Option<&Attachment> {
        self.get(key).and_then(OptionValue::as_attachment)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
        self.values.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

fn read_value(source: &dyn OptionSource, spec: &OptionSpec) -> CommandResult<Option<OptionValue>> {
    let name = spec.name();
    let value = match spec.kind() {
        OptionType::String => source.string(name)?.map(OptionValue::String),
        OptionType::Integer => source.integer(name)?.map(OptionValue::Integer),
        OptionType::Number => source.number(name)?.map(OptionValue::Number),
        OptionType::Boolean => source.boolean(name)?.map(OptionValue::Boolean),
        OptionType::User => source.user(name)?.map(OptionValue::User),
        OptionType::Channel => source.channel(name)?.map(OptionValue::Channel),
        OptionType::Role => source.role(name)?.map(OptionValue::Role),
        OptionType::Mentionable => source.mentionable(name)?.map(OptionValue::Mentionable),
        OptionType::Attachment => source.attachment(name)?.map(OptionValue::Attachment),
        kind @ (OptionType::Subcommand | OptionType::SubcommandGroup | OptionType::Unknown(_)) => {
            return Err(CommandError::UnsupportedOptionType(kind));
        }
    };
    Ok(value)
}

/// Extract typed arguments for `schema` from `source`.
///
/// Values are read by each option's platform name and stored under its
/// argument key. Nothing is returned on error, so callers never see a
/// partially populated bag.
pub fn extract_options(
    source: &dyn OptionSource,
    schema: &[(String, OptionSpec)],
) -> CommandResult<Arguments> {
    let mut args = Arguments::new();
    for (key, spec) in schema {
        match read_value(source, spec)? {
            Some(value) => {
                args.insert(key.clone(), value);
            }
            None if spec.is_required() => {
                return Err(CommandError::MissingRequiredOption(spec.name().to_string()));
            }
            None => {}
        }
    }
    Ok(args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::ChannelType;
    use crate::interaction::{InteractionData, Member};
    use serde_json::json;

    fn spec(name: &str, kind: OptionType) -> OptionSpec {
        OptionSpec::new(name, "An option", kind).unwrap()
    }

    fn payload() -> InteractionData {
        InteractionData::from_value(json!({
            "name": "everything",
            "options": [
                { "name": "text", "type": 3, "value": "hello" },
                { "name": "count", "type": 4, "value": 7 },
                { "name": "ratio", "type": 10, "value": 0.5 },
                { "name": "flag", "type": 5, "value": true },
                { "name": "who", "type": 6, "value": "U1" },
                { "name": "where", "type": 7, "value": "C1" },
                { "name": "rank", "type": 8, "value": "R1" },
                { "name": "ping", "type": 9, "value": "U1" },
                { "name": "file", "type": 11, "value": "A1" }
            ],
            "resolved": {
                "users": { "U1": { "id": "U1", "username": "alice" } },
                "members": { "U1": { "nick": "al", "roles": ["R1"] } },
                "roles": { "R1": { "id": "R1", "name": "mods" } },
                "channels": { "C1": { "id": "C1", "name": "general", "type": 0 } },
                "attachments": { "A1": { "id": "A1", "filename": "log.txt" } }
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_extract_every_supported_type() {
        let data = payload();
        let schema = vec![
            ("message".to_string(), spec("text", OptionType::String)),
            ("count".to_string(), spec("count", OptionType::Integer)),
            ("ratio".to_string(), spec("ratio", OptionType::Number)),
            ("flag".to_string(), spec("flag", OptionType::Boolean)),
            ("who".to_string(), spec("who", OptionType::User)),
            ("where".to_string(), spec("where", OptionType::Channel)),
            ("rank".to_string(), spec("rank", OptionType::Role)),
            ("ping".to_string(), spec("ping", OptionType::Mentionable)),
            ("file".to_string(), spec("file", OptionType::Attachment)),
        ];

        let args = extract_options(&data, &schema).unwrap();
        assert_eq!(args.len(), schema.len());

        // Stored under the argument key, read by the option name.
        assert_eq!(args.string("message"), data.string("text").unwrap().as_deref());
        assert_eq!(args.integer("count"), Some(7));
        assert_eq!(args.number("ratio"), Some(0.5));
        assert_eq!(args.boolean("flag"), Some(true));
        assert_eq!(args.user("who"), data.user("who").unwrap().as_ref());
        assert_eq!(args.channel("where").unwrap().kind, ChannelType::GuildText);
        assert_eq!(args.role("rank").unwrap().name, "mods");
        assert_eq!(
            args.mentionable("ping"),
            Some(&Mentionable::Member(
                data.resolved.users["U1"].clone(),
                Member {
                    nick: Some("al".to_string()),
                    roles: vec!["R1".to_string()],
                }
            ))
        );
        assert_eq!(args.attachment("file").unwrap().filename, "log.txt");
    }

    #[test]
    fn test_optional_missing_is_absent() {
        let data = payload();
        let schema = vec![("reason".to_string(), spec("reason", OptionType::String))];

        let args = extract_options(&data, &schema).unwrap();
        assert!(args.is_empty());
        assert!(!args.contains_key("reason"));
    }

    #[test]
    fn test_required_missing_fails() {
        let data = payload();
        let schema = vec![(
            "reason".to_string(),
            spec("reason", OptionType::String).required(true),
        )];

        let err = extract_options(&data, &schema).unwrap_err();
        assert!(matches!(err, CommandError::MissingRequiredOption(ref name) if name == "reason"));
    }

    #[test]
    fn test_unsupported_type_fails_without_partial_bag() {
        let data = payload();
        let schema = vec![
            ("message".to_string(), spec("text", OptionType::String)),
            ("weird".to_string(), spec("weird", OptionType::Unknown(42))),
        ];

        let err = extract_options(&data, &schema).unwrap_err();
        assert!(matches!(
            err,
            CommandError::UnsupportedOptionType(OptionType::Unknown(42))
        ));
        assert!(err.to_string().contains("42"));
    }

    #[test]
    fn test_structural_type_is_unsupported() {
        let data = payload();
        let schema = vec![("sub".to_string(), spec("sub", OptionType::Subcommand))];

        let err = extract_options(&data, &schema).unwrap_err();
        assert!(matches!(
            err,
            CommandError::UnsupportedOptionType(OptionType::Subcommand)
        ));
    }

    #[test]
    fn test_type_mismatch_propagates() {
        let data = payload();
        let schema = vec![("count".to_string(), spec("text", OptionType::Integer))];

        let err = extract_options(&data, &schema).unwrap_err();
        assert!(matches!(err, CommandError::OptionTypeMismatch { .. }));
    }

    #[test]
    fn test_value_accessors_reject_other_kinds() {
        let value = OptionValue::Integer(3);
        assert_eq!(value.kind(), OptionType::Integer);
        assert_eq!(value.as_i64(), Some(3));
        assert!(value.as_str().is_none());
        assert!(value.as_f64().is_none());
    }
}
