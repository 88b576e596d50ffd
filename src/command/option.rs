//! Option schema types: option kinds, type-specific extras and choices.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::model::{validate_description, validate_name};
use crate::error::{CommandError, CommandResult};

/// Locale code to localized text.
pub type Localizations = BTreeMap<String, String>;

/// Maximum number of choices the platform accepts per option.
pub const MAX_CHOICES: usize = 25;

/// Wire-level option type.
///
/// `Subcommand` and `SubcommandGroup` only appear as structural nodes in
/// payloads and command bodies; they carry no argument value. `Unknown`
/// keeps codes this crate does not know about so they can be reported.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum OptionType {
    Subcommand,
    SubcommandGroup,
    String,
    Integer,
    Boolean,
    User,
    Channel,
    Role,
    Mentionable,
    Number,
    Attachment,
    Unknown(u8),
}

impl OptionType {
    /// Numeric code used on the wire.
    pub fn code(self) -> u8 {
        self.into()
    }

    /// Returns `true` if options of this type carry an argument value.
    pub fn is_value(self) -> bool {
        !matches!(
            self,
            Self::Subcommand | Self::SubcommandGroup | Self::Unknown(_)
        )
    }
}

impl From<u8> for OptionType {
    fn from(code: u8) -> Self {
        match code {
            1 => Self::Subcommand,
            2 => Self::SubcommandGroup,
            3 => Self::String,
            4 => Self::Integer,
            5 => Self::Boolean,
            6 => Self::User,
            7 => Self::Channel,
            8 => Self::Role,
            9 => Self::Mentionable,
            10 => Self::Number,
            11 => Self::Attachment,
            other => Self::Unknown(other),
        }
    }
}

impl From<OptionType> for u8 {
    fn from(kind: OptionType) -> Self {
        match kind {
            OptionType::Subcommand => 1,
            OptionType::SubcommandGroup => 2,
            OptionType::String => 3,
            OptionType::Integer => 4,
            OptionType::Boolean => 5,
            OptionType::User => 6,
            OptionType::Channel => 7,
            OptionType::Role => 8,
            OptionType::Mentionable => 9,
            OptionType::Number => 10,
            OptionType::Attachment => 11,
            OptionType::Unknown(code) => code,
        }
    }
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Subcommand => write!(f, "Subcommand"),
            Self::SubcommandGroup => write!(f, "SubcommandGroup"),
            Self::String => write!(f, "String"),
            Self::Integer => write!(f, "Integer"),
            Self::Boolean => write!(f, "Boolean"),
            Self::User => write!(f, "User"),
            Self::Channel => write!(f, "Channel"),
            Self::Role => write!(f, "Role"),
            Self::Mentionable => write!(f, "Mentionable"),
            Self::Number => write!(f, "Number"),
            Self::Attachment => write!(f, "Attachment"),
            Self::Unknown(code) => write!(f, "unknown type {code}"),
        }
    }
}

/// Platform channel subtypes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum ChannelType {
    GuildText,
    Dm,
    GuildVoice,
    GroupDm,
    GuildCategory,
    GuildAnnouncement,
    AnnouncementThread,
    PublicThread,
    PrivateThread,
    GuildStageVoice,
    GuildDirectory,
    GuildForum,
    GuildMedia,
    Unknown(u8),
}

impl ChannelType {
    /// Returns `true` if this subtype may be used to restrict a channel option.
    pub fn is_selectable(self) -> bool {
        !matches!(
            self,
            Self::Dm | Self::GroupDm | Self::GuildDirectory | Self::Unknown(_)
        )
    }
}

impl From<u8> for ChannelType {
    fn from(code: u8) -> Self {
        match code {
            0 => Self::GuildText,
            1 => Self::Dm,
            2 => Self::GuildVoice,
            3 => Self::GroupDm,
            4 => Self::GuildCategory,
            5 => Self::GuildAnnouncement,
            10 => Self::AnnouncementThread,
            11 => Self::PublicThread,
            12 => Self::PrivateThread,
            13 => Self::GuildStageVoice,
            14 => Self::GuildDirectory,
            15 => Self::GuildForum,
            16 => Self::GuildMedia,
            other => Self::Unknown(other),
        }
    }
}

impl From<ChannelType> for u8 {
    fn from(kind: ChannelType) -> Self {
        match kind {
            ChannelType::GuildText => 0,
            ChannelType::Dm => 1,
            ChannelType::GuildVoice => 2,
            ChannelType::GroupDm => 3,
            ChannelType::GuildCategory => 4,
            ChannelType::GuildAnnouncement => 5,
            ChannelType::AnnouncementThread => 10,
            ChannelType::PublicThread => 11,
            ChannelType::PrivateThread => 12,
            ChannelType::GuildStageVoice => 13,
            ChannelType::GuildDirectory => 14,
            ChannelType::GuildForum => 15,
            ChannelType::GuildMedia => 16,
            ChannelType::Unknown(code) => code,
        }
    }
}

/// A fixed value a user can pick for an option.
#[derive(Clone, Debug, PartialEq)]
pub struct Choice<T> {
    pub name: String,
    pub value: T,
    pub name_localizations: Localizations,
}

impl<T> Choice<T> {
    pub fn new(name: impl Into<String>, value: T) -> Self {
        Self {
            name: name.into(),
            value,
            name_localizations: Localizations::new(),
        }
    }

    pub fn with_name_localization(
        mut self,
        locale: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        self.name_localizations.insert(locale.into(), name.into());
        self
    }
}

/// Constraints for string options.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StringExtra {
    pub min_length: Option<u16>,
    pub max_length: Option<u16>,
    pub choices: Vec<Choice<String>>,
    pub autocomplete: bool,
}

/// Constraints for integer and number options.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NumericExtra<T> {
    pub min_value: Option<T>,
    pub max_value: Option<T>,
    pub choices: Vec<Choice<T>>,
    pub autocomplete: bool,
}

/// Constraints for channel options.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChannelExtra {
    pub channel_types: Vec<ChannelType>,
}

/// Type-specific constraints attached to an [`OptionSpec`].
#[derive(Clone, Debug, PartialEq)]
pub enum OptionExtra {
    String(StringExtra),
    Integer(NumericExtra<i64>),
    Number(NumericExtra<f64>),
    Channel(ChannelExtra),
}

impl OptionExtra {
    /// Option type this extra applies to.
    pub fn kind(&self) -> OptionType {
        match self {
            Self::String(_) => OptionType::String,
            Self::Integer(_) => OptionType::Integer,
            Self::Number(_) => OptionType::Number,
            Self::Channel(_) => OptionType::Channel,
        }
    }

    fn validate(&self, option_name: &str) -> CommandResult<()> {
        let invalid = |reason: String| CommandError::InvalidOption {
            name: option_name.to_string(),
            reason,
        };

        match self {
            Self::String(extra) => {
                if let (Some(min), Some(max)) = (extra.min_length, extra.max_length)
                    && min > max
                {
                    return Err(invalid(format!(
                        "min_length {min} is greater than max_length {max}"
                    )));
                }
                validate_choices(option_name, &extra.choices)
            }
            Self::Integer(extra) => {
                if let (Some(min), Some(max)) = (extra.min_value, extra.max_value)
                    && min > max
                {
                    return Err(invalid(format!(
                        "min_value {min} is greater than max_value {max}"
                    )));
                }
                validate_choices(option_name, &extra.choices)
            }
            Self::Number(extra) => {
                if let (Some(min), Some(max)) = (extra.min_value, extra.max_value)
                    && min > max
                {
                    return Err(invalid(format!(
                        "min_value {min} is greater than max_value {max}"
                    )));
                }
                validate_choices(option_name, &extra.choices)
            }
            Self::Channel(extra) => match extra
                .channel_types
                .iter()
                .find(|kind| !kind.is_selectable())
            {
                Some(kind) => Err(invalid(format!(
                    "channel type {} cannot restrict a channel option",
                    u8::from(*kind)
                ))),
                None => Ok(()),
            },
        }
    }
}

fn validate_choices<T>(option_name: &str, choices: &[Choice<T>]) -> CommandResult<()> {
    if choices.len() > MAX_CHOICES {
        return Err(CommandError::InvalidOption {
            name: option_name.to_string(),
            reason: format!("at most {MAX_CHOICES} choices are allowed"),
        });
    }
    for choice in choices {
        if choice.name.is_empty() || choice.name.chars().count() > 100 {
            return Err(CommandError::InvalidOption {
                name: option_name.to_string(),
                reason: format!("choice name '{}' must be 1-100 characters", choice.name),
            });
        }
    }
    Ok(())
}

/// Declared schema for one named, typed command argument.
#[derive(Clone, Debug, PartialEq)]
pub struct OptionSpec {
    name: String,
    description: String,
    kind: OptionType,
    required: bool,
    extra: Option<OptionExtra>,
    name_localizations: Localizations,
    description_localizations: Localizations,
}

impl OptionSpec {
    /// Create an optional option of the given type.
    ///
    /// The type itself is not checked here: a schema with a structural or
    /// unknown type is rejected when arguments are extracted.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        kind: OptionType,
    ) -> CommandResult<Self> {
        let name = name.into();
        let description = description.into();
        validate_name(&name)?;
        validate_description(&name, &description)?;

        Ok(Self {
            name,
            description,
            kind,
            required: false,
            extra: None,
            name_localizations: Localizations::new(),
            description_localizations: Localizations::new(),
        })
    }

    /// Mark the option as required (or not).
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Attach type-specific constraints.
    pub fn with_extra(mut self, extra: OptionExtra) -> CommandResult<Self> {
        if extra.kind() != self.kind {
            return Err(CommandError::InvalidOption {
                name: self.name,
                reason: format!(
                    "{} constraints cannot be applied to a {} option",
                    extra.kind(),
                    self.kind
                ),
            });
        }
        extra.validate(&self.name)?;
        self.extra = Some(extra);
        Ok(self)
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

    pub fn kind(&self) -> OptionType {
        self.kind
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn extra(&self) -> Option<&OptionExtra> {
        self.extra.as_ref()
    }

    pub fn name_localizations(&self) -> &Localizations {
        &self.name_localizations
    }

    pub fn description_localizations(&self) -> &Localizations {
        &self.description_localizations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_option_type_codes() {
        for code in 1..=11u8 {
            assert_eq!(OptionType::from(code).code(), code);
        }
        assert_eq!(OptionType::from(99), OptionType::Unknown(99));
        assert!(OptionType::User.is_value());
        assert!(!OptionType::Subcommand.is_value());
        assert!(!OptionType::Unknown(99).is_value());
    }

    #[test]
    fn test_option_type_deserializes_from_code() {
        let kind: OptionType = serde_json::from_str("6").unwrap();
        assert_eq!(kind, OptionType::User);
        assert_eq!(serde_json::to_string(&OptionType::Number).unwrap(), "10");
    }

    #[test]
    fn test_option_spec_defaults_to_optional() {
        let spec = OptionSpec::new("message", "Text to reply with", OptionType::String).unwrap();
        assert!(!spec.is_required());
        assert!(spec.extra().is_none());

        let spec = spec.required(true);
        assert!(spec.is_required());
    }

    #[test]
    fn test_option_spec_rejects_bad_name() {
        let err = OptionSpec::new("Message", "desc", OptionType::String).unwrap_err();
        assert!(matches!(err, CommandError::InvalidName { .. }));

        let err = OptionSpec::new("message", "", OptionType::String).unwrap_err();
        assert!(matches!(err, CommandError::InvalidDescription { .. }));
    }

    #[test]
    fn test_extra_must_match_kind() {
        let err = OptionSpec::new("count", "How many", OptionType::Integer)
            .unwrap()
            .with_extra(OptionExtra::String(StringExtra::default()))
            .unwrap_err();
        assert!(matches!(err, CommandError::InvalidOption { .. }));
    }

    #[test]
    fn test_extra_rejects_inverted_range() {
        let err = OptionSpec::new("count", "How many", OptionType::Integer)
            .unwrap()
            .with_extra(OptionExtra::Integer(NumericExtra {
                min_value: Some(10),
                max_value: Some(1),
                ..Default::default()
            }))
            .unwrap_err();
        assert!(err.to_string().contains("min_value 10"));
    }

    #[test]
    fn test_extra_rejects_too_many_choices() {
        let choices = (0..=MAX_CHOICES)
            .map(|i| Choice::new(format!("choice {i}"), i.to_string()))
            .collect();
        let err = OptionSpec::new("pick", "Pick one", OptionType::String)
            .unwrap()
            .with_extra(OptionExtra::String(StringExtra {
                choices,
                ..Default::default()
            }))
            .unwrap_err();
        assert!(matches!(err, CommandError::InvalidOption { .. }));
    }

    #[test]
    fn test_channel_extra_rejects_direct_messages() {
        let err = OptionSpec::new("where", "Target channel", OptionType::Channel)
            .unwrap()
            .with_extra(OptionExtra::Channel(ChannelExtra {
                channel_types: vec![ChannelType::GuildText, ChannelType::Dm],
            }))
            .unwrap_err();
        assert!(matches!(err, CommandError::InvalidOption { .. }));

        let spec = OptionSpec::new("where", "Target channel", OptionType::Channel)
            .unwrap()
            .with_extra(OptionExtra::Channel(ChannelExtra {
                channel_types: vec![ChannelType::GuildText, ChannelType::GuildVoice],
            }))
            .unwrap();
        assert!(spec.extra().is_some());
    }
}
