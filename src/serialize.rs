//! Command tree -> registration API bodies.
//!
//! The platform accepts at most two levels of nesting under a root command:
//! `group -> subgroup -> command`. Anything deeper is rejected here rather
//! than in the tree model.

use serde::Serialize;
use serde_json::{Value, json};

use crate::{
    command::{
        ChannelType, Choice, Command, CommandNode, Group, Localizations, OptionExtra, OptionSpec,
        OptionType,
    },
    error::{CommandError, CommandResult},
    registry::routing_key,
};

/// Body of one root command as sent to the registration API.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ApplicationCommandBody {
    pub name: String,
    pub description: String,
    #[serde(skip_serializing_if = "Localizations::is_empty")]
    pub name_localizations: Localizations,
    #[serde(skip_serializing_if = "Localizations::is_empty")]
    pub description_localizations: Localizations,
    pub options: Vec<OptionBody>,
}

/// One entry of a command body's `options` array.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OptionBody {
    #[serde(rename = "type")]
    pub kind: OptionType,
    pub name: String,
    pub description: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,
    #[serde(skip_serializing_if = "Localizations::is_empty")]
    pub name_localizations: Localizations,
    #[serde(skip_serializing_if = "Localizations::is_empty")]
    pub description_localizations: Localizations,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_value: Option<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub autocomplete: Option<bool>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub channel_types: Vec<ChannelType>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<OptionBody>,
}

impl OptionBody {
    fn structural(kind: OptionType, name: &str, description: &str) -> Self {
        Self {
            kind,
            name: name.to_string(),
            description: description.to_string(),
            required: false,
            name_localizations: Localizations::new(),
            description_localizations: Localizations::new(),
            min_length: None,
            max_length: None,
            min_value: None,
            max_value: None,
            choices: Vec::new(),
            autocomplete: None,
            channel_types: Vec::new(),
            options: Vec::new(),
        }
    }
}

fn choice_body<T: Serialize>(choice: &Choice<T>) -> Value {
    let mut body = json!({ "name": choice.name, "value": choice.value });
    if !choice.name_localizations.is_empty() {
        body["name_localizations"] = json!(choice.name_localizations);
    }
    body
}

/// Autocomplete is only offered when there are no fixed choices.
fn autocomplete(enabled: bool, choices: &[Value]) -> Option<bool> {
    (enabled && choices.is_empty()).then_some(true)
}

/// Serialize one option declaration.
pub fn option_body(spec: &OptionSpec) -> OptionBody {
    let mut body = OptionBody::structural(spec.kind(), spec.name(), spec.description());
    body.required = spec.is_required();
    body.name_localizations = spec.name_localizations().clone();
    body.description_localizations = spec.description_localizations().clone();

    match spec.extra() {
        Some(OptionExtra::String(extra)) => {
            body.min_length = extra.min_length;
            body.max_length = extra.max_length;
            body.choices = extra.choices.iter().map(choice_body).collect();
            body.autocomplete = autocomplete(extra.autocomplete, &body.choices);
        }
        Some(OptionExtra::Integer(extra)) => {
            body.min_value = extra.min_value.map(Value::from);
            body.max_value = extra.max_value.map(Value::from);
            body.choices = extra.choices.iter().map(choice_body).collect();
            body.autocomplete = autocomplete(extra.autocomplete, &body.choices);
        }
        Some(OptionExtra::Number(extra)) => {
            body.min_value = extra.min_value.map(Value::from);
            body.max_value = extra.max_value.map(Value::from);
            body.choices = extra.choices.iter().map(choice_body).collect();
            body.autocomplete = autocomplete(extra.autocomplete, &body.choices);
        }
        Some(OptionExtra::Channel(extra)) => {
            body.channel_types = extra.channel_types.clone();
        }
        None => {}
    }
    body
}

fn subcommand_body<C>(command: &Command<C>) -> OptionBody {
    let mut body = OptionBody::structural(
        OptionType::Subcommand,
        command.name(),
        command.description(),
    );
    body.name_localizations = command.name_localizations().clone();
    body.description_localizations = command.description_localizations().clone();
    body.options = command
        .options()
        .iter()
        .map(|(_, spec)| option_body(spec))
        .collect();
    body
}

fn subcommand_group_body<C>(root: &str, group: &Group<C>) -> CommandResult<OptionBody> {
    let mut body = OptionBody::structural(
        OptionType::SubcommandGroup,
        group.name(),
        group.description(),
    );
    body.name_localizations = group.name_localizations().clone();
    body.description_localizations = group.description_localizations().clone();

    for child in group.commands() {
        match child {
            CommandNode::Command(command) => body.options.push(subcommand_body(command)),
            CommandNode::Group(nested) => {
                return Err(CommandError::NestingTooDeep(routing_key([
                    root,
                    group.name(),
                    nested.name(),
                ])));
            }
        }
    }
    Ok(body)
}

/// Serialize one root node of the command tree.
pub fn build_command_body<C>(root: &CommandNode<C>) -> CommandResult<ApplicationCommandBody> {
    let body = match root {
        CommandNode::Command(command) => ApplicationCommandBody {
            name: command.name().to_string(),
            description: command.description().to_string(),
            name_localizations: command.name_localizations().clone(),
            description_localizations: command.description_localizations().clone(),
            options: command
                .options()
                .iter()
                .map(|(_, spec)| option_body(spec))
                .collect(),
        },
        CommandNode::Group(group) => {
            let mut options = Vec::with_capacity(group.commands().len());
            for child in group.commands() {
                options.push(match child {
                    CommandNode::Command(command) => subcommand_body(command),
                    CommandNode::Group(subgroup) => {
                        subcommand_group_body(group.name(), subgroup)?
                    }
                });
            }
            ApplicationCommandBody {
                name: group.name().to_string(),
                description: group.description().to_string(),
                name_localizations: group.name_localizations().clone(),
                description_localizations: group.description_localizations().clone(),
                options,
            }
        }
    };
    Ok(body)
}

/// Serialize every root node, in declaration order.
pub fn build_command_bodies<C>(
    roots: &[CommandNode<C>],
) -> CommandResult<Vec<ApplicationCommandBody>> {
    let bodies = roots
        .iter()
        .map(build_command_body)
        .collect::<CommandResult<Vec<_>>>()?;
    tracing::info!("Built {} application command bodies", bodies.len());
    Ok(bodies)
}
