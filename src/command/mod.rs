//! Command tree model.
//!
//! - **Model**: leaf commands, groups and the handler trait
//! - **Option**: option types, extras and choices

pub mod model;
pub mod option;

pub use model::{
    Command, CommandHandler, CommandNode, Group, MAX_DESCRIPTION_LENGTH, MAX_NAME_LENGTH,
};
pub use option::{
    ChannelExtra, ChannelType, Choice, Localizations, NumericExtra, OptionExtra, OptionSpec,
    OptionType, StringExtra,
};
