//! Declarative schema: options, positional arguments and commands.

use crate::context::Handler;
use crate::convert::Converter;
use crate::value::Value;

/// One or many names (aliases, short names), normalized to a list once at
/// construction time.
pub trait Names {
    fn into_names(self) -> Vec<String>;
}

impl Names for &str {
    fn into_names(self) -> Vec<String> {
        vec![self.to_string()]
    }
}

impl Names for String {
    fn into_names(self) -> Vec<String> {
        vec![self]
    }
}

impl Names for char {
    fn into_names(self) -> Vec<String> {
        vec![self.to_string()]
    }
}

impl Names for &[&str] {
    fn into_names(self) -> Vec<String> {
        self.iter().map(|s| s.to_string()).collect()
    }
}

impl<const N: usize> Names for [&str; N] {
    fn into_names(self) -> Vec<String> {
        self.into_iter().map(str::to_string).collect()
    }
}

impl Names for Vec<String> {
    fn into_names(self) -> Vec<String> {
        self
    }
}

/// A named flag.
#[derive(Debug, Clone)]
pub struct OptionDef {
    pub(crate) name: String,
    pub(crate) converter: Converter,
    pub(crate) default: Option<Value>,
    pub(crate) aliases: Vec<String>,
    pub(crate) short: Vec<String>,
    pub(crate) description: Option<String>,
    pub(crate) required: bool,
    pub(crate) hidden: bool,
    pub(crate) hidden_name: bool,
    pub(crate) no_negation: bool,
}

impl OptionDef {
    pub fn new(name: impl Into<String>, converter: Converter) -> Self {
        Self {
            name: name.into(),
            converter,
            default: None,
            aliases: Vec::new(),
            short: Vec::new(),
            description: None,
            required: false,
            hidden: false,
            hidden_name: false,
            no_negation: false,
        }
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, Converter::string())
    }

    pub fn number(name: impl Into<String>) -> Self {
        Self::new(name, Converter::number())
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, Converter::boolean())
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Additional long names.
    pub fn alias(mut self, names: impl Names) -> Self {
        self.aliases.extend(names.into_names());
        self
    }

    /// Single-character names, matched as `-x`.
    pub fn short(mut self, names: impl Names) -> Self {
        self.short.extend(names.into_names());
        self
    }

    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    /// Marks the option as required in help output.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// No command-line tokens at all; omitted from help. The default still
    /// lands in the config.
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Suppress `--<name>` itself; aliases and short names still match.
    pub fn hidden_name(mut self) -> Self {
        self.hidden_name = true;
        self
    }

    /// Do not generate `--no-<name>` forms.
    pub fn no_negation(mut self) -> Self {
        self.no_negation = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn converter(&self) -> &Converter {
        &self.converter
    }

    pub fn default(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    pub fn shorts(&self) -> &[String] {
        &self.short
    }

    pub fn help(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn is_name_hidden(&self) -> bool {
        self.hidden_name
    }

    pub fn is_negatable(&self) -> bool {
        !self.no_negation
    }
}

/// A positional slot, identified by its index in the schema.
#[derive(Debug, Clone)]
pub struct ArgumentDef {
    pub(crate) converter: Converter,
    pub(crate) name: Option<String>,
    pub(crate) default: Option<Value>,
    pub(crate) description: Option<String>,
    pub(crate) required: bool,
}

impl ArgumentDef {
    pub fn new(converter: Converter) -> Self {
        Self {
            converter,
            name: None,
            default: None,
            description: None,
            required: false,
        }
    }

    pub fn string() -> Self {
        Self::new(Converter::string())
    }

    pub fn number() -> Self {
        Self::new(Converter::number())
    }

    /// Name shown in help; has no effect on matching.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn converter(&self) -> &Converter {
        &self.converter
    }

    pub fn default(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn help(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn is_required(&self) -> bool {
        self.required
    }
}

/// Matching data common to every command kind.
#[derive(Debug, Clone, Default)]
pub struct CommandInfo {
    pub(crate) name: String,
    pub(crate) aliases: Vec<String>,
    pub(crate) short: Vec<String>,
    pub(crate) description: Option<String>,
    pub(crate) as_flag: bool,
}

impl CommandInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn alias(mut self, names: impl Names) -> Self {
        self.aliases.extend(names.into_names());
        self
    }

    pub fn short(mut self, names: impl Names) -> Self {
        self.short.extend(names.into_names());
        self
    }

    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    /// Match only as `--name` / `-x` instead of a bare word.
    pub fn as_flag(mut self) -> Self {
        self.as_flag = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// A command that runs against its parent's parser and schema.
#[derive(Debug, Clone)]
pub struct SharedCommand {
    pub(crate) info: CommandInfo,
    pub(crate) handler: Handler,
    pub(crate) commands: Vec<CommandDef>,
}

impl SharedCommand {
    pub fn new(name: impl Into<String>, handler: Handler) -> Self {
        Self::with_info(CommandInfo::new(name), handler)
    }

    pub fn with_info(info: CommandInfo, handler: Handler) -> Self {
        Self {
            info,
            handler,
            commands: Vec::new(),
        }
    }

    pub fn alias(mut self, names: impl Names) -> Self {
        self.info = self.info.alias(names);
        self
    }

    pub fn short(mut self, names: impl Names) -> Self {
        self.info = self.info.short(names);
        self
    }

    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.info = self.info.description(text);
        self
    }

    pub fn as_flag(mut self) -> Self {
        self.info = self.info.as_flag();
        self
    }

    /// A nested command, valid only right after this one.
    pub fn command(mut self, command: impl Into<CommandDef>) -> Self {
        self.commands.push(command.into());
        self
    }
}

/// A command with its own schema and its own parser instance.
#[derive(Debug, Clone)]
pub struct IsolatedCommand {
    pub(crate) info: CommandInfo,
    pub(crate) schema: Schema,
}

impl IsolatedCommand {
    /// The command is matched by the schema's name.
    pub fn new(schema: Schema) -> Self {
        let mut info = CommandInfo::new(schema.name.clone());
        info.description = schema.description.clone();
        Self { info, schema }
    }

    pub fn alias(mut self, names: impl Names) -> Self {
        self.info = self.info.alias(names);
        self
    }

    pub fn short(mut self, names: impl Names) -> Self {
        self.info = self.info.short(names);
        self
    }

    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.info = self.info.description(text);
        self
    }

    pub fn as_flag(mut self) -> Self {
        self.info = self.info.as_flag();
        self
    }
}

#[derive(Debug, Clone)]
pub enum CommandDef {
    Shared(SharedCommand),
    Isolated(IsolatedCommand),
}

impl CommandDef {
    pub fn info(&self) -> &CommandInfo {
        match self {
            Self::Shared(c) => &c.info,
            Self::Isolated(c) => &c.info,
        }
    }

    pub fn name(&self) -> &str {
        &self.info().name
    }
}

impl From<SharedCommand> for CommandDef {
    fn from(c: SharedCommand) -> Self {
        Self::Shared(c)
    }
}

impl From<IsolatedCommand> for CommandDef {
    fn from(c: IsolatedCommand) -> Self {
        Self::Isolated(c)
    }
}

impl From<Schema> for CommandDef {
    fn from(schema: Schema) -> Self {
        Self::Isolated(IsolatedCommand::new(schema))
    }
}

/// Registration of a builtin command (`help`, `version`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Builtin {
    #[default]
    Enabled,
    Disabled,
}

/// Everything one parser instance is built from.
#[derive(Debug, Clone)]
pub struct Schema {
    pub(crate) name: String,
    pub(crate) description: Option<String>,
    pub(crate) arguments: Vec<ArgumentDef>,
    pub(crate) options: Vec<OptionDef>,
    pub(crate) commands: Vec<CommandDef>,
    pub(crate) handler: Option<Handler>,
    pub(crate) help: Builtin,
    pub(crate) version: Builtin,
}

impl Schema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            arguments: Vec::new(),
            options: Vec::new(),
            commands: Vec::new(),
            handler: None,
            help: Builtin::Enabled,
            version: Builtin::Enabled,
        }
    }

    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    /// The next positional slot.
    pub fn argument(mut self, argument: ArgumentDef) -> Self {
        self.arguments.push(argument);
        self
    }

    pub fn option(mut self, option: OptionDef) -> Self {
        self.options.push(option);
        self
    }

    pub fn command(mut self, command: impl Into<CommandDef>) -> Self {
        self.commands.push(command.into());
        self
    }

    /// Runs when no command matched.
    pub fn handler(mut self, handler: Handler) -> Self {
        self.handler = Some(handler);
        self
    }

    pub fn help(mut self, builtin: Builtin) -> Self {
        self.help = builtin;
        self
    }

    pub fn version(mut self, builtin: Builtin) -> Self {
        self.version = builtin;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}
