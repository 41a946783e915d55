//! The single-pass scanner and the command dispatcher.

use crate::builtins;
use crate::console::Settings;
use crate::context::{Context, Handler};
use crate::error::{Error, ParseError, RegistrationError, Result, UsageError};
use crate::flags;
use crate::registry::{CommandKind, Definition, Registry};
use crate::schema::{Builtin, CommandInfo, Schema};
use crate::value::{Arguments, Values};
use futures_util::future::{BoxFuture, FutureExt};
use indexmap::IndexMap;

/// Scanner states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserState {
    /// No scan has started.
    Initial,
    /// Looking for a top-level command.
    Command,
    /// Inside a matched Shared command, looking for one of its children.
    Shared,
    /// Consuming options and positionals.
    Option,
    /// Scan complete; results are readable.
    Done,
}

/// A matched command and the tokens that followed it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandMatch {
    pub name: String,
    pub rest: Vec<String>,
}

/// Output of one scan.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParserResult {
    pub command: Option<CommandMatch>,
    pub arguments: Arguments,
    /// Only the options that appeared in the input.
    pub options: Values,
    /// Every declared option: supplied value, else default.
    pub config: Values,
}

/// One parser instance: a registration table plus owned child parsers for
/// every Isolated command.
#[derive(Debug)]
pub struct Parser {
    registry: Registry,
    handler: Option<Handler>,
    children: IndexMap<String, Parser>,
    settings: Settings,
    state: ParserState,
    result: ParserResult,
}

impl Parser {
    /// Build a parser with default settings. Fails on any schema conflict.
    pub fn new(schema: Schema) -> std::result::Result<Self, RegistrationError> {
        Self::with_settings(schema, Settings::default())
    }

    pub fn with_settings(
        schema: Schema,
        settings: Settings,
    ) -> std::result::Result<Self, RegistrationError> {
        let Schema {
            name,
            description,
            arguments,
            options,
            commands,
            handler,
            help,
            version,
        } = schema;

        let mut registry = Registry::new(name, description);
        let mut isolated = Vec::new();

        for argument in arguments {
            registry.add_argument(argument);
        }
        for option in options {
            registry.add_option(option)?;
        }
        for command in commands {
            isolated.extend(registry.add_command_def(command, None)?);
        }
        if help == Builtin::Enabled && registry.command(builtins::HELP).is_none() {
            registry.add_command_def(builtins::help_command().into(), None)?;
        }
        if version == Builtin::Enabled && registry.command(builtins::VERSION).is_none() {
            registry.add_command_def(builtins::version_command().into(), None)?;
        }

        let mut children = IndexMap::new();
        for child in isolated {
            let child = Parser::with_settings(child, settings.clone())?;
            children.insert(child.name().to_string(), child);
        }

        tracing::debug!(
            parser = %registry.name,
            options = registry.options.len(),
            arguments = registry.arguments.len(),
            commands = registry.commands.len(),
            "registered parser"
        );

        Ok(Self {
            registry,
            handler,
            children,
            settings,
            state: ParserState::Initial,
            result: ParserResult::default(),
        })
    }

    /// Attach an independently built parser as an Isolated command matched
    /// by its own name.
    pub fn nest(&mut self, child: Parser) -> std::result::Result<&mut Self, RegistrationError> {
        let mut info = CommandInfo::new(child.name());
        info.description = child.registry.description.clone();
        self.nest_with(info, child)
    }

    /// Like [`nest`](Self::nest), with explicit matching data.
    pub fn nest_with(
        &mut self,
        info: CommandInfo,
        child: Parser,
    ) -> std::result::Result<&mut Self, RegistrationError> {
        let name = info.name.clone();
        self.registry.add_command(info, CommandKind::Isolated, None)?;
        self.children.insert(name, child);
        Ok(self)
    }

    pub fn state(&self) -> ParserState {
        self.state
    }

    /// The full result of the last completed scan.
    pub fn result(&self) -> Result<&ParserResult> {
        self.ensure_done()?;
        Ok(&self.result)
    }

    /// The child parser built for an Isolated command.
    pub fn child(&self, name: &str) -> Option<&Parser> {
        self.children.get(name)
    }

    fn ensure_done(&self) -> Result<()> {
        if self.state == ParserState::Done {
            Ok(())
        } else {
            Err(UsageError::NotParsed {
                parser: self.registry.name.clone(),
            }
            .into())
        }
    }

    /// Scan `tokens` without dispatching.
    pub fn parse<I, S>(&mut self, tokens: I) -> Result<&ParserResult>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tokens: Vec<String> = tokens.into_iter().map(Into::into).collect();
        self.scan(&tokens)?;
        Ok(&self.result)
    }

    fn scan(&mut self, tokens: &[String]) -> Result<()> {
        self.result = ParserResult::default();
        self.state = ParserState::Command;
        let mut shared_parent: Option<String> = None;
        let mut i = 0usize;

        while i < tokens.len() {
            let token = tokens[i].as_str();

            if matches!(self.state, ParserState::Command | ParserState::Shared) {
                if let Some(cmd) = self.registry.command_for_token(token) {
                    if let Some(parent) = &shared_parent {
                        if cmd.parent.as_deref() != Some(parent.as_str()) {
                            return Err(ParseError::InvalidSubcommand {
                                token: token.to_string(),
                                parent: parent.clone(),
                            }
                            .into());
                        }
                    }

                    tracing::trace!(token, command = %cmd.name(), "matched command");
                    self.result.command = Some(CommandMatch {
                        name: cmd.name().to_string(),
                        rest: tokens[i + 1..].to_vec(),
                    });

                    if cmd.is_shared() {
                        shared_parent = Some(cmd.name().to_string());
                        self.state = ParserState::Shared;
                        i += 1;
                        continue;
                    }
                    // The child parser scans the rest.
                    self.finish();
                    return Ok(());
                }

                self.state = ParserState::Option;
            }

            if !flags::is_flag(token) {
                let index = self.result.arguments.len();
                let value = match self.registry.arguments.get(index) {
                    Some(def) => def
                        .converter
                        .convert(Some(token))
                        .or_else(|| def.default.clone()),
                    None => Some(token.into()),
                };
                tracing::trace!(token, index, "positional argument");
                self.result.arguments.push(value);
                i += 1;
                continue;
            }

            let Some(binding) = self.registry.option_flag(token) else {
                return Err(ParseError::InvalidOption {
                    flag: token.to_string(),
                    command: self.registry.name.clone(),
                }
                .into());
            };
            let Some(option) = self.registry.options.get(&binding.option) else {
                return Err(ParseError::InvalidOption {
                    flag: token.to_string(),
                    command: self.registry.name.clone(),
                }
                .into());
            };

            let raw = if flags::is_negated_flag(token) {
                None
            } else {
                match tokens.get(i + 1) {
                    Some(next) if !flags::is_flag(next) => {
                        i += 1;
                        Some(next.as_str())
                    }
                    _ => Some(""),
                }
            };

            let def = &option.def;
            let value = def.converter.convert(raw).or_else(|| def.default.clone());
            tracing::trace!(token, option = %def.name, raw, "option value");
            self.result.options.insert(def.name.clone(), value);
            i += 1;
        }

        self.finish();
        Ok(())
    }

    /// Merge defaults with supplied values and freeze the result.
    fn finish(&mut self) {
        let mut config = Values::new();
        for (name, option) in &self.registry.options {
            let value = if self.result.options.contains(name) {
                self.result.options.value(name).cloned()
            } else {
                option.def.default.clone()
            };
            config.insert(name.clone(), value);
        }
        self.result.config = config;
        self.state = ParserState::Done;
    }

    /// Scan `tokens` and run the matching handler.
    ///
    /// A parse error is reported here (error text, then help output) when
    /// this parser has a `help` command; the caller then receives
    /// [`Error::Reported`]. Without `help` the parse error is returned as is.
    pub async fn run<I, S>(&mut self, tokens: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tokens: Vec<String> = tokens.into_iter().map(Into::into).collect();
        self.run_tokens(tokens).await
    }

    /// Run against the process arguments, without the program name.
    pub async fn run_env(&mut self) -> Result<()> {
        let tokens: Vec<String> = std::env::args_os()
            .skip(1)
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect();
        self.run_tokens(tokens).await
    }

    fn run_tokens(&mut self, tokens: Vec<String>) -> BoxFuture<'_, Result<()>> {
        async move {
            match self.scan_and_dispatch(&tokens).await {
                Err(Error::Parse(err)) => self.recover(err).await,
                other => other,
            }
        }
        .boxed()
    }

    async fn scan_and_dispatch(&mut self, tokens: &[String]) -> Result<()> {
        self.scan(tokens)?;

        let Some(matched) = self.result.command.clone() else {
            let Some(handler) = self.handler.clone() else {
                tracing::debug!(parser = %self.registry.name, "no command matched and no handler");
                return Ok(());
            };
            tracing::debug!(parser = %self.registry.name, "dispatching to root handler");
            return handler.call(&*self).await.map_err(Error::from_handler);
        };

        let kind = self
            .registry
            .command(&matched.name)
            .map(|cmd| cmd.kind.clone());
        match kind {
            Some(CommandKind::Shared { handler }) => {
                tracing::debug!(parser = %self.registry.name, command = %matched.name, "dispatching shared command");
                handler.call(&*self).await.map_err(Error::from_handler)
            }
            Some(CommandKind::Isolated) => {
                tracing::debug!(parser = %self.registry.name, command = %matched.name, "dispatching to nested parser");
                match self.children.get_mut(&matched.name) {
                    Some(child) => child.run_tokens(matched.rest).await,
                    None => Ok(()),
                }
            }
            None => Ok(()),
        }
    }

    async fn recover(&mut self, err: ParseError) -> Result<()> {
        let help = match self.registry.command(builtins::HELP).map(|c| &c.kind) {
            Some(CommandKind::Shared { handler }) => handler.clone(),
            _ => return Err(err.into()),
        };

        tracing::debug!(parser = %self.registry.name, error = %err, "recovering with help");
        if self.state != ParserState::Done {
            self.finish();
        }
        self.settings.console.err(&format!("{err}\n"));
        help.call(&*self).await.map_err(Error::from_handler)?;
        Err(Error::Reported)
    }
}

impl Context for Parser {
    fn name(&self) -> &str {
        &self.registry.name
    }

    fn definition(&self) -> Definition<'_> {
        self.registry.definition()
    }

    fn arguments(&self) -> Result<&Arguments> {
        self.ensure_done()?;
        Ok(&self.result.arguments)
    }

    fn options(&self) -> Result<&Values> {
        self.ensure_done()?;
        Ok(&self.result.options)
    }

    fn config(&self) -> Result<&Values> {
        self.ensure_done()?;
        Ok(&self.result.config)
    }

    fn command(&self) -> Option<&str> {
        self.result.command.as_ref().map(|m| m.name.as_str())
    }

    fn settings(&self) -> &Settings {
        &self.settings
    }
}
