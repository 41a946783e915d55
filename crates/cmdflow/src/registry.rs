//! Construction-time lookup tables and conflict detection.

use crate::context::Handler;
use crate::error::RegistrationError;
use crate::flags;
use crate::schema::{ArgumentDef, CommandDef, CommandInfo, OptionDef, Schema};
use indexmap::IndexMap;
use std::collections::HashMap;

/// What a flag token resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagBinding {
    pub option: String,
    pub negated: bool,
}

#[derive(Debug, Clone)]
pub struct RegisteredOption {
    pub def: OptionDef,
    /// Every token that selects this option, in registration order.
    pub tokens: Vec<String>,
}

#[derive(Debug, Clone)]
pub enum CommandKind {
    Shared { handler: Handler },
    Isolated,
}

#[derive(Debug, Clone)]
pub struct RegisteredCommand {
    pub info: CommandInfo,
    pub kind: CommandKind,
    /// The Shared command this one is nested under.
    pub parent: Option<String>,
    /// Names of commands nested directly under this one.
    pub children: Vec<String>,
    pub tokens: Vec<String>,
}

impl RegisteredCommand {
    pub fn name(&self) -> &str {
        &self.info.name
    }

    pub fn is_shared(&self) -> bool {
        matches!(self.kind, CommandKind::Shared { .. })
    }
}

/// Read-only view of a parser's registered schema, handed to handlers.
#[derive(Debug, Clone, Copy)]
pub struct Definition<'a> {
    pub name: &'a str,
    pub description: Option<&'a str>,
    pub arguments: &'a [ArgumentDef],
    pub options: &'a IndexMap<String, RegisteredOption>,
    pub commands: &'a IndexMap<String, RegisteredCommand>,
}

#[derive(Debug, Clone, Default)]
pub struct Registry {
    pub(crate) name: String,
    pub(crate) description: Option<String>,
    pub(crate) arguments: Vec<ArgumentDef>,
    pub(crate) options: IndexMap<String, RegisteredOption>,
    pub(crate) option_flags: HashMap<String, FlagBinding>,
    pub(crate) commands: IndexMap<String, RegisteredCommand>,
    pub(crate) command_tokens: HashMap<String, String>,
}

/// Short names must form tokens the scanner classifies as short flags.
fn check_shorts(name: &str, shorts: &[String]) -> Result<(), RegistrationError> {
    match shorts
        .iter()
        .find(|s| !flags::is_short_flag(&flags::short(s)))
    {
        Some(short) => Err(RegistrationError::InvalidShort {
            name: name.to_string(),
            short: short.clone(),
        }),
        None => Ok(()),
    }
}

fn option_tokens(def: &OptionDef) -> Vec<(String, bool)> {
    if def.hidden {
        return Vec::new();
    }

    let mut longs: Vec<&str> = Vec::new();
    if !def.hidden_name {
        longs.push(&def.name);
    }
    longs.extend(def.aliases.iter().map(String::as_str));

    let mut tokens: Vec<(String, bool)> = longs.iter().map(|n| (flags::long(n), false)).collect();
    if !def.no_negation {
        tokens.extend(longs.iter().map(|n| (flags::negated(n), true)));
    }
    tokens.extend(def.short.iter().map(|s| (flags::short(s), false)));
    tokens
}

fn command_tokens(info: &CommandInfo) -> Vec<String> {
    let longs = std::iter::once(&info.name).chain(&info.aliases);
    if info.as_flag {
        longs
            .map(|n| flags::long(n))
            .chain(info.short.iter().map(|s| flags::short(s)))
            .collect()
    } else {
        longs.chain(&info.short).cloned().collect()
    }
}

impl Registry {
    pub fn new(name: impl Into<String>, description: Option<String>) -> Self {
        Self {
            name: name.into(),
            description,
            ..Default::default()
        }
    }

    pub fn definition(&self) -> Definition<'_> {
        Definition {
            name: &self.name,
            description: self.description.as_deref(),
            arguments: &self.arguments,
            options: &self.options,
            commands: &self.commands,
        }
    }

    pub fn option_flag(&self, token: &str) -> Option<&FlagBinding> {
        self.option_flags.get(token)
    }

    pub fn command_for_token(&self, token: &str) -> Option<&RegisteredCommand> {
        self.command_tokens
            .get(token)
            .and_then(|name| self.commands.get(name))
    }

    pub fn command(&self, name: &str) -> Option<&RegisteredCommand> {
        self.commands.get(name)
    }

    pub fn add_argument(&mut self, def: ArgumentDef) {
        self.arguments.push(def);
    }

    pub fn add_option(&mut self, def: OptionDef) -> Result<(), RegistrationError> {
        if def.name.is_empty() {
            return Err(RegistrationError::EmptyName { kind: "option" });
        }
        if self.options.contains_key(&def.name) {
            return Err(RegistrationError::DuplicateOption { name: def.name });
        }
        check_shorts(&def.name, &def.short)?;

        let tokens = option_tokens(&def);
        for (token, _) in &tokens {
            if let Some(existing) = self.option_flags.get(token) {
                return Err(RegistrationError::DuplicateOptionFlag {
                    flag: token.clone(),
                    existing: existing.option.clone(),
                    option: def.name.clone(),
                });
            }
            if let Some(command) = self.command_tokens.get(token) {
                return Err(RegistrationError::FlagCommandConflict {
                    token: token.clone(),
                    option: def.name.clone(),
                    command: command.clone(),
                });
            }
        }

        // Tokens of one option must not repeat either (e.g. alias == name).
        let mut bound: Vec<String> = Vec::with_capacity(tokens.len());
        for (token, negated) in tokens {
            if bound.contains(&token) {
                return Err(RegistrationError::DuplicateOptionFlag {
                    flag: token,
                    existing: def.name.clone(),
                    option: def.name.clone(),
                });
            }
            self.option_flags.insert(
                token.clone(),
                FlagBinding {
                    option: def.name.clone(),
                    negated,
                },
            );
            bound.push(token);
        }

        tracing::trace!(option = %def.name, tokens = ?bound, "registered option");
        self.options
            .insert(def.name.clone(), RegisteredOption { def, tokens: bound });
        Ok(())
    }

    /// Register `info` as a command. The caller supplies the kind; nested
    /// Shared children are registered by the caller afterwards.
    pub fn add_command(
        &mut self,
        info: CommandInfo,
        kind: CommandKind,
        parent: Option<&str>,
    ) -> Result<(), RegistrationError> {
        if info.name.is_empty() {
            return Err(RegistrationError::EmptyName { kind: "command" });
        }
        if self.commands.contains_key(&info.name) {
            return Err(RegistrationError::DuplicateCommand { name: info.name });
        }
        if info.as_flag {
            check_shorts(&info.name, &info.short)?;
        }

        let tokens = command_tokens(&info);
        let mut seen: Vec<&String> = Vec::with_capacity(tokens.len());
        for token in &tokens {
            if let Some(existing) = self.command_tokens.get(token) {
                return Err(RegistrationError::DuplicateCommandToken {
                    token: token.clone(),
                    existing: existing.clone(),
                    command: info.name.clone(),
                });
            }
            if seen.contains(&token) {
                return Err(RegistrationError::DuplicateCommandToken {
                    token: token.clone(),
                    existing: info.name.clone(),
                    command: info.name.clone(),
                });
            }
            if let Some(binding) = self.option_flags.get(token) {
                return Err(RegistrationError::FlagCommandConflict {
                    token: token.clone(),
                    option: binding.option.clone(),
                    command: info.name.clone(),
                });
            }
            seen.push(token);
        }

        for token in &tokens {
            self.command_tokens.insert(token.clone(), info.name.clone());
        }
        if let Some(parent) = parent {
            if let Some(p) = self.commands.get_mut(parent) {
                p.children.push(info.name.clone());
            }
        }

        tracing::trace!(command = %info.name, tokens = ?tokens, "registered command");
        self.commands.insert(
            info.name.clone(),
            RegisteredCommand {
                info,
                kind,
                parent: parent.map(str::to_string),
                children: Vec::new(),
                tokens,
            },
        );
        Ok(())
    }

    /// Register a command definition tree. Returns the schemas of Isolated
    /// commands found (at any depth), for the caller to build parsers from.
    pub fn add_command_def(
        &mut self,
        def: CommandDef,
        parent: Option<&str>,
    ) -> Result<Vec<Schema>, RegistrationError> {
        match def {
            CommandDef::Isolated(cmd) => {
                self.add_command(cmd.info, CommandKind::Isolated, parent)?;
                Ok(vec![cmd.schema])
            }
            CommandDef::Shared(cmd) => {
                let name = cmd.info.name.clone();
                self.add_command(
                    cmd.info,
                    CommandKind::Shared {
                        handler: cmd.handler,
                    },
                    parent,
                )?;
                let mut isolated = Vec::new();
                for child in cmd.commands {
                    isolated.extend(self.add_command_def(child, Some(&name))?);
                }
                Ok(isolated)
            }
        }
    }
}
