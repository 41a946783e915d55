use crate::flags;
use crate::registry::{Definition, RegisteredCommand, RegisteredOption};
use crate::schema::ArgumentDef;

fn format_option_left(option: &RegisteredOption) -> String {
    let def = &option.def;
    let mut names: Vec<String> = def.short.iter().map(|s| flags::short(s)).collect();

    let mut longs: Vec<&str> = Vec::new();
    if !def.hidden_name {
        longs.push(&def.name);
    }
    longs.extend(def.aliases.iter().map(String::as_str));
    for long in longs {
        if def.no_negation {
            names.push(flags::long(long));
        } else {
            names.push(format!("--[no-]{long}"));
        }
    }

    format!("{} <{}>", names.join(", "), def.converter.hint())
}

fn format_option_help(option: &RegisteredOption) -> String {
    let def = &option.def;
    let mut out = def.description.as_deref().unwrap_or_default().trim().to_string();
    if def.required {
        if out.is_empty() {
            out.push_str("required");
        } else {
            out.push_str(" (required)");
        }
    }
    if let Some(default) = &def.default {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(&format!("[default: {default}]"));
    }
    out
}

fn argument_label(index: usize, def: &ArgumentDef) -> String {
    let name = def
        .name
        .clone()
        .unwrap_or_else(|| format!("arg{index}"))
        .to_ascii_uppercase();
    if def.required {
        format!("<{name}>")
    } else {
        format!("[{name}]")
    }
}

fn format_argument_help(def: &ArgumentDef) -> String {
    let mut out = def.description.as_deref().unwrap_or_default().trim().to_string();
    if !out.is_empty() {
        out.push(' ');
    }
    out.push_str(&format!("<{}>", def.converter.hint()));
    if let Some(default) = &def.default {
        out.push_str(&format!(" [default: {default}]"));
    }
    out
}

fn format_command_left(command: &RegisteredCommand) -> String {
    command.tokens.join(", ")
}

fn push_rows(out: &mut String, title: &str, rows: Vec<(String, String)>) {
    if rows.is_empty() {
        return;
    }
    out.push_str(&format!("\n{title}:\n"));
    let width = rows.iter().map(|(l, _)| l.len()).max().unwrap_or(0);
    for (left, help) in rows {
        if help.is_empty() {
            out.push_str(&format!("  {left}\n"));
        } else {
            out.push_str(&format!("  {left:width$}  {help}\n"));
        }
    }
}

/// Render usage, description, commands, arguments and options.
pub fn render_help(def: &Definition<'_>) -> String {
    let commands: Vec<&RegisteredCommand> = def
        .commands
        .values()
        .filter(|c| c.parent.is_none())
        .collect();
    let options: Vec<&RegisteredOption> =
        def.options.values().filter(|o| !o.def.hidden).collect();

    let mut usage = format!("Usage: {}", def.name);
    if commands.iter().any(|c| !c.info.as_flag) {
        usage.push_str(" [COMMAND]");
    }
    if !options.is_empty() {
        usage.push_str(" [OPTIONS]");
    }
    for (i, arg) in def.arguments.iter().enumerate() {
        usage.push(' ');
        usage.push_str(&argument_label(i, arg));
    }

    let mut out = String::new();
    out.push_str(&usage);
    out.push('\n');

    if let Some(description) = def.description.map(str::trim).filter(|d| !d.is_empty()) {
        out.push('\n');
        out.push_str(description);
        out.push('\n');
    }

    let mut command_rows = Vec::new();
    for command in &commands {
        command_rows.push((
            format_command_left(command),
            command.info.description.clone().unwrap_or_default(),
        ));
        for child in &command.children {
            if let Some(child) = def.commands.get(child) {
                command_rows.push((
                    format!("{} {}", command.name(), format_command_left(child)),
                    child.info.description.clone().unwrap_or_default(),
                ));
            }
        }
    }
    push_rows(&mut out, "Commands", command_rows);

    let argument_rows = def
        .arguments
        .iter()
        .enumerate()
        .map(|(i, arg)| (argument_label(i, arg), format_argument_help(arg)))
        .collect();
    push_rows(&mut out, "Arguments", argument_rows);

    let option_rows = options
        .iter()
        .map(|o| (format_option_left(o), format_option_help(o)))
        .collect();
    push_rows(&mut out, "Options", option_rows);

    out
}
