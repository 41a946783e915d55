use anyhow::{Context as _, bail};
use cmdflow::builtins::{UNKNOWN_VERSION, find_manifest, read_manifest_version};
use cmdflow::{
    ArgumentDef, Context, Converter, FromConfig, FutureExt, Handler, OptionDef, Schema,
    SharedCommand, Values,
};
use std::path::Path;

const MAX_TIMES: f64 = 100.0;

/// Root options, resolved.
#[derive(Debug, Clone, PartialEq)]
struct Greet {
    name: String,
    loud: bool,
    times: usize,
}

impl FromConfig for Greet {
    fn from_config(config: &Values) -> cmdflow::Result<Self> {
        let times: f64 = config.get("times")?.unwrap_or(1.0);
        Ok(Self {
            name: config.get("name")?.unwrap_or_default(),
            loud: config.get("loud")?.unwrap_or(false),
            times: if times.is_nan() {
                1
            } else {
                times.clamp(1.0, MAX_TIMES) as usize
            },
        })
    }
}

impl Greet {
    fn line(&self) -> String {
        let line = format!("hello, {}!", self.name);
        if self.loud { line.to_uppercase() } else { line }
    }
}

pub fn schema() -> Schema {
    Schema::new("cmdflow")
        .description("Demo tool for the cmdflow argument parser.")
        .option(
            OptionDef::string("name")
                .short('n')
                .description("Who to greet")
                .default_value("world"),
        )
        .option(OptionDef::boolean("loud").short('l').description("Shout"))
        .option(
            OptionDef::number("times")
                .short('t')
                .description("How many greetings to print")
                .default_value(1.0),
        )
        .handler(Handler::new(|cx| {
            async move {
                let greet: Greet = cx.config()?.extract()?;
                tracing::debug!(?greet, "greeting");
                let line = greet.line();
                for _ in 0..greet.times {
                    cx.console().out(&format!("{line}\n"));
                }
                Ok::<_, anyhow::Error>(())
            }
            .boxed()
        }))
        .command(
            SharedCommand::new("config", Handler::sync(print_config))
                .alias("cfg")
                .description("Print the resolved options as JSON")
                .command(
                    SharedCommand::new("keys", Handler::sync(print_keys))
                        .description("List the declared option names"),
                ),
        )
        .command(echo_schema())
        .command(manifest_schema())
}

fn print_config(cx: &dyn Context) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(cx.config()?)?;
    cx.console().out(&format!("{json}\n"));
    Ok(())
}

fn print_keys(cx: &dyn Context) -> anyhow::Result<()> {
    for name in cx.definition().options.keys() {
        cx.console().out(&format!("{name}\n"));
    }
    Ok(())
}

fn echo_schema() -> Schema {
    Schema::new("echo")
        .description("Print the positional words")
        .option(OptionDef::boolean("upper").short('u').description("Uppercase the output"))
        .option(
            OptionDef::string("sep")
                .short('s')
                .description("Separator between words")
                .default_value(" "),
        )
        .handler(Handler::sync(|cx| {
            let config = cx.config()?;
            let sep: String = config.get("sep")?.unwrap_or_else(|| " ".to_string());
            let mut text = cx.arguments()?.to_strings().join(&sep);
            if config.get::<bool>("upper")?.unwrap_or(false) {
                text = text.to_uppercase();
            }
            cx.console().out(&format!("{text}\n"));
            Ok(())
        }))
}

fn manifest_schema() -> Schema {
    Schema::new("manifest")
        .description("Find the nearest project manifest and print its version")
        .argument(
            ArgumentDef::string()
                .named("dir")
                .description("Directory to start from")
                .default_value("."),
        )
        .option(
            OptionDef::new("names", Converter::list(Converter::string()))
                .description("Manifest file names, nearest first")
                .default_value(vec!["Cargo.toml", "package.json"]),
        )
        .handler(Handler::sync(print_manifest))
}

fn print_manifest(cx: &dyn Context) -> anyhow::Result<()> {
    let dir: String = cx.arguments()?.get(0)?.unwrap_or_else(|| ".".to_string());
    let names: Vec<String> = cx.config()?.get("names")?.unwrap_or_default();

    let start = Path::new(&dir)
        .canonicalize()
        .with_context(|| format!("failed to resolve directory: {dir}"))?;
    let Some(path) = find_manifest(&start, &names) else {
        bail!("no manifest named {} above {}", names.join(" or "), start.display());
    };
    let version = read_manifest_version(&path)?.unwrap_or_else(|| UNKNOWN_VERSION.to_string());

    cx.console().out(&format!("{}\t{version}\n", path.display()));
    Ok(())
}
