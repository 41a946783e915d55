use cmdflow::{
    Builtin, Console, Context, Error, FutureExt, Handler, OptionDef, ParseError, Parser, Schema,
    Settings, SharedCommand, Value,
};
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

/// Everything a handler observed, in call order.
#[derive(Debug, Clone, PartialEq)]
struct Seen {
    handler: &'static str,
    parser: String,
    command: Option<String>,
    config: Vec<(String, Option<Value>)>,
    options: Vec<String>,
    arguments: Vec<String>,
}

type Log = Arc<Mutex<Vec<Seen>>>;

fn recorder(log: &Log, handler: &'static str) -> Handler {
    let log = Arc::clone(log);
    Handler::new(move |cx| {
        let log = Arc::clone(&log);
        async move {
            // Yield once so the dispatcher really has to await us.
            tokio::task::yield_now().await;
            let seen = Seen {
                handler,
                parser: cx.name().to_string(),
                command: cx.command().map(str::to_string),
                config: cx
                    .config()?
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.cloned()))
                    .collect(),
                options: cx.options()?.iter().map(|(k, _)| k.to_string()).collect(),
                arguments: cx.arguments()?.to_strings(),
            };
            log.lock().unwrap().push(seen);
            Ok::<_, anyhow::Error>(())
        }
        .boxed()
    })
}

fn captured() -> (Console, Settings) {
    let console = Console::capture();
    let settings = Settings::default().with_console(console.clone());
    (console, settings)
}

/// Root `{foo: string = "bar"}`, Shared `sub`, Isolated `echo {loud: boolean}`.
fn scenario(log: &Log) -> Schema {
    Schema::new("tool")
        .option(OptionDef::string("foo").default_value("bar"))
        .handler(recorder(log, "root"))
        .command(SharedCommand::new("sub", recorder(log, "sub")))
        .command(
            Schema::new("echo")
                .option(OptionDef::boolean("loud"))
                .handler(recorder(log, "echo")),
        )
}

#[tokio::test]
async fn shared_command_sees_parent_config() {
    let log = Log::default();
    let mut parser = Parser::new(scenario(&log)).unwrap();

    parser.run(["sub"]).await.unwrap();

    let seen = log.lock().unwrap().clone();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].handler, "sub");
    assert_eq!(seen[0].parser, "tool");
    assert_eq!(seen[0].command.as_deref(), Some("sub"));
    assert_eq!(
        seen[0].config,
        vec![("foo".to_string(), Some(Value::from("bar")))]
    );
}

#[tokio::test]
async fn shared_command_scans_options_after_its_token() {
    let log = Log::default();
    let mut parser = Parser::new(scenario(&log)).unwrap();

    parser.run(["sub", "--foo", "qux", "extra"]).await.unwrap();

    let seen = log.lock().unwrap().clone();
    assert_eq!(seen[0].handler, "sub");
    assert_eq!(
        seen[0].config,
        vec![("foo".to_string(), Some(Value::from("qux")))]
    );
    assert_eq!(seen[0].options, ["foo"]);
    assert_eq!(seen[0].arguments, ["extra"]);
}

#[tokio::test]
async fn isolated_command_runs_its_own_parser() {
    let log = Log::default();
    let mut parser = Parser::new(scenario(&log)).unwrap();

    parser.run(["echo", "--loud"]).await.unwrap();

    let seen = log.lock().unwrap().clone();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].handler, "echo");
    assert_eq!(seen[0].parser, "echo");
    assert_eq!(seen[0].command, None);
    assert_eq!(
        seen[0].config,
        vec![("loud".to_string(), Some(Value::Bool(true)))]
    );
    assert_eq!(seen[0].options, ["loud"]);
    assert!(!seen[0].options.iter().any(|o| o == "foo"));
}

#[tokio::test]
async fn root_handler_runs_when_nothing_matches() {
    let log = Log::default();
    let mut parser = Parser::new(scenario(&log)).unwrap();

    parser.run(["a", "b"]).await.unwrap();

    let seen = log.lock().unwrap().clone();
    assert_eq!(seen[0].handler, "root");
    assert_eq!(seen[0].arguments, ["a", "b"]);
    assert!(seen[0].options.is_empty());
}

#[tokio::test]
async fn isolated_flag_unknown_to_child_fails_in_child() {
    let log = Log::default();
    let (console, settings) = captured();
    let mut parser = Parser::with_settings(scenario(&log), settings).unwrap();

    // `--foo` belongs to the root schema, not to `echo`.
    let err = parser.run(["echo", "--foo", "x"]).await.unwrap_err();
    assert!(err.is_reported());
    assert!(log.lock().unwrap().is_empty());
    assert_eq!(
        console.stderr_text(),
        "invalid option '--foo' for 'echo'\n"
    );
    assert!(console.stdout_text().starts_with("Usage: echo [OPTIONS]"));
}

#[tokio::test]
async fn invalid_option_with_help_prints_once_and_signals_failure() {
    let (console, settings) = captured();
    let mut parser = Parser::with_settings(
        Schema::new("tool").option(OptionDef::boolean("verbose").description("Talk more")),
        settings,
    )
    .unwrap();

    let err = parser.run(["--bogus"]).await.unwrap_err();
    assert!(matches!(err, Error::Reported));
    assert_eq!(err.to_string(), "");

    assert_eq!(console.stderr_text(), "invalid option '--bogus' for 'tool'\n");
    let help = console.stdout_text();
    assert!(help.contains("Usage: tool [OPTIONS]"), "{help}");
    assert!(help.contains("--[no-]verbose <boolean>  Talk more"), "{help}");

    // Recovery leaves the parser readable.
    assert!(parser.config().is_ok());
}

#[tokio::test]
async fn invalid_option_without_help_propagates_raw_error() {
    let (console, settings) = captured();
    let mut parser =
        Parser::with_settings(Schema::new("tool").help(Builtin::Disabled), settings).unwrap();

    let err = parser.run(["--bogus"]).await.unwrap_err();
    match err {
        Error::Parse(ParseError::InvalidOption { flag, command }) => {
            assert_eq!(flag, "--bogus");
            assert_eq!(command, "tool");
        }
        other => panic!("expected InvalidOption, got: {other:?}"),
    }
    assert_eq!(console.stdout_text(), "");
    assert_eq!(console.stderr_text(), "");
}

#[tokio::test]
async fn child_without_help_is_recovered_by_parent() {
    let (console, settings) = captured();
    let mut parser = Parser::with_settings(
        Schema::new("tool")
            .option(OptionDef::string("root-only"))
            .command(Schema::new("child").help(Builtin::Disabled)),
        settings,
    )
    .unwrap();

    let err = parser.run(["child", "--nope"]).await.unwrap_err();
    assert!(err.is_reported());
    assert_eq!(
        console.stderr_text(),
        "invalid option '--nope' for 'child'\n"
    );
    // The parent's own schema is rendered.
    let help = console.stdout_text();
    assert!(help.starts_with("Usage: tool [COMMAND] [OPTIONS]"), "{help}");
    assert!(help.contains("--[no-]root-only <string>"), "{help}");
}

#[tokio::test]
async fn invalid_subcommand_names_the_parent() {
    let log = Log::default();
    let mut parser = Parser::new(
        Schema::new("tool")
            .help(Builtin::Disabled)
            .command(
                SharedCommand::new("remote", recorder(&log, "remote"))
                    .command(SharedCommand::new("add", recorder(&log, "add"))),
            )
            .command(SharedCommand::new("status", recorder(&log, "status"))),
    )
    .unwrap();

    let err = parser.run(["remote", "status"]).await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "'status' is not a valid sub-command of 'remote'"
    );

    parser.run(["remote", "add", "origin"]).await.unwrap();
    let seen = log.lock().unwrap().clone();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].handler, "add");
    assert_eq!(seen[0].arguments, ["origin"]);
}

#[tokio::test]
async fn help_flag_renders_schema() {
    let (console, settings) = captured();
    let log = Log::default();
    let mut parser = Parser::with_settings(scenario(&log).description("A tool."), settings).unwrap();

    parser.run(["--help"]).await.unwrap();

    let text = console.stdout_text();
    assert!(text.starts_with("Usage: tool [COMMAND] [OPTIONS]\n"), "{text}");
    assert!(text.contains("A tool."));
    assert!(text.contains("--[no-]foo <string>  [default: bar]"), "{text}");
    assert!(text.contains("\n  sub"));
    assert!(text.contains("\n  echo"));
    assert!(log.lock().unwrap().is_empty());
}

#[tokio::test]
async fn version_flag_prints_name_and_manifest_version() {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let dir: PathBuf =
        std::env::temp_dir().join(format!("cmdflow-version-{}-{nanos}", std::process::id()));
    fs::create_dir_all(dir.join("nested")).unwrap();
    fs::write(dir.join("package.json"), r#"{"name": "x", "version": "2.5.0"}"#).unwrap();

    let console = Console::capture();
    let settings = Settings::default()
        .with_console(console.clone())
        .with_manifest_names(["package.json"])
        .with_search_root(dir.join("nested"));
    let mut parser = Parser::with_settings(Schema::new("tool"), settings).unwrap();

    parser.run(["-V"]).await.unwrap();
    assert_eq!(console.stdout_text(), "tool 2.5.0\n");

    let _ = fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn handler_errors_are_wrapped() {
    let mut parser = Parser::new(
        Schema::new("tool").handler(Handler::sync(|_| anyhow::bail!("boom"))),
    )
    .unwrap();

    let err = parser.run(Vec::<String>::new()).await.unwrap_err();
    assert!(matches!(err, Error::Handler(_)));
    assert_eq!(err.to_string(), "boom");
}

#[tokio::test]
async fn nest_attaches_an_independent_parser() {
    let log = Log::default();
    let mut parser = Parser::new(Schema::new("tool").handler(recorder(&log, "root"))).unwrap();
    let child = Parser::new(
        Schema::new("db")
            .option(OptionDef::number("port").default_value(5432.0))
            .handler(recorder(&log, "db")),
    )
    .unwrap();
    parser.nest(child).unwrap();

    parser.run(["db", "--port", "6000"]).await.unwrap();

    let seen = log.lock().unwrap().clone();
    assert_eq!(seen[0].handler, "db");
    assert_eq!(
        seen[0].config,
        vec![("port".to_string(), Some(Value::Number(6000.0)))]
    );
    // The root parser only recorded the match.
    assert_eq!(parser.command(), Some("db"));
}

#[tokio::test]
async fn repeated_runs_replace_previous_results() {
    let log = Log::default();
    let mut parser = Parser::new(scenario(&log)).unwrap();

    parser.run(["--foo", "one"]).await.unwrap();
    parser.run(Vec::<String>::new()).await.unwrap();

    let seen = log.lock().unwrap().clone();
    assert_eq!(
        seen[1].config,
        vec![("foo".to_string(), Some(Value::from("bar")))]
    );
    assert!(seen[1].options.is_empty());
}
