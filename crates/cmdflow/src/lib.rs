//! Declarative multi-command argument parsing.
//!
//! A [`Parser`] is built from a [`Schema`] of options, positional arguments
//! and commands. [`Parser::run`] scans the tokens in a single left-to-right
//! pass and dispatches:
//! - a matched [`SharedCommand`] runs its handler against the same parser
//!   (same options, same config)
//! - a matched Isolated command (a nested [`Schema`]) hands the remaining
//!   tokens to its own child parser
//! - otherwise the schema's own handler runs
//!
//! # Example
//!
//! ```
//! use cmdflow::{Handler, OptionDef, Parser, Schema};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let schema = Schema::new("tool")
//!     .option(OptionDef::string("foo").default_value("bar"))
//!     .option(OptionDef::boolean("verbose").short('v'))
//!     .handler(Handler::sync(|cx| {
//!         let foo: Option<String> = cx.config()?.get("foo")?;
//!         assert_eq!(foo.as_deref(), Some("bar"));
//!         Ok(())
//!     }));
//!
//! let mut parser = Parser::new(schema)?;
//! parser.run(["-v"]).await?;
//! # Ok(())
//! # }
//! ```

pub mod builtins;
pub mod console;
pub mod context;
pub mod convert;
pub mod error;
pub mod flags;
pub mod parser;
pub mod registry;
pub mod schema;
pub mod value;

pub use console::{Console, Settings};
pub use context::{Context, Handler};
pub use convert::Converter;
pub use error::{Error, ParseError, RegistrationError, Result, UsageError};
pub use futures_util::future::{BoxFuture, FutureExt};
pub use parser::{CommandMatch, Parser, ParserResult, ParserState};
pub use registry::Definition;
pub use schema::{
    ArgumentDef, Builtin, CommandDef, CommandInfo, IsolatedCommand, Names, OptionDef, Schema,
    SharedCommand,
};
pub use value::{Arguments, FromConfig, FromValue, Value, Values};
