//! Built-in commands for the Thoughts rule engine.
//!
//! This crate provides the `#` directives rules use to act on the world:
//! - Output and lookup (`#output`, `#lookup`)
//! - Text handling (`#tokenize`, `#replace`, `#format`)
//! - Control (`#switch`, `#random`)
//! - Dates and lists (`#date`, `#first`, `#rest`)

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod control;
pub mod date;
pub mod list;
pub mod lookup;
pub mod output;
pub mod text;

pub use control::{RandomCommand, SwitchCommand};
pub use date::DateCommand;
pub use list::{FirstCommand, RestCommand};
pub use lookup::LookupCommand;
pub use output::OutputCommand;
pub use text::{FormatCommand, ReplaceCommand, TokenizeCommand};

use thoughts_engine::Engine;

/// Registers every built-in command on the engine.
pub fn register_builtins(engine: &mut Engine) {
    engine.register(OutputCommand);
    engine.register(LookupCommand);
    engine.register(TokenizeCommand);
    engine.register(ReplaceCommand);
    engine.register(FormatCommand);
    engine.register(SwitchCommand);
    engine.register(RandomCommand);
    engine.register(DateCommand);
    engine.register(FirstCommand);
    engine.register(RestCommand);
}
