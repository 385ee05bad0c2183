//! Built-in command handlers
//!
//! Each submodule registers its commands with [`CommandRegistry`]; handlers
//! receive only the arguments after the command words.

pub mod container;
pub mod help;
pub mod system;

use super::registry::CommandRegistry;

/// Registry with every built-in command
pub fn default_registry() -> CommandRegistry {
    let mut registry = CommandRegistry::new();
    help::register(&mut registry);
    system::register(&mut registry);
    container::register(&mut registry);
    registry
}
