//! Command table
//!
//! The static list of supported commands. Built once at compile time and
//! searched case-insensitively.

/// Command identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    Ping,
    Set,
    Get,
    HSet,
    HGet,
    HGetAll,
}

/// Metadata for one command table entry
#[derive(Debug, Clone, Copy)]
pub struct CommandSpec {
    /// Canonical upper-case name
    pub name: &'static str,

    pub kind: CommandKind,

    /// Mutates the store and must be appended to the log
    pub write: bool,
}

/// Every supported command
pub static COMMAND_TABLE: [CommandSpec; 6] = [
    CommandSpec { name: "PING", kind: CommandKind::Ping, write: false },
    CommandSpec { name: "SET", kind: CommandKind::Set, write: true },
    CommandSpec { name: "GET", kind: CommandKind::Get, write: false },
    CommandSpec { name: "HSET", kind: CommandKind::HSet, write: true },
    CommandSpec { name: "HGET", kind: CommandKind::HGet, write: false },
    CommandSpec { name: "HGETALL", kind: CommandKind::HGetAll, write: false },
];

impl CommandKind {
    /// Table entry for this kind
    pub fn spec(self) -> &'static CommandSpec {
        match self {
            CommandKind::Ping => &COMMAND_TABLE[0],
            CommandKind::Set => &COMMAND_TABLE[1],
            CommandKind::Get => &COMMAND_TABLE[2],
            CommandKind::HSet => &COMMAND_TABLE[3],
            CommandKind::HGet => &COMMAND_TABLE[4],
            CommandKind::HGetAll => &COMMAND_TABLE[5],
        }
    }
}

/// Find a command by name, ignoring ASCII case
pub fn lookup(name: &str) -> Option<&'static CommandSpec> {
    COMMAND_TABLE
        .iter()
        .find(|spec| spec.name.eq_ignore_ascii_case(name))
}
