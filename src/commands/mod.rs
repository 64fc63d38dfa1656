//! Commands accepted by the offline queue.
//!
//! # Supported Commands
//!
//! - `CONNECTIVITY_CHANGED` - replaces the connectivity flag
//! - `DEFER_FOR_RETRY` - admits a failed operation for later retry
//! - `REMOVE_FROM_QUEUE` - evicts an entry that completed out-of-band
//! - `DISMISS_QUEUE_ENTRIES` - evicts every entry dismissed by a trigger kind
//! - `PRUNE_STALE_ENTRIES` - keeps only entries for still-valid appointments
//!
//! Any other `type` parses to `Command::Unrecognized`.
//!
//! # Example
//!
//! ```
//! use offline_queue::commands::{parse_command, Command};
//!
//! let cmd = parse_command(br#"{"type":"DISMISS_QUEUE_ENTRIES","trigger_kind":"LOGOUT"}"#).unwrap();
//! assert_eq!(cmd, Command::DismissQueueEntries { trigger_kind: "LOGOUT".to_string() });
//! ```

mod parser;
mod types;

pub use parser::{CommandParseError, parse_command, parse_command_value};
pub use types::Command;
