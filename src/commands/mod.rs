//! CLI command implementations
//!
//! Every command works on one `FlashBank` and a `&mut dyn Target`. Commands
//! that touch flash probe the bank first (`auto_probe`), so the bank layout
//! is always computed from the part that is actually attached.

pub mod erase;
mod list;
pub mod probe;
pub mod protect;
pub mod read;
pub mod write;

pub use list::list_chips;

/// Format a byte count for display
pub(crate) fn format_size(bytes: u32) -> String {
    if bytes >= 1024 * 1024 && bytes % (1024 * 1024) == 0 {
        format!("{} MiB", bytes / (1024 * 1024))
    } else if bytes >= 1024 {
        format!("{} KiB", bytes / 1024)
    } else {
        format!("{} B", bytes)
    }
}
