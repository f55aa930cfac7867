//! One module per subcommand. Each exposes an `execute` entry point.

pub mod job;
pub mod packs;
pub mod stats;
pub mod submit;

use std::io::IsTerminal;

/// Clear the terminal before redrawing a live view. Output that is piped
/// elsewhere is appended instead.
pub(crate) fn redraw(text: &str) {
    if std::io::stdout().is_terminal() {
        print!("\x1b[2J\x1b[H");
    } else {
        println!();
    }
    println!("{text}");
}
