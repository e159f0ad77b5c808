//! git-nostr binary entry point.

use gitnostr::cli;
use gitnostr::ui::output;

fn main() {
    if let Err(e) = cli::run() {
        output::error(format!("{:#}", e));
        std::process::exit(1);
    }
}
