//! Step banners and progress bars for the cohgeo commands

use std::time::Duration;

use console::{Emoji, style};
use indicatif::{HumanDuration, ProgressBar, ProgressStyle};

/// Reading bins and tables
pub static LOOKING_GLASS: Emoji<'_, '_> = Emoji("🔍 ", "");
/// Writing JSON output
pub static DISK: Emoji<'_, '_> = Emoji("💾 ", "");
/// Decoding geometry
pub static GEAR: Emoji<'_, '_> = Emoji("⚙️  ", "");
pub static SPARKLE: Emoji<'_, '_> = Emoji("✨ ", "");
/// Assembling a scene graph
pub static CUBE: Emoji<'_, '_> = Emoji("📐 ", "");

/// `[2/3] 📐 Loading scene graph...`
pub fn print_step(step: usize, steps: usize, emoji: &Emoji, text: &str) {
    let counter = style(format!("[{step}/{steps}]")).bold().dim();
    println!("{counter} {emoji}{text}");
}

/// `✨ Done in 2 seconds`
pub fn print_done(elapsed: Duration) {
    println!("{SPARKLE} Done in {}", HumanDuration(elapsed));
}

/// `Decoding [██████░░░░] 12/40 files (3s)`
#[must_use]
pub fn bar_style() -> ProgressStyle {
    ProgressStyle::with_template("{msg} [{bar:40.cyan/blue}] {pos}/{len} files ({elapsed})")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
}

#[must_use]
pub fn simple_bar(total: u64, msg: &str) -> ProgressBar {
    ProgressBar::new(total)
        .with_style(bar_style())
        .with_message(msg.to_string())
}
