//! Console presentation helpers: banner, narration echo, thinking spinner.

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;

pub fn banner() {
    println!("{}", style("----------------------------------------").dim());
    println!(
        "   {}",
        style("vesper, your evening wind-down").magenta().bold()
    );
    println!("{}", style("----------------------------------------").dim());
}

/// Echo line printed for every narration episode, synchronously with the
/// start of playback.
pub fn narration_line(text: &str) {
    println!("\n{} {}", style("vesper ❯").magenta().bold(), text);
}

/// Dim parenthetical status line (notes loaded, falling back, etc).
pub fn note(text: &str) {
    println!("{}", style(format!("({text})")).dim());
}

/// Spinner shown while a backend call is in flight. Callers must
/// `finish_and_clear` it.
pub fn thinking_spinner(message: &str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner} {msg}")
            .expect("spinner template is a valid static string"),
    );
    bar.set_message(message.to_string());
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}

pub fn saved_line(path: &Path) {
    println!(
        "\n{} left a record of tonight at {}",
        style("✓").green(),
        style(path.display()).bold()
    );
}
