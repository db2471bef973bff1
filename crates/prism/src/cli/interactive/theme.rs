//! Dialoguer theme and banner for Prism interactive mode.

use console::{style, Style};
use dialoguer::theme::ColorfulTheme;

/// `ColorfulTheme` with Prism's colors. Everything renders on stderr.
pub fn prism_theme() -> ColorfulTheme {
    ColorfulTheme {
        prompt_prefix: style("?".to_string()).for_stderr().magenta(),
        prompt_style: Style::new().for_stderr().bold(),
        prompt_suffix: style("›".to_string()).for_stderr().bright().black(),
        active_item_prefix: style("▸".to_string()).for_stderr().magenta(),
        active_item_style: Style::new().for_stderr().magenta(),
        success_prefix: style("✓".to_string()).for_stderr().green(),
        success_suffix: style("·".to_string()).for_stderr().bright().black(),
        error_prefix: style("✗".to_string()).for_stderr().red(),
        error_style: Style::new().for_stderr().red(),
        values_style: Style::new().for_stderr().green(),
        ..ColorfulTheme::default()
    }
}

/// Banner lines, without color.
pub(crate) fn banner_lines() -> [String; 4] {
    let version_line = format!("Prism v{}", prism_core::VERSION);
    let tagline = "Text-to-image, one prompt at a time";
    let inner_width = tagline.len().max(version_line.len()) + 4;

    [
        format!("  ╭{:─<width$}╮", "", width = inner_width),
        format!("  │{:^width$}│", version_line, width = inner_width),
        format!("  │{:^width$}│", tagline, width = inner_width),
        format!("  ╰{:─<width$}╯", "", width = inner_width),
    ]
}

pub fn print_banner() {
    let magenta = Style::new().for_stderr().magenta();
    eprintln!();
    for line in banner_lines() {
        eprintln!("{}", magenta.apply_to(line));
    }
    eprintln!();
}
