use anstyle::{AnsiColor, Color, Style};

pub const HEADER: Style = Style::new()
    .fg_color(Some(Color::Ansi(AnsiColor::Green)))
    .bold();

pub const USAGE: Style = Style::new()
    .fg_color(Some(Color::Ansi(AnsiColor::Green)))
    .bold();

pub const COMMAND: Style = Style::new()
    .fg_color(Some(Color::Ansi(AnsiColor::Cyan)))
    .bold();

pub const LITERAL: Style = Style::new().fg_color(Some(Color::Ansi(AnsiColor::Cyan)));

pub const DESC: Style = Style::new()
    .fg_color(Some(Color::Ansi(AnsiColor::White)))
    .dimmed();

pub const SUCCESS: Style = Style::new()
    .fg_color(Some(Color::Ansi(AnsiColor::Green)));

pub const BANNER: Style = Style::new()
    .fg_color(Some(Color::Ansi(AnsiColor::Blue)))
    .bold();

pub fn get_clap_styles() -> clap::builder::Styles {
    clap::builder::Styles::styled()
        .header(HEADER)
        .usage(USAGE)
        .literal(LITERAL)
        .placeholder(LITERAL)
}

/// The box printed by `devrun help`.
pub fn banner() -> String {
    let rows = [
        ("dev", "start the dev server"),
        ("build", "production build"),
        ("lint", "static analysis"),
        ("clean", "remove dependencies and build output"),
        ("install", "reinstall dependencies"),
    ];
    let mut out = format!("{BANNER}devrun{BANNER:#} {DESC}frontend development tool{DESC:#}\n\n");
    for (name, desc) in rows {
        out.push_str(&format!("  {COMMAND}{name:<9}{COMMAND:#}{DESC}{desc}{DESC:#}\n"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn banner_lists_every_subcommand() {
        let text = banner();
        for name in ["dev", "build", "lint", "clean", "install"] {
            assert!(text.contains(name), "banner is missing '{name}'");
        }
    }
}
