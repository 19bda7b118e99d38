//! CLI command implementations

pub mod apply;
pub mod assign;
pub mod check;
pub mod issues;
pub mod milestones;

pub use apply::ApplyArgs;
pub use assign::AssignArgs;
pub use check::CheckArgs;
pub use issues::IssuesArgs;
pub use milestones::MilestonesArgs;

use milepost_core::{MenuChoice, Selection};
use milepost_github::{AssignmentOutcome, AssignmentReport, Milestone};

/// Get emoji or ASCII alternative based on no_emoji flag
pub(crate) fn emoji<'a>(no_emoji: bool, emoji_char: &'a str, ascii_alt: &'a str) -> &'a str {
    if no_emoji {
        ascii_alt
    } else {
        emoji_char
    }
}

/// One line per assignment as it completes
pub(crate) fn print_outcome(outcome: &AssignmentOutcome, no_emoji: bool) {
    let a = outcome.assignment;
    match &outcome.error {
        None => println!(
            "{} Assigned issue #{} to milestone #{}",
            emoji(no_emoji, "✅", "[ok]"),
            a.issue,
            a.milestone
        ),
        Some(e) => println!(
            "{} Failed to assign issue #{} to milestone #{}: {}",
            emoji(no_emoji, "❌", "[failed]"),
            a.issue,
            a.milestone,
            e
        ),
    }
}

pub(crate) fn print_report(report: &AssignmentReport) {
    println!();
    println!(
        "Assignment complete: {} succeeded, {} failed",
        report.succeeded(),
        report.failed_count()
    );
}

/// Numbered milestone list used by the interactive commands
pub(crate) fn print_numbered_milestones(milestones: &[Milestone]) {
    for (i, m) in milestones.iter().enumerate() {
        println!(
            "{}. {} (#{}) - Due: {}",
            i + 1,
            m.title,
            m.number,
            format_due(m)
        );
    }
}

pub(crate) fn format_due(milestone: &Milestone) -> String {
    milestone
        .due_on
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "No due date".to_string())
}

/// What an answer to an interactive menu resolves to
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum MenuPick<'a, T> {
    Items(Vec<&'a T>),
    Custom,
    Quit,
    Invalid,
}

/// Resolve a menu answer against `items`
///
/// `a` and `s` are only valid when there is something to pick, `c` only when
/// `allow_custom` is set. For `s`, `read_selection` supplies the position
/// list; invalid positions are printed and skipped.
pub(crate) fn resolve_menu<'a, T>(
    choice: MenuChoice,
    items: &'a [T],
    allow_custom: bool,
    read_selection: impl FnOnce() -> std::io::Result<String>,
) -> std::io::Result<MenuPick<'a, T>> {
    Ok(match choice {
        MenuChoice::All if !items.is_empty() => MenuPick::Items(items.iter().collect()),
        MenuChoice::Select if !items.is_empty() => {
            let selection = Selection::parse(&read_selection()?, items.len());
            for entry in &selection.invalid {
                println!("Invalid selection: {}", entry);
            }
            MenuPick::Items(selection.pick(items))
        }
        MenuChoice::Custom if allow_custom => MenuPick::Custom,
        MenuChoice::Quit => MenuPick::Quit,
        _ => MenuPick::Invalid,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_input() -> std::io::Result<String> {
        panic!("selection should not be read")
    }

    #[test]
    fn test_unknown_letter_is_invalid() {
        let items = [10, 20, 30];
        assert_eq!(
            resolve_menu(MenuChoice::parse("x"), &items, false, no_input).unwrap(),
            MenuPick::Invalid
        );
    }

    #[test]
    fn test_custom_only_when_allowed() {
        let items = [10, 20];
        assert_eq!(
            resolve_menu(MenuChoice::parse("c"), &items, false, no_input).unwrap(),
            MenuPick::Invalid
        );
        assert_eq!(
            resolve_menu(MenuChoice::parse("c"), &items, true, no_input).unwrap(),
            MenuPick::Custom
        );
    }

    #[test]
    fn test_all_and_select_need_items() {
        let empty: [u64; 0] = [];
        assert_eq!(
            resolve_menu(MenuChoice::parse("a"), &empty, true, no_input).unwrap(),
            MenuPick::Invalid
        );
        assert_eq!(
            resolve_menu(MenuChoice::parse("s"), &empty, true, no_input).unwrap(),
            MenuPick::Invalid
        );
    }

    #[test]
    fn test_select_skips_invalid_positions() {
        let items = [21, 22, 23];
        let picked = resolve_menu(MenuChoice::parse("s"), &items, false, || {
            Ok("1,3,5".to_string())
        })
        .unwrap();
        assert_eq!(picked, MenuPick::Items(vec![&21, &23]));
    }

    #[test]
    fn test_quit_and_all() {
        let items = [1, 2];
        assert_eq!(
            resolve_menu(MenuChoice::parse("q"), &items, false, no_input).unwrap(),
            MenuPick::Quit
        );
        assert_eq!(
            resolve_menu(MenuChoice::parse("A"), &items, false, no_input).unwrap(),
            MenuPick::Items(vec![&1, &2])
        );
    }
}
