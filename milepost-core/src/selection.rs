//! Parsing of interactive menu input
//!
//! Menus show a numbered list of candidates (1-based) and accept a choice
//! letter, then for `s` a comma-separated list of positions.

/// A top-level menu choice
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuChoice {
    /// Act on every listed candidate
    All,
    /// Pick candidates by position
    Select,
    /// Enter a custom item
    Custom,
    /// Leave without doing anything
    Quit,
    /// Anything else
    Invalid(String),
}

impl MenuChoice {
    /// Parse a menu choice, case-insensitively
    pub fn parse(input: &str) -> Self {
        match input.trim().to_lowercase().as_str() {
            "a" | "all" => MenuChoice::All,
            "s" | "select" => MenuChoice::Select,
            "c" | "custom" => MenuChoice::Custom,
            "q" | "quit" => MenuChoice::Quit,
            other => MenuChoice::Invalid(other.to_string()),
        }
    }
}

/// Result of parsing a comma-separated list of positions
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    /// Valid zero-based indices, in input order, without duplicates
    pub indices: Vec<usize>,
    /// Entries that were out of range or not numbers, as typed
    pub invalid: Vec<String>,
}

impl Selection {
    /// Parse `input` against a list of `len` candidates
    ///
    /// Invalid entries are collected rather than failing the whole selection.
    pub fn parse(input: &str, len: usize) -> Self {
        let mut selection = Self::default();

        for part in input.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }

            match part.parse::<usize>() {
                Ok(position) if (1..=len).contains(&position) => {
                    let index = position - 1;
                    if !selection.indices.contains(&index) {
                        selection.indices.push(index);
                    }
                }
                _ => selection.invalid.push(part.to_string()),
            }
        }

        selection
    }

    /// Every index of a list of `len` candidates
    pub fn all(len: usize) -> Self {
        Self {
            indices: (0..len).collect(),
            invalid: Vec::new(),
        }
    }

    /// The selected items of `items`
    pub fn pick<'a, T>(&self, items: &'a [T]) -> Vec<&'a T> {
        self.indices.iter().filter_map(|&i| items.get(i)).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_menu_choice() {
        assert_eq!(MenuChoice::parse("a"), MenuChoice::All);
        assert_eq!(MenuChoice::parse(" S \n"), MenuChoice::Select);
        assert_eq!(MenuChoice::parse("custom"), MenuChoice::Custom);
        assert_eq!(MenuChoice::parse("Q"), MenuChoice::Quit);
        assert_eq!(
            MenuChoice::parse("x"),
            MenuChoice::Invalid("x".to_string())
        );
    }

    #[test]
    fn test_select_subset() {
        let items = ["first", "second", "third"];
        let selection = Selection::parse("1,3", items.len());
        assert_eq!(selection.indices, vec![0, 2]);
        assert!(selection.invalid.is_empty());
        assert_eq!(selection.pick(&items), vec![&"first", &"third"]);
    }

    #[test]
    fn test_out_of_range_is_skipped() {
        let selection = Selection::parse("1, 5, 3", 3);
        assert_eq!(selection.indices, vec![0, 2]);
        assert_eq!(selection.invalid, vec!["5".to_string()]);
    }

    #[test]
    fn test_zero_and_garbage_are_invalid() {
        let selection = Selection::parse("0,two,,2", 3);
        assert_eq!(selection.indices, vec![1]);
        assert_eq!(selection.invalid, vec!["0".to_string(), "two".to_string()]);
    }

    #[test]
    fn test_duplicates_collapse() {
        let selection = Selection::parse("2,2,2", 3);
        assert_eq!(selection.indices, vec![1]);
    }

    #[test]
    fn test_all() {
        assert_eq!(Selection::all(3).indices, vec![0, 1, 2]);
        assert!(Selection::all(0).is_empty());
    }
}
