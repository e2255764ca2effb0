// ABOUTME: Parsing of the interactive host picker's input line.
// ABOUTME: A line is a quit word, a numeric index into the sorted list, or a name.

/// What the user typed at the host picker prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// `exit`, `quit` or `q`.
    Quit,
    /// Blank line; prompt again.
    Empty,
    /// Position in the name-sorted listing.
    Index(usize),
    /// Display name, resolved with a first-match scan.
    Name(String),
}

impl Selection {
    /// Only the line terminator is stripped. Other whitespace is part of the input.
    pub fn parse(input: &str) -> Self {
        let text = input.trim_end_matches(['\r', '\n']);
        match text {
            "" => Selection::Empty,
            "exit" | "quit" | "q" => Selection::Quit,
            _ => match text.parse::<usize>() {
                Ok(index) => Selection::Index(index),
                Err(_) => Selection::Name(text.to_string()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quit_words() {
        for word in ["exit", "quit", "q\n", "q\r\n"] {
            assert_eq!(Selection::parse(word), Selection::Quit);
        }
    }

    #[test]
    fn blank_lines_are_empty() {
        assert_eq!(Selection::parse("\n"), Selection::Empty);
        assert_eq!(Selection::parse("\r\n"), Selection::Empty);
    }

    #[test]
    fn digits_are_indices() {
        assert_eq!(Selection::parse("3\n"), Selection::Index(3));
    }

    #[test]
    fn anything_else_is_a_name() {
        assert_eq!(Selection::parse("web1\n"), Selection::Name("web1".to_string()));
        assert_eq!(Selection::parse("-1"), Selection::Name("-1".to_string()));
    }

    #[test]
    fn surrounding_spaces_are_kept() {
        assert_eq!(
            Selection::parse(" web1 \n"),
            Selection::Name(" web1 ".to_string())
        );
        assert_eq!(Selection::parse(" 3\n"), Selection::Name(" 3".to_string()));
        assert_eq!(Selection::parse(" q\n"), Selection::Name(" q".to_string()));
        assert_eq!(Selection::parse("  \n"), Selection::Name("  ".to_string()));
    }
}
