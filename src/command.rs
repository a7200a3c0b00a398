/// A stopwatch action, whether spoken or clicked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Stop,
    Reset,
    Lap,
    Analyze,
}

/// Keyword table in dispatch priority order. A phrase containing several
/// keywords resolves by this order, not by where the words appear.
const KEYWORDS: [(&str, Command); 5] = [
    ("start", Command::Start),
    ("stop", Command::Stop),
    ("reset", Command::Reset),
    ("lap", Command::Lap),
    ("analyze", Command::Analyze),
];

impl Command {
    /// Map free-form recognized text to a command by case-insensitive
    /// substring containment, first keyword match wins. `None` means the
    /// phrase was not recognized and nothing should change.
    pub fn parse(text: &str) -> Option<Command> {
        let text = text.to_lowercase();
        KEYWORDS
            .iter()
            .find(|(keyword, _)| text.contains(keyword))
            .map(|&(_, command)| command)
    }

    /// Short name for logging and the overlay.
    pub fn label(self) -> &'static str {
        match self {
            Command::Start => "start",
            Command::Stop => "stop",
            Command::Reset => "reset",
            Command::Lap => "lap",
            Command::Analyze => "analyze",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_each_keyword() {
        assert_eq!(Command::parse("start"), Some(Command::Start));
        assert_eq!(Command::parse("stop"), Some(Command::Stop));
        assert_eq!(Command::parse("reset"), Some(Command::Reset));
        assert_eq!(Command::parse("lap"), Some(Command::Lap));
        assert_eq!(Command::parse("analyze"), Some(Command::Analyze));
    }

    #[test]
    fn matches_keywords_inside_longer_phrases() {
        assert_eq!(
            Command::parse("please start the stopwatch"),
            Some(Command::Start)
        );
        assert_eq!(Command::parse("record a lap now"), Some(Command::Lap));
    }

    #[test]
    fn is_case_insensitive() {
        assert_eq!(Command::parse("STOP"), Some(Command::Stop));
        assert_eq!(Command::parse("Analyze my laps"), Some(Command::Analyze));
    }

    #[test]
    fn ambiguity_resolves_by_priority_not_position() {
        // "stop" outranks "reset" even though "reset" could come first.
        assert_eq!(Command::parse("stop and reset"), Some(Command::Stop));
        assert_eq!(Command::parse("reset then stop"), Some(Command::Stop));
        assert_eq!(Command::parse("lap and start"), Some(Command::Start));
    }

    #[test]
    fn unknown_phrases_are_rejected() {
        assert_eq!(Command::parse("banana"), None);
        assert_eq!(Command::parse(""), None);
    }
}
