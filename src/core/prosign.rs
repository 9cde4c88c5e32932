//! Prosign table: cwdaemon trigger glyphs and the letters they merge

/// One trigger and the letters keyed together for it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProsignEntry {
    pub trigger: char,
    pub expansion: &'static str,
}

/// The fixed cwdaemon prosign set
pub static PROSIGNS: [ProsignEntry; 7] = [
    ProsignEntry { trigger: '*', expansion: "AR" },
    ProsignEntry { trigger: '=', expansion: "BT" },
    ProsignEntry { trigger: '<', expansion: "SK" },
    ProsignEntry { trigger: '(', expansion: "KN" },
    ProsignEntry { trigger: '!', expansion: "SN" },
    ProsignEntry { trigger: '&', expansion: "AS" },
    ProsignEntry { trigger: '>', expansion: "BK" },
];

/// Entry for a trigger character, if it is one
pub fn lookup(c: char) -> Option<&'static ProsignEntry> {
    PROSIGNS.iter().find(|entry| entry.trigger == c)
}

pub fn is_trigger(c: char) -> bool {
    lookup(c).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_lookup_known_triggers() {
        assert_eq!(lookup('*').map(|e| e.expansion), Some("AR"));
        assert_eq!(lookup('<').map(|e| e.expansion), Some("SK"));
        assert_eq!(lookup('>').map(|e| e.expansion), Some("BK"));
    }

    #[test]
    fn test_plain_characters_are_not_triggers() {
        for c in ['A', 'z', '0', ' ', '?', '/', '.', ','] {
            assert!(!is_trigger(c), "{:?} should not be a trigger", c);
        }
    }

    #[test]
    fn test_triggers_are_unique() {
        let triggers: HashSet<char> = PROSIGNS.iter().map(|e| e.trigger).collect();
        assert_eq!(triggers.len(), PROSIGNS.len());
    }

    #[test]
    fn test_expansions_are_letter_pairs() {
        // merge-letters only joins two characters
        for entry in PROSIGNS.iter() {
            assert_eq!(entry.expansion.len(), 2, "{:?}", entry);
            assert!(entry.expansion.chars().all(|c| c.is_ascii_uppercase()));
            assert!(entry.expansion.chars().all(|c| !is_trigger(c)));
        }
    }
}
