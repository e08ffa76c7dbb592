use serde::{Deserialize, Serialize};

/// How a name gets picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PickMode {
    Wheel,
    Dice,
    Chest,
}

impl PickMode {
    pub fn as_str(&self) -> &str {
        match self {
            PickMode::Wheel => "Wheel",
            PickMode::Dice => "Dice",
            PickMode::Chest => "Treasure Chest",
        }
    }

    /// Value persisted in the preferences store.
    pub fn key(&self) -> &'static str {
        match self {
            PickMode::Wheel => "wheel",
            PickMode::Dice => "dice",
            PickMode::Chest => "chest",
        }
    }

    pub fn from_key(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "wheel" => Some(PickMode::Wheel),
            "dice" => Some(PickMode::Dice),
            "chest" => Some(PickMode::Chest),
            _ => None,
        }
    }

    pub fn all() -> [PickMode; 3] {
        [PickMode::Wheel, PickMode::Dice, PickMode::Chest]
    }

    pub fn next(self) -> Self {
        match self {
            PickMode::Wheel => PickMode::Dice,
            PickMode::Dice => PickMode::Chest,
            PickMode::Chest => PickMode::Wheel,
        }
    }

    pub fn previous(self) -> Self {
        match self {
            PickMode::Wheel => PickMode::Chest,
            PickMode::Dice => PickMode::Wheel,
            PickMode::Chest => PickMode::Dice,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_parse_back() {
        for mode in PickMode::all() {
            assert_eq!(PickMode::from_key(mode.key()), Some(mode));
        }
        assert_eq!(PickMode::from_key(" DICE "), Some(PickMode::Dice));
        assert_eq!(PickMode::from_key("slots"), None);
    }

    #[test]
    fn cycling_wraps_both_ways() {
        assert_eq!(PickMode::Chest.next(), PickMode::Wheel);
        assert_eq!(PickMode::Wheel.previous(), PickMode::Chest);
        for mode in PickMode::all() {
            assert_eq!(mode.next().previous(), mode);
        }
    }
}
