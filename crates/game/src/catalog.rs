use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyType {
    Bronze,
    Silber,
    Gold,
    Master,
}

impl KeyType {
    pub const ALL: [KeyType; 4] = [
        KeyType::Bronze,
        KeyType::Silber,
        KeyType::Gold,
        KeyType::Master,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            KeyType::Bronze => "BronzeSchlüssel",
            KeyType::Silber => "SilberSchlüssel",
            KeyType::Gold => "GoldSchlüssel",
            KeyType::Master => "MasterSchlüssel",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownName {
    pub kind: &'static str,
    pub name: String,
}

impl fmt::Display for UnknownName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {} '{}'", self.kind, self.name)
    }
}

impl std::error::Error for UnknownName {}

impl FromStr for KeyType {
    type Err = UnknownName;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        KeyType::ALL
            .into_iter()
            .find(|key_type| key_type.as_str() == raw.trim())
            .ok_or_else(|| UnknownName {
                kind: "key type",
                name: raw.to_string(),
            })
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FoodType {
    Schinken,
}

impl FoodType {
    pub const ALL: [FoodType; 1] = [FoodType::Schinken];

    pub fn as_str(self) -> &'static str {
        match self {
            FoodType::Schinken => "Schinken",
        }
    }
}

impl FromStr for FoodType {
    type Err = UnknownName;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        FoodType::ALL
            .into_iter()
            .find(|food_type| food_type.as_str() == raw.trim())
            .ok_or_else(|| UnknownName {
                kind: "food type",
                name: raw.to_string(),
            })
    }
}

impl fmt::Display for FoodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kinds of things a chest can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemType {
    Gem,
    Weapon,
    Food,
}

impl ItemType {
    pub fn as_str(self) -> &'static str {
        match self {
            ItemType::Gem => "Gem",
            ItemType::Weapon => "Weapon",
            ItemType::Food => "Food",
        }
    }
}

impl FromStr for ItemType {
    type Err = UnknownName;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim() {
            "Gem" => Ok(ItemType::Gem),
            "Weapon" => Ok(ItemType::Weapon),
            "Food" => Ok(ItemType::Food),
            _ => Err(UnknownName {
                kind: "item type",
                name: raw.to_string(),
            }),
        }
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_type_names_round_trip_through_from_str() {
        for key_type in KeyType::ALL {
            assert_eq!(key_type.as_str().parse::<KeyType>(), Ok(key_type));
        }
    }

    #[test]
    fn unknown_key_type_reports_the_bad_name() {
        let error = "KupferSchlüssel".parse::<KeyType>().expect_err("unknown");
        assert_eq!(error.name, "KupferSchlüssel");
        assert_eq!(error.to_string(), "unknown key type 'KupferSchlüssel'");
    }

    #[test]
    fn item_type_parses_known_names() {
        assert_eq!("Weapon".parse::<ItemType>(), Ok(ItemType::Weapon));
        assert!("Shield".parse::<ItemType>().is_err());
    }
}
