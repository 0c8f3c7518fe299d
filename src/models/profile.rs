use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "kebab-case")]
pub enum TransportMode {
    #[default]
    Walking,
    ElectricCar,
    Wheelchair,
}

impl TransportMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransportMode::Walking => "walking",
            TransportMode::ElectricCar => "electric-car",
            TransportMode::Wheelchair => "wheelchair",
        }
    }

    /// Keys looked up in a feature's `services` map, in priority order.
    /// Older data sets spell the electric car service differently.
    pub fn service_keys(&self) -> &'static [&'static str] {
        match self {
            TransportMode::Walking => &["walking"],
            TransportMode::ElectricCar => &["electric-car", "electricCar", "electricVan"],
            TransportMode::Wheelchair => &["wheelchair"],
        }
    }
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransportMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "walking" | "walk" => Ok(TransportMode::Walking),
            "electric-car" | "electriccar" | "electric_car" => Ok(TransportMode::ElectricCar),
            "wheelchair" => Ok(TransportMode::Wheelchair),
            _ => Err(format!("Invalid transport mode: '{}'", s)),
        }
    }
}

/// Eligibility tag for gender-segregated areas.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Family,
    #[default]
    Male,
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Family => "family",
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }

    /// Whether a feature tagged with `tags` admits this visitor.
    ///
    /// Untagged features admit everyone. A family visitor only passes
    /// family-tagged features; anyone else passes their own tag or `family`.
    pub fn admits(&self, tags: &[String]) -> bool {
        let tags: Vec<String> = tags
            .iter()
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();

        if tags.is_empty() {
            return true;
        }
        let family = Gender::Family.as_str();
        if *self == Gender::Family {
            return tags.iter().any(|t| t == family);
        }
        tags.iter().any(|t| t == family || t == self.as_str())
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "family" => Ok(Gender::Family),
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            _ => Err(format!("Invalid gender: '{}'", s)),
        }
    }
}
