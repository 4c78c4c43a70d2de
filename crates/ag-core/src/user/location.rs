use serde::{Deserialize, Serialize};

/// Structured location picked through the cascading county → subcounty → town
/// selectors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Location {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub county: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subcounty: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub town: Option<String>,
}

impl Location {
    pub fn county(county: impl Into<String>) -> Self {
        Self {
            county: Some(county.into()),
            ..Default::default()
        }
    }

    pub fn has_county(&self) -> bool {
        self.county.as_deref().is_some_and(|c| !c.trim().is_empty())
    }

    /// Changing the county invalidates everything below it.
    pub fn set_county(&mut self, county: Option<String>) {
        if self.county != county {
            self.subcounty = None;
            self.town = None;
        }
        self.county = county;
    }

    /// Changing the subcounty invalidates the town.
    pub fn set_subcounty(&mut self, subcounty: Option<String>) {
        if self.subcounty != subcounty {
            self.town = None;
        }
        self.subcounty = subcounty;
    }

    pub fn set_town(&mut self, town: Option<String>) {
        self.town = town;
    }
}

/// The 47 counties of Kenya, as offered by the county selector.
pub const COUNTIES: [&str; 47] = [
    "Baringo",
    "Bomet",
    "Bungoma",
    "Busia",
    "Elgeyo-Marakwet",
    "Embu",
    "Garissa",
    "Homa Bay",
    "Isiolo",
    "Kajiado",
    "Kakamega",
    "Kericho",
    "Kiambu",
    "Kilifi",
    "Kirinyaga",
    "Kisii",
    "Kisumu",
    "Kitui",
    "Kwale",
    "Laikipia",
    "Lamu",
    "Machakos",
    "Makueni",
    "Mandera",
    "Marsabit",
    "Meru",
    "Migori",
    "Mombasa",
    "Murang'a",
    "Nairobi",
    "Nakuru",
    "Nandi",
    "Narok",
    "Nyamira",
    "Nyandarua",
    "Nyeri",
    "Samburu",
    "Siaya",
    "Taita-Taveta",
    "Tana River",
    "Tharaka-Nithi",
    "Trans Nzoia",
    "Turkana",
    "Uasin Gishu",
    "Vihiga",
    "Wajir",
    "West Pokot",
];

/// Case-insensitive lookup returning the canonical county spelling.
pub fn canonical_county(name: &str) -> Option<&'static str> {
    let needle = name.trim();
    COUNTIES
        .iter()
        .copied()
        .find(|county| county.eq_ignore_ascii_case(needle))
}
