use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// US census regions used to group states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    West,
    Midwest,
    South,
    Northeast,
}

const WEST: &[&str] = &[
    "Alaska",
    "Hawaii",
    "Washington",
    "Oregon",
    "California",
    "Montana",
    "Idaho",
    "Wyoming",
    "Nevada",
    "Utah",
    "Colorado",
    "Arizona",
    "New Mexico",
];

const MIDWEST: &[&str] = &[
    "North Dakota",
    "South Dakota",
    "Minnesota",
    "Wisconsin",
    "Michigan",
    "Nebraska",
    "Iowa",
    "Illinois",
    "Indiana",
    "Ohio",
    "Missouri",
    "Kansas",
];

const SOUTH: &[&str] = &[
    "Oklahoma",
    "Texas",
    "Arkansas",
    "Louisiana",
    "Kentucky",
    "Tennessee",
    "Mississippi",
    "Alabama",
    "West Virginia",
    "Virginia",
    "North Carolina",
    "South Carolina",
    "Georgia",
    "Florida",
];

const NORTHEAST: &[&str] = &[
    "Maryland",
    "Delaware",
    "District of Columbia",
    "Pennsylvania",
    "New York",
    "New Jersey",
    "Connecticut",
    "Massachusetts",
    "Vermont",
    "New Hampshire",
    "Rhode Island",
    "Maine",
];

impl Region {
    pub const ALL: [Region; 4] = [
        Region::West,
        Region::Midwest,
        Region::South,
        Region::Northeast,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Region::West => "west",
            Region::Midwest => "midwest",
            Region::South => "south",
            Region::Northeast => "northeast",
        }
    }

    /// Full state names belonging to this region
    pub fn states(&self) -> &'static [&'static str] {
        match self {
            Region::West => WEST,
            Region::Midwest => MIDWEST,
            Region::South => SOUTH,
            Region::Northeast => NORTHEAST,
        }
    }

    pub fn contains(&self, state: &str) -> bool {
        self.states().contains(&state)
    }

    /// Region of a full state name, `None` for anything outside the 50 states and DC
    pub fn for_state(state: &str) -> Option<Region> {
        Region::ALL.into_iter().find(|region| region.contains(state))
    }
}

impl FromStr for Region {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "west" => Ok(Region::West),
            "midwest" => Ok(Region::Midwest),
            "south" => Ok(Region::South),
            "northeast" => Ok(Region::Northeast),
            other => Err(format!("unknown region: {other}")),
        }
    }
}
