//! Suggested destinations shown on the home page.

/// Origin used when searching from a suggestion.
pub const CURRENT_LOCATION: &str = "Current Location";

/// A well-known place offered as a one-click search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PopularDestination {
    pub name: &'static str,
    /// City or district the place is in.
    pub area: &'static str,
}

pub const POPULAR_DESTINATIONS: [PopularDestination; 5] = [
    PopularDestination {
        name: "Faisal Mosque",
        area: "Islamabad",
    },
    PopularDestination {
        name: "Centaurus Mall",
        area: "Islamabad",
    },
    PopularDestination {
        name: "Rawalpindi Railway Station",
        area: "Rawalpindi",
    },
    PopularDestination {
        name: "Islamabad International Airport",
        area: "Islamabad",
    },
    PopularDestination {
        name: "Bahria Town",
        area: "Rawalpindi",
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SearchQuery;

    #[test]
    fn every_suggestion_makes_a_valid_search() {
        for dest in POPULAR_DESTINATIONS {
            assert!(SearchQuery::new(CURRENT_LOCATION, dest.name, 0).is_ok());
        }
    }
}
