use std::fmt;

/// A resolved position in decimal degrees.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Map link suitable for an SMS body.
    pub fn maps_url(&self) -> String {
        format!(
            "https://maps.google.com/?q={:.6},{:.6}",
            self.latitude, self.longitude
        )
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}, {:.6}", self.latitude, self.longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_renders_six_decimals() {
        let loc = Location::new(40.0, -73.0);
        assert_eq!(loc.to_string(), "40.000000, -73.000000");
        assert_eq!(
            loc.maps_url(),
            "https://maps.google.com/?q=40.000000,-73.000000"
        );
    }
}
