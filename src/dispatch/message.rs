use crate::location::Location;
use crate::session::{AlertSession, SessionId};

const HEADLINE: &str = "EMERGENCY ALERT: I need help right now.";

/// The alert sent to every contact of one dispatch.
#[derive(Clone, Debug, PartialEq)]
pub struct AlertMessage {
    pub session: SessionId,
    pub location: Option<Location>,
    pub body: String,
}

impl AlertMessage {
    /// Composes the alert for a dispatching session.
    pub fn compose(session: &AlertSession) -> Self {
        let body = match session.location {
            Some(loc) => format!(
                "{HEADLINE} My last known location is {loc} ({}).",
                loc.maps_url()
            ),
            None => format!("{HEADLINE} My location is unavailable."),
        };
        Self {
            session: session.id,
            location: session.location,
            body,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_mentions_location_when_known() {
        let mut session = AlertSession::arm(1);
        session.attach_location(Location::new(40.0, -73.0));
        let msg = AlertMessage::compose(&session);
        assert!(msg.body.contains("40.000000, -73.000000"));
        assert!(msg.body.contains("maps.google.com"));
        assert_eq!(msg.location, Some(Location::new(40.0, -73.0)));
    }

    #[test]
    fn test_body_without_location() {
        let msg = AlertMessage::compose(&AlertSession::arm(1));
        assert!(msg.body.ends_with("My location is unavailable."));
        assert_eq!(msg.location, None);
    }
}
