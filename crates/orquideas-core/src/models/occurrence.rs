use chrono::NaiveDate;
use geo::Point;

/// A single georeferenced orchid observation.
///
/// Blank attribute strings are stored as `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct OrchidOccurrence {
    /// Location in WGS 84, x = longitude, y = latitude
    pub location: Point<f64>,
    pub species: Option<String>,
    pub locality: Option<String>,
    /// Event date as recorded in the source
    pub event_date: Option<String>,
    pub institution_code: Option<String>,
    pub occurrence_id: Option<String>,
}

impl OrchidOccurrence {
    /// Create an occurrence at a longitude/latitude pair with no attributes
    pub fn at(longitude: f64, latitude: f64) -> Self {
        Self {
            location: Point::new(longitude, latitude),
            species: None,
            locality: None,
            event_date: None,
            institution_code: None,
            occurrence_id: None,
        }
    }

    pub fn with_species(mut self, species: impl Into<String>) -> Self {
        self.species = normalize_text(Some(species.into()));
        self
    }

    pub fn with_locality(mut self, locality: impl Into<String>) -> Self {
        self.locality = normalize_text(Some(locality.into()));
        self
    }

    pub fn with_event_date(mut self, event_date: impl Into<String>) -> Self {
        self.event_date = normalize_text(Some(event_date.into()));
        self
    }

    pub fn with_institution_code(mut self, code: impl Into<String>) -> Self {
        self.institution_code = normalize_text(Some(code.into()));
        self
    }

    pub fn with_occurrence_id(mut self, id: impl Into<String>) -> Self {
        self.occurrence_id = normalize_text(Some(id.into()));
        self
    }

    pub fn longitude(&self) -> f64 {
        self.location.x()
    }

    pub fn latitude(&self) -> f64 {
        self.location.y()
    }

    /// Calendar day of the event when the recorded value starts with an ISO-8601 date.
    ///
    /// Handles plain dates, timestamps ("2019-03-14T10:00:00") and intervals
    /// ("2019-03-14/2019-03-20", which yields the start day).
    pub fn event_day(&self) -> Option<NaiveDate> {
        let raw = self.event_date.as_deref()?;
        let day = raw.get(..10)?;
        NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
    }

    /// Whether the occurrence carries a usable species name
    pub fn has_species(&self) -> bool {
        self.species.is_some()
    }
}

/// An occurrence paired with the name of the area containing it, if any
#[derive(Debug, Clone, PartialEq)]
pub struct JoinedOccurrence {
    pub occurrence: OrchidOccurrence,
    pub area_name: Option<String>,
}

impl JoinedOccurrence {
    pub fn new(occurrence: OrchidOccurrence, area_name: Option<String>) -> Self {
        Self { occurrence, area_name }
    }

    pub fn species(&self) -> Option<&str> {
        self.occurrence.species.as_deref()
    }

    pub fn is_matched(&self) -> bool {
        self.area_name.is_some()
    }
}

/// Trim a text attribute, mapping empty results to `None`
pub fn normalize_text(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else if trimmed.len() == v.len() {
            Some(v)
        } else {
            Some(trimmed.to_string())
        }
    })
}
