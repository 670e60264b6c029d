//! Static pages: about and contact.

use thiserror::Error;
use tracing::info;

pub const ABOUT_TITLE: &str = "About Weatherzy";

pub const ABOUT_INTRO: &str = "A weather app provides real-time weather information for specific \
locations. Users can view temperature, humidity, wind speed, and forecasts for the upcoming days.";

/// (heading, description) pairs shown under the intro.
pub const ABOUT_FEATURES: [(&str, &str); 3] = [
    (
        "Real-time Data Fetching",
        "Uses the Current Weather Data API to retrieve live temperature, wind speed, and \
         atmospheric conditions for any city entered.",
    ),
    (
        "Forecast Engine",
        "Integrates the 5-Day / 3-Hour Forecast API to process and display future weather \
         trends and periodic updates.",
    ),
    (
        "Geocoding",
        "Uses the Geocoding API to convert search strings into coordinates for accurate \
         data retrieval.",
    ),
];

pub const CONTACT_CONFIRMATION: &str = "Your message has been sent successfully!";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContactError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("'{0}' is not a valid email address")]
    InvalidEmail(String),
}

/// A validated contact-form submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub message: String,
}

impl ContactMessage {
    pub fn new(name: &str, email: &str, message: &str) -> Result<Self, ContactError> {
        let name = required("Name", name)?;
        let email = required("Email", email)?;
        let message = required("Message", message)?;

        let valid_email = matches!(
            email.split_once('@'),
            Some((local, domain)) if !local.is_empty() && !domain.is_empty() && !domain.contains('@')
        );
        if !valid_email {
            return Err(ContactError::InvalidEmail(email));
        }

        Ok(Self { name, email, message })
    }

    /// There is no mail backend; submission is acknowledged locally.
    pub fn send(self) -> &'static str {
        info!(from = %self.email, chars = self.message.len(), "contact message accepted");
        CONTACT_CONFIRMATION
    }
}

fn required(field: &'static str, value: &str) -> Result<String, ContactError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ContactError::MissingField(field))
    } else {
        Ok(trimmed.to_string())
    }
}
