//! Validation of a suggested next appointment against the participant's
//! visit schedule.

pub mod error;
pub mod format;
pub mod lookup;
pub mod settings;
pub mod validator;

pub use error::{Category, Field, SettingsError, SuggestionIssue, ValidationError, WindowPeriodError};
pub use format::{DateFormatter, ShortDateFormatter, convert_php_dateformat};
pub use lookup::{AppointmentLookup, AppointmentTimeline, LookupQuery, WindowedLookup};
pub use settings::ValidatorSettings;
pub use validator::{SuggestionValidator, end_of_day};
