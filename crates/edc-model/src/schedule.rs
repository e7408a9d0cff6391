use serde::{Deserialize, Serialize};

use crate::ids::VisitCode;

/// Read-only visit schedule reference data.
///
/// A CRF may point at one of these rows instead of carrying a raw visit code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitScheduleEntry {
    pub id: u64,
    pub visit_schedule_name: String,
    pub schedule_name: String,
    pub visit_code: VisitCode,
    #[serde(default)]
    pub visit_title: String,
    #[serde(default)]
    pub timepoint: u32,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl VisitScheduleEntry {
    /// Display label as shown in a form choice list.
    pub fn label(&self) -> String {
        if self.visit_title.is_empty() {
            self.visit_code.to_string()
        } else {
            format!("{}: {}", self.visit_code, self.visit_title)
        }
    }
}
