use super::domain::MaintenanceClass;
use std::collections::HashMap;
use std::sync::OnceLock;

static STANDARD_TABLE: OnceLock<ClassificationTable> = OnceLock::new();

const STANDARD_VERSION: &str = "2024.1";

const STANDARD_WORK_TYPES: &[(&str, MaintenanceClass)] = &[
    // Planned
    ("Planned Maint.", MaintenanceClass::Planned),
    ("Planned Corrective Maint.", MaintenanceClass::Planned),
    ("Planned Improvement", MaintenanceClass::Planned),
    ("Inspection", MaintenanceClass::Planned),
    ("Projects", MaintenanceClass::Planned),
    // Reactive / corrective
    ("Breakdown", MaintenanceClass::Reactive),
    ("Unplanned Corrective Maint.", MaintenanceClass::Reactive),
];

/// Work-type lookup shared by every metric that needs a maintenance class.
///
/// Keys are normalized (trimmed, whitespace collapsed, lowercase), so
/// `"planned  maint."` and `"Planned Maint."` resolve identically. Work types
/// absent from the table classify as [`MaintenanceClass::Other`].
#[derive(Debug, Clone)]
pub struct ClassificationTable {
    version: String,
    classes: HashMap<String, MaintenanceClass>,
}

impl ClassificationTable {
    /// The table the dashboard ships with.
    pub fn standard() -> &'static Self {
        STANDARD_TABLE.get_or_init(|| {
            Self::new(
                STANDARD_VERSION,
                STANDARD_WORK_TYPES
                    .iter()
                    .map(|(work_type, class)| (*work_type, *class)),
            )
        })
    }

    pub fn new<'a, I>(version: impl Into<String>, entries: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, MaintenanceClass)>,
    {
        let classes = entries
            .into_iter()
            .map(|(work_type, class)| (normalize_work_type(work_type), class))
            .collect();

        Self {
            version: version.into(),
            classes,
        }
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn classify(&self, work_type: Option<&str>) -> MaintenanceClass {
        work_type
            .and_then(|value| self.classes.get(&normalize_work_type(value)).copied())
            .unwrap_or(MaintenanceClass::Other)
    }

    /// Corrective work is what MTTR is measured over.
    pub fn is_corrective(&self, work_type: Option<&str>) -> bool {
        self.classify(work_type) == MaintenanceClass::Reactive
    }

    /// Work types mapped to `class`, in normalized form and sorted.
    pub fn work_types(&self, class: MaintenanceClass) -> Vec<&str> {
        let mut work_types: Vec<&str> = self
            .classes
            .iter()
            .filter(|(_, mapped)| **mapped == class)
            .map(|(work_type, _)| work_type.as_str())
            .collect();
        work_types.sort_unstable();
        work_types
    }
}

fn normalize_work_type(value: &str) -> String {
    value
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_ascii_lowercase()
}
