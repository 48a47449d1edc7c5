use super::domain::{normalize_priority, WorkOrder};
use serde::{Deserialize, Serialize};

/// Value operators pick to mean "no restriction on this dimension".
pub const WILDCARD: &str = "All";

/// Constraint on one filter dimension.
///
/// `Only` with an empty list matches no rows; use `Any` for "no constraint".
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Selection<T> {
    #[default]
    Any,
    Only(Vec<T>),
}

impl<T> Selection<T> {
    pub fn is_any(&self) -> bool {
        matches!(self, Self::Any)
    }

    fn admits(&self, value: Option<&T>, eq: impl Fn(&T, &T) -> bool) -> bool {
        match self {
            Self::Any => true,
            Self::Only(values) => {
                value.is_some_and(|value| values.iter().any(|selected| eq(selected, value)))
            }
        }
    }
}

impl Selection<String> {
    /// Builds a selection from raw operator input. The wildcard anywhere in the
    /// input wins over every concrete value next to it.
    pub fn from_values<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut selected = Vec::new();
        for value in values {
            let value = value.as_ref().trim();
            if value.eq_ignore_ascii_case(WILDCARD) {
                return Self::Any;
            }
            selected.push(value.to_string());
        }
        Self::Only(selected)
    }

    fn admits_label(&self, value: Option<&str>) -> bool {
        match self {
            Self::Any => true,
            Self::Only(values) => value.is_some_and(|value| {
                values
                    .iter()
                    .any(|selected| selected.trim().eq_ignore_ascii_case(value.trim()))
            }),
        }
    }
}

impl Selection<i32> {
    /// Years arrive as text from the operator; non-numeric entries match nothing.
    pub fn years_from_values<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        match Selection::<String>::from_values(values) {
            Selection::Any => Self::Any,
            Selection::Only(raw) => Self::Only(
                raw.iter()
                    .filter_map(|value| value.parse::<i32>().ok())
                    .collect(),
            ),
        }
    }
}

/// Per-dimension operator selections. The default selects every row.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FilterSelections {
    #[serde(default)]
    pub months: Selection<String>,
    #[serde(default)]
    pub years: Selection<i32>,
    #[serde(default)]
    pub work_types: Selection<String>,
    #[serde(default)]
    pub work_statuses: Selection<String>,
    #[serde(default)]
    pub priorities: Selection<String>,
    #[serde(default)]
    pub locations: Selection<String>,
}

impl FilterSelections {
    pub fn is_unrestricted(&self) -> bool {
        self.months.is_any()
            && self.years.is_any()
            && self.work_types.is_any()
            && self.work_statuses.is_any()
            && self.priorities.is_any()
            && self.locations.is_any()
    }

    pub fn matches(&self, order: &WorkOrder) -> bool {
        self.months.admits_label(order.month_name().as_deref())
            && self.years.admits(order.year().as_ref(), |a, b| a == b)
            && self.work_types.admits_label(order.work_type.as_deref())
            && self
                .work_statuses
                .admits_label(Some(order.work_status.label()))
            && self.admits_priority(order.work_priority.as_deref())
            && self.locations.admits_label(order.location.as_deref())
    }

    /// Orders matching every dimension, in input order.
    pub fn apply<'a, I>(&self, orders: I) -> Vec<&'a WorkOrder>
    where
        I: IntoIterator<Item = &'a WorkOrder>,
    {
        orders
            .into_iter()
            .filter(|order| self.matches(order))
            .collect()
    }

    // Selections given as codes (`P1`) match their display label.
    fn admits_priority(&self, label: Option<&str>) -> bool {
        match &self.priorities {
            Selection::Any => true,
            Selection::Only(values) => label.is_some_and(|label| {
                values.iter().any(|selected| {
                    normalize_priority(selected)
                        .is_some_and(|normalized| normalized.eq_ignore_ascii_case(label))
                })
            }),
        }
    }
}
