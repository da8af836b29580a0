//! Frequency label resolution.
//!
//! Maps a free-text recurrence label to the number of times a task is
//! expected to happen per month. Labels are matched after trimming and
//! lowercasing. Unknown labels resolve to zero occurrences: a typo in the
//! source data lowers the computed load of one group instead of failing
//! the whole run.

/// Recognized recurrence of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Frequency {
    Daily,
    Weekly,
    Fortnightly,
    Monthly,
    Bimonthly,
    Quarterly,
    Semiannual,
    Annual,
    /// Anything not in the table.
    Unrecognized,
}

impl Frequency {
    /// Resolve a label. Case and surrounding whitespace are ignored.
    pub fn from_label(label: &str) -> Self {
        match normalize_label(label).as_str() {
            "diária" | "diario" | "diariamente" => Frequency::Daily,
            "semanal" => Frequency::Weekly,
            "quinzenal" => Frequency::Fortnightly,
            "mensal" => Frequency::Monthly,
            "bimestral" => Frequency::Bimonthly,
            "trimestral" => Frequency::Quarterly,
            "semestral" => Frequency::Semiannual,
            "anual" => Frequency::Annual,
            _ => Frequency::Unrecognized,
        }
    }

    /// Expected occurrences per month (20 working days, 4 weeks).
    pub fn monthly_occurrences(self) -> f64 {
        match self {
            Frequency::Daily => 20.0,
            Frequency::Weekly => 4.0,
            Frequency::Fortnightly => 2.0,
            Frequency::Monthly => 1.0,
            Frequency::Bimonthly => 0.5,
            Frequency::Quarterly => 1.0 / 3.0,
            Frequency::Semiannual => 1.0 / 6.0,
            Frequency::Annual => 1.0 / 12.0,
            Frequency::Unrecognized => 0.0,
        }
    }

    pub fn is_recognized(self) -> bool {
        self != Frequency::Unrecognized
    }
}

/// Trim and lowercase a frequency label before lookup.
pub fn normalize_label(label: &str) -> String {
    label.trim().to_lowercase()
}

/// Occurrences per month for a label; 0 when unrecognized.
pub fn monthly_occurrences(label: &str) -> f64 {
    Frequency::from_label(label).monthly_occurrences()
}
