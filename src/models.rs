use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::errors::DashboardError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Population {
    Students,
    Staff,
}

impl Population {
    pub const ALL: [Population; 2] = [Population::Students, Population::Staff];

    pub fn as_str(self) -> &'static str {
        match self {
            Population::Students => "STUDENTS",
            Population::Staff => "STAFF",
        }
    }

    pub fn prefix(self) -> &'static str {
        match self {
            Population::Staff => "STAFF",
            Population::Students => "STUD",
        }
    }
}

impl FromStr for Population {
    type Err = DashboardError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "STUDENTS" => Ok(Population::Students),
            "STAFF" => Ok(Population::Staff),
            other => Err(DashboardError::InvalidFilter(format!(
                "population must be 'STUDENTS' or 'STAFF', got '{other}'"
            ))),
        }
    }
}

impl fmt::Display for Population {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Condition {
    Isolated,
    Quarantined,
    Recovered,
}

impl Condition {
    pub const ALL: [Condition; 3] = [
        Condition::Isolated,
        Condition::Quarantined,
        Condition::Recovered,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Condition::Isolated => "ISOLATED",
            Condition::Quarantined => "QUARANTINED",
            Condition::Recovered => "RECOVERED",
        }
    }

    pub fn suffix(self) -> &'static str {
        match self {
            Condition::Isolated => "ISO",
            Condition::Quarantined => "Q",
            Condition::Recovered => "REC",
        }
    }
}

impl FromStr for Condition {
    type Err = DashboardError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "ISOLATED" => Ok(Condition::Isolated),
            "QUARANTINED" => Ok(Condition::Quarantined),
            "RECOVERED" => Ok(Condition::Recovered),
            other => Err(DashboardError::InvalidFilter(format!(
                "condition must be 'ISOLATED', 'QUARANTINED' or 'RECOVERED', got '{other}'"
            ))),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Composite population + condition code as it appears in the `Cond Type` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CondType {
    #[serde(rename = "STAFF_ISO")]
    StaffIso,
    #[serde(rename = "STAFF_Q")]
    StaffQ,
    #[serde(rename = "STAFF_REC")]
    StaffRec,
    #[serde(rename = "STUD_ISO")]
    StudIso,
    #[serde(rename = "STUD_Q")]
    StudQ,
    #[serde(rename = "STUD_REC")]
    StudRec,
}

impl CondType {
    pub const ALL: [CondType; 6] = [
        CondType::StaffIso,
        CondType::StaffQ,
        CondType::StaffRec,
        CondType::StudIso,
        CondType::StudQ,
        CondType::StudRec,
    ];

    /// Maps a filter selection onto its code. Total over both enums.
    pub fn resolve(population: Population, condition: Condition) -> Self {
        match (population, condition) {
            (Population::Staff, Condition::Isolated) => CondType::StaffIso,
            (Population::Staff, Condition::Quarantined) => CondType::StaffQ,
            (Population::Staff, Condition::Recovered) => CondType::StaffRec,
            (Population::Students, Condition::Isolated) => CondType::StudIso,
            (Population::Students, Condition::Quarantined) => CondType::StudQ,
            (Population::Students, Condition::Recovered) => CondType::StudRec,
        }
    }

    pub fn for_population(population: Population) -> [CondType; 3] {
        Condition::ALL.map(|condition| CondType::resolve(population, condition))
    }

    pub fn population(self) -> Population {
        match self {
            CondType::StaffIso | CondType::StaffQ | CondType::StaffRec => Population::Staff,
            CondType::StudIso | CondType::StudQ | CondType::StudRec => Population::Students,
        }
    }

    pub fn condition(self) -> Condition {
        match self {
            CondType::StaffIso | CondType::StudIso => Condition::Isolated,
            CondType::StaffQ | CondType::StudQ => Condition::Quarantined,
            CondType::StaffRec | CondType::StudRec => Condition::Recovered,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            CondType::StaffIso => "STAFF_ISO",
            CondType::StaffQ => "STAFF_Q",
            CondType::StaffRec => "STAFF_REC",
            CondType::StudIso => "STUD_ISO",
            CondType::StudQ => "STUD_Q",
            CondType::StudRec => "STUD_REC",
        }
    }
}

impl FromStr for CondType {
    type Err = DashboardError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        CondType::ALL
            .into_iter()
            .find(|cond_type| cond_type.code() == value)
            .ok_or_else(|| DashboardError::UnknownCondType(value.to_string()))
    }
}

impl fmt::Display for CondType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub date: NaiveDate,
    pub location: String,
    pub cond_type: CondType,
    pub value: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterState {
    pub population: Population,
    pub condition: Condition,
}

impl FilterState {
    pub fn cond_type(&self) -> CondType {
        CondType::resolve(self.population, self.condition)
    }
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            population: Population::Students,
            condition: Condition::Isolated,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct FilterQuery {
    pub population: Option<String>,
    pub condition: Option<String>,
}

impl TryFrom<FilterQuery> for FilterState {
    type Error = DashboardError;

    fn try_from(query: FilterQuery) -> Result<Self, Self::Error> {
        let defaults = FilterState::default();
        let population = match query.population.as_deref() {
            Some(value) => value.parse()?,
            None => defaults.population,
        };
        let condition = match query.condition.as_deref() {
            Some(value) => value.parse()?,
            None => defaults.condition,
        };
        Ok(FilterState {
            population,
            condition,
        })
    }
}

/// `M/D/YYYY` without zero padding, as used in chart labels and titles.
pub fn date_label(date: NaiveDate) -> String {
    format!("{}/{}/{}", date.month(), date.day(), date.year())
}
