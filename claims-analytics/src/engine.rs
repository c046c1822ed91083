//! Query engine over a loaded [`Dataset`].
//!
//! Every query is a full scan of one or two collections. Results that can be
//! "not found" come back as `Option`, which keeps them apart from a real zero.

use chrono::Datelike;
use serde::{Serialize, Serializer};
use std::collections::{BTreeMap, HashMap};
use std::f64::consts::PI;
use std::ops::RangeInclusive;
use std::sync::Arc;
use tracing::debug;

use crate::{
    dataset::Dataset,
    error::{AnalyticsError, Result},
    record::Disaster,
    region::Region,
};

/// Agent ids tracked by [`QueryEngine::agent_total_claim_costs`]
pub const AGENT_ID_RANGE: RangeInclusive<i64> = 1..=100;

/// Valid claim severity ratings
pub const SEVERITY_RANGE: RangeInclusive<i64> = 1..=10;

/// Entry of the per-agent cost map
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AgentTotal {
    /// Rounded sum of claim costs for an agent in [`AGENT_ID_RANGE`]
    Total(f64),
    /// A claim referenced an agent id outside [`AGENT_ID_RANGE`]
    Invalid,
}

impl Serialize for AgentTotal {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            AgentTotal::Total(total) => serializer.serialize_f64(*total),
            AgentTotal::Invalid => serializer.serialize_none(),
        }
    }
}

/// Which end of a count grouping to pick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extremum {
    Most,
    Least,
}

/// Answers analytical questions about agents, claims and disasters
#[derive(Debug, Clone)]
pub struct QueryEngine {
    dataset: Arc<Dataset>,
}

impl QueryEngine {
    pub fn new(dataset: Arc<Dataset>) -> Self {
        Self { dataset }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// Number of claims with status exactly "Closed"
    pub fn closed_claim_count(&self) -> usize {
        self.dataset
            .claims()
            .iter()
            .filter(|claim| claim.is_closed())
            .count()
    }

    /// Number of claims assigned to a claim handler, 0 when there are none
    pub fn claims_for_handler(&self, claim_handler_id: i64) -> usize {
        self.dataset
            .claims()
            .iter()
            .filter(|claim| claim.claim_handler_assigned_id == claim_handler_id)
            .count()
    }

    /// Number of disasters for a full state name, matched case-sensitively
    pub fn disasters_for_state(&self, state: &str) -> usize {
        self.dataset
            .disasters()
            .iter()
            .filter(|disaster| disaster.state == state)
            .count()
    }

    /// Number of disasters whose state belongs to `region`
    pub fn disasters_for_region(&self, region: Region) -> usize {
        self.dataset
            .disasters()
            .iter()
            .filter(|disaster| region.contains(&disaster.state))
            .count()
    }

    /// Summed estimate cost of the claims for a disaster.
    ///
    /// `None` when no claim references the disaster.
    pub fn total_claim_cost_for_disaster(&self, disaster_id: i64) -> Option<f64> {
        let (total, count) = self
            .dataset
            .claims()
            .iter()
            .filter(|claim| claim.disaster_id == disaster_id)
            .fold((0.0, 0usize), |(total, count), claim| {
                (total + claim.estimate_cost, count + 1)
            });

        (count > 0).then(|| round_to(total, 2))
    }

    /// Average estimate cost of the claims assigned to a handler.
    ///
    /// `None` when the handler has no claims.
    pub fn average_claim_cost_for_handler(&self, claim_handler_id: i64) -> Option<f64> {
        let (total, count) = self
            .dataset
            .claims()
            .iter()
            .filter(|claim| claim.claim_handler_assigned_id == claim_handler_id)
            .fold((0.0, 0usize), |(total, count), claim| {
                (total + claim.estimate_cost, count + 1)
            });

        (count > 0).then(|| round_to(total / count as f64, 2))
    }

    pub fn state_with_most_disasters(&self) -> Option<String> {
        self.state_by_disaster_count(Extremum::Most)
    }

    pub fn state_with_least_disasters(&self) -> Option<String> {
        self.state_by_disaster_count(Extremum::Least)
    }

    /// State with the highest or lowest disaster count among the states that
    /// appear in the data. Ties go to the alphabetically first state.
    pub fn state_by_disaster_count(&self, extremum: Extremum) -> Option<String> {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for disaster in self.dataset.disasters() {
            *counts.entry(disaster.state.as_str()).or_default() += 1;
        }

        pick_by_count(&counts, extremum).map(str::to_string)
    }

    /// Most common second language among the agents of a state.
    ///
    /// Ties go to the alphabetically first language. Returns an empty string
    /// when no agent in the state speaks a second language.
    pub fn most_spoken_secondary_language(&self, state: &str) -> String {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for agent in self.dataset.agents().iter().filter(|a| a.state == state) {
            if let Some(language) = agent.secondary_language() {
                *counts.entry(language).or_default() += 1;
            }
        }

        pick_by_count(&counts, Extremum::Most)
            .map(str::to_string)
            .unwrap_or_default()
    }

    /// Open claims of an agent with a severity of at least `min_severity_rating`.
    ///
    /// Fails with [`AnalyticsError::SeverityOutOfRange`] when the threshold is
    /// outside 1..=10. A count of zero is reported as `None`, the same as an
    /// agent with no claims at all.
    pub fn open_claims_for_agent(
        &self,
        agent_id: i64,
        min_severity_rating: i64,
    ) -> Result<Option<usize>> {
        if !SEVERITY_RANGE.contains(&min_severity_rating) {
            debug!(min_severity_rating, "severity threshold out of range");
            return Err(AnalyticsError::SeverityOutOfRange(min_severity_rating));
        }

        let count = self
            .dataset
            .claims()
            .iter()
            .filter(|claim| {
                claim.agent_assigned_id == agent_id
                    && !claim.is_closed()
                    && claim.severity_rating >= min_severity_rating
            })
            .count();

        Ok((count > 0).then_some(count))
    }

    /// Number of disasters declared strictly after their end date
    pub fn disasters_declared_after_end(&self) -> usize {
        self.dataset
            .disasters()
            .iter()
            .filter(|disaster| disaster.declared_after_end())
            .count()
    }

    /// Total claim cost per agent id.
    ///
    /// Ids 1..=100 start at 0. A claim for an id outside that range marks the
    /// id as [`AgentTotal::Invalid`].
    pub fn agent_total_claim_costs(&self) -> BTreeMap<i64, AgentTotal> {
        let mut totals: BTreeMap<i64, AgentTotal> = AGENT_ID_RANGE
            .map(|agent_id| (agent_id, AgentTotal::Total(0.0)))
            .collect();

        for claim in self.dataset.claims() {
            let agent_id = claim.agent_assigned_id;
            if !AGENT_ID_RANGE.contains(&agent_id) {
                totals.insert(agent_id, AgentTotal::Invalid);
                continue;
            }

            if let Some(AgentTotal::Total(total)) = totals.get_mut(&agent_id) {
                *total = round_to(*total + claim.estimate_cost, 2);
            }
        }

        totals
    }

    /// Claims per square mile of a disaster's impact circle, rounded to 5 places.
    ///
    /// `None` when the disaster is unknown or has a zero radius.
    pub fn disaster_claim_density(&self, disaster_id: i64) -> Option<f64> {
        let claims = self
            .dataset
            .claims()
            .iter()
            .filter(|claim| claim.disaster_id == disaster_id)
            .count();
        let radius = self
            .dataset
            .disaster(disaster_id)
            .map_or(0.0, |disaster| disaster.radius_miles);

        let area = PI * radius * radius;
        if area == 0.0 {
            return None;
        }

        Some(round_to(claims as f64 / area, 5))
    }

    /// The three months with the most claims, busiest first.
    ///
    /// A claim falls in the month its disaster was declared; claims pointing
    /// at an unknown disaster are skipped. Equal counts are ordered most recent
    /// month first. Months are labelled like "March 2023".
    pub fn top_three_months_by_claims(&self) -> Vec<String> {
        let disasters: HashMap<i64, &Disaster> = self
            .dataset
            .disasters()
            .iter()
            .map(|disaster| (disaster.id, disaster))
            .collect();

        let mut months: HashMap<(i32, u32), (String, usize)> = HashMap::new();
        for claim in self.dataset.claims() {
            let Some(disaster) = disasters.get(&claim.disaster_id) else {
                continue;
            };
            let declared = disaster.declared_date;
            months
                .entry((declared.year(), declared.month()))
                .or_insert_with(|| (declared.format("%B %Y").to_string(), 0))
                .1 += 1;
        }

        let mut ranked: Vec<((i32, u32), (String, usize))> = months.into_iter().collect();
        ranked.sort_by(|(month_a, (label_a, count_a)), (month_b, (label_b, count_b))| {
            count_b
                .cmp(count_a)
                .then_with(|| month_b.cmp(month_a))
                .then_with(|| label_a.cmp(label_b))
        });

        ranked
            .into_iter()
            .take(3)
            .map(|(_, (label, _))| label)
            .collect()
    }
}

impl From<Dataset> for QueryEngine {
    fn from(dataset: Dataset) -> Self {
        Self::new(Arc::new(dataset))
    }
}

/// First key in order whose count is the max (or min) of all counts
fn pick_by_count<'a>(counts: &BTreeMap<&'a str, usize>, extremum: Extremum) -> Option<&'a str> {
    let target = match extremum {
        Extremum::Most => counts.values().max(),
        Extremum::Least => counts.values().min(),
    }?;

    counts
        .iter()
        .find(|(_, count)| *count == target)
        .map(|(key, _)| *key)
}

pub(crate) fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
