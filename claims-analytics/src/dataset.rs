use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::info;

use crate::{
    error::{AnalyticsError, Result},
    loader::RecordLoader,
    record::{Agent, Claim, ClaimHandler, Collection, Disaster},
};

/// The four record collections, fully loaded and read-only from here on
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    agents: Vec<Agent>,
    claim_handlers: Vec<ClaimHandler>,
    claims: Vec<Claim>,
    disasters: Vec<Disaster>,
}

impl Dataset {
    pub fn new(
        agents: Vec<Agent>,
        claim_handlers: Vec<ClaimHandler>,
        claims: Vec<Claim>,
        disasters: Vec<Disaster>,
    ) -> Self {
        Self {
            agents,
            claim_handlers,
            claims,
            disasters,
        }
    }

    /// Load every collection through `loader`, keeping the order records come in
    pub async fn load(loader: &dyn RecordLoader) -> Result<Self> {
        let agents = decode(Collection::Agents, loader.load(Collection::Agents).await?)?;
        let claim_handlers = decode(
            Collection::ClaimHandlers,
            loader.load(Collection::ClaimHandlers).await?,
        )?;
        let claims = decode(Collection::Claims, loader.load(Collection::Claims).await?)?;
        let disasters = decode(
            Collection::Disasters,
            loader.load(Collection::Disasters).await?,
        )?;

        let dataset = Self::new(agents, claim_handlers, claims, disasters);
        info!(
            agents = dataset.agents.len(),
            claim_handlers = dataset.claim_handlers.len(),
            claims = dataset.claims.len(),
            disasters = dataset.disasters.len(),
            "dataset loaded"
        );
        Ok(dataset)
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn claim_handlers(&self) -> &[ClaimHandler] {
        &self.claim_handlers
    }

    pub fn claims(&self) -> &[Claim] {
        &self.claims
    }

    pub fn disasters(&self) -> &[Disaster] {
        &self.disasters
    }

    pub fn disaster(&self, id: i64) -> Option<&Disaster> {
        self.disasters.iter().find(|disaster| disaster.id == id)
    }
}

fn decode<T: DeserializeOwned>(collection: Collection, records: Vec<Value>) -> Result<Vec<T>> {
    records
        .into_iter()
        .map(|record| {
            serde_json::from_value(record)
                .map_err(|source| AnalyticsError::Deserialize { collection, source })
        })
        .collect()
}
