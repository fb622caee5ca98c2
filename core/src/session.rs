//! Challenge session
//!
//! A session owns one answer store and wires it into a generator and a
//! validator. It tracks the challenge currently being worked on and clears
//! state when the schema is replaced or the history is reset.

use std::sync::{Arc, RwLock};
use uuid::Uuid;
use log::{debug, info};

use crate::challenge::{AnswerStore, AnswerValidator, ChallengeGenerator, RandomSource, SeededRandom};
use crate::config::CoreConfig;
use crate::error::{ChallengeError, CoreError, Result};
use crate::models::{Challenge, Verdict};
use crate::schema::SchemaProvider;
use crate::sql::SqlInspector;

/// Session state for one user working through challenges
pub struct ChallengeSession {
    /// Answer key shared by generator and validator
    store: Arc<AnswerStore>,

    /// Challenge generator
    generator: ChallengeGenerator,

    /// Answer validator
    validator: AnswerValidator,

    /// Parser shared with the tools
    inspector: SqlInspector,

    /// Challenge currently being worked on
    active: RwLock<Option<Uuid>>,
}

impl ChallengeSession {
    /// Create a session from configuration
    pub fn new(schema: Arc<dyn SchemaProvider>, config: &CoreConfig) -> Self {
        let rng = SeededRandom::from_optional_seed(config.challenge.rng_seed);
        Self::with_random(schema, config, Box::new(rng))
    }

    /// Create a session with an explicit random source
    pub fn with_random(
        schema: Arc<dyn SchemaProvider>,
        config: &CoreConfig,
        rng: Box<dyn RandomSource>,
    ) -> Self {
        let store = Arc::new(AnswerStore::new());
        let inspector = SqlInspector::new(config.sql.dialect);
        let generator = ChallengeGenerator::new(schema, Arc::clone(&store), rng)
            .with_max_sample_rows(config.challenge.max_sample_rows);
        let validator = AnswerValidator::new(Arc::clone(&store), inspector);

        ChallengeSession {
            store,
            generator,
            validator,
            inspector,
            active: RwLock::new(None),
        }
    }

    /// Current schema
    pub fn schema(&self) -> Result<Arc<dyn SchemaProvider>> {
        self.generator.schema()
    }

    /// Parser configured for this session
    pub fn inspector(&self) -> &SqlInspector {
        &self.inspector
    }

    /// Answer store backing this session
    pub fn store(&self) -> &Arc<AnswerStore> {
        &self.store
    }

    /// Generate a challenge and make it the active one.
    ///
    /// The challenge it replaces is dropped from the answer store.
    pub fn generate_challenge(&self, difficulty: &str) -> Result<Challenge> {
        let challenge = self.generator.generate(difficulty)?;

        let mut active = self.active.write()
            .map_err(|e| CoreError::StateError(format!("Failed to write active challenge: {}", e)))?;
        if let Some(previous) = active.replace(challenge.id) {
            if self.store.remove(&previous)?.is_some() {
                debug!("Dropped superseded challenge {}", previous);
            }
        }

        Ok(challenge)
    }

    /// Validate an answer; a pass consumes the challenge
    pub fn validate_challenge_answer(&self, id: &str, sql: &str) -> Result<Verdict> {
        let verdict = self.validator.validate_and_consume(id, sql)?;

        if verdict.is_pass() {
            let mut active = self.active.write()
                .map_err(|e| CoreError::StateError(format!("Failed to write active challenge: {}", e)))?;
            let solved = Uuid::parse_str(id.trim()).ok();
            if active.is_some() && *active == solved {
                *active = None;
            }
            info!("Challenge {} solved", id.trim());
        }

        Ok(verdict)
    }

    /// Validate an answer against the active challenge
    pub fn submit(&self, sql: &str) -> Result<Verdict> {
        let id = self.active_challenge_id()?.ok_or(ChallengeError::MissingId)?;
        self.validate_challenge_answer(&id.to_string(), sql)
    }

    /// Identifier of the active challenge
    pub fn active_challenge_id(&self) -> Result<Option<Uuid>> {
        let active = self.active.read()
            .map_err(|e| CoreError::StateError(format!("Failed to read active challenge: {}", e)))?;
        Ok(*active)
    }

    fn set_active(&self, id: Option<Uuid>) -> Result<()> {
        let mut active = self.active.write()
            .map_err(|e| CoreError::StateError(format!("Failed to write active challenge: {}", e)))?;
        *active = id;
        Ok(())
    }

    /// Abandon the active challenge, dropping its answer store entry
    pub fn skip(&self) -> Result<Option<Uuid>> {
        let mut active = self.active.write()
            .map_err(|e| CoreError::StateError(format!("Failed to write active challenge: {}", e)))?;
        let skipped = active.take();
        if let Some(id) = &skipped {
            self.store.remove(id)?;
        }
        Ok(skipped)
    }

    /// Replace the schema, invalidating every outstanding challenge
    pub fn replace_schema(&self, schema: Arc<dyn SchemaProvider>) -> Result<()> {
        self.generator.set_schema(schema)?;
        let purged = self.reset()?;
        info!("Schema replaced, {} outstanding challenges dropped", purged);
        Ok(())
    }

    /// Forget the active challenge and every outstanding solution
    pub fn clear_history(&self) -> Result<()> {
        let purged = self.reset()?;
        info!("History cleared, {} outstanding challenges dropped", purged);
        Ok(())
    }

    fn reset(&self) -> Result<usize> {
        self.set_active(None)?;
        self.store.clear()
    }
}
