//! The grounded answer composer: `answer_query`.
//!
//! One request runs as a single chain. Retrieval and fact computation are
//! independent and run concurrently, then join before the prompt is built.
//! The generation service is called once; only an outright failure is
//! retried, against the configured budget. Generated figures are then
//! cross-checked against the computed facts.

use std::sync::Arc;
use std::time::{Duration, Instant};

use akta_config::ComposerConfig;
use akta_core::{
    AnswerError, ComplianceAnswer, ComputedFact, MismatchPolicy, NumericInputs, RuleCategory,
    ValidationStatus,
};
use akta_rules::{RulesEngine, RulesError, detect_categories};
use akta_search::Retriever;
use chrono::NaiveDate;

use crate::error::{ComposeError, GenerationError};
use crate::extract::extract_inputs;
use crate::generation::GenerationService;
use crate::prompt::PromptBuilder;
use crate::render::{correction, rules_only};
use crate::validate::Validator;

pub struct Composer {
    retriever: Arc<Retriever>,
    rules: Arc<RulesEngine>,
    generator: Arc<dyn GenerationService>,
    prompts: PromptBuilder,
    validator: Validator,
    policy: MismatchPolicy,
    retry_budget: u32,
    max_tokens: u32,
    deadline: Duration,
    defaults: NumericInputs,
}

/// Facts for the detected categories, plus the categories that had none.
struct Facts {
    facts: Vec<ComputedFact>,
    notes: Vec<String>,
}

enum GenerateFailure {
    Deadline(ComposeError),
    Service(GenerationError),
}

impl Composer {
    pub fn new(
        retriever: Arc<Retriever>,
        rules: Arc<RulesEngine>,
        generator: Arc<dyn GenerationService>,
        config: &ComposerConfig,
        max_tokens: u32,
    ) -> Self {
        let validator = Validator::new(rules.tolerance());
        Self {
            retriever,
            rules,
            generator,
            prompts: PromptBuilder::from_config(config),
            validator,
            policy: config.mismatch_policy,
            retry_budget: config.retry_budget,
            max_tokens,
            deadline: Duration::from_secs(config.request_deadline_secs),
            defaults: NumericInputs::default()
                .with_age(config.default_age)
                .with_citizenship(config.default_citizenship),
        }
    }

    /// Override the overall request deadline.
    #[must_use]
    pub const fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    #[must_use]
    pub const fn with_policy(mut self, policy: MismatchPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Answer `query` as of `as_of`.
    ///
    /// Without `inputs`, figures stated in the query are used. Unset age and
    /// citizenship fall back to the configured defaults. Never fails: every
    /// failure is reported through `validation_status` and `error`.
    pub async fn answer_query(
        &self,
        query: &str,
        as_of: NaiveDate,
        inputs: Option<NumericInputs>,
    ) -> ComplianceAnswer {
        let started = Instant::now();
        let deadline = started + self.deadline;
        let inputs = inputs
            .unwrap_or_else(|| extract_inputs(query))
            .or(self.defaults);
        let categories = detect_categories(query);

        let (retrieval, facts) = tokio::join!(
            self.retriever.search(query, self.retriever.default_k()),
            async { self.compute_facts(&categories, &inputs, as_of) },
        );
        let facts = match facts {
            Ok(facts) => facts,
            Err(error) => return failed(query, as_of, inputs, &error),
        };
        if let Err(error) = self.check_deadline(deadline, "retrieval") {
            return failed(query, as_of, inputs, &error);
        }

        let mut notes = facts.notes;
        if retrieval.partial {
            notes.push("retrieval timed out; passages are partial".to_string());
        }
        if retrieval.lexical_only {
            notes.push("semantic search unavailable; passages ranked lexically".to_string());
        }

        let prompt = self
            .prompts
            .build(query, as_of, &retrieval.results, &facts.facts);
        let generated = self.generate(&prompt.text, deadline).await;

        let mut answer = ComplianceAnswer {
            query: query.to_string(),
            as_of,
            inputs,
            retrieved_chunks: retrieval.results,
            computed_facts: facts.facts,
            generated_text: String::new(),
            validation_status: ValidationStatus::Unverified,
            mismatches: Vec::new(),
            notes,
            error: None,
        };

        match generated {
            Err(GenerateFailure::Deadline(error)) => {
                return failed(query, as_of, inputs, &error);
            }
            Err(GenerateFailure::Service(error)) => {
                answer.generated_text =
                    rules_only(&answer.computed_facts, &answer.retrieved_chunks, &answer.notes);
                answer.validation_status = ValidationStatus::GenerationFailed;
                answer.error = Some(AnswerError::from(&error));
            }
            Ok(text) => {
                if let Err(error) = self.check_deadline(deadline, "generation") {
                    return failed(query, as_of, inputs, &error);
                }
                let verdict = self.validator.check(&text, &answer.computed_facts, &inputs);
                answer.generated_text = match (verdict.status, self.policy) {
                    (ValidationStatus::Rejected, MismatchPolicy::Substitute) => rules_only(
                        &answer.computed_facts,
                        &answer.retrieved_chunks,
                        &answer.notes,
                    ),
                    (ValidationStatus::Rejected, MismatchPolicy::Annotate) => {
                        format!("{text}\n\n{}", correction(&verdict.mismatches))
                    }
                    _ => text,
                };
                answer.validation_status = verdict.status;
                answer.mismatches = verdict.mismatches;
            }
        }

        tracing::info!(
            status = %answer.validation_status,
            passages = answer.retrieved_chunks.len(),
            prompt_passages = prompt.passages,
            facts = answer.computed_facts.len(),
            elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            "compose: answered"
        );
        answer
    }

    fn compute_facts(
        &self,
        categories: &[RuleCategory],
        inputs: &NumericInputs,
        as_of: NaiveDate,
    ) -> Result<Facts, ComposeError> {
        let mut facts = Vec::new();
        let mut notes = Vec::new();
        for category in categories {
            match self.rules.compute(*category, inputs, as_of) {
                Ok(fact) => facts.push(fact),
                Err(error @ (RulesError::NoApplicableRule { .. } | RulesError::MissingInput { .. })) => {
                    tracing::debug!(%category, %error, "compose: no fact for detected category");
                    notes.push(error.to_string());
                }
                Err(error) => return Err(error.into()),
            }
        }
        Ok(Facts { facts, notes })
    }

    async fn generate(&self, prompt: &str, deadline: Instant) -> Result<String, GenerateFailure> {
        let mut attempt: u32 = 0;
        loop {
            let error = match self.generator.generate(prompt, self.max_tokens).await {
                Ok(text) if !text.trim().is_empty() => return Ok(text),
                Ok(_) => GenerationError::EmptyCompletion,
                Err(error) => error,
            };
            self.check_deadline(deadline, "generation")
                .map_err(GenerateFailure::Deadline)?;
            if !error.kind().is_transient() || attempt >= self.retry_budget {
                tracing::warn!(
                    generator = self.generator.name(),
                    attempts = attempt + 1,
                    %error,
                    "compose: generation failed, answering from rules only"
                );
                return Err(GenerateFailure::Service(error));
            }
            attempt += 1;
            tracing::warn!(attempt, %error, "compose: generation failed, retrying");
        }
    }

    fn check_deadline(&self, deadline: Instant, stage: &'static str) -> Result<(), ComposeError> {
        if Instant::now() < deadline {
            return Ok(());
        }
        Err(ComposeError::DeadlineExceeded {
            stage,
            ms: u64::try_from(self.deadline.as_millis()).unwrap_or(u64::MAX),
        })
    }
}

fn failed(
    query: &str,
    as_of: NaiveDate,
    inputs: NumericInputs,
    error: &ComposeError,
) -> ComplianceAnswer {
    match error {
        ComposeError::Rules(RulesError::AmbiguousRule { .. }) => {
            tracing::error!(%error, "compose: rule table integrity failure, request halted");
        }
        _ => tracing::warn!(%error, "compose: request failed"),
    }
    ComplianceAnswer::failed(query, as_of, inputs, AnswerError::from(error))
}
