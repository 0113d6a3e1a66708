//! Recommendation Orchestrator — the entry point that turns a questionnaire into a recommendation.
//!
//! Providers are tried strictly in configured order, one at a time. Each attempt is bounded
//! by the per-provider timeout and its output must pass the validator. The first valid
//! candidate wins and later providers are never called. When every provider is skipped or
//! fails, the rule-based synthesizer produces the answer, so `recommend` cannot fail.

use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};

use crate::models::questionnaire::Questionnaire;
use crate::models::recommendation::Recommendation;
use crate::providers::{FailureCategory, ProviderError, RecommendationProvider};
use crate::recommendation::synthesizer::synthesize;
use crate::recommendation::validator::validate;

/// Where a recommendation came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecommendationSource {
    Provider(String),
    Synthesizer,
}

#[derive(Debug, Clone)]
pub struct Generated {
    pub recommendation: Recommendation,
    pub source: RecommendationSource,
}

pub struct Orchestrator {
    providers: Vec<Arc<dyn RecommendationProvider>>,
    timeout: Duration,
    synthesizer_seed: Option<u64>,
}

impl Orchestrator {
    pub fn new(
        providers: Vec<Arc<dyn RecommendationProvider>>,
        timeout: Duration,
        synthesizer_seed: Option<u64>,
    ) -> Self {
        Self {
            providers,
            timeout,
            synthesizer_seed,
        }
    }

    /// Names of the providers that will actually be attempted, in order.
    pub fn active_providers(&self) -> Vec<&str> {
        self.providers
            .iter()
            .filter(|p| p.is_configured())
            .map(|p| p.name())
            .collect()
    }

    pub async fn recommend(&self, questionnaire: &Questionnaire) -> Recommendation {
        self.recommend_with_source(questionnaire).await.recommendation
    }

    pub async fn recommend_with_source(&self, questionnaire: &Questionnaire) -> Generated {
        for provider in &self.providers {
            if !provider.is_configured() {
                debug!(provider = provider.name(), "Skipping unconfigured provider");
                continue;
            }

            if let Some(recommendation) = self.attempt(provider.as_ref(), questionnaire).await {
                return Generated {
                    recommendation,
                    source: RecommendationSource::Provider(provider.name().to_string()),
                };
            }
        }

        warn!("All providers exhausted, using rule-based synthesizer");
        let mut rng = match self.synthesizer_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Generated {
            recommendation: synthesize(questionnaire, &mut rng),
            source: RecommendationSource::Synthesizer,
        }
    }

    /// One bounded call plus validation. `None` means move on to the next provider.
    async fn attempt(
        &self,
        provider: &dyn RecommendationProvider,
        questionnaire: &Questionnaire,
    ) -> Option<Recommendation> {
        let name = provider.name();
        info!(provider = name, "Requesting recommendation");

        let outcome = match tokio::time::timeout(self.timeout, provider.generate(questionnaire)).await
        {
            Ok(result) => result,
            Err(_) => Err(ProviderError::Timeout {
                secs: self.timeout.as_secs(),
            }),
        };

        let candidate = match outcome {
            Ok(candidate) => candidate,
            Err(e) => {
                warn!(provider = name, category = %e.category(), error = %e, "Provider attempt failed");
                return None;
            }
        };

        match validate(&candidate) {
            Ok(recommendation) => {
                info!(provider = name, "Provider returned a valid recommendation");
                Some(recommendation)
            }
            Err(e) => {
                warn!(
                    provider = name,
                    category = %FailureCategory::Validation,
                    error = %e,
                    "Provider output rejected"
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::questionnaire::tests::sample;
    use crate::models::questionnaire::{CareerGoal, EducationLevel, LearningPreference};
    use crate::recommendation::validator::tests::valid_candidate;
    use async_trait::async_trait;
    use serde_json::Value;
    use std::sync::atomic::{AtomicUsize, Ordering};

    enum Reply {
        Candidate(Value),
        Network,
        Prose,
        Hang,
    }

    struct StubProvider {
        name: &'static str,
        configured: bool,
        reply: Reply,
        calls: AtomicUsize,
    }

    impl StubProvider {
        fn new(name: &'static str, reply: Reply) -> Arc<Self> {
            Arc::new(Self {
                name,
                configured: true,
                reply,
                calls: AtomicUsize::new(0),
            })
        }

        fn unconfigured(name: &'static str) -> Arc<Self> {
            Arc::new(Self {
                name,
                configured: false,
                reply: Reply::Network,
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl RecommendationProvider for StubProvider {
        fn name(&self) -> &str {
            self.name
        }

        fn is_configured(&self) -> bool {
            self.configured
        }

        async fn generate(&self, _questionnaire: &Questionnaire) -> Result<Value, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.reply {
                Reply::Candidate(value) => Ok(value.clone()),
                Reply::Network => Err(ProviderError::Network("connection refused".to_string())),
                Reply::Prose => Err(ProviderError::Decode("expected value".to_string())),
                Reply::Hang => {
                    std::future::pending::<()>().await;
                    unreachable!()
                }
            }
        }
    }

    fn orchestrator(providers: Vec<Arc<StubProvider>>) -> Orchestrator {
        Orchestrator::new(
            providers
                .into_iter()
                .map(|p| p as Arc<dyn RecommendationProvider>)
                .collect(),
            Duration::from_secs(20),
            Some(7),
        )
    }

    fn questionnaire() -> Questionnaire {
        sample(
            EducationLevel::Bachelor,
            CareerGoal::Leadership,
            LearningPreference::FullTime,
        )
    }

    fn alternate_candidate() -> Value {
        let mut candidate = valid_candidate();
        candidate["recommendedProgram"]["title"] = "MBA in Strategic Leadership".into();
        candidate
    }

    #[tokio::test]
    async fn test_first_valid_candidate_short_circuits() {
        let first = StubProvider::new("openai", Reply::Candidate(valid_candidate()));
        let second = StubProvider::new("anthropic", Reply::Candidate(alternate_candidate()));

        let generated = orchestrator(vec![first.clone(), second.clone()])
            .recommend_with_source(&questionnaire())
            .await;

        assert_eq!(
            generated.source,
            RecommendationSource::Provider("openai".to_string())
        );
        assert_eq!(generated.recommendation, validate(&valid_candidate()).unwrap());
        assert_eq!(first.calls(), 1);
        assert_eq!(second.calls(), 0);
    }

    #[tokio::test]
    async fn test_transport_failure_falls_through_to_second_provider() {
        let first = StubProvider::new("openai", Reply::Network);
        let second = StubProvider::new("anthropic", Reply::Candidate(alternate_candidate()));

        let generated = orchestrator(vec![first.clone(), second.clone()])
            .recommend_with_source(&questionnaire())
            .await;

        assert_eq!(
            generated.source,
            RecommendationSource::Provider("anthropic".to_string())
        );
        // Returned unchanged: no synthesizer values leak in.
        assert_eq!(
            generated.recommendation,
            validate(&alternate_candidate()).unwrap()
        );
        assert_eq!(first.calls(), 1);
        assert_eq!(second.calls(), 1);
    }

    #[tokio::test]
    async fn test_invalid_candidate_triggers_fallback() {
        let mut broken = valid_candidate();
        broken["financialInfo"]
            .as_object_mut()
            .unwrap()
            .remove("estimatedCost");

        let first = StubProvider::new("openai", Reply::Candidate(broken));
        let second = StubProvider::new("anthropic", Reply::Candidate(alternate_candidate()));

        let generated = orchestrator(vec![first, second.clone()])
            .recommend_with_source(&questionnaire())
            .await;

        assert_eq!(
            generated.source,
            RecommendationSource::Provider("anthropic".to_string())
        );
        assert_eq!(second.calls(), 1);
    }

    #[tokio::test]
    async fn test_both_failing_uses_synthesizer() {
        let first = StubProvider::new("openai", Reply::Network);
        let second = StubProvider::new("anthropic", Reply::Prose);

        let generated = orchestrator(vec![first.clone(), second.clone()])
            .recommend_with_source(&questionnaire())
            .await;

        assert_eq!(generated.source, RecommendationSource::Synthesizer);
        let value = serde_json::to_value(&generated.recommendation).unwrap();
        assert!(validate(&value).is_ok());
        assert_eq!(first.calls(), 1);
        assert_eq!(second.calls(), 1);
    }

    #[tokio::test]
    async fn test_unconfigured_providers_are_never_called() {
        let first = StubProvider::unconfigured("openai");
        let second = StubProvider::new("anthropic", Reply::Candidate(valid_candidate()));

        let orchestrator = orchestrator(vec![first.clone(), second]);
        assert_eq!(orchestrator.active_providers(), vec!["anthropic"]);

        let generated = orchestrator.recommend_with_source(&questionnaire()).await;
        assert_eq!(
            generated.source,
            RecommendationSource::Provider("anthropic".to_string())
        );
        assert_eq!(first.calls(), 0);
    }

    #[tokio::test]
    async fn test_no_providers_matches_rule_table() {
        let mut q = questionnaire();
        q.location = "New York".to_string();

        let recommendation = orchestrator(vec![]).recommend(&q).await;

        assert_eq!(
            recommendation.recommended_program.title,
            "Master of Business Administration (MBA)"
        );
        assert_eq!(recommendation.recommended_program.match_score, 88.0);
        assert_eq!(recommendation.program_insights.completion_time, "13 months");
        assert_eq!(
            recommendation.career_projections.salary_range,
            "$91,000 - $156,000"
        );
    }

    #[tokio::test]
    async fn test_seeded_fallback_is_repeatable() {
        let a = orchestrator(vec![]).recommend(&questionnaire()).await;
        let b = orchestrator(vec![]).recommend(&questionnaire()).await;
        assert_eq!(a, b);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hanging_provider_times_out_and_falls_through() {
        let first = StubProvider::new("openai", Reply::Hang);
        let second = StubProvider::new("anthropic", Reply::Candidate(valid_candidate()));

        let generated = orchestrator(vec![first.clone(), second.clone()])
            .recommend_with_source(&questionnaire())
            .await;

        assert_eq!(
            generated.source,
            RecommendationSource::Provider("anthropic".to_string())
        );
        assert_eq!(first.calls(), 1);
        assert_eq!(second.calls(), 1);
    }
}
