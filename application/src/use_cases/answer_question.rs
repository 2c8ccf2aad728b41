//! Answer Question use case.
//!
//! Drives one question-answering request through the retrieval pipeline:
//!
//! ```text
//! Init → Resolving → Paging(n) → Validating(batch) → Scoring → … → Done
//! ```
//!
//! Cached pages are read first, then fresh upstream pages. Per page, member
//! names not seen before trigger re-resolution, the page is filtered down to
//! candidates, and candidates are validated in capped batches. Every
//! grounded answer is scored; the best one is kept, and paging stops as soon
//! as an answer reaches the confidence threshold.

use crate::config::PipelineParams;
use crate::ports::answer_oracle::AnswerOracle;
use crate::ports::message_cache::MessageCache;
use crate::ports::message_source::{MessageSource, SourceError};
use crate::ports::progress::{AskProgressNotifier, NoProgress};
use crate::use_cases::fetch_pages::{PageStream, PaginatedFetcher};
use crate::use_cases::resolve_members::NameResolver;
use crate::use_cases::validate_answer::AnswerValidator;
use member_qa_domain::util::truncate_str;
use member_qa_domain::{
    AskOutcome, BestAnswer, MemberRoster, Question, QuestionParser, ResolvedMembers, ScoredAnswer,
    ValidationResult, filter_candidates,
};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Request-level failure. Everything below this level is absorbed.
#[derive(Error, Debug)]
pub enum AskError {
    /// No message could be read from the cache or the upstream source.
    #[error("Unable to process the question right now.")]
    NoMessagesAvailable(#[source] SourceError),
}

/// Where the request currently is, for tracing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AskState {
    Init,
    Resolving,
    Paging(usize),
    Validating { page: usize, batch: usize },
    Scoring,
    Done,
}

fn enter(state: AskState) {
    debug!(?state, "Ask state");
}

pub struct AnswerQuestionUseCase {
    cache: Arc<dyn MessageCache>,
    source: Arc<dyn MessageSource>,
    oracle: Arc<dyn AnswerOracle>,
    parser: QuestionParser,
    params: PipelineParams,
}

impl AnswerQuestionUseCase {
    pub fn new(
        cache: Arc<dyn MessageCache>,
        source: Arc<dyn MessageSource>,
        oracle: Arc<dyn AnswerOracle>,
    ) -> Self {
        Self {
            cache,
            source,
            oracle,
            parser: QuestionParser::new(),
            params: PipelineParams::default(),
        }
    }

    pub fn with_params(mut self, params: PipelineParams) -> Self {
        self.params = params;
        self
    }

    pub fn params(&self) -> &PipelineParams {
        &self.params
    }

    /// Answer a question without progress reporting.
    pub async fn execute(&self, question: &str) -> Result<AskOutcome, AskError> {
        self.execute_with_progress(question, &NoProgress).await
    }

    pub async fn execute_with_progress(
        &self,
        question: &str,
        progress: &dyn AskProgressNotifier,
    ) -> Result<AskOutcome, AskError> {
        self.execute_with_history(question, &[], progress).await
    }

    /// Answer one turn of a conversation.
    ///
    /// `earlier` holds the previous questions, oldest first; they are only
    /// used to resolve references like "her" to members.
    pub async fn execute_with_history(
        &self,
        question: &str,
        earlier: &[String],
        progress: &dyn AskProgressNotifier,
    ) -> Result<AskOutcome, AskError> {
        enter(AskState::Init);
        let question = match Question::try_new(question) {
            Ok(q) => q,
            Err(_) => {
                debug!("Blank question");
                return Ok(AskOutcome::empty_question());
            }
        };
        info!("Answering: {}", truncate_str(question.content(), 100));

        let parsed = self.parser.parse(question.content());
        debug!(
            names = ?parsed.name_candidates,
            keywords = ?parsed.keywords,
            "Parsed question"
        );

        let params = &self.params;
        let resolver = NameResolver::new(
            self.oracle.clone(),
            params.max_resolver_names,
            params.oracle_retry,
        );
        let validator = AnswerValidator::new(
            self.oracle.clone(),
            params.max_validator_messages,
            params.oracle_retry,
        );
        let fetcher = PaginatedFetcher::new(
            self.source.clone(),
            params.page_size,
            params.min_fetch_interval,
        );
        let mut pages = PageStream::new(
            self.cache.clone(),
            fetcher,
            params.max_pages,
            params.max_fetch_failures,
        );

        let mut roster = MemberRoster::new();
        let mut members = ResolvedMembers::empty();
        let mut best = BestAnswer::new();
        let mut messages_seen = 0usize;

        'paging: while let Some(next) = pages.next_page().await {
            let page = match next {
                Ok(page) => page,
                Err(e) => {
                    let index = pages.pages_yielded().saturating_sub(1);
                    progress.on_page_failed(index, &e.to_string());
                    continue;
                }
            };
            enter(AskState::Paging(page.index));
            messages_seen += page.messages.len();
            progress.on_page(page.index, page.origin, page.messages.len());

            let authors = page
                .messages
                .iter()
                .filter(|m| m.has_author())
                .map(|m| m.author.as_str());
            if roster.observe(authors) {
                enter(AskState::Resolving);
                let resolution = resolver
                    .resolve(question.content(), earlier, &parsed, &roster)
                    .await;
                if !resolution.members.same_members(&members) {
                    info!(
                        page = page.index,
                        members = ?resolution.members.names(),
                        "Resolved members changed"
                    );
                }
                members = resolution.members;
                progress.on_members_resolved(&members, resolution.via_oracle);
            }

            let candidates =
                filter_candidates(&page.messages, page.index, &members, &parsed.keywords);
            debug!(
                page = page.index,
                messages = page.messages.len(),
                candidates = candidates.len(),
                "Filtered page"
            );

            for (batch_no, batch) in validator.batches(&candidates).enumerate() {
                enter(AskState::Validating {
                    page: page.index,
                    batch: batch_no,
                });
                progress.on_validation_start(page.index, batch.len());

                let ValidationResult::Answer(answer) =
                    validator.validate(question.content(), batch).await
                else {
                    continue;
                };

                enter(AskState::Scoring);
                let scored = ScoredAnswer::new(answer, &parsed.keywords);
                let confidence = scored.confidence;
                let confident = scored.meets(params.confidence_threshold);
                let is_best = best.offer(scored);
                progress.on_answer_candidate(confidence, is_best);
                info!(page = page.index, confidence, is_best, "Grounded answer found");

                if confident {
                    info!(page = page.index, "Confidence threshold reached, stopping");
                    break 'paging;
                }
            }
        }

        enter(AskState::Done);

        if messages_seen == 0
            && let Some(e) = pages.last_error()
        {
            warn!(error = %e, "No messages available from cache or upstream");
            progress.on_complete(false);
            return Err(AskError::NoMessagesAvailable(e.clone()));
        }

        let outcome = match best.into_inner() {
            Some(scored) => AskOutcome::from(scored),
            None => {
                info!(messages = messages_seen, "No answer found");
                AskOutcome::not_found()
            }
        };
        progress.on_complete(outcome.found());
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RetryPolicy;
    use crate::ports::answer_oracle::OracleError;
    use crate::use_cases::fetch_pages::tests::{MemoryCache, ScriptedSource, message};
    use crate::use_cases::resolve_members::tests::MockOracle;
    use member_qa_domain::{EMPTY_QUESTION_ANSWER, FALLBACK_ANSWER, Message, OracleVerdict};
    use std::time::Duration;

    const QUESTION: &str = "When is Layla planning her trip to London?";
    const CLARIDGES: &str =
        "Please book a suite at Claridge's in London for my trip at the end of the month.";

    fn params() -> PipelineParams {
        PipelineParams::default()
            .with_min_fetch_interval(Duration::ZERO)
            .with_oracle_retry(RetryPolicy::none())
    }

    fn use_case(
        cache: Arc<MemoryCache>,
        source: Arc<ScriptedSource>,
        oracle: Arc<MockOracle>,
    ) -> AnswerQuestionUseCase {
        AnswerQuestionUseCase::new(cache, source, oracle).with_params(params())
    }

    fn corpus() -> Vec<Result<Vec<Message>, SourceError>> {
        vec![Ok(vec![
            message("a1", "Sophia Al-Farsi", "2025-08-20T10:00:00Z", "Book a table at Nobu."),
            message("b2", "Layla Kawaguchi", "2025-08-29T09:12:00Z", CLARIDGES),
            message("c3", "Layla Kawaguchi", "2025-08-30T18:00:00Z", "Thanks for dinner!"),
        ])]
    }

    #[tokio::test]
    async fn test_answers_from_grounded_message() {
        let source = Arc::new(ScriptedSource::new(corpus(), Some(3)));
        let oracle = Arc::new(
            MockOracle::new()
                .with_selection(Ok(vec!["Layla Kawaguchi"]))
                .with_verdict(Ok(OracleVerdict::answer(CLARIDGES, 1))),
        );
        let cache = Arc::new(MemoryCache::default());

        let outcome = use_case(cache.clone(), source, oracle.clone())
            .execute(QUESTION)
            .await
            .unwrap();

        assert_eq!(outcome.answer, CLARIDGES);
        assert_ne!(outcome.answer, FALLBACK_ANSWER);
        let message = outcome.message.unwrap();
        assert_eq!(message.id.as_str(), "b2");
        assert_eq!(message.author, "Layla Kawaguchi");
        // Only the single matching message reached the validator.
        assert_eq!(*oracle.validate_calls.lock().unwrap(), vec![1]);
        assert_eq!(cache.len(), 3);
    }

    #[tokio::test]
    async fn test_no_matching_messages_returns_fallback() {
        let source = Arc::new(ScriptedSource::new(corpus(), Some(3)));
        let oracle = Arc::new(MockOracle::new().with_selection(Ok(vec!["Armand Dupont"])));
        let cache = Arc::new(MemoryCache::default());

        let outcome = use_case(cache, source, oracle.clone())
            .execute("What does Armand think about sushi?")
            .await
            .unwrap();

        assert_eq!(outcome.answer, FALLBACK_ANSWER);
        assert!(outcome.message.is_none());
        assert_eq!(oracle.validate_count(), 0);
    }

    #[tokio::test]
    async fn test_resolver_timeout_falls_back_to_heuristic() {
        let source = Arc::new(ScriptedSource::new(corpus(), Some(3)));
        let oracle = Arc::new(
            MockOracle::new()
                .with_selection(Err(OracleError::Timeout))
                .with_verdict(Ok(OracleVerdict::answer("Claridge's in London", 1))),
        );
        let cache = Arc::new(MemoryCache::default());

        let outcome = use_case(cache, source, oracle)
            .execute(QUESTION)
            .await
            .unwrap();

        assert_eq!(outcome.answer, "Claridge's in London");
        assert_eq!(outcome.message.unwrap().id.as_str(), "b2");
    }

    #[tokio::test]
    async fn test_confident_answer_stops_paging() {
        let source = Arc::new(ScriptedSource::new(
            vec![
                Ok(vec![message(
                    "1",
                    "Layla Kawaguchi",
                    "2025-08-29T09:00:00Z",
                    "Layla here, planning my trip to London next week",
                )]),
                Ok(vec![message("2", "Layla Kawaguchi", "", "more")]),
            ],
            None,
        ));
        let oracle = Arc::new(
            MockOracle::new()
                .with_selection(Ok(vec!["Layla Kawaguchi"]))
                .with_verdict(Ok(OracleVerdict::answer("next week", 1))),
        );
        let cache = Arc::new(MemoryCache::default());

        let outcome = use_case(cache, source.clone(), oracle)
            .execute(QUESTION)
            .await
            .unwrap();

        assert_eq!(outcome.answer, "next week");
        assert_eq!(source.request_count(), 1);
    }

    #[tokio::test]
    async fn test_new_member_names_trigger_re_resolution() {
        let source = Arc::new(ScriptedSource::new(
            vec![
                Ok(vec![message("1", "Sophia Al-Farsi", "", "Dinner at Nobu")]),
                Ok(vec![message("2", "Layla Kawaguchi", "", "My London trip is in May")]),
                Ok(vec![message("3", "Sophia Al-Farsi", "", "Also Nobu")]),
            ],
            None,
        ));
        let oracle = Arc::new(
            MockOracle::new()
                .with_selection(Ok(vec![]))
                .with_selection(Ok(vec!["Layla Kawaguchi"]))
                .with_verdict(Ok(OracleVerdict::answer("in May", 1))),
        );
        let cache = Arc::new(MemoryCache::default());

        let outcome = use_case(cache, source, oracle.clone())
            .execute(QUESTION)
            .await
            .unwrap();

        assert_eq!(outcome.answer, "in May");
        // Page 3 only repeats a known author.
        assert_eq!(oracle.select_count(), 2);
    }

    #[tokio::test]
    async fn test_candidates_are_batched() {
        let page: Vec<_> = (0..15)
            .map(|i| message(&i.to_string(), "Layla Kawaguchi", "", "trip notes"))
            .collect();
        let source = Arc::new(ScriptedSource::new(vec![Ok(page)], Some(15)));
        let oracle = Arc::new(
            MockOracle::new()
                .with_selection(Ok(vec!["Layla Kawaguchi"]))
                .with_verdict(Ok(OracleVerdict::NoAnswer))
                .with_verdict(Ok(OracleVerdict::NoAnswer)),
        );
        let cache = Arc::new(MemoryCache::default());

        let outcome = use_case(cache, source, oracle.clone())
            .execute(QUESTION)
            .await
            .unwrap();

        assert!(!outcome.found());
        assert_eq!(*oracle.validate_calls.lock().unwrap(), vec![12, 3]);
    }

    #[tokio::test]
    async fn test_upstream_failure_with_cached_messages_is_absorbed() {
        let cache = Arc::new(MemoryCache::with_messages(
            vec![message("b2", "Layla Kawaguchi", "2025-08-29T09:12:00Z", CLARIDGES)],
            1,
        ));
        let source = Arc::new(ScriptedSource::new(
            vec![Err(SourceError::Timeout), Err(SourceError::Timeout)],
            None,
        ));
        let oracle = Arc::new(
            MockOracle::new()
                .with_selection(Ok(vec!["Layla Kawaguchi"]))
                .with_verdict(Ok(OracleVerdict::answer("Claridge's", 1))),
        );

        let outcome = use_case(cache, source, oracle)
            .execute(QUESTION)
            .await
            .unwrap();

        assert_eq!(outcome.answer, "Claridge's");
    }

    #[tokio::test]
    async fn test_no_messages_anywhere_is_request_failure() {
        let source = Arc::new(ScriptedSource::new(
            vec![Err(SourceError::Status(503)), Err(SourceError::Status(503))],
            None,
        ));
        let oracle = Arc::new(MockOracle::new());
        let cache = Arc::new(MemoryCache::default());

        let err = use_case(cache, source, oracle.clone())
            .execute(QUESTION)
            .await
            .unwrap_err();

        assert!(matches!(err, AskError::NoMessagesAvailable(SourceError::Status(503))));
        assert_eq!(err.to_string(), "Unable to process the question right now.");
        assert_eq!(oracle.select_count(), 0);
    }

    #[tokio::test]
    async fn test_blank_question_touches_nothing() {
        let source = Arc::new(ScriptedSource::new(corpus(), None));
        let oracle = Arc::new(MockOracle::new());
        let cache = Arc::new(MemoryCache::default());

        let outcome = use_case(cache, source.clone(), oracle)
            .execute("   ")
            .await
            .unwrap();

        assert_eq!(outcome.answer, EMPTY_QUESTION_ANSWER);
        assert_eq!(source.request_count(), 0);
    }

    #[tokio::test]
    async fn test_follow_up_pronoun_resolves_through_earlier_turn() {
        let source = Arc::new(ScriptedSource::new(
            vec![Ok(vec![
                message("s1", "Sophia Al-Farsi", "", "My flight to Paris is delayed."),
                message("l1", "Layla Kawaguchi", "", "My flight to London lands Friday at 9am."),
            ])],
            Some(2),
        ));
        let oracle = Arc::new(
            MockOracle::new()
                .with_selection(Ok(vec!["Layla Kawaguchi"]))
                .with_verdict(Ok(OracleVerdict::answer("lands Friday at 9am", 1))),
        );
        let cache = Arc::new(MemoryCache::default());
        let earlier = vec![QUESTION.to_string()];

        let outcome = use_case(cache, source, oracle.clone())
            .execute_with_history("When is her flight?", &earlier, &NoProgress)
            .await
            .unwrap();

        assert_eq!(*oracle.select_context.lock().unwrap(), vec![earlier]);
        assert_eq!(*oracle.validate_calls.lock().unwrap(), vec![1]);
        assert_eq!(outcome.answer, "lands Friday at 9am");
        assert_eq!(outcome.message.unwrap().id.as_str(), "l1");
    }
}
