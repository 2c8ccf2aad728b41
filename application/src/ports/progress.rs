//! Progress notification port
//!
//! Defines the interface for reporting progress while a question is answered.

use member_qa_domain::ResolvedMembers;

/// Where a page came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageOrigin {
    Cache,
    Remote,
}

impl PageOrigin {
    pub fn as_str(&self) -> &'static str {
        match self {
            PageOrigin::Cache => "cached",
            PageOrigin::Remote => "remote",
        }
    }
}

/// Callback for progress updates during question answering
///
/// Implementations live in the presentation layer. Every method has a no-op
/// default.
pub trait AskProgressNotifier: Send + Sync {
    /// Called when a page is about to be evaluated
    fn on_page(&self, _index: usize, _origin: PageOrigin, _messages: usize) {}

    /// Called when a remote page could not be fetched
    fn on_page_failed(&self, _index: usize, _error: &str) {}

    /// Called after member resolution
    fn on_members_resolved(&self, _members: &ResolvedMembers, _via_oracle: bool) {}

    /// Called before a validator batch is sent to the oracle
    fn on_validation_start(&self, _page: usize, _batch_size: usize) {}

    /// Called when a batch produced a grounded answer
    fn on_answer_candidate(&self, _confidence: f64, _is_best: bool) {}

    /// Called once the request is finished
    fn on_complete(&self, _found: bool) {}
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl AskProgressNotifier for NoProgress {}
