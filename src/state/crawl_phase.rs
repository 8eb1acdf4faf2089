/// Crawl phase definitions for the search crawler
///
/// The crawler moves `Searching → Extracting → (AdvancingPage | Done)`, looping
/// back from `AdvancingPage` to `Extracting` for each further results page.
use crate::HarvestError;
use std::fmt;

/// Why a crawl finished
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlStop {
    /// The collection reached its configured maximum
    LimitReached,

    /// The provider had no further results page
    Exhausted,
}

/// Represents the current phase of a search crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlPhase {
    /// The query is being submitted to the provider
    Searching,

    /// Candidate links are being read from the current results page
    Extracting,

    /// The provider is being asked for the next results page
    AdvancingPage,

    /// The crawl has finished
    Done(CrawlStop),
}

impl CrawlPhase {
    /// Returns true if no further transitions are possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done(_))
    }

    /// Returns true if `next` is a legal successor of this phase
    pub fn can_transition_to(&self, next: CrawlPhase) -> bool {
        matches!(
            (self, next),
            (Self::Searching, Self::Extracting)
                | (Self::Extracting, Self::AdvancingPage)
                | (Self::Extracting, Self::Done(_))
                | (Self::AdvancingPage, Self::Extracting)
                | (Self::AdvancingPage, Self::Done(CrawlStop::Exhausted))
        )
    }

    /// Moves to `next`, rejecting transitions the state machine does not allow
    pub fn transition(self, next: CrawlPhase) -> Result<CrawlPhase, HarvestError> {
        if self.can_transition_to(next) {
            tracing::trace!("Crawl phase {} -> {}", self, next);
            Ok(next)
        } else {
            Err(HarvestError::InvalidTransition {
                from: self,
                to: next,
            })
        }
    }

    /// Short lowercase label used in logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Searching => "searching",
            Self::Extracting => "extracting",
            Self::AdvancingPage => "advancing_page",
            Self::Done(CrawlStop::LimitReached) => "done_limit_reached",
            Self::Done(CrawlStop::Exhausted) => "done_exhausted",
        }
    }
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
