// Use cases layer: the vote attempt workflow.

pub mod cast_vote;
pub mod delay;
pub mod fetch_settings;
pub mod runner;
#[cfg(test)]
pub(crate) mod test_support;

pub use cast_vote::CastVoteUseCase;
pub use delay::DelayRange;
pub use fetch_settings::{FetchSettingsUseCase, credentials_from_reply};
pub use runner::{RepeatPolicy, RunSummary, VoteRunner};
