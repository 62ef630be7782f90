//! Engine module
//!
//! Pure, synchronous incentive computations over in-memory snapshots:
//! aggregation and ranking, leaderboard views, best-submission selection.

pub mod aggregator;
pub mod leaderboard;
pub mod submission;

pub use aggregator::{
    AggregatedPerson, AggregationOutcome, AggregationStats, IncentiveAggregator, IncentiveRules,
    PersonKey, ReportWindow, UNKNOWN_NAME,
};
pub use leaderboard::{
    group_by_rank, Leaderboard, LeaderboardFilter, LeaderboardPage, LeaderboardRow, Page,
    RankGroup,
};
pub use submission::{select_best_submission, BestSubmissions};
