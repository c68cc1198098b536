//! Domain models with validation at construction
//!
//! Raw request payloads (`*Input`, `*Params`) deserialize leniently and are
//! turned into validated types before anything touches the database.
//! Invalid input returns ValidationError, not panic.

pub mod feedback;
pub mod link;
pub mod pagination;
pub mod simulation;
pub mod user;
pub mod validation;

pub use feedback::{
    AgentReactionInput, NewAgentReaction, NewPostSuggestion, NewSummary, PostSuggestionInput,
    SummaryInput,
};
pub use link::HttpUrl;
pub use pagination::{Paginated, Pagination, PaginationParams};
pub use simulation::{
    EngagementEstimates, NewSimulation, Platform, SimulationFilter, SimulationFilterParams,
    SimulationInput, SimulationPatch, SimulationPatchInput, SimulationStatus,
};
pub use user::{
    Email, LeaderboardParams, LeaderboardQuery, LeaderboardSort, SortOrder, UserAnalytics,
    UserInput, UserProfile,
};
pub use validation::ValidationError;
