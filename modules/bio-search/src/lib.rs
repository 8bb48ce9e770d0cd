pub mod config;
pub mod display;
pub mod error;
pub mod export;
pub mod filter;
pub mod pipeline;
pub mod session;
pub mod store;
pub mod traits;
pub mod types;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use config::{AppConfig, CostEstimate, SearchParams};
pub use error::{BioSearchError, Result};
pub use pipeline::{BatchOutcome, BatchReport, BioSearch, FollowerSource};
pub use session::{Session, SessionStats};
pub use store::SessionStore;
pub use traits::ActorRunner;
pub use types::{Follower, Match, Profile, Visibility};
