//! Service Layer
//!
//! Provider plumbing for the virtual table: the `DataProvider` contract,
//! ready-made adapters, cancellation scopes, and the tokio bridge used to run
//! background work.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    ThrottledProvider                         │
//! │  ┌──────────────────────────┐   ┌──────────────────────┐    │
//! │  │  DataProvider (app impl) │   │  rate limit/timeout  │    │
//! │  │  or VecProvider          │   │                      │    │
//! │  └──────────────────────────┘   └──────────────────────┘    │
//! └─────────────────────────────────────────────────────────────┘
//!                            │  fetch_page / fetch_count / fetch_filtered
//!                            ▼  (each under a CancellationScope)
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      VirtualTable                            │
//! └─────────────────────────────────────────────────────────────┘
//! ```

mod cancellation;
mod data_provider;
mod runtime;
mod throttled;
mod vec_provider;

pub use cancellation::*;
pub use data_provider::*;
pub use runtime::*;
pub use throttled::*;
pub use vec_provider::*;
