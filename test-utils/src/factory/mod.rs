//! Factory methods for creating test data.
//!
//! Factories insert rows with sensible defaults so tests only spell out the fields
//! they care about.
//!
//! # Basic Usage
//!
//! ```rust,ignore
//! use test_utils::factory;
//!
//! let row = factory::create_activity(&db).await?;
//!
//! let leader = factory::activity::ActivityFactory::new(&db)
//!     .user_id("42")
//!     .points(900)
//!     .build()
//!     .await?;
//! ```

pub mod activity;
pub mod helpers;

pub use activity::create_activity;
