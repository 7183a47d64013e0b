//! # Agora - a console forum with binary persistence
//!
//! A single-process, single-user forum: users sign up and log in, open
//! topics, post discussions, comment, reply, and vote. The whole forest
//! persists to a custom flat binary format with no header and no version
//! tag (see the [`wire`] module for the exact layout).
//!
//! The library is split the usual way: the [`forum`] module owns the data
//! model and every operation on it, [`wire`] turns the model into bytes
//! and back, and [`cli`] is a thin interactive front end that maps each
//! console command onto exactly one core call. The core never touches the
//! console itself.
//!
//! ## Example
//!
//! ```rust
//! use agora::forum::{System, VoteKind};
//! # fn main() -> agora::Result<()> {
//! let mut forum = System::new();
//! let ada = forum.signup(
//!     "Ada".into(), "Lovelace".into(), "ada".into(), "pw".into(),
//! )?;
//! forum.login("ada", "pw")?;
//! let topic = forum.create_topic("Sports".into(), "All sports".into())?;
//! forum.open_topic_by_id(topic)?;
//! let post = forum.post_discussion("Football".into(), "Match talk".into())?;
//! forum.open_discussion(post)?;
//! let comment = forum.add_comment("Great game".into())?;
//! forum.vote_comment(comment, VoteKind::Up)?;
//! forum.recompute_points();
//! assert_eq!(forum.user(ada).unwrap().profile().points(), 1);
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod error;
pub mod forum;
pub mod validation;
pub mod wire;

pub use error::{AgoraError, Result};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
