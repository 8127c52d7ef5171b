//! Authentication state for the Gymdesk client
//!
//! Provides the access token type, the [`TokenStore`] seam the request pipeline
//! reads from, and the [`AuthSession`] that owns login state.
//!
//! # Overview
//!
//! The access token lives only in memory. The backend also sets an http-only refresh
//! cookie at login; the client's cookie store replays it to the refresh endpoint,
//! which is how both [`AuthSession::restore`] (at startup) and the refresh
//! coordinator (on a 401) obtain new tokens.
//!
//! # Example
//!
//! ```no_run
//! use gymdesk_client::auth::{AuthSession, Role};
//! use gymdesk_client::{api, ClientConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let session = AuthSession::connect(ClientConfig::from_env()?)?;
//!
//!     let grant = api::auth::login(session.client(), Role::Gym, "owner@gym.test", "hunter2").await?;
//!     session.login(grant.access_token, grant.user);
//!
//!     let profile = api::gym::get_profile(session.client()).await?;
//!     println!("{:?}", profile.gym_name);
//!
//!     session.logout().await;
//!     Ok(())
//! }
//! ```

mod session;
mod token;

pub use session::{Access, AuthSession, AuthUser, Role, SessionStore};
pub use token::{AccessToken, InMemoryTokenStore, SharedTokenStore, TokenStore};
