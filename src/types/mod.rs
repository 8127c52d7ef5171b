//! Type definitions for the Gymdesk API client
//!
//! Request descriptors, the response envelope, configuration, entity ids and the
//! payloads of the typed endpoint wrappers.

pub mod entities;
pub mod envelope;
pub mod identifiers;
pub mod options;
pub mod request;

pub use entities::{
    ApprovalStatus, ClientRecord, ClientsPage, GeoPoint, Gym, GymProfile, GymStatusUpdate,
    GymsPage, MemberProfile, Membership, PlanType, SubscriptionStatus, SuperAdminProfile,
    Trainer, TrainersPage,
};
pub use envelope::{ApiEnvelope, SessionGrant};
pub use identifiers::{ClientId, GymId, TrainerId};
pub use options::{ClientConfig, ClientConfigBuilder};
pub use request::{AUTHORIZATION, ApiRequest, ApiResponse, Method};
