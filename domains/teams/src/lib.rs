//! Teams domain: memberships, team bootstrap, invitations and the
//! identity management token cache

pub mod api;
pub mod domain;
pub mod repository;
pub mod service;

// Re-export domain types at the crate root for convenience
pub use domain::entities::*;
pub use domain::state::{
    InviteEvent, InviteGuardContext, InviteState, InviteStateMachine, StateError,
};

// Re-export repository types
pub use repository::{
    InviteRepository, InviteStore, MemoryStore, MembershipRepository, MembershipStore,
    ProjectRepository, ProjectStore, TeamRepository, TeamStore, TeamsRepositories,
    TokenRepository, TokenStore, UserRepository, UserStore,
};

// Re-export services
pub use service::{
    Collaborators, InviteService, ManagementTokenCache, MembershipService, Registration,
    TeamService, TeamsServices, UserService,
};

// Re-export API types
pub use api::routes;
pub use api::TeamsState;
