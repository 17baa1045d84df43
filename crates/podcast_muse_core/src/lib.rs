pub mod compose;
pub mod domain;
pub mod pipeline;
pub mod ports;
pub mod topics;
pub mod wizard;

pub use domain::{
    AdminStats, ApiKeys, CreditGrant, CreditGrantReceipt, LoginGrant, NewProject,
    PasswordResetTicket, Project, ProjectStatus, ProjectUpdate, Registration, TopicSuggestion,
    User, UserPatch,
};
pub use pipeline::{
    run_pipeline, GenerationBrief, GenerationProgress, GenerationResults, PipelinePlan,
    PipelineState, Stage, StageStatus, StageTimings,
};
pub use ports::{BackendService, KeyValueStore, MediaGenerator, PortError, PortResult};
pub use wizard::{Flow, FlowKind, GateContext, GateError, Wizard};
