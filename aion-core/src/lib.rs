//! # Aion Assistant Core
//!
//! Core library for the Aion personal finance assistant. Provides the
//! tool-calling orchestration loop, the agent set (chatbot plus specialist
//! sub-agents), the model gateway and storage boundaries, and session
//! management.

pub mod agent;
pub mod agents;
pub mod config;
pub mod error;
pub mod executor;
pub mod gateway;
pub mod history;
pub mod orchestrator;
pub mod overspend;
pub mod registry;
pub mod session;
pub mod store;
pub mod types;

// Re-export key types
pub use agent::{AgentSpec, AgentSpecBuilder, DEFAULT_MAX_ROUNDS};
pub use agents::{DelegateHandler, Stores};
pub use config::AionConfig;
pub use error::{GatewayError, OrchestratorError, ToolError};
pub use gateway::{ModelGateway, ModelTurn};
pub use history::ConversationHistory;
pub use orchestrator::{LoopRun, Orchestrator};
pub use overspend::{check_overspend, OverspendAlert};
pub use registry::{ToolHandler, ToolRegistry};
pub use session::{Session, SessionManager};
pub use store::{
    BudgetCategory, BudgetStore, ExpenseRecord, ExpenseStore, HistoryStore, ProfileStore,
    UserProfile,
};
pub use types::{
    CallOutcome, CallRequest, CallResult, ForcingMode, Role, ToolDeclaration, Turn, TurnContent,
};
