//! Chat request-handling pipeline: classify -> retrieve -> assemble -> compose

pub mod composer;
pub mod context;
pub mod intent;
pub mod pipeline;
pub mod retrieval;
pub mod session;

pub use composer::ResponseComposer;
pub use context::ContextAssembler;
pub use intent::{classify, IntentFlags};
pub use pipeline::{ChatService, ChatTurn};
pub use retrieval::Retriever;
pub use session::SnapshotStore;
