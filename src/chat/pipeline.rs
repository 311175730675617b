//! End-to-end chat turn handling

use std::sync::Arc;

use tracing::{debug, info};

use crate::chat::composer::{ResponseComposer, TurnInputs};
use crate::chat::context::ContextAssembler;
use crate::chat::intent::classify;
use crate::chat::retrieval::Retriever;
use crate::chat::session::{SnapshotStore, DEFAULT_SESSION_KEY};
use crate::errors::{NeedfulError, Result};
use crate::geo::{annotate_and_sort, GeoPoint};
use crate::llm::LlmClient;
use crate::models::{ChatMessage, ProviderHit};
use crate::store::ProviderStore;

/// One chat request: full message history plus optional location and
/// session key
#[derive(Debug, Clone)]
pub struct ChatTurn {
    pub messages: Vec<ChatMessage>,
    pub user_location: Option<GeoPoint>,
    pub session_id: Option<String>,
}

/// Complete chat pipeline: classify -> retrieve -> annotate -> assemble ->
/// compose. Turns are strictly sequential; the only awaited collaborators
/// are the provider store and the LLM.
pub struct ChatService {
    retriever: Retriever,
    assembler: ContextAssembler,
    composer: ResponseComposer,
    snapshots: Arc<SnapshotStore>,
}

impl ChatService {
    /// Create a new chat service. `llm` is `None` in mock mode.
    pub fn new(store: Arc<dyn ProviderStore>, llm: Option<Arc<LlmClient>>) -> Self {
        Self {
            retriever: Retriever::new(store),
            assembler: ContextAssembler::default(),
            composer: ResponseComposer::new(llm),
            snapshots: Arc::new(SnapshotStore::new()),
        }
    }

    /// Handle one chat turn and produce the reply text.
    ///
    /// # Errors
    /// - `EmptyConversation` when the message list is empty (the HTTP
    ///   layer rejects this earlier with a 400)
    ///
    /// Data-access and LLM failures never surface here: they degrade to
    /// templated replies inside the pipeline.
    pub async fn handle_turn(&self, turn: &ChatTurn) -> Result<String> {
        let current = turn
            .messages
            .last()
            .ok_or(NeedfulError::EmptyConversation)?;
        let history = &turn.messages[..turn.messages.len() - 1];

        let flags = classify(&current.content);
        info!(
            best = flags.is_best_query,
            compare = flags.is_compare_query,
            closest = flags.is_asking_for_closest,
            category = ?flags.target_category_slug,
            "processing chat turn"
        );

        let candidates = self
            .retriever
            .fetch_candidates(&flags, &current.content, turn.user_location.is_some())
            .await;

        // The snapshot is updated before composing, so this turn's results
        // are already visible to its own follow-up shortcuts.
        let session_key = turn.session_id.as_deref().unwrap_or(DEFAULT_SESSION_KEY);
        self.snapshots.write(session_key, &candidates);
        let snapshot = self.snapshots.read(session_key);

        let hits: Vec<ProviderHit> = match (flags.is_asking_for_closest, turn.user_location) {
            (true, Some(user)) => annotate_and_sort(candidates, user),
            _ => candidates
                .into_iter()
                .map(|provider| ProviderHit {
                    provider,
                    distance_km: None,
                })
                .collect(),
        };

        let context = self.assembler.assemble(
            &hits,
            &flags,
            !history.is_empty(),
            &current.content,
            turn.user_location.is_some(),
        );
        debug!("assembled context block of {} bytes", context.len());

        let reply = self
            .composer
            .compose(&TurnInputs {
                flags: &flags,
                hits: &hits,
                snapshot: &snapshot,
                history,
                utterance: &current.content,
                context: &context,
            })
            .await;

        Ok(reply)
    }
}
