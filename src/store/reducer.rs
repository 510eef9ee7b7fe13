//! Event-to-store reduction
//!
//! [`reduce`] is a pure function from a store snapshot and one event to the
//! next snapshot. Internally it clones the snapshot (cheap, conversations are
//! shared) and [`apply`]s the event to that draft, copying only the
//! conversation the event touches.
//!
//! | Event | Effect | Merge |
//! |-------|--------|-------|
//! | `conversation_started` | ensure conversation | - |
//! | `thread_started`, `message_chunk`, `message`, `reasoning`, failures | markdown item | Append |
//! | `tool_call_started`, `tool_call_completed` | tool_call item | Replace |
//! | `component_generator` | item of the declared type, sections routed aside | Replace for full-payload types, else Append |
//! | `reasoning_started`, `reasoning_completed` | ensure conversation/thread/task | - |
//! | `done` | mark thread terminal | - |
//! | unknown | nothing | - |

use crate::models::ComponentType;
use crate::sse::{AgentEvent, ItemRef};

use super::{Conversation, Item, Store, Task};

/// How an item merges with an existing item of the same id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeMode {
    /// Streaming tokens: string contents are concatenated.
    Append,
    /// Complete redelivery: the new item supersedes the old one.
    Replace,
}

/// Produce the store that results from applying `event` to `store`.
pub fn reduce(store: &Store, event: &AgentEvent) -> Store {
    let mut next = store.clone();
    apply(&mut next, event);
    next
}

/// Replay a list of events for one conversation as a single update.
///
/// With `clear_history`, the conversation's prior state is dropped first (used
/// when loading history from durable storage). Events are applied in order.
/// Events that belong to a different conversation are skipped.
pub fn batch_reduce(
    store: &Store,
    conversation_id: &str,
    events: &[AgentEvent],
    clear_history: bool,
) -> Store {
    let mut next = store.clone();
    if clear_history {
        next.remove_conversation(conversation_id);
    }
    next.ensure_conversation(conversation_id);

    for event in events {
        match event.conversation_id() {
            Some(other) if other != conversation_id => {
                tracing::warn!(
                    conversation_id,
                    event_conversation_id = other,
                    event = event.tag(),
                    "Skipping event for another conversation during replay"
                );
            }
            _ => apply(&mut next, event),
        }
    }

    next
}

/// Apply one event to a draft store in place.
pub fn apply(store: &mut Store, event: &AgentEvent) {
    match event {
        AgentEvent::ConversationStarted(data) => {
            store.ensure_conversation(&data.conversation_id);
        }

        AgentEvent::ThreadStarted(data)
        | AgentEvent::MessageChunk(data)
        | AgentEvent::Message(data)
        | AgentEvent::Reasoning(data)
        | AgentEvent::TaskFailed(data)
        | AgentEvent::PlanFailed(data)
        | AgentEvent::PlanRequireUserInput(data)
        | AgentEvent::SystemFailed(data) => {
            let item = Item::markdown(&data.target, &data.payload.content);
            upsert_item(main_task(store, &data.target), item, MergeMode::Append);
        }

        AgentEvent::ToolCallStarted(data) | AgentEvent::ToolCallCompleted(data) => {
            let item = Item::tool_call(&data.target, &data.payload);
            upsert_item(main_task(store, &data.target), item, MergeMode::Replace);
        }

        AgentEvent::ComponentGenerator(data) => {
            let component_type = data.declared_type();
            let mode = if component_type.replaces_payload() {
                MergeMode::Replace
            } else {
                MergeMode::Append
            };
            let item = Item::new(&data.target, component_type.clone(), data.payload.clone());

            let target = &data.target;
            let conversation = store.ensure_conversation(&target.conversation_id);
            let task = if component_type.is_section() {
                section_task(conversation, &component_type, target)
            } else {
                conversation.ensure_task(&target.thread_id, &target.task_id)
            };
            upsert_item(task, item, mode);
        }

        AgentEvent::ReasoningStarted(data) | AgentEvent::ReasoningCompleted(data) => {
            store
                .ensure_conversation(&data.conversation_id)
                .ensure_task(&data.thread_id, &data.task_id);
        }

        AgentEvent::Done(data) => {
            store
                .ensure_conversation(&data.conversation_id)
                .ensure_thread(&data.thread_id)
                .mark_done();
            tracing::debug!(
                conversation_id = %data.conversation_id,
                thread_id = %data.thread_id,
                "Thread done"
            );
        }

        AgentEvent::Unknown { event, .. } => {
            tracing::debug!(event = %event, "Ignoring unknown event");
        }
    }
}

/// Insert `item` into `task`, merging with an existing item of the same id.
///
/// A merged item keeps its position. Under [`MergeMode::Append`], when both
/// the old and new payload have string `content`, the contents are
/// concatenated; in every other case the new item replaces the old one.
pub fn upsert_item(task: &mut Task, mut item: Item, mode: MergeMode) {
    let items = task.items_mut();
    let Some(existing) = items.iter_mut().find(|existing| existing.item_id == item.item_id) else {
        items.push(item);
        return;
    };

    if mode == MergeMode::Append {
        let merged = match (existing.content(), item.content()) {
            (Some(old), Some(new)) => Some(format!("{old}{new}")),
            _ => None,
        };
        if let Some(merged) = merged {
            item.set_content(merged);
        }
    }

    *existing = item;
}

fn main_task<'a>(store: &'a mut Store, target: &ItemRef) -> &'a mut Task {
    store
        .ensure_conversation(&target.conversation_id)
        .ensure_task(&target.thread_id, &target.task_id)
}

fn section_task<'a>(
    conversation: &'a mut Conversation,
    component_type: &ComponentType,
    target: &ItemRef,
) -> &'a mut Task {
    conversation
        .ensure_section(component_type)
        .ensure_task(&target.thread_id, &target.task_id)
}
