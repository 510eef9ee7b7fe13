//! Conversation store
//!
//! The nested structure the UI reads:
//!
//! ```text
//! Store
//! └── Conversation (conversation_id)
//!     ├── threads:  Thread (thread_id) → Task (task_id) → [Item]
//!     └── sections: Section (component_type) → Thread → Task → [Item]
//! ```
//!
//! Maps keep insertion order so consumers iterate in arrival order, and
//! compare as maps. Conversations are shared behind `Arc`, so cloning a store
//! is cheap and the reducer copies only the conversation an event touches.
//!
//! Mutation goes through [`reducer`]; the public API here is read-only.

pub mod reducer;

use std::sync::Arc;

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{json, Value};

use crate::models::{ComponentType, Role};
use crate::sse::{ItemRef, ToolCallPayload};

pub use reducer::{apply, batch_reduce, reduce, upsert_item, MergeMode};

/// Root of all conversation state, keyed by conversation id.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Store {
    conversations: IndexMap<String, Arc<Conversation>>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn conversation(&self, conversation_id: &str) -> Option<&Conversation> {
        self.conversations.get(conversation_id).map(Arc::as_ref)
    }

    pub fn conversations(&self) -> impl Iterator<Item = &Conversation> {
        self.conversations.values().map(Arc::as_ref)
    }

    pub fn contains(&self, conversation_id: &str) -> bool {
        self.conversations.contains_key(conversation_id)
    }

    pub fn len(&self) -> usize {
        self.conversations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conversations.is_empty()
    }

    /// True when both stores share the same allocation for this conversation,
    /// i.e. a reduction did not touch it.
    pub fn shares_conversation(&self, other: &Store, conversation_id: &str) -> bool {
        match (
            self.conversations.get(conversation_id),
            other.conversations.get(conversation_id),
        ) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Get or create a conversation, detaching it from other snapshots.
    pub(crate) fn ensure_conversation(&mut self, conversation_id: &str) -> &mut Conversation {
        let entry = self
            .conversations
            .entry(conversation_id.to_string())
            .or_insert_with(|| Arc::new(Conversation::new(conversation_id)));
        Arc::make_mut(entry)
    }

    pub(crate) fn remove_conversation(&mut self, conversation_id: &str) -> bool {
        self.conversations.shift_remove(conversation_id).is_some()
    }
}

/// One conversation: its transcript threads and its side-panel sections.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Conversation {
    pub conversation_id: String,
    threads: IndexMap<String, Thread>,
    sections: IndexMap<ComponentType, Section>,
}

impl Conversation {
    pub fn new(conversation_id: impl Into<String>) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            threads: IndexMap::new(),
            sections: IndexMap::new(),
        }
    }

    pub fn thread(&self, thread_id: &str) -> Option<&Thread> {
        self.threads.get(thread_id)
    }

    pub fn threads(&self) -> impl Iterator<Item = &Thread> {
        self.threads.values()
    }

    pub fn thread_count(&self) -> usize {
        self.threads.len()
    }

    pub fn section(&self, component_type: &ComponentType) -> Option<&Section> {
        self.sections.get(component_type)
    }

    pub fn sections(&self) -> impl Iterator<Item = (&ComponentType, &Section)> {
        self.sections.iter()
    }

    /// Every item in the main transcript, in thread, task, then arrival order.
    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.threads
            .values()
            .flat_map(|thread| thread.tasks())
            .flat_map(|task| task.items())
    }

    pub(crate) fn ensure_thread(&mut self, thread_id: &str) -> &mut Thread {
        ensure_thread(&mut self.threads, thread_id)
    }

    pub(crate) fn ensure_task(&mut self, thread_id: &str, task_id: &str) -> &mut Task {
        self.ensure_thread(thread_id).ensure_task(task_id)
    }

    pub(crate) fn ensure_section(&mut self, component_type: &ComponentType) -> &mut Section {
        self.sections
            .entry(component_type.clone())
            .or_default()
    }
}

/// Side-panel content for one section component type, with its own
/// thread/task tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Section {
    threads: IndexMap<String, Thread>,
}

impl Section {
    pub fn thread(&self, thread_id: &str) -> Option<&Thread> {
        self.threads.get(thread_id)
    }

    pub fn threads(&self) -> impl Iterator<Item = &Thread> {
        self.threads.values()
    }

    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.threads
            .values()
            .flat_map(|thread| thread.tasks())
            .flat_map(|task| task.items())
    }

    pub(crate) fn ensure_task(&mut self, thread_id: &str, task_id: &str) -> &mut Task {
        ensure_thread(&mut self.threads, thread_id).ensure_task(task_id)
    }
}

fn ensure_thread<'a>(threads: &'a mut IndexMap<String, Thread>, thread_id: &str) -> &'a mut Thread {
    threads
        .entry(thread_id.to_string())
        .or_insert_with(|| Thread::new(thread_id))
}

/// One message exchange chain.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Thread {
    pub thread_id: String,
    tasks: IndexMap<String, Task>,
    /// Set by `done`; no further items are expected.
    done: bool,
}

impl Thread {
    pub fn new(thread_id: impl Into<String>) -> Self {
        Self {
            thread_id: thread_id.into(),
            tasks: IndexMap::new(),
            done: false,
        }
    }

    pub fn task(&self, task_id: &str) -> Option<&Task> {
        self.tasks.get(task_id)
    }

    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks.values()
    }

    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    pub(crate) fn mark_done(&mut self) {
        self.done = true;
    }

    pub(crate) fn ensure_task(&mut self, task_id: &str) -> &mut Task {
        self.tasks
            .entry(task_id.to_string())
            .or_insert_with(|| Task::new(task_id))
    }
}

/// One execution unit: items in arrival order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Task {
    pub task_id: String,
    items: Vec<Item>,
}

impl Task {
    pub fn new(task_id: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
            items: Vec::new(),
        }
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn item(&self, item_id: &str) -> Option<&Item> {
        self.items.iter().find(|item| item.item_id == item_id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub(crate) fn items_mut(&mut self) -> &mut Vec<Item> {
        &mut self.items
    }
}

/// The smallest renderable unit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Item {
    pub item_id: String,
    pub role: Role,
    pub component_type: ComponentType,
    /// Shape depends on `component_type`; usually `{"content": "..."}`.
    pub payload: Value,
}

impl Item {
    pub fn new(target: &ItemRef, component_type: ComponentType, payload: Value) -> Self {
        Self {
            item_id: target.item_id.clone(),
            role: target.role,
            component_type,
            payload,
        }
    }

    pub fn markdown(target: &ItemRef, content: &str) -> Self {
        Self::new(target, ComponentType::Markdown, json!({ "content": content }))
    }

    /// A tool call item: the call fields serialized as JSON in `content`.
    pub fn tool_call(target: &ItemRef, call: &ToolCallPayload) -> Self {
        let content = serde_json::to_string(call).unwrap_or_default();
        Self::new(target, ComponentType::ToolCall, json!({ "content": content }))
    }

    /// `payload.content` when it is a string.
    pub fn content(&self) -> Option<&str> {
        self.payload.get("content").and_then(Value::as_str)
    }

    /// Decode the call fields of a tool call item.
    pub fn tool_call_payload(&self) -> Option<ToolCallPayload> {
        if self.component_type != ComponentType::ToolCall {
            return None;
        }
        serde_json::from_str(self.content()?).ok()
    }

    pub(crate) fn set_content(&mut self, content: String) {
        match self.payload.as_object_mut() {
            Some(map) => {
                map.insert("content".to_string(), Value::String(content));
            }
            None => self.payload = json!({ "content": content }),
        }
    }
}
