//! Plain-text rendering of the store for the terminal.

use std::collections::HashMap;

use crate::models::{ComponentType, Role};
use crate::store::{Conversation, Item, Store, Thread};

/// Render one item as a block of text.
pub fn render_item(item: &Item) -> String {
    let text = match &item.component_type {
        ComponentType::Markdown => item.content().unwrap_or_default().to_string(),
        ComponentType::ToolCall => match item.tool_call_payload() {
            Some(call) => match call.tool_call_result {
                Some(result) => format!("[tool] {} -> {}", call.tool_name, result),
                None => format!("[tool] {} ...", call.tool_name),
            },
            None => "[tool]".to_string(),
        },
        other => format!("[{}] {}", other, item.payload),
    };
    match item.role {
        Role::User => format!("> {}", text),
        Role::System => format!("! {}", text),
        Role::Agent => text,
    }
}

fn render_thread(out: &mut String, heading: &str, thread: &Thread) {
    out.push_str(heading);
    if thread.is_done() {
        out.push_str(" (done)");
    }
    out.push('\n');
    for task in thread.tasks() {
        for item in task.items() {
            out.push_str(&render_item(item));
            out.push('\n');
        }
    }
}

/// Render a whole conversation: threads first, then sections.
pub fn render_conversation(conversation: &Conversation) -> String {
    let mut out = format!("# conversation {}\n", conversation.conversation_id);
    for thread in conversation.threads() {
        render_thread(&mut out, &format!("## thread {}", thread.thread_id), thread);
    }
    for (component_type, section) in conversation.sections() {
        for thread in section.threads() {
            render_thread(
                &mut out,
                &format!("## {} / thread {}", component_type, thread.thread_id),
                thread,
            );
        }
    }
    out
}

/// Prints what changed in the main transcript since the last snapshot.
///
/// Appended markdown is printed as a suffix. An item whose content was
/// replaced is printed again in full.
#[derive(Debug, Default)]
pub struct LivePrinter {
    printed: HashMap<String, String>,
}

impl LivePrinter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Text to print for `store`, given everything printed so far.
    pub fn update(&mut self, store: &Store) -> String {
        let mut out = String::new();
        for conversation in store.conversations() {
            for thread in conversation.threads() {
                for task in thread.tasks() {
                    for item in task.items() {
                        let key = format!(
                            "{}/{}/{}/{}",
                            conversation.conversation_id, thread.thread_id, task.task_id, item.item_id
                        );
                        self.update_item(&mut out, key, item);
                    }
                }
            }
        }
        out
    }

    fn update_item(&mut self, out: &mut String, key: String, item: &Item) {
        let rendered = render_item(item);
        let previous = self.printed.get(&key);
        if previous == Some(&rendered) {
            return;
        }

        let appended = item.component_type == ComponentType::Markdown
            && previous.is_some_and(|before| rendered.starts_with(before.as_str()));
        match previous {
            Some(before) if appended => out.push_str(&rendered[before.len()..]),
            Some(_) => {
                out.push('\n');
                out.push_str(&rendered);
            }
            None => {
                if !self.printed.is_empty() {
                    out.push('\n');
                }
                out.push_str(&rendered);
            }
        }
        self.printed.insert(key, rendered);
    }
}
