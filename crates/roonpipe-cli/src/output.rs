use roonpipe_core::{DisplayEntry, EntryKind};
use serde::Serialize;

use crate::OutputFormat;

#[derive(Serialize)]
struct JsonEntry<'a> {
    id: &'a str,
    title: &'a str,
    subtitle: &'a str,
    icon: String,
    advisory: bool,
    actions: Vec<JsonAction<'a>>,
}

#[derive(Serialize)]
struct JsonAction<'a> {
    id: &'a str,
    title: &'a str,
}

pub fn render(entries: &[DisplayEntry], format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => render_text(entries),
        OutputFormat::Json => render_json(entries),
    }
}

fn render_text(entries: &[DisplayEntry]) -> String {
    let mut output = String::new();

    for (i, entry) in entries.iter().enumerate() {
        match entry.kind {
            EntryKind::Advisory => output.push_str(&format!("! {}\n", entry.title)),
            EntryKind::Item => output.push_str(&format!("{}. {}\n", i + 1, entry.title)),
        }
        if !entry.subtitle.is_empty() {
            output.push_str(&format!("   {}\n", entry.subtitle));
        }
        if !entry.actions.is_empty() {
            let ids: Vec<&str> = entry.actions.iter().map(|a| a.id.as_str()).collect();
            output.push_str(&format!("   actions: {}\n", ids.join(", ")));
        }
    }

    output
}

fn render_json(entries: &[DisplayEntry]) -> String {
    let entries: Vec<JsonEntry> = entries
        .iter()
        .map(|entry| JsonEntry {
            id: &entry.id,
            title: &entry.title,
            subtitle: &entry.subtitle,
            icon: entry.icon.path().display().to_string(),
            advisory: entry.is_advisory(),
            actions: entry
                .actions
                .iter()
                .map(|a| JsonAction { id: &a.id, title: &a.title })
                .collect(),
        })
        .collect();

    let mut output = serde_json::to_string_pretty(&entries).unwrap_or_else(|_| "[]".to_string());
    output.push('\n');
    output
}
