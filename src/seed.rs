//! Default content for a fresh or reset database

use std::collections::HashMap;

use crate::database::CreateNoteValues;
use crate::database::CreateTagValues;
use crate::database::Database;
use crate::database::Result;

/// Default tags: name and color
const DEFAULT_TAGS: &[(&str, &str)] = &[
    ("Important", "#ef4444"),
    ("Work", "#8b5cf6"),
    ("Personal", "#f97316"),
    ("Study", "#10b981"),
    ("Project", "#3b82f6"),
    ("Ideas", "#ec4899"),
];

/// Sample notes: title, body, and tag names
const DEFAULT_NOTES: &[(&str, &str, &[&str])] = &[
    (
        "Project Kickoff",
        "Points from today's meeting:\n\n1. Project timeline\n2. Task assignments\n3. Next steps\n\nThe first milestone needs to land by the end of the week.",
        &["Important", "Work"],
    ),
    (
        "Grocery List",
        "- Bread\n- Milk\n- Eggs\n- Fruit (apples, bananas, oranges)\n- Vegetables (carrots, potatoes, onions)\n- Rice",
        &["Personal"],
    ),
    (
        "Lecture Notes",
        "Key topics from today's class:\n\n- Core concepts\n- Practical applications\n- Recommended exercises: pages 45-50",
        &["Study", "Important"],
    ),
];

/// Seed default content when the database is completely empty
pub async fn ensure_seed_data(database: &Database) -> Result<()> {
    if database.is_empty().await? {
        tracing::info!("Empty database, seeding default content");

        seed(database).await?;
    }

    Ok(())
}

/// Destructively replace everything with the default content
pub async fn reseed(database: &Database) -> Result<()> {
    database.clear_all().await?;

    seed(database).await
}

async fn seed(database: &Database) -> Result<()> {
    let mut tag_ids = HashMap::new();

    for (name, color) in DEFAULT_TAGS {
        let tag = database.create_tag(&CreateTagValues { name, color }).await?;

        tag_ids.insert(*name, tag.id);
    }

    for (title, body, tag_names) in DEFAULT_NOTES {
        let ids = tag_names
            .iter()
            .filter_map(|name| tag_ids.get(name).copied())
            .collect::<Vec<i64>>();

        database
            .create_note(&CreateNoteValues {
                title,
                body,
                tag_ids: &ids,
            })
            .await?;
    }

    Ok(())
}
