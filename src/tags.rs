use chrono::naive::NaiveDateTime;

#[derive(Clone, Debug)]
pub struct Tag {
    pub id: i64,
    pub name: String,
    pub color: String,
    pub created_at: NaiveDateTime,
}

/// A tag together with the number of notes currently carrying it
#[derive(Clone, Debug)]
pub struct TagWithCount {
    pub tag: Tag,
    pub note_count: i64,
}
