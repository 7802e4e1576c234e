//! Value structs for database writes

/// Values to create a Note
pub struct CreateNoteValues<'a> {
    /// Title of the note
    pub title: &'a str,

    /// Body text, may be empty
    pub body: &'a str,

    /// Tags to associate; every ID must exist
    pub tag_ids: &'a [i64],
}

/// Values to update a Note
///
/// Only supplied fields change; `updated_at` is always refreshed
pub struct UpdateNoteValues<'a> {
    /// New title
    pub title: Option<&'a String>,

    /// New body text
    pub body: Option<&'a String>,

    /// Replacement for the full association set, not a merge
    pub tag_ids: Option<&'a [i64]>,
}

/// Values to create a Tag
pub struct CreateTagValues<'a> {
    /// Unique name
    pub name: &'a str,

    /// Hex color code, `#RRGGBB`
    pub color: &'a str,
}

/// Values to update a Tag
pub struct UpdateTagValues<'a> {
    /// New name
    pub name: Option<&'a String>,

    /// New color
    pub color: Option<&'a String>,
}

/// Filter for the note search
pub struct SearchFilter<'a> {
    /// Case-insensitive substring to look for in title or body
    pub query: Option<&'a str>,

    /// Restrict to notes carrying ANY of these tags
    pub tag_ids: &'a [i64],
}
