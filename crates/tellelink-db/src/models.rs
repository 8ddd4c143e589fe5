/// Database row types. These map directly to SQLite rows and are kept
/// separate from the tellelink-types API models.

pub struct UserRow {
    pub id: String,
    pub username: String,
    pub password: String,
    pub role: String,
    pub created_at: String,
}

pub struct PostRow {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub owner_id: String,
    pub created_at: String,
}

pub struct PostSummaryRow {
    pub post: PostRow,
    pub link_count: i64,
}

pub struct LinkRow {
    pub id: String,
    pub post_id: String,
    pub button_name: String,
    pub url: String,
    pub original_url: Option<String>,
    pub position: i64,
}

/// A report joined with the post and (optional) link it points at.
pub struct ReportRow {
    pub id: String,
    pub post_id: String,
    pub post_title: String,
    pub post_slug: String,
    pub link_id: Option<String>,
    pub link_button_name: Option<String>,
    pub link_url: Option<String>,
    pub comment: String,
    pub reporter_email: Option<String>,
    pub status: String,
    pub created_at: String,
}

pub struct NewPost<'a> {
    pub id: &'a str,
    pub title: &'a str,
    pub slug: &'a str,
    pub owner_id: &'a str,
}

pub struct NewLink {
    pub id: String,
    pub button_name: String,
    pub url: String,
    pub original_url: Option<String>,
}

pub struct NewReport<'a> {
    pub id: &'a str,
    pub post_id: &'a str,
    pub link_id: Option<&'a str>,
    pub comment: &'a str,
    pub reporter_email: Option<&'a str>,
}
