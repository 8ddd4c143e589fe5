use crate::models::{
    LinkRow, NewLink, NewPost, NewReport, PostRow, PostSummaryRow, ReportRow, UserRow,
};
use crate::Database;
use anyhow::{Result, anyhow, bail};
use rusqlite::{Connection, OptionalExtension, Row};
use tellelink_types::models::{MAX_LINKS_PER_POST, ReportStatus, Role};

const POST_COLUMNS: &str = "p.id, p.title, p.slug, p.owner_id, p.created_at";

const REPORT_SELECT: &str =
    "SELECT r.id, r.post_id, p.title, p.slug, r.link_id, l.button_name, l.url,
            r.comment, r.reporter_email, r.status, r.created_at
     FROM reports r
     JOIN posts p ON p.id = r.post_id
     LEFT JOIN links l ON l.id = r.link_id";

impl Database {
    // -- Users --

    /// Returns false when the username is already taken.
    pub fn create_user(&self, id: &str, username: &str, password_hash: &str, role: Role) -> Result<bool> {
        self.with_conn(|conn| {
            let inserted = conn.execute(
                "INSERT INTO users (id, username, password, role) VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(username) DO NOTHING",
                (id, username, password_hash, role.as_str()),
            )?;
            Ok(inserted == 1)
        })
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT id, username, password, role, created_at FROM users WHERE username = ?1",
                    [username],
                    |row| {
                        Ok(UserRow {
                            id: row.get(0)?,
                            username: row.get(1)?,
                            password: row.get(2)?,
                            role: row.get(3)?,
                            created_at: row.get(4)?,
                        })
                    },
                )
                .optional()?;
            Ok(row)
        })
    }

    /// Grants the admin role to every listed username that has an account.
    /// Returns how many accounts changed.
    pub fn promote_admins(&self, usernames: &[String]) -> Result<usize> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "UPDATE users SET role = 'admin' WHERE username = ?1 AND role != 'admin'",
            )?;
            let mut changed = 0;
            for name in usernames {
                changed += stmt.execute([name])?;
            }
            Ok(changed)
        })
    }

    // -- Posts --

    /// Inserts a post and its links in one transaction, positions following
    /// the order of `links`.
    ///
    /// Returns `Ok(None)` without writing anything when the slug is already
    /// in use or belonged to a deleted post.
    pub fn create_post(&self, post: &NewPost<'_>, links: &[NewLink]) -> Result<Option<PostRow>> {
        if links.is_empty() || links.len() > MAX_LINKS_PER_POST {
            bail!(
                "a post needs between 1 and {} links, got {}",
                MAX_LINKS_PER_POST,
                links.len()
            );
        }

        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let retired: bool = tx.query_row(
                "SELECT EXISTS(SELECT 1 FROM retired_slugs WHERE slug = ?1)",
                [post.slug],
                |row| row.get(0),
            )?;
            if retired {
                return Ok(None);
            }

            let inserted = tx.execute(
                "INSERT INTO posts (id, title, slug, owner_id) VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(slug) DO NOTHING",
                (post.id, post.title, post.slug, post.owner_id),
            )?;
            if inserted == 0 {
                return Ok(None);
            }

            {
                let mut stmt = tx.prepare(
                    "INSERT INTO links (id, post_id, button_name, url, original_url, position)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                )?;
                for (position, link) in links.iter().enumerate() {
                    stmt.execute(rusqlite::params![
                        link.id,
                        post.id,
                        link.button_name,
                        link.url,
                        link.original_url,
                        position as i64,
                    ])?;
                }
            }

            let row = query_post(&tx, "p.id = ?1", post.id)?
                .ok_or_else(|| anyhow!("Post {} missing inside its own transaction", post.id))?;

            tx.commit()?;
            Ok(Some(row))
        })
    }

    /// The owner's posts, newest first, optionally filtered by a
    /// case-insensitive title substring.
    pub fn list_posts_for_owner(&self, owner_id: &str, search: Option<&str>) -> Result<Vec<PostSummaryRow>> {
        let search = search.map(str::trim).filter(|s| !s.is_empty());

        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {POST_COLUMNS}, COUNT(l.id)
                 FROM posts p
                 LEFT JOIN links l ON l.post_id = p.id
                 WHERE p.owner_id = ?1
                   AND (?2 IS NULL OR instr(lower(p.title), lower(?2)) > 0)
                 GROUP BY p.id
                 ORDER BY p.created_at DESC, p.rowid DESC"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(rusqlite::params![owner_id, search], |row| {
                    Ok(PostSummaryRow {
                        post: post_from_row(row)?,
                        link_count: row.get(5)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn get_post_by_slug(&self, slug: &str) -> Result<Option<PostRow>> {
        self.with_conn(|conn| query_post(conn, "p.slug = ?1", slug))
    }

    pub fn get_post_by_id(&self, post_id: &str) -> Result<Option<PostRow>> {
        self.with_conn(|conn| query_post(conn, "p.id = ?1", post_id))
    }

    /// Fetches a post only if `owner_id` owns it.
    pub fn get_owned_post(&self, owner_id: &str, post_id: &str) -> Result<Option<PostRow>> {
        Ok(self
            .get_post_by_id(post_id)?
            .filter(|post| post.owner_id == owner_id))
    }

    pub fn get_links_for_post(&self, post_id: &str) -> Result<Vec<LinkRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, post_id, button_name, url, original_url, position
                 FROM links
                 WHERE post_id = ?1
                 ORDER BY position",
            )?;
            let rows = stmt
                .query_map([post_id], |row| {
                    Ok(LinkRow {
                        id: row.get(0)?,
                        post_id: row.get(1)?,
                        button_name: row.get(2)?,
                        url: row.get(3)?,
                        original_url: row.get(4)?,
                        position: row.get(5)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Deletes an owned post. Links and reports go with it via
    /// `ON DELETE CASCADE`, and the slug is retired.
    ///
    /// Returns false if no such post exists for this owner.
    pub fn delete_post(&self, owner_id: &str, post_id: &str) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let slug: Option<String> = tx
                .query_row(
                    "SELECT slug FROM posts WHERE id = ?1 AND owner_id = ?2",
                    [post_id, owner_id],
                    |row| row.get(0),
                )
                .optional()?;

            let Some(slug) = slug else {
                return Ok(false);
            };

            tx.execute("INSERT OR IGNORE INTO retired_slugs (slug) VALUES (?1)", [&slug])?;
            tx.execute("DELETE FROM posts WHERE id = ?1", [post_id])?;

            tx.commit()?;
            Ok(true)
        })
    }

    // -- Reports --

    pub fn insert_report(&self, report: &NewReport<'_>) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO reports (id, post_id, link_id, comment, reporter_email)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![
                    report.id,
                    report.post_id,
                    report.link_id,
                    report.comment,
                    report.reporter_email,
                ],
            )?;
            Ok(())
        })
    }

    pub fn link_belongs_to_post(&self, link_id: &str, post_id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let exists = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM links WHERE id = ?1 AND post_id = ?2)",
                [link_id, post_id],
                |row| row.get(0),
            )?;
            Ok(exists)
        })
    }

    /// All reports, newest first, optionally restricted to one status.
    pub fn list_reports(&self, status: Option<ReportStatus>) -> Result<Vec<ReportRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "{REPORT_SELECT}
                 WHERE (?1 IS NULL OR r.status = ?1)
                 ORDER BY r.created_at DESC, r.rowid DESC"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([status.map(|s| s.as_str())], report_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn get_report(&self, report_id: &str) -> Result<Option<ReportRow>> {
        self.with_conn(|conn| {
            let sql = format!("{REPORT_SELECT} WHERE r.id = ?1");
            let row = conn.query_row(&sql, [report_id], report_from_row).optional()?;
            Ok(row)
        })
    }

    /// Sets a report's status. Writing the current value again is allowed.
    /// Returns false if the report does not exist.
    pub fn set_report_status(&self, report_id: &str, status: ReportStatus) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE reports SET status = ?1 WHERE id = ?2",
                [status.as_str(), report_id],
            )?;
            Ok(changed == 1)
        })
    }

    // -- Settings --

    pub fn get_link_shortener_enabled(&self, user_id: &str) -> Result<Option<bool>> {
        self.with_conn(|conn| {
            let enabled = conn
                .query_row(
                    "SELECT enable_link_shortener FROM user_settings WHERE user_id = ?1",
                    [user_id],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(enabled)
        })
    }

    pub fn upsert_link_shortener_enabled(&self, user_id: &str, enabled: bool) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO user_settings (user_id, enable_link_shortener) VALUES (?1, ?2)
                 ON CONFLICT(user_id) DO UPDATE SET enable_link_shortener = excluded.enable_link_shortener",
                rusqlite::params![user_id, enabled],
            )?;
            Ok(())
        })
    }
}

fn query_post(conn: &Connection, predicate: &str, value: &str) -> Result<Option<PostRow>> {
    let sql = format!("SELECT {POST_COLUMNS} FROM posts p WHERE {predicate}");
    let row = conn.query_row(&sql, [value], post_from_row).optional()?;
    Ok(row)
}

fn post_from_row(row: &Row<'_>) -> rusqlite::Result<PostRow> {
    Ok(PostRow {
        id: row.get(0)?,
        title: row.get(1)?,
        slug: row.get(2)?,
        owner_id: row.get(3)?,
        created_at: row.get(4)?,
    })
}

fn report_from_row(row: &Row<'_>) -> rusqlite::Result<ReportRow> {
    Ok(ReportRow {
        id: row.get(0)?,
        post_id: row.get(1)?,
        post_title: row.get(2)?,
        post_slug: row.get(3)?,
        link_id: row.get(4)?,
        link_button_name: row.get(5)?,
        link_url: row.get(6)?,
        comment: row.get(7)?,
        reporter_email: row.get(8)?,
        status: row.get(9)?,
        created_at: row.get(10)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn db_with_user(username: &str) -> (Database, String) {
        let db = Database::open_in_memory().unwrap();
        let id = add_user(&db, username);
        (db, id)
    }

    fn add_user(db: &Database, username: &str) -> String {
        let id = Uuid::new_v4().to_string();
        assert!(db.create_user(&id, username, "hash", Role::User).unwrap());
        id
    }

    fn links(n: usize) -> Vec<NewLink> {
        (0..n)
            .map(|i| NewLink {
                id: Uuid::new_v4().to_string(),
                button_name: format!("Button {i}"),
                url: format!("https://example.com/{i}"),
                original_url: None,
            })
            .collect()
    }

    fn create(db: &Database, owner_id: &str, title: &str, slug: &str, n: usize) -> PostRow {
        let id = Uuid::new_v4().to_string();
        let post = NewPost { id: &id, title, slug, owner_id };
        db.create_post(&post, &links(n)).unwrap().unwrap()
    }

    fn count(db: &Database, table: &str) -> i64 {
        db.with_conn(|conn| {
            Ok(conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |r| r.get(0))?)
        })
        .unwrap()
    }

    fn report(db: &Database, post_id: &str, link_id: Option<&str>) -> String {
        let id = Uuid::new_v4().to_string();
        db.insert_report(&NewReport {
            id: &id,
            post_id,
            link_id,
            comment: "dead link",
            reporter_email: None,
        })
        .unwrap();
        id
    }

    #[test]
    fn create_post_stores_links_in_input_order() {
        let (db, owner) = db_with_user("alice");
        let post = create(&db, &owner, "Movies", "movies-abc123", 5);

        let rows = db.get_links_for_post(&post.id).unwrap();
        assert_eq!(rows.len(), 5);
        for (i, link) in rows.iter().enumerate() {
            assert_eq!(link.position, i as i64);
            assert_eq!(link.button_name, format!("Button {i}"));
            assert_eq!(link.url, format!("https://example.com/{i}"));
        }
    }

    #[test]
    fn duplicate_slug_writes_nothing() {
        let (db, owner) = db_with_user("alice");
        create(&db, &owner, "First", "same-slug", 1);

        let id = Uuid::new_v4().to_string();
        let post = NewPost { id: &id, title: "Second", slug: "same-slug", owner_id: &owner };
        assert!(db.create_post(&post, &links(3)).unwrap().is_none());

        assert_eq!(count(&db, "posts"), 1);
        assert_eq!(count(&db, "links"), 1);
    }

    #[test]
    fn create_post_rejects_empty_and_oversized_link_lists() {
        let (db, owner) = db_with_user("alice");
        let id = Uuid::new_v4().to_string();
        let post = NewPost { id: &id, title: "T", slug: "t-000000", owner_id: &owner };

        assert!(db.create_post(&post, &[]).is_err());
        assert!(db.create_post(&post, &links(MAX_LINKS_PER_POST + 1)).is_err());
        assert_eq!(count(&db, "posts"), 0);

        assert!(db.create_post(&post, &links(MAX_LINKS_PER_POST)).unwrap().is_some());
    }

    #[test]
    fn failed_link_insert_rolls_back_post() {
        let (db, owner) = db_with_user("alice");
        let mut rows = links(2);
        // Same primary key twice makes the second link insert fail.
        rows[1].id = rows[0].id.clone();

        let id = Uuid::new_v4().to_string();
        let post = NewPost { id: &id, title: "T", slug: "t-111111", owner_id: &owner };
        assert!(db.create_post(&post, &rows).is_err());

        assert_eq!(count(&db, "posts"), 0);
        assert_eq!(count(&db, "links"), 0);
        assert!(db.get_post_by_slug("t-111111").unwrap().is_none());
    }

    #[test]
    fn delete_cascades_and_retires_slug() {
        let (db, owner) = db_with_user("alice");
        let post = create(&db, &owner, "Gone", "gone-aaaaaa", 3);
        let first_link = db.get_links_for_post(&post.id).unwrap().remove(0);
        report(&db, &post.id, Some(&first_link.id));
        report(&db, &post.id, None);

        assert!(db.delete_post(&owner, &post.id).unwrap());

        assert!(db.get_post_by_slug("gone-aaaaaa").unwrap().is_none());
        assert_eq!(count(&db, "links"), 0);
        assert_eq!(count(&db, "reports"), 0);

        let id = Uuid::new_v4().to_string();
        let again = NewPost { id: &id, title: "Gone", slug: "gone-aaaaaa", owner_id: &owner };
        assert!(db.create_post(&again, &links(1)).unwrap().is_none());
    }

    #[test]
    fn owners_cannot_touch_each_others_posts() {
        let (db, alice) = db_with_user("alice");
        let bob = add_user(&db, "bob");
        let post = create(&db, &alice, "Mine", "mine-bbbbbb", 1);

        assert!(db.get_owned_post(&bob, &post.id).unwrap().is_none());
        assert!(!db.delete_post(&bob, &post.id).unwrap());
        assert!(db.list_posts_for_owner(&bob, None).unwrap().is_empty());

        assert!(db.get_owned_post(&alice, &post.id).unwrap().is_some());
    }

    #[test]
    fn list_posts_filters_by_title_and_counts_links() {
        let (db, owner) = db_with_user("alice");
        create(&db, &owner, "Summer Movies", "summer-movies-cccccc", 2);
        create(&db, &owner, "Winter Music", "winter-music-dddddd", 4);

        let all = db.list_posts_for_owner(&owner, None).unwrap();
        assert_eq!(all.len(), 2);
        // Newest first
        assert_eq!(all[0].post.title, "Winter Music");
        assert_eq!(all[0].link_count, 4);

        let movies = db.list_posts_for_owner(&owner, Some("MOVIE")).unwrap();
        assert_eq!(movies.len(), 1);
        assert_eq!(movies[0].post.slug, "summer-movies-cccccc");
        assert_eq!(movies[0].link_count, 2);

        assert_eq!(db.list_posts_for_owner(&owner, Some("  ")).unwrap().len(), 2);
    }

    #[test]
    fn report_status_toggles_back_and_forth() {
        let (db, owner) = db_with_user("alice");
        let post = create(&db, &owner, "P", "p-eeeeee", 1);
        let id = report(&db, &post.id, None);

        let status = |db: &Database| db.get_report(&id).unwrap().unwrap().status;
        assert_eq!(status(&db), "pending");

        assert!(db.set_report_status(&id, ReportStatus::Resolved).unwrap());
        assert!(db.set_report_status(&id, ReportStatus::Resolved).unwrap());
        assert_eq!(status(&db), "resolved");

        assert!(db.set_report_status(&id, ReportStatus::Pending).unwrap());
        assert_eq!(status(&db), "pending");

        assert!(!db.set_report_status("missing", ReportStatus::Resolved).unwrap());
        assert_eq!(count(&db, "reports"), 1);
    }

    #[test]
    fn list_reports_joins_post_and_link() {
        let (db, owner) = db_with_user("alice");
        let post = create(&db, &owner, "Joined", "joined-ffffff", 2);
        let link = db.get_links_for_post(&post.id).unwrap().remove(1);
        let general = report(&db, &post.id, None);
        let specific = report(&db, &post.id, Some(&link.id));
        db.set_report_status(&general, ReportStatus::Resolved).unwrap();

        let all = db.list_reports(None).unwrap();
        assert_eq!(all.len(), 2);
        assert!(all.iter().all(|r| r.post_slug == "joined-ffffff"));

        let pending = db.list_reports(Some(ReportStatus::Pending)).unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, specific);
        assert_eq!(pending[0].link_url.as_deref(), Some("https://example.com/1"));

        let resolved = db.list_reports(Some(ReportStatus::Resolved)).unwrap();
        assert_eq!(resolved[0].link_id, None);
        assert_eq!(resolved[0].link_button_name, None);
    }

    #[test]
    fn link_ownership_check() {
        let (db, owner) = db_with_user("alice");
        let a = create(&db, &owner, "A", "a-gggggg", 1);
        let b = create(&db, &owner, "B", "b-hhhhhh", 1);
        let link_a = db.get_links_for_post(&a.id).unwrap().remove(0);

        assert!(db.link_belongs_to_post(&link_a.id, &a.id).unwrap());
        assert!(!db.link_belongs_to_post(&link_a.id, &b.id).unwrap());
    }

    #[test]
    fn settings_upsert_keeps_one_row() {
        let (db, user) = db_with_user("alice");
        assert_eq!(db.get_link_shortener_enabled(&user).unwrap(), None);

        db.upsert_link_shortener_enabled(&user, true).unwrap();
        assert_eq!(db.get_link_shortener_enabled(&user).unwrap(), Some(true));

        db.upsert_link_shortener_enabled(&user, false).unwrap();
        assert_eq!(db.get_link_shortener_enabled(&user).unwrap(), Some(false));
        assert_eq!(count(&db, "user_settings"), 1);
    }

    #[test]
    fn promote_admins_only_touches_listed_users() {
        let (db, _) = db_with_user("alice");
        add_user(&db, "bob");

        let changed = db
            .promote_admins(&["alice".to_string(), "nobody".to_string()])
            .unwrap();
        assert_eq!(changed, 1);

        assert_eq!(db.get_user_by_username("alice").unwrap().unwrap().role, "admin");
        assert_eq!(db.get_user_by_username("bob").unwrap().unwrap().role, "user");
        assert_eq!(db.promote_admins(&["alice".to_string()]).unwrap(), 0);
    }

    #[test]
    fn duplicate_username_is_not_inserted() {
        let (db, first_id) = db_with_user("carol");

        let created = db
            .create_user(&Uuid::new_v4().to_string(), "carol", "other", Role::Admin)
            .unwrap();
        assert!(!created);

        let user = db.get_user_by_username("carol").unwrap().unwrap();
        assert_eq!(user.id, first_id);
        assert_eq!(user.role, "user");
        assert_eq!(count(&db, "users"), 1);
    }
}
