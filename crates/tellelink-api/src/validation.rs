use reqwest::Url;

use tellelink_types::api::{CreatePostRequest, CreateReportRequest, FieldError};
use tellelink_types::models::MAX_LINKS_PER_POST;

use crate::error::ApiError;

const MAX_TITLE_CHARS: usize = 200;
const MAX_BUTTON_NAME_CHARS: usize = 100;
const MAX_URL_LEN: usize = 2048;
const MAX_COMMENT_CHARS: usize = 2000;
const MAX_EMAIL_LEN: usize = 254;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidLink {
    pub button_name: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidPost {
    pub title: String,
    pub links: Vec<ValidLink>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidReport {
    pub comment: String,
    pub reporter_email: Option<String>,
}

/// Checks a post submission and returns the trimmed title and the usable
/// links in submission order.
///
/// Link rows with a blank button name or blank URL are skipped rather than
/// reported. All problems are collected, keyed by the submitted row index.
pub fn validate_post(req: &CreatePostRequest) -> Result<ValidPost, ApiError> {
    let mut errors = Vec::new();

    let title = req.title.trim();
    if title.is_empty() {
        errors.push(FieldError::new("title", "Please enter a title"));
    } else if title.chars().count() > MAX_TITLE_CHARS {
        errors.push(FieldError::new(
            "title",
            format!("Title must be at most {} characters", MAX_TITLE_CHARS),
        ));
    }

    if req.links.len() > MAX_LINKS_PER_POST {
        errors.push(FieldError::new(
            "links",
            format!("A post can have at most {} links", MAX_LINKS_PER_POST),
        ));
    }

    let mut links = Vec::new();
    for (i, link) in req.links.iter().enumerate() {
        let button_name = link.button_name.trim();
        let url = link.url.trim();
        if button_name.is_empty() || url.is_empty() {
            continue;
        }

        if button_name.chars().count() > MAX_BUTTON_NAME_CHARS {
            errors.push(FieldError::new(
                format!("links[{}].button_name", i),
                format!("Button name must be at most {} characters", MAX_BUTTON_NAME_CHARS),
            ));
        }
        if url.len() > MAX_URL_LEN || !is_web_url(url) {
            errors.push(FieldError::new(
                format!("links[{}].url", i),
                "Please enter a valid http(s) URL",
            ));
        }

        links.push(ValidLink {
            button_name: button_name.to_string(),
            url: url.to_string(),
        });
    }

    if links.is_empty() {
        errors.push(FieldError::new("links", "Please add at least one link"));
    }

    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    Ok(ValidPost {
        title: title.to_string(),
        links,
    })
}

pub fn validate_report(req: &CreateReportRequest) -> Result<ValidReport, ApiError> {
    let mut errors = Vec::new();

    let comment = req.comment.trim();
    if comment.is_empty() {
        errors.push(FieldError::new("comment", "Please provide a comment"));
    } else if comment.chars().count() > MAX_COMMENT_CHARS {
        errors.push(FieldError::new(
            "comment",
            format!("Comment must be at most {} characters", MAX_COMMENT_CHARS),
        ));
    }

    let reporter_email = req
        .reporter_email
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty());
    if let Some(email) = reporter_email {
        if email.len() > MAX_EMAIL_LEN || !looks_like_email(email) {
            errors.push(FieldError::new("reporter_email", "Please enter a valid email"));
        }
    }

    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    Ok(ValidReport {
        comment: comment.to_string(),
        reporter_email: reporter_email.map(str::to_string),
    })
}

fn is_web_url(raw: &str) -> bool {
    Url::parse(raw)
        .map(|u| matches!(u.scheme(), "http" | "https") && u.has_host())
        .unwrap_or(false)
}

fn looks_like_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tellelink_types::api::LinkInput;
    use uuid::Uuid;

    fn link(name: &str, url: &str) -> LinkInput {
        LinkInput {
            button_name: name.into(),
            url: url.into(),
        }
    }

    fn post(title: &str, links: Vec<LinkInput>) -> CreatePostRequest {
        CreatePostRequest {
            title: title.into(),
            links,
        }
    }

    fn fields(err: ApiError) -> Vec<String> {
        match err {
            ApiError::Validation(fields) => fields.into_iter().map(|f| f.field).collect(),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn blank_rows_are_skipped_and_order_kept() {
        let valid = validate_post(&post(
            "  Weekend picks ",
            vec![
                link("First", "https://a.example"),
                link("", "https://ignored.example"),
                link("No url", "   "),
                link(" Second ", " http://b.example/path "),
            ],
        ))
        .unwrap();

        assert_eq!(valid.title, "Weekend picks");
        assert_eq!(
            valid.links,
            vec![
                ValidLink { button_name: "First".into(), url: "https://a.example".into() },
                ValidLink { button_name: "Second".into(), url: "http://b.example/path".into() },
            ]
        );
    }

    #[test]
    fn empty_title_and_no_links_reported_together() {
        let err = validate_post(&post("   ", vec![link("", "")])).unwrap_err();
        assert_eq!(fields(err), vec!["title", "links"]);
    }

    #[test]
    fn invalid_url_is_reported_by_row() {
        let err = validate_post(&post(
            "T",
            vec![link("ok", "https://ok.example"), link("bad", "javascript:alert(1)")],
        ))
        .unwrap_err();
        assert_eq!(fields(err), vec!["links[1].url"]);

        let err = validate_post(&post("T", vec![link("rel", "/relative")])).unwrap_err();
        assert_eq!(fields(err), vec!["links[0].url"]);
    }

    #[test]
    fn link_count_is_capped() {
        let many = (0..=MAX_LINKS_PER_POST)
            .map(|i| link(&format!("b{i}"), "https://x.example"))
            .collect();
        let err = validate_post(&post("T", many)).unwrap_err();
        assert_eq!(fields(err), vec!["links"]);

        let max = (0..MAX_LINKS_PER_POST)
            .map(|i| link(&format!("b{i}"), "https://x.example"))
            .collect();
        assert_eq!(validate_post(&post("T", max)).unwrap().links.len(), MAX_LINKS_PER_POST);
    }

    #[test]
    fn report_requires_comment_and_normalizes_email() {
        let req = |comment: &str, email: Option<&str>| CreateReportRequest {
            post_id: Uuid::nil(),
            link_id: None,
            comment: comment.into(),
            reporter_email: email.map(str::to_string),
        };

        let err = validate_report(&req("  ", None)).unwrap_err();
        assert_eq!(fields(err), vec!["comment"]);

        let ok = validate_report(&req(" broken ", Some("   "))).unwrap();
        assert_eq!(ok.comment, "broken");
        assert_eq!(ok.reporter_email, None);

        let ok = validate_report(&req("broken", Some(" me@example.com "))).unwrap();
        assert_eq!(ok.reporter_email.as_deref(), Some("me@example.com"));

        let err = validate_report(&req("broken", Some("not-an-email"))).unwrap_err();
        assert_eq!(fields(err), vec!["reporter_email"]);
    }

    fn padded(prefix: &str, total: usize) -> String {
        format!("{prefix}{}", "a".repeat(total - prefix.len()))
    }

    #[test]
    fn title_length_boundary() {
        let ok = "t".repeat(MAX_TITLE_CHARS);
        let links = || vec![link("ok", "https://ok.example")];
        assert_eq!(validate_post(&post(&ok, links())).unwrap().title, ok);

        let err = validate_post(&post(&format!("{ok}t"), links())).unwrap_err();
        assert_eq!(fields(err), vec!["title"]);

        // Counted in characters, not bytes.
        let wide = "é".repeat(MAX_TITLE_CHARS);
        assert!(validate_post(&post(&wide, links())).is_ok());
    }

    #[test]
    fn button_name_length_boundary() {
        let ok = "b".repeat(MAX_BUTTON_NAME_CHARS);
        let valid = validate_post(&post("T", vec![link(&ok, "https://ok.example")])).unwrap();
        assert_eq!(valid.links[0].button_name, ok);

        let err = validate_post(&post(
            "T",
            vec![link("fine", "https://ok.example"), link(&format!("{ok}b"), "https://ok.example")],
        ))
        .unwrap_err();
        assert_eq!(fields(err), vec!["links[1].button_name"]);
    }

    #[test]
    fn url_length_boundary() {
        let ok = padded("https://example.com/", MAX_URL_LEN);
        assert_eq!(ok.len(), MAX_URL_LEN);
        let valid = validate_post(&post("T", vec![link("b", &ok)])).unwrap();
        assert_eq!(valid.links[0].url, ok);

        let long = padded("https://example.com/", MAX_URL_LEN + 1);
        let err = validate_post(&post("T", vec![link("b", &long)])).unwrap_err();
        assert_eq!(fields(err), vec!["links[0].url"]);
    }

    fn report(comment: &str, email: Option<&str>) -> CreateReportRequest {
        CreateReportRequest {
            post_id: Uuid::nil(),
            link_id: None,
            comment: comment.into(),
            reporter_email: email.map(str::to_string),
        }
    }

    #[test]
    fn comment_length_boundary() {
        let ok = "c".repeat(MAX_COMMENT_CHARS);
        assert_eq!(validate_report(&report(&ok, None)).unwrap().comment, ok);

        let err = validate_report(&report(&format!("{ok}c"), None)).unwrap_err();
        assert_eq!(fields(err), vec!["comment"]);
    }

    #[test]
    fn email_length_boundary() {
        let domain = "@example.com";
        let ok = format!("{}{domain}", "e".repeat(MAX_EMAIL_LEN - domain.len()));
        assert_eq!(ok.len(), MAX_EMAIL_LEN);
        let valid = validate_report(&report("broken", Some(&ok))).unwrap();
        assert_eq!(valid.reporter_email.as_deref(), Some(ok.as_str()));

        let long = format!("e{ok}");
        let err = validate_report(&report("broken", Some(&long))).unwrap_err();
        assert_eq!(fields(err), vec!["reporter_email"]);
    }
}
