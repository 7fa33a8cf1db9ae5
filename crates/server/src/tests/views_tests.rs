use super::*;
use chrono::{TimeZone, Utc};
use shared::{domain::DocumentSetId, form::DocumentSetFormData};

fn stored(id: i64, name: &str, query: Option<&str>) -> DocumentSet {
    DocumentSet {
        id: DocumentSetId(id),
        name: name.to_string(),
        query: query.map(str::to_string),
        created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
    }
}

#[test]
fn escapes_markup_characters() {
    assert_eq!(
        escape(r#"<a href="x">Tom & Jerry's</a>"#),
        "&lt;a href=&quot;x&quot;&gt;Tom &amp; Jerry&#x27;s&lt;/a&gt;"
    );
}

#[test]
fn home_page_shows_title_and_link() {
    let Html(html) = home(&server_api::home_page());
    assert!(html.contains("<title>The Overview Project</title>"));
    assert!(html.contains("<h1>The Overview Project</h1>"));
    assert!(html.contains("href=\"/documentSets\""));
}

#[test]
fn empty_listing_renders_placeholder_and_blank_form() {
    let page = DocumentSetsPage {
        document_sets: Vec::new(),
        form: DocumentSetForm::empty(),
    };
    let Html(html) = document_sets(&page);
    assert!(html.contains("No document sets yet."));
    assert!(html.contains("name=\"name\""));
    assert!(html.contains("value=\"\""));
    assert!(!html.contains("class=\"error\""));
}

#[test]
fn listing_renders_each_set_with_delete_form() {
    let page = DocumentSetsPage {
        document_sets: vec![stored(3, "Set A", Some("projectid:1")), stored(7, "<b>B</b>", None)],
        form: DocumentSetForm::empty(),
    };
    let Html(html) = document_sets(&page);
    assert!(html.contains("2 document set(s)"));
    assert!(html.contains("<span class=\"name\">Set A</span>"));
    assert!(html.contains("<span class=\"query\">projectid:1</span>"));
    assert!(html.contains("action=\"/documentSets/3\""));
    assert!(html.contains("action=\"/documentSets/7\""));
    assert!(html.contains("&lt;b&gt;B&lt;/b&gt;"));
    assert!(!html.contains("<b>B</b>"));
}

#[test]
fn rejected_form_shows_errors_and_submitted_values() {
    let form = DocumentSetForm::bind(DocumentSetFormData {
        name: Some("   ".into()),
        query: Some("\"quoted\"".into()),
    })
    .validate()
    .expect_err("blank name is rejected");
    let page = DocumentSetsPage {
        document_sets: Vec::new(),
        form,
    };
    let Html(html) = document_sets(&page);
    assert!(html.contains("field has-error"));
    assert!(html.contains(
        "<span class=\"error\" data-field=\"name\">This field is required</span>"
    ));
    assert!(html.contains("value=\"&quot;quoted&quot;\""));
}

#[test]
fn error_page_escapes_message() {
    let Html(html) = error_page("db <down>");
    assert!(html.contains("db &lt;down&gt;"));
}
