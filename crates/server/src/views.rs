//! HTML rendering for the document set pages.
//!
//! Views are plain functions from page data to `Html<String>`. Every value
//! that came from a user or the store goes through `escape` first.

use axum::response::Html;
use server_api::{DocumentSetsPage, HomePage};
use shared::{
    domain::DocumentSet,
    form::{DocumentSetForm, NAME_FIELD, NAME_MAX_CHARS, QUERY_FIELD, QUERY_MAX_CHARS},
};

use crate::DOCUMENT_SETS_ROUTE;

pub fn home(page: &HomePage) -> Html<String> {
    let body = format!(
        "<h1>{title}</h1>\n<p><a href=\"{DOCUMENT_SETS_ROUTE}\">Document sets</a></p>\n",
        title = escape(page.title),
    );
    layout(page.title, &body)
}

pub fn document_sets(page: &DocumentSetsPage) -> Html<String> {
    let mut body = String::from("<h1>Document sets</h1>\n");

    if page.document_sets.is_empty() {
        body.push_str("<p class=\"empty\">No document sets yet.</p>\n");
    } else {
        body.push_str(&format!(
            "<p class=\"count\">{} document set(s)</p>\n<ul class=\"document-sets\">\n",
            page.document_sets.len()
        ));
        for set in &page.document_sets {
            push_document_set(&mut body, set);
        }
        body.push_str("</ul>\n");
    }

    push_creation_form(&mut body, &page.form);
    layout("Document sets", &body)
}

pub fn error_page(message: &str) -> Html<String> {
    let body = format!(
        "<h1>Something went wrong</h1>\n<p class=\"error\">{}</p>\n",
        escape(message)
    );
    layout("Error", &body)
}

fn push_document_set(body: &mut String, set: &DocumentSet) {
    body.push_str(&format!(
        "<li id=\"document-set-{id}\"><span class=\"name\">{name}</span>",
        id = set.id,
        name = escape(&set.name),
    ));
    if let Some(query) = &set.query {
        body.push_str(&format!(" <span class=\"query\">{}</span>", escape(query)));
    }
    body.push_str(&format!(
        " <form method=\"post\" action=\"{DOCUMENT_SETS_ROUTE}/{id}\">\
         <button type=\"submit\">Delete</button></form></li>\n",
        id = set.id,
    ));
}

fn push_creation_form(body: &mut String, form: &DocumentSetForm) {
    body.push_str(&format!(
        "<h2>New document set</h2>\n<form method=\"post\" action=\"{DOCUMENT_SETS_ROUTE}\">\n"
    ));
    push_field(body, form, NAME_FIELD, "Name", form.name(), NAME_MAX_CHARS);
    push_field(body, form, QUERY_FIELD, "Query", form.query(), QUERY_MAX_CHARS);
    body.push_str("<button type=\"submit\">Create</button>\n</form>\n");
}

fn push_field(
    body: &mut String,
    form: &DocumentSetForm,
    field: &str,
    label: &str,
    value: &str,
    max_chars: usize,
) {
    let class = if form.errors_for(field).next().is_some() {
        "field has-error"
    } else {
        "field"
    };
    body.push_str(&format!(
        "<div class=\"{class}\"><label for=\"{field}\">{label}</label>\
         <input type=\"text\" id=\"{field}\" name=\"{field}\" maxlength=\"{max_chars}\" value=\"{value}\">",
        value = escape(value),
    ));
    for error in form.errors_for(field) {
        body.push_str(&format!(
            "<span class=\"error\" data-field=\"{field}\">{}</span>",
            escape(&error.message)
        ));
    }
    body.push_str("</div>\n");
}

fn layout(title: &str, body: &str) -> Html<String> {
    Html(format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n</head>\n<body>\n{body}</body>\n</html>\n",
        escape(title)
    ))
}

pub(crate) fn escape(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            other => escaped.push(other),
        }
    }
    escaped
}

#[cfg(test)]
#[path = "tests/views_tests.rs"]
mod tests;
