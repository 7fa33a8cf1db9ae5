use super::*;
use async_trait::async_trait;
use shared::{
    domain::NewDocumentSet,
    error::ErrorCode,
    form::NAME_FIELD,
};
use storage::Storage;

async fn setup() -> (ApiContext, Storage) {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    (ApiContext::new(storage.clone()), storage)
}

fn form_data(name: Option<&str>) -> DocumentSetFormData {
    DocumentSetFormData {
        name: name.map(str::to_string),
        query: None,
    }
}

struct OfflineStore;

#[async_trait]
impl DocumentSetStore for OfflineStore {
    async fn all(&self) -> anyhow::Result<Vec<DocumentSet>> {
        anyhow::bail!("store offline")
    }

    async fn create(&self, _record: &NewDocumentSet) -> anyhow::Result<DocumentSet> {
        anyhow::bail!("store offline")
    }

    async fn delete(&self, _id: DocumentSetId) -> anyhow::Result<bool> {
        anyhow::bail!("store offline")
    }

    async fn health_check(&self) -> anyhow::Result<()> {
        anyhow::bail!("store offline")
    }
}

#[test]
fn home_page_has_fixed_title() {
    assert_eq!(home_page().title, "The Overview Project");
}

#[tokio::test]
async fn listing_empty_store_returns_fresh_form() {
    let (ctx, _) = setup().await;
    let page = list_document_sets(&ctx).await.expect("page");
    assert!(page.document_sets.is_empty());
    assert_eq!(page.form, DocumentSetForm::empty());
}

#[tokio::test]
async fn valid_submission_is_persisted() {
    let (ctx, storage) = setup().await;
    let outcome = create_document_set(&ctx, form_data(Some("Set A")))
        .await
        .expect("outcome");
    let CreateOutcome::Created(created) = outcome else {
        panic!("expected the submission to be accepted");
    };
    assert_eq!(created.name, "Set A");

    let page = list_document_sets(&ctx).await.expect("page");
    assert_eq!(page.document_sets, vec![created]);
    assert_eq!(storage.count_document_sets().await.expect("count"), 1);
}

#[tokio::test]
async fn invalid_submission_leaves_store_untouched() {
    let (ctx, storage) = setup().await;
    create_document_set(&ctx, form_data(Some("existing")))
        .await
        .expect("seed");

    let outcome = create_document_set(&ctx, form_data(None))
        .await
        .expect("outcome");
    let CreateOutcome::Rejected(page) = outcome else {
        panic!("expected the submission to be rejected");
    };
    assert_eq!(page.document_sets.len(), 1);
    assert_eq!(page.form.errors_for(NAME_FIELD).count(), 1);
    assert_eq!(storage.count_document_sets().await.expect("count"), 1);
}

#[tokio::test]
async fn delete_is_idempotent() {
    let (ctx, _) = setup().await;
    let CreateOutcome::Created(created) = create_document_set(&ctx, form_data(Some("gone")))
        .await
        .expect("outcome")
    else {
        panic!("expected the submission to be accepted");
    };

    delete_document_set(&ctx, created.id).await.expect("delete");
    delete_document_set(&ctx, created.id)
        .await
        .expect("second delete");
    delete_document_set(&ctx, DocumentSetId(12345))
        .await
        .expect("missing delete");

    let page = list_document_sets(&ctx).await.expect("page");
    assert!(page.document_sets.iter().all(|set| set.id != created.id));
}

#[tokio::test]
async fn store_failures_surface_as_internal_errors() {
    let ctx = ApiContext::new(OfflineStore);

    let err = list_document_sets(&ctx).await.expect_err("list fails");
    assert_eq!(err.code, ErrorCode::Internal);
    assert!(err.message.contains("store offline"));

    let err = create_document_set(&ctx, form_data(Some("Set A")))
        .await
        .expect_err("create fails");
    assert_eq!(err.code, ErrorCode::Internal);

    let err = delete_document_set(&ctx, DocumentSetId(1))
        .await
        .expect_err("delete fails");
    assert_eq!(err.code, ErrorCode::Internal);

    assert!(health(&ctx).await.is_err());
}
