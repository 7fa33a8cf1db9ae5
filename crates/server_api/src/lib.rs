use std::sync::Arc;

use shared::{
    domain::{DocumentSet, DocumentSetId},
    error::ApiError,
    form::{DocumentSetForm, DocumentSetFormData},
};
use storage::DocumentSetStore;
use tracing::{info, warn};

pub const HOME_TITLE: &str = "The Overview Project";

#[derive(Clone)]
pub struct ApiContext {
    pub store: Arc<dyn DocumentSetStore>,
}

impl ApiContext {
    pub fn new(store: impl DocumentSetStore + 'static) -> Self {
        Self {
            store: Arc::new(store),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HomePage {
    pub title: &'static str,
}

/// Everything the listing view needs: the stored sets and the creation form,
/// either fresh or carrying a rejected submission.
#[derive(Debug, Clone)]
pub struct DocumentSetsPage {
    pub document_sets: Vec<DocumentSet>,
    pub form: DocumentSetForm,
}

#[derive(Debug, Clone)]
pub enum CreateOutcome {
    Created(DocumentSet),
    Rejected(DocumentSetsPage),
}

pub fn home_page() -> HomePage {
    HomePage { title: HOME_TITLE }
}

pub async fn list_document_sets(ctx: &ApiContext) -> Result<DocumentSetsPage, ApiError> {
    let document_sets = ctx.store.all().await.map_err(internal)?;
    Ok(DocumentSetsPage {
        document_sets,
        form: DocumentSetForm::empty(),
    })
}

/// Binds and validates a submission. A rejected form never reaches the store.
pub async fn create_document_set(
    ctx: &ApiContext,
    data: DocumentSetFormData,
) -> Result<CreateOutcome, ApiError> {
    match DocumentSetForm::bind(data).validate() {
        Ok(record) => {
            let created = ctx.store.create(&record).await.map_err(internal)?;
            info!(id = %created.id, name = %created.name, "document set created");
            Ok(CreateOutcome::Created(created))
        }
        Err(form) => {
            warn!(errors = form.errors().len(), "document set form rejected");
            let document_sets = ctx.store.all().await.map_err(internal)?;
            Ok(CreateOutcome::Rejected(DocumentSetsPage {
                document_sets,
                form,
            }))
        }
    }
}

pub async fn delete_document_set(ctx: &ApiContext, id: DocumentSetId) -> Result<(), ApiError> {
    let removed = ctx.store.delete(id).await.map_err(internal)?;
    info!(%id, removed, "document set delete requested");
    Ok(())
}

pub async fn health(ctx: &ApiContext) -> Result<(), ApiError> {
    ctx.store.health_check().await.map_err(internal)
}

fn internal(err: anyhow::Error) -> ApiError {
    ApiError::internal(format!("{err:#}"))
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
