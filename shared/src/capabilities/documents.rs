use crux_core::capability::{Capability, CapabilityContext, Operation};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::BackendError;

#[derive(Clone)]
pub struct Documents<E> {
    context: CapabilityContext<DocumentOperation, E>,
}

impl<Ev> Capability<Ev> for Documents<Ev> {
    type Operation = DocumentOperation;
    type MappedSelf<MappedEv> = Documents<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static + Send,
    {
        Documents::new(self.context.map_event(f))
    }
}

impl<E> Documents<E>
where
    E: 'static,
{
    pub fn new(context: CapabilityContext<DocumentOperation, E>) -> Self {
        Self { context }
    }

    /// Writes `document` under `collection/id`, replacing any previous one.
    pub fn set_document<F>(&self, collection: String, id: String, document: Value, callback: F)
    where
        F: FnOnce(Result<(), BackendError>) -> E + Send + 'static,
        E: Send,
    {
        let operation = DocumentOperation::SetDocument {
            collection,
            id,
            document,
        };

        let ctx = self.context.clone();
        self.context.spawn(async move {
            let result = ctx.request_from_shell(operation).await.and_then(|out| match out {
                DocumentOutput::Written => Ok(()),
                DocumentOutput::Documents(_) => Err(BackendError::UnexpectedResponse {
                    operation: "set_document".into(),
                }),
            });
            ctx.update_app(callback(result));
        });
    }

    pub fn list_documents<F>(&self, collection: String, callback: F)
    where
        F: FnOnce(Result<Vec<Value>, BackendError>) -> E + Send + 'static,
        E: Send,
    {
        let ctx = self.context.clone();
        self.context.spawn(async move {
            let result = ctx
                .request_from_shell(DocumentOperation::ListDocuments { collection })
                .await
                .and_then(|out| match out {
                    DocumentOutput::Documents(docs) => Ok(docs),
                    DocumentOutput::Written => Err(BackendError::UnexpectedResponse {
                        operation: "list_documents".into(),
                    }),
                });
            ctx.update_app(callback(result));
        });
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum DocumentOperation {
    SetDocument {
        collection: String,
        id: String,
        document: Value,
    },
    ListDocuments {
        collection: String,
    },
}

impl Operation for DocumentOperation {
    type Output = Result<DocumentOutput, BackendError>;
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum DocumentOutput {
    Written,
    Documents(Vec<Value>),
}
