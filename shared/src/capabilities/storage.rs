use crux_core::capability::{Capability, CapabilityContext, Operation};
use serde::{Deserialize, Serialize};

use super::BackendError;

#[derive(Clone)]
pub struct Storage<E> {
    context: CapabilityContext<StorageOperation, E>,
}

impl<Ev> Capability<Ev> for Storage<Ev> {
    type Operation = StorageOperation;
    type MappedSelf<MappedEv> = Storage<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static + Send,
    {
        Storage::new(self.context.map_event(f))
    }
}

impl<E> Storage<E>
where
    E: 'static,
{
    pub fn new(context: CapabilityContext<StorageOperation, E>) -> Self {
        Self { context }
    }

    pub fn upload_file<F>(&self, path: String, local_uri: String, callback: F)
    where
        F: FnOnce(Result<(), BackendError>) -> E + Send + 'static,
        E: Send,
    {
        let operation = StorageOperation::UploadFile {
            path,
            local_uri,
            cache_control: crate::UPLOAD_CACHE_CONTROL.to_string(),
        };

        let ctx = self.context.clone();
        self.context.spawn(async move {
            let result = ctx.request_from_shell(operation).await.and_then(|out| match out {
                StorageOutput::Uploaded => Ok(()),
                StorageOutput::DownloadUrl(_) => Err(BackendError::UnexpectedResponse {
                    operation: "upload_file".into(),
                }),
            });
            ctx.update_app(callback(result));
        });
    }

    pub fn download_url<F>(&self, path: String, callback: F)
    where
        F: FnOnce(Result<String, BackendError>) -> E + Send + 'static,
        E: Send,
    {
        let ctx = self.context.clone();
        self.context.spawn(async move {
            let result = ctx
                .request_from_shell(StorageOperation::GetDownloadUrl { path })
                .await
                .and_then(|out| match out {
                    StorageOutput::DownloadUrl(url) => Ok(url),
                    StorageOutput::Uploaded => Err(BackendError::UnexpectedResponse {
                        operation: "get_download_url".into(),
                    }),
                });
            ctx.update_app(callback(result));
        });
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum StorageOperation {
    UploadFile {
        path: String,
        local_uri: String,
        cache_control: String,
    },
    GetDownloadUrl {
        path: String,
    },
}

impl Operation for StorageOperation {
    type Output = Result<StorageOutput, BackendError>;
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum StorageOutput {
    Uploaded,
    DownloadUrl(String),
}

/// Object path for a profile picture: `{prefix}/{uid}.{ext}`.
///
/// The extension comes from the local file; anything without a usable one
/// is stored as a jpeg.
pub fn profile_photo_path(prefix: &str, uid: &str, local_uri: &str) -> String {
    let prefix = prefix.trim_matches('/');
    format!("{prefix}/{uid}.{}", file_extension(local_uri))
}

fn file_extension(local_uri: &str) -> String {
    let without_query = local_uri
        .split(['?', '#'])
        .next()
        .unwrap_or_default();
    let file_name = without_query.rsplit('/').next().unwrap_or_default();

    match file_name.rsplit_once('.') {
        Some((stem, ext))
            if !stem.is_empty()
                && !ext.is_empty()
                && ext.len() <= 5
                && ext.chars().all(|c| c.is_ascii_alphanumeric()) =>
        {
            ext.to_ascii_lowercase()
        }
        _ => crate::DEFAULT_PHOTO_EXTENSION.to_string(),
    }
}
