//! Recording mocks shared by the unit tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use line_bot_sdk::{ApiError, SendMessage};

use crate::gateway::{GatewayError, MessagingGateway};
use crate::image_store::{content_type_for, ImageFile, ImageStore, StorageError, StoredImage};
use crate::message::{ContentId, ReplyToken};

pub(crate) type OperationLog = Arc<Mutex<Vec<String>>>;

#[derive(Default)]
pub(crate) struct RecordingGateway {
    pub replies: Mutex<Vec<(String, Vec<SendMessage>)>>,
    pub content: Mutex<HashMap<String, Bytes>>,
    pub fail_replies: bool,
    pub log: OperationLog,
}

impl RecordingGateway {
    pub fn with_content(self, id: &str, bytes: &[u8]) -> Self {
        self.content
            .lock()
            .unwrap()
            .insert(id.to_string(), Bytes::copy_from_slice(bytes));
        self
    }

    pub fn failing_replies(mut self) -> Self {
        self.fail_replies = true;
        self
    }

    pub fn sharing_log(mut self, log: &OperationLog) -> Self {
        self.log = Arc::clone(log);
        self
    }

    pub fn sent(&self) -> Vec<(String, Vec<SendMessage>)> {
        self.replies.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessagingGateway for RecordingGateway {
    async fn reply(
        &self,
        reply_token: &ReplyToken,
        messages: Vec<SendMessage>,
    ) -> Result<(), GatewayError> {
        self.log.lock().unwrap().push("reply".to_string());
        if self.fail_replies {
            return Err(GatewayError::Api(ApiError::InvalidRequest {
                message: "Invalid reply token".to_string(),
            }));
        }
        self.replies
            .lock()
            .unwrap()
            .push((reply_token.as_str().to_string(), messages));
        Ok(())
    }

    async fn fetch_content(&self, content_id: &ContentId) -> Result<Bytes, GatewayError> {
        self.log.lock().unwrap().push("fetch_content".to_string());
        self.content
            .lock()
            .unwrap()
            .get(content_id.as_str())
            .cloned()
            .ok_or(GatewayError::Api(ApiError::NotFound))
    }
}

pub(crate) struct MemoryImageStore {
    pub file_name: String,
    pub files: Mutex<HashMap<String, Vec<u8>>>,
    pub fail_writes: bool,
    pub log: OperationLog,
}

impl Default for MemoryImageStore {
    fn default() -> Self {
        Self {
            file_name: "test.jpg".to_string(),
            files: Mutex::new(HashMap::new()),
            fail_writes: false,
            log: OperationLog::default(),
        }
    }
}

impl MemoryImageStore {
    pub fn failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    pub fn sharing_log(mut self, log: &OperationLog) -> Self {
        self.log = Arc::clone(log);
        self
    }

    pub fn stored(&self) -> Option<Vec<u8>> {
        self.files.lock().unwrap().get(&self.file_name).cloned()
    }
}

#[async_trait]
impl ImageStore for MemoryImageStore {
    async fn ensure_directory(&self) -> Result<(), StorageError> {
        self.log.lock().unwrap().push("ensure_directory".to_string());
        Ok(())
    }

    async fn store(&self, content: &[u8]) -> Result<StoredImage, StorageError> {
        self.log.lock().unwrap().push("store".to_string());
        if self.fail_writes {
            return Err(StorageError::WriteFailed {
                path: self.file_name.clone(),
                source: std::io::Error::other("disk full"),
            });
        }
        self.files
            .lock()
            .unwrap()
            .insert(self.file_name.clone(), content.to_vec());
        Ok(StoredImage {
            file_name: self.file_name.clone(),
            size_bytes: content.len() as u64,
        })
    }

    async fn load(&self, file_name: &str) -> Result<Option<ImageFile>, StorageError> {
        Ok(self
            .files
            .lock()
            .unwrap()
            .get(file_name)
            .map(|bytes| ImageFile {
                content: Bytes::from(bytes.clone()),
                content_type: content_type_for(file_name),
            }))
    }

    fn file_name(&self) -> &str {
        &self.file_name
    }
}
