use crate::domain::model::{ChatRequest, ChatResponse, Payload, StreamChunk};
use crate::utils::error::Result;
use async_trait::async_trait;
use futures::stream::BoxStream;

/// 串流聊天回傳的片段序列
pub type ChunkStream = BoxStream<'static, Result<StreamChunk>>;

/// 示範流程所依賴的服務能力
#[async_trait]
pub trait AiService: Send + Sync {
    /// 帳戶餘額（`credits.get_balance`）
    async fn get_balance(&self) -> Result<Payload>;

    /// 可用模型（`models.list`）
    async fn list_models(&self) -> Result<Vec<Payload>>;

    /// 一次取得完整回應（`chat.create`, stream = false）
    async fn chat_create(&self, request: &ChatRequest) -> Result<ChatResponse>;

    /// 逐片段取得回應（`chat.create`, stream = true）
    async fn chat_stream(&self, request: &ChatRequest) -> Result<ChunkStream>;
}

#[async_trait]
impl<T: AiService + ?Sized> AiService for std::sync::Arc<T> {
    async fn get_balance(&self) -> Result<Payload> {
        (**self).get_balance().await
    }

    async fn list_models(&self) -> Result<Vec<Payload>> {
        (**self).list_models().await
    }

    async fn chat_create(&self, request: &ChatRequest) -> Result<ChatResponse> {
        (**self).chat_create(request).await
    }

    async fn chat_stream(&self, request: &ChatRequest) -> Result<ChunkStream> {
        (**self).chat_stream(request).await
    }
}
