use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};
use tracing::warn;

use super::base::HostChannel;
use crate::error::{ApiError, ApiResult};

/// Messages delivered to the host side.
#[derive(Debug)]
pub enum HostMessage {
    /// `get-auth-token`: answer once on `reply`.
    GetAuthToken { reply: oneshot::Sender<Option<String>> },
    /// `set-auth-token`: persist the value, no answer expected.
    SetAuthToken(Option<String>),
}

/// Client side of an in-process message channel to the host.
#[derive(Clone)]
pub struct ChannelHost {
    sender: mpsc::UnboundedSender<HostMessage>,
}

impl ChannelHost {
    /// Create a connected pair; the receiver belongs to whoever plays the host.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<HostMessage>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (ChannelHost { sender }, receiver)
    }
}

#[async_trait]
impl HostChannel for ChannelHost {
    async fn request_token(&self) -> ApiResult<Option<String>> {
        let (reply, response) = oneshot::channel();
        self.sender
            .send(HostMessage::GetAuthToken { reply })
            .map_err(|_| ApiError::Host("host channel closed".to_string()))?;
        response
            .await
            .map_err(|_| ApiError::Host("host dropped the token request".to_string()))
    }

    fn persist_token(&self, token: Option<String>) {
        if self.sender.send(HostMessage::SetAuthToken(token)).is_err() {
            warn!("host channel closed, auth token was not persisted");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_request_token_round_trip() {
        let (host, mut receiver) = ChannelHost::channel();

        let responder = tokio::spawn(async move {
            match receiver.recv().await {
                Some(HostMessage::GetAuthToken { reply }) => {
                    reply.send(Some("stored".to_string())).unwrap()
                }
                other => panic!("unexpected message: {:?}", other),
            }
        });

        assert_eq!(host.request_token().await.unwrap().as_deref(), Some("stored"));
        responder.await.unwrap();
    }

    #[tokio::test]
    async fn test_request_fails_when_host_is_gone() {
        let (host, receiver) = ChannelHost::channel();
        drop(receiver);

        assert!(matches!(host.request_token().await, Err(ApiError::Host(_))));
    }

    #[tokio::test]
    async fn test_persist_is_fire_and_forget() {
        let (host, mut receiver) = ChannelHost::channel();
        host.persist_token(Some("abc".to_string()));

        match receiver.recv().await {
            Some(HostMessage::SetAuthToken(token)) => assert_eq!(token.as_deref(), Some("abc")),
            other => panic!("unexpected message: {:?}", other),
        }
    }
}
