//! Network actor - runs backend calls in the Tokio runtime

use tokio::sync::mpsc;
use tokio::task::JoinSet;

use crate::messages::network::{ApiCall, ApiReply};
use crate::messages::{NetworkCommand, NetworkResponse};
use crate::network::client::ApiClient;
use crate::network::error::ApiError;

/// Network actor that turns commands into HTTP round trips
pub struct NetworkActor {
    client: ApiClient,
    response_tx: mpsc::UnboundedSender<NetworkResponse>,
    active_requests: JoinSet<()>,
}

impl NetworkActor {
    pub fn new(client: ApiClient, response_tx: mpsc::UnboundedSender<NetworkResponse>) -> Self {
        NetworkActor {
            client,
            response_tx,
            active_requests: JoinSet::new(),
        }
    }

    /// Run the network actor message loop
    pub async fn run(mut self, mut cmd_rx: mpsc::UnboundedReceiver<NetworkCommand>) {
        loop {
            tokio::select! {
                biased;

                cmd = cmd_rx.recv() => {
                    match cmd {
                        Some(NetworkCommand::Execute { id, call }) => {
                            let response_tx = self.response_tx.clone();
                            let client = self.client.clone();

                            // Requests run concurrently; the app layer decides which replies still matter
                            self.active_requests.spawn(async move {
                                let action = call.action();
                                tracing::info!(id, action = action.as_str(), "Executing request");
                                let response = match execute(&client, call).await {
                                    Ok(reply) => {
                                        tracing::info!(id, action = action.as_str(), "Request completed");
                                        NetworkResponse::Completed { id, reply }
                                    }
                                    Err(e) => {
                                        tracing::warn!(id, action = action.as_str(), error = %e, "Request failed");
                                        NetworkResponse::Failed {
                                            id,
                                            action,
                                            message: e.user_message(),
                                            not_found: e.is_not_found(),
                                        }
                                    }
                                };
                                let _ = response_tx.send(response);
                            });
                        }

                        Some(NetworkCommand::Shutdown) => {
                            self.active_requests.abort_all();
                            break;
                        }

                        None => break,
                    }
                }

                // Clean up completed tasks
                Some(_result) = self.active_requests.join_next() => {}
            }
        }
    }
}

/// Perform one call against the backend
pub async fn execute(client: &ApiClient, call: ApiCall) -> Result<ApiReply, ApiError> {
    let reply = match call {
        ApiCall::Login { phone } => ApiReply::LoggedIn(client.login(&phone).await?),
        ApiCall::CreateUser { username, phone } => ApiReply::UserCreated(client.create_user(&username, &phone).await?),
        ApiCall::GetProfile { user_id } => ApiReply::Profile(client.get_profile(user_id).await?),
        ApiCall::UpdateProfile { user_id, update } => {
            ApiReply::ProfileUpdated(client.update_profile(user_id, &update).await?)
        }
        ApiCall::GetContacts { user_id } => ApiReply::Contacts(client.get_contacts(user_id).await?),
        ApiCall::AddContact { user_id, contact_user_id } => {
            ApiReply::ContactAdded(client.add_contact(user_id, contact_user_id).await?)
        }
        ApiCall::GetChats { user_id } => ApiReply::Chats(client.get_chats(user_id).await?),
        ApiCall::GetMessages { chat_id } => ApiReply::Messages {
            chat_id,
            messages: client.get_messages(chat_id).await?,
        },
        ApiCall::CreateChat { name, kind, user_id } => {
            ApiReply::ChatCreated(client.create_chat(&name, &kind, user_id).await?)
        }
        ApiCall::SendMessage { chat_id, user_id, text } => ApiReply::MessageSent {
            chat_id,
            message_id: client.send_message(chat_id, user_id, &text).await?,
        },
    };
    Ok(reply)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_failed_call_is_reported_with_its_id() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/", listener.local_addr().unwrap());
        drop(listener);

        let client = ApiClient::with_endpoints(url.clone(), url, Duration::from_secs(2));
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (resp_tx, mut resp_rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(NetworkActor::new(client, resp_tx).run(cmd_rx));

        cmd_tx
            .send(NetworkCommand::Execute { id: 7, call: ApiCall::GetChats { user_id: 1 } })
            .unwrap();
        let response = resp_rx.recv().await.unwrap();
        assert_eq!(response.id(), 7);
        assert!(matches!(
            response,
            NetworkResponse::Failed { action: crate::messages::network::ApiAction::GetChats, not_found: false, .. }
        ));

        cmd_tx.send(NetworkCommand::Shutdown).unwrap();
        handle.await.unwrap();
    }
}
