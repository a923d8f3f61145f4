//! Network messages - communication between App and Network layers

use crate::models::{Chat, ChatId, ChatKind, Message, MessageId, ProfileUpdate, User, UserId};
use crate::network::client::LoginOutcome;

/// Backend operation names, also used as the `action` parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiAction {
    Login,
    CreateUser,
    GetProfile,
    UpdateProfile,
    GetContacts,
    AddContact,
    GetChats,
    GetMessages,
    CreateChat,
    SendMessage,
}

impl ApiAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiAction::Login => "login",
            ApiAction::CreateUser => "create_user",
            ApiAction::GetProfile => "get_profile",
            ApiAction::UpdateProfile => "update_profile",
            ApiAction::GetContacts => "get_contacts",
            ApiAction::AddContact => "add_contact",
            ApiAction::GetChats => "get_chats",
            ApiAction::GetMessages => "get_messages",
            ApiAction::CreateChat => "create_chat",
            ApiAction::SendMessage => "send_message",
        }
    }

    /// Reads are re-issued freely, so only the newest reply is worth applying
    pub fn is_read(&self) -> bool {
        matches!(
            self,
            ApiAction::GetProfile | ApiAction::GetContacts | ApiAction::GetChats | ApiAction::GetMessages
        )
    }
}

/// One backend call with its arguments
#[derive(Debug, Clone, PartialEq)]
pub enum ApiCall {
    Login { phone: String },
    CreateUser { username: String, phone: String },
    GetProfile { user_id: UserId },
    UpdateProfile { user_id: UserId, update: ProfileUpdate },
    GetContacts { user_id: UserId },
    AddContact { user_id: UserId, contact_user_id: UserId },
    GetChats { user_id: UserId },
    GetMessages { chat_id: ChatId },
    CreateChat { name: String, kind: ChatKind, user_id: UserId },
    SendMessage { chat_id: ChatId, user_id: UserId, text: String },
}

impl ApiCall {
    pub fn action(&self) -> ApiAction {
        match self {
            ApiCall::Login { .. } => ApiAction::Login,
            ApiCall::CreateUser { .. } => ApiAction::CreateUser,
            ApiCall::GetProfile { .. } => ApiAction::GetProfile,
            ApiCall::UpdateProfile { .. } => ApiAction::UpdateProfile,
            ApiCall::GetContacts { .. } => ApiAction::GetContacts,
            ApiCall::AddContact { .. } => ApiAction::AddContact,
            ApiCall::GetChats { .. } => ApiAction::GetChats,
            ApiCall::GetMessages { .. } => ApiAction::GetMessages,
            ApiCall::CreateChat { .. } => ApiAction::CreateChat,
            ApiCall::SendMessage { .. } => ApiAction::SendMessage,
        }
    }
}

/// Commands sent from App layer to Network layer
#[derive(Debug, Clone, PartialEq)]
pub enum NetworkCommand {
    /// Run one backend call
    Execute { id: u64, call: ApiCall },
    /// Shutdown the network actor
    Shutdown,
}

/// Decoded result of a successful call
#[derive(Debug, Clone, PartialEq)]
pub enum ApiReply {
    LoggedIn(LoginOutcome),
    UserCreated(UserId),
    Profile(User),
    ProfileUpdated(bool),
    Contacts(Vec<User>),
    ContactAdded(bool),
    Chats(Vec<Chat>),
    Messages { chat_id: ChatId, messages: Vec<Message> },
    ChatCreated(ChatId),
    MessageSent { chat_id: ChatId, message_id: MessageId },
}

/// Responses sent from Network layer to App layer
#[derive(Debug, Clone, PartialEq)]
pub enum NetworkResponse {
    Completed { id: u64, reply: ApiReply },
    Failed {
        id: u64,
        action: ApiAction,
        message: String,
        /// The backend reported the record as missing (HTTP 404)
        not_found: bool,
    },
}

impl NetworkResponse {
    /// Get the request ID from the response
    pub fn id(&self) -> u64 {
        match self {
            NetworkResponse::Completed { id, .. } => *id,
            NetworkResponse::Failed { id, .. } => *id,
        }
    }
}
