use crate::auth::identity::CallerIdentity;
use crate::auth::role::Role;
use crate::auth::{authorize, AuthError, Authenticator, Credentials};
use crate::model::card::CardId;
use crate::query::page::PageRequest;
use crate::repo::card_repo::CardRepository;
use crate::service::card_service::{CardService, CardServiceError};
use log::{debug, error};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Collection path used for `Location` values of created cards.
pub const CARDS_PATH: &str = "/cashcards";

/// Role every card operation requires.
const REQUIRED_ROLE: Role = Role::CardOwner;

/// One card operation as received from a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardRequest {
    Get { id: CardId },
    /// `body` is a JSON [`CardPayload`].
    Create { body: String },
    List { page: PageRequest },
    Update { id: CardId, body: String },
    Delete { id: CardId },
}

/// JSON body of create/update requests.
///
/// `id` and `owner` are accepted for wire compatibility and ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<CardId>,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseStatus {
    Ok,
    Created,
    NoContent,
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    InternalError,
}

impl ResponseStatus {
    /// HTTP status code equivalent.
    pub fn code(self) -> u16 {
        match self {
            Self::Ok => 200,
            Self::Created => 201,
            Self::NoContent => 204,
            Self::BadRequest => 400,
            Self::Unauthorized => 401,
            Self::Forbidden => 403,
            Self::NotFound => 404,
            Self::InternalError => 500,
        }
    }

    pub fn is_success(self) -> bool {
        matches!(self, Self::Ok | Self::Created | Self::NoContent)
    }
}

/// Outcome of one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: ResponseStatus,
    /// JSON body, when the outcome carries one.
    pub body: Option<String>,
    /// Path of a newly created card.
    pub location: Option<String>,
}

impl ApiResponse {
    fn empty(status: ResponseStatus) -> Self {
        Self {
            status,
            body: None,
            location: None,
        }
    }

    fn json(status: ResponseStatus, value: &impl Serialize) -> Self {
        match serde_json::to_string(value) {
            Ok(body) => Self {
                status,
                body: Some(body),
                location: None,
            },
            Err(err) => {
                error!("event=api_encode module=api status=error error={err}");
                Self::empty(ResponseStatus::InternalError)
            }
        }
    }

    fn bad_request(message: impl std::fmt::Display) -> Self {
        Self {
            status: ResponseStatus::BadRequest,
            body: Some(serde_json::json!({ "error": message.to_string() }).to_string()),
            location: None,
        }
    }

    fn created(id: CardId) -> Self {
        Self {
            status: ResponseStatus::Created,
            body: None,
            location: Some(format!("{CARDS_PATH}/{id}")),
        }
    }
}

/// Request surface over an authenticator and an owner-scoped card service.
pub struct CardApi<A: Authenticator, R: CardRepository> {
    authenticator: A,
    service: CardService<R>,
}

impl<A: Authenticator, R: CardRepository> CardApi<A, R> {
    pub fn new(authenticator: A, service: CardService<R>) -> Self {
        Self {
            authenticator,
            service,
        }
    }

    /// Authenticates, authorizes and executes one request.
    pub fn handle(&self, credentials: Option<&Credentials>, request: CardRequest) -> ApiResponse {
        let caller = match self.admit(credentials) {
            Ok(caller) => caller,
            Err(response) => return response,
        };

        match request {
            CardRequest::Get { id } => match self.service.find_by_id(id, &caller) {
                Ok(card) => ApiResponse::json(ResponseStatus::Ok, &card),
                Err(err) => service_failure(err),
            },
            CardRequest::Create { body } => {
                let payload = match decode_payload(&body) {
                    Ok(payload) => payload,
                    Err(response) => return response,
                };
                match self.service.create(payload.amount, &caller) {
                    Ok(card) => ApiResponse::created(card.id),
                    Err(err) => service_failure(err),
                }
            }
            CardRequest::List { page } => match self.service.list(&page, &caller) {
                Ok(result) => ApiResponse::json(ResponseStatus::Ok, &result.items),
                Err(err) => service_failure(err),
            },
            CardRequest::Update { id, body } => {
                let payload = match decode_payload(&body) {
                    Ok(payload) => payload,
                    Err(response) => return response,
                };
                match self.service.update(id, payload.amount, &caller) {
                    Ok(()) => ApiResponse::empty(ResponseStatus::NoContent),
                    Err(err) => service_failure(err),
                }
            }
            CardRequest::Delete { id } => match self.service.delete(id, &caller) {
                Ok(()) => ApiResponse::empty(ResponseStatus::NoContent),
                Err(err) => service_failure(err),
            },
        }
    }

    fn admit(&self, credentials: Option<&Credentials>) -> Result<CallerIdentity, ApiResponse> {
        let Some(credentials) = credentials else {
            debug!("event=api_admit module=api status=unauthorized reason=no_credentials");
            return Err(ApiResponse::empty(ResponseStatus::Unauthorized));
        };

        let caller = self
            .authenticator
            .authenticate(credentials)
            .map_err(auth_failure)?;
        let identity = authorize(&caller, REQUIRED_ROLE).map_err(auth_failure)?;
        Ok(identity.clone())
    }
}

fn decode_payload(body: &str) -> Result<CardPayload, ApiResponse> {
    serde_json::from_str(body).map_err(|err| {
        debug!("event=api_decode module=api status=bad_request error={err}");
        ApiResponse::bad_request(format!("invalid card payload: {err}"))
    })
}

fn auth_failure(err: AuthError) -> ApiResponse {
    match err {
        AuthError::Unauthorized => ApiResponse::empty(ResponseStatus::Unauthorized),
        AuthError::Forbidden { required, .. } => {
            debug!("event=api_admit module=api status=forbidden required_role={required}");
            ApiResponse::empty(ResponseStatus::Forbidden)
        }
        other => {
            error!("event=api_admit module=api status=error error={other}");
            ApiResponse::empty(ResponseStatus::InternalError)
        }
    }
}

fn service_failure(err: CardServiceError) -> ApiResponse {
    match err {
        CardServiceError::NotFound(_) => ApiResponse::empty(ResponseStatus::NotFound),
        CardServiceError::InvalidPage(err) => ApiResponse::bad_request(err),
        CardServiceError::Validation(err) => ApiResponse::bad_request(err),
        CardServiceError::Repo(_) => ApiResponse::empty(ResponseStatus::InternalError),
    }
}
