use super::error::ApiReject;
use crate::application_port::{
    AuthService, AuthSession, ChatProvider, LoginInput, OnboardInput, RelationshipService,
    SignupInput, UserService,
};
use crate::domain_model::UserPublic;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use warp::http::StatusCode;
use warp::{Rejection, Reply};

pub const SESSION_COOKIE: &str = "jwt";
const COOKIE_MAX_AGE_SECS: u64 = 24 * 60 * 60;

/// Success envelope: `{ message, data: { success: true, ...payload } }`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub message: String,
    pub data: Payload<T>,
}

#[derive(Debug, Serialize)]
pub struct Payload<T: Serialize> {
    pub success: bool,
    #[serde(flatten)]
    pub body: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, body: T) -> Self {
        ApiResponse {
            message: message.into(),
            data: Payload {
                success: true,
                body,
            },
        }
    }
}

fn reply_json<T: Serialize>(response: &ApiResponse<T>, status: StatusCode) -> impl Reply {
    warp::reply::with_status(warp::reply::json(response), status)
}

fn session_cookie(token: &str, secure: bool) -> String {
    let mut cookie = format!(
        "{SESSION_COOKIE}={token}; Max-Age={COOKIE_MAX_AGE_SECS}; Path=/; HttpOnly; SameSite=Strict"
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

fn expired_cookie() -> String {
    format!("{SESSION_COOKIE}=; Max-Age=0; Path=/; HttpOnly; SameSite=Strict")
}

/// Subset of the profile echoed by signup/login, mirroring what the client
/// needs before onboarding.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionUser {
    full_name: String,
    email: String,
    profile_pic: String,
}

#[derive(Debug, Serialize)]
struct SessionBody {
    token: String,
    user: SessionUser,
}

fn session_reply(
    message: &str,
    session: AuthSession,
    status: StatusCode,
    secure_cookies: bool,
) -> impl Reply {
    let cookie = session_cookie(&session.token.0, secure_cookies);
    let response = ApiResponse::ok(
        message,
        SessionBody {
            token: session.token.0,
            user: SessionUser {
                full_name: session.user.full_name,
                email: session.user.email,
                profile_pic: session.user.profile_pic,
            },
        },
    );
    warp::reply::with_header(reply_json(&response, status), "set-cookie", cookie)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub full_name: String,
}

pub async fn signup(
    body: SignupRequest,
    auth_service: Arc<dyn AuthService>,
    secure_cookies: bool,
) -> Result<impl Reply, Rejection> {
    let session = auth_service
        .signup(SignupInput {
            email: body.email,
            password: body.password,
            full_name: body.full_name,
        })
        .await
        .map_err(|e| ApiReject::from(e).into_rejection())?;

    Ok(session_reply(
        "User created successfully",
        session,
        StatusCode::CREATED,
        secure_cookies,
    ))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

pub async fn login(
    body: LoginRequest,
    auth_service: Arc<dyn AuthService>,
    secure_cookies: bool,
) -> Result<impl Reply, Rejection> {
    let session = auth_service
        .login(LoginInput {
            email: body.email,
            password: body.password,
        })
        .await
        .map_err(|e| ApiReject::from(e).into_rejection())?;

    Ok(session_reply(
        "User is logged in successfully",
        session,
        StatusCode::OK,
        secure_cookies,
    ))
}

#[derive(Debug, Serialize)]
struct Empty {}

pub async fn logout() -> Result<impl Reply, Rejection> {
    let response = ApiResponse::ok("User is logged out successfully", Empty {});
    Ok(warp::reply::with_header(
        reply_json(&response, StatusCode::OK),
        "set-cookie",
        expired_cookie(),
    ))
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct OnboardRequest {
    pub full_name: String,
    pub bio: String,
    pub country: String,
    pub native_language: String,
    pub learning_language: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OnboardBody {
    user_updated: UserPublic,
}

pub async fn onboard(
    me: UserPublic,
    body: OnboardRequest,
    user_service: Arc<dyn UserService>,
) -> Result<impl Reply, Rejection> {
    let updated = user_service
        .onboard(
            me.user_id,
            OnboardInput {
                full_name: body.full_name,
                bio: body.bio,
                country: body.country,
                native_language: body.native_language,
                learning_language: body.learning_language,
            },
        )
        .await
        .map_err(|e| ApiReject::from(e).into_rejection())?;

    let response = ApiResponse::ok(
        "User is onboarded successfully",
        OnboardBody {
            user_updated: updated,
        },
    );
    Ok(reply_json(&response, StatusCode::OK))
}

#[derive(Debug, Serialize)]
struct MeBody {
    user: UserPublic,
}

pub async fn me(me: UserPublic) -> Result<impl Reply, Rejection> {
    let response = ApiResponse::ok("Current user", MeBody { user: me });
    Ok(reply_json(&response, StatusCode::OK))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RecommendedBody {
    recommended_users: Vec<UserPublic>,
}

pub async fn recommended_users(
    me: UserPublic,
    user_service: Arc<dyn UserService>,
) -> Result<impl Reply, Rejection> {
    let users = user_service
        .recommended(me.user_id)
        .await
        .map_err(|e| ApiReject::from(e).into_rejection())?;

    let response = ApiResponse::ok(
        "Recommended users",
        RecommendedBody {
            recommended_users: users,
        },
    );
    Ok(reply_json(&response, StatusCode::OK))
}

#[derive(Debug, Serialize)]
struct FriendsBody {
    friends: Vec<crate::domain_model::UserSummary>,
}

pub async fn my_friends(
    me: UserPublic,
    user_service: Arc<dyn UserService>,
) -> Result<impl Reply, Rejection> {
    let friends = user_service
        .friends(me.user_id)
        .await
        .map_err(|e| ApiReject::from(e).into_rejection())?;

    let response = ApiResponse::ok("My friends", FriendsBody { friends });
    Ok(reply_json(&response, StatusCode::OK))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FriendRequestBody {
    friend_request: crate::domain_model::FriendRequestRecord,
}

pub async fn send_friend_request(
    recipient: String,
    me: UserPublic,
    relationship_service: Arc<dyn RelationshipService>,
) -> Result<impl Reply, Rejection> {
    let record = relationship_service
        .send_request(me.user_id, &recipient)
        .await
        .map_err(|e| ApiReject::from(e).into_rejection())?;

    let response = ApiResponse::ok(
        "Friend request sent successfully",
        FriendRequestBody {
            friend_request: record,
        },
    );
    Ok(reply_json(&response, StatusCode::CREATED))
}

pub async fn accept_friend_request(
    request: String,
    me: UserPublic,
    relationship_service: Arc<dyn RelationshipService>,
) -> Result<impl Reply, Rejection> {
    let record = relationship_service
        .accept_request(me.user_id, &request)
        .await
        .map_err(|e| ApiReject::from(e).into_rejection())?;

    let response = ApiResponse::ok(
        "Friend request accepted successfully",
        FriendRequestBody {
            friend_request: record,
        },
    );
    Ok(reply_json(&response, StatusCode::OK))
}

pub async fn friend_requests(
    me: UserPublic,
    relationship_service: Arc<dyn RelationshipService>,
) -> Result<impl Reply, Rejection> {
    let feeds = relationship_service
        .friend_requests(me.user_id)
        .await
        .map_err(|e| ApiReject::from(e).into_rejection())?;

    let response = ApiResponse::ok("Friend requests", feeds);
    Ok(reply_json(&response, StatusCode::OK))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OutgoingBody {
    outgoing_requests: Vec<crate::domain_model::FriendRequestView>,
}

pub async fn outgoing_friend_requests(
    me: UserPublic,
    relationship_service: Arc<dyn RelationshipService>,
) -> Result<impl Reply, Rejection> {
    let outgoing = relationship_service
        .outgoing_requests(me.user_id)
        .await
        .map_err(|e| ApiReject::from(e).into_rejection())?;

    let response = ApiResponse::ok(
        "Outgoing friend requests",
        OutgoingBody {
            outgoing_requests: outgoing,
        },
    );
    Ok(reply_json(&response, StatusCode::OK))
}

#[derive(Debug, Serialize)]
struct ChatTokenBody {
    token: String,
}

pub async fn chat_token(
    me: UserPublic,
    chat_provider: Arc<dyn ChatProvider>,
) -> Result<impl Reply, Rejection> {
    let token = chat_provider
        .mint_token(me.user_id)
        .map_err(|e| ApiReject::from(e).into_rejection())?;

    let response = ApiResponse::ok("Chat token", ChatTokenBody { token });
    Ok(reply_json(&response, StatusCode::OK))
}
