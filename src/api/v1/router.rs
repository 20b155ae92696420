use super::error::ApiReject;
use super::handler;
use crate::application_port::{AuthError, AuthService};
use crate::domain_model::UserPublic;
use crate::server::Server;
use std::convert::Infallible;
use std::sync::Arc;
use warp::{Filter, reject};

pub fn routes(
    server: Arc<Server>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let signup = warp::post()
        .and(warp::path("auth"))
        .and(warp::path("signup"))
        .and(warp::path::end())
        .and(warp::body::json())
        .and(with(server.auth_service.clone()))
        .and(with_flag(server.secure_cookies))
        .and_then(handler::signup);

    let login = warp::post()
        .and(warp::path("auth"))
        .and(warp::path("login"))
        .and(warp::path::end())
        .and(warp::body::json())
        .and(with(server.auth_service.clone()))
        .and(with_flag(server.secure_cookies))
        .and_then(handler::login);

    let logout = warp::post()
        .and(warp::path("auth"))
        .and(warp::path("logout"))
        .and(warp::path::end())
        .and_then(handler::logout);

    let onboarding = warp::post()
        .and(warp::path("auth"))
        .and(warp::path("onboarding"))
        .and(warp::path::end())
        .and(with_session(server.auth_service.clone()))
        .and(warp::body::json())
        .and(with(server.user_service.clone()))
        .and_then(handler::onboard);

    let me = warp::get()
        .and(warp::path("auth"))
        .and(warp::path("me"))
        .and(warp::path::end())
        .and(with_session(server.auth_service.clone()))
        .and_then(handler::me);

    let recommended = warp::get()
        .and(warp::path("user"))
        .and(warp::path::end())
        .and(with_session(server.auth_service.clone()))
        .and(with(server.user_service.clone()))
        .and_then(handler::recommended_users);

    let friends = warp::get()
        .and(warp::path("user"))
        .and(warp::path("friends"))
        .and(warp::path::end())
        .and(with_session(server.auth_service.clone()))
        .and(with(server.user_service.clone()))
        .and_then(handler::my_friends);

    let send_request = warp::post()
        .and(warp::path("user"))
        .and(warp::path("friend-request"))
        .and(warp::path::param::<String>())
        .and(warp::path::end())
        .and(with_session(server.auth_service.clone()))
        .and(with(server.relationship_service.clone()))
        .and_then(handler::send_friend_request);

    let accept_request = warp::put()
        .and(warp::path("user"))
        .and(warp::path("friend-request"))
        .and(warp::path::param::<String>())
        .and(warp::path("accept"))
        .and(warp::path::end())
        .and(with_session(server.auth_service.clone()))
        .and(with(server.relationship_service.clone()))
        .and_then(handler::accept_friend_request);

    let friend_requests = warp::get()
        .and(warp::path("user"))
        .and(warp::path("friend-requests"))
        .and(warp::path::end())
        .and(with_session(server.auth_service.clone()))
        .and(with(server.relationship_service.clone()))
        .and_then(handler::friend_requests);

    let outgoing_requests = warp::get()
        .and(warp::path("user"))
        .and(warp::path("outgoing-friend-requests"))
        .and(warp::path::end())
        .and(with_session(server.auth_service.clone()))
        .and(with(server.relationship_service.clone()))
        .and_then(handler::outgoing_friend_requests);

    let chat_token = warp::get()
        .and(warp::path("chat"))
        .and(warp::path("token"))
        .and(warp::path::end())
        .and(with_session(server.auth_service.clone()))
        .and(with(server.chat_provider.clone()))
        .and_then(handler::chat_token);

    signup
        .or(login)
        .or(logout)
        .or(onboarding)
        .or(me)
        .or(recommended)
        .or(friends)
        .or(send_request)
        .or(accept_request)
        .or(friend_requests)
        .or(outgoing_requests)
        .or(chat_token)
}

fn with<ServiceType>(
    service: Arc<ServiceType>,
) -> impl Filter<Extract = (Arc<ServiceType>,), Error = Infallible> + Clone
where
    ServiceType: Send + Sync + ?Sized,
{
    warp::any().map(move || service.clone())
}

fn with_flag(flag: bool) -> impl Filter<Extract = (bool,), Error = Infallible> + Clone {
    warp::any().map(move || flag)
}

/// Protected-route guard: pull the session cookie, verify the token, and
/// re-fetch the live user. Every failure mode is a 401; downstream handlers
/// receive the resolved identity.
fn with_session(
    auth_service: Arc<dyn AuthService>,
) -> impl Filter<Extract = (UserPublic,), Error = warp::Rejection> + Clone {
    warp::cookie::optional::<String>(handler::SESSION_COOKIE).and_then(
        move |token: Option<String>| {
            let auth_service = auth_service.clone();
            async move {
                let Some(token) = token else {
                    return Err(reject::custom(ApiReject::unauthorized(
                        "Unauthorized - No Token Provided",
                    )));
                };
                let user = auth_service
                    .resolve_session(&token)
                    .await
                    .map_err(|e| match e {
                        AuthError::UserNotFound => {
                            ApiReject::unauthorized("Unauthorized - User Not Found")
                        }
                        AuthError::TokenInvalid | AuthError::TokenExpired => {
                            ApiReject::unauthorized(e.to_string())
                        }
                        other => ApiReject::internal(other),
                    })
                    .map_err(reject::custom)?;
                Ok(user)
            }
        },
    )
}
