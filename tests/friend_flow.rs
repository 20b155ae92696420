use lingolink::application_impl::*;
use lingolink::application_port::*;
use lingolink::domain_port::{RelationshipRepo, UserRepo};
use lingolink::infra_mem::*;
use std::sync::Arc;

struct TestServices {
    user_repo: Arc<dyn UserRepo>,
    relationship_repo: Arc<dyn RelationshipRepo>,
    auth: Arc<dyn AuthService>,
    users: Arc<dyn UserService>,
    relationships: Arc<dyn RelationshipService>,
}

fn services() -> TestServices {
    let store = MemStore::new();
    let user_repo: Arc<dyn UserRepo> = Arc::new(MemUserRepo::new(store.clone()));
    let relationship_repo = Arc::new(MemRelationshipRepo::new(store));
    let chat: Arc<dyn ChatProvider> = Arc::new(FakeChatProvider);
    let hasher: Arc<dyn CredentialHasher> = Arc::new(Argon2PasswordHasher);
    let codec: Arc<dyn TokenCodec> = Arc::new(JwtHs256Codec::new(JwtConfig::new(
        b"test-signing-key".to_vec(),
    )));

    TestServices {
        user_repo: user_repo.clone(),
        relationship_repo: relationship_repo.clone(),
        auth: Arc::new(RealAuthService::new(
            user_repo.clone(),
            hasher,
            codec,
            chat.clone(),
        )),
        users: Arc::new(RealUserService::new(
            user_repo.clone(),
            relationship_repo.clone(),
            chat,
        )),
        relationships: Arc::new(RealRelationshipService::new(
            user_repo,
            relationship_repo,
            Arc::new(MemTxManager),
        )),
    }
}

async fn register(t: &TestServices, email: &str, password: &str, name: &str) -> AuthSession {
    t.auth
        .signup(SignupInput {
            email: email.into(),
            password: password.into(),
            full_name: name.into(),
        })
        .await
        .unwrap()
}

fn onboarding(name: &str) -> OnboardInput {
    OnboardInput {
        full_name: name.into(),
        bio: "hello".into(),
        country: "France".into(),
        native_language: "French".into(),
        learning_language: "Spanish".into(),
    }
}

#[tokio::test]
async fn stored_credential_is_never_the_plaintext() {
    let t = services();
    register(&t, "alice@gmail.com", "secret1", "Alice").await;

    let record = t
        .user_repo
        .get_by_email("alice@gmail.com")
        .await
        .unwrap()
        .unwrap();
    assert_ne!(record.password_hash, "secret1");
    assert!(record.password_hash.starts_with("$argon2"));
}

#[tokio::test]
async fn duplicate_email_is_rejected() {
    let t = services();
    register(&t, "alice@gmail.com", "secret1", "Alice").await;

    let second = t
        .auth
        .signup(SignupInput {
            email: "alice@gmail.com".into(),
            password: "another6".into(),
            full_name: "Other Alice".into(),
        })
        .await;
    assert!(matches!(second, Err(AuthError::EmailTaken)));
}

#[tokio::test]
async fn emails_are_case_sensitive_as_stored() {
    let t = services();
    let lower = register(&t, "alice@gmail.com", "secret1", "Alice").await.user;
    let upper = register(&t, "Alice@gmail.com", "secret2", "Other Alice").await.user;
    assert_ne!(lower.user_id, upper.user_id);

    let session = t
        .auth
        .login(LoginInput {
            email: "alice@gmail.com".into(),
            password: "secret1".into(),
        })
        .await
        .unwrap();
    assert_eq!(session.user.user_id, lower.user_id);

    // A spelling that was never registered does not match either of them.
    assert!(matches!(
        t.auth
            .login(LoginInput {
                email: "ALICE@gmail.com".into(),
                password: "secret1".into(),
            })
            .await,
        Err(AuthError::InvalidCredentials)
    ));
}

#[tokio::test]
async fn login_does_not_leak_which_part_was_wrong() {
    let t = services();
    register(&t, "alice@gmail.com", "secret1", "Alice").await;

    let wrong_password = t
        .auth
        .login(LoginInput {
            email: "alice@gmail.com".into(),
            password: "secret2".into(),
        })
        .await;
    let unknown_email = t
        .auth
        .login(LoginInput {
            email: "nobody@gmail.com".into(),
            password: "secret1".into(),
        })
        .await;

    for outcome in [wrong_password, unknown_email] {
        match outcome {
            Err(AuthError::InvalidCredentials) => {
                assert_eq!(
                    AuthError::InvalidCredentials.to_string(),
                    "Invalid email or password"
                );
            }
            other => panic!("expected InvalidCredentials, got {other:?}"),
        }
    }
}

#[tokio::test]
async fn resolve_session_returns_the_live_user() {
    let t = services();
    let session = register(&t, "alice@gmail.com", "secret1", "Alice").await;

    let me = t.auth.resolve_session(&session.token.0).await.unwrap();
    assert_eq!(me.user_id, session.user.user_id);
    assert_eq!(me.email, "alice@gmail.com");

    assert!(matches!(
        t.auth.resolve_session("not-a-jwt").await,
        Err(AuthError::TokenInvalid)
    ));
}

#[tokio::test]
async fn full_friend_request_lifecycle() {
    let t = services();
    let alice = register(&t, "alice@gmail.com", "secret1", "Alice").await.user;
    let bob = register(&t, "bob@yahoo.com", "secret2", "Bob").await.user;

    let request = t
        .relationships
        .send_request(alice.user_id, &bob.user_id.to_string())
        .await
        .unwrap();
    assert_eq!(request.sender_id, alice.user_id);
    assert_eq!(request.recipient_id, bob.user_id);

    // The pending request blocks both directions.
    assert!(matches!(
        t.relationships
            .send_request(alice.user_id, &bob.user_id.to_string())
            .await,
        Err(RelationError::DuplicateRequest)
    ));
    assert!(matches!(
        t.relationships
            .send_request(bob.user_id, &alice.user_id.to_string())
            .await,
        Err(RelationError::DuplicateRequest)
    ));

    // Bob sees exactly the one incoming request; Alice sees it as outgoing.
    let bob_feeds = t.relationships.friend_requests(bob.user_id).await.unwrap();
    assert_eq!(bob_feeds.incoming_requests.len(), 1);
    assert_eq!(bob_feeds.incoming_requests[0].request_id, request.request_id);
    assert_eq!(bob_feeds.incoming_requests[0].user.user_id, alice.user_id);
    let alice_outgoing = t
        .relationships
        .outgoing_requests(alice.user_id)
        .await
        .unwrap();
    assert_eq!(alice_outgoing.len(), 1);
    assert_eq!(alice_outgoing[0].user.user_id, bob.user_id);

    // Only the recipient may accept.
    assert!(matches!(
        t.relationships
            .accept_request(alice.user_id, &request.request_id.to_string())
            .await,
        Err(RelationError::Forbidden)
    ));

    let accepted = t
        .relationships
        .accept_request(bob.user_id, &request.request_id.to_string())
        .await
        .unwrap();
    assert_eq!(
        accepted.status,
        lingolink::domain_model::FriendRequestStatus::Accepted
    );

    // The returned record is the persisted row, acceptance timestamp
    // included.
    let stored = t
        .relationship_repo
        .get_request(accepted.request_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(accepted.updated_at, stored.updated_at);
    assert!(accepted.updated_at >= accepted.created_at);

    // Friendship is symmetric.
    let alice_friends = t.users.friends(alice.user_id).await.unwrap();
    let bob_friends = t.users.friends(bob.user_id).await.unwrap();
    assert_eq!(alice_friends.len(), 1);
    assert_eq!(alice_friends[0].user_id, bob.user_id);
    assert_eq!(bob_friends.len(), 1);
    assert_eq!(bob_friends[0].user_id, alice.user_id);

    // Re-accepting is an idempotent success, and the friends sets stay
    // single-occurrence.
    t.relationships
        .accept_request(bob.user_id, &request.request_id.to_string())
        .await
        .unwrap();
    assert_eq!(t.users.friends(alice.user_id).await.unwrap().len(), 1);

    // Once friends, a fresh request is refused before the duplicate check
    // even runs.
    assert!(matches!(
        t.relationships
            .send_request(bob.user_id, &alice.user_id.to_string())
            .await,
        Err(RelationError::AlreadyFriends)
    ));

    // Alice sent the original request, so the accepted feed is hers.
    let alice_feeds = t.relationships.friend_requests(alice.user_id).await.unwrap();
    assert_eq!(alice_feeds.accepted_requests.len(), 1);
    assert_eq!(alice_feeds.accepted_requests[0].user.user_id, bob.user_id);
    let bob_feeds = t.relationships.friend_requests(bob.user_id).await.unwrap();
    assert!(bob_feeds.incoming_requests.is_empty());
    assert!(bob_feeds.accepted_requests.is_empty());
}

#[tokio::test]
async fn send_request_guards() {
    let t = services();
    let alice = register(&t, "alice@gmail.com", "secret1", "Alice").await.user;

    assert!(matches!(
        t.relationships
            .send_request(alice.user_id, &alice.user_id.to_string())
            .await,
        Err(RelationError::SelfRequest)
    ));
    assert!(matches!(
        t.relationships
            .send_request(alice.user_id, "definitely-not-a-uuid")
            .await,
        Err(RelationError::InvalidIdentifier)
    ));
    assert!(matches!(
        t.relationships
            .send_request(alice.user_id, &uuid::Uuid::new_v4().to_string())
            .await,
        Err(RelationError::RecipientNotFound)
    ));
}

#[tokio::test]
async fn accept_request_guards() {
    let t = services();
    let alice = register(&t, "alice@gmail.com", "secret1", "Alice").await.user;

    assert!(matches!(
        t.relationships
            .accept_request(alice.user_id, "garbage")
            .await,
        Err(RelationError::InvalidIdentifier)
    ));
    assert!(matches!(
        t.relationships
            .accept_request(alice.user_id, &uuid::Uuid::new_v4().to_string())
            .await,
        Err(RelationError::RequestNotFound)
    ));
}

#[tokio::test]
async fn recommended_excludes_self_friends_and_not_onboarded() {
    let t = services();
    let alice = register(&t, "alice@gmail.com", "secret1", "Alice").await.user;
    let bob = register(&t, "bob@yahoo.com", "secret2", "Bob").await.user;
    let carol = register(&t, "carol@hotmail.com", "secret3", "Carol").await.user;
    let dave = register(&t, "dave@gmail.com", "secret4", "Dave").await.user;

    // Dave never onboards.
    for (id, name) in [(alice.user_id, "Alice"), (bob.user_id, "Bob"), (carol.user_id, "Carol")] {
        t.users.onboard(id, onboarding(name)).await.unwrap();
    }

    let request = t
        .relationships
        .send_request(alice.user_id, &bob.user_id.to_string())
        .await
        .unwrap();
    t.relationships
        .accept_request(bob.user_id, &request.request_id.to_string())
        .await
        .unwrap();

    let recommended = t.users.recommended(alice.user_id).await.unwrap();
    let ids: Vec<_> = recommended.iter().map(|u| u.user_id).collect();
    assert_eq!(ids, vec![carol.user_id]);
    assert!(!ids.contains(&dave.user_id));
}
