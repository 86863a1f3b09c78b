#![allow(clippy::unwrap_used, clippy::expect_used)]

//! End-to-end navigation through `AccessContext` with an in-memory backend.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use rootcause::prelude::Report;
use tokio::time::Instant;
use zcode_access::{
    AccessConfig, AccessContext, AccessLevel, BaseResponse, DenyReason, FetchError, LoginRequest,
    LoginUser, NOT_LOGIN_CODE, Navigator, Notifier, RouteTable, UserClient, decide, is_allowed,
};
use zcode_core::UserId;

#[derive(Clone)]
enum Behaviour {
    SignedIn(LoginUser),
    NotLoggedIn,
    Unreachable,
    Hangs,
}

struct Backend {
    behaviour: Mutex<Behaviour>,
    fetches: AtomicUsize,
}

impl Backend {
    fn new(behaviour: Behaviour) -> Arc<Self> {
        Arc::new(Self {
            behaviour: Mutex::new(behaviour),
            fetches: AtomicUsize::new(0),
        })
    }

    fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UserClient for Backend {
    async fn fetch_current_user(&self) -> Result<BaseResponse<LoginUser>, Report<FetchError>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let behaviour = self.behaviour.lock().unwrap().clone();
        match behaviour {
            Behaviour::SignedIn(user) => Ok(BaseResponse::success(user)),
            Behaviour::NotLoggedIn => Ok(BaseResponse::error(NOT_LOGIN_CODE, "not logged in")),
            Behaviour::Unreachable => Err(FetchError::Network {
                reason: "connection refused".to_string(),
            }
            .into()),
            Behaviour::Hangs => std::future::pending().await,
        }
    }

    async fn login(
        &self,
        request: &LoginRequest,
    ) -> Result<BaseResponse<LoginUser>, Report<FetchError>> {
        let user = LoginUser::new(UserId::new(1), request.user_account.clone(), "user");
        *self.behaviour.lock().unwrap() = Behaviour::SignedIn(user.clone());
        Ok(BaseResponse::success(user))
    }

    async fn logout(&self) -> Result<BaseResponse<bool>, Report<FetchError>> {
        *self.behaviour.lock().unwrap() = Behaviour::NotLoggedIn;
        Ok(BaseResponse::success(true))
    }
}

#[derive(Default)]
struct Notices(Mutex<Vec<String>>);

impl Notifier for Notices {
    fn notify(&self, message: &str) {
        self.0.lock().unwrap().push(message.to_string());
    }
}

#[derive(Default)]
struct Router {
    calls: Vec<Option<String>>,
}

impl Navigator for Router {
    fn proceed(&mut self) {
        self.calls.push(None);
    }

    fn redirect(&mut self, location: &str) {
        self.calls.push(Some(location.to_string()));
    }
}

fn user(role: &str) -> LoginUser {
    LoginUser::new(UserId::new(42), "someone", role)
}

fn context(backend: Arc<Backend>, notices: Arc<Notices>) -> AccessContext {
    AccessContext::new(backend, RouteTable::standard(), AccessConfig::default(), notices)
}

#[test]
fn checker_covers_every_combination() {
    use AccessLevel::{Admin, NotLoggedIn, User};

    let table = [
        (NotLoggedIn, NotLoggedIn, true),
        (NotLoggedIn, User, true),
        (NotLoggedIn, Admin, true),
        (User, NotLoggedIn, false),
        (User, User, true),
        (User, Admin, true),
        (Admin, NotLoggedIn, false),
        (Admin, User, false),
        (Admin, Admin, true),
    ];
    for (required, actual, expected) in table {
        assert_eq!(
            is_allowed(required, actual),
            expected,
            "required {required}, actual {actual}"
        );
    }
}

#[tokio::test]
async fn every_failure_resolves_anonymous() {
    for behaviour in [Behaviour::NotLoggedIn, Behaviour::Unreachable] {
        let ctx = context(Backend::new(behaviour), Arc::default());
        let mut router = Router::default();

        ctx.navigate("/user/update", &mut router).await;

        assert_eq!(ctx.current_level(), AccessLevel::NotLoggedIn);
        assert_eq!(
            router.calls,
            vec![Some("/user/login?redirect=/user/update".to_string())]
        );
    }
}

#[tokio::test]
async fn sequential_navigations_fetch_once() {
    let backend = Backend::new(Behaviour::SignedIn(user("user")));
    let ctx = context(backend.clone(), Arc::default());
    let mut router = Router::default();

    for target in ["/", "/user/update", "/user/login", "/nowhere", "/user/update"] {
        ctx.navigate(target, &mut router).await;
    }

    assert_eq!(backend.fetches(), 1);
    assert_eq!(
        router.calls,
        vec![None, None, None, Some("/404".to_string()), None]
    );
}

#[tokio::test]
async fn logout_triggers_exactly_one_more_fetch() {
    let backend = Backend::new(Behaviour::SignedIn(user("user")));
    let ctx = context(backend.clone(), Arc::default());
    let mut router = Router::default();

    ctx.navigate("/", &mut router).await;
    assert!(ctx.is_logged_in());

    ctx.logout().await;
    assert!(!ctx.is_logged_in());

    ctx.navigate("/", &mut router).await;
    ctx.navigate("/user/update", &mut router).await;
    ctx.navigate("/", &mut router).await;

    assert_eq!(backend.fetches(), 2);
    assert_eq!(
        router.calls.last(),
        Some(&None),
        "public page stays reachable after logout"
    );
    assert_eq!(
        router.calls[2],
        Some("/user/login?redirect=/user/update".to_string())
    );
}

#[tokio::test]
async fn admin_gate_denies_user_and_allows_admin() {
    let notices = Arc::new(Notices::default());
    let ctx = context(Backend::new(Behaviour::SignedIn(user("user"))), notices.clone());
    let mut router = Router::default();

    let decision = ctx.navigate("/admin/userManage", &mut router).await;
    assert_eq!(
        decision.location(),
        Some("/user/login?redirect=/admin/userManage")
    );
    assert_eq!(*notices.0.lock().unwrap(), vec!["No permission".to_string()]);

    let admin_notices = Arc::new(Notices::default());
    let admin_ctx = context(
        Backend::new(Behaviour::SignedIn(user("admin"))),
        admin_notices.clone(),
    );
    let decision = admin_ctx.navigate("/admin/userManage", &mut router).await;
    assert!(decision.is_proceed());
    assert!(admin_notices.0.lock().unwrap().is_empty());

    assert_eq!(
        router.calls,
        vec![Some("/user/login?redirect=/admin/userManage".to_string()), None]
    );
}

#[test]
fn admin_gate_and_checker_agree() {
    let routes = RouteTable::standard();
    let config = AccessConfig::default();

    for role in ["user", "Admin", "ban", ""] {
        let who = user(role);
        let by_checker = is_allowed(routes.required_level("/admin/userManage"), who.level());
        let decision = decide("/admin/userManage", &routes, &who, &config);
        assert!(!by_checker, "role {role:?}");
        match decision {
            zcode_access::Decision::Redirect(redirect) => {
                assert_eq!(redirect.reason, DenyReason::AdminOnly);
            }
            zcode_access::Decision::Proceed => panic!("role {role:?} reached the admin page"),
        }
    }
}

#[tokio::test(start_paused = true)]
async fn hanging_backend_still_decides_within_bound() {
    let notices = Arc::new(Notices::default());
    let ctx = context(Backend::new(Behaviour::Hangs), notices);
    let mut router = Router::default();

    let started = Instant::now();
    ctx.navigate("/user/update", &mut router).await;
    let elapsed = started.elapsed();

    assert!(elapsed >= Duration::from_millis(3000), "{elapsed:?}");
    assert!(elapsed < Duration::from_millis(3100), "{elapsed:?}");
    assert_eq!(ctx.current_level(), AccessLevel::NotLoggedIn);
    assert_eq!(
        router.calls,
        vec![Some("/user/login?redirect=/user/update".to_string())]
    );

    // The bound is paid once; later navigations use the anonymous result.
    let started = Instant::now();
    ctx.navigate("/", &mut router).await;
    assert!(started.elapsed() < Duration::from_millis(10));
}

#[tokio::test]
async fn public_routes_proceed_for_anyone() {
    for behaviour in [
        Behaviour::NotLoggedIn,
        Behaviour::SignedIn(user("user")),
        Behaviour::SignedIn(user("admin")),
    ] {
        let ctx = context(Backend::new(behaviour), Arc::default());
        let mut router = Router::default();
        for target in ["/", "/user/login", "/user/register", "/404"] {
            assert!(ctx.navigate(target, &mut router).await.is_proceed(), "{target}");
        }
    }
}

#[tokio::test]
async fn login_then_navigate_without_lookup() {
    let backend = Backend::new(Behaviour::NotLoggedIn);
    let ctx = context(backend.clone(), Arc::default());
    let mut router = Router::default();

    ctx.login("alice", "secret").await.expect("login");
    ctx.navigate("/user/update", &mut router).await;

    assert_eq!(backend.fetches(), 0);
    assert_eq!(router.calls, vec![None]);
    assert!(ctx.check_page_access(AccessLevel::User).await);
    assert!(!ctx.check_page_access(AccessLevel::Admin).await);
}
