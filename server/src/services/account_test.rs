use super::*;
use crate::services::memory::MemoryStore;

const TEST_COST: u32 = 4;

fn registration(email: &str) -> RegisterRequest {
    RegisterRequest {
        name: Some("Ann".into()),
        email: Some(email.into()),
        phone: Some("(555) 123-4567".into()),
        password: Some("secret1".into()),
    }
}

fn login_req(email: &str, password: &str) -> LoginRequest {
    LoginRequest { email: Some(email.into()), password: Some(password.into()) }
}

fn validation_message(err: AccountError) -> &'static str {
    match err {
        AccountError::Validation(msg) => msg,
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn email_shape_checks() {
    assert!(is_valid_email("ann@example.com"));
    assert!(is_valid_email("a.b+c@mail.example.co"));
    assert!(!is_valid_email("ann@example"));
    assert!(!is_valid_email("ann@.com"));
    assert!(!is_valid_email("ann@example."));
    assert!(!is_valid_email("@example.com"));
    assert!(!is_valid_email("ann@@example.com"));
    assert!(!is_valid_email("ann @example.com"));
    assert!(!is_valid_email("annexample.com"));
}

#[test]
fn phone_shape_checks() {
    assert!(is_valid_phone("5551234567"));
    assert!(is_valid_phone("+1 (555) 123-4567"));
    assert!(is_valid_phone("7"));
    assert!(is_valid_phone("1234567890123456"));
    assert!(!is_valid_phone("12345678901234567"));
    assert!(!is_valid_phone("0551234567"));
    assert!(!is_valid_phone("+"));
    assert!(!is_valid_phone("555-CALL-NOW"));
    assert!(!is_valid_phone("++15551234567"));
}

#[test]
fn normalize_email_trims_and_lowercases() {
    assert_eq!(normalize_email("  Ann@Example.COM "), "ann@example.com");
}

#[test]
fn validation_order_reports_first_failure() {
    let missing = RegisterRequest { name: Some("  ".into()), email: Some("bad".into()), ..registration("x") };
    assert_eq!(validation_message(validate_registration(&missing).unwrap_err()), "All fields are required");

    let bad_email = RegisterRequest { phone: Some("0".into()), ..registration("not-an-email") };
    assert_eq!(
        validation_message(validate_registration(&bad_email).unwrap_err()),
        "Please enter a valid email address"
    );

    let bad_phone = RegisterRequest {
        phone: Some("0123".into()),
        password: Some("123".into()),
        ..registration("ann@example.com")
    };
    assert_eq!(
        validation_message(validate_registration(&bad_phone).unwrap_err()),
        "Please enter a valid phone number"
    );

    let short = RegisterRequest { password: Some("12345".into()), ..registration("ann@example.com") };
    assert_eq!(
        validation_message(validate_registration(&short).unwrap_err()),
        "Password must be at least 6 characters long"
    );
}

#[test]
fn whitespace_password_counts_toward_length() {
    let spaces = RegisterRequest { password: Some("      ".into()), ..registration("ann@example.com") };
    assert!(validate_registration(&spaces).is_ok());

    let empty = RegisterRequest { password: Some(String::new()), ..registration("ann@example.com") };
    assert_eq!(validation_message(validate_registration(&empty).unwrap_err()), "All fields are required");

    let short = RegisterRequest { password: Some("   ".into()), ..registration("ann@example.com") };
    assert_eq!(
        validation_message(validate_registration(&short).unwrap_err()),
        "Password must be at least 6 characters long"
    );
}

#[tokio::test]
async fn space_padded_password_is_kept_verbatim() {
    let store = MemoryStore::new();
    let req = RegisterRequest { password: Some(" pass word ".into()), ..registration("ann@example.com") };
    register(&store, req, TEST_COST).await.expect("register");

    login(&store, login_req("ann@example.com", " pass word ")).await.expect("exact password");
    let err = login(&store, login_req("ann@example.com", "pass word")).await.expect_err("trimmed differs");
    assert!(matches!(err, AccountError::InvalidCredentials));
}

#[tokio::test]
async fn register_stores_normalized_email_and_hashed_password() {
    let store = MemoryStore::new();
    let user = register(&store, registration("  Ann@Example.com "), TEST_COST)
        .await
        .expect("register should succeed");
    assert_eq!(user.email, "ann@example.com");
    assert_eq!(user.name, "Ann");

    let record = store
        .find_user_by_email("ann@example.com")
        .await
        .expect("lookup")
        .expect("stored");
    assert_ne!(record.password_hash, "secret1");
    assert!(bcrypt::verify("secret1", &record.password_hash).expect("hash should parse"));
}

#[tokio::test]
async fn duplicate_registration_is_rejected_case_insensitively() {
    let store = MemoryStore::new();
    register(&store, registration("ann@example.com"), TEST_COST).await.expect("first");
    let err = register(&store, registration("ANN@example.com"), TEST_COST)
        .await
        .expect_err("duplicate should fail");
    assert!(matches!(err, AccountError::Duplicate));
    assert_eq!(err.http_status(), StatusCode::BAD_REQUEST);
    assert_eq!(err.to_string(), "User with this email already exists");
}

#[tokio::test]
async fn login_succeeds_with_correct_password() {
    let store = MemoryStore::new();
    let registered = register(&store, registration("ann@example.com"), TEST_COST).await.expect("register");
    let user = login(&store, login_req(" ANN@example.com", "secret1")).await.expect("login");
    assert_eq!(user, registered);
}

#[tokio::test]
async fn login_rejects_wrong_password_and_unknown_email() {
    let store = MemoryStore::new();
    register(&store, registration("ann@example.com"), TEST_COST).await.expect("register");

    let wrong = login(&store, login_req("ann@example.com", "nope123")).await.expect_err("wrong password");
    assert!(matches!(wrong, AccountError::InvalidCredentials));
    assert_eq!(wrong.http_status(), StatusCode::UNAUTHORIZED);

    let unknown = login(&store, login_req("bob@example.com", "secret1")).await.expect_err("unknown");
    assert!(matches!(unknown, AccountError::InvalidCredentials));
    assert_eq!(unknown.to_string(), "Invalid email or password");
}

#[tokio::test]
async fn login_requires_both_fields() {
    let store = MemoryStore::new();
    let err = login(&store, LoginRequest { email: Some("ann@example.com".into()), password: None })
        .await
        .expect_err("missing password");
    assert_eq!(validation_message(err), "Email and password are required");
}

#[test]
fn public_user_serializes_without_hash() {
    let record = UserRecord {
        id: Uuid::nil(),
        name: "Ann".into(),
        email: "ann@example.com".into(),
        phone: "5551234567".into(),
        password_hash: "$2b$04$secret".into(),
    };
    let json = serde_json::to_string(&PublicUser::from(record)).expect("serialize");
    assert!(!json.contains("password"));
    assert!(!json.contains("$2b$"));
}
