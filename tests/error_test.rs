//! Error classification tests.

use std::time::Duration;

use wello::{FailureCause, WelloError};

#[test]
fn test_transient_errors() {
    assert!(WelloError::Http("connection reset".into()).is_transient());
    assert!(WelloError::Timeout(Duration::from_secs(30)).is_transient());
    assert!(WelloError::RateLimited { retry_after: None }.is_transient());
    assert!(
        WelloError::Api {
            status: 502,
            message: "bad gateway".into()
        }
        .is_transient()
    );
    assert!(
        WelloError::Api {
            status: 408,
            message: "request timeout".into()
        }
        .is_transient()
    );
}

#[test]
fn test_permanent_errors() {
    assert!(!WelloError::AuthenticationFailed.is_transient());
    assert!(!WelloError::MalformedRequest("bad".into()).is_transient());
    assert!(!WelloError::EmptyResponse.is_transient());
    assert!(
        !WelloError::Api {
            status: 409,
            message: "conflict".into()
        }
        .is_transient()
    );
}

#[test]
fn test_retry_after_only_from_rate_limit() {
    let hint = Some(Duration::from_secs(3));
    assert_eq!(WelloError::RateLimited { retry_after: hint }.retry_after(), hint);
    assert_eq!(WelloError::Http("x".into()).retry_after(), None);
}

#[test]
fn test_cause_mapping() {
    assert_eq!(WelloError::AuthenticationFailed.cause(), FailureCause::Rejected);
    assert_eq!(
        WelloError::MalformedRequest("x".into()).cause(),
        FailureCause::Rejected
    );
    assert_eq!(
        WelloError::Api {
            status: 418,
            message: "teapot".into()
        }
        .cause(),
        FailureCause::Rejected
    );
    assert_eq!(
        WelloError::Timeout(Duration::from_secs(1)).cause(),
        FailureCause::Unavailable
    );
    assert_eq!(WelloError::EmptyResponse.cause(), FailureCause::Unavailable);
    assert_eq!(
        WelloError::RateLimited { retry_after: None }.cause(),
        FailureCause::Unavailable
    );
}

#[test]
fn test_cause_sees_through_generation_failed() {
    let err = WelloError::GenerationFailed {
        attempts: 1,
        source: Box::new(WelloError::AuthenticationFailed),
    };
    assert_eq!(err.cause(), FailureCause::Rejected);
    assert!(!err.is_transient());
}

#[test]
fn test_generation_failed_display_and_source() {
    use std::error::Error;

    let err = WelloError::GenerationFailed {
        attempts: 3,
        source: Box::new(WelloError::Http("reset".into())),
    };
    let msg = err.to_string();
    assert!(msg.contains("3 attempt"));
    assert!(msg.contains("reset"));
    assert!(err.source().is_some());
}

#[test]
fn test_failure_cause_labels() {
    assert_eq!(FailureCause::Unavailable.to_string(), "unavailable");
    assert_eq!(FailureCause::Rejected.as_str(), "rejected");
    assert_eq!(
        serde_json::to_string(&FailureCause::Rejected).unwrap(),
        "\"rejected\""
    );
}

#[test]
fn test_unreadable_reply_fails_fast() {
    let err = WelloError::from(serde_json::from_str::<serde_json::Value>("<html>").unwrap_err());
    assert!(!err.is_transient());
    assert_eq!(err.cause(), FailureCause::Unavailable);
}
