use super::*;
use serial_test::serial;
use std::env;
use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

const ALL_VARS: &[&str] = &[
    "IRT_PORT",
    "IRT_BIND_ADDR",
    "IRT_API_URL",
    "IRT_REQUEST_TIMEOUT_MS",
    "IRT_DEADLINE_MS",
    "IRT_SUBJECTS_PATH",
    "REDIS_HOST",
    "REDIS_PORT",
    "REDIS_PASSWORD",
    "REDIS_DB",
];

fn with_env_vars<F, R>(vars: &[(&str, &str)], f: F) -> R
where
    F: FnOnce() -> R,
{
    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    for (key, value) in vars {
        unsafe { env::set_var(key, value) };
    }

    let result = f();

    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    for (key, _) in vars {
        unsafe { env::remove_var(key) };
    }

    result
}

fn clear_irt_env() {
    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    for key in ALL_VARS {
        unsafe { env::remove_var(key) };
    }
}

#[test]
fn test_default_config() {
    let config = Config::default();

    assert_eq!(config.port, 8080);
    assert_eq!(
        config.bind_addr,
        IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1))
    );
    assert_eq!(config.scoring_url, "http://localhost:5000/irt");
    assert_eq!(config.request_timeout, Duration::from_secs(30));
    assert!(config.resolve_deadline.is_none());
    assert!(config.subjects_path.is_none());
    assert!(config.redis_host.is_none());
    assert_eq!(config.redis_port, 6379);
    assert_eq!(config.redis_db, 0);
}

#[test]
fn test_socket_addr() {
    let config = Config::default();
    assert_eq!(config.socket_addr(), "127.0.0.1:8080");

    let config = Config {
        port: 3000,
        bind_addr: IpAddr::V4(std::net::Ipv4Addr::new(0, 0, 0, 0)),
        ..Default::default()
    };
    assert_eq!(config.socket_addr(), "0.0.0.0:3000");
}

#[test]
fn test_redis_url_absent_without_host() {
    assert_eq!(Config::default().redis_url().unwrap(), None);
}

#[test]
fn test_redis_url_without_password() {
    let config = Config {
        redis_host: Some("cache.internal".to_string()),
        redis_port: 6380,
        redis_db: 2,
        ..Default::default()
    };

    assert_eq!(
        config.redis_url().unwrap().as_deref(),
        Some("redis://cache.internal:6380/2")
    );
}

#[test]
fn test_redis_url_with_password() {
    let config = Config {
        redis_host: Some("localhost".to_string()),
        redis_password: Some("s3cret".to_string()),
        ..Default::default()
    };

    assert_eq!(
        config.redis_url().unwrap().as_deref(),
        Some("redis://:s3cret@localhost:6379/0")
    );
}

#[test]
fn test_redis_url_escapes_reserved_password_characters() {
    let config = Config {
        redis_host: Some("redis.svc".to_string()),
        redis_password: Some("p@ss/w:rd".to_string()),
        redis_db: 3,
        ..Default::default()
    };

    let url = config.redis_url().unwrap().unwrap();
    assert_eq!(url, "redis://:p%40ss%2Fw%3Ard@redis.svc:6379/3");

    let parsed = reqwest::Url::parse(&url).unwrap();
    assert_eq!(parsed.host_str(), Some("redis.svc"));
    assert_eq!(parsed.port(), Some(6379));
    assert_eq!(parsed.path(), "/3");
    assert_eq!(parsed.password(), Some("p%40ss%2Fw%3Ard"));
}

#[test]
fn test_redis_url_rejects_bad_host() {
    let config = Config {
        redis_host: Some("bad host".to_string()),
        ..Default::default()
    };

    assert!(matches!(
        config.redis_url(),
        Err(ConfigError::InvalidRedisHost { .. })
    ));
    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidRedisHost { .. })
    ));
}

#[test]
#[serial]
fn test_from_env_with_defaults() {
    clear_irt_env();

    let config = Config::from_env().expect("should parse with defaults");

    assert_eq!(config.port, 8080);
    assert_eq!(config.scoring_url, DEFAULT_SCORING_URL);
    assert!(config.redis_host.is_none());
}

#[test]
#[serial]
fn test_from_env_full() {
    clear_irt_env();

    with_env_vars(
        &[
            ("IRT_PORT", "9090"),
            ("IRT_BIND_ADDR", "0.0.0.0"),
            ("IRT_API_URL", "http://scoring.svc:8000/irt"),
            ("IRT_REQUEST_TIMEOUT_MS", "1500"),
            ("IRT_DEADLINE_MS", "4000"),
            ("IRT_SUBJECTS_PATH", "/data/subjects.json"),
            ("REDIS_HOST", "redis.svc"),
            ("REDIS_PORT", "6390"),
            ("REDIS_PASSWORD", "pw"),
            ("REDIS_DB", "3"),
        ],
        || {
            let config = Config::from_env().expect("should parse");

            assert_eq!(config.port, 9090);
            assert_eq!(config.socket_addr(), "0.0.0.0:9090");
            assert_eq!(config.scoring_url, "http://scoring.svc:8000/irt");
            assert_eq!(config.request_timeout, Duration::from_millis(1500));
            assert_eq!(config.resolve_deadline, Some(Duration::from_millis(4000)));
            assert_eq!(
                config.subjects_path,
                Some(PathBuf::from("/data/subjects.json"))
            );
            assert_eq!(
                config.redis_url().unwrap().as_deref(),
                Some("redis://:pw@redis.svc:6390/3")
            );
        },
    );
}

#[test]
#[serial]
fn test_from_env_blank_redis_host_is_unset() {
    clear_irt_env();

    with_env_vars(&[("REDIS_HOST", "  ")], || {
        let config = Config::from_env().expect("should parse");
        assert!(config.redis_host.is_none());
    });
}

#[test]
#[serial]
fn test_invalid_port_zero() {
    clear_irt_env();

    with_env_vars(&[("IRT_PORT", "0")], || {
        let result = Config::from_env();
        assert!(matches!(result, Err(ConfigError::InvalidPort { .. })));
    });
}

#[test]
#[serial]
fn test_invalid_port_not_number() {
    clear_irt_env();

    with_env_vars(&[("IRT_PORT", "eighty")], || {
        let result = Config::from_env();
        assert!(matches!(result, Err(ConfigError::PortParseError { .. })));
    });
}

#[test]
#[serial]
fn test_invalid_redis_port_too_large() {
    clear_irt_env();

    with_env_vars(&[("REDIS_PORT", "70000")], || {
        let result = Config::from_env();
        assert!(matches!(
            result,
            Err(ConfigError::PortParseError {
                name: "REDIS_PORT",
                ..
            })
        ));
    });
}

#[test]
#[serial]
fn test_invalid_bind_addr() {
    clear_irt_env();

    with_env_vars(&[("IRT_BIND_ADDR", "not-an-ip")], || {
        let result = Config::from_env();
        assert!(matches!(result, Err(ConfigError::InvalidBindAddr { .. })));
    });
}

#[test]
#[serial]
fn test_invalid_timeout() {
    clear_irt_env();

    with_env_vars(&[("IRT_REQUEST_TIMEOUT_MS", "soon")], || {
        let result = Config::from_env();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidNumber {
                name: "IRT_REQUEST_TIMEOUT_MS",
                ..
            })
        ));
    });
}

#[test]
fn test_validate_success_with_defaults() {
    assert!(Config::default().validate().is_ok());
}

#[test]
fn test_validate_rejects_bad_url() {
    let config = Config {
        scoring_url: "not a url".to_string(),
        ..Default::default()
    };
    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidUrl { .. })
    ));

    let config = Config {
        scoring_url: "ftp://scoring/irt".to_string(),
        ..Default::default()
    };
    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidUrl { .. })
    ));
}

#[test]
fn test_validate_rejects_zero_durations() {
    let config = Config {
        request_timeout: Duration::ZERO,
        ..Default::default()
    };
    assert!(matches!(
        config.validate(),
        Err(ConfigError::ZeroDuration { .. })
    ));

    let config = Config {
        resolve_deadline: Some(Duration::ZERO),
        ..Default::default()
    };
    assert!(matches!(
        config.validate(),
        Err(ConfigError::ZeroDuration { .. })
    ));
}

#[test]
fn test_validate_nonexistent_subjects_path() {
    let config = Config {
        subjects_path: Some(PathBuf::from("/nonexistent/subjects.json")),
        ..Default::default()
    };

    assert!(matches!(
        config.validate(),
        Err(ConfigError::PathNotFound { .. })
    ));
}

#[test]
fn test_validate_subjects_path_is_directory() {
    let config = Config {
        subjects_path: Some(PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("src")),
        ..Default::default()
    };

    assert!(matches!(config.validate(), Err(ConfigError::NotAFile { .. })));
}

#[test]
fn test_validate_subjects_path_file() {
    let config = Config {
        subjects_path: Some(PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("Cargo.toml")),
        ..Default::default()
    };

    assert!(config.validate().is_ok());
}

#[test]
fn test_error_messages_are_descriptive() {
    let err = ConfigError::InvalidPort {
        name: "IRT_PORT",
        value: "0".to_string(),
    };
    assert_eq!(
        err.to_string(),
        "invalid IRT_PORT '0': must be between 1 and 65535"
    );

    let err = ConfigError::ZeroDuration {
        name: "IRT_DEADLINE_MS",
    };
    assert_eq!(err.to_string(), "IRT_DEADLINE_MS must be greater than zero");
}
