//! Integration tests for sgp-core infrastructure

use sgp_core::{
    config_error, init_logging, log_operation_start, log_operation_success,
    not_authenticated_error, performance, render_error, storage_error, validation_error,
    ErrorContext, LogFormat, LoggingConfig, PortalConfig, PortalError,
};

#[test]
fn test_error_handling() {
    let error = storage_error!("Store unavailable", "test_component");

    match &error {
        PortalError::Storage {
            message, context, ..
        } => {
            assert_eq!(message, "Store unavailable");
            assert_eq!(context.component, "test_component");
            assert!(!context.error_id.is_empty());
        }
        _ => panic!("Expected Storage error"),
    }

    // Logging an error must not panic, with or without a subscriber
    error.log();

    let network_error = PortalError::Network {
        message: "Connection refused".to_string(),
        source: None,
        context: ErrorContext::new("test"),
    };
    assert!(network_error.is_recoverable());

    let config_error = config_error!("Invalid config", "test");
    assert!(!config_error.is_recoverable());
    assert_eq!(
        config_error.context().unwrap().recovery_suggestions.len(),
        2
    );

    let auth_error = not_authenticated_error!("session_accessor");
    assert!(auth_error.is_not_authenticated());
    assert!(!auth_error.is_recoverable());
    assert!(auth_error.to_string().contains("Not authenticated"));

    let render_error = render_error!("template failed", "layout");
    assert!(matches!(render_error, PortalError::Render { .. }));

    let validation = validation_error!("bad id", "layout.nav_items", "config");
    match validation {
        PortalError::Validation { field, .. } => {
            assert_eq!(field.as_deref(), Some("layout.nav_items"))
        }
        _ => panic!("Expected Validation error"),
    }
}

#[test]
fn test_error_context_builder() {
    let context = ErrorContext::new("session_accessor")
        .with_operation("auth_fetch")
        .with_metadata("url", "http://localhost:8001/api/orders")
        .with_suggestion("Log in again");

    assert_eq!(context.operation.as_deref(), Some("auth_fetch"));
    assert_eq!(
        context.metadata.get("url").map(String::as_str),
        Some("http://localhost:8001/api/orders")
    );
    assert_eq!(context.recovery_suggestions, vec!["Log in again"]);
}

#[test]
fn test_io_errors_convert() {
    fn read_missing() -> Result<String, PortalError> {
        Ok(std::fs::read_to_string("/definitely/not/here/sgp.toml")?)
    }

    assert!(matches!(read_missing(), Err(PortalError::Io(_))));
}

#[test]
fn test_logging_initialization() {
    let config = LoggingConfig {
        level: "debug".to_string(),
        format: LogFormat::Compact,
        include_location: false,
        log_file_path: None,
        enable_performance_monitoring: true,
        filter_directives: vec!["sgp_core=debug".to_string()],
    };

    // A second initialisation in the same process reports an error instead of panicking
    let _ = init_logging(&config);
    assert!(init_logging(&config).is_err());

    log_operation_start!("test_operation");
    let value = performance::measure_sync("sum", || 2 + 2);
    log_operation_success!("test_operation", value = value);
    assert_eq!(value, 4);
}

#[test]
fn test_bad_filter_directive_is_rejected() {
    let config = LoggingConfig {
        filter_directives: vec!["sgp_core=notalevel".to_string()],
        ..LoggingConfig::default()
    };

    assert!(init_logging(&config).is_err());
}

#[test]
fn test_config_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("portal.toml");

    let mut config = PortalConfig::default();
    config.layout.logo_text = "Linha 2".to_string();
    config.logging.format = LogFormat::Json;
    config.save_to_file(&path).unwrap();

    let loaded = PortalConfig::from_file(&path).unwrap();
    assert_eq!(loaded.layout.logo_text, "Linha 2");
    assert_eq!(loaded.logging.format, LogFormat::Json);
    assert!(loaded.validate().is_ok());

    let missing = PortalConfig::from_file(dir.path().join("missing.toml"));
    assert!(matches!(missing, Err(PortalError::Config { .. })));
}
