use plaza_logger::{Logger, LoggerError};

#[test]
fn second_logger_in_a_process_is_rejected() {
    let _first = Logger::builder("plaza-init-twice").init().expect("first init should succeed");

    let err = Logger::builder("plaza-init-twice-second").init().expect_err("second init should fail");
    assert!(matches!(err, LoggerError::Subscriber { .. }), "got {err:?}");
    assert_eq!(err.kind(), "subscriber");
}
