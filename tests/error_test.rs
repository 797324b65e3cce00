use std::io;

use sprout::error::Error;

#[test]
fn test_error_conversion() {
    let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
    let err: Error = io_err.into();

    match err {
        Error::IoError(_) => (),
        _ => panic!("Expected IoError variant"),
    }
}

#[test]
fn test_error_display() {
    let err = Error::MissingRequiredArgument { name: "name".to_string() };
    assert_eq!(err.to_string(), "-name option is required.");

    let err = Error::InvalidRenderedPath {
        source_path: "tpl/{{ x }}".to_string(),
        rendered: "../x".to_string(),
    };
    assert_eq!(
        err.to_string(),
        "Rendered path '../x' of 'tpl/{{ x }}' is not a valid relative path."
    );

    let err = Error::WriteError {
        path: "out/a.txt".to_string(),
        source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
    };
    assert_eq!(err.to_string(), "Cannot write 'out/a.txt': denied.");
}
