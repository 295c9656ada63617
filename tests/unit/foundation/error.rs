use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(PatchError::parse("x").to_string().contains("parse error:"));
    assert!(
        PatchError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        PatchError::schedule("x")
            .to_string()
            .contains("schedule error:")
    );
    assert!(
        PatchError::evaluation("x")
            .to_string()
            .contains("evaluation error:")
    );
    assert!(PatchError::sink("x").to_string().contains("sink error:"));
}

#[test]
fn unsupported_version_names_the_version() {
    let err = PatchError::UnsupportedVersion("9.9".to_owned());
    assert_eq!(err.to_string(), "unsupported patch version '9.9'");
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = PatchError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
