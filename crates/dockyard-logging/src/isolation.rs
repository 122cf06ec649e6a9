// ABOUTME: Structured reporting for failures that are isolated at their call site
// ABOUTME: Handler, factory and provider failures are logged here and never propagated

use std::any::Any;

/// Log a failure that was caught and contained.
///
/// `context` names the subsystem (e.g. "message_bus"), `source` the misbehaving
/// participant (a recipient id, a factory id, a region).
pub fn report_isolated_failure(context: &str, source: &str, error: &str) {
    tracing::error!(
        context = context,
        source = source,
        error = error,
        "Isolated failure contained"
    );
}

/// Render a `catch_unwind` payload as text.
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Box<dyn Any>".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic;

    #[test]
    fn test_panic_message_from_str_and_string() {
        let payload = panic::catch_unwind(|| panic!("static message")).unwrap_err();
        assert_eq!(panic_message(payload.as_ref()), "static message");

        let payload = panic::catch_unwind(|| panic!("formatted {}", 42)).unwrap_err();
        assert_eq!(panic_message(payload.as_ref()), "formatted 42");

        let payload = panic::catch_unwind(|| panic::panic_any(7_u8)).unwrap_err();
        assert_eq!(panic_message(payload.as_ref()), "Box<dyn Any>");
    }
}
