use std::sync::{Arc, Mutex};

use easemob_im::Error;
use easemob_im::telemetry::refresh::RefreshTelemetry;
use easemob_im::token::TokenResponse;
use tracing_subscriber::fmt::MakeWriter;

#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl std::io::Write for Captured {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for Captured {
    type Writer = Captured;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

fn capture(f: impl FnOnce()) -> String {
    let out = Captured::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(out.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .finish();
    tracing::subscriber::with_default(subscriber, f);
    let bytes = out.0.lock().unwrap().clone();
    String::from_utf8(bytes).unwrap()
}

#[test]
fn telemetry_preserves_context_and_id() {
    let telemetry = RefreshTelemetry::new("client-id");
    assert_eq!(telemetry.context(), "client-id");
    let first = telemetry.attempt_id();
    assert_eq!(first, telemetry.attempt_id());
    assert_ne!(first, RefreshTelemetry::new("client-id").attempt_id());
}

#[test]
fn events_share_the_attempt_id() {
    let telemetry = RefreshTelemetry::new("client-id");
    let id = telemetry.attempt_id().to_string();
    let token = TokenResponse {
        access_token: "YWMtsecret".to_string(),
        expires_in: 7200,
        application: "app-uuid".to_string(),
    };

    let logs = capture(|| {
        telemetry.emit_start(7200);
        telemetry.emit_success(&token);
        telemetry.emit_failure(&Error::MissingData("access_token"));
    });

    let lines: Vec<&str> = logs.lines().collect();
    assert_eq!(lines.len(), 3, "got {:?}", lines);
    assert!(lines.iter().all(|l| l.contains(&id)));
    assert!(lines[0].contains("INFO") && lines[0].contains("refresh.start"));
    assert!(lines[1].contains("refresh.success") && lines[1].contains("expires_in=7200"));
    assert!(lines[2].contains("ERROR") && lines[2].contains("refresh.failure"));
    assert!(
        !logs.contains("YWMtsecret"),
        "token value must not be logged: {}",
        logs
    );
}
