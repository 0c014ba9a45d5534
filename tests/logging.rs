use std::io::Write;
use std::sync::{Arc, Mutex};

use ortvalue::environment::{Environment, EnvironmentConfig, LoggingLevel};
use ortvalue::memory::CpuAllocator;
use ortvalue::value::Value;

#[derive(Clone, Default)]
struct Capture(Arc<Mutex<Vec<u8>>>);
impl Write for Capture {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
impl Capture {
    fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

fn capture_logs(f: impl FnOnce()) -> String {
    let capture = Capture::default();
    let writer = capture.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    tracing::subscriber::with_default(subscriber, f);
    capture.contents()
}

#[test]
fn value_lifecycle_is_logged() {
    let logs = capture_logs(|| {
        let env = Environment::init_with_config(
            EnvironmentConfig::new()
                .with_log_id("logging-test")
                .with_logging_level(LoggingLevel::Verbose),
        );
        assert_eq!(env.log_id(), "logging-test");
        let allocator = CpuAllocator::default_instance().unwrap();
        let mut value = Value::create_tensor_with_empty_strings(allocator, &[1, 1, 3]).unwrap();
        value.release();

        // a later config is ignored, with a warning
        Environment::init_with_config(EnvironmentConfig::new().with_log_id("other"));
    });
    assert!(logs.contains("runtime environment initialized"), "{logs}");
    assert!(logs.contains("created String tensor with shape [1, 1, 3]"), "{logs}");
    assert!(logs.contains("released Tensor"), "{logs}");
    assert!(logs.contains("already initialized"), "{logs}");
    assert!(logs.contains("log_id=\"logging-test\""), "{logs}");

    Environment::get()
        .unwrap()
        .set_logging_level(LoggingLevel::Error);
    let logs = capture_logs(|| {
        let allocator = CpuAllocator::default_instance().unwrap();
        let _value = Value::create_tensor_with_empty_strings(allocator, &[2]).unwrap();
    });
    assert!(!logs.contains("created"), "{logs}");
}
