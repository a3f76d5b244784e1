//! Logger init and lifecycle tests

use rt_log::host::HostPort;
use rt_log::{LifecycleState, LogLevel, LogResult, Logger, LoggerConfig, MemorySink, Port, Sink, Status};

/// Sink whose init always fails.
struct BrokenSink;

impl Sink for BrokenSink {
    fn name(&self) -> &str {
        "Broken"
    }

    fn init(&mut self) -> LogResult {
        Err(Status::Failed)
    }

    fn write_size(&self) -> usize {
        0
    }

    fn write(&mut self, _bytes: &[u8]) -> usize {
        0
    }
}

/// HostPort with injectable init and channel failures.
struct FlakyPort {
    inner: HostPort,
    init_error: Option<Status>,
    channel_error: Option<Status>,
}

impl FlakyPort {
    fn new(init_error: Option<Status>, channel_error: Option<Status>) -> Self {
        Self {
            inner: HostPort::new(),
            init_error,
            channel_error,
        }
    }
}

impl Port for FlakyPort {
    fn init(&self) -> LogResult {
        match self.init_error {
            Some(status) => Err(status),
            None => self.inner.init(),
        }
    }

    fn lock(&self, timeout_ms: u32) -> bool {
        self.inner.lock(timeout_ms)
    }

    fn unlock(&self) {
        self.inner.unlock()
    }

    fn uptime_ms(&self) -> u32 {
        self.inner.uptime_ms()
    }

    fn in_isr(&self) -> bool {
        self.inner.in_isr()
    }

    fn create_channel(&self) -> LogResult {
        match self.channel_error {
            Some(status) => Err(status),
            None => self.inner.create_channel(),
        }
    }

    fn signal_data(&self) {
        self.inner.signal_data()
    }

    fn wait_data(&self) {
        self.inner.wait_data()
    }
}

fn config() -> LoggerConfig {
    LoggerConfig::new().with_color(false)
}

#[test]
fn test_new_logger_is_uninitialized() {
    let logger: Logger<HostPort> = Logger::new(HostPort::new(), config());

    assert_eq!(logger.state(), LifecycleState::Uninitialized);
    assert!(!logger.is_initialized());
    assert_eq!(logger.pending_bytes(), 0);
    assert!(!logger.config().color);
    assert_eq!(logger.config().lock_timeout_ms, rt_log::config::LOCK_TIMEOUT_MS);
}

#[test]
fn test_init_reaches_ready() {
    let logger: Logger<HostPort> = Logger::new(HostPort::new(), config());
    let dispatcher = logger.init((MemorySink::<1024>::new(),)).unwrap();

    assert_eq!(logger.state(), LifecycleState::Ready);
    assert!(dispatcher.is_active(0));
    assert_eq!(dispatcher.min_write_size(), 1024);
}

#[test]
fn test_all_sinks_failing() {
    let logger: Logger<HostPort> = Logger::new(HostPort::new(), config());

    let result = logger.init((BrokenSink, BrokenSink));
    assert_eq!(result.err(), Some(Status::Failed));
    assert!(!logger.is_initialized());
    assert_eq!(
        logger.log(LogLevel::Error, "Test", "after", format_args!("x")),
        Err(Status::NotInitialized)
    );
}

#[test]
fn test_init_retry_after_failure() {
    let logger: Logger<HostPort> = Logger::new(HostPort::new(), config());

    assert_eq!(logger.init((BrokenSink,)).err(), Some(Status::Failed));

    let dispatcher = logger.init((MemorySink::<1024>::new(),));
    assert!(dispatcher.is_ok());
    assert!(logger.is_initialized());
}

#[test]
fn test_partial_sink_failure_is_reported() {
    let logger: Logger<HostPort> = Logger::new(HostPort::new(), config());
    let mut dispatcher = logger
        .init((BrokenSink, MemorySink::<4096>::new()))
        .unwrap();

    assert!(!dispatcher.is_active(0));
    assert!(dispatcher.is_active(1));
    // Failed sinks do not hold back the drain.
    assert_eq!(dispatcher.min_write_size(), 4096);

    assert!(logger.pending_bytes() > 0);
    while logger.pending_bytes() > 0 {
        dispatcher.step().unwrap();
    }

    let lines: Vec<&str> = dispatcher.sinks().1.lines().collect();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].ends_with("|W|Logger|init:Error initializing Broken sink"));
}

#[test]
fn test_port_init_failure_propagates() {
    let logger: Logger<FlakyPort> =
        Logger::new(FlakyPort::new(Some(Status::Unsupported), None), config());

    let result = logger.init((MemorySink::<1024>::new(),));
    assert_eq!(result.err(), Some(Status::Unsupported));
    assert_eq!(logger.state(), LifecycleState::Uninitialized);
}

#[test]
fn test_channel_creation_failure() {
    let logger: Logger<FlakyPort> =
        Logger::new(FlakyPort::new(None, Some(Status::InvalidArgument)), config());

    let result = logger.init((MemorySink::<1024>::new(),));
    assert_eq!(result.err(), Some(Status::Failed));
    assert!(!logger.is_initialized());
}

#[test]
fn test_second_init_rejected() {
    let logger: Logger<HostPort> = Logger::new(HostPort::new(), config());
    let _dispatcher = logger.init((MemorySink::<1024>::new(),)).unwrap();

    let again = logger.init((MemorySink::<1024>::new(),));
    assert_eq!(again.err(), Some(Status::Unsupported));
    assert!(logger.is_initialized());
}

#[test]
fn test_init_restores_default_level() {
    let logger: Logger<HostPort> =
        Logger::new(HostPort::new(), config().with_level(LogLevel::Warn));

    logger.set_level(LogLevel::Trace);
    assert_eq!(logger.level(), LogLevel::Trace);

    let _dispatcher = logger.init((MemorySink::<1024>::new(),)).unwrap();
    assert_eq!(logger.level(), LogLevel::Warn);
}

#[test]
fn test_set_level_before_init() {
    let logger: Logger<HostPort> = Logger::new(HostPort::new(), config());

    logger.set_level(LogLevel::Error);
    assert_eq!(logger.level(), LogLevel::Error);
    assert!(!logger.enabled(LogLevel::Warn));
    assert!(logger.enabled(LogLevel::Crit));
}

#[test]
fn test_array_registry() {
    let logger: Logger<HostPort> = Logger::new(HostPort::new(), config());
    let mut first = MemorySink::<2048>::named("First");
    let mut second = MemorySink::<2048>::named("Second");

    {
        let mut dispatcher = logger.init([&mut first, &mut second]).unwrap();
        logger
            .log(LogLevel::Info, "Test", "array", format_args!("both"))
            .unwrap();
        while logger.pending_bytes() > 0 {
            dispatcher.step().unwrap();
        }
    }

    assert_eq!(first.contents(), second.contents());
    assert!(first.as_str().ends_with("|I|Test|array:both\r\n"));
}
