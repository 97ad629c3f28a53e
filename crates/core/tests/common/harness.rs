//! Test harness: deterministic engines and one-line program runs.

use tiersim_core::{Config, Engine, Observer, RunOutcome, Status};

/// Fixed seed used across the suite so every run is reproducible.
pub const TEST_SEED: u64 = 0xDECAF;

/// A deterministic default configuration for tests.
pub fn test_config() -> Config {
    Config {
        seed: TEST_SEED,
        ..Config::default()
    }
}

/// Wraps an [`Engine`] with the conveniences the tests lean on.
pub struct TestContext {
    pub engine: Engine,
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl TestContext {
    /// A fresh deterministic engine with the builtin curriculum.
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    /// A fresh engine with an explicit configuration.
    pub fn with_config(config: Config) -> Self {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
        Self {
            engine: Engine::new(config),
        }
    }

    /// A fresh engine that reports to `observer`.
    pub fn with_observer(observer: Box<dyn Observer>) -> Self {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
        Self {
            engine: Engine::with_observer(test_config(), observer),
        }
    }

    /// Loads `source`, panicking on assembly errors (tests that *want* the
    /// error call `engine.load_program` directly).
    pub fn load(&mut self, source: &str) -> &mut Self {
        self.engine
            .load_program(source)
            .expect("program should assemble");
        self
    }

    /// Loads and runs `source`, expecting a completed run.
    pub fn run_ok(&mut self, source: &str) -> &mut Self {
        self.load(source);
        assert_eq!(self.engine.run(), RunOutcome::Completed, "run should complete");
        assert_eq!(self.engine.status(), Status::Completed);
        self
    }

    /// Loads and runs `source`, expecting a faulted run.
    pub fn run_faulted(&mut self, source: &str) -> &mut Self {
        self.load(source);
        assert_eq!(self.engine.run(), RunOutcome::Faulted, "run should fault");
        assert_eq!(self.engine.status(), Status::Faulted);
        self
    }

    /// Reads a register by name (`"R1"`).
    pub fn reg(&self, name: &str) -> i64 {
        self.engine
            .read_register(name)
            .expect("register name should be valid")
    }
}

/// Builds, runs, and returns an engine for `source` in one call.
pub fn run_program(source: &str) -> Engine {
    let mut ctx = TestContext::new();
    ctx.run_ok(source);
    let TestContext { engine } = ctx;
    engine
}
