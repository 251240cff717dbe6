use rcp_common::dependency::ResolvedGraph;
use rcp_common::error::{Phase, Result};
use tracing::{debug, info};

use super::{BuildConfig, BuildDriver, BuildPlan};

/// Progress of one `build()` invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildState {
    NotConfigured,
    Configured,
    Built,
    Failed(Phase),
}

/// Runs configure then build on a driver for an already resolved graph.
pub struct BuildTrigger<'a, D: BuildDriver> {
    driver: &'a D,
    dependencies: &'a ResolvedGraph,
    config: &'a BuildConfig,
    state: BuildState,
}

impl<'a, D: BuildDriver> BuildTrigger<'a, D> {
    pub fn new(driver: &'a D, dependencies: &'a ResolvedGraph, config: &'a BuildConfig) -> Self {
        Self {
            driver,
            dependencies,
            config,
            state: BuildState::NotConfigured,
        }
    }

    pub fn state(&self) -> BuildState {
        self.state
    }

    /// Configure, then build. A configure failure stops before the build
    /// step; either failure is returned as the driver reported it. Every
    /// call starts a fresh invocation.
    pub fn build(&mut self) -> Result<BuildPlan> {
        self.state = BuildState::NotConfigured;
        info!(
            "Building {} ({})",
            self.dependencies.root, self.config.build_type
        );

        let plan = match self.driver.configure(
            self.dependencies,
            &self.dependencies.overrides,
            self.config,
        ) {
            Ok(plan) => plan,
            Err(e) => {
                debug!("Configure failed for {}: {}", self.dependencies.root, e);
                self.state = BuildState::Failed(Phase::Configure);
                return Err(e);
            }
        };
        self.state = BuildState::Configured;
        debug!("Configured with args: {:?}", plan.configure_args);

        if let Err(e) = self.driver.build(&plan) {
            debug!("Build failed for {}: {}", self.dependencies.root, e);
            self.state = BuildState::Failed(Phase::Build);
            return Err(e);
        }
        self.state = BuildState::Built;
        info!("Built {}", self.dependencies.root);
        Ok(plan)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use rcp_common::error::RcpError;
    use rcp_common::manifest::OptionOverrides;

    use super::*;
    use crate::test_support::sample_graph;

    #[derive(Default)]
    struct RecordingDriver {
        calls: RefCell<Vec<&'static str>>,
        seen_options: RefCell<Option<OptionOverrides>>,
        configure_error: Option<RcpError>,
        build_error: Option<RcpError>,
    }

    impl BuildDriver for RecordingDriver {
        fn configure(
            &self,
            _dependencies: &ResolvedGraph,
            options: &OptionOverrides,
            config: &BuildConfig,
        ) -> Result<BuildPlan> {
            self.calls.borrow_mut().push("configure");
            *self.seen_options.borrow_mut() = Some(options.clone());
            match &self.configure_error {
                Some(e) => Err(e.clone()),
                None => Ok(BuildPlan::new("recording", config)),
            }
        }

        fn build(&self, _plan: &BuildPlan) -> Result<()> {
            self.calls.borrow_mut().push("build");
            match &self.build_error {
                Some(e) => Err(e.clone()),
                None => Ok(()),
            }
        }
    }

    fn config() -> BuildConfig {
        BuildConfig::new("/src/myproject", "/src/myproject/build")
    }

    #[test]
    fn configures_once_then_builds_once() {
        let root = tempfile::tempdir().unwrap();
        let graph = sample_graph(root.path());
        let config = config();
        let driver = RecordingDriver::default();
        let mut trigger = BuildTrigger::new(&driver, &graph, &config);
        assert_eq!(trigger.state(), BuildState::NotConfigured);

        let plan = trigger.build().unwrap();
        assert_eq!(plan.build_dir, config.build_dir);
        assert_eq!(trigger.state(), BuildState::Built);
        assert_eq!(*driver.calls.borrow(), vec!["configure", "build"]);
    }

    #[test]
    fn configure_receives_the_option_override() {
        let root = tempfile::tempdir().unwrap();
        let graph = sample_graph(root.path());
        let config = config();
        let driver = RecordingDriver::default();
        BuildTrigger::new(&driver, &graph, &config).build().unwrap();

        let seen = driver.seen_options.borrow();
        let seen = seen.as_ref().unwrap();
        assert_eq!(seen.get("fftw", "shared").unwrap().to_string(), "False");
    }

    #[test]
    fn build_never_runs_after_failed_configure() {
        let root = tempfile::tempdir().unwrap();
        let graph = sample_graph(root.path());
        let config = config();
        let driver = RecordingDriver {
            configure_error: Some(RcpError::ConfigureFailed {
                status: Some(1),
                detail: "CMake Error: Could not create named generator Bogus".to_string(),
            }),
            ..Default::default()
        };
        let mut trigger = BuildTrigger::new(&driver, &graph, &config);

        let err = trigger.build().unwrap_err();
        assert!(matches!(err, RcpError::ConfigureFailed { status: Some(1), .. }));
        assert_eq!(trigger.state(), BuildState::Failed(Phase::Configure));
        assert_eq!(*driver.calls.borrow(), vec!["configure"]);
    }

    #[test]
    fn build_failure_is_not_reported_as_success() {
        let root = tempfile::tempdir().unwrap();
        let graph = sample_graph(root.path());
        let config = config();
        let driver = RecordingDriver {
            build_error: Some(RcpError::BuildFailed {
                status: Some(2),
                detail: "undefined reference to `fftw_execute'".to_string(),
            }),
            ..Default::default()
        };
        let mut trigger = BuildTrigger::new(&driver, &graph, &config);

        let err = trigger.build().unwrap_err();
        assert_eq!(err.phase(), Some(Phase::Build));
        assert_eq!(err.exit_code(), 2);
        assert_eq!(trigger.state(), BuildState::Failed(Phase::Build));
    }

    #[test]
    fn repeated_builds_give_the_same_outcome() {
        let root = tempfile::tempdir().unwrap();
        let graph = sample_graph(root.path());
        let config = config();

        let ok_driver = RecordingDriver::default();
        let mut trigger = BuildTrigger::new(&ok_driver, &graph, &config);
        assert!(trigger.build().is_ok());
        assert!(trigger.build().is_ok());
        assert_eq!(
            *ok_driver.calls.borrow(),
            vec!["configure", "build", "configure", "build"]
        );

        let failing = RecordingDriver {
            build_error: Some(RcpError::BuildFailed {
                status: Some(1),
                detail: "error".to_string(),
            }),
            ..Default::default()
        };
        let mut trigger = BuildTrigger::new(&failing, &graph, &config);
        assert!(trigger.build().is_err());
        assert!(trigger.build().is_err());
        assert_eq!(trigger.state(), BuildState::Failed(Phase::Build));
    }
}
