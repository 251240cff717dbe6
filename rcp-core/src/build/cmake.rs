use std::fs;
use std::path::{self, Path, PathBuf};
use std::process::Command;

use rcp_common::dependency::ResolvedGraph;
use rcp_common::error::{Phase, RcpError, Result};
use rcp_common::manifest::OptionOverrides;
use tracing::{debug, info};

use super::{BuildConfig, BuildDriver, BuildEnvironment, BuildPlan};
use crate::generator::{cmake_path, var_suffix, CMAKE_BUILDINFO};

const STDERR_TAIL_LINES: usize = 20;

/// Drives `cmake` for the configure and build steps.
#[derive(Debug, Clone, Default)]
pub struct CMakeDriver {
    program: Option<PathBuf>,
}

impl CMakeDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use this cmake executable instead of searching `PATH`.
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: Some(program.into()),
        }
    }

    fn locate(&self) -> Result<PathBuf> {
        if let Some(program) = &self.program {
            if program.is_file() {
                return absolute(program);
            }
            return Err(RcpError::BuildEnvError(format!(
                "cmake executable {} does not exist",
                program.display()
            )));
        }
        which::which("cmake").map_err(|e| {
            RcpError::BuildEnvError(format!("cmake command not found on PATH: {e}"))
        })
    }
}

/// Arguments of the configure invocation.
pub fn configure_args(
    dependencies: &ResolvedGraph,
    options: &OptionOverrides,
    config: &BuildConfig,
    buildinfo: Option<&Path>,
) -> Vec<String> {
    let mut args = vec![
        "-S".to_string(),
        config.source_dir.display().to_string(),
        "-B".to_string(),
        config.build_dir.display().to_string(),
    ];
    if let Some(generator) = &config.generator {
        args.push("-G".to_string());
        args.push(generator.clone());
    }
    args.push(format!("-DCMAKE_BUILD_TYPE={}", config.build_type));
    if let Some(path) = buildinfo {
        args.push(format!("-DRCP_BUILDINFO={}", cmake_path(path)));
    }
    if !dependencies.packages.is_empty() {
        let prefixes: Vec<String> = dependencies
            .prefix_paths()
            .iter()
            .map(|p| cmake_path(p))
            .collect();
        args.push(format!("-DCMAKE_PREFIX_PATH={}", prefixes.join(";")));
    }
    for (key, value) in options.iter() {
        args.push(format!(
            "-DRCP_OPTION_{}_{}={}",
            var_suffix(&key.package),
            var_suffix(&key.option),
            value
        ));
    }
    for (key, value) in &config.defines {
        args.push(format!("-D{key}={value}"));
    }
    args
}

/// Arguments of the build invocation.
pub fn build_args(plan: &BuildPlan) -> Vec<String> {
    let mut args = vec![
        "--build".to_string(),
        plan.build_dir.display().to_string(),
        "--config".to_string(),
        plan.build_type.to_string(),
    ];
    if let Some(jobs) = plan.jobs {
        args.push("--parallel".to_string());
        args.push(jobs.to_string());
    }
    args
}

fn absolute(path: &Path) -> Result<PathBuf> {
    path::absolute(path).map_err(|e| {
        step_error(
            Phase::Configure,
            None,
            format!("Cannot resolve {}: {e}", path.display()),
        )
    })
}

/// cmake runs inside the build dir, so relative directories must be
/// anchored to the invoking directory first.
fn anchored(config: &BuildConfig) -> Result<BuildConfig> {
    let mut anchored = config.clone();
    anchored.source_dir = absolute(&config.source_dir)?;
    anchored.build_dir = absolute(&config.build_dir)?;
    Ok(anchored)
}

fn step_error(phase: Phase, status: Option<i32>, detail: String) -> RcpError {
    match phase {
        Phase::Build => RcpError::BuildFailed { status, detail },
        _ => RcpError::ConfigureFailed { status, detail },
    }
}

fn tail(text: &str, lines: usize) -> String {
    let all: Vec<&str> = text.lines().collect();
    let start = all.len().saturating_sub(lines);
    all[start..].join("\n")
}

fn run_step(
    phase: Phase,
    program: &Path,
    args: &[String],
    cwd: &Path,
    env: &BuildEnvironment,
) -> Result<()> {
    debug!("Running {} {}", program.display(), args.join(" "));
    let mut cmd = Command::new(program);
    cmd.args(args).current_dir(cwd);
    env.apply_to_command(&mut cmd);

    let output = cmd.output().map_err(|e| {
        step_error(
            phase,
            None,
            format!("Failed to execute {}: {e}", program.display()),
        )
    })?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    if !output.status.success() {
        debug!("cmake {} failed with status: {}", phase, output.status);
        debug!("cmake {} stdout:\n{}", phase, stdout);
        debug!("cmake {} stderr:\n{}", phase, stderr);
        let detail = if stderr.trim().is_empty() {
            tail(&stdout, STDERR_TAIL_LINES)
        } else {
            tail(&stderr, STDERR_TAIL_LINES)
        };
        return Err(step_error(phase, output.status.code(), detail));
    }
    debug!("cmake {} stdout:\n{}", phase, stdout);
    debug!("cmake {} stderr:\n{}", phase, stderr);
    Ok(())
}

impl BuildDriver for CMakeDriver {
    fn configure(
        &self,
        dependencies: &ResolvedGraph,
        options: &OptionOverrides,
        config: &BuildConfig,
    ) -> Result<BuildPlan> {
        let config = anchored(config)?;
        let config = &config;
        info!("==> Running cmake configuration in {}", config.build_dir.display());
        let program = self.locate()?;
        fs::create_dir_all(&config.build_dir).map_err(|e| {
            step_error(
                Phase::Configure,
                None,
                format!("Cannot create {}: {e}", config.build_dir.display()),
            )
        })?;

        let buildinfo = config.build_dir.join(CMAKE_BUILDINFO);
        let buildinfo = buildinfo.is_file().then_some(buildinfo);
        let args = configure_args(dependencies, options, config, buildinfo.as_deref());
        let env = BuildEnvironment::for_graph(dependencies)?;

        run_step(Phase::Configure, &program, &args, &config.build_dir, &env)?;

        let mut plan = BuildPlan::new(program, config);
        plan.configure_args = args;
        plan.env = env;
        Ok(plan)
    }

    fn build(&self, plan: &BuildPlan) -> Result<()> {
        info!("==> Running cmake build in {}", plan.build_dir.display());
        let args = build_args(plan);
        run_step(Phase::Build, &plan.program, &args, &plan.build_dir, &plan.env)?;
        debug!("CMake build completed successfully.");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::BuildType;
    use crate::test_support::sample_graph;

    fn sample_config(root: &Path) -> BuildConfig {
        let mut config = BuildConfig::new(root.join("src"), root.join("build"));
        config.build_type = BuildType::Debug;
        config.generator = Some("Ninja".to_string());
        config.jobs = Some(4);
        config.defines = vec![("BENCHMARK".to_string(), "ON".to_string())];
        config
    }

    #[test]
    fn configure_args_carry_options_and_prefixes() {
        let root = tempfile::tempdir().unwrap();
        let graph = sample_graph(root.path());
        let config = sample_config(root.path());
        let buildinfo = config.build_dir.join(CMAKE_BUILDINFO);
        let args = configure_args(&graph, &graph.overrides, &config, Some(&buildinfo));

        assert_eq!(&args[0], "-S");
        assert_eq!(&args[2], "-B");
        assert!(args.windows(2).any(|w| w[0] == "-G" && w[1] == "Ninja"));
        assert!(args.contains(&"-DCMAKE_BUILD_TYPE=Debug".to_string()));
        assert!(args.contains(&"-DRCP_OPTION_FFTW_SHARED=False".to_string()));
        assert!(args.contains(&"-DBENCHMARK=ON".to_string()));
        assert!(args
            .iter()
            .any(|a| a.starts_with("-DRCP_BUILDINFO=") && a.ends_with(CMAKE_BUILDINFO)));

        let prefix = args
            .iter()
            .find_map(|a| a.strip_prefix("-DCMAKE_PREFIX_PATH="))
            .unwrap();
        assert_eq!(prefix.split(';').count(), 2);
    }

    #[test]
    fn build_args_forward_config_and_jobs() {
        let root = tempfile::tempdir().unwrap();
        let config = sample_config(root.path());
        let plan = BuildPlan::new("cmake", &config);
        assert_eq!(
            build_args(&plan),
            vec![
                "--build".to_string(),
                config.build_dir.display().to_string(),
                "--config".to_string(),
                "Debug".to_string(),
                "--parallel".to_string(),
                "4".to_string(),
            ]
        );
    }

    #[test]
    fn missing_program_is_a_configure_error() {
        let root = tempfile::tempdir().unwrap();
        let graph = sample_graph(root.path());
        let driver = CMakeDriver::with_program(root.path().join("no-such-cmake"));
        let err = driver
            .configure(&graph, &graph.overrides, &sample_config(root.path()))
            .unwrap_err();
        assert_eq!(err.phase(), Some(Phase::Configure));
    }

    #[test]
    fn tail_keeps_last_lines() {
        assert_eq!(tail("a\nb\nc\n", 2), "b\nc");
        assert_eq!(tail("only", 5), "only");
    }

    #[cfg(unix)]
    mod fake_cmake {
        use std::os::unix::fs::PermissionsExt;

        use serial_test::serial;

        use super::*;

        /// Writes a stand-in cmake that logs its arguments and exits with the
        /// given codes for configure and build.
        fn fake_cmake(dir: &Path, configure_exit: i32, build_exit: i32) -> (PathBuf, PathBuf) {
            let log = dir.join("cmake.log");
            let script = dir.join("cmake");
            fs::write(
                &script,
                format!(
                    "#!/bin/sh\n\
                     echo \"$@\" >> '{log}'\n\
                     if [ \"$1\" = \"--build\" ]; then\n  \
                       echo 'link error' >&2\n  \
                       exit {build_exit}\n\
                     fi\n\
                     echo \"CMAKE_PREFIX_PATH=$CMAKE_PREFIX_PATH\" >> '{log}'\n\
                     exit {configure_exit}\n",
                    log = log.display(),
                ),
            )
            .unwrap();
            fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
            (script, log)
        }

        #[test]
        #[serial]
        fn configure_then_build_succeeds() {
            let root = tempfile::tempdir().unwrap();
            let (script, log) = fake_cmake(root.path(), 0, 0);
            let graph = sample_graph(root.path());
            let config = sample_config(root.path());
            let driver = CMakeDriver::with_program(&script);

            let plan = driver
                .configure(&graph, &graph.overrides, &config)
                .unwrap();
            assert!(config.build_dir.is_dir());
            assert_eq!(plan.program, script);
            driver.build(&plan).unwrap();

            let logged = fs::read_to_string(&log).unwrap();
            let lines: Vec<&str> = logged.lines().collect();
            assert_eq!(lines.len(), 3);
            assert!(lines[0].starts_with("-S "));
            assert!(lines[0].contains("-DRCP_OPTION_FFTW_SHARED=False"));
            assert!(lines[1].starts_with("CMAKE_PREFIX_PATH="));
            assert!(lines[1].contains("fftw"));
            assert!(lines[2].starts_with("--build "));
        }

        #[test]
        #[serial]
        fn configure_failure_propagates_exit_code() {
            let root = tempfile::tempdir().unwrap();
            let (script, _log) = fake_cmake(root.path(), 7, 0);
            let graph = sample_graph(root.path());
            let driver = CMakeDriver::with_program(&script);

            let err = driver
                .configure(&graph, &graph.overrides, &sample_config(root.path()))
                .unwrap_err();
            assert!(matches!(
                err,
                RcpError::ConfigureFailed {
                    status: Some(7),
                    ..
                }
            ));
        }

        #[test]
        #[serial]
        fn build_failure_carries_stderr() {
            let root = tempfile::tempdir().unwrap();
            let (script, _log) = fake_cmake(root.path(), 0, 2);
            let graph = sample_graph(root.path());
            let driver = CMakeDriver::with_program(&script);

            let plan = driver
                .configure(&graph, &graph.overrides, &sample_config(root.path()))
                .unwrap();
            match driver.build(&plan) {
                Err(RcpError::BuildFailed { status, detail }) => {
                    assert_eq!(status, Some(2));
                    assert_eq!(detail, "link error");
                }
                other => panic!("expected BuildFailed, got {other:?}"),
            }
        }

        #[test]
        #[serial]
        fn relative_dirs_resolve_against_the_invoking_directory() {
            let root = tempfile::tempdir().unwrap();
            let project = root.path().join("proj");
            fs::create_dir_all(&project).unwrap();
            fs::write(project.join("CMakeLists.txt"), "project(myproject)\n").unwrap();
            // fails like cmake when -S or --build do not point where expected
            let script = root.path().join("cmake");
            fs::write(
                &script,
                "#!/bin/sh\n\
                 if [ \"$1\" = \"-S\" ] && [ ! -f \"$2/CMakeLists.txt\" ]; then\n  \
                   echo \"CMake Error: $2 does not contain CMakeLists.txt\" >&2\n  \
                   exit 1\n\
                 fi\n\
                 if [ \"$1\" = \"--build\" ] && [ ! -d \"$2\" ]; then\n  \
                   echo \"Error: $2 is not a directory\" >&2\n  \
                   exit 1\n\
                 fi\n\
                 exit 0\n",
            )
            .unwrap();
            fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();

            let previous = std::env::current_dir().unwrap();
            std::env::set_current_dir(root.path()).unwrap();
            let here = std::env::current_dir().unwrap();
            let graph = sample_graph(&here);
            let driver = CMakeDriver::with_program("./cmake");
            let result = driver
                .configure(
                    &graph,
                    &graph.overrides,
                    &BuildConfig::new("proj", "proj/build"),
                )
                .and_then(|plan| driver.build(&plan).map(|()| plan));
            std::env::set_current_dir(previous).unwrap();

            let plan = result.unwrap();
            assert_eq!(plan.program, here.join("cmake"));
            assert_eq!(plan.source_dir, here.join("proj"));
            assert_eq!(plan.build_dir, here.join("proj").join("build"));
            assert!(plan.build_dir.is_dir());
        }
    }
}
