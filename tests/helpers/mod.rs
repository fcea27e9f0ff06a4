use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::os::unix::process::ExitStatusExt;
use std::process::ExitStatus;
use std::sync::Mutex;

use anyhow::Result;
use camino::{Utf8Path, Utf8PathBuf};
use swapctl::executor::{CommandExecutor, CommandSpec, ExecutionResult};
use swapctl::swap::SwapPaths;
use tempfile::TempDir;

pub const MEMINFO: &str = "MemTotal:        2048000 kB\nMemFree:          512000 kB\n";
pub const PROC_SWAPS_HEADER: &str = "Filename\t\t\t\tType\t\tSize\t\tUsed\t\tPriority\n";
pub const FSTAB: &str = "UUID=1234-abcd / ext4 defaults 1 1\n";

/// Builds an exit status carrying `code`.
#[allow(dead_code)]
pub fn exit_status(code: i32) -> ExitStatus {
    ExitStatus::from_raw(code << 8)
}

/// Temporary stand-ins for `/etc/fstab`, `/proc/swaps` and `/proc/meminfo`.
pub struct HostFixture {
    _dir: TempDir,
    pub root: Utf8PathBuf,
    pub paths: SwapPaths,
}

#[allow(dead_code)]
impl HostFixture {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf())
            .expect("temp dir path should be UTF-8");
        let paths = SwapPaths {
            fstab: root.join("fstab"),
            proc_swaps: root.join("swaps"),
            meminfo: root.join("meminfo"),
        };
        fs::write(&paths.fstab, FSTAB).unwrap();
        fs::write(&paths.proc_swaps, PROC_SWAPS_HEADER).unwrap();
        fs::write(&paths.meminfo, MEMINFO).unwrap();
        Self {
            _dir: dir,
            root,
            paths,
        }
    }

    pub fn swapfile(&self) -> Utf8PathBuf {
        self.root.join("swapfile")
    }

    pub fn fstab(&self) -> String {
        fs::read_to_string(&self.paths.fstab).unwrap()
    }

    pub fn proc_swaps(&self) -> String {
        fs::read_to_string(&self.paths.proc_swaps).unwrap()
    }
}

/// Records executed commands and returns scripted results without running anything.
pub struct MockExecutor {
    calls: Mutex<Vec<Vec<String>>>,
    /// If set, the command with this name exits with the given code and stderr.
    failure: Option<(String, i32, String)>,
}

#[allow(dead_code)]
impl MockExecutor {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            failure: None,
        }
    }

    pub fn failing(command: &str, code: i32, stderr: &str) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            failure: Some((command.to_string(), code, stderr.to_string())),
        }
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }

    pub fn commands(&self) -> Vec<String> {
        self.calls().into_iter().map(|argv| argv[0].clone()).collect()
    }
}

impl CommandExecutor for MockExecutor {
    fn execute(&self, spec: &CommandSpec) -> Result<ExecutionResult> {
        self.calls.lock().unwrap().push(spec.argv());
        if let Some((command, code, stderr)) = &self.failure {
            if *command == spec.command {
                return Ok(ExecutionResult {
                    status: Some(exit_status(*code)),
                    stdout: String::new(),
                    stderr: stderr.clone(),
                });
            }
        }
        Ok(ExecutionResult::default())
    }
}

/// Applies the side effects of the swap tools to a [`HostFixture`].
///
/// - `fallocate`/`dd` create the file
/// - `file` reports "swap file" once `mkswap` has run on the path
/// - `swapon` appends the path to the fixture's `/proc/swaps`
pub struct SimulatedHost {
    calls: Mutex<Vec<Vec<String>>>,
    formatted: Mutex<HashSet<String>>,
    proc_swaps: Utf8PathBuf,
    failure: Option<(String, i32, String)>,
}

#[allow(dead_code)]
impl SimulatedHost {
    pub fn new(fixture: &HostFixture) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            formatted: Mutex::new(HashSet::new()),
            proc_swaps: fixture.paths.proc_swaps.clone(),
            failure: None,
        }
    }

    pub fn failing(fixture: &HostFixture, command: &str, code: i32, stderr: &str) -> Self {
        Self {
            failure: Some((command.to_string(), code, stderr.to_string())),
            ..Self::new(fixture)
        }
    }

    /// Marks `path` as already carrying a swap signature.
    pub fn mark_formatted(&self, path: &Utf8Path) {
        self.formatted.lock().unwrap().insert(path.to_string());
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }

    pub fn commands(&self) -> Vec<String> {
        self.calls().into_iter().map(|argv| argv[0].clone()).collect()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }
}

impl CommandExecutor for SimulatedHost {
    fn execute(&self, spec: &CommandSpec) -> Result<ExecutionResult> {
        self.calls.lock().unwrap().push(spec.argv());

        if let Some((command, code, stderr)) = &self.failure {
            if *command == spec.command {
                return Ok(ExecutionResult {
                    status: Some(exit_status(*code)),
                    stdout: String::new(),
                    stderr: stderr.clone(),
                });
            }
        }

        let mut stdout = String::new();
        match spec.command.as_str() {
            "/usr/bin/fallocate" => {
                let path = spec.args.last().expect("fallocate needs a path");
                fs::write(path, b"")?;
            }
            "/bin/dd" => {
                let path = spec
                    .args
                    .iter()
                    .find_map(|a| a.strip_prefix("of="))
                    .expect("dd needs of=");
                fs::write(path, b"")?;
            }
            "/usr/bin/file" => {
                let path = spec.args.last().expect("file needs a path");
                let brief = spec.args.iter().any(|a| a == "-b");
                let kind = if self.formatted.lock().unwrap().contains(path) {
                    "Linux/i386 swap file (new style), version 1"
                } else {
                    "data"
                };
                stdout = if brief {
                    format!("{}\n", kind)
                } else {
                    format!("{}: {}\n", path, kind)
                };
            }
            "/sbin/mkswap" => {
                self.formatted.lock().unwrap().insert(spec.args[0].clone());
            }
            "/sbin/swapon" => {
                let mut swaps = OpenOptions::new().append(true).open(&self.proc_swaps)?;
                writeln!(swaps, "{}                               file\t\t2047996\t\t0\t\t-2", spec.args[0])?;
            }
            other => anyhow::bail!("unexpected command: {}", other),
        }

        Ok(ExecutionResult {
            status: Some(exit_status(0)),
            stdout,
            stderr: String::new(),
        })
    }
}
