use crate::command::ExitCode;
use crate::error::DispatchError;
use crate::io_adapters::{ChildOutput, Stdout};
use log::debug;
use std::borrow::Cow;
use std::ffi::OsStr;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

/// A program to run in a child process, with its argument vector already
/// alias-expanded.
pub struct ExternalCommand {
    program: PathBuf,
    argv: Vec<String>,
}

impl ExternalCommand {
    /// Resolve `argv[0]` to an executable, the way [`find_command_path`] does.
    pub fn resolve(argv: Vec<String>, search_paths: &OsStr) -> Result<Self, DispatchError> {
        let name = argv.first().cloned().unwrap_or_default();
        let program = find_command_path(search_paths, Path::new(&name))
            .map(Cow::into_owned)
            .ok_or_else(|| DispatchError::NotFound(name.clone()))?;
        Ok(Self { program, argv })
    }

    /// Spawn the program and block until it terminates.
    ///
    /// With `redirect` the child's stdout is the given file; otherwise it
    /// shares `stdout` according to [`Stdout::child_output`].
    pub fn execute(
        self,
        redirect: Option<File>,
        stdout: &mut dyn Stdout,
    ) -> Result<ExitCode, DispatchError> {
        let capture = redirect.is_none() && stdout.child_output() == ChildOutput::Capture;
        let child_stdout = match redirect {
            Some(file) => Stdio::from(file),
            None if capture => Stdio::piped(),
            None => Stdio::inherit(),
        };

        stdout.flush()?;
        // `cmd` owns the redirect file; it is dropped here so only the child
        // keeps the descriptor open.
        let child = {
            let mut cmd = Command::new(&self.program);
            cmd.args(&self.argv[1..]).stdout(child_stdout);
            set_arg0(&mut cmd, &self.argv[0]);
            cmd.spawn().map_err(|e| self.spawn_error(e))?
        };
        debug!("spawned {} (pid {})", self.program.display(), child.id());

        let exit_status = if capture {
            let output = child.wait_with_output()?;
            stdout.write_all(&output.stdout)?;
            output.status
        } else {
            let mut child = child;
            child.wait()?
        };

        let code = match exit_status.code() {
            Some(x) => x,
            None => terminated_by_signal(exit_status),
        };
        debug!("{} exited with {}", self.argv[0], code);
        Ok(code)
    }

    /// Resource exhaustion means the child could not be created at all;
    /// anything else means the program itself could not be started.
    fn spawn_error(&self, e: io::Error) -> DispatchError {
        match e.kind() {
            io::ErrorKind::OutOfMemory | io::ErrorKind::WouldBlock => DispatchError::Fork(e),
            _ => {
                debug!("exec {} failed: {}", self.program.display(), e);
                DispatchError::NotFound(self.argv[0].clone())
            }
        }
    }
}

#[cfg(unix)]
fn set_arg0(cmd: &mut Command, arg0: &str) {
    use std::os::unix::process::CommandExt;
    cmd.arg0(arg0);
}

#[cfg(not(unix))]
fn set_arg0(_cmd: &mut Command, _arg0: &str) {}

#[cfg(unix)]
fn terminated_by_signal(exit_status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    if let Some(signal) = ExitStatusExt::signal(&exit_status) {
        128 + signal
    } else if ExitStatusExt::core_dumped(&exit_status) {
        255
    } else {
        -1
    }
}

#[cfg(not(unix))]
fn terminated_by_signal(_exit_status: ExitStatus) -> i32 {
    -1
}

/// Resolve a command path the way a typical shell would.
///
/// Behavior:
/// - Absolute path: returns it if it exists.
/// - Relative with multiple components (e.g., `bin/sh`): returns it if it exists.
/// - `./foo` on Unix or any `./`-prefixed path on other platforms: returns it if it exists.
/// - Single path component (no separators): search each directory in `search_paths` (PATH)
///   and return the first existing match, falling back to the current directory.
/// - Empty path: returns `None`.
pub fn find_command_path<'a>(search_paths: &OsStr, path: &'a Path) -> Option<Cow<'a, Path>> {
    if path.is_absolute() {
        return find_by_path(path).map(Cow::Borrowed);
    }

    let search_in_current_dir = cfg!(not(unix)) || path.starts_with("./");
    if search_in_current_dir && path.exists() {
        return Some(Cow::Borrowed(path));
    }

    let mut components = path.components();
    match (components.next(), components.next()) {
        (None, None) => None,
        (Some(x), None) => find_in_path(search_paths, x.as_os_str())
            .map(Cow::Owned)
            .or_else(|| find_by_path(path).map(Cow::Borrowed)),
        _ => find_by_path(path).map(Cow::Borrowed),
    }
}

fn find_in_path(search_paths: &OsStr, cmd: &OsStr) -> Option<PathBuf> {
    std::env::split_paths(search_paths)
        .map(|dir| dir.join(cmd))
        .find(|path| path.is_file())
}

fn find_by_path(path: &Path) -> Option<&Path> {
    if path.exists() { Some(path) } else { None }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io_adapters::MemWriter;
    use std::fs;
    use std::sync::{Mutex, MutexGuard, OnceLock};

    fn lock_current_dir() -> MutexGuard<'static, ()> {
        static MUTEX: OnceLock<Mutex<()>> = OnceLock::new();
        MUTEX
            .get_or_init(|| Mutex::new(()))
            .lock()
            .unwrap_or_else(|e| e.into_inner())
    }

    #[cfg(unix)]
    fn osstr(s: &str) -> &OsStr {
        OsStr::new(s)
    }

    fn argv(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    #[cfg(unix)]
    fn absolute_existing_true() {
        let path = Path::new("/bin/sh");
        let found = find_command_path(osstr("/bin"), path).expect("Expected to find /bin/sh");
        assert_eq!(found.as_ref(), path);
    }

    #[test]
    #[cfg(unix)]
    fn absolute_nonexisting() {
        let res = find_command_path(osstr("/bin"), Path::new("/bin/nonexisting"));
        assert!(res.is_none());
    }

    #[test]
    #[cfg(unix)]
    fn single_component_found_in_path() {
        let found = find_command_path(osstr("/does/not/exist:/bin"), Path::new("sh"))
            .expect("Expected to find 'sh' in /bin via PATH search");
        assert!(found.as_ref().starts_with("/bin"), "got {:?}", found);
        assert!(found.as_ref().ends_with("sh"));
    }

    #[test]
    #[cfg(unix)]
    fn single_component_not_found_in_path() {
        let res = find_command_path(osstr("/bin"), Path::new("nonexisting"));
        assert!(res.is_none());
    }

    #[test]
    #[cfg(unix)]
    fn empty_path_is_none() {
        assert!(find_command_path(osstr("/bin"), Path::new("")).is_none());
    }

    #[test]
    #[cfg(unix)]
    fn resolve_unknown_program_is_not_found() {
        let err = ExternalCommand::resolve(argv(&["no_such_program_xyz"]), osstr("/bin"))
            .err()
            .expect("should not resolve");
        assert_eq!(err.to_string(), "no_such_program_xyz: Command not found.");
    }

    #[test]
    #[cfg(unix)]
    fn execute_captures_output() {
        let cmd = ExternalCommand::resolve(argv(&["sh", "-c", "echo captured"]), osstr("/bin"))
            .unwrap();
        let (mut out, handle) = MemWriter::with_handle();
        let code = cmd.execute(None, &mut out).unwrap();

        assert_eq!(code, 0);
        assert_eq!(MemWriter::contents(&handle), "captured\n");
    }

    #[test]
    #[cfg(unix)]
    fn execute_reports_exit_code() {
        let cmd = ExternalCommand::resolve(argv(&["sh", "-c", "exit 3"]), osstr("/bin")).unwrap();
        let mut out = MemWriter::new();
        assert_eq!(cmd.execute(None, &mut out).unwrap(), 3);
    }

    #[test]
    #[cfg(unix)]
    fn execute_writes_to_redirect_file() {
        let path = std::env::temp_dir().join(format!("external_redirect_{}", std::process::id()));
        let file = File::create(&path).unwrap();
        let cmd = ExternalCommand::resolve(argv(&["sh", "-c", "echo to file"]), osstr("/bin"))
            .unwrap();
        let (mut out, handle) = MemWriter::with_handle();
        cmd.execute(Some(file), &mut out).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "to file\n");
        assert!(handle.borrow().is_empty());
        let _ = fs::remove_file(path);
    }

    #[test]
    #[cfg(unix)]
    fn execute_non_executable_is_not_found() {
        let path = std::env::temp_dir().join(format!("external_noexec_{}", std::process::id()));
        fs::write(&path, "not a program").unwrap();
        let name = path.to_string_lossy().to_string();

        let cmd = ExternalCommand::resolve(vec![name.clone()], osstr("/bin")).unwrap();
        let err = cmd.execute(None, &mut MemWriter::new()).err().expect("exec must fail");
        assert_eq!(err.to_string(), format!("{name}: Command not found."));
        let _ = fs::remove_file(path);
    }

    #[test]
    #[cfg(unix)]
    fn bare_name_found_in_current_dir() {
        let _lock = lock_current_dir();
        let cwd_before = std::env::current_dir().expect("cwd");
        let tmp_base =
            std::env::temp_dir().join(format!("external_tests_{}_bare", std::process::id()));
        let _ = fs::remove_dir_all(&tmp_base);
        fs::create_dir_all(&tmp_base).expect("create temp dir");
        File::create(tmp_base.join("myprog")).expect("touch myprog");

        std::env::set_current_dir(&tmp_base).expect("set cwd");
        let res = find_command_path(osstr("/does/not/exist"), Path::new("myprog"))
            .map(Cow::into_owned);
        std::env::set_current_dir(&cwd_before).ok();

        let found = res.expect("Expected to find 'myprog' in current dir");
        assert_eq!(found, Path::new("myprog"));
        let _ = fs::remove_dir_all(tmp_base);
    }

    #[test]
    #[cfg(unix)]
    fn path_search_wins_over_current_dir() {
        let _lock = lock_current_dir();
        let cwd_before = std::env::current_dir().expect("cwd");
        let tmp_base =
            std::env::temp_dir().join(format!("external_tests_{}_shadow", std::process::id()));
        let _ = fs::remove_dir_all(&tmp_base);
        fs::create_dir_all(&tmp_base).expect("create temp dir");
        File::create(tmp_base.join("sh")).expect("touch sh");

        std::env::set_current_dir(&tmp_base).expect("set cwd");
        let res = find_command_path(osstr("/bin"), Path::new("sh")).map(Cow::into_owned);
        std::env::set_current_dir(&cwd_before).ok();

        assert_eq!(res, Some(PathBuf::from("/bin/sh")));
        let _ = fs::remove_dir_all(tmp_base);
    }

    #[test]
    #[cfg(target_os = "linux")]
    fn redirect_file_is_not_held_by_parent() {
        let path = std::env::temp_dir().join(format!("external_fd_{}", std::process::id()));
        let file = File::create(&path).unwrap();
        // The child lists the parent's open descriptors into the redirect file.
        let cmd = ExternalCommand::resolve(
            argv(&["sh", "-c", "ls -l /proc/$PPID/fd"]),
            osstr("/bin"),
        )
        .unwrap();
        cmd.execute(Some(file), &mut MemWriter::new()).unwrap();

        let listing = fs::read_to_string(&path).unwrap();
        assert!(!listing.is_empty(), "child wrote nothing");
        assert!(
            !listing.contains(path.to_string_lossy().as_ref()),
            "parent still holds the redirect file:\n{listing}"
        );
        let _ = fs::remove_file(path);
    }
}
