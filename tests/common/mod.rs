//! Common test utilities for minishell integration tests

use assert_cmd::Command;

/// A minishell command with history and logging disabled
pub fn shell() -> Command {
    let mut cmd = Command::cargo_bin("minishell").unwrap();
    cmd.env("MINISHELL_HISTORY", "")
        .env("MINISHELL_LOG", "off")
        .env_remove("MINISHELL_PROMOTE_ON_CONTINUE")
        .timeout(std::time::Duration::from_secs(20));
    cmd
}

/// Feed `lines` to an interactive minishell session on stdin
pub fn run_script(lines: &[&str]) -> assert_cmd::assert::Assert {
    let mut script = lines.join("\n");
    script.push('\n');
    shell().write_stdin(script).assert()
}

/// Stdout of a scripted session that must succeed
#[allow(dead_code)]
pub fn script_output(lines: &[&str]) -> String {
    let output = run_script(lines).success().get_output().stdout.clone();
    String::from_utf8_lossy(&output).into_owned()
}

/// A live minishell session fed line by line, for tests that signal the shell
#[allow(dead_code)]
pub struct Session {
    child: std::process::Child,
    stdin: Option<std::process::ChildStdin>,
}

#[allow(dead_code)]
impl Session {
    pub fn start() -> Self {
        use std::process::Stdio;

        let mut child = std::process::Command::new(assert_cmd::cargo::cargo_bin("minishell"))
            .env("MINISHELL_HISTORY", "")
            .env("MINISHELL_LOG", "off")
            .env_remove("MINISHELL_PROMOTE_ON_CONTINUE")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .unwrap();
        let stdin = child.stdin.take();
        let session = Session { child, stdin };
        // Let the shell install its handlers before any signal is sent
        pause(300);
        session
    }

    /// Send one input line
    pub fn send(&mut self, line: &str) {
        use std::io::Write;

        let stdin = self.stdin.as_mut().unwrap();
        writeln!(stdin, "{}", line).unwrap();
        stdin.flush().unwrap();
    }

    /// Deliver `signal` to the shell process itself
    pub fn signal(&self, signal: nix::sys::signal::Signal) {
        let pid = nix::unistd::Pid::from_raw(self.child.id() as i32);
        nix::sys::signal::kill(pid, signal).unwrap();
    }

    /// Close stdin and collect stdout once the shell and its children are done
    pub fn finish(mut self) -> String {
        drop(self.stdin.take());
        let output = self.child.wait_with_output().unwrap();
        assert!(output.status.success(), "shell exited with {}", output.status);
        String::from_utf8_lossy(&output.stdout).into_owned()
    }
}

/// Sleep for `ms` milliseconds
pub fn pause(ms: u64) {
    std::thread::sleep(std::time::Duration::from_millis(ms));
}
