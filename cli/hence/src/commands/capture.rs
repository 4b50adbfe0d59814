//! `hence capture` — screenshot a running web app via the Playwright CLI
//!
//! Shells out to `npx playwright screenshot` so the user doesn't need a
//! browser automation stack wired into this binary.

use std::process::Output;
use std::time::Duration;

use anyhow::{Result, bail};
use clap::Args;
use tokio::process::Command;

/// Hard cap on how long the Playwright subprocess may run
const CAPTURE_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Args)]
pub struct CaptureArgs {
    /// URL to capture
    pub url: String,

    /// Output filename
    #[arg(long, default_value = "screenshot.png")]
    pub output: String,

    /// Wait time in ms after page load
    #[arg(long, default_value_t = 2000)]
    pub wait: u64,
}

pub async fn run(args: CaptureArgs) -> Result<()> {
    println!("Capturing {} → {}", args.url, args.output);

    let mut cmd = Command::new("npx");
    cmd.args([
        "playwright",
        "screenshot",
        "--wait-for-timeout",
        &args.wait.to_string(),
        &args.url,
        &args.output,
    ]);

    let output = run_command(cmd, CAPTURE_TIMEOUT).await?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!("playwright error: {}", stderr.trim());
    }

    println!("Saved: {}", args.output);
    Ok(())
}

/// Run the subprocess under a deadline. The child must not outlive a
/// timeout, so the dropped future kills it rather than detaching it.
async fn run_command(mut cmd: Command, limit: Duration) -> Result<Output> {
    cmd.kill_on_drop(true);
    match tokio::time::timeout(limit, cmd.output()).await {
        Err(_) => bail!("Playwright command timed out."),
        Ok(Err(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            bail!("npx not found. Ensure Node.js is installed.")
        }
        Ok(Err(e)) => bail!("running playwright: {e}"),
        Ok(Ok(output)) => Ok(output),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_program_reports_install_hint() {
        let cmd = Command::new("hence-test-no-such-program");
        let err = run_command(cmd, CAPTURE_TIMEOUT).await.unwrap_err();
        assert!(err.to_string().contains("npx not found"), "got: {err}");
    }

    #[tokio::test]
    async fn deadline_expiry_is_reported_as_timeout() {
        let mut cmd = Command::new("sleep");
        cmd.arg("30");
        let err = run_command(cmd, Duration::from_millis(100))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("timed out"), "got: {err}");
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn timed_out_child_does_not_outlive_the_call() {
        let pid_file = std::env::temp_dir().join(format!(
            "hence-capture-test-{}.pid",
            std::process::id()
        ));
        let mut cmd = Command::new("sh");
        cmd.arg("-c")
            .arg(format!("echo $$ > {} && sleep 30", pid_file.display()));

        let err = run_command(cmd, Duration::from_millis(200))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("timed out"), "got: {err}");

        // Give the runtime a moment to deliver the kill and reap
        tokio::time::sleep(Duration::from_millis(300)).await;
        let pid: u32 = std::fs::read_to_string(&pid_file)
            .unwrap()
            .trim()
            .parse()
            .unwrap();
        std::fs::remove_file(&pid_file).ok();

        // Killed means fully reaped (no /proc entry) or a zombie awaiting reap
        let running = std::fs::read_to_string(format!("/proc/{pid}/stat"))
            .is_ok_and(|stat| !stat.contains(") Z"));
        assert!(!running, "child pid {pid} survived the timeout");
    }
}
