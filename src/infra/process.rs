//! # Process Management Module / 进程管理模块
//!
//! The launch/attach primitives the adapters and the bench matrix drive
//! targets through: spawning with captured output, detached launches
//! returning a live handle, bounded readiness waits, and the
//! graceful-then-hard shutdown sequence.
//!
//! 适配器和基准矩阵驱动目标所用的启动/附加原语：
//! 带输出捕获的派生、返回活句柄的分离式启动、有界就绪等待，
//! 以及先温和后强制的关停序列。

use anyhow::{Context, Result};
use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};
use tokio::time::Instant;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::IntervalStream;

/// Builds a `tokio::process::Command` from a configured command line.
/// The line is environment-expanded and shell-split; the command is
/// marked kill-on-drop so an abandoned handle cannot leak a process.
///
/// 从配置的命令行构建 `tokio::process::Command`。
/// 命令行先做环境变量展开再做 shell 拆分；命令标记为 kill-on-drop，
/// 被丢弃的句柄不会泄漏进程。
pub fn build_command(command_line: &str, cwd: Option<&Path>) -> Result<Command> {
    let expanded = shellexpand::full(command_line)
        .with_context(|| format!("Failed to expand command: {command_line}"))?
        .to_string();

    let parts = shlex::split(&expanded)
        .ok_or_else(|| anyhow::anyhow!("Failed to parse command: {}", expanded))?;
    if parts.is_empty() {
        return Err(anyhow::anyhow!("Empty command after parsing."));
    }

    let mut cmd = Command::new(&parts[0]);
    cmd.args(&parts[1..]).kill_on_drop(true);
    if let Some(dir) = cwd {
        cmd.current_dir(dir);
    }
    Ok(cmd)
}

/// Launches a target process detached from our stdio, returning the
/// live handle. The caller owns the handle and is responsible for
/// shutting it down.
///
/// 以与我们的标准流分离的方式启动目标进程，返回活句柄。
/// 调用方拥有该句柄并负责将其关停。
pub fn launch_detached(mut cmd: Command) -> Result<Child> {
    cmd.stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());
    let child = cmd.spawn().context("Failed to launch target process")?;
    Ok(child)
}

/// Bounded readiness wait: polls the child during the startup window
/// and reports `false` if it exits before the window closes; a target
/// that dies during startup is not ready.
///
/// 有界就绪等待：在启动窗口内轮询子进程，
/// 若其在窗口关闭前退出则报告 `false`；启动期间死亡的目标不算就绪。
pub async fn wait_ready(child: &mut Child, window: Duration) -> bool {
    let deadline = Instant::now() + window;
    let mut ticks = IntervalStream::new(tokio::time::interval(Duration::from_millis(100)));
    while ticks.next().await.is_some() {
        if let Ok(Some(_status)) = child.try_wait() {
            return false;
        }
        if Instant::now() >= deadline {
            return true;
        }
    }
    true
}

/// Shuts a target process down: a grace window for it to exit on its
/// own once the session lets go, then a hard kill. The tokio handle
/// only exposes a hard kill, so the grace window is the polite half of
/// the sequence.
///
/// 关停目标进程：先给一个宽限窗口让其在会话放手后自行退出，
/// 然后强制终止。tokio 句柄只提供强制终止，
/// 宽限窗口就是这个序列中温和的那一半。
pub async fn shutdown_child(mut child: Child, grace: Duration) {
    if tokio::time::timeout(grace, child.wait()).await.is_err() {
        let _ = child.start_kill();
        let _ = child.wait().await;
    }
}

/// Spawns a command, captures its stdout and stderr.
/// The output streams are read concurrently and combined into a single
/// string.
///
/// 派生一个命令，捕获其 stdout 和 stderr。
/// 输出流被并发读取并合并到一个字符串中。
///
/// # Returns / 返回值
/// A tuple containing:
/// - The `ExitStatus` of the process wrapped in an `io::Result`.
/// - The combined stdout and stderr as a `String`.
///
/// 一个元组，包含：
/// - 进程的 `ExitStatus`（包装在 `io::Result` 中）。
/// - 合并的 stdout 和 stderr，为一个 `String`。
pub async fn spawn_and_capture(
    mut cmd: Command,
) -> (std::io::Result<std::process::ExitStatus>, String) {
    let mut child = match cmd
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
    {
        Ok(child) => child,
        Err(e) => {
            // If spawning fails, we return the error and an empty string
            // for the output.
            // 如果派生失败，我们返回错误和空字符串作为输出。
            return (Err(e), String::new());
        }
    };

    let stdout = match child.stdout.take() {
        Some(stdout) => stdout,
        None => {
            return (
                Err(std::io::Error::other("Failed to capture stdout")),
                String::new(),
            );
        }
    };
    let stderr = match child.stderr.take() {
        Some(stderr) => stderr,
        None => {
            return (
                Err(std::io::Error::other("Failed to capture stderr")),
                String::new(),
            );
        }
    };

    // Use an Arc<Mutex<String>> to allow concurrent writes from stdout
    // and stderr tasks.
    // 使用 Arc<Mutex<String>> 来允许多个任务（stdout 和 stderr）并发写入。
    let output = Arc::new(tokio::sync::Mutex::new(String::new()));

    let stdout_output = Arc::clone(&output);
    let stdout_handle = tokio::spawn(async move {
        let reader = BufReader::new(stdout);
        let mut lines = reader.lines();
        while let Ok(Some(line)) = lines.next_line().await {
            let mut output = stdout_output.lock().await;
            output.push_str(&line);
            output.push('\n');
        }
    });

    let stderr_output = Arc::clone(&output);
    let stderr_handle = tokio::spawn(async move {
        let reader = BufReader::new(stderr);
        let mut lines = reader.lines();
        while let Ok(Some(line)) = lines.next_line().await {
            let mut output = stderr_output.lock().await;
            output.push_str(&line);
            output.push('\n');
        }
    });

    // Wait for the process to exit, then for both readers, so all
    // output is captured.
    // 先等待进程退出，再等待两个读取任务，以确保所有输出都被捕获。
    let status = child.wait().await;

    if let Err(e) = stdout_handle.await {
        eprintln!("Failed to join stdout task: {}", e);
    }
    if let Err(e) = stderr_handle.await {
        eprintln!("Failed to join stderr task: {}", e);
    }

    (status, output.lock().await.clone())
}
