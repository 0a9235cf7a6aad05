//! Post-render command execution.
//!
//! The command after `--` runs once every template has rendered. Stencil
//! waits for it, forwarding SIGINT, SIGTERM, SIGHUP, SIGQUIT, SIGUSR1 and
//! SIGUSR2, and exits with the child's status.

use std::process::ExitStatus;

use anyhow::{Context, Result};
use tokio::process::{Child, Command};

/// Run `command` to completion and return the exit code to propagate.
pub fn run(command: &[String]) -> Result<u8> {
    let (program, args) = command
        .split_first()
        .context("no command given after --")?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    runtime.block_on(async {
        let mut child = Command::new(program)
            .args(args)
            .spawn()
            .with_context(|| format!("failed to start '{program}'"))?;
        tracing::debug!("started {program} (pid {:?})", child.id());

        let status = wait_forwarding_signals(&mut child)
            .await
            .with_context(|| format!("failed waiting for '{program}'"))?;
        Ok::<_, anyhow::Error>(exit_code(status))
    })
}

#[cfg(unix)]
async fn wait_forwarding_signals(child: &mut Child) -> Result<ExitStatus> {
    use nix::sys::signal::{kill, Signal};
    use nix::unistd::Pid;
    use tokio::signal::unix::{signal, SignalKind};

    let forwarded = [
        (SignalKind::interrupt(), Signal::SIGINT),
        (SignalKind::terminate(), Signal::SIGTERM),
        (SignalKind::hangup(), Signal::SIGHUP),
        (SignalKind::quit(), Signal::SIGQUIT),
        (SignalKind::user_defined1(), Signal::SIGUSR1),
        (SignalKind::user_defined2(), Signal::SIGUSR2),
    ];

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    for (kind, sig) in forwarded {
        let mut stream = signal(kind).context("failed to install signal handler")?;
        let tx = tx.clone();
        tokio::spawn(async move {
            while stream.recv().await.is_some() {
                if tx.send(sig).is_err() {
                    break;
                }
            }
        });
    }
    drop(tx);

    let pid = child.id().and_then(|id| i32::try_from(id).ok());
    loop {
        tokio::select! {
            status = child.wait() => return Ok(status?),
            Some(sig) = rx.recv() => {
                let Some(pid) = pid else {
                    continue;
                };
                tracing::debug!("forwarding {} to pid {pid}", sig.as_str());
                if let Err(e) = kill(Pid::from_raw(pid), sig) {
                    tracing::warn!("failed to forward {}: {e}", sig.as_str());
                }
            }
        }
    }
}

#[cfg(not(unix))]
async fn wait_forwarding_signals(child: &mut Child) -> Result<ExitStatus> {
    Ok(child.wait().await?)
}

/// The child's exit code; death by signal N maps to 128 + N.
fn exit_code(status: ExitStatus) -> u8 {
    if let Some(code) = status.code() {
        return u8::try_from(code).unwrap_or(1);
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(sig) = status.signal() {
            return u8::try_from(128 + sig).unwrap_or(1);
        }
    }
    1
}
