// ABOUTME: Interactive shell channel on an authenticated russh connection.
// ABOUTME: Bridges local stdin/stdout/stderr to the remote PTY until the channel closes.

use super::client::SshHandler;
use super::error::TransportError;
use super::launcher::SessionOutcome;
use super::terminal::RawModeGuard;
use russh::client::{Handle, Msg};
use russh::{Channel, ChannelMsg, Disconnect, Pty, Sig};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

/// Terminal requested from the server. Size is fixed for the whole session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PtyConfig {
    pub term: String,
    pub cols: u32,
    pub rows: u32,
}

impl Default for PtyConfig {
    fn default() -> Self {
        Self {
            term: "linux".to_string(),
            cols: 160,
            rows: 32,
        }
    }
}

const TERMINAL_SPEED: u32 = 14400;

/// Open a session channel, request the PTY, and start the login shell.
pub(super) async fn start(
    handle: Handle<SshHandler>,
    pty: &PtyConfig,
    forward_stdin: bool,
) -> Result<ShellSession, TransportError> {
    let mut channel = handle
        .channel_open_session()
        .await
        .map_err(|e| TransportError::SessionOpen(e.to_string()))?;

    let modes = [
        (Pty::TTY_OP_ISPEED, TERMINAL_SPEED),
        (Pty::TTY_OP_OSPEED, TERMINAL_SPEED),
    ];
    channel
        .request_pty(true, &pty.term, pty.cols, pty.rows, 0, 0, &modes)
        .await
        .map_err(|e| TransportError::PtyRequest(e.to_string()))?;
    wait_for_reply(&mut channel)
        .await
        .map_err(TransportError::PtyRequest)?;
    tracing::debug!(term = %pty.term, cols = pty.cols, rows = pty.rows, "pty allocated");

    channel
        .request_shell(true)
        .await
        .map_err(|e| TransportError::ShellStart(e.to_string()))?;
    wait_for_reply(&mut channel)
        .await
        .map_err(TransportError::ShellStart)?;
    tracing::debug!("shell started");

    Ok(ShellSession {
        handle,
        channel,
        forward_stdin,
    })
}

/// Wait for the server's answer to a request sent with `want_reply`.
async fn wait_for_reply(channel: &mut Channel<Msg>) -> Result<(), String> {
    loop {
        match channel.wait().await {
            Some(ChannelMsg::Success) => return Ok(()),
            Some(ChannelMsg::Failure) => return Err("request refused by server".to_string()),
            Some(ChannelMsg::Close) | None => {
                return Err("channel closed before reply".to_string());
            }
            Some(_) => {}
        }
    }
}

/// A running remote shell.
pub struct ShellSession {
    handle: Handle<SshHandler>,
    channel: Channel<Msg>,
    forward_stdin: bool,
}

impl std::fmt::Debug for ShellSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShellSession")
            .field("handle", &"<russh::Handle>")
            .field("channel", &self.channel.id())
            .field("forward_stdin", &self.forward_stdin)
            .finish()
    }
}

impl ShellSession {
    /// Bridge the local terminal to the shell and block until the remote side closes.
    pub(super) async fn attach(self) -> Result<SessionOutcome, TransportError> {
        let ShellSession {
            handle,
            mut channel,
            forward_stdin,
        } = self;

        let raw_mode = if forward_stdin {
            RawModeGuard::enter_if_tty().map_err(TransportError::Terminal)?
        } else {
            None
        };
        let result = bridge(&mut channel, forward_stdin).await;
        drop(raw_mode);

        if let Err(e) = handle
            .disconnect(Disconnect::ByApplication, "", "en")
            .await
        {
            tracing::debug!("disconnect after shell exit failed: {}", e);
        }

        match result? {
            ShellExit::Signal(name) => Err(TransportError::RemoteSignal(name)),
            ShellExit::Status(code) if code != 0 => Err(TransportError::RemoteExit(code)),
            ShellExit::Status(code) => Ok(SessionOutcome {
                exit_status: Some(code),
            }),
            ShellExit::Unreported => Ok(SessionOutcome { exit_status: None }),
        }
    }
}

/// How the remote shell reported its end.
#[derive(Debug, PartialEq, Eq)]
enum ShellExit {
    Status(u32),
    Signal(String),
    Unreported,
}

fn signal_name(signal: &Sig) -> String {
    match signal {
        Sig::Custom(name) => name.clone(),
        other => format!("{other:?}"),
    }
}

/// Copy stdin to the channel and channel output to stdout/stderr.
/// A signal wins over an exit status if the server sends both.
async fn bridge(
    channel: &mut Channel<Msg>,
    forward_stdin: bool,
) -> Result<ShellExit, TransportError> {
    let wait_err = |e: std::io::Error| TransportError::Wait(e.to_string());

    let mut stdin = tokio::io::stdin();
    let mut stdout = tokio::io::stdout();
    let mut stderr = tokio::io::stderr();
    let mut buf = vec![0u8; 4096];
    let mut stdin_open = forward_stdin;
    let mut exit_status = None;
    let mut killed_by = None;

    loop {
        tokio::select! {
            read = stdin.read(&mut buf), if stdin_open => match read {
                Ok(0) => {
                    stdin_open = false;
                    channel
                        .eof()
                        .await
                        .map_err(|e| TransportError::Wait(e.to_string()))?;
                }
                Ok(n) => channel
                    .data(&buf[..n])
                    .await
                    .map_err(|e| TransportError::Wait(e.to_string()))?,
                Err(e) => return Err(wait_err(e)),
            },

            msg = channel.wait() => match msg {
                Some(ChannelMsg::Data { data }) => {
                    stdout.write_all(&data).await.map_err(wait_err)?;
                    stdout.flush().await.map_err(wait_err)?;
                }
                Some(ChannelMsg::ExtendedData { data, ext }) => {
                    if ext == 1 {
                        stderr.write_all(&data).await.map_err(wait_err)?;
                        stderr.flush().await.map_err(wait_err)?;
                    }
                }
                Some(ChannelMsg::ExitStatus { exit_status: code }) => {
                    exit_status = Some(code);
                }
                Some(ChannelMsg::ExitSignal { signal_name: signal, .. }) => {
                    tracing::debug!("remote shell killed by signal {:?}", signal);
                    killed_by = Some(signal_name(&signal));
                }
                Some(ChannelMsg::Close) | None => break,
                Some(_) => {}
            },
        }
    }

    Ok(match (killed_by, exit_status) {
        (Some(name), _) => ShellExit::Signal(name),
        (None, Some(code)) => ShellExit::Status(code),
        (None, None) => ShellExit::Unreported,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_signals_use_their_short_name() {
        assert_eq!(signal_name(&Sig::KILL), "KILL");
        assert_eq!(signal_name(&Sig::TERM), "TERM");
    }

    #[test]
    fn custom_signals_keep_the_server_name() {
        assert_eq!(signal_name(&Sig::Custom("XCPU".to_string())), "XCPU");
    }
}
