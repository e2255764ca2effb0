// ABOUTME: Integration tests for the session launcher state machine.
// ABOUTME: Exercises both transports against stub programs and an in-process russh server.

use sshman::ssh::{
    AuthStrategy, CredentialError, Error, ExternalClient, HostKeyPolicy, NativeClient, PtyConfig,
    SessionLauncher, SessionState, Target, Transport, TransportError,
};
use sshman::store::Profile;
use sshman::types::Port;
use std::path::PathBuf;

fn password_profile(host: &str, port: u16) -> Profile {
    Profile::new("box", host, Port::new(u32::from(port)).unwrap(), "root").pass("pw")
}

fn default_key() -> PathBuf {
    PathBuf::from("/nonexistent/.ssh/id_rsa")
}

/// Port on localhost with nothing listening.
fn closed_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

mod target {
    use super::*;

    #[test]
    fn derived_from_profile() {
        let target = Target::from(&password_profile("10.0.0.5", 2222));

        assert_eq!(target.destination(), "root@10.0.0.5");
        assert_eq!(target.address(), "10.0.0.5:2222");
    }

    #[test]
    fn external_args_mirror_the_credential() {
        let target = Target::from(&password_profile("10.0.0.5", 22));
        let credential = AuthStrategy::Password("pw".to_string()).resolve().unwrap();

        assert_eq!(
            ExternalClient::args(&target, &credential),
            ["root@10.0.0.5", "-p", "22", "-p", "pw"]
        );
    }
}

mod resolving {
    use super::*;

    /// Test: Credential failure stops the launch before any transport is used.
    /// Expected: CredentialError, state Failed.
    #[tokio::test]
    async fn unreadable_default_key_fails_before_connecting() {
        let profile = Profile::new("box", "127.0.0.1", Port::SSH, "root");
        let transport = Transport::External(ExternalClient::new().program("/nonexistent/ssh"));
        let mut launcher = SessionLauncher::new(transport, default_key());

        let err = launcher.launch(&profile).await.unwrap_err();

        assert!(
            matches!(err, Error::Credential(CredentialError::KeyRead { .. })),
            "got {err:?}"
        );
        assert_eq!(launcher.state(), SessionState::Failed);
    }
}

#[cfg(unix)]
mod external {
    use super::*;

    /// Test: Client process exits 0.
    /// Expected: session closes cleanly with exit status 0.
    #[tokio::test]
    async fn successful_client_closes_session() {
        let transport = Transport::External(ExternalClient::new().program("true"));
        let mut launcher = SessionLauncher::new(transport, default_key());

        let outcome = launcher
            .launch(&password_profile("127.0.0.1", 22))
            .await
            .unwrap();

        assert_eq!(outcome.exit_status, Some(0));
        assert_eq!(launcher.state(), SessionState::Closed);
    }

    /// Test: Client process exits non-zero.
    /// Expected: ExternalExit transport error, state Failed.
    #[tokio::test]
    async fn failing_client_is_reported() {
        let transport = Transport::External(ExternalClient::new().program("false"));
        let mut launcher = SessionLauncher::new(transport, default_key());

        let err = launcher
            .launch(&password_profile("127.0.0.1", 22))
            .await
            .unwrap_err();

        assert!(
            matches!(err, Error::Transport(TransportError::ExternalExit(_))),
            "got {err:?}"
        );
        assert_eq!(launcher.state(), SessionState::Failed);
    }

    /// Test: Client binary does not exist.
    /// Expected: Spawn transport error naming the program.
    #[tokio::test]
    async fn missing_client_is_a_spawn_error() {
        let transport = Transport::External(ExternalClient::new().program("/nonexistent/ssh"));
        let mut launcher = SessionLauncher::new(transport, default_key());

        let err = launcher
            .launch(&password_profile("127.0.0.1", 22))
            .await
            .unwrap_err();

        assert!(
            matches!(err, Error::Transport(TransportError::Spawn { .. })),
            "got {err:?}"
        );
        assert!(err.to_string().contains("/nonexistent/ssh"));
        assert_eq!(launcher.state(), SessionState::Failed);
    }

    /// Test: A launcher is single-use.
    /// Expected: second launch is refused without running anything.
    #[tokio::test]
    async fn second_launch_is_refused() {
        let transport = Transport::External(ExternalClient::new().program("true"));
        let mut launcher = SessionLauncher::new(transport, default_key());
        let profile = password_profile("127.0.0.1", 22);
        launcher.launch(&profile).await.unwrap();

        let err = launcher.launch(&profile).await.unwrap_err();

        assert!(matches!(err, Error::AlreadyLaunched(SessionState::Closed)));
    }
}

mod native {
    use super::*;

    /// Test: Nothing listens on the target port.
    /// Expected: Dial transport error, state Failed.
    #[tokio::test]
    async fn refused_connection_is_a_dial_error() {
        let port = closed_port();
        let transport = Transport::Native(NativeClient::new());
        let mut launcher = SessionLauncher::new(transport, default_key());

        let err = launcher
            .launch(&password_profile("127.0.0.1", port))
            .await
            .unwrap_err();

        assert!(
            matches!(err, Error::Transport(TransportError::Dial(_))),
            "got {err:?}"
        );
        assert_eq!(launcher.state(), SessionState::Failed);
    }

    #[test]
    fn default_policy_skips_host_key_verification() {
        assert!(HostKeyPolicy::default().is_insecure());
        assert!(!HostKeyPolicy::KnownHosts(None).is_insecure());
    }

    #[test]
    fn pty_is_fixed_linux_160_by_32() {
        let pty = PtyConfig::default();
        assert_eq!(pty.term, "linux");
        assert_eq!(pty.cols, 160);
        assert_eq!(pty.rows, 32);
    }
}

mod native_session {
    use super::*;
    use russh::keys::{PrivateKey, PublicKey, decode_secret_key};
    use russh::server::{self, Server as _};
    use russh::{Channel, ChannelId, CryptoVec, Pty, Sig};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tokio::net::TcpListener;

    const PASSWORD: &str = "s3cret";
    const CLIENT_KEY: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/id_ed25519");
    const HOST_KEY: &str = concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/tests/fixtures/id_ed25519_protected"
    );

    /// What the server does once the client asks for a shell.
    #[derive(Debug, Clone)]
    enum Script {
        Exit(u32),
        Signal(Sig),
        RefusePty,
        RefuseShell,
    }

    #[derive(Debug, Clone, PartialEq)]
    struct PtySeen {
        term: String,
        cols: u32,
        rows: u32,
        modes: Vec<(Pty, u32)>,
    }

    #[derive(Clone)]
    struct ScriptedServer {
        script: Script,
        client_key: PublicKey,
        pty: Arc<Mutex<Option<PtySeen>>>,
    }

    impl server::Server for ScriptedServer {
        type Handler = Self;

        fn new_client(&mut self, _: Option<std::net::SocketAddr>) -> Self {
            self.clone()
        }
    }

    impl server::Handler for ScriptedServer {
        type Error = russh::Error;

        async fn auth_password(
            &mut self,
            _user: &str,
            password: &str,
        ) -> Result<server::Auth, Self::Error> {
            Ok(if password == PASSWORD {
                server::Auth::Accept
            } else {
                server::Auth::reject()
            })
        }

        async fn auth_publickey(
            &mut self,
            _user: &str,
            public_key: &PublicKey,
        ) -> Result<server::Auth, Self::Error> {
            Ok(if public_key.key_data() == self.client_key.key_data() {
                server::Auth::Accept
            } else {
                server::Auth::reject()
            })
        }

        async fn channel_open_session(
            &mut self,
            _channel: Channel<server::Msg>,
            _session: &mut server::Session,
        ) -> Result<bool, Self::Error> {
            Ok(true)
        }

        async fn pty_request(
            &mut self,
            channel: ChannelId,
            term: &str,
            col_width: u32,
            row_height: u32,
            _pix_width: u32,
            _pix_height: u32,
            modes: &[(Pty, u32)],
            session: &mut server::Session,
        ) -> Result<(), Self::Error> {
            if let Ok(mut seen) = self.pty.lock() {
                *seen = Some(PtySeen {
                    term: term.to_string(),
                    cols: col_width,
                    rows: row_height,
                    modes: modes.to_vec(),
                });
            }
            match self.script {
                Script::RefusePty => session.channel_failure(channel),
                _ => session.channel_success(channel),
            }
        }

        async fn shell_request(
            &mut self,
            channel: ChannelId,
            session: &mut server::Session,
        ) -> Result<(), Self::Error> {
            match &self.script {
                Script::RefuseShell => return session.channel_failure(channel),
                Script::Exit(code) => {
                    session.channel_success(channel)?;
                    session.data(channel, CryptoVec::from("welcome\r\n"))?;
                    session.exit_status_request(channel, *code)?;
                }
                Script::Signal(signal) => {
                    session.channel_success(channel)?;
                    session.exit_signal_request(channel, signal.clone(), false, "killed", "en")?;
                }
                Script::RefusePty => session.channel_success(channel)?,
            }
            session.eof(channel)?;
            session.close(channel)
        }
    }

    fn load_key(path: &str, passphrase: Option<&str>) -> PrivateKey {
        let pem = std::fs::read_to_string(path).unwrap();
        decode_secret_key(&pem, passphrase).unwrap()
    }

    /// Serve `script` on an ephemeral localhost port. Returns the port and the recorded PTY request.
    async fn serve(script: Script) -> (u16, Arc<Mutex<Option<PtySeen>>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let config = Arc::new(server::Config {
            keys: vec![load_key(HOST_KEY, Some("hunter2"))],
            auth_rejection_time: Duration::ZERO,
            auth_rejection_time_initial: Some(Duration::ZERO),
            ..Default::default()
        });
        let pty = Arc::new(Mutex::new(None));
        let mut server = ScriptedServer {
            script,
            client_key: load_key(CLIENT_KEY, None).public_key().clone(),
            pty: Arc::clone(&pty),
        };

        tokio::spawn(async move {
            let _ = server.run_on_socket(config, &listener).await;
        });

        (port, pty)
    }

    fn launcher() -> SessionLauncher {
        let client = NativeClient::new().forward_stdin(false);
        SessionLauncher::new(Transport::Native(client), default_key())
    }

    fn profile(port: u16, password: &str) -> Profile {
        password_profile("127.0.0.1", port).pass(password)
    }

    /// Test: Shell prints a line and exits 0.
    /// Expected: Outcome carries status 0 and the launcher ends Closed.
    #[tokio::test]
    async fn clean_exit_closes_the_session() {
        let (port, _) = serve(Script::Exit(0)).await;
        let mut launcher = launcher();

        let outcome = launcher.launch(&profile(port, PASSWORD)).await.unwrap();

        assert_eq!(outcome.exit_status, Some(0));
        assert_eq!(launcher.state(), SessionState::Closed);
    }

    /// Test: Inspect the PTY request the server receives.
    /// Expected: linux terminal, 160x32, both line speeds at 14400.
    #[tokio::test]
    async fn pty_request_carries_fixed_geometry_and_speeds() {
        let (port, pty) = serve(Script::Exit(0)).await;

        launcher().launch(&profile(port, PASSWORD)).await.unwrap();

        let seen = pty.lock().unwrap().clone().expect("no pty request recorded");
        assert_eq!(seen.term, "linux");
        assert_eq!((seen.cols, seen.rows), (160, 32));
        assert!(seen.modes.contains(&(Pty::TTY_OP_ISPEED, 14400)));
        assert!(seen.modes.contains(&(Pty::TTY_OP_OSPEED, 14400)));
    }

    /// Test: Profile with only a key path, server accepting that key.
    /// Expected: Public-key auth succeeds and the session closes.
    #[tokio::test]
    async fn public_key_auth_succeeds() {
        let (port, _) = serve(Script::Exit(0)).await;
        let profile =
            Profile::new("box", "127.0.0.1", Port::new(u32::from(port)).unwrap(), "root")
                .key(CLIENT_KEY);
        let mut launcher = launcher();

        launcher.launch(&profile).await.unwrap();

        assert_eq!(launcher.state(), SessionState::Closed);
    }

    /// Test: Shell exits with status 3.
    /// Expected: RemoteExit(3), state Failed, process exit code 2.
    #[tokio::test]
    async fn non_zero_exit_is_remote_exit() {
        let (port, _) = serve(Script::Exit(3)).await;
        let mut launcher = launcher();

        let err = launcher.launch(&profile(port, PASSWORD)).await.unwrap_err();

        assert!(
            matches!(err, Error::Transport(TransportError::RemoteExit(3))),
            "got {err:?}"
        );
        assert_eq!(launcher.state(), SessionState::Failed);
        assert_eq!(sshman::error::Error::from(err).exit_code(), 2);
    }

    /// Test: Shell is killed by SIGKILL without reporting a status.
    /// Expected: RemoteSignal("KILL") reported as a return error, exit code 2.
    #[tokio::test]
    async fn signal_exit_is_a_return_error() {
        let (port, _) = serve(Script::Signal(Sig::KILL)).await;
        let mut launcher = launcher();

        let err = launcher.launch(&profile(port, PASSWORD)).await.unwrap_err();

        match &err {
            Error::Transport(TransportError::RemoteSignal(name)) => assert_eq!(name, "KILL"),
            other => panic!("expected RemoteSignal, got {other:?}"),
        }
        assert_eq!(
            err.to_string(),
            "return error: remote shell killed by signal KILL"
        );
        assert_eq!(launcher.state(), SessionState::Failed);
        assert_eq!(sshman::error::Error::from(err).exit_code(), 2);
    }

    /// Test: Server rejects the stored password.
    /// Expected: AuthRejected for the profile's user.
    #[tokio::test]
    async fn wrong_password_is_rejected() {
        let (port, _) = serve(Script::Exit(0)).await;
        let mut launcher = launcher();

        let err = launcher.launch(&profile(port, "wrong")).await.unwrap_err();

        match err {
            Error::Transport(TransportError::AuthRejected { user }) => assert_eq!(user, "root"),
            other => panic!("expected AuthRejected, got {other:?}"),
        }
        assert_eq!(launcher.state(), SessionState::Failed);
    }

    /// Test: Server answers the PTY request with failure.
    /// Expected: PtyRequest error.
    #[tokio::test]
    async fn refused_pty_is_a_pty_error() {
        let (port, _) = serve(Script::RefusePty).await;

        let err = launcher()
            .launch(&profile(port, PASSWORD))
            .await
            .unwrap_err();

        assert!(
            matches!(err, Error::Transport(TransportError::PtyRequest(_))),
            "got {err:?}"
        );
    }

    /// Test: Server grants the PTY but refuses the shell.
    /// Expected: ShellStart error.
    #[tokio::test]
    async fn refused_shell_is_a_shell_error() {
        let (port, _) = serve(Script::RefuseShell).await;

        let err = launcher()
            .launch(&profile(port, PASSWORD))
            .await
            .unwrap_err();

        assert!(
            matches!(err, Error::Transport(TransportError::ShellStart(_))),
            "got {err:?}"
        );
    }
}
