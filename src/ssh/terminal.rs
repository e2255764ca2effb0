// ABOUTME: Raw mode for the local terminal while a native shell session is attached.
// ABOUTME: The guard restores the saved termios settings when dropped.

use std::io::{self, IsTerminal};

/// Puts stdin into raw mode for the lifetime of the guard.
///
/// Constructed only when stdin is a terminal; piped input passes through untouched.
pub struct RawModeGuard {
    #[cfg(unix)]
    original: libc::termios,
}

impl RawModeGuard {
    /// Enter raw mode if stdin is a terminal. Returns `None` otherwise.
    pub fn enter_if_tty() -> io::Result<Option<Self>> {
        if !io::stdin().is_terminal() {
            return Ok(None);
        }
        Self::enter().map(Some)
    }

    #[cfg(unix)]
    fn enter() -> io::Result<Self> {
        let fd = libc::STDIN_FILENO;

        let mut termios = std::mem::MaybeUninit::<libc::termios>::uninit();
        if unsafe { libc::tcgetattr(fd, termios.as_mut_ptr()) } != 0 {
            return Err(io::Error::last_os_error());
        }
        let original = unsafe { termios.assume_init() };

        let mut raw = original;
        unsafe { libc::cfmakeraw(&mut raw) };
        raw.c_cc[libc::VMIN] = 1;
        raw.c_cc[libc::VTIME] = 0;

        if unsafe { libc::tcsetattr(fd, libc::TCSAFLUSH, &raw) } != 0 {
            return Err(io::Error::last_os_error());
        }

        tracing::debug!("entered raw terminal mode");
        Ok(Self { original })
    }

    #[cfg(not(unix))]
    fn enter() -> io::Result<Self> {
        Ok(Self {})
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        #[cfg(unix)]
        {
            let result =
                unsafe { libc::tcsetattr(libc::STDIN_FILENO, libc::TCSAFLUSH, &self.original) };
            if result != 0 {
                tracing::warn!("failed to restore terminal settings");
            } else {
                tracing::debug!("restored terminal settings");
            }
        }
    }
}
