//! Logout notification contracts.

// self
use crate::_prelude::*;

/// Why the session ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogoutReason {
	/// An authenticated call was attempted with no stored access token.
	Unauthenticated,
	/// The access token was rejected and the refresh failed.
	SessionExpired,
	/// The user signed out.
	UserRequested,
}
impl LogoutReason {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			LogoutReason::Unauthenticated => "unauthenticated",
			LogoutReason::SessionExpired => "session_expired",
			LogoutReason::UserRequested => "user_requested",
		}
	}

	/// Returns `true` when the client ended the session on its own.
	pub const fn is_forced(self) -> bool {
		!matches!(self, LogoutReason::UserRequested)
	}
}
impl Display for LogoutReason {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Receives logout notifications after the session store has been cleared.
///
/// Implementations redirect the user to `login_entry` in whatever way fits the host. The
/// hook runs synchronously inside the failing call, so it should only schedule work.
pub trait LogoutHandler: Send + Sync {
	/// Called once per logout.
	fn on_logout(&self, reason: LogoutReason, login_entry: &str);
}

/// One recorded logout.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogoutEvent {
	/// Why the session ended.
	pub reason: LogoutReason,
	/// Where the user should be sent.
	pub login_entry: String,
	/// When the logout happened.
	pub at: OffsetDateTime,
}

/// Default [`LogoutHandler`] that records logouts so hosts can poll for a pending redirect.
#[derive(Debug, Default)]
pub struct LogoutSignal(Mutex<Vec<LogoutEvent>>);
impl LogoutSignal {
	/// Returns every recorded logout, oldest first.
	pub fn events(&self) -> Vec<LogoutEvent> {
		self.0.lock().clone()
	}

	/// Returns the most recent logout, if any.
	pub fn last(&self) -> Option<LogoutEvent> {
		self.0.lock().last().cloned()
	}

	/// Drains recorded logouts.
	pub fn take(&self) -> Vec<LogoutEvent> {
		std::mem::take(&mut *self.0.lock())
	}

	/// Number of recorded logouts.
	pub fn count(&self) -> usize {
		self.0.lock().len()
	}
}
impl LogoutHandler for LogoutSignal {
	fn on_logout(&self, reason: LogoutReason, login_entry: &str) {
		self.0.lock().push(LogoutEvent {
			reason,
			login_entry: login_entry.to_owned(),
			at: OffsetDateTime::now_utc(),
		});
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn signal_records_and_drains() {
		let signal = LogoutSignal::default();

		signal.on_logout(LogoutReason::SessionExpired, "/paginas/login/login.html");
		signal.on_logout(LogoutReason::UserRequested, "/paginas/login/login.html");

		assert_eq!(signal.count(), 2);
		assert_eq!(
			signal.last().map(|event| event.reason),
			Some(LogoutReason::UserRequested)
		);

		let drained = signal.take();

		assert_eq!(drained.len(), 2);
		assert!(drained[0].reason.is_forced());
		assert!(!drained[1].reason.is_forced());
		assert_eq!(signal.count(), 0);
	}
}
