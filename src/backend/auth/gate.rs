/**
 * Single-Session Gate
 *
 * The review server admits exactly one browser session for its whole
 * lifetime. The first request of any kind binds the session: a random
 * session token and a random XSRF token are minted and handed to that
 * client as cookies. Every later request must present the session cookie;
 * mutating requests must also echo the XSRF token in a header.
 *
 * # States
 *
 * ```text
 * UNBOUND --first request--> BOUND
 * ```
 *
 * There is no way back to UNBOUND short of restarting the process. The
 * annotation store relies on this: with one bound session and the write
 * permit there is at most one writer.
 */

use std::sync::{Mutex, MutexGuard};

/// Tokens issued to the bound session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    /// Value of the session cookie
    pub session: String,
    /// Value of the XSRF cookie and header
    pub xsrf: String,
}

impl Binding {
    /// Mint a fresh pair of random tokens
    pub fn generate() -> Self {
        Self {
            session: generate_token(),
            xsrf: generate_token(),
        }
    }
}

/// Outcome of presenting a session cookie to the gate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    /// This request established the session; its client gets these tokens
    Bound(Binding),
    /// The request carries the bound session cookie
    Admitted,
    /// The gate is bound to another session, or the cookie is missing
    Rejected,
}

/// Process-wide single-session coordinator
#[derive(Debug)]
pub struct SessionGate {
    cookie_name: String,
    bound: Mutex<Option<Binding>>,
}

/// 32 random bytes, hex-encoded
pub fn generate_token() -> String {
    hex::encode(rand::random::<[u8; 32]>())
}

/// Compare two tokens without short-circuiting on the first difference
fn tokens_match(a: &str, b: &str) -> bool {
    a.len() == b.len()
        && a.bytes()
            .zip(b.bytes())
            .fold(0u8, |acc, (x, y)| acc | (x ^ y))
            == 0
}

impl SessionGate {
    /// Create an unbound gate whose session cookie is scoped to `port`
    ///
    /// Browsers do not separate cookies by port, so the port is part of the
    /// cookie name to keep servers on different ports apart.
    pub fn for_port(port: u16) -> Self {
        Self {
            cookie_name: format!("SESSION-{}", port),
            bound: Mutex::new(None),
        }
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    fn lock(&self) -> MutexGuard<'_, Option<Binding>> {
        // The guarded value is a plain Option; a panic elsewhere cannot leave it half-written.
        self.bound.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn is_bound(&self) -> bool {
        self.lock().is_some()
    }

    /// Bind to `binding` if no session is bound yet
    ///
    /// Returns `false`, leaving the existing binding in place, if the gate
    /// is already bound.
    pub fn try_bind(&self, binding: Binding) -> bool {
        let mut bound = self.lock();
        if bound.is_some() {
            return false;
        }
        *bound = Some(binding);
        true
    }

    /// True if `session` is the bound session token
    pub fn validate(&self, session: &str) -> bool {
        self.lock()
            .as_ref()
            .is_some_and(|binding| tokens_match(&binding.session, session))
    }

    /// True if the XSRF cookie and header are both present, agree with each
    /// other, and carry the token issued to the bound session
    pub fn validate_xsrf(&self, cookie: Option<&str>, header: Option<&str>) -> bool {
        let (Some(cookie), Some(header)) = (cookie, header) else {
            return false;
        };
        tokens_match(cookie, header)
            && self
                .lock()
                .as_ref()
                .is_some_and(|binding| tokens_match(&binding.xsrf, cookie))
    }

    /// Decide whether a request carrying `session` may proceed
    ///
    /// Binding and checking happen under one lock, so two concurrent first
    /// requests cannot both establish a session.
    pub fn admit(&self, session: Option<&str>) -> Admission {
        let mut bound = self.lock();
        match bound.as_ref() {
            None => {
                let binding = Binding::generate();
                *bound = Some(binding.clone());
                Admission::Bound(binding)
            }
            Some(binding) => match session {
                Some(session) if tokens_match(&binding.session, session) => Admission::Admitted,
                _ => Admission::Rejected,
            },
        }
    }
}
