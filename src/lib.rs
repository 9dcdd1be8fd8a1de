//! # Recupero (Credential Recovery Service)
//!
//! `recupero` issues single-use, time-bounded recovery tokens and delivers
//! the matching recovery link through an ordered list of notification
//! endpoints with bounded retries and exponential backoff.
//!
//! ## Recovery Flow
//!
//! `POST /recover` validates the email format, issues a token, and attempts
//! delivery. The response is a uniform generic success for every well-formed
//! address: callers cannot distinguish a registered principal from an unknown
//! one, nor a delivered notification from an exhausted endpoint list.
//!
//! ## Reset Flow
//!
//! `POST /reset` checks the new secret against the strength policy, consumes
//! the token atomically (exactly one of N concurrent attempts wins), and
//! forwards the secret to the external credential store. This path does
//! surface token failure reasons; whoever holds a token already knows it
//! exists.
//!
//! ## Tokens
//!
//! Tokens are 256-bit `OsRng` values, valid for 24 hours by default, single
//! use, and purged by a background sweep once expired. Multiple live tokens
//! per principal are allowed so a lost link can be retried.

pub mod api;
pub mod cli;
pub mod credentials;
pub mod delivery;
pub mod tokens;
