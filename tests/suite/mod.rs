//! End-to-end suite: each module drives one user-facing flow through
//! the public `App` surface against a mock backend.

mod companion_flow;
mod journal_flow;
mod quiz_flow;
mod wellbeing_flow;
