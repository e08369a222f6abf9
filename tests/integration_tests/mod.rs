// These tests drive the real git binary and compare forward-slash paths.
#![cfg(unix)]

pub mod head;
pub mod status;
pub mod topology;
