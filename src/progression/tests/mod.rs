//! Unit tests for the progression context.
