//! Property tests for the laws every `Tree` upholds, whatever keys it is fed.

mod tree;
