//! These models represent the objects passed around by the generator
//!
//! There are several different related formats we need to interact with:
//! - tool declarations handed out by the tool registry, in either wire format
//! - openai-compatible messages/tools, sent to the reasoning provider
//! - anthropic messages/tools, sent to the tool-certified provider
//! - tool executions, sent to the registry that owns the tools
//!
//! We convert at the provider boundary only, so the internal models are not an
//! exact match to any of these formats.
pub mod message;
pub mod role;
pub mod tool;
