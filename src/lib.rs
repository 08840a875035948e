//! Headless e-book chapter reader.
//!
//! A chapter's markup is fetched from the book archive, sanitized into a live
//! [`dom::Document`], and shown by [`reader::ReaderView`]. Text selections
//! drive a highlight popover; chosen highlights are wrapped into the document
//! as styled spans.

pub mod book;
pub mod config;
pub mod dom;
pub mod highlight;
pub mod layout;
pub mod reader;
pub mod sanitizer;
pub mod selection;
pub mod services;
pub mod theme;
