//! Pipeline stages for flipbook-to-PDF downloads.
//!
//! Each submodule implements exactly one transformation step, and control
//! only ever flows forward:
//!
//! ```text
//! resolve ──▶ sequence ──▶ fetch ──▶ assemble
//! (owner/book) (page URLs)  (HTTP)    (lopdf → temp file → rename)
//! ```
//!
//! 1. [`resolve`]  — parse the book URL into an `owner/book` [`resolve::Identifier`]
//! 2. [`sequence`] — expand the identifier into one image URL per page
//! 3. [`fetch`]    — download every page with a bounded number of requests in
//!    flight; results are kept in page order and the first failure aborts
//! 4. [`assemble`] — decode each image and stream the PDF into a temp file
//!    that is renamed onto the final path only on success

pub mod assemble;
pub mod fetch;
pub mod resolve;
pub mod sequence;
