//! Output adapters
//!
//! The theme renderer emits backend-neutral [`DrawCommand`]s. Two adapters
//! consume them:
//! - PDF bytes via lopdf ([`write_pdf`])
//! - A serializable on-screen preview tree ([`PreviewDocument`])

mod commands;
mod pdf;
mod preview;

pub use commands::*;
pub use pdf::{build_pdf, write_pdf};
pub use preview::*;
